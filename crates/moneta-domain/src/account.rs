//! Account records and their partial-update form.

use serde::{Deserialize, Serialize};

use crate::currency::is_known_currency;
use crate::error::InvariantViolation;
use crate::record::{Metadata, Record};
use crate::validation::ValidationContext;

/// A financial account tracked by a budget. Balances are in minor units of
/// the account currency and may be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Option<i64>,
    pub name: String,
    pub initial_balance: i64,
    pub currency_code: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            initial_balance: 0,
            currency_code: "USD".into(),
            metadata: Metadata::new(),
        }
    }
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_initial_balance(mut self, initial_balance: i64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    /// Applies a patch and re-checks invariants.
    pub fn merge(&self, patch: &AccountPatch) -> Result<Account, InvariantViolation> {
        let next = patch.apply_to(self);
        next.check_invariants()?;
        Ok(next)
    }
}

impl Record for Account {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(InvariantViolation::NonPositiveId {
                    entity: "account",
                    id,
                });
            }
        }
        Ok(())
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) {
        if !is_known_currency(&self.currency_code) {
            ctx.add_error(
                Some("currencyCode"),
                format!("unknown currency code `{}`", self.currency_code),
            );
        }
    }
}

/// Explicit partial update for [`Account`]. A present key replaces the whole
/// field value; `metadata` in particular is swapped wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, account: &Account) -> Account {
        let mut next = account.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(initial_balance) = self.initial_balance {
            next.initial_balance = initial_balance;
        }
        if let Some(currency_code) = &self.currency_code {
            next.currency_code = currency_code.clone();
        }
        if let Some(metadata) = &self.metadata {
            next.metadata = metadata.clone();
        }
        next
    }

    /// Full snapshot of an account, id excluded.
    pub fn from_account(account: &Account) -> Self {
        Self {
            name: Some(account.name.clone()),
            initial_balance: Some(account.initial_balance),
            currency_code: Some(account.currency_code.clone()),
            metadata: Some(account.metadata.clone()),
        }
    }

    /// The fields of `before` that differ in `after`, carrying the `before`
    /// values.
    pub fn diff(before: &Account, after: &Account) -> Self {
        let mut patch = Self::default();
        if before.name != after.name {
            patch.name = Some(before.name.clone());
        }
        if before.initial_balance != after.initial_balance {
            patch.initial_balance = Some(before.initial_balance);
        }
        if before.currency_code != after.currency_code {
            patch.currency_code = Some(before.currency_code.clone());
        }
        if before.metadata != after.metadata {
            patch.metadata = Some(before.metadata.clone());
        }
        patch
    }
}
