//! Transaction records, split details, and their partial-update form.

use serde::{Deserialize, Serialize};

use crate::date::PDate;
use crate::error::InvariantViolation;
use crate::record::{double_option, Metadata, Record};
use crate::validation::ValidationContext;

/// One leg of a potentially split transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    /// Minor units; sign carries direction.
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<i64>,
}

impl TransactionDetail {
    pub fn new(amount: i64, category_id: Option<i64>) -> Self {
        Self {
            amount,
            description: String::new(),
            category_id,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Record for TransactionDetail {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(category_id) = self.category_id {
            if category_id <= 0 {
                return Err(InvariantViolation::NonPositiveId {
                    entity: "category",
                    id: category_id,
                });
            }
        }
        Ok(())
    }
}

/// A dated movement of money on an account, split across one or more details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Option<i64>,
    pub date: Option<PDate>,
    pub account_id: Option<i64>,
    #[serde(default)]
    pub who: String,
    pub user_id: Option<i64>,
    pub detail: Vec<TransactionDetail>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub is_transfer: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            id: None,
            date: None,
            account_id: None,
            who: String::new(),
            user_id: None,
            detail: vec![TransactionDetail::default()],
            pending: false,
            is_transfer: false,
            metadata: Metadata::new(),
        }
    }
}

impl Transaction {
    pub fn new(date: Option<PDate>, account_id: Option<i64>) -> Self {
        Self {
            date,
            account_id,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_detail(mut self, detail: Vec<TransactionDetail>) -> Self {
        self.detail = detail;
        self
    }

    pub fn pending(mut self) -> Self {
        self.pending = true;
        self
    }

    /// Total across all details.
    pub fn amount(&self) -> i64 {
        self.detail.iter().map(|d| d.amount).sum()
    }

    pub fn is_split(&self) -> bool {
        self.detail.len() > 1
    }

    pub fn merge(&self, patch: &TransactionPatch) -> Result<Transaction, InvariantViolation> {
        let next = patch.apply_to(self);
        next.check_invariants()?;
        Ok(next)
    }
}

impl Record for Transaction {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (entity, id) in [
            ("transaction", self.id),
            ("account", self.account_id),
            ("user", self.user_id),
        ] {
            if let Some(id) = id {
                if id <= 0 {
                    return Err(InvariantViolation::NonPositiveId { entity, id });
                }
            }
        }
        if self.detail.is_empty() {
            return Err(InvariantViolation::EmptyTransactionDetail);
        }
        for detail in &self.detail {
            detail.check_invariants()?;
            if self.is_transfer && detail.category_id.is_some() {
                return Err(InvariantViolation::TransferDetailHasCategory);
            }
        }
        Ok(())
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) {
        let total = self.amount();
        if !self.pending && total != 0 && self.account_id.is_none() {
            ctx.add_warning(
                Some("accountId"),
                "transaction moves money but is not linked to an account",
            );
        }
        let account_currency = self
            .account_id
            .and_then(|id| ctx.budget().account(id))
            .map(|account| account.currency_code.clone());
        for (index, detail) in self.detail.iter().enumerate() {
            match detail.category_id {
                None => {
                    if !self.pending && !self.is_transfer && total != 0 {
                        ctx.add_warning(
                            Some("detail"),
                            format!("detail {index} is not categorized"),
                        );
                    }
                }
                Some(category_id) => match ctx.budget().category(category_id) {
                    None => ctx.add_error(
                        Some("detail"),
                        format!("detail {index} references unknown category {category_id}"),
                    ),
                    Some(category) => {
                        if let Some(account_currency) = &account_currency {
                            if &category.currency_code != account_currency {
                                ctx.add_error(
                                    Some("detail"),
                                    format!(
                                        "detail {index} category `{}` is in {} but the account is in {}",
                                        category.name, category.currency_code, account_currency
                                    ),
                                );
                            }
                        }
                    }
                },
            }
        }
    }
}

/// Explicit partial update for [`Transaction`]. Nullable fields distinguish
/// an absent key from an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Option<PDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<TransactionDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_transfer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, transaction: &Transaction) -> Transaction {
        let mut next = transaction.clone();
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(account_id) = self.account_id {
            next.account_id = account_id;
        }
        if let Some(who) = &self.who {
            next.who = who.clone();
        }
        if let Some(user_id) = self.user_id {
            next.user_id = user_id;
        }
        if let Some(detail) = &self.detail {
            next.detail = detail.clone();
        }
        if let Some(pending) = self.pending {
            next.pending = pending;
        }
        if let Some(is_transfer) = self.is_transfer {
            next.is_transfer = is_transfer;
        }
        if let Some(metadata) = &self.metadata {
            next.metadata = metadata.clone();
        }
        next
    }

    /// Full snapshot of a transaction, id excluded.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            date: Some(transaction.date),
            account_id: Some(transaction.account_id),
            who: Some(transaction.who.clone()),
            user_id: Some(transaction.user_id),
            detail: Some(transaction.detail.clone()),
            pending: Some(transaction.pending),
            is_transfer: Some(transaction.is_transfer),
            metadata: Some(transaction.metadata.clone()),
        }
    }

    pub fn diff(before: &Transaction, after: &Transaction) -> Self {
        let mut patch = Self::default();
        if before.date != after.date {
            patch.date = Some(before.date);
        }
        if before.account_id != after.account_id {
            patch.account_id = Some(before.account_id);
        }
        if before.who != after.who {
            patch.who = Some(before.who.clone());
        }
        if before.user_id != after.user_id {
            patch.user_id = Some(before.user_id);
        }
        if before.detail != after.detail {
            patch.detail = Some(before.detail.clone());
        }
        if before.pending != after.pending {
            patch.pending = Some(before.pending);
        }
        if before.is_transfer != after.is_transfer {
            patch.is_transfer = Some(before.is_transfer);
        }
        if before.metadata != after.metadata {
            patch.metadata = Some(before.metadata.clone());
        }
        patch
    }
}
