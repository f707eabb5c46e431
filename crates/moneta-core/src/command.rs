//! The fixed command set.
//!
//! Commands are plain tagged records; on the wire the tag is a `type` string
//! prefixed with `budget/`. Tags outside that set deserialize to
//! [`Command::Unknown`] and pass through the reducer untouched. A command may
//! carry a `budgetId`; when present and different from the state's id, the
//! command does not apply.
//!
//! `data` payloads are explicit partial maps: a present key replaces the
//! whole field value (overwriting `metadata` drops any prior keys), an absent
//! key leaves the field alone. A present `index` repositions; the link lists
//! only act when the command inserts a new record.

use serde::{Deserialize, Serialize};

use moneta_domain::{AccountPatch, CategoryGroupPatch, CategoryPatch, PDate, TransactionPatch};

/// Addresses one detail row of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRef {
    pub transaction_id: i64,
    pub detail_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Command {
    #[serde(rename = "budget/NOOP")]
    Noop {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
    },
    #[serde(rename = "budget/SET_CURRENCY")]
    SetCurrency {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        currency_code: String,
    },
    #[serde(rename = "budget/SET_DATE")]
    SetDate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_date: Option<PDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_date: Option<PDate>,
    },
    #[serde(rename = "budget/SET_NAME")]
    SetName {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        name: String,
    },
    #[serde(rename = "budget/DELETE_ACCOUNT")]
    DeleteAccount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
    },
    #[serde(rename = "budget/UPDATE_ACCOUNT")]
    UpdateAccount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<AccountPatch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link_null_transactions: Option<Vec<i64>>,
    },
    #[serde(rename = "budget/DELETE_CATEGORY")]
    DeleteCategory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
    },
    #[serde(rename = "budget/UPDATE_CATEGORY")]
    UpdateCategory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<CategoryPatch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link_transaction_details: Option<Vec<DetailRef>>,
    },
    #[serde(rename = "budget/DELETE_CATEGORY_GROUP")]
    DeleteCategoryGroup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
    },
    #[serde(rename = "budget/UPDATE_CATEGORY_GROUP")]
    UpdateCategoryGroup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<CategoryGroupPatch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    #[serde(rename = "budget/DELETE_TRANSACTION")]
    DeleteTransaction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
    },
    #[serde(rename = "budget/UPDATE_TRANSACTION")]
    UpdateTransaction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        id: i64,
        data: TransactionPatch,
    },
    /// The only compound command: a batch of transaction updates and deletes
    /// applied in order.
    #[serde(rename = "budget/UPDATE_MULTIPLE_TRANSACTIONS")]
    UpdateMultipleTransactions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_id: Option<i64>,
        sub_actions: Vec<Command>,
    },
    /// Any command whose tag is not one of ours. Passes through unchanged.
    #[serde(other)]
    Unknown,
}

impl Command {
    pub fn budget_id(&self) -> Option<i64> {
        match self {
            Command::Noop { budget_id }
            | Command::SetCurrency { budget_id, .. }
            | Command::SetDate { budget_id, .. }
            | Command::SetName { budget_id, .. }
            | Command::DeleteAccount { budget_id, .. }
            | Command::UpdateAccount { budget_id, .. }
            | Command::DeleteCategory { budget_id, .. }
            | Command::UpdateCategory { budget_id, .. }
            | Command::DeleteCategoryGroup { budget_id, .. }
            | Command::UpdateCategoryGroup { budget_id, .. }
            | Command::DeleteTransaction { budget_id, .. }
            | Command::UpdateTransaction { budget_id, .. }
            | Command::UpdateMultipleTransactions { budget_id, .. } => *budget_id,
            Command::Unknown => None,
        }
    }
}
