//! The budget aggregate root.
//!
//! A [`Budget`] owns its accounts, category groups, categories and
//! transactions in enforced order: accounts and groups in user-defined order,
//! categories primarily by group order and secondarily by the user's order
//! within each group, transactions chronologically with undated ones last.
//! Every structural mutator hands back a new `Budget` with the cross-entity
//! invariants re-checked; the receiver is never touched.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::balances::BalanceTables;
use crate::category::{Category, CategoryGroup};
use crate::currency::is_known_currency;
use crate::date::{PDate, NULL_DATE_SENTINEL};
use crate::error::InvariantViolation;
use crate::record::Record;
use crate::rule::CategoryRule;
use crate::transaction::Transaction;

/// Version stamp of the persisted form. The major number is bumped on
/// incompatible changes, the minor on additive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

pub const FORMAT_VERSION: FormatVersion = FormatVersion { major: 1, minor: 0 };

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BudgetRepr", into = "BudgetRepr")]
pub struct Budget {
    id: Option<i64>,
    name: String,
    currency_code: String,
    start_date: PDate,
    end_date: PDate,
    accounts: Vec<Account>,
    category_groups: Vec<CategoryGroup>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    pub(crate) balances: OnceCell<BalanceTables>,
}

impl PartialEq for Budget {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.currency_code == other.currency_code
            && self.start_date == other.start_date
            && self.end_date == other.end_date
            && self.accounts == other.accounts
            && self.category_groups == other.category_groups
            && self.categories == other.categories
            && self.transactions == other.transactions
    }
}

fn transaction_sort_key(transaction: &Transaction) -> i32 {
    transaction
        .date
        .map(PDate::value)
        .unwrap_or(NULL_DATE_SENTINEL)
}

impl Budget {
    /// An empty budget covering Jan 1 – Dec 31 of the current year.
    pub fn new() -> Budget {
        let year = Utc::now().year();
        Budget {
            id: None,
            name: String::new(),
            currency_code: "USD".into(),
            start_date: PDate::from_ymd(year, 1, 1).unwrap(),
            end_date: PDate::from_ymd(year, 12, 31).unwrap(),
            accounts: Vec::new(),
            category_groups: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            balances: OnceCell::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Budget {
        self.id = Some(id);
        self
    }

    /// Assembles a budget from already-ordered parts, checking every
    /// invariant as given; nothing is re-sorted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Option<i64>,
        name: String,
        currency_code: String,
        start_date: PDate,
        end_date: PDate,
        accounts: Vec<Account>,
        category_groups: Vec<CategoryGroup>,
        categories: Vec<Category>,
        transactions: Vec<Transaction>,
    ) -> Result<Budget, InvariantViolation> {
        let budget = Budget {
            id,
            name,
            currency_code,
            start_date,
            end_date,
            accounts,
            category_groups,
            categories,
            transactions,
            balances: OnceCell::new(),
        };
        budget.check_invariants()?;
        Ok(budget)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn start_date(&self) -> PDate {
        self.start_date
    }

    pub fn end_date(&self) -> PDate {
        self.end_date
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn category_groups(&self) -> &[CategoryGroup] {
        &self.category_groups
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == Some(id))
    }

    pub fn category_group(&self, id: i64) -> Option<&CategoryGroup> {
        self.category_groups.iter().find(|g| g.id == Some(id))
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == Some(id))
    }

    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == Some(id))
    }

    pub fn account_index(&self, id: i64) -> Option<usize> {
        self.accounts.iter().position(|a| a.id == Some(id))
    }

    pub fn category_group_index(&self, id: i64) -> Option<usize> {
        self.category_groups.iter().position(|g| g.id == Some(id))
    }

    /// Global position in the dual-ordered category list.
    pub fn category_index(&self, id: i64) -> Option<usize> {
        self.categories.iter().position(|c| c.id == Some(id))
    }

    /// Position of a category within its own group's segment.
    pub fn category_index_in_group(&self, id: i64) -> Option<usize> {
        let pos = self.category_index(id)?;
        let (segment_start, _) = self.category_segment(self.categories[pos].group_id);
        Some(pos - segment_start)
    }

    pub fn transaction_index(&self, id: i64) -> Option<usize> {
        self.transactions.iter().position(|t| t.id == Some(id))
    }

    // ---- field setters -------------------------------------------------

    pub fn set_name(&self, name: impl Into<String>) -> Budget {
        let mut next = self.clone();
        next.name = name.into();
        next.balances = OnceCell::new();
        next
    }

    pub fn set_currency(&self, currency_code: impl Into<String>) -> Budget {
        let mut next = self.clone();
        next.currency_code = currency_code.into();
        next.balances = OnceCell::new();
        next
    }

    /// Sets either or both period bounds.
    pub fn set_dates(
        &self,
        start_date: Option<PDate>,
        end_date: Option<PDate>,
    ) -> Result<Budget, InvariantViolation> {
        let mut next = self.clone();
        if let Some(start_date) = start_date {
            next.start_date = start_date;
        }
        if let Some(end_date) = end_date {
            next.end_date = end_date;
        }
        next.finish()
    }

    // ---- accounts ------------------------------------------------------

    /// Upsert by id. Existing accounts keep their position; new ones append.
    pub fn update_account(&self, account: Account) -> Result<Budget, InvariantViolation> {
        let id = account
            .id
            .ok_or(InvariantViolation::MissingId { entity: "account" })?;
        let mut next = self.clone();
        match next.accounts.iter().position(|a| a.id == Some(id)) {
            Some(pos) => next.accounts[pos] = account,
            None => next.accounts.push(account),
        }
        next.finish()
    }

    pub fn position_account(&self, id: i64, new_index: usize) -> Result<Budget, InvariantViolation> {
        let pos = self.account_index(id).ok_or(InvariantViolation::NotFound {
            entity: "account",
            id,
        })?;
        let len = self.accounts.len();
        if new_index > len {
            return Err(InvariantViolation::IndexOutOfBounds {
                index: new_index,
                len,
            });
        }
        let mut next = self.clone();
        let account = next.accounts.remove(pos);
        let insert_at = new_index.min(next.accounts.len());
        next.accounts.insert(insert_at, account);
        next.finish()
    }

    /// Removes an account and unlinks every transaction that pointed at it.
    /// Deleting an unknown id is a no-op.
    pub fn delete_account(&self, id: i64) -> Result<Budget, InvariantViolation> {
        let Some(pos) = self.account_index(id) else {
            return Ok(self.clone());
        };
        let mut next = self.clone();
        next.accounts.remove(pos);
        for transaction in &mut next.transactions {
            if transaction.account_id == Some(id) {
                transaction.account_id = None;
            }
        }
        next.finish()
    }

    // ---- category groups ----------------------------------------------

    pub fn update_category_group(&self, group: CategoryGroup) -> Result<Budget, InvariantViolation> {
        let id = group.id.ok_or(InvariantViolation::MissingId {
            entity: "category group",
        })?;
        let mut next = self.clone();
        match next.category_groups.iter().position(|g| g.id == Some(id)) {
            Some(pos) => next.category_groups[pos] = group,
            None => next.category_groups.push(group),
        }
        next.finish()
    }

    pub fn position_category_group(
        &self,
        id: i64,
        new_index: usize,
    ) -> Result<Budget, InvariantViolation> {
        let pos = self
            .category_group_index(id)
            .ok_or(InvariantViolation::NotFound {
                entity: "category group",
                id,
            })?;
        let len = self.category_groups.len();
        if new_index > len {
            return Err(InvariantViolation::IndexOutOfBounds {
                index: new_index,
                len,
            });
        }
        let mut next = self.clone();
        let group = next.category_groups.remove(pos);
        let insert_at = new_index.min(next.category_groups.len());
        next.category_groups.insert(insert_at, group);
        next.resort_categories();
        next.finish()
    }

    /// Only permitted once the group holds no categories. Deleting an unknown
    /// id is a no-op.
    pub fn delete_category_group(&self, id: i64) -> Result<Budget, InvariantViolation> {
        let Some(pos) = self.category_group_index(id) else {
            return Ok(self.clone());
        };
        if self.categories.iter().any(|c| c.group_id == Some(id)) {
            return Err(InvariantViolation::GroupNotEmpty { group: id });
        }
        let mut next = self.clone();
        next.category_groups.remove(pos);
        next.finish()
    }

    // ---- categories ----------------------------------------------------

    /// Upsert by id. A category that is new or changed group lands at the end
    /// of its group's segment; otherwise it is updated in place.
    pub fn update_category(&self, category: Category) -> Result<Budget, InvariantViolation> {
        let id = category
            .id
            .ok_or(InvariantViolation::MissingId { entity: "category" })?;
        let mut next = self.clone();
        match next.categories.iter().position(|c| c.id == Some(id)) {
            Some(pos) if next.categories[pos].group_id == category.group_id => {
                next.categories[pos] = category;
            }
            Some(pos) => {
                next.categories.remove(pos);
                next.insert_category_at_group_end(category);
            }
            None => next.insert_category_at_group_end(category),
        }
        next.finish()
    }

    /// Moves a category to `new_index` within its own group; other groups are
    /// untouched.
    pub fn position_category(&self, id: i64, new_index: usize) -> Result<Budget, InvariantViolation> {
        let pos = self.category_index(id).ok_or(InvariantViolation::NotFound {
            entity: "category",
            id,
        })?;
        let (segment_start, segment_end) = self.category_segment(self.categories[pos].group_id);
        let segment_len = segment_end - segment_start;
        if new_index > segment_len {
            return Err(InvariantViolation::IndexOutOfBounds {
                index: new_index,
                len: segment_len,
            });
        }
        let mut next = self.clone();
        let category = next.categories.remove(pos);
        let insert_at = segment_start + new_index.min(segment_len - 1);
        next.categories.insert(insert_at, category);
        next.finish()
    }

    /// Removes a category and uncategorizes every transaction detail that
    /// pointed at it. Deleting an unknown id is a no-op.
    pub fn delete_category(&self, id: i64) -> Result<Budget, InvariantViolation> {
        let Some(pos) = self.category_index(id) else {
            return Ok(self.clone());
        };
        let mut next = self.clone();
        next.categories.remove(pos);
        for transaction in &mut next.transactions {
            for detail in &mut transaction.detail {
                if detail.category_id == Some(id) {
                    detail.category_id = None;
                }
            }
        }
        next.finish()
    }

    // ---- transactions --------------------------------------------------

    /// Upsert by id, keeping the list chronological. Updates that leave the
    /// date alone keep their position; date changes re-place the transaction
    /// after any equal-dated ones. The account, when set, must exist.
    pub fn update_transaction(&self, transaction: Transaction) -> Result<Budget, InvariantViolation> {
        let id = transaction.id.ok_or(InvariantViolation::MissingId {
            entity: "transaction",
        })?;
        if let Some(account_id) = transaction.account_id {
            if self.account(account_id).is_none() {
                return Err(InvariantViolation::UnknownAccount {
                    account: account_id,
                });
            }
        }
        let mut next = self.clone();
        match next.transactions.iter().position(|t| t.id == Some(id)) {
            Some(pos) if next.transactions[pos].date == transaction.date => {
                next.transactions[pos] = transaction;
            }
            Some(pos) => {
                next.transactions.remove(pos);
                next.insert_transaction_sorted(transaction);
            }
            None => next.insert_transaction_sorted(transaction),
        }
        next.finish()
    }

    /// Deleting an unknown id is a no-op.
    pub fn delete_transaction(&self, id: i64) -> Result<Budget, InvariantViolation> {
        let Some(pos) = self.transaction_index(id) else {
            return Ok(self.clone());
        };
        let mut next = self.clone();
        next.transactions.remove(pos);
        next.finish()
    }

    // ---- internals -----------------------------------------------------

    fn finish(mut self) -> Result<Budget, InvariantViolation> {
        self.balances = OnceCell::new();
        self.check_invariants()?;
        Ok(self)
    }

    fn group_rank(&self, group_id: Option<i64>) -> usize {
        group_id
            .and_then(|id| self.category_groups.iter().position(|g| g.id == Some(id)))
            .unwrap_or(usize::MAX)
    }

    /// Contiguous index range `[start, end)` of a group's categories. Empty
    /// segments collapse to where the group's categories would sit.
    fn category_segment(&self, group_id: Option<i64>) -> (usize, usize) {
        let rank = self.group_rank(group_id);
        let start = self
            .categories
            .iter()
            .position(|c| self.group_rank(c.group_id) >= rank)
            .unwrap_or(self.categories.len());
        let end = self
            .categories
            .iter()
            .position(|c| self.group_rank(c.group_id) > rank)
            .unwrap_or(self.categories.len());
        (start, end)
    }

    fn insert_category_at_group_end(&mut self, category: Category) {
        let rank = self.group_rank(category.group_id);
        let insert_at = self
            .categories
            .iter()
            .position(|c| self.group_rank(c.group_id) > rank)
            .unwrap_or(self.categories.len());
        self.categories.insert(insert_at, category);
    }

    /// Stable re-sort by group order; within-group order is preserved.
    fn resort_categories(&mut self) {
        let rank: HashMap<i64, usize> = self
            .category_groups
            .iter()
            .enumerate()
            .filter_map(|(index, g)| g.id.map(|id| (id, index)))
            .collect();
        self.categories.sort_by_key(|c| {
            c.group_id
                .and_then(|id| rank.get(&id).copied())
                .unwrap_or(usize::MAX)
        });
    }

    fn insert_transaction_sorted(&mut self, transaction: Transaction) {
        let key = transaction_sort_key(&transaction);
        let insert_at = self
            .transactions
            .iter()
            .position(|t| transaction_sort_key(t) > key)
            .unwrap_or(self.transactions.len());
        self.transactions.insert(insert_at, transaction);
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.end_date < self.start_date {
            return Err(InvariantViolation::DateRangeReversed {
                start: self.start_date.value(),
                end: self.end_date.value(),
            });
        }

        check_ids("account", self.accounts.iter().map(|a| a.id))?;
        check_ids("category group", self.category_groups.iter().map(|g| g.id))?;
        check_ids("category", self.categories.iter().map(|c| c.id))?;
        check_ids("transaction", self.transactions.iter().map(|t| t.id))?;

        for account in &self.accounts {
            account.check_invariants()?;
        }
        for group in &self.category_groups {
            group.check_invariants()?;
        }
        for category in &self.categories {
            category.check_invariants()?;
            let category_id = category.id.unwrap_or_default();
            match category.group_id {
                None => {
                    return Err(InvariantViolation::CategoryWithoutGroup {
                        category: category_id,
                    })
                }
                Some(group_id) => {
                    if self.category_group(group_id).is_none() {
                        return Err(InvariantViolation::UnknownGroup {
                            category: category_id,
                            group: group_id,
                        });
                    }
                }
            }
            if !is_known_currency(&category.currency_code) {
                return Err(InvariantViolation::UnknownCurrency {
                    code: category.currency_code.clone(),
                });
            }
            if let Some(rules) = &category.rules {
                if self.rules_overlap(rules) {
                    return Err(InvariantViolation::OverlappingRules {
                        category: category_id,
                    });
                }
            }
        }
        for transaction in &self.transactions {
            transaction.check_invariants()?;
        }

        let mut last_rank = 0usize;
        for category in &self.categories {
            let rank = self.group_rank(category.group_id);
            if rank < last_rank {
                return Err(InvariantViolation::CategoriesOutOfOrder);
            }
            last_rank = rank;
        }
        let mut last_key = i32::MIN;
        for transaction in &self.transactions {
            let key = transaction_sort_key(transaction);
            if key < last_key {
                return Err(InvariantViolation::TransactionsOutOfOrder);
            }
            last_key = key;
        }
        Ok(())
    }

    /// All ordered pairs are tested: rule `a` overlaps rule `b` when `a`
    /// fires at least once inside `b`'s effective window clamped to the
    /// budget period.
    fn rules_overlap(&self, rules: &[CategoryRule]) -> bool {
        for (i, a) in rules.iter().enumerate() {
            for (j, b) in rules.iter().enumerate() {
                if i == j {
                    continue;
                }
                let window_start = b
                    .start_date
                    .unwrap_or(self.start_date)
                    .max(self.start_date);
                let window_end = b.end_date.unwrap_or(self.end_date).min(self.end_date);
                if window_end < window_start {
                    continue;
                }
                if a.count_occurrences_between(window_start, window_end) > 0 {
                    return true;
                }
            }
        }
        false
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new()
    }
}

fn check_ids<I>(entity: &'static str, ids: I) -> Result<(), InvariantViolation>
where
    I: Iterator<Item = Option<i64>>,
{
    let mut seen = HashSet::new();
    for id in ids {
        let id = id.ok_or(InvariantViolation::MissingId { entity })?;
        if !seen.insert(id) {
            return Err(InvariantViolation::DuplicateId { entity, id });
        }
    }
    Ok(())
}

/// Persisted form of a budget: a versioned, ordered object tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRepr {
    pub version: FormatVersion,
    pub id: Option<i64>,
    pub name: String,
    pub start_date: PDate,
    pub end_date: PDate,
    pub currency_code: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub category_groups: Vec<CategoryGroup>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl From<Budget> for BudgetRepr {
    fn from(budget: Budget) -> Self {
        BudgetRepr {
            version: FORMAT_VERSION,
            id: budget.id,
            name: budget.name,
            start_date: budget.start_date,
            end_date: budget.end_date,
            currency_code: budget.currency_code,
            accounts: budget.accounts,
            category_groups: budget.category_groups,
            categories: budget.categories,
            transactions: budget.transactions,
        }
    }
}

impl TryFrom<BudgetRepr> for Budget {
    type Error = InvariantViolation;

    fn try_from(repr: BudgetRepr) -> Result<Self, Self::Error> {
        if repr.version.major != FORMAT_VERSION.major {
            return Err(InvariantViolation::UnsupportedVersion {
                major: repr.version.major,
            });
        }
        Budget::from_parts(
            repr.id,
            repr.name,
            repr.currency_code,
            repr.start_date,
            repr.end_date,
            repr.accounts,
            repr.category_groups,
            repr.categories,
            repr.transactions,
        )
    }
}
