//! Derived balances: per-account running totals and per-category sums.
//!
//! The tables are computed lazily on first request and cached on the Budget
//! instance; structural mutators hand out new instances with empty caches, so
//! a cached table is never stale.

use std::collections::HashMap;

use crate::budget::Budget;
use crate::date::PDate;

#[derive(Debug, Clone, Default)]
pub(crate) struct BalanceTables {
    /// Final balance per account: initial balance plus every non-pending
    /// transaction, in chronological order.
    pub(crate) account_balances: HashMap<i64, i64>,
    /// Running balance of the owning account right after each non-pending,
    /// account-linked transaction was applied.
    pub(crate) transaction_account_balances: HashMap<i64, i64>,
}

impl Budget {
    fn balance_tables(&self) -> &BalanceTables {
        self.balances.get_or_init(|| {
            log::debug!(
                "computing balance tables over {} transactions",
                self.transactions().len()
            );
            let mut account_balances: HashMap<i64, i64> = self
                .accounts()
                .iter()
                .filter_map(|account| account.id.map(|id| (id, account.initial_balance)))
                .collect();
            let mut transaction_account_balances = HashMap::new();
            for transaction in self.transactions() {
                if transaction.pending {
                    continue;
                }
                let Some(account_id) = transaction.account_id else {
                    continue;
                };
                let running = account_balances.entry(account_id).or_insert(0);
                *running += transaction.amount();
                if let Some(transaction_id) = transaction.id {
                    transaction_account_balances.insert(transaction_id, *running);
                }
            }
            BalanceTables {
                account_balances,
                transaction_account_balances,
            }
        })
    }

    /// Final balance of every account. Pending transactions and transactions
    /// without an account are excluded.
    pub fn account_balances(&self) -> &HashMap<i64, i64> {
        &self.balance_tables().account_balances
    }

    pub fn account_balance(&self, account_id: i64) -> Option<i64> {
        self.balance_tables()
            .account_balances
            .get(&account_id)
            .copied()
    }

    /// The balance of `account_id` as it stood at the given transaction.
    ///
    /// Undated and pending transactions have no standpoint and yield `None`.
    /// When the transaction is on another account, the balance is taken from
    /// the last preceding dated non-pending transaction on `account_id` (by
    /// chronological position, not wall-clock), falling back to the account's
    /// initial balance.
    pub fn account_balance_as_of_transaction(
        &self,
        transaction_id: i64,
        account_id: i64,
    ) -> Option<i64> {
        let position = self.transaction_index(transaction_id)?;
        let transaction = &self.transactions()[position];
        if transaction.date.is_none() || transaction.pending {
            return None;
        }
        let tables = self.balance_tables();
        if transaction.account_id == Some(account_id) {
            return tables
                .transaction_account_balances
                .get(&transaction_id)
                .copied();
        }
        for prior in self.transactions()[..position].iter().rev() {
            if prior.account_id == Some(account_id) && !prior.pending && prior.date.is_some() {
                return prior
                    .id
                    .and_then(|id| tables.transaction_account_balances.get(&id))
                    .copied();
            }
        }
        self.account(account_id).map(|a| a.initial_balance)
    }

    /// Cumulative per-category totals over every dated transaction on or
    /// before `date`. All categories are present, at zero when untouched;
    /// pending transactions count, uncategorized details do not.
    pub fn category_balances_on_date(&self, date: PDate) -> HashMap<i64, i64> {
        debug_assert!(self.start_date() <= date && date <= self.end_date());
        let mut balances: HashMap<i64, i64> = self
            .categories()
            .iter()
            .filter_map(|category| category.id.map(|id| (id, 0)))
            .collect();
        for transaction in self.transactions() {
            let Some(transaction_date) = transaction.date else {
                break;
            };
            if transaction_date > date {
                break;
            }
            for detail in &transaction.detail {
                if let Some(category_id) = detail.category_id {
                    *balances.entry(category_id).or_insert(0) += detail.amount;
                }
            }
        }
        balances
    }

    pub fn category_balance_by_date(&self, category_id: i64, date: PDate) -> i64 {
        debug_assert!(self.category(category_id).is_some());
        self.category_balances_on_date(date)
            .get(&category_id)
            .copied()
            .unwrap_or(0)
    }

    /// Budgeted amount per category on `date`: automatic categories budget
    /// whatever they have realized; rule-driven ones sum each rule's amount
    /// times its occurrences over the budget period up to `date`.
    pub fn category_budgets_on_date(&self, date: PDate) -> HashMap<i64, i64> {
        let balances = self.category_balances_on_date(date);
        let mut budgets = HashMap::new();
        for category in self.categories() {
            let Some(id) = category.id else {
                continue;
            };
            let amount = match &category.rules {
                None => balances.get(&id).copied().unwrap_or(0),
                Some(rules) => rules
                    .iter()
                    .map(|rule| {
                        rule.amount
                            * i64::from(rule.count_occurrences_between(self.start_date(), date))
                    })
                    .sum(),
            };
            budgets.insert(id, amount);
        }
        budgets
    }
}
