#![allow(dead_code)]

use moneta_core::{invert, reduce, Command};
use moneta_domain::{
    Account, Budget, Category, CategoryGroup, PDate, Transaction, TransactionDetail,
};

pub fn date(year: i32, month: u32, day: u32) -> PDate {
    PDate::from_ymd(year, month, day).expect("valid test date")
}

/// An empty budget with id 1 spanning calendar year 2016.
pub fn budget_2016() -> Budget {
    Budget::new()
        .with_id(1)
        .set_dates(Some(date(2016, 1, 1)), Some(date(2016, 12, 31)))
        .expect("valid budget period")
}

pub const GROUP_HOME: i64 = 10;
pub const CAT_DINING: i64 = 1;
pub const CAT_GROCERIES: i64 = 2;
pub const ACCT_CHECKING: i64 = 100;

pub fn household_budget() -> Budget {
    budget_2016()
        .update_category_group(CategoryGroup::new("Home").with_id(GROUP_HOME))
        .expect("add group")
        .update_category(Category::new("Dining", GROUP_HOME).with_id(CAT_DINING))
        .expect("add dining")
        .update_category(Category::new("Groceries", GROUP_HOME).with_id(CAT_GROCERIES))
        .expect("add groceries")
        .update_account(Account::new("Checking").with_id(ACCT_CHECKING))
        .expect("add account")
}

pub fn spend(id: i64, on: PDate, account_id: i64, amount: i64, category_id: i64) -> Transaction {
    Transaction::new(Some(on), Some(account_id))
        .with_id(id)
        .with_detail(vec![TransactionDetail::new(amount, Some(category_id))])
}

/// Applies the command and asserts that replaying its inverse restores the
/// starting state exactly.
pub fn assert_undoes(state: &Budget, command: &Command) -> Budget {
    let inverse = invert(state, command)
        .expect("invertible")
        .expect("known command");
    let forward = reduce(state, command).expect("command applies");
    let restored = reduce(&forward, &inverse).expect("inverse applies");
    assert_eq!(&restored, state, "inverse failed for {command:?}");
    forward
}
