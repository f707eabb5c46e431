mod common;

use common::{budget_2016, date, household_budget, spend, ACCT_CHECKING, CAT_DINING, CAT_GROCERIES, CAT_RENT, GROUP_HOME};
use moneta_domain::{
    Account, Budget, Category, CategoryGroup, CategoryRule, InvariantViolation, Record,
    RulePeriod, Transaction, TransactionDetail,
};

fn category_ids(budget: &Budget) -> Vec<i64> {
    budget.categories().iter().filter_map(|c| c.id).collect()
}

fn transaction_ids(budget: &Budget) -> Vec<i64> {
    budget.transactions().iter().filter_map(|t| t.id).collect()
}

#[test]
fn mutators_leave_the_receiver_untouched() {
    let before = household_budget();
    let after = before
        .update_account(Account::new("Wallet").with_id(200))
        .expect("add account");
    assert_eq!(before.accounts().len(), 1);
    assert_eq!(after.accounts().len(), 2);
    assert_ne!(before, after);
}

#[test]
fn categories_follow_group_order_then_custom_order() {
    let budget = budget_2016()
        .update_category_group(CategoryGroup::new("Essentials").with_id(1))
        .expect("group 1")
        .update_category_group(CategoryGroup::new("Fun").with_id(2))
        .expect("group 2")
        .update_category(Category::new("Rent", 1).with_id(11))
        .expect("cat 11")
        .update_category(Category::new("Games", 2).with_id(21))
        .expect("cat 21")
        .update_category(Category::new("Groceries", 1).with_id(12))
        .expect("cat 12")
        .update_category(Category::new("Dining", 2).with_id(22))
        .expect("cat 22");

    // Interleaved inserts still land grouped, appended within their group.
    assert_eq!(category_ids(&budget), vec![11, 12, 21, 22]);

    // Moving a category to another group appends it to that group's segment.
    let mut games = budget.category(21).expect("category exists").clone();
    games.group_id = Some(1);
    let moved = budget.update_category(games).expect("move group");
    assert_eq!(category_ids(&moved), vec![11, 12, 21, 22]);
    assert_eq!(moved.category_index_in_group(21), Some(2));

    // Repositioning a group drags its categories along, order preserved.
    let flipped = budget
        .position_category_group(2, 0)
        .expect("reposition group");
    assert_eq!(category_ids(&flipped), vec![21, 22, 11, 12]);
}

#[test]
fn position_category_moves_within_its_group_only() {
    let budget = budget_2016()
        .update_category_group(CategoryGroup::new("A").with_id(1))
        .expect("group")
        .update_category_group(CategoryGroup::new("B").with_id(2))
        .expect("group")
        .update_category(Category::new("a1", 1).with_id(11))
        .expect("cat")
        .update_category(Category::new("a2", 1).with_id(12))
        .expect("cat")
        .update_category(Category::new("b1", 2).with_id(21))
        .expect("cat")
        .update_category(Category::new("b2", 2).with_id(22))
        .expect("cat");

    let moved = budget.position_category(22, 0).expect("reposition");
    assert_eq!(category_ids(&moved), vec![11, 12, 22, 21]);
    assert_eq!(moved.category_index_in_group(22), Some(0));

    let out_of_bounds = budget.position_category(22, 3);
    assert_eq!(
        out_of_bounds.unwrap_err(),
        InvariantViolation::IndexOutOfBounds { index: 3, len: 2 }
    );
}

#[test]
fn position_account_accepts_the_full_index_range() {
    let budget = budget_2016()
        .update_account(Account::new("one").with_id(1))
        .expect("account")
        .update_account(Account::new("two").with_id(2))
        .expect("account")
        .update_account(Account::new("three").with_id(3))
        .expect("account");

    let front = budget.position_account(3, 0).expect("to front");
    assert_eq!(
        front.accounts().iter().filter_map(|a| a.id).collect::<Vec<_>>(),
        vec![3, 1, 2]
    );

    // Index == size appends.
    let back = budget.position_account(1, 3).expect("to back");
    assert_eq!(
        back.accounts().iter().filter_map(|a| a.id).collect::<Vec<_>>(),
        vec![2, 3, 1]
    );

    assert!(budget.position_account(1, 4).is_err());
}

#[test]
fn transactions_stay_chronological_with_undated_last() {
    let budget = household_budget();
    let budget = budget
        .update_transaction(spend(3, date(2016, 3, 1), ACCT_CHECKING, -100, CAT_DINING))
        .expect("txn")
        .update_transaction(
            Transaction::new(None, Some(ACCT_CHECKING))
                .with_id(9)
                .with_detail(vec![TransactionDetail::new(-50, Some(CAT_DINING))]),
        )
        .expect("undated txn")
        .update_transaction(spend(1, date(2016, 1, 5), ACCT_CHECKING, -200, CAT_RENT))
        .expect("txn")
        .update_transaction(spend(2, date(2016, 2, 1), ACCT_CHECKING, -300, CAT_GROCERIES))
        .expect("txn");

    assert_eq!(transaction_ids(&budget), vec![1, 2, 3, 9]);

    // Same-date updates keep their position.
    let mut relabeled = budget.transaction(2).expect("txn exists").clone();
    relabeled.who = "Market".into();
    let same_spot = budget.update_transaction(relabeled).expect("update");
    assert_eq!(transaction_ids(&same_spot), vec![1, 2, 3, 9]);

    // Date changes re-place the transaction.
    let mut moved = budget.transaction(2).expect("txn exists").clone();
    moved.date = Some(date(2016, 4, 1));
    let resorted = budget.update_transaction(moved).expect("update");
    assert_eq!(transaction_ids(&resorted), vec![1, 3, 2, 9]);
}

#[test]
fn deleting_an_account_unlinks_its_transactions() {
    let budget = household_budget()
        .update_transaction(spend(1, date(2016, 1, 5), ACCT_CHECKING, -100, CAT_DINING))
        .expect("txn")
        .update_transaction(spend(2, date(2016, 1, 6), ACCT_CHECKING, -200, CAT_RENT))
        .expect("txn");

    let after = budget.delete_account(ACCT_CHECKING).expect("delete");
    assert!(after.account(ACCT_CHECKING).is_none());
    assert!(after
        .transactions()
        .iter()
        .all(|t| t.account_id != Some(ACCT_CHECKING)));
    assert_eq!(after.transactions().len(), 2);
}

#[test]
fn deleting_a_category_uncategorizes_details() {
    let budget = household_budget()
        .update_transaction(
            Transaction::new(Some(date(2016, 1, 8)), Some(ACCT_CHECKING))
                .with_id(1)
                .with_detail(vec![
                    TransactionDetail::new(-500, Some(CAT_GROCERIES)),
                    TransactionDetail::new(-250, Some(CAT_DINING)),
                ]),
        )
        .expect("split txn");

    assert!(budget.transaction(1).expect("txn").is_split());

    let after = budget.delete_category(CAT_GROCERIES).expect("delete");
    assert!(after.category(CAT_GROCERIES).is_none());
    let txn = after.transaction(1).expect("txn survives");
    assert_eq!(txn.detail[0].category_id, None);
    assert_eq!(txn.detail[1].category_id, Some(CAT_DINING));
}

#[test]
fn group_deletion_requires_an_empty_group() {
    let budget = household_budget();
    assert_eq!(
        budget.delete_category_group(GROUP_HOME).unwrap_err(),
        InvariantViolation::GroupNotEmpty { group: GROUP_HOME }
    );

    let emptied = budget
        .delete_category(CAT_DINING)
        .expect("delete")
        .delete_category(CAT_GROCERIES)
        .expect("delete")
        .delete_category(CAT_RENT)
        .expect("delete");
    let after = emptied.delete_category_group(GROUP_HOME).expect("delete group");
    assert!(after.category_group(GROUP_HOME).is_none());
}

#[test]
fn deletes_of_unknown_ids_are_no_ops() {
    let budget = household_budget();
    assert_eq!(budget.delete_account(999).expect("no-op"), budget);
    assert_eq!(budget.delete_category(999).expect("no-op"), budget);
    assert_eq!(budget.delete_category_group(999).expect("no-op"), budget);
    assert_eq!(budget.delete_transaction(999).expect("no-op"), budget);
}

#[test]
fn categories_must_reference_known_groups_and_currencies() {
    let budget = budget_2016();
    let orphan = Category::new("Orphan", 42).with_id(5);
    assert_eq!(
        budget.update_category(orphan).unwrap_err(),
        InvariantViolation::UnknownGroup {
            category: 5,
            group: 42
        }
    );

    let budget = budget
        .update_category_group(CategoryGroup::new("Home").with_id(1))
        .expect("group");
    let misquoted = Category::new("Weird", 1).with_id(6).with_currency("XXX");
    assert_eq!(
        budget.update_category(misquoted).unwrap_err(),
        InvariantViolation::UnknownCurrency { code: "XXX".into() }
    );
}

#[test]
fn transactions_must_reference_known_accounts() {
    let budget = budget_2016();
    let stray = spend(1, date(2016, 1, 1), 77, -100, CAT_DINING);
    assert_eq!(
        budget.update_transaction(stray).unwrap_err(),
        InvariantViolation::UnknownAccount { account: 77 }
    );
}

#[test]
fn overlapping_rules_are_rejected() {
    let budget = budget_2016()
        .update_category_group(CategoryGroup::new("Home").with_id(1))
        .expect("group");

    // Two unbounded monthly rules fire in each other's windows.
    let clashing = Category::new("Rent", 1).with_id(5).with_rules(vec![
        CategoryRule::new(-60000, Some(RulePeriod::Month)),
        CategoryRule::new(-1000, Some(RulePeriod::Month)),
    ]);
    assert_eq!(
        budget.update_category(clashing).unwrap_err(),
        InvariantViolation::OverlappingRules { category: 5 }
    );

    // Back-to-back bounded rules do not overlap.
    let sequential = Category::new("Rent", 1).with_id(5).with_rules(vec![
        CategoryRule::new(-60000, Some(RulePeriod::Month))
            .anchored(date(2016, 1, 1))
            .until(date(2016, 6, 30)),
        CategoryRule::new(-65000, Some(RulePeriod::Month))
            .anchored(date(2016, 7, 1))
            .until(date(2016, 12, 31)),
    ]);
    assert!(budget.update_category(sequential).is_ok());
}

#[test]
fn records_update_through_batched_mutation() {
    let account = Account::new("Checking").with_id(1);
    let renamed = account
        .with_mutations(|draft| {
            draft.name = "Main Checking".into();
            draft.initial_balance = 12_500;
        })
        .expect("valid update");
    assert_eq!(account.name, "Checking");
    assert_eq!(renamed.name, "Main Checking");
    assert_eq!(renamed.initial_balance, 12_500);

    let broken = account.with_mutations(|draft| draft.id = Some(-3));
    assert!(broken.is_err());
}

#[test]
fn records_merge_partial_updates() {
    use moneta_domain::AccountPatch;

    let account = Account::new("Checking").with_id(1);
    let merged = account
        .merge(&AccountPatch {
            initial_balance: Some(-4_000),
            ..AccountPatch::default()
        })
        .expect("valid merge");
    assert_eq!(merged.name, "Checking");
    assert_eq!(merged.initial_balance, -4_000);
    assert_eq!(account.initial_balance, 0);
}

#[test]
fn transfer_transactions_reject_categorized_details() {
    let mut transfer = Transaction::new(Some(date(2016, 2, 2)), Some(ACCT_CHECKING)).with_id(4);
    transfer.is_transfer = true;
    transfer.detail = vec![TransactionDetail::new(-100, Some(CAT_DINING))];
    assert_eq!(
        transfer.check_invariants().unwrap_err(),
        InvariantViolation::TransferDetailHasCategory
    );

    let empty = Transaction::new(None, None).with_id(5).with_detail(Vec::new());
    assert_eq!(
        empty.check_invariants().unwrap_err(),
        InvariantViolation::EmptyTransactionDetail
    );
}
