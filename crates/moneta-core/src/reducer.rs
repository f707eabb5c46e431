//! Pure application of commands to a budget.

use moneta_domain::{Account, Budget, Category, CategoryGroup, Transaction};

use crate::command::{Command, DetailRef};
use crate::error::EngineError;

/// Applies one command, yielding the next state. Unknown commands and
/// commands aimed at a different budget return the state unchanged. Errors
/// from the budget's own invariants propagate untouched.
pub fn reduce(state: &Budget, command: &Command) -> Result<Budget, EngineError> {
    if matches!(command, Command::Unknown) {
        return Ok(state.clone());
    }
    if let Some(target) = command.budget_id() {
        if state.id() != Some(target) {
            log::debug!("skipping command aimed at budget {target}");
            return Ok(state.clone());
        }
    }

    match command {
        Command::Unknown => Ok(state.clone()),
        Command::Noop { .. } => Ok(state.clone()),
        Command::SetCurrency { currency_code, .. } => Ok(state.set_currency(currency_code.clone())),
        Command::SetName { name, .. } => Ok(state.set_name(name.clone())),
        Command::SetDate {
            start_date,
            end_date,
            ..
        } => Ok(state.set_dates(*start_date, *end_date)?),

        Command::DeleteAccount { id, .. } => Ok(state.delete_account(*id)?),
        Command::UpdateAccount {
            id,
            data,
            index,
            link_null_transactions,
            ..
        } => {
            let inserting = state.account(*id).is_none();
            let account = match state.account(*id) {
                Some(existing) => match data {
                    Some(patch) => patch.apply_to(existing),
                    None => existing.clone(),
                },
                None => {
                    let base = Account::default().with_id(*id);
                    match data {
                        Some(patch) => patch.apply_to(&base),
                        None => base,
                    }
                }
            };
            let mut next = state.update_account(account)?;
            if inserting {
                if let Some(links) = link_null_transactions {
                    next = link_transactions(next, *id, links)?;
                }
            }
            if let Some(index) = index {
                next = next.position_account(*id, *index)?;
            }
            Ok(next)
        }

        Command::DeleteCategory { id, .. } => Ok(state.delete_category(*id)?),
        Command::UpdateCategory {
            id,
            data,
            index,
            link_transaction_details,
            ..
        } => {
            let inserting = state.category(*id).is_none();
            let category = match state.category(*id) {
                Some(existing) => match data {
                    Some(patch) => patch.apply_to(existing),
                    None => existing.clone(),
                },
                None => {
                    let base = Category::default().with_id(*id);
                    match data {
                        Some(patch) => patch.apply_to(&base),
                        None => base,
                    }
                }
            };
            let mut next = state.update_category(category)?;
            if inserting {
                if let Some(links) = link_transaction_details {
                    next = link_details(next, *id, links)?;
                }
            }
            if let Some(index) = index {
                next = next.position_category(*id, *index)?;
            }
            Ok(next)
        }

        Command::DeleteCategoryGroup { id, .. } => Ok(state.delete_category_group(*id)?),
        Command::UpdateCategoryGroup {
            id, data, index, ..
        } => {
            let group = match state.category_group(*id) {
                Some(existing) => match data {
                    Some(patch) => patch.apply_to(existing),
                    None => existing.clone(),
                },
                None => {
                    let base = CategoryGroup::default().with_id(*id);
                    match data {
                        Some(patch) => patch.apply_to(&base),
                        None => base,
                    }
                }
            };
            let mut next = state.update_category_group(group)?;
            if let Some(index) = index {
                next = next.position_category_group(*id, *index)?;
            }
            Ok(next)
        }

        Command::DeleteTransaction { id, .. } => Ok(state.delete_transaction(*id)?),
        Command::UpdateTransaction { id, data, .. } => {
            let transaction = match state.transaction(*id) {
                Some(existing) => data.apply_to(existing),
                None => data.apply_to(&Transaction::default().with_id(*id)),
            };
            Ok(state.update_transaction(transaction)?)
        }

        Command::UpdateMultipleTransactions { sub_actions, .. } => {
            for sub in sub_actions {
                check_sub_action(sub, state.id())?;
            }
            let mut next = state.clone();
            for sub in sub_actions {
                next = reduce(&next, sub)?;
            }
            Ok(next)
        }
    }
}

/// Batches accept transaction updates and deletes only, and no sub-action may
/// aim at a foreign budget.
pub(crate) fn check_sub_action(sub: &Command, budget_id: Option<i64>) -> Result<(), EngineError> {
    match sub {
        Command::UpdateTransaction { .. } | Command::DeleteTransaction { .. } => {
            match sub.budget_id() {
                Some(target) if Some(target) != budget_id => {
                    Err(EngineError::ForeignSubAction(target))
                }
                _ => Ok(()),
            }
        }
        _ => Err(EngineError::InvalidSubAction),
    }
}

/// Attaches a freshly inserted account to the listed transactions, touching
/// only those currently unlinked.
fn link_transactions(
    mut budget: Budget,
    account_id: i64,
    transaction_ids: &[i64],
) -> Result<Budget, EngineError> {
    for transaction_id in transaction_ids {
        let Some(transaction) = budget.transaction(*transaction_id) else {
            continue;
        };
        if transaction.account_id.is_some() {
            continue;
        }
        let mut updated = transaction.clone();
        updated.account_id = Some(account_id);
        budget = budget.update_transaction(updated)?;
    }
    Ok(budget)
}

/// Re-attaches a freshly inserted category to the listed detail rows,
/// touching only those currently uncategorized.
fn link_details(
    mut budget: Budget,
    category_id: i64,
    refs: &[DetailRef],
) -> Result<Budget, EngineError> {
    for DetailRef {
        transaction_id,
        detail_index,
    } in refs
    {
        let Some(transaction) = budget.transaction(*transaction_id) else {
            continue;
        };
        let Some(detail) = transaction.detail.get(*detail_index) else {
            continue;
        };
        if detail.category_id.is_some() {
            continue;
        }
        let mut updated = transaction.clone();
        updated.detail[*detail_index].category_id = Some(category_id);
        budget = budget.update_transaction(updated)?;
    }
    Ok(budget)
}
