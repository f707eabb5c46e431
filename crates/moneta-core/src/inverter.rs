//! Undo synthesis.
//!
//! For a command `C` over a state `S`, [`invert`] produces a command whose
//! application after `C` restores `S` exactly, list positions and orphaned
//! references included: deletions invert to updates carrying a full snapshot,
//! the prior position and the list of references to re-link; updates of
//! existing records invert to updates carrying only the fields that changed;
//! updates that created a record invert to deletions.

use moneta_domain::{AccountPatch, Budget, CategoryGroupPatch, CategoryPatch, TransactionPatch};

use crate::command::{Command, DetailRef};
use crate::error::EngineError;
use crate::reducer::reduce;

/// Synthesizes the undo command for `command` against the pre-state `state`.
/// Unknown commands have no inverse. The returned command is stamped with the
/// state's budget id.
pub fn invert(state: &Budget, command: &Command) -> Result<Option<Command>, EngineError> {
    if matches!(command, Command::Unknown) {
        return Ok(None);
    }
    let budget_id = state.id();
    if let Some(target) = command.budget_id() {
        if state.id() != Some(target) {
            // The forward command will not apply here, so neither need the
            // inverse.
            return Ok(Some(Command::Noop { budget_id }));
        }
    }

    let inverse = match command {
        Command::Unknown => unreachable!("handled above"),
        Command::Noop { .. } => Command::Noop { budget_id },

        Command::SetCurrency { .. } => Command::SetCurrency {
            budget_id,
            currency_code: state.currency_code().to_string(),
        },
        Command::SetName { .. } => Command::SetName {
            budget_id,
            name: state.name().to_string(),
        },
        Command::SetDate {
            start_date,
            end_date,
            ..
        } => Command::SetDate {
            budget_id,
            start_date: start_date.map(|_| state.start_date()),
            end_date: end_date.map(|_| state.end_date()),
        },

        Command::DeleteAccount { id, .. } => match state.account(*id) {
            None => Command::Noop { budget_id },
            Some(account) => Command::UpdateAccount {
                budget_id,
                id: *id,
                data: Some(AccountPatch::from_account(account)),
                index: state.account_index(*id),
                link_null_transactions: Some(
                    state
                        .transactions()
                        .iter()
                        .filter(|t| t.account_id == Some(*id))
                        .filter_map(|t| t.id)
                        .collect(),
                ),
            },
        },
        Command::UpdateAccount { id, data, index, .. } => match state.account(*id) {
            None => Command::DeleteAccount { budget_id, id: *id },
            Some(before) => {
                let after = match data {
                    Some(patch) => patch.apply_to(before),
                    None => before.clone(),
                };
                let diff = AccountPatch::diff(before, &after);
                let prior_index = state.account_index(*id);
                let inverse_index = match (index, prior_index) {
                    (Some(forward), Some(prior)) if *forward != prior => Some(prior),
                    _ => None,
                };
                Command::UpdateAccount {
                    budget_id,
                    id: *id,
                    data: (!diff.is_empty()).then_some(diff),
                    index: inverse_index,
                    link_null_transactions: None,
                }
            }
        },

        Command::DeleteCategory { id, .. } => match state.category(*id) {
            None => Command::Noop { budget_id },
            Some(category) => Command::UpdateCategory {
                budget_id,
                id: *id,
                data: Some(CategoryPatch::from_category(category)),
                index: state.category_index_in_group(*id),
                link_transaction_details: Some(detail_refs_for_category(state, *id)),
            },
        },
        Command::UpdateCategory { id, data, index, .. } => match state.category(*id) {
            None => Command::DeleteCategory { budget_id, id: *id },
            Some(before) => {
                let after = match data {
                    Some(patch) => patch.apply_to(before),
                    None => before.clone(),
                };
                let diff = CategoryPatch::diff(before, &after);
                let prior_index = state.category_index_in_group(*id);
                // A group change re-places the category at the end of its old
                // group on undo, so the prior within-group position must ride
                // along even when the forward command carried no index.
                let inverse_index = if before.group_id != after.group_id {
                    prior_index
                } else {
                    match (index, prior_index) {
                        (Some(forward), Some(prior)) if *forward != prior => Some(prior),
                        _ => None,
                    }
                };
                Command::UpdateCategory {
                    budget_id,
                    id: *id,
                    data: (!diff.is_empty()).then_some(diff),
                    index: inverse_index,
                    link_transaction_details: None,
                }
            }
        },

        Command::DeleteCategoryGroup { id, .. } => match state.category_group(*id) {
            None => Command::Noop { budget_id },
            Some(group) => Command::UpdateCategoryGroup {
                budget_id,
                id: *id,
                data: Some(CategoryGroupPatch::from_group(group)),
                index: None,
            },
        },
        Command::UpdateCategoryGroup { id, data, index, .. } => match state.category_group(*id) {
            None => Command::DeleteCategoryGroup { budget_id, id: *id },
            Some(before) => {
                let after = match data {
                    Some(patch) => patch.apply_to(before),
                    None => before.clone(),
                };
                let diff = CategoryGroupPatch::diff(before, &after);
                let prior_index = state.category_group_index(*id);
                let inverse_index = match (index, prior_index) {
                    (Some(forward), Some(prior)) if *forward != prior => Some(prior),
                    _ => None,
                };
                Command::UpdateCategoryGroup {
                    budget_id,
                    id: *id,
                    data: (!diff.is_empty()).then_some(diff),
                    index: inverse_index,
                }
            }
        },

        Command::DeleteTransaction { id, .. } => match state.transaction(*id) {
            None => Command::Noop { budget_id },
            Some(transaction) => Command::UpdateTransaction {
                budget_id,
                id: *id,
                data: TransactionPatch::from_transaction(transaction),
            },
        },
        Command::UpdateTransaction { id, data, .. } => match state.transaction(*id) {
            None => Command::DeleteTransaction { budget_id, id: *id },
            Some(before) => {
                let after = data.apply_to(before);
                Command::UpdateTransaction {
                    budget_id,
                    id: *id,
                    data: TransactionPatch::diff(before, &after),
                }
            }
        },

        Command::UpdateMultipleTransactions { sub_actions, .. } => {
            for sub in sub_actions {
                crate::reducer::check_sub_action(sub, state.id())?;
            }
            // Invert each sub-action against the running state, then undo in
            // reverse order.
            let mut running = state.clone();
            let mut inverses = Vec::with_capacity(sub_actions.len());
            for sub in sub_actions {
                if let Some(inverse) = invert(&running, sub)? {
                    inverses.push(inverse);
                }
                running = reduce(&running, sub)?;
            }
            inverses.reverse();
            Command::UpdateMultipleTransactions {
                budget_id,
                sub_actions: inverses,
            }
        }
    };

    Ok(Some(inverse))
}

fn detail_refs_for_category(state: &Budget, category_id: i64) -> Vec<DetailRef> {
    let mut refs = Vec::new();
    for transaction in state.transactions() {
        let Some(transaction_id) = transaction.id else {
            continue;
        };
        for (detail_index, detail) in transaction.detail.iter().enumerate() {
            if detail.category_id == Some(category_id) {
                refs.push(DetailRef {
                    transaction_id,
                    detail_index,
                });
            }
        }
    }
    refs
}
