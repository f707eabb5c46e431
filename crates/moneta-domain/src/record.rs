//! Shared record behavior: invariant checking, batched updates, contextual
//! validation, and the partial-update protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::budget::Budget;
use crate::error::InvariantViolation;
use crate::validation::{ValidationContext, ValidationFailed, ValidationResult};

/// Free-form per-record annotations. Replaced wholesale on update.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Behavior common to the immutable value records of the model.
///
/// Records are plain data: cloning is cheap and the only sanctioned way to
/// derive a changed record is through [`Record::with_mutations`] or a typed
/// patch, both of which re-check the record's local invariants before handing
/// the new value back.
pub trait Record: Clone {
    /// Checks the record's local assertions, failing the construction or
    /// update that produced it.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;

    /// Reports non-fatal issues against the given budget. Default: nothing to
    /// report.
    fn validate(&self, _ctx: &mut ValidationContext<'_>) {}

    /// Batched update: clones the record, hands the scratch copy to the
    /// closure, and checks invariants once at the end. Intermediate states
    /// may be inconsistent; the final state must not be.
    fn with_mutations<F>(&self, mutate: F) -> Result<Self, InvariantViolation>
    where
        F: FnOnce(&mut Self),
    {
        let mut draft = self.clone();
        mutate(&mut draft);
        draft.check_invariants()?;
        Ok(draft)
    }

    /// Collects errors and warnings for this record in the context of a
    /// budget.
    fn validate_for_budget(&self, budget: &Budget) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut ctx = ValidationContext::new(budget, &mut result);
        self.validate(&mut ctx);
        result
    }

    /// Like [`Record::validate_for_budget`] but fails on errors. Warnings are
    /// informational and never fail.
    fn assert_is_valid_for_budget(&self, budget: &Budget) -> Result<(), ValidationFailed> {
        let result = self.validate_for_budget(budget);
        if result.has_errors() {
            Err(ValidationFailed::new(result))
        } else {
            Ok(())
        }
    }
}

/// Deserializes a nullable patch field so that an absent key stays `None`
/// while an explicit `null` becomes `Some(None)`. Pair with
/// `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
