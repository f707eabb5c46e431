//! Category and category-group records.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::record::{double_option, Metadata, Record};
use crate::rule::CategoryRule;

/// A named bucket of spending, owned by a group.
///
/// `rules == None` marks the category as automatic: its budgeted amount is
/// whatever has actually been spent. A present rule list (even an empty one)
/// defines the budget deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    pub currency_code: String,
    pub group_id: Option<i64>,
    pub rules: Option<Vec<CategoryRule>>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            notes: String::new(),
            currency_code: "USD".into(),
            group_id: None,
            rules: Some(Vec::new()),
            metadata: Metadata::new(),
        }
    }
}

impl Category {
    pub fn new(name: impl Into<String>, group_id: i64) -> Self {
        Self {
            name: name.into(),
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn with_rules(mut self, rules: Vec<CategoryRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Derive the budget from realized spending instead of rules.
    pub fn automatic(mut self) -> Self {
        self.rules = None;
        self
    }

    pub fn is_automatic(&self) -> bool {
        self.rules.is_none()
    }

    pub fn merge(&self, patch: &CategoryPatch) -> Result<Category, InvariantViolation> {
        let next = patch.apply_to(self);
        next.check_invariants()?;
        Ok(next)
    }
}

impl Record for Category {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(InvariantViolation::NonPositiveId {
                    entity: "category",
                    id,
                });
            }
        }
        if let Some(group_id) = self.group_id {
            if group_id <= 0 {
                return Err(InvariantViolation::NonPositiveId {
                    entity: "category group",
                    id: group_id,
                });
            }
        }
        if let Some(rules) = &self.rules {
            for rule in rules {
                rule.check_invariants()?;
            }
        }
        Ok(())
    }
}

/// Explicit partial update for [`Category`]. `rules` distinguishes an absent
/// key from an explicit `null` (switch to automatic).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rules: Option<Option<Vec<CategoryRule>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, category: &Category) -> Category {
        let mut next = category.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(notes) = &self.notes {
            next.notes = notes.clone();
        }
        if let Some(currency_code) = &self.currency_code {
            next.currency_code = currency_code.clone();
        }
        if let Some(group_id) = self.group_id {
            next.group_id = group_id;
        }
        if let Some(rules) = &self.rules {
            next.rules = rules.clone();
        }
        if let Some(metadata) = &self.metadata {
            next.metadata = metadata.clone();
        }
        next
    }

    /// Full snapshot of a category, id excluded.
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: Some(category.name.clone()),
            notes: Some(category.notes.clone()),
            currency_code: Some(category.currency_code.clone()),
            group_id: Some(category.group_id),
            rules: Some(category.rules.clone()),
            metadata: Some(category.metadata.clone()),
        }
    }

    pub fn diff(before: &Category, after: &Category) -> Self {
        let mut patch = Self::default();
        if before.name != after.name {
            patch.name = Some(before.name.clone());
        }
        if before.notes != after.notes {
            patch.notes = Some(before.notes.clone());
        }
        if before.currency_code != after.currency_code {
            patch.currency_code = Some(before.currency_code.clone());
        }
        if before.group_id != after.group_id {
            patch.group_id = Some(before.group_id);
        }
        if before.rules != after.rules {
            patch.rules = Some(before.rules.clone());
        }
        if before.metadata != after.metadata {
            patch.metadata = Some(before.metadata.clone());
        }
        patch
    }
}

/// A display grouping for categories; groups carry user-defined order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub id: Option<i64>,
    pub name: String,
}

impl CategoryGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn merge(&self, patch: &CategoryGroupPatch) -> Result<CategoryGroup, InvariantViolation> {
        let next = patch.apply_to(self);
        next.check_invariants()?;
        Ok(next)
    }
}

impl Record for CategoryGroup {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(InvariantViolation::NonPositiveId {
                    entity: "category group",
                    id,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroupPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CategoryGroupPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    pub fn apply_to(&self, group: &CategoryGroup) -> CategoryGroup {
        let mut next = group.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        next
    }

    pub fn from_group(group: &CategoryGroup) -> Self {
        Self {
            name: Some(group.name.clone()),
        }
    }

    pub fn diff(before: &CategoryGroup, after: &CategoryGroup) -> Self {
        let mut patch = Self::default();
        if before.name != after.name {
            patch.name = Some(before.name.clone());
        }
        patch
    }
}
