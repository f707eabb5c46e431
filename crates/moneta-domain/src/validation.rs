//! Structured collection of non-fatal validation issues.

use std::fmt;

use thiserror::Error;

use crate::budget::Budget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One reported issue, keyed by field name or overall (`field == None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Ordered list of issues collected during contextual validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    issues: Vec<Issue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// All issues, in insertion order.
    pub fn all_issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    /// Issues attached to a named field.
    pub fn field_issues<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.field.as_deref() == Some(name))
    }

    /// Issues not attached to any particular field.
    pub fn overall_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.field.is_none())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Read-only view of a budget plus the result being built up.
pub struct ValidationContext<'a> {
    budget: &'a Budget,
    result: &'a mut ValidationResult,
}

impl<'a> ValidationContext<'a> {
    pub fn new(budget: &'a Budget, result: &'a mut ValidationResult) -> Self {
        Self { budget, result }
    }

    pub fn budget(&self) -> &Budget {
        self.budget
    }

    pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
        self.result.push(Issue {
            severity: Severity::Error,
            field: field.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: Option<&str>, message: impl Into<String>) {
        self.result.push(Issue {
            severity: Severity::Warning,
            field: field.map(str::to_string),
            message: message.into(),
        });
    }
}

/// Raised when validation errors are promoted to a failure; warnings alone
/// never produce this.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationFailed(ValidationResult);

impl ValidationFailed {
    pub fn new(result: ValidationResult) -> Self {
        Self(result)
    }

    pub fn result(&self) -> &ValidationResult {
        &self.0
    }
}

fn summary(result: &ValidationResult) -> String {
    result
        .errors()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
