use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// The outcome of running one rule.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The name of the rule that produced these errors.
    pub name: String,
    /// One entry per violation, in the order they were found. Empty if the rule passed.
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new(name: impl Into<String>, errors: Vec<String>) -> ValidationResult {
        ValidationResult {
            name: name.into(),
            errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.errors.iter()
    }
}

impl IntoIterator for ValidationResult {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Helpers over the full set of results of a validation pass.
pub trait ValidationResults {
    /// True if any rule reported at least one error.
    fn has_errors(&self) -> bool;

    /// The total number of errors across all the rules.
    fn count_errors(&self) -> usize;
}

impl ValidationResults for [ValidationResult] {
    fn has_errors(&self) -> bool {
        self.iter().any(|r| r.has_errors())
    }

    fn count_errors(&self) -> usize {
        self.iter().map(|r| r.len()).sum()
    }
}

impl ValidationResults for Vec<ValidationResult> {
    fn has_errors(&self) -> bool {
        self.as_slice().has_errors()
    }

    fn count_errors(&self) -> usize {
        self.as_slice().count_errors()
    }
}

/// Raised when a vote does not pass validation.
///
/// Carries the result of every rule, including the ones that passed, so that
/// all the violations can be shown at once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ValidationErrors {
    pub results: Vec<ValidationResult>,
}

impl ValidationErrors {
    /// The results that contain at least one error.
    pub fn failed(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.has_errors())
    }
}

impl Error for ValidationErrors {}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation failed with {} error(s)",
            self.results.count_errors()
        )?;
        for r in self.failed() {
            write!(f, "\n{}:", r.name)?;
            for e in r.iter() {
                write!(f, "\n  - {}", e)?;
            }
        }
        Ok(())
    }
}
