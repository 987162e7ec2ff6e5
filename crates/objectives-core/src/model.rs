//! Value types shared by tasks and objectives.
//!
//! Everything here is an immutable descriptor: the keys are handed to an
//! external text lookup for display and are never interpreted by the engine.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Indices of the options a user selected for one exam task.
pub type AnswerSet = BTreeSet<usize>;

/// An opaque identifier that an external collaborator resolves to
/// localized display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolicKey(String);

impl SymbolicKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolicKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for SymbolicKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// One selectable answer choice of an exam question.
///
/// Several options of the same question may be correct at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    label: SymbolicKey,
    correct: bool,
}

impl AnswerOption {
    pub fn new(label: impl Into<SymbolicKey>, correct: bool) -> Self {
        Self {
            label: label.into(),
            correct,
        }
    }

    /// An option that belongs to the correct answer set.
    pub fn correct(label: impl Into<SymbolicKey>) -> Self {
        Self::new(label, true)
    }

    /// An option that must not be selected.
    pub fn wrong(label: impl Into<SymbolicKey>) -> Self {
        Self::new(label, false)
    }

    pub fn label(&self) -> &SymbolicKey {
        &self.label
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }
}

/// Advisory text shown next to a task. Never affects completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    text: SymbolicKey,
}

impl Hint {
    pub fn new(text: impl Into<SymbolicKey>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &SymbolicKey {
        &self.text
    }
}
