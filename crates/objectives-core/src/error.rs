//! Error types for objective definitions and answer handling.
//!
//! `ConfigurationError` is a defect in a hard-coded or loaded definition and
//! must be fixed at the source. `InvalidAnswerError` is a rejected update
//! that leaves the task untouched. `GateError` covers the lookups and
//! lockout checks performed by the session.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::task::TaskKind;

/// A definition that would make a gate unpassable or trivially passable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// An exam task was built without any option.
    #[error("exam task '{topic}' has no options")]
    NoOptions { topic: String },

    /// An exam task has options but none of them is correct.
    #[error("exam task '{topic}' has no correct option")]
    NoCorrectOption { topic: String },

    /// A task was built with an empty topic.
    #[error("task topic must not be empty")]
    EmptyTopic,

    /// An objective produced no tasks during setup.
    #[error("objective '{objective}' has no tasks")]
    NoTasks { objective: String },

    /// Two tasks of one objective share a topic.
    #[error("objective '{objective}' defines topic '{topic}' more than once")]
    DuplicateTopic { objective: String, topic: String },

    /// Two objectives in one session share a name.
    #[error("duplicate objective name: {0}")]
    DuplicateObjective(String),
}

/// An answer that references an option the task does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("answer for '{topic}' selects option {index}, but only {option_count} options exist")]
pub struct InvalidAnswerError {
    pub topic: String,
    pub index: usize,
    pub option_count: usize,
}

/// Failures surfaced by the gating session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InvalidAnswer(#[from] InvalidAnswerError),

    #[error("unknown objective: {0}")]
    UnknownObjective(String),

    #[error("objective '{objective}' has no task with topic '{topic}'")]
    UnknownTask { objective: String, topic: String },

    #[error("task '{topic}' is not of kind '{expected}'")]
    WrongTaskKind { topic: String, expected: TaskKind },

    /// The task rejected an answer recently and is closed for submissions.
    #[error("task '{topic}' is locked until {until}")]
    TaskLocked { topic: String, until: DateTime<Utc> },
}
