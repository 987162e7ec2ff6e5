//! Objectives: named gates composed of tasks.
//!
//! An objective is built once from an [`ObjectiveDefinition`], which lays out
//! its fixed task list. Afterwards only task progress changes. The objective
//! moves from `Pending` to `Accomplished` the first time every task reports
//! completed, and stays there until an explicit administrative reset.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::SymbolicKey;
use crate::task::Task;

/// Declarative description of a gate: its identity and the tasks that must
/// be proven to pass it.
pub trait ObjectiveDefinition {
    /// Symbolic name, also the persistence key (e.g. "exam").
    fn name(&self) -> &str;

    /// Display key of the objective's title.
    fn title(&self) -> SymbolicKey;

    /// Display key explaining what passing the gate unlocks.
    fn gate(&self) -> SymbolicKey;

    /// Append every task of the objective, fully configured, in display
    /// order. Called exactly once per constructed objective.
    fn setup_tasks(&self, tasks: &mut Vec<Task>) -> Result<(), ConfigurationError>;
}

/// Gate state as seen by downstream constraint logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveState {
    Pending,
    Accomplished,
}

impl fmt::Display for ObjectiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveState::Pending => write!(f, "pending"),
            ObjectiveState::Accomplished => write!(f, "accomplished"),
        }
    }
}

/// A named gate and the tasks it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    name: String,
    title: SymbolicKey,
    gate: SymbolicKey,
    tasks: Vec<Task>,
    started_at: Option<DateTime<Utc>>,
    accomplished_at: Option<DateTime<Utc>>,
}

impl Objective {
    /// Build an objective by running the definition's task setup.
    pub fn from_definition(
        definition: &dyn ObjectiveDefinition,
    ) -> Result<Self, ConfigurationError> {
        let mut tasks = Vec::new();
        definition.setup_tasks(&mut tasks)?;

        let name = definition.name().to_string();
        if tasks.is_empty() {
            return Err(ConfigurationError::NoTasks { objective: name });
        }

        let mut seen = HashSet::new();
        for task in &tasks {
            if !seen.insert(task.topic()) {
                return Err(ConfigurationError::DuplicateTopic {
                    objective: name,
                    topic: task.topic().to_string(),
                });
            }
        }

        Ok(Self {
            name,
            title: definition.title(),
            gate: definition.gate(),
            tasks,
            started_at: None,
            accomplished_at: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &SymbolicKey {
        &self.title
    }

    pub fn gate(&self) -> &SymbolicKey {
        &self.gate
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, topic: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.topic() == topic)
    }

    pub(crate) fn task_mut(&mut self, topic: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.topic() == topic)
    }

    /// `true` iff every task is completed. Pure function of task state.
    pub fn is_accomplished(&self) -> bool {
        self.tasks.iter().all(Task::is_completed)
    }

    pub fn state(&self) -> ObjectiveState {
        if self.accomplished_at.is_some() {
            ObjectiveState::Accomplished
        } else {
            ObjectiveState::Pending
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn accomplished_at(&self) -> Option<DateTime<Utc>> {
        self.accomplished_at
    }

    /// Number of completed tasks and total tasks.
    pub fn progress(&self) -> (usize, usize) {
        let completed = self.tasks.iter().filter(|t| t.is_completed()).count();
        (completed, self.tasks.len())
    }

    /// Record when the user first engaged with the objective.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at.get_or_insert(now);
    }

    /// Re-check the tasks and stamp `accomplished_at` on the first pass.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> bool {
        if self.accomplished_at.is_some() || !self.is_accomplished() {
            return false;
        }
        self.accomplished_at = Some(now);
        tracing::debug!(objective = %self.name, "all tasks completed");
        true
    }

    pub(crate) fn restore_timestamps(
        &mut self,
        started_at: Option<DateTime<Utc>>,
        accomplished_at: Option<DateTime<Utc>>,
    ) {
        self.started_at = started_at;
        self.accomplished_at = accomplished_at;
    }

    /// Administrative reset: clears all task progress and timestamps.
    pub(crate) fn reset(&mut self) {
        for task in &mut self.tasks {
            task.reset();
        }
        self.started_at = None;
        self.accomplished_at = None;
    }
}
