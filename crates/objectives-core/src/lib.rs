//! objectives-core: Objective, task and exam gating engine.
//!
//! This crate defines the gate data model, the exact-match answer
//! evaluation, the built-in exam gate and the session that tracks a user's
//! progress towards unlocking gated functionality.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod objective;
pub mod parser;
pub mod progress;
pub mod session;
pub mod task;
pub mod traits;

pub use error::{ConfigurationError, GateError, InvalidAnswerError};
pub use model::{AnswerOption, AnswerSet, Hint, SymbolicKey};
pub use objective::{Objective, ObjectiveDefinition, ObjectiveState};
pub use session::{GatingSession, TaskOutcome};
pub use task::{ActionTask, ExamTask, Task, TaskKind};
