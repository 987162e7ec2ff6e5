//! Persisted progress.
//!
//! A snapshot is the value exchanged with a progress store: per objective,
//! the timestamps and, per task topic, the recorded answer set, any active
//! lock and the completion time of action tasks. The storage format is the
//! store's business; JSON helpers are provided because every store in this
//! workspace uses them.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::AnswerSet;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Progress of every objective in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub version: u32,
    /// Identifies the gating session the progress belongs to.
    pub session_id: Uuid,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub objectives: BTreeMap<String, ObjectiveProgress>,
}

/// Progress of one objective, keyed by task topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveProgress {
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accomplished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerSet>,
    #[serde(default)]
    pub locked_until: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub actions_done: BTreeMap<String, DateTime<Utc>>,
}

impl ObjectiveProgress {
    /// `true` when nothing worth persisting has happened yet.
    pub fn is_empty(&self) -> bool {
        self.started_at.is_none()
            && self.accomplished_at.is_none()
            && self.answers.is_empty()
            && self.locked_until.is_empty()
            && self.actions_done.is_empty()
    }
}

impl ProgressSnapshot {
    pub fn new(session_id: Uuid, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session_id,
            saved_at,
            objectives: BTreeMap::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize progress snapshot")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: ProgressSnapshot =
            serde_json::from_str(content).context("failed to parse progress snapshot JSON")?;
        anyhow::ensure!(
            snapshot.version <= SNAPSHOT_VERSION,
            "unsupported progress snapshot version {} (newest known is {})",
            snapshot.version,
            SNAPSHOT_VERSION
        );
        Ok(snapshot)
    }
}
