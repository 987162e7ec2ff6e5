//! Gate engine: a gating session bound to a progress store.
//!
//! Every accepted change is persisted right away, so a restart resumes from
//! the last answer. Rejected submissions never touch the store. A change
//! whose save fails is rolled back, so memory never runs ahead of the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use crate::error::GateError;
use crate::session::{GatingSession, TaskOutcome};
use crate::traits::ProgressStore;

/// Configuration for the gate engine.
#[derive(Debug, Clone, Default)]
pub struct GateEngineConfig {
    /// How long an exam task refuses submissions after a wrong answer.
    /// `None` disables the lock.
    pub lockout: Option<Duration>,
}

/// Observer of gate events.
pub trait GateObserver: Send + Sync {
    fn on_answer(&self, objective: &str, topic: &str, outcome: &TaskOutcome);
    fn on_rejected(&self, objective: &str, topic: &str, error: &GateError);
    fn on_accomplished(&self, objective: &str, at: DateTime<Utc>);
    fn on_reset(&self, objective: &str);
}

/// No-op observer.
pub struct NoopObserver;

impl GateObserver for NoopObserver {
    fn on_answer(&self, _: &str, _: &str, _: &TaskOutcome) {}
    fn on_rejected(&self, _: &str, _: &str, _: &GateError) {}
    fn on_accomplished(&self, _: &str, _: DateTime<Utc>) {}
    fn on_reset(&self, _: &str) {}
}

/// The gate engine.
pub struct GateEngine {
    session: GatingSession,
    store: Arc<dyn ProgressStore>,
}

impl GateEngine {
    /// Bind `session` to `store` and restore whatever progress it holds.
    pub async fn open(
        session: GatingSession,
        store: Arc<dyn ProgressStore>,
        config: GateEngineConfig,
    ) -> Result<Self> {
        let mut session = match config.lockout {
            Some(lockout) => session.with_lockout(lockout),
            None => session,
        };

        let snapshot = store
            .load()
            .await
            .with_context(|| format!("failed to load progress from {} store", store.name()))?;
        if let Some(snapshot) = snapshot {
            let applied = session.restore(&snapshot);
            tracing::info!(
                store = store.name(),
                applied,
                saved_at = %snapshot.saved_at,
                "restored progress"
            );
        }

        Ok(Self { session, store })
    }

    pub fn session(&self) -> &GatingSession {
        &self.session
    }

    /// Whether every task of the objective is completed right now.
    pub fn is_accomplished(&self, objective: &str) -> Result<bool> {
        Ok(self.session.is_accomplished(objective)?)
    }

    /// Gate query: may the functionality behind `objective` be used?
    pub fn is_unlocked(&self, objective: &str) -> Result<bool> {
        Ok(self.session.is_unlocked(objective)?)
    }

    pub async fn submit_answer(
        &mut self,
        objective: &str,
        topic: &str,
        selected: &[usize],
        observer: &dyn GateObserver,
    ) -> Result<TaskOutcome> {
        self.submit_answer_at(objective, topic, selected, Utc::now(), observer)
            .await
    }

    /// Record an exam answer at a given instant, persist, and notify.
    pub async fn submit_answer_at(
        &mut self,
        objective: &str,
        topic: &str,
        selected: &[usize],
        now: DateTime<Utc>,
        observer: &dyn GateObserver,
    ) -> Result<TaskOutcome> {
        let before = self.session.clone();
        let result = self
            .session
            .record_answer(objective, topic, selected.iter().copied(), now);
        self.finish(before, objective, topic, result, now, observer)
            .await
    }

    pub async fn complete_action(
        &mut self,
        objective: &str,
        topic: &str,
        observer: &dyn GateObserver,
    ) -> Result<TaskOutcome> {
        self.complete_action_at(objective, topic, Utc::now(), observer)
            .await
    }

    /// Mark an action task as performed at a given instant, persist, and
    /// notify.
    pub async fn complete_action_at(
        &mut self,
        objective: &str,
        topic: &str,
        now: DateTime<Utc>,
        observer: &dyn GateObserver,
    ) -> Result<TaskOutcome> {
        let before = self.session.clone();
        let result = self.session.complete_action(objective, topic, now);
        self.finish(before, objective, topic, result, now, observer)
            .await
    }

    async fn finish(
        &mut self,
        before: GatingSession,
        objective: &str,
        topic: &str,
        result: Result<TaskOutcome, GateError>,
        now: DateTime<Utc>,
        observer: &dyn GateObserver,
    ) -> Result<TaskOutcome> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(objective, topic, "submission rejected: {e}");
                observer.on_rejected(objective, topic, &e);
                return Err(e.into());
            }
        };

        if outcome.changed || outcome.newly_accomplished {
            self.persist_or_restore(before, now).await?;
        }

        observer.on_answer(objective, topic, &outcome);
        if outcome.newly_accomplished {
            tracing::info!(objective, "objective accomplished");
            observer.on_accomplished(objective, now);
        }

        Ok(outcome)
    }

    /// Administrative reset of one objective.
    pub async fn reset(&mut self, objective: &str, observer: &dyn GateObserver) -> Result<()> {
        let before = self.session.clone();
        self.session.reset(objective)?;
        self.persist_or_restore(before, Utc::now()).await?;
        observer.on_reset(objective);
        Ok(())
    }

    /// Administrative reset of every objective; also wipes the store.
    pub async fn reset_all(&mut self, observer: &dyn GateObserver) -> Result<()> {
        let names: Vec<String> = self
            .session
            .objectives()
            .iter()
            .map(|o| o.name().to_string())
            .collect();
        let before = self.session.clone();
        for name in &names {
            self.session.reset(name)?;
        }
        if let Err(e) = self.store.clear().await {
            self.session = before;
            return Err(e)
                .with_context(|| format!("failed to clear {} store", self.store.name()));
        }
        for name in &names {
            observer.on_reset(name);
        }
        Ok(())
    }

    /// Save the current session. On failure the session goes back to
    /// `before` so a retry of the same change is seen as new again.
    async fn persist_or_restore(
        &mut self,
        before: GatingSession,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let snapshot = self.session.snapshot(now);
        if let Err(e) = self.store.save(&snapshot).await {
            tracing::warn!(store = self.store.name(), "save failed, change rolled back");
            self.session = before;
            let store = self.store.name();
            return Err(e).with_context(|| format!("failed to save progress to {store} store"));
        }
        Ok(())
    }
}
