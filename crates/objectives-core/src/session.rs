//! The gating session: the ordered set of objectives one user works through.
//!
//! The session is the single owner of objective and task state. It assumes
//! callers serialize access (one answer at a time); it defines no locks.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::catalog::builtin_objectives;
use crate::error::{ConfigurationError, GateError};
use crate::model::AnswerSet;
use crate::objective::Objective;
use crate::progress::{ObjectiveProgress, ProgressSnapshot};
use crate::task::{Task, TaskKind};

/// What a submission changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    /// The stored task state differs from before the call.
    pub changed: bool,
    /// The task is completed after the call.
    pub completed: bool,
    /// The owning objective has every task completed.
    pub accomplished: bool,
    /// This call moved the objective from pending to accomplished.
    pub newly_accomplished: bool,
    /// Submissions to the task are refused until this instant.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Ordered objectives plus the policy applied to submissions.
#[derive(Debug, Clone)]
pub struct GatingSession {
    id: Uuid,
    objectives: Vec<Objective>,
    lockout: Option<Duration>,
}

impl GatingSession {
    pub fn new(objectives: Vec<Objective>) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for objective in &objectives {
            if !seen.insert(objective.name()) {
                return Err(ConfigurationError::DuplicateObjective(
                    objective.name().to_string(),
                ));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            objectives,
            lockout: None,
        })
    }

    /// A session over the built-in objectives.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::new(builtin_objectives()?)
    }

    /// Lock an exam task for `lockout` after each new incorrect answer.
    /// A zero or negative duration disables the lock.
    pub fn with_lockout(mut self, lockout: Duration) -> Self {
        self.lockout = (lockout > Duration::zero()).then_some(lockout);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn objective(&self, name: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.name() == name)
    }

    fn objective_mut(&mut self, name: &str) -> Result<&mut Objective, GateError> {
        self.objectives
            .iter_mut()
            .find(|o| o.name() == name)
            .ok_or_else(|| GateError::UnknownObjective(name.to_string()))
    }

    fn require(&self, name: &str) -> Result<&Objective, GateError> {
        self.objective(name)
            .ok_or_else(|| GateError::UnknownObjective(name.to_string()))
    }

    /// Pure check: every task of the objective is completed right now.
    pub fn is_accomplished(&self, name: &str) -> Result<bool, GateError> {
        Ok(self.require(name)?.is_accomplished())
    }

    /// Gate query for downstream constraint logic. Once an objective has
    /// been accomplished it stays unlocked until an administrative reset.
    pub fn is_unlocked(&self, name: &str) -> Result<bool, GateError> {
        let objective = self.require(name)?;
        Ok(objective.accomplished_at().is_some() || objective.is_accomplished())
    }

    /// Replace the answer of an exam task and re-evaluate its objective.
    pub fn record_answer<I>(
        &mut self,
        name: &str,
        topic: &str,
        selected: I,
        now: DateTime<Utc>,
    ) -> Result<TaskOutcome, GateError>
    where
        I: IntoIterator<Item = usize>,
    {
        let lockout = self.lockout;
        let objective = self.objective_mut(name)?;

        let (changed, completed, locked_until) = {
            let exam = objective
                .task_mut(topic)
                .ok_or_else(|| unknown_task(name, topic))?
                .as_exam_mut()
                .ok_or_else(|| GateError::WrongTaskKind {
                    topic: topic.to_string(),
                    expected: TaskKind::Exam,
                })?;

            // Malformed input is reported before the lock.
            let selected: AnswerSet = selected.into_iter().collect();
            exam.check_selection(&selected)?;

            if let Some(until) = exam.locked_until().filter(|_| exam.is_locked(now)) {
                return Err(GateError::TaskLocked {
                    topic: topic.to_string(),
                    until,
                });
            }

            let changed = exam.record_answer(selected)?;
            let completed = exam.is_completed();
            if changed && !completed {
                if let Some(lockout) = lockout {
                    exam.lock_until(now + lockout);
                }
            }
            let locked_until = exam.locked_until().filter(|&until| now < until);
            (changed, completed, locked_until)
        };

        objective.start(now);
        let newly_accomplished = objective.evaluate(now);
        tracing::debug!(
            objective = name,
            topic,
            changed,
            completed,
            "answer recorded"
        );

        Ok(TaskOutcome {
            changed,
            completed,
            accomplished: objective.is_accomplished(),
            newly_accomplished,
            locked_until,
        })
    }

    /// Report that the user performed the action behind an action task.
    pub fn complete_action(
        &mut self,
        name: &str,
        topic: &str,
        now: DateTime<Utc>,
    ) -> Result<TaskOutcome, GateError> {
        let objective = self.objective_mut(name)?;

        let changed = objective
            .task_mut(topic)
            .ok_or_else(|| unknown_task(name, topic))?
            .as_action_mut()
            .ok_or_else(|| GateError::WrongTaskKind {
                topic: topic.to_string(),
                expected: TaskKind::Action,
            })?
            .complete(now);

        objective.start(now);
        let newly_accomplished = objective.evaluate(now);
        tracing::debug!(objective = name, topic, changed, "action completed");

        Ok(TaskOutcome {
            changed,
            completed: true,
            accomplished: objective.is_accomplished(),
            newly_accomplished,
            locked_until: None,
        })
    }

    /// Administrative reset of one objective back to pending.
    pub fn reset(&mut self, name: &str) -> Result<(), GateError> {
        self.objective_mut(name)?.reset();
        tracing::info!(objective = name, "objective reset");
        Ok(())
    }

    /// Capture the persisted shape of every objective with progress.
    pub fn snapshot(&self, now: DateTime<Utc>) -> ProgressSnapshot {
        let mut snapshot = ProgressSnapshot::new(self.id, now);

        for objective in &self.objectives {
            let mut progress = ObjectiveProgress {
                started_at: objective.started_at(),
                accomplished_at: objective.accomplished_at(),
                ..Default::default()
            };

            for task in objective.tasks() {
                match task {
                    Task::Exam(exam) => {
                        if exam.is_answered() {
                            progress
                                .answers
                                .insert(exam.topic().to_string(), exam.answer().clone());
                        }
                        if let Some(until) = exam.locked_until().filter(|&until| now < until) {
                            progress
                                .locked_until
                                .insert(exam.topic().to_string(), until);
                        }
                    }
                    Task::Action(action) => {
                        if let Some(done_at) = action.done_at() {
                            progress
                                .actions_done
                                .insert(action.topic().to_string(), done_at);
                        }
                    }
                }
            }

            if !progress.is_empty() {
                snapshot
                    .objectives
                    .insert(objective.name().to_string(), progress);
            }
        }

        snapshot
    }

    /// Apply persisted progress. Entries that no longer fit the current
    /// definitions are skipped with a warning. Returns how many task entries
    /// were applied.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) -> usize {
        self.id = snapshot.session_id;
        let mut applied = 0;

        for (name, progress) in &snapshot.objectives {
            let Ok(objective) = self.objective_mut(name) else {
                tracing::warn!(objective = %name, "skipping progress for unknown objective");
                continue;
            };
            objective.reset();

            for (topic, answer) in &progress.answers {
                match objective.task_mut(topic).and_then(Task::as_exam_mut) {
                    Some(exam) => match exam.record_answer(answer.iter().copied()) {
                        Ok(_) => applied += 1,
                        Err(e) => tracing::warn!(objective = %name, "skipping answer: {e}"),
                    },
                    None => tracing::warn!(
                        objective = %name,
                        topic = %topic,
                        "skipping answer for unknown exam task"
                    ),
                }
            }

            for (topic, until) in &progress.locked_until {
                if let Some(exam) = objective.task_mut(topic).and_then(Task::as_exam_mut) {
                    exam.lock_until(*until);
                }
            }

            for (topic, done_at) in &progress.actions_done {
                match objective.task_mut(topic).and_then(Task::as_action_mut) {
                    Some(action) => {
                        action.complete(*done_at);
                        applied += 1;
                    }
                    None => tracing::warn!(
                        objective = %name,
                        topic = %topic,
                        "skipping unknown action task"
                    ),
                }
            }

            objective.restore_timestamps(progress.started_at, progress.accomplished_at);
            objective.evaluate(snapshot.saved_at);
        }

        applied
    }

    /// Answer currently recorded for an exam task.
    pub fn answer(&self, name: &str, topic: &str) -> Result<&AnswerSet, GateError> {
        self.require(name)?
            .task(topic)
            .ok_or_else(|| unknown_task(name, topic))?
            .as_exam()
            .map(|exam| exam.answer())
            .ok_or_else(|| GateError::WrongTaskKind {
                topic: topic.to_string(),
                expected: TaskKind::Exam,
            })
    }
}

fn unknown_task(objective: &str, topic: &str) -> GateError {
    GateError::UnknownTask {
        objective: objective.to_string(),
        topic: topic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EXAM_NAME;
    use crate::error::InvalidAnswerError;
    use crate::parser::parse_objective_str;
    use chrono::TimeZone;
    use std::path::Path;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
    }

    fn pass_exam(session: &mut GatingSession) {
        session.record_answer(EXAM_NAME, "dia", [1, 3], at(1)).unwrap();
        session.record_answer(EXAM_NAME, "hypott", [0, 1], at(2)).unwrap();
        session
            .record_answer(EXAM_NAME, "offlineprofile", [0, 2], at(3))
            .unwrap();
    }

    fn with_action() -> GatingSession {
        let template = parse_objective_str(
            r#"
[objective]
name = "loop"
title = "objectives_loop_objective"
gate = "objectives_loop_gate"

[[tasks]]
kind = "action"
topic = "enable_loop"
title = "objectives_enableloop"
"#,
            Path::new("loop.toml"),
        )
        .unwrap();
        let mut objectives = builtin_objectives().unwrap();
        objectives.push(template.build().unwrap());
        GatingSession::new(objectives).unwrap()
    }

    #[test]
    fn passing_the_exam_unlocks_the_gate() {
        let mut session = GatingSession::builtin().unwrap();
        assert!(!session.is_unlocked(EXAM_NAME).unwrap());

        session.record_answer(EXAM_NAME, "dia", [1, 3], at(1)).unwrap();
        session.record_answer(EXAM_NAME, "hypott", [0, 1], at(2)).unwrap();
        let outcome = session
            .record_answer(EXAM_NAME, "offlineprofile", [0, 2], at(3))
            .unwrap();

        assert!(outcome.completed);
        assert!(outcome.accomplished);
        assert!(outcome.newly_accomplished);
        assert!(session.is_accomplished(EXAM_NAME).unwrap());
        assert!(session.is_unlocked(EXAM_NAME).unwrap());
        let exam = session.objective(EXAM_NAME).unwrap();
        assert_eq!(exam.started_at(), Some(at(1)));
        assert_eq!(exam.accomplished_at(), Some(at(3)));
    }

    #[test]
    fn over_selection_keeps_the_gate_pending() {
        let mut session = GatingSession::builtin().unwrap();
        pass_exam(&mut session);
        session.reset(EXAM_NAME).unwrap();

        session
            .record_answer(EXAM_NAME, "dia", [0, 1, 3], at(4))
            .unwrap();
        session.record_answer(EXAM_NAME, "hypott", [0, 1], at(4)).unwrap();
        let outcome = session
            .record_answer(EXAM_NAME, "offlineprofile", [0, 2], at(4))
            .unwrap();
        assert!(!outcome.accomplished);
        assert!(!session.is_unlocked(EXAM_NAME).unwrap());
    }

    #[test]
    fn repeated_answer_is_idempotent() {
        let mut session = GatingSession::builtin().unwrap();
        let first = session.record_answer(EXAM_NAME, "dia", [1, 3], at(1)).unwrap();
        let second = session.record_answer(EXAM_NAME, "dia", [1, 3], at(2)).unwrap();
        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.completed, second.completed);
    }

    #[test]
    fn unlocked_stays_unlocked_when_answers_change() {
        let mut session = GatingSession::builtin().unwrap();
        pass_exam(&mut session);
        session.record_answer(EXAM_NAME, "dia", [0], at(9)).unwrap();
        assert!(!session.is_accomplished(EXAM_NAME).unwrap());
        assert!(session.is_unlocked(EXAM_NAME).unwrap());
    }

    #[test]
    fn out_of_range_answer_is_rejected_and_previous_kept() {
        let mut session = GatingSession::builtin().unwrap();
        session.record_answer(EXAM_NAME, "dia", [1, 3], at(1)).unwrap();
        let err = session
            .record_answer(EXAM_NAME, "dia", [1, 9], at(2))
            .unwrap_err();
        assert_eq!(
            err,
            GateError::InvalidAnswer(InvalidAnswerError {
                topic: "dia".into(),
                index: 9,
                option_count: 4,
            })
        );
        assert_eq!(
            session.answer(EXAM_NAME, "dia").unwrap(),
            &AnswerSet::from([1, 3])
        );
    }

    #[test]
    fn unknown_names_are_reported() {
        let mut session = GatingSession::builtin().unwrap();
        assert_eq!(
            session.record_answer("nope", "dia", [0], at(0)).unwrap_err(),
            GateError::UnknownObjective("nope".into())
        );
        assert!(matches!(
            session.record_answer(EXAM_NAME, "nope", [0], at(0)),
            Err(GateError::UnknownTask { .. })
        ));
        assert!(session.is_unlocked("nope").is_err());
    }

    #[test]
    fn wrong_task_kind_is_reported() {
        let mut session = with_action();
        assert!(matches!(
            session.complete_action(EXAM_NAME, "dia", at(0)),
            Err(GateError::WrongTaskKind {
                expected: TaskKind::Action,
                ..
            })
        ));
        assert!(matches!(
            session.record_answer("loop", "enable_loop", [0], at(0)),
            Err(GateError::WrongTaskKind {
                expected: TaskKind::Exam,
                ..
            })
        ));
    }

    #[test]
    fn action_completion_accomplishes_single_task_objective() {
        let mut session = with_action();
        let outcome = session.complete_action("loop", "enable_loop", at(5)).unwrap();
        assert!(outcome.changed);
        assert!(outcome.newly_accomplished);

        let again = session.complete_action("loop", "enable_loop", at(6)).unwrap();
        assert!(!again.changed);
        assert!(!again.newly_accomplished);
        assert!(session.is_unlocked("loop").unwrap());
    }

    #[test]
    fn wrong_answer_locks_the_task() {
        let mut session = GatingSession::builtin()
            .unwrap()
            .with_lockout(Duration::minutes(10));

        let outcome = session.record_answer(EXAM_NAME, "dia", [0], at(0)).unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.locked_until, Some(at(10)));

        let err = session
            .record_answer(EXAM_NAME, "dia", [1, 3], at(5))
            .unwrap_err();
        assert!(matches!(err, GateError::TaskLocked { until, .. } if until == at(10)));

        let outcome = session
            .record_answer(EXAM_NAME, "dia", [1, 3], at(10))
            .unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.locked_until, None);
    }

    #[test]
    fn out_of_range_answer_beats_active_lock() {
        let mut session = GatingSession::builtin()
            .unwrap()
            .with_lockout(Duration::minutes(10));
        session.record_answer(EXAM_NAME, "dia", [0], at(0)).unwrap();

        let err = session
            .record_answer(EXAM_NAME, "dia", [1, 9], at(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GateError::InvalidAnswer(InvalidAnswerError { index: 9, .. })
        ));
        assert!(matches!(
            session.record_answer(EXAM_NAME, "dia", [1, 3], at(1)),
            Err(GateError::TaskLocked { .. })
        ));
    }

    #[test]
    fn snapshot_drops_expired_locks() {
        let mut session = GatingSession::builtin()
            .unwrap()
            .with_lockout(Duration::minutes(10));
        session.record_answer(EXAM_NAME, "dia", [0], at(0)).unwrap();

        let active = session.snapshot(at(5));
        assert_eq!(active.objectives[EXAM_NAME].locked_until["dia"], at(10));

        let expired = session.snapshot(at(20));
        assert!(expired.objectives[EXAM_NAME].locked_until.is_empty());
        assert_eq!(expired.objectives[EXAM_NAME].answers.len(), 1);
    }

    #[test]
    fn lock_is_per_task() {
        let mut session = GatingSession::builtin()
            .unwrap()
            .with_lockout(Duration::minutes(10));
        session.record_answer(EXAM_NAME, "dia", [0], at(0)).unwrap();
        assert!(session
            .record_answer(EXAM_NAME, "hypott", [0, 1], at(1))
            .is_ok());
    }

    #[test]
    fn zero_lockout_is_disabled() {
        let mut session = GatingSession::builtin()
            .unwrap()
            .with_lockout(Duration::zero());
        session.record_answer(EXAM_NAME, "dia", [0], at(0)).unwrap();
        assert!(session.record_answer(EXAM_NAME, "dia", [1, 3], at(0)).is_ok());
    }

    #[test]
    fn duplicate_objectives_are_rejected() {
        let mut objectives = builtin_objectives().unwrap();
        objectives.extend(builtin_objectives().unwrap());
        assert_eq!(
            GatingSession::new(objectives).unwrap_err(),
            ConfigurationError::DuplicateObjective(EXAM_NAME.into())
        );
    }

    #[test]
    fn snapshot_then_restore_reproduces_progress() {
        let mut session = with_action().with_lockout(Duration::minutes(10));
        pass_exam(&mut session);
        session.complete_action("loop", "enable_loop", at(4)).unwrap();
        let snapshot = session.snapshot(at(5));
        assert_eq!(snapshot.objectives.len(), 2);

        let mut restored = with_action();
        assert_eq!(restored.restore(&snapshot), 4);
        assert_eq!(restored.id(), session.id());
        assert!(restored.is_unlocked(EXAM_NAME).unwrap());
        assert!(restored.is_unlocked("loop").unwrap());
        assert_eq!(
            restored.objective(EXAM_NAME).unwrap().accomplished_at(),
            Some(at(3))
        );
    }

    #[test]
    fn snapshot_skips_untouched_objectives() {
        let session = GatingSession::builtin().unwrap();
        assert!(session.snapshot(at(0)).objectives.is_empty());
    }

    #[test]
    fn restore_skips_stale_entries() {
        let mut snapshot = ProgressSnapshot::new(Uuid::nil(), at(0));
        let mut exam = ObjectiveProgress::default();
        exam.answers.insert("dia".into(), AnswerSet::from([1, 3]));
        exam.answers.insert("hypott".into(), AnswerSet::from([0, 7]));
        exam.answers.insert("retired".into(), AnswerSet::from([0]));
        snapshot.objectives.insert(EXAM_NAME.into(), exam);
        snapshot
            .objectives
            .insert("retired".into(), ObjectiveProgress::default());

        let mut session = GatingSession::builtin().unwrap();
        assert_eq!(session.restore(&snapshot), 1);
        assert_eq!(
            session.answer(EXAM_NAME, "dia").unwrap(),
            &AnswerSet::from([1, 3])
        );
        assert!(session.answer(EXAM_NAME, "hypott").unwrap().is_empty());
    }

    #[test]
    fn restore_stamps_complete_but_unstamped_progress() {
        let mut snapshot = ProgressSnapshot::new(Uuid::nil(), at(30));
        let mut exam = ObjectiveProgress::default();
        exam.answers.insert("dia".into(), AnswerSet::from([1, 3]));
        exam.answers.insert("hypott".into(), AnswerSet::from([0, 1]));
        exam.answers
            .insert("offlineprofile".into(), AnswerSet::from([0, 2]));
        snapshot.objectives.insert(EXAM_NAME.into(), exam);

        let mut session = GatingSession::builtin().unwrap();
        session.restore(&snapshot);
        assert_eq!(
            session.objective(EXAM_NAME).unwrap().accomplished_at(),
            Some(at(30))
        );
    }

    #[test]
    fn reset_unknown_objective_fails() {
        let mut session = GatingSession::builtin().unwrap();
        assert!(session.reset("nope").is_err());
    }
}
