//! Tasks: the individual requirements an objective is made of.
//!
//! `Task` is a closed enum with one evaluation arm per kind. Adding a kind
//! means adding a variant and letting the compiler point at every `match`
//! that has to learn about it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, InvalidAnswerError};
use crate::model::{AnswerOption, AnswerSet, Hint, SymbolicKey};

/// Discriminator for the task variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// A multiple-choice question.
    Exam,
    /// Something the user has to do in the host application.
    Action,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Exam => write!(f, "exam"),
            TaskKind::Action => write!(f, "action"),
        }
    }
}

/// A requirement that must be satisfied before its objective counts as
/// accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Exam(ExamTask),
    Action(ActionTask),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Exam(_) => TaskKind::Exam,
            Task::Action(_) => TaskKind::Action,
        }
    }

    /// Key under which the task's progress is persisted.
    pub fn topic(&self) -> &str {
        match self {
            Task::Exam(exam) => exam.topic(),
            Task::Action(action) => action.topic(),
        }
    }

    /// Display key of the task's headline (the question for exams).
    pub fn title(&self) -> &SymbolicKey {
        match self {
            Task::Exam(exam) => exam.question(),
            Task::Action(action) => action.title(),
        }
    }

    pub fn hints(&self) -> &[Hint] {
        match self {
            Task::Exam(exam) => exam.hints(),
            Task::Action(action) => action.hints(),
        }
    }

    pub fn is_completed(&self) -> bool {
        match self {
            Task::Exam(exam) => exam.is_completed(),
            Task::Action(action) => action.is_completed(),
        }
    }

    pub fn as_exam(&self) -> Option<&ExamTask> {
        match self {
            Task::Exam(exam) => Some(exam),
            _ => None,
        }
    }

    pub fn as_exam_mut(&mut self) -> Option<&mut ExamTask> {
        match self {
            Task::Exam(exam) => Some(exam),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionTask> {
        match self {
            Task::Action(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_action_mut(&mut self) -> Option<&mut ActionTask> {
        match self {
            Task::Action(action) => Some(action),
            _ => None,
        }
    }

    /// Drop all user progress held by the task.
    pub(crate) fn reset(&mut self) {
        match self {
            Task::Exam(exam) => {
                exam.clear_answer();
                exam.unlock();
            }
            Task::Action(action) => action.done_at = None,
        }
    }
}

impl From<ExamTask> for Task {
    fn from(exam: ExamTask) -> Self {
        Task::Exam(exam)
    }
}

impl From<ActionTask> for Task {
    fn from(action: ActionTask) -> Self {
        Task::Action(action)
    }
}

// ---------------------------------------------------------------------------
// Exam task
// ---------------------------------------------------------------------------

/// A multiple-choice question. Completed only when the recorded answer is
/// exactly the set of correct options: no partial credit, no extra picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamTask {
    question: SymbolicKey,
    explanation: SymbolicKey,
    topic: String,
    options: Vec<AnswerOption>,
    hints: Vec<Hint>,
    answer: AnswerSet,
    locked_until: Option<DateTime<Utc>>,
}

impl ExamTask {
    /// Start describing a question. Options and hints are appended with the
    /// builder's fluent calls, in display order.
    pub fn builder(
        question: impl Into<SymbolicKey>,
        explanation: impl Into<SymbolicKey>,
        topic: impl Into<String>,
    ) -> ExamTaskBuilder {
        ExamTaskBuilder {
            question: question.into(),
            explanation: explanation.into(),
            topic: topic.into(),
            options: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn question(&self) -> &SymbolicKey {
        &self.question
    }

    pub fn explanation(&self) -> &SymbolicKey {
        &self.explanation
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    /// The currently recorded selection.
    pub fn answer(&self) -> &AnswerSet {
        &self.answer
    }

    /// Indices of every option flagged correct.
    pub fn correct_answer(&self) -> AnswerSet {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_correct())
            .map(|(index, _)| index)
            .collect()
    }

    /// Replace the recorded selection.
    ///
    /// Every index is bounds-checked before anything is stored; on error the
    /// previous answer is kept. Returns whether the stored answer changed.
    pub fn record_answer<I>(&mut self, selected: I) -> Result<bool, InvalidAnswerError>
    where
        I: IntoIterator<Item = usize>,
    {
        let selected: AnswerSet = selected.into_iter().collect();
        self.check_selection(&selected)?;

        if selected == self.answer {
            return Ok(false);
        }
        self.answer = selected;
        Ok(true)
    }

    /// Reject a selection that references an option the task does not have.
    pub fn check_selection(&self, selected: &AnswerSet) -> Result<(), InvalidAnswerError> {
        match selected.iter().find(|&&i| i >= self.options.len()) {
            Some(&index) => Err(InvalidAnswerError {
                topic: self.topic.clone(),
                index,
                option_count: self.options.len(),
            }),
            None => Ok(()),
        }
    }

    pub fn clear_answer(&mut self) {
        self.answer.clear();
    }

    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.is_answered() && self.answer == self.correct_answer()
    }

    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.locked_until
    }

    /// Close the task for submissions until `until`.
    pub fn lock_until(&mut self, until: DateTime<Utc>) {
        self.locked_until = Some(until);
    }

    pub fn unlock(&mut self) {
        self.locked_until = None;
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }
}

/// Collects options and hints for an [`ExamTask`] and validates them once.
#[derive(Debug, Clone)]
pub struct ExamTaskBuilder {
    question: SymbolicKey,
    explanation: SymbolicKey,
    topic: String,
    options: Vec<AnswerOption>,
    hints: Vec<Hint>,
}

impl ExamTaskBuilder {
    pub fn option(mut self, option: AnswerOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }

    /// Finish the question. A question nobody can pass is rejected here.
    pub fn build(self) -> Result<ExamTask, ConfigurationError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigurationError::EmptyTopic);
        }
        if self.options.is_empty() {
            return Err(ConfigurationError::NoOptions { topic: self.topic });
        }
        if !self.options.iter().any(AnswerOption::is_correct) {
            return Err(ConfigurationError::NoCorrectOption { topic: self.topic });
        }

        Ok(ExamTask {
            question: self.question,
            explanation: self.explanation,
            topic: self.topic,
            options: self.options,
            hints: self.hints,
            answer: AnswerSet::new(),
            locked_until: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Action task
// ---------------------------------------------------------------------------

/// A requirement fulfilled by doing something in the host application.
/// The host reports it through the session; the first report wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTask {
    title: SymbolicKey,
    topic: String,
    hints: Vec<Hint>,
    done_at: Option<DateTime<Utc>>,
}

impl ActionTask {
    pub fn new(
        title: impl Into<SymbolicKey>,
        topic: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(ConfigurationError::EmptyTopic);
        }
        Ok(Self {
            title: title.into(),
            topic,
            hints: Vec::new(),
            done_at: None,
        })
    }

    pub fn hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }

    pub fn title(&self) -> &SymbolicKey {
        &self.title
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    pub fn done_at(&self) -> Option<DateTime<Utc>> {
        self.done_at
    }

    /// Mark the action as performed. Returns `false` if it already was.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.done_at.is_some() {
            return false;
        }
        self.done_at = Some(now);
        true
    }

    pub fn is_completed(&self) -> bool {
        self.done_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn dia_question() -> ExamTask {
        ExamTask::builder("dia_meaningofdia", "dia_whatmeansdia", "dia")
            .option(AnswerOption::wrong("dia_minimumis3h"))
            .option(AnswerOption::correct("dia_minimumis5h"))
            .option(AnswerOption::wrong("dia_meaningisequaltodiapump"))
            .option(AnswerOption::correct("dia_valuemustbedetermined"))
            .hint(Hint::new("dia_hint1"))
            .build()
            .unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn correct_answer_lists_flagged_indices() {
        let task = dia_question();
        assert_eq!(task.correct_answer(), AnswerSet::from([1, 3]));
        assert_eq!(task.hints().len(), 1);
        assert_eq!(task.options().len(), 4);
    }

    #[test]
    fn unanswered_is_not_completed() {
        let task = dia_question();
        assert!(!task.is_answered());
        assert!(!task.is_completed());
    }

    #[test]
    fn exact_match_completes() {
        let mut task = dia_question();
        assert!(task.record_answer([3, 1]).unwrap());
        assert!(task.is_completed());
    }

    #[test]
    fn superset_and_subset_fail() {
        let mut task = dia_question();
        task.record_answer([0, 1, 3]).unwrap();
        assert!(!task.is_completed());

        task.record_answer([1]).unwrap();
        assert!(!task.is_completed());
    }

    #[test]
    fn recording_same_answer_twice_is_a_no_op() {
        let mut task = dia_question();
        assert!(task.record_answer([1, 3]).unwrap());
        assert!(!task.record_answer([1, 3]).unwrap());
        assert!(task.is_completed());
    }

    #[test]
    fn out_of_range_index_keeps_previous_answer() {
        let mut task = dia_question();
        task.record_answer([1, 3]).unwrap();

        let err = task.record_answer([1, 4]).unwrap_err();
        assert_eq!(err.index, 4);
        assert_eq!(err.option_count, 4);
        assert_eq!(task.answer(), &AnswerSet::from([1, 3]));
        assert!(task.is_completed());
    }

    #[test]
    fn clearing_resets_completion() {
        let mut task = dia_question();
        task.record_answer([1, 3]).unwrap();
        task.clear_answer();
        assert!(!task.is_completed());
    }

    #[test]
    fn builder_rejects_empty_options() {
        let err = ExamTask::builder("q", "e", "empty").build().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NoOptions {
                topic: "empty".into()
            }
        );
    }

    #[test]
    fn builder_rejects_missing_correct_option() {
        let err = ExamTask::builder("q", "e", "allwrong")
            .option(AnswerOption::wrong("a"))
            .option(AnswerOption::wrong("b"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::NoCorrectOption { .. }));
    }

    #[test]
    fn builder_rejects_blank_topic() {
        let err = ExamTask::builder("q", "e", "  ")
            .option(AnswerOption::correct("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTopic);
    }

    #[test]
    fn lock_expires() {
        let mut task = dia_question();
        task.lock_until(at(10));
        assert!(task.is_locked(at(9)));
        assert!(!task.is_locked(at(10)));
        task.unlock();
        assert!(!task.is_locked(at(9)));
    }

    #[test]
    fn lock_does_not_affect_completion() {
        let mut task = dia_question();
        task.record_answer([1, 3]).unwrap();
        task.lock_until(at(12));
        assert!(task.is_completed());
    }

    #[test]
    fn action_first_completion_wins() {
        let mut action = ActionTask::new("objectives_action_title", "loop").unwrap();
        assert!(!action.is_completed());
        assert!(action.complete(at(8)));
        assert!(!action.complete(at(8) + Duration::hours(1)));
        assert_eq!(action.done_at(), Some(at(8)));
    }

    #[test]
    fn task_enum_dispatch() {
        let mut task: Task = dia_question().into();
        assert_eq!(task.kind(), TaskKind::Exam);
        assert_eq!(task.topic(), "dia");
        assert_eq!(task.title().as_str(), "dia_meaningofdia");
        assert!(task.as_action().is_none());

        task.as_exam_mut().unwrap().record_answer([1, 3]).unwrap();
        assert!(task.is_completed());
        task.reset();
        assert!(!task.is_completed());

        let action: Task = ActionTask::new("t", "a").unwrap().into();
        assert_eq!(action.kind(), TaskKind::Action);
        assert!(action.as_exam().is_none());
    }

    #[test]
    fn task_kind_display() {
        assert_eq!(TaskKind::Exam.to_string(), "exam");
        assert_eq!(TaskKind::Action.to_string(), "action");
    }
}
