//! Built-in objectives.
//!
//! The exam gate is described as a static table so its content can be
//! reviewed and diffed as data. `ExamGate` turns the table into tasks.

use crate::error::ConfigurationError;
use crate::model::{AnswerOption, Hint, SymbolicKey};
use crate::objective::{Objective, ObjectiveDefinition};
use crate::task::{ExamTask, Task};

/// One row of an exam table.
#[derive(Debug, Clone, Copy)]
pub struct ExamQuestion {
    pub topic: &'static str,
    pub question: &'static str,
    pub explanation: &'static str,
    /// `(label key, is correct)` in display order.
    pub options: &'static [(&'static str, bool)],
    pub hints: &'static [&'static str],
}

impl ExamQuestion {
    pub fn to_task(&self) -> Result<ExamTask, ConfigurationError> {
        let builder = self.options.iter().fold(
            ExamTask::builder(self.question, self.explanation, self.topic),
            |builder, &(label, correct)| builder.option(AnswerOption::new(label, correct)),
        );
        self.hints
            .iter()
            .fold(builder, |builder, &text| builder.hint(Hint::new(text)))
            .build()
    }
}

pub const EXAM_NAME: &str = "exam";

/// Questions of the "exam" gate: insulin action duration, hypo treatment
/// target timing and offline profile selection.
pub const EXAM_QUESTIONS: &[ExamQuestion] = &[
    ExamQuestion {
        topic: "dia",
        question: "dia_meaningofdia",
        explanation: "dia_whatmeansdia",
        options: &[
            ("dia_minimumis3h", false),
            ("dia_minimumis5h", true),
            ("dia_meaningisequaltodiapump", false),
            ("dia_valuemustbedetermined", true),
        ],
        hints: &["dia_hint1"],
    },
    ExamQuestion {
        topic: "hypott",
        question: "hypott",
        explanation: "hypott_whenhypott",
        options: &[
            ("hypott_goinglow", true),
            ("hypott_havinglow", true),
            ("hypott_notlowanymorebutrising", false),
            ("hypott_havehadalowbg", false),
        ],
        hints: &["hypott_hint1"],
    },
    ExamQuestion {
        topic: "offlineprofile",
        question: "offlineprofile",
        explanation: "offlineprofile_whatprofile",
        options: &[
            ("localprofile", true),
            ("nsprofile", false),
            ("offlineprofile_nsprofile", true),
        ],
        hints: &["offlineprofile_hint1"],
    },
];

/// The "exam" gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamGate;

impl ObjectiveDefinition for ExamGate {
    fn name(&self) -> &str {
        EXAM_NAME
    }

    fn title(&self) -> SymbolicKey {
        "objectives_exam_objective".into()
    }

    fn gate(&self) -> SymbolicKey {
        "objectives_exam_gate".into()
    }

    fn setup_tasks(&self, tasks: &mut Vec<Task>) -> Result<(), ConfigurationError> {
        for question in EXAM_QUESTIONS {
            tasks.push(question.to_task()?.into());
        }
        Ok(())
    }
}

/// Every built-in objective, in the order they are presented.
pub fn builtin_objectives() -> Result<Vec<Objective>, ConfigurationError> {
    Ok(vec![Objective::from_definition(&ExamGate)?])
}
