//! TOML objective definitions.
//!
//! Lets a deployment describe additional gates as data instead of code.
//! A definition file holds one `[objective]` header and a `[[tasks]]` list:
//!
//! ```toml
//! [objective]
//! name = "exam"
//! title = "objectives_exam_objective"
//! gate = "objectives_exam_gate"
//!
//! [[tasks]]
//! kind = "exam"
//! topic = "dia"
//! question = "dia_meaningofdia"
//! explanation = "dia_whatmeansdia"
//! hints = ["dia_hint1"]
//! options = [
//!     { label = "dia_minimumis3h", correct = false },
//!     { label = "dia_minimumis5h", correct = true },
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::{AnswerOption, Hint, SymbolicKey};
use crate::objective::{Objective, ObjectiveDefinition};
use crate::task::{ActionTask, ExamTask, Task};

/// An objective definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveTemplate {
    pub objective: ObjectiveHeader,
    #[serde(default)]
    pub tasks: Vec<TaskTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveHeader {
    pub name: String,
    pub title: String,
    pub gate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskTemplate {
    Exam {
        topic: String,
        question: String,
        #[serde(default)]
        explanation: String,
        #[serde(default)]
        options: Vec<OptionTemplate>,
        #[serde(default)]
        hints: Vec<String>,
    },
    Action {
        topic: String,
        title: String,
        #[serde(default)]
        hints: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionTemplate {
    pub label: String,
    #[serde(default)]
    pub correct: bool,
}

impl TaskTemplate {
    pub fn topic(&self) -> &str {
        match self {
            TaskTemplate::Exam { topic, .. } | TaskTemplate::Action { topic, .. } => topic,
        }
    }

    fn to_task(&self) -> Result<Task, ConfigurationError> {
        match self {
            TaskTemplate::Exam {
                topic,
                question,
                explanation,
                options,
                hints,
            } => {
                let mut builder = ExamTask::builder(
                    question.as_str(),
                    explanation.as_str(),
                    topic.as_str(),
                );
                for option in options {
                    builder =
                        builder.option(AnswerOption::new(option.label.as_str(), option.correct));
                }
                for hint in hints {
                    builder = builder.hint(Hint::new(hint.as_str()));
                }
                Ok(builder.build()?.into())
            }
            TaskTemplate::Action {
                topic,
                title,
                hints,
            } => {
                let action = hints.iter().fold(
                    ActionTask::new(title.as_str(), topic.as_str())?,
                    |action, hint| action.hint(Hint::new(hint.as_str())),
                );
                Ok(action.into())
            }
        }
    }
}

impl ObjectiveDefinition for ObjectiveTemplate {
    fn name(&self) -> &str {
        &self.objective.name
    }

    fn title(&self) -> SymbolicKey {
        self.objective.title.as_str().into()
    }

    fn gate(&self) -> SymbolicKey {
        self.objective.gate.as_str().into()
    }

    fn setup_tasks(&self, tasks: &mut Vec<Task>) -> Result<(), ConfigurationError> {
        for template in &self.tasks {
            tasks.push(template.to_task()?);
        }
        Ok(())
    }
}

impl ObjectiveTemplate {
    /// Build the objective described by this template.
    pub fn build(&self) -> Result<Objective, ConfigurationError> {
        Objective::from_definition(self)
    }
}

/// Parse a single TOML file into an `ObjectiveTemplate`.
pub fn parse_objective(path: &Path) -> Result<ObjectiveTemplate> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read objective file: {}", path.display()))?;

    parse_objective_str(&content, path)
}

/// Parse a TOML string into an `ObjectiveTemplate` (useful for testing).
pub fn parse_objective_str(content: &str, source_path: &Path) -> Result<ObjectiveTemplate> {
    let template: ObjectiveTemplate = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    anyhow::ensure!(
        !template.objective.name.trim().is_empty(),
        "objective name is empty in {}",
        source_path.display()
    );

    Ok(template)
}

/// Recursively load all `.toml` objective files from a directory, in path
/// order. Files that fail to parse are skipped with a warning.
pub fn load_objective_directory(dir: &Path) -> Result<Vec<ObjectiveTemplate>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    let mut templates = Vec::new();
    for path in paths {
        if path.is_dir() {
            templates.extend(load_objective_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_objective(&path) {
                Ok(template) => templates.push(template),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(templates)
}

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The gate works but is probably not what was intended.
    Warning,
    /// The gate cannot be built.
    Error,
}

/// A finding from template validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub severity: Severity,
    /// The task topic (if applicable).
    pub topic: Option<String>,
    pub message: String,
}

/// Validate a template for defects and suspicious content.
pub fn validate_template(template: &ObjectiveTemplate) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Err(e) = template.build() {
        warnings.push(ValidationWarning {
            severity: Severity::Error,
            topic: None,
            message: e.to_string(),
        });
    }

    for task in &template.tasks {
        let TaskTemplate::Exam {
            topic,
            options,
            hints,
            ..
        } = task
        else {
            continue;
        };
        let warn = |message: String| ValidationWarning {
            severity: Severity::Warning,
            topic: Some(topic.clone()),
            message,
        };

        if !options.is_empty() && options.iter().all(|o| o.correct) {
            warnings.push(warn(
                "every option is correct, selecting all of them passes".into(),
            ));
        }

        if hints.is_empty() {
            warnings.push(warn("no hints provided".into()));
        }

        let mut seen = HashSet::new();
        for option in options {
            if !seen.insert(option.label.as_str()) {
                warnings.push(warn(format!("duplicate option label: {}", option.label)));
            }
        }
    }

    warnings
}
