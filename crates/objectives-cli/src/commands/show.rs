//! The `objectives show` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use objectives_core::error::GateError;
use objectives_core::task::Task;
use objectives_core::traits::TextLookup;

use super::{format_time, open_engine};

pub async fn execute(config_path: Option<PathBuf>, name: String) -> Result<()> {
    let (engine, config) = open_engine(config_path).await?;
    let strings = &config.strings;
    let objective = engine
        .session()
        .objective(&name)
        .ok_or_else(|| GateError::UnknownObjective(name.clone()))?;
    let now = Utc::now();

    println!("{} [{}]", strings.text(objective.title()), objective.state());
    println!("{}", strings.text(objective.gate()));

    for (position, task) in objective.tasks().iter().enumerate() {
        let mark = if task.is_completed() { "done" } else { "open" };
        println!(
            "\n{}. ({}) {} [{mark}]",
            position + 1,
            task.topic(),
            strings.text(task.title())
        );

        match task {
            Task::Exam(exam) => {
                println!("   {}", strings.text(exam.explanation()));
                for (index, option) in exam.options().iter().enumerate() {
                    let selected = if exam.answer().contains(&index) { "x" } else { " " };
                    println!("   [{selected}] {index}: {}", strings.text(option.label()));
                }
                if exam.is_locked(now) {
                    if let Some(until) = exam.locked_until() {
                        println!("   Locked until {}", format_time(until));
                    }
                }
            }
            Task::Action(action) => {
                if let Some(done_at) = action.done_at() {
                    println!("   Performed at {}", format_time(done_at));
                }
            }
        }

        for hint in task.hints() {
            println!("   Hint: {}", strings.text(hint.text()));
        }
    }

    Ok(())
}
