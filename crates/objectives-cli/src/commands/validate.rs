//! The `objectives validate` command.

use std::path::PathBuf;

use anyhow::Result;

use objectives_core::parser::{self, Severity};

pub fn execute(definitions_path: PathBuf) -> Result<()> {
    let templates = if definitions_path.is_dir() {
        parser::load_objective_directory(&definitions_path)?
    } else {
        vec![parser::parse_objective(&definitions_path)?]
    };

    let mut total_warnings = 0;
    let mut total_errors = 0;

    for template in &templates {
        println!(
            "Objective: {} ({} tasks)",
            template.objective.name,
            template.tasks.len()
        );

        for w in parser::validate_template(template) {
            let prefix = w
                .topic
                .as_ref()
                .map(|topic| format!("  [{topic}]"))
                .unwrap_or_else(|| "  ".to_string());
            match w.severity {
                Severity::Warning => {
                    println!("{prefix} WARNING: {}", w.message);
                    total_warnings += 1;
                }
                Severity::Error => {
                    println!("{prefix} ERROR: {}", w.message);
                    total_errors += 1;
                }
            }
        }
    }

    if total_errors > 0 {
        anyhow::bail!("{total_errors} definition error(s) found");
    }

    if total_warnings == 0 {
        println!("All definitions valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
