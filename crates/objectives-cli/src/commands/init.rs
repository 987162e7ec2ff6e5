//! The `objectives init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create objectives.toml
    if std::path::Path::new("objectives.toml").exists() {
        println!("objectives.toml already exists, skipping.");
    } else {
        std::fs::write("objectives.toml", SAMPLE_CONFIG)?;
        println!("Created objectives.toml");
    }

    // Create example definition
    std::fs::create_dir_all("objectives.d")?;
    let example_path = std::path::Path::new("objectives.d/example.toml");
    if example_path.exists() {
        println!("objectives.d/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DEFINITION)?;
        println!("Created objectives.d/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit objectives.toml to choose where progress is stored");
    println!("  2. Run: objectives validate --definitions objectives.d");
    println!("  3. Run: objectives show --objective exam");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# objectives configuration

definitions_dir = "./objectives.d"
wrong_answer_lockout_secs = 3600

[store]
type = "file"
path = "./objectives-progress.json"

[strings]
objectives_exam_objective = "Prove your understanding"
objectives_exam_gate = "Answer every question correctly to unlock automation"
"#;

const EXAMPLE_DEFINITION: &str = r#"[objective]
name = "example"
title = "objectives_example_objective"
gate = "objectives_example_gate"

[[tasks]]
kind = "exam"
topic = "units"
question = "units_question"
explanation = "units_explanation"
hints = ["units_hint1"]
options = [
    { label = "units_mgdl", correct = true },
    { label = "units_mmol", correct = true },
    { label = "units_percent", correct = false },
]

[[tasks]]
kind = "action"
topic = "profile_switch"
title = "objectives_profileswitch"
hints = ["profile_switch_hint"]
"#;
