//! objectives CLI: inspect and pass the gates in front of advanced features.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "objectives",
    version,
    about = "Objective gates that unlock features after an exam"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every objective and whether its gate is open
    Status {
        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the tasks of one objective
    Show {
        /// Objective name (e.g. "exam")
        #[arg(long)]
        objective: String,
    },

    /// Answer an exam question
    Answer {
        /// Objective name
        #[arg(long)]
        objective: String,

        /// Task topic (e.g. "dia")
        #[arg(long)]
        topic: String,

        /// Selected option indices (comma-separated, e.g. "1,3")
        #[arg(long, value_delimiter = ',', num_args = 0.., required = true)]
        select: Vec<usize>,
    },

    /// Mark an action task as performed
    Action {
        /// Objective name
        #[arg(long)]
        objective: String,

        /// Task topic
        #[arg(long)]
        topic: String,
    },

    /// Reset progress of an objective
    Reset {
        /// Objective name
        #[arg(long, required_unless_present = "all")]
        objective: Option<String>,

        /// Reset every objective and wipe stored progress
        #[arg(long, conflicts_with = "objective")]
        all: bool,
    },

    /// Validate objective definition TOML files
    Validate {
        /// Path to a definition file or directory
        #[arg(long)]
        definitions: PathBuf,
    },

    /// Create a starter config and example definition
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("objectives=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Status { json } => commands::status::execute(config, json).await,
        Commands::Show { objective } => commands::show::execute(config, objective).await,
        Commands::Answer {
            objective,
            topic,
            select,
        } => commands::answer::execute(config, objective, topic, select).await,
        Commands::Action { objective, topic } => {
            commands::action::execute(config, objective, topic).await
        }
        Commands::Reset { objective, all } => {
            commands::reset::execute(config, objective, all).await
        }
        Commands::Validate { definitions } => commands::validate::execute(definitions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
