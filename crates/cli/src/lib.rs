pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "expenso",
    about = "Expenso operator CLI",
    long_about = "Operate Expenso migrations, config inspection, readiness checks, and offline expense checks.",
    after_help = "Examples:\n  expenso doctor --json\n  expenso config\n  expenso check expenses.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, policy search readiness, and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Validate, categorize, and summarize a JSON file of expenses offline")]
    Check {
        #[arg(help = "Path to a JSON file with an array of expenses")]
        file: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Check { file } => commands::check::run(&file),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
