mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::edit::EditArgs;
use commands::pricing::{PlanArgs, ScheduleArgs, TierArgs};

/// Installment plan pricing
#[derive(Parser)]
#[command(
    name = "ipe",
    version,
    about = "Installment plan pricing",
    long_about = "A CLI for pricing installment plans with decimal precision. Supports \
                  flat-rate, reducing-balance and Islamic-profit tiers, plan-wide \
                  repricing, repayment schedules and replaying form edits."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a single tier
    Tier(TierArgs),
    /// Price every tier of a plan
    Plan(PlanArgs),
    /// Month-by-month repayment schedule for a tier
    Schedule(ScheduleArgs),
    /// Replay a sequence of form edits against a plan
    Edit(EditArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Tier(args) => commands::pricing::run_tier(args),
        Commands::Plan(args) => commands::pricing::run_plan(args),
        Commands::Schedule(args) => commands::pricing::run_schedule(args),
        Commands::Edit(args) => commands::edit::run_edit(args),
        Commands::Version => {
            println!("ipe {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
