mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::AmortizationArgs;
use commands::appraisal::{AppraisalArgs, CashFlowsArgs};

/// Loan amortization schedules and investment appraisal
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Loan amortization schedules and investment appraisal",
    long_about = "A CLI for building loan amortization schedules (SAC, French/Price, \
                  American) and appraising investments (NPV, IRR, discounted payback) \
                  with decimal precision."
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
    /// Build a loan amortization schedule (SAC, SAF/Price, SAA)
    Amortization(AmortizationArgs),
    /// Appraise an investment: NPV, IRR and discounted payback
    Appraisal(AppraisalArgs),
    /// Emit a zero-valued cash-flow series for a project horizon
    CashFlows(CashFlowsArgs),
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
        Commands::Amortization(args) => commands::amortization::run_amortization(args),
        Commands::Appraisal(args) => commands::appraisal::run_appraisal(args),
        Commands::CashFlows(args) => commands::appraisal::run_cash_flows(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
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
