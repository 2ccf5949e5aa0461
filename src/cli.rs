use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "credit-limits",
    about = "Back-office tool for credit limit change requests",
    version
)]
pub struct Cli {
    /// CSV file with applications (overrides CREDIT_LIMITS_SEED)
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive terminal UI (default)
    Ui,

    /// Print applications as a table
    List {
        /// all, new, approved or rejected
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Case-insensitive name search
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Check a proposed limit and reason
    Validate {
        /// Proposed limit; omit to check an empty field
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Reason, e.g. "Income increase" or special_risk
        #[arg(short, long)]
        reason: Option<String>,
    },
}
