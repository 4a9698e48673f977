use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "oncopanel", about = "Concurrent multi-source prediction aggregator")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one prediction orchestration over a patient record.
    Run(RunArgs),
    /// Print a sample patient record to start from.
    Example,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Path to the patient record JSON file.
    #[arg(long)]
    pub patient: String,

    /// Selected drug identifier. Can be specified multiple times.
    #[arg(long = "drug", action = clap::ArgAction::Append)]
    pub drugs: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Per-task deadline override in seconds; 0 disables the deadline.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print settlement events to stderr as slots resolve.
    #[arg(long)]
    pub stream: bool,
}
