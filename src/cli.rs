use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rma-analytics")]
#[command(
    about = "Warranty RMA analytics: overdue cases, part hot spots, exports",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Analytics configuration (JSON); defaults apply to missing fields
    #[arg(long, global = true, env = "RMA_ANALYTICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to the current time
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List overdue RMAs with summary, breakdown and recommendations
    Overdue {
        /// RMA records (.json array or .csv with header row)
        input: PathBuf,

        /// Overdue threshold in days (30, 45, 60 or 90)
        #[arg(short, long)]
        days: Option<u32>,

        /// Case status filter ("all" or a status name)
        #[arg(short, long)]
        status: Option<String>,

        /// Keep negative day counts for future-dated records
        #[arg(long)]
        include_future: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Aggregate RMAs by part with priority scores and site breakdowns
    Parts {
        /// RMA records (.json array or .csv with header row)
        input: PathBuf,

        /// Comments (.json array) used for the latest comment per site
        #[arg(long)]
        comments: Option<PathBuf>,

        /// Sort order: priority, avgPendingDays, pendingCount, activeSites, totalCost, name
        #[arg(long, default_value = "priority")]
        sort: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export RMA records as CSV
    ExportCsv {
        /// RMA records (.json array or .csv with header row)
        input: PathBuf,

        /// Quote CR/LF as well (RFC 4180) instead of the default comma/quote rule
        #[arg(long)]
        rfc4180: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate and import RMA records, reporting per-row errors
    Import {
        /// File to import (.json array or .csv with header row)
        input: PathBuf,

        /// Existing RMA records (.json); their numbers count as duplicates
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Write the accepted records as a JSON array
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with an error when any row fails
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}
