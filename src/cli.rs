//! CLI argument parsing for revisit.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rv",
    about = "Spaced review scheduling for a folder of notes",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/revisit/logs/revisit.log"
)]
pub struct Cli {
    /// Path to the notes folder (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config file (default: <dir>/.revisit/config.yaml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start reviewing a note
    Add {
        /// Note path, relative to the notes folder
        path: String,

        /// Days until the first review (default from config)
        #[arg(short, long, allow_negative_numbers = true)]
        interval: Option<i64>,
    },

    /// Record how a review went
    Review {
        /// Note path
        path: String,

        /// again, hard, good, easy or postpone (1-4 also accepted)
        outcome: String,
    },

    /// Stop reviewing a note
    Remove {
        /// Note path
        path: String,
    },

    /// Show one tracked note
    Show {
        /// Note path
        path: String,
    },

    /// List tracked notes
    List {
        /// Sort order (next, difficulty, streak)
        #[arg(short, long, default_value = "next")]
        sort: String,

        /// Only titles containing this text
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Only notes that are due
        #[arg(short, long)]
        overdue: bool,
    },

    /// Show the notes due for review now
    Due {
        /// Override the batch size from config
        #[arg(short = 'n', long)]
        max: Option<usize>,
    },

    /// Collection and activity statistics
    Stats,

    /// Notes due on each of the coming days
    Forecast {
        /// Number of days
        #[arg(short = 'n', long, default_value = "7")]
        days: u32,
    },

    /// Notes due on each day of a week, plus notes overdue from earlier days
    Calendar {
        /// Weeks from today (negative for past weeks)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        offset: i32,
    },

    /// Review activity over recent weeks
    Heatmap {
        /// Number of weeks
        #[arg(short, long, default_value = "12")]
        weeks: u32,
    },

    /// Notes with high difficulty or a broken streak
    AtRisk {
        /// Maximum number of notes
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },

    /// Write all review data as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all review data with an exported JSON file
    Import {
        /// File to import
        file: PathBuf,
    },

    /// Bring in review data from older formats
    Migrate {
        /// Standalone JSON data file from an earlier version
        #[arg(long)]
        legacy: Option<PathBuf>,

        /// Scan note frontmatter for spaced-repetition blocks
        #[arg(long)]
        frontmatter: bool,
    },

    /// Keep running and announce when notes become due
    Remind {
        /// Seconds between checks
        #[arg(short, long, default_value = "300")]
        every: u64,
    },
}
