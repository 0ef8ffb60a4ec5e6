//! Shutterline CLI: inspect and rehearse render jobs.
//!
//! Usage:
//!   shutterline validate <JOB>    Validate a job file
//!   shutterline plan <JOB>        Show the rolling shutter exposure schedule
//!   shutterline rows <JOB>        List the exposure steps of one target frame
//!   shutterline simulate <JOB>    Run a job against the dry-run host

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shutterline_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "shutterline",
    about = "Rolling shutter exposure scheduling and frame rendering",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job file
    Validate {
        /// Path to the job file
        job: PathBuf,
    },

    /// Show the rolling shutter exposure schedule of a job
    Plan {
        /// Path to the job file
        job: PathBuf,

        /// Target frame to anchor the schedule at
        #[arg(long, default_value = "0")]
        frame: i64,

        /// Worker offset into the read-out loop (default: the job's)
        #[arg(long)]
        offset: Option<u32>,

        /// Worker count the read-out loop is split across (default: the job's)
        #[arg(long)]
        step: Option<u32>,

        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the exposure steps of one target frame
    Rows {
        /// Path to the job file
        job: PathBuf,

        /// Target frame
        #[arg(long, default_value = "0")]
        frame: i64,

        /// Worker offset into the read-out loop
        #[arg(long, default_value = "0")]
        offset: u32,

        /// Worker count the read-out loop is split across
        #[arg(long, default_value = "1")]
        step: u32,

        /// Also list the exposed sensor rows of every step
        #[arg(long)]
        rows: bool,
    },

    /// Run a job against the dry-run host, writing placeholder outputs
    Simulate {
        /// Path to the job file
        job: PathBuf,

        /// Use the rolling shutter render loop
        #[arg(long)]
        rolling_shutter: bool,

        /// Re-render outputs that already exist
        #[arg(long)]
        overwrite: bool,

        /// Write outputs here instead of the job's target directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    shutterline_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Validate { job } => commands::validate::run(job),
        Commands::Plan {
            job,
            frame,
            offset,
            step,
            json,
        } => commands::plan::run(job, frame, offset, step, json),
        Commands::Rows {
            job,
            frame,
            offset,
            step,
            rows,
        } => commands::rows::run(job, frame, offset, step, rows),
        Commands::Simulate {
            job,
            rolling_shutter,
            overwrite,
            output,
        } => commands::simulate::run(&config, job, rolling_shutter, overwrite, output),
    }
}
