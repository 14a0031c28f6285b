pub mod chain;
pub mod config;
pub mod scenario;
pub mod utils;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Runs OMI sale scenarios on a local chain
#[derive(Parser, Debug)]
#[command(name = "OmiTester", version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Scenario file to run
    #[arg(short, long, value_name = "FILE", default_value = "scenarios/omi_sale.json")]
    pub scenario: PathBuf,

    /// Log at debug level
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// current timestamp plus h
    Timestamp {
        #[arg(short = 'o', long, default_value = "24")]
        hour: i64,
    },
}

/// Prints the current time and the timestamp `h` hours later.
pub fn timestamp(h: i64) -> anyhow::Result<()> {
    anyhow::ensure!(h >= 0, "Invalid hour");

    let utc_datetime = chrono::Utc::now();
    println!("{} <= UTC", utc_datetime.to_rfc3339());
    println!("current timestamp: {:?}", utc_datetime.timestamp_millis());

    let later = utc_datetime + chrono::Duration::hours(h);
    println!("{h:?} hour later: {} ({:?})", later.to_rfc3339(), later.timestamp_millis());
    Ok(())
}
