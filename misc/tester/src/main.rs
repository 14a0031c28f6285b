use anyhow::Result;
use clap::Parser;
use omi_tester::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logger(cli.verbose);

    match cli.command {
        Some(Commands::Timestamp { hour }) => timestamp(hour),
        None => {
            let scenario = scenario::load(cli.scenario)?;
            let report = scenario::run(&scenario)?;
            log::info!(
                "{} steps as expected, {} not",
                report.passed,
                report.failed.len()
            );
            anyhow::ensure!(report.is_success(), "Failed steps: {:?}", report.failed);
            Ok(())
        },
    }
}
