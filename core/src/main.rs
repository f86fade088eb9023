use clap::error::ErrorKind;
use clap::Parser;
use log::{error, info};
use skullstrip_core::cli::Cli;
use skullstrip_core::{run, RunOptions, SurfaceEvolutionExtractor, TextReport};
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors exit with 1 rather than clap's default 2
            e.print().ok();
            process::exit(1);
        }
    };

    setup_logging();

    let extractor = SurfaceEvolutionExtractor::new();
    match run(&cli.file, &RunOptions::default(), &extractor) {
        Ok(report) => {
            info!("Finished {}", cli.file.display());
            println!("{}", TextReport::new(&report));
        }
        Err(e) => {
            error!("Skull stripping failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
