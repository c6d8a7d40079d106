use clap::Parser;

use log::{error, info};
use std::process::ExitCode;

use linemod2yolo::{process_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!(
        "Converting LineMOD from {} to YOLO format at {}...",
        args.source_dir.display(),
        args.output_dir.display()
    );

    match process_dataset(&args) {
        Ok(stats) if stats.failed_samples > 0 => {
            error!("{} samples failed to convert", stats.failed_samples);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
