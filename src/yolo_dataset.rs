use indicatif::ProgressBar;
use log::{error, info};
use rayon::prelude::*;

use crate::config::{check_split, Args};
use crate::conversion::process_sample;
use crate::dataset::LinemodDataset;
use crate::error::{DatasetError, Result};
use crate::io::{audit_output_pairs, create_dataset_yaml, setup_output_directories};
use crate::types::{OutputDirs, Partition, ProcessingStats};
use crate::utils::create_progress_bar;

/// Main conversion pipeline: scan, write every sample, emit dataset.yaml.
///
/// Fails before writing anything if the source directory is missing or the
/// train split is outside `(0, 1)`. A failed sample aborts the run unless
/// `args.keep_going` is set.
pub fn process_dataset(args: &Args) -> Result<ProcessingStats> {
    check_split(args.train_split).map_err(|reason| {
        DatasetError::configuration(format!("invalid train_split {}: {}", args.train_split, reason))
    })?;
    if !args.source_dir.is_dir() {
        return Err(DatasetError::configuration(format!(
            "source directory not found: {}",
            args.source_dir.display()
        )));
    }

    let output_dirs = setup_output_directories(&args.output_dir)?;
    let dataset = LinemodDataset::open(&args.source_dir)?;
    info!("Converting {} samples...", dataset.len());

    let pb = create_progress_bar(dataset.len() as u64, "Convert");
    let stats = if args.jobs > 1 {
        convert_parallel(&dataset, &output_dirs, args, &pb)?
    } else {
        convert_sequential(&dataset, &output_dirs, args, &pb)?
    };
    pb.finish_with_message("Conversion complete");
    stats.print_summary();

    info!("Creating dataset.yaml file...");
    let yaml_path = args.dataset_yaml_path();
    create_dataset_yaml(&args.output_dir, &yaml_path)?;

    let audit = audit_output_pairs(&output_dirs)?;
    if audit.is_clean() {
        info!("Conversion process completed successfully.");
    } else {
        audit.log_problems();
    }

    Ok(stats)
}

fn convert_one(
    dataset: &LinemodDataset,
    index: usize,
    output_dirs: &OutputDirs,
    train_split: f64,
) -> Result<Partition> {
    let sample = dataset.get(index)?;
    process_sample(&sample, output_dirs, train_split)
}

fn convert_sequential(
    dataset: &LinemodDataset,
    output_dirs: &OutputDirs,
    args: &Args,
    pb: &ProgressBar,
) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();
    for index in 0..dataset.len() {
        match convert_one(dataset, index, output_dirs, args.train_split) {
            Ok(partition) => stats.record_written(partition),
            Err(e) if args.keep_going => {
                error!("Failed to convert sample {}: {}", index, e);
                stats.record_failed();
            }
            Err(e) => return Err(e),
        }
        pb.inc(1);
    }
    Ok(stats)
}

fn convert_parallel(
    dataset: &LinemodDataset,
    output_dirs: &OutputDirs,
    args: &Args,
    pb: &ProgressBar,
) -> Result<ProcessingStats> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()
        .map_err(|e| DatasetError::configuration(format!("failed to start worker pool: {}", e)))?;

    let convert = |index: usize| {
        let outcome = convert_one(dataset, index, output_dirs, args.train_split);
        pb.inc(1);
        outcome
    };

    pool.install(|| {
        let mut stats = ProcessingStats::new();
        if args.keep_going {
            let outcomes: Vec<_> = (0..dataset.len()).into_par_iter().map(convert).collect();
            for (index, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Ok(partition) => stats.record_written(partition),
                    Err(e) => {
                        error!("Failed to convert sample {}: {}", index, e);
                        stats.record_failed();
                    }
                }
            }
        } else {
            let partitions: Vec<Partition> = (0..dataset.len())
                .into_par_iter()
                .map(convert)
                .collect::<Result<_>>()?;
            partitions
                .into_iter()
                .for_each(|partition| stats.record_written(partition));
        }
        Ok(stats)
    })
}
