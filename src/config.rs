use clap::Parser;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

/// Object folder ids looked up under the dataset root, formatted as `01`..`15`.
pub const FOLDER_IDS: RangeInclusive<u32> = 1..=15;

/// Ground-truth file expected in every object folder.
pub const ANNOTATION_FILE: &str = "gt.yml";

/// Sub-directory of an object folder holding the RGB frames.
pub const RGB_DIR: &str = "rgb";

/// Class names indexed by zero-based class index (`obj_id - 1`).
///
/// Bowl and Cup keep their slots even though their folders are usually
/// missing from the preprocessed release.
pub const LINEMOD_CLASS_NAMES: [&str; 15] = [
    "Ape",
    "Benchvise",
    "Bowl",
    "Cam",
    "Can",
    "Cat",
    "Cup",
    "Driller",
    "Duck",
    "Eggbox",
    "Glue",
    "Holepuncher",
    "Iron",
    "Lamp",
    "Phone",
];

/// Command-line arguments for converting a LineMOD dataset to YOLO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// LineMOD `data` directory containing the numbered object folders
    #[arg(short = 's', long = "source_dir")]
    pub source_dir: PathBuf,

    /// Directory receiving the train/ and val/ folders
    #[arg(short = 'o', long = "output_dir", default_value = "yolo_dataset")]
    pub output_dir: PathBuf,

    /// Fraction of samples assigned to the training split
    #[arg(long = "train_split", default_value_t = 0.8, value_parser = validate_split)]
    pub train_split: f64,

    /// Where to write dataset.yaml (defaults to <output_dir>/dataset.yaml)
    #[arg(long = "yaml_path")]
    pub yaml_path: Option<PathBuf>,

    /// Log failed samples and continue instead of aborting the run
    #[arg(long = "keep_going")]
    pub keep_going: bool,

    /// Number of worker threads used to write samples
    #[arg(short = 'j', long = "jobs", default_value_t = 1)]
    pub jobs: usize,
}

impl Args {
    /// Arguments with defaults for everything but the two directories.
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            train_split: 0.8,
            yaml_path: None,
            keep_going: false,
            jobs: 1,
        }
    }

    pub fn dataset_yaml_path(&self) -> PathBuf {
        self.yaml_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join("dataset.yaml"))
    }
}

// Validate that the split is strictly between 0.0 and 1.0
pub fn validate_split(s: &str) -> Result<f64, String> {
    f64::from_str(s)
        .map_err(|_| split_range_error())
        .and_then(check_split)
}

/// Accept a train fraction strictly inside `(0, 1)`; NaN is rejected.
pub fn check_split(val: f64) -> Result<f64, String> {
    if val > 0.0 && val < 1.0 {
        Ok(val)
    } else {
        Err(split_range_error())
    }
}

fn split_range_error() -> String {
    "SPLIT must be between 0.0 and 1.0 (exclusive)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_split() {
        assert_eq!(validate_split("0.8"), Ok(0.8));
        assert!(validate_split("0.5").is_ok());
        assert!(validate_split("0.0").is_err());
        assert!(validate_split("1.0").is_err());
        assert!(validate_split("-0.1").is_err());
        assert!(validate_split("abc").is_err());
        assert!(validate_split("NaN").is_err());
    }

    #[test]
    fn test_check_split() {
        assert_eq!(check_split(0.25), Ok(0.25));
        assert!(check_split(1.5).is_err());
        assert!(check_split(f64::NAN).is_err());
        assert!(check_split(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "linemod2yolo",
            "-s",
            "/data/linemod",
            "--train_split",
            "0.7",
            "--keep_going",
        ]);
        assert_eq!(args.source_dir, PathBuf::from("/data/linemod"));
        assert_eq!(args.output_dir, PathBuf::from("yolo_dataset"));
        assert_eq!(args.train_split, 0.7);
        assert!(args.keep_going);
        assert_eq!(args.jobs, 1);
        assert_eq!(
            args.dataset_yaml_path(),
            PathBuf::from("yolo_dataset/dataset.yaml")
        );
    }

    #[test]
    fn test_reject_out_of_range_split() {
        let result = Args::try_parse_from(["linemod2yolo", "-s", "/data", "--train_split", "1.5"]);
        assert!(result.is_err());
    }

    #[test]
    fn class_names_cover_every_folder() {
        assert_eq!(LINEMOD_CLASS_NAMES.len(), FOLDER_IDS.count());
    }
}
