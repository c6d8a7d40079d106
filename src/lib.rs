//! LineMOD to YOLO format converter
//!
//! This library indexes the numbered object folders of a LineMOD dataset,
//! materializes samples on demand and converts their ground-truth boxes into
//! a YOLO detection dataset with a deterministic train/val split.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod scanner;
pub mod transforms;
pub mod types;
pub mod utils;
pub mod yolo_dataset;

// Re-export commonly used types and functions
pub use config::{Args, LINEMOD_CLASS_NAMES};
pub use conversion::{assign_partition, YoloLabel};
pub use dataset::{LinemodDataset, Sample};
pub use error::{DatasetError, Result};
pub use io::{create_dataset_yaml, setup_output_directories};
pub use scanner::{scan_dataset, DatasetIndex};
pub use transforms::{ImageTensor, Normalize, ToTensor, Transform};
pub use types::{BoundingBox, OutputDirs, Partition, ProcessingStats, SampleRecord};
pub use yolo_dataset::process_dataset;
