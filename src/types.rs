use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One ground-truth object as stored in a LineMOD `gt.yml`.
///
/// Only `obj_bb` and `obj_id` are read; pose fields such as `cam_R_m2c` and
/// `cam_t_m2c` are ignored. Each image id maps to a list of these, and only
/// the first object of that list is indexed: the dataset is treated as one
/// annotated object per image.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroundTruthObject {
    /// `[x, y, width, height]` in pixels, top-left origin.
    pub obj_bb: [f64; 4],
    pub obj_id: u32,
}

/// Axis-aligned pixel bounding box with a top-left origin.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

/// An indexed sample: where the image lives and what it is annotated with.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub image_path: PathBuf,
    pub bbox: BoundingBox,
    pub class_id: u32,
    /// Image id within its object folder.
    pub sample_id: u32,
}

/// Train or validation subset of the converted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    Train,
    Val,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Train, Partition::Val];

    /// Directory name used in the output layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Val => "val",
        }
    }
}

// Paths of the images/labels directories of one partition
#[derive(Debug, Clone)]
pub struct PartitionDirs {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

// Struct to hold the paths to the output directories for train/val splits
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub train: PartitionDirs,
    pub val: PartitionDirs,
}

impl OutputDirs {
    /// Layout under `root` without touching the filesystem.
    pub fn new(root: &Path) -> Self {
        let dirs = |partition: Partition| PartitionDirs {
            images_dir: root.join(partition.as_str()).join("images"),
            labels_dir: root.join(partition.as_str()).join("labels"),
        };
        Self {
            root: root.to_path_buf(),
            train: dirs(Partition::Train),
            val: dirs(Partition::Val),
        }
    }

    pub fn partition(&self, partition: Partition) -> &PartitionDirs {
        match partition {
            Partition::Train => &self.train,
            Partition::Val => &self.val,
        }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_samples: usize,
    pub train_samples: usize,
    pub val_samples: usize,
    pub failed_samples: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_written(&mut self, partition: Partition) {
        self.total_samples += 1;
        match partition {
            Partition::Train => self.train_samples += 1,
            Partition::Val => self.val_samples += 1,
        }
    }

    pub fn record_failed(&mut self) {
        self.total_samples += 1;
        self.failed_samples += 1;
    }

    pub fn written(&self) -> usize {
        self.train_samples + self.val_samples
    }

    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Total samples processed: {}", self.total_samples);
        log::info!("Written to train: {}", self.train_samples);
        log::info!("Written to val: {}", self.val_samples);
        if self.failed_samples > 0 {
            log::warn!("Failed samples: {}", self.failed_samples);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dirs_layout() {
        let dirs = OutputDirs::new(Path::new("/out"));
        assert_eq!(dirs.train.images_dir, Path::new("/out/train/images"));
        assert_eq!(dirs.train.labels_dir, Path::new("/out/train/labels"));
        assert_eq!(dirs.val.images_dir, Path::new("/out/val/images"));
        assert_eq!(
            dirs.partition(Partition::Val).labels_dir,
            Path::new("/out/val/labels")
        );
    }

    #[test]
    fn stats_count_each_outcome() {
        let mut stats = ProcessingStats::new();
        stats.record_written(Partition::Train);
        stats.record_written(Partition::Train);
        stats.record_written(Partition::Val);
        stats.record_failed();

        assert_eq!(stats.total_samples, 4);
        assert_eq!(stats.train_samples, 2);
        assert_eq!(stats.val_samples, 1);
        assert_eq!(stats.failed_samples, 1);
        assert_eq!(stats.written(), 3);
    }

    #[test]
    fn bbox_from_array() {
        let bbox = BoundingBox::from([10.0, 20.0, 30.0, 40.0]);
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
    }
}
