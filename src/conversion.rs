use log::debug;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::dataset::Sample;
use crate::error::{DatasetError, Result};
use crate::types::{BoundingBox, OutputDirs, Partition};
use crate::utils::{infer_image_format, read_image_header};

/// One line of a YOLO label file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloLabel {
    /// Zero-based class index; negative if the class id was 0.
    pub class_index: i64,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloLabel {
    /// Normalize a pixel box by the image size and remap the one-based class id.
    pub fn from_bbox(bbox: &BoundingBox, class_id: u32, image_width: u32, image_height: u32) -> Self {
        let (x_center, y_center, width, height) =
            calculate_bounding_box(bbox, image_width, image_height);
        Self {
            class_index: class_index(class_id),
            x_center,
            y_center,
            width,
            height,
        }
    }
}

impl fmt::Display for YoloLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_index, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// `class_id - 1`, without validating that the id is positive.
pub fn class_index(class_id: u32) -> i64 {
    i64::from(class_id) - 1
}

/// Calculate the normalized center, width and height of a pixel box
pub fn calculate_bounding_box(
    bbox: &BoundingBox,
    image_width: u32,
    image_height: u32,
) -> (f64, f64, f64, f64) {
    let image_width = f64::from(image_width);
    let image_height = f64::from(image_height);

    let x_center = (bbox.x + bbox.width / 2.0) / image_width;
    let y_center = (bbox.y + bbox.height / 2.0) / image_height;
    let width = bbox.width / image_width;
    let height = bbox.height / image_height;

    (x_center, y_center, width, height)
}

/// 64-bit FNV-1a over raw bytes.
pub fn fnv1a64(data: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for byte in data {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Bucket in `0..100` derived from the string `"<class_id>_<sample_id>"`.
pub fn split_bucket(class_id: u32, sample_id: u32) -> u64 {
    let key = format!("{}_{}", class_id, sample_id);
    fnv1a64(key.as_bytes()) % 100
}

/// Deterministic train/val assignment; approximates `train_split` overall.
pub fn assign_partition(class_id: u32, sample_id: u32, train_split: f64) -> Partition {
    if (split_bucket(class_id, sample_id) as f64) < train_split * 100.0 {
        Partition::Train
    } else {
        Partition::Val
    }
}

/// `<class id:02>_<sample id:04>`, unique per sample across folders.
pub fn base_name(class_id: u32, sample_id: u32) -> String {
    format!("{:02}_{:04}", class_id, sample_id)
}

/// Where a sample's image and label end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub partition: Partition,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
}

pub fn output_paths(
    output_dirs: &OutputDirs,
    class_id: u32,
    sample_id: u32,
    train_split: f64,
) -> OutputPaths {
    let partition = assign_partition(class_id, sample_id, train_split);
    let dirs = output_dirs.partition(partition);
    let name = base_name(class_id, sample_id);
    OutputPaths {
        partition,
        image_path: dirs.images_dir.join(&name).with_extension("jpg"),
        label_path: dirs.labels_dir.join(&name).with_extension("txt"),
    }
}

/// Copy the sample's image and write its label into the partition it hashes to.
pub fn process_sample(sample: &Sample, output_dirs: &OutputDirs, train_split: f64) -> Result<Partition> {
    let label = YoloLabel::from_bbox(
        &sample.bbox,
        sample.class_id,
        sample.source_width,
        sample.source_height,
    );
    let paths = output_paths(output_dirs, sample.class_id, sample.sample_id, train_split);

    copy_image(&sample.image_path, &paths.image_path)?;
    write_label(&paths.label_path, &label)?;

    Ok(paths.partition)
}

// The file is copied byte for byte; only the extension changes
fn copy_image(source: &Path, destination: &Path) -> Result<()> {
    fs::copy(source, destination).map_err(|e| DatasetError::io(source, e))?;
    if log::log_enabled!(log::Level::Debug) {
        let head = read_image_header(destination).map_err(|e| DatasetError::io(destination, e))?;
        match infer_image_format(&head) {
            Some("jpg") | None => {}
            Some(format) => debug!(
                "{} holds {} data behind a .jpg extension",
                destination.display(),
                format
            ),
        }
    }
    Ok(())
}

/// Write a single label line with no trailing newline.
pub fn write_label(path: &Path, label: &YoloLabel) -> Result<()> {
    let file = File::create(path).map_err(|e| DatasetError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write!(writer, "{}", label)
        .and_then(|_| writer.flush())
        .map_err(|e| DatasetError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_bounding_box() {
        let bbox = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        let (x_center, y_center, width, height) = calculate_bounding_box(&bbox, 100, 100);

        assert_eq!(x_center, 0.15);
        assert_eq!(y_center, 0.15);
        assert_eq!(width, 0.1);
        assert_eq!(height, 0.1);
    }

    #[test]
    fn label_line_for_worked_example() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        let label = YoloLabel::from_bbox(&bbox, 1, 640, 480);

        assert_eq!(label.class_index, 0);
        assert!((label.x_center - 0.0390625).abs() < 1e-12);
        assert!((label.y_center - 40.0 / 480.0).abs() < 1e-12);
        assert!((label.width - 0.046875).abs() < 1e-12);
        assert!((label.height - 40.0 / 480.0).abs() < 1e-12);

        let line = label.to_string();
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "0");
        assert_eq!(fields[2], "0.083333");
        assert_eq!(fields[3], "0.046875");
        assert!(fields[1..].iter().all(|f| f.split('.').nth(1).unwrap().len() == 6));
    }

    #[test]
    fn class_index_is_zero_based() {
        assert_eq!(class_index(1), 0);
        assert_eq!(class_index(15), 14);
        assert_eq!(class_index(0), -1);
    }

    #[test]
    fn fnv1a64_reference_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn partition_is_deterministic_and_follows_bucket() {
        for class_id in 1..=15 {
            for sample_id in 0..50 {
                let first = assign_partition(class_id, sample_id, 0.8);
                let second = assign_partition(class_id, sample_id, 0.8);
                assert_eq!(first, second);

                let expected = if split_bucket(class_id, sample_id) < 80 {
                    Partition::Train
                } else {
                    Partition::Val
                };
                assert_eq!(first, expected);
            }
        }
    }

    #[test]
    fn split_ratio_is_approximated() {
        let total = 15 * 1000;
        let train = (1..=15u32)
            .flat_map(|class_id| (0..1000u32).map(move |sample_id| (class_id, sample_id)))
            .filter(|&(c, s)| assign_partition(c, s, 0.8) == Partition::Train)
            .count();
        let ratio = train as f64 / total as f64;
        assert!((0.7..0.9).contains(&ratio), "train ratio {ratio}");
    }

    #[test]
    fn base_name_is_zero_padded() {
        assert_eq!(base_name(1, 0), "01_0000");
        assert_eq!(base_name(12, 1187), "12_1187");
    }

    #[test]
    fn output_paths_land_in_assigned_partition() {
        let dirs = OutputDirs::new(Path::new("/out"));
        let paths = output_paths(&dirs, 4, 33, 0.8);
        let split = paths.partition.as_str();
        assert_eq!(
            paths.image_path,
            PathBuf::from(format!("/out/{split}/images/04_0033.jpg"))
        );
        assert_eq!(
            paths.label_path,
            PathBuf::from(format!("/out/{split}/labels/04_0033.txt"))
        );
    }

    #[test]
    fn write_label_has_no_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("01_0000.txt");
        let label = YoloLabel::from_bbox(&BoundingBox::new(0.0, 0.0, 50.0, 50.0), 3, 100, 100);
        write_label(&path, &label).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "2 0.250000 0.250000 0.500000 0.500000");
    }
}
