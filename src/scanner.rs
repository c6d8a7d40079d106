//! Builds the flat sample index from the numbered LineMOD object folders.

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::{ANNOTATION_FILE, FOLDER_IDS, RGB_DIR};
use crate::error::{DatasetError, Result};
use crate::types::{GroundTruthObject, SampleRecord};

/// Ordered list of samples, folder ascending then image id ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetIndex {
    records: Vec<SampleRecord>,
}

impl DatasetIndex {
    pub fn new(records: Vec<SampleRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SampleRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DatasetIndex {
    type Item = &'a SampleRecord;
    type IntoIter = std::slice::Iter<'a, SampleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Ground truth of one folder keyed by image id, sorted.
pub type FolderGroundTruth = BTreeMap<u32, Vec<GroundTruthObject>>;

/// Scan `root` for object folders `01`..`15` and index their first objects.
///
/// Missing folders are skipped silently and folders without `gt.yml` are
/// skipped with a warning. A malformed annotation file aborts the scan.
pub fn scan_dataset(root: &Path) -> Result<DatasetIndex> {
    if !root.is_dir() {
        return Err(DatasetError::configuration(format!(
            "dataset root does not exist or is not a directory: {}",
            root.display()
        )));
    }

    info!("Scanning dataset folders...");
    let mut records = Vec::new();

    for folder_id in FOLDER_IDS {
        let folder_name = format!("{:02}", folder_id);
        let folder_path = root.join(&folder_name);
        if !folder_path.is_dir() {
            debug!("Object folder {} not present, skipping", folder_name);
            continue;
        }

        info!("Loading object {}...", folder_name);
        let gt_path = folder_path.join(ANNOTATION_FILE);
        if !gt_path.is_file() {
            warn!("{} missing in {}", ANNOTATION_FILE, folder_name);
            continue;
        }

        let ground_truth = read_ground_truth(&gt_path)?;
        records.extend(folder_records(&folder_path, &gt_path, ground_truth)?);
    }

    info!("Indexed {} samples.", records.len());
    Ok(DatasetIndex::new(records))
}

/// Parse a `gt.yml` file.
pub fn read_ground_truth(path: &Path) -> Result<FolderGroundTruth> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    parse_ground_truth(BufReader::new(file), path)
}

/// Parse ground truth from any reader; `path` is only used in errors.
pub fn parse_ground_truth<R: std::io::Read>(reader: R, path: &Path) -> Result<FolderGroundTruth> {
    // An empty file deserializes to `null` rather than an empty map
    let parsed: Option<FolderGroundTruth> =
        serde_yaml::from_reader(reader).map_err(|source| DatasetError::AnnotationParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parsed.unwrap_or_default())
}

fn folder_records(
    folder_path: &Path,
    gt_path: &Path,
    ground_truth: FolderGroundTruth,
) -> Result<Vec<SampleRecord>> {
    ground_truth
        .into_iter()
        .map(|(image_id, objects)| {
            let object = objects
                .into_iter()
                .next()
                .ok_or_else(|| DatasetError::InvalidAnnotation {
                    path: gt_path.to_path_buf(),
                    image_id,
                    reason: "object list is empty".to_string(),
                })?;

            Ok(SampleRecord {
                image_path: image_path(folder_path, image_id),
                bbox: object.obj_bb.into(),
                class_id: object.obj_id,
                sample_id: image_id,
            })
        })
        .collect()
}

/// `<folder>/rgb/<image id padded to 4 digits>.png`
pub fn image_path(folder_path: &Path, image_id: u32) -> PathBuf {
    folder_path
        .join(RGB_DIR)
        .join(format!("{:04}.png", image_id))
}
