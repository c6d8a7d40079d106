use glob::glob;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::LINEMOD_CLASS_NAMES;
use crate::error::{DatasetError, Result};
use crate::types::{OutputDirs, Partition};
use crate::utils::create_output_directory;

/// Set up the train/val images and labels directories under `output_dir`
pub fn setup_output_directories(output_dir: &Path) -> Result<OutputDirs> {
    let output_dirs = OutputDirs::new(output_dir);
    for partition in Partition::ALL {
        let dirs = output_dirs.partition(partition);
        create_output_directory(&dirs.images_dir)
            .map_err(|e| DatasetError::io(&dirs.images_dir, e))?;
        create_output_directory(&dirs.labels_dir)
            .map_err(|e| DatasetError::io(&dirs.labels_dir, e))?;
    }
    Ok(output_dirs)
}

/// The `dataset.yaml` read by YOLO training tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetYaml {
    pub path: String,
    pub train: String,
    pub val: String,
    pub names: BTreeMap<usize, String>,
}

impl DatasetYaml {
    /// Config pointing at `dataset_path` with the fifteen LineMOD class names.
    pub fn linemod(dataset_path: &Path) -> Self {
        Self {
            path: dataset_path.to_string_lossy().into_owned(),
            train: format!("{}/images", Partition::Train.as_str()),
            val: format!("{}/images", Partition::Val.as_str()),
            names: LINEMOD_CLASS_NAMES
                .iter()
                .enumerate()
                .map(|(id, name)| (id, name.to_string()))
                .collect(),
        }
    }
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(dataset_dir: &Path, yaml_path: &Path) -> Result<DatasetYaml> {
    let absolute_path = fs::canonicalize(dataset_dir).map_err(|e| DatasetError::io(dataset_dir, e))?;
    let config = DatasetYaml::linemod(&absolute_path);

    if let Some(parent) = yaml_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_output_directory(parent).map_err(|e| DatasetError::io(parent, e))?;
    }
    let file = File::create(yaml_path).map_err(|e| DatasetError::io(yaml_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, &config).map_err(|source| DatasetError::ConfigWrite {
        path: yaml_path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| DatasetError::io(yaml_path, e))?;
    Ok(config)
}

/// Pairing problems found in a converted dataset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputAudit {
    /// `(partition, base name)` of labels with no image.
    pub labels_without_image: Vec<(Partition, String)>,
    /// `(partition, base name)` of images with no label.
    pub images_without_label: Vec<(Partition, String)>,
    /// Base names present in both partitions.
    pub in_both_partitions: Vec<String>,
}

impl OutputAudit {
    pub fn is_clean(&self) -> bool {
        self.labels_without_image.is_empty()
            && self.images_without_label.is_empty()
            && self.in_both_partitions.is_empty()
    }

    pub fn log_problems(&self) {
        for (partition, name) in &self.labels_without_image {
            log::warn!("{}: label {} has no matching image", partition.as_str(), name);
        }
        for (partition, name) in &self.images_without_label {
            log::warn!("{}: image {} has no matching label", partition.as_str(), name);
        }
        for name in &self.in_both_partitions {
            log::warn!("{} appears in both train and val", name);
        }
    }
}

fn file_stems(dir: &Path, extension: &str) -> Result<BTreeSet<String>> {
    let pattern = format!("{}/*.{}", glob::Pattern::escape(&dir.to_string_lossy()), extension);
    let entries = glob(&pattern).map_err(|e| {
        DatasetError::io(dir, std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })?;

    let mut stems = BTreeSet::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            DatasetError::io(path, std::io::Error::from(e))
        })?;
        if let Some(stem) = path.file_stem() {
            stems.insert(stem.to_string_lossy().into_owned());
        }
    }
    Ok(stems)
}

/// Check that labels and images pair up and that no sample is in both splits
pub fn audit_output_pairs(output_dirs: &OutputDirs) -> Result<OutputAudit> {
    let mut audit = OutputAudit::default();
    let mut seen: BTreeMap<Partition, BTreeSet<String>> = BTreeMap::new();

    for partition in Partition::ALL {
        let dirs = output_dirs.partition(partition);
        let images = file_stems(&dirs.images_dir, "jpg")?;
        let labels = file_stems(&dirs.labels_dir, "txt")?;

        audit.labels_without_image.extend(
            labels
                .difference(&images)
                .map(|name| (partition, name.clone())),
        );
        audit.images_without_label.extend(
            images
                .difference(&labels)
                .map(|name| (partition, name.clone())),
        );
        seen.insert(partition, labels.union(&images).cloned().collect());
    }

    if let (Some(train), Some(val)) = (seen.get(&Partition::Train), seen.get(&Partition::Val)) {
        audit.in_both_partitions = train.intersection(val).cloned().collect();
    }
    Ok(audit)
}
