use log::debug;
use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};
use crate::scanner::{scan_dataset, DatasetIndex};
use crate::transforms::{ImageTensor, ToTensor, Transform};
use crate::types::{BoundingBox, SampleRecord};

/// A materialized sample, created on every access.
#[derive(Debug, Clone)]
pub struct Sample {
    pub image: ImageTensor,
    /// Width of the decoded file before any transform ran.
    pub source_width: u32,
    /// Height of the decoded file before any transform ran.
    pub source_height: u32,
    /// Pixel box in source coordinates, untouched by the transform.
    pub bbox: BoundingBox,
    pub class_id: u32,
    pub sample_id: u32,
    pub image_path: PathBuf,
}

/// Random-access view over a LineMOD index that decodes images on demand.
pub struct LinemodDataset {
    root: PathBuf,
    index: DatasetIndex,
    transform: Box<dyn Transform>,
}

impl LinemodDataset {
    /// Scan `root` and build a dataset with the default [`ToTensor`] transform.
    pub fn open(root: &Path) -> Result<Self> {
        let index = scan_dataset(root)?;
        Ok(Self::from_index(root, index))
    }

    pub fn from_index(root: &Path, index: DatasetIndex) -> Self {
        Self {
            root: root.to_path_buf(),
            index,
            transform: Box::new(ToTensor),
        }
    }

    /// Replace the transform applied to every decoded image.
    pub fn with_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    pub fn records(&self) -> &[SampleRecord] {
        self.index.records()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Load sample `index`, decoding its image from disk.
    pub fn get(&self, index: usize) -> Result<Sample> {
        let record = self
            .index
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        materialize(record, self.transform.as_ref())
    }

    /// Samples in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Sample>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }
}

impl std::fmt::Debug for LinemodDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinemodDataset")
            .field("root", &self.root)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Decode `record`'s image as RGB and run `transform` on it.
pub fn materialize(record: &SampleRecord, transform: &dyn Transform) -> Result<Sample> {
    let image = image::open(&record.image_path)
        .map_err(|source| DatasetError::Image {
            path: record.image_path.clone(),
            source,
        })?
        .to_rgb8();
    let (source_width, source_height) = image.dimensions();
    debug!(
        "Decoded {} ({}x{})",
        record.image_path.display(),
        source_width,
        source_height
    );

    Ok(Sample {
        image: transform.apply(image),
        source_width,
        source_height,
        bbox: record.bbox,
        class_id: record.class_id,
        sample_id: record.sample_id,
        image_path: record.image_path.clone(),
    })
}
