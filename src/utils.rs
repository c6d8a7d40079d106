use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Enough leading bytes for [`infer_image_format`].
pub const IMAGE_HEADER_LEN: usize = 8;

/// Helper function to infer image format from image bytes
pub fn infer_image_format(image_bytes: &[u8]) -> Option<&'static str> {
    if image_bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if image_bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("png")
    } else if image_bytes.starts_with(b"BM") {
        Some("bmp")
    } else if image_bytes.starts_with(&[0x47, 0x49, 0x46]) {
        Some("gif")
    } else {
        None
    }
}

/// Read at most the first `IMAGE_HEADER_LEN` bytes of a file
pub fn read_image_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(IMAGE_HEADER_LEN);
    File::open(path)?
        .take(IMAGE_HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(header)
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create an output directory, reusing it if it already exists
pub fn create_output_directory(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_dir() {
        log::debug!("Directory {:?} already exists, reusing it.", path);
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_image_format() {
        let jpg_bytes = vec![0xFF, 0xD8, 0xFF];
        let png_bytes = vec![0x89, b'P', b'N', b'G'];
        let bmp_bytes = vec![b'B', b'M'];
        let gif_bytes = vec![0x47, 0x49, 0x46];
        let unknown_bytes = vec![0x00, 0x00, 0x00];

        assert_eq!(infer_image_format(&jpg_bytes), Some("jpg"));
        assert_eq!(infer_image_format(&png_bytes), Some("png"));
        assert_eq!(infer_image_format(&bmp_bytes), Some("bmp"));
        assert_eq!(infer_image_format(&gif_bytes), Some("gif"));
        assert_eq!(infer_image_format(&unknown_bytes), None);
    }

    #[test]
    fn read_image_header_stops_after_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("0000.png");
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(1 << 20, 0xAB);
        fs::write(&path, &bytes).unwrap();

        let header = read_image_header(&path).unwrap();
        assert_eq!(header.len(), IMAGE_HEADER_LEN);
        assert_eq!(infer_image_format(&header), Some("png"));

        let short = temp_dir.path().join("short.bin");
        fs::write(&short, b"BM").unwrap();
        assert_eq!(read_image_header(&short).unwrap(), b"BM".to_vec());
    }

    #[test]
    fn create_output_directory_keeps_existing_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("train/images");
        create_output_directory(&dir).unwrap();
        fs::write(dir.join("01_0000.jpg"), b"x").unwrap();

        create_output_directory(&dir).unwrap();
        assert!(dir.join("01_0000.jpg").exists());
    }
}
