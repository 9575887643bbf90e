use crate::error::DepthError;
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persists encoded depth maps as single-channel PNGs with unique,
/// monotonically-distinguishable names.
///
/// Names combine a millisecond timestamp with a process-wide sequence
/// counter, so two concurrent requests can never be assigned the same
/// output file even within one millisecond.
pub struct OutputStore {
    dir: PathBuf,
    counter: AtomicU64,
}

impl OutputStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DepthError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the depth map and return its filename.
    pub fn save(&self, image: &GrayImage) -> Result<String, DepthError> {
        let filename = self.next_filename();
        let path = self.dir.join(&filename);
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(DepthError::Write)?;
        tracing::debug!(path = %path.display(), "depth map persisted");
        Ok(filename)
    }

    fn next_filename(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("depth_{millis}_{seq}.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn saves_a_png_into_the_outputs_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = OutputStore::open(tmp.path()).unwrap();

        let image = GrayImage::from_pixel(10, 10, image::Luma([128]));
        let filename = store.save(&image).unwrap();

        let written = image::open(tmp.path().join(&filename)).unwrap();
        assert_eq!(written.to_luma8().dimensions(), (10, 10));
    }

    #[test]
    fn concurrent_saves_get_distinct_filenames() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(OutputStore::open(tmp.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let image = GrayImage::from_pixel(4, 4, image::Luma([0]));
                    store.save(&image).unwrap()
                })
            })
            .collect();

        let names: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(names.len(), 8, "every save must get a unique filename");
    }

    #[test]
    fn creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let store = OutputStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
