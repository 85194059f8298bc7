use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::error::CaptureError;

/// Produces one still frame per call.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError>;
}

const FRAME_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Cycles through the image files of a directory in name order.
pub struct DirectoryCapture {
    dir: PathBuf,
    next: AtomicUsize,
}

impl DirectoryCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next: AtomicUsize::new(0),
        }
    }

    async fn frames(&self) -> Result<Vec<PathBuf>, CaptureError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_frame(&path) {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames)
    }
}

fn is_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[async_trait]
impl CaptureSource for DirectoryCapture {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        let frames = self.frames().await?;
        if frames.is_empty() {
            return Err(CaptureError::NoFrames(self.dir.display().to_string()));
        }

        let index = self.next.fetch_add(1, Ordering::Relaxed) % frames.len();
        let path = &frames[index];
        debug!(frame = %path.display(), "captured frame");
        Ok(tokio::fs::read(path).await?)
    }
}
