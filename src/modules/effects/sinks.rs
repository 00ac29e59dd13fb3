use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::modules::emotion::taxonomy::{EmotionLabel, EmotionTaxonomy};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Display failed: {0}")]
    Display(String),

    #[error("Speech failed: {0}")]
    Speech(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(test, mockall::automock)]
pub trait ImageSink: Send + Sync {
    fn display(&self, image: &Path) -> Result<(), SinkError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SpeechSink: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SinkError>;
}

pub trait ChatDisplay: Send + Sync {
    fn show(&self, content: &str);
}

#[derive(Clone)]
pub struct ImageDispatcher {
    sink: Arc<dyn ImageSink>,
}

impl ImageDispatcher {
    pub fn new(sink: Arc<dyn ImageSink>) -> Self {
        Self { sink }
    }

    pub fn show_label(&self, taxonomy: &EmotionTaxonomy, label: &EmotionLabel) -> PathBuf {
        self.show(taxonomy.image_for(label.as_str()), taxonomy.normal_image())
    }

    /// Shows `image`, or `normal` when `image` does not exist on disk.
    pub fn show(&self, image: &Path, normal: &Path) -> PathBuf {
        let chosen = if image.exists() {
            image
        } else {
            warn!(image = %image.display(), fallback = %normal.display(), "image not found, showing normal image");
            normal
        };

        if !chosen.exists() {
            error!(image = %chosen.display(), "normal image not found, keeping current image");
            return chosen.to_path_buf();
        }

        match self.sink.display(chosen) {
            Ok(()) => debug!(image = %chosen.display(), "image displayed"),
            Err(e) => warn!(image = %chosen.display(), error = %e, "image sink failed"),
        }
        chosen.to_path_buf()
    }
}
