use sprite_companion::modules::effects::{ChatDisplay, ImageSink, SinkError, SpeechSink};
use sprite_companion::TaxonomyLoader;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Default)]
pub struct RecordingImageSink {
    shown: Mutex<Vec<PathBuf>>,
}

impl RecordingImageSink {
    pub fn shown(&self) -> Vec<PathBuf> {
        self.shown.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<PathBuf> {
        self.shown.lock().unwrap().last().cloned()
    }
}

impl ImageSink for RecordingImageSink {
    fn display(&self, image: &Path) -> Result<(), SinkError> {
        self.shown.lock().unwrap().push(image.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSpeechSink {
    spoken: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSpeechSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechSink for RecordingSpeechSink {
    fn speak(&self, text: &str) -> Result<(), SinkError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(SinkError::Speech("no audio device".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    shown: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

impl ChatDisplay for RecordingDisplay {
    fn show(&self, content: &str) {
        self.shown.lock().unwrap().push(content.to_string());
    }
}

/// A throwaway resource tree: `pictures/` with a few sprite files and a
/// taxonomy next to it.
pub struct TestSprite {
    pub dir: TempDir,
}

impl TestSprite {
    pub const PICTURES: [&'static str; 3] = ["Yui_normal.png", "Yui_happy.png", "Yui_sad.png"];

    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pictures = dir.path().join("resources").join("pictures");
        fs::create_dir_all(&pictures).unwrap();
        for picture in Self::PICTURES {
            fs::write(pictures.join(picture), b"png").unwrap();
        }
        Self { dir }
    }

    pub fn taxonomy_content() -> &'static str {
        "emotion,image_file,description\n\
         happy,Yui_happy.png,cheerful and upbeat\n\
         sad,Yui_sad.png,downcast, sorry or disappointed\n\
         angry,Yui_angry.png,annoyed\n"
    }

    pub fn resource_dir(&self) -> PathBuf {
        self.dir.path().join("resources")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn picture(&self, name: &str) -> PathBuf {
        self.resource_dir().join("pictures").join(name)
    }

    pub fn loader(&self) -> TaxonomyLoader {
        TaxonomyLoader::new(
            self.resource_dir().join("pictures"),
            self.picture("Yui_normal.png"),
            self.picture("Yui_happy.png"),
        )
    }

    pub fn write_template(&self, content: &str) {
        fs::write(self.resource_dir().join("emotion.txt"), content).unwrap();
    }
}
