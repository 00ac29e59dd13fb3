use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TAXONOMY_HEADER: &str = "emotion,image_file,description";
pub const COMMENT_MARKER: char = '#';
pub const FALLBACK_LABEL: &str = "happy";
pub const NORMAL_LABEL: &str = "normal";
pub const DEFAULT_HAPPY_DESCRIPTION: &str = "cheerful and upbeat (e.g. \"Hey! I'm so happy!\")";

pub fn default_resource_content(happy_image_file: &str) -> String {
    format!(
        "{}\n{},{},{}\n",
        TAXONOMY_HEADER, FALLBACK_LABEL, happy_image_file, DEFAULT_HAPPY_DESCRIPTION
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionEntry {
    pub label: String,
    pub image_file: String,
    pub description: String,
}

impl EmotionEntry {
    pub fn new(label: impl Into<String>, image_file: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            image_file: image_file.into(),
            description: description.into(),
        }
    }

    /// Parses one `label,image_file,description` record. Only the first two
    /// commas split; the rest of the line belongs to the description.
    pub fn parse_record(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, ',');
        let label = parts.next()?.trim().to_lowercase();
        let image_file = parts.next()?.trim().to_string();
        let description = parts.next()?.trim().to_string();

        if label.is_empty() || image_file.is_empty() {
            return None;
        }

        let description = if description.is_empty() {
            format!("speaks in a {} tone", label)
        } else {
            description
        };

        Some(Self {
            label,
            image_file,
            description,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmotionLabel(String);

impl EmotionLabel {
    pub fn fallback() -> Self {
        Self(FALLBACK_LABEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_LABEL
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct EmotionTaxonomy {
    entries: Vec<EmotionEntry>,
    labels: Vec<String>,
    descriptions: HashMap<String, String>,
    images: HashMap<String, PathBuf>,
    normal_image: PathBuf,
    happy_image: PathBuf,
}

impl EmotionTaxonomy {
    fn from_entries(entries: Vec<EmotionEntry>, pictures_dir: &Path, normal_image: PathBuf, happy_image: PathBuf) -> Self {
        let labels = entries.iter().map(|entry| entry.label.clone()).collect();
        let descriptions = entries
            .iter()
            .map(|entry| (entry.label.clone(), entry.description.clone()))
            .collect();
        let images: HashMap<String, PathBuf> = entries
            .iter()
            .map(|entry| (entry.label.clone(), pictures_dir.join(&entry.image_file)))
            .collect();

        let normal_image = images.get(NORMAL_LABEL).cloned().unwrap_or(normal_image);

        Self {
            entries,
            labels,
            descriptions,
            images,
            normal_image,
            happy_image,
        }
    }

    pub fn entries(&self) -> &[EmotionEntry] {
        &self.entries
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn descriptions(&self) -> &HashMap<String, String> {
        &self.descriptions
    }

    pub fn images(&self) -> &HashMap<String, PathBuf> {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.descriptions.contains_key(label)
    }

    pub fn description(&self, label: &str) -> Option<&str> {
        self.descriptions.get(label).map(String::as_str)
    }

    pub fn validate(&self, raw: &str) -> Option<EmotionLabel> {
        let label = raw.trim().to_lowercase();
        if self.contains(&label) {
            Some(EmotionLabel(label))
        } else {
            None
        }
    }

    pub fn image_for(&self, label: &str) -> &Path {
        self.images
            .get(label)
            .or_else(|| self.images.get(FALLBACK_LABEL))
            .map(PathBuf::as_path)
            .unwrap_or(self.happy_image.as_path())
    }

    pub fn normal_image(&self) -> &Path {
        &self.normal_image
    }

    pub fn is_default(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].label == FALLBACK_LABEL && self.entries[0].description == DEFAULT_HAPPY_DESCRIPTION
    }
}

#[derive(Debug, Clone)]
pub struct TaxonomyLoader {
    pictures_dir: PathBuf,
    normal_image: PathBuf,
    happy_image: PathBuf,
}

impl TaxonomyLoader {
    pub fn new(pictures_dir: impl Into<PathBuf>, normal_image: impl Into<PathBuf>, happy_image: impl Into<PathBuf>) -> Self {
        Self {
            pictures_dir: pictures_dir.into(),
            normal_image: normal_image.into(),
            happy_image: happy_image.into(),
        }
    }

    pub fn load<P: AsRef<Path>>(&self, source: P) -> EmotionTaxonomy {
        let source = source.as_ref();
        match std::fs::read_to_string(source) {
            Ok(content) => self.parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %source.display(), "emotion taxonomy not found, using default");
                self.default_taxonomy()
            }
            Err(e) => {
                warn!(path = %source.display(), error = %e, "failed to read emotion taxonomy, using default");
                self.default_taxonomy()
            }
        }
    }

    pub fn parse(&self, content: &str) -> EmotionTaxonomy {
        let mut entries: Vec<EmotionEntry> = Vec::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            if index == 0 && line == TAXONOMY_HEADER {
                continue;
            }

            let Some(entry) = EmotionEntry::parse_record(line) else {
                warn!(line = index + 1, content = line, "skipping invalid emotion record");
                continue;
            };

            if entries.iter().any(|existing| existing.label == entry.label) {
                warn!(line = index + 1, label = %entry.label, "skipping duplicate emotion label");
                continue;
            }

            entries.push(entry);
        }

        if entries.is_empty() {
            warn!("no valid emotions in taxonomy, using default");
            return self.default_taxonomy();
        }

        debug!(labels = ?entries.iter().map(|e| e.label.as_str()).collect::<Vec<_>>(), "loaded emotion taxonomy");
        self.build(entries)
    }

    pub fn default_taxonomy(&self) -> EmotionTaxonomy {
        self.build(Vec::new())
    }

    // happy must stay resolvable even when the resource omits it
    fn build(&self, mut entries: Vec<EmotionEntry>) -> EmotionTaxonomy {
        let has_happy = entries.iter().any(|entry| entry.label == FALLBACK_LABEL);
        if !has_happy {
            let happy_file = self
                .happy_image
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            entries.push(EmotionEntry::new(FALLBACK_LABEL, happy_file, DEFAULT_HAPPY_DESCRIPTION));
        }

        let mut taxonomy = EmotionTaxonomy::from_entries(
            entries,
            &self.pictures_dir,
            self.normal_image.clone(),
            self.happy_image.clone(),
        );
        if !has_happy {
            taxonomy.images.insert(FALLBACK_LABEL.to_string(), self.happy_image.clone());
        }
        taxonomy
    }
}
