use std::path::PathBuf;
use crate::config::PathsConfig;

pub const DATA_DIR_NAME: &str = ".sprite-companion";
pub const RESOURCE_DIR_NAME: &str = "resources";

/// Filesystem locations derived from [`PathsConfig`].
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub data_dir: PathBuf,
    pub resource_dir: PathBuf,
    pub pictures_dir: PathBuf,
    pub taxonomy_file: PathBuf,
    pub taxonomy_template: PathBuf,
    pub conversation_file: PathBuf,
    pub conversation_template: PathBuf,
    pub normal_image: PathBuf,
    pub happy_image: PathBuf,
}

impl ResolvedPaths {
    pub fn resolve(config: &PathsConfig) -> Self {
        let data_dir = config.data_dir.clone().unwrap_or_else(default_data_dir);
        let resource_dir = config.resource_dir.clone().unwrap_or_else(default_resource_dir);
        let pictures_dir = resource_dir.join(&config.pictures_dir);

        Self {
            taxonomy_file: data_dir.join(&config.taxonomy_file),
            taxonomy_template: resource_dir.join(&config.taxonomy_file),
            conversation_file: data_dir.join(&config.conversation_file),
            conversation_template: resource_dir.join(&config.conversation_file),
            normal_image: pictures_dir.join(&config.normal_image),
            happy_image: pictures_dir.join(&config.happy_image),
            data_dir,
            resource_dir,
            pictures_dir,
        }
    }

    pub fn picture(&self, file_name: &str) -> PathBuf {
        self.pictures_dir.join(file_name)
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Bundled templates and pictures, relative to the working directory.
pub fn default_resource_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(RESOURCE_DIR_NAME)
}
