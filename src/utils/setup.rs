use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::modules::emotion::taxonomy::default_resource_content;
use super::paths::ResolvedPaths;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SetupResult<T> = Result<T, SetupError>;

/// How a user-writable file came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadyPresent,
    CopiedTemplate,
    WroteDefault,
}

pub struct SetupUtils;

impl SetupUtils {
    pub fn ensure_data_dir(paths: &ResolvedPaths) -> SetupResult<()> {
        if paths.data_dir.exists() {
            return Ok(());
        }

        std::fs::create_dir_all(&paths.data_dir).map_err(|source| SetupError::DataDir {
            path: paths.data_dir.display().to_string(),
            source,
        })?;
        info!(dir = %paths.data_dir.display(), "created data directory");
        Ok(())
    }

    /// Seeds the taxonomy resource from the bundled template, or writes a
    /// minimal one-record resource when no template can be copied.
    pub fn ensure_taxonomy_resource(paths: &ResolvedPaths, happy_image_file: &str) -> SetupResult<SeedOutcome> {
        Self::ensure_data_dir(paths)?;

        if paths.taxonomy_file.exists() {
            return Ok(SeedOutcome::AlreadyPresent);
        }

        if Self::copy_template(&paths.taxonomy_template, &paths.taxonomy_file) {
            return Ok(SeedOutcome::CopiedTemplate);
        }

        std::fs::write(&paths.taxonomy_file, default_resource_content(happy_image_file))?;
        info!(path = %paths.taxonomy_file.display(), "wrote default emotion taxonomy");
        Ok(SeedOutcome::WroteDefault)
    }

    /// Seeds the conversation log from the bundled template, or creates it empty.
    pub fn ensure_conversation_log(paths: &ResolvedPaths) -> SetupResult<SeedOutcome> {
        Self::ensure_data_dir(paths)?;

        if paths.conversation_file.exists() {
            return Ok(SeedOutcome::AlreadyPresent);
        }

        if Self::copy_template(&paths.conversation_template, &paths.conversation_file) {
            return Ok(SeedOutcome::CopiedTemplate);
        }

        std::fs::write(&paths.conversation_file, "")?;
        info!(path = %paths.conversation_file.display(), "created empty conversation log");
        Ok(SeedOutcome::WroteDefault)
    }

    pub fn run_setup(paths: &ResolvedPaths, happy_image_file: &str) {
        if let Err(e) = Self::ensure_taxonomy_resource(paths, happy_image_file) {
            warn!(error = %e, "could not seed emotion taxonomy");
        }

        if let Err(e) = Self::ensure_conversation_log(paths) {
            warn!(error = %e, "could not seed conversation log");
        }
    }

    fn copy_template(template: &Path, destination: &Path) -> bool {
        if !template.exists() {
            return false;
        }

        match std::fs::read_to_string(template).and_then(|content| std::fs::write(destination, content)) {
            Ok(()) => {
                info!(from = %template.display(), to = %destination.display(), "copied bundled template");
                true
            }
            Err(e) => {
                warn!(template = %template.display(), error = %e, "failed to copy bundled template");
                false
            }
        }
    }
}
