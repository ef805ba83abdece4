//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the engine. Request
//! handling never reads process-wide environment variables.

use crate::constants::{
    DIAGNOSES_FILENAME, KNOWLEDGE_BASE_DIR, MAX_DOCUMENT_BYTES, SYMPTOMS_FILENAME,
};
use crate::{DdxError, DdxResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    knowledge_base_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`, validating the knowledge-base directory.
    pub fn new(knowledge_base_dir: PathBuf) -> DdxResult<Self> {
        validate_knowledge_base_dir(&knowledge_base_dir)?;
        Ok(Self { knowledge_base_dir })
    }

    pub fn knowledge_base_dir(&self) -> &Path {
        &self.knowledge_base_dir
    }

    pub fn diagnoses_path(&self) -> PathBuf {
        self.knowledge_base_dir.join(DIAGNOSES_FILENAME)
    }

    pub fn symptoms_path(&self) -> PathBuf {
        self.knowledge_base_dir.join(SYMPTOMS_FILENAME)
    }
}

fn looks_like_knowledge_base(path: &Path) -> bool {
    path.join(DIAGNOSES_FILENAME).is_file() && path.join(SYMPTOMS_FILENAME).is_file()
}

/// Resolve the knowledge-base directory without reading environment variables.
///
/// If `override_dir` is provided, it must contain both documents. Otherwise this searches for
/// `knowledge-base/` relative to the current working directory and then walks up from
/// `CARGO_MANIFEST_DIR`.
pub fn resolve_knowledge_base_dir(override_dir: Option<PathBuf>) -> DdxResult<PathBuf> {
    if let Some(dir) = override_dir {
        if dir.is_dir() && looks_like_knowledge_base(&dir) {
            return Ok(dir);
        }
        return Err(DdxError::InvalidInput(format!(
            "knowledge base override {} must contain {DIAGNOSES_FILENAME} and {SYMPTOMS_FILENAME}",
            dir.display()
        )));
    }

    let cwd_relative = PathBuf::from(KNOWLEDGE_BASE_DIR);
    if looks_like_knowledge_base(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(KNOWLEDGE_BASE_DIR);
        if looks_like_knowledge_base(&candidate) {
            return Ok(candidate);
        }
    }

    Err(DdxError::InvalidInput(format!(
        "could not locate {KNOWLEDGE_BASE_DIR}/ with {DIAGNOSES_FILENAME} and {SYMPTOMS_FILENAME}"
    )))
}

/// Validate that both documents are regular files of a sensible size.
///
/// Symlinks and special files are rejected so an override cannot point the loader at
/// arbitrary filesystem entries.
pub fn validate_knowledge_base_dir(dir: &Path) -> DdxResult<()> {
    for name in [DIAGNOSES_FILENAME, SYMPTOMS_FILENAME] {
        let path = dir.join(name);
        let metadata = std::fs::symlink_metadata(&path).map_err(|source| DdxError::FileRead {
            path: path.clone(),
            source,
        })?;
        let file_type = metadata.file_type();

        if file_type.is_symlink() {
            return Err(DdxError::InvalidInput(format!(
                "{} must not be a symlink",
                path.display()
            )));
        }
        if !file_type.is_file() {
            return Err(DdxError::InvalidInput(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > MAX_DOCUMENT_BYTES {
            return Err(DdxError::InvalidInput(format!(
                "{} exceeds maximum size of {MAX_DOCUMENT_BYTES} bytes",
                path.display()
            )));
        }
    }

    Ok(())
}
