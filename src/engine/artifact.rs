//! @ai:module:intent Guarantee removal of the compiled executable on every exit path
//! @ai:module:layer infrastructure
//! @ai:module:public_api ArtifactGuard, executable_path

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// @ai:intent Derive the executable path: same directory, source extension stripped
/// @ai:effects pure
pub fn executable_path(source: &Path) -> Result<PathBuf> {
    if source.extension().is_none() {
        return Err(Error::ArtifactPath(source.to_path_buf()));
    }

    let executable = source.with_extension("");

    // A bare name would be looked up in PATH when spawned.
    let mut components = executable.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(Path::new(".").join(executable)),
        _ => Ok(executable),
    }
}

/// @ai:intent Deletes the artifact, if present, when dropped
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    /// @ai:effects pure
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed artifact {}", self.path.display()),
            Err(e) => tracing::warn!(
                "Failed to remove artifact {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
