//! Durable storage for the cluster artifact.
//!
//! The artifact is written once, atomically, and never overwritten: the
//! serialized document goes to a temporary file beside the target and is
//! published with a no-clobber rename.
use crate::document::{load_cluster_info, render_json, ClusterInfo};
use crate::error::{LaunchError, LaunchResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refuse to proceed when something already occupies the artifact path.
    pub fn ensure_absent(&self) -> LaunchResult<()> {
        // symlink_metadata so a dangling link still counts as occupied
        if self.path.symlink_metadata().is_ok() {
            return Err(LaunchError::InputConflict {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    pub fn load(&self) -> LaunchResult<ClusterInfo> {
        load_cluster_info(&self.path)
    }

    /// Persist the artifact as pretty JSON with sorted keys.
    pub fn write_new(&self, info: &ClusterInfo) -> LaunchResult<()> {
        self.ensure_absent()?;
        let staged = self.stage(info)?;
        self.publish(staged)
    }

    /// Write the rendered artifact to a temporary file beside the target.
    fn stage(&self, info: &ClusterInfo) -> LaunchResult<StagedArtifact> {
        let text = render_json(&self.path, info)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut file = tempfile::Builder::new()
            .prefix(".cluster-info")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|err| LaunchError::io("stage artifact in", &dir, err))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|err| LaunchError::io("write", file.path().to_path_buf(), err))?;
        Ok(StagedArtifact {
            file,
            bytes: text.len(),
        })
    }

    /// Rename the staged file into place unless the target appeared meanwhile.
    fn publish(&self, staged: StagedArtifact) -> LaunchResult<()> {
        staged.file.persist_noclobber(&self.path).map_err(|err| {
            if err.error.kind() == std::io::ErrorKind::AlreadyExists {
                LaunchError::InputConflict {
                    path: self.path.clone(),
                }
            } else {
                LaunchError::io("write", &self.path, err.error)
            }
        })?;
        tracing::debug!(path = %self.path.display(), bytes = staged.bytes, "artifact written");
        Ok(())
    }
}

struct StagedArtifact {
    file: NamedTempFile,
    bytes: usize,
}
