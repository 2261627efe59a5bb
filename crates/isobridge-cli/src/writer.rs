//! Writes generated files below an output directory

use isobridge_core::{CoreError, CoreResult, GeneratedFile, SourceWriter};
use std::path::{Component, Path, PathBuf};

/// Writer placing every file at its relative path under `root`
///
/// Parent directories are created on demand and existing files are
/// overwritten, so repeated runs over the same output directory converge.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    root: PathBuf,
    written: usize,
}

impl DirectoryWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Target of `relative`, refusing paths that leave the output directory
    fn target(&self, relative: &str) -> CoreResult<PathBuf> {
        let path = Path::new(relative);
        let contained = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !contained {
            return Err(CoreError::WriteFailed {
                path: relative.to_string(),
                reason: "path must be relative to the output directory".to_string(),
            });
        }
        Ok(self.root.join(path))
    }
}

impl SourceWriter for DirectoryWriter {
    fn write(&mut self, file: &GeneratedFile) -> CoreResult<()> {
        let target = self.target(&file.path)?;
        let failed = |err: std::io::Error| CoreError::WriteFailed {
            path: target.display().to_string(),
            reason: err.to_string(),
        };
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(failed)?;
        }
        std::fs::write(&target, &file.content).map_err(failed)?;
        self.written += 1;
        tracing::debug!(path = %target.display(), bytes = file.content.len(), "file written");
        Ok(())
    }
}
