//! Hand-off of generated files to the host

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileKind {
    /// A generated compilation unit
    Source,
    /// A resource such as a provider listing
    Resource,
}

/// One generated file with a `/`-separated path relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub kind: FileKind,
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    /// A source file for the top-level type `simple` in `package`
    pub fn source(package: &str, simple: &str, content: impl Into<String>) -> Self {
        let path = if package.is_empty() {
            format!("{simple}.java")
        } else {
            format!("{}/{simple}.java", package.replace('.', "/"))
        };
        Self {
            kind: FileKind::Source,
            path,
            content: content.into(),
        }
    }

    pub fn resource(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: FileKind::Resource,
            path: path.into(),
            content: content.into(),
        }
    }
}

/// The host's file writer
pub trait SourceWriter {
    fn write(&mut self, file: &GeneratedFile) -> CoreResult<()>;
}

/// Writer keeping files in memory, keyed by path
///
/// Writing the same path twice in one session is rejected, matching hosts
/// that refuse to recreate a file.
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    files: BTreeMap<String, GeneratedFile>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.get(path)
    }

    /// Files in path order
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceWriter for MemoryWriter {
    fn write(&mut self, file: &GeneratedFile) -> CoreResult<()> {
        if self.files.contains_key(&file.path) {
            return Err(CoreError::WriteFailed {
                path: file.path.clone(),
                reason: "file already written".to_string(),
            });
        }
        self.files.insert(file.path.clone(), file.clone());
        Ok(())
    }
}
