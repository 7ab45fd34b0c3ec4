//! Output artifacts and where they get written
//!
//! An export produces an [`ArtifactSet`]: slash-separated paths mapped to
//! bytes, in the order they were emitted. Paths are unique within a set and
//! never climb out of the directory they are written below.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    entries: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact; a path can only be emitted once
    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) -> Result<()> {
        let path = path.into();
        check_path(&path)?;
        if self.index.contains_key(&path) {
            return Err(Error::DuplicateArtifact(path));
        }
        log::debug!("artifact {} ({} bytes)", path, data.len());
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, data));
        Ok(())
    }

    /// Bytes emitted at `path`
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.index
            .get(path)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Paths in emission order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand every artifact to `sink`, in emission order
    pub fn write_to(&self, sink: &mut impl ArtifactSink) -> Result<()> {
        for (path, data) in self.iter() {
            sink.write_artifact(path, data)?;
        }
        Ok(())
    }
}

/// Destination that persists named artifacts
pub trait ArtifactSink {
    fn write_artifact(&mut self, path: &str, data: &[u8]) -> Result<()>;
}

/// Writes each artifact as a file below a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem location of an artifact path
    pub fn file_path(&self, path: &str) -> Result<PathBuf> {
        check_path(path)?;
        Ok(path
            .split('/')
            .fold(self.root.clone(), |acc, part| acc.join(part)))
    }

    /// Directory every artifact is written below
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    fn write_artifact(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let file = self.file_path(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, data)?;
        Ok(())
    }
}

/// Reject paths that are absolute or could resolve outside their base
fn check_path(path: &str) -> Result<()> {
    let escapes = path.is_empty()
        || path
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == ".." || part.contains('\\'));
    if escapes {
        return Err(Error::InvalidArtifactPath(path.to_string()));
    }
    Ok(())
}
