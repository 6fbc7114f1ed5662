use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, bail};

/// Contents of a staged file. Meshes and images are written as bytes, scene
/// descriptions as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Binary(Vec<u8>),
    Text(String),
}

impl FileContents {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContents::Binary(bytes) => bytes,
            FileContents::Text(text) => text.as_bytes(),
        }
    }
}

/// The engine's virtual filesystem.
pub trait VirtualFs {
    fn exists(&self, path: &str) -> bool;

    /// Create a single directory. The parent must already exist.
    fn mkdir(&mut self, path: &str) -> anyhow::Result<()>;

    fn write_file(&mut self, path: &str, contents: FileContents) -> anyhow::Result<()>;
}

/// In-memory filesystem with absolute, `/`-separated paths.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, FileContents>,
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert("/".to_string());
        Self {
            dirs,
            files: BTreeMap::new(),
        }
    }

    pub fn read(&self, path: &str) -> Option<&FileContents> {
        self.files.get(normalize(path))
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &FileContents)> {
        self.files.iter().map(|(path, contents)| (path.as_str(), contents))
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

impl VirtualFs for MemoryFs {
    fn exists(&self, path: &str) -> bool {
        let path = normalize(path);
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn mkdir(&mut self, path: &str) -> anyhow::Result<()> {
        let path = normalize(path);
        if self.exists(path) {
            bail!("{path} already exists");
        }
        if !self.dirs.contains(parent(path)) {
            return Err(anyhow!("parent directory of {path} does not exist"));
        }
        self.dirs.insert(path.to_string());
        Ok(())
    }

    fn write_file(&mut self, path: &str, contents: FileContents) -> anyhow::Result<()> {
        let path = normalize(path);
        if !self.dirs.contains(parent(path)) {
            bail!("parent directory of {path} does not exist");
        }
        self.files.insert(path.to_string(), contents);
        Ok(())
    }
}
