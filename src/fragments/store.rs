//! Sources of manifest entries and fragment bytes.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One storage artifact file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManifestEntry {
    pub file_name: String,
}

impl ManifestEntry {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

/// Supplies the flat manifest and the bytes behind each entry.
pub trait FragmentStore {
    fn manifest(&self) -> &[ManifestEntry];

    fn read(&self, file_name: &str) -> io::Result<Vec<u8>>;
}

/// An already-extracted model directory.
///
/// The manifest lists every regular file below the root, as `/`-separated
/// paths relative to it, sorted.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    manifest: Vec<ManifestEntry>,
    /// Manifest names, for membership checks on read
    names: HashSet<String>,
}

impl DirectoryStore {
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut files = Vec::new();
        collect_files(&root, &root, &mut files)?;
        files.sort();
        let names = files.iter().cloned().collect();
        Ok(Self {
            root,
            manifest: files.into_iter().map(ManifestEntry::new).collect(),
            names,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, files)?;
        } else if file_type.is_file() {
            if let Ok(relative) = path.strip_prefix(root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push(name);
            }
        }
    }
    Ok(())
}

impl FragmentStore for DirectoryStore {
    fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    fn read(&self, file_name: &str) -> io::Result<Vec<u8>> {
        if !self.names.contains(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not in the manifest", file_name),
            ));
        }
        fs::read(self.root.join(file_name))
    }
}

/// In-memory store. The manifest keeps insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    manifest: Vec<ManifestEntry>,
    contents: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with contents. Re-inserting a name replaces its contents.
    pub fn insert(&mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let file_name = file_name.into();
        if !self.contents.contains_key(&file_name) {
            self.manifest.push(ManifestEntry::new(file_name.clone()));
        }
        self.contents.insert(file_name, bytes.into());
    }

    /// Add a manifest entry with no readable contents, such as a storage
    /// file that is only classified by name.
    pub fn insert_name(&mut self, file_name: impl Into<String>) {
        self.insert(file_name, Vec::new());
    }

    pub fn with(mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(file_name, bytes);
        self
    }
}

impl FragmentStore for MemoryStore {
    fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    fn read(&self, file_name: &str) -> io::Result<Vec<u8>> {
        self.contents.get(file_name).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not in the store", file_name),
            )
        })
    }
}
