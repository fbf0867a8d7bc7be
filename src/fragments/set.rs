//! Identifier-keyed lookup tables over the decoded fragments.

use std::collections::HashMap;
use tracing::{debug, info};

use super::documents::{Cube, Dimension, MeasureGroup, Partition, XmObject};
use super::store::{FragmentStore, ManifestEntry};
use super::{classify, Fragment, FragmentError, FragmentKind, FragmentLoader, CUBE_FILE_PATTERN};
use crate::error::{LoadError, LoadResult};
use crate::report::LoadReport;

/// Insertion-ordered map from identifier to document. Re-inserting an
/// identifier replaces the document in place.
#[derive(Debug, Clone)]
pub struct Keyed<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Keyed<T> {
    pub fn insert(&mut self, id: impl Into<String>, value: T) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&idx) => self.entries[idx].1 = value,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, value));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The decoded fragments of one model plus its storage manifest.
#[derive(Debug, Clone)]
pub struct FragmentSet {
    cube: Cube,
    dimensions: Keyed<Dimension>,
    partitions: Keyed<Partition>,
    measure_groups: Keyed<MeasureGroup>,
    table_stats: Keyed<XmObject>,
    manifest: Vec<ManifestEntry>,
    /// Dimension id to the table name the cube gives it
    cube_names: HashMap<String, String>,
}

impl FragmentSet {
    pub fn new(cube: Cube) -> Self {
        Self {
            cube_names: cube_names(&cube),
            cube,
            dimensions: Keyed::default(),
            partitions: Keyed::default(),
            measure_groups: Keyed::default(),
            table_stats: Keyed::default(),
            manifest: Vec::new(),
        }
    }

    /// Read the store's manifest and decode every recognised fragment.
    ///
    /// The root cube is required: if it is missing or cannot be decoded the
    /// load fails. Any other fragment that fails is recorded as skipped.
    pub fn load<S, L>(store: &S, loader: &L, report: &mut LoadReport) -> LoadResult<Self>
    where
        S: FragmentStore + ?Sized,
        L: FragmentLoader + ?Sized,
    {
        let manifest = store.manifest();
        let cube_file = manifest
            .iter()
            .find(|e| matches!(classify(&e.file_name), Some((FragmentKind::Cube, _))))
            .ok_or_else(|| LoadError::MissingRootFragment {
                pattern: CUBE_FILE_PATTERN.to_string(),
            })?;

        let cube = read_fragment(store, loader, FragmentKind::Cube, &cube_file.file_name)
            .map_err(|source| LoadError::RootFragment {
                file: cube_file.file_name.clone(),
                source,
            })?;
        let Fragment::Cube(cube) = cube else {
            return Err(LoadError::RootFragment {
                file: cube_file.file_name.clone(),
                source: FragmentError::Decode {
                    file: cube_file.file_name.clone(),
                    message: "loader returned a non-cube fragment".to_string(),
                },
            });
        };
        info!(file = %cube_file.file_name, dimensions = cube.dimensions.items.len(), "root cube loaded");
        report.loaded(cube_file.file_name.clone(), FragmentKind::Cube);

        let mut set = FragmentSet::new(cube);
        set.manifest = manifest.to_vec();

        for entry in manifest {
            let Some((kind, id)) = classify(&entry.file_name) else {
                continue;
            };
            if kind == FragmentKind::Cube {
                continue;
            }
            match read_fragment(store, loader, kind, &entry.file_name) {
                Ok(fragment) if fragment.kind() == kind => {
                    set.insert(id, fragment);
                    report.loaded(entry.file_name.clone(), kind);
                }
                Ok(fragment) => report.skipped(
                    entry.file_name.clone(),
                    kind,
                    format!("loader returned a {} fragment", fragment.kind()),
                ),
                Err(e) => report.skipped(entry.file_name.clone(), kind, e.to_string()),
            }
        }

        debug!(
            dimensions = set.dimensions.len(),
            partitions = set.partitions.len(),
            measure_groups = set.measure_groups.len(),
            table_stats = set.table_stats.len(),
            "fragments loaded"
        );
        Ok(set)
    }

    /// Insert a decoded fragment under `id`. A second cube replaces the root.
    pub fn insert(&mut self, id: impl Into<String>, fragment: Fragment) {
        match fragment {
            Fragment::Cube(cube) => {
                self.cube_names = cube_names(&cube);
                self.cube = cube;
            }
            Fragment::Dimension(d) => self.dimensions.insert(id, d),
            Fragment::Partition(p) => self.partitions.insert(id, p),
            Fragment::MeasureGroup(m) => self.measure_groups.insert(id, m),
            Fragment::TableStats(t) => self.table_stats.insert(id, t),
        }
    }

    pub fn with_dimension(mut self, id: impl Into<String>, dimension: Dimension) -> Self {
        self.dimensions.insert(id, dimension);
        self
    }

    pub fn with_partition(mut self, id: impl Into<String>, partition: Partition) -> Self {
        self.partitions.insert(id, partition);
        self
    }

    pub fn with_measure_group(mut self, id: impl Into<String>, group: MeasureGroup) -> Self {
        self.measure_groups.insert(id, group);
        self
    }

    pub fn with_table_stats(mut self, id: impl Into<String>, stats: XmObject) -> Self {
        self.table_stats.insert(id, stats);
        self
    }

    pub fn with_manifest<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.manifest
            .extend(names.into_iter().map(ManifestEntry::new));
        self
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.get(id)
    }

    pub fn dimensions(&self) -> &Keyed<Dimension> {
        &self.dimensions
    }

    pub fn partitions(&self) -> &Keyed<Partition> {
        &self.partitions
    }

    pub fn measure_groups(&self) -> &Keyed<MeasureGroup> {
        &self.measure_groups
    }

    pub fn table_stats(&self, id: &str) -> Option<&XmObject> {
        self.table_stats.get(id)
    }

    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    /// Table name of a dimension: the cube's name for it, else the
    /// dimension fragment's name, else the identifier itself.
    ///
    /// Every resolution step names tables through this one lookup.
    pub fn table_name<'a>(&'a self, dimension_id: &'a str) -> &'a str {
        if let Some(name) = self.cube_names.get(dimension_id) {
            return name;
        }
        self.dimensions
            .get(dimension_id)
            .map(|d| d.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(dimension_id)
    }
}

fn cube_names(cube: &Cube) -> HashMap<String, String> {
    cube.dimensions
        .items
        .iter()
        .filter(|d| !d.name.is_empty())
        .map(|d| (d.target_id().to_string(), d.name.clone()))
        .collect()
}

fn read_fragment<S, L>(
    store: &S,
    loader: &L,
    kind: FragmentKind,
    file: &str,
) -> Result<Fragment, FragmentError>
where
    S: FragmentStore + ?Sized,
    L: FragmentLoader + ?Sized,
{
    let bytes = store.read(file).map_err(|source| FragmentError::Read {
        file: file.to_string(),
        source,
    })?;
    loader.load(kind, file, &bytes)
}
