//! Backend detection and model sources.
//!
//! Both backends produce the same [`SemanticModel`]. The backend is chosen
//! once per load from what is found at the path:
//!
//! - a SQLite file, or a directory holding `metadata.sqlitedb`: relational
//! - a directory whose manifest holds a root cube fragment: fragments

use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::error::{LoadError, LoadResult};
use crate::extract::QueryExtractor;
use crate::fragments::{
    classify, DirectoryStore, FragmentKind, FragmentLoader, FragmentSet, FragmentStore,
    XmlFragmentLoader,
};
use crate::model::SemanticModel;
use crate::reconcile::reconcile;
use crate::relational::{QueryHandler, RelationalAdapter, SqliteHandler};
use crate::report::LoadReport;

const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";
const METADATA_STORE_FILE: &str = "metadata.sqlitedb";

/// Something that produces a canonical model.
pub trait ModelSource {
    fn load(&mut self, report: &mut LoadReport) -> LoadResult<SemanticModel>;
}

/// Relational metadata store behind a [`QueryHandler`].
pub struct RelationalSource<H: QueryHandler> {
    handler: H,
    adapter: RelationalAdapter,
}

impl<H: QueryHandler> RelationalSource<H> {
    pub fn new(handler: H, extractor: Arc<QueryExtractor>) -> Self {
        Self {
            handler,
            adapter: RelationalAdapter::new(extractor),
        }
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

impl<H: QueryHandler> ModelSource for RelationalSource<H> {
    fn load(&mut self, report: &mut LoadReport) -> LoadResult<SemanticModel> {
        Ok(self.adapter.populate(&mut self.handler, report))
    }
}

/// XML fragments from a store, decoded by a loader.
pub struct FragmentSource<S: FragmentStore, L: FragmentLoader> {
    store: S,
    loader: L,
    extractor: Arc<QueryExtractor>,
}

impl<S: FragmentStore, L: FragmentLoader> FragmentSource<S, L> {
    pub fn new(store: S, loader: L, extractor: Arc<QueryExtractor>) -> Self {
        Self {
            store,
            loader,
            extractor,
        }
    }
}

impl<S: FragmentStore> FragmentSource<S, XmlFragmentLoader> {
    pub fn xml(store: S, extractor: Arc<QueryExtractor>) -> Self {
        Self::new(store, XmlFragmentLoader, extractor)
    }
}

impl<S: FragmentStore, L: FragmentLoader> ModelSource for FragmentSource<S, L> {
    fn load(&mut self, report: &mut LoadReport) -> LoadResult<SemanticModel> {
        let fragments = FragmentSet::load(&self.store, &self.loader, report)?;
        Ok(reconcile(&fragments, &self.extractor, report))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Relational,
    Fragments,
}

/// The backend found at a path.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Path of the SQLite metadata store
    Relational(PathBuf),
    Fragments(DirectoryStore),
}

impl Backend {
    pub fn detect(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;

        if metadata.is_file() {
            if has_sqlite_header(path)? {
                return Ok(Backend::Relational(path.to_path_buf()));
            }
        } else if metadata.is_dir() {
            let store_file = path.join(METADATA_STORE_FILE);
            if store_file.is_file() {
                return Ok(Backend::Relational(store_file));
            }
            let store = DirectoryStore::open(path)?;
            let has_cube = store
                .manifest()
                .iter()
                .any(|e| matches!(classify(&e.file_name), Some((FragmentKind::Cube, _))));
            if has_cube {
                return Ok(Backend::Fragments(store));
            }
        }

        Err(LoadError::UnknownBackend {
            path: path.to_path_buf(),
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Relational(_) => BackendKind::Relational,
            Backend::Fragments(_) => BackendKind::Fragments,
        }
    }
}

fn has_sqlite_header(path: &Path) -> LoadResult<bool> {
    let mut header = [0u8; 16];
    let mut file = fs::File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header == SQLITE_HEADER),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// A loaded model and what was recovered from while loading it.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub backend: BackendKind,
    pub model: SemanticModel,
    pub report: LoadReport,
}

/// Detect the backend at `path` and load its model.
pub fn load_path(path: impl AsRef<Path>, settings: &Settings) -> LoadResult<LoadOutcome> {
    let path = path.as_ref();
    let extractor = Arc::new(QueryExtractor::new(&settings.extractor)?);
    let backend = Backend::detect(path)?;
    let kind = backend.kind();
    info!(path = %path.display(), backend = ?kind, "loading model");

    let mut report = LoadReport::new();
    let model = match backend {
        Backend::Relational(store_path) => {
            let handler = SqliteHandler::open(&store_path)?;
            RelationalSource::new(handler, extractor).load(&mut report)?
        }
        Backend::Fragments(store) => FragmentSource::xml(store, extractor).load(&mut report)?,
    };

    info!(
        tables = model.tables().len(),
        issues = report.issues().len(),
        "model loaded"
    );
    Ok(LoadOutcome {
        backend: kind,
        model,
        report,
    })
}
