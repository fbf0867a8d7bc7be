//! # Vertiscope
//!
//! Reconstructs one relational view of a tabular analytics model (tables,
//! columns, relationships, measures, security rules and data-source queries)
//! from either of its two metadata backends.
//!
//! ## Architecture
//!
//! ```text
//!  metadata.sqlitedb                    *.cub.xml / *.dim.xml / *.tbl.xml ...
//!         │                                          │
//!         ▼ [relational]                             ▼ [fragments]
//! ┌──────────────────────┐             ┌───────────────────────────────┐
//! │ query templates      │             │ FragmentSet (id-keyed lookup) │
//! │ via QueryHandler     │             └───────────────────────────────┘
//! └──────────────────────┘                           │
//!         │                                          ▼ [reconcile]
//!         │                            ┌───────────────────────────────┐
//!         │                            │ ids → tables, columns, roles, │
//!         │                            │ relationships, measures       │
//!         │                            └───────────────────────────────┘
//!         ▼                                          ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 SemanticModel (model) + LoadReport                  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼ [extract], per partition, lazily
//!                          embedded SQL query text
//! ```
//!
//! ```no_run
//! use vertiscope::config::Settings;
//! use vertiscope::load_path;
//!
//! let outcome = load_path("Model.db", &Settings::default())?;
//! for (table, query) in outcome.model.native_queries() {
//!     println!("{table}: {query}");
//! }
//! # Ok::<(), vertiscope::LoadError>(())
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod fragments;
pub mod model;
pub mod reconcile;
pub mod relational;
pub mod report;
pub mod source;

pub use error::{LoadError, LoadResult};
pub use extract::{extract_native_query, QueryExtractor};
pub use model::SemanticModel;
pub use report::LoadReport;
pub use source::{load_path, Backend, LoadOutcome, ModelSource};
