//! Load report: everything that was recovered from instead of failing.
//!
//! Recoverable conditions never abort a load. Each one is logged when it is
//! recorded and kept here so callers can inspect what was skipped.

use serde::Serialize;
use tracing::{debug, warn};

use crate::fragments::FragmentKind;

/// Per-fragment result of the load step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FragmentOutcome {
    Loaded {
        file: String,
        kind: FragmentKind,
    },
    Skipped {
        file: String,
        kind: FragmentKind,
        reason: String,
    },
}

impl FragmentOutcome {
    pub fn file(&self) -> &str {
        match self {
            FragmentOutcome::Loaded { file, .. } | FragmentOutcome::Skipped { file, .. } => file,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FragmentOutcome::Skipped { .. })
    }
}

/// Which end of a relationship could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    From,
    To,
}

/// A degraded result found while building the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum LoadIssue {
    /// A relational query template failed; its collection is empty
    QueryFailed { template: String, reason: String },
    /// A cube dimension has no dimension fragment; the table is omitted
    MissingDimension { dimension_id: String },
    /// A relationship endpoint column could not be resolved
    UnresolvedEndpoint {
        relationship: String,
        endpoint: Endpoint,
        dimension_id: String,
        attribute_id: String,
    },
    /// A second column with the same table and name was dropped
    DuplicateColumn { table: String, column: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    outcomes: Vec<FragmentOutcome>,
    issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded(&mut self, file: impl Into<String>, kind: FragmentKind) {
        let file = file.into();
        debug!(%file, %kind, "fragment loaded");
        self.outcomes.push(FragmentOutcome::Loaded { file, kind });
    }

    pub fn skipped(&mut self, file: impl Into<String>, kind: FragmentKind, reason: impl Into<String>) {
        let file = file.into();
        let reason = reason.into();
        warn!(%file, %kind, %reason, "skipping fragment");
        self.outcomes
            .push(FragmentOutcome::Skipped { file, kind, reason });
    }

    pub fn issue(&mut self, issue: LoadIssue) {
        warn!(?issue, "load issue");
        self.issues.push(issue);
    }

    pub fn outcomes(&self) -> &[FragmentOutcome] {
        &self.outcomes
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub fn skipped_fragments(&self) -> impl Iterator<Item = &FragmentOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }

    /// True when nothing was skipped or degraded.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.skipped_fragments().next().is_none()
    }
}
