//! Error taxonomy.
//!
//! Two levels:
//! - [`IngestError`]: document-level, fatal for the run (unreadable input,
//!   unparseable XML, missing OWL namespace, cyclic alias table).
//! - [`SkipReason`]: per-axiom, recovered locally by dropping the axiom and
//!   counting it in the [`crate::report::TranslationReport`].
//!
//! A class or property id missing from every table is not an error at all:
//! resolution falls back to the canonicalized id.

use crate::expr::UnsupportedConstruct;
use crate::shape::MarkerCounts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("invalid config `{}`: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

impl IngestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        IngestError::MalformedDocument(message.into())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("alias cycle in id map: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },
    #[error("alias chain starting at `{start}` is longer than {limit} steps")]
    AliasChainTooLong { start: String, limit: usize },
}

// ============================================================================
// Per-axiom skips
// ============================================================================

/// Why one axiom produced no statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Contains a construct with no logic-node counterpart (cardinality,
    /// `hasSelf`, universal restriction, ...).
    Unsupported { construct: UnsupportedConstruct },
    /// Built only from supported constructs, but no catalogue shape accepts it.
    NoMatchingShape { counts: MarkerCounts },
    /// Structurally broken (e.g. a restriction without `owl:onProperty`).
    Malformed { message: String },
    /// More existential scopes than bound-variable names.
    VariablesExhausted,
}

impl SkipReason {
    pub fn malformed(message: impl Into<String>) -> Self {
        SkipReason::Malformed {
            message: message.into(),
        }
    }

    /// Stable short key used for report histograms.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::Unsupported { .. } => "unsupported",
            SkipReason::NoMatchingShape { .. } => "no_matching_shape",
            SkipReason::Malformed { .. } => "malformed",
            SkipReason::VariablesExhausted => "variables_exhausted",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unsupported { construct } => {
                write!(f, "unsupported construct {construct}")
            }
            SkipReason::NoMatchingShape { counts } => {
                write!(f, "no matching shape ({counts})")
            }
            SkipReason::Malformed { message } => write!(f, "malformed axiom: {message}"),
            SkipReason::VariablesExhausted => f.write_str("ran out of bound-variable names"),
        }
    }
}
