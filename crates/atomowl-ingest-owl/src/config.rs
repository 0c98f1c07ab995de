//! Translator configuration.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a complete
//! configuration. The CLI loads this from `--config` and then applies its
//! flags on top.

use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source serialization of the ontology document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Sniff the first non-blank byte: `<` means RDF/XML.
    #[default]
    Auto,
    RdfXml,
    Functional,
}

impl Dialect {
    /// Resolve `Auto` against the document text. A leading byte-order mark
    /// is ignored.
    pub fn resolve(self, text: &str) -> Dialect {
        match self {
            Dialect::Auto => match text
                .trim_start_matches('\u{FEFF}')
                .trim_start()
                .chars()
                .next()
            {
                Some('<') => Dialect::RdfXml,
                _ => Dialect::Functional,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObsoletePolicy {
    #[default]
    Skip,
    Include,
}

/// Whether the `is_a` partition of the id map rewrites ids too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsAAliasPolicy {
    #[default]
    Ignore,
    Apply,
}

/// Link type for `SubClassOf(A B)` with a named parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlainSubclassLink {
    #[default]
    Subset,
    Inheritance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub dialect: Dialect,
    pub obsolete: ObsoletePolicy,
    pub is_a_aliases: IsAAliasPolicy,
    pub plain_subclass_link: PlainSubclassLink,
    pub emit_subset_membership: bool,
    /// Upper bound on existential restrictions in one axiom.
    pub max_restrictions: usize,
    /// Upper bound on intersection/union nodes in one axiom.
    pub max_combinators: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Auto,
            obsolete: ObsoletePolicy::Skip,
            is_a_aliases: IsAAliasPolicy::Ignore,
            plain_subclass_link: PlainSubclassLink::Subset,
            emit_subset_membership: false,
            max_restrictions: 6,
            max_combinators: 2,
        }
    }
}

impl TranslatorConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
        Self::from_json_str(&text).map_err(|source| IngestError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}
