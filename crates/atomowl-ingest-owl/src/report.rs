//! Run summary.

use crate::error::SkipReason;
use crate::shape::AxiomShape;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReport {
    pub classes_seen: usize,
    pub obsolete_skipped: usize,
    pub names_emitted: usize,
    pub memberships_emitted: usize,
    pub axioms_seen: usize,
    pub statements: usize,
    /// Translated axioms per catalogue shape.
    pub shapes: BTreeMap<String, usize>,
    /// Skipped axioms per reason (`unsupported`, `no_matching_shape`, ...).
    pub skipped: BTreeMap<String, usize>,
    /// Skipped axioms per unsupported constructor.
    pub unsupported_constructs: BTreeMap<String, usize>,
    /// Digest of the rendered statements.
    pub digest: String,
}

impl TranslationReport {
    pub fn record_shape(&mut self, shape: AxiomShape) {
        *self.shapes.entry(shape.as_str().to_string()).or_default() += 1;
    }

    pub fn record_skip(&mut self, reason: &SkipReason) {
        *self.skipped.entry(reason.kind().to_string()).or_default() += 1;
        if let SkipReason::Unsupported { construct } = reason {
            *self
                .unsupported_constructs
                .entry(construct.to_string())
                .or_default() += 1;
        }
    }

    pub fn translated_axioms(&self) -> usize {
        self.shapes.values().sum()
    }

    pub fn skipped_axioms(&self) -> usize {
        self.skipped.values().sum()
    }
}
