//! Auxiliary cross-reference tables.
//!
//! Loaded once before translation and read-only afterwards:
//!
//! - two property label tables (relation ontology, upper/annotation ontology),
//!   keyed by the local name of the property IRI;
//! - the id map (`source_id \t target_id \t kind`), partitioned by kind.
//!
//! Tables are plain values threaded through the translator; nothing here is
//! global.

use crate::config::IsAAliasPolicy;
use crate::error::{IngestError, TableError};
use crate::ids::local_name;
use crate::namespaces::{OWL_NS, RDFS_NS, RDF_NS};
use crate::xml::{parse_document_from_path, XmlElement};
use std::collections::BTreeMap;
use std::path::Path;

/// Longest alias chain accepted by [`AliasTable::validate`].
pub const MAX_ALIAS_DEPTH: usize = 32;

// ============================================================================
// Property labels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Annotation,
    Object,
}

impl PropertyKind {
    fn element_name(self) -> &'static str {
        match self {
            PropertyKind::Annotation => "AnnotationProperty",
            PropertyKind::Object => "ObjectProperty",
        }
    }
}

/// Property local name (e.g. `BFO_0000050`) → human label (`part of`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyLabels {
    labels: BTreeMap<String, String>,
}

impl PropertyLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(key.into(), label.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Collect labels of the top-level property declarations of `kinds`.
    ///
    /// Declarations without `rdf:about` or without an `rdfs:label` are skipped.
    pub fn from_document(root: &XmlElement, kinds: &[PropertyKind]) -> Self {
        let mut out = Self::new();
        for kind in kinds {
            for element in root.children_named(OWL_NS, kind.element_name()) {
                let Some(about) = element.attr(RDF_NS, "about") else {
                    continue;
                };
                let Some(label) = element.child(RDFS_NS, "label").and_then(XmlElement::text)
                else {
                    tracing::debug!(property = %about, "property has no label");
                    continue;
                };
                out.insert(local_name(about), label);
            }
        }
        out
    }

    pub fn from_path(path: &Path, kinds: &[PropertyKind]) -> Result<Self, IngestError> {
        let root = parse_document_from_path(path)?;
        let labels = Self::from_document(&root, kinds);
        tracing::info!(path = %path.display(), labels = labels.len(), "loaded property labels");
        Ok(labels)
    }
}

// ============================================================================
// Alias / exact id map
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    exact: BTreeMap<String, String>,
    is_a: BTreeMap<String, String>,
    /// Relation kinds other than `exact`/`is_a`, in file order.
    unknown_kinds: Vec<String>,
    malformed_rows: usize,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_exact(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let (from, to) = (from.into(), to.into());
        if from != to {
            self.exact.insert(from, to);
        }
    }

    pub fn insert_is_a(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let (from, to) = (from.into(), to.into());
        if from != to {
            self.is_a.insert(from, to);
        }
    }

    /// Parse the tab-separated id map. The relation kind is the last column.
    pub fn from_tsv_str(text: &str) -> Self {
        let mut table = Self::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() < 3 {
                table.malformed_rows += 1;
                tracing::warn!(line = line_no + 1, "id map row has fewer than 3 columns");
                continue;
            }
            let (source, target) = (columns[0].trim(), columns[1].trim());
            let kind = columns[columns.len() - 1].trim();
            match kind {
                "exact" => table.insert_exact(source, target),
                "is_a" => table.insert_is_a(source, target),
                other => {
                    tracing::warn!(line = line_no + 1, kind = %other, "unknown id map relation");
                    table.unknown_kinds.push(other.to_string());
                }
            }
        }
        table
    }

    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
        let table = Self::from_tsv_str(&text);
        tracing::info!(
            path = %path.display(),
            exact = table.exact.len(),
            is_a = table.is_a.len(),
            unknown = table.unknown_kinds.len(),
            "loaded id map"
        );
        Ok(table)
    }

    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_a_len(&self) -> usize {
        self.is_a.len()
    }

    pub fn unknown_kinds(&self) -> &[String] {
        &self.unknown_kinds
    }

    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// One rewrite step. `exact` takes precedence over `is_a`.
    pub fn step(&self, id: &str, policy: IsAAliasPolicy) -> Option<&str> {
        if let Some(target) = self.exact.get(id) {
            return Some(target);
        }
        match policy {
            IsAAliasPolicy::Apply => self.is_a.get(id).map(String::as_str),
            IsAAliasPolicy::Ignore => None,
        }
    }

    /// Follow the alias chain from `id` to its end, at most [`MAX_ALIAS_DEPTH`] steps.
    pub fn resolve<'a>(&'a self, id: &'a str, policy: IsAAliasPolicy) -> &'a str {
        let mut current = id;
        for _ in 0..MAX_ALIAS_DEPTH {
            match self.step(current, policy) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Prove every chain reachable under `policy` terminates.
    pub fn validate(&self, policy: IsAAliasPolicy) -> Result<(), TableError> {
        let keys = self.exact.keys().chain(match policy {
            IsAAliasPolicy::Apply => Some(self.is_a.keys()),
            IsAAliasPolicy::Ignore => None,
        }
        .into_iter()
        .flatten());

        for start in keys {
            let mut chain = vec![start.as_str()];
            let mut current = start.as_str();
            while let Some(next) = self.step(current, policy) {
                if let Some(pos) = chain.iter().position(|seen| *seen == next) {
                    let mut cycle: Vec<String> =
                        chain[pos..].iter().map(|s| s.to_string()).collect();
                    cycle.push(next.to_string());
                    return Err(TableError::AliasCycle { chain: cycle });
                }
                if chain.len() > MAX_ALIAS_DEPTH {
                    return Err(TableError::AliasChainTooLong {
                        start: start.clone(),
                        limit: MAX_ALIAS_DEPTH,
                    });
                }
                chain.push(next);
                current = next;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// All auxiliary tables of one run.
#[derive(Debug, Clone, Default)]
pub struct AuxTables {
    pub ro: PropertyLabels,
    pub iao: PropertyLabels,
    pub aliases: AliasTable,
}

impl AuxTables {
    /// Load whichever tables are given; omitted ones are empty.
    ///
    /// The relation ontology contributes annotation and object properties;
    /// the upper ontology contributes annotation properties only.
    pub fn load(
        ro: Option<&Path>,
        iao: Option<&Path>,
        id_map: Option<&Path>,
    ) -> Result<Self, IngestError> {
        let ro = match ro {
            Some(path) => PropertyLabels::from_path(
                path,
                &[PropertyKind::Annotation, PropertyKind::Object],
            )?,
            None => PropertyLabels::new(),
        };
        let iao = match iao {
            Some(path) => PropertyLabels::from_path(path, &[PropertyKind::Annotation])?,
            None => PropertyLabels::new(),
        };
        let aliases = match id_map {
            Some(path) => AliasTable::from_path(path)?,
            None => AliasTable::new(),
        };
        Ok(Self { ro, iao, aliases })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    const RO: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
  <owl:AnnotationProperty rdf:about="http://purl.obolibrary.org/obo/IAO_0000115">
    <rdfs:label>definition</rdfs:label>
  </owl:AnnotationProperty>
  <owl:ObjectProperty rdf:about="http://purl.obolibrary.org/obo/BFO_0000050">
    <rdfs:label>part of</rdfs:label>
  </owl:ObjectProperty>
  <owl:ObjectProperty rdf:about="http://purl.obolibrary.org/obo/RO_0000000"/>
</rdf:RDF>"#;

    #[test]
    fn property_labels_respect_requested_kinds() {
        let root = parse_document(RO.as_bytes()).unwrap();
        let both = PropertyLabels::from_document(
            &root,
            &[PropertyKind::Annotation, PropertyKind::Object],
        );
        assert_eq!(both.get("BFO_0000050"), Some("part of"));
        assert_eq!(both.get("IAO_0000115"), Some("definition"));
        assert_eq!(both.get("RO_0000000"), None);

        let annotations = PropertyLabels::from_document(&root, &[PropertyKind::Annotation]);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations.get("BFO_0000050"), None);
    }

    #[test]
    fn id_map_partitions_rows_by_kind() {
        let table = AliasTable::from_tsv_str(
            "PR:000001\tUniProt:P12345\texact\nPR:000002\tPR:000003\tis_a\nPR:9\tX:9\tbroad\nshort\trow\n\n",
        );
        assert_eq!(table.exact_len(), 1);
        assert_eq!(table.is_a_len(), 1);
        assert_eq!(table.unknown_kinds(), ["broad".to_string()]);
        assert_eq!(table.malformed_rows(), 1);
    }

    #[test]
    fn is_a_partition_is_consulted_only_when_applied() {
        let table = AliasTable::from_tsv_str("PR:2\tPR:3\tis_a\n");
        assert_eq!(table.resolve("PR:2", IsAAliasPolicy::Ignore), "PR:2");
        assert_eq!(table.resolve("PR:2", IsAAliasPolicy::Apply), "PR:3");
    }

    #[test]
    fn chains_resolve_to_fixpoint() {
        let mut table = AliasTable::new();
        table.insert_exact("A:1", "B:1");
        table.insert_exact("B:1", "C:1");
        assert_eq!(table.resolve("A:1", IsAAliasPolicy::Ignore), "C:1");
        assert!(table.validate(IsAAliasPolicy::Ignore).is_ok());
    }

    #[test]
    fn self_mappings_are_dropped() {
        let table = AliasTable::from_tsv_str("A:1\tA:1\texact\n");
        assert_eq!(table.exact_len(), 0);
    }

    #[test]
    fn cycles_are_reported_with_their_chain() {
        let mut table = AliasTable::new();
        table.insert_exact("A:1", "B:1");
        table.insert_exact("B:1", "A:1");
        let err = table.validate(IsAAliasPolicy::Ignore).unwrap_err();
        assert_eq!(
            err,
            TableError::AliasCycle {
                chain: vec!["A:1".into(), "B:1".into(), "A:1".into()]
            }
        );
    }

    #[test]
    fn cycle_through_is_a_only_matters_when_applied() {
        let mut table = AliasTable::new();
        table.insert_exact("A:1", "B:1");
        table.insert_is_a("B:1", "A:1");
        assert!(table.validate(IsAAliasPolicy::Ignore).is_ok());
        assert!(matches!(
            table.validate(IsAAliasPolicy::Apply),
            Err(TableError::AliasCycle { .. })
        ));
    }

    #[test]
    fn overly_long_chains_are_rejected() {
        let mut table = AliasTable::new();
        for i in 0..=MAX_ALIAS_DEPTH + 1 {
            table.insert_exact(format!("N:{i}"), format!("N:{}", i + 1));
        }
        assert!(matches!(
            table.validate(IsAAliasPolicy::Ignore),
            Err(TableError::AliasChainTooLong { .. })
        ));
    }
}
