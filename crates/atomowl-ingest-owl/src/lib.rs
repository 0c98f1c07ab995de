//! OWL class-expression ingestion for atomowl.
//!
//! This crate turns an OWL ontology (RDF/XML or functional syntax) into a flat
//! list of Atomese logic statements:
//!
//! - `namespaces` / `xml`: streaming prefix extraction and a
//!   namespace-resolved element tree;
//! - `tables`: property label tables and the id alias map, loaded once;
//! - `ids`: identifier canonicalization and property resolution;
//! - `rdfxml` / `functional`: dialect readers producing [`OntologyDocument`];
//! - `shape`: the structural pattern matcher;
//! - `builder`: the recursive logic-expression builder;
//! - `driver`: per-class iteration, skip accounting, and the run report.
//!
//! Auxiliary tables are explicit values passed into the [`Translator`]; there
//! is no global state, and a run over the same inputs is byte-for-byte
//! reproducible.

pub mod builder;
pub mod config;
pub mod driver;
pub mod error;
pub mod expr;
pub mod functional;
pub mod ids;
pub mod namespaces;
pub mod rdfxml;
pub mod report;
pub mod shape;
pub mod tables;
pub mod xml;

pub use config::TranslatorConfig;
pub use driver::{Translation, Translator};
pub use error::{IngestError, SkipReason, TableError};
pub use expr::{Axiom, AxiomKind, ClassDeclaration, ClassExpression, OntologyDocument};
pub use ids::{canonicalize, resolve_property};
pub use report::TranslationReport;
pub use shape::{AxiomShape, MarkerCounts};
pub use tables::{AliasTable, AuxTables, PropertyLabels};

use std::path::Path;

/// Load the auxiliary tables and translate one ontology file.
pub fn translate_file(
    ontology: &Path,
    ro: Option<&Path>,
    iao: Option<&Path>,
    id_map: Option<&Path>,
    config: TranslatorConfig,
) -> Result<Translation, IngestError> {
    let tables = AuxTables::load(ro, iao, id_map)?;
    Translator::new(tables, config)?.translate_path(ontology)
}
