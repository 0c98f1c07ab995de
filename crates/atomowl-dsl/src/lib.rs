//! Atomese logic-graph vocabulary for atomowl
//!
//! This crate defines the translation *target*: a small first-order logic
//! graph built from concept/predicate nodes, conjunction/disjunction,
//! subset/inheritance/similarity links, and existential "satisfying set"
//! scopes. It also provides the deterministic S-expression serializer and the
//! output digest used for diff-based regression checks.
//!
//! Nothing here knows about OWL; the importer lives in `atomowl-ingest-owl`.

pub mod atom;
pub mod digest;
pub mod sexpr;

pub use atom::{Atom, AtomView};
