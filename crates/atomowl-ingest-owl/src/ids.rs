//! Identifier canonicalization and property resolution.
//!
//! Both functions are total: any input string produces an output string, and
//! unknown ids degrade to a best-effort passthrough.

use crate::config::IsAAliasPolicy;
use crate::tables::{AliasTable, AuxTables, PropertyLabels};
use std::borrow::Cow;

/// Last `/` or `#` separated segment of an IRI (`GO_0008150` from
/// `http://purl.obolibrary.org/obo/GO_0008150`). Trailing separators are
/// ignored; a string without separators is returned as-is.
pub fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['#', '/']);
    trimmed.rsplit(['#', '/']).next().unwrap_or(trimmed)
}

/// `PREFIX_LOCAL` → `PREFIX:LOCAL`.
///
/// Only the first two underscore-separated segments are kept, so
/// `NCBITaxon_Union_0000006` becomes `NCBITaxon:Union`. Ids that already
/// contain `:` and ids without a non-empty prefix and local segment pass
/// through unchanged, which keeps the rewrite idempotent.
pub fn underscore_to_colon(raw: &str) -> Cow<'_, str> {
    if raw.contains(':') {
        return Cow::Borrowed(raw);
    }
    let mut segments = raw.split('_');
    match (segments.next(), segments.next()) {
        (Some(prefix), Some(local)) if !prefix.is_empty() && !local.is_empty() => {
            Cow::Owned(format!("{prefix}:{local}"))
        }
        _ => Cow::Borrowed(raw),
    }
}

/// Canonical form of a class id: underscore rewrite, then the alias chain.
pub fn canonicalize(raw: &str, aliases: &AliasTable, policy: IsAAliasPolicy) -> String {
    let rewritten = underscore_to_colon(raw);
    aliases.resolve(&rewritten, policy).to_string()
}

/// Whether a property fragment looks like an ontology term id
/// (`BFO_0000050`, `RO_0002202`) rather than a bare relation name (`part_of`).
fn is_term_like(fragment: &str) -> bool {
    fragment
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Human-readable relation name of a property.
///
/// Lookup order: relation ontology, upper ontology, then the labels declared
/// in the document itself. Term-like fragments missing from every table fall
/// back to their canonical id; anything else is used verbatim, so a bare
/// relation name like `part_of` is never rewritten to `part:of` (unlike class
/// ids, which always go through [`canonicalize`]).
pub fn resolve_property(
    fragment: &str,
    ro: &PropertyLabels,
    iao: &PropertyLabels,
    local: &PropertyLabels,
    aliases: &AliasTable,
    policy: IsAAliasPolicy,
) -> String {
    if let Some(label) = ro
        .get(fragment)
        .or_else(|| iao.get(fragment))
        .or_else(|| local.get(fragment))
    {
        return label.to_string();
    }
    if is_term_like(fragment) {
        canonicalize(fragment, aliases, policy)
    } else {
        fragment.to_string()
    }
}

/// Resolution context for one document: the run's tables plus the
/// document-local property labels.
#[derive(Debug, Clone, Copy)]
pub struct IdResolver<'a> {
    pub tables: &'a AuxTables,
    pub local_properties: &'a PropertyLabels,
    pub policy: IsAAliasPolicy,
}

impl<'a> IdResolver<'a> {
    pub fn new(
        tables: &'a AuxTables,
        local_properties: &'a PropertyLabels,
        policy: IsAAliasPolicy,
    ) -> Self {
        Self {
            tables,
            local_properties,
            policy,
        }
    }

    /// Canonical id of a class given by IRI, CURIE-like id, or bare fragment.
    pub fn class(&self, iri_or_id: &str) -> String {
        canonicalize(local_name(iri_or_id), &self.tables.aliases, self.policy)
    }

    pub fn property(&self, iri: &str) -> String {
        resolve_property(
            local_name(iri),
            &self.tables.ro,
            &self.tables.iao,
            self.local_properties,
            &self.tables.aliases,
            self.policy,
        )
    }
}
