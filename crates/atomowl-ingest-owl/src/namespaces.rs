//! XML namespace extraction.
//!
//! Collects every `xmlns` / `xmlns:prefix` binding declared anywhere in a
//! document by streaming over start tags; no element tree is built. When the
//! same prefix is bound twice, the later declaration wins.

use crate::error::IngestError;
use quick_xml::events::Event;
use quick_xml::name::PrefixDeclaration;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const OBO_IN_OWL_NS: &str = "http://www.geneontology.org/formats/oboInOwl#";
pub const OBO_NS: &str = "http://purl.obolibrary.org/obo/";

/// Prefix → namespace URI. The default namespace is stored under `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    bindings: BTreeMap<String, String>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    pub fn contains_uri(&self, uri: &str) -> bool {
        self.bindings.values().any(|v| v == uri)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand `prefix:local` against the map. Unknown prefixes yield `None`.
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        self.get(prefix).map(|ns| format!("{ns}{local}"))
    }
}

/// Stream `reader` and collect its namespace bindings.
pub fn extract_namespaces<R: BufRead>(reader: R) -> Result<NamespaceMap, IngestError> {
    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut map = NamespaceMap::new();

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            IngestError::malformed(format!("XML error at byte {position}: {e}"))
        })?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| {
                        IngestError::malformed(format!("bad attribute at byte {position}: {e}"))
                    })?;
                    let Some(binding) = attr.key.as_namespace_binding() else {
                        continue;
                    };
                    let prefix = match binding {
                        PrefixDeclaration::Default => String::new(),
                        PrefixDeclaration::Named(p) => String::from_utf8_lossy(p).into_owned(),
                    };
                    let uri = match attr.unescape_value() {
                        Ok(v) => v.into_owned(),
                        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                    };
                    map.insert(prefix, uri);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

pub fn extract_namespaces_from_path(path: &Path) -> Result<NamespaceMap, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    extract_namespaces(BufReader::new(file))
}
