//! Namespace-resolved XML element tree.
//!
//! RDF/XML class expressions nest arbitrarily (`rdfs:subClassOf` →
//! `owl:Class` → `owl:intersectionOf` → `owl:Restriction` → ...), so axioms are
//! read as a real tree and matched structurally instead of by counting tag
//! offsets in the serialized text.
//!
//! Every element and attribute name is resolved to `(namespace URI, local
//! name)` at parse time; callers never see prefixes.

use crate::error::IngestError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub local_name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data directly under this element.
    pub text: String,
    /// Byte offset of the start tag, for diagnostics.
    pub position: usize,
}

impl XmlElement {
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }

    pub fn attr(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children
            .iter()
            .filter(move |c| c.is(namespace, local_name))
    }

    pub fn child(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(namespace, local_name))
    }

    /// Trimmed text, `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let t = self.text.trim();
        (!t.is_empty()).then_some(t)
    }

    /// `{namespace}local` form, used in diagnostics.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{ns}}}{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Namespace the reserved `xml:` prefix is bound to without a declaration.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

fn resolved_namespace(
    result: ResolveResult<'_>,
    position: usize,
) -> Result<Option<String>, IngestError> {
    match result {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML_NS.to_string())),
        ResolveResult::Unknown(prefix) => Err(IngestError::malformed(format!(
            "undeclared namespace prefix `{}` at byte {position}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn open_element<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    position: usize,
) -> Result<XmlElement, IngestError> {
    let (ns, local) = reader.resolve_element(start.name());
    let namespace = resolved_namespace(ns, position)?;
    let local_name = String::from_utf8_lossy(local.as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            IngestError::malformed(format!("bad attribute at byte {position}: {e}"))
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        let namespace = resolved_namespace(ns, position)?;
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = quick_xml::escape::unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or(raw);
        attributes.push(XmlAttribute {
            namespace,
            local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value,
        });
    }

    Ok(XmlElement {
        namespace,
        local_name,
        attributes,
        children: Vec::new(),
        text: String::new(),
        position,
    })
}

fn close(
    element: XmlElement,
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
) -> Result<(), IngestError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(IngestError::malformed(format!(
                "second root element `{}` at byte {}",
                element.qualified_name(),
                element.position
            )))
        }
    }
    Ok(())
}

/// Parse a whole document into its root element.
pub fn parse_document<R: BufRead>(source: R) -> Result<XmlElement, IngestError> {
    let mut reader = NsReader::from_reader(source);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            IngestError::malformed(format!("XML error at byte {position}: {e}"))
        })?;
        match event {
            Event::Start(ref e) => {
                let element = open_element(&reader, e, position)?;
                stack.push(element);
            }
            Event::Empty(ref e) => {
                let element = open_element(&reader, e, position)?;
                close(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    IngestError::malformed(format!("unbalanced end tag at byte {position}"))
                })?;
                close(element, &mut stack, &mut root)?;
            }
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned());
                    top.text.push_str(&text);
                }
            }
            Event::CData(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(IngestError::malformed(format!(
            "document ended inside `{}` opened at byte {}",
            open.qualified_name(),
            open.position
        )));
    }
    root.ok_or_else(|| IngestError::malformed("document has no root element"))
}

pub fn parse_document_from_path(path: &Path) -> Result<XmlElement, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    parse_document(BufReader::new(file))
}
