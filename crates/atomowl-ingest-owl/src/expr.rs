//! Class-expression tree and the parsed ontology document.
//!
//! Both source dialects (RDF/XML and functional syntax) are read into these
//! types; the matcher and builder never look at the serialized text again.

use crate::namespaces::NamespaceMap;
use crate::tables::PropertyLabels;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Class expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassExpression {
    /// A named class: full IRI, prefixed id, or bare fragment.
    Named(String),
    /// `ObjectSomeValuesFrom(property filler)`.
    SomeValuesFrom {
        property: String,
        filler: Box<ClassExpression>,
    },
    IntersectionOf(Vec<ClassExpression>),
    UnionOf(Vec<ClassExpression>),
    /// A constructor with no logic-node counterpart.
    Unsupported(UnsupportedConstruct),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedConstruct {
    MinCardinality,
    MaxCardinality,
    ExactCardinality,
    HasSelf,
    AllValuesFrom,
    HasValue,
    ComplementOf,
    OneOf,
    InverseProperty,
    Other(String),
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnsupportedConstruct::MinCardinality => "ObjectMinCardinality",
            UnsupportedConstruct::MaxCardinality => "ObjectMaxCardinality",
            UnsupportedConstruct::ExactCardinality => "ObjectExactCardinality",
            UnsupportedConstruct::HasSelf => "ObjectHasSelf",
            UnsupportedConstruct::AllValuesFrom => "ObjectAllValuesFrom",
            UnsupportedConstruct::HasValue => "ObjectHasValue",
            UnsupportedConstruct::ComplementOf => "ObjectComplementOf",
            UnsupportedConstruct::OneOf => "ObjectOneOf",
            UnsupportedConstruct::InverseProperty => "ObjectInverseOf",
            UnsupportedConstruct::Other(name) => name,
        };
        f.write_str(name)
    }
}

impl ClassExpression {
    pub fn named(iri: impl Into<String>) -> Self {
        ClassExpression::Named(iri.into())
    }

    pub fn some(property: impl Into<String>, filler: ClassExpression) -> Self {
        ClassExpression::SomeValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, ClassExpression::Named(_))
    }

    /// First unsupported constructor in pre-order, if any.
    pub fn first_unsupported(&self) -> Option<&UnsupportedConstruct> {
        match self {
            ClassExpression::Named(_) => None,
            ClassExpression::Unsupported(construct) => Some(construct),
            ClassExpression::SomeValuesFrom { filler, .. } => filler.first_unsupported(),
            ClassExpression::IntersectionOf(operands) | ClassExpression::UnionOf(operands) => {
                operands.iter().find_map(ClassExpression::first_unsupported)
            }
        }
    }
}

// ============================================================================
// Axioms and documents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxiomKind {
    SubClassOf,
    EquivalentClasses,
}

impl fmt::Display for AxiomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AxiomKind::SubClassOf => "SubClassOf",
            AxiomKind::EquivalentClasses => "EquivalentClasses",
        })
    }
}

/// One `SubClassOf` (operands `[sub, super]`) or `EquivalentClasses`
/// (two or more operands) axiom.
///
/// `operands` is `Err` when the axiom could not be read into a tree at all;
/// the message is reported as a malformed-axiom skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axiom {
    pub kind: AxiomKind,
    pub operands: Result<Vec<ClassExpression>, String>,
    /// Where the axiom came from (`byte 812`, `line 40`).
    pub locator: String,
}

impl Axiom {
    pub fn new(kind: AxiomKind, operands: Vec<ClassExpression>, locator: impl Into<String>) -> Self {
        Self {
            kind,
            operands: Ok(operands),
            locator: locator.into(),
        }
    }

    pub fn malformed(kind: AxiomKind, message: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            kind,
            operands: Err(message.into()),
            locator: locator.into(),
        }
    }
}

/// A declared class and the axioms whose left operand it is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassDeclaration {
    /// Raw id (`oboInOwl:id` text or class IRI); canonicalized by the driver.
    pub id: String,
    pub label: Option<String>,
    pub obsolete: bool,
    /// `oboInOwl:inSubset` local names.
    pub subsets: Vec<String>,
    pub equivalents: Vec<Axiom>,
    pub parents: Vec<Axiom>,
    pub locator: String,
}

impl ClassDeclaration {
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
            ..Self::default()
        }
    }
}

/// Everything the driver needs from one ontology document.
#[derive(Debug, Clone, Default)]
pub struct OntologyDocument {
    pub namespaces: NamespaceMap,
    /// Declaration order.
    pub classes: Vec<ClassDeclaration>,
    /// Axioms whose left operand is not a named class.
    pub general_axioms: Vec<Axiom>,
    /// Property labels declared in the document itself.
    pub property_labels: PropertyLabels,
}
