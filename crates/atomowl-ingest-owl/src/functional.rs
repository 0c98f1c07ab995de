//! OWL functional-syntax reader.
//!
//! The document is first parsed with `nom` into a generic term tree
//! (`Name(args...)`, `<iri>`, `prefix:name`, `"literal"`), then interpreted
//! into the same [`OntologyDocument`] the RDF/XML reader produces.
//!
//! Header comments written by the OWL API (`# Class: obo:CL_0000000 (cell)`,
//! `# Object Property: obo:BFO_0000050 (part of)`) are scanned separately;
//! they supply class labels missing from annotations and document-local
//! property labels.

use crate::error::IngestError;
use crate::expr::{
    Axiom, AxiomKind, ClassDeclaration, ClassExpression, OntologyDocument, UnsupportedConstruct,
};
use crate::ids::local_name;
use crate::namespaces::{NamespaceMap, OBO_IN_OWL_NS, OWL_NS, RDFS_NS};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char as pchar, multispace1, not_line_ending, space0},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded},
    IResult,
};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Term syntax
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Call {
        name: String,
        args: Vec<Term>,
        offset: usize,
    },
    Iri(String),
    Name(String),
    Literal(String),
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(pchar('#'), not_line_ending))(input)
}

/// Whitespace and `#` comments.
fn ws(input: &str) -> IResult<&str, ()> {
    map(many0_count(alt((multispace1, comment))), |_| ())(input)
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '<' | '>' | '"' | '#')
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

fn full_iri(input: &str) -> IResult<&str, &str> {
    delimited(pchar('<'), take_till(|c| c == '>'), pchar('>'))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = pchar('"')(input)?;
    let mut out = String::new();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some('"') => {
                rest = chars.as_str();
                break;
            }
            Some('\\') => {
                let escaped = chars.next().ok_or_else(|| {
                    nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Escaped))
                })?;
                out.push(escaped);
                rest = chars.as_str();
            }
            Some(c) => {
                out.push(c);
                rest = chars.as_str();
            }
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )))
            }
        }
    }
    Ok((rest, out))
}

/// `"text"`, `"text"@en`, `"true"^^xsd:boolean`.
fn literal(input: &str) -> IResult<&str, String> {
    let (input, text) = quoted(input)?;
    let (input, _) = opt(alt((
        recognize(pair(tag("^^"), alt((full_iri, name)))),
        recognize(pair(pchar('@'), take_while(|c: char| c.is_alphanumeric() || c == '-'))),
    )))(input)?;
    Ok((input, text))
}

fn call<'a>(input: &'a str, total: usize) -> IResult<&'a str, Term> {
    let offset = total - input.len();
    let (input, head) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;
    let (input, _) = preceded(space0, pchar('('))(input)?;
    let (input, args) = many0(preceded(ws, |i: &'a str| term(i, total)))(input)?;
    let (input, _) = preceded(ws, pchar(')'))(input)?;
    Ok((
        input,
        Term::Call {
            name: head.to_string(),
            args,
            offset,
        },
    ))
}

fn term<'a>(input: &'a str, total: usize) -> IResult<&'a str, Term> {
    alt((
        |i: &'a str| call(i, total),
        map(full_iri, |s: &str| Term::Iri(s.to_string())),
        map(literal, Term::Literal),
        map(name, |s: &str| Term::Name(s.to_string())),
    ))(input)
}

fn terms<'a>(input: &'a str, total: usize) -> IResult<&'a str, Vec<Term>> {
    let (input, terms) = many0(preceded(ws, |i: &'a str| term(i, total)))(input)?;
    let (input, _) = ws(input)?;
    Ok((input, terms))
}

fn parse_terms<'a>(text: &'a str, lines: &LineIndex) -> Result<Vec<Term>, IngestError> {
    let total = text.len();
    let parsed = all_consuming(|i: &'a str| terms(i, total))(text);
    parsed
        .map(|(_, terms)| terms)
        .map_err(|e| {
            let offset = match &e {
                nom::Err::Error(e) | nom::Err::Failure(e) => total - e.input.len(),
                nom::Err::Incomplete(_) => total,
            };
            IngestError::malformed(format!(
                "functional syntax error at line {}",
                lines.line_of(offset)
            ))
        })
}

/// Byte offset → 1-based line number.
#[derive(Debug, Default)]
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|start| *start <= offset).max(1)
    }
}

// ============================================================================
// Header comments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
    Class,
    ObjectProperty,
    AnnotationProperty,
}

/// `# Class: obo:CL_0000000 (cell)` → `(Class, "obo:CL_0000000", "cell")`.
fn parse_header(line: &str) -> Option<(HeaderKind, &str, &str)> {
    fn parser(input: &str) -> IResult<&str, (HeaderKind, &str)> {
        let (input, _) = pchar('#')(input)?;
        let (input, _) = space0(input)?;
        let (input, kind) = alt((
            map(tag("Class:"), |_| HeaderKind::Class),
            map(tag("Object Property:"), |_| HeaderKind::ObjectProperty),
            map(tag("Annotation Property:"), |_| HeaderKind::AnnotationProperty),
        ))(input)?;
        let (input, _) = space0(input)?;
        let (input, subject) = alt((full_iri, name))(input)?;
        let (input, _) = space0(input)?;
        let (input, _) = pchar('(')(input)?;
        Ok((input, (kind, subject)))
    }

    let (rest, (kind, subject)) = parser(line.trim()).ok()?;
    let label = rest.strip_suffix(')')?.trim();
    (!label.is_empty()).then_some((kind, subject, label))
}

// ============================================================================
// Interpretation
// ============================================================================

#[derive(Default)]
struct Interpreter<'a> {
    text: &'a str,
    lines: LineIndex,
    namespaces: NamespaceMap,
    saw_ontology: bool,
    class_order: Vec<String>,
    classes: BTreeMap<String, ClassDeclaration>,
    labels: BTreeMap<String, String>,
    deprecated: BTreeSet<String>,
    subsets: BTreeMap<String, Vec<String>>,
    properties: BTreeSet<String>,
    general_axioms: Vec<Axiom>,
}

impl<'a> Interpreter<'a> {
    fn locator(&self, offset: usize) -> String {
        format!("line {}", self.lines.line_of(offset))
    }

    fn expand(&self, name: &str) -> String {
        self.namespaces.expand(name).unwrap_or_else(|| name.to_string())
    }

    fn entity(&self, term: &Term) -> Option<String> {
        match term {
            Term::Iri(iri) => Some(iri.clone()),
            Term::Name(name) => Some(self.expand(name)),
            _ => None,
        }
    }

    fn declare_class(&mut self, iri: &str, offset: usize) -> &mut ClassDeclaration {
        if !self.classes.contains_key(iri) {
            self.class_order.push(iri.to_string());
        }
        let locator = self.locator(offset);
        self.classes
            .entry(iri.to_string())
            .or_insert_with(|| ClassDeclaration::new(iri, locator))
    }

    fn expression(&self, term: &Term) -> Result<ClassExpression, String> {
        let (name, args) = match term {
            Term::Iri(_) | Term::Name(_) => {
                return self
                    .entity(term)
                    .map(ClassExpression::Named)
                    .ok_or_else(|| "expected a class".to_string())
            }
            Term::Literal(text) => {
                return Err(format!("literal \"{text}\" where a class was expected"))
            }
            Term::Call { name, args, .. } => (name.as_str(), args.as_slice()),
        };
        let unsupported = |construct: UnsupportedConstruct| -> Result<ClassExpression, String> {
            Ok(ClassExpression::Unsupported(construct))
        };
        match name {
            "ObjectSomeValuesFrom" => {
                let [property, filler] = args else {
                    return Err(format!(
                        "ObjectSomeValuesFrom expects 2 arguments, got {}",
                        args.len()
                    ));
                };
                let property = match property {
                    Term::Call { name, .. } if name == "ObjectInverseOf" => {
                        return unsupported(UnsupportedConstruct::InverseProperty)
                    }
                    other => self
                        .entity(other)
                        .ok_or_else(|| "ObjectSomeValuesFrom without a property".to_string())?,
                };
                Ok(ClassExpression::some(property, self.expression(filler)?))
            }
            "ObjectIntersectionOf" | "ObjectUnionOf" => {
                if args.is_empty() {
                    return Err(format!("empty {name}"));
                }
                let operands = args
                    .iter()
                    .map(|a| self.expression(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if name == "ObjectIntersectionOf" {
                    ClassExpression::IntersectionOf(operands)
                } else {
                    ClassExpression::UnionOf(operands)
                })
            }
            "ObjectAllValuesFrom" => unsupported(UnsupportedConstruct::AllValuesFrom),
            "ObjectHasValue" => unsupported(UnsupportedConstruct::HasValue),
            "ObjectHasSelf" => unsupported(UnsupportedConstruct::HasSelf),
            "ObjectMinCardinality" => unsupported(UnsupportedConstruct::MinCardinality),
            "ObjectMaxCardinality" => unsupported(UnsupportedConstruct::MaxCardinality),
            "ObjectExactCardinality" => unsupported(UnsupportedConstruct::ExactCardinality),
            "ObjectComplementOf" => unsupported(UnsupportedConstruct::ComplementOf),
            "ObjectOneOf" => unsupported(UnsupportedConstruct::OneOf),
            other => unsupported(UnsupportedConstruct::Other(other.to_string())),
        }
    }

    /// Axiom arguments without leading `Annotation(...)` terms.
    fn strip_annotations(args: &[Term]) -> &[Term] {
        let skip = args
            .iter()
            .take_while(|a| matches!(a, Term::Call { name, .. } if name == "Annotation"))
            .count();
        &args[skip..]
    }

    fn class_axiom(&mut self, kind: AxiomKind, args: &[Term], offset: usize) {
        let args = Self::strip_annotations(args);
        let locator = self.locator(offset);
        let arity_ok = match kind {
            AxiomKind::SubClassOf => args.len() == 2,
            AxiomKind::EquivalentClasses => args.len() >= 2,
        };
        let axiom = if !arity_ok {
            Axiom::malformed(kind, format!("{kind} with {} operands", args.len()), locator)
        } else {
            match args
                .iter()
                .map(|a| self.expression(a))
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(operands) => Axiom::new(kind, operands, locator),
                Err(message) => Axiom::malformed(kind, message, locator),
            }
        };

        let subject = match &axiom.operands {
            Ok(operands) => match operands.first() {
                Some(ClassExpression::Named(iri)) => Some(iri.clone()),
                _ => None,
            },
            Err(_) => args.first().and_then(|t| match t {
                Term::Iri(_) | Term::Name(_) => self.entity(t),
                _ => None,
            }),
        };
        match subject {
            Some(iri) => {
                let class = self.declare_class(&iri, offset);
                match kind {
                    AxiomKind::SubClassOf => class.parents.push(axiom),
                    AxiomKind::EquivalentClasses => class.equivalents.push(axiom),
                }
            }
            None => self.general_axioms.push(axiom),
        }
    }

    fn annotation_assertion(&mut self, args: &[Term]) {
        let args = Self::strip_annotations(args);
        let [property, subject, value, ..] = args else {
            return;
        };
        let (Some(property), Some(subject)) = (self.entity(property), self.entity(subject)) else {
            return;
        };
        match (property.as_str(), value) {
            (p, Term::Literal(text)) if p == format!("{RDFS_NS}label") => {
                self.labels.entry(subject).or_insert_with(|| text.clone());
            }
            (p, Term::Literal(text)) if p == format!("{OWL_NS}deprecated") => {
                if text.eq_ignore_ascii_case("true") || text == "1" {
                    self.deprecated.insert(subject);
                }
            }
            (p, value) if p == format!("{OBO_IN_OWL_NS}inSubset") => {
                if let Some(set) = self.entity(value) {
                    self.subsets
                        .entry(subject)
                        .or_default()
                        .push(local_name(&set).to_string());
                }
            }
            _ => {}
        }
    }

    fn declaration(&mut self, args: &[Term], offset: usize) {
        let Some(Term::Call { name, args: inner, .. }) = Self::strip_annotations(args).first()
        else {
            return;
        };
        let Some(iri) = inner.first().and_then(|t| self.entity(t)) else {
            return;
        };
        match name.as_str() {
            "Class" => {
                self.declare_class(&iri, offset);
            }
            "ObjectProperty" | "AnnotationProperty" => {
                self.properties.insert(iri);
            }
            _ => {}
        }
    }

    fn visit(&mut self, term: &Term) {
        let Term::Call { name, args, offset } = term else {
            return;
        };
        match name.as_str() {
            "Prefix" => {
                if let [Term::Name(prefix), Term::Iri(iri)] = args.as_slice() {
                    let prefix = prefix.trim_end_matches('=').trim_end_matches(':');
                    self.namespaces.insert(prefix, iri.clone());
                }
            }
            "Ontology" => {
                self.saw_ontology = true;
                for arg in args {
                    self.visit(arg);
                }
            }
            "Declaration" => self.declaration(args, *offset),
            "AnnotationAssertion" => self.annotation_assertion(args),
            "SubClassOf" => self.class_axiom(AxiomKind::SubClassOf, args, *offset),
            "EquivalentClasses" => self.class_axiom(AxiomKind::EquivalentClasses, args, *offset),
            _ => {}
        }
    }

    fn finish(mut self) -> OntologyDocument {
        let mut doc = OntologyDocument {
            namespaces: self.namespaces.clone(),
            general_axioms: std::mem::take(&mut self.general_axioms),
            ..OntologyDocument::default()
        };

        for line in self.text.lines() {
            let Some((kind, subject, label)) = parse_header(line) else {
                continue;
            };
            let iri = self.expand(subject);
            match kind {
                HeaderKind::Class => {
                    self.labels.entry(iri).or_insert_with(|| label.to_string());
                }
                HeaderKind::ObjectProperty | HeaderKind::AnnotationProperty => {
                    doc.property_labels.insert(local_name(&iri), label);
                }
            }
        }
        for property in &self.properties {
            if let Some(label) = self.labels.get(property) {
                doc.property_labels.insert(local_name(property), label.as_str());
            }
        }

        for iri in &self.class_order {
            let Some(mut class) = self.classes.remove(iri) else {
                continue;
            };
            class.label = self.labels.get(iri).cloned();
            class.obsolete = self.deprecated.contains(iri);
            class.subsets = self.subsets.remove(iri).unwrap_or_default();
            doc.classes.push(class);
        }
        doc
    }
}

/// Read an OWL functional-syntax ontology document.
pub fn read_document(text: &str) -> Result<OntologyDocument, IngestError> {
    let lines = LineIndex::new(text);
    let terms = parse_terms(text, &lines)?;
    let mut interpreter = Interpreter {
        text,
        lines,
        ..Interpreter::default()
    };
    for term in &terms {
        interpreter.visit(term);
    }
    if !interpreter.saw_ontology {
        return Err(IngestError::malformed("no `Ontology(...)` block"));
    }
    let doc = interpreter.finish();
    tracing::debug!(
        classes = doc.classes.len(),
        general_axioms = doc.general_axioms.len(),
        property_labels = doc.property_labels.len(),
        "read functional-syntax document"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBO: &str = "http://purl.obolibrary.org/obo/";

    fn obo(local: &str) -> ClassExpression {
        ClassExpression::named(format!("{OBO}{local}"))
    }

    const DOC: &str = r#"Prefix(:=<http://purl.obolibrary.org/obo/hv.owl#>)
Prefix(obo:=<http://purl.obolibrary.org/obo/>)
Prefix(owl:=<http://www.w3.org/2002/07/owl#>)
Prefix(rdfs:=<http://www.w3.org/2000/01/rdf-schema#>)

Ontology(<http://purl.obolibrary.org/obo/hv.owl>

Declaration(Class(obo:CL_0000000))
Declaration(Class(obo:CL_0000001))
Declaration(ObjectProperty(obo:BFO_0000050))

############################
#   Object Properties
############################

# Object Property: obo:BFO_0000050 (part of)

############################
#   Classes
############################

# Class: obo:CL_0000000 (cell)

AnnotationAssertion(rdfs:label obo:CL_0000000 "cell"@en)

# Class: obo:CL_0000001 (primary cultured cell)

AnnotationAssertion(owl:deprecated obo:CL_0000001 "true"^^xsd:boolean)
SubClassOf(Annotation(rdfs:comment "x") obo:CL_0000001 obo:CL_0000000)
SubClassOf(obo:CL_0000001 ObjectSomeValuesFrom(obo:BFO_0000050 obo:UBERON_0000061))
EquivalentClasses(obo:CL_0000001 ObjectIntersectionOf(obo:CL_0000000 ObjectSomeValuesFrom(obo:BFO_0000050 obo:UBERON_0000061)))
SubClassOf(obo:CL_0000001 ObjectMaxCardinality(1 obo:BFO_0000050 obo:CL_0000000))
SubClassOf(ObjectIntersectionOf(obo:CL_0000000 ObjectSomeValuesFrom(obo:BFO_0000050 obo:UBERON_0000061)) obo:CL_0000001)
)
"#;

    #[test]
    fn header_lines_parse() {
        assert_eq!(
            parse_header("# Class: obo:CL_0000000 (cell (sensu lato))"),
            Some((HeaderKind::Class, "obo:CL_0000000", "cell (sensu lato)"))
        );
        assert_eq!(
            parse_header("# Object Property: obo:BFO_0000050 (part of)"),
            Some((HeaderKind::ObjectProperty, "obo:BFO_0000050", "part of"))
        );
        assert_eq!(parse_header("#   Classes"), None);
    }

    #[test]
    fn reads_classes_in_declaration_order() {
        let doc = read_document(DOC).unwrap();
        let ids: Vec<&str> = doc.classes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![format!("{OBO}CL_0000000"), format!("{OBO}CL_0000001")]);
        assert_eq!(doc.classes[0].label.as_deref(), Some("cell"));
        assert_eq!(doc.classes[1].label.as_deref(), Some("primary cultured cell"));
        assert!(doc.classes[1].obsolete);
    }

    #[test]
    fn reads_axioms_into_expression_trees() {
        let doc = read_document(DOC).unwrap();
        let class = &doc.classes[1];
        assert_eq!(class.parents.len(), 3);
        assert_eq!(
            class.parents[0].operands,
            Ok(vec![obo("CL_0000001"), obo("CL_0000000")])
        );
        assert_eq!(
            class.parents[1].operands,
            Ok(vec![
                obo("CL_0000001"),
                ClassExpression::some(format!("{OBO}BFO_0000050"), obo("UBERON_0000061")),
            ])
        );
        assert_eq!(
            class.parents[2].operands.as_ref().unwrap()[1],
            ClassExpression::Unsupported(UnsupportedConstruct::MaxCardinality)
        );
        assert_eq!(class.equivalents.len(), 1);
        assert_eq!(class.parents[0].locator, "line 29");
    }

    #[test]
    fn anonymous_left_operand_is_a_general_axiom() {
        let doc = read_document(DOC).unwrap();
        assert_eq!(doc.general_axioms.len(), 1);
        assert!(matches!(
            doc.general_axioms[0].operands.as_ref().unwrap()[0],
            ClassExpression::IntersectionOf(_)
        ));
    }

    #[test]
    fn header_property_labels_are_document_local() {
        let doc = read_document(DOC).unwrap();
        assert_eq!(doc.property_labels.get("BFO_0000050"), Some("part of"));
        assert_eq!(
            doc.namespaces.get("obo"),
            Some("http://purl.obolibrary.org/obo/")
        );
    }

    #[test]
    fn unbalanced_parentheses_are_malformed() {
        let err = read_document("Ontology(<x>\nSubClassOf(a b\n").unwrap_err();
        assert!(matches!(err, IngestError::MalformedDocument(_)));
    }

    #[test]
    fn syntax_error_names_the_offending_line() {
        let err = read_document("Ontology(<x>\n)\n)\n").unwrap_err();
        let IngestError::MalformedDocument(message) = err else {
            panic!("expected malformed document, got {err:?}");
        };
        assert!(message.contains("line 3"), "{message}");
    }

    #[test]
    fn missing_ontology_block_is_malformed() {
        let err = read_document("Prefix(obo:=<http://purl.obolibrary.org/obo/>)\n").unwrap_err();
        assert!(matches!(err, IngestError::MalformedDocument(_)));
    }
}
