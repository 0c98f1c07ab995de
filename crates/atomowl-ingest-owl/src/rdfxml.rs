//! RDF/XML reader.
//!
//! Walks the top-level `owl:Class` elements of an `rdf:RDF` document and reads
//! their `owl:equivalentClass` / `rdfs:subClassOf` children into
//! [`ClassExpression`] trees. Anonymous top-level classes and restrictions
//! that carry axioms of their own are general class axioms.

use crate::error::IngestError;
use crate::expr::{
    Axiom, AxiomKind, ClassDeclaration, ClassExpression, OntologyDocument, UnsupportedConstruct,
};
use crate::ids::local_name;
use crate::namespaces::{extract_namespaces, OBO_IN_OWL_NS, OWL_NS, RDFS_NS, RDF_NS};
use crate::tables::{PropertyKind, PropertyLabels};
use crate::xml::{parse_document, XmlElement};

fn locator(element: &XmlElement) -> String {
    format!("byte {}", element.position)
}

/// `rdf:about`, or the `rdf:ID` shorthand.
fn subject_iri(element: &XmlElement) -> Option<&str> {
    element
        .attr(RDF_NS, "about")
        .or_else(|| element.attr(RDF_NS, "ID"))
}

// ============================================================================
// Expressions
// ============================================================================

/// Value of a property element such as `rdfs:subClassOf` or
/// `owl:someValuesFrom`: either an `rdf:resource` reference or exactly one
/// nested description.
pub fn read_property_value(element: &XmlElement) -> Result<ClassExpression, String> {
    if let Some(resource) = element.attr(RDF_NS, "resource") {
        return Ok(ClassExpression::named(resource));
    }
    match element.children.as_slice() {
        [only] => read_description(only),
        [] => Err(format!("`{}` has no value", element.qualified_name())),
        _ => Err(format!(
            "`{}` has {} values, expected one",
            element.qualified_name(),
            element.children.len()
        )),
    }
}

fn read_collection(element: &XmlElement) -> Result<Vec<ClassExpression>, String> {
    if element.children.is_empty() {
        return Err(format!("empty `{}` collection", element.qualified_name()));
    }
    element.children.iter().map(read_description).collect()
}

/// A class description: a named class, an anonymous class built with a
/// boolean constructor, or a restriction.
pub fn read_description(element: &XmlElement) -> Result<ClassExpression, String> {
    if element.is(OWL_NS, "Restriction") {
        return read_restriction(element);
    }
    if !(element.is(OWL_NS, "Class") || element.is(RDF_NS, "Description")) {
        return Ok(ClassExpression::Unsupported(UnsupportedConstruct::Other(
            element.qualified_name(),
        )));
    }
    if let Some(about) = subject_iri(element) {
        return Ok(ClassExpression::named(about));
    }
    if let Some(c) = element.child(OWL_NS, "intersectionOf") {
        return Ok(ClassExpression::IntersectionOf(read_collection(c)?));
    }
    if let Some(c) = element.child(OWL_NS, "unionOf") {
        return Ok(ClassExpression::UnionOf(read_collection(c)?));
    }
    if element.child(OWL_NS, "complementOf").is_some() {
        return Ok(ClassExpression::Unsupported(UnsupportedConstruct::ComplementOf));
    }
    if element.child(OWL_NS, "oneOf").is_some() {
        return Ok(ClassExpression::Unsupported(UnsupportedConstruct::OneOf));
    }
    Err(format!(
        "anonymous `{}` without a class constructor",
        element.qualified_name()
    ))
}

fn read_on_property(restriction: &XmlElement) -> Result<Result<String, UnsupportedConstruct>, String> {
    let on_property = restriction
        .child(OWL_NS, "onProperty")
        .ok_or_else(|| "restriction without `owl:onProperty`".to_string())?;
    if let Some(resource) = on_property.attr(RDF_NS, "resource") {
        return Ok(Ok(resource.to_string()));
    }
    match on_property.children.as_slice() {
        [p] if p.child(OWL_NS, "inverseOf").is_some() => {
            Ok(Err(UnsupportedConstruct::InverseProperty))
        }
        [p] => p
            .attr(RDF_NS, "about")
            .map(|about| Ok(about.to_string()))
            .ok_or_else(|| "anonymous property in `owl:onProperty`".to_string()),
        _ => Err("`owl:onProperty` without a property".to_string()),
    }
}

fn read_restriction(restriction: &XmlElement) -> Result<ClassExpression, String> {
    let property = match read_on_property(restriction)? {
        Ok(property) => property,
        Err(construct) => return Ok(ClassExpression::Unsupported(construct)),
    };

    for child in &restriction.children {
        if child.namespace.as_deref() != Some(OWL_NS) {
            continue;
        }
        let construct = match child.local_name.as_str() {
            "onProperty" | "onClass" => continue,
            "someValuesFrom" => {
                return Ok(ClassExpression::some(property, read_property_value(child)?));
            }
            "allValuesFrom" => UnsupportedConstruct::AllValuesFrom,
            "hasValue" => UnsupportedConstruct::HasValue,
            "hasSelf" => UnsupportedConstruct::HasSelf,
            "minCardinality" | "minQualifiedCardinality" => UnsupportedConstruct::MinCardinality,
            "maxCardinality" | "maxQualifiedCardinality" => UnsupportedConstruct::MaxCardinality,
            "cardinality" | "qualifiedCardinality" => UnsupportedConstruct::ExactCardinality,
            other => UnsupportedConstruct::Other(format!("owl:{other}")),
        };
        return Ok(ClassExpression::Unsupported(construct));
    }
    Err("restriction without a value constraint".to_string())
}

// ============================================================================
// Document
// ============================================================================

fn read_axioms(
    element: &XmlElement,
    subject: &ClassExpression,
) -> (Vec<Axiom>, Vec<Axiom>) {
    let mut equivalents = Vec::new();
    let mut parents = Vec::new();
    for child in &element.children {
        let (kind, out) = if child.is(OWL_NS, "equivalentClass") {
            (AxiomKind::EquivalentClasses, &mut equivalents)
        } else if child.is(RDFS_NS, "subClassOf") {
            (AxiomKind::SubClassOf, &mut parents)
        } else {
            continue;
        };
        let axiom = match read_property_value(child) {
            Ok(rhs) => Axiom::new(kind, vec![subject.clone(), rhs], locator(child)),
            Err(message) => Axiom::malformed(kind, message, locator(child)),
        };
        out.push(axiom);
    }
    (equivalents, parents)
}

fn is_deprecated(element: &XmlElement) -> bool {
    element
        .child(OWL_NS, "deprecated")
        .and_then(XmlElement::text)
        .is_some_and(|t| t.eq_ignore_ascii_case("true") || t == "1")
}

fn read_class(element: &XmlElement) -> Option<ClassDeclaration> {
    let id = element
        .child(OBO_IN_OWL_NS, "id")
        .and_then(XmlElement::text)
        .or_else(|| subject_iri(element))?;

    let mut class = ClassDeclaration::new(id, locator(element));
    class.label = element
        .child(RDFS_NS, "label")
        .and_then(XmlElement::text)
        .map(str::to_string);
    class.obsolete = is_deprecated(element);
    class.subsets = element
        .children_named(OBO_IN_OWL_NS, "inSubset")
        .filter_map(|s| s.attr(RDF_NS, "resource"))
        .map(|r| local_name(r).to_string())
        .collect();

    let subject = ClassExpression::named(id);
    let (equivalents, parents) = read_axioms(element, &subject);
    class.equivalents = equivalents;
    class.parents = parents;
    Some(class)
}

/// Axioms of an anonymous top-level class or restriction.
fn read_general_axioms(element: &XmlElement, out: &mut Vec<Axiom>) {
    let has_axioms = element
        .children
        .iter()
        .any(|c| c.is(OWL_NS, "equivalentClass") || c.is(RDFS_NS, "subClassOf"));
    if !has_axioms {
        return;
    }
    match read_description(element) {
        Ok(subject) => {
            let (equivalents, parents) = read_axioms(element, &subject);
            out.extend(equivalents);
            out.extend(parents);
        }
        Err(message) => out.push(Axiom::malformed(
            AxiomKind::SubClassOf,
            message,
            locator(element),
        )),
    }
}

/// Read an RDF/XML ontology document.
pub fn read_document(text: &str) -> Result<OntologyDocument, IngestError> {
    let namespaces = extract_namespaces(text.as_bytes())?;
    if !namespaces.contains_uri(OWL_NS) {
        return Err(IngestError::malformed("document does not declare the OWL namespace"));
    }
    let root = parse_document(text.as_bytes())?;
    if !root.is(RDF_NS, "RDF") {
        return Err(IngestError::malformed(format!(
            "expected `rdf:RDF` root element, found `{}`",
            root.qualified_name()
        )));
    }

    let mut doc = OntologyDocument {
        namespaces,
        property_labels: PropertyLabels::from_document(
            &root,
            &[PropertyKind::Annotation, PropertyKind::Object],
        ),
        ..OntologyDocument::default()
    };

    for element in &root.children {
        let is_class = element.is(OWL_NS, "Class");
        let is_named = subject_iri(element).is_some()
            || element.child(OBO_IN_OWL_NS, "id").is_some();
        if is_class && is_named {
            if let Some(class) = read_class(element) {
                doc.classes.push(class);
            }
        } else if is_class || element.is(OWL_NS, "Restriction") {
            read_general_axioms(element, &mut doc.general_axioms);
        }
    }

    tracing::debug!(
        classes = doc.classes.len(),
        general_axioms = doc.general_axioms.len(),
        "read RDF/XML document"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<rdf:RDF xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#">
{body}
</rdf:RDF>"#
        )
    }

    const OBO: &str = "http://purl.obolibrary.org/obo/";

    fn obo(local: &str) -> ClassExpression {
        ClassExpression::named(format!("{OBO}{local}"))
    }

    #[test]
    fn reads_label_and_plain_parent() {
        let doc = read_document(&wrap(
            r#"<owl:Class rdf:about="http://purl.obolibrary.org/obo/GO_0008150">
  <rdfs:label>biological process</rdfs:label>
  <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/GO_0003674"/>
</owl:Class>"#,
        ))
        .unwrap();
        let class = &doc.classes[0];
        assert_eq!(class.label.as_deref(), Some("biological process"));
        assert_eq!(
            class.parents[0].operands,
            Ok(vec![obo("GO_0008150"), obo("GO_0003674")])
        );
    }

    #[test]
    fn obo_in_owl_id_takes_precedence() {
        let doc = read_document(&wrap(
            r#"<owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000000">
  <oboInOwl:id>CL:0000000</oboInOwl:id>
  <oboInOwl:inSubset rdf:resource="http://purl.obolibrary.org/obo/cl#cell_slim"/>
  <owl:deprecated>true</owl:deprecated>
</owl:Class>"#,
        ))
        .unwrap();
        let class = &doc.classes[0];
        assert_eq!(class.id, "CL:0000000");
        assert_eq!(class.subsets, vec!["cell_slim".to_string()]);
        assert!(class.obsolete);
    }

    #[test]
    fn reads_intersection_with_restriction() {
        let doc = read_document(&wrap(
            r#"<owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000001">
  <owl:equivalentClass>
    <owl:Class>
      <owl:intersectionOf rdf:parseType="Collection">
        <rdf:Description rdf:about="http://purl.obolibrary.org/obo/CL_0000000"/>
        <owl:Restriction>
          <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/BFO_0000050"/>
          <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/UBERON_0000061"/>
        </owl:Restriction>
      </owl:intersectionOf>
    </owl:Class>
  </owl:equivalentClass>
</owl:Class>"#,
        ))
        .unwrap();
        let axiom = &doc.classes[0].equivalents[0];
        assert_eq!(axiom.kind, AxiomKind::EquivalentClasses);
        let operands = axiom.operands.as_ref().unwrap();
        assert_eq!(
            operands[1],
            ClassExpression::IntersectionOf(vec![
                obo("CL_0000000"),
                ClassExpression::some(format!("{OBO}BFO_0000050"), obo("UBERON_0000061")),
            ])
        );
    }

    #[test]
    fn cardinality_restriction_is_unsupported() {
        let doc = read_document(&wrap(
            r#"<owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000002">
  <rdfs:subClassOf>
    <owl:Restriction>
      <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/RO_0002202"/>
      <owl:maxQualifiedCardinality>1</owl:maxQualifiedCardinality>
      <owl:onClass rdf:resource="http://purl.obolibrary.org/obo/CL_0000000"/>
    </owl:Restriction>
  </rdfs:subClassOf>
</owl:Class>"#,
        ))
        .unwrap();
        let operands = doc.classes[0].parents[0].operands.as_ref().unwrap();
        assert_eq!(
            operands[1],
            ClassExpression::Unsupported(UnsupportedConstruct::MaxCardinality)
        );
    }

    #[test]
    fn restriction_without_property_is_malformed() {
        let doc = read_document(&wrap(
            r#"<owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000003">
  <rdfs:subClassOf>
    <owl:Restriction>
      <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/CL_0000000"/>
    </owl:Restriction>
  </rdfs:subClassOf>
</owl:Class>"#,
        ))
        .unwrap();
        assert!(doc.classes[0].parents[0].operands.is_err());
    }

    #[test]
    fn anonymous_class_with_axioms_is_a_general_axiom() {
        let doc = read_document(&wrap(
            r#"<owl:Class>
  <owl:intersectionOf rdf:parseType="Collection">
    <rdf:Description rdf:about="http://purl.obolibrary.org/obo/CL_0000000"/>
    <owl:Restriction>
      <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/BFO_0000050"/>
      <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/UBERON_0000061"/>
    </owl:Restriction>
  </owl:intersectionOf>
  <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/CL_0000004"/>
</owl:Class>"#,
        ))
        .unwrap();
        assert!(doc.classes.is_empty());
        assert_eq!(doc.general_axioms.len(), 1);
        let operands = doc.general_axioms[0].operands.as_ref().unwrap();
        assert!(matches!(operands[0], ClassExpression::IntersectionOf(_)));
        assert_eq!(operands[1], obo("CL_0000004"));
    }

    #[test]
    fn missing_owl_namespace_is_malformed() {
        let err = read_document(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/>"#,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::MalformedDocument(_)));
    }
}
