//! Translation driver.
//!
//! Walks the class declarations of one document in order and emits, per
//! class: the `has_name` fact, then equivalence statements, then subclass
//! statements, then (optionally) subset memberships. General class axioms
//! follow after the last class.
//!
//! A failing axiom is skipped, logged and counted; it never aborts the run.

use crate::builder::ExpressionBuilder;
use crate::config::{Dialect, ObsoletePolicy, TranslatorConfig};
use crate::error::{IngestError, SkipReason};
use crate::expr::{Axiom, OntologyDocument};
use crate::ids::IdResolver;
use crate::report::TranslationReport;
use crate::shape::{classify, AxiomShape, ShapeLimits};
use crate::tables::AuxTables;
use crate::{functional, rdfxml};
use atomowl_dsl::digest::statements_digest_v1;
use atomowl_dsl::Atom;
use std::path::Path;

/// Output of one run.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub statements: Vec<Atom>,
    pub report: TranslationReport,
}

#[derive(Debug, Clone)]
pub struct Translator {
    tables: AuxTables,
    config: TranslatorConfig,
}

impl Translator {
    /// Fails when the id map contains a cycle reachable under the configured
    /// alias policy.
    pub fn new(tables: AuxTables, config: TranslatorConfig) -> Result<Self, IngestError> {
        tables.aliases.validate(config.is_a_aliases)?;
        Ok(Self { tables, config })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn tables(&self) -> &AuxTables {
        &self.tables
    }

    fn limits(&self) -> ShapeLimits {
        ShapeLimits {
            max_restrictions: self.config.max_restrictions,
            max_combinators: self.config.max_combinators,
        }
    }

    /// Parse a document in the configured (or sniffed) dialect.
    pub fn read_document(&self, text: &str) -> Result<OntologyDocument, IngestError> {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        match self.config.dialect.resolve(text) {
            Dialect::Functional => functional::read_document(text),
            Dialect::RdfXml | Dialect::Auto => rdfxml::read_document(text),
        }
    }

    pub fn translate_str(&self, text: &str) -> Result<Translation, IngestError> {
        let doc = self.read_document(text)?;
        Ok(self.translate(&doc))
    }

    pub fn translate_path(&self, path: &Path) -> Result<Translation, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
        self.translate_str(&text)
    }

    fn translate_axiom(
        &self,
        builder: &ExpressionBuilder<'_>,
        axiom: &Axiom,
    ) -> Result<(AxiomShape, Vec<Atom>), SkipReason> {
        let operands = axiom.operands.as_ref().map_err(SkipReason::malformed)?;
        let shape = classify(axiom.kind, operands, &self.limits())?;
        let statements = builder.build_axiom(axiom.kind, shape, operands)?;
        Ok((shape, statements))
    }

    fn emit_axioms(
        &self,
        builder: &ExpressionBuilder<'_>,
        subject: &str,
        axioms: &[Axiom],
        out: &mut Translation,
    ) {
        for axiom in axioms {
            out.report.axioms_seen += 1;
            match self.translate_axiom(builder, axiom) {
                Ok((shape, statements)) => {
                    out.report.record_shape(shape);
                    out.statements.extend(statements);
                }
                Err(reason) => {
                    tracing::warn!(
                        class = %subject,
                        axiom = %axiom.kind,
                        at = %axiom.locator,
                        reason = %reason,
                        "skipped axiom"
                    );
                    out.report.record_skip(&reason);
                }
            }
        }
    }

    pub fn translate(&self, doc: &OntologyDocument) -> Translation {
        let resolver =
            IdResolver::new(&self.tables, &doc.property_labels, self.config.is_a_aliases);
        let builder = ExpressionBuilder::new(resolver, self.config.plain_subclass_link);
        let mut out = Translation::default();

        for class in &doc.classes {
            out.report.classes_seen += 1;
            let id = resolver.class(&class.id);
            if class.obsolete && self.config.obsolete == ObsoletePolicy::Skip {
                tracing::debug!(class = %id, "skipping obsolete class");
                out.report.obsolete_skipped += 1;
                continue;
            }

            if let Some(label) = &class.label {
                out.statements.push(Atom::has_name(id.as_str(), label.as_str()));
                out.report.names_emitted += 1;
            }
            self.emit_axioms(&builder, &id, &class.equivalents, &mut out);
            self.emit_axioms(&builder, &id, &class.parents, &mut out);

            if self.config.emit_subset_membership {
                for subset in &class.subsets {
                    out.statements.push(Atom::member(
                        Atom::concept(id.as_str()),
                        Atom::concept(subset.as_str()),
                    ));
                    out.report.memberships_emitted += 1;
                }
            }
        }

        self.emit_axioms(&builder, "<general>", &doc.general_axioms, &mut out);

        out.report.statements = out.statements.len();
        out.report.digest = statements_digest_v1(&out.statements);
        tracing::info!(
            classes = out.report.classes_seen,
            statements = out.report.statements,
            skipped = out.report.skipped_axioms(),
            "translation finished"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlainSubclassLink;
    use atomowl_dsl::sexpr::render_statements;

    const DOC: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#">
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000001">
    <rdfs:label>primary cultured cell</rdfs:label>
    <oboInOwl:inSubset rdf:resource="http://purl.obolibrary.org/obo/cl#cell_slim"/>
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/CL_0000000"/>
    <rdfs:subClassOf>
      <owl:Restriction>
        <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/BFO_0000050"/>
        <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/UBERON_0000061"/>
      </owl:Restriction>
    </rdfs:subClassOf>
    <owl:equivalentClass>
      <owl:Class>
        <owl:unionOf rdf:parseType="Collection">
          <rdf:Description rdf:about="http://purl.obolibrary.org/obo/CL_0000002"/>
          <rdf:Description rdf:about="http://purl.obolibrary.org/obo/CL_0000003"/>
        </owl:unionOf>
      </owl:Class>
    </owl:equivalentClass>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000004">
    <rdfs:label>obsolete cell</rdfs:label>
    <owl:deprecated rdf:datatype="http://www.w3.org/2001/XMLSchema#boolean">true</owl:deprecated>
  </owl:Class>
</rdf:RDF>"#;

    fn translator(config: TranslatorConfig) -> Translator {
        let mut tables = AuxTables::default();
        tables.ro.insert("BFO_0000050", "part of");
        Translator::new(tables, config).unwrap()
    }

    #[test]
    fn per_class_order_is_name_equivalence_subclass() {
        let out = translator(TranslatorConfig::default())
            .translate_str(DOC)
            .unwrap();
        let types: Vec<&str> = out.statements.iter().map(Atom::atom_type).collect();
        assert_eq!(
            types,
            vec!["EvaluationLink", "SimilarityLink", "SubsetLink", "SubsetLink"]
        );
        assert_eq!(out.report.names_emitted, 1);
        assert_eq!(out.report.obsolete_skipped, 1);
        assert_eq!(out.report.shapes["union"], 1);
    }

    #[test]
    fn obsolete_policy_and_membership_are_configurable() {
        let config = TranslatorConfig {
            obsolete: ObsoletePolicy::Include,
            emit_subset_membership: true,
            plain_subclass_link: PlainSubclassLink::Inheritance,
            ..TranslatorConfig::default()
        };
        let out = translator(config).translate_str(DOC).unwrap();
        assert!(out.statements.contains(&Atom::member(
            Atom::concept("CL:0000001"),
            Atom::concept("cell_slim")
        )));
        assert!(out.statements.contains(&Atom::inheritance(
            Atom::concept("CL:0000001"),
            Atom::concept("CL:0000000")
        )));
        assert!(out
            .statements
            .contains(&Atom::has_name("CL:0000004", "obsolete cell")));
    }

    #[test]
    fn digest_matches_rendered_output() {
        let out = translator(TranslatorConfig::default())
            .translate_str(DOC)
            .unwrap();
        assert_eq!(
            out.report.digest,
            atomowl_dsl::digest::fnv1a64_digest_bytes(
                render_statements(&out.statements).as_bytes()
            )
        );
    }

    #[test]
    fn byte_order_mark_does_not_change_the_dialect() {
        let with_bom = format!("\u{FEFF}{DOC}");
        let plain = translator(TranslatorConfig::default())
            .translate_str(DOC)
            .unwrap();
        let out = translator(TranslatorConfig::default())
            .translate_str(&with_bom)
            .unwrap();
        assert_eq!(out.statements, plain.statements);
        assert_eq!(out.report.digest, plain.report.digest);
    }

    #[test]
    fn cyclic_id_map_is_rejected_up_front() {
        let mut tables = AuxTables::default();
        tables.aliases.insert_exact("A:1", "B:1");
        tables.aliases.insert_exact("B:1", "A:1");
        let err = Translator::new(tables, TranslatorConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::Table(_)));
    }
}
