//! Logic-expression builder.
//!
//! One recursive function covers every catalogue shape: named classes become
//! concepts, intersections/unions become `And`/`Or` in operand order, and each
//! existential restriction becomes a satisfying-set scope over a fresh bound
//! variable. The shape only decides the top-level link.
//!
//! Variables are allocated in pre-order: the left operand before the right,
//! and a restriction's variable before anything inside its filler. Each
//! top-level statement starts a new allocation.

use crate::config::PlainSubclassLink;
use crate::error::SkipReason;
use crate::expr::{AxiomKind, ClassExpression};
use crate::ids::IdResolver;
use crate::shape::AxiomShape;
use atomowl_dsl::Atom;

/// Bound-variable names in allocation order.
pub const VARIABLE_ALPHABET: [&str; 26] = [
    "$X", "$Y", "$Z", "$U", "$V", "$W", "$A", "$B", "$C", "$D", "$E", "$F", "$G", "$H", "$I",
    "$J", "$K", "$L", "$M", "$N", "$O", "$P", "$Q", "$R", "$S", "$T",
];

#[derive(Debug, Default)]
pub struct VariableAllocator {
    next: usize,
}

impl VariableAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Result<&'static str, SkipReason> {
        let name = VARIABLE_ALPHABET
            .get(self.next)
            .copied()
            .ok_or(SkipReason::VariablesExhausted)?;
        self.next += 1;
        Ok(name)
    }
}

pub struct ExpressionBuilder<'a> {
    resolver: IdResolver<'a>,
    plain_subclass_link: PlainSubclassLink,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(resolver: IdResolver<'a>, plain_subclass_link: PlainSubclassLink) -> Self {
        Self {
            resolver,
            plain_subclass_link,
        }
    }

    pub fn build_expression(
        &self,
        expr: &ClassExpression,
        vars: &mut VariableAllocator,
    ) -> Result<Atom, SkipReason> {
        match expr {
            ClassExpression::Named(iri) => Ok(Atom::concept(self.resolver.class(iri))),
            ClassExpression::SomeValuesFrom { property, filler } => {
                let variable = vars.fresh()?;
                let filler = self.build_expression(filler, vars)?;
                Ok(Atom::satisfying_set(
                    variable,
                    self.resolver.property(property),
                    filler,
                ))
            }
            ClassExpression::IntersectionOf(operands) => Ok(Atom::and(
                operands
                    .iter()
                    .map(|o| self.build_expression(o, vars))
                    .collect::<Result<_, _>>()?,
            )),
            ClassExpression::UnionOf(operands) => Ok(Atom::or(
                operands
                    .iter()
                    .map(|o| self.build_expression(o, vars))
                    .collect::<Result<_, _>>()?,
            )),
            ClassExpression::Unsupported(construct) => Err(SkipReason::Unsupported {
                construct: construct.clone(),
            }),
        }
    }

    /// Statements for one classified axiom. Either every statement is built
    /// or the axiom is skipped as a whole.
    pub fn build_axiom(
        &self,
        kind: AxiomKind,
        shape: AxiomShape,
        operands: &[ClassExpression],
    ) -> Result<Vec<Atom>, SkipReason> {
        let [lhs, rest @ ..] = operands else {
            return Err(SkipReason::malformed(format!("{kind} without operands")));
        };
        rest.iter()
            .map(|rhs| -> Result<Atom, SkipReason> {
                let mut vars = VariableAllocator::new();
                let left = self.build_expression(lhs, &mut vars)?;
                let right = self.build_expression(rhs, &mut vars)?;
                Ok(match kind {
                    AxiomKind::EquivalentClasses => Atom::similarity(left, right),
                    AxiomKind::SubClassOf
                        if shape == AxiomShape::PlainSubclass
                            && self.plain_subclass_link == PlainSubclassLink::Inheritance =>
                    {
                        Atom::inheritance(left, right)
                    }
                    AxiomKind::SubClassOf => Atom::subset(left, right),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IsAAliasPolicy;
    use crate::tables::{AuxTables, PropertyLabels};

    const OBO: &str = "http://purl.obolibrary.org/obo/";

    fn n(local: &str) -> ClassExpression {
        ClassExpression::named(format!("{OBO}{local}"))
    }

    fn some(p: &str, filler: ClassExpression) -> ClassExpression {
        ClassExpression::some(format!("{OBO}{p}"), filler)
    }

    fn tables() -> AuxTables {
        let mut tables = AuxTables::default();
        tables.ro.insert("BFO_0000050", "part of");
        tables.ro.insert("RO_0002202", "develops from");
        tables
    }

    #[test]
    fn allocator_follows_alphabet_and_runs_out() {
        let mut vars = VariableAllocator::new();
        let names: Vec<&str> = (0..7).map(|_| vars.fresh().unwrap()).collect();
        assert_eq!(names, vec!["$X", "$Y", "$Z", "$U", "$V", "$W", "$A"]);
        for _ in 7..26 {
            vars.fresh().unwrap();
        }
        assert_eq!(vars.fresh(), Err(SkipReason::VariablesExhausted));
    }

    #[test]
    fn restricted_subclass_binds_x() {
        let tables = tables();
        let local = PropertyLabels::new();
        let builder = ExpressionBuilder::new(
            IdResolver::new(&tables, &local, IsAAliasPolicy::Ignore),
            PlainSubclassLink::Subset,
        );
        let out = builder
            .build_axiom(
                AxiomKind::SubClassOf,
                AxiomShape::Restriction,
                &[n("CL_0000000"), some("BFO_0000050", n("UBERON_0000061"))],
            )
            .unwrap();
        assert_eq!(
            out,
            vec![Atom::subset(
                Atom::concept("CL:0000000"),
                Atom::satisfying_set("$X", "part of", Atom::concept("UBERON:0000061")),
            )]
        );
    }

    #[test]
    fn variables_follow_document_order_in_intersections() {
        let tables = tables();
        let local = PropertyLabels::new();
        let builder = ExpressionBuilder::new(
            IdResolver::new(&tables, &local, IsAAliasPolicy::Ignore),
            PlainSubclassLink::Subset,
        );
        let rhs = ClassExpression::IntersectionOf(vec![
            n("CL_0000000"),
            some("BFO_0000050", n("UBERON_0000061")),
            some("RO_0002202", some("BFO_0000050", n("UBERON_0000062"))),
        ]);
        let out = builder
            .build_axiom(
                AxiomKind::EquivalentClasses,
                AxiomShape::Mixed,
                &[n("CL_0000001"), rhs],
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bound_variables(), vec!["$X", "$Y", "$Z"]);
        assert_eq!(out[0].atom_type(), "SimilarityLink");
        assert_eq!(
            out[0].predicate_names(),
            vec!["part of", "develops from", "part of"]
        );
    }

    #[test]
    fn nary_equivalence_restarts_allocation_per_statement() {
        let tables = tables();
        let local = PropertyLabels::new();
        let builder = ExpressionBuilder::new(
            IdResolver::new(&tables, &local, IsAAliasPolicy::Ignore),
            PlainSubclassLink::Subset,
        );
        let out = builder
            .build_axiom(
                AxiomKind::EquivalentClasses,
                AxiomShape::Restriction,
                &[
                    n("CL_0000001"),
                    some("BFO_0000050", n("UBERON_0000061")),
                    some("RO_0002202", n("CL_0000000")),
                ],
            )
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bound_variables(), vec!["$X"]);
        assert_eq!(out[1].bound_variables(), vec!["$X"]);
    }

    #[test]
    fn plain_subclass_link_is_configurable() {
        let tables = tables();
        let local = PropertyLabels::new();
        let builder = ExpressionBuilder::new(
            IdResolver::new(&tables, &local, IsAAliasPolicy::Ignore),
            PlainSubclassLink::Inheritance,
        );
        let out = builder
            .build_axiom(
                AxiomKind::SubClassOf,
                AxiomShape::PlainSubclass,
                &[n("GO_0008150"), n("GO_0003674")],
            )
            .unwrap();
        assert_eq!(
            out,
            vec![Atom::inheritance(
                Atom::concept("GO:0008150"),
                Atom::concept("GO:0003674")
            )]
        );
    }

    #[test]
    fn exhausted_variables_fail_the_whole_axiom() {
        let tables = tables();
        let local = PropertyLabels::new();
        let builder = ExpressionBuilder::new(
            IdResolver::new(&tables, &local, IsAAliasPolicy::Ignore),
            PlainSubclassLink::Subset,
        );
        let mut deep = n("UBERON_0000061");
        for _ in 0..27 {
            deep = some("BFO_0000050", deep);
        }
        let err = builder
            .build_axiom(
                AxiomKind::SubClassOf,
                AxiomShape::NestedRestriction,
                &[n("CL_0000000"), deep],
            )
            .unwrap_err();
        assert_eq!(err, SkipReason::VariablesExhausted);
    }
}
