//! Class-expression pattern matcher.
//!
//! An axiom is first summarized as [`MarkerCounts`] (how many named classes,
//! existential restrictions, intersections and unions it contains), then
//! tested against a fixed catalogue of shapes in priority order, simplest
//! first. A rule accepts when its count predicate holds *and* its structural
//! check on the tree holds; a rule whose counts hold but whose structure does
//! not is logged and the next rule is tried.
//!
//! Unsupported constructors are rejected before the catalogue is consulted.

use crate::error::SkipReason;
use crate::expr::{AxiomKind, ClassExpression};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerCounts {
    pub named: usize,
    pub restrictions: usize,
    pub intersections: usize,
    pub unions: usize,
}

impl MarkerCounts {
    pub fn of(operands: &[ClassExpression]) -> Self {
        let mut counts = Self::default();
        for operand in operands {
            counts.add(operand);
        }
        counts
    }

    fn add(&mut self, expr: &ClassExpression) {
        match expr {
            ClassExpression::Named(_) => self.named += 1,
            ClassExpression::SomeValuesFrom { filler, .. } => {
                self.restrictions += 1;
                self.add(filler);
            }
            ClassExpression::IntersectionOf(operands) => {
                self.intersections += 1;
                operands.iter().for_each(|o| self.add(o));
            }
            ClassExpression::UnionOf(operands) => {
                self.unions += 1;
                operands.iter().for_each(|o| self.add(o));
            }
            ClassExpression::Unsupported(_) => {}
        }
    }

    pub fn combinators(&self) -> usize {
        self.intersections + self.unions
    }
}

impl fmt::Display for MarkerCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "named={} restrictions={} intersections={} unions={}",
            self.named, self.restrictions, self.intersections, self.unions
        )
    }
}

/// Catalogue bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeLimits {
    pub max_restrictions: usize,
    pub max_combinators: usize,
}

impl Default for ShapeLimits {
    fn default() -> Self {
        Self {
            max_restrictions: 6,
            max_combinators: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxiomShape {
    /// `A ⊑ B`
    PlainSubclass,
    /// `A ≡ B (≡ C ...)`
    PlainEquivalence,
    /// `A ⊑ ∃p.B`
    Restriction,
    /// `A ⊑ ∃p.∃q.B`
    NestedRestriction,
    /// `A ⊑ B ⊓ ∃p.C ⊓ ...`
    Intersection,
    /// `A ⊑ B ⊔ ∃p.C ⊔ ...`
    Union,
    /// Nested intersections/unions/restrictions under a named class.
    Mixed,
    /// Left operand is not a named class.
    GeneralClassAxiom,
}

impl AxiomShape {
    pub fn as_str(self) -> &'static str {
        match self {
            AxiomShape::PlainSubclass => "plain_subclass",
            AxiomShape::PlainEquivalence => "plain_equivalence",
            AxiomShape::Restriction => "restriction",
            AxiomShape::NestedRestriction => "nested_restriction",
            AxiomShape::Intersection => "intersection",
            AxiomShape::Union => "union",
            AxiomShape::Mixed => "mixed",
            AxiomShape::GeneralClassAxiom => "general_class_axiom",
        }
    }
}

impl fmt::Display for AxiomShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Catalogue
// ============================================================================

struct ShapeRule {
    shape: AxiomShape,
    kind: Option<AxiomKind>,
    counts: fn(&MarkerCounts, &ShapeLimits) -> bool,
    /// `(left operand, remaining operands)`
    structure: fn(&ClassExpression, &[ClassExpression]) -> bool,
}

fn within_limits(c: &MarkerCounts, l: &ShapeLimits) -> bool {
    c.restrictions <= l.max_restrictions && c.combinators() <= l.max_combinators
}

/// `∃p.Named`
fn is_flat_restriction(expr: &ClassExpression) -> bool {
    matches!(
        expr,
        ClassExpression::SomeValuesFrom { filler, .. } if filler.is_named()
    )
}

/// `Named`, or `∃p.∃q...Named`
fn is_restriction_chain(expr: &ClassExpression) -> bool {
    match expr {
        ClassExpression::Named(_) => true,
        ClassExpression::SomeValuesFrom { filler, .. } => is_restriction_chain(filler),
        _ => false,
    }
}

fn is_flat_operand(expr: &ClassExpression) -> bool {
    expr.is_named() || is_flat_restriction(expr)
}

const CATALOGUE: &[ShapeRule] = &[
    ShapeRule {
        shape: AxiomShape::PlainSubclass,
        kind: Some(AxiomKind::SubClassOf),
        counts: |c, _| c.restrictions == 0 && c.combinators() == 0,
        structure: |lhs, rest| lhs.is_named() && rest.iter().all(ClassExpression::is_named),
    },
    ShapeRule {
        shape: AxiomShape::PlainEquivalence,
        kind: Some(AxiomKind::EquivalentClasses),
        counts: |c, _| c.restrictions == 0 && c.combinators() == 0,
        structure: |lhs, rest| lhs.is_named() && rest.iter().all(ClassExpression::is_named),
    },
    ShapeRule {
        shape: AxiomShape::Restriction,
        kind: None,
        counts: |c, l| c.combinators() == 0 && c.restrictions >= 1 && within_limits(c, l),
        structure: |lhs, rest| lhs.is_named() && rest.iter().all(is_flat_operand),
    },
    ShapeRule {
        shape: AxiomShape::NestedRestriction,
        kind: None,
        counts: |c, l| c.combinators() == 0 && c.restrictions >= 2 && within_limits(c, l),
        structure: |lhs, rest| lhs.is_named() && rest.iter().all(is_restriction_chain),
    },
    ShapeRule {
        shape: AxiomShape::Intersection,
        kind: None,
        counts: |c, l| c.intersections >= 1 && c.unions == 0 && within_limits(c, l),
        structure: |lhs, rest| {
            lhs.is_named()
                && rest.iter().all(|e| match e {
                    ClassExpression::IntersectionOf(ops) => ops.iter().all(is_flat_operand),
                    other => is_flat_operand(other),
                })
        },
    },
    ShapeRule {
        shape: AxiomShape::Union,
        kind: None,
        counts: |c, l| c.unions >= 1 && c.intersections == 0 && within_limits(c, l),
        structure: |lhs, rest| {
            lhs.is_named()
                && rest.iter().all(|e| match e {
                    ClassExpression::UnionOf(ops) => ops.iter().all(is_flat_operand),
                    other => is_flat_operand(other),
                })
        },
    },
    ShapeRule {
        shape: AxiomShape::Mixed,
        kind: None,
        counts: |c, l| c.combinators() >= 1 && within_limits(c, l),
        structure: |lhs, _| lhs.is_named(),
    },
    ShapeRule {
        shape: AxiomShape::GeneralClassAxiom,
        kind: None,
        counts: within_limits,
        structure: |lhs, _| !lhs.is_named(),
    },
];

/// Classify one axiom, or say why it cannot be translated.
pub fn classify(
    kind: AxiomKind,
    operands: &[ClassExpression],
    limits: &ShapeLimits,
) -> Result<AxiomShape, SkipReason> {
    let [lhs, rest @ ..] = operands else {
        return Err(SkipReason::malformed(format!("{kind} without operands")));
    };
    if rest.is_empty() {
        return Err(SkipReason::malformed(format!("{kind} with a single operand")));
    }
    if let Some(construct) = operands.iter().find_map(ClassExpression::first_unsupported) {
        return Err(SkipReason::Unsupported {
            construct: construct.clone(),
        });
    }

    let counts = MarkerCounts::of(operands);
    for rule in CATALOGUE {
        if rule.kind.is_some_and(|k| k != kind) || !(rule.counts)(&counts, limits) {
            continue;
        }
        if (rule.structure)(lhs, rest) {
            return Ok(rule.shape);
        }
        tracing::debug!(shape = %rule.shape, %counts, "counts matched but structure did not");
    }
    Err(SkipReason::NoMatchingShape { counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::UnsupportedConstruct;

    fn n(id: &str) -> ClassExpression {
        ClassExpression::named(id)
    }

    fn some(p: &str, filler: ClassExpression) -> ClassExpression {
        ClassExpression::some(p, filler)
    }

    fn sub(rhs: ClassExpression) -> Result<AxiomShape, SkipReason> {
        classify(AxiomKind::SubClassOf, &[n("A"), rhs], &ShapeLimits::default())
    }

    #[test]
    fn plain_and_restricted_subclasses() {
        assert_eq!(sub(n("B")), Ok(AxiomShape::PlainSubclass));
        assert_eq!(sub(some("p", n("B"))), Ok(AxiomShape::Restriction));
        assert_eq!(
            sub(some("p", some("q", n("B")))),
            Ok(AxiomShape::NestedRestriction)
        );
    }

    #[test]
    fn plain_equivalence_needs_equivalence_kind() {
        let shape = classify(
            AxiomKind::EquivalentClasses,
            &[n("A"), n("B"), n("C")],
            &ShapeLimits::default(),
        );
        assert_eq!(shape, Ok(AxiomShape::PlainEquivalence));
    }

    #[test]
    fn flat_combinators() {
        assert_eq!(
            sub(ClassExpression::IntersectionOf(vec![n("B"), some("p", n("C"))])),
            Ok(AxiomShape::Intersection)
        );
        assert_eq!(
            sub(ClassExpression::UnionOf(vec![n("B"), n("C")])),
            Ok(AxiomShape::Union)
        );
    }

    #[test]
    fn nested_intersection_falls_through_to_mixed() {
        let rhs = ClassExpression::IntersectionOf(vec![
            n("B"),
            some("p", ClassExpression::IntersectionOf(vec![n("C"), some("q", n("D"))])),
        ]);
        assert_eq!(sub(rhs), Ok(AxiomShape::Mixed));
    }

    #[test]
    fn anonymous_left_side_is_general() {
        let lhs = ClassExpression::IntersectionOf(vec![n("A"), some("p", n("B"))]);
        let shape = classify(
            AxiomKind::SubClassOf,
            &[lhs, some("q", n("C"))],
            &ShapeLimits::default(),
        );
        assert_eq!(shape, Ok(AxiomShape::GeneralClassAxiom));
    }

    #[test]
    fn unsupported_constructs_are_rejected_first() {
        assert_eq!(
            sub(ClassExpression::IntersectionOf(vec![
                n("B"),
                ClassExpression::Unsupported(UnsupportedConstruct::MaxCardinality),
            ])),
            Err(SkipReason::Unsupported {
                construct: UnsupportedConstruct::MaxCardinality
            })
        );
    }

    #[test]
    fn too_many_restrictions_match_nothing() {
        let rhs = ClassExpression::IntersectionOf(
            (0..7).map(|i| some("p", n(&format!("C{i}")))).collect(),
        );
        let Err(SkipReason::NoMatchingShape { counts }) = sub(rhs) else {
            panic!("expected no matching shape");
        };
        assert_eq!(counts.restrictions, 7);
        assert_eq!(counts.intersections, 1);
    }

    #[test]
    fn single_operand_is_malformed() {
        let shape = classify(AxiomKind::EquivalentClasses, &[n("A")], &ShapeLimits::default());
        assert!(matches!(shape, Err(SkipReason::Malformed { .. })));
    }
}
