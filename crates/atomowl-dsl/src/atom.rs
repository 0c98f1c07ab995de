//! Logic nodes (the translation target).
//!
//! An [`Atom`] is an immutable tree: links own their outgoing set, nothing is
//! shared between statements, and there are no cycles. Trees are built
//! bottom-up by the OWL translator and consumed by the serializer.
//!
//! The variants are the small first-order vocabulary the translator needs:
//! named nodes (`Concept`, `Predicate`, `Variable`), boolean combinators
//! (`And`, `Or`), the three class-level relations (`Subset`, `Inheritance`,
//! `Similarity`), the existential "satisfying set" scope, and the two
//! fact-level links (`Evaluation`, `Member`).

use serde::{Deserialize, Serialize};
use std::fmt;

pub type Name = String;

// ============================================================================
// Atom
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Atom {
    Concept {
        name: Name,
    },
    Predicate {
        name: Name,
    },
    Variable {
        name: Name,
    },
    And {
        outgoing: Vec<Atom>,
    },
    Or {
        outgoing: Vec<Atom>,
    },
    Subset {
        lhs: Box<Atom>,
        rhs: Box<Atom>,
    },
    Inheritance {
        child: Box<Atom>,
        parent: Box<Atom>,
    },
    Similarity {
        lhs: Box<Atom>,
        rhs: Box<Atom>,
    },
    /// "The set of `variable` such that `predicate(variable, filler)` holds."
    ///
    /// Encodes `ObjectSomeValuesFrom(predicate filler)`. The variable is bound
    /// here and never escapes the statement that introduced it.
    SatisfyingSet {
        variable: Name,
        predicate: Name,
        filler: Box<Atom>,
    },
    Evaluation {
        predicate: Name,
        arguments: Vec<Atom>,
    },
    Member {
        item: Box<Atom>,
        container: Box<Atom>,
    },
}

impl Atom {
    pub fn concept(name: impl Into<Name>) -> Self {
        Atom::Concept { name: name.into() }
    }

    pub fn predicate(name: impl Into<Name>) -> Self {
        Atom::Predicate { name: name.into() }
    }

    pub fn variable(name: impl Into<Name>) -> Self {
        Atom::Variable { name: name.into() }
    }

    pub fn and(outgoing: Vec<Atom>) -> Self {
        Atom::And { outgoing }
    }

    pub fn or(outgoing: Vec<Atom>) -> Self {
        Atom::Or { outgoing }
    }

    pub fn subset(lhs: Atom, rhs: Atom) -> Self {
        Atom::Subset {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn inheritance(child: Atom, parent: Atom) -> Self {
        Atom::Inheritance {
            child: Box::new(child),
            parent: Box::new(parent),
        }
    }

    pub fn similarity(lhs: Atom, rhs: Atom) -> Self {
        Atom::Similarity {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn satisfying_set(variable: impl Into<Name>, predicate: impl Into<Name>, filler: Atom) -> Self {
        Atom::SatisfyingSet {
            variable: variable.into(),
            predicate: predicate.into(),
            filler: Box::new(filler),
        }
    }

    pub fn evaluation(predicate: impl Into<Name>, arguments: Vec<Atom>) -> Self {
        Atom::Evaluation {
            predicate: predicate.into(),
            arguments,
        }
    }

    pub fn member(item: Atom, container: Atom) -> Self {
        Atom::Member {
            item: Box::new(item),
            container: Box::new(container),
        }
    }

    /// `has_name(Concept(id), Concept(label))`.
    pub fn has_name(id: impl Into<Name>, label: impl Into<Name>) -> Self {
        Atom::evaluation(
            "has_name",
            vec![Atom::concept(id), Atom::concept(label)],
        )
    }

    /// Atomese type name of this atom's outermost node or link.
    pub fn atom_type(&self) -> &'static str {
        match self {
            Atom::Concept { .. } => "ConceptNode",
            Atom::Predicate { .. } => "PredicateNode",
            Atom::Variable { .. } => "VariableNode",
            Atom::And { .. } => "AndLink",
            Atom::Or { .. } => "OrLink",
            Atom::Subset { .. } => "SubsetLink",
            Atom::Inheritance { .. } => "InheritanceLink",
            Atom::Similarity { .. } => "SimilarityLink",
            Atom::SatisfyingSet { .. } => "SatisfyingSetScopeLink",
            Atom::Evaluation { .. } => "EvaluationLink",
            Atom::Member { .. } => "MemberLink",
        }
    }

    /// Names of every `Concept` leaf, in rendering order.
    pub fn concept_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.view().collect_nodes("ConceptNode", &mut out);
        out
    }

    /// Names of every `Predicate` leaf, in rendering order.
    pub fn predicate_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.view().collect_nodes("PredicateNode", &mut out);
        out
    }

    /// Bound variables in the order they are introduced.
    pub fn bound_variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_bound_variables(&mut out);
        out
    }

    fn collect_bound_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Atom::Concept { .. } | Atom::Predicate { .. } | Atom::Variable { .. } => {}
            Atom::And { outgoing } | Atom::Or { outgoing } => {
                for atom in outgoing {
                    atom.collect_bound_variables(out);
                }
            }
            Atom::Evaluation { arguments, .. } => {
                for atom in arguments {
                    atom.collect_bound_variables(out);
                }
            }
            Atom::Subset { lhs, rhs } | Atom::Similarity { lhs, rhs } => {
                lhs.collect_bound_variables(out);
                rhs.collect_bound_variables(out);
            }
            Atom::Inheritance { child, parent } => {
                child.collect_bound_variables(out);
                parent.collect_bound_variables(out);
            }
            Atom::Member { item, container } => {
                item.collect_bound_variables(out);
                container.collect_bound_variables(out);
            }
            Atom::SatisfyingSet {
                variable, filler, ..
            } => {
                out.push(variable.as_str());
                filler.collect_bound_variables(out);
            }
        }
    }

    /// Generic node/link view used by the serializer.
    ///
    /// `SatisfyingSet` and `Evaluation` expand into the nested Atomese links
    /// they stand for (`VariableNode`, `EvaluationLink`, `ListLink`).
    pub fn view(&self) -> AtomView<'_> {
        match self {
            Atom::Concept { name } => AtomView::Node(self.atom_type(), name),
            Atom::Predicate { name } => AtomView::Node(self.atom_type(), name),
            Atom::Variable { name } => AtomView::Node(self.atom_type(), name),
            Atom::And { outgoing } | Atom::Or { outgoing } => {
                AtomView::Link(self.atom_type(), outgoing.iter().map(Atom::view).collect())
            }
            Atom::Subset { lhs, rhs } | Atom::Similarity { lhs, rhs } => {
                AtomView::Link(self.atom_type(), vec![lhs.view(), rhs.view()])
            }
            Atom::Inheritance { child, parent } => {
                AtomView::Link(self.atom_type(), vec![child.view(), parent.view()])
            }
            Atom::Member { item, container } => {
                AtomView::Link(self.atom_type(), vec![item.view(), container.view()])
            }
            Atom::Evaluation {
                predicate,
                arguments,
            } => AtomView::Link(
                self.atom_type(),
                vec![
                    AtomView::Node("PredicateNode", predicate),
                    AtomView::Link("ListLink", arguments.iter().map(Atom::view).collect()),
                ],
            ),
            Atom::SatisfyingSet {
                variable,
                predicate,
                filler,
            } => AtomView::Link(
                self.atom_type(),
                vec![
                    AtomView::Node("VariableNode", variable),
                    AtomView::Link(
                        "EvaluationLink",
                        vec![
                            AtomView::Node("PredicateNode", predicate),
                            AtomView::Link(
                                "ListLink",
                                vec![AtomView::Node("VariableNode", variable), filler.view()],
                            ),
                        ],
                    ),
                ],
            ),
        }
    }
}

// ============================================================================
// Generic view
// ============================================================================

/// A labeled tree with a fixed print order: nodes carry a name, links carry
/// their outgoing set in construction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomView<'a> {
    Node(&'static str, &'a str),
    Link(&'static str, Vec<AtomView<'a>>),
}

impl<'a> AtomView<'a> {
    fn collect_nodes(&self, atom_type: &str, out: &mut Vec<&'a str>) {
        match self {
            AtomView::Node(ty, name) => {
                if *ty == atom_type {
                    out.push(*name);
                }
            }
            AtomView::Link(_, outgoing) => {
                for view in outgoing {
                    view.collect_nodes(atom_type, out);
                }
            }
        }
    }
}

/// Single-line form, handy in log fields.
impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_view(view: &AtomView<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match view {
                AtomView::Node(ty, name) => write!(f, "({ty} \"{}\")", crate::sexpr::escape(name)),
                AtomView::Link(ty, outgoing) => {
                    write!(f, "({ty}")?;
                    for view in outgoing {
                        f.write_str(" ")?;
                        write_view(view, f)?;
                    }
                    f.write_str(")")
                }
            }
        }
        write_view(&self.view(), f)
    }
}
