#![forbid(unsafe_code)]

//! Inputs produced by VC generation: the VC term itself, the VC-side axioms
//! and the per-command automation hints.

use std::collections::BTreeMap;

use proofgen_cfg::{BlockId, ControlFlowGraph};
use proofgen_term::{
    DefDecl, Equation, FreeIdents, Ident, IdentSubst, OuterDecl, Term, TermRef,
};
use tracing::trace;

use crate::decl::{Ty, TypeCtorDecl};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastKind {
    BoxedOfUnboxed,
    UnboxedOfBoxed,
    TypeOfBoxed,
}

/// Why an axiom was added to the VC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VcAxiomKind {
    /// Translated source-level axiom; not handled by the generated proof.
    SourceAxiom,
    /// Output typing of a source function.
    FunctionOutput { function: String },
    /// Typing of a VC variable, named as it occurs in the VC.
    Var { vc_var: String },
    /// Constructor value of a primitive type.
    CtorBasic { ty: Ty, ctor_value: i64 },
    CtorDecl { decl: TypeCtorDecl, ctor_value: i64 },
    LeftInverse { decl: TypeCtorDecl, projected_idx: usize },
    Cast { ty: Ty, kind: CastKind },
}

impl VcAxiomKind {
    pub fn describe(&self) -> &'static str {
        match self {
            VcAxiomKind::SourceAxiom => "source axiom",
            VcAxiomKind::FunctionOutput { .. } => "function output",
            VcAxiomKind::Var { .. } => "variable",
            VcAxiomKind::CtorBasic { .. } => "basic type constructor",
            VcAxiomKind::CtorDecl { .. } => "declared constructor",
            VcAxiomKind::LeftInverse { .. } => "left inverse",
            VcAxiomKind::Cast { .. } => "cast",
        }
    }
}

/// An axiom of the VC. It is emitted as a definition `name x1 .. xn = term`
/// over its free identifiers and assumed in the VC hypothesis through that
/// definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcAxiom {
    pub name: String,
    pub term: TermRef,
    pub kind: VcAxiomKind,
}

impl VcAxiom {
    pub fn new(name: impl Into<String>, term: TermRef, kind: VcAxiomKind) -> Self {
        Self {
            name: name.into(),
            term,
            kind,
        }
    }

    fn params(&self) -> Vec<TermRef> {
        FreeIdents::collect(&self.term)
            .iter()
            .map(Term::from_ident)
            .collect()
    }

    pub fn definition(&self) -> DefDecl {
        DefDecl {
            name: self.name.clone(),
            equation: Equation {
                lhs: self.params(),
                rhs: self.term.clone(),
            },
        }
    }

    /// The definition applied to the declarations it mentions, renamed by
    /// `subst`.
    pub fn hypothesis(&self, subst: &BTreeMap<Ident, TermRef>) -> TermRef {
        let head = Term::ident(self.name.as_str());
        let args: Vec<TermRef> = self
            .params()
            .iter()
            .map(|p| IdentSubst::apply(subst, p))
            .collect();
        if args.is_empty() {
            head
        } else {
            Term::app(head, args)
        }
    }
}

/// The generated VC over source-level names together with its axioms.
#[derive(Clone, Debug)]
pub struct VcInput {
    pub vc: TermRef,
    pub axioms: Vec<VcAxiom>,
}

impl VcInput {
    pub fn new(vc: TermRef, axioms: Vec<VcAxiom>) -> Self {
        Self { vc, axioms }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Subsumption {
    Never,
    #[default]
    NotForQuantifiers,
    Always,
}

impl Subsumption {
    fn term(self) -> TermRef {
        Term::ident(match self {
            Subsumption::Never => "SubsumptionNever",
            Subsumption::NotForQuantifiers => "SubsumptionNotForQuantifiers",
            Subsumption::Always => "SubsumptionAlways",
        })
    }
}

/// Automation hint for one command of the final program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcHint {
    /// VC of the command's expression.
    pub expr: TermRef,
    pub post: TermRef,
    /// The command's weakest precondition of `post`.
    pub result: TermRef,
    pub subsumption: Subsumption,
}

impl VcHint {
    fn term(&self) -> TermRef {
        Term::tuple(vec![
            self.expr.clone(),
            self.post.clone(),
            self.result.clone(),
            self.subsumption.term(),
        ])
    }
}

#[derive(Debug, Default)]
pub struct VcHintManager {
    hints: BTreeMap<BlockId, Vec<VcHint>>,
}

impl VcHintManager {
    /// Hints of a block are kept in the order its commands were processed.
    pub fn next_hint_for_block(&mut self, block: BlockId, hint: VcHint) {
        trace!(%block, "vc hint");
        self.hints.entry(block).or_default().push(hint);
    }

    pub fn hints(&self, block: BlockId) -> Option<&[VcHint]> {
        self.hints.get(&block).map(Vec::as_slice)
    }

    pub fn hint_def_name(label: &str) -> String {
        format!("{label}_hints")
    }

    /// One `<label>_hints` definition per block with hints, in
    /// reverse-topological block order.
    pub fn hint_decls(&self, graph: &ControlFlowGraph) -> Vec<OuterDecl> {
        graph
            .blocks_backwards()
            .into_iter()
            .filter_map(|id| {
                let hints = self.hints.get(&id)?;
                let block = graph.block(id)?;
                Some(OuterDecl::Def(DefDecl {
                    name: Self::hint_def_name(&block.label),
                    equation: Equation {
                        lhs: Vec::new(),
                        rhs: Term::list(hints.iter().map(VcHint::term).collect()),
                    },
                }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofgen_cfg::Block;

    #[test]
    fn axiom_hypothesis_renames_free_idents() {
        let ax = VcAxiom::new(
            "vcax_0",
            Term::le(Term::int(0), Term::ident("x")),
            VcAxiomKind::Var {
                vc_var: "x".to_string(),
            },
        );
        let mut subst = BTreeMap::new();
        subst.insert(Ident::new("x"), Term::ident("x_vc"));
        assert_eq!(ax.hypothesis(&subst).to_string(), "vcax_0 x_vc");
        assert_eq!(ax.definition().equation.lhs, vec![Term::ident("x")]);

        let closed = VcAxiom::new("vcax_1", Term::bool_lit(true), VcAxiomKind::SourceAxiom);
        assert_eq!(closed.hypothesis(&subst), Term::ident("vcax_1"));
    }

    #[test]
    fn hint_defs_follow_backward_order() {
        let mut g = ControlFlowGraph::new(Block::new(BlockId(0), "entry", vec![]));
        g.add_block(Block::new(BlockId(1), "exit", vec![])).expect("block");
        g.add_edge(BlockId(0), BlockId(1)).expect("edge");

        let hint = VcHint {
            expr: Term::bool_lit(true),
            post: Term::bool_lit(true),
            result: Term::bool_lit(true),
            subsumption: Subsumption::Always,
        };
        let mut mgr = VcHintManager::default();
        mgr.next_hint_for_block(BlockId(0), hint.clone());
        mgr.next_hint_for_block(BlockId(1), hint.clone());
        mgr.next_hint_for_block(BlockId(1), hint);

        let names: Vec<_> = mgr
            .hint_decls(&g)
            .iter()
            .filter_map(|d| d.name().map(str::to_string))
            .collect();
        assert_eq!(names, ["exit_hints", "entry_hints"]);
        assert_eq!(mgr.hints(BlockId(1)).map(<[_]>::len), Some(2));
        assert!(mgr.hints(BlockId(7)).is_none());
    }
}
