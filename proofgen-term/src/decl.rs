#![forbid(unsafe_code)]

use crate::term::TermRef;
use crate::ty::Type;

/// A discharge script: one proof method or script line per entry.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Proof {
    pub methods: Vec<String>,
}

impl Proof {
    pub fn new(methods: Vec<String>) -> Self {
        Self { methods }
    }

    pub fn by(method: impl Into<String>) -> Self {
        Self {
            methods: vec![format!("by {}", method.into())],
        }
    }
}

/// Labelled assumptions of a lemma.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ContextElem {
    pub assumptions: Vec<(String, TermRef)>,
}

impl ContextElem {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_assumptions(assumptions: Vec<(String, TermRef)>) -> Self {
        Self { assumptions }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.assumptions.iter().map(|(l, _)| l.as_str())
    }
}

/// One defining equation `name lhs.. = rhs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Equation {
    pub lhs: Vec<TermRef>,
    pub rhs: TermRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunDecl {
    pub name: String,
    pub ty: Option<Type>,
    pub equations: Vec<Equation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefDecl {
    pub name: String,
    pub equation: Equation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LemmaDecl {
    pub name: String,
    pub context: ContextElem,
    pub statement: TermRef,
    pub proof: Proof,
}

impl LemmaDecl {
    pub fn new(name: impl Into<String>, statement: TermRef, proof: Proof) -> Self {
        Self {
            name: name.into(),
            context: ContextElem::empty(),
            statement,
            proof,
        }
    }

    pub fn with_context(
        name: impl Into<String>,
        context: ContextElem,
        statement: TermRef,
        proof: Proof,
    ) -> Self {
        Self {
            name: name.into(),
            context,
            statement,
            proof,
        }
    }
}

/// Top-level declarations of a proof document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OuterDecl {
    Fun(FunDecl),
    Def(DefDecl),
    Lemma(LemmaDecl),
    /// Attribute declaration such as `One_nat_def[simp del]`.
    Declare(String),
}

impl OuterDecl {
    /// Name introduced by the declaration, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            OuterDecl::Fun(f) => Some(&f.name),
            OuterDecl::Def(d) => Some(&d.name),
            OuterDecl::Lemma(l) => Some(&l.name),
            OuterDecl::Declare(_) => None,
        }
    }
}

impl From<LemmaDecl> for OuterDecl {
    fn from(l: LemmaDecl) -> Self {
        OuterDecl::Lemma(l)
    }
}

impl From<FunDecl> for OuterDecl {
    fn from(f: FunDecl) -> Self {
        OuterDecl::Fun(f)
    }
}

impl From<DefDecl> for OuterDecl {
    fn from(d: DefDecl) -> Self {
        OuterDecl::Def(d)
    }
}
