#![forbid(unsafe_code)]

use std::rc::Rc;

use crate::ty::Type;

/// Shared handle to an immutable term. Identical sub-expressions are reused
/// by cloning the handle, never by copying the tree.
pub type TermRef = Rc<Term>;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident(pub String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Nat(u64),
    Int(i64),
    Str(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NAryOp {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,

    And,
    Or,
    Implies,
    /// Meta-level implication between hypotheses.
    MetaImp,

    Add,
    Sub,

    Elem,
    Inter,
    Append,
    Compose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuantKind {
    ForAll,
    Exists,
    /// Meta-level universal closure.
    MetaAll,
    Lambda,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    App {
        head: TermRef,
        args: Vec<TermRef>,
    },
    List(Vec<TermRef>),
    Set(Vec<TermRef>),
    Record(Vec<(Ident, TermRef)>),
    Tuple(Vec<TermRef>),
    Ident(Ident),
    NAry {
        op: NAryOp,
        args: Vec<TermRef>,
    },
    Quantifier {
        kind: QuantKind,
        bound: Vec<Ident>,
        /// One type per bound identifier when present.
        types: Option<Vec<Type>>,
        body: TermRef,
    },
    CaseOf {
        scrutinee: TermRef,
        arms: Vec<(TermRef, TermRef)>,
    },
    /// Term with an explicit type annotation.
    Typed {
        term: TermRef,
        ty: Type,
    },
    Lit(Literal),
}

impl Term {
    pub fn ident(name: impl Into<String>) -> TermRef {
        Rc::new(Term::Ident(Ident::new(name)))
    }

    pub fn from_ident(id: &Ident) -> TermRef {
        Rc::new(Term::Ident(id.clone()))
    }

    pub fn app(head: TermRef, args: Vec<TermRef>) -> TermRef {
        Rc::new(Term::App { head, args })
    }

    /// Application of a named function.
    pub fn call(head: &str, args: Vec<TermRef>) -> TermRef {
        Self::app(Self::ident(head), args)
    }

    pub fn list(items: Vec<TermRef>) -> TermRef {
        Rc::new(Term::List(items))
    }

    pub fn set(items: Vec<TermRef>) -> TermRef {
        Rc::new(Term::Set(items))
    }

    pub fn record(fields: Vec<(Ident, TermRef)>) -> TermRef {
        Rc::new(Term::Record(fields))
    }

    pub fn tuple(items: Vec<TermRef>) -> TermRef {
        Rc::new(Term::Tuple(items))
    }

    pub fn nary(op: NAryOp, args: Vec<TermRef>) -> TermRef {
        Rc::new(Term::NAry { op, args })
    }

    pub fn binary(op: NAryOp, left: TermRef, right: TermRef) -> TermRef {
        Self::nary(op, vec![left, right])
    }

    pub fn eq(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::Eq, left, right)
    }

    pub fn neq(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::Neq, left, right)
    }

    pub fn le(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::Le, left, right)
    }

    pub fn ge(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::Ge, left, right)
    }

    pub fn and(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::And, left, right)
    }

    pub fn implies(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::Implies, left, right)
    }

    pub fn meta_imp(left: TermRef, right: TermRef) -> TermRef {
        Self::binary(NAryOp::MetaImp, left, right)
    }

    pub fn quantifier(
        kind: QuantKind,
        bound: Vec<Ident>,
        types: Option<Vec<Type>>,
        body: TermRef,
    ) -> TermRef {
        debug_assert!(types.as_ref().is_none_or(|t| t.len() == bound.len()));
        Rc::new(Term::Quantifier {
            kind,
            bound,
            types,
            body,
        })
    }

    pub fn forall(bound: Vec<Ident>, body: TermRef) -> TermRef {
        Self::quantifier(QuantKind::ForAll, bound, None, body)
    }

    /// Meta-level closure of `body` over typed identifiers. An empty binder
    /// list yields `body` itself.
    pub fn meta_all(bound: Vec<Ident>, types: Vec<Type>, body: TermRef) -> TermRef {
        if bound.is_empty() {
            return body;
        }
        Self::quantifier(QuantKind::MetaAll, bound, Some(types), body)
    }

    pub fn case_of(scrutinee: TermRef, arms: Vec<(TermRef, TermRef)>) -> TermRef {
        Rc::new(Term::CaseOf { scrutinee, arms })
    }

    pub fn typed(term: TermRef, ty: Type) -> TermRef {
        Rc::new(Term::Typed { term, ty })
    }

    pub fn bool_lit(b: bool) -> TermRef {
        Rc::new(Term::Lit(Literal::Bool(b)))
    }

    pub fn nat(n: u64) -> TermRef {
        Rc::new(Term::Lit(Literal::Nat(n)))
    }

    pub fn int(n: i64) -> TermRef {
        Rc::new(Term::Lit(Literal::Int(n)))
    }

    pub fn string(s: impl Into<String>) -> TermRef {
        Rc::new(Term::Lit(Literal::Str(s.into())))
    }

    /// Terms rendered without surrounding parentheses.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            Term::Ident(_)
                | Term::Lit(_)
                | Term::List(_)
                | Term::Set(_)
                | Term::Tuple(_)
                | Term::Record(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_ignores_sharing() {
        let x = Term::ident("x");
        let shared = Term::eq(x.clone(), x.clone());
        let fresh = Term::eq(Term::ident("x"), Term::ident("x"));
        assert_eq!(shared, fresh);
        assert!(Rc::ptr_eq(
            match &*shared {
                Term::NAry { args, .. } => &args[0],
                _ => unreachable!(),
            },
            &x
        ));
    }

    #[test]
    fn meta_all_without_binders_is_identity() {
        let body = Term::bool_lit(true);
        let closed = Term::meta_all(vec![], vec![], body.clone());
        assert!(Rc::ptr_eq(&closed, &body));
    }
}
