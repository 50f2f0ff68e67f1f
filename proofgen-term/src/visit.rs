#![forbid(unsafe_code)]

//! Structural traversal of terms, types and outer declarations.
//!
//! Each visitor trait dispatches with a single exhaustive `match`; every
//! variant has a required method, so a new variant fails to compile until
//! all visitors handle it.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::decl::{DefDecl, FunDecl, LemmaDecl, OuterDecl};
use crate::term::{Ident, Literal, NAryOp, QuantKind, Term, TermRef};
use crate::ty::{PrimType, Type};

pub trait TermVisitor {
    type Output;

    fn visit(&mut self, t: &TermRef) -> Self::Output {
        match &**t {
            Term::App { head, args } => self.visit_app(t, head, args),
            Term::List(items) => self.visit_list(t, items),
            Term::Set(items) => self.visit_set(t, items),
            Term::Record(fields) => self.visit_record(t, fields),
            Term::Tuple(items) => self.visit_tuple(t, items),
            Term::Ident(id) => self.visit_ident(t, id),
            Term::NAry { op, args } => self.visit_nary(t, *op, args),
            Term::Quantifier {
                kind,
                bound,
                types,
                body,
            } => self.visit_quantifier(t, *kind, bound, types.as_deref(), body),
            Term::CaseOf { scrutinee, arms } => self.visit_case_of(t, scrutinee, arms),
            Term::Typed { term, ty } => self.visit_typed(t, term, ty),
            Term::Lit(lit) => self.visit_lit(t, lit),
        }
    }

    fn visit_all(&mut self, ts: &[TermRef]) -> Vec<Self::Output> {
        ts.iter().map(|t| self.visit(t)).collect()
    }

    fn visit_app(&mut self, t: &TermRef, head: &TermRef, args: &[TermRef]) -> Self::Output;
    fn visit_list(&mut self, t: &TermRef, items: &[TermRef]) -> Self::Output;
    fn visit_set(&mut self, t: &TermRef, items: &[TermRef]) -> Self::Output;
    fn visit_record(&mut self, t: &TermRef, fields: &[(Ident, TermRef)]) -> Self::Output;
    fn visit_tuple(&mut self, t: &TermRef, items: &[TermRef]) -> Self::Output;
    fn visit_ident(&mut self, t: &TermRef, id: &Ident) -> Self::Output;
    fn visit_nary(&mut self, t: &TermRef, op: NAryOp, args: &[TermRef]) -> Self::Output;
    fn visit_quantifier(
        &mut self,
        t: &TermRef,
        kind: QuantKind,
        bound: &[Ident],
        types: Option<&[Type]>,
        body: &TermRef,
    ) -> Self::Output;
    fn visit_case_of(
        &mut self,
        t: &TermRef,
        scrutinee: &TermRef,
        arms: &[(TermRef, TermRef)],
    ) -> Self::Output;
    fn visit_typed(&mut self, t: &TermRef, term: &TermRef, ty: &Type) -> Self::Output;
    fn visit_lit(&mut self, t: &TermRef, lit: &Literal) -> Self::Output;
}

pub trait TypeVisitor {
    type Output;

    fn visit_type(&mut self, t: &Type) -> Self::Output {
        match t {
            Type::Tuple(items) => self.visit_tuple_type(items),
            Type::Arrow(from, to) => self.visit_arrow_type(from, to),
            Type::Data { name, args } => self.visit_data_type(name, args),
            Type::Primitive(p) => self.visit_primitive_type(*p),
            Type::Var(name) => self.visit_type_var(name),
        }
    }

    fn visit_tuple_type(&mut self, items: &[Type]) -> Self::Output;
    fn visit_arrow_type(&mut self, from: &Type, to: &Type) -> Self::Output;
    fn visit_data_type(&mut self, name: &str, args: &[Type]) -> Self::Output;
    fn visit_primitive_type(&mut self, p: PrimType) -> Self::Output;
    fn visit_type_var(&mut self, name: &str) -> Self::Output;
}

pub trait OuterDeclVisitor {
    type Output;

    fn visit_decl(&mut self, d: &OuterDecl) -> Self::Output {
        match d {
            OuterDecl::Fun(f) => self.visit_fun_decl(f),
            OuterDecl::Def(def) => self.visit_def_decl(def),
            OuterDecl::Lemma(l) => self.visit_lemma_decl(l),
            OuterDecl::Declare(attr) => self.visit_declare(attr),
        }
    }

    fn visit_fun_decl(&mut self, f: &FunDecl) -> Self::Output;
    fn visit_def_decl(&mut self, d: &DefDecl) -> Self::Output;
    fn visit_lemma_decl(&mut self, l: &LemmaDecl) -> Self::Output;
    fn visit_declare(&mut self, attr: &str) -> Self::Output;
}

/// Collects identifiers that are not bound by an enclosing quantifier, in
/// first-occurrence order.
#[derive(Default)]
pub struct FreeIdents {
    bound: Vec<Ident>,
    seen: BTreeSet<Ident>,
    out: Vec<Ident>,
}

impl FreeIdents {
    pub fn collect(t: &TermRef) -> Vec<Ident> {
        let mut v = FreeIdents::default();
        v.visit(t);
        v.out
    }
}

impl TermVisitor for FreeIdents {
    type Output = ();

    fn visit_app(&mut self, _t: &TermRef, head: &TermRef, args: &[TermRef]) {
        self.visit(head);
        self.visit_all(args);
    }

    fn visit_list(&mut self, _t: &TermRef, items: &[TermRef]) {
        self.visit_all(items);
    }

    fn visit_set(&mut self, _t: &TermRef, items: &[TermRef]) {
        self.visit_all(items);
    }

    fn visit_record(&mut self, _t: &TermRef, fields: &[(Ident, TermRef)]) {
        for (_, v) in fields {
            self.visit(v);
        }
    }

    fn visit_tuple(&mut self, _t: &TermRef, items: &[TermRef]) {
        self.visit_all(items);
    }

    fn visit_ident(&mut self, _t: &TermRef, id: &Ident) {
        if !self.bound.contains(id) && self.seen.insert(id.clone()) {
            self.out.push(id.clone());
        }
    }

    fn visit_nary(&mut self, _t: &TermRef, _op: NAryOp, args: &[TermRef]) {
        self.visit_all(args);
    }

    fn visit_quantifier(
        &mut self,
        _t: &TermRef,
        _kind: QuantKind,
        bound: &[Ident],
        _types: Option<&[Type]>,
        body: &TermRef,
    ) {
        let depth = self.bound.len();
        self.bound.extend(bound.iter().cloned());
        self.visit(body);
        self.bound.truncate(depth);
    }

    fn visit_case_of(&mut self, _t: &TermRef, scrutinee: &TermRef, arms: &[(TermRef, TermRef)]) {
        self.visit(scrutinee);
        for (pat, rhs) in arms {
            // Pattern variables scope over their arm only.
            let depth = self.bound.len();
            self.bound.extend(FreeIdents::collect(pat));
            self.visit(rhs);
            self.bound.truncate(depth);
        }
    }

    fn visit_typed(&mut self, _t: &TermRef, term: &TermRef, _ty: &Type) {
        self.visit(term);
    }

    fn visit_lit(&mut self, _t: &TermRef, _lit: &Literal) {}
}

/// Replaces free identifiers according to a map. Subterms without a
/// replacement are returned as the same shared handle.
///
/// Quantifier binders that occur free in a replacement are renamed by
/// priming (`x` becomes `x'`). Case patterns are not renamed: their
/// identifiers must not occur free in any replacement.
pub struct IdentSubst<'a> {
    map: &'a BTreeMap<Ident, TermRef>,
    /// Free identifiers of all replacements.
    range_free: BTreeSet<Ident>,
    /// Binders in scope, with the fresh name of a renamed binder.
    bound: Vec<(Ident, Option<TermRef>)>,
}

impl<'a> IdentSubst<'a> {
    pub fn new(map: &'a BTreeMap<Ident, TermRef>) -> Self {
        let range_free = map.values().flat_map(FreeIdents::collect).collect();
        Self {
            map,
            range_free,
            bound: Vec::new(),
        }
    }

    pub fn apply(map: &BTreeMap<Ident, TermRef>, t: &TermRef) -> TermRef {
        IdentSubst::new(map).visit(t)
    }

    fn fresh_binder(
        &self,
        b: &Ident,
        binders: &[Ident],
        chosen: &[Ident],
        body_free: &[Ident],
    ) -> Ident {
        let mut name = format!("{}'", b.as_str());
        loop {
            let candidate = Ident::new(name.as_str());
            let taken = self.range_free.contains(&candidate)
                || binders.contains(&candidate)
                || chosen.contains(&candidate)
                || body_free.contains(&candidate);
            if !taken {
                return candidate;
            }
            name.push('\'');
        }
    }

    fn rebuild(&mut self, t: &TermRef, items: &[TermRef], make: impl FnOnce(Vec<TermRef>) -> Term) -> TermRef {
        let new_items = self.visit_all(items);
        if unchanged(items, &new_items) {
            t.clone()
        } else {
            Rc::new(make(new_items))
        }
    }
}

fn unchanged(old: &[TermRef], new: &[TermRef]) -> bool {
    old.iter().zip(new).all(|(a, b)| Rc::ptr_eq(a, b))
}

impl TermVisitor for IdentSubst<'_> {
    type Output = TermRef;

    fn visit_app(&mut self, t: &TermRef, head: &TermRef, args: &[TermRef]) -> TermRef {
        let new_head = self.visit(head);
        let new_args = self.visit_all(args);
        if Rc::ptr_eq(head, &new_head) && unchanged(args, &new_args) {
            t.clone()
        } else {
            Term::app(new_head, new_args)
        }
    }

    fn visit_list(&mut self, t: &TermRef, items: &[TermRef]) -> TermRef {
        self.rebuild(t, items, Term::List)
    }

    fn visit_set(&mut self, t: &TermRef, items: &[TermRef]) -> TermRef {
        self.rebuild(t, items, Term::Set)
    }

    fn visit_record(&mut self, t: &TermRef, fields: &[(Ident, TermRef)]) -> TermRef {
        let values: Vec<TermRef> = fields.iter().map(|(_, v)| v.clone()).collect();
        let new_values = self.visit_all(&values);
        if unchanged(&values, &new_values) {
            return t.clone();
        }
        Term::record(
            fields
                .iter()
                .map(|(k, _)| k.clone())
                .zip(new_values)
                .collect(),
        )
    }

    fn visit_tuple(&mut self, t: &TermRef, items: &[TermRef]) -> TermRef {
        self.rebuild(t, items, Term::Tuple)
    }

    fn visit_ident(&mut self, t: &TermRef, id: &Ident) -> TermRef {
        if let Some((_, renamed)) = self.bound.iter().rev().find(|(b, _)| b == id) {
            return renamed.clone().unwrap_or_else(|| t.clone());
        }
        self.map.get(id).cloned().unwrap_or_else(|| t.clone())
    }

    fn visit_nary(&mut self, t: &TermRef, op: NAryOp, args: &[TermRef]) -> TermRef {
        self.rebuild(t, args, |args| Term::NAry { op, args })
    }

    fn visit_quantifier(
        &mut self,
        t: &TermRef,
        kind: QuantKind,
        bound: &[Ident],
        types: Option<&[Type]>,
        body: &TermRef,
    ) -> TermRef {
        let depth = self.bound.len();
        let body_free = FreeIdents::collect(body);
        let mut new_bound = Vec::with_capacity(bound.len());
        for b in bound {
            if self.range_free.contains(b) {
                let fresh = self.fresh_binder(b, bound, &new_bound, &body_free);
                self.bound.push((b.clone(), Some(Term::from_ident(&fresh))));
                new_bound.push(fresh);
            } else {
                self.bound.push((b.clone(), None));
                new_bound.push(b.clone());
            }
        }
        let new_body = self.visit(body);
        self.bound.truncate(depth);
        if new_bound == bound && Rc::ptr_eq(body, &new_body) {
            t.clone()
        } else {
            Term::quantifier(kind, new_bound, types.map(<[Type]>::to_vec), new_body)
        }
    }

    fn visit_case_of(&mut self, t: &TermRef, scrutinee: &TermRef, arms: &[(TermRef, TermRef)]) -> TermRef {
        let new_scrutinee = self.visit(scrutinee);
        let mut changed = !Rc::ptr_eq(scrutinee, &new_scrutinee);
        let mut new_arms = Vec::with_capacity(arms.len());
        for (pat, rhs) in arms {
            let depth = self.bound.len();
            self.bound
                .extend(FreeIdents::collect(pat).into_iter().map(|id| (id, None)));
            let new_rhs = self.visit(rhs);
            self.bound.truncate(depth);
            changed |= !Rc::ptr_eq(rhs, &new_rhs);
            new_arms.push((pat.clone(), new_rhs));
        }
        if changed {
            Term::case_of(new_scrutinee, new_arms)
        } else {
            t.clone()
        }
    }

    fn visit_typed(&mut self, t: &TermRef, term: &TermRef, ty: &Type) -> TermRef {
        let new_term = self.visit(term);
        if Rc::ptr_eq(term, &new_term) {
            t.clone()
        } else {
            Term::typed(new_term, ty.clone())
        }
    }

    fn visit_lit(&mut self, t: &TermRef, _lit: &Literal) -> TermRef {
        t.clone()
    }
}

/// Substitutes type variables by types.
pub struct TypeVarSubst<'a> {
    pub map: &'a BTreeMap<String, Type>,
}

impl TypeVisitor for TypeVarSubst<'_> {
    type Output = Type;

    fn visit_tuple_type(&mut self, items: &[Type]) -> Type {
        Type::Tuple(items.iter().map(|t| self.visit_type(t)).collect())
    }

    fn visit_arrow_type(&mut self, from: &Type, to: &Type) -> Type {
        Type::arrow(self.visit_type(from), self.visit_type(to))
    }

    fn visit_data_type(&mut self, name: &str, args: &[Type]) -> Type {
        Type::data(name, args.iter().map(|t| self.visit_type(t)).collect())
    }

    fn visit_primitive_type(&mut self, p: PrimType) -> Type {
        Type::Primitive(p)
    }

    fn visit_type_var(&mut self, name: &str) -> Type {
        self.map
            .get(name)
            .cloned()
            .unwrap_or_else(|| Type::var(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_idents_skip_bound_and_keep_first_occurrence_order() {
        let body = Term::eq(
            Term::call("f", vec![Term::ident("x"), Term::ident("y")]),
            Term::ident("y"),
        );
        let t = Term::forall(vec![Ident::new("x")], body);
        let free = FreeIdents::collect(&t);
        assert_eq!(free, vec![Ident::new("f"), Ident::new("y")]);
    }

    #[test]
    fn case_patterns_bind_their_variables() {
        let t = Term::case_of(
            Term::ident("s"),
            vec![(
                Term::call("Some", vec![Term::ident("r")]),
                Term::ident("r"),
            )],
        );
        let free = FreeIdents::collect(&t);
        assert_eq!(free, vec![Ident::new("s")]);
    }

    #[test]
    fn substitution_preserves_untouched_sharing() {
        let untouched = Term::call("g", vec![Term::nat(1)]);
        let t = Term::and(untouched.clone(), Term::ident("v"));
        let mut map = BTreeMap::new();
        map.insert(Ident::new("v"), Term::ident("v_renamed"));

        let out = IdentSubst::apply(&map, &t);
        match &*out {
            Term::NAry { args, .. } => {
                assert!(Rc::ptr_eq(&args[0], &untouched));
                assert_eq!(args[1], Term::ident("v_renamed"));
            }
            other => panic!("unexpected term {other:?}"),
        }

        let empty = BTreeMap::new();
        assert!(Rc::ptr_eq(&IdentSubst::apply(&empty, &t), &t));
    }

    #[test]
    fn substitution_respects_binders() {
        let t = Term::forall(vec![Ident::new("v")], Term::ident("v"));
        let mut map = BTreeMap::new();
        map.insert(Ident::new("v"), Term::nat(0));
        assert!(Rc::ptr_eq(&IdentSubst::apply(&map, &t), &t));
    }

    #[test]
    fn type_var_substitution() {
        let mut map = BTreeMap::new();
        map.insert("T".to_string(), Type::int());
        let t = Type::data("list", vec![Type::var("T"), Type::var("U")]);
        let out = TypeVarSubst { map: &map }.visit_type(&t);
        assert_eq!(out, Type::data("list", vec![Type::int(), Type::var("U")]));
    }
}
