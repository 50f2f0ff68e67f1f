#![forbid(unsafe_code)]

//! Vocabulary of the source-language semantics as formalized in the target
//! logic: value boxing, type terms, interpretation well-formedness and the
//! CFG reduction relation.

use std::collections::BTreeMap;

use proofgen_term::common::{some, the};
use proofgen_term::{Ident, QuantKind, Term, TermRef, Type};

use crate::decl::{Function, Ty, Variable};
use crate::error::{ProofGenError, Result};

/// The fixed identifiers every generated lemma is stated over.
#[derive(Clone, Debug)]
pub struct SemanticsContext {
    /// Abstract value type map.
    pub abs_val_ty_map: TermRef,
    pub method_context: TermRef,
    pub var_context: TermRef,
    pub fun_context: TermRef,
    pub rtype_env: TermRef,
}

impl Default for SemanticsContext {
    fn default() -> Self {
        Self {
            abs_val_ty_map: Term::ident("A"),
            method_context: Term::ident("M"),
            var_context: Term::ident("\\<Lambda>"),
            fun_context: Term::ident("\\<Gamma>"),
            rtype_env: Term::ident("\\<Omega>"),
        }
    }
}

fn prim(name: &str, closed: bool) -> TermRef {
    Term::call(
        if closed { "TPrimC" } else { "TPrim" },
        vec![Term::ident(name)],
    )
}

/// Open type term (`TPrim`, `TVar`, `TCon`). Type variables are resolved by
/// `tyvar`.
pub fn ty_term(ty: &Ty, tyvar: &dyn Fn(&str) -> Option<TermRef>) -> Result<TermRef> {
    Ok(match ty {
        Ty::Bool => prim("TBool", false),
        Ty::Int => prim("TInt", false),
        Ty::Var(v) => tyvar(v).ok_or_else(|| ProofGenError::UnboundTypeVar { name: v.clone() })?,
        Ty::Ctor { name, args } => {
            let args = args
                .iter()
                .map(|a| ty_term(a, tyvar))
                .collect::<Result<Vec<_>>>()?;
            Term::call("TCon", vec![Term::string(name.as_str()), Term::list(args)])
        }
    })
}

/// Closed type term (`TPrimC`, `TConC`). Type variables must be mapped to
/// closed-type terms.
pub fn closed_ty_term(ty: &Ty, subst: &BTreeMap<String, TermRef>) -> Result<TermRef> {
    Ok(match ty {
        Ty::Bool => prim("TBool", true),
        Ty::Int => prim("TInt", true),
        Ty::Var(v) => subst
            .get(v)
            .cloned()
            .ok_or_else(|| ProofGenError::UnboundTypeVar { name: v.clone() })?,
        Ty::Ctor { name, args } => {
            let args = args
                .iter()
                .map(|a| closed_ty_term(a, subst))
                .collect::<Result<Vec<_>>>()?;
            Term::call("TConC", vec![Term::string(name.as_str()), Term::list(args)])
        }
    })
}

pub fn prim_closed_ty(ty: &Ty) -> Option<TermRef> {
    match ty {
        Ty::Bool => Some(prim("TBool", true)),
        Ty::Int => Some(prim("TInt", true)),
        _ => None,
    }
}

/// Type term of a variable declaration; variables carry no type variables.
pub fn var_decl_term(v: &Variable) -> Result<TermRef> {
    ty_term(&v.ty, &|_| None)
}

/// `(n_tyargs, [arg types], ret type)`, with type variables as de Bruijn
/// style `TVar i` by declaration position.
pub fn fun_decl_term(f: &Function) -> Result<TermRef> {
    let tyvar = |name: &str| {
        f.type_params
            .iter()
            .position(|tv| tv == name)
            .map(|i| Term::call("TVar", vec![Term::nat(i as u64)]))
    };
    let args = f
        .params
        .iter()
        .map(|(_, ty)| ty_term(ty, &tyvar))
        .collect::<Result<Vec<_>>>()?;
    Ok(Term::tuple(vec![
        Term::nat(f.type_params.len() as u64),
        Term::list(args),
        ty_term(&f.ret, &tyvar)?,
    ]))
}

/// Target-logic type of a declaration inside the VC: primitives stay
/// primitive, everything else is an abstract value.
pub fn pure_type(ty: &Ty) -> Type {
    match ty {
        Ty::Bool => Type::bool(),
        Ty::Int => Type::int(),
        Ty::Var(_) | Ty::Ctor { .. } => Type::data("val", vec![Type::var("a")]),
    }
}

/// Type of the VC-level counterpart of `f`: one closed type per explicit
/// type parameter, then the value arguments.
pub fn pure_fun_type(f: &Function) -> Type {
    let (explicit, _) = f.split_type_params();
    let closed = explicit.iter().map(|_| Type::data("closed_ty", vec![]));
    let values = f.params.iter().map(|(_, ty)| pure_type(ty));
    Type::curried(closed.chain(values), pure_type(&f.ret))
}

pub fn construct_value(t: TermRef, ty: &Ty) -> TermRef {
    match ty {
        Ty::Int => Term::call("IntV", vec![t]),
        Ty::Bool => Term::call("BoolV", vec![t]),
        _ => t,
    }
}

pub fn destruct_value(t: TermRef, ty: &Ty) -> TermRef {
    match ty {
        Ty::Int => Term::call("convert_val_to_int", vec![t]),
        Ty::Bool => Term::call("convert_val_to_bool", vec![t]),
        _ => t,
    }
}

pub fn bool_val(b: bool) -> TermRef {
    Term::call("BoolV", vec![Term::bool_lit(b)])
}

pub fn closed(t: TermRef) -> TermRef {
    Term::call("closed", vec![t])
}

pub fn ty_to_closed(t: TermRef) -> TermRef {
    Term::call("ty_to_closed", vec![t])
}

pub fn closed_to_ty(t: TermRef) -> TermRef {
    Term::call("closed_to_ty", vec![t])
}

pub fn type_of_val(a: &TermRef, v: TermRef) -> TermRef {
    Term::call("type_of_val", vec![a.clone(), v])
}

pub fn val_of_closed_ty(a: &TermRef, ty: TermRef) -> TermRef {
    Term::call("val_of_closed_ty", vec![a.clone(), ty])
}

pub fn vc_type_of_val(a: &TermRef, v: TermRef) -> TermRef {
    Term::call("vc_type_of_val", vec![a.clone(), v])
}

/// Projection onto argument `idx` of an `arity`-ary type constructor.
pub fn vc_inv(idx: usize, arity: usize, t: TermRef) -> TermRef {
    Term::call(&vc_inv_name(idx, arity), vec![t])
}

pub fn vc_inv_name(idx: usize, arity: usize) -> String {
    format!("vc_inv_{idx}_{arity}")
}

pub fn left_inv_lemma_name(idx: usize, arity: usize) -> String {
    format!("left_inv_{idx}_{arity}")
}

pub fn fun_interp_single_wf(a: &TermRef, fdecl: TermRef, f: TermRef) -> TermRef {
    Term::call("fun_interp_single_wf", vec![a.clone(), fdecl, f])
}

pub fn fun_interp_wf(a: &TermRef, fdecls: TermRef, gamma: &TermRef) -> TermRef {
    Term::call("fun_interp_wf", vec![a.clone(), fdecls, gamma.clone()])
}

pub fn lookup_var_ty(var_context: TermRef, id: TermRef) -> TermRef {
    Term::call("lookup_var_ty", vec![var_context, id])
}

pub fn lookup_var(var_context: TermRef, state: TermRef, id: TermRef) -> TermRef {
    Term::call("lookup_var", vec![var_context, state, id])
}

pub fn local_state(s: TermRef) -> TermRef {
    Term::call("local_state", vec![s])
}

pub fn state_typ_wf(ctx: &SemanticsContext, decls: TermRef, state: TermRef) -> TermRef {
    Term::call(
        "state_typ_wf",
        vec![ctx.abs_val_ty_map.clone(), ctx.rtype_env.clone(), decls, state],
    )
}

pub fn axiom_assm(
    ctx: &SemanticsContext,
    var_context: TermRef,
    axioms: TermRef,
    state: TermRef,
) -> TermRef {
    Term::call(
        "axiom_assm",
        vec![
            ctx.abs_val_ty_map.clone(),
            var_context,
            ctx.fun_context.clone(),
            axioms,
            state,
        ],
    )
}

pub fn red_expr(ctx: &SemanticsContext, e: TermRef, state: TermRef, v: TermRef) -> TermRef {
    Term::call(
        "red_expr",
        vec![
            ctx.abs_val_ty_map.clone(),
            ctx.var_context.clone(),
            ctx.fun_context.clone(),
            ctx.rtype_env.clone(),
            e,
            state,
            v,
        ],
    )
}

/// Multi-step reduction of a CFG from `start` to `end`.
pub fn red_cfg_multi(
    ctx: &SemanticsContext,
    var_context: TermRef,
    cfg: TermRef,
    start: TermRef,
    end: TermRef,
) -> TermRef {
    Term::call(
        "red_cfg_multi",
        vec![
            ctx.abs_val_ty_map.clone(),
            ctx.method_context.clone(),
            var_context,
            ctx.fun_context.clone(),
            ctx.rtype_env.clone(),
            cfg,
            start,
            end,
        ],
    )
}

pub fn cfg_config_node(label: TermRef, state: TermRef) -> TermRef {
    Term::tuple(vec![Term::call("Inl", vec![label]), state])
}

pub fn normal(s: TermRef) -> TermRef {
    Term::call("Normal", vec![s])
}

pub fn failure() -> TermRef {
    Term::ident("Failure")
}

/// `∀v. closed (type_of_val A v)`
pub fn closedness_assumption(a: &TermRef) -> TermRef {
    let v = Ident::new("v");
    Term::forall(
        vec![v.clone()],
        closed(type_of_val(a, Term::from_ident(&v))),
    )
}

/// `∀t. closed t ⟶ (∃v. type_of_val A v = t)`
pub fn non_empty_types_assumption(a: &TermRef) -> TermRef {
    let t = Ident::new("t");
    let v = Ident::new("v");
    Term::forall(
        vec![t.clone()],
        Term::implies(
            closed(Term::from_ident(&t)),
            Term::quantifier(
                QuantKind::Exists,
                vec![v.clone()],
                None,
                Term::eq(type_of_val(a, Term::from_ident(&v)), Term::from_ident(&t)),
            ),
        ),
    )
}

/// `Some (construct (destruct (the e)))`, the normal form of a lookup
/// result of type `ty`.
pub fn normalized_lookup(e: TermRef, ty: &Ty) -> TermRef {
    some(construct_value(destruct_value(the(e), ty), ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_fn() -> Function {
        Function {
            name: "id".to_string(),
            type_params: vec!["T".to_string()],
            params: vec![("x".to_string(), Ty::var("T"))],
            ret: Ty::var("T"),
        }
    }

    #[test]
    fn fun_decl_uses_positional_type_vars() {
        let d = fun_decl_term(&id_fn()).expect("decl");
        assert_eq!(d.to_string(), "(1, [TVar 0], TVar 0)");
    }

    #[test]
    fn unbound_type_var_is_reported() {
        let v = Variable::new("y", Ty::var("T"), 0);
        assert_eq!(
            var_decl_term(&v),
            Err(ProofGenError::UnboundTypeVar {
                name: "T".to_string()
            })
        );
    }

    #[test]
    fn boxing_only_touches_primitives() {
        let x = Term::ident("x");
        assert_eq!(construct_value(x.clone(), &Ty::Int).to_string(), "IntV x");
        assert_eq!(construct_value(x.clone(), &Ty::var("T")), x);
        assert_eq!(
            pure_fun_type(&id_fn()).to_string(),
            "'a val \\<Rightarrow> 'a val"
        );
    }
}
