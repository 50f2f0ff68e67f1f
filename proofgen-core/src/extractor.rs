#![forbid(unsafe_code)]

//! Recovering implicit type parameters from argument values.
//!
//! An implicit type parameter occurs in some argument type, so its
//! instantiation can be read off that argument's runtime type. The choice of
//! argument is fixed: the first argument position whose type mentions the
//! variable, and within that type the first occurrence in pre-order.

use proofgen_term::TermRef;

use crate::decl::Ty;
use crate::lang::{vc_inv, vc_type_of_val};

/// Extractor for `tv` over `args` (argument types paired with the terms
/// naming the argument values), or `None` when no argument mentions `tv`.
pub fn best_extractor(tv: &str, a: &TermRef, args: &[(&Ty, TermRef)]) -> Option<TermRef> {
    args.iter().find_map(|(ty, value)| {
        let path = ty.path_to(tv)?;
        let root = vc_type_of_val(a, value.clone());
        Some(
            path.into_iter()
                .fold(root, |acc, (arity, idx)| vc_inv(idx, arity, acc)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofgen_term::Term;

    #[test]
    fn picks_first_mentioning_argument() {
        let a = Term::ident("A");
        let int = Ty::Int;
        let list_t = Ty::ctor("List", vec![Ty::var("T")]);
        let t = Ty::var("T");
        let args = vec![
            (&int, Term::ident("n")),
            (&list_t, Term::ident("xs")),
            (&t, Term::ident("y")),
        ];
        let e = best_extractor("T", &a, &args).expect("extractor");
        assert_eq!(e.to_string(), "vc_inv_0_1 (vc_type_of_val A xs)");
        assert!(best_extractor("U", &a, &args).is_none());
    }

    #[test]
    fn nested_projection_applies_outermost_first() {
        let a = Term::ident("A");
        let ty = Ty::ctor(
            "Map",
            vec![Ty::Int, Ty::ctor("Box", vec![Ty::var("T")])],
        );
        let e = best_extractor("T", &a, &[(&ty, Term::ident("m"))]).expect("extractor");
        assert_eq!(
            e.to_string(),
            "vc_inv_0_1 (vc_inv_1_2 (vc_type_of_val A m))"
        );
    }
}
