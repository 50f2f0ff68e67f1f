#![forbid(unsafe_code)]

//! Builders for the library vocabulary shared by every generated document.

use crate::term::{Ident, NAryOp, QuantKind, Term, TermRef};

pub fn some(t: TermRef) -> TermRef {
    Term::call("Some", vec![t])
}

pub fn none() -> TermRef {
    Term::ident("None")
}

pub fn the(t: TermRef) -> TermRef {
    Term::call("the", vec![t])
}

pub fn map_of(list: TermRef, key: TermRef) -> TermRef {
    Term::call("map_of", vec![list, key])
}

pub fn nth(list: TermRef, idx: TermRef) -> TermRef {
    Term::call("nth", vec![list, idx])
}

pub fn set_of_list(list: TermRef) -> TermRef {
    Term::call("set", vec![list])
}

pub fn elem(x: TermRef, set: TermRef) -> TermRef {
    Term::binary(NAryOp::Elem, x, set)
}

pub fn empty_list() -> TermRef {
    Term::list(Vec::new())
}

pub fn empty_set() -> TermRef {
    Term::set(Vec::new())
}

pub fn set_inter(a: TermRef, b: TermRef) -> TermRef {
    Term::binary(NAryOp::Inter, a, b)
}

pub fn set_min(set: TermRef) -> TermRef {
    Term::call("Min", vec![set])
}

pub fn set_max(set: TermRef) -> TermRef {
    Term::call("Max", vec![set])
}

pub fn append_list(a: TermRef, b: TermRef) -> TermRef {
    Term::binary(NAryOp::Append, a, b)
}

pub fn map(f: TermRef, list: TermRef) -> TermRef {
    Term::call("map", vec![f, list])
}

pub fn list_all(pred: TermRef, list: TermRef) -> TermRef {
    Term::call("list_all", vec![pred, list])
}

pub fn composition(f: TermRef, g: TermRef) -> TermRef {
    Term::binary(NAryOp::Compose, f, g)
}

pub fn fst_id() -> TermRef {
    Term::ident("fst")
}

pub fn snd_id() -> TermRef {
    Term::ident("snd")
}

pub fn lambda(bound: Vec<Ident>, body: TermRef) -> TermRef {
    Term::quantifier(QuantKind::Lambda, bound, None, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_shape() {
        let stmt = Term::eq(
            map_of(Term::ident("fdecls"), Term::string("f")),
            some(Term::ident("d")),
        );
        assert_eq!(stmt.to_string(), "(map_of fdecls ''f'') = (Some d)");
    }
}
