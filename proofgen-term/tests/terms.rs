use std::collections::BTreeMap;
use std::rc::Rc;

use proofgen_term::{
    DefDecl, Equation, FreeIdents, Ident, IdentSubst, OuterDecl, Term, TermRef, UniqueNamer,
};
use proptest::{
    prelude::prop,
    test_runner::{Config, TestCaseError, TestRunner},
};

fn subst(pairs: &[(&str, &str)]) -> BTreeMap<Ident, TermRef> {
    pairs
        .iter()
        .map(|(from, to)| (Ident::new(*from), Term::ident(*to)))
        .collect()
}

#[test]
fn substitution_stops_at_binders() {
    let t = Term::forall(
        vec![Ident::new("x")],
        Term::eq(Term::ident("x"), Term::ident("y")),
    );
    let out = IdentSubst::apply(&subst(&[("x", "a"), ("y", "b")]), &t);
    assert_eq!(out.to_string(), "\\<forall>x. x = b");
}

#[test]
fn substitution_renames_binders_it_would_capture() {
    // y := x under \<forall>x must not be captured
    let t = Term::forall(
        vec![Ident::new("x")],
        Term::eq(Term::ident("x"), Term::ident("y")),
    );
    let out = IdentSubst::apply(&subst(&[("y", "x")]), &t);
    assert_eq!(out.to_string(), "\\<forall>x'. x' = x");

    // the primed name is taken as well
    let t = Term::forall(
        vec![Ident::new("x"), Ident::new("x'")],
        Term::and(
            Term::eq(Term::ident("x"), Term::ident("y")),
            Term::eq(Term::ident("x'"), Term::ident("z")),
        ),
    );
    let out = IdentSubst::apply(&subst(&[("y", "x"), ("z", "x'")]), &t);
    assert_eq!(
        out.to_string(),
        "\\<forall>x'' x'''. (x'' = x) \\<and> (x''' = x')"
    );
}

#[test]
fn untouched_subterms_stay_shared() {
    let left = Term::call("f", vec![Term::ident("u")]);
    let t = Term::and(left.clone(), Term::ident("v"));
    let out = IdentSubst::apply(&subst(&[("v", "w")]), &t);

    let Term::NAry { args, .. } = &*out else {
        panic!("expected a conjunction, got {out}");
    };
    assert!(Rc::ptr_eq(&args[0], &left));
    assert_eq!(out.to_string(), "(f u) \\<and> w");

    let same = IdentSubst::apply(&subst(&[("z", "q")]), &t);
    assert!(Rc::ptr_eq(&same, &t));
}

#[test]
fn case_patterns_bind_within_their_arm() {
    let t = Term::case_of(
        Term::ident("m"),
        vec![
            (Term::call("Some", vec![Term::ident("r")]), Term::ident("r")),
            (Term::ident("None"), Term::ident("d")),
        ],
    );
    let free: Vec<String> = FreeIdents::collect(&t)
        .iter()
        .map(|i| i.as_str().to_string())
        .collect();
    assert_eq!(free, ["m", "d"]);
}

#[test]
fn definitions_render_with_their_parameters() {
    let def = OuterDecl::Def(DefDecl {
        name: "vcax_0".to_string(),
        equation: Equation {
            lhs: vec![Term::ident("x")],
            rhs: Term::le(Term::int(-1), Term::ident("x")),
        },
    });
    assert_eq!(
        def.to_string(),
        "definition vcax_0 where\n  \"(vcax_0 x) = ((-1::int) \\<le> x)\""
    );
    assert_eq!(def.name(), Some("vcax_0"));
}

#[test]
fn namer_is_injective_and_stable() {
    let mut runner = TestRunner::new(Config {
        cases: 64,
        ..Config::default()
    });
    let strat = prop::collection::vec(
        (0u8..16, prop::sample::select(vec!["x", "x_0", "A", "1y", "v@2"])),
        1..24,
    );

    runner
        .run(&strat, |requests| {
            let mut namer: UniqueNamer<u8> = UniqueNamer::new();
            let mut given: BTreeMap<u8, String> = BTreeMap::new();
            for (key, preferred) in &requests {
                let name = namer.get_name(key, preferred);
                match given.get(key) {
                    Some(prev) if *prev != name => {
                        return Err(TestCaseError::fail(format!(
                            "key {key} renamed from {prev} to {name}"
                        )));
                    }
                    Some(_) => {}
                    None => {
                        if given.values().any(|n| *n == name) {
                            return Err(TestCaseError::fail(format!("{name} handed out twice")));
                        }
                        given.insert(*key, name);
                    }
                }
            }
            if given.values().any(|n| n == "A" || n.contains('@')) {
                return Err(TestCaseError::fail(format!("unsanitized name in {given:?}")));
            }
            Ok(())
        })
        .map_err(|e| e.to_string())
        .expect("namer proptest");
}
