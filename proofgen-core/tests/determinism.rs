mod common;

use std::collections::BTreeSet;

use proptest::{
    prelude::prop,
    test_runner::{Config, TestCaseError, TestRunner},
};
use proofgen_core::{CfgSnapshot, ProgramDecls, ProofDocument, ProofGenSession, Ty, Variable};
use proofgen_term::Term;

use common::{config, pick, two_blocks};

fn program_with(params: &[String]) -> ProgramDecls {
    ProgramDecls {
        functions: vec![pick()],
        globals: vec![Variable::new("g", Ty::Int, 0)],
        params: params
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let ty = if i % 2 == 0 { Ty::Int } else { Ty::ctor("list", vec![Ty::Int]) };
                Variable::new(name.as_str(), ty, i as u32 + 1)
            })
            .collect(),
        ..ProgramDecls::default()
    }
}

fn generate(params: &[String]) -> Result<ProofDocument, TestCaseError> {
    let fail = |e: proofgen_core::ProofGenError| TestCaseError::fail(e.to_string());
    let graph = two_blocks();
    let mut s = ProofGenSession::new(config("det"));
    s.program(program_with(params)).map_err(fail)?;
    s.before_acyclification(&graph).map_err(fail)?;
    s.before_renaming(CfgSnapshot::unchanged(graph.clone()))
        .map_err(fail)?;
    s.after_renaming(params.iter().map(String::as_str)).map_err(fail)?;
    s.after_dead_block_removal(CfgSnapshot::unchanged(graph.clone()))
        .map_err(fail)?;
    s.after_unreachable_pruning(CfgSnapshot::unchanged(graph))
        .map_err(fail)?;
    let vc = proofgen_core::VcInput::new(Term::bool_lit(true), Vec::new());
    s.generate_all_proofs(&vc, None).map_err(fail)
}

#[test]
fn documents_are_reproducible_and_names_unique() {
    let mut runner = TestRunner::new(Config {
        cases: 64,
        ..Config::default()
    });
    let strat = prop::collection::btree_set("[a-z][a-z0-9]{0,3}", 1..6);

    runner
        .run(&strat, |names| {
            let params: Vec<String> = names.into_iter().collect();
            let first = generate(&params)?;
            let second = generate(&params)?;
            if first.to_string() != second.to_string() {
                return Err(TestCaseError::fail(format!(
                    "two runs over {params:?} rendered differently"
                )));
            }

            let mut seen = BTreeSet::new();
            for name in first.names() {
                if !seen.insert(name) {
                    return Err(TestCaseError::fail(format!(
                        "declaration {name} emitted twice for {params:?}"
                    )));
                }
            }
            Ok(())
        })
        .map_err(|e| e.to_string())
        .expect("determinism proptest");
}
