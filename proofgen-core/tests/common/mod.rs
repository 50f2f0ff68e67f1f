#![allow(dead_code)]

use proofgen_cfg::{Block, BlockId, Cmd, ControlFlowGraph};
use proofgen_core::{Function, ProgramDecls, ProofGenConfig, Ty, Variable};
use proofgen_term::Term;

pub fn config(theory: &str) -> ProofGenConfig {
    ProofGenConfig {
        theory_name: theory.to_string(),
        ..ProofGenConfig::default()
    }
}

/// `pick<T>(v: T): bool`, with `T` recoverable from the argument.
pub fn pick() -> Function {
    Function {
        name: "pick".to_string(),
        type_params: vec!["T".to_string()],
        params: vec![("v".to_string(), Ty::var("T"))],
        ret: Ty::Bool,
    }
}

/// One global `g`, parameter `x: int`, local `ys: int list`, and `pick`.
pub fn program() -> ProgramDecls {
    ProgramDecls {
        functions: vec![pick()],
        globals: vec![Variable::new("g", Ty::Int, 0)],
        params: vec![Variable::new("x", Ty::Int, 1)],
        locals: vec![Variable::new("ys", Ty::ctor("list", vec![Ty::Int]), 2)],
        ..ProgramDecls::default()
    }
}

/// `entry: assume x >= 0 -> exit: assert pick ys`
pub fn two_blocks() -> ControlFlowGraph {
    let mut g = ControlFlowGraph::new(Block::new(
        BlockId(0),
        "entry",
        vec![Cmd::Assume(Term::ge(Term::ident("x"), Term::int(0)))],
    ));
    g.add_block(Block::new(
        BlockId(1),
        "exit",
        vec![Cmd::Assert(Term::call("pick", vec![Term::ident("ys")]))],
    ))
    .expect("block");
    g.add_edge(BlockId(0), BlockId(1)).expect("edge");
    g
}
