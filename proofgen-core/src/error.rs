#![forbid(unsafe_code)]

use miette::Diagnostic;
use proofgen_cfg::CfgError;
use thiserror::Error;

use crate::decl::DeclKey;

/// Coarse classification used by the host to decide between aborting the
/// run and skipping a single procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// A bookkeeping invariant was broken; always a pipeline bug.
    Invariant,
    /// The input uses a shape the assembler has no proof step for.
    Unsupported,
}

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ProofGenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cfg(#[from] CfgError),

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(proofgen::config))]
    Config { message: String },

    #[error("no membership lemma for {key} in this scope or any enclosing scope")]
    #[diagnostic(
        code(proofgen::membership::missing),
        help("register the declaration's membership before deriving lemmas from it")
    )]
    MissingMembership { key: DeclKey },

    #[error("{key} already has a membership lemma in this scope")]
    #[diagnostic(code(proofgen::membership::duplicate))]
    DuplicateMembership { key: DeclKey },

    #[error("{what} is not generated in this scope and there is no enclosing scope")]
    #[diagnostic(code(proofgen::membership::no_parent))]
    MissingParent { what: &'static str },

    #[error("globals reach id {globals_max} but locals start at id {locals_min}")]
    #[diagnostic(
        code(proofgen::membership::overlap),
        help("global and local variable ids must occupy disjoint ranges")
    )]
    RangesOverlap { globals_max: u32, locals_min: u32 },

    #[error("variable id {id} violates the bound {bound} claimed by `{lemma}`")]
    #[diagnostic(code(proofgen::membership::bound))]
    BoundViolated {
        lemma: &'static str,
        id: u32,
        bound: u32,
    },

    #[error("type variable '{name} is not bound here")]
    #[diagnostic(code(proofgen::types::unbound))]
    UnboundTypeVar { name: String },

    #[error("checkpoint `{checkpoint}` fired out of order (expected `{expected}`)")]
    #[diagnostic(code(proofgen::session::order))]
    CheckpointOrder {
        checkpoint: &'static str,
        expected: &'static str,
    },

    #[error("cannot map renamed variable `{name}` back to a source variable")]
    #[diagnostic(code(proofgen::session::renaming))]
    VariableMapping { name: String },

    #[error("variable `{name}` is declared twice")]
    #[diagnostic(code(proofgen::session::duplicate_var))]
    DuplicateVariable { name: String },

    #[error("VC variable `{name}` does not correspond to a parameter or local")]
    #[diagnostic(code(proofgen::vc::unknown_var))]
    UnknownVcVariable { name: String },

    #[error("function `{name}` is not declared")]
    #[diagnostic(code(proofgen::vc::unknown_function))]
    UnknownFunction { name: String },

    #[error("no proof step for VC axiom `{name}` of kind {kind}")]
    #[diagnostic(code(proofgen::vc::unsupported_axiom))]
    UnsupportedAxiom { name: String, kind: &'static str },

    #[error("casts are only supported on `int` and `bool`, found `{ty}`")]
    #[diagnostic(code(proofgen::vc::unsupported_cast))]
    UnsupportedCast { ty: String },

    #[error("constructor values are only supported for `int` and `bool`, found `{ty}`")]
    #[diagnostic(code(proofgen::vc::unsupported_ctor))]
    UnsupportedCtorType { ty: String },
}

impl ProofGenError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ProofGenError::UnsupportedAxiom { .. }
            | ProofGenError::UnsupportedCast { .. }
            | ProofGenError::UnsupportedCtorType { .. } => ErrorClass::Unsupported,
            _ => ErrorClass::Invariant,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        self.class() == ErrorClass::Unsupported
    }
}

pub type Result<T, E = ProofGenError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use proofgen_cfg::BlockId;

    #[test]
    fn only_shape_errors_are_unsupported() {
        let e = ProofGenError::UnsupportedCast {
            ty: "real".to_string(),
        };
        assert!(e.is_unsupported());

        let e: ProofGenError = CfgError::MissingHint(BlockId(3)).into();
        assert_eq!(e.class(), ErrorClass::Invariant);
        assert_eq!(e.to_string(), "no hint recorded for loop header #3");
    }
}
