#![forbid(unsafe_code)]

pub mod accessor;
pub mod config;
pub mod decl;
pub mod document;
pub mod end_to_end;
pub mod error;
pub mod extractor;
pub mod lang;
pub mod membership;
pub mod session;
pub mod vc;

pub use accessor::ProgramAccessor;
pub use config::ProofGenConfig;
pub use decl::{Axiom, DeclKey, Function, ProgramDecls, Ty, TypeCtorDecl, VarKind, Variable};
pub use document::ProofDocument;
pub use end_to_end::{FunctionPhase, SoundnessAssembler};
pub use error::{ErrorClass, ProofGenError, Result};
pub use membership::{MembershipCatalog, ProgramNames};
pub use session::{CfgSnapshot, ProofGenSession};
pub use vc::{CastKind, Subsumption, VcAxiom, VcAxiomKind, VcHint, VcHintManager, VcInput};
