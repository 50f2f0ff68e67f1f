#![forbid(unsafe_code)]

use proofgen_term::TermRef;

use crate::decl::DeclKey;
use crate::error::Result;

/// Read access to the declarations and lemmas of one scope. Lemma and
/// definition names are qualified with the theory that declares them.
pub trait ProgramAccessor {
    fn theory_name(&self) -> &str;

    fn functions_decl(&self) -> TermRef;
    fn axioms_decl(&self) -> TermRef;
    fn cfg_decl(&self) -> TermRef;

    fn params_decl(&self) -> &str;
    fn locals_decl(&self) -> &str;
    fn consts_decl(&self) -> &str;
    fn globals_decl(&self) -> &str;

    /// `params @ locals`
    fn params_and_locals_decl(&self) -> TermRef;
    /// `consts @ globals`
    fn consts_and_globals_decl(&self) -> TermRef;
    /// `(consts @ globals, params @ locals)`
    fn var_context(&self) -> TermRef;

    fn membership_lemma(&self, key: &DeclKey) -> Result<String>;
    fn constant_membership_lemma(&self, key: &DeclKey) -> Result<String>;
    fn lookup_var_ty_lemma(&self, key: &DeclKey) -> Result<String>;

    fn globals_locals_disjoint_lemma(&self) -> String;
    fn globals_at_most_max(&self) -> Result<String>;
    fn locals_at_least_min(&self) -> String;
    /// Bound proved by [`ProgramAccessor::globals_at_most_max`].
    fn globals_max_bound(&self) -> u32;

    fn funcs_wf_lemma(&self) -> Result<String>;
    fn var_context_wf_lemma(&self) -> Result<String>;
}
