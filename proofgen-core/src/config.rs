#![forbid(unsafe_code)]

use serde::Deserialize;
use tracing::warn;

use crate::error::{ProofGenError, Result};

/// Overrides the theory name of the generated document.
pub const THEORY_ENV: &str = "PROOFGEN_THEORY";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProofGenConfig {
    pub theory_name: String,
    pub imports: Vec<String>,
    /// Separator used by the unique namer for suffixes and sanitization.
    pub name_spacer: String,
    /// Locale providing the `method_verifies` lemma.
    pub passification_locale: String,

    /// Per-scope generation flags. A scope that does not generate a group
    /// of declarations cites the enclosing scope's lemmas instead.
    pub generate_functions: bool,
    pub generate_axioms: bool,
    pub generate_globals_and_constants: bool,
    pub generate_params_and_locals: bool,
}

impl Default for ProofGenConfig {
    fn default() -> Self {
        Self {
            theory_name: "proc_proof".to_string(),
            imports: vec![
                "Boogie_Lang.Semantics".to_string(),
                "Boogie_Lang.Util".to_string(),
                "Boogie_Lang.VCHints".to_string(),
            ],
            name_spacer: "_".to_string(),
            passification_locale: "passification".to_string(),
            generate_functions: true,
            generate_axioms: true,
            generate_globals_and_constants: true,
            generate_params_and_locals: true,
        }
    }
}

impl ProofGenConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: ProofGenConfig = toml::from_str(content).map_err(|e| ProofGenError::Config {
            message: format!("invalid proofgen config: {e}"),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses `content` and applies the environment overrides on top.
    pub fn load(content: &str) -> Result<Self> {
        let cfg = Self::from_toml_str(content)?.with_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.theory_name.is_empty() {
            return Err(ProofGenError::Config {
                message: "theory_name must not be empty".to_string(),
            });
        }
        if self.name_spacer.is_empty() {
            return Err(ProofGenError::Config {
                message: "name_spacer must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup (the environment in
    /// production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(THEORY_ENV) {
            Some(name) if name.is_empty() => {
                warn!(var = THEORY_ENV, "empty theory override ignored");
            }
            Some(name) => self.theory_name = name,
            None => {}
        }
        self
    }

    /// Configuration for a child scope that only proves procedure-local
    /// facts and cites everything else from its parent.
    pub fn for_procedure_scope(&self, theory_name: impl Into<String>) -> Self {
        Self {
            theory_name: theory_name.into(),
            generate_functions: false,
            generate_axioms: false,
            generate_globals_and_constants: false,
            generate_params_and_locals: true,
            ..self.clone()
        }
    }
}
