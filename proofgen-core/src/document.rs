#![forbid(unsafe_code)]

use std::fmt;

use proofgen_term::{LemmaDecl, OuterDecl};

/// A self-contained theory: imports plus ordered outer declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofDocument {
    pub theory_name: String,
    pub imports: Vec<String>,
    pub decls: Vec<OuterDecl>,
}

impl ProofDocument {
    pub fn new(theory_name: impl Into<String>, imports: Vec<String>, decls: Vec<OuterDecl>) -> Self {
        Self {
            theory_name: theory_name.into(),
            imports,
            decls,
        }
    }

    pub fn lemma(&self, name: &str) -> Option<&LemmaDecl> {
        self.decls.iter().find_map(|d| match d {
            OuterDecl::Lemma(l) if l.name == name => Some(l),
            _ => None,
        })
    }

    /// Names of the named declarations, in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decls.iter().filter_map(OuterDecl::name)
    }
}

impl fmt::Display for ProofDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "theory {}", self.theory_name)?;
        writeln!(f, "imports {}", self.imports.join(" "))?;
        writeln!(f, "begin")?;
        for d in &self.decls {
            writeln!(f)?;
            writeln!(f, "{d}")?;
        }
        writeln!(f)?;
        writeln!(f, "end")
    }
}
