#![forbid(unsafe_code)]

//! Declarations captured from the source program.

use std::fmt;

use proofgen_term::TermRef;

/// Source-level types. `Bool` and `Int` are the primitive ones: their values
/// are boxed (`BoolV`/`IntV`) when they cross into the value domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Bool,
    Int,
    Var(String),
    Ctor { name: String, args: Vec<Ty> },
}

impl Ty {
    pub fn var(name: impl Into<String>) -> Self {
        Ty::Var(name.into())
    }

    pub fn ctor(name: impl Into<String>, args: Vec<Ty>) -> Self {
        Ty::Ctor {
            name: name.into(),
            args,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Ty::Bool | Ty::Int)
    }

    pub fn mentions(&self, var: &str) -> bool {
        self.path_to(var).is_some()
    }

    /// Argument positions leading to the first occurrence of `var` in
    /// pre-order. Each step is `(constructor arity, argument index)`.
    pub fn path_to(&self, var: &str) -> Option<Vec<(usize, usize)>> {
        match self {
            Ty::Bool | Ty::Int => None,
            Ty::Var(v) => (v == var).then(Vec::new),
            Ty::Ctor { args, .. } => args.iter().enumerate().find_map(|(i, a)| {
                a.path_to(var).map(|mut rest| {
                    rest.insert(0, (args.len(), i));
                    rest
                })
            }),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Bool => f.write_str("bool"),
            Ty::Int => f.write_str("int"),
            Ty::Var(v) => write!(f, "'{v}"),
            Ty::Ctor { name, args } if args.is_empty() => f.write_str(name),
            Ty::Ctor { name, args } => {
                let args: Vec<String> = args.iter().map(Ty::to_string).collect();
                write!(f, "{name} {}", args.join(" "))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<(String, Ty)>,
    pub ret: Ty,
}

impl Function {
    pub fn key(&self) -> DeclKey {
        DeclKey::Function(self.name.clone())
    }

    /// Splits the type parameters into explicit ones (not determined by any
    /// argument type) and implicit ones. Both keep declaration order.
    pub fn split_type_params(&self) -> (Vec<&str>, Vec<&str>) {
        self.type_params
            .iter()
            .map(String::as_str)
            .partition(|tv| !self.params.iter().any(|(_, ty)| ty.mentions(tv)))
    }

    pub fn is_implicit(&self, tv: &str) -> bool {
        self.params.iter().any(|(_, ty)| ty.mentions(tv))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VarKind {
    Constant,
    Global,
    ParamOrLocal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: Ty,
    /// Position in the variable context; unique across all kinds.
    pub id: u32,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Ty, id: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            id,
        }
    }

    pub fn key(&self) -> DeclKey {
        DeclKey::Variable(self.id)
    }
}

/// A source axiom, already translated into the expression language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Axiom {
    pub index: usize,
    pub term: TermRef,
}

impl Axiom {
    pub fn key(&self) -> DeclKey {
        DeclKey::Axiom(self.index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeCtorDecl {
    pub name: String,
    pub arity: usize,
}

/// Declarations visible to one procedure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramDecls {
    pub functions: Vec<Function>,
    pub axioms: Vec<Axiom>,
    pub constants: Vec<Variable>,
    pub globals: Vec<Variable>,
    pub params: Vec<Variable>,
    pub locals: Vec<Variable>,
}

impl ProgramDecls {
    /// Ids of constants and globals.
    pub fn global_ids(&self) -> Vec<u32> {
        self.constants.iter().chain(&self.globals).map(|v| v.id).collect()
    }

    /// Ids of parameters and locals.
    pub fn local_ids(&self) -> Vec<u32> {
        self.params_and_locals().map(|v| v.id).collect()
    }

    pub fn params_and_locals(&self) -> impl Iterator<Item = &Variable> {
        self.params.iter().chain(&self.locals)
    }
}

/// Identity of a declaration for catalog lookups.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclKey {
    Function(String),
    Variable(u32),
    Axiom(usize),
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKey::Function(name) => write!(f, "function `{name}`"),
            DeclKey::Variable(id) => write!(f, "variable #{id}"),
            DeclKey::Axiom(idx) => write!(f, "axiom {idx}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_follows_first_occurrence() {
        let ty = Ty::ctor(
            "Pair",
            vec![Ty::Int, Ty::ctor("List", vec![Ty::var("T")]), Ty::var("T")],
        );
        assert_eq!(ty.path_to("T"), Some(vec![(3, 1), (1, 0)]));
        assert_eq!(ty.path_to("U"), None);
        assert_eq!(Ty::var("T").path_to("T"), Some(vec![]));
    }

    #[test]
    fn type_params_split_by_argument_use() {
        let f = Function {
            name: "f".to_string(),
            type_params: vec!["T".to_string(), "U".to_string()],
            params: vec![("x".to_string(), Ty::var("T"))],
            ret: Ty::var("U"),
        };
        assert_eq!(f.split_type_params(), (vec!["U"], vec!["T"]));
    }
}
