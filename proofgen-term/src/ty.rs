#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimType {
    Bool,
    Int,
    Nat,
    String,
    Unit,
}

/// Types of the target logic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Tuple(Vec<Type>),
    Arrow(Box<Type>, Box<Type>),
    /// Applied type constructor, e.g. `'a val` or `(int, bool) prod`.
    Data { name: String, args: Vec<Type> },
    Primitive(PrimType),
    Var(String),
}

impl Type {
    pub fn bool() -> Self {
        Type::Primitive(PrimType::Bool)
    }

    pub fn int() -> Self {
        Type::Primitive(PrimType::Int)
    }

    pub fn nat() -> Self {
        Type::Primitive(PrimType::Nat)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Type::Var(name.into())
    }

    pub fn data(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Data {
            name: name.into(),
            args,
        }
    }

    pub fn arrow(from: Type, to: Type) -> Self {
        Type::Arrow(Box::new(from), Box::new(to))
    }

    /// Curried function type `a1 => ... => an => ret`.
    pub fn curried(args: impl IntoIterator<Item = Type>, ret: Type) -> Self {
        let args: Vec<Type> = args.into_iter().collect();
        args.into_iter()
            .rev()
            .fold(ret, |acc, arg| Type::arrow(arg, acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curried_nests_to_the_right() {
        let t = Type::curried([Type::int(), Type::bool()], Type::nat());
        assert_eq!(
            t,
            Type::arrow(Type::int(), Type::arrow(Type::bool(), Type::nat()))
        );
        assert_eq!(Type::curried([], Type::nat()), Type::nat());
    }
}
