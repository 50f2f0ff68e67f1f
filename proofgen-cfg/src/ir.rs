#![forbid(unsafe_code)]

use std::fmt;

use proofgen_term::TermRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cmd {
    Assert(TermRef),
    Assume(TermRef),
    Assign { var: String, value: TermRef },
    Havoc(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub label: String,
    pub cmds: Vec<Cmd>,
}

impl Block {
    pub fn new(id: BlockId, label: impl Into<String>, cmds: Vec<Cmd>) -> Self {
        Self {
            id,
            label: label.into(),
            cmds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}
