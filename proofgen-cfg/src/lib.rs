#![forbid(unsafe_code)]

pub mod error;
pub mod graph;
pub mod hints;
pub mod ir;
pub mod stage;

pub use error::CfgError;
pub use graph::ControlFlowGraph;
pub use hints::{LoopHeadHint, LoopHintTracker, SyntheticBackedge};
pub use ir::*;
pub use stage::StageMap;
