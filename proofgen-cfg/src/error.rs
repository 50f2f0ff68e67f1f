#![forbid(unsafe_code)]

use miette::Diagnostic;
use thiserror::Error;

use crate::ir::BlockId;

/// Violations of graph and stage-map invariants. These always indicate a
/// bug in the caller (usually a checkpoint fired out of order).
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum CfgError {
    #[error("block {0} is already part of the graph")]
    #[diagnostic(code(proofgen::cfg::duplicate_block))]
    DuplicateBlock(BlockId),

    #[error("block {0} is not part of the graph")]
    #[diagnostic(code(proofgen::cfg::unknown_block))]
    UnknownBlock(BlockId),

    #[error("block {later} already maps to {existing}, cannot remap it to {earlier}")]
    #[diagnostic(code(proofgen::cfg::stage_conflict))]
    ConflictingStageMapping {
        later: BlockId,
        earlier: BlockId,
        existing: BlockId,
    },

    #[error("block {0} has no counterpart in the earlier stage")]
    #[diagnostic(code(proofgen::cfg::stage_missing))]
    MissingStageMapping(BlockId),

    #[error("no post-acyclification identity map has been recorded")]
    #[diagnostic(
        code(proofgen::cfg::stage_unset),
        help("record the post-transform map before querying synthetic blocks")
    )]
    StageMapNotSet,

    #[error("loop header {0} already has a hint")]
    #[diagnostic(code(proofgen::cfg::duplicate_hint))]
    DuplicateHint(BlockId),

    #[error("block {0} is already registered as a synthetic block")]
    #[diagnostic(code(proofgen::cfg::duplicate_synthetic))]
    DuplicateSyntheticBlock(BlockId),

    #[error("no hint recorded for loop header {0}")]
    #[diagnostic(
        code(proofgen::cfg::missing_hint),
        help("hints must be recorded before the acyclification transform runs")
    )]
    MissingHint(BlockId),
}
