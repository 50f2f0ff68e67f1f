#![forbid(unsafe_code)]

//! Loop metadata that survives the acyclification transform.
//!
//! Acyclification redirects back edges and introduces fresh blocks, so block
//! identity changes. Consumers ask "is this a loop header / synthetic
//! backedge" through the tracker instead of re-deriving graph structure.

use std::collections::BTreeMap;

use proofgen_term::TermRef;
use tracing::trace;

use crate::error::CfgError;
use crate::graph::ControlFlowGraph;
use crate::ir::BlockId;
use crate::stage::StageMap;

/// Invariant artifact attached to a loop header.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LoopHeadHint {
    pub invariants: Vec<TermRef>,
    pub modified_vars: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntheticBackedge<'a> {
    /// Header in pre-transform identity.
    pub header: BlockId,
    pub hint: &'a LoopHeadHint,
}

#[derive(Debug, Default)]
pub struct LoopHintTracker {
    backedge_to_headers: BTreeMap<BlockId, Vec<BlockId>>,
    hints: BTreeMap<BlockId, LoopHeadHint>,
    synthetic_backedges: BTreeMap<BlockId, BlockId>,
    synthetic_pre_loop_entries: BTreeMap<BlockId, BlockId>,
    post_to_pre: Option<StageMap>,
}

impl LoopHintTracker {
    /// Back edges are computed once, on the graph before acyclification.
    pub fn new(pre: &ControlFlowGraph) -> Self {
        let mut backedge_to_headers: BTreeMap<BlockId, Vec<BlockId>> = BTreeMap::new();
        for (header, sources) in pre.back_edges() {
            for s in sources {
                backedge_to_headers.entry(s).or_default().push(header);
            }
        }
        Self {
            backedge_to_headers,
            ..Self::default()
        }
    }

    pub fn is_backedge_node(&self, pre_block: BlockId) -> Option<&[BlockId]> {
        self.backedge_to_headers
            .get(&pre_block)
            .map(Vec::as_slice)
    }

    pub fn record_hint(&mut self, header: BlockId, hint: LoopHeadHint) -> Result<(), CfgError> {
        if self.hints.contains_key(&header) {
            return Err(CfgError::DuplicateHint(header));
        }
        trace!(%header, invariants = hint.invariants.len(), "loop hint recorded");
        self.hints.insert(header, hint);
        Ok(())
    }

    /// Registers a backedge block created by the transform.
    pub fn record_synthetic_backedge(&mut self, block: BlockId, header: BlockId) -> Result<(), CfgError> {
        if self.synthetic_backedges.insert(block, header).is_some() {
            return Err(CfgError::DuplicateSyntheticBlock(block));
        }
        Ok(())
    }

    /// Registers a block created by the transform in front of a loop.
    pub fn record_synthetic_pre_loop_entry(
        &mut self,
        block: BlockId,
        header: BlockId,
    ) -> Result<(), CfgError> {
        if self.synthetic_pre_loop_entries.insert(block, header).is_some() {
            return Err(CfgError::DuplicateSyntheticBlock(block));
        }
        Ok(())
    }

    pub fn set_post_to_pre(&mut self, map: StageMap) {
        self.post_to_pre = Some(map);
    }

    fn to_pre(&self, post_block: BlockId) -> Result<BlockId, CfgError> {
        self.post_to_pre
            .as_ref()
            .ok_or(CfgError::StageMapNotSet)?
            .resolve(post_block)
    }

    pub fn is_synthetic_backedge(
        &self,
        post_block: BlockId,
    ) -> Result<Option<SyntheticBackedge<'_>>, CfgError> {
        let pre = self.to_pre(post_block)?;
        let Some(&header) = self.synthetic_backedges.get(&pre) else {
            return Ok(None);
        };
        let hint = self.hints.get(&header).ok_or(CfgError::MissingHint(header))?;
        Ok(Some(SyntheticBackedge { header, hint }))
    }

    pub fn is_synthetic_pre_loop_entry(&self, post_block: BlockId) -> Result<bool, CfgError> {
        let pre = self.to_pre(post_block)?;
        Ok(self.synthetic_pre_loop_entries.contains_key(&pre))
    }

    pub fn is_loop_header(&self, pre_block: BlockId) -> Option<&LoopHeadHint> {
        self.hints.get(&pre_block)
    }

    pub fn get_hint(&self, pre_block: BlockId) -> Result<&LoopHeadHint, CfgError> {
        self.hints
            .get(&pre_block)
            .ok_or(CfgError::MissingHint(pre_block))
    }

    /// Checks a post-transform graph against the tracker: every block has a
    /// pre-transform identity and every synthetic backedge resolves to a hint.
    pub fn validate_post_graph(&self, post: &ControlFlowGraph) -> Result<(), CfgError> {
        for id in post.block_ids() {
            self.is_synthetic_backedge(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Block;

    fn empty(n: u32) -> Block {
        Block::new(BlockId(n), format!("b{n}"), vec![])
    }

    #[test]
    fn duplicate_hint_is_rejected() {
        let g = ControlFlowGraph::new(empty(0));
        let mut t = LoopHintTracker::new(&g);
        t.record_hint(BlockId(0), LoopHeadHint::default()).unwrap();
        assert_eq!(
            t.record_hint(BlockId(0), LoopHeadHint::default()),
            Err(CfgError::DuplicateHint(BlockId(0)))
        );
    }

    #[test]
    fn synthetic_queries_need_the_post_map() {
        let g = ControlFlowGraph::new(empty(0));
        let t = LoopHintTracker::new(&g);
        assert_eq!(t.is_synthetic_backedge(BlockId(0)), Err(CfgError::StageMapNotSet));
    }

    #[test]
    fn missing_hint_for_synthetic_backedge_is_an_error() {
        let g = ControlFlowGraph::new(empty(0));
        let mut t = LoopHintTracker::new(&g);
        t.record_synthetic_backedge(BlockId(7), BlockId(0)).unwrap();
        let mut post = StageMap::new();
        post.insert(BlockId(17), BlockId(7)).unwrap();
        t.set_post_to_pre(post);
        assert_eq!(
            t.is_synthetic_backedge(BlockId(17)),
            Err(CfgError::MissingHint(BlockId(0)))
        );
        assert_eq!(t.get_hint(BlockId(0)), Err(CfgError::MissingHint(BlockId(0))));
    }
}
