#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CfgError;
use crate::graph::ControlFlowGraph;
use crate::ir::BlockId;

/// Block-identity correspondence between a later pipeline stage and an
/// earlier one. Every later block maps to exactly one earlier block; an
/// earlier block may have several descendants (duplication).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageMap {
    to_earlier: BTreeMap<BlockId, BlockId>,
    to_later: BTreeMap<BlockId, BTreeSet<BlockId>>,
}

impl StageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity correspondence for a stage that kept every block.
    pub fn identity(graph: &ControlFlowGraph) -> Self {
        let mut m = Self::new();
        for id in graph.block_ids() {
            m.to_earlier.insert(id, id);
            m.to_later.entry(id).or_default().insert(id);
        }
        m
    }

    pub fn insert(&mut self, later: BlockId, earlier: BlockId) -> Result<(), CfgError> {
        match self.to_earlier.get(&later) {
            Some(&existing) if existing != earlier => Err(CfgError::ConflictingStageMapping {
                later,
                earlier,
                existing,
            }),
            Some(_) => Ok(()),
            None => {
                self.to_earlier.insert(later, earlier);
                self.to_later.entry(earlier).or_default().insert(later);
                Ok(())
            }
        }
    }

    pub fn get(&self, later: BlockId) -> Option<BlockId> {
        self.to_earlier.get(&later).copied()
    }

    pub fn resolve(&self, later: BlockId) -> Result<BlockId, CfgError> {
        self.get(later).ok_or(CfgError::MissingStageMapping(later))
    }

    /// Descendants of an earlier block, in id order.
    pub fn descendants(&self, earlier: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.to_later.get(&earlier).into_iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.to_earlier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_earlier.is_empty()
    }

    /// Chains `self` (later -> middle) with `earlier` (middle -> earliest).
    pub fn compose(&self, earlier: &StageMap) -> Result<StageMap, CfgError> {
        let mut out = StageMap::new();
        for (&later, &middle) in &self.to_earlier {
            out.insert(later, earlier.resolve(middle)?)?;
        }
        Ok(out)
    }

    /// Checks that every block of `later` has a counterpart.
    pub fn check_total(&self, later: &ControlFlowGraph) -> Result<(), CfgError> {
        later
            .block_ids()
            .try_for_each(|id| self.resolve(id).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Block;

    #[test]
    fn conflicting_remap_is_rejected() {
        let mut m = StageMap::new();
        m.insert(BlockId(5), BlockId(1)).unwrap();
        m.insert(BlockId(5), BlockId(1)).unwrap();
        assert_eq!(
            m.insert(BlockId(5), BlockId(2)),
            Err(CfgError::ConflictingStageMapping {
                later: BlockId(5),
                earlier: BlockId(2),
                existing: BlockId(1),
            })
        );
    }

    #[test]
    fn compose_chains_through_the_middle_stage() {
        let mut post = StageMap::new();
        post.insert(BlockId(10), BlockId(3)).unwrap();
        post.insert(BlockId(11), BlockId(3)).unwrap();
        let mut pre = StageMap::new();
        pre.insert(BlockId(3), BlockId(0)).unwrap();

        let composed = post.compose(&pre).unwrap();
        assert_eq!(composed.get(BlockId(11)), Some(BlockId(0)));
        assert_eq!(
            composed.descendants(BlockId(0)).collect::<Vec<_>>(),
            vec![BlockId(10), BlockId(11)]
        );

        let missing = StageMap::new();
        assert_eq!(
            post.compose(&missing),
            Err(CfgError::MissingStageMapping(BlockId(3)))
        );
    }

    #[test]
    fn totality_check_names_the_missing_block() {
        let mut g = ControlFlowGraph::new(Block::new(BlockId(0), "entry", vec![]));
        g.add_block(Block::new(BlockId(1), "exit", vec![])).unwrap();
        let mut m = StageMap::new();
        m.insert(BlockId(0), BlockId(0)).unwrap();
        assert_eq!(m.check_total(&g), Err(CfgError::MissingStageMapping(BlockId(1))));
        assert!(StageMap::identity(&g).check_total(&g).is_ok());
    }
}
