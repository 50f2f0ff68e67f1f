#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::CfgError;
use crate::ir::{Block, BlockId};

/// A control-flow graph snapshot. Blocks are owned by the graph and
/// addressed by id; edges are kept in insertion order.
#[derive(Clone, Debug)]
pub struct ControlFlowGraph {
    pub entry: BlockId,
    blocks: BTreeMap<BlockId, Block>,
    succs: BTreeMap<BlockId, Vec<BlockId>>,
}

impl ControlFlowGraph {
    pub fn new(entry: Block) -> Self {
        let id = entry.id;
        let mut blocks = BTreeMap::new();
        blocks.insert(id, entry);
        let mut succs = BTreeMap::new();
        succs.insert(id, Vec::new());
        Self {
            entry: id,
            blocks,
            succs,
        }
    }

    pub fn add_block(&mut self, block: Block) -> Result<(), CfgError> {
        if self.blocks.contains_key(&block.id) {
            return Err(CfgError::DuplicateBlock(block.id));
        }
        self.succs.insert(block.id, Vec::new());
        self.blocks.insert(block.id, block);
        Ok(())
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> Result<(), CfgError> {
        if !self.blocks.contains_key(&to) {
            return Err(CfgError::UnknownBlock(to));
        }
        let out = self.succs.get_mut(&from).ok_or(CfgError::UnknownBlock(from))?;
        if !out.contains(&to) {
            out.push(to);
        }
        Ok(())
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.keys().copied()
    }

    pub fn successors(&self, id: BlockId) -> &[BlockId] {
        self.succs.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks reachable from the entry.
    pub fn reachable(&self) -> BTreeSet<BlockId> {
        let mut reachable: BTreeSet<BlockId> = BTreeSet::new();
        let mut work: VecDeque<BlockId> = VecDeque::new();
        reachable.insert(self.entry);
        work.push_back(self.entry);

        while let Some(bb) = work.pop_front() {
            for &s in self.successors(bb) {
                if reachable.insert(s) {
                    work.push_back(s);
                }
            }
        }
        reachable
    }

    /// DFS post-order from the entry; back edges are ignored. Unreachable
    /// blocks follow, rooted in id order. Returns the order and the length
    /// of its reachable prefix.
    fn post_order(&self) -> (Vec<BlockId>, usize) {
        let mut order = Vec::with_capacity(self.blocks.len());
        let mut visited: BTreeSet<BlockId> = BTreeSet::new();
        let mut reachable_len = 0;

        let mut roots = vec![self.entry];
        roots.extend(self.blocks.keys().copied().filter(|id| *id != self.entry));

        for root in roots {
            if !visited.insert(root) {
                continue;
            }
            // (block, index of the next successor to explore)
            let mut stack: Vec<(BlockId, usize)> = vec![(root, 0)];
            while let Some((bb, next)) = stack.last_mut() {
                let succs = self.successors(*bb);
                if let Some(&s) = succs.get(*next) {
                    *next += 1;
                    if visited.insert(s) {
                        stack.push((s, 0));
                    }
                } else {
                    order.push(*bb);
                    stack.pop();
                }
            }
            if root == self.entry {
                reachable_len = order.len();
            }
        }
        (order, reachable_len)
    }

    /// Reverse-topological order: every block comes after all of its
    /// (non-back-edge) successors, so terminal blocks come first.
    pub fn blocks_backwards(&self) -> Vec<BlockId> {
        self.post_order().0
    }

    /// Topological order starting at the entry. Reachable blocks come first;
    /// unreachable ones follow in their own topological order.
    pub fn blocks_forward(&self) -> Vec<BlockId> {
        let (order, reachable_len) = self.post_order();
        let (reachable, unreachable) = order.split_at(reachable_len);
        reachable
            .iter()
            .rev()
            .chain(unreachable.iter().rev())
            .copied()
            .collect()
    }

    /// Position of the block in forward order. The entry is labelled 0.
    pub fn unique_int_label(&self, id: BlockId) -> Option<u64> {
        self.blocks_forward()
            .iter()
            .position(|b| *b == id)
            .map(|p| p as u64)
    }

    /// First non-empty blocks reached from the successors of `id`, looking
    /// through empty blocks. `id` itself is never part of the result, so a
    /// block without successors yields nothing.
    pub fn non_empty_successors(&self, id: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut seen: BTreeSet<BlockId> = BTreeSet::from([id]);
        let mut work: VecDeque<BlockId> = VecDeque::new();
        for &s in self.successors(id) {
            if seen.insert(s) {
                work.push_back(s);
            }
        }
        while let Some(bb) = work.pop_front() {
            let Some(block) = self.blocks.get(&bb) else { continue };
            if !block.is_empty() {
                out.push(bb);
                continue;
            }
            for &s in self.successors(bb) {
                if seen.insert(s) {
                    work.push_back(s);
                }
            }
        }
        out
    }

    /// Dominator sets of reachable blocks (iterative data-flow formulation).
    pub fn dominators(&self) -> BTreeMap<BlockId, BTreeSet<BlockId>> {
        let reachable = self.reachable();
        let order: Vec<BlockId> = self
            .blocks_forward()
            .into_iter()
            .filter(|b| reachable.contains(b))
            .collect();

        let mut preds: BTreeMap<BlockId, Vec<BlockId>> = BTreeMap::new();
        for &b in &order {
            for &s in self.successors(b) {
                preds.entry(s).or_default().push(b);
            }
        }

        let mut dom: BTreeMap<BlockId, BTreeSet<BlockId>> = BTreeMap::new();
        for &b in &order {
            if b == self.entry {
                dom.insert(b, BTreeSet::from([b]));
            } else {
                dom.insert(b, reachable.clone());
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for &b in order.iter().filter(|b| **b != self.entry) {
                let mut new_set: Option<BTreeSet<BlockId>> = None;
                for p in preds.get(&b).into_iter().flatten() {
                    let Some(pd) = dom.get(p) else { continue };
                    new_set = Some(match new_set {
                        None => pd.clone(),
                        Some(acc) => acc.intersection(pd).copied().collect(),
                    });
                }
                let mut new_set = new_set.unwrap_or_default();
                new_set.insert(b);
                if dom.get(&b) != Some(&new_set) {
                    dom.insert(b, new_set);
                    changed = true;
                }
            }
        }
        dom
    }

    /// Loop headers mapped to the sources of their back edges. An edge
    /// `s -> h` is a back edge when `h` dominates `s`.
    pub fn back_edges(&self) -> BTreeMap<BlockId, Vec<BlockId>> {
        let dom = self.dominators();
        let mut out: BTreeMap<BlockId, Vec<BlockId>> = BTreeMap::new();
        for (&s, ds) in &dom {
            for &h in self.successors(s) {
                if ds.contains(&h) {
                    out.entry(h).or_default().push(s);
                }
            }
        }
        out
    }

    pub fn loop_headers(&self) -> Vec<BlockId> {
        self.back_edges().into_keys().collect()
    }

    /// True when every edge points backwards in post-order.
    pub fn is_acyclic(&self) -> bool {
        let pos: BTreeMap<BlockId, usize> = self
            .blocks_backwards()
            .into_iter()
            .enumerate()
            .map(|(i, b)| (b, i))
            .collect();
        self.succs
            .iter()
            .all(|(from, out)| out.iter().all(|to| pos[to] < pos[from]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(n: u32, cmds: usize) -> Block {
        let cmds = (0..cmds)
            .map(|_| crate::ir::Cmd::Havoc(vec!["x".to_string()]))
            .collect();
        Block::new(BlockId(n), format!("b{n}"), cmds)
    }

    /// 0 -> 1 -> 2 -> 1, 1 -> 3
    fn looping() -> ControlFlowGraph {
        let mut g = ControlFlowGraph::new(block(0, 1));
        for n in 1..=3 {
            g.add_block(block(n, 1)).unwrap();
        }
        g.add_edge(BlockId(0), BlockId(1)).unwrap();
        g.add_edge(BlockId(1), BlockId(2)).unwrap();
        g.add_edge(BlockId(2), BlockId(1)).unwrap();
        g.add_edge(BlockId(1), BlockId(3)).unwrap();
        g
    }

    #[test]
    fn backwards_order_puts_successors_first() {
        let mut g = ControlFlowGraph::new(block(0, 1));
        g.add_block(block(1, 1)).unwrap();
        g.add_block(block(2, 1)).unwrap();
        g.add_edge(BlockId(0), BlockId(1)).unwrap();
        g.add_edge(BlockId(0), BlockId(2)).unwrap();
        g.add_edge(BlockId(1), BlockId(2)).unwrap();

        assert_eq!(g.blocks_backwards(), vec![BlockId(2), BlockId(1), BlockId(0)]);
        assert_eq!(g.unique_int_label(g.entry), Some(0));
        assert!(g.is_acyclic());
    }

    #[test]
    fn detects_back_edges() {
        let g = looping();
        let be = g.back_edges();
        assert_eq!(be.len(), 1);
        assert_eq!(be[&BlockId(1)], vec![BlockId(2)]);
        assert!(!g.is_acyclic());
        assert_eq!(g.loop_headers(), vec![BlockId(1)]);
    }

    #[test]
    fn reachability_excludes_orphans() {
        let mut g = looping();
        g.add_block(block(9, 0)).unwrap();
        let reachable = g.reachable();
        assert!(!reachable.contains(&BlockId(9)));
        assert!(reachable.contains(&BlockId(3)));
        assert_eq!(g.blocks_backwards().last(), Some(&BlockId(9)));
    }

    #[test]
    fn orphans_are_labelled_after_the_entry() {
        // 0 -> 1, with 2 unreachable
        let mut g = ControlFlowGraph::new(block(0, 1));
        g.add_block(block(1, 1)).unwrap();
        g.add_block(block(2, 1)).unwrap();
        g.add_edge(BlockId(0), BlockId(1)).unwrap();

        assert_eq!(g.blocks_forward(), vec![BlockId(0), BlockId(1), BlockId(2)]);
        assert_eq!(g.unique_int_label(g.entry), Some(0));
        assert_eq!(g.unique_int_label(BlockId(1)), Some(1));
        assert_eq!(g.unique_int_label(BlockId(2)), Some(2));
        assert!(g.is_acyclic());

        // an orphan with its own edge keeps its internal order
        g.add_block(block(3, 1)).unwrap();
        g.add_edge(BlockId(3), BlockId(2)).unwrap();
        assert_eq!(g.blocks_forward()[..2], [BlockId(0), BlockId(1)]);
        assert!(g.unique_int_label(BlockId(3)) < g.unique_int_label(BlockId(2)));
        assert!(g.is_acyclic());
    }

    #[test]
    fn non_empty_successors_skip_empty_blocks() {
        let mut g = ControlFlowGraph::new(block(0, 0));
        g.add_block(block(1, 0)).unwrap();
        g.add_block(block(2, 2)).unwrap();
        g.add_block(block(3, 1)).unwrap();
        g.add_edge(BlockId(0), BlockId(1)).unwrap();
        g.add_edge(BlockId(1), BlockId(2)).unwrap();
        g.add_edge(BlockId(1), BlockId(3)).unwrap();
        assert_eq!(g.non_empty_successors(BlockId(0)), vec![BlockId(2), BlockId(3)]);
        assert!(g.non_empty_successors(BlockId(2)).is_empty());
    }

    #[test]
    fn non_empty_successors_exclude_the_start_block() {
        let mut g = ControlFlowGraph::new(block(0, 1));
        g.add_block(block(1, 1)).unwrap();
        g.add_edge(BlockId(0), BlockId(1)).unwrap();
        assert_eq!(g.non_empty_successors(BlockId(0)), vec![BlockId(1)]);
        assert!(g.non_empty_successors(BlockId(1)).is_empty());
    }

    #[test]
    fn rejects_edges_to_unknown_blocks() {
        let mut g = ControlFlowGraph::new(block(0, 0));
        assert_eq!(
            g.add_edge(BlockId(0), BlockId(5)),
            Err(CfgError::UnknownBlock(BlockId(5)))
        );
        assert_eq!(
            g.add_block(block(0, 0)),
            Err(CfgError::DuplicateBlock(BlockId(0)))
        );
    }
}
