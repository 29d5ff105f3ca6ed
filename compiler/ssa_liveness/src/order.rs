//! CFG numbering and edge classification.
//!
//! Three single-pass stages over the block graph, each feeding the next:
//!
//! 1. [`DfsOrder::compute`] numbers every reachable block in depth-first
//!    preorder from the entry. Unreachable blocks get no number and are
//!    excluded from everything downstream.
//! 2. [`EdgeClasses::classify`] walks the graph once more, splitting every
//!    edge into a *back edge* (target already on the current DFS path) or a
//!    *forward edge*, and counting forward incoming edges per block.
//! 3. [`topological_order`] orders the numbered blocks over forward edges
//!    only, with Kahn's algorithm driven by the incoming-edge counts.
//!
//! All traversals use explicit work stacks so deeply nested CFGs cannot
//! overflow the call stack.

use rustc_hash::FxHashSet;

use crate::cfg::{BlockId, ControlFlowGraph};
use crate::live::LivenessError;

/// Depth-first preorder numbering of the reachable blocks.
pub(crate) struct DfsOrder {
    /// DFS id -> host block.
    order: Vec<BlockId>,
    /// Host block index -> DFS id. `None` means unreachable from the entry.
    ids: Vec<Option<u32>>,
}

impl DfsOrder {
    /// Number the blocks reachable from the entry in depth-first preorder,
    /// visiting successors in the CFG accessor's natural order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "block counts fit in u32"
    )]
    pub(crate) fn compute(cfg: &impl ControlFlowGraph) -> Self {
        let num_blocks = cfg.num_blocks();
        let mut order = Vec::with_capacity(num_blocks);
        let mut ids: Vec<Option<u32>> = vec![None; num_blocks];

        let mut stack = vec![cfg.entry()];
        while let Some(block) = stack.pop() {
            if ids[block.index()].is_some() {
                continue;
            }
            ids[block.index()] = Some(order.len() as u32);
            order.push(block);

            // Reverse push so the first successor is popped (and numbered)
            // first, matching recursive preorder.
            for &succ in cfg.successors(block).iter().rev() {
                if ids[succ.index()].is_none() {
                    stack.push(succ);
                }
            }
        }

        Self { order, ids }
    }

    /// Number of reachable (numbered) blocks.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// DFS id assigned to a host block, if it is reachable.
    pub(crate) fn id(&self, block: BlockId) -> Option<u32> {
        self.ids[block.index()]
    }

    /// Host block carrying DFS id `id`.
    pub(crate) fn block(&self, id: usize) -> BlockId {
        self.order[id]
    }
}

/// Edge classification: the back-edge set plus forward incoming-edge counts.
pub(crate) struct EdgeClasses {
    /// Edges whose target was on the DFS path when the edge was traversed,
    /// as (source, target) pairs. A self-loop is always a back edge.
    back_edges: FxHashSet<(BlockId, BlockId)>,
    /// Forward (non-back) incoming edge count, indexed by DFS id.
    incoming: Vec<u32>,
}

impl EdgeClasses {
    /// Classify every edge in one traversal.
    ///
    /// Stack entries are two-phase: `(block, false)` opens a block
    /// (classifies its out-edges and puts it on the DFS path), `(block,
    /// true)` closes it (removes it from the path once its whole subtree is
    /// done). The traversal must open blocks in the same order `DfsOrder`
    /// numbered them, which follows from the stable successor order.
    pub(crate) fn classify(cfg: &impl ControlFlowGraph, dfs: &DfsOrder) -> Self {
        let num_blocks = cfg.num_blocks();
        let mut back_edges = FxHashSet::default();
        let mut incoming = vec![0u32; dfs.len()];

        let mut seen = vec![false; num_blocks];
        let mut on_path = vec![false; num_blocks];

        let mut stack: Vec<(BlockId, bool)> = vec![(cfg.entry(), false)];
        while let Some((block, leaving)) = stack.pop() {
            let idx = block.index();
            if leaving {
                on_path[idx] = false;
                continue;
            }
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            on_path[idx] = true;
            stack.push((block, true));

            for &succ in cfg.successors(block).iter().rev() {
                if on_path[succ.index()] {
                    back_edges.insert((block, succ));
                    continue;
                }
                let Some(succ_id) = dfs.id(succ) else {
                    debug_assert!(false, "successor of a reachable block must be numbered");
                    continue;
                };
                incoming[succ_id as usize] += 1;
                if !seen[succ.index()] {
                    stack.push((succ, false));
                }
            }
        }

        Self {
            back_edges,
            incoming,
        }
    }

    /// Returns `true` iff the edge from `source` to `target` is a back edge.
    pub(crate) fn is_back_edge(&self, source: BlockId, target: BlockId) -> bool {
        self.back_edges.contains(&(source, target))
    }

    /// All back edges, in no particular order.
    pub(crate) fn back_edges(&self) -> impl Iterator<Item = (BlockId, BlockId)> + '_ {
        self.back_edges.iter().copied()
    }

    /// Number of distinct back edges.
    pub(crate) fn num_back_edges(&self) -> usize {
        self.back_edges.len()
    }

    /// Forward incoming-edge counts, indexed by DFS id.
    pub(crate) fn incoming(&self) -> &[u32] {
        &self.incoming
    }
}

/// Kahn's algorithm over forward edges only.
///
/// Returns DFS ids ordered so that every forward edge goes from an earlier
/// to a later position; back edges are never traversed. The incoming-edge
/// counts from [`EdgeClasses::classify`] must match the current numbering,
/// and the forward subgraph must be acyclic (both hold for any numbering
/// and classification produced by this module — a violation is an internal
/// bug, reported as a [`LivenessError`]).
pub(crate) fn topological_order(
    cfg: &impl ControlFlowGraph,
    dfs: &DfsOrder,
    edges: &EdgeClasses,
) -> Result<Vec<u32>, LivenessError> {
    if edges.incoming().len() != dfs.len() {
        return Err(LivenessError::IncomingEdgeMismatch {
            expected: dfs.len(),
            actual: edges.incoming().len(),
        });
    }

    debug_assert_eq!(dfs.id(cfg.entry()), Some(0), "entry is always numbered first");

    let mut processed = vec![0u32; dfs.len()];
    let mut order = Vec::with_capacity(dfs.len());

    let mut work: Vec<u32> = vec![0];
    while let Some(id) = work.pop() {
        order.push(id);
        let block = dfs.block(id as usize);
        for &succ in cfg.successors(block).iter() {
            if edges.is_back_edge(block, succ) {
                continue;
            }
            let Some(succ_id) = dfs.id(succ) else {
                debug_assert!(false, "forward successor of a reachable block must be numbered");
                continue;
            };
            processed[succ_id as usize] += 1;
            if processed[succ_id as usize] == edges.incoming()[succ_id as usize] {
                work.push(succ_id);
            }
        }
    }

    if order.len() != dfs.len() {
        return Err(LivenessError::TopologicalOrderIncomplete {
            ordered: order.len(),
            reachable: dfs.len(),
        });
    }
    Ok(order)
}
