//! Shared test utilities for the liveness engine.
//!
//! Provides a synthetic adjacency-list CFG, a dominator tree built over it,
//! and a table-driven use/def relation, so every module can be tested
//! without a host IR. Only compiled in test builds.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::cfg::{BlockId, ControlFlowGraph, DominanceInfo, UseDefInfo};

/// Shorthand for `BlockId::new(n)`.
pub(crate) fn b(n: u32) -> BlockId {
    BlockId::new(n)
}

/// Shorthand for `TestValue(n)`.
pub(crate) fn v(n: u32) -> TestValue {
    TestValue(n)
}

/// Opaque SSA value handle for tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TestValue(pub(crate) u32);

/// Adjacency-list CFG with block 0 as the entry.
#[derive(Debug)]
pub(crate) struct TestCfg {
    succs: Vec<Vec<BlockId>>,
    preds: Vec<Vec<BlockId>>,
}

impl TestCfg {
    /// Build a CFG with `num_blocks` blocks and the given edges. Successor
    /// order follows the edge-list order.
    pub(crate) fn new(num_blocks: usize, edges: &[(u32, u32)]) -> Self {
        let mut succs = vec![Vec::new(); num_blocks];
        let mut preds = vec![Vec::new(); num_blocks];
        for &(from, to) in edges {
            succs[from as usize].push(b(to));
            preds[to as usize].push(b(from));
        }
        Self { succs, preds }
    }
}

impl ControlFlowGraph for TestCfg {
    fn entry(&self) -> BlockId {
        b(0)
    }

    fn num_blocks(&self) -> usize {
        self.succs.len()
    }

    fn successors(&self, block: BlockId) -> SmallVec<[BlockId; 4]> {
        SmallVec::from_slice(&self.succs[block.index()])
    }

    fn predecessors(&self, block: BlockId) -> SmallVec<[BlockId; 4]> {
        SmallVec::from_slice(&self.preds[block.index()])
    }
}

/// Dominator tree over a [`TestCfg`].
///
/// Cooper-Harvey-Kennedy iterative algorithm: iterate to a fixpoint in
/// reverse postorder, intersecting predecessor dominators. Converges in a
/// couple of passes for the small graphs tests use.
pub(crate) struct DominatorTree {
    /// Immediate dominator per block index. `idom[entry] == Some(entry)`,
    /// unreachable blocks stay `None`.
    idom: Vec<Option<usize>>,
}

impl DominatorTree {
    pub(crate) fn build(cfg: &TestCfg) -> Self {
        let n = cfg.num_blocks();
        if n == 0 {
            return Self { idom: vec![] };
        }

        let rpo = reverse_postorder(cfg);
        let mut rpo_pos = vec![0usize; n];
        for (pos, &block_idx) in rpo.iter().enumerate() {
            rpo_pos[block_idx] = pos;
        }

        let entry = cfg.entry().index();
        let mut idom: Vec<Option<usize>> = vec![None; n];
        idom[entry] = Some(entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &block_idx in &rpo[1..] {
                let mut new_idom = None;
                for pred in cfg.predecessors(b(block_idx as u32)) {
                    if idom[pred.index()].is_some() {
                        new_idom = Some(pred.index());
                        break;
                    }
                }

                let Some(mut new_idom_val) = new_idom else {
                    continue;
                };

                for pred in cfg.predecessors(b(block_idx as u32)) {
                    let pred = pred.index();
                    if pred == new_idom_val {
                        continue;
                    }
                    if idom[pred].is_some() {
                        new_idom_val = Self::intersect(pred, new_idom_val, &idom, &rpo_pos);
                    }
                }

                if idom[block_idx] != Some(new_idom_val) {
                    idom[block_idx] = Some(new_idom_val);
                    changed = true;
                }
            }
        }

        Self { idom }
    }

    /// CHK intersect: walk two fingers up the idom chains until they meet.
    fn intersect(mut a: usize, mut b: usize, idom: &[Option<usize>], rpo_pos: &[usize]) -> usize {
        while a != b {
            while rpo_pos[a] > rpo_pos[b] {
                let Some(next) = idom[a] else {
                    panic!("intersect: broken idom chain at {a}");
                };
                a = next;
            }
            while rpo_pos[b] > rpo_pos[a] {
                let Some(next) = idom[b] else {
                    panic!("intersect: broken idom chain at {b}");
                };
                b = next;
            }
        }
        a
    }
}

impl DominanceInfo for DominatorTree {
    fn properly_dominates(&self, a: BlockId, b: BlockId) -> bool {
        if a == b {
            return false;
        }
        let a_idx = a.index();
        let mut current = b.index();
        loop {
            match self.idom[current] {
                Some(dom) if dom != current => {
                    if dom == a_idx {
                        return true;
                    }
                    current = dom;
                }
                _ => return false,
            }
        }
    }
}

/// Postorder over the reachable blocks, reversed.
fn reverse_postorder(cfg: &TestCfg) -> Vec<usize> {
    let mut postorder = Vec::with_capacity(cfg.num_blocks());
    let mut visited = vec![false; cfg.num_blocks()];

    let mut stack: Vec<(usize, bool)> = vec![(cfg.entry().index(), false)];
    while let Some(&mut (block_idx, ref mut children_done)) = stack.last_mut() {
        if *children_done {
            stack.pop();
            postorder.push(block_idx);
            continue;
        }
        *children_done = true;

        if visited[block_idx] {
            stack.pop();
            continue;
        }
        visited[block_idx] = true;

        // Successors are processed before this entry is revisited with its
        // marker set, which is when the block itself is emitted.
        for succ in cfg.successors(b(block_idx as u32)) {
            if !visited[succ.index()] {
                stack.push((succ.index(), false));
            }
        }
    }

    postorder.reverse();
    postorder
}

/// Table-driven use/def relation.
pub(crate) struct UseDefTable {
    defs: Vec<(TestValue, BlockId)>,
    uses: FxHashSet<(TestValue, BlockId)>,
}

impl UseDefTable {
    pub(crate) fn new() -> Self {
        Self {
            defs: Vec::new(),
            uses: FxHashSet::default(),
        }
    }

    /// Record `value` as defined in `block`.
    pub(crate) fn def(mut self, value: TestValue, block: BlockId) -> Self {
        self.defs.push((value, block));
        self
    }

    /// Record a use of `value` inside `block`.
    pub(crate) fn used(mut self, value: TestValue, block: BlockId) -> Self {
        self.uses.insert((value, block));
        self
    }
}

impl UseDefInfo for UseDefTable {
    type Value = TestValue;

    fn def_block(&self, value: TestValue) -> Option<BlockId> {
        self.defs
            .iter()
            .find(|&&(v, _)| v == value)
            .map(|&(_, block)| block)
    }

    fn is_used_in(&self, value: TestValue, block: BlockId) -> bool {
        self.uses.contains(&(value, block))
    }
}
