//! Reduced reachability and reachable back edges.
//!
//! Block B is *reduced-reachable* from block A if A has a path to B that
//! passes through no block dominating A — equivalently, a path using
//! forward edges only. This is the relation that lets a liveness query
//! avoid a dataflow fixpoint: a value can only be live along paths that do
//! not re-enter the dominance region of its definition, and those paths are
//! exactly forward paths plus dominance-gated back-edge re-entries.
//!
//! Both relations are matrices over DFS ids, built in a single pass each:
//! reduced reachability in reverse topological order (successor rows are
//! final before their predecessors are visited), reachable back edges in
//! ascending DFS order (back-edge targets carry a DFS id no greater than
//! any block that can use them — Theorem 3 of the Boissinot et al. paper —
//! so their rows are final first).

use crate::cfg::ControlFlowGraph;
use crate::matrix::BitMatrix;
use crate::order::{DfsOrder, EdgeClasses};

/// Per block, the set of blocks reachable through forward edges only,
/// inclusive of the block itself. `R_q` in the paper.
pub(crate) fn reduced_reachability(
    cfg: &impl ControlFlowGraph,
    dfs: &DfsOrder,
    edges: &EdgeClasses,
    topo: &[u32],
) -> BitMatrix {
    let n = dfs.len();
    let mut matrix = BitMatrix::new(n, n);

    let mut topo_pos = vec![0usize; n];
    for (pos, &id) in topo.iter().enumerate() {
        topo_pos[id as usize] = pos;
    }

    // Reverse topological sweep: every forward successor's row is final by
    // the time its predecessors consult it, so one pass suffices.
    for (pos, &id) in topo.iter().enumerate().rev() {
        let idx = id as usize;
        matrix.set(idx, idx);

        let block = dfs.block(idx);
        for &succ in cfg.successors(block).iter() {
            let Some(succ_id) = dfs.id(succ) else {
                debug_assert!(false, "successor of a reachable block must be numbered");
                continue;
            };
            let succ_idx = succ_id as usize;
            // Back edges point backward in topological order (a self-loop
            // stays in place); skip them here, they are handled by the
            // reachable-back-edges relation.
            if topo_pos[succ_idx] <= pos {
                debug_assert!(edges.is_back_edge(block, succ));
                continue;
            }
            matrix.set(idx, succ_idx);
            matrix.union_rows(succ_idx, idx);
        }
    }

    matrix
}

/// Per block, the set of back-edge *targets* reachable from it without
/// leaving its forward-reachable region, inclusive of the block itself.
/// `T_q` in the paper.
///
/// A back edge (S, T) is usable from block A when S is reduced-reachable
/// from A but T is not — the edge genuinely leaves A's forward region and
/// re-enters a loop. Theorem 3 guarantees that any such T has a DFS id no
/// greater than A's, so building rows in ascending DFS order needs no
/// fixpoint; a violation means the numbering and the classification
/// disagree, and aborts the analysis.
pub(crate) fn reachable_back_edges(
    dfs: &DfsOrder,
    edges: &EdgeClasses,
    reduced: &BitMatrix,
) -> BitMatrix {
    let n = dfs.len();
    let mut matrix = BitMatrix::new(n, n);

    for a in 0..n {
        matrix.set(a, a);

        for (source, target) in edges.back_edges() {
            let (Some(source_id), Some(target_id)) = (dfs.id(source), dfs.id(target)) else {
                debug_assert!(false, "back edges only connect reachable blocks");
                continue;
            };
            let (source_idx, target_idx) = (source_id as usize, target_id as usize);
            if !reduced.contains(a, source_idx) {
                continue;
            }
            if reduced.contains(a, target_idx) {
                continue;
            }

            assert!(
                target_idx <= a,
                "back-edge target {target_idx} ordered after querying block {a} \
                 (Theorem 3 violated)"
            );
            // `target_idx` is never `a` itself: `a` is always in its own
            // reduced-reachability row, and the target is not.
            matrix.union_rows(target_idx, a);
        }
    }

    matrix
}
