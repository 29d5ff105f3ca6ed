//! The liveness-query engine.
//!
//! [`LiveVariables`] bundles everything the preprocessing pipeline derives
//! from one function's CFG: the DFS numbering, the back-edge set, and the
//! reduced-reachability and reachable-back-edges matrices. Queries are pure
//! reads over those structures plus dominance and use-site checks delegated
//! to the host.
//!
//! A value is live-in to block `q` if some back-edge target R reachable
//! from `q` satisfies both:
//!
//! - the value's defining block properly dominates R (the loop re-entry can
//!   actually carry the value), and
//! - some block forward-reachable from R uses the value.
//!
//! Live-out is the same enumeration shifted past the block, with two
//! special cases: a value defined in `q` is live-out exactly when it is
//! used outside `q`, or when `q` loops directly back into itself and the
//! value is used in `q` on a later iteration; and a use in `q` itself only
//! witnesses live-out when control can come back around to `q`.

use core::fmt;
use core::fmt::Write as _;

use crate::cfg::{BlockId, ControlFlowGraph, DominanceInfo, UseDefInfo};
use crate::matrix::BitMatrix;
use crate::order::{topological_order, DfsOrder, EdgeClasses};
use crate::reach::{reachable_back_edges, reduced_reachability};

/// Internal-consistency failure while building the analysis.
///
/// These indicate a bug in the CFG accessor or in the engine itself, never
/// a property of well-formed input. Callers should treat them as fatal for
/// the current function; there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LivenessError {
    /// The incoming-edge counts do not cover the reachable block set.
    #[error("incoming-edge counts cover {actual} blocks, expected {expected}")]
    IncomingEdgeMismatch {
        /// Reachable block count.
        expected: usize,
        /// Blocks actually covered by the counts.
        actual: usize,
    },
    /// Kahn's algorithm failed to order every reachable block, meaning the
    /// forward subgraph still contained a cycle.
    #[error("topological order covers {ordered} of {reachable} reachable blocks")]
    TopologicalOrderIncomplete {
        /// Blocks the sort managed to order.
        ordered: usize,
        /// Reachable block count.
        reachable: usize,
    },
}

/// Per-function liveness analysis context.
///
/// Owns every derived structure for exactly one function. Reanalyzing after
/// an edit goes through [`LiveVariables::recompute`], which discards all
/// prior state; querying with stale matrices would silently answer for the
/// old graph. Independent functions are analyzed concurrently by
/// constructing one context each — nothing is shared.
pub struct LiveVariables {
    pub(crate) dfs: DfsOrder,
    pub(crate) edges: EdgeClasses,
    /// `R_q` in the paper: blocks reachable through forward edges only.
    pub(crate) reduced: BitMatrix,
    /// `T_q` in the paper: back-edge targets reachable from each block
    /// without leaving its forward-reachable region.
    pub(crate) back_targets: BitMatrix,
    /// Per DFS id, whether the block is the target of at least one back
    /// edge.
    is_back_edge_target: Vec<bool>,
}

impl LiveVariables {
    /// Run the full preprocessing pipeline for `cfg`.
    pub fn compute(cfg: &impl ControlFlowGraph) -> Result<Self, LivenessError> {
        let dfs = DfsOrder::compute(cfg);
        tracing::debug!(
            num_blocks = cfg.num_blocks(),
            reachable = dfs.len(),
            "computing liveness"
        );

        let edges = EdgeClasses::classify(cfg, &dfs);
        tracing::debug!(back_edges = edges.num_back_edges(), "classified edges");

        let topo = topological_order(cfg, &dfs, &edges)?;
        let reduced = reduced_reachability(cfg, &dfs, &edges, &topo);
        let back_targets = reachable_back_edges(&dfs, &edges, &reduced);

        let mut is_back_edge_target = vec![false; dfs.len()];
        for id in 0..dfs.len() {
            let block = dfs.block(id);
            is_back_edge_target[id] = cfg
                .predecessors(block)
                .iter()
                .any(|&pred| edges.is_back_edge(pred, block));
        }

        for id in 0..dfs.len() {
            tracing::trace!(
                dfs_id = id,
                block = dfs.block(id).raw(),
                reduced = ?reduced.row(id).iter_ones().collect::<Vec<_>>(),
                back_targets = ?back_targets.row(id).iter_ones().collect::<Vec<_>>(),
                "reachability row"
            );
        }

        Ok(Self {
            dfs,
            edges,
            reduced,
            back_targets,
            is_back_edge_target,
        })
    }

    /// Discard all derived state and rerun the pipeline over `cfg`.
    ///
    /// Mandatory before querying a function that has been edited since the
    /// last run. Rerunning over an unmodified function yields identical
    /// matrices and identical query answers.
    pub fn recompute(&mut self, cfg: &impl ControlFlowGraph) -> Result<(), LivenessError> {
        *self = Self::compute(cfg)?;
        Ok(())
    }

    /// Returns `true` if `value` is live on entry to `block`.
    ///
    /// The value's defining block comes from `use_defs` (an argument's
    /// defining block is the function entry); the dominance relation comes
    /// from the host's dominator tree. Queries against blocks unreachable
    /// from the entry return `false` — such blocks never execute.
    ///
    /// # Panics
    ///
    /// Panics if `use_defs` reports no defining block for `value`.
    pub fn is_live_in<U: UseDefInfo>(
        &self,
        value: U::Value,
        block: BlockId,
        dominance: &impl DominanceInfo,
        use_defs: &U,
    ) -> bool {
        let Some(q) = self.dfs.id(block) else {
            return false;
        };
        let def = defining_block(value, use_defs);

        for r in self.back_targets.row(q as usize).iter_ones() {
            // Skip back-edge targets that leave the dominance region of the
            // definition and re-enter it; the value cannot be carried along
            // such a re-entry.
            if !dominance.properly_dominates(def, self.dfs.block(r)) {
                continue;
            }
            for j in self.reduced.row(r).iter_ones() {
                if use_defs.is_used_in(value, self.dfs.block(j)) {
                    return true;
                }
            }
        }
        false
    }

    /// Returns `true` if `value` is live on exit from `block`.
    ///
    /// Equivalent to being live-in to some successor, with the single-block
    /// loop as the one extra case: a value defined in `block` survives a
    /// self back edge when `block` uses it again on the next iteration.
    ///
    /// # Panics
    ///
    /// Panics if `use_defs` reports no defining block for `value`.
    pub fn is_live_out<U: UseDefInfo>(
        &self,
        value: U::Value,
        block: BlockId,
        dominance: &impl DominanceInfo,
        use_defs: &U,
    ) -> bool {
        let Some(q) = self.dfs.id(block) else {
            return false;
        };
        let q = q as usize;
        let def = defining_block(value, use_defs);

        if def == block {
            // A value defined here is live-out if any other block uses it...
            for j in 0..self.dfs.len() {
                if j != q && use_defs.is_used_in(value, self.dfs.block(j)) {
                    return true;
                }
            }
            // ...or if the block loops directly back into itself, so a use
            // inside it can happen on a later iteration.
            return self.edges.is_back_edge(block, block) && use_defs.is_used_in(value, block);
        }

        if !dominance.properly_dominates(def, block) {
            return false;
        }

        let q_is_back_edge_target = self.is_back_edge_target[q];
        for r in self.back_targets.row(q).iter_ones() {
            if !dominance.properly_dominates(def, self.dfs.block(r)) {
                continue;
            }
            for j in self.reduced.row(r).iter_ones() {
                // A use in `block` itself only witnesses live-out when
                // control can come back around to `block`.
                if j == q && r == q && !q_is_back_edge_target {
                    continue;
                }
                if use_defs.is_used_in(value, self.dfs.block(j)) {
                    return true;
                }
            }
        }
        false
    }

    /// Render live-in/live-out answers for every (value, block) pair.
    ///
    /// Debug aid only — the format is not stable. Pairs that are neither
    /// live-in nor live-out are omitted unless `include_dead` is set.
    pub fn dump<U>(
        &self,
        values: &[U::Value],
        dominance: &impl DominanceInfo,
        use_defs: &U,
        include_dead: bool,
    ) -> String
    where
        U: UseDefInfo,
        U::Value: fmt::Debug,
    {
        let mut out = String::new();
        for &value in values {
            for id in 0..self.dfs.len() {
                let block = self.dfs.block(id);
                let live_in = self.is_live_in(value, block, dominance, use_defs);
                let live_out = self.is_live_out(value, block, dominance, use_defs);
                if !live_in && !live_out && !include_dead {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{value:?} @ block {}: live-in={live_in} live-out={live_out}",
                    block.raw()
                );
            }
        }
        out
    }
}

/// Resolve the defining block of a queried value.
///
/// A value with no definition site is a malformed query: the host handed
/// the engine something that is not an argument or an instruction result.
fn defining_block<U: UseDefInfo>(value: U::Value, use_defs: &U) -> BlockId {
    match use_defs.def_block(value) {
        Some(block) => block,
        None => panic!("liveness query for a value with no defining block"),
    }
}
