//! Capability traits through which the engine sees the host IR.
//!
//! The analysis consumes a function's block graph, dominator relation, and
//! value use/def relation, and owns none of them. Keeping these seams as
//! small traits means the engine can be unit-tested against synthetic
//! control-flow graphs without a full host IR (see `test_helpers`).

use smallvec::SmallVec;

/// Basic block ID within one analyzed function.
///
/// Host blocks are densely numbered starting from 0. IDs are only
/// meaningful for the lifetime of one analysis run; rerunning the analysis
/// after editing the function invalidates everything derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Create a new block ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read-only view of a function's block graph.
///
/// Successor and predecessor orders must be stable across repeated calls
/// within one analysis run: the DFS numbering, and therefore every derived
/// matrix, is deterministic only for a deterministic successor order. The
/// analysis never mutates the graph, so sharing one graph between
/// concurrently analyzed functions is safe.
pub trait ControlFlowGraph {
    /// The function entry block. Every function has at least one block.
    fn entry(&self) -> BlockId;

    /// Total number of blocks, reachable or not. Block indices are
    /// `0..num_blocks()`.
    fn num_blocks(&self) -> usize;

    /// The ordered successors of `block`.
    fn successors(&self, block: BlockId) -> SmallVec<[BlockId; 4]>;

    /// The ordered predecessors of `block`.
    fn predecessors(&self, block: BlockId) -> SmallVec<[BlockId; 4]>;
}

/// Dominator relation supplied by the host's dominator tree.
///
/// The engine delegates every dominance question here and never computes
/// dominance itself.
pub trait DominanceInfo {
    /// Returns `true` iff `a` strictly dominates `b`: `a != b` and every
    /// path from the function entry to `b` passes through `a`.
    fn properly_dominates(&self, a: BlockId, b: BlockId) -> bool;
}

/// Value definition and use sites, supplied by the host IR.
pub trait UseDefInfo {
    /// Handle for an SSA value (a function argument or an instruction
    /// result).
    type Value: Copy + Eq;

    /// The block in which `value` is defined. Arguments map to the function
    /// entry block; instruction results map to their containing block.
    /// `None` means the value has no definition site, which the engine
    /// rejects as a malformed query.
    fn def_block(&self, value: Self::Value) -> Option<BlockId>;

    /// Returns `true` iff `value` has at least one use inside `block`.
    fn is_used_in(&self, value: Self::Value, block: BlockId) -> bool;
}
