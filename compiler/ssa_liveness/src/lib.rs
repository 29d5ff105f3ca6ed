//! Fast liveness checking for SSA-form control-flow graphs.
//!
//! This crate answers point queries — "is this value live on entry/exit to
//! this basic block?" — without running a backward dataflow analysis to a
//! fixpoint. It implements the approach described in:
//!
//!   Boissinot, Hack, Grund, de Dinechin, Rastello, "Fast Liveness Checking
//!   for SSA-Form Programs," INRIA Research Report No. RR-2007-45 (2007).
//!
//! A one-time preprocessing pass over the function's CFG computes:
//!
//! - a depth-first preorder numbering of the reachable blocks,
//! - the set of back edges and per-block forward incoming-edge counts,
//! - a topological order over the forward edges,
//! - a *reduced reachability* matrix (per block, the blocks reachable
//!   through forward edges only), and
//! - a *reachable back edges* matrix (per block, the back-edge targets
//!   reachable without leaving the forward-reachable region).
//!
//! After that, each [`LiveVariables::is_live_in`]/[`LiveVariables::is_live_out`]
//! query costs a walk over the back-edge targets reachable from the query
//! block, gated by dominance checks — no per-program-point live sets are
//! ever materialized.
//!
//! # Host integration
//!
//! The engine never owns the host IR. It sees a function through three
//! narrow capability traits ([`ControlFlowGraph`], [`DominanceInfo`],
//! [`UseDefInfo`]), so it can be driven by any basic-block IR — or by the
//! synthetic graphs the test suite uses. Each [`LiveVariables`] value is an
//! owned, per-function analysis context: analyzing independent functions
//! concurrently just means constructing one context per function.

mod cfg;
mod live;
mod matrix;
mod order;
mod reach;
#[cfg(test)]
mod test_helpers;

pub use cfg::{BlockId, ControlFlowGraph, DominanceInfo, UseDefInfo};
pub use live::{LiveVariables, LivenessError};
