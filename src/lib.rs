#![warn(missing_docs)]
//! `opengraph-gen` is a generator library for *open graphs*: undirected
//! graphs equipped with ordered input and output boundary node lists and a
//! measurement assignment for every non-output node.
//!
//! Open graphs of increasing size are built by repeatedly composing small
//! minimal building blocks whose flow properties are known. Composition
//! merges a subset of the running graph's outputs with a subset of the next
//! block's inputs, which keeps the flow property of the blocks intact by
//! construction, so the generated instances can exercise flow-finding
//! algorithms at scale without re-verifying every instance.
//!
//! The central entry point is [`BlockComposer`], which grows a graph one
//! block at a time and snapshots it at caller-requested composition steps.
//! Two special-purpose recipes are built from the same merge primitive:
//! [`compose_series`] chains copies of one block end to end, and
//! [`compose_grid`] lays copies out in a two-dimensional brick wall.
//!
//! # Example
//!
//! ```
//! use opengraph_gen::blocks::{browne_block, ladder_block};
//! use opengraph_gen::{BlockComposer, Selection};
//!
//! // Compose blocks in parallel, snapshotting after one and three steps.
//! let composer = BlockComposer::new([browne_block(), ladder_block()]);
//! let sequence = composer
//!     .generate(&[1, 3, 5], Some(0), None, Selection::in_order())
//!     .unwrap();
//!
//! // The step equal to the largest request is never executed, so only the
//! // first two snapshots are produced.
//! assert_eq!(sequence.node_counts, vec![20, 38]);
//! ```

pub mod blocks;
pub mod composer;
pub mod grid;
pub mod opengraph;
pub mod series;

#[cfg(test)]
pub(crate) mod test_support;

#[doc(inline)]
pub use crate::composer::{truncate_inputs, BlockComposer, GeneratedSequence, Selection};
#[doc(inline)]
pub use crate::grid::compose_grid;
#[doc(inline)]
pub use crate::opengraph::{Measurement, OpenGraph, Plane};
#[doc(inline)]
pub use crate::series::compose_series;

/// Identifier of a node within an [`OpenGraph`].
///
/// Identifiers are unique within a single open graph but carry no meaning
/// beyond identity: composition relabels the right operand's identifiers to
/// keep the two operand spaces disjoint.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier from a `usize`.
    ///
    /// # Panics
    ///
    /// Panics if the index is greater than `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index.try_into().expect("node identifier out of range"))
    }

    /// Returns the identifier as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.index()
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // avoid unnecessary newlines in alternate mode
        write!(f, "NodeId({})", self.0)
    }
}
