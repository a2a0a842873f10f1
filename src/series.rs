//! Linear chains of a single block.

use std::collections::BTreeMap;

use crate::opengraph::{ComposeError, OpenGraph};
use crate::NodeId;

/// Composes `copies` structural copies of `block` in series:
///
/// ```text
///   _ _  _ _  _ _
/// -|   ||   ||   |-
/// -|_ _||_ _||_ _|-
/// ```
///
/// At each step the template's entire input boundary is identified with
/// the current end of the chain, the image of the block's own output
/// boundary carried forward by relabeling. With `copies = 0` the result
/// is indistinguishable from `block` itself. The block is never mutated.
pub fn compose_series(block: &OpenGraph, copies: usize) -> Result<OpenGraph, ComposeError> {
    let mut chain = block.clone();
    for _ in 0..copies {
        let mapping: BTreeMap<NodeId, NodeId> = block
            .inputs()
            .iter()
            .copied()
            .zip(chain.outputs().iter().copied())
            .collect();
        let (composed, _) = chain.compose(block, &mapping)?;
        chain = composed;
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use petgraph::algo::connected_components;
    use rstest::rstest;

    use super::*;
    use crate::blocks::{browne_block, ladder_block};

    #[test]
    fn zero_copies_returns_the_block() {
        let block = browne_block();
        let chain = compose_series(&block, 0).unwrap();
        assert!(chain.is_close(&block));
    }

    #[rstest]
    #[case(1, 18)]
    #[case(2, 26)]
    #[case(4, 42)]
    fn chains_merge_the_full_boundary(#[case] copies: usize, #[case] order: usize) {
        let block = browne_block();
        let chain = compose_series(&block, copies).unwrap();
        assert_eq!(chain.node_count(), order);
        assert_eq!(chain.inputs().len(), 2);
        assert_eq!(chain.outputs().len(), 2);
        assert_eq!(connected_components(chain.graph()), 1);
    }

    #[test]
    fn chains_of_the_ladder_block() {
        let chain = compose_series(&ladder_block(), 3).unwrap();
        // Four copies of an 8-node block, two nodes merged per junction.
        assert_eq!(chain.node_count(), 26);
        assert_eq!(connected_components(chain.graph()), 1);
    }
}
