//! Two-dimensional brick-wall layouts of a single block.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::opengraph::{ComposeError, OpenGraph};
use crate::NodeId;

/// Error returned by [`compose_grid`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    /// Fewer than one row was requested.
    #[error("a grid needs at least one row")]
    NoRows,
    /// Fewer than one layer was requested.
    #[error("a grid needs at least one layer")]
    NoLayers,
    /// A layer composition failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Composes copies of `block` in a brick-wall structure of `rows` rows and
/// `layers` alternating layers:
///
/// ```text
///   _ _       _ _
/// -|   | _ _ |   |-
/// -|_ _||   ||_ _|-
/// -|‾ ‾||_ _||‾ ‾|-
/// -|_ _|     |_ _|-
/// ```
///
/// Even layers hold `rows` copies and odd layers one fewer, offset by half
/// a block, so the wall bonds like brickwork. With `layers = 1` the result
/// is `rows` disconnected copies composed in parallel. The final boundary
/// width is `3` when `rows == 1` and `layers > 1` (two long edges plus the
/// truncated short end), otherwise `2 × rows`.
pub fn compose_grid(block: &OpenGraph, rows: usize, layers: usize) -> Result<OpenGraph, GridError> {
    if rows < 1 {
        return Err(GridError::NoRows);
    }
    if layers < 1 {
        return Err(GridError::NoLayers);
    }

    let (full_layer, offset_layer) = build_layer_templates(block, rows)?;

    let mut grid = full_layer.clone();
    for layer in 1..layers {
        let (template, targets) = if layer % 2 == 1 {
            (&offset_layer, offset_targets(grid.outputs()))
        } else {
            (&full_layer, full_targets(grid.outputs()))
        };
        let mapping: BTreeMap<NodeId, NodeId> = template
            .inputs()
            .iter()
            .copied()
            .zip(targets)
            .collect();
        let (composed, _) = grid.compose(template, &mapping)?;
        grid = composed;
    }
    Ok(grid)
}

/// The two alternating row templates: `rows` copies of `block` laid out in
/// parallel, and the half-offset template with one copy fewer (a single
/// copy each when `rows == 1`).
///
/// Each added copy's boundary nodes are relabeled to consecutive fresh
/// identifiers at the full template's running node count, which keeps the
/// output order of both templates aligned row by row.
fn build_layer_templates(
    block: &OpenGraph,
    rows: usize,
) -> Result<(OpenGraph, OpenGraph), ComposeError> {
    let mut full = block.clone();
    let mut offset = block.clone();
    for row in 1..rows {
        let base = full.node_count();
        let mapping: BTreeMap<NodeId, NodeId> = block
            .inputs()
            .iter()
            .chain(block.outputs().iter())
            .enumerate()
            .map(|(position, &node)| (node, NodeId::new(base + position)))
            .collect();

        let (next_full, _) = full.compose(block, &mapping)?;
        full = next_full;
        if row < rows - 1 {
            let (next_offset, _) = offset.compose(block, &mapping)?;
            offset = next_offset;
        }
    }
    Ok((full, offset))
}

/// Outputs a new offset layer plugs into: the interior outputs, skipping
/// the first (and the last, while more than three outputs remain).
fn offset_targets(outputs: &[NodeId]) -> Vec<NodeId> {
    if outputs.len() > 3 {
        outputs[1..outputs.len() - 1].to_vec()
    } else {
        outputs[1..].to_vec()
    }
}

/// Outputs a new full layer plugs into. With three outputs (single-row
/// wall) the short end is dropped; otherwise the second output is rotated
/// to the end so the rows of the full layer line up geometrically with the
/// half-offset layer below.
fn full_targets(outputs: &[NodeId]) -> Vec<NodeId> {
    if outputs.len() == 3 {
        outputs[..outputs.len() - 1].to_vec()
    } else {
        let mut rotated = outputs.to_vec();
        let second = rotated.remove(1);
        rotated.push(second);
        rotated
    }
}

#[cfg(test)]
mod tests {
    use petgraph::algo::{connected_components, is_isomorphic};
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::blocks::browne_block;
    use crate::test_support::{as_compact_graph, reference_graph};

    #[test]
    fn invalid_bounds_are_rejected() {
        let block = browne_block();
        assert!(matches!(compose_grid(&block, 0, 1), Err(GridError::NoRows)));
        assert!(matches!(
            compose_grid(&block, 1, 0),
            Err(GridError::NoLayers)
        ));
    }

    #[test]
    fn single_cell_grid_is_the_block() {
        let block = browne_block();
        let grid = compose_grid(&block, 1, 1).unwrap();
        assert!(is_isomorphic(
            &as_compact_graph(&grid),
            &as_compact_graph(&block)
        ));
    }

    #[test]
    fn two_by_two_grid_matches_the_reference() {
        let grid = compose_grid(&browne_block(), 2, 2).unwrap();

        let edges = [
            (0, 2),
            (1, 4),
            (2, 3),
            (3, 4),
            (2, 5),
            (3, 6),
            (4, 7),
            (5, 6),
            (6, 7),
            (5, 8),
            (7, 9),
            (10, 12),
            (11, 14),
            (12, 13),
            (13, 14),
            (12, 15),
            (13, 16),
            (14, 17),
            (15, 16),
            (16, 17),
            (15, 18),
            (17, 19),
            (9, 20),
            (20, 21),
            (21, 22),
            (18, 22),
            (20, 23),
            (21, 24),
            (22, 25),
            (23, 24),
            (24, 25),
            (23, 26),
            (25, 27),
        ];

        assert!(is_isomorphic(
            &as_compact_graph(&grid),
            &reference_graph(&edges)
        ));
        assert_eq!(grid.inputs().len(), 4);
        assert_eq!(grid.outputs().len(), 4);
    }

    // The 2x3 wall pins the output reordering: without rotating the second
    // output to the end before adding a full layer, the third layer would
    // bond to the wrong rows.
    #[test]
    fn two_by_three_grid_matches_the_reference() {
        let grid = compose_grid(&browne_block(), 2, 3).unwrap();

        let edges = [
            (0, 2),
            (1, 4),
            (2, 3),
            (3, 4),
            (2, 5),
            (3, 6),
            (4, 7),
            (5, 6),
            (6, 7),
            (5, 8),
            (7, 9),
            (10, 12),
            (11, 14),
            (12, 13),
            (13, 14),
            (12, 15),
            (13, 16),
            (14, 17),
            (15, 16),
            (16, 17),
            (15, 18),
            (17, 19),
            (9, 20),
            (20, 21),
            (21, 22),
            (18, 22),
            (20, 23),
            (21, 24),
            (22, 25),
            (23, 24),
            (24, 25),
            (23, 26),
            (25, 27),
            (8, 28),
            (28, 29),
            (29, 30),
            (28, 31),
            (29, 32),
            (30, 33),
            (26, 30),
            (31, 34),
            (31, 32),
            (32, 33),
            (33, 35),
            (27, 36),
            (36, 37),
            (37, 38),
            (36, 39),
            (37, 40),
            (38, 41),
            (19, 38),
            (39, 40),
            (40, 41),
            (39, 42),
            (41, 43),
        ];

        assert!(is_isomorphic(
            &as_compact_graph(&grid),
            &reference_graph(&edges)
        ));
        assert_eq!(grid.inputs().len(), 4);
        assert_eq!(grid.outputs().len(), 4);
    }

    /// Node count of a brick wall of 10-node blocks, counting the merged
    /// boundary pairs each bond removes.
    fn expected_node_count(rows: usize, layers: usize) -> usize {
        let (rows, layers) = (rows as i64, layers as i64);
        let (blocks, merged_endpoints) = if layers == 1 {
            (rows, 0)
        } else if rows == 1 {
            (layers, 10 + 4 * (layers - 4))
        } else {
            let blocks = layers / 2 * (2 * rows - 1) + layers % 2 * rows;
            let external = if layers % 2 == 1 { 2 * rows } else { 2 * rows - 1 };
            let internal = blocks - external;
            let mut merged = 4 * internal + 2 * external;
            if layers % 2 == 0 {
                // The top offset layer of an even wall leaves two boundary
                // nodes unmerged.
                merged -= 2;
            }
            (blocks, merged)
        };
        (10 * blocks - merged_endpoints / 2) as usize
    }

    #[rstest]
    #[case(2, 1)]
    #[case(3, 1)]
    #[case(4, 1)]
    #[case(1, 2)]
    #[case(1, 3)]
    #[case(1, 4)]
    #[case(3, 2)]
    #[case(4, 2)]
    #[case(2, 4)]
    #[case(3, 3)]
    #[case(4, 4)]
    fn wall_laws(#[case] rows: usize, #[case] layers: usize) {
        let grid = compose_grid(&browne_block(), rows, layers).unwrap();

        // A single layer holds its rows in parallel; any further layer
        // bonds them all into one component.
        let components = if layers == 1 { rows } else { 1 };
        assert_eq!(connected_components(grid.graph()), components);

        assert_eq!(grid.node_count(), expected_node_count(rows, layers));

        let boundary = if rows == 1 && layers > 1 { 3 } else { 2 * rows };
        assert_eq!(grid.inputs().len(), boundary);
        assert_eq!(grid.outputs().len(), boundary);
    }

    proptest! {
        #[test]
        fn component_law(rows in 1usize..5, layers in 1usize..5) {
            let grid = compose_grid(&browne_block(), rows, layers).unwrap();
            let expected = if layers == 1 { rows } else { 1 };
            prop_assert_eq!(connected_components(grid.graph()), expected);
        }
    }
}
