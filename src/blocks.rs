//! Minimal open-graph building blocks with known flow properties.
//!
//! These fixed open graphs are the composition units handed to
//! [`BlockComposer`](crate::BlockComposer) and the series/grid
//! constructors. Both carry a Pauli-flow witness, so any graph built by
//! merging their outputs into inputs keeps a Pauli flow by construction.

use std::collections::BTreeMap;

use petgraph::graphmap::UnGraphMap;

use crate::opengraph::{Measurement, OpenGraph, Plane};
use crate::NodeId;

/// An open graph with Pauli flow but no gflow, with two inputs and two
/// outputs:
///
/// ```text
/// [0]-2-5-(8)
///     | |
///     3-6
///     | |
/// [1]-4-7-(9)
/// ```
///
/// Adapted from Fig. 7 in D. E. Browne et al 2007 New J. Phys. 9 250.
pub fn browne_block() -> OpenGraph {
    let n = NodeId::new;
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
    ];
    let graph: UnGraphMap<NodeId, ()> =
        UnGraphMap::from_edges(edges.iter().map(|&(a, b)| (n(a), n(b))));
    let measurements = (0..8)
        .map(|node| (n(node), Measurement::new(0.0, Plane::XY)))
        .collect();

    OpenGraph::new(graph, measurements, vec![n(0), n(1)], vec![n(8), n(9)])
        .expect("block satisfies the open-graph invariants")
}

/// A ladder-shaped open graph with Pauli flow, two inputs and two outputs:
///
/// ```text
/// [0]-2-4-(6)
///     | |
/// [1]-3-5-(7)
/// ```
pub fn ladder_block() -> OpenGraph {
    let n = NodeId::new;
    let edges = [(0, 2), (1, 3), (2, 3), (2, 4), (3, 5), (4, 5), (4, 6), (5, 7)];
    let graph: UnGraphMap<NodeId, ()> =
        UnGraphMap::from_edges(edges.iter().map(|&(a, b)| (n(a), n(b))));
    let measurements = BTreeMap::from([
        (n(0), Measurement::new(0.1, Plane::XY)),
        (n(1), Measurement::new(0.1, Plane::XY)),
        (n(2), Measurement::new(0.1, Plane::XY)),
        (n(3), Measurement::new(0.1, Plane::XY)),
        (n(4), Measurement::new(0.0, Plane::XY)),
        (n(5), Measurement::new(0.5, Plane::YZ)),
    ]);

    OpenGraph::new(graph, measurements, vec![n(0), n(1)], vec![n(6), n(7)])
        .expect("block satisfies the open-graph invariants")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_well_formed() {
        let browne = browne_block();
        assert_eq!(browne.node_count(), 10);
        assert_eq!(browne.measurements().len(), 8);

        let ladder = ladder_block();
        assert_eq!(ladder.node_count(), 8);
        assert_eq!(ladder.measurements().len(), 6);
    }
}
