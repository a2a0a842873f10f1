//! Helpers shared by the in-module test suites.

use std::collections::BTreeMap;

use itertools::Itertools;
use petgraph::graph::UnGraph;

use crate::opengraph::OpenGraph;

/// Copies an open graph's structure into a compact-index [`UnGraph`], for
/// the `petgraph` algorithms that require compact node indices.
pub(crate) fn as_compact_graph(og: &OpenGraph) -> UnGraph<(), ()> {
    let mut graph = UnGraph::new_undirected();
    let mut indices = BTreeMap::new();
    for node in og.nodes().sorted() {
        indices.insert(node, graph.add_node(()));
    }
    for (a, b) in og.edges() {
        graph.add_edge(indices[&a], indices[&b], ());
    }
    graph
}

/// Builds an [`UnGraph`] from a reference edge list over `0..=max` node
/// indices.
pub(crate) fn reference_graph(edges: &[(usize, usize)]) -> UnGraph<(), ()> {
    UnGraph::from_edges(edges.iter().map(|&(a, b)| (a as u32, b as u32)))
}
