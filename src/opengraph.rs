//! Open graphs: undirected graphs with ordered boundary node lists and
//! per-node measurements, and the merge primitive used to compose them.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;

use crate::NodeId;

/// Absolute tolerance when comparing measurement angles.
const ANGLE_TOLERANCE: f64 = 1e-9;

/// Measurement plane of a non-output node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Equatorial plane of the Bloch sphere.
    XY,
    /// Plane spanned by the Y and Z axes.
    YZ,
    /// Plane spanned by the X and Z axes.
    XZ,
}

/// A single-node measurement: an angle (in units of π) and a plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Measurement angle, in units of π.
    pub angle: f64,
    /// Measurement plane.
    pub plane: Plane,
}

impl Measurement {
    /// Creates a new measurement.
    pub fn new(angle: f64, plane: Plane) -> Self {
        Self { angle, plane }
    }

    /// Returns `true` if both measurements share the plane and their angles
    /// differ by less than the comparison tolerance.
    pub fn is_close(&self, other: &Measurement) -> bool {
        self.plane == other.plane && (self.angle - other.angle).abs() <= ANGLE_TOLERANCE
    }
}

/// A graph with designated ordered input/output boundary node lists and a
/// measurement for every non-output node.
///
/// The boundary lists are ordered sequences: deterministic boundary
/// selection indexes into them, so their order is semantically meaningful.
/// All operations treat `OpenGraph` values as immutable and return fresh
/// instances.
#[derive(Clone, Debug)]
pub struct OpenGraph {
    graph: UnGraphMap<NodeId, ()>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    measurements: BTreeMap<NodeId, Measurement>,
}

/// Error returned when constructing an [`OpenGraph`] that violates the
/// open-graph invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidGraph {
    /// An input boundary entry is not a node of the graph.
    #[error("input {0:?} is not a node of the graph")]
    InputNotInGraph(NodeId),
    /// An output boundary entry is not a node of the graph.
    #[error("output {0:?} is not a node of the graph")]
    OutputNotInGraph(NodeId),
    /// A measured node is not a node of the graph.
    #[error("measured node {0:?} is not a node of the graph")]
    MeasuredNotInGraph(NodeId),
    /// A non-output node has no measurement assigned.
    #[error("non-output node {0:?} has no measurement")]
    MissingMeasurement(NodeId),
    /// An output node carries a measurement.
    #[error("output node {0:?} carries a measurement")]
    MeasuredOutput(NodeId),
}

/// Error returned by [`OpenGraph::compose`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// A mapping key is not a node of the right operand.
    #[error("mapping key {0:?} is not a node of the right operand")]
    UnknownNode(NodeId),
    /// An identified node would carry two different measurements.
    #[error("node {node:?} would carry two different measurements")]
    MeasurementClash {
        /// The identifier of the clashing node in the composed graph.
        node: NodeId,
    },
}

impl OpenGraph {
    /// Creates a new open graph, checking the open-graph invariants: every
    /// boundary entry is a node of the graph, and the measured node set is
    /// exactly the non-output node set.
    pub fn new(
        graph: UnGraphMap<NodeId, ()>,
        measurements: BTreeMap<NodeId, Measurement>,
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
    ) -> Result<Self, InvalidGraph> {
        let og = Self {
            graph,
            inputs,
            outputs,
            measurements,
        };
        og.validate()?;
        Ok(og)
    }

    /// Builds an open graph from already-checked parts.
    pub(crate) fn from_parts(
        graph: UnGraphMap<NodeId, ()>,
        measurements: BTreeMap<NodeId, Measurement>,
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
    ) -> Self {
        let og = Self {
            graph,
            inputs,
            outputs,
            measurements,
        };
        debug_assert_eq!(og.validate(), Ok(()));
        og
    }

    fn validate(&self) -> Result<(), InvalidGraph> {
        for &node in &self.inputs {
            if !self.graph.contains_node(node) {
                return Err(InvalidGraph::InputNotInGraph(node));
            }
        }
        for &node in &self.outputs {
            if !self.graph.contains_node(node) {
                return Err(InvalidGraph::OutputNotInGraph(node));
            }
        }
        for &node in self.measurements.keys() {
            if !self.graph.contains_node(node) {
                return Err(InvalidGraph::MeasuredNotInGraph(node));
            }
        }
        for node in self.graph.nodes() {
            let is_output = self.outputs.contains(&node);
            match (self.measurements.contains_key(&node), is_output) {
                (false, false) => return Err(InvalidGraph::MissingMeasurement(node)),
                (true, true) => return Err(InvalidGraph::MeasuredOutput(node)),
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns the underlying undirected graph.
    #[inline]
    pub fn graph(&self) -> &UnGraphMap<NodeId, ()> {
        &self.graph
    }

    /// Returns the ordered input boundary.
    #[inline]
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Returns the ordered output boundary.
    #[inline]
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Returns the measurement assignment for the non-output nodes.
    #[inline]
    pub fn measurements(&self) -> &BTreeMap<NodeId, Measurement> {
        &self.measurements
    }

    /// Returns the number of nodes in the graph.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Iterates over the node identifiers of the graph.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.nodes()
    }

    /// Iterates over the edges of the graph.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    /// Returns a copy of this graph with the given input boundary.
    pub(crate) fn with_inputs(&self, inputs: Vec<NodeId>) -> Self {
        Self {
            graph: self.graph.clone(),
            inputs,
            outputs: self.outputs.clone(),
            measurements: self.measurements.clone(),
        }
    }

    /// Returns `true` if both graphs have the same nodes, edges and boundary
    /// lists, and their measurements agree up to the angle tolerance.
    pub fn is_close(&self, other: &OpenGraph) -> bool {
        self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.node_count() == other.node_count()
            && self.graph.edge_count() == other.graph.edge_count()
            && self.nodes().all(|n| other.graph.contains_node(n))
            && self.edges().all(|(a, b)| other.graph.contains_edge(a, b))
            && self.measurements.len() == other.measurements.len()
            && self.measurements.iter().all(|(node, meas)| {
                other
                    .measurements
                    .get(node)
                    .is_some_and(|m| meas.is_close(m))
            })
    }

    /// Composes this graph with `other` under a partial relabeling of
    /// `other`'s nodes, and returns the composed graph together with the
    /// first fresh identifier handed out during relabeling.
    ///
    /// Every key of `mapping` must be a node of `other`. A mapped node whose
    /// target is a node of `self` is *identified* with it; a mapped node
    /// with a fresh target is merely renamed. Unmapped nodes of `other`
    /// receive consecutive fresh identifiers starting at the returned
    /// offset, in ascending order of their original identifiers, so the two
    /// identifier spaces stay disjoint.
    ///
    /// An identified node is an input of the composition iff it is an input
    /// on both sides, and an output iff it is an output on both sides; in
    /// the usual case of plugging `other`'s inputs into `self`'s outputs the
    /// identified nodes become interior and take the measurement of the
    /// consumed input. Boundary lists keep left-then-right order. Neither
    /// operand is mutated.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use opengraph_gen::blocks::browne_block;
    /// use opengraph_gen::NodeId;
    ///
    /// let block = browne_block();
    /// // Plug a second copy's inputs into the block's outputs.
    /// let mapping = BTreeMap::from([
    ///     (NodeId::new(0), NodeId::new(8)),
    ///     (NodeId::new(1), NodeId::new(9)),
    /// ]);
    /// let (chain, offset) = block.compose(&block, &mapping).unwrap();
    /// assert_eq!(chain.node_count(), 18);
    /// assert_eq!(offset, 10);
    /// ```
    pub fn compose(
        &self,
        other: &OpenGraph,
        mapping: &BTreeMap<NodeId, NodeId>,
    ) -> Result<(OpenGraph, usize), ComposeError> {
        for &node in mapping.keys() {
            if !other.graph.contains_node(node) {
                return Err(ComposeError::UnknownNode(node));
            }
        }

        // First identifier free on both the left operand and the mapping
        // targets; fresh identifiers are handed out consecutively from here.
        let offset = self
            .graph
            .nodes()
            .chain(mapping.values().copied())
            .map(NodeId::index)
            .max()
            .map_or(0, |max| max + 1);

        let mut relabel = mapping.clone();
        let mut next = offset;
        for node in other.graph.nodes().sorted() {
            relabel.entry(node).or_insert_with(|| {
                let fresh = NodeId::new(next);
                next += 1;
                fresh
            });
        }

        let mut graph = self.graph.clone();
        for node in other.graph.nodes() {
            graph.add_node(relabel[&node]);
        }
        for (a, b, _) in other.graph.all_edges() {
            graph.add_edge(relabel[&a], relabel[&b], ());
        }

        // Nodes of `self` identified with nodes of `other`, keyed by target.
        let mut identified: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for (&node, &target) in mapping {
            if self.graph.contains_node(target) {
                identified.entry(target).or_default().push(node);
            }
        }

        let mut measurements = self.measurements.clone();
        for (&node, meas) in &other.measurements {
            let node = relabel[&node];
            match measurements.get(&node) {
                Some(existing) if !existing.is_close(meas) => {
                    return Err(ComposeError::MeasurementClash { node });
                }
                Some(_) => {}
                None => {
                    measurements.insert(node, *meas);
                }
            }
        }

        let inputs = self.composed_boundary(&self.inputs, &other.inputs, &relabel, &identified);
        let outputs = self.composed_boundary(&self.outputs, &other.outputs, &relabel, &identified);

        let composed = Self::from_parts(graph, measurements, inputs, outputs);
        Ok((composed, offset))
    }

    /// One boundary list of a composition: left entries that keep their
    /// status (an identified node keeps it only when every node merged into
    /// it has the same status on the right), followed by the relabeled
    /// right entries that were not identified with a left node.
    fn composed_boundary(
        &self,
        left: &[NodeId],
        right: &[NodeId],
        relabel: &BTreeMap<NodeId, NodeId>,
        identified: &BTreeMap<NodeId, Vec<NodeId>>,
    ) -> Vec<NodeId> {
        let right_set: BTreeSet<NodeId> = right.iter().copied().collect();
        let kept_left = left.iter().copied().filter(|node| {
            identified
                .get(node)
                .map_or(true, |sources| sources.iter().all(|s| right_set.contains(s)))
        });
        let kept_right = right
            .iter()
            .map(|node| relabel[node])
            .filter(|node| !self.graph.contains_node(*node));
        kept_left.chain(kept_right).collect()
    }
}
