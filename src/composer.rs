//! Iterative composition of open graphs from a pool of minimal blocks.
//!
//! [`BlockComposer`] grows a running open graph one block at a time,
//! merging a bounded number of boundary node pairs at each step, and
//! snapshots the running graph whenever the step counter matches a
//! requested value. [`Selection`] decides which block comes next and which
//! boundary nodes merge, either deterministically or from a seeded
//! generator; [`truncate_inputs`] demotes excess boundary inputs of a
//! finished graph.

use std::collections::{BTreeMap, BTreeSet};

use rand::prelude::*;
use thiserror::Error;

use crate::opengraph::{ComposeError, OpenGraph};
use crate::NodeId;

/// Policy for choosing the next block and the boundary nodes to merge.
///
/// The stochastic variant owns its generator: reseeding with the same value
/// and replaying the same call pattern reproduces the identical output, and
/// concurrent generation runs cannot interfere with each other.
pub enum Selection {
    /// Cycle through the block pool in order and take boundary prefixes.
    InOrder,
    /// Choose blocks uniformly and sample boundary nodes uniformly *with
    /// replacement* from the given generator.
    Uniform(StdRng),
}

impl Selection {
    /// Deterministic selection.
    pub fn in_order() -> Self {
        Selection::InOrder
    }

    /// Uniform selection driven by a generator seeded with `seed`.
    pub fn uniform(seed: u64) -> Self {
        Selection::Uniform(StdRng::seed_from_u64(seed))
    }

    /// Picks `count` entries of `list`: the first `count` in order, or a
    /// uniform with-replacement sample. A sampled entry may repeat, in
    /// which case downstream consumers collapse or ignore the duplicate.
    fn pick(&mut self, list: &[NodeId], count: usize) -> Vec<NodeId> {
        match self {
            Selection::InOrder => list.iter().take(count).copied().collect(),
            Selection::Uniform(rng) => (0..count)
                .filter_map(|_| list.choose(rng).copied())
                .collect(),
        }
    }

    /// The next block: the pool entry at `cursor` (wrapping around), or a
    /// uniform pick.
    fn pick_block<'a>(&mut self, pool: &'a [OpenGraph], cursor: usize) -> &'a OpenGraph {
        match self {
            Selection::InOrder => &pool[cursor % pool.len()],
            Selection::Uniform(rng) => pool.choose(rng).expect("the pool is not empty"),
        }
    }
}

/// Open graphs generated by [`BlockComposer::generate`], in ascending order
/// of requested composition steps, with their node counts in a parallel
/// list.
///
/// The sequence may hold fewer entries than were requested: the largest
/// requested step is never executed (see [`BlockComposer::generate`]).
#[derive(Debug, Clone, Default)]
pub struct GeneratedSequence {
    /// The snapshots of the running graph.
    pub graphs: Vec<OpenGraph>,
    /// Node count of each snapshot.
    pub node_counts: Vec<usize>,
}

impl GeneratedSequence {
    /// Number of generated snapshots.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns `true` if no snapshot was produced.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Error returned by [`BlockComposer::generate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// The composer holds no blocks.
    #[error("the block pool is empty")]
    EmptyPool,
    /// No composition step was requested.
    #[error("no composition steps requested")]
    NoStepCounts,
    /// A requested step count of zero can never be reached.
    #[error("step counts must be positive")]
    ZeroStepCount,
    /// A composition step failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Composes open graphs by iteratively merging minimal building blocks.
///
/// Every block is treated as an immutable template; composition only ever
/// produces fresh graphs.
pub struct BlockComposer {
    blocks: Vec<OpenGraph>,
}

impl BlockComposer {
    /// Creates a composer over the given block pool.
    pub fn new(blocks: impl IntoIterator<Item = OpenGraph>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
        }
    }

    /// Returns the block pool.
    pub fn blocks(&self) -> &[OpenGraph] {
        &self.blocks
    }

    /// Grows a graph by composing one block per step and snapshots it at
    /// every step counter contained in `step_counts`.
    ///
    /// At each step the next block's inputs are merged with the running
    /// graph's outputs. `merge_width` bounds how many pairs are identified:
    /// `None` merges as many as possible, `Some(0)` composes in parallel
    /// (pure disjoint union), and any requested width is clamped to
    /// `min(|running.outputs|, |block.inputs|)`. `input_caps` entries are
    /// applied positionally to the snapshots via [`truncate_inputs`].
    ///
    /// The step counter starts at 1 and iteration stops *before* executing
    /// the step equal to `max(step_counts)`, so the largest requested value
    /// never yields a snapshot: requests are effectively one less than the
    /// number of compositions the caller wants performed. The result is
    /// silently shorter in that case; callers must not assume
    /// `sequence.len() == step_counts.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opengraph_gen::blocks::browne_block;
    /// use opengraph_gen::{BlockComposer, Selection};
    ///
    /// let composer = BlockComposer::new([browne_block()]);
    /// let sequence = composer
    ///     .generate(&[2, 4], Some(1), None, Selection::in_order())
    ///     .unwrap();
    /// // Three chained copies of a 10-node block, one merge per step.
    /// assert_eq!(sequence.node_counts, vec![28]);
    /// ```
    pub fn generate(
        &self,
        step_counts: &[usize],
        merge_width: Option<usize>,
        input_caps: Option<&[usize]>,
        mut selection: Selection,
    ) -> Result<GeneratedSequence, GenerateError> {
        if self.blocks.is_empty() {
            return Err(GenerateError::EmptyPool);
        }
        let Some(&max_steps) = step_counts.iter().max() else {
            return Err(GenerateError::NoStepCounts);
        };
        if step_counts.contains(&0) {
            return Err(GenerateError::ZeroStepCount);
        }
        let requested: BTreeSet<usize> = step_counts.iter().copied().collect();

        let mut sequence = GeneratedSequence::default();
        let mut running = selection.pick_block(&self.blocks, 0).clone();

        for step in 1.. {
            if step == max_steps {
                break;
            }
            let block = selection.pick_block(&self.blocks, step - 1);
            let width = effective_width(merge_width, running.outputs().len(), block.inputs().len());
            let block_inputs = selection.pick(block.inputs(), width);
            let running_outputs = selection.pick(running.outputs(), width);
            // A duplicate input pick keeps only its last pairing, merging
            // fewer pairs than requested.
            let mapping: BTreeMap<NodeId, NodeId> =
                block_inputs.into_iter().zip(running_outputs).collect();

            let (composed, _) = running.compose(block, &mapping)?;
            running = composed;

            if requested.contains(&step) {
                sequence.node_counts.push(running.node_count());
                sequence.graphs.push(running.clone());
            }
        }

        if let Some(caps) = input_caps {
            for (graph, &cap) in sequence.graphs.iter_mut().zip(caps) {
                *graph = truncate_inputs(graph, cap, &mut selection);
            }
        }

        Ok(sequence)
    }
}

/// The number of boundary pairs merged in one step: the requested width
/// clamped to what both operands can offer.
fn effective_width(requested: Option<usize>, outputs: usize, inputs: usize) -> usize {
    let min_io = outputs.min(inputs);
    match requested {
        Some(width) if width < min_io => width,
        _ => min_io,
    }
}

/// Returns a copy of `og` whose input boundary holds at most `cap` entries.
///
/// Demoted nodes stay in the graph and keep their measurement; they merely
/// cease to be boundary inputs. Deterministic selection drops entries from
/// the front of the list (the tail is kept); uniform selection removes a
/// with-replacement sample, so a duplicate pick removes a node once and is
/// otherwise ignored, leaving more than `cap` inputs but never fewer.
pub fn truncate_inputs(og: &OpenGraph, cap: usize, selection: &mut Selection) -> OpenGraph {
    let excess = og.inputs().len().saturating_sub(cap);
    if excess == 0 {
        return og.clone();
    }
    let victims = selection.pick(og.inputs(), excess);
    let mut inputs = og.inputs().to_vec();
    for victim in victims {
        if let Some(position) = inputs.iter().position(|&node| node == victim) {
            inputs.remove(position);
        }
    }
    og.with_inputs(inputs)
}
