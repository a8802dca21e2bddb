//! Signal Propagation
//!
//! Multi-label breadth-first search over `(pin, kind)` states, seeded at
//! every source output. A state is queued at most once, so the search is
//! bounded by `pins x kinds` and converges on cyclic topologies.

use std::collections::{BTreeMap, VecDeque};

use super::graph::PinGraph;
use super::schema::{KindSet, PinId};

/// Signal kinds reaching each pin. Pins never reached are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reached {
    kinds: BTreeMap<PinId, KindSet>,
}

impl Reached {
    pub fn kinds(&self, pin: &PinId) -> KindSet {
        self.kinds.get(pin).copied().unwrap_or_default()
    }

    pub fn is_reached(&self, pin: &PinId) -> bool {
        !self.kinds(pin).is_empty()
    }

    /// Reached pins in sorted order
    pub fn pins(&self) -> impl Iterator<Item = (&PinId, KindSet)> {
        self.kinds.iter().map(|(pin, kinds)| (pin, *kinds))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub(crate) fn into_map(self) -> BTreeMap<PinId, KindSet> {
        self.kinds
    }
}

/// Compute the least fixed point of signal reachability over `graph`.
pub fn propagate(graph: &PinGraph) -> Reached {
    let mut reached = vec![KindSet::EMPTY; graph.pin_count()];
    let mut queue = VecDeque::new();

    for (pin, signal) in graph.sources() {
        if let Some(idx) = graph.index_of(pin) {
            if reached[idx.index()].insert(*signal) {
                queue.push_back((idx, *signal));
            }
        }
    }

    let mut visited = 0usize;
    while let Some((idx, incoming)) = queue.pop_front() {
        visited += 1;
        for (next, step) in graph.steps_from(idx) {
            let Some(outgoing) = step.fire(incoming) else {
                continue;
            };
            if reached[next.index()].insert(outgoing) {
                queue.push_back((next, outgoing));
            }
        }
    }

    let kinds: BTreeMap<PinId, KindSet> = reached
        .into_iter()
        .enumerate()
        .filter(|(_, kinds)| !kinds.is_empty())
        .filter_map(|(i, kinds)| {
            graph
                .pin_at(petgraph::graph::NodeIndex::new(i))
                .map(|pin| (pin.clone(), kinds))
        })
        .collect();

    tracing::debug!(
        "Propagation visited {} state(s), reached {} of {} pin(s)",
        visited,
        kinds.len(),
        graph.pin_count()
    );

    Reached { kinds }
}
