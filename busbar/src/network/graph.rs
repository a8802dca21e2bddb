//! Pin Graph Implementation
//!
//! Turns a [`Diagram`] into a directed petgraph over device terminals.
//! Every conductor contributes a pair of opposing `Wire` edges; every device
//! contributes the internal edges listed by [`DeviceKind::internal_steps`].

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::schema::*;

/// One structural step between two pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// User-drawn conductor; signal unchanged
    Wire,
    /// Pass-through inside a bus, load, or closed breaker; signal unchanged
    Internal,
    /// Converter edge: fires only for `requires`, and emits `emits`
    Convert {
        requires: SignalKind,
        emits: SignalKind,
    },
}

impl Step {
    /// Signal leaving this step for a given incoming signal, or `None` when
    /// the step does not fire.
    pub fn fire(self, incoming: SignalKind) -> Option<SignalKind> {
        match self {
            Step::Wire | Step::Internal => Some(incoming),
            Step::Convert { requires, emits } => (incoming == requires).then_some(emits),
        }
    }
}

impl DeviceKind {
    /// Internal conduction of this device as `(from, to, step)` terminal
    /// triples. Missing reverse entries mean that direction never conducts.
    pub fn internal_steps(&self) -> Vec<(usize, usize, Step)> {
        match *self {
            DeviceKind::Source { .. } | DeviceKind::Breaker { closed: false } => Vec::new(),
            DeviceKind::Breaker { closed: true } | DeviceKind::Bus | DeviceKind::Load => {
                vec![(0, 1, Step::Internal), (1, 0, Step::Internal)]
            }
            DeviceKind::Rectifier => vec![(
                0,
                1,
                Step::Convert {
                    requires: SignalKind::Ac,
                    emits: SignalKind::Dc,
                },
            )],
            DeviceKind::Inverter => vec![(
                0,
                1,
                Step::Convert {
                    requires: SignalKind::Dc,
                    emits: SignalKind::Ac,
                },
            )],
        }
    }
}

/// Directed graph of device terminals
#[derive(Debug, Clone)]
pub struct PinGraph {
    graph: DiGraph<PinId, Step>,

    /// Index mapping: pin -> node index
    pin_indices: HashMap<PinId, NodeIndex>,

    /// Source output pins with their declared signal
    sources: Vec<(PinId, SignalKind)>,

    /// Conductors left out because an endpoint is malformed
    skipped: Vec<ConductorFault>,
}

impl PinGraph {
    /// Build the pin graph for a diagram. Malformed conductors are excluded
    /// and reported through [`PinGraph::skipped`].
    pub fn build(diagram: &Diagram) -> Self {
        let mut pin_graph = Self {
            graph: DiGraph::new(),
            pin_indices: HashMap::new(),
            sources: Vec::new(),
            skipped: Vec::new(),
        };

        // Pass 1: terminals and internal conduction
        for device in diagram.devices() {
            let nodes: Vec<NodeIndex> = device.pins().map(|pin| pin_graph.add_pin(pin)).collect();
            for (from, to, step) in device.kind.internal_steps() {
                pin_graph.graph.add_edge(nodes[from], nodes[to], step);
            }
            if let DeviceKind::Source { signal } = device.kind {
                pin_graph.sources.push((PinId::new(&device.id, 0), signal));
            }
        }

        // Pass 2: conductors
        let index = diagram.device_index();
        for conductor in diagram.conductors() {
            if let Some(fault) = conductor_fault(&index, conductor) {
                tracing::warn!("Skipping conductor: {}", fault);
                pin_graph.skipped.push(fault);
                continue;
            }
            let a = pin_graph.pin_indices[&conductor.from];
            let b = pin_graph.pin_indices[&conductor.to];
            pin_graph.graph.add_edge(a, b, Step::Wire);
            pin_graph.graph.add_edge(b, a, Step::Wire);
        }

        tracing::debug!(
            "Built pin graph: {} pins, {} steps, {} skipped conductor(s)",
            pin_graph.pin_count(),
            pin_graph.step_count(),
            pin_graph.skipped.len()
        );

        pin_graph
    }

    fn add_pin(&mut self, pin: PinId) -> NodeIndex {
        let idx = self.graph.add_node(pin.clone());
        self.pin_indices.insert(pin, idx);
        idx
    }

    pub fn pin_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn step_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, pin: &PinId) -> bool {
        self.pin_indices.contains_key(pin)
    }

    pub fn sources(&self) -> &[(PinId, SignalKind)] {
        &self.sources
    }

    pub fn skipped(&self) -> &[ConductorFault] {
        &self.skipped
    }

    /// Pins directly reachable from `pin` in one step, in insertion order.
    pub fn neighbours(&self, pin: &PinId) -> Vec<(&PinId, Step)> {
        let Some(&idx) = self.pin_indices.get(pin) else {
            return Vec::new();
        };
        self.steps_from(idx)
            .filter_map(|(next, step)| self.graph.node_weight(next).map(|p| (p, step)))
            .collect()
    }

    pub(crate) fn index_of(&self, pin: &PinId) -> Option<NodeIndex> {
        self.pin_indices.get(pin).copied()
    }

    pub(crate) fn pin_at(&self, idx: NodeIndex) -> Option<&PinId> {
        self.graph.node_weight(idx)
    }

    pub(crate) fn steps_from(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, Step)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex, Step)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target(), *edge.weight()))
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, target, step)| (target, step))
    }
}
