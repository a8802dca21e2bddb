//! Derived energization state
//!
//! Collaborators read everything from an [`Energization`]; every query is a
//! lookup, nothing is recomputed per call.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use super::graph::PinGraph;
use super::propagate::Reached;
use super::schema::{ConductorFault, Diagram, KindSet, PinId, SignalKind};

/// How a conductor reached by more than one signal kind is classified.
///
/// This is a display rule, not a safety property. The ambiguous
/// conductors are always listed by [`Energization::mixed_conductors`] for
/// callers that want to flag them instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MixedKindPolicy {
    /// Any DC at either endpoint makes the conductor DC
    #[default]
    PreferDc,
    /// Any AC at either endpoint makes the conductor AC
    PreferAc,
}

impl MixedKindPolicy {
    fn preferred(self) -> SignalKind {
        match self {
            MixedKindPolicy::PreferDc => SignalKind::Dc,
            MixedKindPolicy::PreferAc => SignalKind::Ac,
        }
    }

    /// Classify a conductor from the kinds reaching its two endpoints.
    /// Returns `None` when nothing reaches either side.
    pub fn classify(self, a: KindSet, b: KindSet) -> Option<SignalKind> {
        let union = a.union(b);
        if union.contains(self.preferred()) {
            Some(self.preferred())
        } else {
            union.iter().next()
        }
    }
}

/// Energized devices and conductors of one diagram value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Energization {
    energized_devices: BTreeSet<String>,
    energized_conductors: BTreeSet<String>,
    conductor_kinds: BTreeMap<String, SignalKind>,
    mixed_conductors: BTreeSet<String>,
    #[serde(serialize_with = "serialize_pin_kinds")]
    pin_kinds: BTreeMap<PinId, KindSet>,
    skipped_conductors: Vec<ConductorFault>,
}

fn serialize_pin_kinds<S: Serializer>(
    pins: &BTreeMap<PinId, KindSet>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(pins.iter().map(|(pin, kinds)| (pin.to_string(), kinds)))
}

impl Energization {
    /// Derive device and conductor state from a propagation result.
    pub fn derive(
        diagram: &Diagram,
        graph: &PinGraph,
        reached: Reached,
        policy: MixedKindPolicy,
    ) -> Self {
        let mut skipped_conductors = graph.skipped().to_vec();
        skipped_conductors.sort_by(|a, b| a.conductor().cmp(b.conductor()));
        let skipped: BTreeSet<&str> = skipped_conductors.iter().map(|f| f.conductor()).collect();

        let pin_kinds = reached.into_map();
        let kinds_at = |pin: &PinId| pin_kinds.get(pin).copied().unwrap_or_default();

        let energized_devices: BTreeSet<String> = diagram
            .devices()
            .iter()
            .filter(|device| device.pins().any(|pin| !kinds_at(&pin).is_empty()))
            .map(|device| device.id.clone())
            .collect();

        let mut energized_conductors = BTreeSet::new();
        let mut conductor_kinds = BTreeMap::new();
        let mut mixed_conductors = BTreeSet::new();

        for conductor in diagram.conductors() {
            if skipped.contains(conductor.id.as_str()) {
                continue;
            }
            let from = kinds_at(&conductor.from);
            let to = kinds_at(&conductor.to);
            if from.is_empty() || to.is_empty() {
                continue;
            }
            energized_conductors.insert(conductor.id.clone());
            if from.union(to).len() > 1 {
                mixed_conductors.insert(conductor.id.clone());
            }
            if let Some(kind) = policy.classify(from, to) {
                conductor_kinds.insert(conductor.id.clone(), kind);
            }
        }

        Self {
            energized_devices,
            energized_conductors,
            conductor_kinds,
            mixed_conductors,
            pin_kinds,
            skipped_conductors,
        }
    }

    pub fn is_device_energized(&self, id: &str) -> bool {
        self.energized_devices.contains(id)
    }

    pub fn is_conductor_energized(&self, id: &str) -> bool {
        self.energized_conductors.contains(id)
    }

    /// Classification of an energized conductor; `None` when it is dead.
    pub fn conductor_signal(&self, id: &str) -> Option<SignalKind> {
        self.conductor_kinds.get(id).copied()
    }

    pub fn pin_kinds(&self, pin: &PinId) -> KindSet {
        self.pin_kinds.get(pin).copied().unwrap_or_default()
    }

    pub fn energized_devices(&self) -> &BTreeSet<String> {
        &self.energized_devices
    }

    pub fn energized_conductors(&self) -> &BTreeSet<String> {
        &self.energized_conductors
    }

    pub fn conductor_kinds(&self) -> &BTreeMap<String, SignalKind> {
        &self.conductor_kinds
    }

    /// Energized conductors with more than one signal kind at their endpoints
    pub fn mixed_conductors(&self) -> &BTreeSet<String> {
        &self.mixed_conductors
    }

    pub fn skipped_conductors(&self) -> &[ConductorFault] {
        &self.skipped_conductors
    }

    /// Number of energized conductors classified as `kind`
    pub fn count_kind(&self, kind: SignalKind) -> usize {
        self.conductor_kinds.values().filter(|k| **k == kind).count()
    }
}
