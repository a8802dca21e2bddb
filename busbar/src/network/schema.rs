//! Single-Line Diagram Data Types
//!
//! A diagram is a set of typed devices plus the conductors drawn between
//! their terminals. Diagrams are values: every edit returns a new
//! [`Diagram`] and leaves the original untouched, so the engine can always
//! treat its input as immutable.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};

use crate::core::BusbarError;

/// Kind of current carried by an energized terminal or conductor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalKind {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "DC")]
    Dc,
}

impl SignalKind {
    /// Every signal kind, in [`KindSet`] bit order.
    pub const ALL: [SignalKind; 2] = [SignalKind::Ac, SignalKind::Dc];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Ac => "AC",
            SignalKind::Dc => "DC",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small set of signal kinds, one bit per [`SignalKind::ALL`] entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    pub fn single(kind: SignalKind) -> Self {
        KindSet(kind.bit())
    }

    /// Add a kind; returns `true` if the set grew.
    pub fn insert(&mut self, kind: SignalKind) -> bool {
        let before = self.0;
        self.0 |= kind.bit();
        self.0 != before
    }

    pub fn contains(&self, kind: SignalKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(self, other: KindSet) -> KindSet {
        KindSet(self.0 | other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = SignalKind> {
        SignalKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<SignalKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = SignalKind>>(iter: I) -> Self {
        let mut set = KindSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl Serialize for KindSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Device type and its type-specific attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Power source emitting a declared signal kind on its only terminal
    Source { signal: SignalKind },
    /// Two-terminal switch, conducting only while closed
    Breaker { closed: bool },
    Bus,
    Load,
    /// AC on terminal 0 in, DC on terminal 1 out
    Rectifier,
    /// DC on terminal 0 in, AC on terminal 1 out
    Inverter,
}

impl DeviceKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            DeviceKind::Source { .. } => "source",
            DeviceKind::Breaker { .. } => "breaker",
            DeviceKind::Bus => "bus",
            DeviceKind::Load => "load",
            DeviceKind::Rectifier => "rectifier",
            DeviceKind::Inverter => "inverter",
        }
    }

    pub fn terminal_count(&self) -> usize {
        match self {
            DeviceKind::Source { .. } => 1,
            _ => 2,
        }
    }

    /// Static signal role of a converter terminal; `None` for every other
    /// device type and for out-of-range indices.
    pub fn terminal_role(&self, terminal: usize) -> Option<SignalKind> {
        match (self, terminal) {
            (DeviceKind::Rectifier, 0) | (DeviceKind::Inverter, 1) => Some(SignalKind::Ac),
            (DeviceKind::Rectifier, 1) | (DeviceKind::Inverter, 0) => Some(SignalKind::Dc),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Canvas position; carried for collaborators, ignored by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A device placed on the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    pub kind: DeviceKind,
    pub label: Option<String>,
    pub position: Option<Position>,
}

impl Device {
    pub fn new(id: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            position: None,
        }
    }

    pub fn source(id: impl Into<String>, signal: SignalKind) -> Self {
        Self::new(id, DeviceKind::Source { signal })
    }

    pub fn breaker(id: impl Into<String>, closed: bool) -> Self {
        Self::new(id, DeviceKind::Breaker { closed })
    }

    pub fn bus(id: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Bus)
    }

    pub fn load(id: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Load)
    }

    pub fn rectifier(id: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Rectifier)
    }

    pub fn inverter(id: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Inverter)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Every terminal of this device, in index order.
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        (0..self.kind.terminal_count()).map(move |t| PinId::new(&self.id, t))
    }
}

/// A device terminal, the unit the propagation graph is built over
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId {
    pub device: String,
    pub terminal: usize,
}

impl PinId {
    pub fn new(device: impl Into<String>, terminal: usize) -> Self {
        Self {
            device: device.into(),
            terminal,
        }
    }
}

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.device, self.terminal)
    }
}

/// A user-drawn wire joining two terminals. Endpoint order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conductor {
    pub id: String,
    pub from: PinId,
    pub to: PinId,
}

impl Conductor {
    pub fn new(id: impl Into<String>, from: PinId, to: PinId) -> Self {
        Self {
            id: id.into(),
            from,
            to,
        }
    }

    /// Wire two terminals under a freshly generated id.
    pub fn between(from: PinId, to: PinId) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), from, to)
    }

    pub fn endpoints(&self) -> [&PinId; 2] {
        [&self.from, &self.to]
    }

    pub fn touches(&self, device: &str) -> bool {
        self.from.device == device || self.to.device == device
    }
}

/// Why a conductor is left out of the pin graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "fault", rename_all = "camelCase")]
pub enum ConductorFault {
    #[serde(rename_all = "camelCase")]
    UnknownDevice { conductor: String, device: String },
    #[serde(rename_all = "camelCase")]
    TerminalOutOfRange {
        conductor: String,
        device: String,
        terminal: usize,
        terminal_count: usize,
    },
}

impl ConductorFault {
    pub fn conductor(&self) -> &str {
        match self {
            ConductorFault::UnknownDevice { conductor, .. }
            | ConductorFault::TerminalOutOfRange { conductor, .. } => conductor,
        }
    }
}

impl std::fmt::Display for ConductorFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConductorFault::UnknownDevice { conductor, device } => {
                write!(f, "conductor {} references unknown device {}", conductor, device)
            }
            ConductorFault::TerminalOutOfRange {
                conductor,
                device,
                terminal,
                terminal_count,
            } => write!(
                f,
                "conductor {} references terminal {} of {} which has {} terminal(s)",
                conductor, terminal, device, terminal_count
            ),
        }
    }
}

/// A single whole-value edit of a diagram
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    AddDevice(Device),
    /// Removes the device and every conductor attached to it
    RemoveDevice(String),
    AddConductor(Conductor),
    RemoveConductor(String),
    ToggleBreaker(String),
    SetBreaker { id: String, closed: bool },
    Rename { id: String, label: Option<String> },
    Move { id: String, x: f64, y: f64 },
}

/// Devices plus conductors, versioned as a whole unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    devices: Vec<Device>,
    conductors: Vec<Conductor>,
}

impl Diagram {
    /// Build a diagram, rejecting duplicate device or conductor ids.
    ///
    /// Conductor endpoints are not checked here; a wire pointing at a
    /// missing device is tolerated and left out when the pin graph is built.
    pub fn new(devices: Vec<Device>, conductors: Vec<Conductor>) -> Result<Self, BusbarError> {
        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(device.id.as_str()) {
                return Err(BusbarError::DuplicateId(device.id.clone()));
            }
        }
        let mut seen = HashSet::new();
        for conductor in &conductors {
            if !seen.insert(conductor.id.as_str()) {
                return Err(BusbarError::DuplicateId(conductor.id.clone()));
            }
        }
        Ok(Self {
            devices,
            conductors,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn conductors(&self) -> &[Conductor] {
        &self.conductors
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn conductor(&self, id: &str) -> Option<&Conductor> {
        self.conductors.iter().find(|c| c.id == id)
    }

    /// Structural faults of every conductor, in conductor order.
    pub fn validate(&self) -> Vec<ConductorFault> {
        let index = self.device_index();
        self.conductors
            .iter()
            .filter_map(|c| conductor_fault(&index, c))
            .collect()
    }

    pub(crate) fn device_index(&self) -> HashMap<&str, &Device> {
        self.devices.iter().map(|d| (d.id.as_str(), d)).collect()
    }

    /// Apply an edit, producing the next diagram value.
    pub fn apply(&self, edit: &Edit) -> Result<Diagram, BusbarError> {
        match edit {
            Edit::AddDevice(device) => self.with_device(device.clone()),
            Edit::RemoveDevice(id) => self.without_device(id),
            Edit::AddConductor(conductor) => self.with_conductor(conductor.clone()),
            Edit::RemoveConductor(id) => self.without_conductor(id),
            Edit::ToggleBreaker(id) => self.with_breaker_toggled(id),
            Edit::SetBreaker { id, closed } => self.with_breaker_state(id, *closed),
            Edit::Rename { id, label } => self.renamed(id, label.clone()),
            Edit::Move { id, x, y } => self.moved(id, *x, *y),
        }
    }

    pub fn with_device(&self, device: Device) -> Result<Diagram, BusbarError> {
        if self.device(&device.id).is_some() {
            return Err(BusbarError::DuplicateId(device.id));
        }
        let mut next = self.clone();
        next.devices.push(device);
        Ok(next)
    }

    pub fn without_device(&self, id: &str) -> Result<Diagram, BusbarError> {
        if self.device(id).is_none() {
            return Err(BusbarError::UnknownDevice(id.to_string()));
        }
        Ok(Diagram {
            devices: self.devices.iter().filter(|d| d.id != id).cloned().collect(),
            conductors: self
                .conductors
                .iter()
                .filter(|c| !c.touches(id))
                .cloned()
                .collect(),
        })
    }

    pub fn with_conductor(&self, conductor: Conductor) -> Result<Diagram, BusbarError> {
        if self.conductor(&conductor.id).is_some() {
            return Err(BusbarError::DuplicateId(conductor.id));
        }
        let mut next = self.clone();
        next.conductors.push(conductor);
        Ok(next)
    }

    pub fn without_conductor(&self, id: &str) -> Result<Diagram, BusbarError> {
        if self.conductor(id).is_none() {
            return Err(BusbarError::UnknownConductor(id.to_string()));
        }
        let mut next = self.clone();
        next.conductors.retain(|c| c.id != id);
        Ok(next)
    }

    pub fn with_breaker_toggled(&self, id: &str) -> Result<Diagram, BusbarError> {
        match self.device(id).map(|d| d.kind) {
            Some(DeviceKind::Breaker { closed }) => self.with_breaker_state(id, !closed),
            Some(_) => Err(BusbarError::NotABreaker(id.to_string())),
            None => Err(BusbarError::UnknownDevice(id.to_string())),
        }
    }

    pub fn with_breaker_state(&self, id: &str, closed: bool) -> Result<Diagram, BusbarError> {
        self.with_device_updated(id, |device| match device.kind {
            DeviceKind::Breaker { .. } => {
                device.kind = DeviceKind::Breaker { closed };
                Ok(())
            }
            _ => Err(BusbarError::NotABreaker(device.id.clone())),
        })
    }

    pub fn renamed(&self, id: &str, label: Option<String>) -> Result<Diagram, BusbarError> {
        self.with_device_updated(id, |device| {
            device.label = label;
            Ok(())
        })
    }

    pub fn moved(&self, id: &str, x: f64, y: f64) -> Result<Diagram, BusbarError> {
        self.with_device_updated(id, |device| {
            device.position = Some(Position::new(x, y));
            Ok(())
        })
    }

    fn with_device_updated<F>(&self, id: &str, update: F) -> Result<Diagram, BusbarError>
    where
        F: FnOnce(&mut Device) -> Result<(), BusbarError>,
    {
        let mut next = self.clone();
        let device = next
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BusbarError::UnknownDevice(id.to_string()))?;
        update(device)?;
        Ok(next)
    }
}

pub(crate) fn conductor_fault(
    index: &HashMap<&str, &Device>,
    conductor: &Conductor,
) -> Option<ConductorFault> {
    conductor.endpoints().into_iter().find_map(|pin| {
        let Some(device) = index.get(pin.device.as_str()) else {
            return Some(ConductorFault::UnknownDevice {
                conductor: conductor.id.clone(),
                device: pin.device.clone(),
            });
        };
        let terminal_count = device.kind.terminal_count();
        (pin.terminal >= terminal_count).then(|| ConductorFault::TerminalOutOfRange {
            conductor: conductor.id.clone(),
            device: pin.device.clone(),
            terminal: pin.terminal,
            terminal_count,
        })
    })
}
