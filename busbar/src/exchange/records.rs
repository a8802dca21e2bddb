//! Diagram Exchange Records
//!
//! Serde shapes of the versioned JSON document passed between the editor,
//! local persistence, and import/export. Per-type attributes are optional at
//! the serde level and checked when converting to a [`Diagram`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExchangeError, FORMAT_VERSION};
use crate::network::{Conductor, Device, DeviceKind, Diagram, PinId, Position, SignalKind};

/// Top-level exchange document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,

    pub devices: Vec<DeviceRecord>,

    pub conductors: Vec<ConductorRecord>,
}

/// One device entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,

    #[serde(rename = "type")]
    pub device_type: String,

    /// Declared signal kind (sources only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalKind>,

    /// Breaker state (breakers only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// One conductor entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConductorRecord {
    pub id: String,
    pub from_device: String,
    pub from_port: usize,
    pub to_device: String,
    pub to_port: usize,
}

impl DeviceRecord {
    pub fn from_device(device: &Device) -> Self {
        let (signal, closed) = match device.kind {
            DeviceKind::Source { signal } => (Some(signal), None),
            DeviceKind::Breaker { closed } => (None, Some(closed)),
            _ => (None, None),
        };
        Self {
            id: device.id.clone(),
            device_type: device.kind.type_name().to_string(),
            signal,
            closed,
            label: device.label.clone(),
            x: device.position.map(|p| p.x),
            y: device.position.map(|p| p.y),
        }
    }

    pub fn to_device(&self) -> Result<Device, ExchangeError> {
        let kind = match self.device_type.as_str() {
            "source" => DeviceKind::Source {
                signal: self.signal.ok_or_else(|| {
                    ExchangeError::MissingField(format!("signal (source {})", self.id))
                })?,
            },
            "breaker" => DeviceKind::Breaker {
                closed: self.closed.ok_or_else(|| {
                    ExchangeError::MissingField(format!("closed (breaker {})", self.id))
                })?,
            },
            "bus" => DeviceKind::Bus,
            "load" => DeviceKind::Load,
            "rectifier" => DeviceKind::Rectifier,
            "inverter" => DeviceKind::Inverter,
            other => {
                return Err(ExchangeError::InvalidData(format!(
                    "unknown device type '{}' for {}",
                    other, self.id
                )))
            }
        };
        let position = match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ExchangeError::MissingField(format!("y (device {})", self.id)))
            }
            (None, Some(_)) => {
                return Err(ExchangeError::MissingField(format!("x (device {})", self.id)))
            }
        };
        Ok(Device {
            id: self.id.clone(),
            kind,
            label: self.label.clone(),
            position,
        })
    }
}

impl ConductorRecord {
    pub fn from_conductor(conductor: &Conductor) -> Self {
        Self {
            id: conductor.id.clone(),
            from_device: conductor.from.device.clone(),
            from_port: conductor.from.terminal,
            to_device: conductor.to.device.clone(),
            to_port: conductor.to.terminal,
        }
    }

    pub fn to_conductor(&self) -> Conductor {
        Conductor::new(
            self.id.clone(),
            PinId::new(&self.from_device, self.from_port),
            PinId::new(&self.to_device, self.to_port),
        )
    }
}

impl DiagramDocument {
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            exported_at: Some(Utc::now()),
            devices: diagram.devices().iter().map(DeviceRecord::from_device).collect(),
            conductors: diagram
                .conductors()
                .iter()
                .map(ConductorRecord::from_conductor)
                .collect(),
        }
    }

    pub fn to_diagram(&self) -> Result<Diagram, ExchangeError> {
        if self.version != FORMAT_VERSION {
            return Err(ExchangeError::UnsupportedVersion(self.version.clone()));
        }
        let devices = self
            .devices
            .iter()
            .map(DeviceRecord::to_device)
            .collect::<Result<Vec<_>, _>>()?;
        let conductors = self.conductors.iter().map(ConductorRecord::to_conductor).collect();
        Diagram::new(devices, conductors).map_err(|e| ExchangeError::InvalidData(e.to_string()))
    }
}
