//! Diagram Exchange Module
//!
//! Reads and writes the versioned JSON exchange document used by the
//! editor's import/export and local persistence paths.
//!
//! Imports are strict about shape: a payload without a `devices` or
//! `conductors` array, with an unknown device type, or with a different
//! version tag is rejected rather than coerced. Conductors that point at
//! missing devices are accepted here and left out by the pin graph builder.

pub mod records;

use std::path::Path;
use thiserror::Error;

use crate::network::Diagram;
pub use records::{ConductorRecord, DeviceRecord, DiagramDocument};

/// Version tag written to and required from every document
pub const FORMAT_VERSION: &str = "busbar/1";

const FORMAT_FAMILY: &str = "busbar/";

/// Errors that can occur while importing or exporting a diagram
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Parse a diagram from an exchange document.
pub fn import_str(content: &str) -> Result<Diagram, ExchangeError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let object = value
        .as_object()
        .ok_or_else(|| ExchangeError::InvalidData("document must be a JSON object".to_string()))?;

    if !object.contains_key("version") {
        return Err(ExchangeError::MissingField("version".to_string()));
    }
    for list in ["devices", "conductors"] {
        match object.get(list) {
            None | Some(serde_json::Value::Null) => {
                return Err(ExchangeError::MissingField(list.to_string()))
            }
            Some(v) if !v.is_array() => {
                return Err(ExchangeError::InvalidData(format!("{} must be an array", list)))
            }
            Some(_) => {}
        }
    }

    let document: DiagramDocument = serde_json::from_value(value)?;
    let diagram = document.to_diagram()?;
    tracing::debug!(
        "Imported diagram: {} device(s), {} conductor(s)",
        diagram.devices().len(),
        diagram.conductors().len()
    );
    Ok(diagram)
}

/// Whether `content` looks like a busbar exchange document at all: a JSON
/// object whose `version` tag belongs to this format family. Unrelated JSON
/// files (package manifests, editor settings) answer `false`. A busbar
/// document with a bad shape or an unsupported version still answers `true`
/// so that importing it reports the real error.
pub fn is_diagram_document(content: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
        return false;
    };
    value
        .get("version")
        .and_then(|v| v.as_str())
        .is_some_and(|tag| tag.starts_with(FORMAT_FAMILY))
}

pub fn import_file(path: &Path) -> Result<Diagram, ExchangeError> {
    let content = std::fs::read_to_string(path)?;
    import_str(&content)
}

/// Serialize a diagram as a pretty-printed exchange document.
pub fn export_string(diagram: &Diagram) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string_pretty(&DiagramDocument::from_diagram(diagram))?)
}

pub fn export_file(diagram: &Diagram, path: &Path) -> Result<(), ExchangeError> {
    std::fs::write(path, export_string(diagram)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{DeviceKind, SignalKind};

    const FEEDER: &str = r#"{
        "version": "busbar/1",
        "devices": [
            { "id": "UTIL", "type": "source", "signal": "AC", "label": "Utility", "x": 40, "y": 80 },
            { "id": "BRK1", "type": "breaker", "closed": true },
            { "id": "LOAD1", "type": "load", "editorOnly": "ignored" }
        ],
        "conductors": [
            { "id": "w1", "fromDevice": "UTIL", "fromPort": 0, "toDevice": "BRK1", "toPort": 0 },
            { "id": "w2", "fromDevice": "BRK1", "fromPort": 1, "toDevice": "LOAD1", "toPort": 0 }
        ]
    }"#;

    #[test]
    fn test_import_feeder() {
        let diagram = import_str(FEEDER).unwrap();
        assert_eq!(diagram.devices().len(), 3);
        assert_eq!(diagram.conductors().len(), 2);

        let util = diagram.device("UTIL").unwrap();
        assert_eq!(util.kind, DeviceKind::Source { signal: SignalKind::Ac });
        assert_eq!(util.label.as_deref(), Some("Utility"));
        assert!(util.position.is_some());
        assert_eq!(
            diagram.device("BRK1").unwrap().kind,
            DeviceKind::Breaker { closed: true }
        );
    }

    #[test]
    fn test_missing_conductors_rejected() {
        let payload = r#"{ "version": "busbar/1", "devices": [] }"#;
        let err = import_str(payload).unwrap_err();
        assert!(matches!(err, ExchangeError::MissingField(ref f) if f == "conductors"));
    }

    #[test]
    fn test_missing_devices_rejected() {
        let payload = r#"{ "version": "busbar/1", "devices": null, "conductors": [] }"#;
        assert!(matches!(
            import_str(payload),
            Err(ExchangeError::MissingField(ref f)) if f == "devices"
        ));
    }

    #[test]
    fn test_non_array_list_rejected() {
        let payload = r#"{ "version": "busbar/1", "devices": {}, "conductors": [] }"#;
        assert!(matches!(import_str(payload), Err(ExchangeError::InvalidData(_))));
    }

    #[test]
    fn test_version_checked() {
        let payload = r#"{ "version": "busbar/0", "devices": [], "conductors": [] }"#;
        assert!(matches!(
            import_str(payload),
            Err(ExchangeError::UnsupportedVersion(ref v)) if v == "busbar/0"
        ));
        let payload = r#"{ "devices": [], "conductors": [] }"#;
        assert!(matches!(import_str(payload), Err(ExchangeError::MissingField(_))));
    }

    #[test]
    fn test_type_attributes_required() {
        let payload = r#"{ "version": "busbar/1",
            "devices": [{ "id": "S", "type": "source" }], "conductors": [] }"#;
        assert!(matches!(import_str(payload), Err(ExchangeError::MissingField(_))));

        let payload = r#"{ "version": "busbar/1",
            "devices": [{ "id": "B", "type": "breaker" }], "conductors": [] }"#;
        assert!(matches!(import_str(payload), Err(ExchangeError::MissingField(_))));

        let payload = r#"{ "version": "busbar/1",
            "devices": [{ "id": "T", "type": "transformer" }], "conductors": [] }"#;
        assert!(matches!(import_str(payload), Err(ExchangeError::InvalidData(_))));
    }

    #[test]
    fn test_duplicate_device_ids_rejected() {
        let payload = r#"{ "version": "busbar/1",
            "devices": [{ "id": "A", "type": "bus" }, { "id": "A", "type": "load" }],
            "conductors": [] }"#;
        assert!(matches!(import_str(payload), Err(ExchangeError::InvalidData(_))));
    }

    #[test]
    fn test_dangling_conductor_accepted() {
        let payload = r#"{ "version": "busbar/1",
            "devices": [{ "id": "A", "type": "bus" }],
            "conductors": [{ "id": "w", "fromDevice": "A", "fromPort": 0, "toDevice": "Z", "toPort": 3 }] }"#;
        let diagram = import_str(payload).unwrap();
        assert_eq!(diagram.validate().len(), 1);
    }

    #[test]
    fn test_diagram_document_detection() {
        assert!(is_diagram_document(FEEDER));
        assert!(is_diagram_document(r#"{ "version": "busbar/9" }"#));
        assert!(!is_diagram_document(r#"{ "name": "editor", "version": "1.0.0" }"#));
        assert!(!is_diagram_document(r#"{ "compilerOptions": {} }"#));
        assert!(!is_diagram_document("[1, 2, 3]"));
        assert!(!is_diagram_document("not json"));
    }

    #[test]
    fn test_half_position_rejected() {
        let only_x = r#"{ "version": "busbar/1",
            "devices": [{ "id": "A", "type": "bus", "x": 10 }], "conductors": [] }"#;
        match import_str(only_x) {
            Err(ExchangeError::MissingField(field)) => assert_eq!(field, "y (device A)"),
            other => panic!("expected missing y, got {:?}", other),
        }

        let only_y = r#"{ "version": "busbar/1",
            "devices": [{ "id": "B", "type": "load", "y": 5 }], "conductors": [] }"#;
        match import_str(only_y) {
            Err(ExchangeError::MissingField(field)) => assert_eq!(field, "x (device B)"),
            other => panic!("expected missing x, got {:?}", other),
        }

        let placed = import_str(FEEDER).unwrap();
        assert_eq!(
            placed.device("UTIL").and_then(|d| d.position),
            Some(crate::network::Position::new(40.0, 80.0))
        );
        assert_eq!(placed.device("BRK1").and_then(|d| d.position), None);
    }

    #[test]
    fn test_export_then_import_preserves_diagram() {
        let diagram = import_str(FEEDER).unwrap();
        let exported = export_string(&diagram).unwrap();

        assert!(exported.contains("\"exportedAt\""));
        assert!(exported.contains("\"fromDevice\""));
        assert_eq!(import_str(&exported).unwrap(), diagram);
    }
}
