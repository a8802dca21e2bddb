//! Busbar - single-line diagram energization engine
//!
//! Given a diagram of sources, breakers, buses, loads, and AC/DC converters
//! joined by conductors, this library computes which terminals carry power,
//! which signal kinds reach them, and which conductors are therefore hot.
//!
//! # Quick Start
//!
//! ```no_run
//! use busbar::{BusbarCore, EngineOptions};
//! use std::path::Path;
//!
//! let result = BusbarCore::energize_file(
//!     Path::new("feeder.json"),
//!     &EngineOptions::default(),
//! ).unwrap();
//!
//! for (conductor, kind) in result.energization.conductor_kinds() {
//!     println!("{}: {}", conductor, kind);
//! }
//! ```
//!
//! # Features
//!
//! - **Pin graph**: per-device conduction rules over device terminals
//! - **Propagation**: multi-label AC/DC reachability from every source
//! - **Exchange**: versioned JSON import/export with strict shape checks
//! - **Session**: value-based editing with memoized energization

pub mod core;
pub mod exchange;
pub mod network;
pub mod session;

// Re-export main types
pub use crate::core::{
    discover_diagram_files, BusbarCore, BusbarError, EnergizationStats, EngineOptions,
    EvaluationResult,
};
pub use exchange::{ExchangeError, FORMAT_VERSION};
pub use network::{
    Conductor, ConductorFault, Device, DeviceKind, Diagram, Edit, Energization, KindSet,
    MixedKindPolicy, PinId, SignalKind,
};
pub use session::Session;

/// Parse a diagram exchange document (convenience wrapper).
pub fn parse_diagram(content: &str) -> Result<Diagram, BusbarError> {
    Ok(exchange::import_str(content)?)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BusbarCore, BusbarError, Conductor, Device, Diagram, Edit, Energization, EngineOptions,
        MixedKindPolicy, PinId, Session, SignalKind,
    };
}
