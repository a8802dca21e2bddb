//! Network Energization Engine
//!
//! This module turns a single-line diagram into a graph over device
//! terminals and propagates signal kinds from every source across it:
//! - Per-device internal conduction (breakers, buses, loads, converters)
//! - Multi-label reachability of AC/DC signals
//! - Derived device and conductor energization

pub mod schema;
pub mod graph;
pub mod propagate;
pub mod state;

// Re-export main types for convenience
pub use schema::*;
pub use graph::{PinGraph, Step};
pub use propagate::{propagate, Reached};
pub use state::{Energization, MixedKindPolicy};
