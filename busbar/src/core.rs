//! Core energization API shared by the CLI and any editor front end.
//! No UI or persistence state lives here.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::exchange::{self, ExchangeError};
use crate::network::{propagate, Diagram, Energization, MixedKindPolicy, PinGraph, SignalKind};

#[derive(Debug, thiserror::Error)]
pub enum BusbarError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
    #[error("Unknown device: {0}")]
    UnknownDevice(String),
    #[error("Unknown conductor: {0}")]
    UnknownConductor(String),
    #[error("Device {0} is not a breaker")]
    NotABreaker(String),
}

/// Options for energization runs (CLI or editor).
#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    pub mixed_kind: MixedKindPolicy,
}

/// Per-file energization result with counts.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub file: PathBuf,
    pub energization: Energization,
    pub stats: EnergizationStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergizationStats {
    pub devices: usize,
    pub energized_devices: usize,
    pub conductors: usize,
    pub energized_conductors: usize,
    pub ac_conductors: usize,
    pub dc_conductors: usize,
    pub mixed_conductors: usize,
    pub skipped_conductors: usize,
}

impl EnergizationStats {
    pub fn collect(diagram: &Diagram, energization: &Energization) -> Self {
        Self {
            devices: diagram.devices().len(),
            energized_devices: energization.energized_devices().len(),
            conductors: diagram.conductors().len(),
            energized_conductors: energization.energized_conductors().len(),
            ac_conductors: energization.count_kind(SignalKind::Ac),
            dc_conductors: energization.count_kind(SignalKind::Dc),
            mixed_conductors: energization.mixed_conductors().len(),
            skipped_conductors: energization.skipped_conductors().len(),
        }
    }
}

impl EvaluationResult {
    pub fn has_skipped(&self) -> bool {
        self.stats.skipped_conductors > 0
    }

    pub fn is_dead(&self) -> bool {
        self.stats.energized_devices == 0
    }
}

/// Recursively discover diagram files (`*.json`) in a directory.
pub fn discover_diagram_files(dir: &Path) -> Result<Vec<PathBuf>, BusbarError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), BusbarError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "node_modules" || name == "target" {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    Ok(())
}

/// Core energization API.
pub struct BusbarCore;

impl BusbarCore {
    /// Compute energization for a diagram value. Pure: the diagram is only
    /// read, and no state survives between calls.
    pub fn energize(diagram: &Diagram, options: &EngineOptions) -> Energization {
        let graph = PinGraph::build(diagram);
        let reached = propagate(&graph);
        let energization = Energization::derive(diagram, &graph, reached, options.mixed_kind);
        tracing::debug!(
            "Energized {} of {} device(s), {} of {} conductor(s)",
            energization.energized_devices().len(),
            diagram.devices().len(),
            energization.energized_conductors().len(),
            diagram.conductors().len()
        );
        energization
    }

    /// Load and energize a single diagram file.
    pub fn energize_file(
        path: &Path,
        options: &EngineOptions,
    ) -> Result<EvaluationResult, BusbarError> {
        let diagram = exchange::import_file(path)?;
        Ok(Self::evaluate(path, &diagram, options))
    }

    fn evaluate(path: &Path, diagram: &Diagram, options: &EngineOptions) -> EvaluationResult {
        let energization = Self::energize(diagram, options);
        let stats = EnergizationStats::collect(diagram, &energization);
        EvaluationResult {
            file: path.to_path_buf(),
            energization,
            stats,
        }
    }

    /// Energize every diagram file in a directory. JSON files that are not
    /// busbar documents are skipped; a busbar document that fails to import
    /// fails the whole run.
    pub fn energize_project(
        dir: &Path,
        options: &EngineOptions,
    ) -> Result<Vec<EvaluationResult>, BusbarError> {
        let files = discover_diagram_files(dir)?;
        tracing::info!("Found {} JSON file(s) in {}", files.len(), dir.display());

        let mut results = Vec::new();
        for path in &files {
            let content = std::fs::read_to_string(path)?;
            if !exchange::is_diagram_document(&content) {
                tracing::warn!("Skipping {}: not a busbar diagram", path.display());
                continue;
            }
            let diagram = exchange::import_str(&content)?;
            results.push(Self::evaluate(path, &diagram, options));
        }
        Ok(results)
    }
}
