//! Editing session
//!
//! Holds the diagram currently shown by an editor and a memoized
//! energization for it. Every change swaps in a new diagram value; failed
//! edits and rejected imports leave the active diagram as it was.

use std::path::Path;

use crate::core::{BusbarCore, BusbarError, EngineOptions};
use crate::exchange;
use crate::network::{Diagram, Edit, Energization};

#[derive(Debug, Clone, Default)]
pub struct Session {
    diagram: Diagram,
    revision: u64,
    options: EngineOptions,
    cached: Option<Energization>,
    computations: usize,
}

impl Session {
    pub fn new(diagram: Diagram) -> Self {
        Self::with_options(diagram, EngineOptions::default())
    }

    pub fn with_options(diagram: Diagram, options: EngineOptions) -> Self {
        Self {
            diagram,
            revision: 0,
            options,
            cached: None,
            computations: 0,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Bumped every time the active diagram value changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// How many times energization has actually been computed
    pub fn computation_count(&self) -> usize {
        self.computations
    }

    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
        self.cached = None;
    }

    /// Make `diagram` the active value. Replacing with an equal value keeps
    /// the memoized energization.
    pub fn replace(&mut self, diagram: Diagram) {
        if diagram == self.diagram {
            return;
        }
        self.diagram = diagram;
        self.revision += 1;
        self.cached = None;
    }

    pub fn apply(&mut self, edit: &Edit) -> Result<(), BusbarError> {
        let next = self.diagram.apply(edit)?;
        self.replace(next);
        Ok(())
    }

    /// Energization of the active diagram, computed at most once per revision.
    pub fn energization(&mut self) -> &Energization {
        let revision = self.revision;
        let diagram = &self.diagram;
        let options = &self.options;
        let computations = &mut self.computations;
        self.cached.get_or_insert_with(|| {
            *computations += 1;
            tracing::debug!("Recomputing energization for revision {}", revision);
            BusbarCore::energize(diagram, options)
        })
    }

    pub fn import_json(&mut self, payload: &str) -> Result<(), BusbarError> {
        let diagram = exchange::import_str(payload)?;
        self.replace(diagram);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, BusbarError> {
        Ok(exchange::export_string(&self.diagram)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), BusbarError> {
        exchange::export_file(&self.diagram, path)?;
        tracing::info!("Saved diagram to {}", path.display());
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> Result<(), BusbarError> {
        let diagram = exchange::import_file(path)?;
        self.replace(diagram);
        Ok(())
    }
}
