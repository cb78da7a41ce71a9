use crate::surfaces::PanelSurface;
use std::collections::BTreeSet;

/// Names of panels that are currently open.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PanelState {
    open: BTreeSet<String>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_panels(&self) -> Vec<String> {
        self.open.iter().cloned().collect()
    }
}

impl PanelSurface for PanelState {
    fn open(&mut self, name: &str) {
        if self.open.insert(name.to_string()) {
            tracing::trace!(panel = name, "panel opened");
        }
    }

    fn close(&mut self, name: &str) {
        if self.open.remove(name) {
            tracing::trace!(panel = name, "panel closed");
        }
    }

    fn toggle(&mut self, name: &str) -> bool {
        if self.is_open(name) {
            self.close(name);
            false
        } else {
            self.open(name);
            true
        }
    }

    fn is_open(&self, name: &str) -> bool {
        self.open.contains(name)
    }
}
