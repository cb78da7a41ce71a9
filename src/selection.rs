use crate::surfaces::SelectionSurface;
use slint::{Model, VecModel};
use std::collections::BTreeSet;

/// Node and connection selection.
///
/// A plain click replaces the whole selection (nodes and connections); an
/// additive click toggles one item and leaves everything else alone.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    nodes: BTreeSet<i32>,
    connections: BTreeSet<i32>,
}

fn toggle(set: &mut BTreeSet<i32>, id: i32) {
    if !set.remove(&id) {
        set.insert(id);
    }
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a node based on interaction modifiers
    pub fn handle_interaction(&mut self, id: i32, shift_held: bool) {
        if shift_held {
            toggle(&mut self.nodes, id);
        } else {
            if self.nodes.len() == 1 && self.nodes.contains(&id) && self.connections.is_empty() {
                return;
            }
            self.clear();
            self.nodes.insert(id);
        }
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }

    /// Replace the selected nodes. Connections are deselected.
    ///
    /// Useful for box selection sync
    pub fn replace_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = i32>,
    {
        self.clear();
        self.nodes.extend(ids);
    }

    pub fn contains(&self, id: i32) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_connection(&self, id: i32) -> bool {
        self.connections.contains(&id)
    }

    /// Selected node ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.nodes.iter().copied()
    }

    /// Drop ids that no longer exist, e.g. after a node was removed.
    pub fn retain_nodes(&mut self, keep: impl Fn(i32) -> bool) {
        self.nodes.retain(|&id| keep(id));
    }

    pub fn retain_connections(&mut self, keep: impl Fn(i32) -> bool) {
        self.connections.retain(|&id| keep(id));
    }

    /// Sync the selected node ids to a Slint VecModel
    pub fn sync_to_model(&self, model: &VecModel<i32>) {
        model.set_vec(self.nodes.iter().copied().collect::<Vec<_>>());
    }

    /// Sync the selected node ids from any Slint Model (e.g. after box selection in the UI)
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = i32>) {
        self.replace_selection((0..model.row_count()).filter_map(|i| model.row_data(i)));
    }

    /// Number of selected nodes and connections
    pub fn len(&self) -> usize {
        self.nodes.len() + self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}

impl SelectionSurface for SelectionManager {
    fn select_node(&mut self, id: i32, additive: bool) {
        self.handle_interaction(id, additive);
    }

    fn select_connection(&mut self, id: i32, additive: bool) {
        if additive {
            toggle(&mut self.connections, id);
        } else {
            self.clear();
            self.connections.insert(id);
        }
    }

    fn replace_nodes(&mut self, ids: &[i32]) {
        self.replace_selection(ids.iter().copied());
    }

    fn clear_selection(&mut self) {
        self.clear();
    }

    fn deselect(&mut self, nodes: &[i32], connections: &[i32]) {
        self.retain_nodes(|id| !nodes.contains(&id));
        self.retain_connections(|id| !connections.contains(&id));
    }

    fn selected_nodes(&self) -> Vec<i32> {
        self.nodes.iter().copied().collect()
    }

    fn selected_connections(&self) -> Vec<i32> {
        self.connections.iter().copied().collect()
    }

    fn is_node_selected(&self, id: i32) -> bool {
        self.contains(id)
    }

    fn has_selection(&self) -> bool {
        !self.is_empty()
    }
}
