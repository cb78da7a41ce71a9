//! Undoable graph mutations.
//!
//! Each command stores what it needs to revert itself in its result data, so
//! `undo` never has to consult the payload. Commands that generate ids record
//! a payload with the ids filled in, so a redo recreates the same elements.

use super::payload::{self, check_fields, decode};
use crate::command::{Command, CommandCategory, CommandContext, CommandMetadata, CommandResult, ValidationResult};
use crate::config::EditorSettings;
use crate::error::{CommandError, SurfaceError};
use crate::surfaces::{ConnectionRecord, EditorSurfaces, GraphStore, NodePatch, NodeRecord, SelectionSurface};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

type Graph = Rc<RefCell<dyn GraphStore>>;
type Selection = Rc<RefCell<dyn SelectionSurface>>;

fn graph_metadata(name: &str, description: &str) -> CommandMetadata {
    CommandMetadata::new(name, CommandCategory::GraphMutation)
        .describe(description)
        .undoable()
        .mutates_graph()
}

/// Re-insert removed nodes and then their connections. On failure everything
/// re-inserted so far is removed again, leaving the graph as it was.
fn restore(graph: &Graph, nodes: Vec<NodeRecord>, connections: Vec<ConnectionRecord>) -> Result<(), CommandError> {
    let mut graph = graph.borrow_mut();
    let mut added_nodes = Vec::with_capacity(nodes.len());
    let mut added_connections = Vec::with_capacity(connections.len());

    let outcome = (|| -> Result<(), SurfaceError> {
        for node in nodes {
            let id = node.id;
            graph.add_node(node)?;
            added_nodes.push(id);
        }
        for connection in connections {
            let id = connection.id;
            graph.add_connection(connection)?;
            added_connections.push(id);
        }
        Ok(())
    })();

    if outcome.is_err() {
        for id in added_connections.into_iter().rev() {
            let _ = graph.remove_connection(id);
        }
        for id in added_nodes.into_iter().rev() {
            let _ = graph.remove_node(id);
        }
        tracing::debug!("partial restore reverted");
    }
    Ok(outcome?)
}

// ============================================================================
// node.add
// ============================================================================

pub struct AddNode {
    graph: Graph,
    selection: Selection,
    default_size: (f32, f32),
    metadata: CommandMetadata,
}

impl AddNode {
    pub fn new(surfaces: &EditorSurfaces, settings: &EditorSettings) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            selection: surfaces.selection.clone(),
            default_size: settings.default_node_size,
            metadata: graph_metadata("Add Node", "Add a node at a world position"),
        }
    }
}

#[async_trait(?Send)]
impl Command for AddNode {
    fn id(&self) -> &str {
        "node.add"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        let mut result = check_fields(payload, &[], &["x", "y"]);
        if payload::require_text(payload, "kind").is_err() {
            result = result.with_field_error("kind", "is required");
        }
        result
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let kind = payload::require_text(payload, "kind")?;
        let x = payload::require_float(payload, "x")?;
        let y = payload::require_float(payload, "y")?;

        let mut graph = self.graph.borrow_mut();
        let id = payload::int(payload, "id").unwrap_or_else(|| graph.next_node_id());
        let (width, height) = self.default_size;
        let mut node = NodeRecord::new(id, kind, x, y).with_size(width, height);
        if let Some(title) = payload::text(payload, "title") {
            node.title = title.to_string();
        }
        if let Some(data) = payload.get("data") {
            node.data = data.clone();
        }
        graph.add_node(node.clone())?;
        tracing::debug!(node = id, kind, "node added");

        let mut recorded = payload.clone();
        recorded["id"] = json!(id);
        Ok(CommandResult::ok()
            .with_data(json!({ "node": node }))
            .with_recorded_payload(recorded))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let node: NodeRecord = decode(result.data().and_then(|d| d.get("node")), "node")?;
        self.graph.borrow_mut().remove_node(node.id)?;
        self.selection.borrow_mut().deselect(&[node.id], &[]);
        Ok(CommandResult::ok())
    }
}

// ============================================================================
// node.remove
// ============================================================================

pub struct RemoveNode {
    graph: Graph,
    selection: Selection,
    metadata: CommandMetadata,
}

impl RemoveNode {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            selection: surfaces.selection.clone(),
            metadata: graph_metadata("Remove Node", "Remove a node and its connections"),
        }
    }
}

#[async_trait(?Send)]
impl Command for RemoveNode {
    fn id(&self) -> &str {
        "node.remove"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        check_fields(payload, &["id"], &[])
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let id = payload::require_int(payload, "id")?;
        let (node, connections) = self.graph.borrow_mut().remove_node(id)?;
        let connection_ids: Vec<i32> = connections.iter().map(|c| c.id).collect();
        self.selection.borrow_mut().deselect(&[id], &connection_ids);
        Ok(CommandResult::ok().with_data(json!({ "node": node, "connections": connections })))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let data = result.data();
        let node: NodeRecord = decode(data.and_then(|d| d.get("node")), "node")?;
        let connections: Vec<ConnectionRecord> =
            decode(data.and_then(|d| d.get("connections")), "connections")?;
        restore(&self.graph, vec![node], connections)?;
        Ok(CommandResult::ok())
    }
}

// ============================================================================
// node.update
// ============================================================================

pub struct UpdateNode {
    graph: Graph,
    metadata: CommandMetadata,
}

impl UpdateNode {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            metadata: graph_metadata("Update Node", "Change a node's title or data"),
        }
    }
}

#[async_trait(?Send)]
impl Command for UpdateNode {
    fn id(&self) -> &str {
        "node.update"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        let result = check_fields(payload, &["id"], &[]);
        if payload.get("title").is_none() && payload.get("data").is_none() {
            return result.with_field_error("title", "title or data is required");
        }
        result
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let id = payload::require_int(payload, "id")?;
        let patch = NodePatch {
            title: payload::text(payload, "title").map(str::to_string),
            data: payload.get("data").cloned(),
        };
        let previous = self.graph.borrow_mut().update_node(id, &patch)?;
        Ok(CommandResult::ok().with_data(json!({
            "id": id,
            "previous": NodePatch { title: Some(previous.title), data: Some(previous.data) },
        })))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let data = result.data();
        let id: i32 = decode(data.and_then(|d| d.get("id")), "node id")?;
        let previous: NodePatch = decode(data.and_then(|d| d.get("previous")), "previous state")?;
        self.graph.borrow_mut().update_node(id, &previous)?;
        Ok(CommandResult::ok())
    }
}

// ============================================================================
// node.move
// ============================================================================

/// Translate nodes by `dx, dy`.
///
/// Targets, in order of precedence: an explicit `ids` list; `node`, which
/// drags the whole selection when that node is part of it; the selection.
pub struct MoveNodes {
    graph: Graph,
    selection: Selection,
    metadata: CommandMetadata,
}

impl MoveNodes {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            selection: surfaces.selection.clone(),
            metadata: graph_metadata("Move Nodes", "Translate nodes"),
        }
    }

    fn targets(&self, payload: &Value) -> Vec<i32> {
        if let Some(ids) = payload::int_list(payload, "ids") {
            return ids;
        }
        let selection = self.selection.borrow();
        match payload::int(payload, "node") {
            Some(node) if !selection.is_node_selected(node) => vec![node],
            _ => selection.selected_nodes(),
        }
    }
}

#[async_trait(?Send)]
impl Command for MoveNodes {
    fn id(&self) -> &str {
        "node.move"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        check_fields(payload, &[], &["dx", "dy"])
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let dx = payload::require_float(payload, "dx")?;
        let dy = payload::require_float(payload, "dy")?;
        let ids = self.targets(payload);
        if ids.is_empty() {
            return Err(CommandError::execution("No nodes to move"));
        }

        let mut graph = self.graph.borrow_mut();
        if let Some(missing) = ids.iter().find(|&&id| graph.node(id).is_none()) {
            return Err(SurfaceError::NodeNotFound(*missing).into());
        }
        for &id in &ids {
            graph.move_node(id, dx, dy)?;
        }

        let moved = json!({ "ids": ids, "dx": dx, "dy": dy });
        Ok(CommandResult::ok().with_data(moved.clone()).with_recorded_payload(moved))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let data = result.data().cloned().unwrap_or(Value::Null);
        let ids = payload::int_list(&data, "ids").unwrap_or_default();
        let dx = payload::float(&data, "dx").unwrap_or_default();
        let dy = payload::float(&data, "dy").unwrap_or_default();
        let mut graph = self.graph.borrow_mut();
        for id in ids {
            graph.move_node(id, -dx, -dy)?;
        }
        Ok(CommandResult::ok())
    }
}

// ============================================================================
// connection.add / connection.remove
// ============================================================================

pub struct AddConnection {
    graph: Graph,
    metadata: CommandMetadata,
}

impl AddConnection {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            metadata: graph_metadata("Connect", "Connect an output port to an input port"),
        }
    }
}

#[async_trait(?Send)]
impl Command for AddConnection {
    fn id(&self) -> &str {
        "connection.add"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        check_fields(payload, &["source", "target"], &[])
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let source = payload::require_int(payload, "source")?;
        let target = payload::require_int(payload, "target")?;

        let mut graph = self.graph.borrow_mut();
        let id = payload::int(payload, "id").unwrap_or_else(|| graph.next_connection_id());
        let mut connection = ConnectionRecord::new(id, source, target);
        if let Some(port) = payload::text(payload, "source_port") {
            connection.source_port = port.to_string();
        }
        if let Some(port) = payload::text(payload, "target_port") {
            connection.target_port = port.to_string();
        }
        graph.add_connection(connection.clone())?;

        let mut recorded = payload.clone();
        recorded["id"] = json!(id);
        Ok(CommandResult::ok()
            .with_data(json!({ "connection": connection }))
            .with_recorded_payload(recorded))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let connection: ConnectionRecord =
            decode(result.data().and_then(|d| d.get("connection")), "connection")?;
        self.graph.borrow_mut().remove_connection(connection.id)?;
        Ok(CommandResult::ok())
    }
}

pub struct RemoveConnection {
    graph: Graph,
    selection: Selection,
    metadata: CommandMetadata,
}

impl RemoveConnection {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            selection: surfaces.selection.clone(),
            metadata: graph_metadata("Disconnect", "Remove a connection"),
        }
    }
}

#[async_trait(?Send)]
impl Command for RemoveConnection {
    fn id(&self) -> &str {
        "connection.remove"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        check_fields(payload, &["id"], &[])
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let id = payload::require_int(payload, "id")?;
        let connection = self.graph.borrow_mut().remove_connection(id)?;
        self.selection.borrow_mut().deselect(&[], &[id]);
        Ok(CommandResult::ok().with_data(json!({ "connection": connection })))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let connection: ConnectionRecord =
            decode(result.data().and_then(|d| d.get("connection")), "connection")?;
        restore(&self.graph, Vec::new(), vec![connection])?;
        Ok(CommandResult::ok())
    }
}

// ============================================================================
// selection.delete
// ============================================================================

/// Delete the selected nodes and connections, or the explicit `nodes` /
/// `connections` id lists of a replayed payload.
pub struct DeleteSelection {
    graph: Graph,
    selection: Selection,
    metadata: CommandMetadata,
}

impl DeleteSelection {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            selection: surfaces.selection.clone(),
            metadata: graph_metadata("Delete", "Delete the selected nodes and connections"),
        }
    }

    fn targets(&self, payload: &Value) -> (Vec<i32>, Vec<i32>) {
        let explicit_nodes = payload::int_list(payload, "nodes");
        let explicit_connections = payload::int_list(payload, "connections");
        if explicit_nodes.is_some() || explicit_connections.is_some() {
            return (
                explicit_nodes.unwrap_or_default(),
                explicit_connections.unwrap_or_default(),
            );
        }
        let selection = self.selection.borrow();
        (selection.selected_nodes(), selection.selected_connections())
    }
}

#[async_trait(?Send)]
impl Command for DeleteSelection {
    fn id(&self) -> &str {
        "selection.delete"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        let (nodes, connections) = self.targets(payload);
        if nodes.is_empty() && connections.is_empty() {
            ValidationResult::invalid("Nothing selected")
        } else {
            ValidationResult::ok()
        }
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let (node_ids, connection_ids) = self.targets(payload);

        let mut removed_nodes = Vec::new();
        let mut removed_connections = Vec::new();
        {
            let mut graph = self.graph.borrow_mut();
            for &id in &connection_ids {
                if graph.connection(id).is_some() {
                    removed_connections.push(graph.remove_connection(id)?);
                }
            }
            for &id in &node_ids {
                let (node, attached) = graph.remove_node(id)?;
                removed_nodes.push(node);
                removed_connections.extend(attached);
            }
        }
        let all_connections: Vec<i32> = removed_connections.iter().map(|c| c.id).collect();
        self.selection.borrow_mut().deselect(&node_ids, &all_connections);
        tracing::debug!(
            nodes = removed_nodes.len(),
            connections = removed_connections.len(),
            "selection deleted"
        );

        Ok(CommandResult::ok()
            .with_data(json!({ "nodes": removed_nodes, "connections": removed_connections }))
            .with_recorded_payload(json!({ "nodes": node_ids, "connections": connection_ids })))
    }

    fn supports_undo(&self) -> bool {
        true
    }

    async fn undo(&self, result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let data = result.data();
        let nodes: Vec<NodeRecord> = decode(data.and_then(|d| d.get("nodes")), "nodes")?;
        let connections: Vec<ConnectionRecord> =
            decode(data.and_then(|d| d.get("connections")), "connections")?;
        let ids: Vec<i32> = nodes.iter().map(|n| n.id).collect();
        restore(&self.graph, nodes, connections)?;
        self.selection.borrow_mut().replace_nodes(&ids);
        Ok(CommandResult::ok())
    }
}
