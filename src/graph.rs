//! In-memory graph document with pluggable connection validation.
//!
//! [`GraphDocument`] is the reference [`GraphStore`]. Applications that keep
//! their graph in slint models implement the trait on their own type; the
//! validators here work against any `GraphStore`.

use crate::error::SurfaceError;
use crate::surfaces::{ConnectionRecord, GraphStore, NodePatch, NodeRecord};
use std::fmt;
use thiserror::Error;

/// Result of a connection validation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCheck {
    /// Connection is valid and can be created
    Valid,
    /// Connection is invalid with a reason
    Invalid(ConnectionError),
}

impl ConnectionCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, ConnectionCheck::Valid)
    }

    /// Chain another check, short-circuiting on the first failure.
    pub fn and(self, other: impl FnOnce() -> ConnectionCheck) -> ConnectionCheck {
        match self {
            ConnectionCheck::Valid => other(),
            invalid => invalid,
        }
    }
}

/// Reasons a connection can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// An endpoint node does not exist
    #[error("Node {0} not found")]
    NodeNotFound(i32),
    /// Cannot connect a node to itself
    #[error("Cannot connect a node to itself")]
    SelfLoop,
    /// A connection between these ports already exists
    #[error("Connection already exists")]
    Duplicate,
    /// The target port already has its maximum number of inputs
    #[error("Port '{port}' of node {node} accepts at most {max} connections")]
    MaxInputsReached { node: i32, port: String, max: usize },
    /// Custom validation failure
    #[error("{0}")]
    Custom(String),
}

impl From<ConnectionError> for SurfaceError {
    fn from(err: ConnectionError) -> Self {
        SurfaceError::Rejected(err.to_string())
    }
}

/// Trait for validating connections before they are added
///
/// # Example
///
/// ```ignore
/// struct SameKindOnly;
///
/// impl ConnectionValidator for SameKindOnly {
///     fn validate(&self, candidate: &ConnectionRecord, graph: &dyn GraphStore) -> ConnectionCheck {
///         let kinds = (graph.node(candidate.source), graph.node(candidate.target));
///         match kinds {
///             (Some(a), Some(b)) if a.kind != b.kind => {
///                 ConnectionCheck::Invalid(ConnectionError::Custom("kind mismatch".into()))
///             }
///             _ => ConnectionCheck::Valid,
///         }
///     }
/// }
/// ```
pub trait ConnectionValidator {
    fn validate(&self, candidate: &ConnectionRecord, graph: &dyn GraphStore) -> ConnectionCheck;
}

/// Both endpoints exist and differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicConnectionValidator;

impl ConnectionValidator for BasicConnectionValidator {
    fn validate(&self, candidate: &ConnectionRecord, graph: &dyn GraphStore) -> ConnectionCheck {
        if candidate.source == candidate.target {
            return ConnectionCheck::Invalid(ConnectionError::SelfLoop);
        }
        for id in [candidate.source, candidate.target] {
            if graph.node(id).is_none() {
                return ConnectionCheck::Invalid(ConnectionError::NodeNotFound(id));
            }
        }
        ConnectionCheck::Valid
    }
}

/// Rejects a second connection between the same pair of ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, candidate: &ConnectionRecord, graph: &dyn GraphStore) -> ConnectionCheck {
        let duplicate = graph.connections().iter().any(|c| {
            c.source == candidate.source
                && c.source_port == candidate.source_port
                && c.target == candidate.target
                && c.target_port == candidate.target_port
        });
        if duplicate {
            ConnectionCheck::Invalid(ConnectionError::Duplicate)
        } else {
            ConnectionCheck::Valid
        }
    }
}

/// Limits the number of connections arriving at one input port.
#[derive(Debug, Clone, Copy)]
pub struct MaxInputsValidator {
    pub max: usize,
}

impl MaxInputsValidator {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl ConnectionValidator for MaxInputsValidator {
    fn validate(&self, candidate: &ConnectionRecord, graph: &dyn GraphStore) -> ConnectionCheck {
        let existing = graph
            .connections()
            .iter()
            .filter(|c| c.target == candidate.target && c.target_port == candidate.target_port)
            .count();
        if existing >= self.max {
            ConnectionCheck::Invalid(ConnectionError::MaxInputsReached {
                node: candidate.target,
                port: candidate.target_port.clone(),
                max: self.max,
            })
        } else {
            ConnectionCheck::Valid
        }
    }
}

/// Runs validators in order and stops at the first failure.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, candidate: &ConnectionRecord, graph: &dyn GraphStore) -> ConnectionCheck {
        self.validators
            .iter()
            .fold(ConnectionCheck::Valid, |acc, v| acc.and(|| v.validate(candidate, graph)))
    }
}

/// Nodes and connections in insertion order, with validation on
/// [`GraphStore::add_connection`].
pub struct GraphDocument {
    nodes: Vec<NodeRecord>,
    connections: Vec<ConnectionRecord>,
    validator: CompositeValidator,
    next_node_id: i32,
    next_connection_id: i32,
}

impl Default for GraphDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GraphDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphDocument")
            .field("nodes", &self.nodes)
            .field("connections", &self.connections)
            .field("validators", &self.validator.len())
            .finish()
    }
}

impl GraphDocument {
    /// An empty document with the basic and no-duplicates validators.
    pub fn new() -> Self {
        Self::with_validator(
            CompositeValidator::new()
                .add(BasicConnectionValidator)
                .add(NoDuplicatesValidator),
        )
    }

    pub fn with_validator(validator: CompositeValidator) -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            validator,
            next_node_id: 1,
            next_connection_id: 1,
        }
    }

    /// Insert without going through the trait's `Result`, for fixtures.
    pub fn insert_node(&mut self, node: NodeRecord) {
        if self.node_index(node.id).is_none() {
            self.bump_node_id(node.id);
            self.nodes.push(node);
        }
    }

    pub fn validate_connection(&self, candidate: &ConnectionRecord) -> ConnectionCheck {
        self.validator.validate(candidate, self)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn node_index(&self, id: i32) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    fn connection_index(&self, id: i32) -> Option<usize> {
        self.connections.iter().position(|c| c.id == id)
    }

    fn bump_node_id(&mut self, id: i32) {
        self.next_node_id = self.next_node_id.max(id + 1);
    }
}

impl GraphStore for GraphDocument {
    fn node(&self, id: i32) -> Option<NodeRecord> {
        self.node_index(id).map(|i| self.nodes[i].clone())
    }

    fn nodes(&self) -> Vec<NodeRecord> {
        self.nodes.clone()
    }

    fn connection(&self, id: i32) -> Option<ConnectionRecord> {
        self.connection_index(id).map(|i| self.connections[i].clone())
    }

    fn connections(&self) -> Vec<ConnectionRecord> {
        self.connections.clone()
    }

    fn next_node_id(&self) -> i32 {
        self.next_node_id
    }

    fn next_connection_id(&self) -> i32 {
        self.next_connection_id
    }

    fn add_node(&mut self, node: NodeRecord) -> Result<(), SurfaceError> {
        if self.node_index(node.id).is_some() {
            return Err(SurfaceError::DuplicateNode(node.id));
        }
        tracing::trace!(node = node.id, kind = %node.kind, "node added");
        self.bump_node_id(node.id);
        self.nodes.push(node);
        Ok(())
    }

    fn remove_node(&mut self, id: i32) -> Result<(NodeRecord, Vec<ConnectionRecord>), SurfaceError> {
        let index = self.node_index(id).ok_or(SurfaceError::NodeNotFound(id))?;
        let node = self.nodes.remove(index);
        let (removed, kept) = self.connections.drain(..).partition(|c| c.touches(id));
        self.connections = kept;
        Ok((node, removed))
    }

    fn update_node(&mut self, id: i32, patch: &NodePatch) -> Result<NodeRecord, SurfaceError> {
        let index = self.node_index(id).ok_or(SurfaceError::NodeNotFound(id))?;
        let node = &mut self.nodes[index];
        let previous = node.clone();
        if let Some(title) = &patch.title {
            node.title = title.clone();
        }
        if let Some(data) = &patch.data {
            node.data = data.clone();
        }
        Ok(previous)
    }

    fn move_node(&mut self, id: i32, dx: f32, dy: f32) -> Result<(), SurfaceError> {
        let index = self.node_index(id).ok_or(SurfaceError::NodeNotFound(id))?;
        let node = &mut self.nodes[index];
        node.x += dx;
        node.y += dy;
        Ok(())
    }

    fn add_connection(&mut self, connection: ConnectionRecord) -> Result<(), SurfaceError> {
        if self.connection_index(connection.id).is_some() {
            return Err(SurfaceError::DuplicateConnection(connection.id));
        }
        if let ConnectionCheck::Invalid(err) = self.validate_connection(&connection) {
            tracing::debug!(connection = connection.id, error = %err, "connection rejected");
            return Err(err.into());
        }
        self.next_connection_id = self.next_connection_id.max(connection.id + 1);
        self.connections.push(connection);
        Ok(())
    }

    fn remove_connection(&mut self, id: i32) -> Result<ConnectionRecord, SurfaceError> {
        let index = self
            .connection_index(id)
            .ok_or(SurfaceError::ConnectionNotFound(id))?;
        Ok(self.connections.remove(index))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.next_node_id = 1;
        self.next_connection_id = 1;
    }
}
