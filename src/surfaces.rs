//! Collaborator surfaces the built-in commands mutate.
//!
//! The interaction core never owns graph, selection, viewport or panel state.
//! It talks to them through these traits, bundled in [`EditorSurfaces`] and
//! handed to the commands at registration time. The crate ships in-memory
//! implementations ([`GraphDocument`](crate::graph::GraphDocument),
//! [`SelectionManager`](crate::selection::SelectionManager),
//! [`ViewportState`](crate::viewport::ViewportState),
//! [`PanelState`](crate::panels::PanelState),
//! [`NotificationCenter`](crate::notifications::NotificationCenter)); an
//! application backed by its own slint models implements the traits instead.

use crate::error::SurfaceError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// A node as stored by a [`GraphStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i32,
    pub kind: String,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl NodeRecord {
    pub fn new(id: i32, kind: impl Into<String>, x: f32, y: f32) -> Self {
        let kind = kind.into();
        Self {
            id,
            title: kind.clone(),
            kind,
            x,
            y,
            width: 150.0,
            height: 80.0,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: i32,
    pub source: i32,
    #[serde(default)]
    pub source_port: String,
    pub target: i32,
    #[serde(default)]
    pub target_port: String,
}

impl ConnectionRecord {
    pub fn new(id: i32, source: i32, target: i32) -> Self {
        Self {
            id,
            source,
            source_port: "out".into(),
            target,
            target_port: "in".into(),
        }
    }

    pub fn with_ports(mut self, source_port: impl Into<String>, target_port: impl Into<String>) -> Self {
        self.source_port = source_port.into();
        self.target_port = target_port.into();
        self
    }

    pub fn touches(&self, node_id: i32) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Partial update for [`GraphStore::update_node`]. `None` leaves a field alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePatch {
    pub title: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Graph mutation primitives.
pub trait GraphStore {
    fn node(&self, id: i32) -> Option<NodeRecord>;
    fn nodes(&self) -> Vec<NodeRecord>;
    fn connection(&self, id: i32) -> Option<ConnectionRecord>;
    fn connections(&self) -> Vec<ConnectionRecord>;

    fn next_node_id(&self) -> i32;
    fn next_connection_id(&self) -> i32;

    fn add_node(&mut self, node: NodeRecord) -> Result<(), SurfaceError>;
    /// Remove a node and every connection touching it. Returns both so the
    /// removal can be reverted.
    fn remove_node(&mut self, id: i32) -> Result<(NodeRecord, Vec<ConnectionRecord>), SurfaceError>;
    /// Apply `patch`, returning the node as it was before.
    fn update_node(&mut self, id: i32, patch: &NodePatch) -> Result<NodeRecord, SurfaceError>;
    fn move_node(&mut self, id: i32, dx: f32, dy: f32) -> Result<(), SurfaceError>;

    fn add_connection(&mut self, connection: ConnectionRecord) -> Result<(), SurfaceError>;
    fn remove_connection(&mut self, id: i32) -> Result<ConnectionRecord, SurfaceError>;

    fn clear(&mut self);
}

/// Readable, writable selection of nodes and connections.
pub trait SelectionSurface {
    /// Select a node. `additive` toggles it within the current selection.
    fn select_node(&mut self, id: i32, additive: bool);
    fn select_connection(&mut self, id: i32, additive: bool);
    fn replace_nodes(&mut self, ids: &[i32]);
    fn clear_selection(&mut self);
    /// Drop the given ids from the selection, leaving the rest alone.
    fn deselect(&mut self, nodes: &[i32], connections: &[i32]);

    fn selected_nodes(&self) -> Vec<i32>;
    fn selected_connections(&self) -> Vec<i32>;
    fn is_node_selected(&self, id: i32) -> bool;

    fn has_selection(&self) -> bool {
        !self.selected_nodes().is_empty() || !self.selected_connections().is_empty()
    }
}

/// Zoom and pan of the canvas.
pub trait ViewportSurface {
    fn zoom(&self) -> f32;
    fn set_zoom(&mut self, zoom: f32);
    fn pan(&self) -> Point;
    fn pan_by(&mut self, dx: f32, dy: f32);
    /// Pan so that `world` ends up in the middle of the view.
    fn center_on(&mut self, world: Point);
    fn reset(&mut self);
    fn screen_to_world(&self, screen: Point) -> Point;
}

/// Side panels, modals and other toggleable UI regions.
pub trait PanelSurface {
    fn open(&mut self, name: &str);
    fn close(&mut self, name: &str);
    /// Returns whether the panel is open afterwards.
    fn toggle(&mut self, name: &str) -> bool;
    fn is_open(&self, name: &str) -> bool;
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastLevel::Info => "info",
            ToastLevel::Success => "success",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        }
    }
}

/// Where toasts and default command notifications end up.
pub trait Notifier {
    fn show(&self, message: &str, level: ToastLevel);
    /// Default notification for a command that succeeded without effects.
    fn success_for_command(&self, command_id: &str);
    /// Default notification for a command whose body failed.
    fn error_for_command(&self, command_id: &str, error: &str);
}

/// Every surface the built-in commands need.
#[derive(Clone)]
pub struct EditorSurfaces {
    pub graph: Rc<RefCell<dyn GraphStore>>,
    pub selection: Rc<RefCell<dyn SelectionSurface>>,
    pub viewport: Rc<RefCell<dyn ViewportSurface>>,
    pub panels: Rc<RefCell<dyn PanelSurface>>,
    pub notifier: Rc<dyn Notifier>,
}
