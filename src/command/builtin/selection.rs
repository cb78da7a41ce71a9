//! Selection commands. None of them touch the graph or the history.

use super::payload::{self, check_fields};
use crate::command::{Command, CommandCategory, CommandContext, CommandMetadata, CommandResult, ValidationResult};
use crate::error::{CommandError, SurfaceError};
use crate::hit_test::nodes_in_selection_box;
use crate::surfaces::{EditorSurfaces, GraphStore, SelectionSurface};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Which selection change a [`SelectionCommand`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    /// `{ id, additive? }`
    Node,
    /// `{ id, additive? }`
    Connection,
    Clear,
    All,
    /// `{ x, y, width, height, additive? }` in world coordinates
    Box,
}

impl SelectionAction {
    fn id(self) -> &'static str {
        match self {
            SelectionAction::Node => "selection.node",
            SelectionAction::Connection => "selection.connection",
            SelectionAction::Clear => "selection.clear",
            SelectionAction::All => "selection.all",
            SelectionAction::Box => "selection.box",
        }
    }

    fn name(self) -> &'static str {
        match self {
            SelectionAction::Node => "Select Node",
            SelectionAction::Connection => "Select Connection",
            SelectionAction::Clear => "Clear Selection",
            SelectionAction::All => "Select All",
            SelectionAction::Box => "Box Select",
        }
    }
}

pub struct SelectionCommand {
    action: SelectionAction,
    graph: Rc<RefCell<dyn GraphStore>>,
    selection: Rc<RefCell<dyn SelectionSurface>>,
    metadata: CommandMetadata,
}

impl SelectionCommand {
    pub fn new(action: SelectionAction, surfaces: &EditorSurfaces) -> Self {
        Self {
            action,
            graph: surfaces.graph.clone(),
            selection: surfaces.selection.clone(),
            metadata: CommandMetadata::new(action.name(), CommandCategory::Selection),
        }
    }

    fn snapshot(&self) -> Value {
        let selection = self.selection.borrow();
        json!({
            "nodes": selection.selected_nodes(),
            "connections": selection.selected_connections(),
        })
    }
}

#[async_trait(?Send)]
impl Command for SelectionCommand {
    fn id(&self) -> &str {
        self.action.id()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        match self.action {
            SelectionAction::Node | SelectionAction::Connection => check_fields(payload, &["id"], &[]),
            SelectionAction::Box => check_fields(payload, &[], &["x", "y", "width", "height"]),
            SelectionAction::Clear | SelectionAction::All => ValidationResult::ok(),
        }
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let additive = payload::flag(payload, "additive");
        match self.action {
            SelectionAction::Node => {
                let id = payload::require_int(payload, "id")?;
                if self.graph.borrow().node(id).is_none() {
                    return Err(SurfaceError::NodeNotFound(id).into());
                }
                self.selection.borrow_mut().select_node(id, additive);
            }
            SelectionAction::Connection => {
                let id = payload::require_int(payload, "id")?;
                if self.graph.borrow().connection(id).is_none() {
                    return Err(SurfaceError::ConnectionNotFound(id).into());
                }
                self.selection.borrow_mut().select_connection(id, additive);
            }
            SelectionAction::Clear => self.selection.borrow_mut().clear_selection(),
            SelectionAction::All => {
                let ids: Vec<i32> = self.graph.borrow().nodes().iter().map(|n| n.id).collect();
                self.selection.borrow_mut().replace_nodes(&ids);
            }
            SelectionAction::Box => {
                let nodes = self.graph.borrow().nodes();
                let mut ids = nodes_in_selection_box(
                    payload::require_float(payload, "x")?,
                    payload::require_float(payload, "y")?,
                    payload::require_float(payload, "width")?,
                    payload::require_float(payload, "height")?,
                    &nodes,
                );
                let mut selection = self.selection.borrow_mut();
                if additive {
                    ids.extend(selection.selected_nodes());
                }
                selection.replace_nodes(&ids);
            }
        }
        Ok(CommandResult::ok().with_data(self.snapshot()))
    }
}
