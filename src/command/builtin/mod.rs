//! The stock command set of a graph editor.
//!
//! | id | undoable |
//! |---|---|
//! | `node.add`, `node.remove`, `node.update`, `node.move` | yes |
//! | `connection.add`, `connection.remove`, `selection.delete` | yes |
//! | `selection.node`, `selection.connection`, `selection.clear`, `selection.all`, `selection.box` | no |
//! | `view.zoom_in`, `view.zoom_out`, `view.zoom`, `view.pan`, `view.reset` | no |
//! | `panel.open`, `panel.close`, `panel.toggle`, `navigation.focus_node` | no |
//! | `file.new`, `history.undo`, `history.redo`, `history.clear` | no |

mod file;
mod graph;
mod history;
pub(crate) mod payload;
mod selection;
mod ui;
mod view;

pub use file::NewGraph;
pub use graph::{AddConnection, AddNode, DeleteSelection, MoveNodes, RemoveConnection, RemoveNode, UpdateNode};
pub use history::{ClearHistory, Redo, Undo};
pub use selection::{SelectionAction, SelectionCommand};
pub use ui::{FocusNode, PanelAction, PanelCommand};
pub use view::{ViewAction, ViewCommand};

use super::{Command, CommandExecutor};
use crate::config::EditorSettings;
use crate::surfaces::EditorSurfaces;
use std::rc::Rc;

/// Register every built-in command on `executor`.
pub fn register_builtin_commands(
    executor: &Rc<CommandExecutor>,
    surfaces: &EditorSurfaces,
    settings: &EditorSettings,
) {
    let mut commands: Vec<Rc<dyn Command>> = vec![
        Rc::new(AddNode::new(surfaces, settings)),
        Rc::new(RemoveNode::new(surfaces)),
        Rc::new(UpdateNode::new(surfaces)),
        Rc::new(MoveNodes::new(surfaces)),
        Rc::new(AddConnection::new(surfaces)),
        Rc::new(RemoveConnection::new(surfaces)),
        Rc::new(DeleteSelection::new(surfaces)),
    ];
    for action in [
        SelectionAction::Node,
        SelectionAction::Connection,
        SelectionAction::Clear,
        SelectionAction::All,
        SelectionAction::Box,
    ] {
        commands.push(Rc::new(SelectionCommand::new(action, surfaces)));
    }
    for action in [
        ViewAction::ZoomIn,
        ViewAction::ZoomOut,
        ViewAction::Zoom,
        ViewAction::Pan,
        ViewAction::Reset,
    ] {
        commands.push(Rc::new(ViewCommand::new(action, surfaces, settings)));
    }
    for action in [PanelAction::Open, PanelAction::Close, PanelAction::Toggle] {
        commands.push(Rc::new(PanelCommand::new(action, surfaces)));
    }
    commands.push(Rc::new(FocusNode::new(surfaces)));
    commands.push(Rc::new(NewGraph::new(surfaces, executor.history())));
    commands.push(Rc::new(Undo::new(executor)));
    commands.push(Rc::new(Redo::new(executor)));
    commands.push(Rc::new(ClearHistory::new(executor.history())));

    let count = commands.len();
    executor.register_all(commands);
    tracing::debug!(count, "built-in commands registered");
}
