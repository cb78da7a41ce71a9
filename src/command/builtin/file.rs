use crate::command::{Command, CommandCategory, CommandContext, CommandMetadata, CommandResult, Effect, HistoryStore};
use crate::error::CommandError;
use crate::surfaces::{EditorSurfaces, ToastLevel};
use async_trait::async_trait;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// `file.new`: empty graph, empty selection, fresh history, default view.
pub struct NewGraph {
    surfaces: EditorSurfaces,
    history: Rc<RefCell<HistoryStore>>,
    metadata: CommandMetadata,
}

impl NewGraph {
    pub fn new(surfaces: &EditorSurfaces, history: Rc<RefCell<HistoryStore>>) -> Self {
        Self {
            surfaces: surfaces.clone(),
            history,
            metadata: CommandMetadata::new("New Graph", CommandCategory::FileOperation)
                .describe("Discard the current graph and start over")
                .mutates_graph(),
        }
    }
}

#[async_trait(?Send)]
impl Command for NewGraph {
    fn id(&self) -> &str {
        "file.new"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn execute(&self, _payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        self.surfaces.graph.borrow_mut().clear();
        self.surfaces.selection.borrow_mut().clear_selection();
        self.surfaces.viewport.borrow_mut().reset();
        self.history.borrow_mut().clear();
        Ok(CommandResult::ok().with_effect(Effect::toast(ToastLevel::Info, "New graph")))
    }
}
