use super::payload;
use crate::command::{
    Command, CommandCategory, CommandContext, CommandMetadata, CommandResult, Effect, EffectKind,
    ValidationResult,
};
use crate::error::{CommandError, SurfaceError};
use crate::surfaces::{EditorSurfaces, GraphStore, PanelSurface, ViewportSurface};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Open,
    Close,
    Toggle,
}

/// `panel.open` / `panel.close` / `panel.toggle` with `{ panel }`.
pub struct PanelCommand {
    action: PanelAction,
    panels: Rc<RefCell<dyn PanelSurface>>,
    metadata: CommandMetadata,
}

impl PanelCommand {
    pub fn new(action: PanelAction, surfaces: &EditorSurfaces) -> Self {
        let name = match action {
            PanelAction::Open => "Open Panel",
            PanelAction::Close => "Close Panel",
            PanelAction::Toggle => "Toggle Panel",
        };
        Self {
            action,
            panels: surfaces.panels.clone(),
            metadata: CommandMetadata::new(name, CommandCategory::UiControl),
        }
    }
}

#[async_trait(?Send)]
impl Command for PanelCommand {
    fn id(&self) -> &str {
        match self.action {
            PanelAction::Open => "panel.open",
            PanelAction::Close => "panel.close",
            PanelAction::Toggle => "panel.toggle",
        }
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        match payload::require_text(payload, "panel") {
            Ok(_) => ValidationResult::ok(),
            Err(_) => ValidationResult::ok().with_field_error("panel", "is required"),
        }
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let panel = payload::require_text(payload, "panel")?;
        let mut panels = self.panels.borrow_mut();
        let open = match self.action {
            PanelAction::Open => {
                panels.open(panel);
                true
            }
            PanelAction::Close => {
                panels.close(panel);
                false
            }
            PanelAction::Toggle => panels.toggle(panel),
        };
        Ok(CommandResult::ok().with_data(json!({ "panel": panel, "open": open })))
    }
}

/// `navigation.focus_node { id }`: center the viewport on a node and emit a
/// navigation effect for the UI to animate or highlight.
pub struct FocusNode {
    graph: Rc<RefCell<dyn GraphStore>>,
    viewport: Rc<RefCell<dyn ViewportSurface>>,
    metadata: CommandMetadata,
}

impl FocusNode {
    pub fn new(surfaces: &EditorSurfaces) -> Self {
        Self {
            graph: surfaces.graph.clone(),
            viewport: surfaces.viewport.clone(),
            metadata: CommandMetadata::new("Focus Node", CommandCategory::Navigation)
                .describe("Center the view on a node"),
        }
    }
}

#[async_trait(?Send)]
impl Command for FocusNode {
    fn id(&self) -> &str {
        "navigation.focus_node"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        payload::check_fields(payload, &["id"], &[])
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let id = payload::require_int(payload, "id")?;
        let center = self
            .graph
            .borrow()
            .node(id)
            .map(|n| n.center())
            .ok_or(SurfaceError::NodeNotFound(id))?;
        self.viewport.borrow_mut().center_on(center);

        let target = json!({ "node": id, "x": center.x, "y": center.y });
        Ok(CommandResult::ok()
            .with_data(target.clone())
            .with_effect(Effect::new(EffectKind::Navigation, target)))
    }
}
