use super::payload::{self, check_fields};
use crate::command::{Command, CommandCategory, CommandContext, CommandMetadata, CommandResult, ValidationResult};
use crate::config::EditorSettings;
use crate::error::CommandError;
use crate::surfaces::{EditorSurfaces, ViewportSurface};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    ZoomIn,
    ZoomOut,
    /// Multiply the zoom by `{ scale }`.
    Zoom,
    /// `{ dx, dy }` in screen pixels.
    Pan,
    Reset,
}

impl ViewAction {
    fn id(self) -> &'static str {
        match self {
            ViewAction::ZoomIn => "view.zoom_in",
            ViewAction::ZoomOut => "view.zoom_out",
            ViewAction::Zoom => "view.zoom",
            ViewAction::Pan => "view.pan",
            ViewAction::Reset => "view.reset",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ViewAction::ZoomIn => "Zoom In",
            ViewAction::ZoomOut => "Zoom Out",
            ViewAction::Zoom => "Zoom",
            ViewAction::Pan => "Pan",
            ViewAction::Reset => "Reset View",
        }
    }
}

/// Viewport changes. Zoom stays within the configured limits whatever the
/// viewport implementation does.
pub struct ViewCommand {
    action: ViewAction,
    viewport: Rc<RefCell<dyn ViewportSurface>>,
    step: f32,
    min_zoom: f32,
    max_zoom: f32,
    metadata: CommandMetadata,
}

impl ViewCommand {
    pub fn new(action: ViewAction, surfaces: &EditorSurfaces, settings: &EditorSettings) -> Self {
        Self {
            action,
            viewport: surfaces.viewport.clone(),
            step: settings.zoom_step,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom.max(settings.min_zoom),
            metadata: CommandMetadata::new(action.name(), CommandCategory::ViewControl),
        }
    }

    fn zoom_by(&self, factor: f32) {
        let mut viewport = self.viewport.borrow_mut();
        let zoom = (viewport.zoom() * factor).clamp(self.min_zoom, self.max_zoom);
        viewport.set_zoom(zoom);
    }
}

#[async_trait(?Send)]
impl Command for ViewCommand {
    fn id(&self) -> &str {
        self.action.id()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        match self.action {
            ViewAction::Zoom => match payload::float(payload, "scale") {
                Some(scale) if scale > 0.0 && scale.is_finite() => ValidationResult::ok(),
                _ => ValidationResult::ok().with_field_error("scale", "must be a positive number"),
            },
            ViewAction::Pan => check_fields(payload, &[], &["dx", "dy"]),
            _ => ValidationResult::ok(),
        }
    }

    async fn execute(&self, payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        match self.action {
            ViewAction::ZoomIn => self.zoom_by(self.step),
            ViewAction::ZoomOut => self.zoom_by(1.0 / self.step),
            ViewAction::Zoom => self.zoom_by(payload::require_float(payload, "scale")?),
            ViewAction::Pan => {
                let dx = payload::require_float(payload, "dx")?;
                let dy = payload::require_float(payload, "dy")?;
                self.viewport.borrow_mut().pan_by(dx, dy);
            }
            ViewAction::Reset => self.viewport.borrow_mut().reset(),
        }
        let viewport = self.viewport.borrow();
        let pan = viewport.pan();
        Ok(CommandResult::ok().with_data(json!({ "zoom": viewport.zoom(), "pan": [pan.x, pan.y] })))
    }
}
