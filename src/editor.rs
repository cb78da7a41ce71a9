//! The editor facade: one object wiring surfaces, commands, interaction rules,
//! gesture recognition and the slint bridge together.

use crate::command::builtin::register_builtin_commands;
use crate::command::{CommandExecutor, CommandResult, PartialCommandContext};
use crate::config::{EditorSettings, InputMode};
use crate::geometry::Point;
use crate::gesture::{GestureCoordinator, GestureEvent, PointerEvent, PointerPhase, TouchEvent};
use crate::graph::GraphDocument;
use crate::hit_test::TargetResolver;
use crate::interaction::{
    default_catalog, EventKind, EventTarget, InputEvent, InteractionContext, InteractionRouter,
};
use crate::notifications::NotificationCenter;
use crate::panels::PanelState;
use crate::selection::SelectionManager;
use crate::slint_bridge::WindowEventTranslator;
use crate::surfaces::EditorSurfaces;
use crate::viewport::ViewportState;
use serde_json::Value;
use slint::platform::WindowEvent;
use std::cell::RefCell;
use std::rc::Rc;

/// Owns the command executor, interaction router and gesture coordinator
/// for one editor view.
///
/// Built-in commands and the default interaction catalog are registered on
/// construction; applications add their own on top through
/// [`Editor::executor`] and [`Editor::router`]. The router starts in the
/// [`InteractionContext::Canvas`] context.
pub struct Editor {
    settings: EditorSettings,
    surfaces: EditorSurfaces,
    executor: Rc<CommandExecutor>,
    router: InteractionRouter,
    gestures: RefCell<GestureCoordinator>,
    translator: RefCell<WindowEventTranslator>,
    resolver: TargetResolver,
}

impl Editor {
    /// Editor backed by the in-memory reference surfaces.
    pub fn new(settings: EditorSettings) -> Self {
        let surfaces = EditorSurfaces {
            graph: Rc::new(RefCell::new(GraphDocument::new())),
            selection: Rc::new(RefCell::new(SelectionManager::new())),
            viewport: Rc::new(RefCell::new(ViewportState::new(settings.min_zoom, settings.max_zoom))),
            panels: Rc::new(RefCell::new(PanelState::new())),
            notifier: Rc::new(NotificationCenter::new()),
        };
        Self::with_surfaces(settings, surfaces)
    }

    pub fn with_surfaces(settings: EditorSettings, surfaces: EditorSurfaces) -> Self {
        let executor = Rc::new(CommandExecutor::new(
            surfaces.notifier.clone(),
            settings.history_capacity,
        ));
        register_builtin_commands(&executor, &surfaces, &settings);

        let router = InteractionRouter::new(executor.clone()).with_selection(surfaces.selection.clone());
        router.register_all(default_catalog());
        router.set_context(InteractionContext::Canvas, Value::Null);

        let gestures = GestureCoordinator::new(&settings.gestures, settings.input_mode);
        let translator = WindowEventTranslator::new(&settings);
        tracing::debug!(
            commands = executor.command_ids().len(),
            interactions = router.len(),
            input_mode = ?settings.input_mode,
            "editor ready"
        );

        Self {
            settings,
            surfaces,
            executor,
            router,
            gestures: RefCell::new(gestures),
            translator: RefCell::new(translator),
            resolver: TargetResolver::default(),
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn surfaces(&self) -> &EditorSurfaces {
        &self.surfaces
    }

    pub fn executor(&self) -> &Rc<CommandExecutor> {
        &self.executor
    }

    pub fn router(&self) -> &InteractionRouter {
        &self.router
    }

    /// Gesture handlers registered here run before the gesture is routed.
    pub fn gestures(&self) -> &RefCell<GestureCoordinator> {
        &self.gestures
    }

    pub fn translator(&self) -> &RefCell<WindowEventTranslator> {
        &self.translator
    }

    pub fn set_context(&self, context: InteractionContext, data: Value) {
        self.router.set_context(context, data);
    }

    pub fn set_input_mode(&self, mode: InputMode) {
        self.gestures.borrow_mut().set_input_mode(mode);
    }

    /// Dispatch a command by id.
    pub async fn execute(&self, id: &str, payload: Value) -> CommandResult {
        self.executor.execute(id, payload, None).await
    }

    pub async fn execute_with(&self, id: &str, payload: Value, context: PartialCommandContext) -> CommandResult {
        self.executor.execute(id, payload, Some(context)).await
    }

    /// Route an input event whose target and world positions are already set.
    pub async fn handle_input(&self, event: &InputEvent) -> Option<CommandResult> {
        self.router.route(event).await
    }

    /// Resolve the target and world positions of a screen-space pointer event,
    /// then route it. Keyboard events are routed untouched.
    pub async fn handle_screen_input(&self, mut event: InputEvent) -> Option<CommandResult> {
        self.locate(&mut event);
        self.router.route(&event).await
    }

    /// Feed the gesture coordinator and route whatever it recognized.
    pub async fn handle_pointer(&self, mut event: PointerEvent) -> Option<CommandResult> {
        if event.target.is_none() && event.phase == PointerPhase::Down {
            event.target = Some(self.target_at(event.position));
        }
        let gesture = self.gestures.borrow_mut().handle_pointer(&event);
        self.route_gesture(gesture?).await
    }

    /// Raw touch fallback, only consulted in [`InputMode::Touch`].
    pub async fn handle_touch(&self, mut event: TouchEvent) -> Option<CommandResult> {
        if event.target.is_none() {
            let first = event.touches.first().or(event.changed.first()).map(|t| t.position);
            event.target = first.map(|p| self.target_at(p));
        }
        let gesture = self.gestures.borrow_mut().handle_touch(&event);
        self.route_gesture(gesture?).await
    }

    /// Translate and handle one slint window event. Returns the results of
    /// every command it dispatched, in order.
    pub async fn handle_window_event(&self, event: &WindowEvent, time_ms: u64) -> Vec<CommandResult> {
        let translated = self.translator.borrow_mut().translate(event, time_ms);
        let mut results = Vec::new();
        for input in translated.inputs {
            if let Some(result) = self.handle_screen_input(input).await {
                results.push(result);
            }
        }
        if let Some(pointer) = translated.pointer {
            results.extend(self.handle_pointer(pointer).await);
        }
        results
    }

    /// Handle a window event on the slint event loop, for synchronous
    /// callbacks that cannot await.
    pub fn spawn_window_event(self: &Rc<Self>, event: WindowEvent) {
        let editor = self.clone();
        let time_ms = slint::platform::duration_since_start().as_millis() as u64;
        let spawned = slint::spawn_local(async move {
            editor.handle_window_event(&event, time_ms).await;
        });
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "could not spawn window event handler");
        }
    }

    async fn route_gesture(&self, gesture: GestureEvent) -> Option<CommandResult> {
        let mut input = InputEvent::from_gesture(gesture);
        self.project(&mut input);
        self.router.route(&input).await
    }

    fn target_at(&self, screen: Point) -> EventTarget {
        let world = self.surfaces.viewport.borrow().screen_to_world(screen);
        let graph = self.surfaces.graph.borrow();
        let selection = self.surfaces.selection.borrow();
        self.resolver.resolve(world, &*graph, &*selection)
    }

    fn project(&self, event: &mut InputEvent) {
        let viewport = self.surfaces.viewport.borrow();
        event.world_position = viewport.screen_to_world(event.position);
        event.world_origin = viewport.screen_to_world(event.origin);
    }

    fn locate(&self, event: &mut InputEvent) {
        if matches!(event.kind, EventKind::KeyDown | EventKind::KeyUp) {
            return;
        }
        // Releases and clicks belong to whatever was pressed
        event.target = self.target_at(event.origin);
        self.project(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Modifiers;
    use crate::surfaces::{GraphStore, NodeRecord, SelectionSurface};
    use serde_json::json;
    use slint::platform::PointerEventButton;
    use slint::LogicalPosition;

    fn editor_with_node() -> Editor {
        let editor = Editor::new(EditorSettings::default());
        editor
            .surfaces()
            .graph
            .borrow_mut()
            .add_node(NodeRecord::new(1, "n", 0.0, 0.0).with_size(100.0, 80.0))
            .unwrap();
        editor
    }

    // ========================================================================
    // Wiring
    // ========================================================================

    #[test]
    fn test_new_editor_registers_builtins_and_catalog() {
        let editor = Editor::new(EditorSettings::default());
        assert!(editor.executor().has("history.undo"));
        assert_eq!(editor.router().len(), default_catalog().len());
        assert_eq!(editor.router().context().context, InteractionContext::Canvas);
    }

    #[tokio::test]
    async fn test_screen_click_targets_node_under_pointer() {
        let editor = editor_with_node();
        let result = editor
            .handle_screen_input(InputEvent::click(EventTarget::canvas(), Point::new(50.0, 40.0)))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(editor.surfaces().selection.borrow().selected_nodes(), vec![1]);
    }

    #[tokio::test]
    async fn test_keyboard_undo() {
        let editor = Editor::new(EditorSettings::default());
        editor
            .execute("node.add", json!({ "kind": "n", "x": 0.0, "y": 0.0 }))
            .await;
        assert_eq!(editor.surfaces().graph.borrow().nodes().len(), 1);

        let result = editor
            .handle_input(&InputEvent::key_down("z", Modifiers::control()))
            .await
            .unwrap();
        assert!(result.success);
        assert!(editor.surfaces().graph.borrow().nodes().is_empty());
    }

    // ========================================================================
    // Window events
    // ========================================================================

    #[tokio::test]
    async fn test_window_drag_moves_node() {
        let editor = editor_with_node();
        let press = WindowEvent::PointerPressed {
            position: LogicalPosition::new(10.0, 10.0),
            button: PointerEventButton::Left,
        };
        let moved = WindowEvent::PointerMoved {
            position: LogicalPosition::new(60.0, 30.0),
        };
        let release = WindowEvent::PointerReleased {
            position: LogicalPosition::new(110.0, 50.0),
            button: PointerEventButton::Left,
        };
        editor.handle_window_event(&press, 0).await;
        editor.handle_window_event(&moved, 16).await;
        let results = editor.handle_window_event(&release, 32).await;

        assert!(results.iter().any(|r| r.success));
        let node = editor.surfaces().graph.borrow().node(1).unwrap();
        assert_eq!((node.x, node.y), (100.0, 40.0));
    }

    #[tokio::test]
    async fn test_window_double_click_on_canvas_adds_node() {
        let editor = Editor::new(EditorSettings::default());
        for (t, down) in [(0, true), (30, false), (100, true), (130, false)] {
            let position = LogicalPosition::new(300.0, 200.0);
            let event = if down {
                WindowEvent::PointerPressed {
                    position,
                    button: PointerEventButton::Left,
                }
            } else {
                WindowEvent::PointerReleased {
                    position,
                    button: PointerEventButton::Left,
                }
            };
            editor.handle_window_event(&event, t).await;
        }
        let nodes = editor.surfaces().graph.borrow().nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!((nodes[0].x, nodes[0].y), (300.0, 200.0));
    }
}
