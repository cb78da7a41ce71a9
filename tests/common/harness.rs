//! Test harness around [`Editor`].
//!
//! Provides an editor over concrete reference surfaces with a two-node graph,
//! gesture and effect tracking, and helpers that simulate mouse, touch and
//! keyboard input on a mock clock.

#![allow(dead_code)]

use super::{EffectTracker, GestureTracker};
use futures::executor::block_on;
use serde_json::Value;
use slint::platform::{Key, PointerEventButton, WindowEvent};
use slint::LogicalPosition;
use slint_node_interaction::{
    CommandResult, ConnectionRecord, Editor, EditorSettings, EditorSurfaces, GraphDocument,
    GraphStore, InputEvent, NodeRecord, NotificationCenter, PanelState, Point, PointerEvent,
    PointerKind, PointerPhase, SelectionManager, ViewportState,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Initialize the testing backend for this thread.
/// With init_no_event_loop(), each test thread can have its own backend instance.
fn init_testing_backend() {
    thread_local! {
        static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    }

    INITIALIZED.with(|init| {
        if !init.get() {
            i_slint_backend_testing::init_no_event_loop();
            init.set(true);
        }
    });
}

/// Gap between the press and release of a simulated click.
pub const CLICK_MS: u64 = 30;

pub struct EditorHarness {
    pub editor: Editor,
    pub graph: Rc<RefCell<GraphDocument>>,
    pub selection: Rc<RefCell<SelectionManager>>,
    pub viewport: Rc<RefCell<ViewportState>>,
    pub panels: Rc<RefCell<PanelState>>,
    pub notifications: Rc<NotificationCenter>,
    pub gestures: GestureTracker,
    pub effects: EffectTracker,
    time_ms: Cell<u64>,
}

impl EditorHarness {
    /// Node A (id 1) at (100, 100), Node B (id 2) at (400, 200), both
    /// 150x80, connected by connection 1.
    pub fn new() -> Self {
        let harness = Self::empty();
        {
            let mut graph = harness.graph.borrow_mut();
            graph.insert_node(NodeRecord::new(1, "source", 100.0, 100.0).with_title("Node A"));
            graph.insert_node(NodeRecord::new(2, "sink", 400.0, 200.0).with_title("Node B"));
            graph
                .add_connection(ConnectionRecord::new(1, 1, 2))
                .unwrap();
        }
        harness
    }

    pub fn empty() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        init_testing_backend();
        let graph = Rc::new(RefCell::new(GraphDocument::new()));
        let selection = Rc::new(RefCell::new(SelectionManager::new()));
        let viewport = Rc::new(RefCell::new(ViewportState::new(settings.min_zoom, settings.max_zoom)));
        let panels = Rc::new(RefCell::new(PanelState::new()));
        let notifications = Rc::new(NotificationCenter::new());
        let surfaces = EditorSurfaces {
            graph: graph.clone(),
            selection: selection.clone(),
            viewport: viewport.clone(),
            panels: panels.clone(),
            notifier: notifications.clone(),
        };
        let editor = Editor::with_surfaces(settings, surfaces);

        let gestures = GestureTracker::new();
        gestures.attach(&mut editor.gestures().borrow_mut());
        let effects = EffectTracker::new();
        effects.attach(editor.executor());

        Self {
            editor,
            graph,
            selection,
            viewport,
            panels,
            notifications,
            gestures,
            effects,
            time_ms: Cell::new(1_000),
        }
    }

    // === Clock ===

    pub fn now(&self) -> u64 {
        self.time_ms.get()
    }

    /// Advance the event clock and slint's mock time, firing due timers.
    pub fn advance(&self, ms: u64) {
        self.time_ms.set(self.time_ms.get() + ms);
        i_slint_backend_testing::mock_elapsed_time(std::time::Duration::from_millis(ms));
    }

    // === Commands ===

    pub fn run(&self, id: &str, payload: Value) -> CommandResult {
        block_on(self.editor.execute(id, payload))
    }

    pub fn input(&self, event: &InputEvent) -> Option<CommandResult> {
        block_on(self.editor.handle_input(event))
    }

    pub fn screen_input(&self, event: InputEvent) -> Option<CommandResult> {
        block_on(self.editor.handle_screen_input(event))
    }

    pub fn dispatch(&self, event: WindowEvent) -> Vec<CommandResult> {
        block_on(self.editor.handle_window_event(&event, self.now()))
    }

    // === Mouse event helpers ===

    pub fn mouse_down(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.mouse_down_button(x, y, PointerEventButton::Left)
    }

    pub fn mouse_down_button(&self, x: f32, y: f32, button: PointerEventButton) -> Vec<CommandResult> {
        self.dispatch(WindowEvent::PointerPressed {
            position: LogicalPosition::new(x, y),
            button,
        })
    }

    pub fn mouse_move(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.dispatch(WindowEvent::PointerMoved {
            position: LogicalPosition::new(x, y),
        })
    }

    pub fn mouse_up(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.mouse_up_button(x, y, PointerEventButton::Left)
    }

    pub fn mouse_up_button(&self, x: f32, y: f32, button: PointerEventButton) -> Vec<CommandResult> {
        self.dispatch(WindowEvent::PointerReleased {
            position: LogicalPosition::new(x, y),
            button,
        })
    }

    /// Press and release at the same spot, returning the release's results.
    pub fn click(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.mouse_down(x, y);
        self.advance(CLICK_MS);
        self.mouse_up(x, y)
    }

    pub fn shift_click(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.key_press(Key::Shift);
        let results = self.click(x, y);
        self.key_release(Key::Shift);
        results
    }

    pub fn double_click(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.click(x, y);
        self.advance(100);
        self.click(x, y)
    }

    pub fn right_click(&self, x: f32, y: f32) -> Vec<CommandResult> {
        self.mouse_down_button(x, y, PointerEventButton::Right);
        self.advance(CLICK_MS);
        self.mouse_up_button(x, y, PointerEventButton::Right)
    }

    /// Press at `from`, move in `steps` increments, release at `to`.
    pub fn drag(&self, from: (f32, f32), to: (f32, f32), steps: u32) -> Vec<CommandResult> {
        self.mouse_down(from.0, from.1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.advance(16);
            self.mouse_move(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        self.advance(16);
        self.mouse_up(to.0, to.1)
    }

    /// Positive `dy` scrolls up (slint convention).
    pub fn scroll(&self, x: f32, y: f32, dy: f32) -> Vec<CommandResult> {
        self.dispatch(WindowEvent::PointerScrolled {
            position: LogicalPosition::new(x, y),
            delta_x: 0.0,
            delta_y: dy,
        })
    }

    // === Touch event helpers ===

    fn touch(&self, id: u32, phase: PointerPhase, x: f32, y: f32) -> Option<CommandResult> {
        let event = PointerEvent::new(id, phase, Point::new(x, y), self.now()).with_kind(PointerKind::Touch);
        block_on(self.editor.handle_pointer(event))
    }

    pub fn touch_down(&self, id: u32, x: f32, y: f32) -> Option<CommandResult> {
        self.touch(id, PointerPhase::Down, x, y)
    }

    pub fn touch_move(&self, id: u32, x: f32, y: f32) -> Option<CommandResult> {
        self.touch(id, PointerPhase::Move, x, y)
    }

    pub fn touch_up(&self, id: u32, x: f32, y: f32) -> Option<CommandResult> {
        self.touch(id, PointerPhase::Up, x, y)
    }

    pub fn tap(&self, x: f32, y: f32) -> Option<CommandResult> {
        self.touch_down(1, x, y);
        self.advance(50);
        self.touch_up(1, x, y)
    }

    /// Two fingers moving apart (or together) symmetrically around `center`.
    pub fn pinch(&self, center: (f32, f32), from_gap: f32, to_gap: f32) -> Option<CommandResult> {
        let (cx, cy) = center;
        self.touch_down(1, cx - from_gap / 2.0, cy);
        self.touch_down(2, cx + from_gap / 2.0, cy);
        for i in 1..=4 {
            let gap = from_gap + (to_gap - from_gap) * i as f32 / 4.0;
            self.advance(16);
            self.touch_move(1, cx - gap / 2.0, cy);
            self.touch_move(2, cx + gap / 2.0, cy);
        }
        self.advance(16);
        let result = self.touch_up(1, cx - to_gap / 2.0, cy);
        self.touch_up(2, cx + to_gap / 2.0, cy);
        result
    }

    /// Two fingers 200px apart translating together by (dx, dy).
    ///
    /// Fingers move alternately in small steps so the momentary spread and
    /// angle stay below the pinch and rotate thresholds.
    pub fn two_finger_pan(&self, start: (f32, f32), dx: f32, dy: f32) -> Option<CommandResult> {
        const GAP: f32 = 200.0;
        let (x, y) = start;
        let steps = (dx.abs().max(dy.abs()) / 5.0).ceil().max(1.0) as u32;
        self.touch_down(1, x, y);
        self.touch_down(2, x + GAP, y);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.advance(8);
            self.touch_move(1, x + dx * t, y + dy * t);
            self.touch_move(2, x + GAP + dx * t, y + dy * t);
        }
        self.advance(8);
        let result = self.touch_up(1, x + dx, y + dy);
        self.touch_up(2, x + GAP + dx, y + dy);
        result
    }

    // === Keyboard helpers ===

    pub fn key_press(&self, key: Key) -> Vec<CommandResult> {
        self.dispatch(WindowEvent::KeyPressed {
            text: key.into(),
        })
    }

    pub fn key_release(&self, key: Key) -> Vec<CommandResult> {
        self.dispatch(WindowEvent::KeyReleased {
            text: key.into(),
        })
    }

    pub fn key_tap(&self, key: Key) -> Vec<CommandResult> {
        let results = self.key_press(key);
        self.key_release(key);
        results
    }

    pub fn type_text(&self, text: &str) -> Vec<CommandResult> {
        let results = self.dispatch(WindowEvent::KeyPressed { text: text.into() });
        self.dispatch(WindowEvent::KeyReleased { text: text.into() });
        results
    }

    /// Hold `modifiers`, type `text`, release the modifiers.
    pub fn shortcut(&self, modifiers: &[Key], text: &str) -> Vec<CommandResult> {
        for m in modifiers {
            self.key_press(*m);
        }
        let results = self.type_text(text);
        for m in modifiers.iter().rev() {
            self.key_release(*m);
        }
        results
    }

    // === State queries ===

    pub fn node(&self, id: i32) -> Option<NodeRecord> {
        self.graph.borrow().node(id)
    }

    /// Screen-space center of a node at the current viewport.
    pub fn node_center(&self, id: i32) -> Option<(f32, f32)> {
        let center = self.viewport.borrow().world_to_screen(self.node(id)?.center());
        Some((center.x, center.y))
    }

    pub fn node_count(&self) -> usize {
        self.graph.borrow().node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.borrow().connection_count()
    }

    pub fn selected(&self) -> Vec<i32> {
        self.selection.borrow().iter().collect()
    }

    pub fn undo_len(&self) -> usize {
        self.editor.executor().history().borrow().undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.editor.executor().history().borrow().redo_len()
    }

    pub fn zoom(&self) -> f32 {
        use slint_node_interaction::ViewportSurface;
        self.viewport.borrow().zoom()
    }
}
