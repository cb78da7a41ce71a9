//! # Slint Node Interaction
//!
//! The input-to-mutation pipeline of a Slint graph editor: raw pointer, touch
//! and keyboard events are recognized as gestures, matched against
//! context-sensitive interaction rules, turned into commands and executed
//! against the graph with full undo/redo.
//!
//! ## Features
//!
//! - **Gesture Recognition** - Tap, long-press, swipe, pinch, rotate and pan
//!   recognizers driven in lockstep by a [`GestureCoordinator`]
//! - **Interaction Rules** - CSS-like target selectors, key and modifier
//!   matching, contexts and preconditions, resolved by priority
//! - **Commands** - Validated, async, optionally undoable units of behavior
//!   with panic containment and declarative side effects
//! - **History** - Bounded undo/redo stacks with rollback on failure
//! - **Surface Traits** - The graph, selection, viewport, panels and
//!   notifications are injected, with in-memory reference implementations
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_node_interaction::{Editor, EditorSettings};
//!
//! let editor = Editor::new(EditorSettings::default());
//! let result = editor
//!     .execute("node.add", serde_json::json!({ "kind": "math.add", "x": 40.0, "y": 60.0 }))
//!     .await;
//! assert!(result.success);
//!
//! // From a slint window callback
//! editor.handle_window_event(&event, time_ms).await;
//! ```
//!
//! ## Modules
//!
//! - [`gesture`] - Recognizers and the [`GestureCoordinator`]
//! - [`interaction`] - Selectors, matchers, preconditions and the [`InteractionRouter`]
//! - [`command`] - The [`Command`] trait, [`CommandExecutor`], [`HistoryStore`] and built-ins
//! - [`surfaces`] - Collaborator traits consumed by the built-in commands
//! - [`editor`] - The [`Editor`] facade wiring it all together
//!
//! Logging goes through `tracing`; install a subscriber to see it.

pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod graph;
pub mod interaction;
pub mod notifications;
pub mod panels;
pub mod selection;
pub mod slint_bridge;
pub mod surfaces;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use command::builtin::register_builtin_commands;
pub use command::{
    CancellationSignal, Command, CommandCategory, CommandContext, CommandExecutor,
    CommandHistoryEntry, CommandMetadata, CommandRegistry, CommandResult, Effect, EffectKind,
    EffectProcessor, FnCommand, HistoryStore, PartialCommandContext, PendingUndo, ValidationResult,
};
pub use config::{load_settings, EditorSettings, GestureSettings, InputMode};
pub use editor::Editor;
pub use error::{CommandError, ConfigError, SelectorError, SurfaceError};
pub use geometry::Point;
pub use gesture::{
    Gesture, GestureCoordinator, GestureEvent, GestureRecognizer, GestureType, PointerEvent,
    PointerKind, PointerPhase, SwipeDirection, TouchEvent, TouchPhase, TouchPoint,
};
pub use graph::{
    BasicConnectionValidator, CompositeValidator, ConnectionCheck, ConnectionError,
    ConnectionValidator, GraphDocument, MaxInputsValidator, NoDuplicatesValidator,
};
pub use hit_test::{connection_at, node_at, nodes_in_selection_box, NodeGeometry, TargetResolver};
pub use interaction::{
    default_catalog, Condition, EventKind, EventMatcher, EventTarget, InputEvent,
    InteractionContext, InteractionDefinition, InteractionRouter, ModifierMatch, Modifiers,
    Precondition, Selector,
};
pub use notifications::{Notification, NotificationCenter};
pub use panels::PanelState;
pub use selection::SelectionManager;
pub use slint_bridge::{TranslatedEvent, WindowEventTranslator};
pub use surfaces::{
    ConnectionRecord, EditorSurfaces, GraphStore, NodePatch, NodeRecord, Notifier, PanelSurface,
    SelectionSurface, ToastLevel, ViewportSurface,
};
pub use viewport::ViewportState;
