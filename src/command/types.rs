use crate::surfaces::ToastLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Result metadata key under which a command may store the payload its
/// history entry should replay, e.g. with generated ids filled in.
pub const RECORDED_PAYLOAD_KEY: &str = "recorded_payload";

/// Closed set of command categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandCategory {
    GraphMutation,
    Navigation,
    Selection,
    UiControl,
    FileOperation,
    ViewControl,
    History,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub name: String,
    pub description: String,
    pub category: CommandCategory,
    pub undoable: bool,
    pub mutates_graph: bool,
}

impl CommandMetadata {
    pub fn new(name: impl Into<String>, category: CommandCategory) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            undoable: false,
            mutates_graph: false,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn undoable(mut self) -> Self {
        self.undoable = true;
        self
    }

    pub fn mutates_graph(mut self) -> Self {
        self.mutates_graph = true;
        self
    }
}

/// Outcome of [`Command::validate`](super::Command::validate).
///
/// An invalid result always carries an error message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    valid: bool,
    error: Option<String>,
    field_errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            field_errors: BTreeMap::new(),
        }
    }

    /// Attach a per-field message. Marks the result invalid.
    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.valid = false;
        self.field_errors.insert(field.into(), message.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn error(&self) -> Option<&str> {
        if self.valid {
            return None;
        }
        Some(self.error.as_deref().unwrap_or("Validation failed"))
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Toast,
    Animation,
    Sound,
    Navigation,
}

/// A declarative side-effect request. Only toast payloads are read by the
/// core (`message`, `level`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub payload: Value,
}

impl Effect {
    pub fn new(kind: EffectKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    pub fn toast(level: ToastLevel, message: impl Into<String>) -> Self {
        Self::new(
            EffectKind::Toast,
            serde_json::json!({ "message": message.into(), "level": level.as_str() }),
        )
    }
}

/// What a dispatch returns. A failed result never carries `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    data: Option<Value>,
    pub error: Option<String>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            effects: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::ok()
        }
    }

    /// Attach data. Ignored on a failed result.
    pub fn with_data(mut self, data: Value) -> Self {
        if self.success {
            self.data = Some(data);
        }
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Payload to record in history instead of the dispatched one.
    pub fn with_recorded_payload(self, payload: Value) -> Self {
        self.with_metadata(RECORDED_PAYLOAD_KEY, payload)
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

/// Cooperative cancellation flag. Commands check it themselves.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal(Rc<Cell<bool>>);

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Per-dispatch context, built fresh by the executor.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub timestamp_ms: u64,
    pub cancellation: Option<CancellationSignal>,
    pub metadata: Map<String, Value>,
    /// Set only by `history.redo`; replays keep the remaining redo stack.
    pub(crate) replay: bool,
}

impl CommandContext {
    pub fn now() -> Self {
        Self {
            timestamp_ms: now_ms(),
            ..Default::default()
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationSignal::is_cancelled)
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }
}

/// Caller-supplied overrides for a dispatch's context.
#[derive(Debug, Clone, Default)]
pub struct PartialCommandContext {
    pub timestamp_ms: Option<u64>,
    pub cancellation: Option<CancellationSignal>,
    pub metadata: Map<String, Value>,
    pub(crate) replay: bool,
}

impl PartialCommandContext {
    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = Some(signal);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub(crate) fn as_replay(mut self) -> Self {
        self.replay = true;
        self
    }

    /// Overlay onto a fresh context stamped `now`.
    pub fn resolve(self, now: u64) -> CommandContext {
        CommandContext {
            timestamp_ms: self.timestamp_ms.unwrap_or(now),
            cancellation: self.cancellation,
            metadata: self.metadata,
            replay: self.replay,
        }
    }
}

/// One executed, undoable dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandHistoryEntry {
    pub command: String,
    pub payload: Value,
    pub result: CommandResult,
    pub timestamp_ms: u64,
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_defaults_error_message() {
        let v = ValidationResult::ok().with_field_error("x", "required");
        assert!(!v.is_valid());
        assert_eq!(v.error(), Some("Validation failed"));
        assert_eq!(v.field_errors()["x"], "required");
        assert_eq!(ValidationResult::ok().error(), None);
    }

    #[test]
    fn test_failure_never_carries_data() {
        let r = CommandResult::failure("nope").with_data(json!(1));
        assert!(r.data().is_none());
        assert_eq!(r.error_message(), "nope");
        assert_eq!(CommandResult::ok().with_data(json!(1)).data(), Some(&json!(1)));
    }

    #[test]
    fn test_toast_payload_shape() {
        let e = Effect::toast(ToastLevel::Warning, "careful");
        assert_eq!(e.kind, EffectKind::Toast);
        assert_eq!(e.payload, json!({ "message": "careful", "level": "warning" }));
    }

    #[test]
    fn test_partial_context_overlays_defaults() {
        let signal = CancellationSignal::new();
        let ctx = PartialCommandContext::default()
            .with_cancellation(signal.clone())
            .as_replay()
            .resolve(42);
        assert_eq!(ctx.timestamp_ms, 42);
        assert!(ctx.is_replay());
        assert!(!ctx.is_cancelled());
        signal.cancel();
        assert!(ctx.is_cancelled());

        assert_eq!(PartialCommandContext::default().with_timestamp(7).resolve(42).timestamp_ms, 7);
    }

    #[test]
    fn test_replay_flag_is_not_set_through_metadata() {
        let ctx = PartialCommandContext::default()
            .with_metadata("history_replay", json!(true))
            .resolve(0);
        assert!(!ctx.is_replay());
    }
}
