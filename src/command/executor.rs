use super::{
    now_ms, Command, CommandHistoryEntry, CommandResult, EffectProcessor, HistoryStore,
    PartialCommandContext, RECORDED_PAYLOAD_KEY,
};
use crate::error::CommandError;
use crate::surfaces::Notifier;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

/// Commands keyed by id. Registering an id again replaces the old command.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Rc<dyn Command>>,
}

impl CommandRegistry {
    pub fn register(&mut self, command: Rc<dyn Command>) {
        let id = command.id().to_string();
        if self.commands.insert(id.clone(), command).is_some() {
            tracing::debug!(command = %id, "command replaced");
        }
    }

    pub fn get(&self, id: &str) -> Option<Rc<dyn Command>> {
        self.commands.get(id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.commands.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Marks a command id as running until dropped.
struct InFlightGuard<'a> {
    running: &'a RefCell<HashSet<String>>,
    id: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(running: &'a RefCell<HashSet<String>>, id: &str) -> Option<Self> {
        running.borrow_mut().insert(id.to_string()).then(|| Self {
            running,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.running.borrow_mut().remove(&self.id);
    }
}

pub(crate) fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Command panicked".to_string()
    }
}

/// Registry plus the transactional dispatch pipeline.
///
/// `execute` looks the command up, builds a context, validates, executes
/// (containing errors and panics), records undoable successes in the
/// [`HistoryStore`] and forwards effects, or a default notification, to the
/// [`EffectProcessor`]. A second dispatch of a command id that is still
/// running fails immediately.
pub struct CommandExecutor {
    registry: RefCell<CommandRegistry>,
    history: Rc<RefCell<HistoryStore>>,
    effects: EffectProcessor,
    running: RefCell<HashSet<String>>,
}

impl CommandExecutor {
    pub fn new(notifier: Rc<dyn Notifier>, history_capacity: usize) -> Self {
        Self::with_history(notifier, Rc::new(RefCell::new(HistoryStore::new(history_capacity))))
    }

    pub fn with_history(notifier: Rc<dyn Notifier>, history: Rc<RefCell<HistoryStore>>) -> Self {
        Self {
            registry: RefCell::new(CommandRegistry::default()),
            history,
            effects: EffectProcessor::new(notifier),
            running: RefCell::new(HashSet::new()),
        }
    }

    pub fn register(&self, command: impl Command + 'static) {
        self.register_rc(Rc::new(command));
    }

    pub fn register_rc(&self, command: Rc<dyn Command>) {
        self.registry.borrow_mut().register(command);
    }

    pub fn register_all<I>(&self, commands: I)
    where
        I: IntoIterator<Item = Rc<dyn Command>>,
    {
        let mut registry = self.registry.borrow_mut();
        for command in commands {
            registry.register(command);
        }
    }

    pub fn get(&self, id: &str) -> Option<Rc<dyn Command>> {
        self.registry.borrow().get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.registry.borrow().has(id)
    }

    pub fn command_ids(&self) -> Vec<String> {
        self.registry.borrow().ids()
    }

    /// All commands, ordered by id.
    pub fn commands(&self) -> Vec<Rc<dyn Command>> {
        let registry = self.registry.borrow();
        registry.ids().iter().filter_map(|id| registry.get(id)).collect()
    }

    pub fn clear(&self) {
        self.registry.borrow_mut().clear();
    }

    pub fn history(&self) -> Rc<RefCell<HistoryStore>> {
        self.history.clone()
    }

    pub fn effects(&self) -> &EffectProcessor {
        &self.effects
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.running.borrow().contains(id)
    }

    /// Run a command through the full pipeline. Never fails: every outcome,
    /// including unknown ids and panics, is a [`CommandResult`].
    pub async fn execute(
        &self,
        id: &str,
        payload: Value,
        context: Option<PartialCommandContext>,
    ) -> CommandResult {
        let Some(command) = self.get(id) else {
            tracing::debug!(command = %id, "dispatch of unknown command");
            return CommandResult::failure(CommandError::NotFound(id.to_string()).to_string());
        };
        let Some(_guard) = InFlightGuard::acquire(&self.running, id) else {
            tracing::debug!(command = %id, "dispatch rejected, already running");
            return CommandResult::failure(CommandError::AlreadyRunning(id.to_string()).to_string());
        };

        let ctx = context.unwrap_or_default().resolve(now_ms());
        tracing::debug!(command = %id, timestamp = ctx.timestamp_ms, "dispatch");

        let validation =
            match std::panic::catch_unwind(AssertUnwindSafe(|| command.validate(&payload, &ctx))) {
                Ok(validation) => validation,
                Err(panic) => return self.contain(id, panic_message(panic)),
            };
        if let Some(error) = validation.error() {
            tracing::debug!(command = %id, error, "validation failed");
            let mut result = CommandResult::failure(error);
            if !validation.field_errors().is_empty() {
                let fields = validation
                    .field_errors()
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                result = result.with_metadata("field_errors", Value::Object(fields));
            }
            return result;
        }

        let outcome = AssertUnwindSafe(command.execute(&payload, &ctx))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => return self.contain(id, err.to_string()),
            Err(panic) => return self.contain(id, panic_message(panic)),
        };

        if result.success {
            if command.metadata().undoable {
                let payload = result
                    .metadata
                    .get(RECORDED_PAYLOAD_KEY)
                    .cloned()
                    .unwrap_or(payload);
                let entry = CommandHistoryEntry {
                    command: id.to_string(),
                    payload,
                    result: result.clone(),
                    timestamp_ms: ctx.timestamp_ms,
                };
                let mut history = self.history.borrow_mut();
                if ctx.is_replay() {
                    history.push_replayed(entry);
                } else {
                    history.push(entry);
                }
            }
            if result.effects.is_empty() {
                self.effects.notifier().success_for_command(id);
            } else {
                self.effects.process_all(&result.effects);
            }
        }
        result
    }

    /// A failure raised by the command itself: log, notify, fold into a result.
    fn contain(&self, id: &str, message: String) -> CommandResult {
        tracing::warn!(command = %id, error = %message, "command failed");
        self.effects.notifier().error_for_command(id, &message);
        CommandResult::failure(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandCategory, CommandMetadata, FnCommand, ValidationResult};
    use crate::notifications::NotificationCenter;
    use serde_json::json;

    fn executor() -> (CommandExecutor, Rc<NotificationCenter>) {
        let center = Rc::new(NotificationCenter::new());
        (CommandExecutor::new(center.clone(), 100), center)
    }

    fn meta() -> CommandMetadata {
        CommandMetadata::new("Test", CommandCategory::GraphMutation)
    }

    #[tokio::test]
    async fn test_unknown_command_is_a_result() {
        let (exec, center) = executor();
        let result = exec.execute("nonexistent", json!({}), None).await;
        assert!(!result.success);
        assert!(result.error_message().contains("not found"));
        assert!(center.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_field_errors_in_metadata() {
        let (exec, _) = executor();
        exec.register(
            FnCommand::new("c", meta(), |_, _| async { Ok(CommandResult::ok()) })
                .with_validate(|_, _| ValidationResult::ok().with_field_error("title", "required")),
        );
        let result = exec.execute("c", json!({}), None).await;
        assert_eq!(result.error.as_deref(), Some("Validation failed"));
        assert_eq!(result.metadata["field_errors"], json!({ "title": "required" }));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (exec, center) = executor();
        exec.register(FnCommand::new("boom", meta(), |_, _| async {
            if true {
                panic!("kaboom");
            }
            Ok(CommandResult::ok())
        }));
        let result = exec.execute("boom", json!({}), None).await;
        assert_eq!(result.error.as_deref(), Some("kaboom"));
        assert_eq!(center.errors(), vec![("boom".to_string(), "kaboom".to_string())]);
        assert!(!exec.is_running("boom"));
    }

    #[tokio::test]
    async fn test_success_without_effects_uses_default_notification() {
        let (exec, center) = executor();
        exec.register(FnCommand::new("quiet", meta(), |_, _| async { Ok(CommandResult::ok()) }));
        exec.execute("quiet", json!({}), None).await;
        assert_eq!(center.successes(), vec!["quiet".to_string()]);
    }

    #[tokio::test]
    async fn test_replay_context_keeps_redo_stack() {
        let (exec, _) = executor();
        exec.register(FnCommand::new("u", meta().undoable(), |_, _| async { Ok(CommandResult::ok()) }));
        exec.execute("u", json!({ "n": 1 }), None).await;
        exec.execute("u", json!({ "n": 2 }), None).await;
        exec.history().borrow_mut().pop_undo();
        exec.history().borrow_mut().pop_undo();
        exec.history().borrow_mut().take_redo();

        let replay = PartialCommandContext::default().as_replay();
        exec.execute("u", json!({ "n": 1 }), Some(replay)).await;
        let history = exec.history();
        assert_eq!(history.borrow().undo_len(), 1);
        assert_eq!(history.borrow().redo_len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_cannot_mark_a_replay() {
        let (exec, _) = executor();
        exec.register(FnCommand::new("u", meta().undoable(), |_, _| async { Ok(CommandResult::ok()) }));
        exec.execute("u", json!({ "n": 1 }), None).await;
        exec.history().borrow_mut().pop_undo();

        let forged = PartialCommandContext::default().with_metadata("history_replay", json!(true));
        exec.execute("u", json!({ "n": 2 }), Some(forged)).await;
        assert_eq!(exec.history().borrow().redo_len(), 0);
    }

    #[tokio::test]
    async fn test_timestamp_override_is_recorded() {
        let (exec, _) = executor();
        exec.register(FnCommand::new("u", meta().undoable(), |_, _| async { Ok(CommandResult::ok()) }));
        exec.execute("u", json!({}), Some(PartialCommandContext::default().with_timestamp(1234)))
            .await;
        assert_eq!(exec.history().borrow().peek_undo().map(|e| e.timestamp_ms), Some(1234));
    }

    #[tokio::test]
    async fn test_recorded_payload_replaces_dispatched_one() {
        let (exec, _) = executor();
        exec.register(FnCommand::new("u", meta().undoable(), |_, _| async {
            Ok(CommandResult::ok().with_recorded_payload(json!({ "id": 7 })))
        }));
        exec.execute("u", json!({}), None).await;
        assert_eq!(
            exec.history().borrow().peek_undo().map(|e| e.payload.clone()),
            Some(json!({ "id": 7 }))
        );
    }

    #[test]
    fn test_command_ids_sorted() {
        let (exec, _) = executor();
        exec.register(FnCommand::new("b", meta(), |_, _| async { Ok(CommandResult::ok()) }));
        exec.register(FnCommand::new("a", meta(), |_, _| async { Ok(CommandResult::ok()) }));
        assert_eq!(exec.command_ids(), vec!["a", "b"]);
        assert_eq!(exec.commands().len(), 2);
        exec.clear();
        assert!(!exec.has("a"));
    }
}
