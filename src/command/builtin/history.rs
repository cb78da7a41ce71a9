//! Undo, redo and clear-history commands.
//!
//! These drive the [`HistoryStore`] shared with the executor. They hold the
//! executor weakly since the executor's registry owns them.

use crate::command::executor::panic_message;
use crate::command::{
    Command, CommandCategory, CommandContext, CommandExecutor, CommandMetadata, CommandResult,
    Effect, HistoryStore, PartialCommandContext, PendingUndo, ValidationResult,
};
use crate::error::CommandError;
use crate::surfaces::ToastLevel;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::rc::{Rc, Weak};

fn history_metadata(name: &str) -> CommandMetadata {
    CommandMetadata::new(name, CommandCategory::History)
}

fn display_name(executor: &CommandExecutor, id: &str) -> String {
    executor
        .get(id)
        .map(|c| c.metadata().name.clone())
        .unwrap_or_else(|| id.to_string())
}

// ============================================================================
// history.undo
// ============================================================================

pub struct Undo {
    executor: Weak<CommandExecutor>,
    history: Rc<RefCell<HistoryStore>>,
    metadata: CommandMetadata,
}

impl Undo {
    pub fn new(executor: &Rc<CommandExecutor>) -> Self {
        Self {
            executor: Rc::downgrade(executor),
            history: executor.history(),
            metadata: history_metadata("Undo"),
        }
    }

    fn rollback(&self, pending: PendingUndo, reason: &str) {
        let command = pending.entry.command.clone();
        self.history.borrow_mut().finish_undo(pending, false);
        tracing::warn!(command = %command, reason, "undo rolled back");
    }
}

#[async_trait(?Send)]
impl Command for Undo {
    fn id(&self) -> &str {
        "history.undo"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, _payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        if self.history.borrow().can_undo() {
            ValidationResult::ok()
        } else {
            ValidationResult::invalid("Nothing to undo")
        }
    }

    async fn execute(&self, _payload: &Value, ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let pending = self
            .history
            .borrow_mut()
            .begin_undo()
            .ok_or_else(|| CommandError::execution("Nothing to undo"))?;
        let executor = self.executor.upgrade();

        let command = executor
            .as_ref()
            .and_then(|e| e.get(&pending.entry.command))
            .filter(|c| c.metadata().undoable && c.supports_undo());
        let Some(command) = command else {
            self.rollback(pending, "not undoable");
            return Err(CommandError::NotUndoable);
        };

        let outcome = AssertUnwindSafe(command.undo(&pending.entry.result, ctx))
            .catch_unwind()
            .await;
        let failure = match outcome {
            Ok(Ok(result)) if result.success => None,
            Ok(Ok(result)) => Some(result.error_message().to_string()),
            Ok(Err(err)) => Some(err.to_string()),
            Err(panic) => Some(panic_message(panic)),
        };
        if let Some(error) = failure {
            self.rollback(pending, &error);
            return Err(CommandError::UndoFailed(error));
        }

        let name = command.metadata().name.clone();
        let id = pending.entry.command.clone();
        let redoable = self.history.borrow_mut().finish_undo(pending, true);
        tracing::debug!(command = %id, redoable, "undone");
        Ok(CommandResult::ok()
            .with_data(json!({ "command": id }))
            .with_effect(Effect::toast(ToastLevel::Info, format!("Undo: {name}"))))
    }
}

// ============================================================================
// history.redo
// ============================================================================

/// Re-dispatches the newest undone entry through the executor, flagged as a
/// replay so the remaining redo entries survive. A failed redo puts the
/// entry back and reports a plain failure, since the replayed command has
/// already notified its own error.
pub struct Redo {
    executor: Weak<CommandExecutor>,
    history: Rc<RefCell<HistoryStore>>,
    metadata: CommandMetadata,
}

impl Redo {
    pub fn new(executor: &Rc<CommandExecutor>) -> Self {
        Self {
            executor: Rc::downgrade(executor),
            history: executor.history(),
            metadata: history_metadata("Redo"),
        }
    }
}

#[async_trait(?Send)]
impl Command for Redo {
    fn id(&self) -> &str {
        "history.redo"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, _payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        if self.history.borrow().can_redo() {
            ValidationResult::ok()
        } else {
            ValidationResult::invalid("Nothing to redo")
        }
    }

    async fn execute(&self, _payload: &Value, ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        let executor = self
            .executor
            .upgrade()
            .ok_or_else(|| CommandError::execution("Command executor is gone"))?;
        let entry = self
            .history
            .borrow_mut()
            .take_redo()
            .ok_or_else(|| CommandError::execution("Nothing to redo"))?;

        let mut replay = PartialCommandContext::default().as_replay();
        if let Some(signal) = &ctx.cancellation {
            replay = replay.with_cancellation(signal.clone());
        }
        let result = executor
            .execute(&entry.command, entry.payload.clone(), Some(replay))
            .await;

        if !result.success {
            let error = result.error_message().to_string();
            tracing::warn!(command = %entry.command, error = %error, "redo failed, entry restored");
            self.history.borrow_mut().restore_redo(entry);
            return Ok(CommandResult::failure(format!("Redo failed: {error}")));
        }

        let name = display_name(&executor, &entry.command);
        Ok(CommandResult::ok()
            .with_data(json!({ "command": entry.command }))
            .with_effect(Effect::toast(ToastLevel::Info, format!("Redo: {name}"))))
    }
}

// ============================================================================
// history.clear
// ============================================================================

pub struct ClearHistory {
    history: Rc<RefCell<HistoryStore>>,
    metadata: CommandMetadata,
}

impl ClearHistory {
    pub fn new(history: Rc<RefCell<HistoryStore>>) -> Self {
        Self {
            history,
            metadata: history_metadata("Clear History"),
        }
    }
}

#[async_trait(?Send)]
impl Command for ClearHistory {
    fn id(&self) -> &str {
        "history.clear"
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn execute(&self, _payload: &Value, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        self.history.borrow_mut().clear();
        Ok(CommandResult::ok().with_effect(Effect::toast(ToastLevel::Info, "History cleared")))
    }
}
