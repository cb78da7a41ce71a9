//! Commands, the registry/executor that runs them, and the undo history.
//!
//! Every user-visible mutation goes through [`CommandExecutor::execute`]:
//! lookup, validate, execute, record, effects. Nothing below that boundary
//! escapes as an error or a panic; callers always get a [`CommandResult`].

pub mod builtin;
mod effects;
mod executor;
mod function;
mod history;
mod types;

pub use effects::{AnimationHandler, EffectProcessor, NavigationHandler, SoundHandler};
pub use executor::{CommandExecutor, CommandRegistry};
pub use function::FnCommand;
pub use history::{HistoryStore, PendingUndo};
pub use types::{
    now_ms, CancellationSignal, CommandCategory, CommandContext, CommandHistoryEntry,
    CommandMetadata, CommandResult, Effect, EffectKind, PartialCommandContext, ValidationResult,
    RECORDED_PAYLOAD_KEY,
};

use crate::error::CommandError;
use async_trait::async_trait;
use serde_json::Value;

/// A named, validated, optionally reversible unit of behavior.
///
/// Commands are single-threaded: futures are `!Send` and may hold `Rc`s to
/// the editor surfaces, but must not keep a `RefCell` borrow across `.await`.
#[async_trait(?Send)]
pub trait Command {
    fn id(&self) -> &str;

    fn metadata(&self) -> &CommandMetadata;

    fn validate(&self, _payload: &Value, _ctx: &CommandContext) -> ValidationResult {
        ValidationResult::ok()
    }

    async fn execute(&self, payload: &Value, ctx: &CommandContext) -> Result<CommandResult, CommandError>;

    /// Whether [`Command::undo`] is implemented.
    fn supports_undo(&self) -> bool {
        false
    }

    /// Revert a previous successful execution, given its result.
    async fn undo(&self, _result: &CommandResult, _ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        Err(CommandError::NotUndoable)
    }
}
