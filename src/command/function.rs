use super::{Command, CommandContext, CommandMetadata, CommandResult, ValidationResult};
use crate::error::CommandError;
use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

type ValidateFn = Rc<dyn Fn(&Value, &CommandContext) -> ValidationResult>;
type ExecuteFn =
    Rc<dyn Fn(Value, CommandContext) -> LocalBoxFuture<'static, Result<CommandResult, CommandError>>>;
type UndoFn = Rc<
    dyn Fn(CommandResult, CommandContext) -> LocalBoxFuture<'static, Result<CommandResult, CommandError>>,
>;

/// A command assembled from closures.
///
/// Handy for application-specific one-offs and for tests. The closures get
/// owned copies of the payload and context so the returned futures can be
/// `'static`.
#[derive(Clone)]
pub struct FnCommand {
    id: String,
    metadata: CommandMetadata,
    validate: Option<ValidateFn>,
    execute: ExecuteFn,
    undo: Option<UndoFn>,
}

impl FnCommand {
    pub fn new<F, Fut>(id: impl Into<String>, metadata: CommandMetadata, execute: F) -> Self
    where
        F: Fn(Value, CommandContext) -> Fut + 'static,
        Fut: Future<Output = Result<CommandResult, CommandError>> + 'static,
    {
        Self {
            id: id.into(),
            metadata,
            validate: None,
            execute: Rc::new(move |payload, ctx| execute(payload, ctx).boxed_local()),
            undo: None,
        }
    }

    pub fn with_validate(
        mut self,
        validate: impl Fn(&Value, &CommandContext) -> ValidationResult + 'static,
    ) -> Self {
        self.validate = Some(Rc::new(validate));
        self
    }

    pub fn with_undo<F, Fut>(mut self, undo: F) -> Self
    where
        F: Fn(CommandResult, CommandContext) -> Fut + 'static,
        Fut: Future<Output = Result<CommandResult, CommandError>> + 'static,
    {
        self.undo = Some(Rc::new(move |result, ctx| undo(result, ctx).boxed_local()));
        self
    }
}

#[async_trait(?Send)]
impl Command for FnCommand {
    fn id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn validate(&self, payload: &Value, ctx: &CommandContext) -> ValidationResult {
        match &self.validate {
            Some(validate) => validate(payload, ctx),
            None => ValidationResult::ok(),
        }
    }

    async fn execute(&self, payload: &Value, ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        (self.execute)(payload.clone(), ctx.clone()).await
    }

    fn supports_undo(&self) -> bool {
        self.undo.is_some()
    }

    async fn undo(&self, result: &CommandResult, ctx: &CommandContext) -> Result<CommandResult, CommandError> {
        match &self.undo {
            Some(undo) => undo(result.clone(), ctx.clone()).await,
            None => Err(CommandError::NotUndoable),
        }
    }
}
