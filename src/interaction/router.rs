use super::{
    ActiveInteractionContext, InputEvent, InteractionContext, InteractionDefinition, PreconditionScope,
};
use crate::command::{CommandExecutor, CommandResult, PartialCommandContext};
use crate::surfaces::SelectionSurface;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::rc::Rc;

/// Context metadata key carrying the id of the interaction that dispatched.
pub const INTERACTION_METADATA_KEY: &str = "interaction";

/// The outcome of matching an event against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedCommand {
    pub definition_id: String,
    pub command: String,
    pub payload: Value,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

/// Maps input events to commands through a priority-ordered catalog of
/// [`InteractionDefinition`]s.
///
/// The catalog stays sorted by descending priority; rules of equal priority
/// keep their registration order. Registering a rule under an existing id
/// replaces it.
pub struct InteractionRouter {
    executor: Rc<CommandExecutor>,
    selection: Option<Rc<RefCell<dyn SelectionSurface>>>,
    definitions: RefCell<Vec<InteractionDefinition>>,
    context: RefCell<ActiveInteractionContext>,
    attached: Cell<bool>,
}

impl InteractionRouter {
    pub fn new(executor: Rc<CommandExecutor>) -> Self {
        Self {
            executor,
            selection: None,
            definitions: RefCell::new(Vec::new()),
            context: RefCell::new(ActiveInteractionContext::default()),
            attached: Cell::new(true),
        }
    }

    /// Give selection preconditions something to look at.
    pub fn with_selection(mut self, selection: Rc<RefCell<dyn SelectionSurface>>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn register(&self, definition: InteractionDefinition) {
        let mut definitions = self.definitions.borrow_mut();
        if let Some(existing) = definitions.iter_mut().find(|d| d.id == definition.id) {
            tracing::debug!(interaction = %definition.id, "interaction replaced");
            *existing = definition;
        } else {
            definitions.push(definition);
        }
        definitions.sort_by_key(|d| Reverse(d.priority));
    }

    pub fn register_all<I>(&self, definitions: I)
    where
        I: IntoIterator<Item = InteractionDefinition>,
    {
        for definition in definitions {
            self.register(definition);
        }
    }

    /// Ids in matching order.
    pub fn definition_ids(&self) -> Vec<String> {
        self.definitions.borrow().iter().map(|d| d.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }

    pub fn set_context(&self, context: InteractionContext, data: Value) {
        tracing::debug!(?context, "interaction context changed");
        *self.context.borrow_mut() = ActiveInteractionContext::new(context, data);
    }

    pub fn context(&self) -> ActiveInteractionContext {
        self.context.borrow().clone()
    }

    /// Find the rule `event` triggers, without dispatching anything.
    pub fn resolve(&self, event: &InputEvent) -> Option<RoutedCommand> {
        let context = self.context.borrow();
        let selection = self.selection.as_ref().map(|s| s.borrow());
        let scope = PreconditionScope {
            context: &context,
            selection: selection.as_deref(),
            event,
        };

        let definitions = self.definitions.borrow();
        let definition = definitions.iter().find(|d| {
            d.applies_in(context.context)
                && d.matcher.matches(event)
                && d.preconditions.iter().all(|p| p.evaluate(&scope))
        })?;

        Some(RoutedCommand {
            definition_id: definition.id.clone(),
            command: definition.command.clone(),
            payload: definition.payload_for(event),
            prevent_default: definition.matcher.prevent_default,
            stop_propagation: definition.matcher.stop_propagation,
        })
    }

    /// Resolve `event` and dispatch the matched command. `None` when nothing
    /// matched or the router is detached.
    pub async fn route(&self, event: &InputEvent) -> Option<CommandResult> {
        if !self.attached.get() {
            tracing::trace!(kind = ?event.kind, "router detached, event ignored");
            return None;
        }
        let Some(routed) = self.resolve(event) else {
            tracing::trace!(kind = ?event.kind, "no interaction matched");
            return None;
        };
        if routed.prevent_default {
            event.prevent_default();
        }
        if routed.stop_propagation {
            event.stop_propagation();
        }
        tracing::debug!(
            interaction = %routed.definition_id,
            command = %routed.command,
            "interaction matched"
        );

        let context = PartialCommandContext::default()
            .with_metadata(INTERACTION_METADATA_KEY, json!(routed.definition_id));
        Some(self.executor.execute(&routed.command, routed.payload, Some(context)).await)
    }

    /// Detach from the input source and drop every rule.
    pub fn cleanup(&self) {
        self.attached.set(false);
        self.definitions.borrow_mut().clear();
    }

    pub fn attach(&self) {
        self.attached.set(true);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }
}
