use super::{EventMatcher, InputEvent, Precondition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// UI region or mode that scopes which interactions are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionContext {
    #[default]
    Global,
    Canvas,
    Panel,
    Form,
    Modal,
}

/// The current context plus whatever data the UI attached to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActiveInteractionContext {
    pub context: InteractionContext,
    pub data: Value,
}

impl ActiveInteractionContext {
    pub fn new(context: InteractionContext, data: Value) -> Self {
        Self { context, data }
    }
}

pub type PayloadMapper = Rc<dyn Fn(&InputEvent) -> Value>;

/// A declarative rule: matched event + context + preconditions -> command.
#[derive(Clone)]
pub struct InteractionDefinition {
    pub id: String,
    /// Contexts this rule is active in. Empty or containing `Global` means
    /// everywhere.
    pub contexts: Vec<InteractionContext>,
    pub matcher: EventMatcher,
    pub command: String,
    pub preconditions: Vec<Precondition>,
    pub payload_mapper: Option<PayloadMapper>,
    pub priority: i32,
    pub description: Option<String>,
}

impl fmt::Debug for InteractionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionDefinition")
            .field("id", &self.id)
            .field("contexts", &self.contexts)
            .field("matcher", &self.matcher)
            .field("command", &self.command)
            .field("preconditions", &self.preconditions)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl InteractionDefinition {
    pub fn new(id: impl Into<String>, matcher: EventMatcher, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contexts: Vec::new(),
            matcher,
            command: command.into(),
            preconditions: Vec::new(),
            payload_mapper: None,
            priority: 0,
            description: None,
        }
    }

    pub fn in_context(mut self, context: InteractionContext) -> Self {
        if !self.contexts.contains(&context) {
            self.contexts.push(context);
        }
        self
    }

    pub fn when(mut self, precondition: impl Into<Precondition>) -> Self {
        self.preconditions.push(precondition.into());
        self
    }

    pub fn with_payload(mut self, mapper: impl Fn(&InputEvent) -> Value + 'static) -> Self {
        self.payload_mapper = Some(Rc::new(mapper));
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn applies_in(&self, context: InteractionContext) -> bool {
        self.contexts.is_empty()
            || self.contexts.contains(&InteractionContext::Global)
            || self.contexts.contains(&context)
    }

    /// Payload for `event`: the mapper's output or an empty object.
    pub fn payload_for(&self, event: &InputEvent) -> Value {
        match &self.payload_mapper {
            Some(mapper) => mapper(event),
            None => Value::Object(Default::default()),
        }
    }
}
