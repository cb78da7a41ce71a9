use super::{ActiveInteractionContext, InputEvent};
use crate::surfaces::SelectionSurface;
use std::fmt;
use std::rc::Rc;

/// What a precondition can look at.
pub struct PreconditionScope<'a> {
    pub context: &'a ActiveInteractionContext,
    pub selection: Option<&'a dyn SelectionSurface>,
    pub event: &'a InputEvent,
}

pub type CustomCondition = Rc<dyn Fn(&PreconditionScope<'_>) -> bool>;

/// A check evaluated before an interaction is allowed to fire.
#[derive(Clone)]
pub enum Condition {
    /// Any node or connection is selected.
    HasSelection,
    HasNodeSelection,
    HasConnectionSelection,
    /// The active context carries a truthy value under this key.
    ContextData(String),
    /// The event's target node is part of the selection.
    TargetIsSelected,
    /// The press travelled at least this far (screen pixels).
    DragDistanceAtLeast(f32),
    Custom(CustomCondition),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasSelection => f.write_str("HasSelection"),
            Self::HasNodeSelection => f.write_str("HasNodeSelection"),
            Self::HasConnectionSelection => f.write_str("HasConnectionSelection"),
            Self::ContextData(key) => f.debug_tuple("ContextData").field(key).finish(),
            Self::TargetIsSelected => f.write_str("TargetIsSelected"),
            Self::DragDistanceAtLeast(d) => f.debug_tuple("DragDistanceAtLeast").field(d).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A [`Condition`], optionally negated.
#[derive(Debug, Clone)]
pub struct Precondition {
    pub condition: Condition,
    pub negate: bool,
}

impl Precondition {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            negate: false,
        }
    }

    pub fn not(condition: Condition) -> Self {
        Self {
            condition,
            negate: true,
        }
    }

    pub fn custom(predicate: impl Fn(&PreconditionScope<'_>) -> bool + 'static) -> Self {
        Self::new(Condition::Custom(Rc::new(predicate)))
    }

    pub fn evaluate(&self, scope: &PreconditionScope<'_>) -> bool {
        let holds = match &self.condition {
            Condition::HasSelection => scope.selection.is_some_and(|s| s.has_selection()),
            Condition::HasNodeSelection => {
                scope.selection.is_some_and(|s| !s.selected_nodes().is_empty())
            }
            Condition::HasConnectionSelection => {
                scope.selection.is_some_and(|s| !s.selected_connections().is_empty())
            }
            Condition::ContextData(key) => scope.context.data.get(key).is_some_and(truthy),
            Condition::TargetIsSelected => match (scope.selection, scope.event.target.node_id) {
                (Some(selection), Some(id)) => selection.is_node_selected(id),
                _ => false,
            },
            Condition::DragDistanceAtLeast(min) => scope.event.drag_distance() >= *min,
            Condition::Custom(predicate) => predicate(scope),
        };
        holds != self.negate
    }
}

impl From<Condition> for Precondition {
    fn from(condition: Condition) -> Self {
        Self::new(condition)
    }
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
