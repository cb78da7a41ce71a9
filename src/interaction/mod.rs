//! Context-sensitive interaction rules.
//!
//! An [`InteractionDefinition`] pairs an [`EventMatcher`] (event kind, target
//! [`Selector`], keys and modifiers, gesture details) with a command id, a
//! set of [`Precondition`]s and an optional payload mapper. The
//! [`InteractionRouter`] keeps the rules in priority order and dispatches the
//! first one that applies to an [`InputEvent`].

mod catalog;
mod definition;
mod event;
mod matcher;
mod precondition;
mod router;
mod selector;
mod target;

pub use catalog::{
    default_catalog, DRAG_THRESHOLD, INSPECTOR_PANEL, MODAL_PANEL, SIDEBAR_PANEL, WHEEL_ZOOM_FACTOR,
};
pub use definition::{ActiveInteractionContext, InteractionContext, InteractionDefinition, PayloadMapper};
pub use event::{EventKind, InputEvent, Modifiers};
pub use matcher::{EventMatcher, ModifierMatch};
pub use precondition::{Condition, CustomCondition, Precondition, PreconditionScope};
pub use router::{InteractionRouter, RoutedCommand, INTERACTION_METADATA_KEY};
pub use selector::{CompoundSelector, Selector};
pub use target::{EventTarget, TargetElement};
