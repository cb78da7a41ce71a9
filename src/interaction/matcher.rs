use super::{EventKind, InputEvent, Modifiers, Selector};
use crate::gesture::{PointerKind, SwipeDirection};
use slint::SharedString;

/// Required state of each modifier key. `None` means "don't care".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierMatch {
    pub shift: Option<bool>,
    pub control: Option<bool>,
    pub alt: Option<bool>,
    pub meta: Option<bool>,
}

impl ModifierMatch {
    /// Every modifier must be released.
    pub fn none() -> Self {
        Self::exactly(Modifiers::NONE)
    }

    /// Each modifier must be in exactly the given state.
    pub fn exactly(m: Modifiers) -> Self {
        Self {
            shift: Some(m.shift),
            control: Some(m.control),
            alt: Some(m.alt),
            meta: Some(m.meta),
        }
    }

    pub fn matches(&self, m: &Modifiers) -> bool {
        fn ok(want: Option<bool>, have: bool) -> bool {
            want.map_or(true, |w| w == have)
        }
        ok(self.shift, m.shift)
            && ok(self.control, m.control)
            && ok(self.alt, m.alt)
            && ok(self.meta, m.meta)
    }
}

/// Structural description of the events an interaction reacts to.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMatcher {
    pub kind: EventKind,
    pub selector: Option<Selector>,
    /// Any of these keys, compared case-insensitively. Empty means any key.
    pub keys: Vec<SharedString>,
    pub modifiers: ModifierMatch,
    pub swipe_direction: Option<SwipeDirection>,
    pub pointer_kind: Option<PointerKind>,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventMatcher {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            selector: None,
            keys: Vec::new(),
            modifiers: ModifierMatch::default(),
            swipe_direction: None,
            pointer_kind: None,
            prevent_default: false,
            stop_propagation: false,
        }
    }

    /// A key-down matcher for `key` with exactly `modifiers` held.
    pub fn key(key: impl Into<SharedString>, modifiers: Modifiers) -> Self {
        Self::new(EventKind::KeyDown)
            .or_key(key)
            .with_modifiers(ModifierMatch::exactly(modifiers))
    }

    pub fn or_key(mut self, key: impl Into<SharedString>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_modifiers(mut self, modifiers: ModifierMatch) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_swipe_direction(mut self, direction: SwipeDirection) -> Self {
        self.swipe_direction = Some(direction);
        self
    }

    pub fn with_pointer_kind(mut self, kind: PointerKind) -> Self {
        self.pointer_kind = Some(kind);
        self
    }

    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    pub fn stop_propagation(mut self) -> Self {
        self.stop_propagation = true;
        self
    }

    pub fn matches(&self, event: &InputEvent) -> bool {
        if self.kind != event.kind {
            return false;
        }
        if let Some(selector) = &self.selector {
            if !selector.matches(&event.target) {
                return false;
            }
        }
        if !self.keys.is_empty() {
            let Some(key) = &event.key else {
                return false;
            };
            let key = key.to_lowercase();
            if !self.keys.iter().any(|k| k.to_lowercase() == key) {
                return false;
            }
        }
        if !self.modifiers.matches(&event.modifiers) {
            return false;
        }
        if let Some(direction) = self.swipe_direction {
            if event.gesture.as_ref().and_then(|g| g.direction) != Some(direction) {
                return false;
            }
        }
        self.pointer_kind.map_or(true, |k| k == event.pointer_kind)
    }
}
