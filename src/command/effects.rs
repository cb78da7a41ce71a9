use super::{Effect, EffectKind};
use crate::surfaces::{Notifier, ToastLevel};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub type AnimationHandler = Rc<dyn Fn(&Value)>;
pub type SoundHandler = Rc<dyn Fn(&Value)>;
pub type NavigationHandler = Rc<dyn Fn(&Value)>;

#[derive(Default)]
struct Handlers {
    animation: Option<AnimationHandler>,
    sound: Option<SoundHandler>,
    navigation: Option<NavigationHandler>,
}

/// Forwards declared effects to the subsystem that owns them.
///
/// Toasts go to the [`Notifier`]; animation, sound and navigation payloads are
/// opaque and handed to whichever handler the application installed. Effects
/// without a handler are dropped.
pub struct EffectProcessor {
    notifier: Rc<dyn Notifier>,
    handlers: RefCell<Handlers>,
}

impl EffectProcessor {
    pub fn new(notifier: Rc<dyn Notifier>) -> Self {
        Self {
            notifier,
            handlers: RefCell::new(Handlers::default()),
        }
    }

    pub fn notifier(&self) -> &Rc<dyn Notifier> {
        &self.notifier
    }

    pub fn set_animation_handler(&self, handler: impl Fn(&Value) + 'static) {
        self.handlers.borrow_mut().animation = Some(Rc::new(handler));
    }

    pub fn set_sound_handler(&self, handler: impl Fn(&Value) + 'static) {
        self.handlers.borrow_mut().sound = Some(Rc::new(handler));
    }

    pub fn set_navigation_handler(&self, handler: impl Fn(&Value) + 'static) {
        self.handlers.borrow_mut().navigation = Some(Rc::new(handler));
    }

    pub fn process(&self, effect: &Effect) {
        match effect.kind {
            EffectKind::Toast => {
                let message = effect
                    .payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let level = effect
                    .payload
                    .get("level")
                    .cloned()
                    .and_then(|l| serde_json::from_value::<ToastLevel>(l).ok())
                    .unwrap_or_default();
                self.notifier.show(message, level);
            }
            kind => {
                // Clone out of the RefCell so a handler may install handlers.
                let handler = {
                    let handlers = self.handlers.borrow();
                    match kind {
                        EffectKind::Animation => handlers.animation.clone(),
                        EffectKind::Sound => handlers.sound.clone(),
                        _ => handlers.navigation.clone(),
                    }
                };
                match handler {
                    Some(handler) => handler(&effect.payload),
                    None => tracing::debug!(?kind, "effect dropped, no handler installed"),
                }
            }
        }
    }

    pub fn process_all(&self, effects: &[Effect]) {
        effects.iter().for_each(|e| self.process(e));
    }
}
