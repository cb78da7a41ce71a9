//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use serde_json::Value;
use slint_node_interaction::{CommandExecutor, GestureCoordinator, GestureEvent, GestureType};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every gesture the coordinator hands to its handlers.
#[derive(Default, Clone)]
pub struct GestureTracker {
    /// (kind, pointer_count)
    pub recognized: Rc<RefCell<Vec<(GestureType, usize)>>>,
    pub events: Rc<RefCell<Vec<GestureEvent>>>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recording handler for every gesture type.
    pub fn attach(&self, coordinator: &mut GestureCoordinator) {
        for kind in [
            GestureType::Tap,
            GestureType::LongPress,
            GestureType::Swipe,
            GestureType::Pinch,
            GestureType::Rotate,
            GestureType::Pan,
        ] {
            let tracker = self.clone();
            coordinator.register_handler(kind, move |event| {
                tracker.recognized.borrow_mut().push((event.kind, event.pointer_count));
                tracker.events.borrow_mut().push(event.clone());
            });
        }
    }

    pub fn kinds(&self) -> Vec<GestureType> {
        self.recognized.borrow().iter().map(|(kind, _)| *kind).collect()
    }

    pub fn last(&self) -> Option<GestureEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.recognized.borrow_mut().clear();
        self.events.borrow_mut().clear();
    }
}

/// Records the opaque effects forwarded by the effect processor.
#[derive(Default, Clone)]
pub struct EffectTracker {
    pub animations: Rc<RefCell<Vec<Value>>>,
    pub sounds: Rc<RefCell<Vec<Value>>>,
    pub navigations: Rc<RefCell<Vec<Value>>>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, executor: &CommandExecutor) {
        let animations = self.animations.clone();
        executor
            .effects()
            .set_animation_handler(move |payload| animations.borrow_mut().push(payload.clone()));
        let sounds = self.sounds.clone();
        executor
            .effects()
            .set_sound_handler(move |payload| sounds.borrow_mut().push(payload.clone()));
        let navigations = self.navigations.clone();
        executor
            .effects()
            .set_navigation_handler(move |payload| navigations.borrow_mut().push(payload.clone()));
    }

    pub fn clear(&self) {
        self.animations.borrow_mut().clear();
        self.sounds.borrow_mut().clear();
        self.navigations.borrow_mut().clear();
    }
}
