//! Translation of slint [`WindowEvent`]s into the editor's input streams.
//!
//! A window event may produce a [`PointerEvent`] for the gesture coordinator
//! and any number of [`InputEvent`]s for the interaction router. Targets and
//! world positions are left at their defaults; the [`Editor`](crate::Editor)
//! fills them in from the hit tester and the viewport.

use crate::config::EditorSettings;
use crate::geometry::Point;
use crate::gesture::{PointerEvent, PointerKind, PointerPhase};
use crate::interaction::{EventKind, EventTarget, InputEvent, Modifiers};
use slint::platform::{Key, PointerEventButton, WindowEvent};
use slint::SharedString;

/// Maximum gap between two clicks of a double click.
pub const DOUBLE_CLICK_MS: u64 = 400;

/// Pointer id used for the mouse.
pub const MOUSE_POINTER_ID: u32 = 0;

/// What a single window event turned into.
#[derive(Debug, Default)]
pub struct TranslatedEvent {
    pub pointer: Option<PointerEvent>,
    pub inputs: Vec<InputEvent>,
}

impl TranslatedEvent {
    pub fn is_empty(&self) -> bool {
        self.pointer.is_none() && self.inputs.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    position: Point,
    button: PointerEventButton,
}

#[derive(Debug, Clone, Copy)]
struct LastClick {
    position: Point,
    time_ms: u64,
}

/// Stateful translator: remembers held modifiers, the pending press and the
/// last click so it can synthesize clicks and double clicks.
#[derive(Debug)]
pub struct WindowEventTranslator {
    modifiers: Modifiers,
    cursor: Point,
    press: Option<Press>,
    last_click: Option<LastClick>,
    click_max_distance: f32,
    pointer_kind: PointerKind,
}

impl Default for WindowEventTranslator {
    fn default() -> Self {
        Self::new(&EditorSettings::default())
    }
}

impl WindowEventTranslator {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            modifiers: Modifiers::NONE,
            cursor: Point::ZERO,
            press: None,
            last_click: None,
            click_max_distance: settings.click_max_distance,
            pointer_kind: PointerKind::Mouse,
        }
    }

    /// Device reported for pointer events. Slint does not tell mouse and
    /// touch apart, so touch-first applications set this once.
    pub fn set_pointer_kind(&mut self, kind: PointerKind) {
        self.pointer_kind = kind;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn translate(&mut self, event: &WindowEvent, time_ms: u64) -> TranslatedEvent {
        match event {
            WindowEvent::PointerPressed { position, button } => {
                self.pressed((*position).into(), *button, time_ms)
            }
            WindowEvent::PointerReleased { position, button } => {
                self.released((*position).into(), *button, time_ms)
            }
            WindowEvent::PointerMoved { position } => self.moved((*position).into(), time_ms),
            WindowEvent::PointerScrolled {
                position,
                delta_x,
                delta_y,
            } => {
                // slint reports positive deltas when scrolling up
                let delta = Point::new(-delta_x, -delta_y);
                let mut input = self.input(EventKind::Wheel, (*position).into(), time_ms);
                input.wheel_delta = delta;
                TranslatedEvent {
                    pointer: None,
                    inputs: vec![input],
                }
            }
            WindowEvent::PointerExited => self.cancel_press(time_ms),
            WindowEvent::KeyPressed { text } | WindowEvent::KeyPressRepeated { text } => {
                self.key(text, true, time_ms)
            }
            WindowEvent::KeyReleased { text } => self.key(text, false, time_ms),
            WindowEvent::WindowActiveChanged(false) => {
                self.modifiers = Modifiers::NONE;
                self.cancel_press(time_ms)
            }
            _ => TranslatedEvent::default(),
        }
    }

    fn input(&self, kind: EventKind, position: Point, time_ms: u64) -> InputEvent {
        InputEvent::new(kind, EventTarget::canvas())
            .at(position)
            .with_modifiers(self.modifiers)
            .with_pointer_kind(self.pointer_kind)
            .with_time(time_ms)
    }

    fn pointer(&self, phase: PointerPhase, position: Point, time_ms: u64) -> PointerEvent {
        PointerEvent::new(MOUSE_POINTER_ID, phase, position, time_ms).with_kind(self.pointer_kind)
    }

    fn pressed(&mut self, position: Point, button: PointerEventButton, time_ms: u64) -> TranslatedEvent {
        self.cursor = position;
        // Other buttons are ignored while one is held
        if self.press.is_some() {
            return TranslatedEvent::default();
        }
        self.press = Some(Press { position, button });
        let pointer = (button == PointerEventButton::Left)
            .then(|| self.pointer(PointerPhase::Down, position, time_ms).with_button(button));
        TranslatedEvent {
            pointer,
            inputs: vec![self.input(EventKind::PointerDown, position, time_ms)],
        }
    }

    fn moved(&mut self, position: Point, time_ms: u64) -> TranslatedEvent {
        self.cursor = position;
        let origin = self.press.map_or(position, |p| p.position);
        let pointer = self
            .press
            .filter(|p| p.button == PointerEventButton::Left)
            .map(|_| self.pointer(PointerPhase::Move, position, time_ms));
        TranslatedEvent {
            pointer,
            inputs: vec![self.input(EventKind::PointerMove, position, time_ms).with_origin(origin)],
        }
    }

    fn released(&mut self, position: Point, button: PointerEventButton, time_ms: u64) -> TranslatedEvent {
        self.cursor = position;
        let Some(press) = self.press.filter(|p| p.button == button) else {
            return TranslatedEvent::default();
        };
        self.press = None;

        let pointer = (button == PointerEventButton::Left)
            .then(|| self.pointer(PointerPhase::Up, position, time_ms).with_button(button));
        let mut inputs = vec![self
            .input(EventKind::PointerUp, position, time_ms)
            .with_origin(press.position)];

        if press.position.distance_to(position) <= self.click_max_distance {
            match button {
                PointerEventButton::Left => inputs.extend(self.click(press.position, time_ms)),
                PointerEventButton::Right => {
                    inputs.push(self.input(EventKind::ContextMenu, press.position, time_ms))
                }
                _ => {}
            }
        }
        TranslatedEvent { pointer, inputs }
    }

    fn click(&mut self, position: Point, time_ms: u64) -> Vec<InputEvent> {
        let mut inputs = vec![self.input(EventKind::Click, position, time_ms)];
        let is_double = self.last_click.is_some_and(|last| {
            time_ms.saturating_sub(last.time_ms) <= DOUBLE_CLICK_MS
                && last.position.distance_to(position) <= self.click_max_distance
        });
        if is_double {
            inputs.push(self.input(EventKind::DoubleClick, position, time_ms));
            self.last_click = None;
        } else {
            self.last_click = Some(LastClick { position, time_ms });
        }
        inputs
    }

    fn cancel_press(&mut self, time_ms: u64) -> TranslatedEvent {
        match self.press.take() {
            Some(press) if press.button == PointerEventButton::Left => TranslatedEvent {
                pointer: Some(self.pointer(PointerPhase::Cancel, self.cursor, time_ms)),
                inputs: Vec::new(),
            },
            _ => TranslatedEvent::default(),
        }
    }

    fn key(&mut self, text: &SharedString, pressed: bool, time_ms: u64) -> TranslatedEvent {
        if self.update_modifier(text, pressed) {
            return TranslatedEvent::default();
        }
        let kind = if pressed { EventKind::KeyDown } else { EventKind::KeyUp };
        let mut input = self.input(kind, self.cursor, time_ms);
        input.key = Some(key_name(text));
        TranslatedEvent {
            pointer: None,
            inputs: vec![input],
        }
    }

    /// Returns whether `text` was a modifier key.
    fn update_modifier(&mut self, text: &str, pressed: bool) -> bool {
        let Some(c) = single_char(text) else {
            return false;
        };
        let is = |keys: &[Key]| keys.iter().any(|k| char::from(*k) == c);
        let slot = if is(&[Key::Shift, Key::ShiftR]) {
            &mut self.modifiers.shift
        } else if is(&[Key::Control, Key::ControlR]) {
            &mut self.modifiers.control
        } else if is(&[Key::Alt, Key::AltGr]) {
            &mut self.modifiers.alt
        } else if is(&[Key::Meta, Key::MetaR]) {
            &mut self.modifiers.meta
        } else {
            return false;
        };
        *slot = pressed;
        true
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// DOM-style name for a slint key text: `"Delete"`, `"Escape"`, `"ArrowLeft"`,
/// or the text itself for printable keys.
pub fn key_name(text: &str) -> SharedString {
    let named = [
        (Key::Backspace, "Backspace"),
        (Key::Tab, "Tab"),
        (Key::Return, "Enter"),
        (Key::Escape, "Escape"),
        (Key::Delete, "Delete"),
        (Key::LeftArrow, "ArrowLeft"),
        (Key::RightArrow, "ArrowRight"),
        (Key::UpArrow, "ArrowUp"),
        (Key::DownArrow, "ArrowDown"),
        (Key::Home, "Home"),
        (Key::End, "End"),
        (Key::PageUp, "PageUp"),
        (Key::PageDown, "PageDown"),
    ];
    single_char(text)
        .and_then(|c| named.into_iter().find(|(k, _)| char::from(*k) == c))
        .map_or_else(|| text.into(), |(_, name)| name.into())
}
