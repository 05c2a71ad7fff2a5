//! # Input State
//!
//! This module defines the discrete input events the gameplay core reacts to, the key
//! bindings that give them meaning, and the dispatcher interface handlers implement.
//!
//! The core never polls devices: the host translates window events into
//! [`InputEvent`]s and hands each one to an [`InputHandler`] through [`dispatch`].

use std::collections::HashMap;

use web_time::Instant;
use winit::{
    event::MouseButton,
    keyboard::{KeyCode, ModifiersState},
};

use crate::engine_state::task_management::Scheduler;

/// A key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    /// Physical key
    pub code: KeyCode,
    /// Modifier keys held at the time of the event
    pub modifiers: ModifiersState,
    /// Whether this is an operating-system auto-repeat
    pub repeat: bool,
}

impl KeyInput {
    /// A fresh press or release with no modifiers.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: ModifiersState::empty(),
            repeat: false,
        }
    }

    /// The same input with modifiers.
    pub fn with_modifiers(mut self, modifiers: ModifiersState) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The same input flagged as an auto-repeat.
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Discrete events delivered by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key went down (or auto-repeated)
    KeyDown(KeyInput),
    /// A key went up
    KeyUp(KeyInput),
    /// A mouse button went down
    MouseDown(MouseButton),
    /// A mouse button went up
    MouseUp(MouseButton),
    /// Vertical wheel movement; positive scrolls towards the user
    Wheel {
        /// Scroll amount in lines
        delta_y: f32,
    },
}

/// What the host lends a handler while it processes an event.
pub struct InputContext<'a> {
    /// Time of the event
    pub now: Instant,
    /// Timer queue for repeats and transient windows
    pub scheduler: &'a mut Scheduler,
}

impl<'a> InputContext<'a> {
    /// Bundles the time and the scheduler.
    pub fn new(now: Instant, scheduler: &'a mut Scheduler) -> Self {
        Self { now, scheduler }
    }
}

/// Capability-style callback set for input events.
///
/// Every method has a no-op default so handlers only implement what they react to.
pub trait InputHandler {
    /// A key went down.
    fn on_key_down(&mut self, _ctx: &mut InputContext<'_>, _input: KeyInput) {}

    /// A key went up.
    fn on_key_up(&mut self, _ctx: &mut InputContext<'_>, _input: KeyInput) {}

    /// A mouse button went down.
    fn on_mouse_down(&mut self, _ctx: &mut InputContext<'_>, _button: MouseButton) {}

    /// A mouse button went up.
    fn on_mouse_up(&mut self, _ctx: &mut InputContext<'_>, _button: MouseButton) {}

    /// The wheel moved.
    fn on_wheel(&mut self, _ctx: &mut InputContext<'_>, _delta_y: f32) {}
}

/// Routes one event to the matching handler method.
pub fn dispatch<H: InputHandler + ?Sized>(
    handler: &mut H,
    ctx: &mut InputContext<'_>,
    event: InputEvent,
) {
    match event {
        InputEvent::KeyDown(input) => handler.on_key_down(ctx, input),
        InputEvent::KeyUp(input) => handler.on_key_up(ctx, input),
        InputEvent::MouseDown(button) => handler.on_mouse_down(ctx, button),
        InputEvent::MouseUp(button) => handler.on_mouse_up(ctx, button),
        InputEvent::Wheel { delta_y } => handler.on_wheel(ctx, delta_y),
    }
}

/// Gameplay meaning of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move along the camera's forward vector
    Forward,
    /// Move against the camera's forward vector
    Backward,
    /// Strafe left
    StrafeLeft,
    /// Strafe right
    StrafeRight,
    /// Jump, or ascend while flying
    Jump,
    /// Sneak, or descend while flying
    Sneak,
    /// Sprint while moving forward
    Sprint,
    /// Switch between flying and walking
    ToggleFlight,
    /// Step to the next field-of-view preset
    CycleFov,
    /// Select a hotbar slot
    Hotbar(usize),
}

/// Map from physical keys to actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, Action>,
}

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = HashMap::from([
            (KeyCode::KeyW, Action::Forward),
            (KeyCode::ArrowUp, Action::Forward),
            (KeyCode::KeyS, Action::Backward),
            (KeyCode::ArrowDown, Action::Backward),
            (KeyCode::KeyA, Action::StrafeLeft),
            (KeyCode::ArrowLeft, Action::StrafeLeft),
            (KeyCode::KeyD, Action::StrafeRight),
            (KeyCode::ArrowRight, Action::StrafeRight),
            (KeyCode::Space, Action::Jump),
            (KeyCode::ShiftLeft, Action::Sneak),
            (KeyCode::ShiftRight, Action::Sneak),
            (KeyCode::ControlLeft, Action::Sprint),
            (KeyCode::ControlRight, Action::Sprint),
            (KeyCode::KeyQ, Action::ToggleFlight),
            (KeyCode::KeyV, Action::CycleFov),
        ]);
        for (slot, key) in DIGIT_KEYS.into_iter().enumerate() {
            bindings.insert(key, Action::Hotbar(slot));
        }
        Self { bindings }
    }
}

impl KeyBindings {
    /// The action bound to a key, if any.
    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        self.bindings.get(&code).copied()
    }

    /// Binds a key, replacing its previous action.
    pub fn bind(&mut self, code: KeyCode, action: Action) {
        self.bindings.insert(code, action);
    }

    /// Removes a key's binding.
    pub fn unbind(&mut self, code: KeyCode) {
        self.bindings.remove(&code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl InputHandler for Recorder {
        fn on_key_down(&mut self, _ctx: &mut InputContext<'_>, _input: KeyInput) {
            self.calls.push("key_down");
        }

        fn on_wheel(&mut self, _ctx: &mut InputContext<'_>, _delta_y: f32) {
            self.calls.push("wheel");
        }
    }

    #[test]
    fn dispatch_routes_to_the_matching_method() {
        let mut scheduler = Scheduler::new();
        let mut ctx = InputContext::new(Instant::now(), &mut scheduler);
        let mut recorder = Recorder::default();

        dispatch(&mut recorder, &mut ctx, InputEvent::KeyDown(KeyInput::new(KeyCode::KeyW)));
        dispatch(&mut recorder, &mut ctx, InputEvent::MouseDown(MouseButton::Left));
        dispatch(&mut recorder, &mut ctx, InputEvent::Wheel { delta_y: 1.0 });

        assert_eq!(recorder.calls, vec!["key_down", "wheel"]);
    }

    #[test]
    fn default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for(KeyCode::KeyW), Some(Action::Forward));
        assert_eq!(bindings.action_for(KeyCode::Digit1), Some(Action::Hotbar(0)));
        assert_eq!(bindings.action_for(KeyCode::Digit9), Some(Action::Hotbar(8)));
        assert_eq!(bindings.action_for(KeyCode::KeyZ), None);
    }

    #[test]
    fn rebinding_replaces_the_action() {
        let mut bindings = KeyBindings::default();
        bindings.bind(KeyCode::KeyF, Action::ToggleFlight);
        bindings.unbind(KeyCode::KeyQ);
        assert_eq!(bindings.action_for(KeyCode::KeyF), Some(Action::ToggleFlight));
        assert_eq!(bindings.action_for(KeyCode::KeyQ), None);
    }
}
