//! # Input Manager
//!
//! Translates windowing-system events into the discrete [`InputEvent`]s the core
//! dispatches:
//! - Keyboard presses and releases, with auto-repeat and modifier state
//! - Mouse button presses and releases
//! - Wheel movement, normalised to lines
//! - Raw mouse motion, accumulated until the next frame
//!
//! Losing focus releases everything still held so no key stays stuck down.

use std::collections::{HashSet, VecDeque};

use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
};

use super::input_state::{InputEvent, KeyInput};

/// Pixels of precise scrolling that make one line.
const PIXELS_PER_LINE: f32 = 100.0;

/// Queues input events between frames.
#[derive(Debug, Default)]
pub struct InputManager {
    /// Events not yet dispatched, oldest first
    queued: VecDeque<InputEvent>,
    /// Keys currently down
    pressed_keys: HashSet<KeyCode>,
    /// Mouse buttons currently down
    pressed_buttons: HashSet<MouseButton>,
    /// Modifiers as last reported by the window
    modifiers: ModifiersState,
    /// Mouse motion accumulated since the last frame
    mouse_delta: Option<(f64, f64)>,
}

impl InputManager {
    /// Creates an empty manager with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a window event and queues whatever input it carries.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        repeat,
                        ..
                    },
                ..
            } => {
                self.intake_key(*key, *state == ElementState::Pressed, *repeat);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.intake_mouse_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Positive winit deltas scroll away from the user.
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y,
                    MouseScrollDelta::PixelDelta(position) => {
                        -(position.y as f32) / PIXELS_PER_LINE
                    }
                };
                self.intake_wheel(lines);
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Queues a key transition.
    ///
    /// A press of a key that is already down counts as a repeat even when the platform
    /// does not flag it; a release of a key that is not down is dropped.
    ///
    /// # Arguments
    /// * `code` - Physical key
    /// * `pressed` - Whether the key went down
    /// * `repeat` - Whether the platform reported an auto-repeat
    pub fn intake_key(&mut self, code: KeyCode, pressed: bool, repeat: bool) {
        let mut input = KeyInput::new(code).with_modifiers(self.modifiers);
        if pressed {
            if !self.pressed_keys.insert(code) || repeat {
                input = input.repeated();
            }
            self.queued.push_back(InputEvent::KeyDown(input));
        } else if self.pressed_keys.remove(&code) {
            self.queued.push_back(InputEvent::KeyUp(input));
        }
    }

    /// Queues a mouse button transition, ignoring presses of buttons already down.
    pub fn intake_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.pressed_buttons.insert(button) {
                self.queued.push_back(InputEvent::MouseDown(button));
            }
        } else if self.pressed_buttons.remove(&button) {
            self.queued.push_back(InputEvent::MouseUp(button));
        }
    }

    /// Queues wheel movement in lines, positive towards the user.
    pub fn intake_wheel(&mut self, delta_y: f32) {
        if delta_y != 0.0 {
            self.queued.push_back(InputEvent::Wheel { delta_y });
        }
    }

    /// Sets the modifiers attached to subsequent key events.
    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Accumulates mouse movement.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement since the last report
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Returns and clears the accumulated mouse movement.
    pub fn take_mouse_delta(&mut self) -> Option<(f64, f64)> {
        self.mouse_delta.take()
    }

    /// Returns every queued event in arrival order.
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        self.queued.drain(..).collect()
    }

    /// Queues releases for every held key and button, and forgets pending motion.
    ///
    /// Called when the window loses focus, since the release events will never arrive.
    pub fn release_all(&mut self) {
        for code in self.pressed_keys.drain() {
            self.queued
                .push_back(InputEvent::KeyUp(KeyInput::new(code).with_modifiers(self.modifiers)));
        }
        for button in self.pressed_buttons.drain() {
            self.queued.push_back(InputEvent::MouseUp(button));
        }
        self.modifiers = ModifiersState::empty();
        self.mouse_delta = None;
    }

    /// Whether a key is currently down.
    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.pressed_keys.contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_press_is_a_repeat() {
        let mut manager = InputManager::new();
        manager.intake_key(KeyCode::KeyW, true, false);
        manager.intake_key(KeyCode::KeyW, true, false);
        manager.intake_key(KeyCode::KeyW, false, false);

        let events = manager.drain_events();
        assert_eq!(
            events,
            vec![
                InputEvent::KeyDown(KeyInput::new(KeyCode::KeyW)),
                InputEvent::KeyDown(KeyInput::new(KeyCode::KeyW).repeated()),
                InputEvent::KeyUp(KeyInput::new(KeyCode::KeyW)),
            ]
        );
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn stray_release_is_dropped() {
        let mut manager = InputManager::new();
        manager.intake_key(KeyCode::Space, false, false);
        manager.intake_mouse_button(MouseButton::Left, false);
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn modifiers_ride_on_key_events() {
        let mut manager = InputManager::new();
        manager.set_modifiers(ModifiersState::CONTROL);
        manager.intake_key(KeyCode::KeyW, true, false);
        assert_eq!(
            manager.drain_events(),
            vec![InputEvent::KeyDown(
                KeyInput::new(KeyCode::KeyW).with_modifiers(ModifiersState::CONTROL)
            )]
        );
    }

    #[test]
    fn focus_loss_releases_everything_held() {
        let mut manager = InputManager::new();
        manager.intake_key(KeyCode::KeyA, true, false);
        manager.intake_key(KeyCode::Space, true, false);
        manager.intake_mouse_button(MouseButton::Right, true);
        manager.intake_mouse_motion((3.0, 4.0));
        manager.drain_events();

        manager.intake_input(&WindowEvent::Focused(false));
        let events = manager.drain_events();
        assert_eq!(events.len(), 3);
        assert!(events.contains(&InputEvent::KeyUp(KeyInput::new(KeyCode::KeyA))));
        assert!(events.contains(&InputEvent::KeyUp(KeyInput::new(KeyCode::Space))));
        assert!(events.contains(&InputEvent::MouseUp(MouseButton::Right)));
        assert!(!manager.is_key_down(KeyCode::KeyA));
        assert_eq!(manager.take_mouse_delta(), None);
    }

    #[test]
    fn mouse_motion_accumulates_until_taken() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((1.0, -2.0));
        manager.intake_mouse_motion((0.5, 1.0));
        assert_eq!(manager.take_mouse_delta(), Some((1.5, -1.0)));
        assert_eq!(manager.take_mouse_delta(), None);
    }

    #[test]
    fn zero_wheel_is_ignored() {
        let mut manager = InputManager::new();
        manager.intake_wheel(0.0);
        manager.intake_wheel(1.0);
        assert_eq!(manager.drain_events(), vec![InputEvent::Wheel { delta_y: 1.0 }]);
    }
}
