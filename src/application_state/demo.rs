//! # Scripted Session
//!
//! A fixed sequence of inputs replayed against the host on a synthetic clock, used by the
//! native `run()` entry point to exercise the core without a window.

use cgmath::Point3;
use web_time::Instant;
use winit::{event::MouseButton, keyboard::KeyCode};

use super::{ApplicationState, NOMINAL_FRAME_TIME};
use crate::engine_state::physics::player::LocomotionMode;

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    /// Press (`true`) or release a key
    Key(KeyCode, bool),
    /// Press (`true`) or release a mouse button
    Mouse(MouseButton, bool),
    /// Raw mouse motion
    Look(f64, f64),
    /// Wheel movement in lines
    Wheel(f32),
}

/// Inputs keyed by the frame they are delivered before.
pub const SESSION_SCRIPT: &[(usize, ScriptStep)] = &[
    (200, ScriptStep::Look(0.0, 400.0)),
    (210, ScriptStep::Mouse(MouseButton::Left, true)),
    (260, ScriptStep::Mouse(MouseButton::Left, false)),
    (270, ScriptStep::Wheel(1.0)),
    (280, ScriptStep::Mouse(MouseButton::Right, true)),
    (282, ScriptStep::Mouse(MouseButton::Right, false)),
    (290, ScriptStep::Look(0.0, -400.0)),
    (300, ScriptStep::Key(KeyCode::KeyW, true)),
    (302, ScriptStep::Key(KeyCode::KeyW, false)),
    (304, ScriptStep::Key(KeyCode::KeyW, true)),
    (420, ScriptStep::Key(KeyCode::Space, true)),
    (430, ScriptStep::Key(KeyCode::Space, false)),
    (480, ScriptStep::Key(KeyCode::KeyW, false)),
    (490, ScriptStep::Key(KeyCode::ShiftLeft, true)),
    (540, ScriptStep::Key(KeyCode::ShiftLeft, false)),
    (560, ScriptStep::Key(KeyCode::KeyQ, true)),
    (561, ScriptStep::Key(KeyCode::KeyQ, false)),
    (570, ScriptStep::Key(KeyCode::Space, true)),
    (620, ScriptStep::Key(KeyCode::Space, false)),
    (640, ScriptStep::Key(KeyCode::KeyQ, true)),
    (641, ScriptStep::Key(KeyCode::KeyQ, false)),
];

/// Frames the scripted session runs for.
pub const SESSION_FRAMES: usize = 900;

/// Where the scripted session left the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    /// Frames played
    pub frames: usize,
    /// Final eye position
    pub position: Point3<f32>,
    /// Final locomotion mode
    pub mode: LocomotionMode,
    /// Edits recorded during the session
    pub edits: usize,
}

/// Replays [`SESSION_SCRIPT`] for [`SESSION_FRAMES`] frames.
pub fn play_scripted_session(state: &mut ApplicationState) -> SessionSummary {
    let mut now = Instant::now();
    let mut script = SESSION_SCRIPT.iter().peekable();

    for frame in 0..SESSION_FRAMES {
        while let Some((_, step)) = script.next_if(|(at, _)| *at == frame) {
            log::debug!("Frame {}: {:?}", frame, step);
            apply_step(state, *step);
        }
        now += NOMINAL_FRAME_TIME;
        let outcome = state.frame(now);
        if outcome.respawned {
            log::info!("Respawned at frame {}", frame);
        }
    }

    let engine = &state.engine_state;
    SessionSummary {
        frames: SESSION_FRAMES,
        position: engine.locomotion().position(),
        mode: engine.locomotion().mode(),
        edits: engine.world().edits().len(),
    }
}

fn apply_step(state: &mut ApplicationState, step: ScriptStep) {
    let input = &mut state.input_manager;
    match step {
        ScriptStep::Key(code, pressed) => input.intake_key(code, pressed, false),
        ScriptStep::Mouse(button, pressed) => input.intake_mouse_button(button, pressed),
        ScriptStep::Look(delta_x, delta_y) => input.intake_mouse_motion((delta_x, delta_y)),
        ScriptStep::Wheel(delta_y) => input.intake_wheel(delta_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{GameConfig, WorldConfig},
        engine_state::{scene::Collaborators, voxels::noise_field::TerrainParameters},
    };

    #[test]
    fn script_is_in_frame_order() {
        assert!(SESSION_SCRIPT.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        assert!(SESSION_SCRIPT.iter().all(|(frame, _)| *frame < SESSION_FRAMES));
    }

    #[test]
    fn session_ends_walking_on_flat_ground() {
        let config = GameConfig {
            world: WorldConfig {
                terrain: TerrainParameters::superflat(10),
                parkour: None,
            },
            ..GameConfig::default()
        };
        let mut state = ApplicationState::new(config, Collaborators::headless());
        let summary = play_scripted_session(&mut state);

        assert_eq!(summary.frames, SESSION_FRAMES);
        assert_eq!(summary.mode, LocomotionMode::Walking);
        assert!(summary.edits > 0);
        assert!(state.scheduler.is_empty());
    }
}
