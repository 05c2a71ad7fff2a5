//! # Timer Vocabulary
//!
//! Handles and events exchanged between the [`Scheduler`](super::Scheduler) and the
//! state that owns the timers.

use web_time::{Duration, Instant};
use winit::event::MouseButton;

/// Identifies one scheduled timer. Handles are never reused within a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(super) u64);

/// What a timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Re-attempt a jump while the jump key stays held
    JumpRepeat,
    /// The post-jump window is over; the ground probe may reach full length again
    RestoreDownReach,
    /// Repeat the block action bound to a held mouse button
    ClickRepeat(MouseButton),
    /// The hotbar accepts wheel input again
    WheelCooldown,
}

/// A timer that came due during [`Scheduler::poll_due`](super::Scheduler::poll_due).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// The handle the timer was installed under
    pub handle: TimerHandle,
    /// The event it carries
    pub event: TimerEvent,
}

/// A pending entry of the deadline queue.
#[derive(Debug, Clone, Copy)]
pub(super) struct ScheduledTimer {
    pub handle: TimerHandle,
    pub due: Instant,
    pub interval: Option<Duration>,
    pub event: TimerEvent,
}
