//! # Task Management System
//!
//! A single-threaded deadline queue for the few asynchronous effects gameplay needs:
//! held-key repeats, the post-jump probe window, mouse-hold repeats and the hotbar wheel
//! cooldown.
//!
//! ## Architecture Overview
//!
//! - `Scheduler`: owned by the host loop, polled once per frame
//! - `TimerHandle`: returned on installation, used to cancel
//! - `TimerEvent`: what the owner should do when the timer fires
//!
//! Timers fire after their delay, possibly several frames late; nothing is ordered
//! relative to the frame update except "not before the deadline".
//!
//! ## Timer Lifecycle
//! 1. State installs a timer into a slot (`Option<TimerHandle>`) it owns, via
//!    `install_once()` or `install_repeating()`. Installing cancels whatever the slot held,
//!    so one logical action never has two live timers.
//! 2. The host calls `poll_due()` each frame and routes every `FiredTimer` back to the
//!    owner, which compares the handle against its slot before acting.
//! 3. Key releases and mode changes call `cancel_slot()`.
//!
//! ## Example Usage
//! ```ignore
//! let mut scheduler = Scheduler::new();
//! let mut repeat = None;
//! scheduler.install_repeating(&mut repeat, now, Duration::from_millis(60), TimerEvent::JumpRepeat);
//!
//! // In the frame loop:
//! for fired in scheduler.poll_due(now) {
//!     state.on_timer(fired);
//! }
//! ```

pub mod task;

use std::collections::VecDeque;

use task::{FiredTimer, ScheduledTimer, TimerEvent, TimerHandle};
use web_time::{Duration, Instant};

/// Deadline-ordered queue of one-shot and repeating timers.
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Pending timers sorted by deadline, ties in installation order
    queued_timers: VecDeque<ScheduledTimer>,
    next_handle: u64,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an event to fire once after `delay`.
    pub fn schedule_once(&mut self, now: Instant, delay: Duration, event: TimerEvent) -> TimerHandle {
        self.push(now + delay, None, event)
    }

    /// Schedules an event to fire every `interval`, first after one interval.
    pub fn schedule_repeating(
        &mut self,
        now: Instant,
        interval: Duration,
        event: TimerEvent,
    ) -> TimerHandle {
        // A zero interval would fire on every poll forever.
        let interval = interval.max(Duration::from_millis(1));
        self.push(now + interval, Some(interval), event)
    }

    /// Cancels the slot's timer, then installs a one-shot timer into it.
    pub fn install_once(
        &mut self,
        slot: &mut Option<TimerHandle>,
        now: Instant,
        delay: Duration,
        event: TimerEvent,
    ) {
        self.cancel_slot(slot);
        *slot = Some(self.schedule_once(now, delay, event));
    }

    /// Cancels the slot's timer, then installs a repeating timer into it.
    pub fn install_repeating(
        &mut self,
        slot: &mut Option<TimerHandle>,
        now: Instant,
        interval: Duration,
        event: TimerEvent,
    ) {
        self.cancel_slot(slot);
        *slot = Some(self.schedule_repeating(now, interval, event));
    }

    /// Cancels a timer.
    ///
    /// # Returns
    /// `true` if the timer was still pending
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.queued_timers.len();
        self.queued_timers.retain(|timer| timer.handle != handle);
        before != self.queued_timers.len()
    }

    /// Cancels whatever timer the slot holds and empties it.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    /// Whether a timer is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.queued_timers.iter().any(|timer| timer.handle == handle)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.queued_timers.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.queued_timers.is_empty()
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.queued_timers.clear();
    }

    /// Removes and returns every timer due at `now`, in deadline order.
    ///
    /// Repeating timers fire at most once per poll; missed periods are skipped and the
    /// timer is re-queued at its next deadline after `now`.
    pub fn poll_due(&mut self, now: Instant) -> Vec<FiredTimer> {
        let mut fired = Vec::new();
        let mut requeue = Vec::new();

        while let Some(timer) = self.queued_timers.front() {
            if timer.due > now {
                break;
            }
            let Some(mut timer) = self.queued_timers.pop_front() else {
                break;
            };
            fired.push(FiredTimer {
                handle: timer.handle,
                event: timer.event,
            });
            if let Some(interval) = timer.interval {
                while timer.due <= now {
                    timer.due += interval;
                }
                requeue.push(timer);
            }
        }

        for timer in requeue {
            self.insert_sorted(timer);
        }
        fired
    }

    fn push(&mut self, due: Instant, interval: Option<Duration>, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.insert_sorted(ScheduledTimer {
            handle,
            due,
            interval,
            event,
        });
        handle
    }

    fn insert_sorted(&mut self, timer: ScheduledTimer) {
        let index = self
            .queued_timers
            .partition_point(|queued| queued.due <= timer.due);
        self.queued_timers.insert(index, timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn one_shot_fires_once_after_delay() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_once(start, ms(300), TimerEvent::RestoreDownReach);

        assert!(scheduler.poll_due(start + ms(299)).is_empty());
        let fired = scheduler.poll_due(start + ms(300));
        assert_eq!(
            fired,
            vec![FiredTimer {
                handle,
                event: TimerEvent::RestoreDownReach
            }]
        );
        assert!(scheduler.poll_due(start + ms(900)).is_empty());
    }

    #[test]
    fn repeating_timer_skips_missed_periods() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(start, ms(60), TimerEvent::JumpRepeat);

        assert_eq!(scheduler.poll_due(start + ms(60)).len(), 1);
        // A long frame hitch still yields a single firing.
        assert_eq!(scheduler.poll_due(start + ms(400)).len(), 1);
        assert!(scheduler.poll_due(start + ms(410)).is_empty());
        assert_eq!(scheduler.poll_due(start + ms(420)).len(), 1);
    }

    #[test]
    fn installing_into_a_slot_replaces_the_previous_timer() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut slot = None;

        scheduler.install_repeating(&mut slot, start, ms(60), TimerEvent::JumpRepeat);
        let first = slot;
        scheduler.install_repeating(&mut slot, start, ms(120), TimerEvent::JumpRepeat);

        assert_eq!(scheduler.len(), 1);
        assert!(first.is_some_and(|handle| !scheduler.is_pending(handle)));
        assert!(scheduler.poll_due(start + ms(60)).is_empty());
        assert_eq!(scheduler.poll_due(start + ms(120)).len(), 1);
    }

    #[test]
    fn cancel_slot_empties_it() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut slot = None;
        scheduler.install_once(&mut slot, start, ms(10), TimerEvent::WheelCooldown);
        scheduler.cancel_slot(&mut slot);
        assert!(slot.is_none());
        assert!(scheduler.is_empty());
        assert!(scheduler.poll_due(start + ms(20)).is_empty());
    }

    #[test]
    fn fires_in_deadline_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(start, ms(50), TimerEvent::WheelCooldown);
        scheduler.schedule_once(start, ms(10), TimerEvent::RestoreDownReach);
        let events: Vec<_> = scheduler
            .poll_due(start + ms(100))
            .into_iter()
            .map(|fired| fired.event)
            .collect();
        assert_eq!(
            events,
            vec![TimerEvent::RestoreDownReach, TimerEvent::WheelCooldown]
        );
    }
}
