//! Deferred events, drained at the start of each simulation step
//!
//! Anything that must happen "N ms later" (combo reset, skill expiry, chained
//! explosions) is queued here instead of firing from an external timer, so every
//! mutation happens on the simulation step at a well-defined point.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use glam::Vec2;

/// A deferred mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    /// Zero the combo unless a kill happened since this was armed
    ComboReset { generation: u64 },
    /// Restore speeds recorded by Time Slow
    TimeSlowEnd,
    /// Clear the player's auto-aim flag
    AutoAimEnd,
    /// Drop the timed energy shield
    EnergyShieldEnd,
    /// Secondary burst after a bomb detonation
    ChainExplosion { pos: Vec2 },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: u64,
    seq: u64,
    event: TimerEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Min-heap of pending events ordered by due time, then insertion order
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    seq: u64,
}

impl TimerQueue {
    /// Queue `event` to fire once `now >= due`
    pub fn schedule(&mut self, due: u64, event: TimerEvent) {
        self.seq += 1;
        self.heap.push(Reverse(Scheduled {
            due,
            seq: self.seq,
            event,
        }));
    }

    /// Pop every event due at `now`, earliest first
    pub fn drain_due(&mut self, now: u64) -> Vec<TimerEvent> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.heap.peek() {
            if next.due > now {
                break;
            }
            if let Some(Reverse(s)) = self.heap.pop() {
                due.push(s.event);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
