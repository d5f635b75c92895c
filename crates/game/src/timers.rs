//! Deferred work keyed by simulation wake time.
//!
//! Recurring behaviours (fire control, shield recharge, cleanup sweeps)
//! reschedule themselves from their handlers. Nothing yields mid-tick: due
//! timers are drained once per tick, in wake order, FIFO among equal times.

use hecs::Entity;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Work scheduled for a future tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Fire control decides whether to start a burst or hold.
    ShootDecide(Entity),
    /// Arming delay elapsed; start the burst.
    ShootArm(Entity),
    /// Hold or burst period elapsed.
    ShootCooldown(Entity),
    /// Fire one shot.
    FireShot(Entity),
    /// Shield recharge check.
    ShieldRecharge(Entity),
    /// Reconcile the game-state enemy list.
    CleanupSweep,
}

impl TimerEvent {
    /// Entity whose destruction cancels this timer.
    pub fn owner(&self) -> Option<Entity> {
        match *self {
            TimerEvent::ShootDecide(e)
            | TimerEvent::ShootArm(e)
            | TimerEvent::ShootCooldown(e)
            | TimerEvent::FireShot(e)
            | TimerEvent::ShieldRecharge(e) => Some(e),
            TimerEvent::CleanupSweep => None,
        }
    }
}

#[derive(Debug)]
struct Entry<E> {
    wake: Duration,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.wake == other.wake && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wake.cmp(&other.wake).then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of events ordered by wake time.
#[derive(Debug)]
pub struct TimerQueue<E> {
    heap: BinaryHeap<Reverse<Entry<E>>>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to wake at absolute time `wake`.
    pub fn schedule_at(&mut self, wake: Duration, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { wake, seq, event }));
    }

    /// Pop the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<E> {
        if self.heap.peek()?.0.wake > now {
            return None;
        }
        self.heap.pop().map(|Reverse(entry)| entry.event)
    }

    /// Drop every pending event matching `cancel`. Returns how many were dropped.
    pub fn cancel_where<F: FnMut(&E) -> bool>(&mut self, mut cancel: F) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| !cancel(&entry.event));
        before - self.heap.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.heap.iter().map(|Reverse(entry)| &entry.event)
    }
}

impl TimerQueue<TimerEvent> {
    /// Cancel everything an entity still has pending.
    pub fn cancel_owner(&mut self, entity: Entity) -> usize {
        self.cancel_where(|event| event.owner() == Some(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn pops_in_wake_order_then_fifo() {
        let mut q = TimerQueue::new();
        q.schedule_at(ms(30), "late");
        q.schedule_at(ms(10), "first");
        q.schedule_at(ms(10), "second");

        assert_eq!(q.pop_due(ms(5)), None);
        assert_eq!(q.pop_due(ms(10)), Some("first"));
        assert_eq!(q.pop_due(ms(10)), Some("second"));
        assert_eq!(q.pop_due(ms(20)), None);
        assert_eq!(q.pop_due(ms(30)), Some("late"));
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_owner_drops_only_that_entity() {
        let mut world = hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());

        let mut q = TimerQueue::new();
        q.schedule_at(ms(1), TimerEvent::ShootDecide(a));
        q.schedule_at(ms(2), TimerEvent::ShieldRecharge(a));
        q.schedule_at(ms(3), TimerEvent::FireShot(b));
        q.schedule_at(ms(4), TimerEvent::CleanupSweep);

        assert_eq!(q.cancel_owner(a), 2);
        assert_eq!(q.len(), 2);
        assert!(q.iter().all(|e| e.owner() != Some(a)));
    }
}
