//! Pooled objects mirrored to clients.
//!
//! Ships and effects are drawn from preallocated slots instead of being
//! created per spawn. A slot is either free, acquired but hidden, or enabled
//! at a transform that clients render.

use engine_core::{Quat, Transform, Vec3};

/// Handle to a slot in an [`ObjectPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle(u32);

impl PoolHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    in_use: bool,
    enabled: bool,
    transform: Transform,
}

/// A grow-on-demand pool of client-visible objects.
#[derive(Debug)]
pub struct ObjectPool {
    name: &'static str,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ObjectPool {
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            slots: vec![Slot::default(); capacity],
            // Reverse so low indices are handed out first.
            free: (0..capacity as u32).rev().collect(),
        }
    }

    /// Take a free slot, growing the pool if every slot is taken.
    pub fn acquire(&mut self) -> PoolHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                log::debug!("Pool '{}' grew to {} slots", self.name, self.slots.len());
                (self.slots.len() - 1) as u32
            }
        };
        if let Some(slot) = self.slots.get_mut(index as usize) {
            slot.in_use = true;
            slot.enabled = false;
        }
        PoolHandle(index)
    }

    /// Show an acquired object at a transform.
    pub fn enable_at(&mut self, handle: PoolHandle, position: Vec3, rotation: Quat, scale: Vec3) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.enabled = true;
                slot.transform = Transform {
                    position,
                    rotation,
                    scale,
                };
                true
            }
            None => false,
        }
    }

    /// Move an acquired object.
    pub fn update_transform(&mut self, handle: PoolHandle, position: Vec3, rotation: Quat) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.transform.position = position;
            slot.transform.rotation = rotation;
        }
    }

    /// Return a slot to the pool. Releasing twice is a no-op and returns false.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        slot.in_use = false;
        slot.enabled = false;
        self.free.push(handle.0);
        true
    }

    pub fn is_enabled(&self, handle: PoolHandle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|slot| slot.in_use && slot.enabled)
    }

    pub fn transform(&self, handle: PoolHandle) -> Option<Transform> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.in_use)
            .map(|slot| slot.transform)
    }

    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot_mut(&mut self, handle: PoolHandle) -> Option<&mut Slot> {
        self.slots.get_mut(handle.index()).filter(|slot| slot.in_use)
    }
}
