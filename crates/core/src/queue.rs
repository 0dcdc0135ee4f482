//! Message queues and the per-queue activation state they share.

use std::collections::HashMap;

use tracing::trace;

use crate::window::WindowId;

/// Identifier of a message queue.
pub type QueueId = u32;

/// Identifier of the task (application) that owns a queue.
pub type TaskId = u32;

/// Active and focus windows shared by one or more queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerQueueData {
    pub active: Option<WindowId>,
    pub focus: Option<WindowId>,
}

#[derive(Debug)]
struct MessageQueue {
    data: usize,
    task: TaskId,
    exiting: bool,
}

/// All known queues and their shared data blocks.
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: HashMap<QueueId, MessageQueue>,
    data: HashMap<usize, PerQueueData>,
    next_data: usize,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queue owned by `task` with its own data block.
    /// Returns false if the queue already exists.
    pub fn create(&mut self, queue: QueueId, task: TaskId) -> bool {
        if self.queues.contains_key(&queue) {
            return false;
        }
        let data = self.next_data;
        self.next_data += 1;
        self.data.insert(data, PerQueueData::default());
        self.queues.insert(
            queue,
            MessageQueue {
                data,
                task,
                exiting: false,
            },
        );
        true
    }

    /// Make `queue` share the data block of `target`.
    pub fn attach(&mut self, queue: QueueId, target: QueueId) -> bool {
        let Some(shared) = self.queues.get(&target).map(|q| q.data) else {
            return false;
        };
        let Some(q) = self.queues.get_mut(&queue) else {
            return false;
        };
        let old = q.data;
        q.data = shared;
        if !self.queues.values().any(|q| q.data == old) {
            self.data.remove(&old);
        }
        true
    }

    pub fn contains(&self, queue: QueueId) -> bool {
        self.queues.contains_key(&queue)
    }

    pub fn task(&self, queue: QueueId) -> Option<TaskId> {
        self.queues.get(&queue).map(|q| q.task)
    }

    pub fn is_exiting(&self, queue: QueueId) -> bool {
        self.queues.get(&queue).is_some_and(|q| q.exiting)
    }

    pub fn set_exiting(&mut self, queue: QueueId, exiting: bool) {
        if let Some(q) = self.queues.get_mut(&queue) {
            q.exiting = exiting;
        }
    }

    /// True when both queues read and write the same data block.
    pub fn shares_data(&self, a: QueueId, b: QueueId) -> bool {
        match (self.queues.get(&a), self.queues.get(&b)) {
            (Some(a), Some(b)) => a.data == b.data,
            _ => false,
        }
    }

    /// Copy of a queue's data for read-only inspection.
    pub fn snapshot(&self, queue: QueueId) -> Option<PerQueueData> {
        let q = self.queues.get(&queue)?;
        self.data.get(&q.data).copied()
    }

    /// Lock a queue's data block for a read-modify-write sequence.
    /// The lock is released when the guard drops.
    pub fn lock(&mut self, queue: QueueId) -> Option<QueueGuard<'_>> {
        let slot = self.queues.get(&queue)?.data;
        let data = self.data.get_mut(&slot)?;
        trace!(queue, "queue data locked");
        Some(QueueGuard { queue, data })
    }
}

/// Scoped access to one queue's [`PerQueueData`].
#[derive(Debug)]
pub struct QueueGuard<'a> {
    queue: QueueId,
    data: &'a mut PerQueueData,
}

impl QueueGuard<'_> {
    pub fn queue(&self) -> QueueId {
        self.queue
    }

    pub fn active(&self) -> Option<WindowId> {
        self.data.active
    }

    pub fn set_active(&mut self, window: Option<WindowId>) {
        self.data.active = window;
    }

    pub fn focus(&self) -> Option<WindowId> {
        self.data.focus
    }

    pub fn set_focus(&mut self, window: Option<WindowId>) {
        self.data.focus = window;
    }
}

impl Drop for QueueGuard<'_> {
    fn drop(&mut self) {
        trace!(queue = self.queue, "queue data unlocked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_writes_are_visible_in_snapshot() {
        let mut queues = QueueStore::new();
        assert!(queues.create(1, 10));
        assert!(!queues.create(1, 11));
        {
            let mut guard = queues.lock(1).unwrap();
            guard.set_active(Some(5));
            guard.set_focus(Some(6));
        }
        let data = queues.snapshot(1).unwrap();
        assert_eq!(data.active, Some(5));
        assert_eq!(data.focus, Some(6));
    }

    #[test]
    fn test_attached_queues_share_data() {
        let mut queues = QueueStore::new();
        queues.create(1, 10);
        queues.create(2, 20);
        assert!(!queues.shares_data(1, 2));
        assert!(queues.attach(2, 1));
        assert!(queues.shares_data(1, 2));
        queues.lock(2).unwrap().set_focus(Some(9));
        assert_eq!(queues.snapshot(1).unwrap().focus, Some(9));
    }

    #[test]
    fn test_unknown_queue() {
        let mut queues = QueueStore::new();
        assert!(queues.lock(3).is_none());
        assert!(queues.snapshot(3).is_none());
        assert!(!queues.is_exiting(3));
        assert_eq!(queues.task(3), None);
    }
}
