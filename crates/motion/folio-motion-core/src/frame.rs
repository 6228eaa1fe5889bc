//! Per-frame work queue.
//!
//! Event handlers (pointer moves, hovers, focus changes) never touch element
//! properties directly. They request work here and the engine drains the
//! queue inside its frame step, after the scroll snapshot has been taken.

use crate::ids::{IdSequence, SectionId, TaskId};

#[derive(Debug)]
struct Task<T> {
    id: TaskId,
    owner: SectionId,
    work: T,
}

#[derive(Debug)]
pub struct FrameScheduler<T> {
    ids: IdSequence<TaskId>,
    pending: Vec<Task<T>>,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            ids: IdSequence::new(),
            pending: Vec::new(),
        }
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue work for the next frame.
    pub fn request(&mut self, owner: SectionId, work: T) -> TaskId {
        let id = self.ids.next_id();
        self.pending.push(Task { id, owner, work });
        id
    }

    /// Cancel one pending task. Returns false when it already ran or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending task owned by a section.
    pub fn cancel_owner(&mut self, owner: SectionId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.owner != owner);
        before - self.pending.len()
    }

    /// Take all pending work in request order.
    pub fn drain(&mut self) -> Vec<(SectionId, T)> {
        self.pending
            .drain(..)
            .map(|t| (t.owner, t.work))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
