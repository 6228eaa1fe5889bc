//! Typed handles for mounted sections, scroll subscriptions and queued
//! frame work, plus the sequence that issues them.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Handle returned by [`crate::MotionEngine::mount`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SectionId(pub u32);

/// Handle for one trigger region registered with the scroll tracker.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Handle for work queued on the frame scheduler.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u32);

/// A handle kind an [`IdSequence`] can issue.
pub trait Handle: Copy {
    const KIND: &'static str;
    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

impl Handle for SectionId {
    const KIND: &'static str = "section";
    fn from_raw(raw: u32) -> Self {
        SectionId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

impl Handle for SubscriptionId {
    const KIND: &'static str = "subscription";
    fn from_raw(raw: u32) -> Self {
        SubscriptionId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

impl Handle for TaskId {
    const KIND: &'static str = "task";
    fn from_raw(raw: u32) -> Self {
        TaskId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

macro_rules! display_handle {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", <$ty as Handle>::KIND, self.0)
            }
        }
    )*};
}

display_handle!(SectionId, SubscriptionId, TaskId);

/// Issues handles of one kind in request order. Values are never reused,
/// so a handle kept after its section was unmounted (or its task ran)
/// cannot address whatever was created later.
pub struct IdSequence<T> {
    next: u32,
    _kind: PhantomData<T>,
}

impl<T> Default for IdSequence<T> {
    fn default() -> Self {
        Self {
            next: 0,
            _kind: PhantomData,
        }
    }
}

impl<T: Handle> fmt::Debug for IdSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdSequence")
            .field("kind", &T::KIND)
            .field("issued", &self.next)
            .finish()
    }
}

impl<T: Handle> IdSequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> T {
        let id = T::from_raw(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Number of handles issued so far.
    pub fn issued(&self) -> u32 {
        self.next
    }

    /// Whether `id` came from this sequence (it may since have been retired).
    pub fn was_issued(&self, id: T) -> bool {
        id.raw() < self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_are_independent_and_monotonic() {
        let mut sections = IdSequence::<SectionId>::new();
        let mut tasks = IdSequence::<TaskId>::new();
        assert_eq!(sections.next_id(), SectionId(0));
        assert_eq!(sections.next_id(), SectionId(1));
        assert_eq!(tasks.next_id(), TaskId(0));
        assert_eq!(sections.issued(), 2);
        assert!(sections.was_issued(SectionId(1)));
        assert!(!sections.was_issued(SectionId(2)));
    }

    #[test]
    fn handles_display_with_their_kind() {
        assert_eq!(SectionId(3).to_string(), "section#3");
        assert_eq!(SubscriptionId(0).to_string(), "subscription#0");
        assert_eq!(TaskId(12).to_string(), "task#12");
    }
}
