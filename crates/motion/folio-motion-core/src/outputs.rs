//! Output contracts from the engine.
//!
//! Every property write the engine performs during a frame is mirrored as a
//! [`Change`] so adapters that keep their own element store can replay it.
//! Semantic signals travel separately as [`MotionEvent`]s.

use serde::{Deserialize, Serialize};

use crate::ids::SectionId;
use crate::value::Value;

/// One property written this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub section: SectionId,
    pub element: String,
    pub property: String,
    pub value: Value,
}

/// Discrete signals emitted while stepping a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum MotionEvent {
    SectionMounted {
        section: SectionId,
        name: String,
    },
    SectionUnmounted {
        section: SectionId,
        name: String,
        reverted: usize,
    },
    TimelineStarted {
        section: SectionId,
        timeline: usize,
    },
    TimelineCompleted {
        section: SectionId,
        timeline: usize,
    },
    ActiveSectionChanged {
        previous: Option<String>,
        current: String,
    },
}

/// Outputs returned by `MotionEngine::frame()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameOutputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
    /// Scroll position the host should apply (smooth scrolling only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_to: Option<f32>,
}

impl FrameOutputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
        self.scroll_to = None;
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty() && self.scroll_to.is_none()
    }
}
