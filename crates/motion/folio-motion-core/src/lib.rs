//! Folio Motion Core (host-agnostic)
//!
//! Scroll-synchronized reveal timelines, pointer/focus micro-animations and
//! active-section routing for a single-page portfolio. The crate never
//! touches a DOM: hosts implement [`ElementHost`], feed viewport and pointer
//! events through [`MotionEngine::dispatch`] and call
//! [`MotionEngine::frame`] once per display refresh.

pub mod config;
pub mod controller;
pub mod easing;
pub mod engine;
pub mod error;
pub mod frame;
pub mod host;
pub mod ids;
pub mod interaction;
pub mod journal;
pub mod outputs;
pub mod router;
pub mod scroll;
pub mod smooth;
pub mod timeline;
pub mod value;

// Re-exports for consumers (adapters)
pub use config::{EngineConfig, RouterBand, SmoothScrollConfig};
pub use controller::{
    InitialSet, LoopMode, ScrollMode, SectionController, SectionSpec, TimelineBinding, Trigger,
    Writer,
};
pub use easing::{Direction, Ease};
pub use engine::{HostEvent, MotionEngine};
pub use error::{MotionError, Result};
pub use frame::FrameScheduler;
pub use host::{ElementHost, ElementKey, ElementState, MemoryHost, Rect};
pub use ids::{Handle, IdSequence, SectionId, SubscriptionId, TaskId};
pub use interaction::{
    DrivenValues, FollowerSpec, InteractionEvent, InteractionState, Interactions, MicroSpec,
    MicroTrigger, PointerFollower,
};
pub use journal::MutationJournal;
pub use outputs::{Change, FrameOutputs, MotionEvent};
pub use router::{ActiveChange, ActiveSection, IntersectionRouter};
pub use scroll::{
    progress_between, Anchor, Boundaries, Edge, ProgressSnapshot, ScrollTracker, TriggerRegion,
    Viewport,
};
pub use smooth::SmoothScroller;
pub use timeline::{
    BoundTimeline, Channel, LaidOutTween, Position, Segment, Stagger, StaggerFrom, StaggerMode,
    Timeline, TweenSpec,
};
pub use value::{lerp_f32, props, Props, Value, ValueKind};
