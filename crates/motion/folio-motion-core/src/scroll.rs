//! Scroll-progress tracking.
//!
//! A trigger region is described by two edges, each pairing a point on the
//! trigger element with a point on the viewport: `"top 85%"` means "the
//! element's top reaches 85% of the viewport height". Edges resolve to
//! absolute scroll positions; progress is the clamped linear position of
//! the current scroll offset between them.
//!
//! The tracker is fed explicit viewport state. Scroll and resize events only
//! mark it dirty; [`ScrollTracker::flush`] does the work once per frame and
//! produces one [`ProgressSnapshot`] shared by every reader in that frame.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::host::{ElementHost, ElementKey, Rect};
use crate::ids::{IdSequence, SectionId, SubscriptionId};

/// Explicit viewport context (replaces ambient window state).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
        }
    }
}

/// A point along one axis of a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Fraction of the box length (`top` = 0, `center` = 0.5, `bottom` = 1, `85%`).
    Fraction(f32),
    /// Fixed pixel offset from the box start (`-50px`).
    Pixels(f32),
}

impl Anchor {
    #[inline]
    pub fn resolve(&self, length: f32) -> f32 {
        match *self {
            Anchor::Fraction(f) => f * length,
            Anchor::Pixels(px) => px,
        }
    }

    fn parse(token: &str) -> Option<Anchor> {
        match token {
            "top" => Some(Anchor::Fraction(0.0)),
            "center" => Some(Anchor::Fraction(0.5)),
            "bottom" => Some(Anchor::Fraction(1.0)),
            _ => {
                let (num, pct) = match token.strip_suffix('%') {
                    Some(n) => (n, true),
                    None => (token.strip_suffix("px").unwrap_or(token), false),
                };
                let v = num.parse::<f32>().ok().filter(|v| v.is_finite())?;
                Some(if pct {
                    Anchor::Fraction(v / 100.0)
                } else {
                    Anchor::Pixels(v)
                })
            }
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Anchor::Fraction(v) if v == 0.0 => f.write_str("top"),
            Anchor::Fraction(v) if v == 0.5 => f.write_str("center"),
            Anchor::Fraction(v) if v == 1.0 => f.write_str("bottom"),
            Anchor::Fraction(v) => write!(f, "{}%", v * 100.0),
            Anchor::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// `"<element anchor> <viewport anchor>"`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Edge {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl Edge {
    pub fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the two anchors line up.
    #[inline]
    pub fn scroll_offset(&self, trigger: Rect, viewport_height: f32) -> f32 {
        trigger.top + self.element.resolve(trigger.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for Edge {
    type Err = MotionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split_whitespace();
        let invalid = || MotionError::InvalidEdge(raw.to_string());
        let element = parts.next().and_then(Anchor::parse).ok_or_else(invalid)?;
        let viewport = parts.next().and_then(Anchor::parse).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Edge { element, viewport })
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

impl TryFrom<String> for Edge {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Edge> for String {
    fn from(value: Edge) -> Self {
        value.to_string()
    }
}

fn default_start() -> Edge {
    Edge::new(Anchor::Fraction(0.0), Anchor::Fraction(1.0))
}

fn default_end() -> Edge {
    Edge::new(Anchor::Fraction(1.0), Anchor::Fraction(0.0))
}

/// The scroll range over which a binding is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerRegion {
    pub trigger: ElementKey,
    /// Defaults to `"top bottom"` (element enters from below).
    #[serde(default = "default_start")]
    pub start: Edge,
    /// Defaults to `"bottom top"` (element leaves above).
    #[serde(default = "default_end")]
    pub end: Edge,
}

impl TriggerRegion {
    pub fn new(trigger: impl Into<ElementKey>, start: Edge, end: Edge) -> Self {
        Self {
            trigger: trigger.into(),
            start,
            end,
        }
    }

    /// Parse both edges from strings, e.g. `("about", "top 85%", "top 30%")`.
    pub fn parse(
        trigger: impl Into<ElementKey>,
        start: &str,
        end: &str,
    ) -> Result<Self, MotionError> {
        Ok(Self::new(trigger, start.parse()?, end.parse()?))
    }

    pub fn boundaries(&self, trigger: Rect, viewport_height: f32) -> Boundaries {
        Boundaries {
            start: self.start.scroll_offset(trigger, viewport_height),
            end: self.end.scroll_offset(trigger, viewport_height),
        }
    }
}

/// Resolved absolute scroll positions of a region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boundaries {
    pub start: f32,
    pub end: f32,
}

impl Boundaries {
    pub fn progress(&self, scroll_y: f32) -> f32 {
        progress_between(scroll_y, self.start, self.end)
    }
}

/// Clamped linear progress of `scroll` through `[start, end]`.
///
/// A degenerate region (`start >= end`) has no interior: progress jumps from
/// 0 to 1 once `scroll` reaches `start`.
pub fn progress_between(scroll: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return if scroll >= start { 1.0 } else { 0.0 };
    }
    let p = (scroll - start) / (end - start);
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Progress values computed in one flush.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub scroll_y: f32,
    values: IndexMap<SubscriptionId, f32>,
}

impl ProgressSnapshot {
    pub fn get(&self, id: SubscriptionId) -> Option<f32> {
        self.values.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SubscriptionId, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type ProgressCallback = Box<dyn FnMut(SubscriptionId, f32)>;

struct Listener {
    subscription: SubscriptionId,
    callback: ProgressCallback,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Subscription {
    region: TriggerRegion,
    owner: Option<SectionId>,
    /// `None` while the trigger element is not rendered.
    boundaries: Option<Boundaries>,
}

#[derive(Debug, Default)]
pub struct ScrollTracker {
    ids: IdSequence<SubscriptionId>,
    viewport: Viewport,
    subscriptions: IndexMap<SubscriptionId, Subscription>,
    listeners: Vec<Listener>,
    scroll_dirty: bool,
    layout_dirty: bool,
    snapshot: ProgressSnapshot,
    computations: u64,
}

impl ScrollTracker {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            snapshot: ProgressSnapshot {
                scroll_y: viewport.scroll_y,
                values: IndexMap::new(),
            },
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Start tracking a region. Its boundaries are resolved immediately so
    /// the returned id already has a progress value.
    pub fn subscribe(
        &mut self,
        region: TriggerRegion,
        owner: Option<SectionId>,
        host: &dyn ElementHost,
    ) -> SubscriptionId {
        let id = self.ids.next_id();
        let boundaries = host
            .bounds(&region.trigger)
            .map(|rect| region.boundaries(rect, self.viewport.height));
        if boundaries.is_none() {
            log::debug!(
                "scroll trigger '{}' not rendered; progress held at 0",
                region.trigger
            );
        }
        let progress = boundaries.map_or(0.0, |b| b.progress(self.viewport.scroll_y));
        self.snapshot.values.insert(id, progress);
        self.subscriptions.insert(
            id,
            Subscription {
                region,
                owner,
                boundaries,
            },
        );
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.retain(|l| l.subscription != id);
        self.snapshot.values.shift_remove(&id);
        self.subscriptions.shift_remove(&id).is_some()
    }

    /// Drop every subscription owned by a section. Returns how many were removed.
    pub fn unsubscribe_owner(&mut self, owner: SectionId) -> usize {
        let ids: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|(_, s)| s.owner == Some(owner))
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.unsubscribe(*id);
        }
        ids.len()
    }

    /// Register a callback fired from [`flush`](Self::flush) whenever the
    /// subscription's progress changes. Returns false for unknown ids.
    pub fn on_progress(
        &mut self,
        id: SubscriptionId,
        callback: impl FnMut(SubscriptionId, f32) + 'static,
    ) -> bool {
        if !self.subscriptions.contains_key(&id) {
            return false;
        }
        self.listeners.push(Listener {
            subscription: id,
            callback: Box::new(callback),
        });
        true
    }

    /// Record a scroll position. Nothing is computed until the next flush.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        if scroll_y != self.viewport.scroll_y {
            self.viewport.scroll_y = scroll_y;
            self.scroll_dirty = true;
        }
    }

    /// Record a viewport size. Boundaries are recomputed at the next flush.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.layout_dirty = true;
    }

    /// Element positions moved without a viewport resize (content reflow).
    pub fn invalidate_layout(&mut self) {
        self.layout_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.scroll_dirty || self.layout_dirty
    }

    /// Compute progress for every subscription at most once, notify
    /// listeners whose value changed, and return the frame's snapshot.
    pub fn flush(&mut self, host: &dyn ElementHost) -> &ProgressSnapshot {
        if !self.is_dirty() {
            return &self.snapshot;
        }
        let viewport = self.viewport;
        if self.layout_dirty {
            for sub in self.subscriptions.values_mut() {
                sub.boundaries = host
                    .bounds(&sub.region.trigger)
                    .map(|rect| sub.region.boundaries(rect, viewport.height));
            }
        }

        let mut changed = Vec::new();
        for (id, sub) in &self.subscriptions {
            let progress = sub
                .boundaries
                .map_or(0.0, |b| b.progress(viewport.scroll_y));
            let previous = self.snapshot.values.insert(*id, progress);
            if previous != Some(progress) {
                changed.push((*id, progress));
            }
        }
        self.snapshot.scroll_y = viewport.scroll_y;
        self.scroll_dirty = false;
        self.layout_dirty = false;
        self.computations += 1;

        for (id, progress) in changed {
            for listener in self.listeners.iter_mut().filter(|l| l.subscription == id) {
                (listener.callback)(id, progress);
            }
        }
        &self.snapshot
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn progress(&self, id: SubscriptionId) -> Option<f32> {
        self.snapshot.get(id)
    }

    pub fn boundaries(&self, id: SubscriptionId) -> Option<Boundaries> {
        self.subscriptions.get(&id).and_then(|s| s.boundaries)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of flushes that actually recomputed progress.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
