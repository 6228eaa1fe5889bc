//! Pointer and focus driven micro-animations.
//!
//! Hover and focus transitions run toward an `active` property-set while
//! the element is hovered/focused and back toward `rest` afterwards. Press
//! pulses out and back. Every transition starts from the value the host
//! reports at that moment, so an interrupted transition reverses smoothly
//! from wherever it was.
//!
//! [`PointerFollower`] glides an element toward the pointer with
//! frame-rate coupled exponential smoothing.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::host::{ElementHost, ElementKey};
use crate::value::{Props, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionEvent {
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    Focus,
    Blur,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    pub hovered: bool,
    pub focused: bool,
    pub active: bool,
}

impl InteractionState {
    /// Apply an event; returns true when a flag actually flipped.
    pub fn apply(&mut self, event: InteractionEvent) -> bool {
        let (flag, value) = match event {
            InteractionEvent::PointerEnter => (&mut self.hovered, true),
            InteractionEvent::PointerLeave => (&mut self.hovered, false),
            InteractionEvent::PointerDown => (&mut self.active, true),
            InteractionEvent::PointerUp => (&mut self.active, false),
            InteractionEvent::Focus => (&mut self.focused, true),
            InteractionEvent::Blur => (&mut self.focused, false),
        };
        let changed = *flag != value;
        *flag = value;
        changed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MicroTrigger {
    Hover,
    Focus,
    /// Pulse to `active` and straight back on pointer down.
    Press,
    /// Run to `active` on each click (pointer down, then up) and stay there.
    Click,
}

fn default_micro_duration() -> f32 {
    0.3
}

fn default_micro_ease() -> Ease {
    Ease::POWER2_OUT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MicroSpec {
    /// Element whose events fire the animation.
    pub target: ElementKey,
    /// Element that is animated, when it differs from `target`
    /// (e.g. hovering a list reveals a floating preview).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate: Option<ElementKey>,
    pub on: MicroTrigger,
    pub active: Props,
    /// Values to return to. Properties left out return to the value the
    /// section's timelines last wrote, or to whatever the element held
    /// when the interaction first fired if no timeline drives them.
    #[serde(default)]
    pub rest: Props,
    /// Press/click only: `active` is added to the settled value instead of
    /// replacing it, so every click spins one more turn.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub additive: bool,
    #[serde(default = "default_micro_duration")]
    pub duration: f32,
    #[serde(default = "default_micro_ease")]
    pub ease: Ease,
}

impl MicroSpec {
    pub fn new(target: impl Into<ElementKey>, on: MicroTrigger, active: Props) -> Self {
        Self {
            target: target.into(),
            animate: None,
            on,
            active,
            rest: Props::new(),
            additive: false,
            duration: default_micro_duration(),
            ease: default_micro_ease(),
        }
    }

    pub fn animate(mut self, element: impl Into<ElementKey>) -> Self {
        self.animate = Some(element.into());
        self
    }

    /// Element receiving the writes.
    pub fn animated(&self) -> &str {
        self.animate.as_deref().unwrap_or(&self.target)
    }

    pub fn rest(mut self, rest: Props) -> Self {
        self.rest = rest;
        self
    }

    pub fn additive(mut self) -> Self {
        self.additive = true;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Latest value the section's timelines wrote, per (element, property).
pub type DrivenValues = HashMap<(ElementKey, String), Value>;

/// End point of a transition. A tracking goal follows the timeline-driven
/// value of its property while the transition runs.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Goal {
    value: Value,
    tracks: bool,
}

impl Goal {
    fn fixed(value: Value) -> Self {
        Self {
            value,
            tracks: false,
        }
    }

    fn tracking(value: Value) -> Self {
        Self {
            value,
            tracks: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    from: Value,
    to: Goal,
    elapsed: f32,
    duration: f32,
    ease: Ease,
    /// Second leg of a press pulse.
    then: Option<Goal>,
}

impl Transition {
    fn new(from: Value, to: Goal, spec: &MicroSpec) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: spec.duration,
            ease: spec.ease,
            then: None,
        }
    }

    fn value(&self) -> Value {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        };
        self.from.lerp(&self.to.value, self.ease.apply(t))
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Where the property ends up once this transition and its second leg are done.
    fn settles_at(&self) -> Goal {
        self.then.unwrap_or(self.to)
    }
}

#[derive(Clone, Debug)]
struct MicroBinding {
    spec: MicroSpec,
    /// Values captured on first activation for properties missing from `rest`.
    captured: Props,
}

/// Micro-animation runtime for one section.
#[derive(Clone, Debug, Default)]
pub struct Interactions {
    bindings: Vec<MicroBinding>,
    states: HashMap<ElementKey, InteractionState>,
    running: IndexMap<(ElementKey, String), Transition>,
}

impl Interactions {
    pub fn new(specs: impl IntoIterator<Item = MicroSpec>) -> Self {
        Self {
            bindings: specs
                .into_iter()
                .map(|spec| MicroBinding {
                    spec,
                    captured: Props::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Whether any micro-animation listens on this element.
    pub fn handles(&self, element: &str) -> bool {
        self.bindings.iter().any(|b| b.spec.target == element)
    }

    pub fn state(&self, element: &str) -> InteractionState {
        self.states.get(element).copied().unwrap_or_default()
    }

    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    /// Update interaction state and start the transitions it implies.
    /// `driven` holds the values the section's timelines last wrote.
    pub fn handle(
        &mut self,
        element: &str,
        event: InteractionEvent,
        host: &dyn ElementHost,
        driven: &DrivenValues,
    ) {
        if !host.exists(element) {
            return;
        }
        let state = self.states.entry(element.to_string()).or_default();
        let changed = state.apply(event);
        // A pointer down without a matching up still pulses.
        if !changed && event != InteractionEvent::PointerDown {
            return;
        }
        let state = *state;

        for index in 0..self.bindings.len() {
            let spec = &self.bindings[index].spec;
            if spec.target != element {
                continue;
            }
            let engaged = match spec.on {
                MicroTrigger::Hover => matches!(
                    event,
                    InteractionEvent::PointerEnter | InteractionEvent::PointerLeave
                )
                .then_some(state.hovered),
                MicroTrigger::Focus => {
                    matches!(event, InteractionEvent::Focus | InteractionEvent::Blur)
                        .then_some(state.focused)
                }
                MicroTrigger::Press => (event == InteractionEvent::PointerDown).then_some(true),
                MicroTrigger::Click => {
                    (event == InteractionEvent::PointerUp && changed).then_some(true)
                }
            };
            let Some(engaged) = engaged else {
                continue;
            };
            let spec = spec.clone();
            let animated = spec.animated();

            for (property, active) in &spec.active {
                let Some(current) = host.read(animated, property) else {
                    continue;
                };
                let key = (animated.to_string(), property.clone());
                let transition = match spec.on {
                    MicroTrigger::Press | MicroTrigger::Click => {
                        let settle = self.settled(&key, current, driven);
                        let peak = if spec.additive {
                            settle.value.offset(active)
                        } else {
                            *active
                        };
                        let mut transition = Transition::new(current, Goal::fixed(peak), &spec);
                        if spec.on == MicroTrigger::Press {
                            transition.then = Some(settle);
                        }
                        transition
                    }
                    MicroTrigger::Hover | MicroTrigger::Focus => {
                        let to = if engaged {
                            if !spec.rest.contains_key(property) {
                                self.bindings[index]
                                    .captured
                                    .entry(property.clone())
                                    .or_insert(current);
                            }
                            Goal::fixed(*active)
                        } else {
                            self.resting(index, &key, current, driven)
                        };
                        Transition::new(current, to, &spec)
                    }
                };
                // Replaces any transition already running on this property.
                self.running.insert(key, transition);
            }
        }
    }

    /// Leave/blur target for one property of a hover or focus binding.
    fn resting(
        &self,
        index: usize,
        key: &(ElementKey, String),
        current: Value,
        driven: &DrivenValues,
    ) -> Goal {
        let binding = &self.bindings[index];
        if let Some(rest) = binding.spec.rest.get(&key.1) {
            return Goal::fixed(*rest);
        }
        if let Some(value) = driven.get(key) {
            return Goal::tracking(*value);
        }
        Goal::fixed(binding.captured.get(&key.1).copied().unwrap_or(current))
    }

    /// Where a property would come to rest if no press had happened.
    fn settled(&self, key: &(ElementKey, String), current: Value, driven: &DrivenValues) -> Goal {
        if let Some(running) = self.running.get(key) {
            return running.settles_at();
        }
        let (element, property) = key;
        let held = self.bindings.iter().find_map(|b| {
            let state = self.state(&b.spec.target);
            let engaged = match b.spec.on {
                MicroTrigger::Hover => state.hovered,
                MicroTrigger::Focus => state.focused,
                MicroTrigger::Press | MicroTrigger::Click => false,
            };
            if engaged && b.spec.animated() == element {
                b.spec.active.get(property).copied()
            } else {
                None
            }
        });
        match (held, driven.get(key)) {
            (Some(value), _) => Goal::fixed(value),
            (None, Some(value)) => Goal::tracking(*value),
            (None, None) => Goal::fixed(current),
        }
    }

    /// Advance running transitions and return the values to write.
    pub fn step(&mut self, dt: f32, driven: &DrivenValues) -> Vec<(ElementKey, String, Value)> {
        let mut writes = Vec::with_capacity(self.running.len());
        self.running.retain(|key, tr| {
            tr.elapsed += dt.max(0.0);
            if tr.to.tracks {
                if let Some(value) = driven.get(key) {
                    tr.to.value = *value;
                }
            }
            writes.push((key.0.clone(), key.1.clone(), tr.value()));
            if !tr.finished() {
                return true;
            }
            match tr.then.take() {
                Some(back) => {
                    *tr = Transition {
                        from: tr.to.value,
                        to: back,
                        elapsed: 0.0,
                        duration: tr.duration,
                        ease: tr.ease,
                        then: None,
                    };
                    true
                }
                None => false,
            }
        });
        writes
    }

    /// Forget all state and running transitions.
    pub fn clear(&mut self) {
        self.states.clear();
        self.running.clear();
        for binding in &mut self.bindings {
            binding.captured.clear();
        }
    }
}

fn default_follow_props() -> [String; 2] {
    ["x".to_string(), "y".to_string()]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FollowerSpec {
    pub target: ElementKey,
    /// Properties receiving the horizontal and vertical coordinate.
    #[serde(default = "default_follow_props")]
    pub properties: [String; 2],
    /// Added to the pointer position (e.g. to center the element on it).
    #[serde(default)]
    pub offset: [f32; 2],
}

impl FollowerSpec {
    pub fn new(target: impl Into<ElementKey>) -> Self {
        Self {
            target: target.into(),
            properties: default_follow_props(),
            offset: [0.0, 0.0],
        }
    }
}

/// Exponentially smoothed pointer tracking: each step moves a fixed
/// fraction `k` of the remaining distance.
#[derive(Clone, Debug)]
pub struct PointerFollower {
    spec: FollowerSpec,
    smoothing: f32,
    current: Option<[f32; 2]>,
    goal: Option<[f32; 2]>,
}

/// Below this distance the follower snaps to the goal and goes idle.
const SETTLE_EPSILON: f32 = 0.01;

impl PointerFollower {
    pub fn new(spec: FollowerSpec, smoothing: f32) -> Self {
        Self {
            spec,
            smoothing: smoothing.clamp(f32::EPSILON, 1.0),
            current: None,
            goal: None,
        }
    }

    pub fn spec(&self) -> &FollowerSpec {
        &self.spec
    }

    pub fn position(&self) -> Option<[f32; 2]> {
        self.current
    }

    /// Set the pointer position the follower glides toward.
    pub fn set_goal(&mut self, pointer: [f32; 2]) {
        self.goal = Some([
            pointer[0] + self.spec.offset[0],
            pointer[1] + self.spec.offset[1],
        ]);
    }

    /// Advance one frame. Returns the new position, or `None` while idle
    /// or when the target is not rendered.
    pub fn step(&mut self, host: &dyn ElementHost) -> Option<[f32; 2]> {
        let goal = self.goal?;
        let [px, py] = &self.spec.properties;
        let prev = match self.current {
            Some(p) => p,
            None => {
                let read = |prop: &str| host.read(&self.spec.target, prop).and_then(|v| v.as_f32());
                [read(px)?, read(py)?]
            }
        };
        if prev == goal {
            self.current = Some(prev);
            return None;
        }
        let k = self.smoothing;
        let mut next = [
            prev[0] + (goal[0] - prev[0]) * k,
            prev[1] + (goal[1] - prev[1]) * k,
        ];
        if (goal[0] - next[0]).abs() < SETTLE_EPSILON && (goal[1] - next[1]).abs() < SETTLE_EPSILON
        {
            next = goal;
        }
        self.current = Some(next);
        Some(next)
    }

    /// Drop the tracked position so the next step reseeds from the host.
    pub fn reset(&mut self) {
        self.current = None;
        self.goal = None;
    }
}
