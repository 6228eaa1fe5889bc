//! Per-section animation lifecycle.
//!
//! A [`SectionSpec`] is plain data describing everything one page section
//! animates: initial property sets, timelines and their triggers, hover /
//! focus / press micro-animations and pointer followers. A
//! [`SectionController`] owns the runtime for one mounted spec. Every write
//! it makes goes through its [`MutationJournal`], so [`SectionController::stop`]
//! restores the page to its pre-mount state regardless of playback state.

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::host::{ElementHost, ElementKey};
use crate::ids::{SectionId, SubscriptionId};
use crate::interaction::{
    DrivenValues, FollowerSpec, InteractionEvent, Interactions, MicroSpec, PointerFollower,
};
use crate::journal::MutationJournal;
use crate::outputs::{Change, FrameOutputs, MotionEvent};
use crate::scroll::{ProgressSnapshot, ScrollTracker, TriggerRegion};
use crate::timeline::{BoundTimeline, Timeline};
use crate::value::{Props, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    /// Timeline position follows scroll progress in both directions.
    Scrub,
    /// Plays through once the first time the region is entered; never resets.
    #[default]
    Once,
    /// Plays forward while the region is entered, reverses when scrolled back above it.
    Toggle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Trigger {
    Scroll {
        region: TriggerRegion,
        #[serde(default)]
        mode: ScrollMode,
    },
    /// Plays on mount after `delay` seconds (page-load intros and idle
    /// loops such as a bouncing scroll hint).
    Immediate {
        #[serde(default)]
        delay: f32,
        #[serde(default)]
        repeat: LoopMode,
    },
}

impl Trigger {
    pub fn immediate(delay: f32) -> Self {
        Trigger::Immediate {
            delay,
            repeat: LoopMode::Once,
        }
    }

    pub fn repeating(delay: f32, repeat: LoopMode) -> Self {
        Trigger::Immediate { delay, repeat }
    }
}

/// How an immediate timeline's playhead maps onto the timeline once it
/// runs past the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play through once and hold the end state.
    #[default]
    Once,
    /// Restart from the beginning.
    Loop,
    /// Alternate forward and backward (yoyo).
    PingPong,
}

impl LoopMode {
    /// Timeline time for a playhead `clock` seconds in.
    pub fn local_time(self, clock: f32, span: f32) -> f32 {
        if span <= 0.0 {
            return 0.0;
        }
        match self {
            LoopMode::Once => clock.clamp(0.0, span),
            LoopMode::Loop => clock.rem_euclid(span),
            LoopMode::PingPong => {
                let phase = clock.rem_euclid(2.0 * span);
                if phase <= span {
                    phase
                } else {
                    2.0 * span - phase
                }
            }
        }
    }

    fn finishes(self, span: f32) -> bool {
        self == LoopMode::Once || span <= 0.0
    }
}

/// Properties applied once on mount, before any timeline is bound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialSet {
    pub targets: Vec<ElementKey>,
    pub props: Props,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineBinding {
    pub trigger: Trigger,
    pub timeline: Timeline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    /// Element observed for active-section routing; `None` keeps the
    /// section out of the navigation highlight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<ElementKey>,
    #[serde(default)]
    pub initial: Vec<InitialSet>,
    #[serde(default)]
    pub timelines: Vec<TimelineBinding>,
    #[serde(default)]
    pub interactions: Vec<MicroSpec>,
    #[serde(default)]
    pub followers: Vec<FollowerSpec>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor: None,
            initial: Vec::new(),
            timelines: Vec::new(),
            interactions: Vec::new(),
            followers: Vec::new(),
        }
    }

    pub fn anchor(mut self, element: impl Into<ElementKey>) -> Self {
        self.anchor = Some(element.into());
        self
    }

    pub fn set<I, S>(mut self, targets: I, props: Props) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementKey>,
    {
        self.initial.push(InitialSet {
            targets: targets.into_iter().map(Into::into).collect(),
            props,
        });
        self
    }

    pub fn timeline(mut self, trigger: Trigger, timeline: Timeline) -> Self {
        self.timelines.push(TimelineBinding { trigger, timeline });
        self
    }

    pub fn interaction(mut self, micro: MicroSpec) -> Self {
        self.interactions.push(micro);
        self
    }

    pub fn follower(mut self, follower: FollowerSpec) -> Self {
        self.followers.push(follower);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| MotionError::InvalidSection {
            section: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".into()));
        }
        for (idx, binding) in self.timelines.iter().enumerate() {
            binding
                .timeline
                .validate()
                .map_err(|e| invalid(format!("timeline {idx}: {e}")))?;
            if let Trigger::Immediate { delay, .. } = binding.trigger {
                if !delay.is_finite() || delay < 0.0 {
                    return Err(invalid(format!("timeline {idx}: delay must be >= 0")));
                }
            }
        }
        for micro in &self.interactions {
            if !micro.duration.is_finite() || micro.duration < 0.0 {
                return Err(invalid(format!(
                    "interaction on '{}': duration must be >= 0",
                    micro.target
                )));
            }
        }
        Ok(())
    }
}

/// Routes a section's writes through its journal and mirrors them as changes.
pub struct Writer<'a> {
    section: SectionId,
    host: &'a mut dyn ElementHost,
    journal: &'a mut MutationJournal,
    outputs: &'a mut FrameOutputs,
    driven: Option<&'a mut DrivenValues>,
}

impl<'a> Writer<'a> {
    pub fn new(
        section: SectionId,
        host: &'a mut dyn ElementHost,
        journal: &'a mut MutationJournal,
        outputs: &'a mut FrameOutputs,
    ) -> Self {
        Self {
            section,
            host,
            journal,
            outputs,
            driven: None,
        }
    }

    /// Remember timeline writes in `driven` (see [`Writer::drive`]).
    pub fn driving(mut self, driven: &'a mut DrivenValues) -> Self {
        self.driven = Some(driven);
        self
    }

    pub fn host(&self) -> &dyn ElementHost {
        &*self.host
    }

    pub fn write(&mut self, element: &str, property: &str, value: Value) {
        if !self.host.exists(element) {
            return;
        }
        self.journal.record(&*self.host, element, property);
        self.host.write(element, property, value);
        self.outputs.push_change(Change {
            section: self.section,
            element: element.to_string(),
            property: property.to_string(),
            value,
        });
    }

    /// Write a timeline-sampled value. Micro-animations that end on this
    /// property settle on the latest such value.
    pub fn drive(&mut self, element: &str, property: &str, value: Value) {
        if !self.host.exists(element) {
            return;
        }
        if let Some(driven) = self.driven.as_deref_mut() {
            driven.insert((element.to_string(), property.to_string()), value);
        }
        self.write(element, property, value);
    }

    pub fn event(&mut self, event: MotionEvent) {
        self.outputs.push_event(event);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Playback {
    Idle,
    Playing,
    Done,
}

#[derive(Debug)]
struct Player {
    index: usize,
    trigger: Trigger,
    bound: BoundTimeline,
    subscription: Option<SubscriptionId>,
    last_progress: Option<f32>,
    last_time: Option<f32>,
    has_played: bool,
    clock: f32,
    playback: Playback,
}

impl Player {
    fn write_at(&mut self, time: f32, writer: &mut Writer<'_>) {
        if self.last_time == Some(time) {
            return;
        }
        self.last_time = Some(time);
        for (element, property, value) in self.bound.sample(time) {
            writer.drive(element, property, value);
        }
    }

    fn apply(&mut self, section: SectionId, progress: f32, dt: f32, writer: &mut Writer<'_>) {
        let span = self.bound.span();
        let timeline = self.index;
        match self.trigger {
            Trigger::Scroll {
                mode: ScrollMode::Scrub,
                ..
            } => {
                let previous = self.last_progress;
                if previous == Some(progress) {
                    return;
                }
                self.last_progress = Some(progress);
                self.write_at(progress * span, writer);
                let was = previous.unwrap_or(0.0);
                if was <= 0.0 && progress > 0.0 {
                    writer.event(MotionEvent::TimelineStarted { section, timeline });
                }
                if was < 1.0 && progress >= 1.0 {
                    writer.event(MotionEvent::TimelineCompleted { section, timeline });
                }
            }
            Trigger::Scroll {
                mode: ScrollMode::Once,
                ..
            } => {
                if !self.has_played && progress > 0.0 {
                    self.has_played = true;
                    self.playback = Playback::Playing;
                    self.clock = 0.0;
                    writer.event(MotionEvent::TimelineStarted { section, timeline });
                } else if self.playback == Playback::Playing {
                    self.clock += dt;
                }
                if self.playback == Playback::Playing {
                    self.write_at(self.clock.min(span), writer);
                    if self.clock >= span {
                        self.playback = Playback::Done;
                        writer.event(MotionEvent::TimelineCompleted { section, timeline });
                    }
                }
            }
            Trigger::Scroll {
                mode: ScrollMode::Toggle,
                ..
            } => {
                let forward = progress > 0.0;
                let before = self.clock;
                self.clock = if forward {
                    (self.clock + dt).min(span)
                } else {
                    (self.clock - dt).max(0.0)
                };
                if forward && self.playback != Playback::Playing && before < span {
                    self.playback = Playback::Playing;
                    writer.event(MotionEvent::TimelineStarted { section, timeline });
                }
                if !forward {
                    self.playback = Playback::Idle;
                }
                self.write_at(self.clock, writer);
                if forward && self.playback == Playback::Playing && self.clock >= span {
                    self.playback = Playback::Done;
                    writer.event(MotionEvent::TimelineCompleted { section, timeline });
                }
            }
            Trigger::Immediate { repeat, .. } => {
                if self.playback == Playback::Done {
                    return;
                }
                self.clock += dt;
                if self.clock < 0.0 {
                    return;
                }
                if self.playback == Playback::Idle {
                    self.playback = Playback::Playing;
                    writer.event(MotionEvent::TimelineStarted { section, timeline });
                }
                self.write_at(repeat.local_time(self.clock, span), writer);
                if repeat.finishes(span) && self.clock >= span {
                    self.playback = Playback::Done;
                    writer.event(MotionEvent::TimelineCompleted { section, timeline });
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct SectionController {
    id: SectionId,
    spec: SectionSpec,
    journal: MutationJournal,
    players: Vec<Player>,
    interactions: Interactions,
    driven: DrivenValues,
    followers: Vec<PointerFollower>,
    smoothing: f32,
    running: bool,
}

impl SectionController {
    pub fn new(id: SectionId, spec: SectionSpec, pointer_smoothing: f32) -> Self {
        Self {
            id,
            interactions: Interactions::new(spec.interactions.iter().cloned()),
            spec,
            journal: MutationJournal::new(),
            driven: DrivenValues::new(),
            players: Vec::new(),
            followers: Vec::new(),
            smoothing: pointer_smoothing,
            running: false,
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &SectionSpec {
        &self.spec
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of distinct properties this section has touched.
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Apply initial state, bind timelines and subscribe their triggers.
    /// Calling it on a running controller does nothing.
    pub fn start(
        &mut self,
        host: &mut dyn ElementHost,
        tracker: &mut ScrollTracker,
        outputs: &mut FrameOutputs,
    ) {
        if self.running {
            return;
        }
        self.running = true;
        let id = self.id;
        let mut writer =
            Writer::new(id, host, &mut self.journal, outputs).driving(&mut self.driven);

        for set in &self.spec.initial {
            for target in &set.targets {
                for (property, value) in &set.props {
                    writer.write(target, property, *value);
                }
            }
        }

        for (index, binding) in self.spec.timelines.iter().enumerate() {
            let bound = binding.timeline.bind(writer.host());
            if !bound.skipped().is_empty() {
                log::debug!(
                    "section '{}' timeline {}: skipped absent targets {:?}",
                    self.spec.name,
                    index,
                    bound.skipped()
                );
            }
            let clock = match binding.trigger {
                Trigger::Immediate { delay, .. } => -delay,
                Trigger::Scroll { .. } => 0.0,
            };
            let mut player = Player {
                index,
                trigger: binding.trigger.clone(),
                bound,
                subscription: None,
                last_progress: None,
                last_time: None,
                has_played: false,
                clock,
                playback: Playback::Idle,
            };
            // Hidden/initial appearance before the first frame.
            player.write_at(0.0, &mut writer);
            if let Trigger::Scroll { region, .. } = &binding.trigger {
                let sub = tracker.subscribe(region.clone(), Some(id), writer.host());
                player.subscription = Some(sub);
            }
            self.players.push(player);
        }

        self.followers = self
            .spec
            .followers
            .iter()
            .cloned()
            .map(|f| PointerFollower::new(f, self.smoothing))
            .collect();
        log::debug!(
            "section '{}' started: {} timelines, {} interactions, {} followers",
            self.spec.name,
            self.players.len(),
            self.spec.interactions.len(),
            self.followers.len()
        );
    }

    /// Drive every timeline from this frame's progress snapshot.
    pub fn apply(
        &mut self,
        snapshot: &ProgressSnapshot,
        dt: f32,
        host: &mut dyn ElementHost,
        outputs: &mut FrameOutputs,
    ) {
        if !self.running {
            return;
        }
        let mut writer =
            Writer::new(self.id, host, &mut self.journal, outputs).driving(&mut self.driven);
        for player in &mut self.players {
            let progress = player
                .subscription
                .and_then(|sub| snapshot.get(sub))
                .unwrap_or(0.0);
            player.apply(self.id, progress, dt, &mut writer);
        }
    }

    /// Whether a pointer/focus event on `element` concerns this section.
    pub fn handles(&self, element: &str) -> bool {
        self.interactions.handles(element)
    }

    pub fn has_followers(&self) -> bool {
        !self.followers.is_empty()
    }

    pub fn interact(&mut self, element: &str, event: InteractionEvent, host: &dyn ElementHost) {
        if self.running {
            self.interactions.handle(element, event, host, &self.driven);
        }
    }

    pub fn pointer_moved(&mut self, pointer: [f32; 2]) {
        for follower in &mut self.followers {
            follower.set_goal(pointer);
        }
    }

    /// Advance micro-animations and followers by one frame.
    pub fn step_interactions(
        &mut self,
        dt: f32,
        host: &mut dyn ElementHost,
        outputs: &mut FrameOutputs,
    ) {
        if !self.running {
            return;
        }
        let mut writer = Writer::new(self.id, host, &mut self.journal, outputs);
        for (element, property, value) in self.interactions.step(dt, &self.driven) {
            writer.write(&element, &property, value);
        }
        for follower in &mut self.followers {
            if let Some([x, y]) = follower.step(writer.host()) {
                let spec = follower.spec();
                writer.write(&spec.target, &spec.properties[0], Value::Float(x));
                writer.write(&spec.target, &spec.properties[1], Value::Float(y));
            }
        }
    }

    /// Tear down: unsubscribe triggers, drop playback and interaction state,
    /// and restore every property this section ever wrote. Idempotent.
    /// Returns the number of properties restored.
    pub fn stop(
        &mut self,
        host: &mut dyn ElementHost,
        tracker: &mut ScrollTracker,
        outputs: &mut FrameOutputs,
    ) -> usize {
        tracker.unsubscribe_owner(self.id);
        self.players.clear();
        self.interactions.clear();
        self.driven.clear();
        for follower in &mut self.followers {
            follower.reset();
        }
        self.followers.clear();
        self.running = false;

        let restored = self.journal.revert(host);
        let count = restored.len();
        outputs
            .changes
            .extend(restored.into_iter().map(|(element, property, value)| Change {
                section: self.id,
                element,
                property,
                value,
            }));
        if count > 0 {
            log::debug!("section '{}' stopped: restored {count} properties", self.spec.name);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Rect};
    use crate::scroll::Viewport;
    use crate::timeline::TweenSpec;
    use crate::value::props;

    fn page() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.insert("about", Rect::new(1000.0, 0.0, 1200.0, 800.0));
        host.insert("about.left", Rect::new(1100.0, 0.0, 600.0, 400.0));
        host
    }

    fn fade_in(trigger: Trigger) -> SectionSpec {
        SectionSpec::new("about")
            .anchor("about")
            .set(["about.left"], props([("opacity", 0.0), ("x", -40.0)]))
            .timeline(
                trigger,
                Timeline::new().add(
                    TweenSpec::to(["about.left"], props([("opacity", 1.0), ("x", 0.0)]))
                        .duration(1.0)
                        .ease(crate::easing::Ease::Linear),
                ),
            )
    }

    fn region() -> TriggerRegion {
        TriggerRegion::parse("about", "top bottom", "top top").unwrap()
    }

    struct Rig {
        host: MemoryHost,
        tracker: ScrollTracker,
        outputs: FrameOutputs,
        ctl: SectionController,
    }

    impl Rig {
        fn new(spec: SectionSpec) -> Self {
            let mut host = page();
            let mut tracker = ScrollTracker::new(Viewport::new(1200.0, 800.0));
            let mut outputs = FrameOutputs::default();
            let mut ctl = SectionController::new(SectionId(0), spec, 0.2);
            ctl.start(&mut host, &mut tracker, &mut outputs);
            Self {
                host,
                tracker,
                outputs,
                ctl,
            }
        }

        fn frame(&mut self, scroll_y: f32, dt: f32) {
            self.outputs.clear();
            self.tracker.on_scroll(scroll_y);
            let snapshot = self.tracker.flush(&self.host).clone();
            self.ctl.apply(&snapshot, dt, &mut self.host, &mut self.outputs);
        }

        fn opacity(&self) -> f32 {
            self.host.get_f32("about.left", "opacity").unwrap()
        }
    }

    #[test]
    fn start_hides_before_first_frame() {
        let rig = Rig::new(fade_in(Trigger::Scroll {
            region: region(),
            mode: ScrollMode::Once,
        }));
        assert_eq!(rig.opacity(), 0.0);
        assert_eq!(rig.host.get_f32("about.left", "x"), Some(-40.0));
    }

    #[test]
    fn scrub_tracks_progress_both_ways() {
        let mut rig = Rig::new(fade_in(Trigger::Scroll {
            region: region(),
            mode: ScrollMode::Scrub,
        }));
        // region spans scroll 200..1000
        rig.frame(600.0, 0.016);
        assert!((rig.opacity() - 0.5).abs() < 1e-5);
        rig.frame(1000.0, 0.016);
        assert_eq!(rig.opacity(), 1.0);
        rig.frame(200.0, 0.016);
        assert_eq!(rig.opacity(), 0.0);
    }

    #[test]
    fn scrub_skips_writes_when_progress_is_unchanged() {
        let mut rig = Rig::new(fade_in(Trigger::Scroll {
            region: region(),
            mode: ScrollMode::Scrub,
        }));
        rig.frame(600.0, 0.016);
        let writes = rig.host.write_count();
        rig.frame(600.0, 0.016);
        assert_eq!(rig.host.write_count(), writes);
        assert!(rig.outputs.changes.is_empty());
    }

    #[test]
    fn once_plays_through_and_never_resets() {
        let mut rig = Rig::new(fade_in(Trigger::Scroll {
            region: region(),
            mode: ScrollMode::Once,
        }));
        rig.frame(300.0, 0.016);
        assert!(rig
            .outputs
            .events
            .iter()
            .any(|e| matches!(e, MotionEvent::TimelineStarted { .. })));
        for _ in 0..80 {
            rig.frame(300.0, 0.016);
        }
        assert_eq!(rig.opacity(), 1.0);

        rig.frame(0.0, 0.016);
        rig.frame(300.0, 0.016);
        assert_eq!(rig.opacity(), 1.0);
        assert!(!rig
            .outputs
            .events
            .iter()
            .any(|e| matches!(e, MotionEvent::TimelineStarted { .. })));
    }

    #[test]
    fn toggle_reverses_when_scrolled_back() {
        let mut rig = Rig::new(fade_in(Trigger::Scroll {
            region: region(),
            mode: ScrollMode::Toggle,
        }));
        for _ in 0..12 {
            rig.frame(300.0, 0.1);
        }
        assert_eq!(rig.opacity(), 1.0);
        for _ in 0..5 {
            rig.frame(0.0, 0.1);
        }
        let partway = rig.opacity();
        assert!(partway > 0.0 && partway < 1.0);
        for _ in 0..12 {
            rig.frame(0.0, 0.1);
        }
        assert_eq!(rig.opacity(), 0.0);
    }

    #[test]
    fn immediate_waits_for_delay() {
        let mut rig = Rig::new(fade_in(Trigger::immediate(0.2)));
        rig.frame(0.0, 0.1);
        assert_eq!(rig.opacity(), 0.0);
        assert!(rig.outputs.events.is_empty());
        rig.frame(0.0, 0.15);
        assert!(rig.opacity() > 0.0);
        for _ in 0..20 {
            rig.frame(0.0, 0.1);
        }
        assert_eq!(rig.opacity(), 1.0);
    }

    #[test]
    fn loop_modes_map_the_playhead() {
        assert_eq!(LoopMode::Once.local_time(-0.5, 2.0), 0.0);
        assert_eq!(LoopMode::Once.local_time(5.0, 2.0), 2.0);
        assert_eq!(LoopMode::Loop.local_time(2.5, 2.0), 0.5);
        assert_eq!(LoopMode::PingPong.local_time(1.5, 2.0), 1.5);
        assert_eq!(LoopMode::PingPong.local_time(2.5, 2.0), 1.5);
        assert_eq!(LoopMode::PingPong.local_time(4.5, 2.0), 0.5);
        assert_eq!(LoopMode::Loop.local_time(3.0, 0.0), 0.0);
    }

    #[test]
    fn ping_pong_intro_keeps_bouncing_and_never_completes() {
        let mut rig = Rig::new(fade_in(Trigger::repeating(0.0, LoopMode::PingPong)));
        let mut events = Vec::new();
        let mut peaked = false;
        for _ in 0..40 {
            rig.frame(0.0, 0.1);
            events.extend(rig.outputs.events.drain(..));
            peaked |= rig.opacity() > 0.99;
        }
        // Two full round trips of a 1 s yoyo: back at the start.
        assert!(peaked);
        assert!(rig.opacity() < 1e-4, "opacity = {}", rig.opacity());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MotionEvent::TimelineStarted { .. }));

        let mut out = FrameOutputs::default();
        rig.ctl.stop(&mut rig.host, &mut rig.tracker, &mut out);
        assert_eq!(rig.opacity(), 1.0);
        assert_eq!(rig.host.get_f32("about.left", "x"), Some(0.0));
    }

    #[test]
    fn stop_restores_pre_mount_values_and_is_idempotent() {
        let mut rig = Rig::new(fade_in(Trigger::Scroll {
            region: region(),
            mode: ScrollMode::Scrub,
        }));
        rig.frame(600.0, 0.016);
        let mut out = FrameOutputs::default();
        let restored = rig.ctl.stop(&mut rig.host, &mut rig.tracker, &mut out);
        assert_eq!(restored, 2);
        assert_eq!(rig.opacity(), 1.0);
        assert_eq!(rig.host.get_f32("about.left", "x"), Some(0.0));
        assert_eq!(rig.tracker.subscription_count(), 0);
        assert_eq!(rig.ctl.stop(&mut rig.host, &mut rig.tracker, &mut out), 0);
    }

    #[test]
    fn validate_rejects_negative_delay() {
        let spec = fade_in(Trigger::immediate(-1.0));
        assert!(matches!(
            spec.validate(),
            Err(MotionError::InvalidSection { .. })
        ));
    }

    #[test]
    fn spec_from_json() {
        let spec: SectionSpec = serde_json::from_value(serde_json::json!({
            "name": "about",
            "anchor": "about",
            "initial": [{ "targets": ["about.left"], "props": { "opacity": 0, "x": -40 } }],
            "timelines": [{
                "trigger": {
                    "kind": "scroll",
                    "region": { "trigger": "about", "start": "top 85%", "end": "top 30%" },
                    "mode": "scrub"
                },
                "timeline": [
                    {
                        "targets": ["about.left"],
                        "to": { "opacity": 1, "x": 0 },
                        "duration": 1,
                        "ease": "power3.out"
                    }
                ]
            }],
            "interactions": [
                { "target": "about.cta", "on": "hover", "active": { "scale": 1.05 } }
            ]
        }))
        .unwrap();
        assert!(spec.validate().is_ok());
        assert!(matches!(
            spec.timelines[0].trigger,
            Trigger::Scroll { mode: ScrollMode::Scrub, .. }
        ));
        assert_eq!(spec.interactions[0].duration, 0.3);
    }

    #[test]
    fn repeat_defaults_to_once() {
        let trigger: Trigger =
            serde_json::from_str(r#"{ "kind": "immediate", "delay": 2 }"#).unwrap();
        assert_eq!(trigger, Trigger::immediate(2.0));
        let trigger: Trigger =
            serde_json::from_str(r#"{ "kind": "immediate", "repeat": "ping_pong" }"#).unwrap();
        assert_eq!(trigger, Trigger::repeating(0.0, LoopMode::PingPong));
    }
}
