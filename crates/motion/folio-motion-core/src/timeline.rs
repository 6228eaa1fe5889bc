//! Timeline data model and its interpreter.
//!
//! A [`Timeline`] is plain data: an ordered list of [`TweenSpec`] entries.
//! [`Timeline::layout`] resolves positions and staggers into absolute start
//! times; [`Timeline::bind`] resolves start values against a host and
//! groups the result into per-property channels. Sampling a
//! [`BoundTimeline`] is a pure function of time, so a scrubbed timeline is
//! fully determined by scroll position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::error::{MotionError, Result};
use crate::host::{ElementHost, ElementKey};
use crate::value::{Props, Value};

fn default_duration() -> f32 {
    0.5
}

/// Where an entry starts, relative to the timeline built so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub enum Position {
    /// At the current end of the timeline (`">"`).
    #[default]
    After,
    /// Offset from the current end (`"+=0.2"`, `"-=0.7"`), floored at 0.
    Relative(f32),
    /// Absolute time in seconds.
    At(f32),
    /// Same start as the previous entry (`"<"`).
    WithPrevious,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Seconds(f32),
    Label(String),
}

impl FromStr for Position {
    type Err = MotionError;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let s = raw.trim();
        let invalid = || MotionError::InvalidPosition(raw.to_string());
        let number = |n: &str| n.trim().parse::<f32>().ok().filter(|v| v.is_finite());
        match s {
            ">" => Ok(Position::After),
            "<" => Ok(Position::WithPrevious),
            _ => {
                if let Some(n) = s.strip_prefix("+=") {
                    number(n).map(Position::Relative).ok_or_else(invalid)
                } else if let Some(n) = s.strip_prefix("-=") {
                    number(n).map(|v| Position::Relative(-v)).ok_or_else(invalid)
                } else {
                    number(s)
                        .filter(|v| *v >= 0.0)
                        .map(Position::At)
                        .ok_or_else(invalid)
                }
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::After => f.write_str(">"),
            Position::WithPrevious => f.write_str("<"),
            Position::Relative(d) if *d < 0.0 => write!(f, "-={}", -d),
            Position::Relative(d) => write!(f, "+={d}"),
            Position::At(t) => write!(f, "{t}"),
        }
    }
}

impl TryFrom<RawPosition> for Position {
    type Error = MotionError;

    fn try_from(raw: RawPosition) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawPosition::Seconds(t) if t.is_finite() && t >= 0.0 => Ok(Position::At(t)),
            RawPosition::Seconds(t) => Err(MotionError::InvalidPosition(t.to_string())),
            RawPosition::Label(s) => s.parse(),
        }
    }
}

impl From<Position> for RawPosition {
    fn from(p: Position) -> Self {
        match p {
            Position::At(t) => RawPosition::Seconds(t),
            other => RawPosition::Label(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StaggerMode {
    /// Fixed delay between consecutive items.
    Each(f32),
    /// Total budget spread across all items, whatever their count.
    Amount(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaggerFrom {
    #[default]
    Start,
    End,
}

/// Distribution of start offsets across the targets of one entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStagger", into = "RawStagger")]
pub struct Stagger {
    pub mode: StaggerMode,
    pub from: StaggerFrom,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawStagger {
    Each(f32),
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        each: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f32>,
        #[serde(default)]
        from: StaggerFrom,
    },
}

impl TryFrom<RawStagger> for Stagger {
    type Error = MotionError;

    fn try_from(raw: RawStagger) -> std::result::Result<Self, Self::Error> {
        let (mode, from) = match raw {
            RawStagger::Each(d) => (StaggerMode::Each(d), StaggerFrom::Start),
            RawStagger::Object {
                each: Some(d),
                amount: None,
                from,
            } => (StaggerMode::Each(d), from),
            RawStagger::Object {
                each: None,
                amount: Some(t),
                from,
            } => (StaggerMode::Amount(t), from),
            RawStagger::Object { .. } => {
                return Err(MotionError::InvalidStagger(
                    "exactly one of `each` or `amount` is required".into(),
                ))
            }
        };
        let stagger = Stagger { mode, from };
        stagger.validate()?;
        Ok(stagger)
    }
}

impl From<Stagger> for RawStagger {
    fn from(s: Stagger) -> Self {
        let (each, amount) = match s.mode {
            StaggerMode::Each(d) => (Some(d), None),
            StaggerMode::Amount(t) => (None, Some(t)),
        };
        RawStagger::Object {
            each,
            amount,
            from: s.from,
        }
    }
}

impl Stagger {
    pub fn each(delay: f32) -> Self {
        Self {
            mode: StaggerMode::Each(delay),
            from: StaggerFrom::Start,
        }
    }

    pub fn amount(total: f32) -> Self {
        Self {
            mode: StaggerMode::Amount(total),
            from: StaggerFrom::Start,
        }
    }

    pub fn from_end(mut self) -> Self {
        self.from = StaggerFrom::End;
        self
    }

    fn validate(&self) -> Result<()> {
        let v = match self.mode {
            StaggerMode::Each(d) => d,
            StaggerMode::Amount(t) => t,
        };
        if !v.is_finite() || v < 0.0 {
            return Err(MotionError::InvalidStagger(format!(
                "stagger value must be finite and >= 0 (got {v})"
            )));
        }
        Ok(())
    }

    /// Start offset of each item, in insertion order.
    pub fn offsets(&self, count: usize) -> Vec<f32> {
        let step = match self.mode {
            StaggerMode::Each(d) => d,
            StaggerMode::Amount(total) if count > 1 => total / (count - 1) as f32,
            StaggerMode::Amount(_) => 0.0,
        };
        (0..count)
            .map(|i| {
                let rank = match self.from {
                    StaggerFrom::Start => i,
                    StaggerFrom::End => count - 1 - i,
                };
                rank as f32 * step
            })
            .collect()
    }
}

/// One authored timeline entry: the same property change applied to one
/// or more targets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    pub targets: Vec<ElementKey>,
    /// Explicit start values. Properties missing here start from wherever
    /// the previous tween on the same property ended, or from the
    /// element's current value.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub from: Props,
    #[serde(default)]
    pub to: Props,
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub ease: Ease,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
}

impl TweenSpec {
    pub fn to<I, S>(targets: I, to: Props) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementKey>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            from: Props::new(),
            to,
            duration: default_duration(),
            ease: Ease::default(),
            position: Position::default(),
            stagger: None,
        }
    }

    pub fn from_to<I, S>(targets: I, from: Props, to: Props) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementKey>,
    {
        Self {
            from,
            ..Self::to(targets, to)
        }
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    pub entries: Vec<TweenSpec>,
}

/// A tween with its absolute start time resolved, one per target.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidOutTween {
    pub entry: usize,
    pub target: ElementKey,
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
    pub from: Props,
    pub to: Props,
}

impl LaidOutTween {
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, tween: TweenSpec) -> Self {
        self.entries.push(tween);
        self
    }

    pub fn push(&mut self, tween: TweenSpec) {
        self.entries.push(tween);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            if !entry.duration.is_finite() || entry.duration < 0.0 {
                return Err(MotionError::InvalidDuration(entry.duration));
            }
            if let Some(stagger) = &entry.stagger {
                stagger.validate()?;
            }
        }
        Ok(())
    }

    /// Resolve every entry into per-target tweens with absolute times.
    pub fn layout(&self) -> Vec<LaidOutTween> {
        let mut out = Vec::new();
        let mut span = 0.0f32;
        let mut prev_start = 0.0f32;

        for (idx, entry) in self.entries.iter().enumerate() {
            let start = match entry.position {
                Position::After => span,
                Position::Relative(d) => (span + d).max(0.0),
                Position::At(t) => t.max(0.0),
                Position::WithPrevious => prev_start,
            };
            let offsets = match &entry.stagger {
                Some(stagger) => stagger.offsets(entry.targets.len()),
                None => vec![0.0; entry.targets.len()],
            };
            let duration = entry.duration.max(0.0);
            for (target, offset) in entry.targets.iter().zip(offsets) {
                let tween = LaidOutTween {
                    entry: idx,
                    target: target.clone(),
                    start: start + offset,
                    duration,
                    ease: entry.ease,
                    from: entry.from.clone(),
                    to: entry.to.clone(),
                };
                span = span.max(tween.end());
                out.push(tween);
            }
            prev_start = start;
        }
        out
    }

    /// Max end time of any laid-out tween.
    pub fn span(&self) -> f32 {
        self.layout()
            .iter()
            .map(LaidOutTween::end)
            .fold(0.0, f32::max)
    }

    /// Resolve start values against `host` and build the sampling channels.
    /// Tweens whose target is not rendered are skipped.
    pub fn bind(&self, host: &dyn ElementHost) -> BoundTimeline {
        let laid_out = self.layout();
        let span = laid_out.iter().map(LaidOutTween::end).fold(0.0, f32::max);
        let mut bound = BoundTimeline {
            channels: Vec::new(),
            span,
            skipped: Vec::new(),
        };

        for tween in laid_out {
            if !host.exists(&tween.target) {
                log::debug!(
                    "timeline entry {}: target '{}' not rendered; skipping",
                    tween.entry,
                    tween.target
                );
                if !bound.skipped.contains(&tween.target) {
                    bound.skipped.push(tween.target);
                }
                continue;
            }
            let properties = tween
                .from
                .keys()
                .chain(tween.to.keys().filter(|k| !tween.from.contains_key(*k)));
            for property in properties {
                let idx = bound.channel_index(&tween.target, property);
                let channel = &mut bound.channels[idx];
                let resting = channel
                    .segments
                    .last()
                    .map(|s| s.to)
                    .or_else(|| host.read(&tween.target, property))
                    .unwrap_or_else(|| Value::rest_for(property));
                channel.segments.push(Segment {
                    start: tween.start,
                    duration: tween.duration,
                    ease: tween.ease,
                    from: tween.from.get(property).copied().unwrap_or(resting),
                    to: tween.to.get(property).copied().unwrap_or(resting),
                });
            }
        }
        bound
    }
}

/// One interpolation on one property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
    pub from: Value,
    pub to: Value,
}

impl Segment {
    pub fn value_at(&self, time: f32) -> Value {
        let local = if self.duration <= 0.0 {
            if time >= self.start {
                1.0
            } else {
                0.0
            }
        } else {
            (time - self.start) / self.duration
        };
        self.from.lerp(&self.to, self.ease.apply(local))
    }
}

/// All segments driving one (element, property) pair, in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub target: ElementKey,
    pub property: String,
    pub segments: Vec<Segment>,
}

impl Channel {
    /// Before its first segment starts a channel holds that segment's start
    /// value; afterwards the latest started segment wins.
    pub fn value_at(&self, time: f32) -> Option<Value> {
        let first = self.segments.first()?;
        let mut value = first.from;
        for seg in &self.segments {
            if time >= seg.start {
                value = seg.value_at(time);
            }
        }
        Some(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundTimeline {
    channels: Vec<Channel>,
    span: f32,
    skipped: Vec<ElementKey>,
}

impl BoundTimeline {
    fn channel_index(&mut self, target: &str, property: &str) -> usize {
        if let Some(idx) = self
            .channels
            .iter()
            .position(|c| c.target == target && c.property == property)
        {
            return idx;
        }
        self.channels.push(Channel {
            target: target.to_string(),
            property: property.to_string(),
            segments: Vec::new(),
        });
        self.channels.len() - 1
    }

    pub fn span(&self) -> f32 {
        self.span
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Targets left out at bind time because they were not rendered.
    pub fn skipped(&self) -> &[ElementKey] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Property values at `time` seconds. Pure: the same `time` always
    /// yields the same values.
    pub fn sample(&self, time: f32) -> impl Iterator<Item = (&str, &str, Value)> + '_ {
        self.channels.iter().filter_map(move |ch| {
            ch.value_at(time)
                .map(|v| (ch.target.as_str(), ch.property.as_str(), v))
        })
    }

    /// Sample by normalized progress through the whole span.
    pub fn sample_progress(
        &self,
        progress: f32,
    ) -> impl Iterator<Item = (&str, &str, Value)> + '_ {
        self.sample(progress.clamp(0.0, 1.0) * self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Rect};
    use crate::value::props;

    fn host_with(keys: &[&str]) -> MemoryHost {
        let mut host = MemoryHost::new();
        for k in keys {
            host.insert(*k, Rect::default());
        }
        host
    }

    #[test]
    fn positions_parse() {
        assert_eq!("-=0.7".parse::<Position>().unwrap(), Position::Relative(-0.7));
        assert_eq!("+=0.25".parse::<Position>().unwrap(), Position::Relative(0.25));
        assert_eq!("<".parse::<Position>().unwrap(), Position::WithPrevious);
        assert_eq!("1.5".parse::<Position>().unwrap(), Position::At(1.5));
        assert!("-1".parse::<Position>().is_err());
        assert!("soon".parse::<Position>().is_err());
    }

    #[test]
    fn overlapping_layout_and_span() {
        // left: 0..1, right: 0.3..1.3 ("-=0.7")
        let tl = Timeline::new()
            .add(TweenSpec::to(["left"], props([("opacity", 1.0)])).duration(1.0))
            .add(
                TweenSpec::to(["right"], props([("opacity", 1.0)]))
                    .duration(1.0)
                    .at(Position::Relative(-0.7)),
            );
        let laid = tl.layout();
        assert_eq!(laid[0].start, 0.0);
        assert!((laid[1].start - 0.3).abs() < 1e-6);
        assert!((tl.span() - 1.3).abs() < 1e-6);
    }

    #[test]
    fn with_previous_shares_start() {
        let tl = Timeline::new()
            .add(TweenSpec::to(["a"], props([("x", 1.0)])).duration(1.0))
            .add(TweenSpec::to(["b"], props([("x", 1.0)])).duration(2.0))
            .add(
                TweenSpec::to(["c"], props([("x", 1.0)]))
                    .duration(0.5)
                    .at(Position::WithPrevious),
            );
        let laid = tl.layout();
        assert_eq!(laid[2].start, laid[1].start);
        assert_eq!(tl.span(), 3.0);
    }

    #[test]
    fn each_stagger_offsets() {
        let s = Stagger::each(0.15);
        let offsets = s.offsets(4);
        assert!((offsets[3] - 0.45).abs() < 1e-6);
        let rev = s.from_end().offsets(4);
        assert_eq!(rev[3], 0.0);
        assert!((rev[0] - 0.45).abs() < 1e-6);
    }

    #[test]
    fn amount_stagger_respects_budget_for_any_count() {
        for n in [1usize, 2, 7, 50] {
            let targets: Vec<String> = (0..n).map(|i| format!("item{i}")).collect();
            let tl = Timeline::new().add(
                TweenSpec::to(targets, props([("y", 0.0)]))
                    .duration(0.6)
                    .stagger(Stagger::amount(1.5)),
            );
            let laid = tl.layout();
            let last_end = laid.iter().map(LaidOutTween::end).fold(0.0, f32::max);
            assert!(last_end <= 1.5 + 0.6 + 1e-5, "n={n}: {last_end}");
        }
    }

    #[test]
    fn stagger_json_forms() {
        let a: Stagger = serde_json::from_str("0.1").unwrap();
        assert_eq!(a, Stagger::each(0.1));
        let b: Stagger = serde_json::from_str(r#"{"amount":1.5,"from":"end"}"#).unwrap();
        assert_eq!(b, Stagger::amount(1.5).from_end());
        assert!(serde_json::from_str::<Stagger>(r#"{"each":0.1,"amount":1}"#).is_err());
        assert!(serde_json::from_str::<Stagger>(r#"{"each":-0.1}"#).is_err());
    }

    #[test]
    fn bind_resolves_chained_start_values() {
        let mut host = host_with(&["card"]);
        host.set("card", "y", Value::Float(60.0));
        let tl = Timeline::new()
            .add(TweenSpec::to(["card"], props([("y", 0.0)])).duration(1.0))
            .add(TweenSpec::to(["card"], props([("y", -8.0)])).duration(1.0));
        let bound = tl.bind(&host);
        let ch = &bound.channels()[0];
        assert_eq!(ch.segments[0].from, Value::Float(60.0));
        assert_eq!(ch.segments[1].from, Value::Float(0.0));
        assert_eq!(ch.value_at(2.0), Some(Value::Float(-8.0)));
        assert_eq!(ch.value_at(0.0), Some(Value::Float(60.0)));
    }

    #[test]
    fn bind_skips_absent_targets() {
        let host = host_with(&["present"]);
        let tl = Timeline::new().add(TweenSpec::to(
            ["present", "missing"],
            props([("opacity", 1.0)]),
        ));
        let bound = tl.bind(&host);
        assert_eq!(bound.channels().len(), 1);
        assert_eq!(bound.skipped(), &["missing".to_string()]);
    }

    #[test]
    fn zero_duration_segment_is_a_step() {
        let host = host_with(&["line"]);
        let tl = Timeline::new().add(
            TweenSpec::from_to(["line"], props([("scaleX", 0.0)]), props([("scaleX", 1.0)]))
                .duration(0.0)
                .at(Position::At(0.5)),
        );
        let bound = tl.bind(&host);
        let ch = &bound.channels()[0];
        assert_eq!(ch.value_at(0.49), Some(Value::Float(0.0)));
        assert_eq!(ch.value_at(0.5), Some(Value::Float(1.0)));
    }

    #[test]
    fn timeline_json_is_an_array() {
        let tl: Timeline = serde_json::from_str(
            r#"[{"targets":["h"],"from":{"y":40},"to":{"y":0},
                 "duration":0.8,"ease":"power3.out"},
                {"targets":["a","b"],"to":{"opacity":1},
                 "position":"-=0.4","stagger":{"each":0.08}}]"#,
        )
        .unwrap();
        assert_eq!(tl.entries.len(), 2);
        assert_eq!(tl.entries[1].position, Position::Relative(-0.4));
        assert_eq!(tl.entries[1].duration, 0.5);
        assert!(tl.validate().is_ok());
    }
}
