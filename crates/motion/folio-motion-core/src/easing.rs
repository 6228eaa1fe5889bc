//! Named easing curves.
//!
//! Curves are written and parsed in the familiar `family.direction(param)`
//! notation: `power2.out`, `sine.inOut`, `back.out(1.7)`, `expo.out`,
//! `cubic-bezier(0.25,0.1,0.25,1)`, `none`.
//!
//! `back.*` curves leave [0,1] transiently (spring-like overshoot). The
//! endpoints are always exact: `apply(0) == 0` and `apply(1) == 1`.

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Overshoot used by `back.*` when no parameter is given.
pub const DEFAULT_OVERSHOOT: f32 = 1.70158;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inOut",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    Linear,
    /// Polynomial of the given degree (`power1` is quadratic).
    Power(Direction, u8),
    Sine(Direction),
    Expo(Direction),
    /// Overshooting cubic; the parameter scales the overshoot.
    Back(Direction, f32),
    /// CSS-style cubic bezier timing (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

impl Ease {
    pub const EXPO_OUT: Ease = Ease::Expo(Direction::Out);
    pub const POWER2_OUT: Ease = Ease::Power(Direction::Out, 3);

    /// Map linear progress to eased progress. Input is clamped to [0,1].
    pub fn apply(&self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Ease::Linear => t,
            Ease::Power(dir, degree) => directed(dir, t, |x| x.powi(i32::from(degree))),
            Ease::Sine(dir) => directed(dir, t, |x| 1.0 - (x * FRAC_PI_2).cos()),
            Ease::Expo(dir) => directed(dir, t, |x| {
                if x <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (x - 1.0))
                }
            }),
            Ease::Back(dir, c1) => {
                let c3 = c1 + 1.0;
                directed(dir, t, |x| c3 * x * x * x - c1 * x * x)
            }
            Ease::CubicBezier([x1, y1, x2, y2]) => bezier_ease_t(t, x1, y1, x2, y2),
        }
    }
}

impl Default for Ease {
    /// `power1.out`
    fn default() -> Self {
        Ease::Power(Direction::Out, 2)
    }
}

/// Derive out/inOut variants from an ease-in curve.
#[inline]
fn directed(dir: Direction, t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    match dir {
        Direction::In => ease_in(t),
        Direction::Out => 1.0 - ease_in(1.0 - t),
        Direction::InOut => {
            if t < 0.5 {
                ease_in(2.0 * t) * 0.5
            } else {
                1.0 - ease_in(2.0 * (1.0 - t)) * 0.5
            }
        }
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x curve by bisection, then evaluate y.
#[inline]
fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if x1 == y1 && x2 == y2 {
        return t;
    }
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

fn parse_direction(s: &str) -> Option<Direction> {
    match s.to_ascii_lowercase().as_str() {
        "in" => Some(Direction::In),
        "out" => Some(Direction::Out),
        "inout" => Some(Direction::InOut),
        _ => None,
    }
}

fn parse_bezier(args: &str) -> Option<[f32; 4]> {
    let nums: Vec<f32> = args
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    let ctrl: [f32; 4] = nums.try_into().ok()?;
    // x control points must stay in [0,1] for the timing curve to be a function.
    if !(0.0..=1.0).contains(&ctrl[0]) || !(0.0..=1.0).contains(&ctrl[2]) {
        return None;
    }
    Some(ctrl)
}

impl FromStr for Ease {
    type Err = MotionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        let unknown = || MotionError::UnknownEase(raw.to_string());

        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("linear") {
            return Ok(Ease::Linear);
        }
        if let Some(args) = s
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_bezier(args).map(Ease::CubicBezier).ok_or_else(unknown);
        }

        let (name, param) = match s.split_once('(') {
            Some((name, rest)) => {
                let arg = rest.strip_suffix(')').ok_or_else(unknown)?;
                let value = arg.trim().parse::<f32>().map_err(|_| unknown())?;
                (name, Some(value))
            }
            None => (s, None),
        };
        let (family, dir) = match name.split_once('.') {
            Some((family, dir)) => (family, parse_direction(dir).ok_or_else(unknown)?),
            None => (name, Direction::Out),
        };

        let ease = match family.to_ascii_lowercase().as_str() {
            "power0" => Ease::Linear,
            "power1" | "quad" => Ease::Power(dir, 2),
            "power2" | "cubic" => Ease::Power(dir, 3),
            "power3" | "quart" => Ease::Power(dir, 4),
            "power4" | "quint" => Ease::Power(dir, 5),
            "sine" => Ease::Sine(dir),
            "expo" => Ease::Expo(dir),
            "back" => Ease::Back(dir, param.unwrap_or(DEFAULT_OVERSHOOT)),
            _ => return Err(unknown()),
        };
        if param.is_some() && !matches!(ease, Ease::Back(..)) {
            return Err(unknown());
        }
        Ok(ease)
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::Linear => f.write_str("none"),
            Ease::Power(dir, degree) => {
                write!(f, "power{}.{}", degree.saturating_sub(1), dir.as_str())
            }
            Ease::Sine(dir) => write!(f, "sine.{}", dir.as_str()),
            Ease::Expo(dir) => write!(f, "expo.{}", dir.as_str()),
            Ease::Back(dir, c) => write!(f, "back.{}({})", dir.as_str(), c),
            Ease::CubicBezier([a, b, c, d]) => write!(f, "cubic-bezier({a},{b},{c},{d})"),
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(value: Ease) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_named() -> Vec<Ease> {
        [
            "none",
            "power1.in",
            "power2.out",
            "power3.inOut",
            "power4.out",
            "sine.inOut",
            "expo.out",
            "back.out(1.7)",
            "back.in",
            "back.inOut(2)",
            "cubic-bezier(0.25,0.1,0.25,1)",
        ]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect()
    }

    #[test]
    fn endpoints_exact_for_every_curve() {
        for ease in all_named() {
            assert_eq!(ease.apply(0.0), 0.0, "{ease}");
            assert_eq!(ease.apply(1.0), 1.0, "{ease}");
            assert_eq!(ease.apply(-3.0), 0.0, "{ease}");
            assert_eq!(ease.apply(7.0), 1.0, "{ease}");
        }
    }

    #[test]
    fn back_out_overshoots_above_one() {
        let ease: Ease = "back.out(1.7)".parse().unwrap();
        let peak = (1..100)
            .map(|i| ease.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "peak was {peak}");
    }

    #[test]
    fn back_in_dips_below_zero() {
        let ease: Ease = "back.in".parse().unwrap();
        assert!(ease.apply(0.2) < 0.0);
    }

    #[test]
    fn monotonic_curves_stay_in_unit_range() {
        for name in ["power2.out", "power3.inOut", "sine.inOut", "expo.out"] {
            let ease: Ease = name.parse().unwrap();
            let mut last = 0.0;
            for i in 0..=50 {
                let v = ease.apply(i as f32 / 50.0);
                assert!((0.0..=1.0).contains(&v), "{name} at {i}: {v}");
                assert!(v >= last - 1e-6, "{name} not monotonic at {i}");
                last = v;
            }
        }
    }

    #[test]
    fn power_out_matches_closed_form() {
        let ease: Ease = "power2.out".parse().unwrap();
        let t = 0.3f32;
        let expected = 1.0 - (1.0 - t).powi(3);
        assert!((ease.apply(t) - expected).abs() < 1e-6);
    }

    #[test]
    fn direction_defaults_to_out() {
        assert_eq!("power2".parse::<Ease>().unwrap(), Ease::Power(Direction::Out, 3));
        assert_eq!("back".parse::<Ease>().unwrap(), Ease::Back(Direction::Out, DEFAULT_OVERSHOOT));
    }

    #[test]
    fn display_parses_back() {
        for ease in all_named() {
            let again: Ease = ease.to_string().parse().unwrap();
            assert_eq!(again, ease);
        }
    }

    #[test]
    fn rejects_garbage() {
        for bad in [
            "wobble.out",
            "power2.sideways",
            "sine.out(3)",
            "cubic-bezier(2,0,0,1)",
            "back.out(x)",
        ] {
            assert!(matches!(bad.parse::<Ease>(), Err(MotionError::UnknownEase(_))), "{bad}");
        }
    }

    #[test]
    fn serde_as_string() {
        let e: Ease = serde_json::from_str("\"back.out(2)\"").unwrap();
        assert_eq!(e, Ease::Back(Direction::Out, 2.0));
        assert_eq!(serde_json::to_string(&Ease::POWER2_OUT).unwrap(), "\"power2.out\"");
    }
}
