//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::error::{MotionError, Result};

/// Vertical band of the viewport used for active-section detection,
/// as fractions of the viewport height measured from the top.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterBand {
    pub top: f32,
    pub bottom: f32,
}

impl Default for RouterBand {
    fn default() -> Self {
        // Upper-middle of the screen: the most visually prominent area.
        Self {
            top: 0.2,
            bottom: 0.5,
        }
    }
}

/// Inertial wheel/touch scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Seconds for one retargeted glide.
    pub duration: f32,
    pub ease: Ease,
    pub wheel_multiplier: f32,
    pub touch_multiplier: f32,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            duration: 1.2,
            ease: Ease::EXPO_OUT,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub router_band: RouterBand,

    /// Exponential smoothing factor for pointer-following elements, in (0,1).
    /// Closer to 1 is snappier.
    pub pointer_smoothing: f32,

    /// Upper bound on the per-frame delta (seconds). A backgrounded tab can
    /// deliver one huge delta; clock-driven timelines should not skip.
    pub max_frame_dt: f32,

    /// `None` disables smooth scrolling; native scroll events drive the tracker.
    pub smooth_scroll: Option<SmoothScrollConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            router_band: RouterBand::default(),
            pointer_smoothing: 0.2,
            max_frame_dt: 0.1,
            smooth_scroll: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let band = self.router_band;
        if !(band.top.is_finite() && band.bottom.is_finite()) || band.top > band.bottom {
            return Err(MotionError::InvalidConfig(format!(
                "router_band must satisfy top <= bottom (got {} .. {})",
                band.top, band.bottom
            )));
        }
        if !(self.pointer_smoothing > 0.0 && self.pointer_smoothing < 1.0) {
            return Err(MotionError::InvalidConfig(format!(
                "pointer_smoothing must be in (0,1) (got {})",
                self.pointer_smoothing
            )));
        }
        if !(self.max_frame_dt > 0.0 && self.max_frame_dt.is_finite()) {
            return Err(MotionError::InvalidConfig(
                "max_frame_dt must be > 0".into(),
            ));
        }
        if let Some(smooth) = &self.smooth_scroll {
            if !(smooth.duration >= 0.0 && smooth.duration.is_finite()) {
                return Err(MotionError::InvalidConfig(
                    "smooth_scroll.duration must be >= 0".into(),
                ));
            }
        }
        Ok(())
    }
}
