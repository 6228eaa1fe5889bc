//! Inertial scrolling.
//!
//! Wheel and touch deltas move a target position; the visible scroll
//! position glides toward it with an eased tween that is retargeted from
//! its current sample whenever new input arrives.

use crate::config::SmoothScrollConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Glide {
    from: f32,
    to: f32,
    elapsed: f32,
}

#[derive(Clone, Debug)]
pub struct SmoothScroller {
    config: SmoothScrollConfig,
    position: f32,
    target: f32,
    limit: f32,
    glide: Option<Glide>,
}

impl SmoothScroller {
    pub fn new(config: SmoothScrollConfig) -> Self {
        Self {
            config,
            position: 0.0,
            target: 0.0,
            limit: f32::MAX,
            glide: None,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.glide.is_some()
    }

    /// Largest reachable scroll offset (document height minus viewport height).
    pub fn set_limit(&mut self, max_scroll: f32) {
        self.limit = max_scroll.max(0.0);
        self.target = self.target.min(self.limit);
    }

    pub fn wheel(&mut self, delta: f32) {
        self.retarget(self.target + delta * self.config.wheel_multiplier);
    }

    pub fn touch(&mut self, delta: f32) {
        self.retarget(self.target + delta * self.config.touch_multiplier);
    }

    /// Animated scroll to an absolute offset (anchor navigation).
    pub fn scroll_to(&mut self, offset: f32) {
        self.retarget(offset);
    }

    /// Jump without animation, e.g. when the host scrolled natively.
    pub fn jump_to(&mut self, offset: f32) {
        let offset = offset.clamp(0.0, self.limit);
        self.position = offset;
        self.target = offset;
        self.glide = None;
    }

    fn retarget(&mut self, to: f32) {
        let to = to.clamp(0.0, self.limit);
        self.target = to;
        if to == self.position {
            self.glide = None;
            return;
        }
        self.glide = Some(Glide {
            from: self.position,
            to,
            elapsed: 0.0,
        });
    }

    /// Advance the glide. Returns the new position while moving.
    pub fn step(&mut self, dt: f32) -> Option<f32> {
        let glide = self.glide.as_mut()?;
        glide.elapsed += dt.max(0.0);
        let t = if self.config.duration <= 0.0 {
            1.0
        } else {
            glide.elapsed / self.config.duration
        };
        let eased = self.config.ease.apply(t);
        self.position = glide.from + (glide.to - glide.from) * eased;
        if t >= 1.0 {
            self.position = glide.to;
            self.glide = None;
        }
        Some(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroller() -> SmoothScroller {
        let mut s = SmoothScroller::new(SmoothScrollConfig::default());
        s.set_limit(5000.0);
        s
    }

    #[test]
    fn wheel_glides_and_settles() {
        let mut s = scroller();
        s.wheel(300.0);
        let first = s.step(1.0 / 60.0).unwrap();
        assert!(first > 0.0 && first < 300.0);
        let mut frames = 0;
        while s.step(1.0 / 60.0).is_some() {
            frames += 1;
        }
        assert!(frames <= 72);
        assert_eq!(s.position(), 300.0);
    }

    #[test]
    fn touch_uses_multiplier() {
        let mut s = scroller();
        s.touch(100.0);
        assert_eq!(s.target(), 200.0);
    }

    #[test]
    fn retarget_continues_from_current_sample() {
        let mut s = scroller();
        s.wheel(1000.0);
        s.step(0.2);
        let mid = s.position();
        s.wheel(-500.0);
        assert_eq!(s.target(), 500.0);
        // first sample of the new glide starts where the old one was
        assert!((s.step(0.0).unwrap() - mid).abs() < 1e-3);
    }

    #[test]
    fn clamps_to_limits() {
        let mut s = scroller();
        s.wheel(-200.0);
        assert_eq!(s.step(0.016), None);
        s.scroll_to(99_999.0);
        assert_eq!(s.target(), 5000.0);
        s.jump_to(-10.0);
        assert_eq!(s.position(), 0.0);
        assert!(!s.is_animating());
    }
}
