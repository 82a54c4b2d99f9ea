/// Linear interpolation of one value toward a target over a fixed window,
/// driven by the frame clock in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Tween {
    from: f32,
    to: f32,
    start: f64,
    duration: f64,
}

impl Tween {
    pub(in crate::app) fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
        }
    }

    pub(in crate::app) fn value(&self, now: f64) -> f32 {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return self.to;
        }
        let progress = ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32;
        self.from + (self.to - self.from) * progress
    }

    pub(in crate::app) fn is_animating(&self, now: f64) -> bool {
        self.duration > 0.0 && now < self.start + self.duration
    }

    /// Restarts from the current value. Retargeting to the same value keeps
    /// the running animation.
    pub(in crate::app) fn retarget(&mut self, to: f32, now: f64, duration: f64) {
        if self.to == to {
            return;
        }
        self.from = self.value(now);
        self.to = to;
        self.start = now;
        self.duration = duration;
    }

    pub(in crate::app) fn snap(&mut self, value: f32) {
        *self = Self::settled(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_linearly_and_stops_at_target() {
        let mut tween = Tween::settled(1.0);
        tween.retarget(0.2, 10.0, 0.2);

        assert_eq!(tween.value(10.0), 1.0);
        assert!((tween.value(10.1) - 0.6).abs() < 1e-5);
        assert_eq!(tween.value(10.5), 0.2);
        assert!(tween.is_animating(10.1));
        assert!(!tween.is_animating(10.3));
    }

    #[test]
    fn retarget_mid_flight_continues_from_current_value() {
        let mut tween = Tween::settled(0.0);
        tween.retarget(1.0, 0.0, 1.0);
        tween.retarget(0.0, 0.5, 1.0);
        assert!((tween.value(0.5) - 0.5).abs() < 1e-5);
        assert!((tween.value(1.0) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut tween = Tween::settled(0.0);
        tween.retarget(1.0, 0.0, 1.0);
        tween.retarget(1.0, 0.5, 1.0);
        assert!((tween.value(0.75) - 0.75).abs() < 1e-5);
    }
}
