//! Hue rotation over wall-clock time
//!
//! Each fixture owns one [`HueCycler`]. Hue is a fraction of a full turn in
//! [0, 1); fixtures may spin at different rates so they drift apart.
//!
//! The accumulator is `f64`. Per-frame steps are tiny next to the hue itself
//! and would be partly rounded away in `f32`.

use std::time::Duration;

use crate::types::Rgb;

/// Largest `f32` below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Angular hue accumulator for one fixture
#[derive(Debug, Clone, PartialEq)]
pub struct HueCycler {
    /// Current hue, fraction of a full rotation in [0, 1)
    hue: f64,
    /// Rotation speed in degrees per second
    frequency_deg_per_sec: f32,
}

impl HueCycler {
    pub fn new(frequency_deg_per_sec: f32) -> Self {
        Self::with_hue(frequency_deg_per_sec, 0.0)
    }

    /// Start from a given hue (wrapped into [0, 1))
    pub fn with_hue(frequency_deg_per_sec: f32, hue: f32) -> Self {
        Self {
            hue: (hue as f64).rem_euclid(1.0),
            frequency_deg_per_sec,
        }
    }

    /// Current hue narrowed to `f32`, still strictly below 1.0
    pub fn hue(&self) -> f32 {
        (self.hue as f32).min(BELOW_ONE)
    }

    pub fn frequency_deg_per_sec(&self) -> f32 {
        self.frequency_deg_per_sec
    }

    /// Advance the hue by `dt` of elapsed time
    ///
    /// One subtraction wraps any step shorter than a full rotation. A longer
    /// step only happens when the loop stalled (suspend, blocked audio), in
    /// which case the fractional part is taken instead.
    pub fn advance(&mut self, dt: Duration) {
        self.hue += self.frequency_deg_per_sec as f64 * dt.as_secs_f64() / 360.0;
        if self.hue >= 1.0 {
            self.hue -= 1.0;
            if self.hue >= 1.0 {
                log::debug!("Hue step spanned more than one rotation, loop stalled?");
                self.hue = self.hue.fract();
            }
        }
    }
}

/// Convert hue/saturation/value (each in [0, 1]) to RGB
///
/// A hue of exactly 1.0 is treated as 0.0 (red).
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    if saturation <= 0.0 {
        return Rgb::new(value, value, value);
    }

    let scaled = hue * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    match (sector as i32).rem_euclid(6) {
        0 => Rgb::new(value, t, p),
        1 => Rgb::new(q, value, p),
        2 => Rgb::new(p, value, t),
        3 => Rgb::new(p, q, value),
        4 => Rgb::new(t, p, value),
        _ => Rgb::new(value, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb(actual: Rgb, expected: (f32, f32, f32)) {
        let close = |a: f32, b: f32| (a - b).abs() < 1e-5;
        assert!(
            close(actual.red, expected.0) && close(actual.green, expected.1) && close(actual.blue, expected.2),
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_zero_dt_leaves_hue_unchanged() {
        let mut cycler = HueCycler::with_hue(12.0, 0.25);
        for _ in 0..100 {
            cycler.advance(Duration::ZERO);
        }
        assert_eq!(cycler.hue(), 0.25);
    }

    #[test]
    fn test_advance_rate() {
        // 36 deg/s for 2.5s = 90 degrees = quarter turn
        let mut cycler = HueCycler::new(36.0);
        cycler.advance(Duration::from_millis(2500));
        assert!((cycler.hue() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_strictly_increasing_until_wrap() {
        let mut cycler = HueCycler::new(12.0);
        let mut previous = cycler.hue();
        let mut wraps = 0;
        for _ in 0..2000 {
            cycler.advance(Duration::from_millis(20));
            let hue = cycler.hue();
            if hue < previous {
                wraps += 1;
            } else {
                assert!(hue > previous);
            }
            assert!((0.0..1.0).contains(&hue));
            previous = hue;
        }
        // 40 seconds at a 30 second period
        assert_eq!(wraps, 1);
    }

    #[test]
    fn test_exact_turn_wraps_to_zero() {
        let mut cycler = HueCycler::new(360.0);
        cycler.advance(Duration::from_secs(1));
        assert_eq!(cycler.hue(), 0.0);
    }

    #[test]
    fn test_stall_keeps_hue_in_range() {
        let mut cycler = HueCycler::with_hue(12.0, 0.5);
        // 100 seconds is more than three rotations
        cycler.advance(Duration::from_secs(100));
        let hue = cycler.hue();
        assert!((0.0..1.0).contains(&hue));
        // 0.5 + 1200/360 = 3.8333..
        assert!((hue - 0.833_333).abs() < 1e-4);
    }

    #[test]
    fn test_microsecond_steps_are_not_lost() {
        // Each step is below half an f32 ulp at hue 0.5
        let mut cycler = HueCycler::with_hue(12.0, 0.5);
        for _ in 0..1_000_000 {
            cycler.advance(Duration::from_micros(1));
        }
        assert!((cycler.hue() - (0.5 + 12.0 / 360.0)).abs() < 1e-6);
    }

    #[test]
    fn test_hue_just_below_one_stays_in_range() {
        let mut cycler = HueCycler::with_hue(12.0, 0.0);
        // One nanosecond short of a full turn rounds to 1.0 in f32
        cycler.advance(Duration::from_secs(30) - Duration::from_nanos(1));
        assert!((0.0..1.0).contains(&cycler.hue()));
    }

    #[test]
    fn test_independent_cyclers() {
        let mut slow = HueCycler::new(12.0);
        let mut fast = HueCycler::new(24.0);
        slow.advance(Duration::from_secs(3));
        fast.advance(Duration::from_secs(3));
        assert!((slow.hue() - 0.1).abs() < 1e-6);
        assert!((fast.hue() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_rgb(hsv_to_rgb(0.0, 1.0, 1.0), (1.0, 0.0, 0.0));
        assert_rgb(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), (0.0, 1.0, 0.0));
        assert_rgb(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), (0.0, 0.0, 1.0));
        assert_rgb(hsv_to_rgb(1.0, 1.0, 1.0), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_hsv_value_scales_output() {
        assert_rgb(hsv_to_rgb(1.0 / 6.0, 1.0, 0.5), (0.5, 0.5, 0.0));
        assert_rgb(hsv_to_rgb(0.5, 1.0, 0.0), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_hsv_zero_saturation_is_grey() {
        assert_rgb(hsv_to_rgb(0.7, 0.0, 0.4), (0.4, 0.4, 0.4));
    }
}
