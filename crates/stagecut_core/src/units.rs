use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// ---------------------------------------------------------------------------
// Px
// ---------------------------------------------------------------------------

/// Timeline position/duration in base pixels: 40 base-px = 1 second at 100%
/// zoom. Everything the engine stores is in this unit; screen pixels only
/// exist at the pointer-event boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Px(pub f64);

/// Base pixels per second at 100% zoom.
pub const PX_PER_SECOND: f64 = 40.0;

/// Hard timeline cap: 3 minutes.
pub const HARD_LIMIT: Px = Px(180.0 * PX_PER_SECOND);

/// A clip can never shrink below this width.
pub const MIN_CLIP_WIDTH: Px = Px(80.0);

/// Playhead times are quantized to this frame rate.
pub const PLAYHEAD_FPS: f64 = 30.0;

impl Px {
    pub const ZERO: Self = Self(0.0);

    pub fn from_seconds(s: f64) -> Self {
        Self(s * PX_PER_SECOND)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 / PX_PER_SECOND
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Add for Px {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Px {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Px {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Px {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Neg for Px {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = (self.as_seconds().abs() * 1000.0).round() as u64;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let mins = total_secs / 60;
        if self.0 < 0.0 {
            write!(f, "-{:02}:{:02}.{:03}", mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}.{:03}", mins, secs, ms)
        }
    }
}

/// Clamp a seek target into the playable range `[0, HARD_LIMIT]`.
pub fn clamp_time(t: Px) -> Px {
    t.clamp(Px::ZERO, HARD_LIMIT)
}

/// Snap a time to the nearest 1/30-second frame boundary. Works in the
/// seconds domain so whole seconds stay exact.
pub fn quantize_to_frame(t: Px) -> Px {
    let frames = (t.as_seconds() * PLAYHEAD_FPS).round();
    Px::from_seconds(frames / PLAYHEAD_FPS)
}

// ---------------------------------------------------------------------------
// Zoom
// ---------------------------------------------------------------------------

/// Current zoom as on-screen pixels per second, stepped in 10%-of-base
/// increments and clamped to 50%..200% of the base rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Zoom {
    pixels_per_second: f64,
}

impl Zoom {
    pub const STEP: f64 = PX_PER_SECOND * 0.1;
    pub const MIN_RATE: f64 = PX_PER_SECOND * 0.5;
    pub const MAX_RATE: f64 = PX_PER_SECOND * 2.0;

    pub fn new() -> Self {
        Self {
            pixels_per_second: PX_PER_SECOND,
        }
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// Zoom level as a percentage of the base rate (100.0 at 40 px/s).
    pub fn percent(&self) -> f64 {
        self.pixels_per_second / PX_PER_SECOND * 100.0
    }

    pub fn zoom_in(&mut self) {
        self.pixels_per_second = (self.pixels_per_second + Self::STEP).min(Self::MAX_RATE);
    }

    pub fn zoom_out(&mut self) {
        self.pixels_per_second = (self.pixels_per_second - Self::STEP).max(Self::MIN_RATE);
    }

    pub fn can_zoom_in(&self) -> bool {
        self.pixels_per_second < Self::MAX_RATE
    }

    pub fn can_zoom_out(&self) -> bool {
        self.pixels_per_second > Self::MIN_RATE
    }

    pub fn to_screen_px(&self, base: Px) -> f32 {
        (base.0 * self.pixels_per_second / PX_PER_SECOND) as f32
    }

    pub fn to_base_px(&self, screen: f32) -> Px {
        Px(screen as f64 * PX_PER_SECOND / self.pixels_per_second)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen x positions of second markers for the ruler, one per second up to
/// and including the hard limit.
pub fn ruler_ticks(zoom: &Zoom) -> Vec<(f32, u32)> {
    let seconds = HARD_LIMIT.as_seconds() as u32;
    (0..=seconds)
        .map(|s| (zoom.to_screen_px(Px::from_seconds(s as f64)), s))
        .collect()
}

/// Screen x of the persistent 3-minute hard-limit marker.
pub fn hard_limit_marker_x(zoom: &Zoom) -> f32 {
    zoom.to_screen_px(HARD_LIMIT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_seconds_roundtrip() {
        let p = Px::from_seconds(2.5);
        assert_eq!(p, Px(100.0));
        assert!((p.as_seconds() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn px_arithmetic() {
        assert_eq!(Px(30.0) + Px(10.0), Px(40.0));
        assert_eq!(Px(30.0) - Px(10.0), Px(20.0));
        assert_eq!(Px(30.0) * 2.0, Px(60.0));
        assert_eq!(Px(30.0) / 2.0, Px(15.0));
        assert_eq!(-Px(30.0), Px(-30.0));
    }

    #[test]
    fn px_display() {
        assert_eq!(Px::ZERO.to_string(), "00:00.000");
        assert_eq!(Px::from_seconds(1.5).to_string(), "00:01.500");
        assert_eq!(Px::from_seconds(61.0).to_string(), "01:01.000");
        assert_eq!(Px::from_seconds(-1.0).to_string(), "-00:01.000");
    }

    #[test]
    fn seek_clamps_to_hard_limit() {
        // Past the 3-minute cap
        assert_eq!(clamp_time(Px::from_seconds(200.0)), HARD_LIMIT);
        assert_eq!(clamp_time(Px::from_seconds(-5.0)), Px::ZERO);
        assert_eq!(clamp_time(Px::from_seconds(30.0)), Px::from_seconds(30.0));
    }

    #[test]
    fn quantize_snaps_to_frame_boundary() {
        let frame = PX_PER_SECOND / PLAYHEAD_FPS;
        let t = quantize_to_frame(Px(frame * 2.4));
        assert!((t.0 - frame * 2.0).abs() < 1e-9);
        let t = quantize_to_frame(Px(frame * 2.6));
        assert!((t.0 - frame * 3.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_steps_and_conversion() {
        let mut z = Zoom::new();
        assert_eq!(z.percent(), 100.0);
        z.zoom_in();
        assert_eq!(z.pixels_per_second(), 44.0);

        // 100 base-px at 110% -> 110 screen px and back
        assert!((z.to_screen_px(Px(100.0)) - 110.0).abs() < 1e-4);
        let back = z.to_base_px(110.0);
        assert!((back.0 - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_in_clamps_at_max() {
        // Repeated zoom-in pins at 200%; further requests are no-ops
        let mut z = Zoom::new();
        for _ in 0..20 {
            z.zoom_in();
        }
        assert_eq!(z.percent(), 200.0);
        assert!(!z.can_zoom_in());
        z.zoom_in();
        assert_eq!(z.percent(), 200.0);
    }

    #[test]
    fn zoom_out_clamps_at_min() {
        let mut z = Zoom::new();
        for _ in 0..20 {
            z.zoom_out();
        }
        assert_eq!(z.percent(), 50.0);
        assert!(!z.can_zoom_out());
        z.zoom_out();
        assert_eq!(z.percent(), 50.0);
    }

    #[test]
    fn ruler_covers_hard_limit() {
        let zoom = Zoom::new();
        let ticks = ruler_ticks(&zoom);
        assert_eq!(ticks.len(), 181);
        assert_eq!(ticks[0], (0.0, 0));
        let (x, s) = ticks[180];
        assert_eq!(s, 180);
        assert!((x - hard_limit_marker_x(&zoom)).abs() < 1e-4);
    }
}
