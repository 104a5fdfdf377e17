use crate::units::Px;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parallel lanes per clip type.
pub const MAX_LANES: usize = 3;

/// Fades may never meet; they keep at least this much clip between them.
pub const MIN_FADE_GAP: Px = Px(10.0);

/// A single fade is capped at 10 seconds of timeline.
pub const MAX_FADE: Px = Px(10.0 * crate::units::PX_PER_SECOND);

// ---------------------------------------------------------------------------
// ClipKind / ClipRef
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Video,
    Text,
    Sound,
}

/// Typed clip handle; the selection set and gesture tracker work in these so
/// the three collections never have to be merged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClipRef {
    pub kind: ClipKind,
    pub id: Uuid,
}

impl ClipRef {
    pub fn new(kind: ClipKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

// ---------------------------------------------------------------------------
// Placed
// ---------------------------------------------------------------------------

/// The positioned-clip capability shared by all three clip types. Lane
/// arrangement, magnetic positioning and the collection ops are generic over
/// this, so each is written once.
pub trait Placed {
    fn id(&self) -> Uuid;
    fn position(&self) -> Px;
    fn duration(&self) -> Px;
    /// Lane index, clamped into `[0, MAX_LANES)` on read.
    fn lane_index(&self) -> usize;

    fn end(&self) -> Px {
        self.position() + self.duration()
    }

    /// Trim offset into the source asset. Zero for clips without a source.
    fn trim_offset(&self) -> Px {
        Px::ZERO
    }
}

/// Mutation half of the capability, split out so read-only queries can run
/// over borrowed clip lists.
pub trait PlacedMut: Placed {
    /// Only duplication and splitting assign ids, and the new id always
    /// comes from the host.
    fn set_id(&mut self, id: Uuid);
    fn set_position(&mut self, position: Px);
    fn set_duration(&mut self, duration: Px);
    fn set_lane_index(&mut self, lane: usize);
    fn set_trim_offset(&mut self, _offset: Px) {}

    /// Re-establish any internal constraints after a geometry change.
    fn normalize(&mut self) {}
}

impl<T: Placed + ?Sized> Placed for &T {
    fn id(&self) -> Uuid {
        (**self).id()
    }
    fn position(&self) -> Px {
        (**self).position()
    }
    fn duration(&self) -> Px {
        (**self).duration()
    }
    fn lane_index(&self) -> usize {
        (**self).lane_index()
    }
    fn trim_offset(&self) -> Px {
        (**self).trim_offset()
    }
}

fn clamp_lane(lane: usize) -> usize {
    lane.min(MAX_LANES - 1)
}

// ---------------------------------------------------------------------------
// VideoClip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoClip {
    pub id: Uuid,
    pub title: String,
    pub position: Px,
    pub duration: Px,
    pub lane_index: usize,
    /// Trim offset into the source asset.
    pub start_time: Px,
    /// Total source length; caps how far the clip can be extended.
    pub max_duration: Option<Px>,
}

impl VideoClip {
    pub fn new(id: Uuid, title: impl Into<String>, position: Px, duration: Px) -> Self {
        Self {
            id,
            title: title.into(),
            position,
            duration,
            lane_index: 0,
            start_time: Px::ZERO,
            max_duration: None,
        }
    }
}

impl Placed for VideoClip {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> Px {
        self.position
    }
    fn duration(&self) -> Px {
        self.duration
    }
    fn lane_index(&self) -> usize {
        clamp_lane(self.lane_index)
    }
    fn trim_offset(&self) -> Px {
        self.start_time
    }
}

impl PlacedMut for VideoClip {
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn set_position(&mut self, position: Px) {
        self.position = position;
    }
    fn set_duration(&mut self, duration: Px) {
        self.duration = duration;
    }
    fn set_lane_index(&mut self, lane: usize) {
        self.lane_index = clamp_lane(lane);
    }
    fn set_trim_offset(&mut self, offset: Px) {
        self.start_time = offset.max(Px::ZERO);
    }
}

// ---------------------------------------------------------------------------
// TextClip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub color: String,
    pub align: TextAlign,
    pub size_ratio: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "Inter".to_string(),
            color: "#ffffff".to_string(),
            align: TextAlign::Center,
            size_ratio: 1.0,
        }
    }
}

/// Text animation presets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextEffect {
    #[default]
    None,
    FadeIn,
    FadeOut,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ZoomIn,
    ZoomOut,
    Typewriter,
    Bounce,
    Pulse,
    Shake,
    Spin,
    Flip,
    Blur,
    Glow,
    Wave,
    Pop,
    Drop,
    Rise,
    Stretch,
    Squeeze,
    Flicker,
    Rainbow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextClip {
    pub id: Uuid,
    pub content: String,
    pub position: Px,
    pub duration: Px,
    pub lane_index: usize,
    pub style: TextStyle,
    pub effect: TextEffect,
}

impl TextClip {
    pub fn new(id: Uuid, content: impl Into<String>, position: Px, duration: Px) -> Self {
        Self {
            id,
            content: content.into(),
            position,
            duration,
            lane_index: 0,
            style: TextStyle::default(),
            effect: TextEffect::None,
        }
    }
}

impl Placed for TextClip {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> Px {
        self.position
    }
    fn duration(&self) -> Px {
        self.duration
    }
    fn lane_index(&self) -> usize {
        clamp_lane(self.lane_index)
    }
}

impl PlacedMut for TextClip {
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn set_position(&mut self, position: Px) {
        self.position = position;
    }
    fn set_duration(&mut self, duration: Px) {
        self.duration = duration;
    }
    fn set_lane_index(&mut self, lane: usize) {
        self.lane_index = clamp_lane(lane);
    }
}

// ---------------------------------------------------------------------------
// SoundClip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoundClip {
    pub id: Uuid,
    pub title: String,
    pub position: Px,
    pub duration: Px,
    pub lane_index: usize,
    /// 0..=100.
    pub volume: f32,
    pub fade_in: Px,
    pub fade_out: Px,
    /// Trim offset into the source audio.
    pub start_time: Px,
    /// Amplitude samples for the waveform display.
    pub waveform: Vec<f32>,
}

impl SoundClip {
    pub fn new(id: Uuid, title: impl Into<String>, position: Px, duration: Px) -> Self {
        Self {
            id,
            title: title.into(),
            position,
            duration,
            lane_index: 0,
            volume: 100.0,
            fade_in: Px::ZERO,
            fade_out: Px::ZERO,
            start_time: Px::ZERO,
            waveform: Vec::new(),
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 100.0);
    }

    /// Largest value a single fade may take for the current duration.
    fn fade_cap(&self) -> Px {
        (self.duration * 0.5).min(MAX_FADE)
    }

    /// Set the fade-in, clamped so it respects the per-fade cap and leaves
    /// the minimum gap before the fade-out.
    pub fn set_fade_in(&mut self, fade: Px) {
        let room = (self.duration - self.fade_out - MIN_FADE_GAP).max(Px::ZERO);
        self.fade_in = fade.clamp(Px::ZERO, self.fade_cap().min(room));
    }

    /// Set the fade-out, clamped against the fade-in symmetrically.
    pub fn set_fade_out(&mut self, fade: Px) {
        let room = (self.duration - self.fade_in - MIN_FADE_GAP).max(Px::ZERO);
        self.fade_out = fade.clamp(Px::ZERO, self.fade_cap().min(room));
    }

    /// Re-clamp both fades; fade-out yields first when the clip shrank.
    pub fn clamp_fades(&mut self) {
        self.fade_in = self.fade_in.clamp(Px::ZERO, self.fade_cap());
        self.fade_out = self.fade_out.clamp(Px::ZERO, self.fade_cap());
        let overflow = self.fade_in + self.fade_out + MIN_FADE_GAP - self.duration;
        if overflow > Px::ZERO {
            let take = overflow.min(self.fade_out);
            self.fade_out = self.fade_out - take;
            let rest = overflow - take;
            if rest > Px::ZERO {
                self.fade_in = (self.fade_in - rest).max(Px::ZERO);
            }
        }
    }
}

impl Placed for SoundClip {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> Px {
        self.position
    }
    fn duration(&self) -> Px {
        self.duration
    }
    fn lane_index(&self) -> usize {
        clamp_lane(self.lane_index)
    }
    fn trim_offset(&self) -> Px {
        self.start_time
    }
}

impl PlacedMut for SoundClip {
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn set_position(&mut self, position: Px) {
        self.position = position;
    }
    fn set_duration(&mut self, duration: Px) {
        self.duration = duration;
    }
    fn set_lane_index(&mut self, lane: usize) {
        self.lane_index = clamp_lane(lane);
    }
    fn set_trim_offset(&mut self, offset: Px) {
        self.start_time = offset.max(Px::ZERO);
    }
    fn normalize(&mut self) {
        self.clamp_fades();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_position_plus_duration() {
        let clip = VideoClip::new(Uuid::new_v4(), "a", Px(40.0), Px(200.0));
        assert_eq!(clip.end(), Px(240.0));
    }

    #[test]
    fn lane_index_clamped_on_read() {
        let mut clip = TextClip::new(Uuid::new_v4(), "hi", Px::ZERO, Px(100.0));
        clip.lane_index = 7;
        assert_eq!(Placed::lane_index(&clip), MAX_LANES - 1);

        clip.set_lane_index(9);
        assert_eq!(clip.lane_index, MAX_LANES - 1);
    }

    #[test]
    fn volume_clamped() {
        let mut clip = SoundClip::new(Uuid::new_v4(), "s", Px::ZERO, Px(400.0));
        clip.set_volume(150.0);
        assert_eq!(clip.volume, 100.0);
        clip.set_volume(-3.0);
        assert_eq!(clip.volume, 0.0);
    }

    #[test]
    fn fade_capped_at_half_duration() {
        let mut clip = SoundClip::new(Uuid::new_v4(), "s", Px::ZERO, Px(200.0));
        clip.set_fade_in(Px(500.0));
        assert_eq!(clip.fade_in, Px(100.0));
    }

    #[test]
    fn fade_capped_at_ten_seconds() {
        let mut clip = SoundClip::new(Uuid::new_v4(), "s", Px::ZERO, Px(2000.0));
        clip.set_fade_in(Px(900.0));
        assert_eq!(clip.fade_in, MAX_FADE);
    }

    #[test]
    fn fades_keep_minimum_gap() {
        let mut clip = SoundClip::new(Uuid::new_v4(), "s", Px::ZERO, Px(200.0));
        clip.set_fade_in(Px(100.0));
        clip.set_fade_out(Px(100.0));
        // fade_out can only take what the gap leaves: 200 - 100 - 10 = 90
        assert_eq!(clip.fade_out, Px(90.0));
        assert!(clip.fade_in + clip.fade_out + MIN_FADE_GAP <= clip.duration);
    }

    #[test]
    fn clamp_fades_after_shrink_takes_from_fade_out_first() {
        let mut clip = SoundClip::new(Uuid::new_v4(), "s", Px::ZERO, Px(400.0));
        clip.set_fade_in(Px(150.0));
        clip.set_fade_out(Px(150.0));
        clip.set_duration(Px(200.0));
        clip.clamp_fades();
        assert!(clip.fade_in + clip.fade_out + MIN_FADE_GAP <= clip.duration);
        assert!(clip.fade_in <= clip.duration * 0.5);
        assert!(clip.fade_out <= clip.duration * 0.5);
    }

    #[test]
    fn serde_roundtrip_video() {
        let clip = VideoClip {
            id: Uuid::new_v4(),
            title: "intro.mp4".into(),
            position: Px(80.0),
            duration: Px(400.0),
            lane_index: 1,
            start_time: Px(40.0),
            max_duration: Some(Px(800.0)),
        };
        let json = serde_json::to_string(&clip).unwrap();
        let back: VideoClip = serde_json::from_str(&json).unwrap();
        assert_eq!(clip, back);
    }

    #[test]
    fn serde_roundtrip_text() {
        let mut clip = TextClip::new(Uuid::new_v4(), "Title card", Px::ZERO, Px(120.0));
        clip.effect = TextEffect::Typewriter;
        clip.style.align = TextAlign::Left;
        let json = serde_json::to_string(&clip).unwrap();
        let back: TextClip = serde_json::from_str(&json).unwrap();
        assert_eq!(clip, back);
    }

    #[test]
    fn serde_roundtrip_sound() {
        let mut clip = SoundClip::new(Uuid::new_v4(), "bgm.wav", Px(40.0), Px(600.0));
        clip.waveform = vec![0.1, 0.8, 0.4];
        clip.set_fade_in(Px(60.0));
        let json = serde_json::to_string(&clip).unwrap();
        let back: SoundClip = serde_json::from_str(&json).unwrap();
        assert_eq!(clip, back);
    }

    #[test]
    fn text_effect_serializes_snake_case() {
        let json = serde_json::to_string(&TextEffect::SlideUp).unwrap();
        assert_eq!(json, "\"slide_up\"");
    }
}
