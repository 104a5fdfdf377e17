use crate::clip::{ClipKind, Placed};
use crate::units::Zoom;
use serde::{Deserialize, Serialize};

/// Height of the band directly below a type's last lane that accepts drops
/// into a newly created lane.
pub const NEW_LANE_DROPZONE: f32 = 24.0;

/// Horizontal grab tolerance around the playhead.
pub const PLAYHEAD_GRAB: f32 = 8.0;

/// Width of the resize handles inside each clip edge.
pub const HANDLE_WIDTH: f32 = 8.0;

// ---------------------------------------------------------------------------
// Point / Rect
// ---------------------------------------------------------------------------

/// A point in the timeline's local coordinate space: x 0 at time 0, y 0 at
/// the top of the header band.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Normalized rectangle spanning two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

// ---------------------------------------------------------------------------
// LaneLayout
// ---------------------------------------------------------------------------

/// Rendered bounds of one lane's clip area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaneBand {
    pub kind: ClipKind,
    pub lane_index: usize,
    pub rect: Rect,
}

/// The measured geometry of the rendered timeline, fed in by the host on
/// every layout change. Hit-testing runs against this instead of the live
/// view tree, which keeps the engine headless.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LaneLayout {
    pub header_height: f32,
    bands: Vec<LaneBand>,
}

impl LaneLayout {
    pub fn new(header_height: f32) -> Self {
        Self {
            header_height,
            bands: Vec::new(),
        }
    }

    pub fn set_bands(&mut self, bands: Vec<LaneBand>) {
        self.bands = bands;
    }

    pub fn bands(&self) -> &[LaneBand] {
        &self.bands
    }

    pub fn band(&self, kind: ClipKind, lane_index: usize) -> Option<&LaneBand> {
        self.bands
            .iter()
            .find(|b| b.kind == kind && b.lane_index == lane_index)
    }

    pub fn in_header(&self, y: f32) -> bool {
        y < self.header_height
    }

    /// Containment hit-test against the lanes of one clip type.
    pub fn lane_at(&self, kind: ClipKind, p: Point) -> Option<usize> {
        self.bands
            .iter()
            .find(|b| b.kind == kind && b.rect.contains(p))
            .map(|b| b.lane_index)
    }

    /// Nearest lane of `kind` by vertical center distance.
    pub fn nearest_lane(&self, kind: ClipKind, y: f32) -> Option<usize> {
        self.bands
            .iter()
            .filter(|b| b.kind == kind)
            .min_by(|a, b| {
                let da = (a.rect.center_y() - y).abs();
                let db = (b.rect.center_y() - y).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|b| b.lane_index)
    }

    /// The lowest band of `kind` on screen.
    pub fn last_band(&self, kind: ClipKind) -> Option<&LaneBand> {
        self.bands
            .iter()
            .filter(|b| b.kind == kind)
            .max_by(|a, b| {
                a.rect
                    .bottom()
                    .partial_cmp(&b.rect.bottom())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Whether `y` sits in the new-lane dropzone band directly below the
    /// type's last lane.
    pub fn in_new_lane_dropzone(&self, kind: ClipKind, y: f32) -> bool {
        match self.last_band(kind) {
            Some(band) => {
                let bottom = band.rect.bottom();
                y >= bottom && y < bottom + NEW_LANE_DROPZONE
            }
            None => false,
        }
    }

    /// On-screen rectangle of a clip given the current zoom, or None when
    /// its lane is not rendered.
    pub fn clip_rect<T: Placed>(&self, kind: ClipKind, clip: &T, zoom: &Zoom) -> Option<Rect> {
        let band = self.band(kind, clip.lane_index())?;
        Some(Rect::new(
            zoom.to_screen_px(clip.position()),
            band.rect.y,
            zoom.to_screen_px(clip.duration()),
            band.rect.h,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::VideoClip;
    use crate::units::Px;
    use uuid::Uuid;

    fn layout() -> LaneLayout {
        let mut layout = LaneLayout::new(30.0);
        layout.set_bands(vec![
            LaneBand {
                kind: ClipKind::Video,
                lane_index: 0,
                rect: Rect::new(0.0, 30.0, 1000.0, 50.0),
            },
            LaneBand {
                kind: ClipKind::Video,
                lane_index: 1,
                rect: Rect::new(0.0, 80.0, 1000.0, 50.0),
            },
            LaneBand {
                kind: ClipKind::Text,
                lane_index: 0,
                rect: Rect::new(0.0, 130.0, 1000.0, 40.0),
            },
        ]);
        layout
    }

    #[test]
    fn lane_at_respects_kind() {
        let layout = layout();
        let p = Point::new(10.0, 55.0);
        assert_eq!(layout.lane_at(ClipKind::Video, p), Some(0));
        // A text clip cannot land in a video band
        assert_eq!(layout.lane_at(ClipKind::Text, p), None);
    }

    #[test]
    fn nearest_lane_by_center_distance() {
        let layout = layout();
        // y=95 sits in video lane 1; y=20 is above everything, lane 0 is closest
        assert_eq!(layout.nearest_lane(ClipKind::Video, 20.0), Some(0));
        assert_eq!(layout.nearest_lane(ClipKind::Video, 102.0), Some(1));
        assert_eq!(layout.nearest_lane(ClipKind::Sound, 102.0), None);
    }

    #[test]
    fn dropzone_below_last_lane_of_kind() {
        let layout = layout();
        // Video lanes end at y=130; the 24px band below is the dropzone
        assert!(layout.in_new_lane_dropzone(ClipKind::Video, 131.0));
        assert!(layout.in_new_lane_dropzone(ClipKind::Video, 153.0));
        assert!(!layout.in_new_lane_dropzone(ClipKind::Video, 155.0));
        assert!(!layout.in_new_lane_dropzone(ClipKind::Video, 100.0));
        // Text lanes end at 170
        assert!(layout.in_new_lane_dropzone(ClipKind::Text, 180.0));
        assert!(!layout.in_new_lane_dropzone(ClipKind::Sound, 180.0));
    }

    #[test]
    fn clip_rect_tracks_zoom() {
        let layout = layout();
        let zoom = Zoom::new();
        let mut clip = VideoClip::new(Uuid::new_v4(), "c", Px(40.0), Px(80.0));
        clip.lane_index = 1;

        let rect = layout.clip_rect(ClipKind::Video, &clip, &zoom).unwrap();
        assert_eq!(rect, Rect::new(40.0, 80.0, 80.0, 50.0));

        let mut zoomed = Zoom::new();
        zoomed.zoom_in(); // 110%
        let rect = layout.clip_rect(ClipKind::Video, &clip, &zoomed).unwrap();
        assert!((rect.x - 44.0).abs() < 1e-4);
        assert!((rect.w - 88.0).abs() < 1e-4);
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(10.0, 20.0), Point::new(4.0, 5.0));
        assert_eq!(r, Rect::new(4.0, 5.0, 6.0, 15.0));
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn header_band() {
        let layout = layout();
        assert!(layout.in_header(10.0));
        assert!(!layout.in_header(35.0));
    }
}
