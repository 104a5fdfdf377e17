use crate::clip::ClipRef;
use crate::geometry::{Point, Rect};
use std::collections::HashSet;

/// A rubber-band drag narrower than this in x is a click, not a selection.
pub const MIN_BAND_WIDTH: f32 = 5.0;
/// Same for y.
pub const MIN_BAND_HEIGHT: f32 = 1.0;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Multi-clip selection across all three clip types.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<ClipRef>,
    primary: Option<ClipRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a single clip, clearing the previous selection.
    pub fn select_single(&mut self, clip: ClipRef) {
        self.selected.clear();
        self.selected.insert(clip);
        self.primary = Some(clip);
    }

    pub fn add(&mut self, clip: ClipRef) {
        self.selected.insert(clip);
        if self.primary.is_none() {
            self.primary = Some(clip);
        }
    }

    pub fn remove(&mut self, clip: ClipRef) {
        self.selected.remove(&clip);
        if self.primary == Some(clip) {
            self.primary = self.selected.iter().next().copied();
        }
    }

    /// Shift-click behavior.
    pub fn toggle(&mut self, clip: ClipRef) {
        if self.selected.contains(&clip) {
            self.remove(clip);
        } else {
            self.add(clip);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.primary = None;
    }

    /// Replace the whole set, as the rubber band does on every move.
    pub fn replace_with(&mut self, clips: impl IntoIterator<Item = ClipRef>) {
        self.selected = clips.into_iter().collect();
        match self.primary {
            Some(p) if self.selected.contains(&p) => {}
            _ => self.primary = self.selected.iter().next().copied(),
        }
    }

    pub fn is_selected(&self, clip: &ClipRef) -> bool {
        self.selected.contains(clip)
    }

    pub fn primary(&self) -> Option<ClipRef> {
        self.primary
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<ClipRef> {
        self.selected.iter().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// RubberBand
// ---------------------------------------------------------------------------

/// Rectangle selection in the timeline's local space.
#[derive(Debug, Clone, PartialEq)]
pub struct RubberBand {
    pub origin: Point,
    pub cursor: Point,
}

impl RubberBand {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            cursor: origin,
        }
    }

    pub fn update(&mut self, cursor: Point) {
        self.cursor = cursor;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.origin, self.cursor)
    }

    /// Too small to count as a rectangle; treated as a click-to-deselect.
    pub fn is_click(&self) -> bool {
        let r = self.rect();
        r.w < MIN_BAND_WIDTH || r.h < MIN_BAND_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipKind;
    use uuid::Uuid;

    fn clip_ref() -> ClipRef {
        ClipRef::new(ClipKind::Video, Uuid::new_v4())
    }

    #[test]
    fn select_single_clears_previous() {
        let mut sel = Selection::new();
        let a = clip_ref();
        let b = clip_ref();
        sel.add(a);
        sel.select_single(b);
        assert_eq!(sel.len(), 1);
        assert!(sel.is_selected(&b));
        assert_eq!(sel.primary(), Some(b));
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut sel = Selection::new();
        let a = clip_ref();
        sel.toggle(a);
        assert!(sel.is_selected(&a));
        sel.toggle(a);
        assert!(!sel.is_selected(&a));
        assert!(sel.is_empty());
    }

    #[test]
    fn removing_primary_promotes_another() {
        let mut sel = Selection::new();
        let a = clip_ref();
        let b = clip_ref();
        sel.add(a);
        sel.add(b);
        assert_eq!(sel.primary(), Some(a));
        sel.remove(a);
        assert_eq!(sel.primary(), Some(b));
    }

    #[test]
    fn replace_with_keeps_primary_when_still_selected() {
        let mut sel = Selection::new();
        let a = clip_ref();
        let b = clip_ref();
        sel.select_single(a);
        sel.replace_with([a, b]);
        assert_eq!(sel.primary(), Some(a));
        sel.replace_with([b]);
        assert_eq!(sel.primary(), Some(b));
    }

    #[test]
    fn band_minimum_size_rule() {
        let mut band = RubberBand::new(Point::new(10.0, 10.0));
        band.update(Point::new(13.0, 40.0));
        assert!(band.is_click()); // only 3px wide

        band.update(Point::new(16.0, 10.5));
        assert!(band.is_click()); // only 0.5px tall

        band.update(Point::new(16.0, 12.0));
        assert!(!band.is_click());
    }

    #[test]
    fn band_rect_spans_any_direction() {
        let mut band = RubberBand::new(Point::new(50.0, 50.0));
        band.update(Point::new(20.0, 30.0));
        assert_eq!(band.rect(), Rect::new(20.0, 30.0, 30.0, 20.0));
    }
}
