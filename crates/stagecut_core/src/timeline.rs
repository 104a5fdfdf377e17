use crate::clip::{ClipKind, ClipRef};
use crate::document::Document;
use crate::error::{CoreError, Result};
use crate::geometry::{LaneLayout, Point};
use crate::gesture::{
    ClipMove, GestureCommit, GestureTracker, GhostClip, Modifiers, PendingReplace, TimelineView,
};
use crate::lanes;
use crate::ops;
use crate::selection::Selection;
use crate::units::{clamp_time, quantize_to_frame, Px, Zoom, HARD_LIMIT};
use uuid::Uuid;

/// Extra timeline shown past the last clip.
const TAIL_BUFFER: Px = Px(10.0 * crate::units::PX_PER_SECOND);

/// What a finished gesture did to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Nothing changed (no-op drop, reverted gesture, selection-only).
    None,
    /// The document was updated.
    Applied,
    /// A replace drop is waiting on the host's confirmation gate.
    NeedsConfirmation(PendingReplace),
}

/// Composes zoom, playhead, selection, lane geometry and the gesture
/// tracker over a host-owned document. All mutations are whole-collection
/// replacements; nothing here is touched during a drag until the drop
/// resolves.
#[derive(Debug, Default)]
pub struct TimelineController {
    zoom: Zoom,
    playhead: Px,
    playing: bool,
    selection: Selection,
    tracker: GestureTracker,
    layout: LaneLayout,
    pending_replace: Option<PendingReplace>,
}

impl TimelineController {
    pub fn new() -> Self {
        Self::default()
    }

    // -- view state ---------------------------------------------------------

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    pub fn playhead(&self) -> Px {
        self.playhead
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn toggle_playback(&mut self) {
        self.playing = !self.playing;
    }

    /// Clamped to the 3-minute cap and quantized to a frame boundary.
    pub fn seek(&mut self, t: Px) {
        self.playhead = quantize_to_frame(clamp_time(t));
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn select(&mut self, clip: ClipRef) {
        self.selection.select_single(clip);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The host feeds measured lane rectangles here whenever layout changes.
    pub fn set_layout(&mut self, layout: LaneLayout) {
        self.layout = layout;
    }

    /// Total rendered length: never below the 3-minute cap, and always a
    /// whole second past the last clip plus the tail buffer.
    pub fn timeline_len(&self, doc: &Document) -> Px {
        let padded = doc.content_end() + TAIL_BUFFER;
        let whole = Px::from_seconds(padded.as_seconds().ceil());
        HARD_LIMIT.max(whole)
    }

    // -- lanes --------------------------------------------------------------

    pub fn can_add_lane(&self, doc: &Document, kind: ClipKind) -> bool {
        lanes::can_add_lane(lanes_of(doc, kind))
    }

    pub fn add_lane(&mut self, doc: &mut Document, kind: ClipKind) -> Result<usize> {
        let list = lanes_of(doc, kind);
        if !lanes::can_add_lane(list) {
            return Err(CoreError::LaneLimitReached);
        }
        let index = lanes::next_available_lane(list).ok_or(CoreError::LaneLimitReached)?;
        let list = lanes_of_mut(doc, kind);
        list.push(index);
        list.sort_unstable();
        Ok(index)
    }

    pub fn can_remove_lane(&self, doc: &Document, kind: ClipKind, index: usize) -> bool {
        match kind {
            ClipKind::Video => lanes::can_remove_lane(index, &doc.video, &doc.video_lanes),
            ClipKind::Text => lanes::can_remove_lane(index, &doc.text, &doc.text_lanes),
            ClipKind::Sound => lanes::can_remove_lane(index, &doc.sound, &doc.sound_lanes),
        }
    }

    pub fn remove_lane(&mut self, doc: &mut Document, kind: ClipKind, index: usize) -> Result<()> {
        if !self.can_remove_lane(doc, kind, index) {
            return Err(CoreError::LaneNotRemovable(
                "lane is protected or not empty",
            ));
        }
        lanes_of_mut(doc, kind).retain(|l| *l != index);
        Ok(())
    }

    // -- pointer forwarding -------------------------------------------------

    pub fn pointer_down(&mut self, doc: &Document, p: Point, mods: Modifiers) {
        let view = make_view(doc, &self.layout, self.zoom, self.playhead);
        self.tracker.pointer_down(&view, &mut self.selection, p, mods);
    }

    pub fn pointer_move(&mut self, doc: &Document, p: Point) -> Option<Px> {
        let view = make_view(doc, &self.layout, self.zoom, self.playhead);
        match self.tracker.pointer_move(&view, &mut self.selection, p) {
            Some(GestureCommit::Seek(t)) => {
                self.playhead = t;
                Some(t)
            }
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, doc: &mut Document, p: Point) -> CommitOutcome {
        let view = make_view(doc, &self.layout, self.zoom, self.playhead);
        let commit = self.tracker.pointer_up(&view, &mut self.selection, p);

        match commit {
            None => CommitOutcome::None,
            Some(GestureCommit::Seek(t)) => {
                self.playhead = t;
                CommitOutcome::Applied
            }
            Some(GestureCommit::MoveClips { moves, new_lane }) => {
                if let Some(kind) = new_lane {
                    // Lane creation was validated during the drag; losing the
                    // race here just drops the move.
                    if self.add_lane(doc, kind).is_err() {
                        return CommitOutcome::None;
                    }
                }
                apply_moves_to_doc(doc, &moves);
                CommitOutcome::Applied
            }
            Some(GestureCommit::Resize {
                clip,
                position,
                duration,
                trim_offset,
                ..
            }) => {
                match clip.kind {
                    ClipKind::Video => {
                        doc.video =
                            ops::apply_resize(&doc.video, clip.id, position, duration, trim_offset)
                    }
                    ClipKind::Text => {
                        doc.text =
                            ops::apply_resize(&doc.text, clip.id, position, duration, trim_offset)
                    }
                    ClipKind::Sound => {
                        doc.sound =
                            ops::apply_resize(&doc.sound, clip.id, position, duration, trim_offset)
                    }
                }
                CommitOutcome::Applied
            }
            Some(GestureCommit::Replace(pending)) => {
                self.pending_replace = Some(pending.clone());
                CommitOutcome::NeedsConfirmation(pending)
            }
        }
    }

    // -- replace gate -------------------------------------------------------

    pub fn pending_replace(&self) -> Option<&PendingReplace> {
        self.pending_replace.as_ref()
    }

    /// Resolve the confirmation gate. Declining leaves the document exactly
    /// as it was; the dragged clip visually snaps back on the next render.
    pub fn resolve_replace(&mut self, doc: &mut Document, accept: bool) -> bool {
        let Some(pending) = self.pending_replace.take() else {
            return false;
        };
        if !accept {
            return false;
        }
        match pending.clip.kind {
            ClipKind::Video => {
                doc.video = ops::apply_replace(
                    &doc.video,
                    pending.clip.id,
                    pending.target,
                    pending.position,
                    pending.lane_index,
                );
            }
            ClipKind::Text => {
                doc.text = ops::apply_replace(
                    &doc.text,
                    pending.clip.id,
                    pending.target,
                    pending.position,
                    pending.lane_index,
                );
            }
            ClipKind::Sound => {
                doc.sound = ops::apply_replace(
                    &doc.sound,
                    pending.clip.id,
                    pending.target,
                    pending.position,
                    pending.lane_index,
                );
            }
        }
        true
    }

    // -- previews -----------------------------------------------------------

    pub fn ghost(&self, doc: &Document) -> Vec<GhostClip> {
        let view = make_view(doc, &self.layout, self.zoom, self.playhead);
        self.tracker.ghost(&view)
    }

    pub fn resize_preview(&self, doc: &Document) -> Option<(ClipRef, Px, Px)> {
        let view = make_view(doc, &self.layout, self.zoom, self.playhead);
        self.tracker.resize_preview(&view)
    }

    // -- toolbar actions ----------------------------------------------------

    /// Delete the multi-selection if non-empty, otherwise nothing. Returns
    /// how many clips were removed.
    pub fn delete_selected(&mut self, doc: &mut Document) -> usize {
        let selected = self.selection.ids();
        if selected.is_empty() {
            return 0;
        }
        let count = selected.len();
        let by_kind = |kind: ClipKind| -> Vec<Uuid> {
            selected
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| r.id)
                .collect()
        };
        let video_ids = by_kind(ClipKind::Video);
        let text_ids = by_kind(ClipKind::Text);
        let sound_ids = by_kind(ClipKind::Sound);
        if !video_ids.is_empty() {
            doc.video = ops::delete_clips(&doc.video, &video_ids);
        }
        if !text_ids.is_empty() {
            doc.text = ops::delete_clips(&doc.text, &text_ids);
        }
        if !sound_ids.is_empty() {
            doc.sound = ops::delete_clips(&doc.sound, &sound_ids);
        }
        self.selection.clear();
        count
    }

    /// Duplicate the primary selected clip. The new id comes from the host.
    pub fn duplicate_selected(&mut self, doc: &mut Document, new_id: Uuid) -> Result<ClipRef> {
        let primary = self
            .selection
            .primary()
            .ok_or(CoreError::Other("nothing selected".into()))?;
        match primary.kind {
            ClipKind::Video => doc.video = ops::duplicate_clip(&doc.video, primary.id, new_id)?,
            ClipKind::Text => doc.text = ops::duplicate_clip(&doc.text, primary.id, new_id)?,
            ClipKind::Sound => doc.sound = ops::duplicate_clip(&doc.sound, primary.id, new_id)?,
        }
        Ok(ClipRef::new(primary.kind, new_id))
    }

    /// Split is only offered while the playhead lies strictly inside the
    /// primary selected clip.
    pub fn can_split(&self, doc: &Document) -> bool {
        let Some(primary) = self.selection.primary() else {
            return false;
        };
        let view = make_view(doc, &self.layout, self.zoom, self.playhead);
        match view.snapshot(primary) {
            Some(s) => self.playhead > s.position && self.playhead < s.position + s.duration,
            None => false,
        }
    }

    pub fn split_selected(&mut self, doc: &mut Document, new_id: Uuid) -> Result<ClipRef> {
        let primary = self
            .selection
            .primary()
            .ok_or(CoreError::Other("nothing selected".into()))?;
        if !self.can_split(doc) {
            return Err(CoreError::InvalidSplit(
                "playhead is not inside the selected clip".into(),
            ));
        }
        let at = self.playhead;
        match primary.kind {
            ClipKind::Video => doc.video = ops::split_clip(&doc.video, primary.id, at, new_id)?,
            ClipKind::Text => doc.text = ops::split_clip(&doc.text, primary.id, at, new_id)?,
            ClipKind::Sound => doc.sound = ops::split_clip(&doc.sound, primary.id, at, new_id)?,
        }
        Ok(ClipRef::new(primary.kind, new_id))
    }
}

fn lanes_of(doc: &Document, kind: ClipKind) -> &Vec<usize> {
    match kind {
        ClipKind::Video => &doc.video_lanes,
        ClipKind::Text => &doc.text_lanes,
        ClipKind::Sound => &doc.sound_lanes,
    }
}

fn lanes_of_mut(doc: &mut Document, kind: ClipKind) -> &mut Vec<usize> {
    match kind {
        ClipKind::Video => &mut doc.video_lanes,
        ClipKind::Text => &mut doc.text_lanes,
        ClipKind::Sound => &mut doc.sound_lanes,
    }
}

fn make_view<'a>(
    doc: &'a Document,
    layout: &'a LaneLayout,
    zoom: Zoom,
    playhead: Px,
) -> TimelineView<'a> {
    TimelineView {
        video: &doc.video,
        text: &doc.text,
        sound: &doc.sound,
        video_lanes: &doc.video_lanes,
        text_lanes: &doc.text_lanes,
        sound_lanes: &doc.sound_lanes,
        layout,
        zoom,
        playhead,
    }
}

fn apply_moves_to_doc(doc: &mut Document, moves: &[ClipMove]) {
    let by_kind = |kind: ClipKind| -> Vec<ops::Move> {
        moves
            .iter()
            .filter(|m| m.clip.kind == kind)
            .map(|m| (m.clip.id, m.position, m.lane_index))
            .collect()
    };
    let video_moves = by_kind(ClipKind::Video);
    let text_moves = by_kind(ClipKind::Text);
    let sound_moves = by_kind(ClipKind::Sound);
    if !video_moves.is_empty() {
        doc.video = ops::apply_moves(&doc.video, &video_moves);
    }
    if !text_moves.is_empty() {
        doc.text = ops::apply_moves(&doc.text, &text_moves);
    }
    if !sound_moves.is_empty() {
        doc.sound = ops::apply_moves(&doc.sound, &sound_moves);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
