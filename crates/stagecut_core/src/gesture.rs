use crate::clip::{ClipKind, ClipRef, Placed, SoundClip, TextClip, VideoClip};
use crate::geometry::{LaneLayout, Point, HANDLE_WIDTH, PLAYHEAD_GRAB};
use crate::lanes;
use crate::magnet::{self, DropPlan};
use crate::selection::{RubberBand, Selection};
use crate::units::{clamp_time, quantize_to_frame, Px, Zoom, MIN_CLIP_WIDTH};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimelineView
// ---------------------------------------------------------------------------

/// Read-only snapshot of everything the gesture tracker needs on a pointer
/// event: the three clip collections, the lane lists, the measured lane
/// geometry, and the current zoom/playhead. Supplied by the host per event.
#[derive(Clone, Copy)]
pub struct TimelineView<'a> {
    pub video: &'a [VideoClip],
    pub text: &'a [TextClip],
    pub sound: &'a [SoundClip],
    pub video_lanes: &'a [usize],
    pub text_lanes: &'a [usize],
    pub sound_lanes: &'a [usize],
    pub layout: &'a LaneLayout,
    pub zoom: Zoom,
    pub playhead: Px,
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Handle(ClipRef, ResizeHandle),
    Body(ClipRef),
    Background,
}

impl<'a> TimelineView<'a> {
    pub fn lanes_for(&self, kind: ClipKind) -> &'a [usize] {
        match kind {
            ClipKind::Video => self.video_lanes,
            ClipKind::Text => self.text_lanes,
            ClipKind::Sound => self.sound_lanes,
        }
    }

    /// Hit-test the pointer against clip rectangles, handles first.
    pub fn hit_test(&self, p: Point) -> Hit {
        fn scan<T: Placed>(
            clips: &[T],
            kind: ClipKind,
            layout: &LaneLayout,
            zoom: &Zoom,
            p: Point,
        ) -> Option<Hit> {
            for clip in clips {
                let Some(rect) = layout.clip_rect(kind, clip, zoom) else {
                    continue;
                };
                if !rect.contains(p) {
                    continue;
                }
                let clip_ref = ClipRef::new(kind, clip.id());
                if p.x < rect.x + HANDLE_WIDTH {
                    return Some(Hit::Handle(clip_ref, ResizeHandle::Left));
                }
                if p.x >= rect.right() - HANDLE_WIDTH {
                    return Some(Hit::Handle(clip_ref, ResizeHandle::Right));
                }
                return Some(Hit::Body(clip_ref));
            }
            None
        }

        scan(self.video, ClipKind::Video, self.layout, &self.zoom, p)
            .or_else(|| scan(self.text, ClipKind::Text, self.layout, &self.zoom, p))
            .or_else(|| scan(self.sound, ClipKind::Sound, self.layout, &self.zoom, p))
            .unwrap_or(Hit::Background)
    }

    pub fn snapshot(&self, clip_ref: ClipRef) -> Option<ClipSnapshot> {
        match clip_ref.kind {
            ClipKind::Video => self.video.iter().find(|c| c.id == clip_ref.id).map(|c| {
                ClipSnapshot {
                    clip: clip_ref,
                    position: c.position,
                    duration: c.duration,
                    lane_index: Placed::lane_index(c),
                    trim_offset: c.start_time,
                    max_duration: c.max_duration,
                    source_bound: true,
                }
            }),
            ClipKind::Text => self.text.iter().find(|c| c.id == clip_ref.id).map(|c| {
                ClipSnapshot {
                    clip: clip_ref,
                    position: c.position,
                    duration: c.duration,
                    lane_index: Placed::lane_index(c),
                    trim_offset: Px::ZERO,
                    max_duration: None,
                    source_bound: false,
                }
            }),
            ClipKind::Sound => self.sound.iter().find(|c| c.id == clip_ref.id).map(|c| {
                ClipSnapshot {
                    clip: clip_ref,
                    position: c.position,
                    duration: c.duration,
                    lane_index: Placed::lane_index(c),
                    trim_offset: c.start_time,
                    max_duration: None,
                    source_bound: true,
                }
            }),
        }
    }

    fn plan_for(
        &self,
        kind: ClipKind,
        lane: usize,
        exclude: &HashSet<Uuid>,
        requested: Px,
        duration: Px,
    ) -> DropPlan {
        match kind {
            ClipKind::Video => {
                let others: Vec<&VideoClip> = self
                    .video
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && !exclude.contains(&c.id))
                    .collect();
                magnet::plan_drop(&others, requested, duration)
            }
            ClipKind::Text => {
                let others: Vec<&TextClip> = self
                    .text
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && !exclude.contains(&c.id))
                    .collect();
                magnet::plan_drop(&others, requested, duration)
            }
            ClipKind::Sound => {
                let others: Vec<&SoundClip> = self
                    .sound
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && !exclude.contains(&c.id))
                    .collect();
                magnet::plan_drop(&others, requested, duration)
            }
        }
    }

    fn snap_for(
        &self,
        kind: ClipKind,
        lane: usize,
        exclude: &HashSet<Uuid>,
        requested: Px,
        duration: Px,
    ) -> Px {
        match kind {
            ClipKind::Video => {
                let others: Vec<&VideoClip> = self
                    .video
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && !exclude.contains(&c.id))
                    .collect();
                magnet::snap_position(&others, requested, duration)
            }
            ClipKind::Text => {
                let others: Vec<&TextClip> = self
                    .text
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && !exclude.contains(&c.id))
                    .collect();
                magnet::snap_position(&others, requested, duration)
            }
            ClipKind::Sound => {
                let others: Vec<&SoundClip> = self
                    .sound
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && !exclude.contains(&c.id))
                    .collect();
                magnet::snap_position(&others, requested, duration)
            }
        }
    }

    fn neighbor_bounds_for(
        &self,
        kind: ClipKind,
        lane: usize,
        exclude: Uuid,
        position: Px,
    ) -> (Option<Px>, Option<Px>) {
        match kind {
            ClipKind::Video => {
                let others: Vec<&VideoClip> = self
                    .video
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && c.id != exclude)
                    .collect();
                magnet::neighbor_bounds(&others, position)
            }
            ClipKind::Text => {
                let others: Vec<&TextClip> = self
                    .text
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && c.id != exclude)
                    .collect();
                magnet::neighbor_bounds(&others, position)
            }
            ClipKind::Sound => {
                let others: Vec<&SoundClip> = self
                    .sound
                    .iter()
                    .filter(|c| Placed::lane_index(*c) == lane && c.id != exclude)
                    .collect();
                magnet::neighbor_bounds(&others, position)
            }
        }
    }

    /// Clips of any type whose rendered rectangle intersects `rect`.
    pub fn clips_intersecting(&self, rect: crate::geometry::Rect) -> Vec<ClipRef> {
        let mut hits = Vec::new();
        for clip in self.video {
            if let Some(r) = self.layout.clip_rect(ClipKind::Video, clip, &self.zoom) {
                if rect.intersects(&r) {
                    hits.push(ClipRef::new(ClipKind::Video, clip.id));
                }
            }
        }
        for clip in self.text {
            if let Some(r) = self.layout.clip_rect(ClipKind::Text, clip, &self.zoom) {
                if rect.intersects(&r) {
                    hits.push(ClipRef::new(ClipKind::Text, clip.id));
                }
            }
        }
        for clip in self.sound {
            if let Some(r) = self.layout.clip_rect(ClipKind::Sound, clip, &self.zoom) {
                if rect.intersects(&r) {
                    hits.push(ClipRef::new(ClipKind::Sound, clip.id));
                }
            }
        }
        hits
    }
}

// ---------------------------------------------------------------------------
// Gesture state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

/// Captured start state of one clip in a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSnapshot {
    pub clip: ClipRef,
    pub position: Px,
    pub duration: Px,
    pub lane_index: usize,
    pub trim_offset: Px,
    pub max_duration: Option<Px>,
    pub source_bound: bool,
}

#[derive(Debug, Clone)]
pub struct ClipDrag {
    start: Point,
    cursor: Point,
    /// Dragged clips, pointer-tracked clip first.
    origins: Vec<ClipSnapshot>,
    /// Last lane detected under the pointer for the tracked clip's type.
    target_lane: Option<usize>,
    new_lane_drop: bool,
}

#[derive(Debug, Clone)]
pub struct ClipResize {
    start: Point,
    cursor: Point,
    handle: ResizeHandle,
    origin: ClipSnapshot,
}

/// The interaction modes. Mutually exclusive; anything active returns to
/// `Idle` on pointer-up no matter how the gesture ends.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingClip(ClipDrag),
    ResizingClip(ClipResize),
    DraggingPlayhead {
        last: Px,
    },
    SelectingRange(RubberBand),
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipMove {
    pub clip: ClipRef,
    pub position: Px,
    pub lane_index: usize,
}

/// A drop that overlapped a neighbor past the replace threshold. The host
/// must confirm before it is applied; declining reverts the gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReplace {
    pub clip: ClipRef,
    pub target: Uuid,
    pub position: Px,
    pub lane_index: usize,
}

/// Resolved outcome of a finished gesture, ready for the host to apply as
/// whole-collection updates.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureCommit {
    MoveClips {
        moves: Vec<ClipMove>,
        /// A new lane of this type must be created before applying the moves.
        new_lane: Option<ClipKind>,
    },
    Replace(PendingReplace),
    Resize {
        clip: ClipRef,
        position: Px,
        duration: Px,
        trim_offset: Px,
        position_changed: bool,
    },
    Seek(Px),
}

/// Non-committed preview of where a dragged clip would land.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostClip {
    pub clip: ClipRef,
    pub position: Px,
    pub lane_index: usize,
    pub replaces: Option<Uuid>,
    pub new_lane: bool,
}

// ---------------------------------------------------------------------------
// GestureTracker
// ---------------------------------------------------------------------------

/// Pointer-event-driven drag/resize/select state machine. Holds only
/// transient per-gesture state; all durable data stays with the host.
#[derive(Debug, Default)]
pub struct GestureTracker {
    gesture: Gesture,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    pub fn pointer_down(
        &mut self,
        view: &TimelineView,
        selection: &mut Selection,
        p: Point,
        mods: Modifiers,
    ) {
        if !self.is_idle() {
            return;
        }

        let hit = view.hit_test(p);

        if let Hit::Handle(clip_ref, handle) = hit {
            if mods.shift {
                selection.toggle(clip_ref);
                return;
            }
            if !selection.is_selected(&clip_ref) {
                selection.select_single(clip_ref);
            }
            if let Some(origin) = view.snapshot(clip_ref) {
                self.gesture = Gesture::ResizingClip(ClipResize {
                    start: p,
                    cursor: p,
                    handle,
                    origin,
                });
            }
            return;
        }

        // Playhead wins over clip bodies inside its grab zone.
        let playhead_x = view.zoom.to_screen_px(view.playhead);
        if (p.x - playhead_x).abs() <= PLAYHEAD_GRAB && !mods.shift {
            self.gesture = Gesture::DraggingPlayhead {
                last: view.playhead,
            };
            return;
        }

        match hit {
            Hit::Body(clip_ref) => {
                if mods.shift {
                    selection.toggle(clip_ref);
                    return;
                }
                if !selection.is_selected(&clip_ref) {
                    selection.select_single(clip_ref);
                }
                let Some(primary) = view.snapshot(clip_ref) else {
                    return;
                };
                let mut origins = vec![primary];
                for other in selection.ids() {
                    if other == clip_ref {
                        continue;
                    }
                    if let Some(snapshot) = view.snapshot(other) {
                        origins.push(snapshot);
                    }
                }
                self.gesture = Gesture::DraggingClip(ClipDrag {
                    start: p,
                    cursor: p,
                    origins,
                    target_lane: None,
                    new_lane_drop: false,
                });
            }
            Hit::Background => {
                if !view.layout.in_header(p.y) {
                    self.gesture = Gesture::SelectingRange(RubberBand::new(p));
                }
            }
            Hit::Handle(..) => unreachable!(),
        }
    }

    /// Feed a pointer move. Only the playhead emits commits mid-gesture; the
    /// rest update transient state readable through `ghost`/`resize_preview`.
    pub fn pointer_move(
        &mut self,
        view: &TimelineView,
        selection: &mut Selection,
        p: Point,
    ) -> Option<GestureCommit> {
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::DraggingClip(drag) => {
                drag.cursor = p;
                let kind = drag.origins[0].clip.kind;
                drag.new_lane_drop = false;
                if let Some(lane) = view.layout.lane_at(kind, p) {
                    drag.target_lane = Some(lane);
                } else if view.layout.in_new_lane_dropzone(kind, p.y)
                    && lanes::can_add_lane(view.lanes_for(kind))
                {
                    drag.new_lane_drop = true;
                } else if let Some(lane) = view.layout.nearest_lane(kind, p.y) {
                    drag.target_lane = Some(lane);
                }
                None
            }
            Gesture::ResizingClip(resize) => {
                resize.cursor = p;
                None
            }
            Gesture::DraggingPlayhead { last } => {
                let t = quantize_to_frame(clamp_time(view.zoom.to_base_px(p.x)));
                if t != *last {
                    *last = t;
                    Some(GestureCommit::Seek(t))
                } else {
                    None
                }
            }
            Gesture::SelectingRange(band) => {
                band.update(p);
                if !band.is_click() {
                    selection.replace_with(view.clips_intersecting(band.rect()));
                }
                None
            }
        }
    }

    /// Finish the gesture. State returns to `Idle` unconditionally.
    pub fn pointer_up(
        &mut self,
        view: &TimelineView,
        selection: &mut Selection,
        p: Point,
    ) -> Option<GestureCommit> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => None,
            Gesture::DraggingClip(drag) => Self::finish_drag(view, drag, p),
            Gesture::ResizingClip(resize) => Self::finish_resize(view, resize, p),
            Gesture::DraggingPlayhead { .. } => None,
            Gesture::SelectingRange(mut band) => {
                band.update(p);
                if band.is_click() {
                    selection.clear();
                }
                None
            }
        }
    }

    /// Ghost previews for the active drag, one per dragged clip.
    pub fn ghost(&self, view: &TimelineView) -> Vec<GhostClip> {
        let Gesture::DraggingClip(drag) = &self.gesture else {
            return Vec::new();
        };
        let delta = view.zoom.to_base_px(drag.cursor.x - drag.start.x);
        let excluded: HashSet<Uuid> = drag.origins.iter().map(|o| o.clip.id).collect();
        let multi = drag.origins.len() > 1;

        drag.origins
            .iter()
            .enumerate()
            .map(|(i, origin)| {
                let kind = origin.clip.kind;
                let tracked = i == 0;
                let new_lane = tracked && drag.new_lane_drop;
                let lane = if tracked && !new_lane {
                    drag.target_lane.unwrap_or(origin.lane_index)
                } else if new_lane {
                    lanes::next_available_lane(view.lanes_for(kind)).unwrap_or(origin.lane_index)
                } else {
                    origin.lane_index
                };
                let requested = origin.position + delta;
                let plan = if new_lane {
                    DropPlan::Exact(requested.max(Px::ZERO))
                } else {
                    view.plan_for(kind, lane, &excluded, requested, origin.duration)
                };
                let (position, replaces) = match plan {
                    DropPlan::Replace { target } if tracked && !multi => {
                        (requested.max(Px::ZERO), Some(target))
                    }
                    DropPlan::Replace { .. } => (
                        view.snap_for(kind, lane, &excluded, requested, origin.duration),
                        None,
                    ),
                    other => (other.position(requested), None),
                };
                GhostClip {
                    clip: origin.clip,
                    position,
                    lane_index: lane,
                    replaces,
                    new_lane,
                }
            })
            .collect()
    }

    /// Clamped (position, duration) preview for the active resize.
    pub fn resize_preview(&self, view: &TimelineView) -> Option<(ClipRef, Px, Px)> {
        let Gesture::ResizingClip(resize) = &self.gesture else {
            return None;
        };
        let dx = view.zoom.to_base_px(resize.cursor.x - resize.start.x);
        let (position, duration, _) = Self::compute_resize(view, resize, dx);
        Some((resize.origin.clip, position, duration))
    }

    fn finish_drag(view: &TimelineView, drag: ClipDrag, p: Point) -> Option<GestureCommit> {
        let primary = drag.origins[0];
        let kind = primary.clip.kind;
        let delta = view.zoom.to_base_px(p.x - drag.start.x);
        let excluded: HashSet<Uuid> = drag.origins.iter().map(|o| o.clip.id).collect();

        let mut new_lane = None;
        let primary_lane = if drag.new_lane_drop && lanes::can_add_lane(view.lanes_for(kind)) {
            match lanes::next_available_lane(view.lanes_for(kind)) {
                Some(lane) => {
                    new_lane = Some(kind);
                    lane
                }
                None => primary.lane_index,
            }
        } else {
            // Prefer the last lane seen during the move, then re-detect at
            // the release point; an unresolvable lane reverts the gesture.
            match drag
                .target_lane
                .or_else(|| view.layout.lane_at(kind, p))
                .or_else(|| view.layout.nearest_lane(kind, p.y))
            {
                Some(lane) => lane,
                None => return None,
            }
        };

        // Dropping exactly where the clip started is a no-op.
        if delta.is_zero() && primary_lane == primary.lane_index && new_lane.is_none() {
            return None;
        }

        let requested = primary.position + delta;
        let plan = if new_lane.is_some() {
            DropPlan::Exact(requested.max(Px::ZERO))
        } else {
            view.plan_for(kind, primary_lane, &excluded, requested, primary.duration)
        };

        if drag.origins.len() == 1 {
            if let DropPlan::Replace { target } = plan {
                return Some(GestureCommit::Replace(PendingReplace {
                    clip: primary.clip,
                    target,
                    position: requested.max(Px::ZERO),
                    lane_index: primary_lane,
                }));
            }
        }

        let mut moves = Vec::with_capacity(drag.origins.len());
        for (i, origin) in drag.origins.iter().enumerate() {
            let tracked = i == 0;
            let lane = if tracked { primary_lane } else { origin.lane_index };
            let requested = origin.position + delta;
            let plan = if tracked && new_lane.is_some() {
                DropPlan::Exact(requested.max(Px::ZERO))
            } else {
                view.plan_for(origin.clip.kind, lane, &excluded, requested, origin.duration)
            };
            let position = match plan {
                DropPlan::Replace { .. } => view.snap_for(
                    origin.clip.kind,
                    lane,
                    &excluded,
                    requested,
                    origin.duration,
                ),
                other => other.position(requested),
            };
            moves.push(ClipMove {
                clip: origin.clip,
                position,
                lane_index: lane,
            });
        }

        Some(GestureCommit::MoveClips { moves, new_lane })
    }

    fn finish_resize(view: &TimelineView, resize: ClipResize, p: Point) -> Option<GestureCommit> {
        let dx = view.zoom.to_base_px(p.x - resize.start.x);
        let (position, duration, trim_offset) = Self::compute_resize(view, &resize, dx);
        let origin = resize.origin;
        if position == origin.position && duration == origin.duration {
            return None;
        }
        Some(GestureCommit::Resize {
            clip: origin.clip,
            position,
            duration,
            trim_offset,
            position_changed: position != origin.position,
        })
    }

    /// Apply the resize constraints: minimum width, source-length caps, the
    /// left-edge trim rule, and the lane neighbors (a commit can never
    /// introduce an overlap).
    fn compute_resize(view: &TimelineView, resize: &ClipResize, dx: Px) -> (Px, Px, Px) {
        let origin = &resize.origin;
        let (prev_end, next_start) = view.neighbor_bounds_for(
            origin.clip.kind,
            origin.lane_index,
            origin.clip.id,
            origin.position,
        );

        match resize.handle {
            ResizeHandle::Right => {
                let mut proposed = origin.duration + dx;
                if let Some(max) = origin.max_duration {
                    proposed = proposed.min(max - origin.trim_offset);
                }
                if let Some(next) = next_start {
                    proposed = proposed.min(next - origin.position);
                }
                let duration = proposed.max(MIN_CLIP_WIDTH);
                (origin.position, duration, origin.trim_offset)
            }
            ResizeHandle::Left => {
                // The right edge stays anchored; delta moves the left edge.
                let mut delta = dx.min(origin.duration - MIN_CLIP_WIDTH);
                if origin.source_bound {
                    // Cannot reveal content before the source start.
                    delta = delta.max(-origin.trim_offset);
                }
                delta = delta.max(-origin.position);
                if let Some(prev) = prev_end {
                    delta = delta.max(prev - origin.position);
                }
                let position = origin.position + delta;
                let duration = origin.duration - delta;
                let trim_offset = if origin.source_bound {
                    origin.trim_offset + delta
                } else {
                    origin.trim_offset
                };
                (position, duration, trim_offset)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
