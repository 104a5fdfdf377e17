use crate::clip::{Placed, PlacedMut};
use crate::error::{CoreError, Result};
use crate::magnet;
use crate::units::Px;
use uuid::Uuid;

/// A resolved clip move: id, new position, new lane.
pub type Move = (Uuid, Px, usize);

/// Apply resolved moves, returning the replacement collection. Ids not in
/// the collection are skipped; the gesture layer already validated them.
pub fn apply_moves<T: PlacedMut + Clone>(clips: &[T], moves: &[Move]) -> Vec<T> {
    let mut next = clips.to_vec();
    for clip in &mut next {
        if let Some((_, position, lane)) = moves.iter().find(|(id, _, _)| *id == clip.id()) {
            clip.set_position(*position);
            clip.set_lane_index(*lane);
        }
    }
    next
}

/// Replace-on-drop: remove `target`, then place `moving` at the requested
/// spot unchanged.
pub fn apply_replace<T: PlacedMut + Clone>(
    clips: &[T],
    moving: Uuid,
    target: Uuid,
    position: Px,
    lane: usize,
) -> Vec<T> {
    let mut next: Vec<T> = clips.iter().filter(|c| c.id() != target).cloned().collect();
    for clip in &mut next {
        if clip.id() == moving {
            clip.set_position(position.max(Px::ZERO));
            clip.set_lane_index(lane);
        }
    }
    next
}

/// Commit a resize. `trim_offset` comes from the gesture layer, which has
/// already applied the source-bound rules.
pub fn apply_resize<T: PlacedMut + Clone>(
    clips: &[T],
    id: Uuid,
    position: Px,
    duration: Px,
    trim_offset: Px,
) -> Vec<T> {
    let mut next = clips.to_vec();
    for clip in &mut next {
        if clip.id() == id {
            clip.set_position(position);
            clip.set_duration(duration);
            clip.set_trim_offset(trim_offset);
            clip.normalize();
        }
    }
    next
}

/// Duplicate a clip into its own lane, abutting the original and snapping
/// past any clip already there. The new id comes from the host.
pub fn duplicate_clip<T: PlacedMut + Clone>(clips: &[T], id: Uuid, new_id: Uuid) -> Result<Vec<T>> {
    let original = clips
        .iter()
        .find(|c| c.id() == id)
        .ok_or(CoreError::ClipNotFound(id))?;

    let lane = original.lane_index();
    let in_lane: Vec<&T> = clips.iter().filter(|c| c.lane_index() == lane).collect();
    let position = magnet::snap_position(&in_lane, original.end(), original.duration());

    let mut copy = original.clone();
    copy.set_id(new_id);
    copy.set_position(position);

    let mut next = clips.to_vec();
    next.push(copy);
    Ok(next)
}

/// Split a clip at `at`, which must lie strictly inside its interval. The
/// left half keeps the original id; the right half takes `new_id` and
/// inherits the trim metadata shifted by the left half's length.
pub fn split_clip<T: PlacedMut + Clone>(
    clips: &[T],
    id: Uuid,
    at: Px,
    new_id: Uuid,
) -> Result<Vec<T>> {
    let index = clips
        .iter()
        .position(|c| c.id() == id)
        .ok_or(CoreError::ClipNotFound(id))?;
    let original = &clips[index];

    if at <= original.position() || at >= original.end() {
        return Err(CoreError::InvalidSplit(format!(
            "split point {} outside clip interval [{}, {})",
            at,
            original.position(),
            original.end()
        )));
    }

    let left_len = at - original.position();

    let mut left = original.clone();
    left.set_duration(left_len);
    left.normalize();

    let mut right = original.clone();
    right.set_id(new_id);
    right.set_position(at);
    right.set_duration(original.end() - at);
    right.set_trim_offset(original.trim_offset() + left_len);
    right.normalize();

    let mut next = clips.to_vec();
    next[index] = left;
    next.insert(index + 1, right);
    Ok(next)
}

pub fn delete_clips<T: PlacedMut + Clone>(clips: &[T], ids: &[Uuid]) -> Vec<T> {
    clips
        .iter()
        .filter(|c| !ids.contains(&c.id()))
        .cloned()
        .collect()
}

/// Maximum `position + duration` across the collection.
pub fn content_end<T: Placed>(clips: &[T]) -> Px {
    clips.iter().map(|c| c.end()).fold(Px::ZERO, Px::max)
}

/// True when two clips in the same lane overlap. Committed collections must
/// never be in this state.
pub fn has_lane_overlap<T: Placed>(clips: &[T]) -> bool {
    for (i, a) in clips.iter().enumerate() {
        for b in clips.iter().skip(i + 1) {
            if a.lane_index() == b.lane_index()
                && a.position() < b.end()
                && b.position() < a.end()
            {
                return true;
            }
        }
    }
    false
}
