use crate::clip::Placed;
use crate::units::Px;
use uuid::Uuid;

/// Overlap ratio at or above this classifies a drop as replacing the
/// overlapped clip instead of snapping beside it.
pub const REPLACE_THRESHOLD: f64 = 0.5;

/// Where a moving clip will land if dropped now. Recomputed continuously
/// during a drag for the ghost preview; applied once on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropPlan {
    /// Requested position accepted unchanged.
    Exact(Px),
    /// Magnetically moved to abut a neighbor.
    Snap(Px),
    /// Overlaps `target` past the threshold; dropping replaces it.
    Replace { target: Uuid },
}

impl DropPlan {
    /// The position the moving clip takes under this plan. A replace keeps
    /// the requested position unchanged.
    pub fn position(&self, requested: Px) -> Px {
        match self {
            DropPlan::Exact(p) | DropPlan::Snap(p) => *p,
            DropPlan::Replace { .. } => requested.max(Px::ZERO),
        }
    }

    pub fn replaces(&self) -> Option<Uuid> {
        match self {
            DropPlan::Replace { target } => Some(*target),
            _ => None,
        }
    }
}

/// Length of the intersection between `[position, position + duration)` and
/// the other clip's interval, divided by the moving clip's duration.
pub fn overlap_ratio<T: Placed>(other: &T, position: Px, duration: Px) -> f64 {
    if duration.0 <= 0.0 {
        return 0.0;
    }
    let start = position.max(other.position());
    let end = (position + duration).min(other.end());
    let overlap = (end - start).max(Px::ZERO);
    overlap.0 / duration.0
}

fn intervals_overlap<T: Placed>(other: &T, position: Px, duration: Px) -> bool {
    position < other.end() && other.position() < position + duration
}

fn fits<T: Placed>(others: &[T], position: Px, duration: Px) -> bool {
    !others.iter().any(|o| intervals_overlap(o, position, duration))
}

/// Decide where `(position, duration)` lands in a lane holding `others`
/// (the moving clip itself must already be excluded from `others`).
pub fn plan_drop<T: Placed>(others: &[T], position: Px, duration: Px) -> DropPlan {
    let requested = position.max(Px::ZERO);

    if others.is_empty() {
        return DropPlan::Exact(requested);
    }

    // Replace wins when a single neighbor absorbs most of the drop. Ties on
    // ratio resolve to the earlier clip.
    let mut best: Option<(&T, f64)> = None;
    for other in others {
        let ratio = overlap_ratio(other, requested, duration);
        match best {
            Some((b, best_ratio))
                if ratio > best_ratio
                    || (ratio == best_ratio && other.position() < b.position()) =>
            {
                best = Some((other, ratio));
            }
            None => best = Some((other, ratio)),
            _ => {}
        }
    }
    if let Some((target, ratio)) = best {
        if ratio >= REPLACE_THRESHOLD {
            return DropPlan::Replace { target: target.id() };
        }
    }

    if fits(others, requested, duration) {
        return DropPlan::Exact(requested);
    }

    DropPlan::Snap(snap_position(others, requested, duration))
}

/// Nearest non-overlapping position for `(requested, duration)`: abut the
/// right edge of a clip ending before, or the left edge of a clip starting
/// after, whichever displaces the drop less. Displacement ties resolve to
/// the earlier position. Falls back to appending after the lane's last clip.
pub fn snap_position<T: Placed>(others: &[T], requested: Px, duration: Px) -> Px {
    let requested = requested.max(Px::ZERO);
    if fits(others, requested, duration) {
        return requested;
    }

    let mut best: Option<(Px, Px)> = None; // (candidate, displacement)
    for other in others {
        for candidate in [other.end(), other.position() - duration] {
            if candidate < Px::ZERO || !fits(others, candidate, duration) {
                continue;
            }
            let displacement = (candidate - requested).abs();
            let better = match best {
                None => true,
                Some((best_pos, best_disp)) => {
                    displacement < best_disp
                        || (displacement == best_disp && candidate < best_pos)
                }
            };
            if better {
                best = Some((candidate, displacement));
            }
        }
    }

    match best {
        Some((pos, _)) => pos,
        None => others
            .iter()
            .map(|o| o.end())
            .fold(Px::ZERO, Px::max),
    }
}

/// Bounds imposed by a clip's lane neighbors: the end of the closest clip
/// before `position` and the start of the closest clip after it. Resizes are
/// clamped to this window so a commit can never create an overlap.
pub fn neighbor_bounds<T: Placed>(others: &[T], position: Px) -> (Option<Px>, Option<Px>) {
    let prev_end = others
        .iter()
        .filter(|o| o.position() < position)
        .map(|o| o.end())
        .fold(None, |acc: Option<Px>, e| Some(acc.map_or(e, |a| a.max(e))));
    let next_start = others
        .iter()
        .filter(|o| o.position() >= position)
        .map(|o| o.position())
        .fold(None, |acc: Option<Px>, s| Some(acc.map_or(s, |a| a.min(s))));
    (prev_end, next_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::VideoClip;
    use uuid::Uuid;

    fn clip(position: f64, duration: f64) -> VideoClip {
        VideoClip::new(Uuid::new_v4(), "c", Px(position), Px(duration))
    }

    #[test]
    fn empty_lane_accepts_requested_position() {
        let others: Vec<VideoClip> = vec![];
        assert_eq!(plan_drop(&others, Px(123.0), Px(200.0)), DropPlan::Exact(Px(123.0)));
    }

    #[test]
    fn negative_request_clamps_to_zero() {
        let others: Vec<VideoClip> = vec![];
        assert_eq!(plan_drop(&others, Px(-50.0), Px(200.0)), DropPlan::Exact(Px::ZERO));
    }

    #[test]
    fn below_threshold_snaps_to_right_edge() {
        // X at [0, 200), drop duration 200 at 150 -> ratio 0.25, snaps to
        // abut X's right edge at 200.
        let others = vec![clip(0.0, 200.0)];
        let plan = plan_drop(&others, Px(150.0), Px(200.0));
        assert_eq!(plan, DropPlan::Snap(Px(200.0)));
        assert_eq!(plan.position(Px(150.0)), Px(200.0));
    }

    #[test]
    fn at_threshold_classifies_replace() {
        // X at [0, 200), drop duration 200 at 50 -> ratio 0.75.
        let x = clip(0.0, 200.0);
        let target = x.id;
        let others = vec![x];
        let plan = plan_drop(&others, Px(50.0), Px(200.0));
        assert_eq!(plan, DropPlan::Replace { target });
        assert_eq!(plan.replaces(), Some(target));
        // A replace keeps the requested position unchanged
        assert_eq!(plan.position(Px(50.0)), Px(50.0));
    }

    #[test]
    fn replace_picks_highest_overlap_neighbor() {
        let a = clip(0.0, 100.0);
        let b = clip(100.0, 400.0);
        let b_id = b.id;
        // [80, 280) overlaps a by 20 (0.1) and b by 180 (0.9)
        let plan = plan_drop(&[a, b], Px(80.0), Px(200.0));
        assert_eq!(plan, DropPlan::Replace { target: b_id });
    }

    #[test]
    fn overlap_ratio_uses_moving_duration() {
        let x = clip(0.0, 400.0);
        // moving clip [300, 500) of duration 200 overlaps [300, 400) = 100
        assert_eq!(overlap_ratio(&x, Px(300.0), Px(200.0)), 0.5);
    }

    #[test]
    fn snap_prefers_smaller_displacement() {
        // Gap between [0,100) and [400, 500); drop duration 100 at 150.
        // Candidates: 100 (disp 50) and 300 (disp 150) -> 100 wins.
        let others = vec![clip(0.0, 100.0), clip(400.0, 100.0)];
        // Requested 150 overlaps nothing, so it is accepted exactly.
        assert_eq!(plan_drop(&others, Px(150.0), Px(100.0)), DropPlan::Exact(Px(150.0)));

        // Make it collide: duration 300 at 50 overlaps the first clip only
        // by 50/300 = 0.17, below threshold -> snap. Candidates: 100
        // (disp 50, fits in the 300-wide gap) and -300/500... 100 wins.
        let plan = plan_drop(&others, Px(50.0), Px(300.0));
        assert_eq!(plan, DropPlan::Snap(Px(100.0)));
    }

    #[test]
    fn snap_to_left_abut_when_closer() {
        // X at [200, 400); drop duration 100 at 160 overlaps [200, 260) = 60%
        // -> replace territory, so use a shorter overlap: position 130,
        // duration 100 -> overlap [200, 230) = 30. Candidates: left-abut
        // 200 - 100 = 100 (disp 30), right edge 400 (disp 270) -> 100.
        let others = vec![clip(200.0, 200.0)];
        let plan = plan_drop(&others, Px(130.0), Px(100.0));
        assert_eq!(plan, DropPlan::Snap(Px(100.0)));
    }

    #[test]
    fn snap_candidate_may_not_collide_with_third_clip() {
        // Lane: [0, 200) and [200, 300). Drop duration 100 at 150 overlaps
        // the first clip by 50 (ratio 0.5 would replace) -- use duration 200
        // at 150: ratio vs first = 50/200, vs second = 100/200 = 0.5 ->
        // replace the second. So shrink overlap: duration 400, position 100:
        // ratio vs first = 100/400, vs second = 100/400; below threshold.
        // Abutting first's right edge (200) collides with the second clip;
        // the only fitting candidate is the second clip's right edge (300).
        let others = vec![clip(0.0, 200.0), clip(200.0, 100.0)];
        let plan = plan_drop(&others, Px(100.0), Px(400.0));
        assert_eq!(plan, DropPlan::Snap(Px(300.0)));
    }

    #[test]
    fn full_lane_appends_after_last_clip() {
        // No gap fits a 200-wide clip except after the end.
        let others = vec![clip(0.0, 100.0), clip(100.0, 100.0)];
        let pos = snap_position(&others, Px(50.0), Px(10_000.0));
        assert_eq!(pos, Px(200.0));
    }

    #[test]
    fn neighbor_bounds_bracket_the_position() {
        let others = vec![clip(0.0, 100.0), clip(300.0, 100.0), clip(500.0, 100.0)];
        let (prev, next) = neighbor_bounds(&others, Px(200.0));
        assert_eq!(prev, Some(Px(100.0)));
        assert_eq!(next, Some(Px(300.0)));

        let (prev, next) = neighbor_bounds(&others, Px(0.0));
        assert_eq!(prev, None);
        assert_eq!(next, Some(Px(0.0)));

        let empty: Vec<VideoClip> = vec![];
        assert_eq!(neighbor_bounds(&empty, Px(50.0)), (None, None));
    }

    #[test]
    fn adjacent_clips_do_not_overlap() {
        let x = clip(0.0, 200.0);
        assert_eq!(overlap_ratio(&x, Px(200.0), Px(100.0)), 0.0);
        assert!(fits(&[x], Px(200.0), Px(100.0)));
    }
}
