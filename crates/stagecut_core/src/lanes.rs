use crate::clip::{Placed, MAX_LANES};

/// Clips currently sitting in `lane`. Lane indices are clamped on read, so a
/// corrupt index still lands in a real lane.
pub fn clips_in_lane<T: Placed>(clips: &[T], lane: usize) -> Vec<&T> {
    clips.iter().filter(|c| c.lane_index() == lane).collect()
}

/// Sorted unique lane indices that actually hold at least one clip.
pub fn used_lanes<T: Placed>(clips: &[T]) -> Vec<usize> {
    let mut lanes: Vec<usize> = clips.iter().map(|c| c.lane_index()).collect();
    lanes.sort_unstable();
    lanes.dedup();
    lanes
}

pub fn can_add_lane(lanes: &[usize]) -> bool {
    lanes.len() < MAX_LANES
}

/// Lane 0 always exists; other lanes are removable only while empty, and the
/// last remaining lane never goes away.
pub fn can_remove_lane<T: Placed>(lane: usize, clips: &[T], lanes: &[usize]) -> bool {
    if lane == 0 || lanes.len() <= 1 {
        return false;
    }
    clips.iter().all(|c| c.lane_index() != lane)
}

/// Smallest unused index in `[0, MAX_LANES)`.
pub fn next_available_lane(lanes: &[usize]) -> Option<usize> {
    (0..MAX_LANES).find(|i| !lanes.contains(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::TextClip;
    use crate::units::Px;
    use uuid::Uuid;

    fn clip_in_lane(lane: usize) -> TextClip {
        let mut clip = TextClip::new(Uuid::new_v4(), "t", Px::ZERO, Px(100.0));
        clip.lane_index = lane;
        clip
    }

    #[test]
    fn clips_in_lane_filters() {
        let clips = vec![clip_in_lane(0), clip_in_lane(1), clip_in_lane(0)];
        assert_eq!(clips_in_lane(&clips, 0).len(), 2);
        assert_eq!(clips_in_lane(&clips, 1).len(), 1);
        assert!(clips_in_lane(&clips, 2).is_empty());
    }

    #[test]
    fn used_lanes_sorted_unique() {
        let clips = vec![clip_in_lane(2), clip_in_lane(0), clip_in_lane(2)];
        assert_eq!(used_lanes(&clips), vec![0, 2]);
    }

    #[test]
    fn used_lanes_empty_collection() {
        let clips: Vec<TextClip> = vec![];
        assert!(used_lanes(&clips).is_empty());
    }

    #[test]
    fn add_lane_at_cap_refused() {
        assert!(!can_add_lane(&[0, 1, 2]));
        assert!(can_add_lane(&[0, 1]));
        assert!(can_add_lane(&[0]));
    }

    #[test]
    fn remove_lane_rules() {
        // An occupied lane 1 is protected; an empty lane 1 is not
        let occupied = vec![clip_in_lane(1)];
        assert!(!can_remove_lane(1, &occupied, &[0, 1]));

        let empty: Vec<TextClip> = vec![];
        assert!(can_remove_lane(1, &empty, &[0, 1]));
    }

    #[test]
    fn lane_zero_never_removable() {
        let clips: Vec<TextClip> = vec![];
        assert!(!can_remove_lane(0, &clips, &[0, 1]));
    }

    #[test]
    fn last_lane_never_removable() {
        let clips: Vec<TextClip> = vec![];
        assert!(!can_remove_lane(1, &clips, &[1]));
    }

    #[test]
    fn next_available_prefers_smallest() {
        assert_eq!(next_available_lane(&[0, 2]), Some(1));
        assert_eq!(next_available_lane(&[0]), Some(1));
        assert_eq!(next_available_lane(&[0, 1, 2]), None);
        assert_eq!(next_available_lane(&[]), Some(0));
    }
}
