use crate::game::note::BeatmapObject;
use smallvec::SmallVec;
use std::ops::Range;

/// Objects closer together than this (in beats) are treated as simultaneous.
pub const SAME_BEAT_EPSILON: f32 = 1.0 / 128.0;

#[inline(always)]
pub fn is_same_beat(a: f32, b: f32) -> bool {
    (a - b).abs() < SAME_BEAT_EPSILON
}

/// Stable ascending sort by beat.
pub fn sort_by_beat(objects: &mut [BeatmapObject]) {
    objects.sort_by(|a, b| a.beat.total_cmp(&b.beat));
}

/// Splits a beat-sorted slice into maximal runs that share the first object's beat.
pub fn group_by_beat(objects: &[BeatmapObject]) -> Vec<Range<usize>> {
    let mut clusters = Vec::new();
    let mut start = 0;
    while start < objects.len() {
        let anchor = objects[start].beat;
        let len = objects[start..]
            .iter()
            .take_while(|o| is_same_beat(o.beat, anchor))
            .count();
        clusters.push(start..start + len);
        start += len;
    }
    clusters
}

/// Assigns `stack_index` within one cluster.
///
/// An object's stack index is one more than the highest stack index among the
/// objects directly beneath it (same lane, lower row). Objects on the bottom
/// row, or with nothing beneath them, stack at 0. Sweeping rows bottom-up means
/// every dependency is resolved before it is read.
pub fn resolve_cluster_stacking(cluster: &mut [BeatmapObject]) {
    let mut order: SmallVec<[usize; 12]> = (0..cluster.len()).collect();
    order.sort_by_key(|&i| cluster[i].y);

    for (pos, &i) in order.iter().enumerate() {
        let (x, y) = (cluster[i].x, cluster[i].y);
        if y == 0 {
            cluster[i].stack_index = 0;
            continue;
        }
        let below = order[..pos]
            .iter()
            .map(|&j| &cluster[j])
            .filter(|m| m.x == x && m.y < y)
            .map(|m| m.stack_index)
            .max();
        cluster[i].stack_index = below.map_or(0, |s| s + 1);
    }
}

/// Sorts objects by beat and resolves stacking for every cluster.
pub fn resolve_stacking(mut objects: Vec<BeatmapObject>) -> Vec<BeatmapObject> {
    sort_by_beat(&mut objects);
    for range in group_by_beat(&objects) {
        resolve_cluster_stacking(&mut objects[range]);
    }
    objects
}
