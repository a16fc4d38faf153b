use crate::game::angle_snap::resolve_angle_snap;
use crate::game::note::{BeatmapObject, MalformedField, ObjectId};
use crate::game::parsing::objects::{RawObject, normalize_objects};
use crate::game::stacking::{group_by_beat, resolve_stacking};
use log::{info, warn};

/// A fully precomputed object list for one loaded difficulty.
///
/// Objects are sorted by beat and never change after construction; an
/// `ObjectId` is an index into that list. Note and bomb ids are kept in
/// separate beat-ordered lists because their despawn margins differ.
#[derive(Debug, Clone, Default)]
pub struct Beatmap {
    objects: Vec<BeatmapObject>,
    notes: Vec<ObjectId>,
    bombs: Vec<ObjectId>,
    cluster_count: usize,
    snapped_count: usize,
}

impl Beatmap {
    pub fn from_raw(raw: &[RawObject]) -> Self {
        Self::from_objects(normalize_objects(raw))
    }

    /// Objects with a non-finite beat cannot be placed on the timeline and are
    /// dropped with a warning.
    pub fn from_objects(mut objects: Vec<BeatmapObject>) -> Self {
        objects.retain(|o| {
            let keep = o.beat.is_finite();
            if !keep {
                warn!(
                    "Skipping object at lane {} row {}: {}",
                    o.x,
                    o.y,
                    MalformedField::Beat(o.beat)
                );
            }
            keep
        });
        let mut objects = resolve_stacking(objects);

        let clusters = group_by_beat(&objects);
        let mut snapped_count = 0;
        for range in &clusters {
            snapped_count += resolve_angle_snap(&mut objects[range.clone()]);
        }

        let mut notes = Vec::new();
        let mut bombs = Vec::new();
        for (i, obj) in objects.iter().enumerate() {
            let id = ObjectId(i as u32);
            if obj.is_bomb() {
                bombs.push(id);
            } else {
                notes.push(id);
            }
        }

        info!(
            "Beatmap precomputed: {} notes, {} bombs, {} beat clusters, {} window-snapped notes.",
            notes.len(),
            bombs.len(),
            clusters.len(),
            snapped_count
        );

        Self {
            objects,
            notes,
            bombs,
            cluster_count: clusters.len(),
            snapped_count,
        }
    }

    #[inline(always)]
    pub fn get(&self, id: ObjectId) -> Option<&BeatmapObject> {
        self.objects.get(id.index())
    }

    #[inline(always)]
    pub fn objects(&self) -> &[BeatmapObject] {
        &self.objects
    }

    #[inline(always)]
    pub fn notes(&self) -> &[ObjectId] {
        &self.notes
    }

    #[inline(always)]
    pub fn bombs(&self) -> &[ObjectId] {
        &self.bombs
    }

    #[inline(always)]
    pub fn beat_of(&self, id: ObjectId) -> f32 {
        self.objects[id.index()].beat
    }

    pub const fn len(&self) -> usize {
        self.objects.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub const fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub const fn snapped_count(&self) -> usize {
        self.snapped_count
    }

    /// Ids from `ids` whose beats fall in `[lower, upper]`. `ids` must be beat-ordered.
    pub fn ids_in_beat_range<'a>(&self, ids: &'a [ObjectId], lower: f32, upper: f32) -> &'a [ObjectId] {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return &[];
        }
        let start = ids.partition_point(|&id| self.beat_of(id) < lower);
        let end = ids.partition_point(|&id| self.beat_of(id) <= upper);
        &ids[start..end.max(start)]
    }
}
