use crate::config::LayoutConfig;
use crate::game::beatmap::Beatmap;
use crate::game::note::{BeatmapObject, ObjectId};
use crate::game::pose::{Pose, compute_pose};
use crate::game::spawn::{ActiveSetDelta, SpawnWindowTracker};
use crate::game::timing::{Clock, ClockState};
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// Whatever draws objects. Handles are created on activation, handed back on
/// every pose update, and returned verbatim on deactivation.
pub trait VisualLayer {
    type Handle;

    fn activate(&mut self, id: ObjectId, obj: &BeatmapObject) -> Self::Handle;
    fn update(&mut self, handle: &mut Self::Handle, pose: &Pose);
    fn deactivate(&mut self, handle: Self::Handle);
}

/// Per-load layout engine: the precomputed beatmap, its active set, and the
/// visual handle owned by each active object.
pub struct Playfield<H> {
    beatmap: Beatmap,
    cfg: LayoutConfig,
    tracker: SpawnWindowTracker,
    handles: FxHashMap<ObjectId, H>,
}

impl<H> Playfield<H> {
    /// Unusable config values (e.g. a zero reaction time) are replaced with
    /// their defaults.
    pub fn new(beatmap: Beatmap, cfg: LayoutConfig) -> Self {
        Self {
            beatmap,
            cfg: cfg.sanitized(),
            tracker: SpawnWindowTracker::new(),
            handles: FxHashMap::default(),
        }
    }

    pub const fn beatmap(&self) -> &Beatmap {
        &self.beatmap
    }

    pub const fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    pub fn active(&self) -> &[ObjectId] {
        self.tracker.active()
    }

    pub fn handle(&self, id: ObjectId) -> Option<&H> {
        self.handles.get(&id)
    }

    /// Advances to `now`: releases objects that left their window, activates
    /// new ones, then pushes a fresh pose to every active object.
    pub fn tick<V, C>(&mut self, visuals: &mut V, clock: &C, now: ClockState) -> ActiveSetDelta
    where
        V: VisualLayer<Handle = H>,
        C: Clock + ?Sized,
    {
        let delta = self.tracker.update(&self.beatmap, clock, now, &self.cfg);

        for id in &delta.exited {
            match self.handles.remove(id) {
                Some(handle) => visuals.deactivate(handle),
                None => warn!("Object {id:?} left the active set without a visual handle."),
            }
        }
        for &id in &delta.entered {
            let Some(obj) = self.beatmap.get(id) else { continue };
            let handle = visuals.activate(id, obj);
            if let Some(stale) = self.handles.insert(id, handle) {
                visuals.deactivate(stale);
            }
        }

        for &id in self.tracker.active() {
            let (Some(obj), Some(handle)) = (self.beatmap.get(id), self.handles.get_mut(&id)) else {
                continue;
            };
            let pose = compute_pose(obj, clock, now, &self.cfg);
            visuals.update(handle, &pose);
        }

        delta
    }

    /// Pose of an object at `now`, whether or not it is active.
    pub fn pose_of<C: Clock + ?Sized>(&self, id: ObjectId, clock: &C, now: ClockState) -> Option<Pose> {
        self.beatmap
            .get(id)
            .map(|obj| compute_pose(obj, clock, now, &self.cfg))
    }

    /// Deactivates everything. Returns the ids that were active.
    pub fn clear<V: VisualLayer<Handle = H>>(&mut self, visuals: &mut V) -> Vec<ObjectId> {
        let exited = self.tracker.reset();
        for id in &exited {
            if let Some(handle) = self.handles.remove(id) {
                visuals.deactivate(handle);
            }
        }
        // Anything left over was never tracked; release it too.
        for (_, handle) in self.handles.drain() {
            visuals.deactivate(handle);
        }
        exited
    }

    /// Swaps in a new beatmap. The old active set is fully released first, so
    /// no tick ever sees a mix of old and new objects.
    pub fn reload<V: VisualLayer<Handle = H>>(&mut self, visuals: &mut V, beatmap: Beatmap) -> Vec<ObjectId> {
        let exited = self.clear(visuals);
        debug!(
            "Reloading playfield: released {} active objects, installing {} objects.",
            exited.len(),
            beatmap.len()
        );
        self.beatmap = beatmap;
        exited
    }

    pub fn set_config(&mut self, cfg: LayoutConfig) {
        self.cfg = cfg.sanitized();
    }
}
