use crate::config::LayoutConfig;
use crate::game::beatmap::Beatmap;
use crate::game::note::ObjectId;
use crate::game::timing::{Clock, ClockState};
use std::cmp::Ordering;

/// Beat interval in which objects must be active, per object kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnWindow {
    pub note_lower_beat: f32,
    pub bomb_lower_beat: f32,
    /// Beat that reaches the player one reaction time from now.
    pub upper_beat: f32,
}

impl SpawnWindow {
    pub fn at<C: Clock + ?Sized>(clock: &C, now: ClockState, cfg: &LayoutConfig) -> Self {
        Self {
            note_lower_beat: now.beat - cfg.despawn_beat_margin,
            bomb_lower_beat: now.beat - cfg.bomb_despawn_beat_margin,
            upper_beat: clock.beat_for_time(now.time_sec + cfg.reaction_time_seconds),
        }
    }
}

/// Membership changes produced by one update. Both lists are in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSetDelta {
    pub entered: Vec<ObjectId>,
    pub exited: Vec<ObjectId>,
}

impl ActiveSetDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Tracks which objects are inside their spawn window.
///
/// Every update rebuilds the eligible set from scratch with binary searches,
/// so seeks and backward scrubs need no special handling; only the diff
/// against the previous set is reported.
#[derive(Debug, Default)]
pub struct SpawnWindowTracker {
    active: Vec<ObjectId>,
    scratch: Vec<ObjectId>,
}

impl SpawnWindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<C: Clock + ?Sized>(
        &mut self,
        beatmap: &Beatmap,
        clock: &C,
        now: ClockState,
        cfg: &LayoutConfig,
    ) -> ActiveSetDelta {
        self.update_for_window(beatmap, SpawnWindow::at(clock, now, cfg))
    }

    pub fn update_for_window(&mut self, beatmap: &Beatmap, window: SpawnWindow) -> ActiveSetDelta {
        let notes = beatmap.ids_in_beat_range(beatmap.notes(), window.note_lower_beat, window.upper_beat);
        let bombs = beatmap.ids_in_beat_range(beatmap.bombs(), window.bomb_lower_beat, window.upper_beat);

        self.scratch.clear();
        merge_sorted(notes, bombs, &mut self.scratch);

        let delta = diff_sorted(&self.active, &self.scratch);
        std::mem::swap(&mut self.active, &mut self.scratch);
        delta
    }

    /// Empties the active set, returning everything that was in it.
    pub fn reset(&mut self) -> Vec<ObjectId> {
        self.scratch.clear();
        std::mem::take(&mut self.active)
    }

    #[inline(always)]
    pub fn active(&self) -> &[ObjectId] {
        &self.active
    }

    pub fn is_active(&self, id: ObjectId) -> bool {
        self.active.binary_search(&id).is_ok()
    }
}

fn merge_sorted(a: &[ObjectId], b: &[ObjectId], out: &mut Vec<ObjectId>) {
    out.reserve(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
}

fn diff_sorted(prev: &[ObjectId], next: &[ObjectId]) -> ActiveSetDelta {
    let mut delta = ActiveSetDelta::default();
    let (mut i, mut j) = (0, 0);
    while i < prev.len() && j < next.len() {
        match prev[i].cmp(&next[j]) {
            Ordering::Less => {
                delta.exited.push(prev[i]);
                i += 1;
            }
            Ordering::Greater => {
                delta.entered.push(next[j]);
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    delta.exited.extend_from_slice(&prev[i..]);
    delta.entered.extend_from_slice(&next[j..]);
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::parsing::objects::RawObject;
    use crate::game::timing::TempoMap;

    fn cfg() -> LayoutConfig {
        LayoutConfig {
            reaction_time_seconds: 1.5,
            despawn_beat_margin: 0.5,
            bomb_despawn_beat_margin: 1.0,
            ..LayoutConfig::default()
        }
    }

    fn ids(map: &Beatmap, beat: f32) -> Vec<ObjectId> {
        map.notes()
            .iter()
            .chain(map.bombs())
            .copied()
            .filter(|&id| map.beat_of(id) == beat)
            .collect()
    }

    #[test]
    fn object_two_reaction_times_away_is_not_active() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::from_raw(&[RawObject::note(5.0, 0, 0, 0, 1)]);
        let mut tracker = SpawnWindowTracker::new();
        // Beat 5 is at 2.5s; two reaction times earlier is -0.5s.
        let delta = tracker.update(&map, &tempo, ClockState::at_time(&tempo, -0.5), &cfg());
        assert!(delta.is_empty());
        assert!(tracker.active().is_empty());

        let delta = tracker.update(&map, &tempo, ClockState::at_time(&tempo, 1.0), &cfg());
        assert_eq!(delta.entered, ids(&map, 5.0), "exactly one reaction time away is inside");
    }

    #[test]
    fn repeated_update_at_same_time_is_idempotent() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::from_raw(&[
            RawObject::note(2.0, 0, 0, 0, 1),
            RawObject::note(3.0, 1, 0, 1, 1),
            RawObject::bomb(3.5, 2, 0),
        ]);
        let mut tracker = SpawnWindowTracker::new();
        let now = ClockState::at_beat(&tempo, 2.0);
        let first = tracker.update(&map, &tempo, now, &cfg());
        assert_eq!(first.entered.len(), 3);
        let second = tracker.update(&map, &tempo, now, &cfg());
        assert!(second.is_empty(), "second update must not re-emit: {second:?}");
    }

    #[test]
    fn scrubbing_back_exits_once_and_reenters_once() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::from_raw(&[RawObject::note(8.0, 1, 1, 0, 0)]);
        let note = ids(&map, 8.0);
        let c = cfg();
        let mut tracker = SpawnWindowTracker::new();

        let entered = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 7.0), &c);
        assert_eq!(entered.entered, note);

        // Scrub far behind the note.
        let back = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 1.0), &c);
        assert_eq!(back.exited, note);
        assert!(back.entered.is_empty());
        let again = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 0.5), &c);
        assert!(again.is_empty(), "no duplicate exit while still out of range");

        let forward = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 6.0), &c);
        assert_eq!(forward.entered, note);
        assert!(forward.exited.is_empty());
        let still = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 6.5), &c);
        assert!(still.is_empty(), "no duplicate enter while still in range");
    }

    #[test]
    fn seeking_past_the_window_swaps_membership() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::from_raw(&[
            RawObject::note(2.0, 0, 0, 0, 1),
            RawObject::note(50.0, 0, 0, 0, 1),
        ]);
        let c = cfg();
        let mut tracker = SpawnWindowTracker::new();
        tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 1.0), &c);
        let delta = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 49.0), &c);
        assert_eq!(delta.exited, ids(&map, 2.0));
        assert_eq!(delta.entered, ids(&map, 50.0));
    }

    #[test]
    fn bombs_linger_past_notes() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::from_raw(&[RawObject::note(4.0, 0, 0, 0, 1), RawObject::bomb(4.0, 3, 0)]);
        let c = cfg();
        let mut tracker = SpawnWindowTracker::new();
        tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 4.0), &c);
        assert_eq!(tracker.active().len(), 2);

        let delta = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 4.75), &c);
        assert_eq!(delta.exited, map.notes().to_vec(), "note leaves after its margin");
        assert_eq!(tracker.active(), map.bombs());

        let delta = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 5.25), &c);
        assert_eq!(delta.exited, map.bombs().to_vec());
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn reset_reports_everything_active() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::from_raw(&[RawObject::note(1.0, 0, 0, 0, 1), RawObject::bomb(1.5, 1, 0)]);
        let mut tracker = SpawnWindowTracker::new();
        tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 1.0), &cfg());
        let exited = tracker.reset();
        assert_eq!(exited.len(), 2);
        assert!(tracker.active().is_empty());
        let delta = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 1.0), &cfg());
        assert_eq!(delta.entered, exited, "everything re-enters after a reset");
    }

    #[test]
    fn empty_beatmap_never_activates_anything() {
        let tempo = TempoMap::constant(120.0);
        let map = Beatmap::default();
        let mut tracker = SpawnWindowTracker::new();
        let delta = tracker.update(&map, &tempo, ClockState::at_beat(&tempo, 0.0), &cfg());
        assert!(delta.is_empty());
    }

    #[test]
    fn diff_reports_only_changes() {
        let prev = [ObjectId(1), ObjectId(2), ObjectId(5)];
        let next = [ObjectId(2), ObjectId(3), ObjectId(5), ObjectId(9)];
        let delta = diff_sorted(&prev, &next);
        assert_eq!(delta.exited, vec![ObjectId(1)]);
        assert_eq!(delta.entered, vec![ObjectId(3), ObjectId(9)]);
    }
}
