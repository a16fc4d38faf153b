use std::cmp::Ordering;

/// Beat/time conversion supplied by whatever owns the song's tempo data.
pub trait Clock {
    fn time_for_beat(&self, beat: f32) -> f32;
    fn beat_for_time(&self, time_sec: f32) -> f32;
}

/// Playback position handed to the engine on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockState {
    pub beat: f32,
    pub time_sec: f32,
}

impl ClockState {
    pub fn at_time<C: Clock + ?Sized>(clock: &C, time_sec: f32) -> Self {
        Self {
            beat: clock.beat_for_time(time_sec),
            time_sec,
        }
    }

    pub fn at_beat<C: Clock + ?Sized>(clock: &C, beat: f32) -> Self {
        Self {
            beat,
            time_sec: clock.time_for_beat(beat),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BeatTimePoint {
    beat: f32,
    time_sec: f32,
    bpm: f32,
}

/// Piecewise-constant tempo: a list of BPM changes anchored at beats.
#[derive(Debug, Clone)]
pub struct TempoMap {
    points: Vec<BeatTimePoint>,
}

const FALLBACK_BPM: f32 = 120.0;

impl TempoMap {
    pub fn constant(bpm: f32) -> Self {
        Self::from_bpm_changes(&[(0.0, bpm)])
    }

    /// Builds the map from `(beat, bpm)` pairs. Non-positive or non-finite
    /// BPMs are dropped; an empty result falls back to 120 BPM.
    pub fn from_bpm_changes(changes: &[(f32, f32)]) -> Self {
        let mut parsed: Vec<(f32, f32)> = changes
            .iter()
            .copied()
            .filter(|&(b, bpm)| b.is_finite() && bpm.is_finite() && bpm > 0.0)
            .collect();
        parsed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Less));
        if parsed.is_empty() {
            parsed.push((0.0, FALLBACK_BPM));
        }

        let mut points = Vec::with_capacity(parsed.len());
        let mut current_time = 0.0;
        let mut last_beat = parsed[0].0.min(0.0);
        let mut last_bpm = parsed[0].1;
        for &(beat, bpm) in &parsed {
            if beat > last_beat {
                current_time += (beat - last_beat) * (60.0 / last_bpm);
            }
            points.push(BeatTimePoint {
                beat,
                time_sec: current_time,
                bpm,
            });
            last_beat = beat;
            last_bpm = bpm;
        }
        Self { points }
    }

    pub fn bpm_at_beat(&self, beat: f32) -> f32 {
        self.points[self.point_index_for_beat(beat)].bpm
    }

    fn point_index_for_beat(&self, beat: f32) -> usize {
        self.points.partition_point(|p| p.beat <= beat).saturating_sub(1)
    }

    fn point_index_for_time(&self, time_sec: f32) -> usize {
        self.points
            .partition_point(|p| p.time_sec <= time_sec)
            .saturating_sub(1)
    }
}

impl Clock for TempoMap {
    fn time_for_beat(&self, beat: f32) -> f32 {
        let p = self.points[self.point_index_for_beat(beat)];
        p.time_sec + (beat - p.beat) * (60.0 / p.bpm)
    }

    fn beat_for_time(&self, time_sec: f32) -> f32 {
        let p = self.points[self.point_index_for_time(time_sec)];
        p.beat + (time_sec - p.time_sec) * (p.bpm / 60.0)
    }
}
