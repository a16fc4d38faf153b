use beatlayout::config::LayoutConfig;
use beatlayout::game::beatmap::Beatmap;
use beatlayout::game::note::{BeatmapObject, ObjectId};
use beatlayout::game::parsing::objects::RawObject;
use beatlayout::game::playfield::{Playfield, VisualLayer};
use beatlayout::game::pose::Pose;
use beatlayout::game::timing::{ClockState, TempoMap};
use std::hint::black_box;
use std::time::Instant;

const BEATS: u32 = 2_000;
const ROWS_PER_BEAT: u32 = 8;
const FRAMES: u32 = 20_000;

struct NullVisuals {
    sum: f32,
}

impl VisualLayer for NullVisuals {
    type Handle = ();

    fn activate(&mut self, _id: ObjectId, _obj: &BeatmapObject) -> Self::Handle {}

    fn update(&mut self, _handle: &mut (), pose: &Pose) {
        self.sum += pose.position.y;
    }

    fn deactivate(&mut self, _handle: ()) {}
}

fn synthetic_map() -> Vec<RawObject> {
    let mut raw = Vec::with_capacity((BEATS * ROWS_PER_BEAT * 2) as usize);
    for row in 0..BEATS * ROWS_PER_BEAT {
        let beat = row as f32 / ROWS_PER_BEAT as f32;
        let lane = (row % 4) as i32;
        raw.push(RawObject::note(beat, lane, (row % 3) as i32, 0, (row % 9) as i32));
        raw.push(RawObject::note(beat, 3 - lane, ((row + 1) % 3) as i32, 1, ((row + 4) % 9) as i32));
        if row % 5 == 0 {
            raw.push(RawObject::bomb(beat, (lane + 1) % 4, 2));
        }
    }
    raw
}

fn main() {
    let raw = synthetic_map();
    let tempo = TempoMap::constant(180.0);

    let t0 = Instant::now();
    let beatmap = Beatmap::from_raw(&raw);
    let precompute = t0.elapsed();

    let total_sec = BEATS as f32 / 3.0;
    let mut visuals = NullVisuals { sum: 0.0 };
    let mut field = Playfield::new(beatmap, LayoutConfig::default());

    let t1 = Instant::now();
    for frame in 0..FRAMES {
        // Forward playback with a backward scrub every 1000 frames.
        let phase = frame % 1000;
        let t = if phase < 900 {
            frame as f32 / FRAMES as f32 * total_sec
        } else {
            (frame as f32 / FRAMES as f32 * total_sec - 5.0).max(0.0)
        };
        black_box(field.tick(&mut visuals, &tempo, ClockState::at_time(&tempo, t)));
    }
    let ticks = t1.elapsed();

    println!("objects:      {}", raw.len());
    println!("precompute:   {:.3} ms", precompute.as_secs_f64() * 1000.0);
    println!(
        "tick:         {:.3} us/frame over {FRAMES} frames",
        ticks.as_secs_f64() * 1e6 / f64::from(FRAMES)
    );
    println!("checksum:     {}", black_box(visuals.sum));
}
