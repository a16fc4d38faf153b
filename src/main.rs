use beatlayout::config;
use beatlayout::game::beatmap::Beatmap;
use beatlayout::game::note::{BeatmapObject, ObjectId};
use beatlayout::game::parsing::objects::parse_beatmap_json;
use beatlayout::game::playfield::{Playfield, VisualLayer};
use beatlayout::game::pose::Pose;
use beatlayout::game::timing::{Clock, ClockState, TempoMap};
use log::{debug, info};

const FRAME_SECONDS: f32 = 1.0 / 60.0;
const SCRUB_BACK_SECONDS: f32 = 4.0;

/// Stand-in visual layer: keeps a count of live objects and logs lifecycle events.
#[derive(Default)]
struct LoggingVisuals {
    live: usize,
    peak: usize,
    pose_updates: u64,
}

impl VisualLayer for LoggingVisuals {
    type Handle = ObjectId;

    fn activate(&mut self, id: ObjectId, obj: &BeatmapObject) -> ObjectId {
        self.live += 1;
        self.peak = self.peak.max(self.live);
        debug!("spawn {id:?} beat={} lane={} row={} stack={}", obj.beat, obj.x, obj.y, obj.stack_index);
        id
    }

    fn update(&mut self, _handle: &mut ObjectId, _pose: &Pose) {
        self.pose_updates += 1;
    }

    fn deactivate(&mut self, handle: ObjectId) {
        self.live = self.live.saturating_sub(1);
        debug!("despawn {handle:?}");
    }
}

fn run(
    field: &mut Playfield<ObjectId>,
    visuals: &mut LoggingVisuals,
    tempo: &TempoMap,
    from_sec: f32,
    to_sec: f32,
) {
    let frames = ((to_sec - from_sec) / FRAME_SECONDS).ceil().max(0.0) as u32;
    let mut log_timer = 0.0;
    for frame in 0..=frames {
        let t = from_sec + frame as f32 * FRAME_SECONDS;
        let now = ClockState::at_time(tempo, t);
        field.tick(visuals, tempo, now);

        log_timer += FRAME_SECONDS;
        if log_timer >= 1.0 {
            info!(
                "Beat: {:.2}, Time: {:.2}, Active Objects: {}",
                now.beat,
                now.time_sec,
                field.active().len()
            );
            log_timer -= 1.0;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    log::set_max_level(log::LevelFilter::Warn);

    config::load();
    let cfg = config::get();
    log::set_max_level(cfg.log_level.as_level_filter());

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        return Err("usage: beatlayout <difficulty.dat> [bpm]".into());
    };
    let bpm = match args.next() {
        Some(s) => s.parse::<f32>()?,
        None => 120.0,
    };

    let text = std::fs::read_to_string(&path)?;
    let raw = parse_beatmap_json(&text)?;
    info!("Read {} objects from '{path}'.", raw.len());

    let tempo = TempoMap::constant(bpm);
    let beatmap = Beatmap::from_raw(&raw);
    let end_sec = beatmap
        .objects()
        .last()
        .map_or(0.0, |o| tempo.time_for_beat(o.beat));

    let mut visuals = LoggingVisuals::default();
    let mut field = Playfield::new(beatmap, cfg.layout);

    let start_sec = -cfg.layout.reaction_time_seconds;
    run(&mut field, &mut visuals, &tempo, start_sec, end_sec + 1.0);

    // Scrub backward, then play forward again to exercise re-entry.
    let scrub_to = (end_sec - SCRUB_BACK_SECONDS).max(start_sec);
    info!("Scrubbing back to {scrub_to:.2}s.");
    run(&mut field, &mut visuals, &tempo, scrub_to, end_sec + 1.0);

    let released = field.clear(&mut visuals);
    info!(
        "Done. Peak active objects: {}, pose updates: {}, released at end: {}.",
        visuals.peak,
        visuals.pose_updates,
        released.len()
    );
    Ok(())
}
