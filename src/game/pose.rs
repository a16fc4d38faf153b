use crate::config::LayoutConfig;
use crate::game::note::BeatmapObject;
use crate::game::timing::{Clock, ClockState};
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// x across lanes, y up, z away from the player.
    pub position: Vec3,
    /// Roll around the travel axis in degrees. `None` for bombs.
    pub rotation_degrees: Option<f32>,
}

/// Height along the jump-in arc: `target` at depth 0, `base` at `half_jump_distance`.
#[inline(always)]
pub fn spawn_parabola(target_height: f32, base_height: f32, half_jump_distance: f32, t: f32) -> f32 {
    let d_squared = half_jump_distance * half_jump_distance;
    let movement_range = target_height - base_height;
    -(movement_range / d_squared) * (t * t) + target_height
}

#[inline(always)]
pub fn sine_out(progress: f32) -> f32 {
    (progress.clamp(0.0, 1.0) * FRAC_PI_2).sin()
}

/// Depth of an object `seconds_ahead` of the player. Equals the half jump
/// distance exactly at the reaction-time boundary.
#[inline(always)]
pub fn depth_for(seconds_ahead: f32, cfg: &LayoutConfig) -> f32 {
    seconds_ahead / cfg.reaction_time_seconds * cfg.jump_half_distance
}

/// Object height for a given depth, holding at `start` before the object
/// enters the reaction window and at `target` once it reaches the player.
pub fn object_height(start: f32, target: f32, depth: f32, cfg: &LayoutConfig) -> f32 {
    let half_jump = cfg.jump_half_distance;
    if depth >= half_jump {
        start
    } else if depth <= 0.0 {
        target
    } else {
        spawn_parabola(target, start, half_jump, depth)
    }
}

/// Facing angle: 0 until the object enters the reaction window, then eased
/// into `target_angle` over the rotation animation.
pub fn object_rotation(target_angle: f32, seconds_ahead: f32, cfg: &LayoutConfig) -> f32 {
    let reaction = cfg.reaction_time_seconds;
    let animation_length = reaction * cfg.rotation_animation_fraction;

    if seconds_ahead > reaction {
        0.0
    } else if seconds_ahead > reaction - animation_length {
        let time_since_jump = reaction - seconds_ahead;
        target_angle * sine_out(time_since_jump / animation_length)
    } else {
        target_angle
    }
}

/// Pose of one object at the given clock position. A pure function of its
/// inputs; nothing is cached between calls.
pub fn compute_pose<C: Clock + ?Sized>(
    obj: &BeatmapObject,
    clock: &C,
    now: ClockState,
    cfg: &LayoutConfig,
) -> Pose {
    let object_time = clock.time_for_beat(obj.beat);
    let seconds_ahead = object_time - now.time_sec;
    let depth = depth_for(seconds_ahead, cfg);

    let x = cfg.grid_origin_x + f32::from(obj.x) * cfg.lane_width;
    let target_y = cfg.grid_origin_y + f32::from(obj.y) * cfg.row_height;
    let start_y = f32::from(obj.stack_index) * cfg.row_height + cfg.floor_offset;
    let y = object_height(start_y, target_y, depth, cfg);

    let rotation_degrees = obj
        .target_angle()
        .map(|angle| object_rotation(angle, seconds_ahead, cfg));

    Pose {
        position: Vec3::new(x, y, depth),
        rotation_degrees,
    }
}
