pub mod angle_snap;
pub mod beatmap;
pub mod note;
pub mod parsing;
pub mod playfield;
pub mod pose;
pub mod spawn;
pub mod stacking;
pub mod timing;
