use crate::game::note::{
    BeatmapObject, CutDirection, MalformedField, NUM_LANES, NUM_ROWS, NoteColor, ObjectKind,
};
use log::warn;
use serde::Deserialize;

/// A note or bomb record as handed over by the beatmap loader.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawObject {
    #[serde(rename = "b", default)]
    pub beat: f32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// `None` marks a bomb.
    #[serde(rename = "c", default)]
    pub color: Option<i32>,
    #[serde(rename = "d", default)]
    pub direction: i32,
    #[serde(rename = "a", default)]
    pub angle_offset: f32,
}

impl RawObject {
    pub const fn note(beat: f32, x: i32, y: i32, color: i32, direction: i32) -> Self {
        Self {
            beat,
            x,
            y,
            color: Some(color),
            direction,
            angle_offset: 0.0,
        }
    }

    pub const fn bomb(beat: f32, x: i32, y: i32) -> Self {
        Self {
            beat,
            x,
            y,
            color: None,
            direction: 0,
            angle_offset: 0.0,
        }
    }

    /// Converts into a layout object, repairing what can be repaired.
    /// Returns `None` only for records with no usable beat.
    pub fn normalize(&self, issues: &mut Vec<MalformedField>) -> Option<BeatmapObject> {
        if !self.beat.is_finite() {
            issues.push(MalformedField::Beat(self.beat));
            return None;
        }
        let x = clamp_grid(self.x, NUM_LANES, || MalformedField::Lane(self.x), issues);
        let y = clamp_grid(self.y, NUM_ROWS, || MalformedField::Row(self.y), issues);

        let kind = match self.color {
            None => ObjectKind::Bomb,
            Some(c) => {
                let color = NoteColor::from_id(c).unwrap_or_else(|| {
                    issues.push(MalformedField::Color(c));
                    NoteColor::A
                });
                let direction = CutDirection::from_id(self.direction).unwrap_or_else(|| {
                    issues.push(MalformedField::Direction(self.direction));
                    CutDirection::Up
                });
                let angle_offset = if self.angle_offset.is_finite() {
                    self.angle_offset
                } else {
                    0.0
                };
                ObjectKind::Note {
                    color,
                    direction,
                    angle_offset,
                    window_snap: angle_offset,
                }
            }
        };

        Some(BeatmapObject {
            beat: self.beat,
            x,
            y,
            stack_index: 0,
            kind,
        })
    }
}

fn clamp_grid(
    v: i32,
    len: u8,
    issue: impl FnOnce() -> MalformedField,
    issues: &mut Vec<MalformedField>,
) -> u8 {
    let max = i32::from(len) - 1;
    if (0..=max).contains(&v) {
        return v as u8;
    }
    issues.push(issue());
    v.clamp(0, max) as u8
}

/// Normalizes every record, logging one warning per repaired or dropped field.
pub fn normalize_objects(raw: &[RawObject]) -> Vec<BeatmapObject> {
    let mut out = Vec::with_capacity(raw.len());
    let mut issues = Vec::new();
    for (i, rec) in raw.iter().enumerate() {
        issues.clear();
        if let Some(obj) = rec.normalize(&mut issues) {
            out.push(obj);
        }
        for issue in &issues {
            warn!("Beatmap object #{i} at beat {}: {issue}", rec.beat);
        }
    }
    out
}

#[derive(Debug, Default, Deserialize)]
struct RawColorNote {
    #[serde(default)]
    b: f32,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    #[serde(default)]
    c: i32,
    #[serde(default)]
    d: i32,
    #[serde(default)]
    a: f32,
}

#[derive(Debug, Default, Deserialize)]
struct RawBombNote {
    #[serde(default)]
    b: f32,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDifficulty {
    #[serde(default)]
    color_notes: Vec<RawColorNote>,
    #[serde(default)]
    bomb_notes: Vec<RawBombNote>,
}

/// Reads the `colorNotes` and `bombNotes` arrays of a v3 difficulty file.
/// Any other content of the file is ignored.
pub fn parse_beatmap_json(text: &str) -> Result<Vec<RawObject>, serde_json::Error> {
    let diff: RawDifficulty = serde_json::from_str(text)?;
    let mut out = Vec::with_capacity(diff.color_notes.len() + diff.bomb_notes.len());
    out.extend(diff.color_notes.into_iter().map(|n| RawObject {
        beat: n.b,
        x: n.x,
        y: n.y,
        color: Some(n.c),
        direction: n.d,
        angle_offset: n.a,
    }));
    out.extend(
        diff.bomb_notes
            .into_iter()
            .map(|b| RawObject::bomb(b.b, b.x, b.y)),
    );
    Ok(out)
}
