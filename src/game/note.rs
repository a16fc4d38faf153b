use std::fmt;

pub const NUM_LANES: u8 = 4;
pub const NUM_ROWS: u8 = 3;

// Facing angle per cut direction, degrees. Index with `CutDirection as usize`.
pub const DIRECTION_ANGLES: [f32; 9] = [180.0, 0.0, -90.0, 90.0, -135.0, 135.0, -45.0, 45.0, 0.0];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NoteColor {
    A,
    B,
}

impl NoteColor {
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CutDirection {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    UpLeft = 4,
    UpRight = 5,
    DownLeft = 6,
    DownRight = 7,
    Any = 8,
}

impl CutDirection {
    const ALL: [Self; 9] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
        Self::Any,
    ];

    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    #[inline(always)]
    pub const fn angle(self) -> f32 {
        DIRECTION_ANGLES[self as usize]
    }

    #[inline(always)]
    pub const fn is_dot(self) -> bool {
        matches!(self, Self::Any)
    }

    /// Dots count as diagonal, upward and rightward for snapping purposes.
    #[inline(always)]
    pub fn is_diagonal(self) -> bool {
        self.is_dot() || self.angle() % 90.0 != 0.0
    }

    #[inline(always)]
    pub fn is_upward(self) -> bool {
        self.is_dot() || self.angle().abs() > 90.0
    }

    #[inline(always)]
    pub fn is_rightward(self) -> bool {
        self.is_dot() || self.angle() > 0.0
    }

    #[inline(always)]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    #[inline(always)]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Note {
        color: NoteColor,
        direction: CutDirection,
        /// Authored rotation on top of the direction angle.
        angle_offset: f32,
        /// Precomputed facing correction. Equal to `angle_offset` unless snapped.
        window_snap: f32,
    },
    Bomb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BeatmapObject {
    pub beat: f32,
    pub x: u8,
    pub y: u8,
    pub stack_index: u8,
    pub kind: ObjectKind,
}

impl BeatmapObject {
    pub const fn note(beat: f32, x: u8, y: u8, color: NoteColor, direction: CutDirection) -> Self {
        Self {
            beat,
            x,
            y,
            stack_index: 0,
            kind: ObjectKind::Note {
                color,
                direction,
                angle_offset: 0.0,
                window_snap: 0.0,
            },
        }
    }

    pub const fn bomb(beat: f32, x: u8, y: u8) -> Self {
        Self {
            beat,
            x,
            y,
            stack_index: 0,
            kind: ObjectKind::Bomb,
        }
    }

    #[inline(always)]
    pub const fn is_bomb(&self) -> bool {
        matches!(self.kind, ObjectKind::Bomb)
    }

    /// Final facing angle in degrees; bombs have none.
    pub fn target_angle(&self) -> Option<f32> {
        match self.kind {
            ObjectKind::Note {
                direction,
                window_snap,
                ..
            } => Some(direction.angle() + window_snap),
            ObjectKind::Bomb => None,
        }
    }

    pub const fn window_snap(&self) -> f32 {
        match self.kind {
            ObjectKind::Note { window_snap, .. } => window_snap,
            ObjectKind::Bomb => 0.0,
        }
    }
}

/// A field of an input record that was out of range and had to be repaired or dropped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MalformedField {
    Beat(f32),
    Lane(i32),
    Row(i32),
    Direction(i32),
    Color(i32),
}

impl fmt::Display for MalformedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beat(b) => write!(f, "non-finite beat {b}; object skipped"),
            Self::Lane(x) => write!(f, "lane {x} outside 0..{NUM_LANES}; clamped"),
            Self::Row(y) => write!(f, "row {y} outside 0..{NUM_ROWS}; clamped"),
            Self::Direction(d) => write!(f, "cut direction {d} is invalid; using Up"),
            Self::Color(c) => write!(f, "note color {c} is invalid; using A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_ids_map_onto_angle_table() {
        for id in 0..9 {
            let dir = CutDirection::from_id(id).expect("0..=8 are valid directions");
            assert_eq!(dir as i32, id);
            assert_eq!(dir.angle(), DIRECTION_ANGLES[id as usize]);
        }
        assert_eq!(CutDirection::from_id(9), None);
        assert_eq!(CutDirection::from_id(-1), None);
    }

    #[test]
    fn dot_satisfies_every_orientation_predicate() {
        let dot = CutDirection::Any;
        assert!(dot.is_diagonal() && dot.is_upward() && dot.is_rightward());
        assert!(!CutDirection::Down.is_diagonal());
        assert!(CutDirection::UpRight.is_diagonal());
        assert!(CutDirection::Up.is_upward(), "up arrows face 180 degrees");
        assert!(!CutDirection::Left.is_rightward());
    }

    #[test]
    fn bombs_have_no_facing() {
        let bomb = BeatmapObject::bomb(4.0, 1, 0);
        assert_eq!(bomb.target_angle(), None);
        let note = BeatmapObject::note(4.0, 1, 0, NoteColor::A, CutDirection::Right);
        assert_eq!(note.target_angle(), Some(90.0));
    }
}
