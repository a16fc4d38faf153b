use crate::game::note::{BeatmapObject, CutDirection, NoteColor, ObjectKind};
use smallvec::SmallVec;

// Extra rotation for pairs whose arrows point along a lane or row.
const KNIGHT_MOVE_ANGLE: f32 = 26.565;
const FOUR_WIDE_ANGLE: f32 = 18.435;
const MEGA_WIDE_ANGLE: f32 = 33.69;

// Extra rotation for pairs whose arrows point diagonally.
const KNIGHT_MOVE_ANGLE_DIAGONAL: f32 = 18.435;
const FOUR_WIDE_ANGLE_DIAGONAL: f32 = 26.565;
const MEGA_WIDE_ANGLE_DIAGONAL: f32 = 11.31;

// Dots sharing an exact diagonal line up at 45 degrees.
const DOT_DIAGONAL_ANGLE: f32 = 45.0;

/// Shape of the grid offset between two simultaneous same-color notes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowType {
    None,
    /// 2x1 or 1x2 apart.
    KnightMove,
    /// 3x1 apart.
    FourWide,
    /// 3x2 apart.
    MegaWide,
}

impl WindowType {
    pub const fn classify(abs_dx: i32, abs_dy: i32) -> Self {
        match (abs_dx, abs_dy) {
            (2, 1) | (1, 2) => Self::KnightMove,
            (3, 1) => Self::FourWide,
            (3, 2) => Self::MegaWide,
            _ => Self::None,
        }
    }

    pub const fn orthogonal_angle(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::KnightMove => KNIGHT_MOVE_ANGLE,
            Self::FourWide => FOUR_WIDE_ANGLE,
            Self::MegaWide => MEGA_WIDE_ANGLE,
        }
    }

    pub const fn diagonal_angle(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::KnightMove => KNIGHT_MOVE_ANGLE_DIAGONAL,
            Self::FourWide => FOUR_WIDE_ANGLE_DIAGONAL,
            Self::MegaWide => MEGA_WIDE_ANGLE_DIAGONAL,
        }
    }
}

/// The fields of a note that window snapping looks at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapNote {
    pub x: i32,
    pub y: i32,
    pub color: NoteColor,
    pub direction: CutDirection,
    pub angle_offset: f32,
}

impl SnapNote {
    pub fn from_object(obj: &BeatmapObject) -> Option<Self> {
        match obj.kind {
            ObjectKind::Note {
                color,
                direction,
                angle_offset,
                ..
            } => Some(Self {
                x: i32::from(obj.x),
                y: i32::from(obj.y),
                color,
                direction,
                angle_offset,
            }),
            ObjectKind::Bomb => None,
        }
    }
}

#[inline(always)]
fn compatible_directions(a: CutDirection, b: CutDirection) -> bool {
    a == b || a.is_dot() || b.is_dot()
}

/// Whether a diagonal arrow runs along the line from `other` to this note.
#[inline(always)]
fn along_diagonal(dir: CutDirection, up: bool, right: bool) -> bool {
    (dir.is_upward() == up) == (dir.is_rightward() == right)
}

/// Rotation correction for `n`, given every note on its beat (`n` included).
///
/// Snapping only applies when `n` has exactly one same-color partner and the
/// two notes sit on different rows and lanes. Returns the authored offset
/// untouched whenever no snap applies.
pub fn window_snap(n: &SnapNote, same_beat: &[SnapNote]) -> f32 {
    let angle_offset = n.angle_offset;

    let same_color: SmallVec<[&SnapNote; 4]> =
        same_beat.iter().filter(|o| o.color == n.color).collect();
    if same_color.len() != 2 {
        return angle_offset;
    }
    // Pairs on a shared row or lane are already a straight line.
    let Some(other) = same_color.iter().find(|o| o.x != n.x && o.y != n.y) else {
        return angle_offset;
    };
    if !compatible_directions(n.direction, other.direction) {
        return angle_offset;
    }

    let dx = n.x - other.x;
    let dy = n.y - other.y;
    let (abs_dx, abs_dy) = (dx.abs(), dy.abs());

    let dot = n.direction.is_dot();
    let other_dot = other.direction.is_dot();
    let counter_clockwise = (dx >= 0) != (dy >= 0);
    let mut direction_mult: f32 = if counter_clockwise { 1.0 } else { -1.0 };

    if abs_dx == abs_dy {
        // Exact diagonal; arrows already line up.
        if !dot {
            return angle_offset;
        }
        if other_dot {
            return DOT_DIAGONAL_ANGLE * direction_mult;
        }
        if !other.direction.is_diagonal() {
            return angle_offset;
        }
        if along_diagonal(other.direction, dy < 0, dx < 0) {
            return DOT_DIAGONAL_ANGLE * direction_mult;
        }
    }

    let window = WindowType::classify(abs_dx, abs_dy);
    let main_vertical = window == WindowType::KnightMove && abs_dy == 2;

    // Dots borrow their partner's facing.
    let mut angle = if dot {
        other.direction.angle()
    } else {
        angle_offset
    };

    if main_vertical {
        if n.direction.is_vertical()
            || (dot && (other.direction.is_vertical() || other_dot))
        {
            if dot && !other_dot {
                angle *= direction_mult;
            }
            angle += window.orthogonal_angle();
            return angle * direction_mult;
        }
        direction_mult = -direction_mult;
    } else if n.direction.is_horizontal()
        || (dot && (other.direction.is_horizontal() || other_dot))
    {
        if dot && !other_dot {
            angle *= -direction_mult;
        }
        angle += window.orthogonal_angle();
        return angle * -direction_mult;
    }

    if n.direction.is_diagonal() && other.direction.is_diagonal() {
        let up = dy > 0;
        let right = dx > 0;
        let aligned = dot || along_diagonal(n.direction, up, right);
        let other_aligned = other_dot || along_diagonal(other.direction, up, right);
        if aligned && other_aligned {
            if dot && !other_dot {
                angle *= direction_mult;
            }
            angle += window.diagonal_angle();
            return angle * direction_mult;
        }
    }

    angle_offset
}

/// Computes `window_snap` for every note of one beat cluster. Returns how many
/// notes ended up rotated away from their authored offset.
pub fn resolve_angle_snap(cluster: &mut [BeatmapObject]) -> usize {
    let notes: SmallVec<[SnapNote; 8]> =
        cluster.iter().filter_map(SnapNote::from_object).collect();
    if notes.is_empty() {
        return 0;
    }

    let mut snapped = 0;
    let mut notes_iter = notes.iter();
    for obj in cluster.iter_mut() {
        let ObjectKind::Note { window_snap: snap, .. } = &mut obj.kind else {
            continue;
        };
        let Some(n) = notes_iter.next() else { break };
        *snap = window_snap(n, &notes);
        if *snap != n.angle_offset {
            snapped += 1;
        }
    }
    snapped
}
