//! Seam index maps.
//!
//! When our edge `out` is glued to the neighbour's edge `back`, a point at
//! `(along, depth)` relative to `out` corresponds to the neighbour's point at
//! the same `(along, depth)` relative to `back`. Each of the 16 edge pairings
//! is an affine map on `(row, col)`, built at compile time by composing the
//! frame change into `out` with the frame change out of `back`.
//!
//! Corner seams only carry the corner point itself.

use crate::{Direction, End, GridIndex, TopologyError, EDGE_SLOTS, LAST};

/// Affine map on control net positions:
/// `row' = row[0]*r + row[1]*c + row[2]`, same for `col'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexMap {
    row: [i8; 3],
    col: [i8; 3],
}

const N: i8 = LAST as i8;

impl IndexMap {
    pub const IDENTITY: Self = Self::new([1, 0, 0], [0, 1, 0]);

    const fn new(row: [i8; 3], col: [i8; 3]) -> Self {
        Self { row, col }
    }

    /// `(row, col)` to `(depth, along)` relative to an edge.
    const fn into_frame(edge: Direction) -> Self {
        match edge {
            Direction::S => Self::new([-1, 0, N], [0, 1, 0]),
            Direction::W => Self::new([0, 1, 0], [1, 0, 0]),
            Direction::E => Self::new([0, -1, N], [1, 0, 0]),
            _ => Self::IDENTITY,
        }
    }

    /// `(depth, along)` relative to an edge back to `(row, col)`.
    const fn out_of_frame(edge: Direction) -> Self {
        match edge {
            Direction::S => Self::new([-1, 0, N], [0, 1, 0]),
            Direction::W => Self::new([0, 1, 0], [1, 0, 0]),
            Direction::E => Self::new([0, 1, 0], [-1, 0, N]),
            _ => Self::IDENTITY,
        }
    }

    /// Apply `self` first, then `next`.
    pub const fn then(self, next: Self) -> Self {
        let mut row = [0i8; 3];
        let mut col = [0i8; 3];
        let mut i = 0;
        while i < 3 {
            row[i] = next.row[0] * self.row[i] + next.row[1] * self.col[i];
            col[i] = next.col[0] * self.row[i] + next.col[1] * self.col[i];
            i += 1;
        }
        row[2] += next.row[2];
        col[2] += next.col[2];
        Self { row, col }
    }

    /// Map a position. Seam maps always land inside the net.
    pub const fn apply(self, index: GridIndex) -> GridIndex {
        let (r, c) = (index.row() as i8, index.col() as i8);
        let row = self.row[0] * r + self.row[1] * c + self.row[2];
        let col = self.col[0] * r + self.col[1] * c + self.col[2];
        GridIndex::at(row as usize, col as usize)
    }

    /// Map taking our side of the `out` edge to the neighbour's side of its
    /// `back` edge. `None` unless both are edge slots.
    pub const fn seam(out: Direction, back: Direction) -> Option<Self> {
        match (out.edge_slot(), back.edge_slot()) {
            (Some(o), Some(b)) => Some(SEAMS[o][b]),
            _ => None,
        }
    }
}

const fn build_seams() -> [[IndexMap; EDGE_SLOTS]; EDGE_SLOTS] {
    let mut table = [[IndexMap::IDENTITY; EDGE_SLOTS]; EDGE_SLOTS];
    let mut o = 0;
    while o < EDGE_SLOTS {
        let mut b = 0;
        while b < EDGE_SLOTS {
            let into = IndexMap::into_frame(Direction::EDGES[o]);
            table[o][b] = into.then(IndexMap::out_of_frame(Direction::EDGES[b]));
            b += 1;
        }
        o += 1;
    }
    table
}

const SEAMS: [[IndexMap; EDGE_SLOTS]; EDGE_SLOTS] = build_seams();

// North glued to south flips rows and keeps columns.
const _: () = {
    let m = build_seams()[0][2];
    assert!(m.row[0] == -1 && m.row[2] == N && m.col[1] == 1);
};

/// Neighbour position corresponding to our `index` across the seam
/// `out` ↔ `back`.
pub fn resolve_seam(
    out: Direction,
    back: Direction,
    index: GridIndex,
) -> Result<GridIndex, TopologyError> {
    if let Some(map) = IndexMap::seam(out, back) {
        return Ok(map.apply(index));
    }
    match (out.corner_point(), back.corner_point()) {
        (Some(ours), Some(theirs)) if ours == index => Ok(theirs),
        (Some(_), Some(_)) => Err(TopologyError::NotOnCorner {
            corner: out,
            row: index.row(),
            col: index.col(),
        }),
        _ => Err(TopologyError::IncompatibleSeam { out, back }),
    }
}

/// Neighbour polygon index corresponding to our `index` across the arc
/// joint `out` ↔ `back`.
pub fn resolve_end(out: End, back: End, index: usize) -> Result<usize, TopologyError> {
    if index > LAST {
        return Err(TopologyError::InvalidPointIndex { index });
    }
    Ok(back.point_at(out.depth_of(index)))
}
