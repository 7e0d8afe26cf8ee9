//! Control net positions and their edge-relative coordinates.
//!
//! Every position of a 4×4 net can be described relative to one of its edges
//! as `(along, depth)`: `depth` counts rows (or columns) inward from the
//! boundary, `along` runs parallel to it.
//!
//! | edge | depth      | along |
//! |------|------------|-------|
//! | N    | `row`      | `col` |
//! | S    | `3 - row`  | `col` |
//! | W    | `col`      | `row` |
//! | E    | `3 - col`  | `row` |

use crate::{Direction, TopologyError};

/// Points per control net side (cubic).
pub const GRID_ORDER: usize = 4;

/// Highest valid row, column or polygon index.
pub const LAST: usize = GRID_ORDER - 1;

/// A validated `(row, col)` position in a 4×4 control net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridIndex {
    row: u8,
    col: u8,
}

impl GridIndex {
    /// Validate a position.
    pub fn new(row: usize, col: usize) -> Result<Self, TopologyError> {
        if row < GRID_ORDER && col < GRID_ORDER {
            Ok(Self::at(row, col))
        } else {
            Err(TopologyError::InvalidIndex { row, col })
        }
    }

    /// Unchecked constructor for positions known to be in range.
    #[inline]
    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self {
            row: row as u8,
            col: col as u8,
        }
    }

    #[inline]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[inline]
    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major offset in `0..16`.
    #[inline]
    pub const fn flat(self) -> usize {
        self.row() * GRID_ORDER + self.col()
    }

    /// Inverse of [`GridIndex::flat`].
    pub const fn from_flat(offset: usize) -> Option<Self> {
        if offset < GRID_ORDER * GRID_ORDER {
            Some(Self::at(offset / GRID_ORDER, offset % GRID_ORDER))
        } else {
            None
        }
    }

    /// All 16 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_ORDER * GRID_ORDER).map(|i| Self::at(i / GRID_ORDER, i % GRID_ORDER))
    }

    /// True for the four corner points.
    #[inline]
    pub const fn is_corner(self) -> bool {
        (self.row() == 0 || self.row() == LAST) && (self.col() == 0 || self.col() == LAST)
    }

    /// True for points on the outer ring of the net.
    #[inline]
    pub const fn is_boundary(self) -> bool {
        self.row() == 0 || self.row() == LAST || self.col() == 0 || self.col() == LAST
    }

    /// Position relative to `edge`. `None` when `edge` is a corner slot.
    pub const fn seam_coord(self, edge: Direction) -> Option<SeamCoord> {
        let (depth, along) = match edge {
            Direction::N => (self.row(), self.col()),
            Direction::S => (LAST - self.row(), self.col()),
            Direction::W => (self.col(), self.row()),
            Direction::E => (LAST - self.col(), self.row()),
            _ => return None,
        };
        Some(SeamCoord::at(along, depth))
    }

    /// Inverse of [`GridIndex::seam_coord`].
    pub const fn from_seam(edge: Direction, coord: SeamCoord) -> Option<Self> {
        let (along, depth) = (coord.along(), coord.depth());
        match edge {
            Direction::N => Some(Self::at(depth, along)),
            Direction::S => Some(Self::at(LAST - depth, along)),
            Direction::W => Some(Self::at(along, depth)),
            Direction::E => Some(Self::at(along, LAST - depth)),
            _ => None,
        }
    }
}

impl TryFrom<(usize, usize)> for GridIndex {
    type Error = TopologyError;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(row, col)
    }
}

impl std::fmt::Display for GridIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Edge-relative position: distance inward (`depth`) and position parallel
/// to the edge (`along`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeamCoord {
    along: u8,
    depth: u8,
}

impl SeamCoord {
    pub fn new(along: usize, depth: usize) -> Result<Self, TopologyError> {
        if along < GRID_ORDER && depth < GRID_ORDER {
            Ok(Self::at(along, depth))
        } else {
            Err(TopologyError::InvalidIndex {
                row: depth,
                col: along,
            })
        }
    }

    #[inline]
    pub(crate) const fn at(along: usize, depth: usize) -> Self {
        Self {
            along: along as u8,
            depth: depth as u8,
        }
    }

    #[inline]
    pub const fn along(self) -> usize {
        self.along as usize
    }

    #[inline]
    pub const fn depth(self) -> usize {
        self.depth as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(GridIndex::new(3, 3).is_ok());
        assert_eq!(
            GridIndex::new(4, 0),
            Err(TopologyError::InvalidIndex { row: 4, col: 0 })
        );
        assert!(GridIndex::try_from((0, 7)).is_err());
        assert!(SeamCoord::new(2, 4).is_err());
    }

    #[test]
    fn flat_round_trip() {
        for (i, idx) in GridIndex::all().enumerate() {
            assert_eq!(idx.flat(), i);
            assert_eq!(GridIndex::from_flat(i), Some(idx));
        }
        assert_eq!(GridIndex::all().count(), 16);
        assert_eq!(GridIndex::from_flat(16), None);
    }

    #[test]
    fn seam_coord_round_trip() {
        for edge in Direction::EDGES {
            for idx in GridIndex::all() {
                let coord = idx.seam_coord(edge).unwrap();
                assert_eq!(GridIndex::from_seam(edge, coord), Some(idx));
            }
        }
        assert_eq!(GridIndex::at(0, 0).seam_coord(Direction::NE), None);
    }

    #[test]
    fn boundary_has_depth_zero() {
        let south = GridIndex::at(3, 2).seam_coord(Direction::S).unwrap();
        assert_eq!((south.along(), south.depth()), (2, 0));

        let east = GridIndex::at(1, 2).seam_coord(Direction::E).unwrap();
        assert_eq!((east.along(), east.depth()), (1, 1));

        let boundary = GridIndex::all().filter(|i| i.is_boundary()).count();
        assert_eq!(boundary, 12);
        let corners = GridIndex::all().filter(|i| i.is_corner()).count();
        assert_eq!(corners, 4);
    }
}
