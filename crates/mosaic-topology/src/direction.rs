//! Compass directions for patch slots and end markers for arc slots.
//!
//! Directions are ordered clockwise starting at north, so rotating by one
//! step alternates between edge and corner slots and rotating by four steps
//! gives the opposite slot.

use std::fmt;
use std::str::FromStr;

use crate::{GridIndex, TopologyError, LAST};

/// One of the 8 adjacency slots of a bicubic patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// North edge (row 0)
    N,
    /// North-east corner (0, 3)
    NE,
    /// East edge (column 3)
    E,
    /// South-east corner (3, 3)
    SE,
    /// South edge (row 3)
    S,
    /// South-west corner (3, 0)
    SW,
    /// West edge (column 0)
    W,
    /// North-west corner (0, 0)
    NW,
}

impl Direction {
    /// All slots in clockwise order.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// The four edge slots.
    pub const EDGES: [Self; 4] = [Self::N, Self::E, Self::S, Self::W];

    /// The four corner slots.
    pub const CORNERS: [Self; 4] = [Self::NE, Self::SE, Self::SW, Self::NW];

    /// Position in [`Direction::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Direction::index`].
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// The slot facing the other way.
    #[inline]
    pub const fn opposite(self) -> Self {
        self.rotate_cw(4)
    }

    /// Rotate clockwise by `steps` eighth-turns.
    #[inline]
    pub const fn rotate_cw(self, steps: usize) -> Self {
        Self::ALL[(self.index() + steps % 8) % 8]
    }

    /// Rotate counter-clockwise by `steps` eighth-turns.
    #[inline]
    pub const fn rotate_ccw(self, steps: usize) -> Self {
        Self::ALL[(self.index() + 8 - steps % 8) % 8]
    }

    /// Edge slots share a whole boundary row or column.
    #[inline]
    pub const fn is_edge(self) -> bool {
        self.index() % 2 == 0
    }

    /// Corner slots share a single corner point.
    #[inline]
    pub const fn is_corner(self) -> bool {
        !self.is_edge()
    }

    /// Position of an edge in [`Direction::EDGES`].
    pub(crate) const fn edge_slot(self) -> Option<usize> {
        if self.is_edge() {
            Some(self.index() / 2)
        } else {
            None
        }
    }

    /// Control net position of a corner slot.
    pub const fn corner_point(self) -> Option<GridIndex> {
        match self {
            Self::NE => Some(GridIndex::at(0, LAST)),
            Self::SE => Some(GridIndex::at(LAST, LAST)),
            Self::SW => Some(GridIndex::at(LAST, 0)),
            Self::NW => Some(GridIndex::at(0, 0)),
            _ => None,
        }
    }

    /// The corner slot whose point is `index`.
    pub const fn corner_at(index: GridIndex) -> Option<Self> {
        match (index.row(), index.col()) {
            (0, 3) => Some(Self::NE),
            (3, 3) => Some(Self::SE),
            (3, 0) => Some(Self::SW),
            (0, 0) => Some(Self::NW),
            _ => None,
        }
    }

    /// The two edges meeting at a corner, counter-clockwise one first.
    pub const fn corner_edges(self) -> Option<[Self; 2]> {
        if self.is_corner() {
            Some([self.rotate_ccw(1), self.rotate_cw(1)])
        } else {
            None
        }
    }

    /// The corners at `along == 0` and `along == 3` of an edge.
    pub const fn edge_corners(self) -> Option<[Self; 2]> {
        match self {
            Self::N => Some([Self::NW, Self::NE]),
            Self::E => Some([Self::NE, Self::SE]),
            Self::S => Some([Self::SW, Self::SE]),
            Self::W => Some([Self::NW, Self::SW]),
            _ => None,
        }
    }

    /// For a corner, the edge meeting it other than `edge`.
    pub const fn other_edge(self, edge: Self) -> Option<Self> {
        match self.corner_edges() {
            Some([a, b]) if a as usize == edge as usize => Some(b),
            Some([a, b]) if b as usize == edge as usize => Some(a),
            _ => None,
        }
    }

    /// Short upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let direction = match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Self::N,
            "ne" | "northeast" | "north-east" => Self::NE,
            "e" | "east" => Self::E,
            "se" | "southeast" | "south-east" => Self::SE,
            "s" | "south" => Self::S,
            "sw" | "southwest" | "south-west" => Self::SW,
            "w" | "west" => Self::W,
            "nw" | "northwest" | "north-west" => Self::NW,
            _ => return Err(TopologyError::UnknownDirection(s.to_string())),
        };
        Ok(direction)
    }
}

/// One of the 2 adjacency slots of a cubic arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum End {
    /// Start of the arc (point 0)
    Left,
    /// End of the arc (point 3)
    Right,
}

impl End {
    /// Both ends, left first.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Index of the end point in the control polygon.
    #[inline]
    pub const fn end_point(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => LAST,
        }
    }

    /// Distance of a polygon point from this end.
    #[inline]
    pub const fn depth_of(self, index: usize) -> usize {
        match self {
            Self::Left => index,
            Self::Right => LAST - index,
        }
    }

    /// Polygon point at `depth` from this end.
    #[inline]
    pub const fn point_at(self, depth: usize) -> usize {
        match self {
            Self::Left => depth,
            Self::Right => LAST - depth,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for End {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" | "prev" | "previous" => Ok(Self::Left),
            "r" | "right" | "next" => Ok(Self::Right),
            _ => Err(TopologyError::UnknownDirection(s.to_string())),
        }
    }
}
