//! Mosaic Mesh Topology
//!
//! Index algebra for composite Bézier meshes: which slot points where, and how
//! a control point on one side of a shared boundary finds its partner on the
//! other side.
//!
//! # Conventions
//!
//! A bicubic patch owns a 4×4 control net. Row 0 is its north boundary, row 3
//! its south boundary, column 0 its west boundary and column 3 its east
//! boundary. Each patch has 8 adjacency slots:
//! - 4 edge slots (N, E, S, W) sharing a whole boundary row/column
//! - 4 corner slots (NE, SE, SW, NW) sharing a single corner point
//!
//! A cubic arc owns 4 control points and has 2 slots (left and right end).
//!
//! # Seams
//!
//! Two patches may be glued through *any* pair of edges, so the neighbour's
//! net can be rotated or reflected relative to ours. Every position is
//! described relative to an edge as `(along, depth)`; gluing keeps both
//! coordinates. The resulting 16 affine index maps are computed at compile
//! time, see [`IndexMap::seam`].

mod direction;
mod index;
mod seam;

pub use direction::{Direction, End};
pub use index::{GridIndex, SeamCoord, GRID_ORDER, LAST};
pub use seam::{resolve_end, resolve_seam, IndexMap};

use thiserror::Error;

/// Adjacency slots per surface patch.
pub const SURFACE_SLOTS: usize = 8;

/// Edge slots per surface patch.
pub const EDGE_SLOTS: usize = 4;

/// Corner slots per surface patch.
pub const CORNER_SLOTS: usize = 4;

/// Adjacency slots per curve arc.
pub const CURVE_SLOTS: usize = 2;

const _: () = assert!(EDGE_SLOTS + CORNER_SLOTS == SURFACE_SLOTS);

/// Errors produced by the index algebra.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Row or column outside the 4×4 control net.
    #[error("grid index ({row}, {col}) is outside the 4x4 control net")]
    InvalidIndex { row: usize, col: usize },

    /// Point index outside the 4-point control polygon.
    #[error("point index {index} is outside the 4-point control polygon")]
    InvalidPointIndex { index: usize },

    /// An edge slot glued to a corner slot (or the reverse).
    #[error("cannot glue {out} to {back}: edges only meet edges and corners only meet corners")]
    IncompatibleSeam { out: Direction, back: Direction },

    /// Only the corner point itself crosses a corner seam.
    #[error("({row}, {col}) is not the {corner} corner point")]
    NotOnCorner { corner: Direction, row: usize, col: usize },

    /// Text that names no direction.
    #[error("unknown direction `{0}`")]
    UnknownDirection(String),
}
