//! Mosaic Composite Networks
//!
//! C1-continuous composite Bézier surfaces and curves.
//!
//! A composite network is a set of nodes (bicubic patches or cubic arcs)
//! glued through adjacency slots. Every edit to a control point is carried
//! across the seams so that neighbouring nodes keep sharing their boundary
//! (C0) and keep mirrored first interior rows (C1):
//!
//! ```text
//! interior_B = 2 * shared - interior_A
//! ```
//!
//! # Structure
//!
//! - [`CompositeSurface`]: patches with 8 compass slots, structural operators
//!   (insert, continue, join, merge), continuity propagation and vertex star
//!   repair
//! - [`CompositeCurve`]: the same for arcs with a left and a right end
//! - [`Evaluator`]: hook regenerating each touched node's image
//!
//! Nodes live in an append-only [`Arena`] and are addressed by generational
//! [`Handle`]s. Every public call stages its writes and commits them only
//! after all touched nodes evaluated successfully, so a failing call leaves
//! the network unchanged.
//!
//! # Persistence
//!
//! Networks load from and save to a whitespace-delimited text format, and to
//! JSON [`Snapshot`]s that also record back slots.

mod arena;
mod config;
mod curve;
mod diagnostics;
mod error;
mod evaluator;
mod grid;
mod io;
mod network;
mod point;
mod snapshot;
mod staging;
mod surface;

pub use arena::{Arena, Handle};
pub use config::{
    CompositeConfig, DEFAULT_CURVE_DERIVATIVE_ORDER, DEFAULT_CURVE_DIV_POINTS, DEFAULT_ISO_LINES,
    DEFAULT_TOLERANCE, DEFAULT_VERTEX_VALENCE,
};
pub use curve::CompositeCurve;
pub use diagnostics::{ContinuityViolation, ViolationKind};
pub use error::{Error, Result};
pub use evaluator::{EvaluationError, Evaluator, NullEvaluator};
pub use grid::{ControlGrid, ControlPolygon};
pub use network::Link;
pub use point::Point3;
pub use snapshot::{CurveSnapshot, LinkRecord, NodeRecord, Snapshot, SurfaceSnapshot};
pub use surface::CompositeSurface;

pub use mosaic_topology::{Direction, End, GridIndex};
