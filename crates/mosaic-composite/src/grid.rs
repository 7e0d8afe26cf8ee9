//! Control nets: the 4×4 grid of a bicubic patch and the 4-point polygon of
//! a cubic arc. Pure values; adjacency lives elsewhere.

use mosaic_topology::{GridIndex, TopologyError, GRID_ORDER, LAST};
use serde::{Deserialize, Serialize};

use crate::{Point3, Result};

/// 4×4 control points of a bicubic Bézier patch, indexed `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlGrid {
    points: [[Point3; GRID_ORDER]; GRID_ORDER],
}

impl ControlGrid {
    pub const fn new(points: [[Point3; GRID_ORDER]; GRID_ORDER]) -> Self {
        Self { points }
    }

    /// Flat 4×4 patch in the z = 0 plane, rows along x and columns along y,
    /// both spanning −2..1.
    pub fn template() -> Self {
        let mut points = [[Point3::ZERO; GRID_ORDER]; GRID_ORDER];
        for (i, row) in points.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                *p = Point3::new(i as f64 - 2.0, j as f64 - 2.0, 0.0);
            }
        }
        Self { points }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Point3> {
        Ok(self.at(GridIndex::new(row, col)?))
    }

    pub fn set(&mut self, row: usize, col: usize, value: Point3) -> Result<()> {
        self.set_at(GridIndex::new(row, col)?, value);
        Ok(())
    }

    #[inline]
    pub fn at(&self, index: GridIndex) -> Point3 {
        self.points[index.row()][index.col()]
    }

    #[inline]
    pub fn set_at(&mut self, index: GridIndex, value: Point3) {
        self.points[index.row()][index.col()] = value;
    }

    pub fn rows(&self) -> &[[Point3; GRID_ORDER]; GRID_ORDER] {
        &self.points
    }

    /// Points in row-major order with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (GridIndex, Point3)> + '_ {
        GridIndex::all().map(move |idx| (idx, self.at(idx)))
    }

    pub fn translate(&mut self, delta: Point3) {
        for p in self.points.iter_mut().flatten() {
            *p += delta;
        }
    }

    /// Bit-level equality, used to check that rejected edits left a grid untouched.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.iter().all(|(idx, p)| p.bit_eq(other.at(idx)))
    }
}

impl Default for ControlGrid {
    fn default() -> Self {
        Self::template()
    }
}

/// 4 control points of a cubic Bézier arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPolygon {
    points: [Point3; GRID_ORDER],
}

impl ControlPolygon {
    pub const fn new(points: [Point3; GRID_ORDER]) -> Self {
        Self { points }
    }

    pub fn template() -> Self {
        Self::new([
            Point3::new(0.0, 1.0, 2.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    pub fn get(&self, index: usize) -> Result<Point3> {
        self.points
            .get(index)
            .copied()
            .ok_or_else(|| TopologyError::InvalidPointIndex { index }.into())
    }

    pub fn set(&mut self, index: usize, value: Point3) -> Result<()> {
        if index > LAST {
            return Err(TopologyError::InvalidPointIndex { index }.into());
        }
        self.points[index] = value;
        Ok(())
    }

    /// Unchecked access for indices produced by the end algebra.
    #[inline]
    pub(crate) fn at(&self, index: usize) -> Point3 {
        self.points[index]
    }

    #[inline]
    pub(crate) fn set_at(&mut self, index: usize, value: Point3) {
        self.points[index] = value;
    }

    pub fn points(&self) -> &[Point3; GRID_ORDER] {
        &self.points
    }

    pub fn translate(&mut self, delta: Point3) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    pub fn bit_eq(&self, other: &Self) -> bool {
        self.points
            .iter()
            .zip(other.points.iter())
            .all(|(a, b)| a.bit_eq(*b))
    }
}

impl Default for ControlPolygon {
    fn default() -> Self {
        Self::template()
    }
}
