//! Structural operators: continue, join and merge.
//!
//! All of them work on a staging overlay; preconditions are checked by the
//! caller before anything is staged.

use mosaic_topology::{Direction, GridIndex, GRID_ORDER, LAST};

use super::resolver::seam_point;
use super::vertex::walk_vertex;
use super::SurfaceStage;
use crate::{ControlGrid, Error, Handle, Point3, Result};

/// Four collinear, equally spaced points starting at `first`, `second`.
fn extrapolate(first: Point3, second: Point3) -> [Point3; GRID_ORDER] {
    let third = first.reflect(second);
    let fourth = second.reflect(third);
    [first, second, third, fourth]
}

/// Write the boundary line and mirrored first interior line that make
/// `edge` of `target` C1 with `edge_src` of `source`.
fn mirror_seam(
    target: &mut ControlGrid,
    edge: Direction,
    source: &ControlGrid,
    edge_src: Direction,
) -> Result<()> {
    for along in 0..GRID_ORDER {
        let shared = source.at(seam_point(edge_src, along, 0)?);
        let interior = source.at(seam_point(edge_src, along, 1)?);
        target.set_at(seam_point(edge, along, 0)?, shared);
        target.set_at(seam_point(edge, along, 1)?, interior.reflect(shared));
    }
    Ok(())
}

/// New patch across `slot` of `node`.
///
/// Edge slots extend every line crossing the seam by repeated reflection.
/// Corner slots mirror the whole net through the corner point, which only
/// makes the two patches share that point.
pub(crate) fn continue_patch<I>(
    stage: &mut SurfaceStage<'_, I>,
    node: Handle,
    slot: Direction,
) -> Result<Handle> {
    let source = *stage.grid(node)?;
    let back = slot.opposite();
    let mut fresh = ControlGrid::template();

    if slot.is_edge() {
        for along in 0..GRID_ORDER {
            let shared = source.at(seam_point(slot, along, 0)?);
            let interior = source.at(seam_point(slot, along, 1)?);
            let line = extrapolate(shared, interior.reflect(shared));
            for (depth, point) in line.into_iter().enumerate() {
                fresh.set_at(seam_point(back, along, depth)?, point);
            }
        }
    } else {
        let pivot = slot
            .corner_point()
            .map(|index| source.at(index))
            .ok_or_else(|| Error::InvalidTopology(format!("{slot} is not a corner slot")))?;
        for (index, point) in source.iter() {
            let mirrored = GridIndex::new(LAST - index.row(), LAST - index.col())?;
            fresh.set_at(mirrored, point.reflect(pivot));
        }
    }

    let created = stage.create(fresh);
    stage.connect(node, slot, created, back)?;
    Ok(created)
}

/// Bridge patch whose north edge continues `a` across `slot_a` and whose
/// south edge continues `b` across `slot_b`.
pub(crate) fn join_patches<I>(
    stage: &mut SurfaceStage<'_, I>,
    a: Handle,
    slot_a: Direction,
    b: Handle,
    slot_b: Direction,
) -> Result<Handle> {
    let grid_a = *stage.grid(a)?;
    let grid_b = *stage.grid(b)?;
    let mut bridge = ControlGrid::template();
    mirror_seam(&mut bridge, Direction::N, &grid_a, slot_a)?;
    mirror_seam(&mut bridge, Direction::S, &grid_b, slot_b)?;

    let created = stage.create(bridge);
    stage.connect(created, Direction::N, a, slot_a)?;
    stage.connect(created, Direction::S, b, slot_b)?;
    Ok(created)
}

/// Glue `a` and `b` directly and repair the vertices at the ends of the
/// new seam.
///
/// Edge seams move the shared boundary to the midpoint of the two first
/// interior lines, which makes the seam C1 without touching any interior
/// point. Corner seams move both corners to their midpoint.
pub(crate) fn merge_patches<I>(
    stage: &mut SurfaceStage<'_, I>,
    a: Handle,
    slot_a: Direction,
    b: Handle,
    slot_b: Direction,
    max_hops: usize,
) -> Result<()> {
    let grid_a = *stage.grid(a)?;
    let grid_b = *stage.grid(b)?;
    let mut vertices = Vec::with_capacity(2);

    if slot_a.is_edge() {
        for along in 0..GRID_ORDER {
            let index_a = seam_point(slot_a, along, 0)?;
            let index_b = seam_point(slot_b, along, 0)?;
            let inner_a = grid_a.at(seam_point(slot_a, along, 1)?);
            let inner_b = grid_b.at(seam_point(slot_b, along, 1)?);
            let shared = inner_a.midpoint(inner_b);
            stage.grid_mut(a)?.set_at(index_a, shared);
            stage.grid_mut(b)?.set_at(index_b, shared);

            if along == 0 || along == LAST {
                let corner_a = Direction::corner_at(index_a);
                let corner_b = Direction::corner_at(index_b);
                if let (Some(corner_a), Some(corner_b)) = (corner_a, corner_b) {
                    vertices.push((corner_a, corner_b, shared));
                }
            }
        }
    } else {
        let (Some(index_a), Some(index_b)) = (slot_a.corner_point(), slot_b.corner_point()) else {
            return Err(Error::InvalidTopology(format!(
                "cannot merge {slot_a} with {slot_b}"
            )));
        };
        let shared = grid_a.at(index_a).midpoint(grid_b.at(index_b));
        stage.grid_mut(a)?.set_at(index_a, shared);
        stage.grid_mut(b)?.set_at(index_b, shared);
        vertices.push((slot_a, slot_b, shared));
    }

    stage.connect(a, slot_a, b, slot_b)?;

    for (corner_a, corner_b, value) in vertices {
        walk_vertex(stage, [(a, corner_a), (b, corner_b)], value, max_hops)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrapolation_is_evenly_spaced() {
        let line = extrapolate(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 0.0));
        assert_eq!(line[2], Point3::new(2.0, 4.0, 0.0));
        assert_eq!(line[3], Point3::new(3.0, 6.0, 0.0));
    }

    #[test]
    fn mirror_seam_copies_and_reflects() {
        let source = ControlGrid::template();
        let mut target = ControlGrid::template();
        mirror_seam(&mut target, Direction::N, &source, Direction::S).unwrap();
        for col in 0..GRID_ORDER {
            assert_eq!(target.get(0, col).unwrap(), source.get(3, col).unwrap());
            let expected = source.get(2, col).unwrap().reflect(source.get(3, col).unwrap());
            assert_eq!(target.get(1, col).unwrap(), expected);
        }
    }
}
