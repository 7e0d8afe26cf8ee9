//! Cascading control point edits across patch seams.
//!
//! An edit at one patch is turned into a batch of positions, applied, and
//! every seam touched by the batch produces a batch for the neighbour:
//! boundary points are copied and the first interior line is mirrored
//! through the boundary (`2·shared − interior`). A pass visits each patch at
//! most once, so closed rings terminate.

use std::collections::BTreeMap;

use mosaic_topology::{resolve_seam, Direction, GridIndex};
use tracing::trace;

use super::resolver::seam_point;
use super::SurfaceStage;
use crate::staging::spread;
use crate::{Handle, Point3, Result};

type Batch = crate::staging::Batch<GridIndex>;

/// Apply `edits` at `origin` and cascade. Returns the number of patches reached.
pub(crate) fn propagate<I>(
    stage: &mut SurfaceStage<'_, I>,
    origin: Handle,
    edits: &[(GridIndex, Point3)],
) -> Result<usize> {
    let batch = with_followers(stage, origin, edits)?;
    spread(stage, origin, batch, apply::<I>)
}

/// Boundary points on a connected edge drag their depth-1 partner along, so
/// the tangent handle moves rigidly with the point it hangs off. Explicit
/// edits always win.
fn with_followers<I>(
    stage: &SurfaceStage<'_, I>,
    origin: Handle,
    edits: &[(GridIndex, Point3)],
) -> Result<Batch> {
    let grid = *stage.grid(origin)?;
    let mut connected = Vec::with_capacity(Direction::EDGES.len());
    for edge in Direction::EDGES {
        if stage.neighbour(origin, edge)?.is_some() {
            connected.push(edge);
        }
    }

    let mut batch: Batch = edits.iter().copied().collect();
    let mut work: Vec<GridIndex> = batch.keys().copied().collect();
    while let Some(index) = work.pop() {
        let Some(&target) = batch.get(&index) else {
            continue;
        };
        let delta = target - grid.at(index);
        for &edge in &connected {
            let Some(coord) = index.seam_coord(edge) else {
                continue;
            };
            if coord.depth() != 0 {
                continue;
            }
            let partner = seam_point(edge, coord.along(), 1)?;
            if !batch.contains_key(&partner) {
                batch.insert(partner, grid.at(partner) + delta);
                work.push(partner);
            }
        }
    }
    Ok(batch)
}

/// Write `batch` into `node` and derive the batch each neighbour needs.
fn apply<I>(
    stage: &mut SurfaceStage<'_, I>,
    node: Handle,
    batch: &Batch,
) -> Result<BTreeMap<Handle, Batch>> {
    let grid = {
        let grid = stage.grid_mut(node)?;
        for (&index, &value) in batch {
            grid.set_at(index, value);
        }
        *grid
    };
    trace!(node = %node, points = batch.len(), "applied batch");

    let mut pending: BTreeMap<Handle, Batch> = BTreeMap::new();
    for &index in batch.keys() {
        for edge in Direction::EDGES {
            let Some(coord) = index.seam_coord(edge) else {
                continue;
            };
            if coord.depth() > 1 {
                continue;
            }
            let Some(link) = stage.neighbour(node, edge)? else {
                continue;
            };
            let boundary = seam_point(edge, coord.along(), 0)?;
            let interior = seam_point(edge, coord.along(), 1)?;
            let shared = grid.at(boundary);
            let out = pending.entry(link.node).or_default();
            out.insert(resolve_seam(edge, link.back, boundary)?, shared);
            out.insert(
                resolve_seam(edge, link.back, interior)?,
                grid.at(interior).reflect(shared),
            );
        }

        let Some(corner) = Direction::corner_at(index) else {
            continue;
        };
        if let Some(link) = stage.neighbour(node, corner)? {
            pending
                .entry(link.node)
                .or_default()
                .insert(resolve_seam(corner, link.back, index)?, grid.at(index));
        }
    }
    Ok(pending)
}
