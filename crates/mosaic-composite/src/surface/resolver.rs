//! Index resolution across patch seams.

use mosaic_topology::{resolve_seam, Direction, GridIndex, SeamCoord};

use super::SurfaceStage;
use crate::network::Link;
use crate::{Error, Handle, Result};

/// Position at `(along, depth)` relative to an edge slot.
pub(crate) fn seam_point(edge: Direction, along: usize, depth: usize) -> Result<GridIndex> {
    GridIndex::from_seam(edge, SeamCoord::new(along, depth)?)
        .ok_or_else(|| Error::InvalidTopology(format!("{edge} is not an edge slot")))
}

/// The neighbour through `slot` and its position matching our `index`.
///
/// Fails with `InvalidTopology` when the slot is empty, when the neighbour
/// does not point back, or when `index` does not cross a corner seam.
pub(crate) fn resolve<I>(
    stage: &SurfaceStage<'_, I>,
    node: Handle,
    slot: Direction,
    index: GridIndex,
) -> Result<(Link<Direction>, GridIndex)> {
    let link = stage
        .neighbour(node, slot)?
        .ok_or_else(|| Error::InvalidTopology(format!("{node} has no neighbour towards {slot}")))?;
    Ok((link, resolve_seam(slot, link.back, index)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompositeSurface, Point3};

    #[test]
    fn seam_points_follow_edge_frames() {
        assert_eq!(seam_point(Direction::E, 2, 1).unwrap(), GridIndex::new(2, 2).unwrap());
        assert_eq!(seam_point(Direction::S, 0, 0).unwrap(), GridIndex::new(3, 0).unwrap());
        assert!(matches!(
            seam_point(Direction::NE, 0, 0),
            Err(Error::InvalidTopology(_))
        ));
        assert!(matches!(
            seam_point(Direction::N, 4, 0),
            Err(Error::InvalidIndex(_))
        ));
    }

    #[test]
    fn resolves_across_flipped_merge() {
        let mut surface = CompositeSurface::new();
        let a = surface.insert_new_patch().unwrap();
        let b = surface.insert_new_patch().unwrap();
        surface
            .update_control_point(b, 1, 1, Point3::new(5.0, 5.0, 5.0))
            .unwrap();
        surface
            .merge_existing_patches(a, Direction::E, b, Direction::N)
            .unwrap();

        // along = row on our east edge, along = column on their north edge
        let (link, index) = surface
            .resolve_symmetric_index(a, Direction::E, 2, 3)
            .unwrap();
        assert_eq!(link.node, b);
        assert_eq!(link.back, Direction::N);
        assert_eq!(index, GridIndex::new(0, 2).unwrap());
    }

    #[test]
    fn empty_slot_is_invalid_topology() {
        let mut surface = CompositeSurface::new();
        let a = surface.insert_new_patch().unwrap();
        assert!(matches!(
            surface.resolve_symmetric_index(a, Direction::W, 0, 0),
            Err(Error::InvalidTopology(_))
        ));
    }
}
