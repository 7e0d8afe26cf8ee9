//! Continuity checks over every patch link.

use mosaic_topology::{resolve_seam, Direction, GRID_ORDER};

use super::resolver::seam_point;
use crate::diagnostics::{ContinuityViolation, ViolationKind};
use crate::network::Network;
use crate::{ControlGrid, Evaluator, Result};

pub(crate) fn continuity_violations<E: Evaluator<ControlGrid>>(
    network: &Network<ControlGrid, Direction, E>,
    tolerance: f64,
) -> Vec<ContinuityViolation<Direction>> {
    let mut found = Vec::new();
    for node in network.handles() {
        let Ok(links) = network.links(node) else {
            continue;
        };
        for (slot, link) in links {
            // Each link is reported from its lower side only
            if (node, slot) > (link.node, link.back) {
                continue;
            }
            let violation = |along, kind, deviation| ContinuityViolation {
                node,
                slot,
                neighbour: link.node,
                along,
                kind,
                deviation,
            };
            let (Ok(ours), Ok(theirs)) = (network.node(node), network.node(link.node)) else {
                found.push(violation(0, ViolationKind::Topology, f64::INFINITY));
                continue;
            };
            match check_link(&ours.grid, &theirs.grid, slot, link.back, tolerance) {
                Ok(mismatches) => found.extend(
                    mismatches
                        .into_iter()
                        .map(|(along, kind, deviation)| violation(along, kind, deviation)),
                ),
                Err(_) => found.push(violation(0, ViolationKind::Topology, f64::INFINITY)),
            }
        }
    }
    found
}

fn check_link(
    ours: &ControlGrid,
    theirs: &ControlGrid,
    slot: Direction,
    back: Direction,
    tolerance: f64,
) -> Result<Vec<(usize, ViolationKind, f64)>> {
    let mut mismatches = Vec::new();
    if slot.is_corner() {
        if let Some(pivot) = slot.corner_point() {
            let deviation = ours.at(pivot).distance(theirs.at(resolve_seam(slot, back, pivot)?));
            if deviation > tolerance {
                mismatches.push((0, ViolationKind::Position, deviation));
            }
        }
        return Ok(mismatches);
    }

    for along in 0..GRID_ORDER {
        let boundary = seam_point(slot, along, 0)?;
        let interior = seam_point(slot, along, 1)?;
        let shared = ours.at(boundary);
        let position = shared.distance(theirs.at(resolve_seam(slot, back, boundary)?));
        if position > tolerance {
            mismatches.push((along, ViolationKind::Position, position));
        }
        let mirrored = ours.at(interior).reflect(shared);
        let tangent = mirrored.distance(theirs.at(resolve_seam(slot, back, interior)?));
        if tangent > tolerance {
            mismatches.push((along, ViolationKind::Tangent, tangent));
        }
    }
    Ok(mismatches)
}
