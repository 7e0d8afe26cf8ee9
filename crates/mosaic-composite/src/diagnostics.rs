//! Continuity and symmetry reports.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Handle;

/// What failed to match across a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Shared boundary points differ (C0).
    Position,
    /// First interior points are not mirror images through the boundary (C1).
    Tangent,
    /// The link itself cannot be followed.
    Topology,
}

/// One mismatch between two linked nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityViolation<D> {
    pub node: Handle,
    pub slot: D,
    pub neighbour: Handle,
    /// Position along the seam (always 0 for arc joints and patch corners).
    pub along: usize,
    pub kind: ViolationKind,
    pub deviation: f64,
}

impl<D: fmt::Display> fmt::Display for ContinuityViolation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} mismatch between {} {} and {} at {}: {:e}",
            self.kind, self.node, self.slot, self.neighbour, self.along, self.deviation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompositeSurface, Direction};

    #[test]
    fn reports_survive_json() {
        let mut surface = CompositeSurface::new();
        let a = surface.insert_new_patch().unwrap();
        let b = surface.insert_new_patch().unwrap();
        let found = vec![ContinuityViolation {
            node: a,
            slot: Direction::E,
            neighbour: b,
            along: 2,
            kind: ViolationKind::Tangent,
            deviation: 0.25,
        }];
        let json = serde_json::to_string(&found).unwrap();
        assert!(json.contains("Tangent"));
        let back: Vec<ContinuityViolation<Direction>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, found);
    }
}
