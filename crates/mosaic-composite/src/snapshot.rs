//! JSON snapshots of whole networks.
//!
//! Unlike the text format a snapshot records the back slot of every link,
//! so two nodes joined through more than one pair of slots come back
//! exactly as they were.

use mosaic_topology::{Direction, End};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::network::Network;
use crate::{
    CompositeConfig, CompositeCurve, CompositeSurface, ControlGrid, ControlPolygon, Evaluator,
    Result,
};

/// One link by backing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord<D> {
    pub slot: D,
    pub node: usize,
    pub back: D,
}

/// A node's control net and its present links in slot order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord<G, D> {
    pub net: G,
    pub links: Vec<LinkRecord<D>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<G, D> {
    pub config: CompositeConfig,
    pub nodes: Vec<NodeRecord<G, D>>,
}

pub type SurfaceSnapshot = Snapshot<ControlGrid, Direction>;

pub type CurveSnapshot = Snapshot<ControlPolygon, End>;

impl<E: Evaluator<ControlGrid>> CompositeSurface<E> {
    pub fn snapshot(&self) -> SurfaceSnapshot {
        Snapshot {
            config: self.config.clone(),
            nodes: self.network.export(),
        }
    }

    /// Rebuild a surface, evaluating every patch once.
    pub fn from_snapshot(snapshot: SurfaceSnapshot, evaluator: E) -> Result<Self> {
        let network = Network::import(evaluator, snapshot.nodes)?;
        debug!(patches = network.len(), "restored surface snapshot");
        Ok(Self {
            network,
            config: snapshot.config,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str, evaluator: E) -> Result<Self> {
        Self::from_snapshot(serde_json::from_str(json)?, evaluator)
    }
}

impl<E: Evaluator<ControlPolygon>> CompositeCurve<E> {
    pub fn snapshot(&self) -> CurveSnapshot {
        Snapshot {
            config: self.config.clone(),
            nodes: self.network.export(),
        }
    }

    pub fn from_snapshot(snapshot: CurveSnapshot, evaluator: E) -> Result<Self> {
        let network = Network::import(evaluator, snapshot.nodes)?;
        debug!(arcs = network.len(), "restored curve snapshot");
        Ok(Self {
            network,
            config: snapshot.config,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str, evaluator: E) -> Result<Self> {
        Self::from_snapshot(serde_json::from_str(json)?, evaluator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NullEvaluator, Point3};

    #[test]
    fn double_link_survives_json() {
        // A 1x2 strip closed into a tube links the two patches twice
        let mut surface = CompositeSurface::new();
        let a = surface.insert_new_patch().unwrap();
        let b = surface.continue_existing_patch(a, Direction::E).unwrap();
        surface
            .merge_existing_patches(b, Direction::E, a, Direction::W)
            .unwrap();

        let json = surface.to_json().unwrap();
        let restored = CompositeSurface::from_json(&json, NullEvaluator).unwrap();
        assert_eq!(restored.snapshot(), surface.snapshot());
        assert!(restored.symmetry_violations().is_empty());
    }

    #[test]
    fn curve_snapshot_keeps_points() {
        let mut curve = CompositeCurve::new();
        let a = curve.insert_new_arc().unwrap();
        curve.continue_existing_arc(a, End::Left).unwrap();
        curve
            .update_control_point(a, 2, Point3::new(0.1, 0.2, 0.3))
            .unwrap();
        let restored = CompositeCurve::from_json(&curve.to_json().unwrap(), NullEvaluator).unwrap();
        assert_eq!(restored.snapshot(), curve.snapshot());
    }
}
