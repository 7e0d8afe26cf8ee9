//! Composite bicubic surfaces.
//!
//! A [`CompositeSurface`] owns patches glued through 8 compass slots: four
//! edge slots sharing a boundary row or column, and four corner slots sharing
//! a single corner point. Every public operation stages its changes, runs the
//! evaluator on each touched patch, and only then commits.
//!
//! # Example
//!
//! ```
//! use mosaic_composite::{CompositeSurface, Direction, Point3};
//!
//! let mut surface = CompositeSurface::new();
//! let p0 = surface.insert_new_patch()?;
//! let p1 = surface.continue_existing_patch(p0, Direction::E)?;
//! surface.update_control_point(p0, 3, 3, Point3::new(9.0, 9.0, 9.0))?;
//! assert_eq!(surface.get_control_point(p1, 3, 0)?, Point3::new(9.0, 9.0, 9.0));
//! # Ok::<(), mosaic_composite::Error>(())
//! ```

mod diagnostics;
mod operators;
mod propagate;
mod resolver;
mod vertex;

use mosaic_topology::{Direction, GridIndex};
use tracing::{debug, warn};

use crate::diagnostics::ContinuityViolation;
use crate::network::{Link, Network};
use crate::staging::Staging;
use crate::{
    CompositeConfig, ControlGrid, Error, Evaluator, Handle, NullEvaluator, Point3, Result,
};

pub(crate) type SurfaceStage<'a, I> = Staging<'a, ControlGrid, Direction, I>;

/// Mesh of bicubic patches kept C1 across every edge seam.
pub struct CompositeSurface<E: Evaluator<ControlGrid> = NullEvaluator> {
    pub(crate) network: Network<ControlGrid, Direction, E>,
    pub(crate) config: CompositeConfig,
}

impl CompositeSurface<NullEvaluator> {
    pub fn new() -> Self {
        Self::with_config(CompositeConfig::default())
    }

    pub fn with_config(config: CompositeConfig) -> Self {
        Self::with_evaluator(config, NullEvaluator)
    }
}

impl Default for CompositeSurface<NullEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator<ControlGrid>> CompositeSurface<E> {
    pub fn with_evaluator(config: CompositeConfig, evaluator: E) -> Self {
        Self {
            network: Network::new(evaluator),
            config,
        }
    }

    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        self.network.evaluator()
    }

    pub fn node_count(&self) -> usize {
        self.network.len()
    }

    pub fn is_empty(&self) -> bool {
        self.network.len() == 0
    }

    /// Handles in insertion order.
    pub fn handles(&self) -> Vec<Handle> {
        self.network.handles()
    }

    /// Handle of the patch at a backing position (as used by the text format).
    pub fn handle_at(&self, position: usize) -> Option<Handle> {
        self.network.handle_at(position)
    }

    pub fn grid(&self, node: Handle) -> Result<&ControlGrid> {
        Ok(&self.network.node(node)?.grid)
    }

    /// The evaluator's output for the patch's current control net.
    pub fn image(&self, node: Handle) -> Result<&E::Image> {
        Ok(&self.network.node(node)?.image)
    }

    pub fn get_control_point(&self, node: Handle, row: usize, col: usize) -> Result<Point3> {
        self.grid(node)?.get(row, col)
    }

    pub fn neighbour(&self, node: Handle, slot: Direction) -> Result<Option<Link<Direction>>> {
        self.network.link(node, slot)
    }

    pub fn neighbours(&self, node: Handle) -> Result<Vec<(Direction, Link<Direction>)>> {
        self.network.links(node)
    }

    /// The neighbour across `slot` and its position matching ours.
    pub fn resolve_symmetric_index(
        &self,
        node: Handle,
        slot: Direction,
        row: usize,
        col: usize,
    ) -> Result<(Link<Direction>, GridIndex)> {
        let index = GridIndex::new(row, col)?;
        resolver::resolve(&self.network.stage(), node, slot, index)
    }

    /// Stage `op`, evaluate and commit. Returns the op's output and the
    /// number of patches committed.
    fn staged<T>(
        &mut self,
        op: impl FnOnce(&mut SurfaceStage<'_, E::Image>) -> Result<T>,
    ) -> Result<(T, usize)> {
        let mut stage = self.network.stage();
        let output = op(&mut stage)?;
        let changes = stage.finish();
        let touched = self.network.commit(changes)?;
        Ok((output, touched.len()))
    }

    fn require_free(&self, node: Handle, slot: Direction) -> Result<()> {
        if self.network.link(node, slot)?.is_some() {
            warn!(node = %node, slot = %slot, "slot already connected");
            return Err(Error::AlreadyConnected {
                node,
                direction: slot.as_str(),
            });
        }
        Ok(())
    }

    /// Append an isolated patch with the template net.
    pub fn insert_new_patch(&mut self) -> Result<Handle> {
        let (node, _) = self.staged(|stage| Ok(stage.create(ControlGrid::template())))?;
        debug!(node = %node, "inserted patch");
        Ok(node)
    }

    /// Append a patch across `slot` of `node`, C1 for edge slots and sharing
    /// the corner point for corner slots.
    pub fn continue_existing_patch(&mut self, node: Handle, slot: Direction) -> Result<Handle> {
        self.require_free(node, slot)?;
        let (created, _) =
            self.staged(|stage| operators::continue_patch(stage, node, slot))?;
        debug!(node = %node, slot = %slot, created = %created, "continued patch");
        Ok(created)
    }

    /// Connect `a` and `b` through a new bridge patch. Edge slots only.
    pub fn join_existing_patches(
        &mut self,
        a: Handle,
        slot_a: Direction,
        b: Handle,
        slot_b: Direction,
    ) -> Result<Handle> {
        if !slot_a.is_edge() || !slot_b.is_edge() {
            warn!(%slot_a, %slot_b, "join needs two edge slots");
            return Err(Error::InvalidTopology(format!(
                "join needs two edge slots, got {slot_a} and {slot_b}"
            )));
        }
        if a == b && slot_a == slot_b {
            return Err(Error::InvalidTopology(format!(
                "cannot join {a} {slot_a} to itself"
            )));
        }
        self.require_free(a, slot_a)?;
        self.require_free(b, slot_b)?;

        let (bridge, _) =
            self.staged(|stage| operators::join_patches(stage, a, slot_a, b, slot_b))?;
        debug!(%a, %slot_a, %b, %slot_b, bridge = %bridge, "joined patches");
        Ok(bridge)
    }

    /// Glue `a` and `b` directly, averaging the shared boundary and carrying
    /// the new corner values around both seam-end vertices.
    pub fn merge_existing_patches(
        &mut self,
        a: Handle,
        slot_a: Direction,
        b: Handle,
        slot_b: Direction,
    ) -> Result<()> {
        if slot_a.is_edge() != slot_b.is_edge() {
            warn!(%slot_a, %slot_b, "merge needs two edges or two corners");
            return Err(Error::InvalidTopology(format!(
                "cannot merge {slot_a} with {slot_b}: edges meet edges and corners meet corners"
            )));
        }
        if a == b && !(slot_a.is_edge() && slot_b == slot_a.opposite()) {
            warn!(node = %a, %slot_a, %slot_b, "self merge needs opposite edges");
            return Err(Error::InvalidTopology(format!(
                "{a} can only be merged with itself through opposite edges"
            )));
        }
        self.require_free(a, slot_a)?;
        self.require_free(b, slot_b)?;

        let max_hops = self.config.max_vertex_hops();
        let (_, touched) = self.staged(|stage| {
            operators::merge_patches(stage, a, slot_a, b, slot_b, max_hops)
        })?;
        debug!(%a, %slot_a, %b, %slot_b, touched, "merged patches");
        Ok(())
    }

    pub fn update_control_point(
        &mut self,
        node: Handle,
        row: usize,
        col: usize,
        value: Point3,
    ) -> Result<()> {
        self.update_control_points(node, &[(row, col, value)])
    }

    /// Assign several points of one patch in a single pass.
    pub fn update_control_points(
        &mut self,
        node: Handle,
        edits: &[(usize, usize, Point3)],
    ) -> Result<()> {
        let edits = edits
            .iter()
            .map(|&(row, col, value)| -> Result<(GridIndex, Point3)> {
                Ok((GridIndex::new(row, col)?, value))
            })
            .collect::<Result<Vec<_>>>()?;
        self.network.node(node)?;

        let (reached, touched) =
            self.staged(|stage| propagate::propagate(stage, node, &edits))?;
        debug!(node = %node, edits = edits.len(), reached, touched, "updated control points");
        Ok(())
    }

    /// Move a whole patch by `delta` and carry the move across its seams.
    pub fn translate_patch(&mut self, node: Handle, delta: Point3) -> Result<()> {
        let edits: Vec<_> = self
            .grid(node)?
            .iter()
            .map(|(index, point)| (index, point + delta))
            .collect();
        let (reached, _) = self.staged(|stage| propagate::propagate(stage, node, &edits))?;
        debug!(node = %node, reached, "translated patch");
        Ok(())
    }

    /// Every C0/C1 mismatch above `tolerance`, each link reported once.
    pub fn continuity_violations(&self, tolerance: f64) -> Vec<ContinuityViolation<Direction>> {
        diagnostics::continuity_violations(&self.network, tolerance)
    }

    /// Links whose neighbour does not point back.
    pub fn symmetry_violations(&self) -> Vec<(Handle, Direction)> {
        self.network.symmetry_violations()
    }

    /// Drop every patch. Existing handles become invalid.
    pub fn clear(&mut self) {
        self.network.clear();
    }
}
