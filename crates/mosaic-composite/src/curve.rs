//! Composite cubic curves.
//!
//! The 1-D analogue of [`CompositeSurface`](crate::CompositeSurface): arcs of
//! four control points joined end to end through a left and a right slot.
//! At a joint the end points coincide and the second points are mirror
//! images through them.

use std::collections::BTreeMap;

use mosaic_topology::{resolve_end, End, GRID_ORDER};
use tracing::{debug, trace, warn};

use crate::diagnostics::{ContinuityViolation, ViolationKind};
use crate::network::{Link, Network};
use crate::staging::{spread, Staging};
use crate::{
    CompositeConfig, ControlPolygon, Error, Evaluator, Handle, NullEvaluator, Point3, Result,
};

type CurveStage<'a, I> = Staging<'a, ControlPolygon, End, I>;

type Batch = crate::staging::Batch<usize>;

/// Chain (or loop, or tree) of cubic arcs kept C1 at every joint.
pub struct CompositeCurve<E: Evaluator<ControlPolygon> = NullEvaluator> {
    pub(crate) network: Network<ControlPolygon, End, E>,
    pub(crate) config: CompositeConfig,
}

impl CompositeCurve<NullEvaluator> {
    pub fn new() -> Self {
        Self::with_config(CompositeConfig::default())
    }

    pub fn with_config(config: CompositeConfig) -> Self {
        Self::with_evaluator(config, NullEvaluator)
    }
}

impl Default for CompositeCurve<NullEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator<ControlPolygon>> CompositeCurve<E> {
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

    pub fn handles(&self) -> Vec<Handle> {
        self.network.handles()
    }

    pub fn handle_at(&self, position: usize) -> Option<Handle> {
        self.network.handle_at(position)
    }

    pub fn polygon(&self, node: Handle) -> Result<&ControlPolygon> {
        Ok(&self.network.node(node)?.grid)
    }

    pub fn image(&self, node: Handle) -> Result<&E::Image> {
        Ok(&self.network.node(node)?.image)
    }

    pub fn get_control_point(&self, node: Handle, index: usize) -> Result<Point3> {
        self.polygon(node)?.get(index)
    }

    pub fn neighbour(&self, node: Handle, end: End) -> Result<Option<Link<End>>> {
        self.network.link(node, end)
    }

    fn staged<T>(
        &mut self,
        op: impl FnOnce(&mut CurveStage<'_, E::Image>) -> Result<T>,
    ) -> Result<(T, usize)> {
        let mut stage = self.network.stage();
        let output = op(&mut stage)?;
        let changes = stage.finish();
        let touched = self.network.commit(changes)?;
        Ok((output, touched.len()))
    }

    fn require_free(&self, node: Handle, end: End) -> Result<()> {
        if self.network.link(node, end)?.is_some() {
            warn!(node = %node, end = %end, "end already connected");
            return Err(Error::AlreadyConnected {
                node,
                direction: end.as_str(),
            });
        }
        Ok(())
    }

    pub fn insert_new_arc(&mut self) -> Result<Handle> {
        let (node, _) = self.staged(|stage| Ok(stage.create(ControlPolygon::template())))?;
        debug!(node = %node, "inserted arc");
        Ok(node)
    }

    /// Append an arc at `end` of `node` continuing its end line evenly.
    pub fn continue_existing_arc(&mut self, node: Handle, end: End) -> Result<Handle> {
        self.require_free(node, end)?;
        let (created, _) = self.staged(|stage| {
            let source = *stage.polygon(node)?;
            let back = end.opposite();
            let shared = source.at(end.point_at(0));
            let mut previous = shared;
            let mut current = source.at(end.point_at(1)).reflect(shared);
            let mut fresh = ControlPolygon::template();
            fresh.set_at(back.point_at(0), shared);
            for depth in 1..GRID_ORDER {
                fresh.set_at(back.point_at(depth), current);
                let next = previous.reflect(current);
                previous = current;
                current = next;
            }
            let created = stage.create(fresh);
            stage.connect(node, end, created, back)?;
            Ok(created)
        })?;
        debug!(node = %node, end = %end, created = %created, "continued arc");
        Ok(created)
    }

    /// Connect `a` and `b` through a bridge arc: its left end continues `a`
    /// at `end_a`, its right end continues `b` at `end_b`.
    pub fn join_existing_arcs(
        &mut self,
        a: Handle,
        end_a: End,
        b: Handle,
        end_b: End,
    ) -> Result<Handle> {
        if a == b && end_a == end_b {
            return Err(Error::InvalidTopology(format!(
                "cannot join {a} {end_a} to itself"
            )));
        }
        self.require_free(a, end_a)?;
        self.require_free(b, end_b)?;

        let (bridge, _) = self.staged(|stage| {
            let pa = *stage.polygon(a)?;
            let pb = *stage.polygon(b)?;
            let mut fresh = ControlPolygon::template();
            for (side, source, end) in [(End::Left, pa, end_a), (End::Right, pb, end_b)] {
                let shared = source.at(end.point_at(0));
                fresh.set_at(side.point_at(0), shared);
                fresh.set_at(side.point_at(1), source.at(end.point_at(1)).reflect(shared));
            }
            let created = stage.create(fresh);
            stage.connect(created, End::Left, a, end_a)?;
            stage.connect(created, End::Right, b, end_b)?;
            Ok(created)
        })?;
        debug!(%a, %end_a, %b, %end_b, bridge = %bridge, "joined arcs");
        Ok(bridge)
    }

    /// Glue `a` and `b` directly. The shared end point becomes the midpoint
    /// of the two second points, which makes the joint C1.
    pub fn merge_existing_arcs(
        &mut self,
        a: Handle,
        end_a: End,
        b: Handle,
        end_b: End,
    ) -> Result<()> {
        if a == b && end_a == end_b {
            warn!(node = %a, end = %end_a, "self merge needs opposite ends");
            return Err(Error::InvalidTopology(format!(
                "{a} can only be merged with itself through opposite ends"
            )));
        }
        self.require_free(a, end_a)?;
        self.require_free(b, end_b)?;

        let (_, touched) = self.staged(|stage| {
            let inner_a = stage.polygon(a)?.at(end_a.point_at(1));
            let inner_b = stage.polygon(b)?.at(end_b.point_at(1));
            let shared = inner_a.midpoint(inner_b);
            stage.polygon_mut(a)?.set_at(end_a.point_at(0), shared);
            stage.polygon_mut(b)?.set_at(end_b.point_at(0), shared);
            stage.connect(a, end_a, b, end_b)
        })?;
        debug!(%a, %end_a, %b, %end_b, touched, "merged arcs");
        Ok(())
    }

    pub fn update_control_point(
        &mut self,
        node: Handle,
        index: usize,
        value: Point3,
    ) -> Result<()> {
        self.update_control_points(node, &[(index, value)])
    }

    /// Assign several points of one arc in a single pass.
    pub fn update_control_points(
        &mut self,
        node: Handle,
        edits: &[(usize, Point3)],
    ) -> Result<()> {
        for &(index, _) in edits {
            if index >= GRID_ORDER {
                return Err(mosaic_topology::TopologyError::InvalidPointIndex { index }.into());
            }
        }
        self.network.node(node)?;
        let (reached, touched) = self.staged(|stage| propagate(stage, node, edits))?;
        debug!(node = %node, edits = edits.len(), reached, touched, "updated arc points");
        Ok(())
    }

    pub fn translate_arc(&mut self, node: Handle, delta: Point3) -> Result<()> {
        let edits: Vec<_> = self
            .polygon(node)?
            .points()
            .iter()
            .enumerate()
            .map(|(index, &point)| (index, point + delta))
            .collect();
        let (reached, _) = self.staged(|stage| propagate(stage, node, &edits))?;
        debug!(node = %node, reached, "translated arc");
        Ok(())
    }

    /// Every C0/C1 mismatch above `tolerance`, each joint reported once.
    pub fn continuity_violations(&self, tolerance: f64) -> Vec<ContinuityViolation<End>> {
        let mut found = Vec::new();
        for node in self.network.handles() {
            let Ok(links) = self.network.links(node) else {
                continue;
            };
            for (end, link) in links {
                if (node, end) > (link.node, link.back) {
                    continue;
                }
                let (Ok(ours), Ok(theirs)) = (self.polygon(node), self.polygon(link.node)) else {
                    continue;
                };
                let shared = ours.at(end.point_at(0));
                let position = shared.distance(theirs.at(link.back.point_at(0)));
                let mirrored = ours.at(end.point_at(1)).reflect(shared);
                let tangent = mirrored.distance(theirs.at(link.back.point_at(1)));
                for (kind, deviation) in [
                    (ViolationKind::Position, position),
                    (ViolationKind::Tangent, tangent),
                ] {
                    if deviation > tolerance {
                        found.push(ContinuityViolation {
                            node,
                            slot: end,
                            neighbour: link.node,
                            along: 0,
                            kind,
                            deviation,
                        });
                    }
                }
            }
        }
        found
    }

    pub fn symmetry_violations(&self) -> Vec<(Handle, End)> {
        self.network.symmetry_violations()
    }

    pub fn clear(&mut self) {
        self.network.clear();
    }
}

impl<I> CurveStage<'_, I> {
    fn polygon(&self, node: Handle) -> Result<&ControlPolygon> {
        self.grid(node)
    }

    fn polygon_mut(&mut self, node: Handle) -> Result<&mut ControlPolygon> {
        self.grid_mut(node)
    }
}

/// Apply `edits` at `origin` and carry them breadth-first across the joints,
/// writing each arc once. Returns the number of arcs reached.
fn propagate<I>(
    stage: &mut CurveStage<'_, I>,
    origin: Handle,
    edits: &[(usize, Point3)],
) -> Result<usize> {
    let polygon = *stage.polygon(origin)?;
    let mut batch: Batch = edits.iter().copied().collect();

    // Connected end points drag their neighbouring handle along
    for end in End::ALL {
        if stage.neighbour(origin, end)?.is_none() {
            continue;
        }
        let (tip, handle) = (end.point_at(0), end.point_at(1));
        if let Some(&target) = batch.get(&tip) {
            if !batch.contains_key(&handle) {
                batch.insert(handle, polygon.at(handle) + (target - polygon.at(tip)));
            }
        }
    }

    spread(stage, origin, batch, apply::<I>)
}

fn apply<I>(
    stage: &mut CurveStage<'_, I>,
    node: Handle,
    batch: &Batch,
) -> Result<BTreeMap<Handle, Batch>> {
    let polygon = {
        let polygon = stage.polygon_mut(node)?;
        for (&index, &value) in batch {
            polygon.set_at(index, value);
        }
        *polygon
    };
    trace!(node = %node, points = batch.len(), "applied arc batch");

    let mut pending: BTreeMap<Handle, Batch> = BTreeMap::new();
    for end in End::ALL {
        if !batch.keys().any(|&index| end.depth_of(index) <= 1) {
            continue;
        }
        let Some(link) = stage.neighbour(node, end)? else {
            continue;
        };
        let (tip, handle) = (end.point_at(0), end.point_at(1));
        let shared = polygon.at(tip);
        let out = pending.entry(link.node).or_default();
        out.insert(resolve_end(end, link.back, tip)?, shared);
        out.insert(resolve_end(end, link.back, handle)?, polygon.at(handle).reflect(shared));
    }
    Ok(pending)
}
