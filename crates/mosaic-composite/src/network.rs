//! Node storage shared by surface and curve networks.
//!
//! A node is a control net, one optional [`Link`] per adjacency slot and the
//! image the evaluator last produced for the net. Nodes are only ever
//! changed through a [`Staging`] overlay followed by [`Network::commit`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use mosaic_topology::{Direction, End, CURVE_SLOTS, SURFACE_SLOTS};
use tracing::{trace, warn};

use crate::snapshot::{LinkRecord, NodeRecord};
use crate::staging::{Changes, Staging};
use crate::{Arena, Error, Evaluator, Handle, Result};

/// Adjacency slot kind: [`Direction`] for patches, [`End`] for arcs.
pub(crate) trait Slot: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + 'static {
    type Links: AsRef<[Option<Link<Self>>]>
        + AsMut<[Option<Link<Self>>]>
        + Default
        + Clone
        + fmt::Debug;

    const ALL: &'static [Self];

    fn index(self) -> usize;

    fn opposite(self) -> Self;

    /// Whether a link may join this slot to `other`.
    fn pairs_with(self, other: Self) -> bool;
}

impl Slot for Direction {
    type Links = [Option<Link<Direction>>; SURFACE_SLOTS];

    const ALL: &'static [Self] = &Direction::ALL;

    fn index(self) -> usize {
        Direction::index(self)
    }

    fn opposite(self) -> Self {
        Direction::opposite(self)
    }

    fn pairs_with(self, other: Self) -> bool {
        self.is_edge() == other.is_edge()
    }
}

impl Slot for End {
    type Links = [Option<Link<End>>; CURVE_SLOTS];

    const ALL: &'static [Self] = &End::ALL;

    fn index(self) -> usize {
        End::index(self)
    }

    fn opposite(self) -> Self {
        End::opposite(self)
    }

    fn pairs_with(self, _other: Self) -> bool {
        true
    }
}

/// One side of an adjacency: the neighbour and which of its slots points
/// back at us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link<D> {
    pub node: Handle,
    pub back: D,
}

#[derive(Debug)]
pub(crate) struct Node<G, D: Slot, I> {
    pub(crate) grid: G,
    pub(crate) links: D::Links,
    pub(crate) image: I,
}

pub(crate) fn unknown_node(handle: Handle) -> Error {
    Error::InvalidIndex(format!("no live node {handle}"))
}

pub(crate) struct Network<G, D: Slot, E: Evaluator<G>> {
    nodes: Arena<Node<G, D, E::Image>>,
    evaluator: E,
}

impl<G: Clone, D: Slot, E: Evaluator<G>> Network<G, D, E> {
    pub(crate) fn new(evaluator: E) -> Self {
        Self {
            nodes: Arena::new(),
            evaluator,
        }
    }

    pub(crate) fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn handles(&self) -> Vec<Handle> {
        self.nodes.handles().collect()
    }

    pub(crate) fn handle_at(&self, position: usize) -> Option<Handle> {
        self.nodes.handle_at(position)
    }

    pub(crate) fn node(&self, handle: Handle) -> Result<&Node<G, D, E::Image>> {
        self.nodes.get(handle).ok_or_else(|| unknown_node(handle))
    }

    pub(crate) fn link(&self, handle: Handle, slot: D) -> Result<Option<Link<D>>> {
        Ok(self.node(handle)?.links.as_ref()[slot.index()])
    }

    /// Present links of a node in slot order.
    pub(crate) fn links(&self, handle: Handle) -> Result<Vec<(D, Link<D>)>> {
        let node = self.node(handle)?;
        Ok(D::ALL
            .iter()
            .filter_map(|&slot| node.links.as_ref()[slot.index()].map(|link| (slot, link)))
            .collect())
    }

    pub(crate) fn stage(&self) -> Staging<'_, G, D, E::Image> {
        Staging::new(&self.nodes)
    }

    /// Evaluate every touched net, then publish all staged grids, links and
    /// images together. Nothing is written unless every evaluation succeeds.
    pub(crate) fn commit(&mut self, changes: Changes<G, D>) -> Result<Vec<Handle>> {
        let Changes {
            mut grids,
            mut links,
            created,
            touched,
        } = changes;

        let mut images = HashMap::with_capacity(touched.len());
        for &handle in &touched {
            let grid = grids.get(&handle).ok_or_else(|| unknown_node(handle))?;
            let image = self.evaluator.evaluate(grid).map_err(|err| {
                warn!(node = %handle, error = %err, "evaluation failed, discarding staged edits");
                Error::AllocationFailure(format!("node {handle}: {err}"))
            })?;
            images.insert(handle, image);
        }

        let mut fresh = Vec::with_capacity(created.len());
        for &handle in &created {
            let grid = grids.remove(&handle).ok_or_else(|| unknown_node(handle))?;
            let image = images.remove(&handle).ok_or_else(|| unknown_node(handle))?;
            let slots = links.remove(&handle).unwrap_or_default();
            fresh.push((
                handle,
                Node {
                    grid,
                    links: slots,
                    image,
                },
            ));
        }

        for (handle, node) in fresh {
            let pushed = self.nodes.push(node);
            debug_assert_eq!(pushed, handle);
        }
        for (handle, grid) in grids {
            if let Some(node) = self.nodes.get_mut(handle) {
                node.grid = grid;
            }
        }
        for (handle, slots) in links {
            if let Some(node) = self.nodes.get_mut(handle) {
                node.links = slots;
            }
        }
        for (handle, image) in images {
            if let Some(node) = self.nodes.get_mut(handle) {
                node.image = image;
            }
        }

        trace!(touched = touched.len(), created = created.len(), "committed staged edits");
        Ok(touched)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Links whose neighbour does not point back through the recorded slot.
    pub(crate) fn symmetry_violations(&self) -> Vec<(Handle, D)> {
        let mut broken = Vec::new();
        for (handle, node) in self.nodes.iter() {
            for &slot in D::ALL {
                let Some(link) = node.links.as_ref()[slot.index()] else {
                    continue;
                };
                let reciprocal = self.link(link.node, link.back).ok().flatten();
                if reciprocal != Some(Link { node: handle, back: slot }) {
                    broken.push((handle, slot));
                }
            }
        }
        broken
    }

    /// Nets and links by backing position.
    pub(crate) fn export(&self) -> Vec<NodeRecord<G, D>> {
        self.nodes
            .iter()
            .map(|(_, node)| NodeRecord {
                net: node.grid.clone(),
                links: D::ALL
                    .iter()
                    .filter_map(|&slot| {
                        let link = node.links.as_ref()[slot.index()]?;
                        Some(LinkRecord {
                            slot,
                            node: self.nodes.position(link.node)?,
                            back: link.back,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Build a network from records, evaluating every net once.
    pub(crate) fn import(evaluator: E, records: Vec<NodeRecord<G, D>>) -> Result<Self> {
        let mut network = Self::new(evaluator);
        let count = records.len();
        let mut stage = network.stage();
        let handles: Vec<Handle> = records
            .iter()
            .map(|record| stage.create(record.net.clone()))
            .collect();
        for (position, record) in records.iter().enumerate() {
            for link in &record.links {
                let target = handles.get(link.node).copied().ok_or_else(|| {
                    Error::InvalidIndex(format!(
                        "node {position} links to node {} of {count}",
                        link.node
                    ))
                })?;
                stage.set_link(
                    handles[position],
                    link.slot,
                    Some(Link {
                        node: target,
                        back: link.back,
                    }),
                )?;
            }
        }
        let changes = stage.finish();
        network.commit(changes)?;
        Ok(network)
    }
}
