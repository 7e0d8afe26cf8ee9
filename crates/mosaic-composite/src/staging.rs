//! Copy-on-write overlay over a network's nodes.
//!
//! Operators read through the overlay and write into cloned nets, so a
//! public call either commits every derived value or none of them. The
//! order in which nodes are first touched is kept; it is the order the
//! evaluator sees them in.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::network::{unknown_node, Link, Node, Slot};
use crate::{Arena, Error, Handle, Point3, Result};

/// Positions assigned to one node, keyed by local point index.
pub(crate) type Batch<K> = BTreeMap<K, Point3>;

/// Everything a finished staging pass wants to publish.
pub(crate) struct Changes<G, D: Slot> {
    pub(crate) grids: HashMap<Handle, G>,
    pub(crate) links: HashMap<Handle, D::Links>,
    pub(crate) created: Vec<Handle>,
    pub(crate) touched: Vec<Handle>,
}

pub(crate) struct Staging<'a, G, D: Slot, I> {
    nodes: &'a Arena<Node<G, D, I>>,
    grids: HashMap<Handle, G>,
    links: HashMap<Handle, D::Links>,
    created: Vec<Handle>,
    touched: Vec<Handle>,
}

impl<'a, G: Clone, D: Slot, I> Staging<'a, G, D, I> {
    pub(crate) fn new(nodes: &'a Arena<Node<G, D, I>>) -> Self {
        Self {
            nodes,
            grids: HashMap::new(),
            links: HashMap::new(),
            created: Vec::new(),
            touched: Vec::new(),
        }
    }

    pub(crate) fn grid(&self, handle: Handle) -> Result<&G> {
        match self.grids.get(&handle) {
            Some(grid) => Ok(grid),
            None => self
                .nodes
                .get(handle)
                .map(|node| &node.grid)
                .ok_or_else(|| unknown_node(handle)),
        }
    }

    pub(crate) fn grid_mut(&mut self, handle: Handle) -> Result<&mut G> {
        if !self.grids.contains_key(&handle) {
            let node = self.nodes.get(handle).ok_or_else(|| unknown_node(handle))?;
            self.grids.insert(handle, node.grid.clone());
            self.touched.push(handle);
        }
        self.grids
            .get_mut(&handle)
            .ok_or_else(|| unknown_node(handle))
    }

    fn slots(&self, handle: Handle) -> Result<&D::Links> {
        match self.links.get(&handle) {
            Some(slots) => Ok(slots),
            None => self
                .nodes
                .get(handle)
                .map(|node| &node.links)
                .ok_or_else(|| unknown_node(handle)),
        }
    }

    /// Raw slot content, without checking the back link.
    pub(crate) fn link(&self, handle: Handle, slot: D) -> Result<Option<Link<D>>> {
        Ok(self.slots(handle)?.as_ref()[slot.index()])
    }

    /// Neighbour through `slot`, verified to point back at us through the
    /// recorded back slot.
    pub(crate) fn neighbour(&self, handle: Handle, slot: D) -> Result<Option<Link<D>>> {
        let Some(link) = self.link(handle, slot)? else {
            return Ok(None);
        };
        match self.link(link.node, link.back) {
            Ok(Some(back)) if back.node == handle && back.back == slot => Ok(Some(link)),
            _ => Err(Error::InvalidTopology(format!(
                "{handle} {slot} leads to {} {} which does not point back",
                link.node, link.back
            ))),
        }
    }

    /// Stage a new node with empty slots.
    pub(crate) fn create(&mut self, grid: G) -> Handle {
        let handle = self.nodes.next_handle(self.created.len());
        self.grids.insert(handle, grid);
        self.links.insert(handle, D::Links::default());
        self.created.push(handle);
        self.touched.push(handle);
        handle
    }

    pub(crate) fn set_link(
        &mut self,
        handle: Handle,
        slot: D,
        link: Option<Link<D>>,
    ) -> Result<()> {
        if !self.links.contains_key(&handle) {
            let node = self.nodes.get(handle).ok_or_else(|| unknown_node(handle))?;
            self.links.insert(handle, node.links.clone());
        }
        if let Some(slots) = self.links.get_mut(&handle) {
            slots.as_mut()[slot.index()] = link;
        }
        Ok(())
    }

    /// Wire both directions of an adjacency in one step.
    pub(crate) fn connect(&mut self, a: Handle, slot_a: D, b: Handle, slot_b: D) -> Result<()> {
        self.set_link(a, slot_a, Some(Link { node: b, back: slot_b }))?;
        self.set_link(b, slot_b, Some(Link { node: a, back: slot_a }))
    }

    pub(crate) fn finish(self) -> Changes<G, D> {
        Changes {
            grids: self.grids,
            links: self.links,
            created: self.created,
            touched: self.touched,
        }
    }
}

/// Breadth-first cascade of point batches from `origin`.
///
/// `apply` writes a batch into its node and returns the batch each linked
/// node needs. Every node is written once; batches for a node still waiting
/// in the queue are merged, the first value for a point winning. Returns the
/// number of nodes reached.
pub(crate) fn spread<'a, G, D, I, K>(
    stage: &mut Staging<'a, G, D, I>,
    origin: Handle,
    batch: Batch<K>,
    mut apply: impl FnMut(
        &mut Staging<'a, G, D, I>,
        Handle,
        &Batch<K>,
    ) -> Result<BTreeMap<Handle, Batch<K>>>,
) -> Result<usize>
where
    G: Clone,
    D: Slot,
    K: Ord,
{
    let mut visited = HashSet::from([origin]);
    let mut waiting = HashMap::from([(origin, batch)]);
    let mut queue = VecDeque::from([origin]);

    while let Some(node) = queue.pop_front() {
        let mut batch = waiting.remove(&node).unwrap_or_default();
        let mut outgoing = apply(stage, node, &batch)?;
        // A seam glued to the same node feeds back into its own batch
        while let Some(own) = outgoing.remove(&node) {
            let known = batch.len();
            for (index, value) in own {
                batch.entry(index).or_insert(value);
            }
            if batch.len() == known {
                break;
            }
            outgoing = apply(stage, node, &batch)?;
        }
        for (next, incoming) in outgoing {
            if let Some(existing) = waiting.get_mut(&next) {
                for (index, value) in incoming {
                    existing.entry(index).or_insert(value);
                }
            } else if visited.insert(next) {
                waiting.insert(next, incoming);
                queue.push_back(next);
            }
        }
    }
    Ok(visited.len())
}
