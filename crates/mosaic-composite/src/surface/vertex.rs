//! Vertex star repair after a merge.
//!
//! The patches around a mesh vertex form a fan: each member touches the
//! vertex with one corner and shares the two edges of that corner with the
//! members before and after it. The fan is found by walking both rotational
//! senses from a start corner; it is closed when the walk comes back round.
//!
//! With the vertex at `v`, C1 across the seam `j` between members `j − 1`
//! and `j` ties the points next to the vertex together:
//!
//! - seam points on the two neighbouring edges: `t[j − 1] + t[j + 1] = 2v`
//! - first interior points at the two corners: `q[j − 1] + q[j] = 2·t[j]`
//!
//! Both systems are solved with the least change to the current nets. An
//! open fan always has a solution that keeps its shape. A closed ring whose
//! size is not a multiple of four only has the solution that pulls the
//! corner blocks onto the vertex.

use std::collections::{HashSet, VecDeque};

use mosaic_topology::{resolve_seam, Direction, GridIndex, LAST};
use tracing::{trace, warn};

use super::resolver::seam_point;
use super::SurfaceStage;
use crate::{Error, Handle, Point3, Result};

/// Relative slack under which the current nets already count as solved.
const SETTLED: f64 = 1e-12;

/// A patch touching the vertex with `corner`, sharing `before` with the
/// previous fan member and `after` with the next.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Member {
    node: Handle,
    corner: Direction,
    before: Direction,
    after: Direction,
}

impl Member {
    fn key(&self) -> (Handle, Direction) {
        (self.node, self.corner)
    }

    /// The seam point next to the vertex on `edge`, and the first interior
    /// point of the corner block.
    fn near(&self, edge: Direction) -> Result<(GridIndex, GridIndex)> {
        let along = corner_index(self.corner)?
            .seam_coord(edge)
            .map(|coord| coord.along())
            .ok_or_else(|| {
                Error::InvalidTopology(format!("{} does not lie on {edge}", self.corner))
            })?;
        let next = if along == 0 { 1 } else { LAST - 1 };
        Ok((seam_point(edge, next, 0)?, seam_point(edge, next, 1)?))
    }
}

/// Members in rotational order. Edge `j` is the `before` edge of member `j`
/// and the `after` edge of member `j − 1`; an open fan has one more edge
/// than members, the first and last lying on the mesh boundary.
struct Fan {
    members: Vec<Member>,
    closed: bool,
}

impl Fan {
    fn edge_count(&self) -> usize {
        if self.closed {
            self.members.len()
        } else {
            self.members.len() + 1
        }
    }

    /// Members leaving through and entering through edge `j`.
    fn sides(&self, j: usize) -> (Option<usize>, Option<usize>) {
        let n = self.members.len();
        if self.closed {
            (Some((j + n - 1) % n), Some(j))
        } else {
            (j.checked_sub(1), (j < n).then_some(j))
        }
    }

    fn after_edge(&self, member: usize) -> usize {
        if self.closed {
            (member + 1) % self.members.len()
        } else {
            member + 1
        }
    }
}

/// Make every patch around the vertex shared by the corners in `starts`
/// meet at `value`, C1 across each seam at the vertex. Diagonal neighbours
/// receive the vertex and have their own fans repaired as well.
///
/// Returns the number of patches written.
pub(crate) fn walk_vertex<I>(
    stage: &mut SurfaceStage<'_, I>,
    starts: [(Handle, Direction); 2],
    value: Point3,
    max_hops: usize,
) -> Result<usize> {
    let mut done: HashSet<(Handle, Direction)> = HashSet::new();
    let mut written: HashSet<Handle> = HashSet::new();
    let mut queue: VecDeque<(Handle, Direction)> = starts.into_iter().collect();

    while let Some(start) = queue.pop_front() {
        if done.contains(&start) {
            continue;
        }
        let fan = gather(stage, start, max_hops)?;
        solve(stage, &fan, value)?;
        trace!(
            node = %start.0,
            corner = %start.1,
            members = fan.members.len(),
            closed = fan.closed,
            "fan repaired"
        );

        for member in &fan.members {
            done.insert(member.key());
            written.insert(member.node);
            // Diagonal neighbours only share the vertex itself
            let Some(link) = stage.neighbour(member.node, member.corner)? else {
                continue;
            };
            let index = resolve_seam(member.corner, link.back, corner_index(member.corner)?)?;
            stage.grid_mut(link.node)?.set_at(index, value);
            written.insert(link.node);
            queue.push_back((link.node, link.back));
        }
    }
    Ok(written.len())
}

fn corner_index(corner: Direction) -> Result<GridIndex> {
    corner
        .corner_point()
        .ok_or_else(|| Error::InvalidTopology(format!("{corner} is not a corner slot")))
}

/// Collect the fan around `start`'s corner in rotational order.
fn gather<I>(
    stage: &SurfaceStage<'_, I>,
    (node, corner): (Handle, Direction),
    max_hops: usize,
) -> Result<Fan> {
    let [first, second] = corner
        .corner_edges()
        .ok_or_else(|| Error::InvalidTopology(format!("{corner} is not a corner slot")))?;
    let origin = Member {
        node,
        corner,
        before: first,
        after: second,
    };

    let (ahead, closed) = walk(stage, origin, second, max_hops)?;
    if closed {
        let mut members = Vec::with_capacity(ahead.len() + 1);
        members.push(origin);
        members.extend(ahead);
        return Ok(Fan { members, closed });
    }

    let (behind, closed) = walk(stage, origin, first, max_hops)?;
    if closed {
        return Err(Error::InvalidTopology(format!(
            "the fan around {corner} of {node} closes in one sense only"
        )));
    }
    let mut members: Vec<Member> = behind
        .into_iter()
        .rev()
        .map(|member| Member {
            before: member.after,
            after: member.before,
            ..member
        })
        .collect();
    members.push(origin);
    members.extend(ahead);
    Ok(Fan { members, closed })
}

/// Members met when leaving `origin` through `leave`, and whether the walk
/// came back round to `origin`.
fn walk<I>(
    stage: &SurfaceStage<'_, I>,
    origin: Member,
    leave: Direction,
    max_hops: usize,
) -> Result<(Vec<Member>, bool)> {
    let mut members: Vec<Member> = Vec::new();
    let (mut node, mut corner, mut edge) = (origin.node, origin.corner, leave);

    while let Some(link) = stage.neighbour(node, edge)? {
        let pivot = resolve_seam(edge, link.back, corner_index(corner)?)?;
        let next = Direction::corner_at(pivot).ok_or_else(|| {
            Error::InvalidTopology(format!(
                "{corner} of {node} does not map to a corner of {}",
                link.node
            ))
        })?;
        if (link.node, next) == origin.key() && link.back != leave {
            return Ok((members, true));
        }
        let revisited = (link.node, next) == origin.key()
            || members.iter().any(|member| member.key() == (link.node, next));
        if revisited || members.len() == max_hops {
            warn!(start = %origin.node, hops = members.len(), "vertex walk did not close");
            return Err(Error::InvalidTopology(format!(
                "vertex walk from {} did not close within {max_hops} hops",
                origin.node
            )));
        }

        let after = next.other_edge(link.back).ok_or_else(|| {
            Error::InvalidTopology(format!(
                "{} {} does not meet corner {next}",
                link.node, link.back
            ))
        })?;
        members.push(Member {
            node: link.node,
            corner: next,
            before: link.back,
            after,
        });
        node = link.node;
        corner = next;
        edge = after;
    }
    Ok((members, false))
}

/// Rewrite the corner blocks of every fan member around `value`.
fn solve<I>(stage: &mut SurfaceStage<'_, I>, fan: &Fan, value: Point3) -> Result<()> {
    let members = &fan.members;
    let edges = fan.edge_count();

    // Seam points next to the vertex, averaged over both sides of a seam
    let mut seams = Vec::with_capacity(edges);
    let mut seam_pairs = Vec::new();
    let mut crossings = Vec::new();
    for j in 0..edges {
        let (leaving, entering) = fan.sides(j);
        let mut sum = Point3::ZERO;
        let mut count = 0.0;
        if let Some(i) = leaving {
            let member = members[i];
            sum += stage.grid(member.node)?.at(member.near(member.after)?.0);
            count += 1.0;
        }
        if let Some(i) = entering {
            let member = members[i];
            sum += stage.grid(member.node)?.at(member.near(member.before)?.0);
            count += 1.0;
        }
        seams.push(sum * (1.0 / count));

        if let (Some(a), Some(b)) = (leaving, entering) {
            seam_pairs.push(((j + edges - 1) % edges, (j + 1) % edges, value * 2.0));
            crossings.push((j, a, b));
        }
    }
    let seams = least_change(&seams, &seam_pairs);

    let mut interiors = Vec::with_capacity(members.len());
    for member in members {
        interiors.push(stage.grid(member.node)?.at(member.near(member.before)?.1));
    }
    let interior_pairs: Vec<_> = crossings
        .iter()
        .map(|&(j, a, b)| (a, b, seams[j] * 2.0))
        .collect();
    let interiors = least_change(&interiors, &interior_pairs);

    for (i, member) in members.iter().enumerate() {
        let (before, inner) = member.near(member.before)?;
        let (after, _) = member.near(member.after)?;
        let pivot = corner_index(member.corner)?;
        let grid = stage.grid_mut(member.node)?;
        grid.set_at(pivot, value);
        grid.set_at(before, seams[i]);
        grid.set_at(after, seams[fan.after_edge(i)]);
        grid.set_at(inner, interiors[i]);
    }
    Ok(())
}

/// Values closest to `current` satisfying every `x[a] + x[b] = sum`.
///
/// Each group of tied values has one free point (or none, when an odd cycle
/// pins it); the free point is the mean over the group of what each current
/// value implies for it. Values that already satisfy the ties are kept.
fn least_change(current: &[Point3], pairs: &[(usize, usize, Point3)]) -> Vec<Point3> {
    let holds = pairs.iter().all(|&(a, b, sum)| {
        (current[a] + current[b] - sum).length() <= SETTLED * (1.0 + sum.length())
    });
    if holds {
        return current.to_vec();
    }

    let mut ties: Vec<Vec<(usize, Point3)>> = vec![Vec::new(); current.len()];
    for &(a, b, sum) in pairs {
        ties[a].push((b, sum));
        if a != b {
            ties[b].push((a, sum));
        }
    }

    // x[k] = sign·free + offset within the group of k
    let mut form: Vec<Option<(f64, Point3)>> = vec![None; current.len()];
    let mut solved = current.to_vec();
    for root in 0..current.len() {
        if form[root].is_some() {
            continue;
        }
        form[root] = Some((1.0, Point3::ZERO));
        let mut group = vec![root];
        let mut pinned = None;
        let mut queue = VecDeque::from([root]);
        while let Some(k) = queue.pop_front() {
            let Some((sign, offset)) = form[k] else {
                continue;
            };
            for &(other, sum) in &ties[k] {
                match form[other] {
                    None => {
                        form[other] = Some((-sign, sum - offset));
                        group.push(other);
                        queue.push_back(other);
                    }
                    Some((other_sign, other_offset)) => {
                        let weight = sign + other_sign;
                        if weight != 0.0 && pinned.is_none() {
                            pinned = Some((sum - offset - other_offset) * (1.0 / weight));
                        }
                    }
                }
            }
        }

        let free = pinned.unwrap_or_else(|| {
            let mut total = Point3::ZERO;
            for &k in &group {
                if let Some((sign, offset)) = form[k] {
                    total += (current[k] - offset) * sign;
                }
            }
            total * (1.0 / group.len() as f64)
        });
        for &k in &group {
            if let Some((sign, offset)) = form[k] {
                solved[k] = free * sign + offset;
            }
        }
    }
    solved
}
