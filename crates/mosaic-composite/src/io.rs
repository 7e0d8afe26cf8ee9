//! Whitespace-delimited text format.
//!
//! ```text
//! <a> <b> <node count>
//! <control points of node 0, row-major, x y z each>
//! ...
//! <neighbour positions of node 0 in slot order, -1 when empty>
//! ...
//! ```
//!
//! Surfaces write their iso line counts as `<a> <b>`, curves their division
//! point count and highest derivative order. Back slots are not stored; they
//! are inferred on load.

use std::io::{BufWriter, Read, Write};

use mosaic_topology::{Direction, End, GridIndex, GRID_ORDER};
use tracing::{debug, warn};

use crate::network::{Network, Slot};
use crate::snapshot::{LinkRecord, NodeRecord};
use crate::{
    CompositeConfig, CompositeCurve, CompositeSurface, ControlGrid, ControlPolygon, Error,
    Evaluator, Point3, Result,
};

/// Control nets that can be flattened to a fixed number of points.
pub(crate) trait FlatNet: Sized {
    const POINTS: usize;

    fn flat(&self) -> Vec<Point3>;

    fn from_flat(points: &[Point3]) -> Self;
}

impl FlatNet for ControlGrid {
    const POINTS: usize = GRID_ORDER * GRID_ORDER;

    fn flat(&self) -> Vec<Point3> {
        self.iter().map(|(_, point)| point).collect()
    }

    fn from_flat(points: &[Point3]) -> Self {
        let mut grid = ControlGrid::template();
        for (flat, &point) in points.iter().enumerate().take(Self::POINTS) {
            if let Some(index) = GridIndex::from_flat(flat) {
                grid.set_at(index, point);
            }
        }
        grid
    }
}

impl FlatNet for ControlPolygon {
    const POINTS: usize = GRID_ORDER;

    fn flat(&self) -> Vec<Point3> {
        self.points().to_vec()
    }

    fn from_flat(points: &[Point3]) -> Self {
        let mut polygon = ControlPolygon::template();
        for (index, &point) in points.iter().enumerate().take(Self::POINTS) {
            polygon.set_at(index, point);
        }
        polygon
    }
}

fn write_network<W, G, D, E>(
    writer: W,
    header: [usize; 2],
    network: &Network<G, D, E>,
) -> Result<()>
where
    W: Write,
    G: FlatNet + Clone,
    D: Slot,
    E: Evaluator<G>,
{
    let mut out = BufWriter::new(writer);
    let records = network.export();
    writeln!(out, "{} {} {}", header[0], header[1], records.len())?;

    for record in &records {
        let line: Vec<String> = record
            .net
            .flat()
            .iter()
            .map(|p| format!("{} {} {}", p.x, p.y, p.z))
            .collect();
        writeln!(out, "{}", line.join(" "))?;
    }

    for record in &records {
        let mut block = vec!["-1".to_string(); D::ALL.len()];
        for link in &record.links {
            block[link.slot.index()] = link.node.to_string();
        }
        writeln!(out, "{}", block.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Token stream that remembers how far it got for error reports.
struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
            position: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            token: self.position,
            message: message.into(),
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&'a str> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| self.error(format!("unexpected end of input, expected {what}")))?;
        self.position += 1;
        Ok(token)
    }

    fn usize(&mut self, what: &str) -> Result<usize> {
        let token = self.next_token(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected {what}, found `{token}`")))
    }

    fn f64(&mut self, what: &str) -> Result<f64> {
        let token = self.next_token(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected {what}, found `{token}`")))
    }

    fn point(&mut self) -> Result<Point3> {
        Ok(Point3::new(
            self.f64("x coordinate")?,
            self.f64("y coordinate")?,
            self.f64("z coordinate")?,
        ))
    }

    /// Neighbour position, `None` for `-1`.
    fn neighbour(&mut self, count: usize) -> Result<Option<usize>> {
        let token = self.next_token("neighbour index")?;
        if token == "-1" {
            return Ok(None);
        }
        match token.parse::<usize>() {
            Ok(position) if position < count => Ok(Some(position)),
            Ok(position) => Err(self.error(format!(
                "neighbour {position} is out of range for {count} nodes"
            ))),
            Err(_) => Err(self.error(format!("expected neighbour index, found `{token}`"))),
        }
    }

    fn finish(mut self) -> Result<()> {
        match self.inner.next() {
            None => Ok(()),
            Some(token) => {
                self.position += 1;
                Err(self.error(format!("trailing token `{token}`")))
            }
        }
    }
}

fn read_network<R, G, D>(mut reader: R) -> Result<([usize; 2], Vec<NodeRecord<G, D>>)>
where
    R: Read,
    G: FlatNet,
    D: Slot,
{
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = Tokens::new(&text);

    let header = [tokens.usize("header value")?, tokens.usize("header value")?];
    let count = tokens.usize("node count")?;

    let mut nets = Vec::with_capacity(count);
    for _ in 0..count {
        let points = (0..G::POINTS)
            .map(|_| tokens.point())
            .collect::<Result<Vec<_>>>()?;
        nets.push(G::from_flat(&points));
    }

    let mut targets = Vec::with_capacity(count);
    for _ in 0..count {
        let block = (0..D::ALL.len())
            .map(|_| tokens.neighbour(count))
            .collect::<Result<Vec<_>>>()?;
        targets.push(block);
    }
    tokens.finish()?;

    let backs = infer_back_slots::<D>(&targets);
    let records = nets
        .into_iter()
        .zip(targets.iter().zip(backs))
        .map(|(net, (block, backs))| NodeRecord {
            net,
            links: D::ALL
                .iter()
                .filter_map(|&slot| {
                    let node = block[slot.index()]?;
                    let back = backs[slot.index()]?;
                    Some(LinkRecord { slot, node, back })
                })
                .collect(),
        })
        .collect();
    Ok((header, records))
}

/// Pair every link with a slot of its target that points back, preferring
/// the opposite slot. Links nothing points back to stay one-way.
fn infer_back_slots<D: Slot>(targets: &[Vec<Option<usize>>]) -> Vec<Vec<Option<D>>> {
    let mut backs: Vec<Vec<Option<D>>> = vec![vec![None; D::ALL.len()]; targets.len()];

    for (node, block) in targets.iter().enumerate() {
        for &slot in D::ALL {
            if backs[node][slot.index()].is_some() {
                continue;
            }
            let Some(target) = block[slot.index()] else {
                continue;
            };
            let free = |candidate: D| {
                !(target == node && candidate == slot)
                    && targets[target][candidate.index()] == Some(node)
                    && backs[target][candidate.index()].is_none()
                    && slot.pairs_with(candidate)
            };
            let preferred = slot.opposite();
            let back = if free(preferred) {
                Some(preferred)
            } else {
                D::ALL.iter().copied().find(|&candidate| free(candidate))
            };
            match back {
                Some(back) => {
                    backs[node][slot.index()] = Some(back);
                    backs[target][back.index()] = Some(slot);
                }
                None => {
                    warn!(
                        node,
                        slot = %slot,
                        target,
                        "neighbour does not link back, keeping one-way"
                    );
                    backs[node][slot.index()] = Some(preferred);
                }
            }
        }
    }
    backs
}

impl<E: Evaluator<ControlGrid>> CompositeSurface<E> {
    /// Write the mesh in the text format, iso line counts in the header.
    pub fn write_text<W: Write>(&self, writer: W) -> Result<()> {
        let header = [self.config.iso_line_count_u, self.config.iso_line_count_v];
        write_network(writer, header, &self.network)
    }

    pub fn to_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_text(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| Error::Parse {
            token: 0,
            message: err.to_string(),
        })
    }

    /// Load a mesh, taking the iso line counts from the header and the rest
    /// of the settings from `config`. Every patch is evaluated once.
    pub fn read_text<R: Read>(reader: R, config: CompositeConfig, evaluator: E) -> Result<Self> {
        let (header, records) = read_network::<_, ControlGrid, Direction>(reader)?;
        let config = CompositeConfig {
            iso_line_count_u: header[0],
            iso_line_count_v: header[1],
            ..config
        };
        let network = Network::import(evaluator, records)?;
        debug!(patches = network.len(), "loaded surface mesh");
        Ok(Self { network, config })
    }
}

impl<E: Evaluator<ControlPolygon>> CompositeCurve<E> {
    /// Write the curve in the text format, sampling settings in the header.
    pub fn write_text<W: Write>(&self, writer: W) -> Result<()> {
        let header = [
            self.config.curve_division_points,
            self.config.curve_derivative_order,
        ];
        write_network(writer, header, &self.network)
    }

    pub fn to_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_text(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| Error::Parse {
            token: 0,
            message: err.to_string(),
        })
    }

    pub fn read_text<R: Read>(reader: R, config: CompositeConfig, evaluator: E) -> Result<Self> {
        let (header, records) = read_network::<_, ControlPolygon, End>(reader)?;
        let config = CompositeConfig {
            curve_division_points: header[0],
            curve_derivative_order: header[1],
            ..config
        };
        let network = Network::import(evaluator, records)?;
        debug!(arcs = network.len(), "loaded curve");
        Ok(Self { network, config })
    }
}
