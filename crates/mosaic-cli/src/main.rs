//! mosaic CLI tool
//!
//! Edits composite Bézier mesh files in the text format, one operation per
//! invocation.
//!
//! Usage:
//!   mosaic [--curve] <file> new
//!   mosaic [--curve] <file> insert
//!   mosaic [--curve] <file> continue <node> <slot>
//!   mosaic [--curve] <file> join <a> <slot> <b> <slot>
//!   mosaic [--curve] <file> merge <a> <slot> <b> <slot>
//!   mosaic [--curve] <file> set <node> <point> <x> <y> <z>
//!   mosaic [--curve] <file> move <node> <dx> <dy> <dz>
//!   mosaic [--curve] <file> get <node> <point>
//!   mosaic [--curve] <file> check
//!   mosaic [--curve] <file> export

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mosaic_composite::{
    CompositeConfig, CompositeCurve, CompositeSurface, Direction, End, Handle, NullEvaluator,
    Point3,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_usage() {
    eprintln!("mosaic - Edit C1-continuous composite Bezier meshes");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  mosaic [--curve] <file> new                          Create an empty mesh");
    eprintln!("  mosaic [--curve] <file> insert                       Add a template node");
    eprintln!("  mosaic [--curve] <file> continue <node> <slot>       Extend a node");
    eprintln!("  mosaic [--curve] <file> join <a> <slot> <b> <slot>   Bridge two nodes");
    eprintln!("  mosaic [--curve] <file> merge <a> <slot> <b> <slot>  Glue two nodes");
    eprintln!("  mosaic [--curve] <file> set <node> <point> <x> <y> <z>");
    eprintln!("                                                       Move a control point");
    eprintln!("  mosaic [--curve] <file> move <node> <dx> <dy> <dz>   Translate a node");
    eprintln!("  mosaic [--curve] <file> get <node> <point>           Print a control point");
    eprintln!("  mosaic [--curve] <file> check                        Report seam mismatches");
    eprintln!("  mosaic [--curve] <file> export                       Print a JSON snapshot");
    eprintln!();
    eprintln!("Nodes are positions in the file. Surface slots are N NE E SE S SW W NW and");
    eprintln!("points are <row>,<col>; curve slots are left/right and points are 0-3.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MOSAIC_ISO_LINES_U, MOSAIC_ISO_LINES_V      Iso lines per patch (default: 50)");
    eprintln!("  MOSAIC_CURVE_DIV_POINTS                     Samples per arc (default: 100)");
    eprintln!("  MOSAIC_CURVE_DERIVATIVE_ORDER               Highest arc derivative (default: 2)");
    eprintln!("  MOSAIC_VERTEX_VALENCE                       Expected vertex valence (default: 4)");
    eprintln!("  MOSAIC_TOLERANCE                            Seam check tolerance (default: 1e-9)");
    eprintln!("  RUST_LOG                                    Log filter (default: mosaic=info)");
}

/// Control point address: `row,col` on a patch, a single index on an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointRef {
    Grid(usize, usize),
    Polygon(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Command<S> {
    New,
    Insert,
    Continue(usize, S),
    Join(usize, S, usize, S),
    Merge(usize, S, usize, S),
    Set(usize, PointRef, Point3),
    Move(usize, Point3),
    Get(usize, PointRef),
    Check,
    Export,
}

impl<S> Command<S> {
    /// Whether the file is written back afterwards.
    fn mutates(&self) -> bool {
        !matches!(self, Command::Get(..) | Command::Check | Command::Export)
    }
}

fn parse<T: FromStr>(args: &[String], at: usize, what: &str) -> Result<T, String> {
    let arg = args
        .get(at)
        .ok_or_else(|| format!("missing {what} argument"))?;
    arg.parse()
        .map_err(|_| format!("invalid {what}: `{arg}`"))
}

fn parse_point_ref(arg: &str, curve: bool) -> Result<PointRef, String> {
    let invalid = || format!("invalid control point: `{arg}`");
    if curve {
        return arg.parse().map(PointRef::Polygon).map_err(|_| invalid());
    }
    let (row, col) = arg.split_once(',').ok_or_else(invalid)?;
    let row = row.trim().parse().map_err(|_| invalid())?;
    let col = col.trim().parse().map_err(|_| invalid())?;
    Ok(PointRef::Grid(row, col))
}

fn parse_vector(args: &[String], at: usize) -> Result<Point3, String> {
    Ok(Point3::new(
        parse(args, at, "x")?,
        parse(args, at + 1, "y")?,
        parse(args, at + 2, "z")?,
    ))
}

/// Parse the words after the file name.
fn parse_command<S: FromStr>(args: &[String], curve: bool) -> Result<Command<S>, String> {
    let name = args.first().ok_or("missing command")?;
    let command = match name.as_str() {
        "new" => Command::New,
        "insert" => Command::Insert,
        "continue" => Command::Continue(parse(args, 1, "node")?, parse(args, 2, "slot")?),
        "join" => Command::Join(
            parse(args, 1, "node")?,
            parse(args, 2, "slot")?,
            parse(args, 3, "node")?,
            parse(args, 4, "slot")?,
        ),
        "merge" => Command::Merge(
            parse(args, 1, "node")?,
            parse(args, 2, "slot")?,
            parse(args, 3, "node")?,
            parse(args, 4, "slot")?,
        ),
        "set" => {
            let point = args.get(2).ok_or("missing control point argument")?;
            Command::Set(
                parse(args, 1, "node")?,
                parse_point_ref(point, curve)?,
                parse_vector(args, 3)?,
            )
        }
        "move" => Command::Move(parse(args, 1, "node")?, parse_vector(args, 2)?),
        "get" => {
            let point = args.get(2).ok_or("missing control point argument")?;
            Command::Get(parse(args, 1, "node")?, parse_point_ref(point, curve)?)
        }
        "check" => Command::Check,
        "export" => Command::Export,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(command)
}

/// Either kind of mesh, loaded from or saved to the text format.
enum Mesh {
    Surface(CompositeSurface),
    Curve(CompositeCurve),
}

impl Mesh {
    fn empty(curve: bool, config: CompositeConfig) -> Self {
        if curve {
            Mesh::Curve(CompositeCurve::with_config(config))
        } else {
            Mesh::Surface(CompositeSurface::with_config(config))
        }
    }

    fn load(path: &Path, curve: bool, config: CompositeConfig) -> mosaic_composite::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mesh = if curve {
            Mesh::Curve(CompositeCurve::read_text(reader, config, NullEvaluator)?)
        } else {
            Mesh::Surface(CompositeSurface::read_text(reader, config, NullEvaluator)?)
        };
        Ok(mesh)
    }

    fn save(&self, path: &Path) -> mosaic_composite::Result<()> {
        let file = File::create(path)?;
        match self {
            Mesh::Surface(surface) => surface.write_text(file),
            Mesh::Curve(curve) => curve.write_text(file),
        }
    }
}

fn node_at(handle: Option<Handle>, position: usize) -> Result<Handle, String> {
    handle.ok_or_else(|| format!("no node at position {position}"))
}

fn position_of(handles: &[Handle], handle: Handle) -> usize {
    handles.iter().position(|&h| h == handle).unwrap_or(handle.index())
}

fn run_surface(
    surface: &mut CompositeSurface,
    command: Command<Direction>,
) -> Result<String, String> {
    let output = match command {
        Command::New => String::new(),
        Command::Insert => {
            let created = surface.insert_new_patch().map_err(|e| e.to_string())?;
            format!("{}", position_of(&surface.handles(), created))
        }
        Command::Continue(n, slot) => {
            let created = surface
                .continue_existing_patch(node_at(surface.handle_at(n), n)?, slot)
                .map_err(|e| e.to_string())?;
            format!("{}", position_of(&surface.handles(), created))
        }
        Command::Join(a, slot_a, b, slot_b) => {
            let (a, b) = (node_at(surface.handle_at(a), a)?, node_at(surface.handle_at(b), b)?);
            let bridge = surface
                .join_existing_patches(a, slot_a, b, slot_b)
                .map_err(|e| e.to_string())?;
            format!("{}", position_of(&surface.handles(), bridge))
        }
        Command::Merge(a, slot_a, b, slot_b) => {
            let (a, b) = (node_at(surface.handle_at(a), a)?, node_at(surface.handle_at(b), b)?);
            surface
                .merge_existing_patches(a, slot_a, b, slot_b)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        Command::Set(n, PointRef::Grid(row, col), value) => {
            surface
                .update_control_point(node_at(surface.handle_at(n), n)?, row, col, value)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        Command::Move(n, delta) => {
            surface
                .translate_patch(node_at(surface.handle_at(n), n)?, delta)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        Command::Get(n, PointRef::Grid(row, col)) => {
            let point = surface
                .get_control_point(node_at(surface.handle_at(n), n)?, row, col)
                .map_err(|e| e.to_string())?;
            format!("{} {} {}", point.x, point.y, point.z)
        }
        Command::Set(_, PointRef::Polygon(_), _) | Command::Get(_, PointRef::Polygon(_)) => {
            return Err("surface points are addressed as <row>,<col>".to_string());
        }
        Command::Check => {
            let tolerance = surface.config().continuity_tolerance;
            report(
                surface.continuity_violations(tolerance).iter().map(|v| v.to_string()),
                surface.symmetry_violations().iter().map(|(h, slot)| {
                    format!("{h} {slot} is not linked back")
                }),
            )
        }
        Command::Export => surface.to_json().map_err(|e| e.to_string())?,
    };
    Ok(output)
}

fn run_curve(curve: &mut CompositeCurve, command: Command<End>) -> Result<String, String> {
    let output = match command {
        Command::New => String::new(),
        Command::Insert => {
            let created = curve.insert_new_arc().map_err(|e| e.to_string())?;
            format!("{}", position_of(&curve.handles(), created))
        }
        Command::Continue(n, end) => {
            let created = curve
                .continue_existing_arc(node_at(curve.handle_at(n), n)?, end)
                .map_err(|e| e.to_string())?;
            format!("{}", position_of(&curve.handles(), created))
        }
        Command::Join(a, end_a, b, end_b) => {
            let (a, b) = (node_at(curve.handle_at(a), a)?, node_at(curve.handle_at(b), b)?);
            let bridge = curve
                .join_existing_arcs(a, end_a, b, end_b)
                .map_err(|e| e.to_string())?;
            format!("{}", position_of(&curve.handles(), bridge))
        }
        Command::Merge(a, end_a, b, end_b) => {
            let (a, b) = (node_at(curve.handle_at(a), a)?, node_at(curve.handle_at(b), b)?);
            curve
                .merge_existing_arcs(a, end_a, b, end_b)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        Command::Set(n, PointRef::Polygon(index), value) => {
            curve
                .update_control_point(node_at(curve.handle_at(n), n)?, index, value)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        Command::Move(n, delta) => {
            curve
                .translate_arc(node_at(curve.handle_at(n), n)?, delta)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        Command::Get(n, PointRef::Polygon(index)) => {
            let point = curve
                .get_control_point(node_at(curve.handle_at(n), n)?, index)
                .map_err(|e| e.to_string())?;
            format!("{} {} {}", point.x, point.y, point.z)
        }
        Command::Set(_, PointRef::Grid(..), _) | Command::Get(_, PointRef::Grid(..)) => {
            return Err("curve points are addressed by a single index".to_string());
        }
        Command::Check => {
            let tolerance = curve.config().continuity_tolerance;
            report(
                curve.continuity_violations(tolerance).iter().map(|v| v.to_string()),
                curve.symmetry_violations().iter().map(|(h, end)| {
                    format!("{h} {end} is not linked back")
                }),
            )
        }
        Command::Export => curve.to_json().map_err(|e| e.to_string())?,
    };
    Ok(output)
}

fn report(
    continuity: impl Iterator<Item = String>,
    symmetry: impl Iterator<Item = String>,
) -> String {
    let lines: Vec<String> = continuity.chain(symmetry).collect();
    if lines.is_empty() {
        "ok".to_string()
    } else {
        lines.join("\n")
    }
}

/// Load (or create), apply one command, and save when it changed the mesh.
fn execute(
    path: &Path,
    curve: bool,
    words: &[String],
    config: CompositeConfig,
) -> Result<String, String> {
    let mut mesh = if words.first().map(String::as_str) == Some("new") {
        Mesh::empty(curve, config)
    } else {
        Mesh::load(path, curve, config)
            .map_err(|e| format!("failed to load {}: {e}", path.display()))?
    };

    let (output, mutated) = match &mut mesh {
        Mesh::Surface(surface) => {
            let command = parse_command::<Direction>(words, false)?;
            let mutated = command.mutates();
            (run_surface(surface, command)?, mutated)
        }
        Mesh::Curve(curve) => {
            let command = parse_command::<End>(words, true)?;
            let mutated = command.mutates();
            (run_curve(curve, command)?, mutated)
        }
    };

    if mutated {
        mesh.save(path)
            .map_err(|e| format!("failed to save {}: {e}", path.display()))?;
        debug!(path = %path.display(), "mesh saved");
    }
    Ok(output)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mosaic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if matches!(args.first().map(String::as_str), Some("-h" | "--help" | "help")) {
        print_usage();
        std::process::exit(0);
    }

    let curve = match args.iter().position(|a| a == "--curve") {
        Some(at) => {
            args.remove(at);
            true
        }
        None => false,
    };

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[0]);
    let config = CompositeConfig::from_env();
    info!(path = %path.display(), command = %args[1], curve, "running");

    match execute(&path, curve, &args[1..], config) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    }
}
