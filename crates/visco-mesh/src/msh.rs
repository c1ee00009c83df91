//! gmsh 2.2 ASCII persistence.
//!
//! ```text
//! $MeshFormat
//! 2.2 0 8
//! $EndMeshFormat
//! $Nodes
//! <n>
//! <id> <x> 0 0
//! $EndNodes
//! $Elements
//! <m>
//! <id> 1 2 <level> <index> <left node> <right node>
//! $EndElements
//! ```
//!
//! Each cell is a 2-node line element (type 1) whose two tags carry the
//! refinement level and the index within that level, so a reloaded mesh
//! can be adapted further.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use visco_types::{ViscoError, ViscoResult};

use crate::mesh::{Cell, IntervalMesh};

const LINE_ELEMENT: u32 = 1;

/// Writes `mesh` in gmsh 2.2 ASCII format.
pub fn write_msh<W: Write>(mesh: &IntervalMesh, mut out: W) -> ViscoResult<()> {
    writeln!(out, "$MeshFormat")?;
    writeln!(out, "2.2 0 8")?;
    writeln!(out, "$EndMeshFormat")?;

    writeln!(out, "$Nodes")?;
    writeln!(out, "{}", mesh.node_count())?;
    for (i, x) in mesh.nodes.iter().enumerate() {
        writeln!(out, "{} {x} 0 0", i + 1)?;
    }
    writeln!(out, "$EndNodes")?;

    writeln!(out, "$Elements")?;
    writeln!(out, "{}", mesh.cell_count())?;
    for (i, cell) in mesh.cells.iter().enumerate() {
        writeln!(
            out,
            "{} {LINE_ELEMENT} 2 {} {} {} {}",
            i + 1,
            cell.level,
            cell.index,
            i + 1,
            i + 2
        )?;
    }
    writeln!(out, "$EndElements")?;
    out.flush()?;
    Ok(())
}

/// Saves `mesh` to `path`, overwriting any existing file.
pub fn save(mesh: &IntervalMesh, path: &Path) -> ViscoResult<()> {
    let file = File::create(path)?;
    write_msh(mesh, BufWriter::new(file))
}

/// Loads a mesh written by [`save`].
pub fn load(path: &Path) -> ViscoResult<IntervalMesh> {
    let file = File::open(path)?;
    read_msh(BufReader::new(file))
}

/// Reads a gmsh 2.2 ASCII mesh of tagged line elements.
///
/// Node coordinates in the file are checked against the positions
/// implied by the cell tags.
pub fn read_msh<R: BufRead>(input: R) -> ViscoResult<IntervalMesh> {
    let mut lines = Lines::new(input);

    lines.expect("$MeshFormat")?;
    let format = lines.next_line()?;
    let mut fields = format.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(v), Some("0")) if v.starts_with("2.") => {}
        _ => return Err(invalid(format!("unsupported mesh format '{format}'"))),
    }
    lines.expect("$EndMeshFormat")?;

    lines.expect("$Nodes")?;
    let node_count = lines.count()?;
    let mut coords = HashMap::with_capacity(node_count);
    for _ in 0..node_count {
        let line = lines.next_line()?;
        let mut fields = line.split_whitespace();
        let id: u64 = parse(fields.next(), "node id")?;
        let x: f64 = parse(fields.next(), "node x")?;
        coords.insert(id, x);
    }
    lines.expect("$EndNodes")?;

    lines.expect("$Elements")?;
    let element_count = lines.count()?;
    // (left x, right x, cell)
    let mut elements = Vec::with_capacity(element_count);
    for _ in 0..element_count {
        let line = lines.next_line()?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let kind: u32 = parse(fields.get(1).copied(), "element type")?;
        if kind != LINE_ELEMENT {
            continue;
        }
        let tags: usize = parse(fields.get(2).copied(), "tag count")?;
        if tags < 2 {
            return Err(invalid(format!("line element without level/index tags: '{line}'")));
        }
        let level: u32 = parse(fields.get(3).copied(), "level tag")?;
        let index: u64 = parse(fields.get(4).copied(), "index tag")?;
        let a: u64 = parse(fields.get(3 + tags).copied(), "element node")?;
        let b: u64 = parse(fields.get(4 + tags).copied(), "element node")?;
        let xa = node(&coords, a)?;
        let xb = node(&coords, b)?;
        elements.push((xa.min(xb), xa.max(xb), Cell { level, index }));
    }
    lines.expect("$EndElements")?;

    if elements.is_empty() {
        return Err(invalid("mesh contains no line elements".into()));
    }
    elements.sort_by(|p, q| p.0.total_cmp(&q.0));

    let (origin, right0, first) = elements[0];
    let base_width = (right0 - origin) * (1u64 << first.level.min(crate::MAX_LEVEL)) as f64;
    let end = elements[elements.len() - 1].1;
    let base_cells = ((end - origin) / base_width).round() as usize;

    if let Some(&(_, _, cell)) = elements.iter().find(|e| !e.2.fits(base_cells)) {
        return Err(invalid(format!(
            "cell tags (level {}, index {}) lie outside a base grid of {base_cells} cells",
            cell.level, cell.index
        )));
    }

    let cells: Vec<Cell> = elements.iter().map(|e| e.2).collect();
    let mesh = IntervalMesh::from_cells(origin, base_width, base_cells, cells)?;

    let tolerance = 1e-9 * base_width;
    for (c, &(left, right, _)) in elements.iter().enumerate() {
        let [a, b] = mesh.cell_bounds(c);
        if (a - left).abs() > tolerance || (b - right).abs() > tolerance {
            return Err(invalid(format!(
                "cell {c} coordinates [{left}, {right}] disagree with its tags ([{a}, {b}])"
            )));
        }
    }
    Ok(mesh)
}

fn invalid(message: String) -> ViscoError {
    ViscoError::InvalidMesh(message)
}

fn node(coords: &HashMap<u64, f64>, id: u64) -> ViscoResult<f64> {
    coords
        .get(&id)
        .copied()
        .ok_or_else(|| invalid(format!("element references unknown node {id}")))
}

fn parse<T: std::str::FromStr>(field: Option<&str>, what: &str) -> ViscoResult<T> {
    let field = field.ok_or_else(|| invalid(format!("missing {what}")))?;
    field
        .parse()
        .map_err(|_| invalid(format!("cannot parse {what} from '{field}'")))
}

/// Non-blank line reader with section checks.
struct Lines<R> {
    inner: std::io::Lines<R>,
}

impl<R: BufRead> Lines<R> {
    fn new(input: R) -> Self {
        Self {
            inner: input.lines(),
        }
    }

    fn next_line(&mut self) -> ViscoResult<String> {
        for line in self.inner.by_ref() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
        Err(invalid("unexpected end of mesh file".into()))
    }

    fn expect(&mut self, marker: &str) -> ViscoResult<()> {
        let line = self.next_line()?;
        if line == marker {
            Ok(())
        } else {
            Err(invalid(format!("expected '{marker}', found '{line}'")))
        }
    }

    fn count(&mut self) -> ViscoResult<usize> {
        let line = self.next_line()?;
        parse(Some(line.as_str()), "entity count")
    }
}
