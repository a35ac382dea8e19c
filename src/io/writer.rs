//! Assignment writer.
//!
//! One `name:resource` line per settler, in name order. An unassigned
//! settler is written as `name:`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::simulation::Simulation;

/// Writes the current assignments of `sim` to `out`.
pub fn write_assignments<W: Write>(sim: &Simulation, mut out: W) -> io::Result<()> {
    for settler in sim.settlers() {
        writeln!(out, "{}:{}", settler.name(), settler.assignment().unwrap_or(""))?;
    }
    Ok(())
}

/// Saves the current assignments of `sim` to the file at `path`,
/// replacing any previous content.
pub fn save_assignments(sim: &Simulation, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_assignments(sim, &mut out)?;
    out.flush()?;
    info!(path = %path.display(), settlers = sim.settler_count(), "assignments saved");
    Ok(())
}
