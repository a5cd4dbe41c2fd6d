use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Error, PointId, Result, constants::STDIO_PATH};

/// Writes one point id per line to `path`, or to stdout when `path` is `-`.
pub fn write_tour(tour: &[PointId], path: &Path) -> Result<()> {
    if path.as_os_str() == STDIO_PATH {
        let stdout = std::io::stdout();
        return write_tour_to(tour, stdout.lock());
    }

    let file = File::create(path).map_err(|e| {
        Error::other(format!("failed to create tour output file {}: {e}", path.display()))
    })?;
    write_tour_to(tour, file)
}

pub fn write_tour_to<W: Write>(tour: &[PointId], writer: W) -> Result<()> {
    let mut out = BufWriter::new(writer);
    for id in tour {
        writeln!(out, "{id}")?;
    }
    out.flush()?;
    Ok(())
}
