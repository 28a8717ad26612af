// IdeDoctor - platform/fs.rs
//
// Filesystem helpers. The core layer only ever sees the readers these
// return, never a path it has to open itself.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Open a text file for a single buffered forward pass.
pub fn open_buffered(path: &Path) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    tracing::debug!(path = %path.display(), size, "Opened input file");
    Ok(BufReader::new(file))
}
