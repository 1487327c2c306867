//! File system utilities
//!
//! Atomic output writes and identifier sanitization for emitted programs.

use std::io::Write;
use std::path::Path;

use crate::error::{PlanError, PlanResult};

/// Write `contents` to `path` so readers see either the old file or the full new one
///
/// Data goes to a temporary file in the target directory first and is then
/// renamed over `path`. Missing parent directories are created.
pub fn write_atomically(path: &Path, contents: &[u8]) -> PlanResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| PlanError::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| PlanError::io(parent, e))?;
    if let Err(e) = tmp.write_all(contents).and_then(|_| tmp.as_file().sync_all()) {
        return Err(PlanError::io(path, e));
    }
    tmp.persist(path).map_err(|e| PlanError::io(path, e.error))?;
    Ok(())
}

/// Turn an arbitrary edge name into an identifier
///
/// Keeps ASCII alphanumerics and underscores, replaces everything else with
/// an underscore, collapses runs of underscores and trims them at both ends.
/// Names that would not start with a letter get an `s_` prefix.
pub fn sanitize_identifier(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last_was_underscore = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            result.push('_');
            last_was_underscore = true;
        }
    }

    let trimmed = result.trim_matches('_');
    match trimmed.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => trimmed.to_string(),
        _ => format!("s_{}", trimmed),
    }
}
