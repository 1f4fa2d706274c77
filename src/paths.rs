//! Output path derivation
//!
//! Pure functions of their inputs and the processing options, except
//! [`derive_output_dir`] which resolves the input directory to an absolute
//! path so `.` and `..` get a real name.

use crate::config::{OutputFormat, ProcessingOptions};
use crate::error::{BgStripError, Result};
use std::path::{Path, PathBuf};

/// `{stem}{suffix}.{ext}` next to the input file
#[must_use]
pub fn derive_output_path(input: &Path, options: &ProcessingOptions) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = input.parent().unwrap_or(Path::new("."));

    dir.join(format!(
        "{}{}.{}",
        stem,
        options.output_suffix(),
        options.output_format.extension()
    ))
}

/// `{dir_name}{suffix}` beside the input directory
///
/// # Errors
/// - `BgStripError::Io` if the input directory cannot be resolved
/// - `BgStripError::InvalidConfig` if it has no name (filesystem root)
pub fn derive_output_dir(input_dir: &Path, options: &ProcessingOptions) -> Result<PathBuf> {
    let resolved = std::fs::canonicalize(input_dir)
        .map_err(|e| BgStripError::file_io_error("resolve input directory", input_dir, &e))?;

    let name = resolved.file_name().ok_or_else(|| {
        BgStripError::invalid_config(format!(
            "Cannot derive an output directory for '{}'; pass one explicitly",
            resolved.display()
        ))
    })?;
    let parent = resolved.parent().unwrap_or(Path::new("/"));

    Ok(parent.join(format!("{}{}", name.to_string_lossy(), options.output_suffix())))
}

/// Mirror `file` from under `input_root` into `output_root`, swapping the extension
///
/// Files outside `input_root` keep only their file name.
#[must_use]
pub fn mirror_output_path(
    input_root: &Path,
    file: &Path,
    output_root: &Path,
    format: OutputFormat,
) -> PathBuf {
    let relative = file
        .strip_prefix(input_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(file.file_name().unwrap_or_default()));

    output_root.join(relative).with_extension(format.extension())
}
