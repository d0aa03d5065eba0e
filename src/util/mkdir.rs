use anyhow::{Context, Result};
use nix::sys::stat::Mode;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/* Creates exactly one directory with the given permission bits (still subject
 * to the process umask). Fails if the path already exists or the parent is
 * missing. */
pub fn mkdir(path: &Path, mode: Mode) -> Result<()> {
    std::fs::DirBuilder::new()
        .mode(mode.bits())
        .create(path)
        .with_context(|| {
            format!(
                "Failed to create directory {} [mode={:o}]",
                path.display(),
                mode.bits()
            )
        })
}

/// Creates a fresh, uniquely named directory `<base>/<prefix><uuid>` readable
/// only by its owner.
pub fn create_temp_dir(base: &Path, prefix: &str) -> Result<PathBuf> {
    let path = base.join(format!("{}{}", prefix, Uuid::new_v4().simple()));
    mkdir(&path, Mode::S_IRWXU)?;
    Ok(path)
}
