use crate::types::UidGidHome;
use anyhow::Result;
use log::debug;
use nix::unistd::{getgid, getuid};
use std::ffi::OsString;
use std::path::PathBuf;

/**
 * Figures out who we are. Must run before the user namespace is unshared,
 * afterwards the real ids read back as the overflow id until the maps are
 * written.
 *
 * HOME is optional, it is only used to locate the default config file.
 */
pub fn resolve_uid_gid_home() -> Result<UidGidHome> {
    Ok(UidGidHome {
        uid: getuid(),
        gid: getgid(),
        home: absolute_home(std::env::var_os("HOME")),
    })
}

fn absolute_home(home: Option<OsString>) -> Option<PathBuf> {
    let home = PathBuf::from(home.filter(|home| !home.is_empty())?);
    if !home.is_absolute() {
        debug!("Ignoring HOME, not an absolute path: {}", home.display());
        return None;
    }
    Some(home)
}
