use super::{SandboxContext, Sys};
use anyhow::{Context, Result};
use log::{debug, trace};
use std::path::Path;

pub const SETGROUPS_PATH: &str = "/proc/self/setgroups";
pub const UID_MAP_PATH: &str = "/proc/self/uid_map";
pub const GID_MAP_PATH: &str = "/proc/self/gid_map";

impl SandboxContext {
    /**
     * Maps our own uid and gid one-to-one into the new user namespace, so
     * files keep their real owners inside the sandbox.
     *
     * setgroups must be denied before gid_map can be written by an
     * unprivileged process, see user_namespaces(7).
     */
    pub fn map_identity(&self, sys: &impl Sys) -> Result<()> {
        if let Err(e) = sys.write_file(Path::new(SETGROUPS_PATH), "deny") {
            let missing = e
                .downcast_ref::<std::io::Error>()
                .map(|e| e.kind() == std::io::ErrorKind::NotFound)
                .unwrap_or(false);
            if !missing {
                return Err(e)
                    .context(format!("Failed to write {}", SETGROUPS_PATH));
            }
            // Kernels before 3.19 have no setgroups control
            debug!("{} doesn't exist, not denying setgroups", SETGROUPS_PATH);
        }

        trace!("Writing uid map: {}", self.uid_map);
        sys.write_file(Path::new(UID_MAP_PATH), &self.uid_map.to_string())
            .context(format!("Failed to write {}", UID_MAP_PATH))?;

        trace!("Writing gid map: {}", self.gid_map);
        sys.write_file(Path::new(GID_MAP_PATH), &self.gid_map.to_string())
            .context(format!("Failed to write {}", GID_MAP_PATH))?;

        Ok(())
    }
}
