use super::{SandboxContext, Sys};
use crate::types::MountEntry;
use anyhow::{Context, Result};
use log::debug;
use nix::mount::MsFlags;

impl SandboxContext {
    /// Puts the caller's store directory at `/<store_name>` in the new root.
    pub fn substitute_store(&mut self, sys: &impl Sys) -> Result<()> {
        let mount_point = self.root.join(&self.store_name);

        sys.mkdir(&mount_point, self.store_mode).context(format!(
            "Failed to create store mount point {}",
            mount_point.display()
        ))?;

        debug!(
            "Bind mounting store {} to {}",
            self.store_source.display(),
            mount_point.display()
        );
        sys.mount(
            Some(&self.store_source),
            &mount_point,
            MsFlags::MS_BIND | MsFlags::MS_REC,
        )
        .context(format!(
            "Failed to mount store {}",
            self.store_source.display()
        ))?;

        self.store_mount = Some(MountEntry {
            host_path: self.store_source.clone(),
            mounted_path: mount_point,
            mode: self.store_mode,
        });
        Ok(())
    }
}
