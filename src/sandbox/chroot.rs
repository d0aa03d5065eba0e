use super::{SandboxContext, Sys};
use anyhow::{Context, Result};
use log::trace;
use std::path::Path;

impl SandboxContext {
    /**
     * chroot doesn't move the working directory, so remember it in host terms
     * first and re-resolve it inside the new root afterwards. The mirrored
     * mounts make it the same directory.
     */
    pub fn enter_chroot(&mut self, sys: &impl Sys) -> Result<()> {
        let cwd = sys
            .getcwd()
            .context("Failed to get working directory")?;

        sys.chdir(Path::new("/")).context("Failed to cd /")?;
        sys.chroot(&self.root)
            .context(format!("Failed to chroot into {}", self.root.display()))?;

        trace!("Setting CWD to {}", cwd.display());
        sys.chdir(&cwd).context(format!(
            "Failed to chdir to {} inside chroot",
            cwd.display()
        ))?;

        self.cwd = Some(cwd);
        Ok(())
    }
}
