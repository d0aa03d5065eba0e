use super::{SandboxContext, Sys};
use anyhow::{Context, Result};
use log::trace;
use nix::mount::MsFlags;
use nix::sched::CloneFlags;
use std::path::Path;

impl SandboxContext {
    /**
     * Detach our mount table and id view from the host. Must happen before
     * any mount or chroot.
     *
     * Not retried, namespace creation failures are never transient.
     */
    pub fn isolate(&self, sys: &impl Sys) -> Result<()> {
        trace!("Unsharing mount and user namespaces");
        sys.unshare(CloneFlags::CLONE_NEWNS | CloneFlags::CLONE_NEWUSER)
            .context("Error at unshare(CLONE_NEWNS | CLONE_NEWUSER)")?;

        /* Nothing we mount from here on may propagate back to the host */
        sys.mount(None, Path::new("/"), MsFlags::MS_REC | MsFlags::MS_PRIVATE)
            .context("Failed to make / private")?;

        Ok(())
    }
}
