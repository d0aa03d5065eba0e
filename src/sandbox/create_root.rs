use super::{SandboxContext, Sys};
use crate::config::Config;
use crate::types::{IdMapping, MirrorReport};
use anyhow::{Context, Result, anyhow};
use log::debug;
use std::path::Path;

impl SandboxContext {
    /**
     * Resolves the store directory, captures our ids and creates the empty
     * sandbox root. Nothing here touches kernel namespace state, so a failure
     * leaves the host as it was (except for the temp dir, which is created
     * last).
     */
    pub fn prepare(
        sys: &impl Sys,
        config: &Config,
        store_path: &Path,
    ) -> Result<SandboxContext> {
        let ugh = sys
            .uid_gid_home()
            .context("Failed to resolve uid/gid")?;

        let store_source = std::path::absolute(store_path).context(format!(
            "Failed to get absolute path of {}",
            store_path.display()
        ))?;

        let store_stat = sys.stat(&store_source).context(format!(
            "Failed to stat store directory {}",
            store_source.display()
        ))?;
        if !store_stat.is_dir {
            return Err(anyhow!(
                "Store path {} is not a directory",
                store_source.display()
            ));
        }

        let root = sys
            .create_temp_dir(&config.tmp_dir, &config.store_name)
            .context(format!(
                "Failed to make tempdir in {}",
                config.tmp_dir.display()
            ))?;
        debug!("Sandbox root: {}", root.display());

        Ok(SandboxContext {
            root,
            store_name: config.store_name.clone(),
            store_source,
            store_mode: store_stat.mode,
            conf_dir: config.conf_dir.clone(),
            uid_map: IdMapping::identity(ugh.uid.as_raw()),
            gid_map: IdMapping::identity(ugh.gid.as_raw()),
            mirror: MirrorReport::default(),
            store_mount: None,
            cwd: None,
        })
    }

    /// Runs every step up to, and including, entering the new root.
    pub fn bootstrap(&mut self, sys: &impl Sys) -> Result<()> {
        self.isolate(sys)?;

        let report = self.mirror_host_root(sys)?;
        debug!(
            "Mirrored {} directories and {} symlinks, skipped {}",
            report.mounts.len(),
            report.links.len(),
            report.failures.len()
        );

        self.substitute_store(sys)?;
        self.map_identity(sys)?;
        self.enter_chroot(sys)?;
        Ok(())
    }
}
