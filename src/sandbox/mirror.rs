use super::{EntryKind, HOST_ROOT, SandboxContext, Sys};
use crate::types::{
    MirrorReport, MirrorStage, MirroredLink, MountEntry, MountFailure,
};
use anyhow::{Context, Result};
use log::{debug, trace, warn};
use nix::mount::MsFlags;
use std::path::{Path, PathBuf};

impl SandboxContext {
    /**
     * Recreates the host's top-level layout inside the sandbox root: every
     * directory (except the store) gets a same-named, same-mode mount point
     * with the host directory recursively bind mounted onto it, and every
     * top-level symlink is recreated as-is.
     *
     * Per-entry failures are recorded in the report and skipped, one
     * unreadable host directory shouldn't deny the whole sandbox. Only
     * failing to list the host root is fatal.
     */
    pub fn mirror_host_root(&mut self, sys: &impl Sys) -> Result<&MirrorReport> {
        let host_root = Path::new(HOST_ROOT);
        let entries = sys
            .read_dir(host_root)
            .context(format!("Failed to read directory {}", HOST_ROOT))?;

        let mut report = MirrorReport::default();

        for entry in entries {
            if entry.name.as_os_str() == self.store_name.as_str() {
                trace!("Skipping host {}", self.store_name);
                continue;
            }

            let host_path = host_root.join(&entry.name);
            let mounted_path = self.root.join(&entry.name);

            match entry.kind {
                EntryKind::Directory => {
                    if let Err(e) = sys.mkdir(&mounted_path, entry.mode) {
                        record(&mut report, host_path, MirrorStage::Mkdir, e);
                        continue;
                    }

                    debug!(
                        "Bind mounting {} to {}",
                        host_path.display(),
                        mounted_path.display()
                    );
                    if let Err(e) = sys.mount(
                        Some(&host_path),
                        &mounted_path,
                        MsFlags::MS_BIND | MsFlags::MS_REC,
                    ) {
                        record(&mut report, host_path, MirrorStage::Mount, e);
                        continue;
                    }

                    report.mounts.push(MountEntry {
                        host_path,
                        mounted_path,
                        mode: entry.mode,
                    });
                }
                EntryKind::Symlink(target) => {
                    if let Err(e) = sys.symlink(&target, &mounted_path) {
                        record(&mut report, host_path, MirrorStage::Symlink, e);
                        continue;
                    }
                    report.links.push(MirroredLink {
                        link_path: mounted_path,
                        target,
                    });
                }
                EntryKind::Other => {
                    trace!("Skipping {}, not a directory", host_path.display());
                }
            }
        }

        self.mirror = report;
        Ok(&self.mirror)
    }
}

fn record(
    report: &mut MirrorReport,
    host_path: PathBuf,
    stage: MirrorStage,
    error: anyhow::Error,
) {
    let failure = MountFailure {
        host_path,
        stage,
        error: format!("{:#}", error),
    };
    warn!("Skipping {}", failure);
    report.failures.push(failure);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sandbox::fake::{Call, FakeSys};
    use nix::errno::Errno;
    use nix::sys::stat::Mode;

    fn context(sys: &FakeSys) -> Result<SandboxContext> {
        SandboxContext::prepare(
            sys,
            &Config::for_store("nix", PathBuf::from("/tmp")),
            Path::new("/alt/store"),
        )
    }

    fn host() -> FakeSys {
        FakeSys::new()
            .with_stat("/alt/store", true, 0o755)
            .with_dir("home", 0o755)
            .with_dir("nix", 0o755)
            .with_dir("tmp", 0o777)
            .with_file("vmlinuz")
            .with_symlink("bin", "usr/bin")
            .with_dir("root", 0o700)
    }

    fn bind(source: &str, target: &str) -> Call {
        Call::Mount {
            source: Some(source.into()),
            target: target.into(),
            flags: MsFlags::MS_BIND | MsFlags::MS_REC,
        }
    }

    #[test]
    fn test_mirror_mounts_every_directory_but_the_store() -> Result<()> {
        let sys = host();
        let mut ctx = context(&sys)?;
        let report = ctx.mirror_host_root(&sys)?.clone();

        let mounted: Vec<&Path> =
            report.mounts.iter().map(|m| m.host_path.as_path()).collect();
        assert_eq!(
            mounted,
            vec![Path::new("/home"), Path::new("/tmp"), Path::new("/root")]
        );
        for entry in &report.mounts {
            assert_eq!(entry.mounted_path.parent(), Some(ctx.root.as_path()));
            assert_eq!(
                entry.mounted_path.file_name(),
                entry.host_path.file_name()
            );
        }
        assert!(report.failures.is_empty());

        let calls = sys.calls();
        assert!(calls.contains(&Call::Mkdir(
            "/tmp/nixfake/tmp".into(),
            Mode::from_bits_truncate(0o777)
        )));
        assert!(calls.contains(&Call::Mkdir(
            "/tmp/nixfake/root".into(),
            Mode::from_bits_truncate(0o700)
        )));
        assert!(calls.contains(&bind("/home", "/tmp/nixfake/home")));
        assert!(!calls.contains(&bind("/nix", "/tmp/nixfake/nix")));
        assert!(!calls.iter().any(|c| matches!(
            c,
            Call::Mkdir(path, _) if path == Path::new("/tmp/nixfake/vmlinuz")
        )));
        Ok(())
    }

    #[test]
    fn test_mirror_recreates_top_level_symlinks() -> Result<()> {
        let sys = host();
        let mut ctx = context(&sys)?;
        let report = ctx.mirror_host_root(&sys)?.clone();
        assert_eq!(
            report.links,
            vec![MirroredLink {
                link_path: "/tmp/nixfake/bin".into(),
                target: "usr/bin".into(),
            }]
        );
        assert!(sys.calls().contains(&Call::Symlink {
            target: "usr/bin".into(),
            link: "/tmp/nixfake/bin".into(),
        }));
        Ok(())
    }

    #[test]
    fn test_mirror_skips_failed_mount_and_continues() -> Result<()> {
        let sys = host().failing(
            |c| {
                matches!(c, Call::Mount { source: Some(s), .. }
                    if s == Path::new("/root"))
            },
            Errno::EACCES,
        );
        let mut ctx = context(&sys)?;
        let report = ctx.mirror_host_root(&sys)?.clone();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].host_path, PathBuf::from("/root"));
        assert_eq!(report.failures[0].stage, MirrorStage::Mount);
        assert!(report.failures[0].error.contains("Permission denied"));
        assert!(
            report
                .mounts
                .iter()
                .all(|m| m.host_path != Path::new("/root"))
        );
        assert_eq!(report.mounts.len(), 2);
        Ok(())
    }

    #[test]
    fn test_mirror_skips_failed_mkdir_without_mounting() -> Result<()> {
        let sys = host().failing(
            |c| {
                matches!(c, Call::Mkdir(p, _)
                    if p == Path::new("/tmp/nixfake/home"))
            },
            Errno::EEXIST,
        );
        let mut ctx = context(&sys)?;
        let report = ctx.mirror_host_root(&sys)?.clone();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, MirrorStage::Mkdir);
        assert!(!sys.calls().contains(&bind("/home", "/tmp/nixfake/home")));
        assert!(sys.calls().contains(&bind("/tmp", "/tmp/nixfake/tmp")));
        Ok(())
    }

    #[test]
    fn test_mirror_skips_failed_symlink_and_continues() -> Result<()> {
        let sys = host()
            .with_symlink("lib", "usr/lib")
            .failing(|c| matches!(c, Call::Symlink { .. }), Errno::EEXIST);
        let mut ctx = context(&sys)?;
        let report = ctx.mirror_host_root(&sys)?.clone();

        assert_eq!(report.failures.len(), 2);
        assert!(
            report
                .failures
                .iter()
                .all(|f| f.stage == MirrorStage::Symlink)
        );
        assert_eq!(report.failures[0].host_path, PathBuf::from("/bin"));
        assert_eq!(report.failures[1].host_path, PathBuf::from("/lib"));
        assert!(report.links.is_empty());
        assert_eq!(report.mounts.len(), 3);
        assert!(sys.calls().contains(&bind("/root", "/tmp/nixfake/root")));
        Ok(())
    }

    #[test]
    fn test_mirror_skips_store_symlink() -> Result<()> {
        let sys = FakeSys::new()
            .with_stat("/alt/store", true, 0o755)
            .with_symlink("nix", "/home/nix")
            .with_dir("home", 0o755);
        let mut ctx = context(&sys)?;
        let report = ctx.mirror_host_root(&sys)?.clone();

        assert!(report.links.is_empty());
        assert!(report.failures.is_empty());
        assert!(!sys.calls().iter().any(|c| matches!(
            c,
            Call::Symlink { link, .. } if link == Path::new("/tmp/nixfake/nix")
        )));
        assert!(sys.calls().contains(&bind("/home", "/tmp/nixfake/home")));
        Ok(())
    }

    #[test]
    fn test_mirror_unreadable_root_is_fatal() -> Result<()> {
        let sys = host()
            .failing(|c| matches!(c, Call::ReadDir(_)), Errno::EACCES);
        let mut ctx = context(&sys)?;
        assert!(ctx.mirror_host_root(&sys).is_err());
        Ok(())
    }

    #[test]
    fn test_mirror_honours_custom_store_name() -> Result<()> {
        let sys = host().with_dir("gnu", 0o755);
        let mut ctx = SandboxContext::prepare(
            &sys,
            &Config::for_store("gnu", PathBuf::from("/tmp")),
            Path::new("/alt/store"),
        )?;
        let report = ctx.mirror_host_root(&sys)?.clone();
        assert!(
            report
                .mounts
                .iter()
                .any(|m| m.host_path == Path::new("/nix"))
        );
        assert!(
            !report
                .mounts
                .iter()
                .any(|m| m.host_path == Path::new("/gnu"))
        );
        Ok(())
    }
}
