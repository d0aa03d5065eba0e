use super::{create_temp_dir, fork_exec_wait, mkdir, mount, resolve_uid_gid_home};
use crate::sandbox::{EntryKind, HostEntry, StatInfo, Sys};
use crate::types::{ChildOutcome, UidGidHome};
use anyhow::{Context, Result};
use log::warn;
use nix::mount::MsFlags;
use nix::sched::CloneFlags;
use nix::sys::stat::Mode;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// The real kernel.
pub struct HostSys;

fn permission_bits(mode: u32) -> Mode {
    Mode::from_bits_truncate(mode & 0o777)
}

/* An entry we can't lstat or readlink is reported as Other, so the mirror
 * skips it instead of losing the whole listing. */
fn classify(
    path: &Path,
    metadata: std::io::Result<std::fs::Metadata>,
) -> (EntryKind, Mode) {
    let metadata = match metadata {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Failed to stat {}: {}", path.display(), e);
            return (EntryKind::Other, Mode::empty());
        }
    };
    let mode = permission_bits(metadata.permissions().mode());
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        (EntryKind::Directory, mode)
    } else if file_type.is_symlink() {
        match std::fs::read_link(path) {
            Ok(target) => (EntryKind::Symlink(target), mode),
            Err(e) => {
                warn!("Failed to read link {}: {}", path.display(), e);
                (EntryKind::Other, mode)
            }
        }
    } else {
        (EntryKind::Other, mode)
    }
}

impl Sys for HostSys {
    fn uid_gid_home(&self) -> Result<UidGidHome> {
        resolve_uid_gid_home()
    }

    fn create_temp_dir(&self, base: &Path, prefix: &str) -> Result<PathBuf> {
        create_temp_dir(base, prefix)
    }

    fn unshare(&self, flags: CloneFlags) -> Result<()> {
        nix::sched::unshare(flags)
            .map_err(std::io::Error::from)
            .context("unshare() failed")
    }

    fn mount(
        &self,
        source: Option<&Path>,
        target: &Path,
        flags: MsFlags,
    ) -> Result<()> {
        mount(source, target, None, flags, None)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<HostEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)
            .context(format!("Failed to read directory {}", path.display()))?
        {
            let entry = entry.context(format!(
                "Failed to read directory {}",
                path.display()
            ))?;
            // DirEntry::metadata doesn't traverse symlinks
            let (kind, mode) = classify(&entry.path(), entry.metadata());
            entries.push(HostEntry {
                name: entry.file_name(),
                kind,
                mode,
            });
        }
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<StatInfo> {
        let metadata = std::fs::metadata(path)?;
        Ok(StatInfo {
            is_dir: metadata.is_dir(),
            mode: permission_bits(metadata.permissions().mode()),
        })
    }

    fn mkdir(&self, path: &Path, mode: Mode) -> Result<()> {
        mkdir(path, mode)
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        Ok(std::os::unix::fs::symlink(target, link)?)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        let mut file = std::fs::OpenOptions::new().write(true).open(path)?;
        // id maps must arrive in a single write(2)
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn getcwd(&self) -> Result<PathBuf> {
        Ok(nix::unistd::getcwd()?)
    }

    fn chdir(&self, path: &Path) -> Result<()> {
        Ok(nix::unistd::chdir(path)?)
    }

    fn chroot(&self, path: &Path) -> Result<()> {
        Ok(nix::unistd::chroot(path)?)
    }

    fn set_env(&self, key: &str, value: &str) {
        // Single threaded, nothing else reads the environment concurrently
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn spawn(&self, command: &[String]) -> Result<ChildOutcome> {
        fork_exec_wait(command)
    }
}
