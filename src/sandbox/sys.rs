use crate::types::{ChildOutcome, UidGidHome};
use anyhow::Result;
use nix::mount::MsFlags;
use nix::sched::CloneFlags;
use nix::sys::stat::Mode;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Symlink(PathBuf),
    Other,
}

/// One entry of a directory listing, described without following symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub name: OsString,
    pub kind: EntryKind,
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatInfo {
    pub is_dir: bool,
    pub mode: Mode,
}

/**
 * Every kernel and filesystem operation the sandbox bootstrap performs.
 *
 * `HostSys` talks to the real kernel; unit tests use a recording fake so the
 * exact order of operations can be asserted without privileges.
 */
pub trait Sys {
    fn uid_gid_home(&self) -> Result<UidGidHome>;
    fn create_temp_dir(&self, base: &Path, prefix: &str) -> Result<PathBuf>;
    fn unshare(&self, flags: CloneFlags) -> Result<()>;
    fn mount(
        &self,
        source: Option<&Path>,
        target: &Path,
        flags: MsFlags,
    ) -> Result<()>;
    fn read_dir(&self, path: &Path) -> Result<Vec<HostEntry>>;
    /// Follows symlinks.
    fn stat(&self, path: &Path) -> Result<StatInfo>;
    fn mkdir(&self, path: &Path, mode: Mode) -> Result<()>;
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    /// Writes to an existing file, never creates one.
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;
    fn getcwd(&self) -> Result<PathBuf>;
    fn chdir(&self, path: &Path) -> Result<()>;
    fn chroot(&self, path: &Path) -> Result<()>;
    fn set_env(&self, key: &str, value: &str);
    fn spawn(&self, command: &[String]) -> Result<ChildOutcome>;
}
