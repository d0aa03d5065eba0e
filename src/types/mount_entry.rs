use nix::sys::stat::Mode;
use std::fmt;
use std::path::PathBuf;

/// A host directory bind mounted into the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub host_path: PathBuf,
    pub mounted_path: PathBuf,
    pub mode: Mode,
}

/// A top-level host symlink recreated inside the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredLink {
    pub link_path: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStage {
    Mkdir,
    Mount,
    Symlink,
}

impl fmt::Display for MirrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorStage::Mkdir => write!(f, "mkdir"),
            MirrorStage::Mount => write!(f, "bind mount"),
            MirrorStage::Symlink => write!(f, "symlink"),
        }
    }
}

/// A host entry that could not be mirrored. These are skipped, not fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountFailure {
    pub host_path: PathBuf,
    pub stage: MirrorStage,
    pub error: String,
}

impl fmt::Display for MountFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} failed: {}",
            self.stage,
            self.host_path.display(),
            self.error
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub mounts: Vec<MountEntry>,
    pub links: Vec<MirroredLink>,
    pub failures: Vec<MountFailure>,
}
