use crate::types::{IdMapping, MirrorReport, MountEntry};
use nix::sys::stat::Mode;
use std::path::PathBuf;

/// Where the host's top-level directories are read from.
pub const HOST_ROOT: &str = "/";

/// Environment variable pointing the package manager at its configuration.
pub const CONF_DIR_VAR: &str = "NIX_CONF_DIR";

/**
 * Everything one invocation knows about its sandbox, threaded through the
 * bootstrap steps in order: prepare, isolate, mirror_host_root,
 * substitute_store, map_identity, enter_chroot, then execute.
 */
#[derive(Debug, Clone)]
pub struct SandboxContext {
    pub root: PathBuf,
    pub store_name: String,
    pub store_source: PathBuf,
    pub store_mode: Mode,
    pub conf_dir: PathBuf,
    pub uid_map: IdMapping,
    pub gid_map: IdMapping,
    pub mirror: MirrorReport,
    pub store_mount: Option<MountEntry>,
    pub cwd: Option<PathBuf>,
}
