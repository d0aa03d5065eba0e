use nix::unistd::Gid;
use nix::unistd::Uid;
use std::path::PathBuf;

/// The invoking user, captured before any namespace exists. Once the user
/// namespace is unshared and still unmapped, getuid() only reports the
/// overflow id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidGidHome {
    pub uid: Uid,
    pub gid: Gid,
    pub home: Option<PathBuf>,
}
