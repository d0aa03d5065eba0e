mod fork_exec;
mod host;
mod mkdir;
mod mount;
mod resolve_uid_gid_home;

pub use fork_exec::*;
pub use host::*;
pub use mkdir::*;
pub use mount::*;
pub use resolve_uid_gid_home::*;
