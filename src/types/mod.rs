mod child_outcome;
mod id_mapping;
mod mount_entry;
mod uid_gid_home;

pub use child_outcome::*;
pub use id_mapping::*;
pub use mount_entry::*;
pub use uid_gid_home::*;
