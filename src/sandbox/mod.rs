mod chroot;
mod create_root;
mod exec;
mod identity;
mod isolate;
mod mirror;
mod sandbox_struct;
mod store;
mod sys;

pub use sandbox_struct::*;
pub use sys::*;
