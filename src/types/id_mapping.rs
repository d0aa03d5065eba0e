use std::fmt;

/// One line of a `/proc/<pid>/{uid,gid}_map` table.
///
/// Only single-id identity mappings are ever built, so `count` is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMapping {
    pub container_id: u32,
    pub host_id: u32,
    pub count: u32,
}

impl IdMapping {
    pub fn identity(id: u32) -> Self {
        IdMapping {
            container_id: id,
            host_id: id,
            count: 1,
        }
    }
}

impl fmt::Display for IdMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.container_id, self.host_id, self.count)
    }
}
