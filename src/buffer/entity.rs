use std::fmt;

pub use crate::config::PAGE_SIZE;

pub type Page = [u8; PAGE_SIZE];

/// Index of a frame in the buffer pool. Only meaningful for the pool that issued it.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FrameId(pub usize);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufStats {
    /// Calls to `read_page`, hits and misses alike.
    pub accesses: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}
