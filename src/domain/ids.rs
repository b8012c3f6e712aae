use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Process-unique identifier for a simulated object.
///
/// Identifiers come from a monotonically increasing counter, so an id is never handed out
/// twice while the process runs, even if the object it named has long been pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocates the next identifier.
    pub fn allocate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds an id from its raw form (physics back-references store it this way).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
