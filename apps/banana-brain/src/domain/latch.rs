use std::sync::atomic::{AtomicBool, Ordering};

/// One-way flag: the first `fire` wins, every later call sees `false`.
#[derive(Debug, Default)]
pub struct Latch {
    fired: AtomicBool,
}

impl Latch {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Returns `true` exactly once over the latch's lifetime.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Clone for Latch {
    fn clone(&self) -> Self {
        Self {
            fired: AtomicBool::new(self.is_fired()),
        }
    }
}
