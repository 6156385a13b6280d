//! Monotonic id sequences.
//!
//! A sequence is owned by the ledger it numbers and only advances inside
//! the same exclusive region as the insert that consumes the id.

/// A gapless counter starting at 1.
#[derive(Debug, Clone)]
pub struct Sequence {
    next: u64,
}

impl Sequence {
    /// A fresh sequence whose first id is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// The id the next allocation will return.
    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub const fn allocated(&self) -> u64 {
        self.next - 1
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}
