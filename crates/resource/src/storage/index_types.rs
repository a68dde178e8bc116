//! Node index type for type-safe arena access.

/// A compact 32-bit index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Creates a new NodeIndex from a usize.
    ///
    /// # Panics
    /// Panics if `index >= u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(
            index < u32::MAX as usize,
            "node index must be less than u32::MAX"
        );
        Self(index as u32)
    }

    /// Returns the index as a usize.
    #[inline]
    pub fn get(&self) -> usize {
        self.0 as usize
    }
}
