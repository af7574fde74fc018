use core::alloc::Layout;

/// Returned by the checked accessors when `index >= len`.
///
/// # Examples
///
/// ```
/// # use hybridvec::{HybridVec, OutOfRange};
/// let vec: HybridVec<i32, 4> = HybridVec::new();
/// assert_eq!(vec.at(0), Err(OutOfRange { index: 0, len: 0 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("index {index} is out of range for a HybridVec of length {len}")]
pub struct OutOfRange {
    /// The requested index.
    pub index: usize,
    /// The length of the container at the time of the access.
    pub len: usize,
}

/// Error type for the fallible growth operations.
///
/// A failed growth leaves the container exactly as it was: the new buffer is
/// acquired before any element is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryReserveError {
    /// The requested capacity overflows `usize`, or its size in bytes exceeds `isize::MAX`.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The global allocator returned a null pointer.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocationFailure {
        /// The layout that was passed to the allocator.
        layout: Layout,
    },
}
