use crate::error::TryReserveError;

/// Compile-time check for zero sized types.
///
/// Branches on `T::IS_ZST` are resolved by the compiler, so ZST paths cost nothing
/// for ordinary element types.
pub(crate) trait IsZST {
    const IS_ZST: bool;
}

impl<T> IsZST for T {
    const IS_ZST: bool = core::mem::size_of::<T>() == 0;
}

/// Marks the calling branch as unlikely.
#[cold]
#[inline(always)]
pub(crate) fn cold_path() {}

/// Unwraps the result of a fallible allocation the same way [`Vec`](alloc::vec::Vec) does:
/// panic on capacity overflow, abort through the allocation error handler otherwise.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(TryReserveError::CapacityOverflow) => panic!("capacity overflow"),
        Err(TryReserveError::AllocationFailure { layout }) => {
            alloc::alloc::handle_alloc_error(layout)
        }
    }
}
