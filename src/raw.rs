//! Raw storage behind [`HybridVec`](crate::HybridVec).
//!
//! The buffers here only own memory. They never construct or drop elements;
//! the container tracks which slots are live.

use alloc::alloc::{Layout, alloc, dealloc};
use core::{marker::PhantomData, mem::MaybeUninit, ptr::NonNull};

use crate::error::TryReserveError;
use crate::utils::IsZST;

/// `N` uninitialized slots embedded in the container.
pub(crate) struct InlineBuf<T, const N: usize> {
    slots: [MaybeUninit<T>; N],
}

impl<T, const N: usize> InlineBuf<T, N> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            // SAFETY: An uninitialized array of `MaybeUninit` is valid.
            slots: unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() },
        }
    }

    #[inline(always)]
    const fn as_ptr(&self) -> *const T {
        &raw const self.slots as *const T
    }

    #[inline(always)]
    const fn as_mut_ptr(&mut self) -> *mut T {
        &raw mut self.slots as *mut T
    }
}

/// An exclusively owned allocation of `cap` slots.
///
/// For zero sized types nothing is allocated and `ptr` is dangling,
/// but `cap` still records the logical capacity.
pub(crate) struct HeapBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for HeapBuf<T> {}
unsafe impl<T: Sync> Sync for HeapBuf<T> {}

impl<T> HeapBuf<T> {
    /// Allocates exactly `cap` slots.
    ///
    /// Nothing is touched on failure.
    pub(crate) fn try_allocate(cap: usize) -> Result<Self, TryReserveError> {
        let layout = Layout::array::<T>(cap).map_err(|_| TryReserveError::CapacityOverflow)?;

        let ptr = if T::IS_ZST || layout.size() == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: `layout` has a non-zero size.
            let raw = unsafe { alloc(layout) } as *mut T;
            NonNull::new(raw).ok_or(TryReserveError::AllocationFailure { layout })?
        };

        Ok(Self {
            ptr,
            cap,
            _marker: PhantomData,
        })
    }

    #[inline(always)]
    pub(crate) const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub(crate) const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub(crate) const fn capacity(&self) -> usize {
        self.cap
    }
}

impl<T> Drop for HeapBuf<T> {
    // Releases memory only, live elements are dropped by the owner beforehand.
    fn drop(&mut self) {
        if T::IS_ZST || self.cap == 0 {
            return;
        }
        // SAFETY: The same layout was accepted by `try_allocate`.
        unsafe {
            dealloc(
                self.ptr.as_ptr() as *mut u8,
                Layout::from_size_align_unchecked(
                    core::mem::size_of::<T>() * self.cap,
                    core::mem::align_of::<T>(),
                ),
            );
        }
    }
}

/// The active storage of a [`HybridVec`](crate::HybridVec).
///
/// Inline storage always has capacity `N`, heap storage always has capacity greater than `N`.
pub(crate) enum Buffer<T, const N: usize> {
    Inline(InlineBuf<T, N>),
    Heap(HeapBuf<T>),
}

impl<T, const N: usize> Buffer<T, N> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self::Inline(InlineBuf::new())
    }

    /// Inline storage when `capacity <= N`, otherwise a heap buffer of exactly `capacity` slots.
    #[inline]
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        if capacity > N {
            HeapBuf::try_allocate(capacity).map(Self::Heap)
        } else {
            Ok(Self::new())
        }
    }

    #[inline(always)]
    pub(crate) const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }

    #[inline(always)]
    pub(crate) const fn capacity(&self) -> usize {
        match self {
            Self::Inline(_) => N,
            Self::Heap(heap) => heap.capacity(),
        }
    }

    #[inline(always)]
    pub(crate) const fn as_ptr(&self) -> *const T {
        match self {
            Self::Inline(inline) => inline.as_ptr(),
            Self::Heap(heap) => heap.as_ptr(),
        }
    }

    #[inline(always)]
    pub(crate) const fn as_mut_ptr(&mut self) -> *mut T {
        match self {
            Self::Inline(inline) => inline.as_mut_ptr(),
            Self::Heap(heap) => heap.as_mut_ptr(),
        }
    }
}
