use alloc::vec::Vec;
use core::{
    fmt,
    iter::FusedIterator,
    mem::{self, ManuallyDrop},
    ptr, slice,
};

use crate::error::{OutOfRange, TryReserveError};
use crate::raw::{Buffer, HeapBuf};
use crate::utils::{cold_path, infallible};

/// A vector that keeps up to `N` elements inline and moves them to the heap when it outgrows them.
///
/// Storage is either the inline buffer embedded in the container or an exclusively owned heap
/// buffer. Once a `HybridVec` has moved to the heap it stays there: truncating, clearing or
/// popping never releases the heap buffer.
///
/// When an append finds the container full, the capacity doubles (`N == 0` grows to `1`).
/// [`reserve`](HybridVec::reserve) and [`resize`](HybridVec::resize) allocate exactly what they
/// are asked for.
///
/// # Examples
///
/// ```
/// use hybridvec::HybridVec;
///
/// let mut vec: HybridVec<i32, 4> = HybridVec::new();
/// assert_eq!(vec.capacity(), 4);
///
/// for i in 0..4 {
///     vec.push(i);
/// }
/// assert!(vec.is_inline());
/// assert_eq!(vec.capacity(), 4);
///
/// // The fifth element does not fit, the data moves to an 8 slot heap buffer.
/// vec.push(4);
/// assert!(!vec.is_inline());
/// assert_eq!(vec.capacity(), 8);
/// assert_eq!(vec, [0, 1, 2, 3, 4]);
///
/// // Shrinking the length keeps the heap buffer.
/// vec.clear();
/// assert!(!vec.is_inline());
/// assert_eq!(vec.capacity(), 8);
/// ```
///
/// # Moves
///
/// Moving a `HybridVec` by value moves its storage along with it. To move the contents out
/// while keeping the source usable, use [`take`](HybridVec::take) or
/// [`move_from`](HybridVec::move_from); both leave the source empty and inline.
///
/// # ZST support
///
/// Zero sized types never allocate. The capacity is still tracked, so the inline and heap
/// transitions behave exactly as for other types.
pub struct HybridVec<T, const N: usize> {
    buf: Buffer<T, N>,
    len: usize,
}

impl<T, const N: usize> Drop for HybridVec<T, N> {
    // Slots are `MaybeUninit`, live elements have to be dropped manually.
    // The heap buffer itself is released by `HeapBuf`.
    fn drop(&mut self) {
        if self.len > 0 {
            // SAFETY: `[0, len)` holds live elements.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len));
            }
        }
    }
}

/// Creates a [`HybridVec`] containing the arguments.
///
/// The syntax is similar to [`vec!`](https://doc.rust-lang.org/std/macro.vec.html).
/// The inline capacity comes from the target type; more elements than it can hold
/// are placed in a heap buffer of exactly the right size.
///
/// # Examples
///
/// ```
/// # use hybridvec::{hybridvec, HybridVec};
/// let vec: HybridVec<String, 4> = hybridvec![];
/// assert!(vec.is_empty());
///
/// let vec: HybridVec<i64, 4> = hybridvec![7; 3]; // Needs `Clone`.
/// assert_eq!(vec, [7, 7, 7]);
///
/// let vec: HybridVec<_, 4> = hybridvec![1, 2, 3, 4, 5, 6];
/// assert!(!vec.is_inline());
/// assert_eq!(vec.capacity(), 6);
/// ```
#[macro_export]
macro_rules! hybridvec {
    [] => { $crate::HybridVec::new() };
    [$elem:expr; $n:expr] => { $crate::HybridVec::from_elem($elem, $n) };
    [$($item:expr),+ $(,)?] => { $crate::HybridVec::from_buf([ $($item),+ ]) };
}

impl<T, const N: usize> HybridVec<T, N> {
    /// Constructs a new, empty `HybridVec` using the inline buffer.
    ///
    /// This never allocates and can be evaluated at compile time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::HybridVec;
    /// let vec: HybridVec<i32, 8> = HybridVec::new();
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.capacity(), 8);
    /// assert!(vec.is_inline());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: Buffer::new(),
            len: 0,
        }
    }

    /// Constructs a new, empty `HybridVec` able to hold `capacity` elements without reallocating.
    ///
    /// If `capacity <= N` this is the same as [`new`](HybridVec::new).
    /// Otherwise a heap buffer of exactly `capacity` slots is allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::HybridVec;
    /// let vec: HybridVec<i32, 5> = HybridVec::with_capacity(4);
    /// assert!(vec.is_inline());
    /// assert_eq!(vec.capacity(), 5);
    ///
    /// let vec: HybridVec<i32, 5> = HybridVec::with_capacity(10);
    /// assert!(!vec.is_inline());
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: infallible(Buffer::try_with_capacity(capacity)),
            len: 0,
        }
    }

    /// Creates a `HybridVec` from an array, moving its elements.
    ///
    /// The inline buffer is used when `P <= N`, otherwise a heap buffer of exactly `P` slots.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridVec;
    /// let vec: HybridVec<i32, 5> = HybridVec::from_buf([1, 2, 3]);
    /// assert_eq!(vec.len(), 3);
    /// assert!(vec.is_inline());
    /// ```
    #[inline]
    pub fn from_buf<const P: usize>(arr: [T; P]) -> Self {
        let arr = ManuallyDrop::new(arr);
        let mut vec = Self::with_capacity(P);
        // SAFETY: capacity >= P, and `arr` will not drop the moved elements.
        unsafe {
            ptr::copy_nonoverlapping(arr.as_ptr(), vec.as_mut_ptr(), P);
            vec.set_len(P);
        }
        vec
    }

    /// Creates a `HybridVec` holding `count` clones of `elem`.
    ///
    /// The capacity is `max(N, count)`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridVec;
    /// let vec: HybridVec<String, 2> = HybridVec::from_elem("ab".to_string(), 3);
    /// assert_eq!(vec, ["ab", "ab", "ab"]);
    /// assert_eq!(vec.capacity(), 3);
    /// ```
    pub fn from_elem(elem: T, count: usize) -> Self
    where
        T: Clone,
    {
        let mut vec = Self::with_capacity(count);
        if count > 0 {
            for _ in 1..count {
                // SAFETY: capacity >= count.
                unsafe { vec.push_unchecked(elem.clone()) };
            }
            // SAFETY: capacity >= count.
            unsafe { vec.push_unchecked(elem) };
        }
        vec
    }

    /// Creates a `HybridVec` holding `count` default values.
    ///
    /// The capacity is `max(N, count)`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridVec;
    /// let vec: HybridVec<u8, 4> = HybridVec::with_len(6);
    /// assert_eq!(vec, [0; 6]);
    /// assert_eq!(vec.capacity(), 6);
    /// ```
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        let mut vec = Self::with_capacity(count);
        for _ in 0..count {
            // SAFETY: capacity >= count.
            unsafe { vec.push_unchecked(T::default()) };
        }
        vec
    }

    /// Returns `true` if the elements live in the inline buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::HybridVec;
    /// let mut vec: HybridVec<i32, 8> = HybridVec::new();
    /// assert!(vec.is_inline());
    ///
    /// vec.reserve(10);
    /// assert!(!vec.is_inline());
    /// ```
    #[inline(always)]
    pub const fn is_inline(&self) -> bool {
        self.buf.is_inline()
    }

    /// Returns the inline capacity `N`.
    #[inline(always)]
    pub const fn inline_capacity(&self) -> usize {
        N
    }

    /// Returns the number of elements the vector can hold without reallocating.
    ///
    /// This is `N` while the data is inline and always greater than `N` once it is on the heap.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the number of elements in the vector.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector contains no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a raw pointer to the active buffer.
    ///
    /// The pointer is invalidated by any reallocation and by moving the vector while it is inline.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a raw mutable pointer to the active buffer.
    ///
    /// The pointer is invalidated by any reallocation and by moving the vector while it is inline.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Extracts a slice containing the entire vector.
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` holds live elements.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice of the entire vector.
    #[inline]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `[0, len)` holds live elements.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Forces the length of the vector to `new_len`.
    ///
    /// This is a low-level operation that maintains none of the normal invariants of the type.
    ///
    /// # Safety
    /// - `new_len` needs to be less than or equal to [`capacity`](HybridVec::capacity).
    /// - If the length is increased, the new elements must be initialized.
    /// - If the length is reduced, the removed elements are leaked rather than dropped.
    ///
    /// See more information in [`Vec::set_len`].
    #[inline(always)]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    /// [`OutOfRange`] if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{hybridvec, HybridVec, OutOfRange};
    /// let vec: HybridVec<_, 4> = hybridvec![10, 20, 30];
    /// assert_eq!(vec.at(2), Ok(&30));
    /// assert_eq!(vec.at(3), Err(OutOfRange { index: 3, len: 3 }));
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        if index < self.len {
            // SAFETY: index < len
            Ok(unsafe { self.at_unchecked(index) })
        } else {
            Err(OutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    /// [`OutOfRange`] if `index >= len`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        if index < self.len {
            // SAFETY: index < len
            Ok(unsafe { self.at_unchecked_mut(index) })
        } else {
            Err(OutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// Indexing through `vec[index]` is checked and panics; this is the zero overhead path.
    ///
    /// # Safety
    /// `index < len`. Debug builds assert it.
    #[inline(always)]
    pub unsafe fn at_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "at_unchecked index out of bounds");
        unsafe { &*self.as_ptr().add(index) }
    }

    /// Returns a mutable reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    /// `index < len`. Debug builds assert it.
    #[inline(always)]
    pub unsafe fn at_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "at_unchecked_mut index out of bounds");
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    /// Returns the first element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn front(&self) -> &T {
        assert!(self.len > 0, "front() called on an empty HybridVec");
        // SAFETY: len > 0
        unsafe { self.at_unchecked(0) }
    }

    /// Returns the first element mutably.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        assert!(self.len > 0, "front_mut() called on an empty HybridVec");
        // SAFETY: len > 0
        unsafe { self.at_unchecked_mut(0) }
    }

    /// Returns the last element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn back(&self) -> &T {
        assert!(self.len > 0, "back() called on an empty HybridVec");
        // SAFETY: len > 0
        unsafe { self.at_unchecked(self.len - 1) }
    }

    /// Returns the last element mutably.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        assert!(self.len > 0, "back_mut() called on an empty HybridVec");
        let last = self.len - 1;
        // SAFETY: len > 0
        unsafe { self.at_unchecked_mut(last) }
    }

    /// # Safety
    /// `len < capacity`
    #[inline(always)]
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        unsafe {
            ptr::write(self.as_mut_ptr().add(self.len), value);
        }
        self.len += 1;
    }

    /// Doubles the capacity, or makes room for one element when it is zero.
    #[inline(never)]
    fn try_grow(&mut self) -> Result<(), TryReserveError> {
        let doubled = self
            .capacity()
            .checked_mul(2)
            .ok_or(TryReserveError::CapacityOverflow)?;
        self.try_reserve(doubled.max(1))
    }

    /// Appends an element to the back of the vector.
    ///
    /// When the vector is full the capacity doubles first, moving the data to the heap
    /// if it was inline.
    ///
    /// # Time complexity
    /// Amortized O(1).
    ///
    /// # Panics
    /// Panics if the new capacity overflows. Allocation failure aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut vec: HybridVec<_, 2> = hybridvec![1, 2];
    /// vec.push(3);
    /// assert_eq!(vec, [1, 2, 3]);
    /// assert_eq!(vec.capacity(), 4);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        infallible(self.try_push(value))
    }

    /// Appends an element, reporting allocation failure instead of panicking.
    ///
    /// On failure `value` is dropped and the vector is left unchanged.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), TryReserveError> {
        if self.len == self.capacity() {
            cold_path();
            self.try_grow()?;
        }
        // SAFETY: len < capacity
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// Constructs a new element at the back of the vector from `f` and returns a reference to it.
    ///
    /// The capacity is secured before `f` runs, so the value is written straight into its slot.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridVec;
    /// let mut vec: HybridVec<(u32, String), 2> = HybridVec::new();
    /// let slot = vec.emplace_with(|| (1, "one".to_string()));
    /// slot.0 += 1;
    /// assert_eq!(vec[0], (2, "one".to_string()));
    /// ```
    #[inline]
    pub fn emplace_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        infallible(self.try_emplace_with(f))
    }

    /// Fallible version of [`emplace_with`](HybridVec::emplace_with).
    ///
    /// `f` is not called if growing fails.
    pub fn try_emplace_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<&mut T, TryReserveError> {
        if self.len == self.capacity() {
            cold_path();
            self.try_grow()?;
        }
        // SAFETY: len < capacity, the slot is uninitialized.
        unsafe {
            let slot = self.as_mut_ptr().add(self.len);
            slot.write(f());
            self.len += 1;
            Ok(&mut *slot)
        }
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    ///
    /// The storage is never released, even when the vector becomes empty.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut vec: HybridVec<_, 4> = hybridvec![1, 2];
    /// assert_eq!(vec.pop(), Some(2));
    /// assert_eq!(vec.pop(), Some(1));
    /// assert_eq!(vec.pop(), None);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was live and is no longer tracked.
        unsafe { Some(ptr::read(self.as_ptr().add(self.len))) }
    }

    /// Shortens the vector, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater or equal to the current length, this has no effect.
    /// The capacity and the storage kind are unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        // Shrink first so a panicking destructor cannot cause a double drop.
        self.len = len;
        // SAFETY: `[len, len + tail)` were live elements.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.as_mut_ptr().add(len),
                tail,
            ));
        }
    }

    /// Drops all elements.
    ///
    /// The capacity and the storage kind are unchanged.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut vec: HybridVec<_, 2> = hybridvec![1, 2, 3];
    /// vec.clear();
    /// assert!(vec.is_empty());
    /// assert!(!vec.is_inline());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Makes sure the vector can hold `new_capacity` elements in total.
    ///
    /// Unlike [`Vec::reserve`], the argument is the total capacity, not an increment.
    /// Nothing happens if the current capacity is already sufficient. Otherwise a heap
    /// buffer of exactly `new_capacity` slots replaces the current storage.
    ///
    /// # Panics
    /// Panics if the capacity overflows. Allocation failure aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridVec;
    /// let mut vec: HybridVec<i32, 8> = HybridVec::new();
    /// vec.reserve(5); // do nothing
    /// assert!(vec.is_inline());
    ///
    /// vec.reserve(10);
    /// assert!(!vec.is_inline());
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    #[inline]
    pub fn reserve(&mut self, new_capacity: usize) {
        infallible(self.try_reserve(new_capacity))
    }

    /// Fallible version of [`reserve`](HybridVec::reserve).
    ///
    /// The new buffer is allocated before any element moves, so on error the vector is untouched.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, TryReserveError};
    /// let mut vec: HybridVec<u64, 2> = HybridVec::from_buf([1, 2]);
    /// assert_eq!(vec.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    /// assert_eq!(vec, [1, 2]);
    /// assert!(vec.is_inline());
    /// ```
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        let mut heap = HeapBuf::try_allocate(new_capacity)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            len = self.len,
            old_capacity = self.capacity(),
            new_capacity,
            spill = self.is_inline(),
            "reallocating HybridVec storage"
        );

        // SAFETY: both buffers hold at least `len` slots and are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), heap.as_mut_ptr(), self.len);
        }
        // The old buffer only holds moved-out bits now, dropping it releases memory only.
        self.buf = Buffer::Heap(heap);
        Ok(())
    }

    /// Resizes the vector in place so that `len` is equal to `new_len`, filling new slots with `f`.
    ///
    /// Growing past the capacity reserves exactly `new_len` slots.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        if new_len > self.capacity() {
            self.reserve(new_len);
        }
        while self.len < new_len {
            // SAFETY: capacity >= new_len > len
            unsafe { self.push_unchecked(f()) };
        }
    }

    /// Resizes the vector in place so that `len` is equal to `new_len`.
    ///
    /// New slots hold `T::default()`, a shorter length drops the tail.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut vec: HybridVec<i32, 4> = hybridvec![1, 2, 3];
    /// vec.resize(6);
    /// assert_eq!(vec, [1, 2, 3, 0, 0, 0]);
    /// assert_eq!(vec.capacity(), 6);
    ///
    /// vec.resize(2);
    /// assert_eq!(vec, [1, 2]);
    /// assert_eq!(vec.capacity(), 6);
    /// ```
    #[inline]
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Replaces the contents with the items of `iter`.
    ///
    /// The vector is cleared and then appended to one element at a time, so it may reallocate
    /// several times. The existing storage is reused when it is large enough.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut vec: HybridVec<_, 2> = hybridvec![9, 9, 9];
    /// vec.assign([1, 2]);
    /// assert_eq!(vec, [1, 2]);
    /// ```
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.clear();
        for item in iter {
            self.push(item);
        }
    }

    /// Moves the contents out, leaving `self` empty and inline.
    ///
    /// A heap buffer changes owner without copying elements.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut src: HybridVec<_, 2> = hybridvec![1, 2, 3];
    /// let dst = src.take();
    ///
    /// assert_eq!(dst, [1, 2, 3]);
    /// assert!(src.is_empty());
    /// assert!(src.is_inline());
    /// assert_eq!(src.capacity(), 2);
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Replaces the contents of `self` with the contents of `source`, leaving `source` empty and inline.
    ///
    /// The current elements are dropped and a current heap buffer is released.
    /// A heap-backed `source` hands over its buffer; inline elements are moved one by one.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridVec, hybridvec};
    /// let mut dst: HybridVec<_, 2> = hybridvec![0; 5];
    /// let mut src: HybridVec<_, 2> = hybridvec![1];
    /// dst.move_from(&mut src);
    ///
    /// assert_eq!(dst, [1]);
    /// assert!(dst.is_inline());
    /// assert!(src.is_empty());
    /// ```
    #[inline]
    pub fn move_from(&mut self, source: &mut Self) {
        *self = source.take();
    }

    /// Converts the vector into a [`Vec`].
    ///
    /// Inline data is copied into an allocation of exactly `len` elements,
    /// a heap buffer is handed over without copying.
    pub fn into_vec(self) -> Vec<T> {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        let ptr = this.as_mut_ptr();
        match &this.buf {
            Buffer::Inline(_) => {
                let mut vec = Vec::with_capacity(len);
                // SAFETY: the elements are moved out and `this` is never dropped.
                unsafe {
                    ptr::copy_nonoverlapping(ptr, vec.as_mut_ptr(), len);
                    vec.set_len(len);
                }
                vec
            }
            // SAFETY: the buffer came from the global allocator with `Layout::array::<T>(cap)`,
            // and `this` is never dropped, so ownership moves to the `Vec`.
            Buffer::Heap(heap) => unsafe { Vec::from_raw_parts(ptr, len, heap.capacity()) },
        }
    }
}

impl<T, const N: usize> Default for HybridVec<T, N> {
    /// Same as [`HybridVec::new`].
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for HybridVec<T, N> {
    /// Copies every element into storage of the same kind and capacity as `self`.
    fn clone(&self) -> Self {
        let mut vec = Self::with_capacity(self.capacity());
        for item in self.as_slice() {
            // SAFETY: capacity == self.capacity() >= self.len
            unsafe { vec.push_unchecked(item.clone()) };
        }
        vec
    }

    /// Clears `self` and appends clones of `source` one by one, see [`HybridVec::assign`].
    fn clone_from(&mut self, source: &Self) {
        self.assign(source.as_slice().iter().cloned());
    }
}

impl<T, const N: usize> IntoIterator for HybridVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    #[inline]
    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.len;
        // The iterator owns the elements from now on; the vector keeps only the buffer.
        self.len = 0;
        IntoIter {
            vec: self,
            start: 0,
            end,
        }
    }
}

/// An iterator that consumes a [`HybridVec`] and yields its items by value.
pub struct IntoIter<T, const N: usize> {
    vec: HybridVec<T, N>,
    start: usize,
    end: usize,
}

impl<T, const N: usize> IntoIter<T, N> {
    /// Returns the remaining items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` are live and not yet yielded.
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `[start, end)` are live and not yet yielded.
        unsafe {
            slice::from_raw_parts_mut(self.vec.as_mut_ptr().add(self.start), self.end - self.start)
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            let index = self.start;
            self.start += 1;
            // SAFETY: index < end, the slot is live and is read only once.
            unsafe { Some(ptr::read(self.vec.as_ptr().add(index))) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let v = self.end - self.start;
        (v, Some(v))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            self.end -= 1;
            // SAFETY: start <= end < old end, the slot is live and is read only once.
            unsafe { Some(ptr::read(self.vec.as_ptr().add(self.end))) }
        } else {
            None
        }
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for IntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        if self.start < self.end {
            // SAFETY: `[start, end)` are live and not yet yielded.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.vec.as_mut_ptr().add(self.start),
                    self.end - self.start,
                ));
            }
        }
    }
}
