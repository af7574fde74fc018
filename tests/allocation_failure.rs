use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use hybridvec::{HybridVec, TryReserveError};

/// Forwards to [`System`] but refuses allocations of exactly `FAIL_SIZE` bytes.
///
/// `FAIL_SIZE` is zero while disarmed, zero sized requests never reach the allocator.
struct FailingAlloc;

static FAIL_SIZE: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for FailingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.size() == FAIL_SIZE.load(Ordering::SeqCst) {
            return std::ptr::null_mut();
        }
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static ALLOC: FailingAlloc = FailingAlloc;

/// An element size nothing else in the test binary allocates in pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Block([u8; 1237]);

fn block(byte: u8) -> Block {
    Block([byte; 1237])
}

#[test]
fn failed_growth_leaves_the_vector_untouched() {
    let grown = Layout::array::<Block>(2).unwrap();
    let mut vec: HybridVec<Block, 1> = HybridVec::new();
    vec.push(block(1));

    FAIL_SIZE.store(grown.size(), Ordering::SeqCst);

    let expected = Err(TryReserveError::AllocationFailure { layout: grown });
    assert_eq!(vec.try_push(block(2)), expected);
    assert_eq!(vec.try_reserve(2), expected);

    let mut called = false;
    let result = vec.try_emplace_with(|| {
        called = true;
        block(3)
    });
    assert_eq!(result.map(|slot| *slot), expected.map(|()| block(3)));
    assert!(!called);

    assert!(vec.is_inline());
    assert_eq!(vec.capacity(), 1);
    assert_eq!(vec, [block(1)]);

    FAIL_SIZE.store(0, Ordering::SeqCst);

    assert_eq!(vec.try_push(block(2)), Ok(()));
    assert!(!vec.is_inline());
    assert_eq!(vec.capacity(), 2);
    assert_eq!(vec, [block(1), block(2)]);
}
