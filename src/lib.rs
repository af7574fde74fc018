//! ## Intro
//!
//! A vector that stores small collections inside its own footprint and moves to
//! the heap only when they grow past a compile-time inline capacity.
//!
//! Many workloads build short sequences on hot paths: argument lists, path components,
//! small adjacency lists. Most of them never exceed a handful of elements, but a few
//! occasionally do. [`HybridVec`] keeps the common case allocation free and still grows
//! without limit.
//!
//! ```
//! # use hybridvec::{HybridVec, hybridvec};
//! let mut vec: HybridVec<i32, 4> = hybridvec![0, 1, 2, 3];
//! assert!(vec.is_inline()); // No allocation so far.
//!
//! vec.push(4); // Full, the data moves to a heap buffer twice the size.
//! assert!(!vec.is_inline());
//! assert_eq!(vec.capacity(), 8);
//! assert_eq!(vec, [0, 1, 2, 3, 4]);
//! ```
//!
//! ## Storage model
//!
//! | State | Capacity | Entered by |
//! |-------|----------|------------|
//! | inline | exactly `N` | construction with at most `N` elements |
//! | heap | greater than `N` | any reservation past the current capacity |
//!
//! The move to the heap is one-way: truncating, clearing or popping never gives the
//! heap buffer back. Appending to a full vector doubles its capacity (a zero capacity
//! grows to one). Explicit [`reserve`](HybridVec::reserve) and
//! [`resize`](HybridVec::resize) calls allocate exactly the requested size.
//!
//! ## Element access
//!
//! - `vec[i]` checks the bounds and panics.
//! - [`at`](HybridVec::at) returns [`OutOfRange`] instead.
//! - [`at_unchecked`](HybridVec::at_unchecked) performs no check at all.
//!
//! ## Errors
//!
//! Growth has fallible counterparts ([`try_push`](HybridVec::try_push),
//! [`try_reserve`](HybridVec::try_reserve), ...) that return [`TryReserveError`].
//! A failed growth leaves the vector untouched.
//!
//! ## `no_std` support
//!
//! This crate requires only `core` and `alloc`.
//!
//! ## Optional features
//!
//! ### `tracing`
//!
//! Emits a `trace` level [`tracing`](https://docs.rs/tracing) event whenever the storage
//! is reallocated, including the move from the inline buffer to the heap.
#![no_std]

extern crate alloc;

mod error;
mod impls;
mod raw;
mod utils;

pub mod hybrid_vec;

#[doc(inline)]
pub use error::{OutOfRange, TryReserveError};
#[doc(inline)]
pub use hybrid_vec::{HybridVec, IntoIter};
