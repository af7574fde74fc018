//! Compares `HybridVec` against `Vec` and `SmallVec` on the operations it is built for.

use core::hint;
use criterion::{Bencher, Criterion, criterion_group, criterion_main};
use hybridvec::HybridVec;
use smallvec::SmallVec;
use std::sync::OnceLock;

use rand::Rng;

const SMALL_SIZE: usize = 16;
const LARGE_SIZE: usize = 40000;

/// A function used to generate a random amount of data.
///
/// Random sizes keep the compiler from specializing the measured loops
/// on a length it can see at compile time.
#[inline(never)]
fn gen_one(start: usize, end: usize) -> usize {
    let mut rng = rand::rng();
    rng.random_range(start..end)
}

/// Element count used by the small benchmarks, always below `SMALL_SIZE`.
static SMALL_BOUND: OnceLock<usize> = OnceLock::new();

/// Element count used by the large benchmarks.
static LARGE_BOUND: OnceLock<usize> = OnceLock::new();

#[inline(never)]
fn gen_rand(len: usize, start: u64, end: u64) -> Box<[u64]> {
    let mut rng = rand::rng();
    let mut vec: Vec<u64> = Vec::with_capacity(len);
    for _ in 0..len {
        vec.push(rng.random_range(start..end));
    }
    vec.into_boxed_slice()
}

/// The operations shared by every container under test.
trait VecLike {
    fn new_empty() -> Self;
    fn new_small() -> Self;
    fn new_large() -> Self;
    fn push(&mut self, value: u64);
    fn pop(&mut self) -> Option<u64>;
    fn get_mut(&mut self, index: usize) -> &mut u64;
    /// Used for quickly setting vector contents during testing.
    ///
    /// We use u64 testing and do not need to call [`Drop`].
    fn set_len(&mut self, len: usize);
}

macro_rules! impl_vec_like {
    ($name:ty, small = $small:expr) => {
        impl VecLike for $name {
            #[inline(always)]
            fn new_empty() -> Self {
                <$name>::new()
            }
            #[inline(always)]
            fn new_small() -> Self {
                $small
            }
            #[inline(always)]
            fn new_large() -> Self {
                <$name>::with_capacity(LARGE_SIZE)
            }
            #[inline(always)]
            fn push(&mut self, value: u64) {
                <$name>::push(self, value)
            }
            #[inline(always)]
            fn pop(&mut self) -> Option<u64> {
                <$name>::pop(self)
            }
            #[inline(always)]
            fn get_mut(&mut self, index: usize) -> &mut u64 {
                &mut self[index]
            }
            #[inline(always)]
            fn set_len(&mut self, len: usize) {
                unsafe { <$name>::set_len(self, len) }
            }
        }
    };
}

impl_vec_like!(Vec<u64>, small = Vec::with_capacity(SMALL_SIZE));
impl_vec_like!(SmallVec<u64, SMALL_SIZE>, small = SmallVec::new());
impl_vec_like!(HybridVec<u64, SMALL_SIZE>, small = HybridVec::new());

macro_rules! gen_bench_group {
    ($c:ident => $fn_name:ident) => {{
        let mut group = $c.benchmark_group(stringify!($fn_name));
        group.bench_function("Vec", |b| $fn_name::<Vec<u64>>(b));
        group.bench_function("SmallVec", |b| $fn_name::<SmallVec<u64, SMALL_SIZE>>(b));
        group.bench_function("HybridVec", |b| $fn_name::<HybridVec<u64, SMALL_SIZE>>(b));
    }};
}

fn bench_vec(c: &mut Criterion) {
    SMALL_BOUND.get_or_init(|| gen_one(14, 16));
    LARGE_BOUND.get_or_init(|| gen_one(36000, 36003));
    gen_bench_group!(c => new_empty);
    gen_bench_group!(c => new_large);
    gen_bench_group!(c => push_small_from_empty);
    gen_bench_group!(c => push_spill_from_empty);
    gen_bench_group!(c => push_large_from_empty);
    gen_bench_group!(c => pop_small);
    gen_bench_group!(c => index_small);
    gen_bench_group!(c => index_large);
}

/// Creation of an empty vector, no container allocates.
#[inline(never)]
fn new_empty<T: VecLike>(b: &mut Bencher) {
    b.iter(|| hint::black_box(T::new_empty()));
}

/// Creation with capacity `40000`, every container allocates.
#[inline(never)]
fn new_large<T: VecLike>(b: &mut Bencher) {
    b.iter(|| hint::black_box(T::new_large()));
}

/// 14-15 pushes into a fresh container.
///
/// Only `Vec` needs to allocate here, the other containers stay inline.
#[inline(never)]
fn push_small_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*SMALL_BOUND.get().unwrap(), 0, 9999);
    let index = gen_one(0, *SMALL_BOUND.get().unwrap());

    b.iter(|| {
        let mut vec = T::new_empty();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// Twice the inline capacity, so every container moves to the heap once.
#[inline(never)]
fn push_spill_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(SMALL_SIZE * 2, 0, 9999);
    let index = gen_one(0, SMALL_SIZE * 2);

    b.iter(|| {
        let mut vec = T::new_empty();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

/// 36000-36002 pushes into a fresh container, every container grows repeatedly.
#[inline(never)]
fn push_large_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*LARGE_BOUND.get().unwrap(), 0, 9999);
    let index = gen_rand(10, 0, *LARGE_BOUND.get().unwrap() as _);

    b.iter(|| {
        let mut vec = T::new_empty();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        for item in &index {
            counter += *vec.get_mut(*item as usize);
        }
        hint::black_box(counter)
    });
}

#[inline(never)]
fn pop_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    let data = gen_rand(*SMALL_BOUND.get().unwrap(), 0, 9999);
    for item in &data {
        vec.push(*item);
    }
    let len = data.len();

    b.iter(|| {
        let mut counter = 0u64;
        while let Some(v) = vec.pop() {
            counter += v;
        }
        vec.set_len(len);
        hint::black_box(counter)
    });
}

#[inline(never)]
fn index_small<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_small();
    let data = gen_rand(*SMALL_BOUND.get().unwrap(), 0, 9999);
    for item in &data {
        vec.push(*item);
    }
    let range = gen_rand(200, 0, data.len() as u64);

    b.iter(|| {
        let mut counter = 0u64;
        for item in &range {
            *vec.get_mut(*item as usize) += *item;
        }
        counter += *vec.get_mut(0);
        hint::black_box(counter)
    });
}

/// The data volume is 36000-36002.
#[inline(never)]
fn index_large<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::new_large();
    for item in gen_rand(*LARGE_BOUND.get().unwrap(), 0, 9999).iter() {
        vec.push(*item);
    }

    let index = gen_one(0, 36000);
    let range = gen_rand(2000, 0, 36000);

    b.iter(|| {
        let mut counter = 0u64;
        for item in &range {
            *vec.get_mut(*item as usize) += *item;
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(200)
        .warm_up_time(core::time::Duration::from_secs(3))
        .measurement_time(core::time::Duration::from_secs(8))
        .confidence_level(0.96)
        .noise_threshold(0.04);
    targets = bench_vec,
}
criterion_main!(benches);
