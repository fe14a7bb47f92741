/*
    dense gate kernels over a complex state vector.

    both kernels mutate the vector in place and never validate their inputs:
    target bits must be below log2(len), the two targets of a two-qubit gate must differ,
    and len must be a power of two. the checked entry point is `runtime::quantum_state`.
*/

mod single_qubit;
mod two_qubit;

pub use single_qubit::{apply_single_qubit_gate, apply_single_qubit_gate_with};
pub use two_qubit::{apply_two_qubit_gate, apply_two_qubit_gate_with};

use num_complex::Complex64;
use rayon::prelude::*;

// row-major
pub type Matrix2 = [[Complex64; 2]; 2];

// row-major, local index is 2 * bit(high) + bit(low)
pub type Matrix4 = [[Complex64; 4]; 4];

// `Partition::auto` splits vectors at least this long
pub const DEFAULT_PARALLEL_LEN: usize = 1 << 14;

/// How a kernel call splits its iteration space.
///
/// The kernel never spawns threads: `Static` work-shares over the rayon pool
/// the caller is running in (the global pool, or one entered with `install`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Serial,
    // contiguous ranges of the partition unit, one per worker
    Static,
}

impl Partition {
    pub fn auto(len: usize) -> Self {
        Self::with_threshold(len, DEFAULT_PARALLEL_LEN)
    }

    pub fn with_threshold(len: usize, min_len: usize) -> Self {
        if len >= min_len && rayon::current_num_threads() > 1 {
            Partition::Static
        } else {
            Partition::Serial
        }
    }
}

// runs `body(k)` for every k in 0..iters.
// static: at most one contiguous range of k per worker, no stealing below that size.
#[inline]
pub(crate) fn for_each_unit<F>(iters: usize, partition: Partition, body: F)
where
    F: Fn(usize) + Send + Sync,
{
    match partition {
        Partition::Serial => (0..iters).for_each(body),
        Partition::Static => {
            let per_worker = iters.div_ceil(rayon::current_num_threads()).max(1);
            (0..iters)
                .into_par_iter()
                .with_min_len(per_worker)
                .for_each(body);
        }
    }
}

// shared handle to the amplitudes for the duration of one kernel call.
// every index group is owned by exactly one partition unit, so two workers
// never read or write the same element.
#[derive(Clone, Copy)]
pub(crate) struct AmpPtr(*mut Complex64);

unsafe impl Send for AmpPtr {}
unsafe impl Sync for AmpPtr {}

impl AmpPtr {
    #[inline(always)]
    pub(crate) fn new(psi: &mut [Complex64]) -> Self {
        AmpPtr(psi.as_mut_ptr())
    }

    // caller guarantees `i` is in bounds and no other worker writes it
    #[inline(always)]
    pub(crate) unsafe fn get(&self, i: usize) -> &Complex64 {
        unsafe { &*self.0.add(i) }
    }

    // caller guarantees `i` is in bounds and owned by the current unit
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn get_mut(&self, i: usize) -> &mut Complex64 {
        unsafe { &mut *self.0.add(i) }
    }
}
