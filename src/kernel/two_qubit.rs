use num_complex::Complex64;

use super::{for_each_unit, AmpPtr, Matrix4, Partition};
use crate::vectorization::{ComplexPair, PackedColumn};

// strides of one quadruple plus the packed matrix, shared by every unit
struct Quad {
    d0: usize,
    d1: usize,
    // cols[k] = (m[0][k], m[1][k]), cols[4 + k] = (m[2][k], m[3][k])
    cols: [PackedColumn; 8],
}

#[inline(always)]
unsafe fn kernel_core(psi: AmpPtr, i: usize, q: &Quad) {
    let (d0, d1) = (q.d0, q.d1);

    // all four inputs are captured before any output is written
    let v = unsafe {
        [
            ComplexPair::splat(psi.get(i)),
            ComplexPair::splat(psi.get(i + d0)),
            ComplexPair::splat(psi.get(i + d1)),
            ComplexPair::splat(psi.get(i + d0 + d1)),
        ]
    };

    let upper = v[0].mul_with(&q.cols[0])
        + v[1].mul_with(&q.cols[1])
        + v[2].mul_with(&q.cols[2])
        + v[3].mul_with(&q.cols[3]);
    let lower = v[0].mul_with(&q.cols[4])
        + v[1].mul_with(&q.cols[5])
        + v[2].mul_with(&q.cols[6])
        + v[3].mul_with(&q.cols[7]);

    unsafe {
        upper.store(psi.get_mut(i), psi.get_mut(i + d0));
        lower.store(psi.get_mut(i + d1), psi.get_mut(i + d0 + d1));
    }
}

#[inline(always)]
fn run<const MASKED: bool>(psi: &mut [Complex64], q: &Quad, ctrl_mask: usize, partition: Partition) {
    // traversal order only; which coefficient meets which amplitude is fixed by d0/d1
    let (d_hi, d_lo) = if q.d0 > q.d1 { (q.d0, q.d1) } else { (q.d1, q.d0) };

    let outer = psi.len() / (2 * d_hi);
    let middle = d_hi / (2 * d_lo);
    let amps = AmpPtr::new(psi);

    // outer x middle collapsed into one partitionable range
    for_each_unit(outer * middle, partition, |k| {
        let i0 = (k / middle) * 2 * d_hi;
        let i1 = (k % middle) * 2 * d_lo;
        for i2 in 0..d_lo {
            let i = i0 + i1 + i2;
            if !MASKED || (i & ctrl_mask) == ctrl_mask {
                // base i has both target bits clear; its quadruple belongs to unit k alone
                unsafe { kernel_core(amps, i, q) };
            }
        }
    });
}

/// Applies the 4x4 `m` to every amplitude quadruple split by bits `id1` and
/// `id0`, in place.
///
/// `id1` is the more significant qubit of the matrix's local index: row/column
/// `2 * b1 + b0` addresses `i + b1 * 2^id1 + b0 * 2^id0`. A quadruple is
/// transformed only when its base `i` satisfies `i & ctrl_mask == ctrl_mask`.
pub fn apply_two_qubit_gate(
    psi: &mut [Complex64],
    id1: usize,
    id0: usize,
    m: &Matrix4,
    ctrl_mask: usize,
) {
    let partition = Partition::auto(psi.len());
    apply_two_qubit_gate_with(psi, id1, id0, m, ctrl_mask, partition);
}

/// `apply_two_qubit_gate` with an explicit `Partition`.
pub fn apply_two_qubit_gate_with(
    psi: &mut [Complex64],
    id1: usize,
    id0: usize,
    m: &Matrix4,
    ctrl_mask: usize,
    partition: Partition,
) {
    debug_assert_ne!(id0, id1);
    let d0 = 1usize << id0;
    let d1 = 1usize << id1;
    debug_assert!(psi.len().is_power_of_two() && 2 * d0.max(d1) <= psi.len());

    let cols = std::array::from_fn(|c| {
        let (row, k) = (2 * (c / 4), c % 4);
        PackedColumn::new(&m[row][k], &m[row + 1][k])
    });
    let q = Quad { d0, d1, cols };

    if ctrl_mask == 0 {
        run::<false>(psi, &q, ctrl_mask, partition);
    } else {
        run::<true>(psi, &q, ctrl_mask, partition);
    }
}
