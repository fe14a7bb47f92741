use num_complex::Complex64;

use super::{for_each_unit, AmpPtr, Matrix2, Partition};
use crate::vectorization::{ComplexPair, PackedColumn};

// psi[i], psi[i + d0] <- m * (psi[i], psi[i + d0])
#[inline(always)]
unsafe fn kernel_core(psi: AmpPtr, i: usize, d0: usize, cols: &[PackedColumn; 2]) {
    // both inputs are read before either output is written
    let v = unsafe { [ComplexPair::splat(psi.get(i)), ComplexPair::splat(psi.get(i + d0))] };

    let out = v[0].mul_with(&cols[0]) + v[1].mul_with(&cols[1]);
    unsafe { out.store(psi.get_mut(i), psi.get_mut(i + d0)) };
}

#[inline(always)]
fn run<const MASKED: bool>(
    psi: &mut [Complex64],
    d0: usize,
    cols: &[PackedColumn; 2],
    ctrl_mask: usize,
    partition: Partition,
) {
    let block = 2 * d0;
    let blocks = psi.len() / block;
    let amps = AmpPtr::new(psi);

    for_each_unit(blocks, partition, |b| {
        let i0 = b * block;
        for i1 in 0..d0 {
            let i = i0 + i1;
            if !MASKED || (i & ctrl_mask) == ctrl_mask {
                // block b owns [i0, i0 + block), which holds both i and i + d0
                unsafe { kernel_core(amps, i, d0, cols) };
            }
        }
    });
}

/// Applies the 2x2 `m` to every amplitude pair split by bit `id0`, in place.
///
/// A pair `(i, i + 2^id0)` is transformed only when `i & ctrl_mask == ctrl_mask`;
/// a zero mask transforms every pair. The iteration space is split with
/// `Partition::auto`.
pub fn apply_single_qubit_gate(psi: &mut [Complex64], id0: usize, m: &Matrix2, ctrl_mask: usize) {
    let partition = Partition::auto(psi.len());
    apply_single_qubit_gate_with(psi, id0, m, ctrl_mask, partition);
}

/// `apply_single_qubit_gate` with an explicit `Partition`.
pub fn apply_single_qubit_gate_with(
    psi: &mut [Complex64],
    id0: usize,
    m: &Matrix2,
    ctrl_mask: usize,
    partition: Partition,
) {
    let d0 = 1usize << id0;
    debug_assert!(psi.len().is_power_of_two() && 2 * d0 <= psi.len());

    // column k packs (m[0][k], m[1][k]); its permuted form is computed here, once
    let cols = [
        PackedColumn::new(&m[0][0], &m[1][0]),
        PackedColumn::new(&m[0][1], &m[1][1]),
    ];

    if ctrl_mask == 0 {
        run::<false>(psi, d0, &cols, ctrl_mask, partition);
    } else {
        run::<true>(psi, d0, &cols, ctrl_mask, partition);
    }
}
