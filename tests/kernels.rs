use num_complex::Complex64;
use qsvk::gates::{self, Gate};
use qsvk::kernel::{apply_single_qubit_gate_with, apply_two_qubit_gate_with};
use qsvk::{apply_single_qubit_gate, apply_two_qubit_gate, Matrix2, Matrix4, Partition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// --- common test helpers ---

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

// creates an initial state vector for n qubits, with |0...0> = 1.0.
fn initial_state(num_qubits: usize) -> Vec<Complex64> {
    let mut amps = vec![c(0.0, 0.0); 1 << num_qubits];
    amps[0] = c(1.0, 0.0);
    amps
}

fn random_state(num_qubits: usize, seed: u64) -> Vec<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..1 << num_qubits)
        .map(|_| c(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

fn random_matrix4(seed: u64) -> Matrix4 {
    let mut rng = StdRng::seed_from_u64(seed);
    std::array::from_fn(|_| std::array::from_fn(|_| c(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))))
}

// asserts that two complex numbers are approximately equal.
fn assert_complex_approx_eq(a: Complex64, b: Complex64, epsilon: f64) {
    assert!((a.re - b.re).abs() < epsilon, "real parts differ: {} vs {}", a.re, b.re);
    assert!((a.im - b.im).abs() < epsilon, "imaginary parts differ: {} vs {}", a.im, b.im);
}

// asserts that two vectors of complex numbers are approximately equal.
fn assert_amps_approx_eq(actual: &[Complex64], expected: &[Complex64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "amplitude vectors have different lengths");
    for i in 0..actual.len() {
        assert_complex_approx_eq(actual[i], expected[i], epsilon);
    }
}

// straightforward per-pair reference with the same summation order as the kernel
fn reference_single(psi: &[Complex64], id0: usize, m: &Matrix2, mask: usize) -> Vec<Complex64> {
    let mut out = psi.to_vec();
    let d0 = 1 << id0;
    for i in (0..psi.len()).filter(|i| i & d0 == 0 && i & mask == mask) {
        let (a, b) = (psi[i], psi[i + d0]);
        out[i] = m[0][0] * a + m[0][1] * b;
        out[i + d0] = m[1][0] * a + m[1][1] * b;
    }
    out
}

fn reference_two(psi: &[Complex64], id1: usize, id0: usize, m: &Matrix4, mask: usize) -> Vec<Complex64> {
    let mut out = psi.to_vec();
    let (d0, d1) = (1 << id0, 1 << id1);
    for i in (0..psi.len()).filter(|i| i & (d0 | d1) == 0 && i & mask == mask) {
        let idx = [i, i + d0, i + d1, i + d0 + d1];
        let v = idx.map(|k| psi[k]);
        for (row, &target) in idx.iter().enumerate() {
            out[target] = m[row][0] * v[0] + m[row][1] * v[1] + m[row][2] * v[2] + m[row][3] * v[3];
        }
    }
    out
}

fn scaled_identity2(s: f64) -> Matrix2 {
    [[c(s, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(s, 0.0)]]
}

fn scaled_identity4(s: f64) -> Matrix4 {
    let mut m = [[c(0.0, 0.0); 4]; 4];
    for (k, row) in m.iter_mut().enumerate() {
        row[k] = c(s, 0.0);
    }
    m
}

// --- single-qubit kernel ---

#[test]
fn test_hadamard_like_on_first_pair() {
    let mut psi = initial_state(2);
    let h = c(0.7071, 0.0);
    let m = [[h, h], [h, -h]];
    apply_single_qubit_gate(&mut psi, 0, &m, 0);
    assert_amps_approx_eq(&psi, &[h, h, c(0.0, 0.0), c(0.0, 0.0)], 1e-12);
}

#[test]
fn test_single_qubit_control_mask_selects_pairs() {
    let mut psi = vec![c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), c(4.0, 0.0)];
    apply_single_qubit_gate(&mut psi, 0, &gates::pauli_x(), 0b10);
    // pair at base 0 untouched, pair at base 2 swapped
    assert_eq!(psi, vec![c(1.0, 0.0), c(2.0, 0.0), c(4.0, 0.0), c(3.0, 0.0)]);
}

#[test]
fn test_single_qubit_matches_reference_on_every_target() {
    let m: Matrix2 = [[c(0.6, 0.1), c(-0.2, 0.7)], [c(0.3, -0.5), c(0.9, 0.05)]];
    for id0 in 0..6 {
        let psi = random_state(6, 11 + id0 as u64);
        let expected = reference_single(&psi, id0, &m, 0);
        let mut actual = psi.clone();
        apply_single_qubit_gate(&mut actual, id0, &m, 0);
        assert_eq!(actual, expected, "target {}", id0);
    }
}

#[test]
fn test_single_qubit_masked_groups_are_bit_for_bit_unchanged() {
    let psi = random_state(5, 3);
    let mask = 0b10100;
    let mut actual = psi.clone();
    apply_single_qubit_gate(&mut actual, 1, &gates::hadamard(), mask);
    for i in 0..psi.len() {
        let base = i & !0b10;
        if base & mask != mask {
            assert_eq!(actual[i].re.to_bits(), psi[i].re.to_bits());
            assert_eq!(actual[i].im.to_bits(), psi[i].im.to_bits());
        }
    }
    assert_eq!(actual, reference_single(&psi, 1, &gates::hadamard(), mask));
}

#[test]
fn test_single_qubit_identity_is_exact() {
    let psi = random_state(4, 5);
    for id0 in 0..4 {
        let mut out = psi.clone();
        apply_single_qubit_gate(&mut out, id0, &gates::identity2(), 0);
        assert_eq!(out, psi);
    }
}

#[test]
fn test_single_qubit_touches_each_amplitude_once() {
    // 2 * I doubles every amplitude visited; twice would give 4, never would give 1
    for id0 in 0..5 {
        let mut psi = vec![c(1.0, 1.0); 1 << 5];
        apply_single_qubit_gate(&mut psi, id0, &scaled_identity2(2.0), 0);
        assert!(psi.iter().all(|a| *a == c(2.0, 2.0)), "target {}", id0);
    }
}

#[test]
fn test_single_qubit_on_one_qubit_state() {
    let mut psi = vec![c(0.0, 1.0), c(1.0, 0.0)];
    apply_single_qubit_gate(&mut psi, 0, &gates::pauli_y(), 0);
    // Y (i|0> + |1>) = -i|0> - |1>
    assert_amps_approx_eq(&psi, &[c(0.0, -1.0), c(-1.0, 0.0)], 1e-15);
}

#[test]
fn test_single_qubit_static_matches_serial() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().expect("pool");
    let m = gates::rx(0.37);
    let psi = random_state(10, 17);
    for (id0, mask) in [(0, 0), (3, 0), (9, 0), (2, 0b1000010000)] {
        let mut serial = psi.clone();
        apply_single_qubit_gate_with(&mut serial, id0, &m, mask, Partition::Serial);
        let mut parallel = psi.clone();
        pool.install(|| apply_single_qubit_gate_with(&mut parallel, id0, &m, mask, Partition::Static));
        assert_eq!(serial, parallel, "target {} mask {:#b}", id0, mask);
    }
}

// --- two-qubit kernel ---

#[test]
fn test_two_qubit_identity_leaves_state_unchanged() {
    let psi = random_state(3, 23);
    let mut out = psi.clone();
    apply_two_qubit_gate(&mut out, 1, 0, &gates::identity4(), 0);
    assert_eq!(out, psi);
}

#[test]
fn test_cnot_swaps_expected_pair_in_each_quadruple() {
    let psi: Vec<Complex64> = (0..8).map(|k| c(k as f64, 0.0)).collect();
    let mut out = psi.clone();
    // control qubit 1, target qubit 0: |x1 1> <-> |x1 0> only when bit 1 is set
    apply_two_qubit_gate(&mut out, 1, 0, &gates::cnot(), 0);
    let expected: Vec<Complex64> = [0, 1, 3, 2, 4, 5, 7, 6].iter().map(|&k| c(k as f64, 0.0)).collect();
    assert_eq!(out, expected);
}

#[test]
fn test_cnot_with_reversed_bit_order() {
    let psi: Vec<Complex64> = (0..8).map(|k| c(k as f64, 0.0)).collect();
    let mut out = psi.clone();
    // control qubit 0, target qubit 2: flip bit 2 where bit 0 is set
    apply_two_qubit_gate(&mut out, 0, 2, &gates::cnot(), 0);
    let expected: Vec<Complex64> = [0, 5, 2, 7, 4, 1, 6, 3].iter().map(|&k| c(k as f64, 0.0)).collect();
    assert_eq!(out, expected);
}

#[test]
fn test_two_qubit_matches_reference_for_all_target_pairs() {
    let n = 5;
    let m = random_matrix4(99);
    for id1 in 0..n {
        for id0 in (0..n).filter(|&q| q != id1) {
            let psi = random_state(n, (id1 * 10 + id0) as u64);
            let expected = reference_two(&psi, id1, id0, &m, 0);
            let mut actual = psi.clone();
            apply_two_qubit_gate(&mut actual, id1, id0, &m, 0);
            assert_eq!(actual, expected, "targets ({}, {})", id1, id0);
        }
    }
}

#[test]
fn test_two_qubit_control_mask() {
    let psi = random_state(5, 41);
    let m = random_matrix4(42);
    let mask = 0b01000;
    let mut actual = psi.clone();
    apply_two_qubit_gate(&mut actual, 4, 1, &m, mask);
    assert_eq!(actual, reference_two(&psi, 4, 1, &m, mask));
    for i in (0..psi.len()).filter(|i| i & mask != mask) {
        assert_eq!(actual[i], psi[i]);
    }
}

#[test]
fn test_two_qubit_touches_each_amplitude_once() {
    let n = 6;
    for id1 in 0..n {
        for id0 in (0..n).filter(|&q| q != id1) {
            let mut psi = vec![c(1.0, -1.0); 1 << n];
            apply_two_qubit_gate(&mut psi, id1, id0, &scaled_identity4(2.0), 0);
            assert!(psi.iter().all(|a| *a == c(2.0, -2.0)), "targets ({}, {})", id1, id0);
        }
    }
}

#[test]
fn test_two_qubit_kron_equals_two_single_qubit_gates() {
    let a = gates::ry(0.8);
    let b = gates::rz(-1.3);
    let psi = random_state(4, 7);

    let mut fused = psi.clone();
    apply_two_qubit_gate(&mut fused, 3, 1, &gates::kron(&a, &b), 0);

    // the order of the two single-qubit gates does not matter either
    let mut split = psi.clone();
    apply_single_qubit_gate(&mut split, 1, &b, 0);
    apply_single_qubit_gate(&mut split, 3, &a, 0);
    assert_amps_approx_eq(&fused, &split, 1e-12);

    let mut split_rev = psi.clone();
    apply_single_qubit_gate(&mut split_rev, 3, &a, 0);
    apply_single_qubit_gate(&mut split_rev, 1, &b, 0);
    assert_amps_approx_eq(&split_rev, &split, 1e-12);
}

#[test]
fn test_swap_matrix_with_either_target_order() {
    let psi = random_state(4, 13);
    let mut a = psi.clone();
    let mut b = psi.clone();
    apply_two_qubit_gate(&mut a, 2, 0, &gates::swap(), 0);
    apply_two_qubit_gate(&mut b, 0, 2, &gates::swap(), 0);
    assert_eq!(a, b);
}

#[test]
fn test_two_qubit_static_matches_serial() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().expect("pool");
    let m = random_matrix4(5);
    let psi = random_state(9, 31);
    for (id1, id0, mask) in [(1, 0, 0), (0, 8, 0), (8, 7, 0), (3, 5, 0b100000100)] {
        let mut serial = psi.clone();
        apply_two_qubit_gate_with(&mut serial, id1, id0, &m, mask, Partition::Serial);
        let mut parallel = psi.clone();
        pool.install(|| apply_two_qubit_gate_with(&mut parallel, id1, id0, &m, mask, Partition::Static));
        assert_eq!(serial, parallel, "targets ({}, {}) mask {:#b}", id1, id0, mask);
    }
}

#[test]
fn test_gate_enum_dispatch() {
    let psi = random_state(3, 2);

    let mut via_gate = psi.clone();
    Gate::single(2, gates::hadamard()).apply(&mut via_gate, 0);
    let mut direct = psi.clone();
    apply_single_qubit_gate(&mut direct, 2, &gates::hadamard(), 0);
    assert_eq!(via_gate, direct);

    let mut via_gate = psi.clone();
    Gate::two(0, 2, gates::cz()).apply(&mut via_gate, 0b10);
    let mut direct = psi.clone();
    apply_two_qubit_gate(&mut direct, 0, 2, &gates::cz(), 0b10);
    assert_eq!(via_gate, direct);
}

#[test]
fn test_nan_in_matrix_propagates() {
    let mut psi = initial_state(2);
    let m = [[c(f64::NAN, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(1.0, 0.0)]];
    apply_single_qubit_gate(&mut psi, 0, &m, 0);
    assert!(psi[0].re.is_nan());
}
