// gates as fixed-shape matrices, tagged by arity and dispatched straight to the matching kernel

use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use crate::kernel::{
    apply_single_qubit_gate_with, apply_two_qubit_gate_with, Matrix2, Matrix4, Partition,
};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Single { target: usize, matrix: Matrix2 },
    // `high` is the more significant bit of the matrix's local index
    Two { high: usize, low: usize, matrix: Matrix4 },
}

impl Gate {
    pub fn single(target: usize, matrix: Matrix2) -> Self {
        Gate::Single { target, matrix }
    }

    pub fn two(high: usize, low: usize, matrix: Matrix4) -> Self {
        Gate::Two { high, low, matrix }
    }

    // most significant first
    pub fn targets(&self) -> Vec<usize> {
        match self {
            Gate::Single { target, .. } => vec![*target],
            Gate::Two { high, low, .. } => vec![*high, *low],
        }
    }

    // unchecked, same contract as the kernels
    pub fn apply(&self, psi: &mut [Complex64], ctrl_mask: usize) {
        self.apply_with(psi, ctrl_mask, Partition::auto(psi.len()));
    }

    pub fn apply_with(&self, psi: &mut [Complex64], ctrl_mask: usize, partition: Partition) {
        match self {
            Gate::Single { target, matrix } => {
                apply_single_qubit_gate_with(psi, *target, matrix, ctrl_mask, partition)
            }
            Gate::Two { high, low, matrix } => {
                apply_two_qubit_gate_with(psi, *high, *low, matrix, ctrl_mask, partition)
            }
        }
    }
}

pub fn control_mask(controls: &[usize]) -> usize {
    controls.iter().fold(0, |mask, &q| mask | (1usize << q))
}

// --- standard single-qubit matrices ---

pub fn identity2() -> Matrix2 {
    [[ONE, ZERO], [ZERO, ONE]]
}

pub fn hadamard() -> Matrix2 {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

pub fn pauli_x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

pub fn pauli_y() -> Matrix2 {
    [[ZERO, -I], [I, ZERO]]
}

pub fn pauli_z() -> Matrix2 {
    [[ONE, ZERO], [ZERO, -ONE]]
}

pub fn s_gate() -> Matrix2 {
    phase(std::f64::consts::FRAC_PI_2)
}

pub fn t_gate() -> Matrix2 {
    phase(FRAC_PI_4)
}

// diag(1, e^{iθ})
pub fn phase(angle: f64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, angle)]]
}

pub fn rx(angle: f64) -> Matrix2 {
    let (s, c) = (angle / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
        [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
    ]
}

pub fn ry(angle: f64) -> Matrix2 {
    let (s, c) = (angle / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
        [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
    ]
}

pub fn rz(angle: f64) -> Matrix2 {
    [
        [Complex64::from_polar(1.0, -angle / 2.0), ZERO],
        [ZERO, Complex64::from_polar(1.0, angle / 2.0)],
    ]
}

// --- standard two-qubit matrices ---

pub fn identity4() -> Matrix4 {
    let mut m = [[ZERO; 4]; 4];
    for (k, row) in m.iter_mut().enumerate() {
        row[k] = ONE;
    }
    m
}

// control on the high qubit, target on the low one
pub fn cnot() -> Matrix4 {
    [
        [ONE, ZERO, ZERO, ZERO],
        [ZERO, ONE, ZERO, ZERO],
        [ZERO, ZERO, ZERO, ONE],
        [ZERO, ZERO, ONE, ZERO],
    ]
}

pub fn cz() -> Matrix4 {
    let mut m = identity4();
    m[3][3] = -ONE;
    m
}

pub fn swap() -> Matrix4 {
    [
        [ONE, ZERO, ZERO, ZERO],
        [ZERO, ZERO, ONE, ZERO],
        [ZERO, ONE, ZERO, ZERO],
        [ZERO, ZERO, ZERO, ONE],
    ]
}

// diag(1, 1, 1, e^{iθ})
pub fn controlled_phase(angle: f64) -> Matrix4 {
    let mut m = identity4();
    m[3][3] = Complex64::from_polar(1.0, angle);
    m
}

/// `a ⊗ b`: `a` acts on the high qubit, `b` on the low one.
pub fn kron(a: &Matrix2, b: &Matrix2) -> Matrix4 {
    let mut m = [[ZERO; 4]; 4];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, entry) in row.iter_mut().enumerate() {
            *entry = a[r / 2][c / 2] * b[r % 2][c % 2];
        }
    }
    m
}
