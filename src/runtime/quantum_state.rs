use log::trace;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*; // import rayon for parallel iterators
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::KernelConfig;
use crate::error::{KernelError, Result};
use crate::gates::{control_mask, Gate};
use crate::instructions::Instruction;

pub const MAX_QUBITS: usize = 40;

// tolerance for `validate_state` normalization
const NORM_EPSILON: f64 = 1e-9;

fn check_qubit_count(n: usize) -> Result<()> {
    if n > MAX_QUBITS {
        return Err(KernelError::TooManyQubits {
            requested: n,
            max: MAX_QUBITS,
        });
    }
    Ok(())
}

/// A state vector plus everything needed to apply gates to it safely.
///
/// Gate arguments are validated here so the kernels can stay unchecked.
#[derive(Debug, Clone)]
pub struct QuantumState {
    n: usize,
    amps: Vec<Complex64>,
    config: KernelConfig,
    pool: Option<Arc<ThreadPool>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub num_qubits: usize,
    pub amplitudes: Vec<Complex64>,
}

impl QuantumState {
    // |0...0> on n qubits
    pub fn new(n: usize) -> Result<Self> {
        check_qubit_count(n)?;
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << n];
        amps[0] = Complex64::new(1.0, 0.0);
        Ok(Self::from_parts(n, amps))
    }

    // the length fixes the qubit count
    pub fn from_amplitudes(amps: Vec<Complex64>) -> Result<Self> {
        let len = amps.len();
        if !len.is_power_of_two() {
            return Err(KernelError::NotPowerOfTwo(len));
        }
        let n = len.trailing_zeros() as usize;
        check_qubit_count(n)?;
        Ok(Self::from_parts(n, amps))
    }

    // uniform re/im in [-1, 1), not normalized. the size is checked before anything is allocated
    pub fn random(n: usize, seed: u64) -> Result<Self> {
        check_qubit_count(n)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let amps = (0..1usize << n)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        Ok(Self::from_parts(n, amps))
    }

    fn from_parts(n: usize, amps: Vec<Complex64>) -> Self {
        QuantumState {
            n,
            amps,
            config: KernelConfig::default(),
            pool: None,
        }
    }

    // builds a dedicated pool when `threads` is set
    pub fn with_config(mut self, config: KernelConfig) -> Result<Self> {
        self.pool = config.build_pool()?.map(Arc::new);
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn num_qubits(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.amps.len()
    }

    // never true, a state holds at least one amplitude
    pub fn is_empty(&self) -> bool {
        self.amps.is_empty()
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amps
    }

    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amps
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            num_qubits: self.n,
            amplitudes: self.amps.clone(),
        }
    }

    pub fn check_gate(&self, gate: &Gate, controls: &[usize]) -> Result<()> {
        let targets = gate.targets();
        for &q in targets.iter().chain(controls) {
            if q >= self.n {
                return Err(KernelError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: self.n,
                });
            }
        }
        if let Gate::Two { high, low, .. } = gate {
            if high == low {
                return Err(KernelError::DuplicateTarget(*high));
            }
        }
        if let Some(&c) = controls.iter().find(|c| targets.contains(c)) {
            return Err(KernelError::ControlOverlapsTarget(c));
        }
        Ok(())
    }

    /// Applies `gate` to every index group whose `controls` bits are all set.
    pub fn apply(&mut self, gate: &Gate, controls: &[usize]) -> Result<()> {
        self.check_gate(gate, controls)?;
        let mask = control_mask(controls);
        trace!(
            "applying gate on {:?} (controls {:?}, mask {:#b}) to {} amplitudes",
            gate.targets(),
            controls,
            mask,
            self.amps.len()
        );

        let config = &self.config;
        let run = |amps: &mut [Complex64]| {
            // evaluated inside the pool so the worker count is the pool's
            let partition = config.partition_for(amps.len());
            gate.apply_with(amps, mask, partition);
        };
        let amps = &mut self.amps;
        match &self.pool {
            Some(pool) => pool.install(|| run(amps)),
            None => run(amps),
        }
        Ok(())
    }

    // stops at the first invalid instruction, earlier ones stay applied
    pub fn execute(&mut self, program: &[Instruction]) -> Result<()> {
        for instr in program {
            let (gate, controls) = instr.to_gate();
            self.apply(&gate, &controls)?;
        }
        Ok(())
    }

    // per-basis-state probabilities, the state is not collapsed
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.par_iter().map(|a| a.norm_sqr()).collect() // parallel map and collect
    }

    pub fn norm_sqr(&self) -> f64 {
        self.amps.par_iter().map(|a| a.norm_sqr()).sum()
    }

    // nan / inf / normalization check, the kernels themselves pass all of these through
    pub fn validate_state(&self) -> Result<()> {
        let has_nan = self.amps.par_iter().any(|amp| amp.re.is_nan() || amp.im.is_nan());
        if has_nan {
            return Err(KernelError::InvalidState(
                "state contains NaN amplitudes".to_string(),
            ));
        }
        let has_inf = self
            .amps
            .par_iter()
            .any(|amp| amp.re.is_infinite() || amp.im.is_infinite());
        if has_inf {
            return Err(KernelError::InvalidState(
                "state contains infinite amplitudes".to_string(),
            ));
        }

        let norm = self.norm_sqr();
        if (norm - 1.0).abs() > NORM_EPSILON {
            return Err(KernelError::InvalidState(format!(
                "state is not normalized, norm squared: {}",
                norm
            )));
        }
        Ok(())
    }
}
