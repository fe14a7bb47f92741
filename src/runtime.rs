// checked caller layer around the unchecked kernels

pub mod quantum_state;

pub use quantum_state::{QuantumState, MAX_QUBITS};
