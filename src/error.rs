use thiserror::Error;

// errors from the checked layers; the kernels themselves cannot fail
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("qubit {qubit} out of range for a {num_qubits}-qubit state")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    #[error("gate targets must be distinct, qubit {0} given twice")]
    DuplicateTarget(usize),

    #[error("control qubit {0} is also a gate target")]
    ControlOverlapsTarget(usize),

    #[error("state vector length {0} is not a non-zero power of two")]
    NotPowerOfTwo(usize),

    #[error("{requested} qubits exceeds the supported maximum of {max}")]
    TooManyQubits { requested: usize, max: usize },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KernelError>;
