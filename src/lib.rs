// dense one- and two-qubit gate kernels for state-vector simulation
// stable rust only: sse2 on x86_64, neon on aarch64, plain arrays everywhere else

pub mod config; // kernel execution settings
pub mod error; // error type for the checked layers
pub mod gates; // tagged gate variants and standard matrices
pub mod instructions; // gate program parsing
pub mod kernel; // unchecked in-place kernels
pub mod runtime; // checked state-vector front end
pub mod vectorization; // packed complex pair primitive

pub use error::{KernelError, Result};
pub use kernel::{apply_single_qubit_gate, apply_two_qubit_gate, Matrix2, Matrix4, Partition};
