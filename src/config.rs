use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::kernel::Partition;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Never split a kernel call.
    Serial,
    /// Always work-share, whatever the vector size.
    Static,
    /// Work-share once the vector reaches `min_parallel_qubits`.
    #[default]
    Auto,
}

/// Execution settings for the checked runtime and the CLI.
///
/// ```json
/// { "schedule": "auto", "min_parallel_qubits": 14, "threads": 8 }
/// ```
/// Every field is optional.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct KernelConfig {
    pub schedule: Schedule,
    pub min_parallel_qubits: usize,
    // None: use the pool the caller is already running in
    pub threads: Option<usize>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            schedule: Schedule::Auto,
            min_parallel_qubits: 14,
            threads: None,
        }
    }
}

impl KernelConfig {
    pub fn from_json_str(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let cfg = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!("loaded kernel config from {}: {:?}", path.display(), cfg);
        Ok(cfg)
    }

    /// Partition for a vector of `len` amplitudes, evaluated in the current pool.
    pub fn partition_for(&self, len: usize) -> Partition {
        match self.schedule {
            Schedule::Serial => Partition::Serial,
            Schedule::Static => Partition::Static,
            Schedule::Auto => {
                Partition::with_threshold(len, 1usize << self.min_parallel_qubits.min(63))
            }
        }
    }

    /// A dedicated pool when `threads` is set.
    pub fn build_pool(&self) -> Result<Option<ThreadPool>> {
        match self.threads {
            Some(n) => {
                let pool = ThreadPoolBuilder::new().num_threads(n).build()?;
                debug!("built kernel thread pool with {} workers", pool.current_num_threads());
                Ok(Some(pool))
            }
            None => Ok(None),
        }
    }
}
