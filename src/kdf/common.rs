//! Shared Argon2 parameter record for both KDF modes.

use crate::error::{Error, Result};

/// Tunable security parameters for an Argon2id derivation.
///
/// Replaces the `MemCost.MB/GB` "class as namespace" pattern with a plain struct; memory cost is
/// always stored in KiB internally regardless of how a caller constructs it.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    pub memory_cost_kib: u32,
    pub parallelism: u32,
    pub time_cost: u32,
    pub hash_len: usize,
    pub salt_len: usize,
}

impl KdfParams {
    /// Builds a parameter set from explicit values, validating that `hash_len`/`salt_len` fall in
    /// `[16, 64]`.
    pub fn new(memory_cost_kib: u32, parallelism: u32, time_cost: u32, hash_len: usize, salt_len: usize) -> Result<Self> {
        if !(16..=64).contains(&hash_len) {
            return Err(Error::InvalidArgs(format!("hash_len must be in 16..=64, got {hash_len}")));
        }
        if !(16..=64).contains(&salt_len) {
            return Err(Error::InvalidArgs(format!("salt_len must be in 16..=64, got {salt_len}")));
        }
        if parallelism == 0 || time_cost == 0 {
            return Err(Error::InvalidArgs("parallelism and time_cost must be greater than zero".to_owned()));
        }
        Ok(Self { memory_cost_kib, parallelism, time_cost, hash_len, salt_len })
    }

    /// `memory_cost` expressed in mebibytes, rounded down.
    #[must_use]
    pub const fn memory_cost_mib(&self) -> u32 {
        self.memory_cost_kib / 1024
    }
}
