//! KKDF — a KMAC256-based HKDF-shaped extract-and-expand key derivation function.
//!
//! Mirrors `kmac_kdf.py` byte-for-byte: the iteration counter is a 2-byte little-endian integer
//! (nonstandard versus RFC 5869's single byte), which is part of the on-disk contract and must
//! never change.

use tiny_keccak::{Hasher, Kmac};

use crate::config::{KKDF_DIGEST_SIZE, KKDF_ENTROPY_LIMIT, KKDF_MIN_MASTER_LEN};
use crate::error::{Error, Result};

fn kmac256(key: &[u8], data: &[&[u8]], custom: &[u8], out: &mut [u8]) {
    let mut mac = Kmac::v256(key, custom);
    for part in data {
        mac.update(part);
    }
    mac.finalize(out);
}

/// Derives `num_keys` subkeys of `key_len` bytes each from `master`.
///
/// `salt` defaults to 64 zero bytes and `context` to the empty string when not supplied.
pub fn derive(master: &[u8], key_len: usize, num_keys: usize, salt: Option<&[u8]>, context: Option<&[u8]>) -> Result<Vec<Vec<u8>>> {
    if master.len() < KKDF_MIN_MASTER_LEN {
        return Err(Error::InvalidArgs(format!("kkdf master must be at least {KKDF_MIN_MASTER_LEN} bytes, got {}", master.len())));
    }
    if !(32..=1024).contains(&key_len) {
        return Err(Error::InvalidArgs(format!("kkdf key_len must be in 32..=1024, got {key_len}")));
    }
    if !(1..=2048).contains(&num_keys) {
        return Err(Error::InvalidArgs(format!("kkdf num_keys must be in 1..=2048, got {num_keys}")));
    }

    let output_len = key_len * num_keys;
    if output_len > KKDF_ENTROPY_LIMIT {
        return Err(Error::KdfOutputLimit(output_len));
    }

    let zero_salt = [0u8; KKDF_DIGEST_SIZE];
    let salt = salt.unwrap_or(&zero_salt);
    let context = context.unwrap_or(b"");

    // Step 1: extract.
    let mut prk = [0u8; KKDF_DIGEST_SIZE];
    kmac256(master, &[salt], b"", &mut prk);

    // Step 2: expand. `macs` accumulates 64-byte blocks until it covers `output_len`.
    let mut macs: Vec<u8> = Vec::with_capacity(output_len.next_multiple_of(KKDF_DIGEST_SIZE));
    let mut iters: u16 = 1;
    while macs.len() < output_len {
        let last_block = if macs.len() >= KKDF_DIGEST_SIZE { &macs[macs.len() - KKDF_DIGEST_SIZE..] } else { &macs[..] };
        let iter_bytes = iters.to_le_bytes();
        let mut block = [0u8; KKDF_DIGEST_SIZE];
        kmac256(&prk, &[last_block, &iter_bytes], context, &mut block);
        macs.extend_from_slice(&block);
        iters = iters.checked_add(1).ok_or_else(|| Error::InvalidArgs("kkdf iteration counter overflowed u16".to_owned()))?;
    }

    // Step 3: split into `num_keys` consecutive `key_len`-byte slices.
    Ok(macs[..output_len].chunks_exact(key_len).map(<[u8]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_given_same_inputs() {
        let master = [0u8; 32];
        let a = derive(&master, 32, 1, None, None).unwrap();
        let b = derive(&master, 32, 1, None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn differs_when_salt_changes() {
        let master = [0u8; 32];
        let a = derive(&master, 32, 1, None, None).unwrap();
        let b = derive(&master, 32, 1, Some(&[1u8; 64]), None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn output_shape_matches_request() {
        let master = [7u8; 32];
        let out = derive(&master, 48, 3, Some(b"salt-value-that-is-long-enoughh"), Some(b"ctx")).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|k| k.len() == 48));
    }

    #[test]
    fn rejects_output_over_entropy_limit() {
        let master = [0u8; 32];
        let err = derive(&master, 1024, 2048, None, None).unwrap_err();
        assert!(matches!(err, Error::KdfOutputLimit(_)));
    }

    #[test]
    fn rejects_short_master() {
        let master = [0u8; 16];
        let err = derive(&master, 32, 1, None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }
}
