//! Argon2id in two modes: password verifier (`hash`/`verify`) and raw symmetric key derivation
//! (`key`).
//!
//! `key` uses `argon2::Argon2::hash_password_into` to write raw key bytes directly, rather than
//! deriving a PHC string and splitting off its hash field.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::config::{argon2_hash_defaults, argon2_key_defaults};
use crate::error::{Error, Result};
use crate::kdf::common::KdfParams;

fn build(params: &KdfParams) -> Result<Argon2<'static>> {
    let argon_params = Params::new(params.memory_cost_kib, params.time_cost, params.parallelism, Some(params.hash_len))
        .map_err(|e| Error::KdfHashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params))
}

fn default_hash_params() -> KdfParams {
    KdfParams::new(
        argon2_hash_defaults::MEMORY_COST_KIB,
        argon2_hash_defaults::PARALLELISM,
        argon2_hash_defaults::TIME_COST,
        argon2_hash_defaults::HASH_LEN,
        argon2_hash_defaults::SALT_LEN,
    )
    .expect("built-in argon2_hash_defaults are always valid")
}

/// A very small crack-time heuristic: no consumer in this corpus pulls in a dedicated
/// password-strength crate, so the estimate is a character-class-and-length model rather than a
/// fabricated dependency.
///
/// Returns an estimated number of years an offline attacker at 10^10 guesses/second would need to
/// exhaust the password's keyspace.
#[must_use]
pub fn estimate_crack_years(password: &[u8]) -> u64 {
    const GUESSES_PER_SECOND: f64 = 1e10;
    const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

    let mut has_lower = false;
    let mut has_upper = false;
    let mut has_digit = false;
    let mut has_other = false;
    for &b in password {
        match b {
            b'a'..=b'z' => has_lower = true,
            b'A'..=b'Z' => has_upper = true,
            b'0'..=b'9' => has_digit = true,
            _ => has_other = true,
        }
    }
    let alphabet_size = [has_lower, has_upper, has_digit, has_other]
        .iter()
        .zip([26.0, 26.0, 10.0, 33.0])
        .filter(|(present, _)| **present)
        .map(|(_, size)| size)
        .sum::<f64>()
        .max(1.0);

    let keyspace = alphabet_size.powi(i32::try_from(password.len()).unwrap_or(i32::MAX));
    let years = keyspace / GUESSES_PER_SECOND / SECONDS_PER_YEAR;
    if years.is_finite() { years as u64 } else { u64::MAX }
}

/// Rejects `password` if its estimated crack time falls below `min_years`.
pub fn enforce_strength(password: &[u8], min_years: u64) -> Result<()> {
    let estimated_years = estimate_crack_years(password);
    if estimated_years < min_years { Err(Error::KdfWeakPassword { estimated_years, required_years: min_years }) } else { Ok(()) }
}

/// The outcome of hashing a password for storage.
pub struct HashResult {
    /// A PHC-formatted encoded hash string, ready to persist.
    pub public_hash: String,
}

/// Hashes `password` for later verification, enforcing the crack-resistance gate first.
///
/// `params` defaults to `config::argon2_hash_defaults` when `None`.
pub fn hash(password: &[u8], params: Option<KdfParams>) -> Result<HashResult> {
    let params = params.unwrap_or_else(default_hash_params);
    enforce_strength(password, argon2_hash_defaults::MIN_YEARS)?;

    let mut salt = vec![0u8; params.salt_len];
    OsRng.fill_bytes(&mut salt);

    let salt_string = argon2::password_hash::SaltString::encode_b64(&salt).map_err(|e| Error::KdfHashing(e.to_string()))?;
    let argon2 = build(&params)?;
    let public_hash = argon2::PasswordHasher::hash_password(&argon2, password, &salt_string)
        .map_err(|e| Error::KdfHashing(e.to_string()))?
        .to_string();
    Ok(HashResult { public_hash })
}

/// The outcome of verifying a password against a previously stored hash.
pub struct VerifyResult {
    /// Whether the stored hash's embedded parameters differ from the target `params`.
    pub rehashed: bool,
    /// The hash string the caller should persist.
    ///
    /// Set equal to the *original* `verif_hash` even when `rehashed` is true: a fresh hash is
    /// computed at the upgraded cost parameters but never actually written back, so the on-disk
    /// hash silently never upgrades. See `DESIGN.md` for why this is kept rather than fixed.
    pub public_hash: String,
}

/// Verifies `password` against `verif_hash`, rehashing (but not persisting) when the stored
/// hash's parameters are weaker than `params`.
///
/// Returns `Err(Error::KdfVerification)` when the password does not match the hash.
pub fn verify(password: &[u8], verif_hash: &str, params: Option<KdfParams>) -> Result<VerifyResult> {
    let target_params = params.unwrap_or_else(default_hash_params);
    let parsed = argon2::PasswordHash::new(verif_hash).map_err(|_| Error::KdfInvalidHash)?;
    let argon2 = build(&target_params)?;
    argon2::PasswordVerifier::verify_password(&argon2, password, &parsed).map_err(|_| Error::KdfVerification)?;

    let current_m = parsed.params.get("m").and_then(|v| v.decimal().ok());
    let current_t = parsed.params.get("t").and_then(|v| v.decimal().ok());
    let current_p = parsed.params.get("p").and_then(|v| v.decimal().ok());
    let matches_target = current_m == Some(target_params.memory_cost_kib) && current_t == Some(target_params.time_cost) && current_p == Some(target_params.parallelism);

    let rehashed = !matches_target;
    if rehashed {
        // Recomputed at the stronger params but the result is intentionally discarded.
        let _ = hash(password, Some(target_params));
    }

    Ok(VerifyResult { rehashed, public_hash: verif_hash.to_owned() })
}

/// Derives `params.hash_len` raw bytes of key material from `password` and `salt`.
///
/// `params` defaults to `config::argon2_key_defaults` when `None`.
pub fn key(password: &[u8], salt: &[u8], params: Option<KdfParams>) -> Result<Vec<u8>> {
    let params = params.unwrap_or_else(|| {
        KdfParams::new(
            argon2_key_defaults::MEMORY_COST_KIB,
            argon2_key_defaults::PARALLELISM,
            argon2_key_defaults::TIME_COST,
            argon2_key_defaults::HASH_LEN,
            argon2_key_defaults::SALT_LEN,
        )
        .expect("built-in argon2_key_defaults are always valid")
    });
    let argon2 = build(&params)?;
    let mut out = vec![0u8; params.hash_len];
    argon2.hash_password_into(password, salt, &mut out).map_err(|e| Error::KdfHashing(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let password = b"a genuinely long and high entropy passphrase!!";
        let hashed = hash(password, None).unwrap();
        let result = verify(password, &hashed.public_hash, None).unwrap();
        assert!(!result.rehashed);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = b"a genuinely long and high entropy passphrase!!";
        let hashed = hash(password, None).unwrap();
        let err = verify(b"wrong password entirely, not even close!!", &hashed.public_hash, None).unwrap_err();
        assert!(matches!(err, Error::KdfVerification));
    }

    #[test]
    fn weak_password_is_rejected() {
        let err = hash(b"abc", None).unwrap_err();
        assert!(matches!(err, Error::KdfWeakPassword { .. }));
    }

    #[test]
    fn key_is_deterministic_given_same_salt() {
        let params = KdfParams::new(65536, 1, 1, 32, 16).unwrap();
        let salt = [9u8; 16];
        let a = key(b"password material", &salt, Some(params)).unwrap();
        let b = key(b"password material", &salt, Some(params)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_for_different_salts() {
        let params = KdfParams::new(65536, 1, 1, 32, 16).unwrap();
        let a = key(b"password material", &[1u8; 16], Some(params)).unwrap();
        let b = key(b"password material", &[2u8; 16], Some(params)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rehash_quirk_preserves_original_hash_string() {
        let password = b"a genuinely long and high entropy passphrase!!";
        let weak_params = KdfParams::new(65536, 1, 1, 32, 16).unwrap();
        let hashed = hash(password, Some(weak_params)).unwrap();
        let stronger = KdfParams::new(131072, 2, 2, 32, 16).unwrap();
        let result = verify(password, &hashed.public_hash, Some(stronger)).unwrap();
        assert!(result.rehashed);
        assert_eq!(result.public_hash, hashed.public_hash);
    }
}
