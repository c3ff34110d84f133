//! Crate-wide constants.
//!
//! These constants are the single source of truth for the on-disk wire formats described in
//! `SPEC_FULL.md`. No environment variables or configuration files are consulted anywhere in
//! this crate — every tunable is either a constant here or an explicit parameter record passed
//! by the caller.

/// Digest size, in bytes, used throughout KKDF (KMAC256 output / cSHAKE256 rate equivalent).
pub const KKDF_DIGEST_SIZE: usize = 64;

/// Maximum total output KKDF will produce from a single master key, in bytes.
///
/// `key_len * num_keys` may not exceed this without triggering `Error::KdfOutputLimit`.
pub const KKDF_ENTROPY_LIMIT: usize = KKDF_DIGEST_SIZE * 1024;

/// Minimum accepted length, in bytes, of a KKDF master key.
pub const KKDF_MIN_MASTER_LEN: usize = 32;

/// Krypton's user-facing secret key length, in bytes.
pub const KRYPTON_SECRET_KEY_LEN: usize = 64;

/// Length of a Krypton session nonce, in bytes.
pub const KRYPTON_NONCE_LEN: usize = 64;

/// Length of a Krypton session salt, in bytes.
pub const KRYPTON_SALT_LEN: usize = 64;

/// Length of the AES-256-EAX data authentication tag, in bytes.
pub const KRYPTON_DATA_TAG_LEN: usize = 16;

/// Length of the wrapped `nonce || data_tag` plaintext fed to the AES-256-SIV wrap step.
pub const KRYPTON_WRAP_PLAINTEXT_LEN: usize = KRYPTON_NONCE_LEN + KRYPTON_DATA_TAG_LEN;

/// Length of the AES-256-SIV synthetic IV / tag, in bytes.
pub const KRYPTON_WRAP_TAG_LEN: usize = 16;

/// Total length of the Krypton Verification Data Packet: `ct_wrap || tag_wrap || salt`.
pub const KRYPTON_VDP_LEN: usize = KRYPTON_WRAP_PLAINTEXT_LEN + KRYPTON_WRAP_TAG_LEN + KRYPTON_SALT_LEN;

/// Width, in ASCII decimal digits, of the `h_len` and `chunk_size` fields in a Krypton file.
pub const KRYPTON_FILE_ASCII_FIELD_WIDTH: usize = 10;

/// Total width of the fixed Krypton file metadata block before the variable-length header:
/// `h_len(10) || chunk_size(10) || vdp(160)`.
pub const KRYPTON_FILE_METADATA_LEN: usize = 2 * KRYPTON_FILE_ASCII_FIELD_WIDTH + KRYPTON_VDP_LEN;

/// Width, in ASCII decimal digits, of the KryptonKEM header's `fn_len` field.
pub const KRYPTON_KEM_FN_LEN_WIDTH: usize = 4;

/// Length of the base64-encoded, `=`-padded `public_salt` field in a KryptonKEM header.
pub const KRYPTON_KEM_SALT_FIELD_LEN: usize = 44;

/// Default output file suffix applied by `KryptonKem::encrypt` when no output path is given.
pub const KRYPTON_KEM_DEFAULT_SUFFIX: &str = "kptn";

/// Default customization context for `KryptonKem`, mixed into every Krypton session it opens.
pub const KRYPTON_KEM_DEFAULT_CONTEXT: &str = "quantcrypt";

/// Maximum base64 characters per line in an armored key envelope.
pub const ARMOR_LINE_WIDTH: usize = 64;

/// Default Argon2 parameters for `kdf::argon2::hash` (password verifier mode).
///
/// Tuned for roughly half a second of hashing time on a modern desktop CPU — suitable for an
/// online, per-login verification workload.
pub mod argon2_hash_defaults {
    pub const MEMORY_COST_KIB: u32 = 2 * 1024 * 1024;
    pub const PARALLELISM: u32 = 8;
    pub const TIME_COST: u32 = 1;
    pub const HASH_LEN: usize = 64;
    pub const SALT_LEN: usize = 32;
    pub const MIN_YEARS: u64 = 1;
}

/// Default Argon2 parameters for `kdf::argon2::key` (symmetric key derivation mode).
///
/// Deliberately much heavier than the hash-mode defaults: this derivation happens once per file,
/// not once per login, so a multi-second, multi-gigabyte cost is acceptable.
pub mod argon2_key_defaults {
    pub const MEMORY_COST_KIB: u32 = 8 * 1024 * 1024;
    pub const PARALLELISM: u32 = 8;
    pub const TIME_COST: u32 = 4;
    pub const HASH_LEN: usize = 64;
    pub const SALT_LEN: usize = 32;
    pub const MIN_YEARS: u64 = 10;
}

/// Default Argon2 parameters used by `KryptonKem` to derive a file's symmetric key from a KEM
/// shared secret. Lighter than the standalone `argon2_key_defaults` because the shared secret is
/// already 256 bits of uniform entropy, not a low-entropy human password.
pub mod kryptonkem_kdf_defaults {
    pub const MEMORY_COST_KIB: u32 = 1024 * 1024;
    pub const PARALLELISM: u32 = 8;
    pub const TIME_COST: u32 = 1;
    pub const HASH_LEN: usize = 64;
    pub const SALT_LEN: usize = 32;
}
