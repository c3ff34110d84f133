//! The flat error taxonomy shared by every module in this crate.
//!
//! The core never logs and never retries (see the crate-level docs); every fallible operation
//! returns one of these variants so callers can match narrowly instead of string-sniffing an
//! opaque error.

use std::fmt;

/// Every error kind that can cross a public API boundary in this crate.
#[derive(Debug)]
pub enum Error {
    /// A Krypton session method was called in the wrong lifecycle phase.
    CipherState(&'static str),
    /// An AEAD authentication tag failed to verify (tampering, wrong key, or corruption).
    CipherVerify,
    /// A plaintext or ciphertext chunk did not match the session's configured chunk size.
    CipherChunkSize { expected: usize, actual: usize },
    /// ISO/IEC 7816-4 padding was malformed on unpad.
    CipherPadding,
    /// KKDF was asked to produce more than 65536 bytes from one master key.
    KdfOutputLimit(usize),
    /// A password failed the crack-resistance gate.
    KdfWeakPassword { estimated_years: u64, required_years: u64 },
    /// Argon2 hash-mode verification failed.
    KdfVerification,
    /// An Argon2 encoded hash string could not be parsed.
    KdfInvalidHash,
    /// Argon2 itself reported an internal failure.
    KdfHashing(String),
    /// A PQA key could not be armored or dearmored.
    PqaKeyArmor(String),
    /// KEM encapsulation failed.
    KemEncapsFailed,
    /// KEM decapsulation failed.
    KemDecapsFailed,
    /// DSS signing failed.
    DssSignFailed,
    /// DSS verification failed (only surfaced when the caller opted into raising).
    DssVerifyFailed,
    /// A named input file does not exist.
    FileNotFound(std::path::PathBuf),
    /// A caller-supplied argument had the wrong shape (length, encoding, range).
    InvalidArgs(String),
    /// Wraps a lower-level I/O failure so it can still propagate through `Result<T, Error>`.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CipherState(what) => write!(f, "krypton session state error: {what}"),
            Self::CipherVerify => write!(f, "authentication tag verification failed"),
            Self::CipherChunkSize { expected, actual } => {
                write!(f, "chunk size mismatch: expected {expected}, got {actual}")
            }
            Self::CipherPadding => write!(f, "invalid ISO/IEC 7816-4 padding"),
            Self::KdfOutputLimit(n) => write!(f, "kkdf output of {n} bytes exceeds the 65536 byte limit per master key"),
            Self::KdfWeakPassword { estimated_years, required_years } => {
                write!(f, "password crack resistance of {estimated_years} years is below the required {required_years} years")
            }
            Self::KdfVerification => write!(f, "argon2 hash verification failed"),
            Self::KdfInvalidHash => write!(f, "invalid argon2 encoded hash"),
            Self::KdfHashing(msg) => write!(f, "argon2 hashing failed: {msg}"),
            Self::PqaKeyArmor(msg) => write!(f, "pqa key armor error: {msg}"),
            Self::KemEncapsFailed => write!(f, "kem encapsulation failed"),
            Self::KemDecapsFailed => write!(f, "kem decapsulation failed"),
            Self::DssSignFailed => write!(f, "dss signing failed"),
            Self::DssVerifyFailed => write!(f, "dss signature verification failed"),
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::InvalidArgs(msg) => write!(f, "invalid arguments: {msg}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
