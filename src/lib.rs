//! Krypton — a post-quantum file encryption and signing toolkit.
//!
//! Built from three independent layers:
//! - `kdf`: KKDF (a KMAC256-based extract-and-expand KDF) and Argon2id, in both password-verifier
//!   and raw-key-derivation modes.
//! - `pqa`: key encapsulation (ML-KEM) and digital signatures (ML-DSA, Falcon, SPHINCS+) behind
//!   uniform `Kem`/`Dss` traits, plus PEM-like key armoring.
//! - `krypton`: the streaming authenticated cipher (`krypton::cipher`), its chunked on-disk
//!   framing (`krypton::file`), and its PQ-KEM-wrapped composition (`krypton::kem`).
//!
//! None of these layers log or retry internally; every fallible operation returns
//! [`error::Error`] for the caller to handle.

pub mod cli;
pub mod config;
pub mod error;
pub mod kdf;
pub mod pqa;
pub mod krypton;
pub mod secret;

pub use error::{Error, Result};
