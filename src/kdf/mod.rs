//! Key derivation: the KMAC256-based KKDF and the two Argon2id-backed modes.

pub mod argon2;
pub mod common;
pub mod kkdf;

pub use common::KdfParams;
