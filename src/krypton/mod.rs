//! The Krypton streaming cipher, its on-disk file framing, and its PQ-KEM-wrapped composition.

pub mod cipher;
pub mod file;
pub mod kem;

pub use cipher::{Decrypting, Encrypting, Init, Krypton};
