//! Post-quantum algorithm bindings: KEM, DSS, and shared armoring.

pub mod common;
pub mod dss;
pub mod kem;

pub use common::{AlgorithmKind, AlgorithmSpec, KeyKind, armor, armor_key, dearmor, dearmor_key};
pub use dss::Dss;
pub use kem::Kem;
