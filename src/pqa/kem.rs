//! Key encapsulation: ML-KEM-512/768/1024 over a uniform `Kem` trait.
//!
//! Each variant links one pure-Rust PQClean implementation at compile time, so algorithm
//! selection collapses to picking a type rather than a runtime binary choice.

use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};

use crate::error::{Error, Result};
use crate::pqa::common::{AlgorithmKind, AlgorithmSpec};

/// A key-encapsulation mechanism: generate a keypair, encapsulate a shared secret under a public
/// key, decapsulate it back under the matching secret key.
pub trait Kem {
    /// Canonical algorithm name, used as the PEM armor label and in `KryptonKem` headers.
    const NAME: &'static str;

    fn keypair() -> (Vec<u8>, Vec<u8>);
    fn encaps(pk: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>;
    fn decaps(sk: &[u8], ct: &[u8]) -> Result<Vec<u8>>;
    /// This type's byte-length parameters and identity.
    fn spec() -> AlgorithmSpec;
}

macro_rules! impl_kem {
    ($type_name:ident, $module:path, $name:expr, $armor_name:expr) => {
        #[doc = concat!("The ", $name, " key encapsulation mechanism.")]
        pub struct $type_name;

        impl Kem for $type_name {
            const NAME: &'static str = $name;

            fn keypair() -> (Vec<u8>, Vec<u8>) {
                use $module as algo;
                let (pk, sk) = algo::keypair();
                (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }

            fn encaps(pk: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
                use $module as algo;
                let pk = algo::PublicKey::from_bytes(pk).map_err(|_| Error::KemEncapsFailed)?;
                let (ss, ct) = algo::encapsulate(&pk);
                Ok((ct.as_bytes().to_vec(), ss.as_bytes().to_vec()))
            }

            fn decaps(sk: &[u8], ct: &[u8]) -> Result<Vec<u8>> {
                use $module as algo;
                let sk = algo::SecretKey::from_bytes(sk).map_err(|_| Error::KemDecapsFailed)?;
                let ct = algo::Ciphertext::from_bytes(ct).map_err(|_| Error::KemDecapsFailed)?;
                let ss = algo::decapsulate(&ct, &sk);
                Ok(ss.as_bytes().to_vec())
            }

            fn spec() -> AlgorithmSpec {
                use $module as algo;
                AlgorithmSpec {
                    family: $name,
                    class_name: stringify!($type_name),
                    armor_name: $armor_name,
                    kind: AlgorithmKind::Kem,
                    pk_size: algo::public_key_bytes(),
                    sk_size: algo::secret_key_bytes(),
                    ct_size: Some(algo::ciphertext_bytes()),
                    ss_size: Some(algo::shared_secret_bytes()),
                    sig_size: None,
                }
            }
        }
    };
}

impl_kem!(MlKem512, pqcrypto_mlkem::mlkem512, "ML-KEM-512", "MLKEM512");
impl_kem!(MlKem768, pqcrypto_mlkem::mlkem768, "ML-KEM-768", "MLKEM768");
impl_kem!(MlKem1024, pqcrypto_mlkem::mlkem1024, "ML-KEM-1024", "MLKEM1024");

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<K: Kem>() {
        let (pk, sk) = K::keypair();
        let (ct, ss_sender) = K::encaps(&pk).unwrap();
        let ss_receiver = K::decaps(&sk, &ct).unwrap();
        assert_eq!(ss_sender, ss_receiver);
    }

    #[test]
    fn mlkem512_round_trips() {
        round_trip::<MlKem512>();
    }

    #[test]
    fn mlkem768_round_trips() {
        round_trip::<MlKem768>();
    }

    #[test]
    fn mlkem1024_round_trips() {
        round_trip::<MlKem1024>();
    }

    #[test]
    fn decaps_with_wrong_secret_key_does_not_match() {
        let (pk, _) = MlKem768::keypair();
        let (_, wrong_sk) = MlKem768::keypair();
        let (ct, ss_sender) = MlKem768::encaps(&pk).unwrap();
        let ss_wrong = MlKem768::decaps(&wrong_sk, &ct).unwrap();
        assert_ne!(ss_sender, ss_wrong);
    }

    #[test]
    fn spec_sizes_match_generated_keys() {
        let (pk, sk) = MlKem768::keypair();
        let spec = MlKem768::spec();
        assert_eq!(spec.pk_size, pk.len());
        assert_eq!(spec.sk_size, sk.len());
        assert_eq!(spec.kind, AlgorithmKind::Kem);
        assert_eq!(spec.armor_name, "MLKEM768");

        let (ct, ss) = MlKem768::encaps(&pk).unwrap();
        assert_eq!(spec.ct_size, Some(ct.len()));
        assert_eq!(spec.ss_size, Some(ss.len()));
    }
}
