//! Digital signatures: ML-DSA-44/65/87, Falcon-512/1024, and SPHINCS+-SHAKE-256f/256s-simple over
//! a uniform `Dss` trait.

use std::path::Path;

use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};

use crate::error::{Error, Result};
use crate::pqa::common;
use crate::pqa::common::{AlgorithmKind, AlgorithmSpec};

/// A digital signature scheme: generate a keypair, produce a detached signature over a message,
/// verify it against a public key.
pub trait Dss {
    const NAME: &'static str;

    fn keypair() -> (Vec<u8>, Vec<u8>);
    fn sign(sk: &[u8], message: &[u8]) -> Result<Vec<u8>>;
    fn verify(pk: &[u8], message: &[u8], signature: &[u8]) -> Result<bool>;
    /// This type's byte-length parameters and identity.
    fn spec() -> AlgorithmSpec;
}

/// Verifies `signature` and raises `Error::DssVerifyFailed` on a negative result, for callers
/// that want a verification failure treated as fatal rather than inspected.
pub fn verify_strict<D: Dss>(pk: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    if D::verify(pk, message, signature)? { Ok(()) } else { Err(Error::DssVerifyFailed) }
}

/// Signs the file at `path` with `sk`, returning an armored detached signature.
pub fn sign_file<D: Dss>(path: &Path, sk: &[u8]) -> Result<String> {
    let data = std::fs::read(path)?;
    let signature = D::sign(sk, &data)?;
    let armor_name = format!("{}SIGNATURE", D::spec().armor_name);
    Ok(common::armor(&armor_name, &signature))
}

/// Verifies an armored detached signature (as produced by `sign_file`) against the file at `path`.
pub fn verify_file<D: Dss>(path: &Path, pk: &[u8], armored_signature: &str) -> Result<bool> {
    let data = std::fs::read(path)?;
    let (_, signature) = common::dearmor(armored_signature)?;
    D::verify(pk, &data, &signature)
}

macro_rules! impl_dss_detached {
    ($type_name:ident, $module:path, $name:expr, $armor_name:expr) => {
        #[doc = concat!("The ", $name, " signature scheme.")]
        pub struct $type_name;

        impl Dss for $type_name {
            const NAME: &'static str = $name;

            fn keypair() -> (Vec<u8>, Vec<u8>) {
                use $module as algo;
                let (pk, sk) = algo::keypair();
                (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }

            fn sign(sk: &[u8], message: &[u8]) -> Result<Vec<u8>> {
                use $module as algo;
                let sk = algo::SecretKey::from_bytes(sk).map_err(|_| Error::DssSignFailed)?;
                Ok(algo::detached_sign(message, &sk).as_bytes().to_vec())
            }

            fn verify(pk: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
                use $module as algo;
                let pk = algo::PublicKey::from_bytes(pk).map_err(|_| Error::DssVerifyFailed)?;
                let sig = algo::DetachedSignature::from_bytes(signature).map_err(|_| Error::DssVerifyFailed)?;
                Ok(algo::verify_detached_signature(&sig, message, &pk).is_ok())
            }

            fn spec() -> AlgorithmSpec {
                use $module as algo;
                AlgorithmSpec {
                    family: $name,
                    class_name: stringify!($type_name),
                    armor_name: $armor_name,
                    kind: AlgorithmKind::Dss,
                    pk_size: algo::public_key_bytes(),
                    sk_size: algo::secret_key_bytes(),
                    ct_size: None,
                    ss_size: None,
                    sig_size: Some(algo::signature_bytes()),
                }
            }
        }
    };
}

impl_dss_detached!(MlDsa44, pqcrypto_mldsa::mldsa44, "ML-DSA-44", "MLDSA44");
impl_dss_detached!(MlDsa65, pqcrypto_mldsa::mldsa65, "ML-DSA-65", "MLDSA65");
impl_dss_detached!(MlDsa87, pqcrypto_mldsa::mldsa87, "ML-DSA-87", "MLDSA87");
impl_dss_detached!(Falcon512, pqcrypto_falcon::falcon512, "Falcon-512", "FALCON512");
impl_dss_detached!(Falcon1024, pqcrypto_falcon::falcon1024, "Falcon-1024", "FALCON1024");
impl_dss_detached!(FastSphincs, pqcrypto_sphincsplus::sphincsshake256fsimple, "SPHINCS+-SHAKE-256f-simple", "SPHINCSSHAKE256FSIMPLE");
impl_dss_detached!(SmallSphincs, pqcrypto_sphincsplus::sphincsshake256ssimple, "SPHINCS+-SHAKE-256s-simple", "SPHINCSSHAKE256SSIMPLE");

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<D: Dss>() {
        let (pk, sk) = D::keypair();
        let message = b"a message worth signing";
        let sig = D::sign(&sk, message).unwrap();
        assert!(D::verify(&pk, message, &sig).unwrap());
        assert!(!D::verify(&pk, b"a different message", &sig).unwrap());
    }

    #[test]
    fn mldsa44_round_trips() {
        round_trip::<MlDsa44>();
    }

    #[test]
    fn falcon512_round_trips() {
        round_trip::<Falcon512>();
    }

    #[test]
    fn small_sphincs_round_trips() {
        round_trip::<SmallSphincs>();
    }

    #[test]
    fn verify_strict_errors_on_bad_signature() {
        let (pk, sk) = MlDsa44::keypair();
        let message = b"a message worth signing";
        let mut sig = MlDsa44::sign(&sk, message).unwrap();
        sig[0] ^= 0xff;
        let err = verify_strict::<MlDsa44>(&pk, message, &sig).unwrap_err();
        assert!(matches!(err, Error::DssVerifyFailed));
    }

    #[test]
    fn spec_sizes_match_generated_keys() {
        let (pk, sk) = MlDsa44::keypair();
        let spec = MlDsa44::spec();
        assert_eq!(spec.pk_size, pk.len());
        assert_eq!(spec.sk_size, sk.len());
        assert_eq!(spec.kind, AlgorithmKind::Dss);
        assert_eq!(spec.armor_name, "MLDSA44");

        let sig = MlDsa44::sign(&sk, b"message").unwrap();
        assert_eq!(spec.sig_size, Some(sig.len()));
    }
}
