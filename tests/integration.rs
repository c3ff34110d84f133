//! End-to-end exercise of the public API: encrypt a file to a KEM recipient, sign it, verify the
//! signature, then decrypt and recover the original bytes.

use krypton_pqc::krypton::kem as krypton_kem;
use krypton_pqc::pqa::dss::{self, Dss, MlDsa65};
use krypton_pqc::pqa::kem::{Kem, MlKem768};

#[test]
fn encrypt_sign_verify_decrypt_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let plaintext_path = dir.path().join("report.txt");
    std::fs::write(&plaintext_path, b"quarterly results are strong").unwrap();

    let (kem_pk, kem_sk) = MlKem768::keypair();
    let encrypted_path = krypton_kem::default_output_path(&plaintext_path);
    krypton_kem::encrypt::<MlKem768>(&plaintext_path, &encrypted_path, &kem_pk, None, None, |_| {}).unwrap();

    let (dss_pk, dss_sk) = MlDsa65::keypair();
    let signature = dss::sign_file::<MlDsa65>(&encrypted_path, &dss_sk).unwrap();
    assert!(dss::verify_file::<MlDsa65>(&encrypted_path, &dss_pk, &signature).unwrap());

    let recovered_dir = dir.path().join("out");
    std::fs::create_dir(&recovered_dir).unwrap();
    let recovered_path = krypton_kem::decrypt::<MlKem768>(&encrypted_path, &recovered_dir, &kem_sk, None, |_| {}).unwrap();

    assert_eq!(std::fs::read(&recovered_path).unwrap(), b"quarterly results are strong");
}

#[test]
fn signature_does_not_verify_after_file_is_tampered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contract.txt");
    std::fs::write(&path, b"the price is fixed at $100").unwrap();

    let (pk, sk) = MlDsa65::keypair();
    let signature = dss::sign_file::<MlDsa65>(&path, &sk).unwrap();

    std::fs::write(&path, b"the price is fixed at $900").unwrap();
    assert!(!dss::verify_file::<MlDsa65>(&path, &pk, &signature).unwrap());
}
