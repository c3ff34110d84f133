//! PEM-like ASCII armoring for raw PQA key and signature bytes, plus the byte-length and identity
//! record every concrete KEM/DSS type publishes about itself.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::config::ARMOR_LINE_WIDTH;
use crate::error::{Error, Result};

/// Whether an `AlgorithmSpec` describes a key encapsulation mechanism or a signature scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    Kem,
    Dss,
}

/// Which half of a keypair a piece of armored key material holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Secret,
}

impl KeyKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Secret => "SECRET",
        }
    }
}

/// The byte-length parameters and identity of one concrete algorithm type, as published by its
/// `Kem`/`Dss` impl via `spec()`.
///
/// `pk_size`/`sk_size` are always present; `ct_size`/`ss_size` are `Some` only for `Kem` types and
/// `sig_size` only for `Dss` types.
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmSpec {
    /// The PQClean family this algorithm belongs to, e.g. `"ML-KEM"`.
    pub family: &'static str,
    /// The Rust type implementing this algorithm, e.g. `"MlKem768"`.
    pub class_name: &'static str,
    /// The label used in armored key envelopes, e.g. `"MLKEM768"`.
    pub armor_name: &'static str,
    pub kind: AlgorithmKind,
    pub pk_size: usize,
    pub sk_size: usize,
    pub ct_size: Option<usize>,
    pub ss_size: Option<usize>,
    pub sig_size: Option<usize>,
}

/// Wraps `data` in a PEM-like envelope: `-----BEGIN {armor_name}-----`, base64 body wrapped at
/// `ARMOR_LINE_WIDTH` columns, `-----END {armor_name}-----`.
///
/// `armor_name` is conventionally the uppercased type name with underscores removed, e.g.
/// `MlKem768PublicKey` becomes `MLKEM768PUBLICKEY`.
#[must_use]
pub fn armor(armor_name: &str, data: &[u8]) -> String {
    let encoded = BASE64.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / ARMOR_LINE_WIDTH + 32);
    out.push_str("-----BEGIN ");
    out.push_str(armor_name);
    out.push_str("-----\n");
    for line in encoded.as_bytes().chunks(ARMOR_LINE_WIDTH) {
        out.push_str(std::str::from_utf8(line).expect("base64 output is ascii"));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(armor_name);
    out.push_str("-----\n");
    out
}

/// Reverses `armor`, returning the armor name found in the envelope and the decoded bytes.
///
/// Does not check the returned name against an expected one; callers that care about key class
/// should compare it themselves.
pub fn dearmor(text: &str) -> Result<(String, Vec<u8>)> {
    let text = text.trim();
    let first_line = text.lines().next().ok_or_else(|| Error::PqaKeyArmor("empty input".to_owned()))?;
    let armor_name = first_line
        .strip_prefix("-----BEGIN ")
        .and_then(|s| s.strip_suffix("-----"))
        .ok_or_else(|| Error::PqaKeyArmor("missing BEGIN line".to_owned()))?
        .to_owned();

    let end_marker = format!("-----END {armor_name}-----");
    let body: String = text
        .lines()
        .skip(1)
        .take_while(|line| *line != end_marker)
        .collect();

    if !text.lines().any(|line| line == end_marker) {
        return Err(Error::PqaKeyArmor("missing END line".to_owned()));
    }

    let data = BASE64.decode(body.as_bytes()).map_err(|e| Error::PqaKeyArmor(e.to_string()))?;
    Ok((armor_name, data))
}

/// Armors a public or secret key, validating its length against `spec` first.
///
/// The envelope label is `{armor_name} {PUBLIC|SECRET} KEY`, e.g. `MLKEM768 PUBLIC KEY`.
pub fn armor_key(spec: &AlgorithmSpec, kind: KeyKind, data: &[u8]) -> Result<String> {
    let expected = match kind {
        KeyKind::Public => spec.pk_size,
        KeyKind::Secret => spec.sk_size,
    };
    if data.len() != expected {
        return Err(Error::PqaKeyArmor(format!(
            "{} {} key must be {expected} bytes, got {}",
            spec.armor_name,
            kind.label(),
            data.len()
        )));
    }
    let label = format!("{} {} KEY", spec.armor_name, kind.label());
    Ok(armor(&label, data))
}

/// Reverses `armor_key`: checks the envelope label matches `{spec.armor_name} {kind} KEY` and the
/// decoded length matches `spec.pk_size`/`spec.sk_size`.
pub fn dearmor_key(spec: &AlgorithmSpec, kind: KeyKind, text: &str) -> Result<Vec<u8>> {
    let (name, data) = dearmor(text)?;

    let expected_label = format!("{} {} KEY", spec.armor_name, kind.label());
    if name != expected_label {
        return Err(Error::PqaKeyArmor(format!("expected armor label '{expected_label}', got '{name}'")));
    }

    let expected_len = match kind {
        KeyKind::Public => spec.pk_size,
        KeyKind::Secret => spec.sk_size,
    };
    if data.len() != expected_len {
        return Err(Error::PqaKeyArmor(format!("decoded {} key is {} bytes, expected {expected_len}", kind.label(), data.len())));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_round_trips() {
        let data: Vec<u8> = (0u8..=255).collect();
        let armored = armor("MLKEM768PUBLICKEY", &data);
        let (name, decoded) = dearmor(&armored).unwrap();
        assert_eq!(name, "MLKEM768PUBLICKEY");
        assert_eq!(decoded, data);
    }

    #[test]
    fn dearmor_rejects_missing_end() {
        let err = dearmor("-----BEGIN FOO-----\nAAAA\n").unwrap_err();
        assert!(matches!(err, Error::PqaKeyArmor(_)));
    }

    fn test_spec() -> AlgorithmSpec {
        AlgorithmSpec {
            family: "ML-KEM",
            class_name: "MlKem768",
            armor_name: "MLKEM768",
            kind: AlgorithmKind::Kem,
            pk_size: 4,
            sk_size: 8,
            ct_size: Some(2),
            ss_size: Some(2),
            sig_size: None,
        }
    }

    #[test]
    fn armor_key_round_trips_and_validates_label() {
        let spec = test_spec();
        let pk = [1u8, 2, 3, 4];
        let armored = armor_key(&spec, KeyKind::Public, &pk).unwrap();
        assert!(armored.starts_with("-----BEGIN MLKEM768 PUBLIC KEY-----"));
        let decoded = dearmor_key(&spec, KeyKind::Public, &armored).unwrap();
        assert_eq!(decoded, pk);
    }

    #[test]
    fn armor_key_rejects_wrong_length() {
        let spec = test_spec();
        let err = armor_key(&spec, KeyKind::Public, &[1u8, 2]).unwrap_err();
        assert!(matches!(err, Error::PqaKeyArmor(_)));
    }

    #[test]
    fn dearmor_key_rejects_wrong_kind_label() {
        let spec = test_spec();
        let sk = [0u8; 8];
        let armored = armor_key(&spec, KeyKind::Secret, &sk).unwrap();
        let err = dearmor_key(&spec, KeyKind::Public, &armored).unwrap_err();
        assert!(matches!(err, Error::PqaKeyArmor(_)));
    }
}
