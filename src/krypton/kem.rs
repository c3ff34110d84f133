//! `KryptonKem`: a PQ-KEM-wrapped `KryptonFile`.
//!
//! Header layout embedded in the `KryptonFile` header slot: `fn_len(4) || file_name || \
//! public_salt(base64, 44 chars) || kem_ct`. `fn_len` is ASCII decimal, zero-padded to 4 digits,
//! bounding file names to 9999 bytes.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::config::{KRYPTON_KEM_DEFAULT_CONTEXT, KRYPTON_KEM_DEFAULT_SUFFIX, KRYPTON_KEM_FN_LEN_WIDTH, KRYPTON_KEM_SALT_FIELD_LEN, kryptonkem_kdf_defaults};
use crate::error::{Error, Result};
use crate::kdf::argon2;
use crate::kdf::common::KdfParams;
use crate::krypton::file::{self, ChunkSize};
use crate::pqa::Kem;
use crate::secret::SecretKey64;

fn kdf_params() -> KdfParams {
    KdfParams::new(
        kryptonkem_kdf_defaults::MEMORY_COST_KIB,
        kryptonkem_kdf_defaults::PARALLELISM,
        kryptonkem_kdf_defaults::TIME_COST,
        kryptonkem_kdf_defaults::HASH_LEN,
        kryptonkem_kdf_defaults::SALT_LEN,
    )
    .expect("built-in kryptonkem_kdf_defaults are always valid")
}

fn format_fn_len(n: usize) -> Result<[u8; KRYPTON_KEM_FN_LEN_WIDTH]> {
    if n >= 10usize.pow(KRYPTON_KEM_FN_LEN_WIDTH as u32) {
        return Err(Error::InvalidArgs(format!("file name of {n} bytes exceeds the {KRYPTON_KEM_FN_LEN_WIDTH}-digit length field")));
    }
    let text = format!("{n:0width$}", width = KRYPTON_KEM_FN_LEN_WIDTH);
    let mut buf = [0u8; KRYPTON_KEM_FN_LEN_WIDTH];
    buf.copy_from_slice(text.as_bytes());
    Ok(buf)
}

fn parse_fn_len(buf: &[u8; KRYPTON_KEM_FN_LEN_WIDTH]) -> Result<usize> {
    std::str::from_utf8(buf).ok().and_then(|s| s.parse().ok()).ok_or_else(|| Error::InvalidArgs("malformed fn_len field".to_owned()))
}

/// Derives a `KryptonFile` secret key from a KEM shared secret and a freshly generated salt.
fn derive_file_key(shared_secret: &[u8], salt: &[u8]) -> Result<SecretKey64> {
    let key_bytes = argon2::key(shared_secret, salt, Some(kdf_params()))?;
    SecretKey64::try_from(key_bytes.as_slice())
}

/// Encrypts the file at `input_path` to `output_path` for the holder of `recipient_pk`.
///
/// `context` defaults to `config::KRYPTON_KEM_DEFAULT_CONTEXT`; `chunk_size` defaults to
/// `ChunkSize::automatic` sized from the plaintext length.
pub fn encrypt<K: Kem>(input_path: &Path, output_path: &Path, recipient_pk: &[u8], context: Option<&[u8]>, chunk_size: Option<ChunkSize>, progress: impl FnMut(u64)) -> Result<()> {
    let context = context.unwrap_or(KRYPTON_KEM_DEFAULT_CONTEXT.as_bytes());

    let plaintext_len = std::fs::metadata(input_path).map_err(|_| Error::FileNotFound(input_path.to_path_buf()))?.len();
    let chunk_size = chunk_size.unwrap_or_else(|| ChunkSize::automatic(plaintext_len));

    let (kem_ct, shared_secret) = K::encaps(recipient_pk)?;

    let mut salt = vec![0u8; kryptonkem_kdf_defaults::SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let salt_b64 = BASE64.encode(&salt);
    debug_assert_eq!(salt_b64.len(), KRYPTON_KEM_SALT_FIELD_LEN);

    let secret_key = derive_file_key(&shared_secret, &salt)?;

    let file_name = input_path.file_name().ok_or_else(|| Error::InvalidArgs("input path has no file name".to_owned()))?.to_string_lossy().into_owned();

    let mut header = Vec::new();
    header.extend_from_slice(&format_fn_len(file_name.len())?);
    header.extend_from_slice(file_name.as_bytes());
    header.extend_from_slice(salt_b64.as_bytes());
    header.extend_from_slice(&kem_ct);

    let input = std::fs::File::open(input_path).map_err(|_| Error::FileNotFound(input_path.to_path_buf()))?;
    let output = std::fs::File::create(output_path)?;
    file::encrypt(secret_key, context, &header, chunk_size, input, output, progress).inspect_err(|_| {
        let _ = std::fs::remove_file(output_path);
    })
}

/// Decrypts the file at `input_path` into `output_dir`, recovering the original file name from
/// the embedded header. Returns the path the plaintext was written to.
pub fn decrypt<K: Kem>(input_path: &Path, output_dir: &Path, recipient_sk: &[u8], context: Option<&[u8]>, progress: impl FnMut(u64)) -> Result<std::path::PathBuf> {
    let context = context.unwrap_or(KRYPTON_KEM_DEFAULT_CONTEXT.as_bytes());

    let mut input = std::fs::File::open(input_path).map_err(|_| Error::FileNotFound(input_path.to_path_buf()))?;
    let file::FileHeader { chunk_size, vdp, header } = file::read_header(&mut input)?;

    if header.len() < KRYPTON_KEM_FN_LEN_WIDTH {
        return Err(Error::InvalidArgs("krypton kem header too short for fn_len field".to_owned()));
    }
    let fn_len_buf: [u8; KRYPTON_KEM_FN_LEN_WIDTH] = header[..KRYPTON_KEM_FN_LEN_WIDTH].try_into().expect("checked length above");
    let fn_len = parse_fn_len(&fn_len_buf)?;

    let s1 = KRYPTON_KEM_FN_LEN_WIDTH;
    let s2 = s1 + fn_len;
    let s3 = s2 + KRYPTON_KEM_SALT_FIELD_LEN;
    if header.len() < s3 {
        return Err(Error::InvalidArgs("krypton kem header too short for file name and salt fields".to_owned()));
    }

    let file_name = std::str::from_utf8(&header[s1..s2]).map_err(|_| Error::InvalidArgs("file name field is not valid utf-8".to_owned()))?.to_owned();
    let salt = BASE64.decode(&header[s2..s3]).map_err(|e| Error::InvalidArgs(e.to_string()))?;
    let kem_ct = &header[s3..];

    let shared_secret = K::decaps(recipient_sk, kem_ct)?;
    let secret_key = derive_file_key(&shared_secret, &salt)?;

    let output_path = output_dir.join(&file_name);
    let output = std::fs::File::create(&output_path)?;
    if let Err(e) = file::decrypt_body(secret_key, context, chunk_size, &vdp, &header, input, output, progress) {
        let _ = std::fs::remove_file(&output_path);
        return Err(e);
    }
    Ok(output_path)
}

/// The default output path `encrypt` would use for `input_path` when the caller supplies none.
#[must_use]
pub fn default_output_path(input_path: &Path) -> std::path::PathBuf {
    let mut out = input_path.as_os_str().to_owned();
    out.push(".");
    out.push(KRYPTON_KEM_DEFAULT_SUFFIX);
    std::path::PathBuf::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pqa::kem::MlKem768;

    #[test]
    fn encrypt_then_decrypt_recovers_file_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("secret-plans.txt");
        std::fs::write(&input_path, b"the launch is at dawn").unwrap();

        let (pk, sk) = MlKem768::keypair();
        let output_path = default_output_path(&input_path);
        encrypt::<MlKem768>(&input_path, &output_path, &pk, None, None, |_| {}).unwrap();

        let recovered_dir = dir.path().join("recovered");
        std::fs::create_dir(&recovered_dir).unwrap();
        let recovered_path = decrypt::<MlKem768>(&output_path, &recovered_dir, &sk, None, |_| {}).unwrap();

        assert_eq!(recovered_path.file_name().unwrap(), "secret-plans.txt");
        assert_eq!(std::fs::read(&recovered_path).unwrap(), b"the launch is at dawn");
    }

    #[test]
    fn decrypt_with_wrong_secret_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("file.txt");
        std::fs::write(&input_path, b"payload").unwrap();

        let (pk, _sk) = MlKem768::keypair();
        let (_wrong_pk, wrong_sk) = MlKem768::keypair();
        let output_path = default_output_path(&input_path);
        encrypt::<MlKem768>(&input_path, &output_path, &pk, None, None, |_| {}).unwrap();

        let recovered_dir = dir.path().join("recovered");
        std::fs::create_dir(&recovered_dir).unwrap();
        let err = decrypt::<MlKem768>(&output_path, &recovered_dir, &wrong_sk, None, |_| {}).unwrap_err();
        assert!(matches!(err, Error::KemDecapsFailed) || matches!(err, Error::CipherVerify));
    }
}
