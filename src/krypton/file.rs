//! `KryptonFile`: chunked on-disk framing around a `Krypton` session.
//!
//! Wire layout: `h_len(10) || chunk_size(10) || vdp(160) || header(h_len) || ciphertext chunks`,
//! each ciphertext chunk exactly `chunk_size + 1` bytes. The two length fields are ASCII decimal,
//! zero-padded to a fixed width, so the metadata block is human-inspectable with `head -c`.

use std::io::{Read, Write};

use crate::config::KRYPTON_FILE_ASCII_FIELD_WIDTH;
use crate::error::{Error, Result};
use crate::krypton::cipher::{Init, Krypton};
use crate::secret::{SecretKey64, Vdp160};

/// A chunk size for `KryptonFile`, restricted to discrete sets: powers of two from 1 to 256 KiB,
/// or whole mebibytes from 1 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSize {
    Kb(u32),
    Mb(u32),
}

impl ChunkSize {
    /// Builds a kibibyte chunk size. `n` must be a power of two in `1..=256`.
    pub fn kb(n: u32) -> Result<Self> {
        if n == 0 || !n.is_power_of_two() || n > 256 {
            return Err(Error::InvalidArgs(format!("chunk size in KiB must be a power of two in 1..=256, got {n}")));
        }
        Ok(Self::Kb(n))
    }

    /// Builds a mebibyte chunk size. `n` must be in `1..=10`.
    pub fn mb(n: u32) -> Result<Self> {
        if !(1..=10).contains(&n) {
            return Err(Error::InvalidArgs(format!("chunk size in MiB must be in 1..=10, got {n}")));
        }
        Ok(Self::Mb(n))
    }

    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Kb(n) => n as usize * 1024,
            Self::Mb(n) => n as usize * 1024 * 1024,
        }
    }

    /// Picks a chunk size from `plaintext_len`, favoring fewer, larger chunks as the file grows.
    /// Boundaries are inclusive: a file of exactly 1 MiB still gets the 64 KiB chunk size.
    #[must_use]
    pub fn automatic(plaintext_len: u64) -> Self {
        const MIB: u64 = 1024 * 1024;
        match plaintext_len {
            n if n <= MIB => Self::Kb(64),
            n if n <= 10 * MIB => Self::Kb(256),
            n if n <= 100 * MIB => Self::Mb(1),
            n if n <= 1024 * MIB => Self::Mb(4),
            _ => Self::Mb(10),
        }
    }
}

/// The metadata recovered by `read_header`, before any ciphertext chunk is touched.
pub struct FileHeader {
    pub chunk_size: usize,
    pub vdp: Vdp160,
    pub header: Vec<u8>,
}

fn format_ascii_field(value: usize) -> [u8; KRYPTON_FILE_ASCII_FIELD_WIDTH] {
    let text = format!("{value:0width$}", width = KRYPTON_FILE_ASCII_FIELD_WIDTH);
    let mut buf = [0u8; KRYPTON_FILE_ASCII_FIELD_WIDTH];
    buf.copy_from_slice(text.as_bytes());
    buf
}

fn parse_ascii_field(buf: &[u8; KRYPTON_FILE_ASCII_FIELD_WIDTH]) -> Result<usize> {
    std::str::from_utf8(buf)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| Error::InvalidArgs("malformed ascii length field in krypton file header".to_owned()))
}

fn read_full_or_eof<R: Read>(input: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Reads the fixed metadata block and variable-length header, leaving `input` positioned at the
/// first ciphertext chunk.
pub fn read_header<R: Read>(input: &mut R) -> Result<FileHeader> {
    let mut h_len_buf = [0u8; KRYPTON_FILE_ASCII_FIELD_WIDTH];
    input.read_exact(&mut h_len_buf)?;
    let h_len = parse_ascii_field(&h_len_buf)?;

    let mut cs_buf = [0u8; KRYPTON_FILE_ASCII_FIELD_WIDTH];
    input.read_exact(&mut cs_buf)?;
    let chunk_size = parse_ascii_field(&cs_buf)?;

    let mut vdp_buf = [0u8; Vdp160::LEN];
    input.read_exact(&mut vdp_buf)?;
    let vdp = Vdp160::try_from(&vdp_buf[..])?;

    let mut header = vec![0u8; h_len];
    input.read_exact(&mut header)?;

    Ok(FileHeader { chunk_size, vdp, header })
}

/// Encrypts `input` into `output` as a complete Krypton file, embedding `header` verbatim after
/// the fixed metadata block. `progress` is called with the cumulative plaintext byte count after
/// every chunk.
pub fn encrypt<R: Read, W: Write>(
    secret_key: SecretKey64,
    context: &[u8],
    header: &[u8],
    chunk_size: ChunkSize,
    mut input: R,
    mut output: W,
    mut progress: impl FnMut(u64),
) -> Result<()> {
    let chunk_bytes = chunk_size.bytes();
    let session = Krypton::<Init>::new(secret_key, context, chunk_bytes);
    let mut session = session.begin_encryption(header)?;

    let mut buf = vec![0u8; chunk_bytes];
    let mut ciphertext = Vec::new();
    let mut total_read: u64 = 0;
    loop {
        let n = read_full_or_eof(&mut input, &mut buf)?;
        if n == 0 {
            break;
        }
        ciphertext.extend_from_slice(&session.encrypt(&buf[..n])?);
        total_read += n as u64;
        progress(total_read);
    }

    let (vdp, _init) = session.finish_encryption()?;

    output.write_all(&format_ascii_field(header.len()))?;
    output.write_all(&format_ascii_field(chunk_bytes))?;
    output.write_all(&vdp)?;
    output.write_all(header)?;
    output.write_all(&ciphertext)?;
    Ok(())
}

/// Decrypts a complete Krypton file from `input` into `output`, returning the embedded header
/// bytes. `progress` is called with the cumulative plaintext byte count after every chunk.
pub fn decrypt<R: Read, W: Write>(secret_key: SecretKey64, context: &[u8], mut input: R, mut output: W, progress: impl FnMut(u64)) -> Result<Vec<u8>> {
    let FileHeader { chunk_size, vdp, header } = read_header(&mut input)?;
    decrypt_body(secret_key, context, chunk_size, &vdp, &header, input, output, progress)?;
    Ok(header)
}

/// Decrypts the ciphertext chunks that follow a `KryptonFile` header, once the caller has already
/// read that header (and, for `KryptonKem`, used it to recover the secret key). `header` must be
/// the exact bytes embedded on disk: it is authenticated as associated data, so any mismatch fails
/// `finish_decryption` with `Error::CipherVerify`.
pub fn decrypt_body<R: Read, W: Write>(
    secret_key: SecretKey64,
    context: &[u8],
    chunk_size: usize,
    vdp: &Vdp160,
    header: &[u8],
    mut input: R,
    mut output: W,
    mut progress: impl FnMut(u64),
) -> Result<()> {
    let session = Krypton::<Init>::new(secret_key, context, chunk_size);
    let mut session = session.begin_decryption(vdp, header)?;

    let mut buf = vec![0u8; chunk_size + 1];
    let mut total_written: u64 = 0;
    loop {
        let n = read_full_or_eof(&mut input, &mut buf)?;
        if n == 0 {
            break;
        }
        if n != buf.len() {
            return Err(Error::CipherChunkSize { expected: buf.len(), actual: n });
        }
        let plaintext = session.decrypt(&buf)?;
        output.write_all(&plaintext)?;
        total_written += plaintext.len() as u64;
        progress(total_written);
    }

    session.finish_decryption()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KRYPTON_SECRET_KEY_LEN;

    #[test]
    fn encrypt_then_decrypt_recovers_plaintext_and_header() {
        let secret_key = SecretKey64::new([3u8; KRYPTON_SECRET_KEY_LEN]);
        let plaintext = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let header = b"original-file-name.txt".to_vec();

        let mut ciphertext = Vec::new();
        encrypt(secret_key.clone(), b"ctx", &header, ChunkSize::kb(1).unwrap(), plaintext.as_slice(), &mut ciphertext, |_| {}).unwrap();

        let mut recovered = Vec::new();
        let got_header = decrypt(secret_key, b"ctx", ciphertext.as_slice(), &mut recovered, |_| {}).unwrap();

        assert_eq!(got_header, header);
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn chunk_size_boundaries_are_inclusive() {
        assert_eq!(ChunkSize::automatic(1024 * 1024), ChunkSize::Kb(64));
        assert_eq!(ChunkSize::automatic(1024 * 1024 + 1), ChunkSize::Kb(256));
    }

    #[test]
    fn kb_rejects_non_power_of_two() {
        assert!(ChunkSize::kb(3).is_err());
    }

    #[test]
    fn mb_rejects_out_of_range() {
        assert!(ChunkSize::mb(11).is_err());
        assert!(ChunkSize::mb(0).is_err());
    }

    #[test]
    fn tampered_ciphertext_is_rejected_on_decrypt() {
        let secret_key = SecretKey64::new([4u8; KRYPTON_SECRET_KEY_LEN]);
        let plaintext = vec![1u8; 4096];

        let mut ciphertext = Vec::new();
        encrypt(secret_key.clone(), b"ctx", b"hdr", ChunkSize::kb(1).unwrap(), plaintext.as_slice(), &mut ciphertext, |_| {}).unwrap();

        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;

        let mut recovered = Vec::new();
        let err = decrypt(secret_key, b"ctx", ciphertext.as_slice(), &mut recovered, |_| {}).unwrap_err();
        assert!(matches!(err, Error::CipherVerify));
    }

    #[test]
    fn tampered_header_is_rejected_on_decrypt() {
        let secret_key = SecretKey64::new([5u8; KRYPTON_SECRET_KEY_LEN]);
        let plaintext = vec![2u8; 256];

        let mut ciphertext = Vec::new();
        encrypt(secret_key.clone(), b"ctx", b"original-name.txt", ChunkSize::kb(1).unwrap(), plaintext.as_slice(), &mut ciphertext, |_| {}).unwrap();

        let mut cursor = ciphertext.as_slice();
        let FileHeader { chunk_size, vdp, header } = read_header(&mut cursor).unwrap();

        let mut tampered_header = header;
        tampered_header[0] ^= 0xff;

        let mut recovered = Vec::new();
        let err = decrypt_body(secret_key, b"ctx", chunk_size, &vdp, &tampered_header, cursor, &mut recovered, |_| {}).unwrap_err();
        assert!(matches!(err, Error::CipherVerify));
    }
}
