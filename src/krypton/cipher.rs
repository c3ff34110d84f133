//! The Krypton streaming authenticated cipher.
//!
//! A session is keyed from a 64-byte secret and a customization context, then walked through a
//! typestate machine so the compiler — not a runtime flag — enforces that `encrypt`/`decrypt` can
//! only be called between `begin_*` and `finish_*`. Confidentiality comes from a cSHAKE256 XOF
//! mask XORed into the plaintext before a single continuing AES-256-EAX-style stream (CTR
//! encryption plus a three-way OMAC over nonce, header, and ciphertext) re-keyed once per session,
//! not once per chunk; session integrity comes from wrapping the session nonce and the final EAX
//! tag with AES-256-SIV.

use std::marker::PhantomData;

use aes::Aes256;
use aes_siv::Aes256SivAead;
use aes_siv::aead::generic_array::GenericArray;
use aes_siv::aead::{Aead, KeyInit, Payload};
use cmac::{Cmac, Mac};
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use tiny_keccak::{CShake, Hasher, Sha3, Xof};

use crate::config::{KRYPTON_DATA_TAG_LEN, KRYPTON_NONCE_LEN, KRYPTON_SALT_LEN, KRYPTON_WRAP_TAG_LEN};
use crate::error::{Error, Result};
use crate::kdf::kkdf;
use crate::secret::{Nonce64, Salt64, SecretKey64, Vdp160};

pub mod padding;

/// Marker for a session that has not yet begun encrypting or decrypting.
pub struct Init;
/// Marker for a session currently producing ciphertext chunks.
pub struct Encrypting;
/// Marker for a session currently consuming ciphertext chunks.
pub struct Decrypting;

struct SubKeys {
    xof_seed: Vec<u8>,
    data_key: [u8; 32],
    siv_key: [u8; 64],
}

/// `SHA3-512(context || "krypton")`, mixed into every KDF call and XOF customization this session
/// makes, so a different purpose string yields wholly unrelated subkeys.
fn context_digest(context: &[u8]) -> [u8; 64] {
    let mut hasher = Sha3::v512();
    hasher.update(context);
    hasher.update(b"krypton");
    let mut out = [0u8; 64];
    hasher.finalize(&mut out);
    out
}

fn derive_subkeys(secret_key: &SecretKey64, salt: &[u8], digest: &[u8; 64]) -> Result<SubKeys> {
    let mut blocks = kkdf::derive(&secret_key[..], 64, 3, Some(salt), Some(digest))?;
    let siv_block = blocks.remove(2);
    let data_block = blocks.remove(1);
    let xof_seed = blocks.remove(0);

    let siv_key: [u8; 64] = siv_block.try_into().expect("kkdf produced a 64 byte block");
    let mut data_key = [0u8; 32];
    data_key.copy_from_slice(&data_block[..32]);

    Ok(SubKeys { xof_seed, data_key, siv_key })
}

fn new_xof(seed: &[u8], context_digest: &[u8; 64]) -> CShake {
    let mut xof = CShake::v256(context_digest, b"");
    xof.update(seed);
    xof
}

fn siv_cipher(siv_key: &[u8; 64]) -> Aes256SivAead {
    Aes256SivAead::new(GenericArray::from_slice(siv_key))
}

/// A 16-byte block encoding tweak `t` the way OMAC1 encodes its domain-separation constant: all
/// zero except the last byte.
fn tweak_block(t: u8) -> [u8; 16] {
    let mut b = [0u8; 16];
    b[15] = t;
    b
}

fn omac_one_shot(key: &[u8; 32], tweak: u8, data: &[u8]) -> [u8; KRYPTON_DATA_TAG_LEN] {
    let mut mac = Cmac::<Aes256>::new_from_slice(key).expect("32 byte key fits aes-256");
    mac.update(&tweak_block(tweak));
    mac.update(data);
    mac.finalize().into_bytes().into()
}

fn xor16(a: [u8; KRYPTON_DATA_TAG_LEN], b: [u8; KRYPTON_DATA_TAG_LEN]) -> [u8; KRYPTON_DATA_TAG_LEN] {
    let mut out = [0u8; KRYPTON_DATA_TAG_LEN];
    for i in 0..KRYPTON_DATA_TAG_LEN {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// The hand-built AES-256-EAX-style data cipher: one continuing CTR stream plus a three-way OMAC
/// over the nonce, the header, and every ciphertext byte produced. `nonce` and `header` are both
/// known in full before the first chunk, so their OMAC tags (tweaks 0 and 1) are computed once at
/// construction; the ciphertext OMAC (tweak 2) accumulates across every `encrypt`/`decrypt` call
/// and is only finalized in `finish`.
struct DataCipher {
    ctr: Ctr128BE<Aes256>,
    running_mac: Cmac<Aes256>,
    nonce_header_tag: [u8; KRYPTON_DATA_TAG_LEN],
}

impl DataCipher {
    fn new(data_key: &[u8; 32], nonce: &[u8], header: &[u8]) -> Self {
        let nonce_tag = omac_one_shot(data_key, 0, nonce);
        let header_tag = omac_one_shot(data_key, 1, header);

        let ctr = Ctr128BE::<Aes256>::new(GenericArray::from_slice(data_key), GenericArray::from_slice(&nonce_tag));

        let mut running_mac = Cmac::<Aes256>::new_from_slice(data_key).expect("32 byte key fits aes-256");
        running_mac.update(&tweak_block(2));

        Self { ctr, running_mac, nonce_header_tag: xor16(nonce_tag, header_tag) }
    }

    /// Applies the continuing CTR keystream in place. Encryption and decryption are the same
    /// operation; the stream position advances across every call for the life of the session.
    fn apply_keystream(&mut self, buf: &mut [u8]) {
        self.ctr.apply_keystream(buf);
    }

    fn authenticate_ciphertext(&mut self, ciphertext: &[u8]) {
        self.running_mac.update(ciphertext);
    }

    fn finish(self) -> [u8; KRYPTON_DATA_TAG_LEN] {
        let ciphertext_tag = self.running_mac.finalize().into_bytes();
        let mut arr = [0u8; KRYPTON_DATA_TAG_LEN];
        arr.copy_from_slice(&ciphertext_tag);
        xor16(self.nonce_header_tag, arr)
    }
}

/// A Krypton session, parameterized by its current lifecycle phase.
pub struct Krypton<State> {
    secret_key: SecretKey64,
    chunk_size: usize,
    context_digest: [u8; 64],
    salt: Salt64,
    keys: SubKeysOrNone,
    xof: Option<CShake>,
    data_cipher: Option<DataCipher>,
    session_nonce: Option<Nonce64>,
    expected_tag: Option<[u8; KRYPTON_DATA_TAG_LEN]>,
    _state: PhantomData<State>,
}

/// `SubKeys` never derives `Default`/`Clone`, so an `Init` session (which has not derived any key
/// material yet) needs a placeholder rather than an always-populated field.
enum SubKeysOrNone {
    None,
    Some(SubKeys),
}

impl Krypton<Init> {
    /// Starts a new session keyed from `secret_key`, customized by `context`, chunking plaintext
    /// into at most `chunk_size` bytes at a time.
    #[must_use]
    pub fn new(secret_key: SecretKey64, context: &[u8], chunk_size: usize) -> Self {
        Self {
            secret_key,
            chunk_size,
            context_digest: context_digest(context),
            salt: Salt64::new([0u8; KRYPTON_SALT_LEN]),
            keys: SubKeysOrNone::None,
            xof: None,
            data_cipher: None,
            session_nonce: None,
            expected_tag: None,
            _state: PhantomData,
        }
    }

    /// Begins encrypting: generates a fresh session salt and nonce, derives this session's
    /// subkeys, binds `header` as associated data, and returns a session ready for
    /// `Krypton::encrypt`.
    pub fn begin_encryption(self, header: &[u8]) -> Result<Krypton<Encrypting>> {
        use rand::RngCore;
        use rand::rngs::OsRng;

        let mut salt_bytes = [0u8; KRYPTON_SALT_LEN];
        OsRng.fill_bytes(&mut salt_bytes);
        let mut nonce_bytes = [0u8; KRYPTON_NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let keys = derive_subkeys(&self.secret_key, &salt_bytes, &self.context_digest)?;
        let xof = new_xof(&keys.xof_seed, &self.context_digest);
        let data_cipher = DataCipher::new(&keys.data_key, &nonce_bytes, header);

        Ok(Krypton {
            secret_key: self.secret_key,
            chunk_size: self.chunk_size,
            context_digest: self.context_digest,
            salt: Salt64::new(salt_bytes),
            keys: SubKeysOrNone::Some(keys),
            xof: Some(xof),
            data_cipher: Some(data_cipher),
            session_nonce: Some(Nonce64::new(nonce_bytes)),
            expected_tag: None,
            _state: PhantomData,
        })
    }

    /// Begins decrypting a previously produced Verification Data Packet: unwraps the session
    /// salt, nonce, and expected data tag, binds `header` as associated data (it must match the
    /// header used at `begin_encryption` or the final tag check fails), and returns a session
    /// ready for `Krypton::decrypt`.
    pub fn begin_decryption(self, vdp: &Vdp160, header: &[u8]) -> Result<Krypton<Decrypting>> {
        let bytes: &[u8] = &vdp[..];
        let (ct_and_tag, salt_bytes) = bytes.split_at(bytes.len() - KRYPTON_SALT_LEN);

        let keys = derive_subkeys(&self.secret_key, salt_bytes, &self.context_digest)?;

        let cipher = siv_cipher(&keys.siv_key);
        let wrap_plain = cipher
            .decrypt(GenericArray::from_slice(&[0u8; 16]), Payload { msg: ct_and_tag, aad: &self.context_digest })
            .map_err(|_| Error::CipherVerify)?;

        let (nonce_bytes, tag_bytes) = wrap_plain.split_at(KRYPTON_NONCE_LEN);
        let mut expected_tag = [0u8; KRYPTON_DATA_TAG_LEN];
        expected_tag.copy_from_slice(tag_bytes);

        let xof = new_xof(&keys.xof_seed, &self.context_digest);
        let data_cipher = DataCipher::new(&keys.data_key, nonce_bytes, header);

        let mut salt = [0u8; KRYPTON_SALT_LEN];
        salt.copy_from_slice(salt_bytes);

        let mut nonce = [0u8; KRYPTON_NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Krypton {
            secret_key: self.secret_key,
            chunk_size: self.chunk_size,
            context_digest: self.context_digest,
            salt: Salt64::new(salt),
            keys: SubKeysOrNone::Some(keys),
            xof: Some(xof),
            data_cipher: Some(data_cipher),
            session_nonce: Some(Nonce64::new(nonce)),
            expected_tag: Some(expected_tag),
            _state: PhantomData,
        })
    }
}

impl Krypton<Encrypting> {
    /// Encrypts one chunk of at most `chunk_size` plaintext bytes, returning exactly
    /// `chunk_size + 1` ciphertext bytes: the padded plaintext is first masked with an XOF
    /// keystream, then run through the session's continuing EAX-style stream.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.len() > self.chunk_size {
            return Err(Error::CipherChunkSize { expected: self.chunk_size, actual: plaintext.len() });
        }
        let SubKeysOrNone::Some(_) = &self.keys else { return Err(Error::CipherState("session keys missing")) };

        let mut buf = padding::pad(plaintext, self.chunk_size + 1)?;

        let mask = self.squeeze_mask(buf.len());
        for (b, m) in buf.iter_mut().zip(mask.iter()) {
            *b ^= m;
        }

        let data_cipher = self.data_cipher.as_mut().ok_or(Error::CipherState("session data cipher missing"))?;
        data_cipher.apply_keystream(&mut buf);
        data_cipher.authenticate_ciphertext(&buf);

        Ok(buf)
    }

    /// Finalizes the session: wraps the session nonce and final EAX tag with AES-256-SIV and
    /// returns the 160-byte Verification Data Packet, along with a fresh `Krypton<Init>` ready to
    /// begin another session from the same secret key.
    pub fn finish_encryption(self) -> Result<(Vdp160, Krypton<Init>)> {
        let SubKeysOrNone::Some(keys) = &self.keys else { return Err(Error::CipherState("session keys missing")) };
        let data_cipher = self.data_cipher.ok_or(Error::CipherState("session data cipher missing"))?;
        let tag = data_cipher.finish();

        let nonce = self.session_nonce.as_ref().ok_or(Error::CipherState("session nonce missing"))?;
        let mut wrap_plain = Vec::with_capacity(KRYPTON_NONCE_LEN + KRYPTON_DATA_TAG_LEN);
        wrap_plain.extend_from_slice(&nonce[..]);
        wrap_plain.extend_from_slice(&tag);

        let cipher = siv_cipher(&keys.siv_key);
        let ct_and_tag = cipher
            .encrypt(GenericArray::from_slice(&[0u8; 16]), Payload { msg: &wrap_plain, aad: &self.context_digest })
            .map_err(|_| Error::CipherVerify)?;
        debug_assert_eq!(ct_and_tag.len(), KRYPTON_NONCE_LEN + KRYPTON_DATA_TAG_LEN + KRYPTON_WRAP_TAG_LEN);

        let mut vdp_bytes = Vec::with_capacity(Vdp160::LEN);
        vdp_bytes.extend_from_slice(&ct_and_tag);
        vdp_bytes.extend_from_slice(&self.salt[..]);
        let vdp = Vdp160::try_from(vdp_bytes.as_slice())?;

        let next = Krypton::new(self.secret_key, b"", self.chunk_size);
        let next = Krypton { context_digest: self.context_digest, ..next };
        Ok((vdp, next))
    }
}

impl Krypton<Decrypting> {
    /// Decrypts one chunk of exactly `chunk_size + 1` ciphertext bytes, returning the recovered
    /// plaintext (which may be shorter than `chunk_size` for the file's final chunk).
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() != self.chunk_size + 1 {
            return Err(Error::CipherChunkSize { expected: self.chunk_size + 1, actual: ciphertext.len() });
        }
        let SubKeysOrNone::Some(_) = &self.keys else { return Err(Error::CipherState("session keys missing")) };

        let data_cipher = self.data_cipher.as_mut().ok_or(Error::CipherState("session data cipher missing"))?;
        data_cipher.authenticate_ciphertext(ciphertext);

        let mut buf = ciphertext.to_vec();
        data_cipher.apply_keystream(&mut buf);

        let mask = self.squeeze_mask(buf.len());
        for (b, m) in buf.iter_mut().zip(mask.iter()) {
            *b ^= m;
        }

        padding::unpad(&buf)
    }

    /// Finalizes the session: checks the final EAX tag against the tag recovered from the
    /// Verification Data Packet and, on success, returns a fresh `Krypton<Init>`.
    pub fn finish_decryption(self) -> Result<Krypton<Init>> {
        let data_cipher = self.data_cipher.ok_or(Error::CipherState("session data cipher missing"))?;
        let actual_tag = data_cipher.finish();
        let expected_tag = self.expected_tag.ok_or(Error::CipherState("session has no expected tag"))?;

        if actual_tag != expected_tag {
            return Err(Error::CipherVerify);
        }

        let next = Krypton::new(self.secret_key, b"", self.chunk_size);
        Ok(Krypton { context_digest: self.context_digest, ..next })
    }
}

impl<S> Krypton<S> {
    fn squeeze_mask(&mut self, len: usize) -> Vec<u8> {
        let mut mask = vec![0u8; len];
        self.xof.as_mut().expect("session xof initialized").squeeze(&mut mask);
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KRYPTON_SECRET_KEY_LEN;

    fn key() -> SecretKey64 {
        SecretKey64::new([7u8; KRYPTON_SECRET_KEY_LEN])
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let chunk_size = 64;
        let plaintext_chunks: [&[u8]; 3] = [&[1u8; 64], &[2u8; 64], &[3u8; 10]];
        let header = b"session header";

        let session = Krypton::<Init>::new(key(), b"test-context", chunk_size);
        let mut enc = session.begin_encryption(header).unwrap();
        let mut ciphertext_chunks = Vec::new();
        for chunk in plaintext_chunks {
            ciphertext_chunks.push(enc.encrypt(chunk).unwrap());
        }
        let (vdp, init) = enc.finish_encryption().unwrap();

        let mut dec = init.begin_decryption(&vdp, header).unwrap();
        let mut recovered = Vec::new();
        for chunk in &ciphertext_chunks {
            recovered.push(dec.decrypt(chunk).unwrap());
        }
        dec.finish_decryption().unwrap();

        for (original, got) in plaintext_chunks.iter().zip(recovered.iter()) {
            assert_eq!(*original, got.as_slice());
        }
    }

    #[test]
    fn tampered_chunk_fails_tag_check() {
        let chunk_size = 32;
        let session = Krypton::<Init>::new(key(), b"ctx", chunk_size);
        let mut enc = session.begin_encryption(b"hdr").unwrap();
        let mut ct = enc.encrypt(&[9u8; 32]).unwrap();
        let (vdp, init) = enc.finish_encryption().unwrap();

        ct[0] ^= 0xff;
        let mut dec = init.begin_decryption(&vdp, b"hdr").unwrap();
        let _ = dec.decrypt(&ct);
        let err = dec.finish_decryption().unwrap_err();
        assert!(matches!(err, Error::CipherVerify));
    }

    #[test]
    fn tampered_header_fails_tag_check() {
        let chunk_size = 32;
        let session = Krypton::<Init>::new(key(), b"ctx", chunk_size);
        let mut enc = session.begin_encryption(b"hdr").unwrap();
        let ct = enc.encrypt(&[9u8; 32]).unwrap();
        let (vdp, init) = enc.finish_encryption().unwrap();

        let mut dec = init.begin_decryption(&vdp, b"different-hdr").unwrap();
        let _ = dec.decrypt(&ct);
        let err = dec.finish_decryption().unwrap_err();
        assert!(matches!(err, Error::CipherVerify));
    }

    #[test]
    fn wrong_secret_key_fails_vdp_unwrap() {
        let chunk_size = 32;
        let session = Krypton::<Init>::new(key(), b"ctx", chunk_size);
        let mut enc = session.begin_encryption(b"hdr").unwrap();
        let _ = enc.encrypt(&[1u8; 32]).unwrap();
        let (vdp, _init) = enc.finish_encryption().unwrap();

        let wrong_key = SecretKey64::new([8u8; KRYPTON_SECRET_KEY_LEN]);
        let wrong_session = Krypton::<Init>::new(wrong_key, b"ctx", chunk_size);
        let err = wrong_session.begin_decryption(&vdp, b"hdr").unwrap_err();
        assert!(matches!(err, Error::CipherVerify));
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let session = Krypton::<Init>::new(key(), b"ctx", 16);
        let mut enc = session.begin_encryption(b"hdr").unwrap();
        let err = enc.encrypt(&[0u8; 17]).unwrap_err();
        assert!(matches!(err, Error::CipherChunkSize { .. }));
    }
}
