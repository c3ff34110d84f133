//! Fixed-length, zeroizing byte-array newtypes.
//!
//! Rather than validating lengths at every call site, this crate pushes the check to construction
//! time: a `SecretKey64` that exists is, by construction, exactly 64 bytes.

use std::fmt;
use std::ops::Deref;

use zeroize::Zeroize;

use crate::error::{Error, Result};

macro_rules! fixed_secret {
    ($name:ident, $len:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            #[must_use]
            pub fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Deref for $name {
            type Target = [u8; $len];

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = Error;

            fn try_from(value: &[u8]) -> Result<Self> {
                let array: [u8; $len] = value
                    .try_into()
                    .map_err(|_| Error::InvalidArgs(format!("{} must be exactly {} bytes, got {}", stringify!($name), $len, value.len())))?;
                Ok(Self(array))
            }
        }

        impl TryFrom<Vec<u8>> for $name {
            type Error = Error;

            fn try_from(value: Vec<u8>) -> Result<Self> {
                Self::try_from(value.as_slice())
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.0.zeroize();
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("[REDACTED]")
            }
        }
    };
}

fixed_secret!(SecretKey64, crate::config::KRYPTON_SECRET_KEY_LEN, "The 64-byte user-supplied Krypton secret key.");
fixed_secret!(Nonce64, crate::config::KRYPTON_NONCE_LEN, "A 64-byte Krypton session nonce.");
fixed_secret!(Salt64, crate::config::KRYPTON_SALT_LEN, "A 64-byte Krypton session salt.");

/// The 160-byte Verification Data Packet: `ct_wrap(80) || tag_wrap(16) || salt(64)`.
///
/// Not secret in the cryptographic sense (it travels on the wire), but modeled the same way as
/// the other fixed-length fields so its length is a construction-time invariant rather than a
/// runtime check scattered across `krypton::file`.
#[derive(Clone)]
pub struct Vdp160([u8; crate::config::KRYPTON_VDP_LEN]);

impl Vdp160 {
    pub const LEN: usize = crate::config::KRYPTON_VDP_LEN;

    #[must_use]
    pub fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }
}

impl Deref for Vdp160 {
    type Target = [u8; Self::LEN];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&[u8]> for Vdp160 {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        let array: [u8; Self::LEN] = value.try_into().map_err(|_| Error::InvalidArgs(format!("vdp must be exactly {} bytes, got {}", Self::LEN, value.len())))?;
        Ok(Self(array))
    }
}
