/*!
Every save is encrypted with a key personalized to the owning account.

The key starts as a fixed 32 byte constant that is XOR'd with the raw bytes
of the platform user id:

 - Steam ids (17 or more ascii digits) contribute their 64 bit value in
   little endian (8 bytes)
 - Anything else is considered an Epic id and contributes its UTF-16LE
   encoding (2 bytes per code unit, up to 32 bytes)

Bytes of the constant past the end of the id bytes are left untouched.
*/

use crate::{Bl4Error, Bl4ErrorKind};
use log::trace;
use std::fmt;
use zeroize::Zeroize;

/// Length in bytes of a derived save key (AES-256)
pub const KEY_LEN: usize = 32;

/// Minimum number of digits for a user id to be considered a Steam id
pub const STEAM_ID_MIN_DIGITS: usize = 17;

const BASE_KEY: [u8; KEY_LEN] = [
    0x35, 0xEC, 0x33, 0x77, 0xF3, 0x5D, 0xB0, 0xEA, 0xBE, 0x6B, 0x83, 0x11, 0x54, 0x03, 0xEB, 0xFB,
    0x27, 0x25, 0x64, 0x2E, 0xD5, 0x49, 0x06, 0x29, 0x05, 0x78, 0xBD, 0x60, 0xBA, 0x4A, 0xA7, 0x87,
];

/// The storefront a user id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Steam,
    Epic,
}

/// A platform user id that has been classified as Steam or Epic
///
/// The platform is inferred from the shape of the id:
///
/// ```
/// use bl4save::{Platform, PlatformIdentity};
/// let steam = PlatformIdentity::parse("76561198012345678")?;
/// assert_eq!(steam.platform(), Platform::Steam);
///
/// let epic = PlatformIdentity::parse("1234567890123456")?;
/// assert_eq!(epic.platform(), Platform::Epic);
/// # Ok::<(), bl4save::Bl4Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformIdentity<'a> {
    id: &'a str,
    platform: Platform,
}

impl<'a> PlatformIdentity<'a> {
    /// Classify a user id. Fails if the id is empty.
    pub fn parse(id: &'a str) -> Result<Self, Bl4Error> {
        if id.is_empty() {
            return Err(Bl4Error::new(Bl4ErrorKind::InvalidIdentity));
        }

        let platform = if is_steam_id(id) {
            Platform::Steam
        } else {
            Platform::Epic
        };

        trace!("user id classified as {:?} ({} chars)", platform, id.len());
        Ok(PlatformIdentity { id, platform })
    }

    /// The user id as given
    pub fn as_str(&self) -> &'a str {
        self.id
    }

    /// The platform inferred from the user id
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The raw bytes that are mixed into the base key
    pub fn key_material(&self) -> Vec<u8> {
        match self.platform {
            Platform::Steam => steam_value(self.id).to_le_bytes().to_vec(),
            Platform::Epic => self.id.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    /// Derive the save key for this identity
    pub fn derive_key(&self) -> DerivedKey {
        let mut material = self.key_material();
        let mut key = BASE_KEY;
        for (k, b) in key.iter_mut().zip(material.iter()) {
            *k ^= *b;
        }
        material.zeroize();
        DerivedKey(key)
    }
}

/// Derive the save key for a raw user id
///
/// ```
/// let a = bl4save::derive_key("76561198012345678")?;
/// let b = bl4save::derive_key("76561198012345678")?;
/// assert_eq!(a, b);
/// # Ok::<(), bl4save::Bl4Error>(())
/// ```
pub fn derive_key(id: &str) -> Result<DerivedKey, Bl4Error> {
    Ok(PlatformIdentity::parse(id)?.derive_key())
}

fn is_steam_id(id: &str) -> bool {
    id.len() >= STEAM_ID_MIN_DIGITS && id.bytes().all(|b| b.is_ascii_digit())
}

// Accumulating with wrapping arithmetic yields the value modulo 2^64, which is
// the same as truncating an arbitrary precision parse to its low 8 bytes.
fn steam_value(digits: &str) -> u64 {
    digits.bytes().fold(0u64, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
    })
}

/// A 32 byte save key. Wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
