use crate::{
    adler32, deflate::BEST_COMPRESSION, Bl4Error, Bl4ErrorKind, PlatformIdentity, Pkcs7,
    Primitives,
};
use log::trace;

/// Length of the trailer the encoder appends after the compressed payload
pub const TRAILER_LEN: usize = 8;

/// Integrity trailer written after the compressed payload
///
/// ```
/// use bl4save::Trailer;
/// let trailer = Trailer::for_payload(b"Wikipedia");
/// assert_eq!(trailer.checksum(), 0x11E6_0398);
/// assert_eq!(trailer.len(), 9);
/// assert_eq!(trailer.to_bytes(), [0x98, 0x03, 0xE6, 0x11, 9, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    checksum: u32,
    len: u32,
}

impl Trailer {
    /// Compute the trailer for the uncompressed payload
    pub fn for_payload(data: &[u8]) -> Self {
        Trailer {
            checksum: adler32(data),
            len: data.len() as u32,
        }
    }

    /// Adler-32 of the uncompressed payload
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Length of the uncompressed payload, modulo 2^32
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn to_bytes(&self) -> [u8; TRAILER_LEN] {
        let mut out = [0u8; TRAILER_LEN];
        out[..4].copy_from_slice(&self.checksum.to_le_bytes());
        out[4..].copy_from_slice(&self.len.to_le_bytes());
        out
    }
}

/// Converts save text back into the encrypted on-disk format
#[derive(Debug)]
pub struct SaveEncoder {
    primitives: Primitives,
    padding: Pkcs7,
    level: u8,
}

impl Default for SaveEncoder {
    fn default() -> Self {
        SaveEncoder::new()
    }
}

impl SaveEncoder {
    pub fn new() -> Self {
        SaveEncoder {
            primitives: Primitives::default(),
            padding: Pkcs7::default(),
            level: BEST_COMPRESSION,
        }
    }

    pub fn with_primitives(mut self, primitives: Primitives) -> Self {
        self.primitives = primitives;
        self
    }

    pub fn with_padding(mut self, padding: Pkcs7) -> Self {
        self.padding = padding;
        self
    }

    /// zlib compression level. Defaults to the best compression.
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Compress, pad, and encrypt the text for the given user id
    pub fn encode(&self, text: &str, id: &str) -> Result<Vec<u8>, Bl4Error> {
        if id.is_empty() {
            return Err(Bl4Error::new(Bl4ErrorKind::MissingIdentity));
        }

        let (cipher, compressor) = self.primitives.require()?;

        let uncompressed = text.as_bytes();
        let mut container = compressor.deflate(uncompressed, self.level)?;
        let trailer = Trailer::for_payload(uncompressed);
        container.extend_from_slice(&trailer.to_bytes());
        trace!(
            "compressed {} bytes into {} byte container",
            uncompressed.len(),
            container.len()
        );

        let padded = self.padding.pad(&container);
        let key = PlatformIdentity::parse(id)?.derive_key();
        let encrypted = cipher.encrypt_ecb(&key, &padded)?;
        Ok(encrypted)
    }
}
