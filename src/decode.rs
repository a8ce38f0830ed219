/*!
After decryption and unpadding, a save is a zlib stream followed by a
trailer. Saves written by this crate (and the game) use an 8 byte trailer
(adler32 + length), but 4 byte trailers have been observed as well and
nothing in the file says which one is present.

So the decoder tries to strip 4 bytes then 8 bytes, and accepts the first
candidate that starts with the zlib magic byte (`0x78`) and inflates
successfully. The magic byte only filters out candidates that can't be
zlib; inflation is the real check.
*/

use crate::{
    Bl4Error, Bl4ErrorKind, Compressor, PaddingStatus, Pkcs7, PlatformIdentity, Primitives,
};
use log::{debug, trace, warn};

/// The trailer lengths tried, in order, when locating the zlib stream
pub const TRIM_CANDIDATES: [usize; 2] = [4, 8];

/// First byte of a zlib stream with a 32K window
pub const ZLIB_MAGIC: u8 = 0x78;

/// A decrypted and inflated save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSave {
    text: String,
    trailer_len: usize,
    padding: PaddingStatus,
}

impl DecodedSave {
    /// The save contents
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of trailer bytes that were stripped before inflating
    pub fn trailer_len(&self) -> usize {
        self.trailer_len
    }

    /// Whether the decrypted data carried valid PKCS7 padding. A mismatch
    /// means decoding continued with the padded buffer.
    pub fn padding(&self) -> PaddingStatus {
        self.padding
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Converts an encrypted save into text
#[derive(Debug, Default)]
pub struct SaveDecoder {
    primitives: Primitives,
    padding: Pkcs7,
    strict_padding: bool,
}

impl SaveDecoder {
    pub fn new() -> Self {
        SaveDecoder::default()
    }

    pub fn with_primitives(mut self, primitives: Primitives) -> Self {
        self.primitives = primitives;
        self
    }

    pub fn with_padding(mut self, padding: Pkcs7) -> Self {
        self.padding = padding;
        self
    }

    /// Fail on malformed padding instead of continuing with the padded data.
    /// Off by default.
    pub fn with_strict_padding(mut self, strict: bool) -> Self {
        self.strict_padding = strict;
        self
    }

    /// Decrypt, unpad, and inflate the save for the given user id
    pub fn decode(&self, data: &[u8], id: &str) -> Result<DecodedSave, Bl4Error> {
        if id.is_empty() {
            return Err(Bl4Error::new(Bl4ErrorKind::MissingIdentity));
        }

        let (cipher, compressor) = self.primitives.require()?;
        let key = PlatformIdentity::parse(id)?.derive_key();

        let mut decrypted = cipher.decrypt_ecb(&key, data)?;
        decrypted.truncate(data.len());

        let (unpadded, padding) = self.padding.unpad(&decrypted);
        if let PaddingStatus::Mismatch { pad } = padding {
            if self.strict_padding {
                return Err(Bl4Error::new(Bl4ErrorKind::PaddingMismatch { pad }));
            }
        }

        let (inflated, trailer_len) = inflate_container(compressor, unpadded)?;
        let text = String::from_utf8(inflated)?;
        Ok(DecodedSave {
            text,
            trailer_len,
            padding,
        })
    }
}

/// Locate and inflate the zlib stream in an unpadded container, returning the
/// inflated data and the trailer length that was stripped
pub(crate) fn inflate_container(
    compressor: &dyn Compressor,
    data: &[u8],
) -> Result<(Vec<u8>, usize), Bl4Error> {
    for trim in TRIM_CANDIDATES {
        let candidate = match data.len().checked_sub(trim) {
            Some(end) => &data[..end],
            None => continue,
        };

        match candidate.first() {
            Some(&ZLIB_MAGIC) => {}
            first => {
                trace!("trim {}: no zlib magic (first byte: {:?})", trim, first);
                continue;
            }
        }

        match compressor.inflate(candidate) {
            Ok(inflated) => {
                debug!(
                    "trim {}: inflated {} bytes into {} bytes",
                    trim,
                    candidate.len(),
                    inflated.len()
                );
                return Ok((inflated, trim));
            }
            Err(e) => debug!("trim {}: {}", trim, e),
        }
    }

    warn!("no trailer candidate produced a zlib stream");
    Err(Bl4Error::new(Bl4ErrorKind::DecompressFailure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockCipher, CipherError, DeflateError, DerivedKey};
    use std::sync::{Arc, Mutex};

    /// Accepts only inputs of a given length and records every attempt
    #[derive(Clone, Default)]
    struct FakeCompressor {
        accept_len: usize,
        attempts: Arc<Mutex<Vec<usize>>>,
    }

    impl FakeCompressor {
        fn accepting(accept_len: usize) -> Self {
            FakeCompressor {
                accept_len,
                attempts: Arc::default(),
            }
        }

        fn attempts(&self) -> Vec<usize> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl Compressor for FakeCompressor {
        fn deflate(&self, data: &[u8], _level: u8) -> Result<Vec<u8>, DeflateError> {
            Ok(data.to_vec())
        }

        fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, DeflateError> {
            self.attempts.lock().unwrap().push(data.len());
            if data.len() == self.accept_len {
                Ok(b"inflated".to_vec())
            } else {
                Err(DeflateError::BadData {
                    msg: String::from("fake"),
                })
            }
        }
    }

    /// Passes data through untouched, optionally appending junk to the output
    struct PassthroughCipher {
        extra: usize,
    }

    impl BlockCipher for PassthroughCipher {
        fn encrypt_ecb(&self, _key: &DerivedKey, data: &[u8]) -> Result<Vec<u8>, CipherError> {
            Ok(data.to_vec())
        }

        fn decrypt_ecb(&self, _key: &DerivedKey, data: &[u8]) -> Result<Vec<u8>, CipherError> {
            let mut out = data.to_vec();
            out.resize(data.len() + self.extra, 0xAA);
            Ok(out)
        }
    }

    fn container(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        data[0] = ZLIB_MAGIC;
        data
    }

    #[test]
    fn test_trim_four_wins_first() {
        let data = container(20);
        let fake = FakeCompressor::accepting(16);
        let (inflated, trim) = inflate_container(&fake, &data).unwrap();
        assert_eq!(inflated, b"inflated");
        assert_eq!(trim, 4);
        assert_eq!(fake.attempts(), vec![16]);
    }

    #[test]
    fn test_trim_eight_fallback() {
        let data = container(20);
        let fake = FakeCompressor::accepting(12);
        let (_, trim) = inflate_container(&fake, &data).unwrap();
        assert_eq!(trim, 8);
        assert_eq!(fake.attempts(), vec![16, 12]);
    }

    #[test]
    fn test_no_magic_skips_inflate() {
        let data = vec![0x1fu8; 20];
        let fake = FakeCompressor::accepting(16);
        let err = inflate_container(&fake, &data).unwrap_err();
        assert!(matches!(err.kind(), Bl4ErrorKind::DecompressFailure));
        assert!(fake.attempts().is_empty());
    }

    #[test]
    fn test_short_container() {
        let fake = FakeCompressor::accepting(0);
        for len in 0..=8 {
            let data = vec![ZLIB_MAGIC; len];
            assert!(inflate_container(&fake, &data).is_err());
        }

        // an empty candidate never reaches the compressor
        assert_eq!(fake.attempts(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_truncates_cipher_output() {
        let fake = FakeCompressor::accepting(24);
        let mut data = container(32);
        data[28..].copy_from_slice(&[4, 4, 4, 4]);

        let decoder = SaveDecoder::new().with_primitives(
            Primitives::empty()
                .with_cipher(PassthroughCipher { extra: 16 })
                .with_compressor(fake.clone()),
        );
        let save = decoder.decode(&data, "someone").unwrap();
        assert_eq!(save.text(), "inflated");
        assert_eq!(save.trailer_len(), 4);
        assert_eq!(save.padding(), PaddingStatus::Valid { len: 4 });
        assert_eq!(fake.attempts(), vec![24]);
    }

    #[test]
    fn test_decode_padding_mismatch_is_soft() {
        let fake = FakeCompressor::accepting(28);
        let mut data = container(32);
        data[31] = 3;

        let primitives = || {
            Primitives::empty()
                .with_cipher(PassthroughCipher { extra: 0 })
                .with_compressor(fake.clone())
        };

        let save = SaveDecoder::new()
            .with_primitives(primitives())
            .decode(&data, "someone")
            .unwrap();
        assert_eq!(save.padding(), PaddingStatus::Mismatch { pad: 3 });
        assert_eq!(save.trailer_len(), 4);

        let err = SaveDecoder::new()
            .with_primitives(primitives())
            .with_strict_padding(true)
            .decode(&data, "someone")
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            Bl4ErrorKind::PaddingMismatch { pad: 3 }
        ));
    }

    #[test]
    fn test_decode_missing_identity() {
        let err = SaveDecoder::new().decode(&[0u8; 16], "").unwrap_err();
        assert!(matches!(err.kind(), Bl4ErrorKind::MissingIdentity));
    }

    #[test]
    fn test_decode_missing_primitives() {
        let err = SaveDecoder::new()
            .with_primitives(Primitives::empty())
            .decode(&[0u8; 16], "someone")
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            Bl4ErrorKind::PrimitivesUnavailable { .. }
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        struct Binary;
        impl Compressor for Binary {
            fn deflate(&self, data: &[u8], _level: u8) -> Result<Vec<u8>, DeflateError> {
                Ok(data.to_vec())
            }

            fn inflate(&self, _data: &[u8]) -> Result<Vec<u8>, DeflateError> {
                Ok(vec![0xff, 0xfe])
            }
        }

        let mut data = container(16);
        data[15] = 1;
        let err = SaveDecoder::new()
            .with_primitives(
                Primitives::empty()
                    .with_cipher(PassthroughCipher { extra: 0 })
                    .with_compressor(Binary),
            )
            .decode(&data, "someone")
            .unwrap_err();
        assert!(matches!(err.kind(), Bl4ErrorKind::Utf8(_)));
    }
}
