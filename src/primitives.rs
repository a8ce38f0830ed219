//! The block cipher and compression capabilities the codec is built on.
//!
//! Both are injected into the decoder and encoder so alternative
//! implementations (or test doubles) can be swapped in.

use crate::deflate::{self, DeflateError};
use crate::key::DerivedKey;
use crate::padding::BLOCK_SIZE;
use crate::{Bl4Error, Bl4ErrorKind};
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;

/// An error raised by a block cipher
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("input length {len} is not a multiple of the {block} byte block size")]
    Unaligned { len: usize, block: usize },
}

/// A block cipher used in ECB mode without any padding of its own
pub trait BlockCipher: Send + Sync {
    fn encrypt_ecb(&self, key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;
    fn decrypt_ecb(&self, key: &DerivedKey, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// A zlib stream compressor
pub trait Compressor: Send + Sync {
    fn deflate(&self, data: &[u8], level: u8) -> Result<Vec<u8>, DeflateError>;

    /// Inflate a zlib stream. Bytes after the end of the stream are ignored.
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, DeflateError>;
}

/// AES-256 in ECB mode
#[derive(Debug, Default, Clone, Copy)]
pub struct Aes256Ecb;

impl Aes256Ecb {
    fn apply<F>(key: &DerivedKey, data: &[u8], f: F) -> Result<Vec<u8>, CipherError>
    where
        F: Fn(&Aes256, &mut [u8]),
    {
        if data.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::Unaligned {
                len: data.len(),
                block: BLOCK_SIZE,
            });
        }

        let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));
        let mut out = data.to_vec();
        for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
            f(&cipher, chunk);
        }
        Ok(out)
    }
}

impl BlockCipher for Aes256Ecb {
    fn encrypt_ecb(&self, key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Aes256Ecb::apply(key, plaintext, |cipher, block| {
            cipher.encrypt_block(GenericArray::from_mut_slice(block))
        })
    }

    fn decrypt_ecb(&self, key: &DerivedKey, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Aes256Ecb::apply(key, ciphertext, |cipher, block| {
            cipher.decrypt_block(GenericArray::from_mut_slice(block))
        })
    }
}

/// The set of capabilities available to a codec
///
/// The default wires AES-256 and whichever compression backend was enabled
/// through cargo features. If no backend was enabled, a compressor must be
/// supplied with [`Primitives::with_compressor`].
pub struct Primitives {
    cipher: Option<Box<dyn BlockCipher>>,
    compressor: Option<Box<dyn Compressor>>,
}

impl Default for Primitives {
    fn default() -> Self {
        Primitives {
            cipher: Some(Box::new(Aes256Ecb)),
            compressor: deflate::default_compressor(),
        }
    }
}

impl std::fmt::Debug for Primitives {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitives")
            .field("cipher", &self.cipher.is_some())
            .field("compressor", &self.compressor.is_some())
            .finish()
    }
}

impl Primitives {
    /// Primitives with nothing wired
    pub fn empty() -> Self {
        Primitives {
            cipher: None,
            compressor: None,
        }
    }

    pub fn with_cipher<C: BlockCipher + 'static>(mut self, cipher: C) -> Self {
        self.cipher = Some(Box::new(cipher));
        self
    }

    pub fn with_compressor<C: Compressor + 'static>(mut self, compressor: C) -> Self {
        self.compressor = Some(Box::new(compressor));
        self
    }

    pub(crate) fn require(&self) -> Result<(&dyn BlockCipher, &dyn Compressor), Bl4Error> {
        let cipher = self
            .cipher
            .as_deref()
            .ok_or(Bl4ErrorKind::PrimitivesUnavailable {
                missing: "block cipher",
            })?;

        let compressor = self
            .compressor
            .as_deref()
            .ok_or(Bl4ErrorKind::PrimitivesUnavailable {
                missing: "compression",
            })?;

        Ok((cipher, compressor))
    }
}
