use log::warn;

/// AES block size and the default PKCS7 block size
pub const BLOCK_SIZE: usize = 16;

/// Outcome of stripping PKCS7 padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingStatus {
    /// Padding was well formed and `len` bytes were removed
    Valid { len: u8 },

    /// The trailing bytes were not valid padding and the buffer was left as-is
    Mismatch { pad: u8 },
}

impl PaddingStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, PaddingStatus::Valid { .. })
    }
}

/// PKCS7 padding over a configurable block size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pkcs7 {
    block_size: usize,
}

impl Default for Pkcs7 {
    fn default() -> Self {
        Pkcs7 {
            block_size: BLOCK_SIZE,
        }
    }
}

impl Pkcs7 {
    /// Create a padder for the given block size
    ///
    /// Returns `None` if the block size can't be represented by a padding byte
    ///
    /// ```
    /// use bl4save::Pkcs7;
    /// assert!(Pkcs7::new(16).is_some());
    /// assert!(Pkcs7::new(0).is_none());
    /// assert!(Pkcs7::new(256).is_none());
    /// ```
    pub fn new(block_size: usize) -> Option<Self> {
        if (1..=usize::from(u8::MAX)).contains(&block_size) {
            Some(Pkcs7 { block_size })
        } else {
            None
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Append between 1 and `block_size` bytes of padding. Data that is
    /// already aligned receives an entire block.
    ///
    /// ```
    /// use bl4save::Pkcs7;
    /// let padded = Pkcs7::default().pad(b"abc");
    /// assert_eq!(padded.len(), 16);
    /// assert_eq!(padded[15], 13);
    /// ```
    pub fn pad(&self, data: &[u8]) -> Vec<u8> {
        let pad = self.block_size - (data.len() % self.block_size);
        let mut out = Vec::with_capacity(data.len() + pad);
        out.extend_from_slice(data);
        out.resize(data.len() + pad, pad as u8);
        out
    }

    /// Strip padding from the data.
    ///
    /// Malformed padding is not an error: a warning is logged and the data
    /// is returned untouched alongside a [`PaddingStatus::Mismatch`].
    pub fn unpad<'a>(&self, data: &'a [u8]) -> (&'a [u8], PaddingStatus) {
        let pad = match data.last() {
            Some(&x) => x,
            None => {
                warn!("unable to unpad an empty buffer");
                return (data, PaddingStatus::Mismatch { pad: 0 });
            }
        };

        let len = usize::from(pad);
        let valid = len != 0
            && len <= data.len()
            && data[data.len() - len..].iter().all(|&x| x == pad);

        if valid {
            (&data[..data.len() - len], PaddingStatus::Valid { len: pad })
        } else {
            warn!(
                "pkcs7 padding mismatch (trailing byte {:#04x}), continuing with unpadded buffer",
                pad
            );
            (data, PaddingStatus::Mismatch { pad })
        }
    }
}
