use crate::primitives::Compressor;

/// zlib level used when writing saves
pub const BEST_COMPRESSION: u8 = 9;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeflateError {
    #[error("invalid compression level: {level}")]
    InvalidLevel { level: u8 },

    #[error("unable to compress: {msg}")]
    Compress { msg: String },

    #[error("unable to inflate: {msg}")]
    BadData { msg: String },
}

/// The compressor selected by the enabled cargo features, libdeflate taking
/// precedence over miniz
#[cfg(feature = "libdeflate")]
pub(crate) fn default_compressor() -> Option<Box<dyn Compressor>> {
    Some(Box::new(LibdeflateCompressor))
}

#[cfg(all(feature = "miniz", not(feature = "libdeflate")))]
pub(crate) fn default_compressor() -> Option<Box<dyn Compressor>> {
    Some(Box::new(MinizCompressor))
}

#[cfg(not(any(feature = "miniz", feature = "libdeflate")))]
pub(crate) fn default_compressor() -> Option<Box<dyn Compressor>> {
    None
}

/// zlib backed by miniz_oxide
#[cfg(feature = "miniz")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MinizCompressor;

#[cfg(feature = "miniz")]
impl Compressor for MinizCompressor {
    fn deflate(&self, data: &[u8], level: u8) -> Result<Vec<u8>, DeflateError> {
        if level > 10 {
            return Err(DeflateError::InvalidLevel { level });
        }

        Ok(miniz_oxide::deflate::compress_to_vec_zlib(data, level))
    }

    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, DeflateError> {
        miniz_oxide::inflate::decompress_to_vec_zlib(data).map_err(|e| DeflateError::BadData {
            msg: format!("{:?}", e.status),
        })
    }
}

/// zlib backed by libdeflate
#[cfg(feature = "libdeflate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LibdeflateCompressor;

#[cfg(feature = "libdeflate")]
impl LibdeflateCompressor {
    // libdeflate needs the whole output buffer up front and zlib streams don't
    // record their inflated size, so grow until the stream fits.
    const MAX_INFLATED_LEN: usize = 1 << 30;
}

#[cfg(feature = "libdeflate")]
impl Compressor for LibdeflateCompressor {
    fn deflate(&self, data: &[u8], level: u8) -> Result<Vec<u8>, DeflateError> {
        let lvl = libdeflater::CompressionLvl::new(i32::from(level))
            .map_err(|_| DeflateError::InvalidLevel { level })?;
        let mut compressor = libdeflater::Compressor::new(lvl);
        let mut out = vec![0u8; compressor.zlib_compress_bound(data.len())];
        let written = compressor
            .zlib_compress(data, &mut out)
            .map_err(|e| DeflateError::Compress {
                msg: format!("{:?}", e),
            })?;
        out.truncate(written);
        Ok(out)
    }

    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, DeflateError> {
        let mut decompressor = libdeflater::Decompressor::new();
        let mut size = (data.len() * 4).max(1024);
        loop {
            let mut out = vec![0u8; size];
            match decompressor.zlib_decompress(data, &mut out) {
                Ok(written) => {
                    out.truncate(written);
                    return Ok(out);
                }
                Err(libdeflater::DecompressionError::InsufficientSpace)
                    if size < Self::MAX_INFLATED_LEN =>
                {
                    size *= 2;
                }
                Err(e) => {
                    return Err(DeflateError::BadData {
                        msg: format!("{:?}", e),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(compressor: &dyn Compressor) {
        let data = b"state:\n  level: 50\n  cash: 12345\n".repeat(20);
        let compressed = compressor.deflate(&data, BEST_COMPRESSION).unwrap();
        assert_eq!(compressed[0], 0x78);
        assert!(compressed.len() < data.len());

        let mut trailing = compressed.clone();
        trailing.extend_from_slice(&[1, 2, 3, 4]);
        assert_eq!(compressor.inflate(&trailing).unwrap(), data);
        assert_eq!(compressor.inflate(&compressed).unwrap(), data);

        assert!(compressor.inflate(&[0x78, 0xda, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_default_compressor_present() {
        assert_eq!(
            default_compressor().is_some(),
            cfg!(any(feature = "miniz", feature = "libdeflate"))
        );
    }

    #[cfg(feature = "miniz")]
    #[test]
    fn test_miniz_roundtrip() {
        roundtrip(&MinizCompressor);
    }

    #[cfg(feature = "miniz")]
    #[test]
    fn test_miniz_invalid_level() {
        let err = MinizCompressor.deflate(b"abc", 11).unwrap_err();
        assert_eq!(err, DeflateError::InvalidLevel { level: 11 });
    }

    #[cfg(feature = "libdeflate")]
    #[test]
    fn test_libdeflate_roundtrip() {
        roundtrip(&LibdeflateCompressor);
    }

    #[cfg(feature = "libdeflate")]
    #[test]
    fn test_libdeflate_grows_output() {
        let data = vec![0u8; 1 << 20];
        let compressed = LibdeflateCompressor.deflate(&data, BEST_COMPRESSION).unwrap();
        assert_eq!(LibdeflateCompressor.inflate(&compressed).unwrap(), data);
    }
}
