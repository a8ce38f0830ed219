/*!
# BL4 Save

BL4 Save converts Borderlands 4 save files (`.sav`) to their plaintext YAML
representation and back, preserving the byte layout the game expects.

```rust
let id = "76561198012345678";
let save = bl4save::encode("state:\n  cash: 100\n", id)?;
assert_eq!(save.len() % 16, 0);

let decoded = bl4save::decode(&save, id)?;
assert_eq!(decoded.text(), "state:\n  cash: 100\n");
assert_eq!(decoded.trailer_len(), 4);
# Ok::<(), bl4save::Bl4Error>(())
```

## Format

A save is encrypted with AES-256 in ECB mode with a key derived from the
owner's Steam or Epic user id (see [`PlatformIdentity`]). Once decrypted and
stripped of PKCS7 padding, the data is a zlib stream followed by a trailer
of the Adler-32 checksum and length of the uncompressed YAML, both little
endian.

The YAML is treated as opaque text. Decoding with the wrong user id almost
always fails with [`Bl4ErrorKind::DecompressFailure`].

## Compression backends

The `miniz` feature (default) uses miniz_oxide. The `libdeflate` feature
swaps in libdeflate. Other implementations can be supplied through
[`Primitives`].
*/

mod checksum;
mod decode;
mod deflate;
mod encode;
mod errors;
mod key;
mod padding;
mod primitives;

pub use checksum::adler32;
pub use decode::{DecodedSave, SaveDecoder, TRIM_CANDIDATES, ZLIB_MAGIC};
#[cfg(feature = "libdeflate")]
pub use deflate::LibdeflateCompressor;
#[cfg(feature = "miniz")]
pub use deflate::MinizCompressor;
pub use deflate::{DeflateError, BEST_COMPRESSION};
pub use encode::{SaveEncoder, Trailer, TRAILER_LEN};
pub use errors::*;
pub use key::{derive_key, DerivedKey, Platform, PlatformIdentity, KEY_LEN, STEAM_ID_MIN_DIGITS};
pub use padding::{PaddingStatus, Pkcs7, BLOCK_SIZE};
pub use primitives::{Aes256Ecb, BlockCipher, CipherError, Compressor, Primitives};

/// Decode a save with the default primitives
pub fn decode(data: &[u8], id: &str) -> Result<DecodedSave, Bl4Error> {
    SaveDecoder::new().decode(data, id)
}

/// Encode save text with the default primitives
pub fn encode(text: &str, id: &str) -> Result<Vec<u8>, Bl4Error> {
    SaveEncoder::new().encode(text, id)
}
