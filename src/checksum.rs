/// Adler-32 checksum of the data, as stored in the save trailer
///
/// ```
/// assert_eq!(bl4save::adler32(b""), 1);
/// assert_eq!(bl4save::adler32(b"Wikipedia"), 0x11E6_0398);
/// ```
pub fn adler32(data: &[u8]) -> u32 {
    adler::adler32_slice(data)
}
