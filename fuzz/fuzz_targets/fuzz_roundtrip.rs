#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let encoded = bl4save::encode(&text, "76561198012345678").unwrap();
    let decoded = bl4save::decode(&encoded, "76561198012345678").unwrap();
    assert_eq!(decoded.text(), text);
});
