#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = bl4save::decode(data, "76561198012345678");
    let _ = bl4save::decode(data, "epic_user");
});
