#![no_main]

use libfuzzer_sys::fuzz_target;

use netsnmp::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let _ = Oid::from_ber(data);

    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = Oid::parse(s) {
            assert_eq!(oid.to_string().parse::<Oid>().ok(), Some(oid));
        }
    }
});
