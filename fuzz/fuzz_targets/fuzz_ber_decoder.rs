#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use netsnmp::ber::Decoder;
use netsnmp::value::Value;
use netsnmp::varbind::{VarBind, decode_varbind_list};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_integer();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_octet_string();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_oid();

    let mut decoder = Decoder::new(bytes.clone());
    if let Ok(mut seq) = decoder.read_sequence() {
        let _ = seq.read_i32();
        let _ = seq.finish();
    }

    // Every supported value type, plus exceptions and unknown tags
    let mut decoder = Decoder::new(bytes.clone());
    let _ = Value::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = VarBind::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes);
    let _ = decode_varbind_list(&mut decoder);
});
