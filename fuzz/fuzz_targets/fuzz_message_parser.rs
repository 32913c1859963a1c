#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use netsnmp::pdu::Pdu;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let _ = Pdu::decode(bytes.clone());

    // Anything that decodes must re-encode to something that decodes the same
    if let Ok(pdu) = Pdu::decode_unchecked(bytes) {
        let again = Pdu::decode_unchecked(pdu.encode());
        assert_eq!(again.ok().as_ref(), Some(&pdu));
    }
});
