//! Message codec against known wire bytes.

use bytes::Bytes;
use netsnmp::{
    DecodeErrorKind, Error, ErrorStatus, Pdu, PduArgs, PduType, Value, VarBind, Version, oid,
};

/// v2c GetRequest, community "public", request id 1, sysDescr.0
const GET_SYS_DESCR: &[u8] = &[
    0x30, 0x26, 0x02, 0x01, 0x01, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', 0xA0, 0x19,
    0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x0E, 0x30, 0x0C, 0x06, 0x08,
    0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00, 0x05, 0x00,
];

/// The same exchange answered with noSuchName at index 1.
const NO_SUCH_NAME_RESPONSE: &[u8] = &[
    0x30, 0x26, 0x02, 0x01, 0x01, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', 0xA2, 0x19,
    0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01, 0x30, 0x0E, 0x30, 0x0C, 0x06, 0x08,
    0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00, 0x05, 0x00,
];

#[test]
fn get_request_encodes_to_known_bytes() {
    let pdu = Pdu::build(
        "get",
        PduArgs {
            version: Version::V2c,
            request_id: Some(1),
            varbinds: vec!["1.3.6.1.2.1.1.1.0".into()],
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(&pdu.encode()[..], GET_SYS_DESCR);
}

#[test]
fn known_bytes_decode_to_get_request() {
    let pdu = Pdu::decode(Bytes::from_static(GET_SYS_DESCR)).unwrap();
    assert_eq!(pdu.version, Version::V2c);
    assert_eq!(&pdu.community[..], b"public");
    assert_eq!(pdu.pdu_type, PduType::Get);
    assert_eq!(pdu.request_id, 1);
    assert_eq!(
        pdu.varbinds,
        vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Null)]
    );
}

#[test]
fn error_response_decodes_to_protocol_error() {
    let err = Pdu::decode(Bytes::from_static(NO_SUCH_NAME_RESPONSE)).unwrap_err();
    assert!(matches!(
        err,
        Error::Snmp {
            status: ErrorStatus::NoSuchName,
            index: 1
        }
    ));
    assert_eq!(err.to_string(), "No such name");

    let pdu = Pdu::decode_unchecked(Bytes::from_static(NO_SUCH_NAME_RESPONSE)).unwrap();
    assert_eq!(pdu.pdu_type, PduType::Response);
    assert_eq!(pdu.error_status, 2);
    assert!(pdu.check_status().is_err());
}

#[test]
fn every_pdu_type_maps_from_its_verb_and_tag() {
    for pdu_type in PduType::ALL {
        assert_eq!(pdu_type.verb().parse::<PduType>().unwrap(), pdu_type);
        assert_eq!(PduType::from_tag(pdu_type.tag()), Some(pdu_type));
        assert_eq!(pdu_type.tag(), 0xA0 | pdu_type.number());
    }
}

#[test]
fn unknown_verbs_are_rejected() {
    for verb in ["getbulk", "walk", "GET", ""] {
        let err = verb.parse::<PduType>().unwrap_err();
        assert_eq!(err.to_string(), format!("{verb} is not supported as type"));
    }
}

#[test]
fn every_error_status_has_a_message() {
    for code in 1..=18 {
        let status = ErrorStatus::from_i32(code);
        assert_eq!(status.as_i32(), code);
        assert!(!status.message().is_empty());
        assert!(!status.message().starts_with("Unknown Error"));
    }
    assert_eq!(ErrorStatus::from_i32(19).to_string(), "Unknown Error: (19)");
    assert_eq!(ErrorStatus::from_i32(-1).to_string(), "Unknown Error: (-1)");
}

#[test]
fn building_with_error_status_fails() {
    let err = Pdu::build(
        "response",
        PduArgs {
            error_status: 5,
            error_index: 1,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "General Error");
}

#[test]
fn truncated_message_is_a_decode_error() {
    for cut in [1, 10, GET_SYS_DESCR.len() - 1] {
        let err = Pdu::decode(Bytes::copy_from_slice(&GET_SYS_DESCR[..cut])).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "cut at {cut}: {err}");
    }
}

#[test]
fn unknown_version_is_rejected() {
    let mut data = GET_SYS_DESCR.to_vec();
    data[4] = 5;
    let err = Pdu::decode(Bytes::from(data)).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode {
            kind: DecodeErrorKind::UnknownVersion(5),
            ..
        }
    ));
}

#[test]
fn typed_values_survive_a_response() {
    let response = Pdu {
        version: Version::V1,
        community: Bytes::from_static(b"private"),
        pdu_type: PduType::Response,
        request_id: 0x7fff_ffff,
        error_status: 0,
        error_index: 0,
        varbinds: vec![
            VarBind::new(oid!(1, 3, 6, 1, 1), Value::Integer(-129)),
            VarBind::new(oid!(1, 3, 6, 1, 2), Value::IpAddress([10, 0, 0, 1])),
            VarBind::new(oid!(1, 3, 6, 1, 3), Value::Counter32(u32::MAX)),
            VarBind::new(oid!(1, 3, 6, 1, 4), Value::Gauge32(7)),
            VarBind::new(oid!(1, 3, 6, 1, 5), Value::TimeTicks(100)),
            VarBind::new(oid!(1, 3, 6, 1, 6), Value::Counter64(u64::MAX)),
            VarBind::new(oid!(1, 3, 6, 1, 7), Value::Opaque(Bytes::from_static(&[0x9f, 0x78]))),
            VarBind::new(oid!(1, 3, 6, 1, 8), Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1))),
            VarBind::new(oid!(1, 3, 6, 1, 9), Value::NoSuchInstance),
        ],
    };

    let decoded = Pdu::decode(response.encode()).unwrap();
    assert_eq!(decoded, response);
}
