//! SNMP Protocol Data Units.
//!
//! A [`Pdu`] here is the whole community-format message: version and
//! community header around the typed request/response body.
//!
//! ```text
//! SEQUENCE {
//!   version    INTEGER
//!   community  OCTET STRING
//!   [CONTEXT n] {          -- n is the PDU type
//!     request_id   INTEGER
//!     error_status INTEGER
//!     error_index  INTEGER
//!     SEQUENCE OF SEQUENCE { OBJECT IDENTIFIER, value }
//!   }
//! }
//! ```

use std::sync::atomic::{AtomicI32, Ordering};

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result, check_error_status};
use crate::varbind::{VarBind, VarBindArg, decode_varbind_list, encode_varbind_list};
use crate::version::Version;
use bytes::Bytes;

/// Largest request id; ids are drawn from `0..=MAX_REQUEST_ID`.
pub const MAX_REQUEST_ID: i32 = 0x7fff_ffff;

/// Community used when none is given.
pub const DEFAULT_COMMUNITY: &[u8] = b"public";

/// PDU type, numbered as on the wire (tag is `0xA0 | number`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    Get = 0,
    GetNext = 1,
    Response = 2,
    Set = 3,
    Inform = 6,
    Trap = 7,
    Report = 8,
}

impl PduType {
    /// All supported types.
    pub const ALL: [PduType; 7] = [
        PduType::Get,
        PduType::GetNext,
        PduType::Response,
        PduType::Set,
        PduType::Inform,
        PduType::Trap,
        PduType::Report,
    ];

    /// Numeric PDU type.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Context-specific constructed tag byte.
    pub const fn tag(self) -> u8 {
        tag::pdu_tag(self as u8)
    }

    /// Create from a tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        if tag::tag_class(tag) != tag::class::CONTEXT_SPECIFIC || !tag::is_constructed(tag) {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|t| t.number() == tag::tag_number(tag))
    }

    /// Verb naming this type, as accepted by [`Pdu::build`].
    pub const fn verb(self) -> &'static str {
        match self {
            PduType::Get => "get",
            PduType::GetNext => "getnext",
            PduType::Response => "response",
            PduType::Set => "set",
            PduType::Inform => "inform",
            PduType::Trap => "trap",
            PduType::Report => "report",
        }
    }
}

/// Parse a request verb. Unknown verbs fail with [`Error::UnsupportedPduType`].
impl std::str::FromStr for PduType {
    type Err = Error;

    fn from_str(verb: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.verb() == verb)
            .ok_or_else(|| Error::UnsupportedPduType { name: verb.into() })
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Arguments for building a [`Pdu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduArgs {
    /// Protocol version. Default: V3.
    pub version: Version,
    /// Community string. Default: `public`.
    pub community: Bytes,
    /// Request id. Default: random in `0..=MAX_REQUEST_ID`.
    pub request_id: Option<i32>,
    /// Default: 0. Any other value makes construction fail.
    pub error_status: i32,
    /// Default: 0.
    pub error_index: i32,
    pub varbinds: Vec<VarBindArg>,
}

impl Default for PduArgs {
    fn default() -> Self {
        Self {
            version: Version::default(),
            community: Bytes::from_static(DEFAULT_COMMUNITY),
            request_id: None,
            error_status: 0,
            error_index: 0,
            varbinds: Vec::new(),
        }
    }
}

/// SNMP message with its PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub version: Version,
    pub community: Bytes,
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: i32,
    pub error_status: i32,
    /// 1-based index of the varbind an error refers to
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Build a PDU from a verb (`get`, `getnext`, `set`, `inform`, `trap`,
    /// `response`, `report`).
    ///
    /// ```
    /// use netsnmp::pdu::{Pdu, PduArgs, PduType};
    ///
    /// let pdu = Pdu::build("getnext", PduArgs {
    ///     varbinds: vec!["1.3.6.1.2.1.1".into()],
    ///     ..Default::default()
    /// }).unwrap();
    /// assert_eq!(pdu.pdu_type, PduType::GetNext);
    ///
    /// let err = Pdu::build("getbulk", PduArgs::default()).unwrap_err();
    /// assert_eq!(err.to_string(), "getbulk is not supported as type");
    /// ```
    pub fn build(verb: &str, args: PduArgs) -> Result<Self> {
        let pdu_type: PduType = verb.parse()?;
        Self::new(pdu_type, args)
    }

    /// Construct a PDU of the given type.
    ///
    /// Fails on a malformed varbind OID, an out-of-range request id, or a
    /// nonzero error status (reported as [`Error::Snmp`]).
    pub fn new(pdu_type: PduType, args: PduArgs) -> Result<Self> {
        let request_id = match args.request_id {
            Some(id) if !(0..=MAX_REQUEST_ID).contains(&id) => {
                return Err(Error::InvalidRequestId { value: id });
            }
            Some(id) => id,
            None => random_request_id(),
        };

        let varbinds = args
            .varbinds
            .into_iter()
            .map(VarBind::from_arg)
            .collect::<Result<Vec<_>>>()?;

        check_error_status(args.error_status, args.error_index)?;

        Ok(Self {
            version: args.version,
            community: args.community,
            pdu_type,
            request_id,
            error_status: args.error_status,
            error_index: args.error_index,
            varbinds,
        })
    }

    /// Same PDU under a different request id.
    pub fn with_request_id(mut self, request_id: i32) -> Self {
        self.request_id = request_id;
        self
    }

    /// Encode the full message.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_constructed(self.pdu_type.tag(), |buf| {
                encode_varbind_list(buf, &self.varbinds);
                buf.push_integer(i64::from(self.error_index));
                buf.push_integer(i64::from(self.error_status));
                buf.push_integer(i64::from(self.request_id));
            });
            buf.push_octet_string(&self.community);
            buf.push_integer(i64::from(self.version.as_i32()));
        });
        buf.finish()
    }

    /// Decode a full message.
    ///
    /// Structural problems fail with [`Error::Decode`]; a well-formed message
    /// carrying a nonzero error status fails with [`Error::Snmp`].
    pub fn decode(data: Bytes) -> Result<Self> {
        let pdu = Self::decode_unchecked(data)?;
        pdu.check_status()?;
        Ok(pdu)
    }

    /// Decode without interpreting the error status.
    ///
    /// Sessions use this to match the request id before surfacing an error
    /// that may belong to a stale response.
    pub fn decode_unchecked(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let pdu = Self::decode_from(&mut decoder)?;
        decoder.finish()?;
        Ok(pdu)
    }

    /// Fail with [`Error::Snmp`] if the error status is nonzero.
    pub fn check_status(&self) -> Result<()> {
        check_error_status(self.error_status, self.error_index)
    }

    fn decode_from(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        let version_offset = seq.offset();
        let version_num = seq.read_i32()?;
        let version = Version::from_i32(version_num).ok_or_else(|| {
            Error::decode(version_offset, DecodeErrorKind::UnknownVersion(version_num))
        })?;
        let community = seq.read_octet_string()?;

        let tag_offset = seq.offset();
        let pdu_tag = seq.read_tag()?;
        let pdu_type = PduType::from_tag(pdu_tag).ok_or_else(|| {
            tracing::debug!(target: "netsnmp::ber", { snmp.offset = tag_offset, tag = pdu_tag }, "unknown PDU tag");
            Error::decode(tag_offset, DecodeErrorKind::UnknownPduType(pdu_tag))
        })?;
        let len = seq.read_length()?;
        let mut body = seq.sub_decoder(len)?;
        seq.finish()?;

        let id_offset = body.offset();
        let request_id = body.read_i32()?;
        if request_id < 0 {
            return Err(Error::decode(
                id_offset,
                DecodeErrorKind::RequestIdOutOfRange { value: request_id },
            ));
        }
        let error_status = body.read_i32()?;
        let error_index = body.read_i32()?;
        let varbinds = decode_varbind_list(&mut body)?;
        body.finish()?;

        Ok(Self {
            version,
            community,
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }
}

static FALLBACK_REQUEST_ID: AtomicI32 = AtomicI32::new(1);

/// Random request id in `0..=MAX_REQUEST_ID`.
pub(crate) fn random_request_id() -> i32 {
    let mut buf = [0u8; 4];
    match getrandom::fill(&mut buf) {
        Ok(()) => i32::from_be_bytes(buf) & MAX_REQUEST_ID,
        Err(e) => {
            tracing::warn!(target: "netsnmp::pdu", { error = %e }, "OS random source unavailable, using counter for request id");
            FALLBACK_REQUEST_ID.fetch_add(1, Ordering::Relaxed) & MAX_REQUEST_ID
        }
    }
}
