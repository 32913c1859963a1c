//! Error types for netsnmp.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! Errors fall into two groups as far as the client is concerned: retryable
//! ones (timeouts and the SNMPv3 engine-id / time-window reports, see
//! [`Error::is_retryable`]) and fatal ones, which are surfaced on first
//! occurrence.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Invalid BER length encoding.
    InvalidLength,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Integer value overflow.
    IntegerOverflow,
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Unknown SNMP version.
    UnknownVersion(i32),
    /// Unknown PDU type.
    UnknownPduType(u8),
    /// Constructed OCTET STRING not supported.
    ConstructedOctetString,
    /// NULL with non-zero length.
    InvalidNull,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Integer64 too long.
    Integer64TooLong { length: usize },
    /// Insufficient data for read.
    InsufficientData { needed: usize, available: usize },
    /// Bytes left over after a complete structure.
    TrailingData { remaining: usize },
    /// OID exceeds maximum arc count during decode.
    OidTooLong { count: usize, max: usize },
    /// request_id outside 0..=0x7fffffff.
    RequestIdOutOfRange { value: i32 },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::ConstructedOctetString => {
                write!(f, "constructed OCTET STRING (0x24) not supported")
            }
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::Integer64TooLong { length } => {
                write!(f, "integer64 too long: {} bytes", length)
            }
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::TrailingData { remaining } => {
                write!(f, "{} unexpected trailing bytes", remaining)
            }
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::RequestIdOutOfRange { value } => {
                write!(f, "request_id {} outside 0..=2147483647", value)
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Empty component between dots (e.g. `1..3` or a trailing dot).
    EmptyArc,
    /// Component is not a non-negative decimal number that fits in 32 bits.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
    /// Fewer than the two arcs BER packs into the first subidentifier.
    TooFewArcs,
    /// First arc above 2, second arc above 39 under roots 0 and 1, or a
    /// second arc under root 2 that overflows the packed subidentifier.
    InvalidRootArcs,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::EmptyArc => write!(f, "empty arc"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::TooFewArcs => write!(f, "OID needs at least two arcs"),
            Self::InvalidRootArcs => write!(f, "first two arcs cannot be BER encoded"),
        }
    }
}

/// Messages for error-status codes 1 through 18, indexed by `code - 1`.
///
/// See <http://www.tcpipguide.com/free/t_SNMPVersion2SNMPv2MessageFormats-5.htm#Table_219>.
const ERROR_STATUS_MESSAGES: [&str; 18] = [
    "Response-PDU too big",
    "No such name",
    "Bad value",
    "Read Only",
    "General Error",
    "Access denied",
    "Wrong type",
    "Wrong length",
    "Wrong encoding",
    "Wrong value",
    "No creation",
    "Inconsistent value",
    "Resource unavailable",
    "Commit failed",
    "Undo Failed",
    "Authorization Error",
    "Not Writable",
    "Inconsistent Name",
];

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// Human-readable message for this status.
    ///
    /// Codes outside the table render as `Unknown Error: (<code>)`.
    pub fn message(&self) -> Cow<'static, str> {
        let code = self.as_i32();
        match code {
            0 => Cow::Borrowed("No error"),
            1..=18 => Cow::Borrowed(ERROR_STATUS_MESSAGES[(code - 1) as usize]),
            _ => Cow::Owned(format!("Unknown Error: ({})", code)),
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Check a PDU error-status code.
///
/// Zero passes; any other code yields [`Error::Snmp`] carrying the mapped status.
pub fn check_error_status(status: i32, index: i32) -> Result<()> {
    if status == 0 {
        return Ok(());
    }
    Err(Error::Snmp {
        status: ErrorStatus::from_i32(status),
        index,
    })
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during communication.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// No response arrived before the transport deadline.
    #[error("timeout after {elapsed:?}{} (request_id={request_id})", target.map(|t| format!(" waiting for {}", t)).unwrap_or_default())]
    Timeout {
        target: Option<SocketAddr>,
        elapsed: Duration,
        request_id: i32,
    },

    /// Unknown engine ID (SNMPv3).
    #[error("unknown engine ID")]
    UnknownEngineId { target: Option<SocketAddr> },

    /// Message outside time window (SNMPv3).
    #[error("message not in time window")]
    NotInTimeWindow { target: Option<SocketAddr> },

    /// Credentials rejected by the agent (SNMPv3).
    #[error("authentication failed")]
    AuthenticationFailed { target: Option<SocketAddr> },

    /// Nonzero error-status carried by a PDU.
    ///
    /// Displays as the mapped status message, e.g. `No such name`.
    #[error("{status}")]
    Snmp { status: ErrorStatus, index: i32 },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// A value carried a tag outside the supported SNMP value types.
    #[error("unsupported value type: tag 0x{tag:02X} at offset {offset}")]
    UnsupportedValueType { offset: usize, tag: u8 },

    /// A PDU verb that has no PDU type.
    #[error("{name} is not supported as type")]
    UnsupportedPduType { name: Box<str> },

    /// The requested protocol version has no built-in session.
    #[error("{version} requires an externally supplied session")]
    UnsupportedVersion { version: crate::version::Version },

    /// Invalid OID format.
    #[error("invalid OID{}: {kind}", input.as_ref().map(|i| format!(" '{}'", i)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Text of the offending OID, if it has any
    },

    /// A request id outside `0..=0x7fffffff` was supplied.
    #[error("request id {value} outside 0..=2147483647")]
    InvalidRequestId { value: i32 },

    /// A lookup for an identifier that is not present.
    #[error("OID not found: {oid}")]
    OidNotFound { oid: crate::oid::Oid },
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Whether the client retry policy may absorb this error.
    ///
    /// Timeouts and the SNMPv3 engine-id / time-window reports are transient:
    /// a fresh attempt (with a redone security handshake) is expected to
    /// succeed. Everything else is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::UnknownEngineId { .. } | Self::NotInTimeWindow { .. }
        )
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            Self::Timeout { target, .. } => *target,
            Self::UnknownEngineId { target } => *target,
            Self::NotInTimeWindow { target } => *target,
            Self::AuthenticationFailed { target } => *target,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_zero_passes() {
        assert!(check_error_status(0, 0).is_ok());
    }

    #[test]
    fn test_error_status_messages() {
        let expected = [
            (1, "Response-PDU too big"),
            (2, "No such name"),
            (3, "Bad value"),
            (4, "Read Only"),
            (5, "General Error"),
            (6, "Access denied"),
            (7, "Wrong type"),
            (8, "Wrong length"),
            (9, "Wrong encoding"),
            (10, "Wrong value"),
            (11, "No creation"),
            (12, "Inconsistent value"),
            (13, "Resource unavailable"),
            (14, "Commit failed"),
            (15, "Undo Failed"),
            (16, "Authorization Error"),
            (17, "Not Writable"),
            (18, "Inconsistent Name"),
        ];

        for (code, message) in expected {
            let err = check_error_status(code, 1).unwrap_err();
            assert_eq!(err.to_string(), message, "code {}", code);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_error_status_unknown_codes() {
        for code in [19, 42, -1, i32::MAX] {
            let err = check_error_status(code, 0).unwrap_err();
            assert_eq!(err.to_string(), format!("Unknown Error: ({})", code));
        }
    }

    #[test]
    fn test_error_status_roundtrip_code() {
        for code in 0..=20 {
            assert_eq!(ErrorStatus::from_i32(code).as_i32(), code);
        }
    }

    #[test]
    fn test_retryable_classes() {
        assert!(
            Error::Timeout {
                target: None,
                elapsed: Duration::from_secs(1),
                request_id: 7,
            }
            .is_retryable()
        );
        assert!(Error::UnknownEngineId { target: None }.is_retryable());
        assert!(Error::NotInTimeWindow { target: None }.is_retryable());

        assert!(!Error::AuthenticationFailed { target: None }.is_retryable());
        assert!(!Error::decode(0, DecodeErrorKind::TruncatedData).is_retryable());
        assert!(
            !Error::UnsupportedPduType {
                name: "getbulk".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_unsupported_pdu_type_message() {
        let err = Error::UnsupportedPduType {
            name: "getbulk".into(),
        };
        assert_eq!(err.to_string(), "getbulk is not supported as type");
    }
}
