//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. [`VarBindArg`] is the unvalidated
//! form callers hand to the client: the OID may still be text.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Validate a caller-supplied argument, parsing a textual OID.
    ///
    /// Both the name and an OID value must pass [`Oid::validate`], so that
    /// every varbind built here encodes faithfully.
    pub fn from_arg(arg: VarBindArg) -> Result<Self> {
        let oid = arg.oid.into_oid()?;
        if let Value::ObjectIdentifier(value) = &arg.value {
            value.validate()?;
        }
        Ok(Self {
            oid,
            value: arg.value,
        })
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Decode from BER. The sequence must hold exactly an OID and a value.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        seq.finish()?;
        Ok(VarBind { oid, value })
    }

    /// Split into the `(oid, value)` pair.
    pub fn into_pair(self) -> (Oid, Value) {
        (self.oid, self.value)
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a list of VarBinds, preserving order.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        // Reverse buffer: last varbind goes in first
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decode a list of VarBinds.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence()?;
    let mut varbinds = Vec::new();

    while !seq.is_empty() {
        varbinds.push(VarBind::decode(&mut seq)?);
    }

    Ok(varbinds)
}

/// An OID as given by the caller: dotted text or an already parsed [`Oid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OidArg {
    Text(String),
    Parsed(Oid),
}

impl OidArg {
    /// Parse text if needed and check the OID is encodable.
    pub fn into_oid(self) -> Result<Oid> {
        let oid = match self {
            OidArg::Parsed(oid) => oid,
            OidArg::Text(text) => Oid::parse(&text)?,
        };
        oid.validate()?;
        Ok(oid)
    }
}

/// Caller-side varbind: an OID (possibly unparsed) and a value, `Null` for reads.
///
/// Conversions exist for the common shapes, so request methods accept
/// `"1.3.6.1.2.1.1.5.0"`, `oid!(..)`, `("1.3.6.1.2.1.1.5.0", "myhost")`
/// or `(oid, value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBindArg {
    pub oid: OidArg,
    pub value: Value,
}

impl VarBindArg {
    pub fn new(oid: impl Into<OidArg>, value: impl Into<Value>) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for OidArg {
    fn from(s: &str) -> Self {
        OidArg::Text(s.to_owned())
    }
}

impl From<String> for OidArg {
    fn from(s: String) -> Self {
        OidArg::Text(s)
    }
}

impl From<Oid> for OidArg {
    fn from(oid: Oid) -> Self {
        OidArg::Parsed(oid)
    }
}

impl From<&Oid> for OidArg {
    fn from(oid: &Oid) -> Self {
        OidArg::Parsed(oid.clone())
    }
}

impl From<&str> for VarBindArg {
    fn from(s: &str) -> Self {
        Self::new(s, Value::Null)
    }
}

impl From<String> for VarBindArg {
    fn from(s: String) -> Self {
        Self::new(s, Value::Null)
    }
}

impl From<Oid> for VarBindArg {
    fn from(oid: Oid) -> Self {
        Self::new(oid, Value::Null)
    }
}

impl From<&Oid> for VarBindArg {
    fn from(oid: &Oid) -> Self {
        Self::new(oid, Value::Null)
    }
}

impl From<VarBind> for VarBindArg {
    fn from(vb: VarBind) -> Self {
        Self::new(vb.oid, vb.value)
    }
}

impl<V: Into<Value>> From<(&str, V)> for VarBindArg {
    fn from((oid, value): (&str, V)) -> Self {
        Self::new(oid, value)
    }
}

impl<V: Into<Value>> From<(Oid, V)> for VarBindArg {
    fn from((oid, value): (Oid, V)) -> Self {
        Self::new(oid, value)
    }
}
