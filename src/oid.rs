//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs accepted when decoding (RFC 2578 Section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// A sequence of `u32` arcs, written in dotted-decimal form (`1.3.6.1.2.1`).
/// Equality and ordering are structural over the arcs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse dotted-decimal text.
    ///
    /// Every component must be a plain decimal number that fits in a `u32`.
    /// Empty input, empty components (`1..3`, `.1`, `1.`), signs and other
    /// characters are rejected.
    ///
    /// ```
    /// use netsnmp::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
    /// assert_eq!(oid.len(), 9);
    /// assert!(Oid::parse("1.3.-6").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(Error::invalid_oid_with_input(OidErrorKind::EmptyArc, s));
            }
            // u32::from_str accepts a leading '+', which is not an arc
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s));
            }
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Check that the OID can be BER encoded and decoded back unchanged.
    ///
    /// [`Oid::parse`] and the constructors only check syntax, so `1`, `3.1`
    /// or `1.50.2` build fine but have no faithful encoding. Requires at
    /// least two arcs, a first arc of 0, 1 or 2, a second arc below 40
    /// under roots 0 and 1, and at most [`MAX_OID_LEN`] arcs.
    ///
    /// ```
    /// use netsnmp::oid::Oid;
    ///
    /// assert!(Oid::parse("1.3.6.1").unwrap().validate().is_ok());
    /// assert!(Oid::parse("1.50.2").unwrap().validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let invalid = |kind| {
            if self.arcs.is_empty() {
                Error::invalid_oid(kind)
            } else {
                Error::invalid_oid_with_input(kind, self.to_string())
            }
        };

        let [first, second, ..] = self.arcs.as_slice() else {
            return Err(invalid(OidErrorKind::TooFewArcs));
        };
        let root_ok = match *first {
            0 | 1 => *second < 40,
            2 => *second <= u32::MAX - 80,
            _ => false,
        };
        if !root_ok {
            return Err(invalid(OidErrorKind::InvalidRootArcs));
        }
        if self.arcs.len() > MAX_OID_LEN {
            return Err(invalid(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        Ok(())
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// True if there are no arcs. An empty OID fails [`Oid::validate`].
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if `self` begins with every arc of `prefix` (an OID starts with itself).
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// True if `self` is a strict, proper prefix of `other`.
    ///
    /// ```
    /// use netsnmp::oid;
    ///
    /// let system = oid!(1, 3, 6, 1, 2, 1, 1);
    /// assert!(system.is_ancestor_of(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)));
    /// assert!(!system.is_ancestor_of(&system));
    /// assert!(!system.is_ancestor_of(&oid!(1, 3, 6, 1, 2, 1, 2)));
    /// ```
    pub fn is_ancestor_of(&self, other: &Oid) -> bool {
        self.len() < other.len() && other.starts_with(self)
    }

    /// The OID with its last arc removed, or `None` for a single-arc OID.
    pub fn parent(&self) -> Option<Oid> {
        if self.arcs.len() <= 1 {
            return None;
        }
        Some(Self::from_slice(&self.arcs[..self.arcs.len() - 1]))
    }

    /// The OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Self { arcs }
    }

    /// Encode as BER OBJECT IDENTIFIER content (no tag or length).
    ///
    /// X.690 Section 8.19: the first two arcs are packed as `arc1 * 40 + arc2`,
    /// then every subidentifier is base-128 with continuation bits. Only OIDs
    /// passing [`Oid::validate`] round-trip; request construction checks it.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        match self.arcs.as_slice() {
            [] => {}
            [only] => encode_subidentifier(&mut bytes, only.saturating_mul(40)),
            [first, second, rest @ ..] => {
                let packed = first.saturating_mul(40).saturating_add(*second);
                encode_subidentifier(&mut bytes, packed);
                for &arc in rest {
                    encode_subidentifier(&mut bytes, arc);
                }
            }
        }

        bytes
    }

    /// Encode as BER content bytes.
    pub fn to_ber(&self) -> Vec<u8> {
        self.to_ber_smallvec().to_vec()
    }

    /// Decode BER OBJECT IDENTIFIER content.
    ///
    /// Error offsets are relative to `data`. Enforces [`MAX_OID_LEN`].
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::decode(0, DecodeErrorKind::TruncatedData));
        }

        let mut arcs = SmallVec::new();

        let (packed, mut i) = decode_subidentifier(data, 0)?;
        match packed {
            0..40 => arcs.extend([0, packed]),
            40..80 => arcs.extend([1, packed - 40]),
            _ => arcs.extend([2, packed - 80]),
        }

        while i < data.len() {
            let (arc, next) = decode_subidentifier(data, i)?;
            arcs.push(arc);
            i = next;

            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(
                    i,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                ));
            }
        }

        Ok(Self { arcs })
    }
}

/// Append one base-128 subidentifier.
#[inline]
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = ((32 - value.leading_zeros()).max(1)).div_ceil(7);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Decode one subidentifier starting at `start`, returning (value, next offset).
fn decode_subidentifier(data: &[u8], start: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut i = start;

    loop {
        let Some(&byte) = data.get(i) else {
            return Err(Error::decode(i, DecodeErrorKind::TruncatedData));
        };
        i += 1;

        if value > (u32::MAX >> 7) {
            return Err(Error::decode(i, DecodeErrorKind::IntegerOverflow));
        }
        value = (value << 7) | u32::from(byte & 0x7F);

        if byte & 0x80 == 0 {
            return Ok((value, i));
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.arcs.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use netsnmp::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
