//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Definite-length encoding only. Encoding writes into a reverse buffer so
//! lengths never need to be computed ahead of the content; decoding is
//! zero-copy over [`bytes::Bytes`].

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
