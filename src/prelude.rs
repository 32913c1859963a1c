//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use netsnmp::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Client`], [`Oid`], [`Value`], [`VarBind`], [`Reply`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`Session`] trait
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::client::{Client, Reply};
pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::session::Session;
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
