//! # vcu-sip
//!
//! Wire codec for the VCU radio-dispatch SIP dialect.
//!
//! This is not a general SIP implementation — it covers exactly the
//! message grammar the dispatch console and base station speak to each
//! other over UDP: a fixed header order, a handful of custom headers
//! (`Subject`, `Refered-By`, the `cwp=`/`roleid=`/`password=` From-header
//! extension params), and five little-endian binary catalog records
//! framed as base64 SIP bodies.
//!
//! - [`method`] — the method vocabulary
//! - [`params`] — [`params::MessageParams`], the flat struct the codec
//!   reads from and writes to
//! - [`serializer`] / [`parser`] — wire codec
//! - [`body`] — binary catalog record encode/decode

pub mod body;
pub mod error;
pub mod method;
pub mod params;
pub mod parser;
pub mod serializer;

pub use error::{Error, Result};
pub use method::{Method, MethodType};
pub use params::MessageParams;
pub use parser::parse;
pub use serializer::serialize;

/// Re-exports the common entry points for consumers of this crate.
pub mod prelude {
    pub use crate::body::{FreqBtnInfo, FunBtnInfo, RadioInfo, RoleInfo, TelBtnInfo};
    pub use crate::error::{Error, Result};
    pub use crate::method::{Method, MethodType};
    pub use crate::params::{MessageParams, DEFAULT_ALLOW, DEFAULT_MAX_FORWARDS, DEFAULT_SUPPORTED};
    pub use crate::parser::parse;
    pub use crate::serializer::serialize;
}
