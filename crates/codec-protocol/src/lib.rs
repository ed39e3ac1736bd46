//! codec-protocol
//!
//! Wire-level type handling for the session-typed protocol.
//!
//! The server describes every argument and result type with a descriptor
//! stream. This crate turns that stream into a
//! [`codec_core::Descriptor`] tree, binds the tree against a target
//! [`codec_core::Shape`], and runs the resulting [`Codec`] over row
//! payloads.
//!
//! - [`descriptor_parser`] : descriptor streams, both dialects
//! - [`binder`]            : descriptor + shape -> codec tree
//! - [`cache`]             : per-session memoization of the above
//! - [`scalar_codec`]      : terminal scalar layouts
//! - [`compound_codec`]    : arrays, tuples, records, ranges

pub mod wire_types;
pub mod descriptor_parser;
pub mod binder;
pub mod cache;
pub mod codec;
pub mod scalar_codec;
pub mod compound_codec;
pub mod infer;
pub mod error;

pub use wire_types::Dialect;
pub use descriptor_parser::parse_descriptor;
pub use binder::{bind, scalar_base};
pub use cache::CodecCache;
pub use codec::{decode_element, decode_required, encode_element, encode_required, Codec};
pub use infer::shape_for;
pub use error::{BindError, CodecError, ParseError};
