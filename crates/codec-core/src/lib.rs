//! codec-core
//!
//! Pure data model for the wire codec engine:
//! - buffer reader/writer primitives and message framing
//! - descriptor tree types
//! - target shapes and native values
//! - well-known scalar type ids
//!
//! Descriptor parsing and codec binding live in the `codec-protocol`
//! crate; this crate performs no I/O.

pub mod descriptor;
pub mod error;
pub mod reader;
pub mod shape;
pub mod type_id;
pub mod value;
pub mod writer;

pub use descriptor::{CompoundOp, Descriptor, DescriptorKind, Field, FieldFlags};
pub use error::{DecodeError, EncodeError};
pub use reader::{Message, Reader};
pub use shape::{Member, RecordShape, Shape, StoragePath};
pub use type_id::ScalarType;
pub use value::{RangeValue, Record, Value};
pub use writer::Writer;

pub use uuid::Uuid;
