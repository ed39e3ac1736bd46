//! Well-known base scalar type ids.
//!
//! The server refers to its built-in scalars by fixed ids of the form
//! `00000000-0000-0000-0000-0000000001xx`. Everything else (custom scalars,
//! enums, shapes) carries a content-derived id and is resolved through the
//! descriptor tree.

use std::fmt;

use uuid::Uuid;

/// Id of the empty tuple used for "no arguments" / "no result".
pub const EMPTY_TUPLE_ID: Uuid = Uuid::nil();

pub const UUID_ID: Uuid = Uuid::from_u128(0x100);
pub const STR_ID: Uuid = Uuid::from_u128(0x101);
pub const BYTES_ID: Uuid = Uuid::from_u128(0x102);
pub const INT16_ID: Uuid = Uuid::from_u128(0x103);
pub const INT32_ID: Uuid = Uuid::from_u128(0x104);
pub const INT64_ID: Uuid = Uuid::from_u128(0x105);
pub const FLOAT32_ID: Uuid = Uuid::from_u128(0x106);
pub const FLOAT64_ID: Uuid = Uuid::from_u128(0x107);
pub const BOOL_ID: Uuid = Uuid::from_u128(0x109);
pub const DATETIME_ID: Uuid = Uuid::from_u128(0x10a);
pub const LOCAL_DATETIME_ID: Uuid = Uuid::from_u128(0x10b);
pub const LOCAL_DATE_ID: Uuid = Uuid::from_u128(0x10c);
pub const LOCAL_TIME_ID: Uuid = Uuid::from_u128(0x10d);
pub const DURATION_ID: Uuid = Uuid::from_u128(0x10e);
pub const JSON_ID: Uuid = Uuid::from_u128(0x10f);

/// Native scalar kinds a codec can produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Uuid,
    Str,
    Bytes,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    DateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Duration,
    Json,
}

impl ScalarType {
    /// Map a base scalar id to its native kind.
    pub fn from_id(id: &Uuid) -> Option<Self> {
        let kind = match *id {
            UUID_ID => ScalarType::Uuid,
            STR_ID => ScalarType::Str,
            BYTES_ID => ScalarType::Bytes,
            INT16_ID => ScalarType::Int16,
            INT32_ID => ScalarType::Int32,
            INT64_ID => ScalarType::Int64,
            FLOAT32_ID => ScalarType::Float32,
            FLOAT64_ID => ScalarType::Float64,
            BOOL_ID => ScalarType::Bool,
            DATETIME_ID => ScalarType::DateTime,
            LOCAL_DATETIME_ID => ScalarType::LocalDateTime,
            LOCAL_DATE_ID => ScalarType::LocalDate,
            LOCAL_TIME_ID => ScalarType::LocalTime,
            DURATION_ID => ScalarType::Duration,
            JSON_ID => ScalarType::Json,
            _ => return None,
        };
        Some(kind)
    }

    pub fn id(self) -> Uuid {
        match self {
            ScalarType::Uuid => UUID_ID,
            ScalarType::Str => STR_ID,
            ScalarType::Bytes => BYTES_ID,
            ScalarType::Int16 => INT16_ID,
            ScalarType::Int32 => INT32_ID,
            ScalarType::Int64 => INT64_ID,
            ScalarType::Float32 => FLOAT32_ID,
            ScalarType::Float64 => FLOAT64_ID,
            ScalarType::Bool => BOOL_ID,
            ScalarType::DateTime => DATETIME_ID,
            ScalarType::LocalDateTime => LOCAL_DATETIME_ID,
            ScalarType::LocalDate => LOCAL_DATE_ID,
            ScalarType::LocalTime => LOCAL_TIME_ID,
            ScalarType::Duration => DURATION_ID,
            ScalarType::Json => JSON_ID,
        }
    }

    /// Schema name of the scalar, e.g. `std::int64`.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Uuid => "std::uuid",
            ScalarType::Str => "std::str",
            ScalarType::Bytes => "std::bytes",
            ScalarType::Int16 => "std::int16",
            ScalarType::Int32 => "std::int32",
            ScalarType::Int64 => "std::int64",
            ScalarType::Float32 => "std::float32",
            ScalarType::Float64 => "std::float64",
            ScalarType::Bool => "std::bool",
            ScalarType::DateTime => "std::datetime",
            ScalarType::LocalDateTime => "cal::local_datetime",
            ScalarType::LocalDate => "cal::local_date",
            ScalarType::LocalTime => "cal::local_time",
            ScalarType::Duration => "std::duration",
            ScalarType::Json => "std::json",
        }
    }

    /// Whether ranges over this scalar exist on the server.
    pub fn is_range_element(self) -> bool {
        matches!(
            self,
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float32
                | ScalarType::Float64
                | ScalarType::DateTime
                | ScalarType::LocalDateTime
                | ScalarType::LocalDate
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
