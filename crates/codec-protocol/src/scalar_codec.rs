//! Terminal codecs for base scalar types.
//!
//! Payload layouts (the element length prefix is handled by the container):
//!
//! ```text
//! uuid            16 bytes
//! str / enum      UTF-8, whole payload
//! bytes           whole payload
//! int16/32/64     2/4/8 bytes BE, payload length must match
//! float32/64      4/8 bytes BE IEEE-754
//! bool            1 byte
//! datetime        i64 µs since 2000-01-01T00:00:00Z
//! local_datetime  i64 µs since 2000-01-01T00:00:00
//! local_date      i32 days since 2000-01-01
//! local_time      i64 µs since midnight
//! duration        i64 µs, i32 days (0), i32 months (0)
//! json            u8 format (= 1), UTF-8 JSON text
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use codec_core::{DecodeError, EncodeError, Reader, ScalarType, Uuid, Value, Writer};

use crate::codec::mismatch;

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
pub const POSTGRES_EPOCH_OFFSET: i64 = 946_684_800;

/// Only JSON format understood on the wire.
pub const JSON_FORMAT: u8 = 1;

const MICROS_PER_SEC: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarCodec {
    /// Descriptor id; differs from the base id for custom scalars and enums.
    pub id: Uuid,
    pub kind: ScalarType,
}

impl ScalarCodec {
    pub fn new(id: Uuid, kind: ScalarType) -> Self {
        ScalarCodec { id, kind }
    }

    pub fn decode(&self, r: &mut Reader<'_>) -> Result<Value, DecodeError> {
        let value = match self.kind {
            ScalarType::Uuid => {
                expect_len(r, "uuid", 16)?;
                Value::Uuid(r.pop_uuid()?)
            }
            ScalarType::Str => {
                let raw = r.pop_raw(r.len())?;
                let s = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
                Value::Str(s.to_string())
            }
            ScalarType::Bytes => Value::Bytes(r.pop_raw(r.len())?.to_vec()),
            ScalarType::Int16 => {
                expect_len(r, "int16", 2)?;
                Value::Int16(r.pop_i16()?)
            }
            ScalarType::Int32 => {
                expect_len(r, "int32", 4)?;
                Value::Int32(r.pop_i32()?)
            }
            ScalarType::Int64 => {
                expect_len(r, "int64", 8)?;
                Value::Int64(r.pop_i64()?)
            }
            ScalarType::Float32 => {
                expect_len(r, "float32", 4)?;
                Value::Float32(r.pop_f32()?)
            }
            ScalarType::Float64 => {
                expect_len(r, "float64", 8)?;
                Value::Float64(r.pop_f64()?)
            }
            ScalarType::Bool => {
                expect_len(r, "bool", 1)?;
                Value::Bool(r.pop_u8()? != 0)
            }
            ScalarType::DateTime => {
                expect_len(r, "datetime", 8)?;
                Value::DateTime(datetime_from_micros(r.pop_i64()?)?)
            }
            ScalarType::LocalDateTime => {
                expect_len(r, "local_datetime", 8)?;
                Value::LocalDateTime(naive_from_micros(r.pop_i64()?)?)
            }
            ScalarType::LocalDate => {
                expect_len(r, "local_date", 4)?;
                let days = r.pop_i32()?;
                let date = epoch_date()
                    .checked_add_signed(Duration::days(days as i64))
                    .ok_or(DecodeError::OutOfRange("local_date"))?;
                Value::LocalDate(date)
            }
            ScalarType::LocalTime => {
                expect_len(r, "local_time", 8)?;
                let micros = r.pop_i64()?;
                let secs = u32::try_from(micros.div_euclid(MICROS_PER_SEC))
                    .map_err(|_| DecodeError::OutOfRange("local_time"))?;
                let nanos = (micros.rem_euclid(MICROS_PER_SEC) * 1000) as u32;
                let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                    .ok_or(DecodeError::OutOfRange("local_time"))?;
                Value::LocalTime(time)
            }
            ScalarType::Duration => {
                expect_len(r, "duration", 16)?;
                let micros = r.pop_i64()?;
                // days and months are reserved for relative durations
                r.discard(8)?;
                let nanos = micros
                    .checked_mul(1000)
                    .ok_or(DecodeError::OutOfRange("duration"))?;
                Value::Duration(Duration::nanoseconds(nanos))
            }
            ScalarType::Json => {
                let format = r.pop_u8()?;
                if format != JSON_FORMAT {
                    return Err(DecodeError::InvalidJsonFormat(format));
                }
                let raw = r.pop_raw(r.len())?;
                let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
                let json = serde_json::from_str(text)
                    .map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
                Value::Json(json)
            }
        };
        Ok(value)
    }

    pub fn encode(&self, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
        match (self.kind, v) {
            (ScalarType::Uuid, Value::Uuid(u)) => w.push_uuid(u),
            (ScalarType::Str, Value::Str(s)) => w.push_raw(s.as_bytes()),
            (ScalarType::Bytes, Value::Bytes(b)) => w.push_raw(b),
            (ScalarType::Int16, Value::Int16(n)) => w.push_i16(*n),
            (ScalarType::Int32, Value::Int32(n)) => w.push_i32(*n),
            (ScalarType::Int64, Value::Int64(n)) => w.push_i64(*n),
            (ScalarType::Float32, Value::Float32(n)) => w.push_f32(*n),
            (ScalarType::Float64, Value::Float64(n)) => w.push_f64(*n),
            (ScalarType::Bool, Value::Bool(b)) => w.push_u8(u8::from(*b)),
            (ScalarType::DateTime, Value::DateTime(dt)) => {
                w.push_i64(micros_from_datetime(dt).ok_or(EncodeError::OutOfRange("datetime"))?)
            }
            (ScalarType::LocalDateTime, Value::LocalDateTime(dt)) => {
                let micros = micros_from_datetime(&dt.and_utc())
                    .ok_or(EncodeError::OutOfRange("local_datetime"))?;
                w.push_i64(micros)
            }
            (ScalarType::LocalDate, Value::LocalDate(d)) => {
                let days = i32::try_from(d.signed_duration_since(epoch_date()).num_days())
                    .map_err(|_| EncodeError::OutOfRange("local_date"))?;
                w.push_i32(days)
            }
            (ScalarType::LocalTime, Value::LocalTime(t)) => {
                let micros = t.num_seconds_from_midnight() as i64 * MICROS_PER_SEC
                    + (t.nanosecond() / 1000) as i64;
                w.push_i64(micros)
            }
            (ScalarType::Duration, Value::Duration(d)) => {
                let micros = d
                    .num_microseconds()
                    .ok_or(EncodeError::OutOfRange("duration"))?;
                w.push_i64(micros);
                w.push_i32(0);
                w.push_i32(0);
            }
            (ScalarType::Json, Value::Json(json)) => {
                w.push_u8(JSON_FORMAT);
                w.push_raw(json.to_string().as_bytes());
            }
            (kind, other) => return Err(mismatch(kind.name(), other)),
        }
        Ok(())
    }
}

fn expect_len(r: &Reader<'_>, what: &'static str, expected: usize) -> Result<(), DecodeError> {
    if r.len() != expected {
        return Err(DecodeError::InvalidLength {
            what,
            expected,
            found: r.len(),
        });
    }
    Ok(())
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// `unix_secs = 946684800 + off / 1e6`, remainder kept as nanoseconds.
pub fn datetime_from_micros(micros: i64) -> Result<DateTime<Utc>, DecodeError> {
    let secs = POSTGRES_EPOCH_OFFSET + micros.div_euclid(MICROS_PER_SEC);
    let nanos = (micros.rem_euclid(MICROS_PER_SEC) * 1000) as u32;
    DateTime::from_timestamp(secs, nanos).ok_or(DecodeError::OutOfRange("datetime"))
}

/// Inverse of [`datetime_from_micros`]; sub-microsecond precision is dropped.
pub fn micros_from_datetime(dt: &DateTime<Utc>) -> Option<i64> {
    let secs = dt.timestamp().checked_sub(POSTGRES_EPOCH_OFFSET)?;
    secs.checked_mul(MICROS_PER_SEC)?
        .checked_add(dt.timestamp_subsec_micros() as i64)
}

/// Same arithmetic as [`datetime_from_micros`] without a timezone.
pub fn naive_from_micros(micros: i64) -> Result<NaiveDateTime, DecodeError> {
    datetime_from_micros(micros).map(|dt| dt.naive_utc())
}
