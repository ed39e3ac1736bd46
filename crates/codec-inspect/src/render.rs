//! Conversion between codec values and JSON, guided by the bound shape.
//!
//! Text forms:
//!
//! | value          | JSON                                        |
//! |----------------|---------------------------------------------|
//! | uuid           | hyphenated string                           |
//! | bytes          | lowercase hex string                        |
//! | datetime       | RFC 3339 string, UTC                        |
//! | local_datetime | `YYYY-MM-DDTHH:MM:SS[.ffffff]`              |
//! | local_date     | `YYYY-MM-DD`                                |
//! | local_time     | `HH:MM:SS[.ffffff]`                         |
//! | duration       | integer microseconds                        |
//! | record         | object keyed by member name                 |
//! | tuple / array  | array                                       |
//! | range          | `{lower, upper, inc_lower, inc_upper, empty}`|

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use codec_core::{RangeValue, Record, RecordShape, ScalarType, Shape, Uuid, Value};
use serde_json::{json, Map, Value as Json};

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const LOCAL_TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Render a decoded value. `shape` supplies record member names.
pub fn to_json(value: &Value, shape: &Shape) -> Json {
    match (value, shape) {
        (Value::Null, _) => Json::Null,
        (v, Shape::Optional(inner)) => to_json(v, inner),
        (Value::Record(rec), Shape::Record(rs)) => {
            let mut out = Map::new();
            record_to_json(rec, rs, &mut out);
            Json::Object(out)
        }
        (Value::Array(items) | Value::Set(items), Shape::Array(inner) | Shape::Set(inner)) => {
            Json::Array(items.iter().map(|v| to_json(v, inner)).collect())
        }
        (Value::Tuple(items), Shape::Tuple(shapes)) => Json::Array(
            items
                .iter()
                .zip(shapes)
                .map(|(v, s)| to_json(v, s))
                .collect(),
        ),
        (Value::Range(range), Shape::Range(inner)) => range_to_json(range, inner),
        (Value::MultiRange(ranges), Shape::MultiRange(inner)) => {
            Json::Array(ranges.iter().map(|r| range_to_json(r, inner)).collect())
        }
        (v, _) => scalar_to_json(v),
    }
}

fn record_to_json(rec: &Record, shape: &RecordShape, out: &mut Map<String, Json>) {
    for (member, value) in shape.members.iter().zip(&rec.fields) {
        match (member.embedded, value, &member.shape) {
            (true, Value::Record(inner), Shape::Record(inner_shape)) => {
                record_to_json(inner, inner_shape, out)
            }
            _ => {
                out.insert(member.name.clone(), to_json(value, &member.shape));
            }
        }
    }
}

fn range_to_json(range: &RangeValue, element: &Shape) -> Json {
    let bound = |b: &Option<Box<Value>>| match b {
        Some(v) => to_json(v, element),
        None => Json::Null,
    };
    json!({
        "lower": bound(&range.lower),
        "upper": bound(&range.upper),
        "inc_lower": range.inc_lower,
        "inc_upper": range.inc_upper,
        "empty": range.empty,
    })
}

fn scalar_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Uuid(u) => Json::String(u.hyphenated().to_string()),
        Value::Str(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(hex::encode(b)),
        Value::Int16(n) => json!(n),
        Value::Int32(n) => json!(n),
        Value::Int64(n) => json!(n),
        Value::Float32(n) => json!(n),
        Value::Float64(n) => json!(n),
        Value::Bool(b) => json!(b),
        Value::DateTime(dt) => Json::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::LocalDateTime(dt) => Json::String(dt.format(LOCAL_DATETIME_FORMAT).to_string()),
        Value::LocalDate(d) => Json::String(d.to_string()),
        Value::LocalTime(t) => Json::String(t.format(LOCAL_TIME_FORMAT).to_string()),
        Value::Duration(d) => d.num_microseconds().map_or(Json::Null, |us| json!(us)),
        Value::Json(j) => j.clone(),
        // containers without a matching shape: render positionally
        Value::Array(items) | Value::Set(items) | Value::Tuple(items) => {
            Json::Array(items.iter().map(scalar_to_json).collect())
        }
        Value::Record(rec) => Json::Array(rec.fields.iter().map(scalar_to_json).collect()),
        Value::Range(_) | Value::MultiRange(_) => Json::Null,
    }
}

/// Build an argument value of `shape` from JSON.
pub fn from_json(json: &Json, shape: &Shape) -> Result<Value> {
    match shape {
        Shape::Optional(_) if json.is_null() => Ok(Value::Null),
        Shape::Optional(inner) => from_json(json, inner),
        Shape::Scalar(kind) => scalar_from_json(json, *kind),
        Shape::Array(inner) => Ok(Value::Array(items_from_json(json, inner)?)),
        Shape::Set(inner) => Ok(Value::Set(items_from_json(json, inner)?)),
        Shape::Tuple(shapes) => {
            let items = json.as_array().ok_or_else(|| anyhow!("expected array for tuple"))?;
            if items.len() != shapes.len() {
                bail!("expected {} tuple elements, got {}", shapes.len(), items.len());
            }
            let values = items
                .iter()
                .zip(shapes)
                .map(|(j, s)| from_json(j, s))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Tuple(values))
        }
        Shape::Record(rs) => Ok(Value::Record(record_from_json(json, rs)?)),
        Shape::Range(inner) => Ok(Value::Range(range_from_json(json, inner)?)),
        Shape::MultiRange(inner) => {
            let items = json
                .as_array()
                .ok_or_else(|| anyhow!("expected array for multirange"))?;
            let ranges = items
                .iter()
                .map(|j| range_from_json(j, inner))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::MultiRange(ranges))
        }
    }
}

fn items_from_json(json: &Json, element: &Shape) -> Result<Vec<Value>> {
    let items = json.as_array().ok_or_else(|| anyhow!("expected array"))?;
    items.iter().map(|j| from_json(j, element)).collect()
}

fn record_from_json(json: &Json, shape: &RecordShape) -> Result<Record> {
    let obj = json
        .as_object()
        .ok_or_else(|| anyhow!("expected object for {}", shape.name))?;
    let mut fields = Vec::with_capacity(shape.members.len());
    for member in &shape.members {
        let value = match (&member.shape, member.embedded) {
            (Shape::Record(inner), true) => Value::Record(record_from_json(json, inner)?),
            _ => match obj.get(&member.name) {
                Some(j) => from_json(j, &member.shape).with_context(|| member.name.clone())?,
                None if member.shape.is_optional() => Value::Null,
                None => bail!("missing member `{}` of {}", member.name, shape.name),
            },
        };
        fields.push(value);
    }
    Ok(Record::new(fields))
}

fn range_from_json(json: &Json, element: &Shape) -> Result<RangeValue> {
    let obj = json.as_object().ok_or_else(|| anyhow!("expected object for range"))?;
    let flag = |key: &str| obj.get(key).and_then(Json::as_bool).unwrap_or(false);
    if flag("empty") {
        return Ok(RangeValue::empty());
    }
    let bound = |key: &str| -> Result<Option<Box<Value>>> {
        match obj.get(key) {
            None | Some(Json::Null) => Ok(None),
            Some(j) => Ok(Some(Box::new(from_json(j, element)?))),
        }
    };
    Ok(RangeValue {
        lower: bound("lower")?,
        upper: bound("upper")?,
        inc_lower: flag("inc_lower"),
        inc_upper: flag("inc_upper"),
        empty: false,
    })
}

fn scalar_from_json(json: &Json, kind: ScalarType) -> Result<Value> {
    let value = match kind {
        ScalarType::Uuid => Value::Uuid(Uuid::parse_str(text(json, kind)?)?),
        ScalarType::Str => Value::Str(text(json, kind)?.to_string()),
        ScalarType::Bytes => Value::Bytes(hex::decode(text(json, kind)?)?),
        ScalarType::Int16 => Value::Int16(i16::try_from(int(json, kind)?)?),
        ScalarType::Int32 => Value::Int32(i32::try_from(int(json, kind)?)?),
        ScalarType::Int64 => Value::Int64(int(json, kind)?),
        ScalarType::Float32 => Value::Float32(float(json, kind)? as f32),
        ScalarType::Float64 => Value::Float64(float(json, kind)?),
        ScalarType::Bool => Value::Bool(
            json.as_bool()
                .ok_or_else(|| anyhow!("expected boolean for {}", kind))?,
        ),
        ScalarType::DateTime => Value::DateTime(
            DateTime::parse_from_rfc3339(text(json, kind)?)?.with_timezone(&Utc),
        ),
        ScalarType::LocalDateTime => Value::LocalDateTime(NaiveDateTime::parse_from_str(
            text(json, kind)?,
            LOCAL_DATETIME_FORMAT,
        )?),
        ScalarType::LocalDate => Value::LocalDate(text(json, kind)?.parse::<NaiveDate>()?),
        ScalarType::LocalTime => {
            Value::LocalTime(NaiveTime::parse_from_str(text(json, kind)?, LOCAL_TIME_FORMAT)?)
        }
        ScalarType::Duration => Value::Duration(Duration::microseconds(int(json, kind)?)),
        ScalarType::Json => Value::Json(json.clone()),
    };
    Ok(value)
}

fn text(json: &Json, kind: ScalarType) -> Result<&str> {
    json.as_str()
        .ok_or_else(|| anyhow!("expected string for {}", kind))
}

fn int(json: &Json, kind: ScalarType) -> Result<i64> {
    json.as_i64()
        .ok_or_else(|| anyhow!("expected integer for {}", kind))
}

fn float(json: &Json, kind: ScalarType) -> Result<f64> {
    json.as_f64()
        .ok_or_else(|| anyhow!("expected number for {}", kind))
}
