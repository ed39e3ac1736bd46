//! codec-inspect
//!
//! Developer tool around the codec engine. Takes descriptor streams and
//! row payloads as hex (as captured from a protocol trace) and prints
//! what the client would see:
//!
//! - `describe` : the parsed descriptor tree
//! - `decode`   : one value payload rendered as JSON
//! - `encode`   : a JSON value encoded as an argument payload

pub mod config;
pub mod render;

use anyhow::{Context, Result};
use codec_core::{Reader, Writer};
use codec_protocol::{parse_descriptor, shape_for, CodecCache, Dialect};
use tracing::debug;

/// Hex with optional whitespace and `0x` prefix, as copied from traces.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.split_whitespace().collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    hex::decode(cleaned).context("invalid hex input")
}

pub fn describe(descriptor_hex: &str, dialect: Dialect) -> Result<String> {
    let bytes = parse_hex(descriptor_hex)?;
    let desc = parse_descriptor(&bytes, dialect).context("parsing descriptor")?;
    Ok(desc.pretty())
}

/// Decode one value payload (without its length prefix) against the
/// shape the descriptor itself suggests.
pub fn decode(
    cache: &CodecCache,
    descriptor_hex: &str,
    data_hex: &str,
    dialect: Dialect,
    pretty: bool,
) -> Result<String> {
    let desc = parse_descriptor(&parse_hex(descriptor_hex)?, dialect)
        .context("parsing descriptor")?;
    let shape = shape_for(&desc, true).context("inferring shape")?;
    let codec = cache.bind(&desc, true, &shape).context("binding codec")?;

    let data = parse_hex(data_hex)?;
    let mut r = Reader::new(&data);
    let value = codec.decode(&mut r).context("decoding value")?;
    r.finish().context("decoding value")?;
    debug!(bytes = data.len(), kind = value.kind_name(), "decoded");

    let json = render::to_json(&value, &shape);
    let out = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(out)
}

/// Encode a JSON value as one argument payload, returned as hex.
pub fn encode(
    cache: &CodecCache,
    descriptor_hex: &str,
    json_text: &str,
    dialect: Dialect,
) -> Result<String> {
    let desc = parse_descriptor(&parse_hex(descriptor_hex)?, dialect)
        .context("parsing descriptor")?;
    let shape = shape_for(&desc, true).context("inferring shape")?;
    let codec = cache.bind(&desc, true, &shape).context("binding codec")?;

    let json: serde_json::Value = serde_json::from_str(json_text).context("invalid JSON input")?;
    let value = render::from_json(&json, &shape)?;

    let mut w = Writer::new();
    codec.encode(&mut w, &value).context("encoding value")?;
    let bytes = w.into_bytes()?;
    debug!(bytes = bytes.len(), "encoded");
    Ok(hex::encode(bytes))
}
