//! Append-only writer with back-patched length prefixes.
//!
//! `begin_bytes`/`end_bytes` and `begin_message`/`end_message` push and pop
//! a stack of pending offsets, so regions nest:
//!
//! ```text
//! begin_message(b'D')        -> [D][len?]
//!   begin_bytes()            ->          [len?]
//!     push_i64(7)            ->                [00..07]
//!   end_bytes()              ->          [0008]
//! end_message()              -> [D][000c]
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use crate::error::EncodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Length excludes the prefix itself.
    Bytes(usize),
    /// Length includes the prefix (everything after the tag).
    Message(usize),
}

#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
    pending: Vec<Region>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buf: BytesMut::with_capacity(capacity),
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn push_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn push_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn push_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn push_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    pub fn push_i16(&mut self, v: i16) {
        self.buf.put_i16(v);
    }

    pub fn push_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn push_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    pub fn push_f32(&mut self, v: f32) {
        self.buf.put_f32(v);
    }

    pub fn push_f64(&mut self, v: f64) {
        self.buf.put_f64(v);
    }

    pub fn push_uuid(&mut self, v: &Uuid) {
        self.buf.put_slice(v.as_bytes());
    }

    /// Raw bytes, no length prefix.
    pub fn push_raw(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// u32 length prefix plus payload.
    pub fn push_bytes(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        let len = u32::try_from(data.len()).map_err(|_| EncodeError::TooLong(data.len()))?;
        self.buf.put_u32(len);
        self.buf.put_slice(data);
        Ok(())
    }

    pub fn push_string(&mut self, s: &str) -> Result<(), EncodeError> {
        self.push_bytes(s.as_bytes())
    }

    /// Open a length-prefixed region whose length is patched by `end_bytes`.
    pub fn begin_bytes(&mut self) {
        self.pending.push(Region::Bytes(self.buf.len()));
        self.buf.put_u32(0);
    }

    pub fn end_bytes(&mut self) -> Result<(), EncodeError> {
        match self.pending.last().copied() {
            Some(Region::Bytes(at)) => {
                self.pending.pop();
                self.patch(at, self.buf.len() - at - 4)
            }
            _ => Err(EncodeError::UnbalancedRegion),
        }
    }

    /// Start a framed message: tag byte then a back-patched length.
    pub fn begin_message(&mut self, tag: u8) {
        self.buf.put_u8(tag);
        self.pending.push(Region::Message(self.buf.len()));
        self.buf.put_u32(0);
    }

    /// Close the innermost message. Any `begin_bytes` opened inside it must
    /// already be closed.
    pub fn end_message(&mut self) -> Result<(), EncodeError> {
        match self.pending.last().copied() {
            Some(Region::Message(at)) => {
                self.pending.pop();
                self.patch(at, self.buf.len() - at)
            }
            _ => Err(EncodeError::UnbalancedRegion),
        }
    }

    fn patch(&mut self, at: usize, len: usize) -> Result<(), EncodeError> {
        let len = u32::try_from(len).map_err(|_| EncodeError::TooLong(len))?;
        self.buf[at..at + 4].copy_from_slice(&len.to_be_bytes());
        Ok(())
    }

    /// Freeze the written bytes. Fails if any region is still open.
    pub fn into_bytes(self) -> Result<Bytes, EncodeError> {
        if !self.pending.is_empty() {
            return Err(EncodeError::UnbalancedRegion);
        }
        Ok(self.buf.freeze())
    }
}
