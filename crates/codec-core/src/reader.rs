//! Cursor-based reader over one wire message.
//!
//! Every `pop_*` checks the remaining length first and leaves the cursor
//! untouched on failure. All integers are big-endian.

use bytes::Buf;
use uuid::Uuid;

use crate::error::DecodeError;

/// Borrowed reader. Slices handed out by [`Reader::pop_bytes`] live as long
/// as the underlying message buffer, not as long as the reader.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

/// One framed message: tag byte plus its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    pub tag: u8,
    pub body: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf }
    }

    /// Bytes left to read.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.buf.len() < needed {
            return Err(DecodeError::Overread {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn pop_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn pop_u16(&mut self) -> Result<u16, DecodeError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn pop_u32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn pop_u64(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    pub fn pop_i16(&mut self) -> Result<i16, DecodeError> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn pop_i32(&mut self) -> Result<i32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn pop_i64(&mut self) -> Result<i64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    pub fn pop_f32(&mut self) -> Result<f32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    pub fn pop_f64(&mut self) -> Result<f64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    pub fn pop_uuid(&mut self) -> Result<Uuid, DecodeError> {
        self.ensure(16)?;
        let (head, tail) = self.buf.split_at(16);
        let mut raw = [0u8; 16];
        raw.copy_from_slice(head);
        self.buf = tail;
        Ok(Uuid::from_bytes(raw))
    }

    /// Take the next `n` bytes as a slice of the parent buffer.
    pub fn pop_raw(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Take the next `n` bytes as a nested reader.
    pub fn pop_slice(&mut self, n: usize) -> Result<Reader<'a>, DecodeError> {
        self.pop_raw(n).map(Reader::new)
    }

    /// u32 length prefix followed by that many bytes.
    pub fn pop_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let mut probe = *self;
        let n = probe.pop_u32()? as usize;
        let data = probe.pop_raw(n)?;
        *self = probe;
        Ok(data)
    }

    /// Same framing as [`Reader::pop_bytes`], validated as UTF-8.
    pub fn pop_string(&mut self) -> Result<&'a str, DecodeError> {
        let mut probe = *self;
        let data = probe.pop_bytes()?;
        let s = std::str::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
        *self = probe;
        Ok(s)
    }

    pub fn discard(&mut self, n: usize) -> Result<(), DecodeError> {
        self.ensure(n)?;
        self.buf.advance(n);
        Ok(())
    }

    /// Read a u32 without consuming it.
    pub fn peek_u32(&self) -> Result<u32, DecodeError> {
        let mut probe = *self;
        probe.pop_u32()
    }

    /// Assert the message has been fully consumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        if !self.buf.is_empty() {
            return Err(DecodeError::TrailingBytes {
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Pop one framed message: `tag:u8`, `len:u32` (counting itself and the
    /// body), body.
    pub fn pop_message(&mut self) -> Result<Message<'a>, DecodeError> {
        let mut probe = *self;
        let tag = probe.pop_u8()?;
        let len = probe.pop_u32()? as usize;
        if len < 4 {
            return Err(DecodeError::InvalidLength {
                what: "message length",
                expected: 4,
                found: len,
            });
        }
        let body = probe.pop_raw(len - 4)?;
        *self = probe;
        Ok(Message { tag, body })
    }
}

impl<'a> From<&'a [u8]> for Reader<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Reader::new(buf)
    }
}
