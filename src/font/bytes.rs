//! Big-endian byte access for SFNT tables.
//!
//! [`Reader`] is a bounds-checked cursor used by every parser. The free
//! `write_*` functions patch fields of already-serialized buffers in place
//! (component glyph ids, `checksumAdjustment`).

use crate::error::{FontError, Result};

/// A cursor over a byte slice with fixed-width big-endian reads.
///
/// Every read past the end fails with [`FontError::MalformedFont`] naming
/// `context`, so callers never index raw slices themselves.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], context: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            context,
        }
    }

    /// A reader positioned at `offset`. Fails if `offset` is past the end.
    pub fn at(data: &'a [u8], offset: usize, context: &'static str) -> Result<Self> {
        let mut r = Self::new(data, context);
        r.seek(offset)?;
        Ok(r)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(self.eof(offset));
        }
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        let target = self
            .pos
            .checked_add(count)
            .ok_or_else(|| self.eof(usize::MAX))?;
        self.seek(target)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.eof(self.pos.saturating_add(count)))?;
        let data: &'a [u8] = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let b = self.read_bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn eof(&self, wanted: usize) -> FontError {
        FontError::malformed(format!(
            "{}: read past end of data (offset {} of {} bytes)",
            self.context,
            wanted,
            self.data.len()
        ))
    }
}

// ─── In-place Patching ──────────────────────────────────────────

/// Read a u16 at `offset` without a cursor. Returns `None` when out of range.
pub fn peek_u16(data: &[u8], offset: usize) -> Option<u16> {
    let b = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

pub fn peek_u32(data: &[u8], offset: usize) -> Option<u32> {
    let b = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Overwrite a u16 field. The offset must already be known to be in range.
pub fn write_u16(data: &mut [u8], offset: usize, val: u16) {
    data[offset..offset + 2].copy_from_slice(&val.to_be_bytes());
}

pub fn write_u32(data: &mut [u8], offset: usize, val: u32) {
    data[offset..offset + 4].copy_from_slice(&val.to_be_bytes());
}

/// Append zero bytes until `buf.len()` is a multiple of 4.
pub fn pad_to_4(buf: &mut Vec<u8>) {
    let padded = padded_len(buf.len());
    buf.resize(padded, 0);
}

pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}
