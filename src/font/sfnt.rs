//! # SFNT Table Directory
//!
//! The offset table and table directory at the start of every
//! TrueType/OpenType file, plus the checksum arithmetic shared by the
//! assembler and the WOFF encoder.
//!
//! ```text
//! offset table (12 bytes)   sfntVersion u32, numTables u16,
//!                           searchRange u16, entrySelector u16, rangeShift u16
//! table records (16 each)   tag [u8;4], checksum u32, offset u32, length u32
//! ```

use std::fmt;

use super::bytes::Reader;
use crate::error::{FontError, Result};

/// TrueType outlines.
pub const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
/// Apple's TrueType marker (`true`).
pub const SFNT_VERSION_APPLE: u32 = 0x7472_7565;
/// CFF outlines (`OTTO`).
pub const SFNT_VERSION_CFF: u32 = 0x4F54_544F;

pub const OFFSET_TABLE_LEN: usize = 12;
pub const TABLE_RECORD_LEN: usize = 16;

/// A 4-byte table identifier such as `glyf` or `cvt `.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const CVT: Tag = Tag(*b"cvt ");
    pub const FPGM: Tag = Tag(*b"fpgm");
    pub const GASP: Tag = Tag(*b"gasp");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const HEAD: Tag = Tag(*b"head");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");
    pub const NAME: Tag = Tag(*b"name");
    pub const OS2: Tag = Tag(*b"OS/2");
    pub const POST: Tag = Tag(*b"post");
    pub const PREP: Tag = Tag(*b"prep");

    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// One entry of the table directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    /// Unpadded table length.
    pub length: u32,
}

impl TableRecord {
    fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

/// A parsed table directory borrowing the font buffer it came from.
#[derive(Debug, Clone)]
pub struct FontDirectory<'a> {
    data: &'a [u8],
    pub sfnt_version: u32,
    /// Records in file order.
    pub records: Vec<TableRecord>,
}

impl<'a> FontDirectory<'a> {
    /// Parse the offset table and table directory.
    ///
    /// Fails with `MalformedFont` if the buffer is shorter than the declared
    /// directory, the version is not a known SFNT flavor, or any table's
    /// byte range falls outside the buffer.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut r = Reader::new(data, "sfnt header");
        let sfnt_version = r.read_u32()?;
        match sfnt_version {
            SFNT_VERSION_TRUETYPE | SFNT_VERSION_APPLE | SFNT_VERSION_CFF => {}
            other => {
                return Err(FontError::malformed(format!(
                    "unrecognised sfnt version {:#010x}",
                    other
                )))
            }
        }
        let num_tables = r.read_u16()? as usize;
        r.skip(6)?; // searchRange, entrySelector, rangeShift

        let dir_end = OFFSET_TABLE_LEN + num_tables * TABLE_RECORD_LEN;
        if dir_end > data.len() {
            return Err(FontError::malformed(format!(
                "table directory declares {} tables ({} bytes) but font is {} bytes",
                num_tables,
                dir_end,
                data.len()
            )));
        }

        let mut records = Vec::with_capacity(num_tables);
        for _ in 0..num_tables {
            let record = TableRecord {
                tag: Tag(r.read_tag()?),
                checksum: r.read_u32()?,
                offset: r.read_u32()?,
                length: r.read_u32()?,
            };
            let end = record.offset as u64 + record.length as u64;
            if end > data.len() as u64 {
                return Err(FontError::malformed(format!(
                    "'{}' table spans {}..{} but font is {} bytes",
                    record.tag,
                    record.offset,
                    end,
                    data.len()
                )));
            }
            records.push(record);
        }

        Ok(Self {
            data,
            sfnt_version,
            records,
        })
    }

    pub fn record(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }

    /// The unpadded bytes of a table, if present.
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        let data: &'a [u8] = self.data;
        self.record(tag).map(|r| &data[r.range()])
    }

    /// Like [`table`](Self::table) but a missing table is `MalformedFont`.
    pub fn require(&self, tag: Tag) -> Result<&'a [u8]> {
        self.table(tag)
            .ok_or_else(|| FontError::malformed(format!("missing required '{}' table", tag)))
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.record(tag).is_some()
    }

    pub fn font_data(&self) -> &'a [u8] {
        self.data
    }
}

// ─── Checksums ──────────────────────────────────────────────────

/// Sum of big-endian u32 words, treating the tail as zero-padded to 4 bytes.
pub fn table_checksum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(4);
    let mut sum = chunks.by_ref().fold(0u32, |acc, w| {
        acc.wrapping_add(u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
    });
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut last = [0u8; 4];
        last[..tail.len()].copy_from_slice(tail);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}

/// `(searchRange, entrySelector, rangeShift)` for `count` items of
/// `unit` bytes each: searchRange is the largest power of two not above
/// `count`, times `unit`.
pub fn search_params(count: u16, unit: u16) -> (u16, u16, u16) {
    if count == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector).wrapping_mul(unit);
    let range_shift = count.wrapping_mul(unit).wrapping_sub(search_range);
    (search_range, entry_selector, range_shift)
}
