//! # WOFF 1.0 Container
//!
//! Wraps an SFNT in the Web Open Font Format: a 44-byte header, a 20-byte
//! directory entry per table, then each table's data, zlib-compressed
//! when that makes it smaller.
//!
//! ```text
//! header      signature 'wOFF', flavor, length, numTables u16, reserved u16,
//!             totalSfntSize, majorVersion u16, minorVersion u16,
//!             metaOffset, metaLength, metaOrigLength, privOffset, privLength
//! directory   tag, offset, compLength, origLength, origChecksum
//! ```

use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};

use super::bytes::{pad_to_4, padded_len, write_u32, Reader};
use super::sfnt::{table_checksum, FontDirectory, Tag, OFFSET_TABLE_LEN, TABLE_RECORD_LEN};
use super::writer::SfntBuilder;
use crate::error::{FontError, Result};

pub const WOFF_SIGNATURE: u32 = 0x774F_4646;
const WOFF_HEADER_LEN: usize = 44;
const WOFF_DIR_ENTRY_LEN: usize = 20;
const HEAD_FONT_REVISION_OFFSET: usize = 4;
const MAX_COMPRESSION_LEVEL: u8 = 10;
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

struct WoffTable<'a> {
    tag: Tag,
    checksum: u32,
    orig: &'a [u8],
    /// Compressed bytes, present only when strictly smaller than `orig`.
    compressed: Option<Vec<u8>>,
}

impl WoffTable<'_> {
    fn stored(&self) -> &[u8] {
        self.compressed.as_deref().unwrap_or(self.orig)
    }
}

/// Encode an SFNT as WOFF with the default compression level.
pub fn encode(sfnt: &[u8]) -> Result<Vec<u8>> {
    encode_with_level(sfnt, DEFAULT_COMPRESSION_LEVEL)
}

/// Encode an SFNT as WOFF.
///
/// Every table except `head` must carry a correct checksum; a mismatch
/// means the input is already corrupt and fails with `ChecksumMismatch`.
pub fn encode_with_level(sfnt: &[u8], level: u8) -> Result<Vec<u8>> {
    let level = level.min(MAX_COMPRESSION_LEVEL);
    let dir = FontDirectory::parse(sfnt)?;

    let mut records = dir.records.clone();
    records.sort_by_key(|r| r.tag);

    let mut tables: Vec<WoffTable<'_>> = Vec::with_capacity(records.len());
    for record in &records {
        let orig = dir.table(record.tag).unwrap_or_default();
        if record.tag != Tag::HEAD {
            let computed = table_checksum(orig);
            if computed != record.checksum {
                return Err(FontError::ChecksumMismatch {
                    tag: record.tag,
                    recorded: record.checksum,
                    computed,
                });
            }
        }
        let compressed = compress_to_vec_zlib(orig, level);
        tables.push(WoffTable {
            tag: record.tag,
            checksum: record.checksum,
            orig,
            compressed: (compressed.len() < orig.len()).then_some(compressed),
        });
    }

    let (major, minor) = match dir.table(Tag::HEAD) {
        Some(head) => {
            let mut r = Reader::at(head, HEAD_FONT_REVISION_OFFSET, "head")?;
            (r.read_u16()?, r.read_u16()?)
        }
        None => (0, 0),
    };

    let total_sfnt_size = OFFSET_TABLE_LEN
        + tables.len() * TABLE_RECORD_LEN
        + tables.iter().map(|t| padded_len(t.orig.len())).sum::<usize>();

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&dir.sfnt_version.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // length, patched below
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]); // no metadata or private block

    let mut offset = WOFF_HEADER_LEN + tables.len() * WOFF_DIR_ENTRY_LEN;
    for table in &tables {
        let stored = table.stored();
        out.extend_from_slice(&table.tag.0);
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        out.extend_from_slice(&(table.orig.len() as u32).to_be_bytes());
        out.extend_from_slice(&table.checksum.to_be_bytes());
        offset += padded_len(stored.len());
    }

    for table in &tables {
        out.extend_from_slice(table.stored());
        pad_to_4(&mut out);
    }

    let len = out.len() as u32;
    write_u32(&mut out, 8, len);

    tracing::debug!(
        tables = tables.len(),
        compressed = tables.iter().filter(|t| t.compressed.is_some()).count(),
        sfnt_bytes = sfnt.len(),
        woff_bytes = out.len(),
        "encoded WOFF"
    );

    Ok(out)
}

/// Decode a WOFF 1.0 file back into an SFNT.
pub fn decode(woff: &[u8]) -> Result<Vec<u8>> {
    let mut r = Reader::new(woff, "WOFF header");
    let signature = r.read_u32()?;
    if signature != WOFF_SIGNATURE {
        return Err(FontError::malformed(format!(
            "not a WOFF file (signature {:#010x})",
            signature
        )));
    }
    let flavor = r.read_u32()?;
    let length = r.read_u32()? as usize;
    if length != woff.len() {
        return Err(FontError::malformed(format!(
            "WOFF header declares {} bytes but file is {} bytes",
            length,
            woff.len()
        )));
    }
    let num_tables = r.read_u16()?;
    r.seek(WOFF_HEADER_LEN)?;

    let mut builder = SfntBuilder::new(flavor);
    for _ in 0..num_tables {
        let tag = Tag(r.read_tag()?);
        let offset = r.read_u32()? as usize;
        let comp_length = r.read_u32()? as usize;
        let orig_length = r.read_u32()? as usize;
        let _orig_checksum = r.read_u32()?;

        let stored = woff
            .get(offset..offset.saturating_add(comp_length))
            .ok_or_else(|| {
                FontError::malformed(format!("WOFF '{}' table block is out of bounds", tag))
            })?;

        let data = if comp_length < orig_length {
            // One spare byte so a stream ending exactly at the limit still
            // reports Done; anything longer fails the length check below.
            let limit = orig_length.saturating_add(1);
            decompress_to_vec_zlib_with_limit(stored, limit).map_err(|e| match e.status {
                TINFLStatus::HasMoreOutput => FontError::malformed(format!(
                    "WOFF '{}' table inflates past its declared {} bytes",
                    tag, orig_length
                )),
                status => FontError::malformed(format!(
                    "WOFF '{}' table failed to inflate: {:?}",
                    tag, status
                )),
            })?
        } else if comp_length == orig_length {
            stored.to_vec()
        } else {
            return Err(FontError::malformed(format!(
                "WOFF '{}' table is stored larger than its original length",
                tag
            )));
        };
        if data.len() != orig_length {
            return Err(FontError::malformed(format!(
                "WOFF '{}' table inflated to {} bytes, expected {}",
                tag,
                data.len(),
                orig_length
            )));
        }
        builder.add_table(tag, data);
    }

    Ok(builder.finish())
}
