//! # SFNT Assembler
//!
//! Serializes a set of tables into a complete font file: sorted table
//! directory, 4-byte aligned table data, per-table checksums, and the
//! `head.checksumAdjustment` that makes the whole file sum to
//! `0xB1B0AFBA`.

use std::collections::BTreeMap;

use super::bytes::{pad_to_4, padded_len, peek_u32, write_u32};
use super::sfnt::{search_params, table_checksum, Tag, OFFSET_TABLE_LEN, TABLE_RECORD_LEN};

/// Byte offset of `checksumAdjustment` inside `head`.
pub const HEAD_CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;
/// Whole-font checksum target.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Collects tables and writes them out as one SFNT binary.
///
/// Tables are kept in a `BTreeMap`, so output order is ascending by tag
/// and adding a tag twice replaces the earlier table.
#[derive(Debug, Clone)]
pub struct SfntBuilder {
    sfnt_version: u32,
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl SfntBuilder {
    pub fn new(sfnt_version: u32) -> Self {
        Self {
            sfnt_version,
            tables: BTreeMap::new(),
        }
    }

    pub fn add_table(&mut self, tag: Tag, data: Vec<u8>) -> &mut Self {
        self.tables.insert(tag, data);
        self
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn finish(mut self) -> Vec<u8> {
        // The adjustment is computed as if the field were zero.
        if let Some(head) = self.tables.get_mut(&Tag::HEAD) {
            if head.len() >= HEAD_CHECKSUM_ADJUSTMENT_OFFSET + 4 {
                write_u32(head, HEAD_CHECKSUM_ADJUSTMENT_OFFSET, 0);
            }
        }

        let num_tables = self.tables.len() as u16;
        let (search_range, entry_selector, range_shift) =
            search_params(num_tables, TABLE_RECORD_LEN as u16);

        let dir_len = OFFSET_TABLE_LEN + self.tables.len() * TABLE_RECORD_LEN;
        let data_len: usize = self
            .tables
            .values()
            .map(|t| padded_len(t.len()))
            .sum();
        let mut output: Vec<u8> = Vec::with_capacity(dir_len + data_len);

        output.extend_from_slice(&self.sfnt_version.to_be_bytes());
        output.extend_from_slice(&num_tables.to_be_bytes());
        output.extend_from_slice(&search_range.to_be_bytes());
        output.extend_from_slice(&entry_selector.to_be_bytes());
        output.extend_from_slice(&range_shift.to_be_bytes());

        let mut offset = dir_len;
        let mut head_offset = None;
        for (tag, data) in &self.tables {
            if *tag == Tag::HEAD {
                head_offset = Some(offset);
            }
            output.extend_from_slice(&tag.0);
            output.extend_from_slice(&table_checksum(data).to_be_bytes());
            output.extend_from_slice(&(offset as u32).to_be_bytes());
            output.extend_from_slice(&(data.len() as u32).to_be_bytes());
            offset += padded_len(data.len());
        }

        for data in self.tables.values() {
            output.extend_from_slice(data);
            pad_to_4(&mut output);
        }

        if let Some(head_offset) = head_offset {
            let field = head_offset + HEAD_CHECKSUM_ADJUSTMENT_OFFSET;
            if peek_u32(&output, field).is_some() {
                let adjustment = CHECKSUM_MAGIC.wrapping_sub(table_checksum(&output));
                write_u32(&mut output, field, adjustment);
            }
        }

        output
    }
}
