//! # Location and Horizontal Metrics
//!
//! `loca` gives each glyph's byte range in `glyf`; `hmtx` gives each
//! glyph's advance width and left side bearing. Both are sized by fields
//! elsewhere in the font (`maxp.numGlyphs`, `head.indexToLocFormat`,
//! `hhea.numberOfHMetrics`), so the parsers take those as parameters.

use super::bytes::Reader;
use crate::error::{FontError, Result};

/// `head.indexToLocFormat` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaFormat {
    /// u16 entries holding offset / 2.
    Short,
    /// u32 entries holding the offset.
    Long,
}

/// Largest `glyf` length a short `loca` can address.
pub const MAX_SHORT_LOCA_OFFSET: usize = 0x1FFFE;

impl LocaFormat {
    pub fn from_head_field(value: i16) -> Result<Self> {
        match value {
            0 => Ok(LocaFormat::Short),
            1 => Ok(LocaFormat::Long),
            other => Err(FontError::malformed(format!(
                "invalid indexToLocFormat {}",
                other
            ))),
        }
    }

    pub fn head_field(self) -> i16 {
        match self {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        }
    }

    /// The most compact format able to address `glyf_len` bytes.
    pub fn for_glyf_len(glyf_len: usize) -> Self {
        if glyf_len <= MAX_SHORT_LOCA_OFFSET {
            LocaFormat::Short
        } else {
            LocaFormat::Long
        }
    }
}

/// Parse `num_glyphs + 1` loca offsets.
pub fn parse_loca(data: &[u8], format: LocaFormat, num_glyphs: u16) -> Result<Vec<u32>> {
    let count = num_glyphs as usize + 1;
    let mut r = Reader::new(data, "loca");
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = match format {
            LocaFormat::Short => r.read_u16()? as u32 * 2,
            LocaFormat::Long => r.read_u32()?,
        };
        offsets.push(offset);
    }
    Ok(offsets)
}

/// Serialize loca offsets. Short format requires even offsets, which
/// holds because glyph records are padded to 4 bytes.
pub fn build_loca(offsets: &[u32], format: LocaFormat) -> Vec<u8> {
    let mut data = Vec::with_capacity(offsets.len() * 4);
    match format {
        LocaFormat::Short => {
            for &offset in offsets {
                data.extend_from_slice(&((offset / 2) as u16).to_be_bytes());
            }
        }
        LocaFormat::Long => {
            for &offset in offsets {
                data.extend_from_slice(&offset.to_be_bytes());
            }
        }
    }
    data
}

// ─── hmtx ───────────────────────────────────────────────────────

/// One glyph's horizontal metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

/// A parsed `hmtx` table.
///
/// The first `numberOfHMetrics` glyphs carry a full metric; the rest
/// carry only a left side bearing and share the last full advance width.
#[derive(Debug, Clone)]
pub struct HorizontalMetrics {
    long: Vec<HorMetric>,
    trailing_lsbs: Vec<i16>,
}

impl HorizontalMetrics {
    pub fn parse(hmtx: &[u8], num_h_metrics: u16, num_glyphs: u16) -> Result<Self> {
        if num_h_metrics == 0 {
            return Err(FontError::malformed("hhea.numberOfHMetrics is zero"));
        }
        let mut r = Reader::new(hmtx, "hmtx");
        let mut long = Vec::with_capacity(num_h_metrics as usize);
        for _ in 0..num_h_metrics {
            long.push(HorMetric {
                advance_width: r.read_u16()?,
                lsb: r.read_i16()?,
            });
        }

        // Tolerate a short trailing array; missing bearings read as 0.
        let trailing = num_glyphs.saturating_sub(num_h_metrics) as usize;
        let available = (r.remaining() / 2).min(trailing);
        let mut trailing_lsbs = Vec::with_capacity(available);
        for _ in 0..available {
            trailing_lsbs.push(r.read_i16()?);
        }

        Ok(Self {
            long,
            trailing_lsbs,
        })
    }

    /// Metrics for an original glyph id.
    pub fn get(&self, glyph: u16) -> HorMetric {
        let idx = glyph as usize;
        if let Some(&m) = self.long.get(idx) {
            return m;
        }
        let advance_width = self.long.last().map(|m| m.advance_width).unwrap_or(0);
        let lsb = self
            .trailing_lsbs
            .get(idx - self.long.len())
            .copied()
            .unwrap_or(0);
        HorMetric { advance_width, lsb }
    }
}

/// Running totals gathered while writing the subset `hmtx`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HmtxSummary {
    pub num_metrics: u16,
    pub advance_width_max: u16,
}

impl HmtxSummary {
    fn add(mut self, metric: HorMetric) -> Self {
        self.num_metrics += 1;
        self.advance_width_max = self.advance_width_max.max(metric.advance_width);
        self
    }
}

/// Write one full metric per retained glyph, in new-id order.
pub fn rebuild_hmtx(
    metrics: &HorizontalMetrics,
    retained: &[u16],
) -> (Vec<u8>, HmtxSummary) {
    let mut data = Vec::with_capacity(retained.len() * 4);
    let summary = retained.iter().fold(HmtxSummary::default(), |acc, &old| {
        let m = metrics.get(old);
        data.extend_from_slice(&m.advance_width.to_be_bytes());
        data.extend_from_slice(&m.lsb.to_be_bytes());
        acc.add(m)
    });
    (data, summary)
}
