//! # Glyph Outlines and Composite Dependencies
//!
//! Glyph records live in `glyf` at the byte ranges given by `loca`. A
//! record whose numberOfContours is negative is a composite: a chain of
//! component references to other glyphs. Subsetting has to keep every
//! glyph reachable through those chains and rewrite the references to the
//! renumbered ids.
//!
//! Composite record layout:
//!
//! ```text
//! numberOfContours i16 (< 0), xMin, yMin, xMax, yMax   (10 bytes)
//! repeat:
//!   flags u16, glyphIndex u16,
//!   arg1/arg2: 2 × i16 if ARG_1_AND_2_ARE_WORDS else 2 × i8,
//!   transform: F2Dot14 × {1 | 2 | 4} or nothing,
//! until MORE_COMPONENTS is clear
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::bytes::{pad_to_4, write_u16, Reader};
use crate::error::{FontError, Result};

const GLYPH_HEADER_LEN: usize = 10;

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// `glyf` together with parsed `loca` offsets.
#[derive(Debug, Clone)]
pub struct GlyphTable<'a> {
    glyf: &'a [u8],
    loca: Vec<u32>,
}

impl<'a> GlyphTable<'a> {
    /// `loca` must hold `numGlyphs + 1` offsets.
    pub fn new(glyf: &'a [u8], loca: Vec<u32>) -> Result<Self> {
        if loca.is_empty() {
            return Err(FontError::malformed("loca table is empty"));
        }
        for (i, pair) in loca.windows(2).enumerate() {
            if pair[0] > pair[1] {
                return Err(FontError::malformed(format!(
                    "loca offsets decrease at glyph {} ({} > {})",
                    i, pair[0], pair[1]
                )));
            }
        }
        if let Some(&last) = loca.last() {
            if last as usize > glyf.len() {
                return Err(FontError::malformed(format!(
                    "loca ends at {} but glyf is {} bytes",
                    last,
                    glyf.len()
                )));
            }
        }
        Ok(Self { glyf, loca })
    }

    pub fn num_glyphs(&self) -> u16 {
        (self.loca.len() - 1) as u16
    }

    /// Raw outline bytes of one glyph. Empty for glyphs with no outline.
    pub fn record(&self, glyph: u16) -> Result<&'a [u8]> {
        let idx = glyph as usize;
        if idx + 1 >= self.loca.len() {
            return Err(FontError::malformed(format!(
                "glyph {} is beyond the glyph count {}",
                glyph,
                self.num_glyphs()
            )));
        }
        let glyf: &'a [u8] = self.glyf;
        Ok(&glyf[self.loca[idx] as usize..self.loca[idx + 1] as usize])
    }
}

/// One component of a composite glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRef {
    /// Byte offset of the glyphIndex field within the record.
    pub offset: usize,
    pub glyph: u16,
}

pub fn is_composite(record: &[u8]) -> bool {
    record.len() >= 2 && i16::from_be_bytes([record[0], record[1]]) < 0
}

/// Walk the component chain of a glyph record. Simple and empty glyphs
/// have no components.
pub fn components(record: &[u8]) -> Result<Vec<ComponentRef>> {
    if !is_composite(record) {
        return Ok(Vec::new());
    }
    let mut r = Reader::at(record, GLYPH_HEADER_LEN, "composite glyph")?;
    let mut refs = Vec::new();

    loop {
        let flags = r.read_u16()?;
        let offset = r.position();
        let glyph = r.read_u16()?;
        refs.push(ComponentRef { offset, glyph });

        let arg_len = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        let transform_len = if flags & WE_HAVE_A_SCALE != 0 {
            2
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            4
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            8
        } else {
            0
        };
        r.skip(arg_len + transform_len)?;

        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }

    Ok(refs)
}

// ─── Dependency Resolution ──────────────────────────────────────

/// Old glyph id → new dense glyph id for one subsetting run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphRemap {
    map: BTreeMap<u16, u16>,
    /// Retained old ids in ascending order; position is the new id.
    old_ids: Vec<u16>,
}

impl GlyphRemap {
    /// Number retained ids densely in ascending order.
    pub fn from_retained(retained: &BTreeSet<u16>) -> Self {
        let old_ids: Vec<u16> = retained.iter().copied().collect();
        let map = old_ids
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as u16))
            .collect();
        Self { map, old_ids }
    }

    pub fn get(&self, old: u16) -> Option<u16> {
        self.map.get(&old).copied()
    }

    /// Retained original ids, indexed by new id.
    pub fn old_ids(&self) -> &[u16] {
        &self.old_ids
    }

    pub fn len(&self) -> usize {
        self.old_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.old_ids.is_empty()
    }

    /// `(old, new)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.map.iter().map(|(&o, &n)| (o, n))
    }
}

/// Close `seeds` (plus `.notdef`) over composite component references.
///
/// Breadth-first over an explicit queue: the retained set doubles as the
/// visited set, so cyclic references terminate.
pub fn resolve_dependencies(
    glyphs: &GlyphTable<'_>,
    seeds: impl IntoIterator<Item = u16>,
) -> Result<GlyphRemap> {
    let num_glyphs = glyphs.num_glyphs();
    let mut retained: BTreeSet<u16> = BTreeSet::new();
    let mut queue: VecDeque<u16> = VecDeque::new();

    for gid in std::iter::once(0).chain(seeds) {
        if retained.insert(gid) {
            queue.push_back(gid);
        }
    }

    while let Some(gid) = queue.pop_front() {
        let record = glyphs.record(gid)?;
        for component in components(record)? {
            if component.glyph >= num_glyphs {
                return Err(FontError::InvalidGlyphReference {
                    glyph: gid,
                    component: component.glyph,
                    num_glyphs,
                });
            }
            if retained.insert(component.glyph) {
                queue.push_back(component.glyph);
            }
        }
    }

    Ok(GlyphRemap::from_retained(&retained))
}

// ─── glyf / loca Rebuild ────────────────────────────────────────

/// Copy retained records in new-id order, each padded to 4 bytes, with
/// composite component ids rewritten. Returns the new `glyf` and the
/// `numGlyphs + 1` offsets for `loca`.
pub fn rebuild_glyf(glyphs: &GlyphTable<'_>, remap: &GlyphRemap) -> Result<(Vec<u8>, Vec<u32>)> {
    let mut glyf: Vec<u8> = Vec::new();
    let mut offsets: Vec<u32> = Vec::with_capacity(remap.len() + 1);

    for &old in remap.old_ids() {
        offsets.push(glyf.len() as u32);
        let record = glyphs.record(old)?;
        if record.is_empty() {
            continue;
        }

        let start = glyf.len();
        glyf.extend_from_slice(record);
        for component in components(record)? {
            let new = remap.get(component.glyph).ok_or(FontError::InvalidGlyphReference {
                glyph: old,
                component: component.glyph,
                num_glyphs: glyphs.num_glyphs(),
            })?;
            write_u16(&mut glyf, start + component.offset, new);
        }
        pad_to_4(&mut glyf);
    }
    offsets.push(glyf.len() as u32);

    Ok((glyf, offsets))
}
