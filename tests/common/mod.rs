//! Synthetic TrueType fonts for integration tests.
//!
//! Fonts are assembled with the public `SfntBuilder`, so every test font
//! has a valid directory and checksums.

#![allow(dead_code)]

use glyphcut::font::cmap::encode_format4;
use glyphcut::font::{SfntBuilder, Tag};

pub const UNITS_PER_EM: u16 = 1000;

/// A one-contour triangle scaled by `size`, optionally followed by
/// `trailing` zero bytes to inflate the record.
pub fn simple_glyph(size: i16, trailing: usize) -> Vec<u8> {
    let mut g = Vec::new();
    for v in [1i16, 0, 0, size, size, 2, 0] {
        g.extend_from_slice(&v.to_be_bytes()); // contours, bbox, endPts, instrLen
    }
    g.extend_from_slice(&[1, 1, 1]);
    for v in [0i16, size, -size / 2, 0, size, -size] {
        g.extend_from_slice(&v.to_be_bytes());
    }
    g.extend(std::iter::repeat(0u8).take(trailing));
    g
}

/// A composite glyph placing each of `parts` with word offsets.
pub fn composite_glyph(parts: &[u16]) -> Vec<u8> {
    let mut g = Vec::new();
    for v in [-1i16, 0, 0, 600, 900] {
        g.extend_from_slice(&v.to_be_bytes());
    }
    for (i, &part) in parts.iter().enumerate() {
        // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | MORE_COMPONENTS
        let mut flags: u16 = 0x0001 | 0x0002;
        if i + 1 < parts.len() {
            flags |= 0x0020;
        }
        g.extend_from_slice(&flags.to_be_bytes());
        g.extend_from_slice(&part.to_be_bytes());
        g.extend_from_slice(&(i as i16 * 50).to_be_bytes());
        g.extend_from_slice(&0i16.to_be_bytes());
    }
    g
}

pub struct TestGlyph {
    pub record: Vec<u8>,
    pub advance: u16,
    pub lsb: i16,
}

pub struct TestFont {
    pub glyphs: Vec<TestGlyph>,
    pub cmap: Vec<(u16, u16)>,
    /// Defaults to one long metric per glyph.
    pub num_h_metrics: Option<u16>,
    pub long_loca: bool,
    pub cmap_override: Option<Vec<u8>>,
    pub with_glyf: bool,
}

impl TestFont {
    /// A font holding only `.notdef`.
    pub fn new() -> Self {
        Self {
            glyphs: vec![TestGlyph {
                record: simple_glyph(500, 0),
                advance: 500,
                lsb: 0,
            }],
            cmap: Vec::new(),
            num_h_metrics: None,
            long_loca: false,
            cmap_override: None,
            with_glyf: true,
        }
    }

    pub fn glyph(mut self, record: Vec<u8>, advance: u16) -> Self {
        let lsb = self.glyphs.len() as i16;
        self.glyphs.push(TestGlyph {
            record,
            advance,
            lsb,
        });
        self
    }

    pub fn map(mut self, ch: char, glyph: u16) -> Self {
        self.cmap.push((ch as u16, glyph));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16;
        let num_h_metrics = self.num_h_metrics.unwrap_or(num_glyphs);

        let mut glyf = Vec::new();
        let mut offsets = Vec::new();
        for g in &self.glyphs {
            offsets.push(glyf.len() as u32);
            glyf.extend_from_slice(&g.record);
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
        }
        offsets.push(glyf.len() as u32);

        let mut loca = Vec::new();
        for &o in &offsets {
            if self.long_loca {
                loca.extend_from_slice(&o.to_be_bytes());
            } else {
                loca.extend_from_slice(&((o / 2) as u16).to_be_bytes());
            }
        }

        let mut hmtx = Vec::new();
        for (i, g) in self.glyphs.iter().enumerate() {
            if (i as u16) < num_h_metrics {
                hmtx.extend_from_slice(&g.advance.to_be_bytes());
            }
            hmtx.extend_from_slice(&g.lsb.to_be_bytes());
        }

        let mut b = SfntBuilder::new(0x0001_0000);
        b.add_table(Tag::HEAD, head_table(self.long_loca))
            .add_table(Tag::HHEA, hhea_table(num_h_metrics))
            .add_table(Tag::MAXP, maxp_table(num_glyphs))
            .add_table(Tag::HMTX, hmtx)
            .add_table(
                Tag::CMAP,
                match &self.cmap_override {
                    Some(cmap) => cmap.clone(),
                    None => encode_format4(&self.cmap).unwrap(),
                },
            )
            .add_table(Tag::POST, post_table())
            .add_table(Tag::NAME, vec![0, 0, 0, 0, 0, 6])
            .add_table(Tag::OS2, vec![0; 78])
            .add_table(Tag::CVT, vec![0, 10, 0, 20, 0, 30])
            .add_table(Tag::FPGM, vec![0xB0, 0x01, 0x2C])
            .add_table(Tag::PREP, vec![0xB8, 0x01, 0xFF, 0x85])
            .add_table(Tag::GASP, vec![0, 1, 0, 1, 0xFF, 0xFF, 0, 0x0F]);
        if self.with_glyf {
            b.add_table(Tag::GLYF, glyf).add_table(Tag::LOCA, loca);
        }
        b.finish()
    }
}

fn head_table(long_loca: bool) -> Vec<u8> {
    let mut head = Vec::new();
    head.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
    head.extend_from_slice(&0x0001_8000u32.to_be_bytes()); // fontRevision 1.5
    head.extend_from_slice(&0u32.to_be_bytes()); // checksumAdjustment
    head.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
    head.extend_from_slice(&0x000Bu16.to_be_bytes()); // flags
    head.extend_from_slice(&UNITS_PER_EM.to_be_bytes());
    head.extend_from_slice(&[0u8; 16]); // created, modified
    for v in [0i16, -200, 1000, 900] {
        head.extend_from_slice(&v.to_be_bytes()); // bbox
    }
    head.extend_from_slice(&0u16.to_be_bytes()); // macStyle
    head.extend_from_slice(&8u16.to_be_bytes()); // lowestRecPPEM
    head.extend_from_slice(&2i16.to_be_bytes()); // fontDirectionHint
    head.extend_from_slice(&(long_loca as i16).to_be_bytes()); // indexToLocFormat
    head.extend_from_slice(&0i16.to_be_bytes()); // glyphDataFormat
    assert_eq!(head.len(), 54);
    head
}

fn hhea_table(num_h_metrics: u16) -> Vec<u8> {
    let mut hhea = Vec::new();
    hhea.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    for v in [800i16, -200, 0] {
        hhea.extend_from_slice(&v.to_be_bytes()); // ascender, descender, lineGap
    }
    hhea.extend_from_slice(&1200u16.to_be_bytes()); // advanceWidthMax
    for v in [0i16, 0, 1000, 1, 0, 0, 0, 0, 0, 0, 0] {
        hhea.extend_from_slice(&v.to_be_bytes());
    }
    hhea.extend_from_slice(&num_h_metrics.to_be_bytes());
    assert_eq!(hhea.len(), 36);
    hhea
}

fn maxp_table(num_glyphs: u16) -> Vec<u8> {
    let mut maxp = vec![0u8; 32];
    maxp[..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    maxp[4..6].copy_from_slice(&num_glyphs.to_be_bytes());
    maxp[6..8].copy_from_slice(&64u16.to_be_bytes()); // maxPoints
    maxp
}

fn post_table() -> Vec<u8> {
    let mut post = vec![0u8; 32];
    post[..4].copy_from_slice(&0x0003_0000u32.to_be_bytes());
    post[4..8].copy_from_slice(&0xFFF4_0000u32.to_be_bytes()); // italicAngle -12
    post[8..10].copy_from_slice(&(-100i16).to_be_bytes());
    post[10..12].copy_from_slice(&50i16.to_be_bytes());
    post[12..16].copy_from_slice(&1u32.to_be_bytes()); // isFixedPitch
    post[16..20].copy_from_slice(&4096u32.to_be_bytes()); // minMemType42
    post
}

/// A (3, 1) cmap whose single segment starts at `start` and resolves
/// through a glyph id array, so consecutive codes need not map to
/// consecutive glyphs. A zero entry leaves its code unmapped.
pub fn glyph_array_cmap(start: u16, glyph_ids: &[u16]) -> Vec<u8> {
    let end = start + glyph_ids.len() as u16 - 1;
    let mut sub = Vec::new();
    // format, length (patched), language, segCountX2, searchRange, entrySelector, rangeShift
    for v in [4u16, 0, 0, 4, 4, 1, 0] {
        sub.extend_from_slice(&v.to_be_bytes());
    }
    // endCode, reservedPad, startCode, idDelta, idRangeOffset
    for v in [end, 0xFFFF, 0, start, 0xFFFF, 0, 1, 4, 0] {
        sub.extend_from_slice(&v.to_be_bytes());
    }
    for &g in glyph_ids {
        sub.extend_from_slice(&g.to_be_bytes());
    }
    let len = sub.len() as u16;
    sub[2..4].copy_from_slice(&len.to_be_bytes());

    let mut cmap = Vec::new();
    for v in [0u16, 1, 3, 1] {
        cmap.extend_from_slice(&v.to_be_bytes());
    }
    cmap.extend_from_slice(&12u32.to_be_bytes());
    cmap.extend_from_slice(&sub);
    cmap
}

// Glyph ids of the sample font.
pub const GID_SPACE: u16 = 1;
pub const GID_A: u16 = 2;
pub const GID_B: u16 = 3;
pub const GID_C: u16 = 4;
pub const GID_ACUTE: u16 = 5;
pub const GID_A_ACUTE: u16 = 6;
pub const GID_RING: u16 = 7;
pub const GID_CAP_A: u16 = 8;
pub const GID_A_RING: u16 = 9;
pub const GID_UNMAPPED: u16 = 10;
pub const GID_A_RING_ACUTE: u16 = 11;
pub const SAMPLE_GLYPH_COUNT: u16 = 12;
pub const SAMPLE_LONG_METRICS: u16 = 10;

/// Twelve glyphs: simple letters, an empty space, composites (one nested
/// two deep), an unmapped glyph, and a two-to-one cmap entry (Å / Å).
/// The last two glyphs only carry left side bearings in `hmtx`.
pub fn sample_font() -> TestFont {
    let mut font = TestFont::new()
        .glyph(Vec::new(), 250) // space
        .glyph(simple_glyph(500, 0), 520) // a
        .glyph(simple_glyph(520, 0), 540) // b
        .glyph(simple_glyph(480, 0), 460) // c
        .glyph(simple_glyph(200, 0), 300) // acute
        .glyph(composite_glyph(&[GID_A, GID_ACUTE]), 520) // á
        .glyph(simple_glyph(220, 0), 300) // ring
        .glyph(simple_glyph(700, 0), 700) // A
        .glyph(composite_glyph(&[GID_CAP_A, GID_RING]), 700) // Å
        .glyph(simple_glyph(640, 0), 900) // unmapped
        .glyph(composite_glyph(&[GID_A_RING, GID_ACUTE]), 900) // Ǻ
        .map(' ', GID_SPACE)
        .map('a', GID_A)
        .map('b', GID_B)
        .map('c', GID_C)
        .map('\u{B4}', GID_ACUTE)
        .map('\u{E1}', GID_A_ACUTE)
        .map('\u{2DA}', GID_RING)
        .map('A', GID_CAP_A)
        .map('\u{C5}', GID_A_RING)
        .map('\u{212B}', GID_A_RING)
        .map('\u{1FA}', GID_A_RING_ACUTE);
    font.num_h_metrics = Some(SAMPLE_LONG_METRICS);
    font
}
