use alloc::vec::Vec;
use bit_field::BitField;

use super::{AssetError, AssetSource, FONT_TAG, fill};

/// Fixed-cell bitmap font.
///
/// Each glyph is `char_height` row bytes; bit 0 of a row is its leftmost
/// pixel. Glyphs are stored back to back from `first_code` to `last_code`.
/// Cell size and pen advance of a [`Font`], each 0..=15 pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontMetrics {
    pub char_width: u8,
    pub char_height: u8,
    pub advance_x: u8,
    /// Line height used by `'\n'`.
    pub advance_y: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub char_width: u8,
    pub char_height: u8,
    pub advance_x: u8,
    pub advance_y: u8,
    pub first_code: u8,
    pub last_code: u8,
    glyphs: Vec<u8>,
}

impl Font {
    /// Metrics are truncated to the 4 bits the format stores.
    pub fn new(metrics: FontMetrics, first_code: u8, last_code: u8, glyphs: Vec<u8>) -> Self {
        Self {
            char_width: metrics.char_width & 0x0F,
            char_height: metrics.char_height & 0x0F,
            advance_x: metrics.advance_x & 0x0F,
            advance_y: metrics.advance_y & 0x0F,
            first_code,
            last_code,
            glyphs,
        }
    }

    pub fn metrics(&self) -> FontMetrics {
        FontMetrics {
            char_width: self.char_width,
            char_height: self.char_height,
            advance_x: self.advance_x,
            advance_y: self.advance_y,
        }
    }

    pub fn glyph_count(&self) -> usize {
        glyph_count(self.first_code, self.last_code)
    }

    /// Row bitmasks for `code`, or `None` if the font has no such glyph.
    pub fn glyph(&self, code: u8) -> Option<&[u8]> {
        if code < self.first_code || code > self.last_code {
            return None;
        }
        let height = self.char_height as usize;
        let start = (code - self.first_code) as usize * height;
        self.glyphs.get(start..start + height)
    }

    pub fn glyph_bytes(&self) -> &[u8] {
        &self.glyphs
    }
}

fn glyph_count(first: u8, last: u8) -> usize {
    if last < first {
        0
    } else {
        (last - first) as usize + 1
    }
}

/// Decodes a single `fnt1` chunk.
pub fn decode_font<S: AssetSource + ?Sized>(source: &mut S) -> Result<Font, AssetError> {
    let mut tag = [0u8; 4];
    let n = fill(source, &mut tag);
    if tag != FONT_TAG {
        return Err(if n < tag.len() {
            AssetError::Truncated(tag.len())
        } else {
            AssetError::BadMagic(tag)
        });
    }

    let mut header = [0u8; 4];
    if fill(source, &mut header) < header.len() {
        return Err(AssetError::Truncated(header.len()));
    }
    let [cell, advance, first_code, last_code] = header;
    let char_height = cell.get_bits(4..8);

    let len = char_height as usize * glyph_count(first_code, last_code);
    let mut glyphs = alloc::vec![0u8; len];
    if fill(source, &mut glyphs) < len {
        return Err(AssetError::Truncated(len));
    }

    Ok(Font {
        char_width: cell.get_bits(0..4),
        char_height,
        advance_x: advance.get_bits(0..4),
        advance_y: advance.get_bits(4..8),
        first_code,
        last_code,
        glyphs,
    })
}

pub fn encode_font(font: &Font) -> Vec<u8> {
    let mut cell = 0u8;
    cell.set_bits(0..4, font.char_width & 0x0F);
    cell.set_bits(4..8, font.char_height & 0x0F);
    let mut advance = 0u8;
    advance.set_bits(0..4, font.advance_x & 0x0F);
    advance.set_bits(4..8, font.advance_y & 0x0F);

    let mut out = Vec::with_capacity(8 + font.glyphs.len());
    out.extend_from_slice(&FONT_TAG);
    out.extend_from_slice(&[cell, advance, font.first_code, font.last_code]);
    out.extend_from_slice(&font.glyphs);
    out
}
