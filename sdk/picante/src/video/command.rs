use core::ops::Range;

use heapless::Vec;

use crate::assets::{Font, Palette, SPRITE_SIZE, Sprite};

use super::FontId;

/// Longest string a single text command can carry, in bytes.
pub const MAX_TEXT_LEN: usize = 64;

/// Transparency value meaning "every index is opaque".
pub const NO_TRANSPARENCY: u8 = 0xFF;

/// Maps a raw transparency index onto an optional palette index.
/// Anything outside `0..=15` turns transparency off.
#[inline(always)]
pub fn transparency(index: u8) -> Option<u8> {
    (index < 16).then_some(index)
}

/// A queued draw operation. Replayed once per stripe, in queue order.
#[derive(Debug, Clone)]
pub enum DrawCommand<'a> {
    Clear(u16),
    Blit {
        sprite: &'a Sprite,
        x: i16,
        y: i16,
        palette: &'a Palette,
        transparent: Option<u8>,
    },
    Text {
        text: Vec<u8, MAX_TEXT_LEN>,
        x: i16,
        y: i16,
        color: u16,
        font: FontId,
    },
}

impl DrawCommand<'_> {
    /// Screen rows the command can touch, or `None` if it covers every row.
    pub fn rows(&self, fonts: &[Font]) -> Option<Range<i32>> {
        match self {
            DrawCommand::Clear(_) => None,
            DrawCommand::Blit { y, .. } => {
                let top = *y as i32;
                Some(top..top + SPRITE_SIZE as i32)
            }
            DrawCommand::Text { text, y, font, .. } => {
                let top = *y as i32;
                let Some(font) = fonts.get(font.index()) else {
                    return Some(top..top);
                };
                Some(top..top + text_height(text, font))
            }
        }
    }
}

/// Height in pixels of `text` set in `font`, counting `'\n'` line breaks.
pub(crate) fn text_height(text: &[u8], font: &Font) -> i32 {
    let breaks = text.iter().filter(|&&c| c == b'\n').count() as i32;
    breaks * font.advance_y as i32 + font.char_height as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FontMetrics;

    #[test]
    fn transparency_clamps() {
        assert_eq!(transparency(0), Some(0));
        assert_eq!(transparency(15), Some(15));
        assert_eq!(transparency(16), None);
        assert_eq!(transparency(NO_TRANSPARENCY), None);
    }

    #[test]
    fn text_rows_follow_line_breaks() {
        let font = Font::new(
            FontMetrics { char_width: 4, char_height: 6, advance_x: 4, advance_y: 8 },
            b'a',
            b'z',
            alloc::vec![0; 26 * 6],
        );
        let cmd = DrawCommand::Text {
            text: Vec::from_slice(b"ab\ncd").unwrap(),
            x: 0,
            y: 10,
            color: 0,
            font: FontId::from_index(0),
        };
        assert_eq!(cmd.rows(&[font]), Some(10..24));
        assert_eq!(DrawCommand::Clear(0).rows(&[]), None);
    }
}
