use alloc::vec::Vec;
use bit_field::BitField;
use log::warn;

use super::{AssetError, AssetSource, PALETTE_TAG, SPRITE_TAG, fill};

/// Sprites are always 32×32.
pub const SPRITE_SIZE: usize = 32;
pub const SPRITE_BYTES: usize = SPRITE_SIZE * SPRITE_SIZE / 2;
pub const PALETTE_LEN: usize = 16;
pub const PALETTE_BYTES: usize = PALETTE_LEN * 2;

/// Sixteen RGB565 colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [u16; PALETTE_LEN],
}

impl Palette {
    pub const fn new(colors: [u16; PALETTE_LEN]) -> Self {
        Self { colors }
    }

    pub fn from_bytes(bytes: &[u8; PALETTE_BYTES]) -> Self {
        let mut colors = [0u16; PALETTE_LEN];
        for (color, pair) in colors.iter_mut().zip(bytes.chunks_exact(2)) {
            *color = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Self { colors }
    }

    pub fn to_bytes(&self) -> [u8; PALETTE_BYTES] {
        let mut bytes = [0u8; PALETTE_BYTES];
        for (pair, color) in bytes.chunks_exact_mut(2).zip(self.colors) {
            pair.copy_from_slice(&color.to_be_bytes());
        }
        bytes
    }

    /// Colour for a 4-bit index; the high nibble is ignored.
    #[inline(always)]
    pub fn color(&self, index: u8) -> u16 {
        self.colors[(index & 0x0F) as usize]
    }

    pub fn colors(&self) -> &[u16; PALETTE_LEN] {
        &self.colors
    }
}

/// 32×32 grid of 4-bit palette indices, two pixels per byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pixels: [u8; SPRITE_BYTES],
}

impl Sprite {
    pub const fn from_bytes(pixels: [u8; SPRITE_BYTES]) -> Self {
        Self { pixels }
    }

    /// Builds a sprite by asking `f(x, y)` for every pixel's index.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut sprite = Self { pixels: [0; SPRITE_BYTES] };
        for y in 0..SPRITE_SIZE {
            for x in 0..SPRITE_SIZE {
                sprite.set_index(x, y, f(x, y));
            }
        }
        sprite
    }

    #[inline(always)]
    pub fn index_at(&self, x: usize, y: usize) -> u8 {
        let byte = self.pixels[(y * SPRITE_SIZE + x) / 2];
        if x & 1 == 0 {
            byte.get_bits(0..4)
        } else {
            byte.get_bits(4..8)
        }
    }

    pub fn set_index(&mut self, x: usize, y: usize, index: u8) {
        let byte = &mut self.pixels[(y * SPRITE_SIZE + x) / 2];
        let nibble = if x & 1 == 0 { 0..4 } else { 4..8 };
        byte.set_bits(nibble, index & 0x0F);
    }

    pub fn as_bytes(&self) -> &[u8; SPRITE_BYTES] {
        &self.pixels
    }
}

/// Everything decoded from one sprite sheet stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    /// Palettes in the order they appeared.
    pub palettes: Vec<Palette>,
    /// Sprites in the order they appeared.
    pub sprites: Vec<Sprite>,
    /// Why decoding stopped early, if it did. `None` means a clean end of stream.
    pub error: Option<AssetError>,
}

/// One chunk of a sprite sheet, for [`encode_sprite_sheet`].
#[derive(Debug, Clone, Copy)]
pub enum Chunk<'a> {
    Palette(&'a Palette),
    Sprite(&'a Sprite),
}

/// Decodes `pale`/`bp32` chunks until the stream ends.
///
/// An unknown tag or a truncated payload stops decoding; the records read
/// before it are kept and the cause lands in [`SpriteSheet::error`].
pub fn decode_sprite_sheet<S: AssetSource + ?Sized>(source: &mut S) -> SpriteSheet {
    let mut sheet = SpriteSheet::default();

    loop {
        let mut tag = [0u8; 4];
        if fill(source, &mut tag) < tag.len() {
            break;
        }

        let result = match tag {
            PALETTE_TAG => {
                let mut payload = [0u8; PALETTE_BYTES];
                read_payload(source, &mut payload)
                    .map(|()| sheet.palettes.push(Palette::from_bytes(&payload)))
            }
            SPRITE_TAG => {
                let mut payload = [0u8; SPRITE_BYTES];
                read_payload(source, &mut payload)
                    .map(|()| sheet.sprites.push(Sprite::from_bytes(payload)))
            }
            other => Err(AssetError::UnknownTag(other)),
        };

        if let Err(e) = result {
            warn!(
                target: "assets",
                "sprite sheet decode stopped after {} palettes and {} sprites: {e}",
                sheet.palettes.len(),
                sheet.sprites.len()
            );
            sheet.error = Some(e);
            break;
        }
    }

    sheet
}

fn read_payload<S: AssetSource + ?Sized>(source: &mut S, payload: &mut [u8]) -> Result<(), AssetError> {
    if fill(source, payload) < payload.len() {
        return Err(AssetError::Truncated(payload.len()));
    }
    Ok(())
}

pub fn encode_sprite_sheet(chunks: &[Chunk<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in chunks {
        match chunk {
            Chunk::Palette(palette) => {
                out.extend_from_slice(&PALETTE_TAG);
                out.extend_from_slice(&palette.to_bytes());
            }
            Chunk::Sprite(sprite) => {
                out.extend_from_slice(&SPRITE_TAG);
                out.extend_from_slice(sprite.as_bytes());
            }
        }
    }
    out
}
