//! Packed asset formats.
//!
//! Sprite sheets are a run of `{tag, payload}` chunks; fonts are a single
//! `fnt1` chunk. Every chunk tag is four ASCII bytes:
//!
//! | Tag    | Payload                                                        |
//! |--------|----------------------------------------------------------------|
//! | `pale` | 32 bytes: 16 RGB565 colours, high byte first                   |
//! | `bp32` | 512 bytes: 32×32 4bpp indices, low nibble is the even pixel    |
//! | `fnt1` | 4 header bytes, then `height × glyph_count` row bitmask bytes  |
//!
//! Records are decoded once at load time into owned storage and are never
//! touched again by the renderer.

mod font;
mod sprite;

pub use font::{Font, FontMetrics, decode_font, encode_font};
pub use sprite::{
    Chunk, PALETTE_BYTES, PALETTE_LEN, Palette, SPRITE_BYTES, SPRITE_SIZE, Sprite, SpriteSheet,
    decode_sprite_sheet, encode_sprite_sheet,
};

use thiserror::Error;

pub const PALETTE_TAG: [u8; 4] = *b"pale";
pub const SPRITE_TAG: [u8; 4] = *b"bp32";
pub const FONT_TAG: [u8; 4] = *b"fnt1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssetError {
    /// A sprite sheet chunk started with a tag that is neither `pale` nor `bp32`.
    #[error("unrecognized chunk tag {0:02x?}")]
    UnknownTag([u8; 4]),
    /// A font stream did not start with `fnt1`.
    #[error("expected font magic `fnt1`, found {0:02x?}")]
    BadMagic([u8; 4]),
    /// The stream ended inside a payload of the given size.
    #[error("stream ended inside a {0}-byte payload")]
    Truncated(usize),
}

/// Byte stream that asset bytes are pulled from.
///
/// `read` may return fewer bytes than asked for; returning 0 means the stream
/// is exhausted.
pub trait AssetSource {
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

impl AssetSource for &[u8] {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        n
    }
}

/// Adapts any [`std::io::Read`] (files, cursors) into an [`AssetSource`].
///
/// I/O errors end the stream.
#[cfg(feature = "std")]
pub struct IoSource<R>(pub R);

#[cfg(feature = "std")]
impl<R: std::io::Read> AssetSource for IoSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        loop {
            match self.0.read(buf) {
                Ok(n) => return n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!(target: "assets", "asset read failed: {e}");
                    return 0;
                }
            }
        }
    }
}

/// Reads until `buf` is full or the source runs dry; returns the byte count.
pub(crate) fn fill<S: AssetSource + ?Sized>(source: &mut S, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..]);
        if n == 0 {
            break;
        }
        filled += n;
    }
    filled
}
