//! # Video
//!
//! The panel is 320×240 RGB565 but there is only room for one 16-line band of
//! it in RAM. Drawing is therefore deferred: calls such as [`Rasterizer::clear`],
//! [`Rasterizer::blit`] and [`Rasterizer::draw_text`] only record a
//! [`DrawCommand`]. [`Rasterizer::draw`] then replays the whole queue once for
//! each of the 15 bands, top to bottom, and streams every band to the panel.
//!
//! ```ignore
//! video.clear(BLACK)?;
//! video.blit(&sheet.sprites[0], player.x, player.y, &sheet.palettes[0], 0)?;
//! video.draw_text("SCORE", 4, 4, WHITE)?;
//! video.draw()?; // queue is empty again afterwards
//! ```
//!
//! Commands are painted in the order they were queued, so a `clear` queued
//! after a blit wipes it out.
//!
//! ## Cost
//!
//! Replay is linear in `commands × 15`. A sprite only pays for the bands it
//! touches; the rest is a bounds check.

mod command;
mod stripe;

pub use command::{DrawCommand, MAX_TEXT_LEN, NO_TRANSPARENCY, transparency};
pub use stripe::{STRIPE_PIXELS, Stripe};

use log::{debug, warn};
use thiserror::Error;

use crate::assets::{AssetSource, Font, SPRITE_SIZE, Sprite, Palette, decode_font};

pub const SCREEN_WIDTH: usize = 320;
pub const SCREEN_HEIGHT: usize = 240;
pub const STRIPE_COUNT: usize = 15;
pub const STRIPE_HEIGHT: usize = SCREEN_HEIGHT / STRIPE_COUNT;
pub const MAX_FONTS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

const _: () = assert!(STRIPE_HEIGHT * STRIPE_COUNT == SCREEN_HEIGHT);

/// The panel side of the SPI bus.
pub trait Display {
    type Error;

    /// Blocks until the rectangle `(x0, y0)..=(x1, y1)` has been written with
    /// `pixels`, big-endian RGB565, row-major.
    fn transfer_stripe(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, pixels: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError<E> {
    #[error("draw command queue is full")]
    QueueFull,
    #[error("no font is bound")]
    NoFont,
    #[error("text longer than {MAX_TEXT_LEN} bytes")]
    TextTooLong,
    #[error("stripe transfer failed: {0:?}")]
    Display(E),
}

/// Handle to a font registered with [`Rasterizer::add_font`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontId(u8);

impl FontId {
    /// Returned when a font could not be loaded or registered.
    pub const NONE: FontId = FontId(0xFF);

    pub(crate) const fn from_index(index: usize) -> Self {
        FontId(index as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

/// Deferred stripe renderer.
///
/// Sprites and palettes are borrowed for `'a`; fonts are owned by the
/// rasterizer's registry. `N` bounds the number of commands per frame.
pub struct Rasterizer<'a, D, const N: usize = DEFAULT_QUEUE_CAPACITY> {
    display: D,
    queue: heapless::Vec<DrawCommand<'a>, N>,
    fonts: heapless::Vec<Font, MAX_FONTS>,
    font: FontId,
    transparent: Option<u8>,
    stripe: Stripe,
}

impl<'a, D: Display, const N: usize> Rasterizer<'a, D, N> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            queue: heapless::Vec::new(),
            fonts: heapless::Vec::new(),
            font: FontId::NONE,
            transparent: None,
            stripe: Stripe::new(),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn queued(&self) -> &[DrawCommand<'a>] {
        &self.queue
    }

    /// Paints the whole frame `color`.
    pub fn clear(&mut self, color: u16) -> Result<(), RenderError<D::Error>> {
        self.push(DrawCommand::Clear(color))
    }

    /// Queues a 32×32 sprite with its top-left corner at `(x, y)`.
    ///
    /// `transparent` names a palette index to skip; anything above 15
    /// (conventionally [`NO_TRANSPARENCY`]) draws every pixel.
    /// Sprites entirely off screen are dropped here.
    pub fn blit(
        &mut self,
        sprite: &'a Sprite,
        x: i16,
        y: i16,
        palette: &'a Palette,
        transparent: u8,
    ) -> Result<(), RenderError<D::Error>> {
        let size = SPRITE_SIZE as i16;
        if x <= -size || y <= -size || x >= SCREEN_WIDTH as i16 || y >= SCREEN_HEIGHT as i16 {
            return Ok(());
        }
        self.push(DrawCommand::Blit { sprite, x, y, palette, transparent: transparency(transparent) })
    }

    /// [`blit`](Self::blit) with the index set by
    /// [`set_transparent_colour`](Self::set_transparent_colour).
    pub fn blit_sprite(&mut self, sprite: &'a Sprite, x: i16, y: i16, palette: &'a Palette) -> Result<(), RenderError<D::Error>> {
        let transparent = self.transparent_colour();
        self.blit(sprite, x, y, palette, transparent)
    }

    pub fn set_transparent_colour(&mut self, index: u8) {
        self.transparent = transparency(index);
    }

    /// Current transparent index, or [`NO_TRANSPARENCY`].
    pub fn transparent_colour(&self) -> u8 {
        self.transparent.unwrap_or(NO_TRANSPARENCY)
    }

    /// Registers `font`. The first font registered becomes the current one.
    /// Returns [`FontId::NONE`] once all slots are taken.
    pub fn add_font(&mut self, font: Font) -> FontId {
        let id = FontId::from_index(self.fonts.len());
        if self.fonts.push(font).is_err() {
            warn!(target: "rasterizer", "font registry full ({MAX_FONTS} fonts)");
            return FontId::NONE;
        }
        if self.font.is_none() {
            self.font = id;
        }
        id
    }

    /// Decodes a `fnt1` stream and registers it.
    pub fn load_font<S: AssetSource + ?Sized>(&mut self, source: &mut S) -> FontId {
        match decode_font(source) {
            Ok(font) => self.add_font(font),
            Err(e) => {
                warn!(target: "rasterizer", "font load failed: {e}");
                FontId::NONE
            }
        }
    }

    /// Binds a registered font for later [`draw_text`](Self::draw_text) calls.
    /// Unknown ids leave the binding unchanged.
    pub fn set_font(&mut self, id: FontId) {
        if id.index() < self.fonts.len() {
            self.font = id;
        }
    }

    pub fn current_font(&self) -> FontId {
        self.font
    }

    pub fn font(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.index())
    }

    /// Queues `text` at `(x, y)` in the current font and colour `color`.
    ///
    /// Bytes without a glyph are skipped but still advance the cursor; `'\n'`
    /// starts a new line `advance_y` below. Returns how many glyphs will land
    /// on screen.
    pub fn draw_text(&mut self, text: &str, x: i16, y: i16, color: u16) -> Result<usize, RenderError<D::Error>> {
        let font = self.fonts.get(self.font.index()).ok_or(RenderError::NoFont)?;
        let bytes: heapless::Vec<u8, MAX_TEXT_LEN> =
            heapless::Vec::from_slice(text.as_bytes()).map_err(|_| RenderError::TextTooLong)?;

        let visible = visible_glyphs(&bytes, x as i32, y as i32, font);
        if visible == 0 {
            return Ok(0);
        }

        let font = self.font;
        self.push(DrawCommand::Text { text: bytes, x, y, color, font })?;
        Ok(visible)
    }

    /// Replays the queue into each stripe and sends the stripes to the panel,
    /// then empties the queue.
    ///
    /// A failed transfer abandons the rest of the frame; the queue is still
    /// emptied.
    pub fn draw(&mut self) -> Result<(), RenderError<D::Error>> {
        debug!(target: "rasterizer", "drawing frame: {} commands", self.queue.len());

        let result = self.draw_stripes();
        self.queue.clear();
        result
    }

    fn draw_stripes(&mut self) -> Result<(), RenderError<D::Error>> {
        for index in 0..STRIPE_COUNT {
            let top = index * STRIPE_HEIGHT;
            self.stripe.move_to(top);
            for cmd in &self.queue {
                self.stripe.render(cmd, &self.fonts);
            }

            self.display
                .transfer_stripe(
                    0,
                    top as u16,
                    (SCREEN_WIDTH - 1) as u16,
                    (top + STRIPE_HEIGHT - 1) as u16,
                    self.stripe.as_wire_bytes(),
                )
                .map_err(RenderError::Display)?;
        }
        Ok(())
    }

    fn push(&mut self, cmd: DrawCommand<'a>) -> Result<(), RenderError<D::Error>> {
        self.queue.push(cmd).map_err(|_| {
            warn!(target: "rasterizer", "draw queue full ({N} commands), dropping command");
            RenderError::QueueFull
        })
    }
}

/// Counts glyphs of `text` whose cell overlaps the screen.
fn visible_glyphs(text: &[u8], x: i32, y: i32, font: &Font) -> usize {
    let (w, h) = (font.char_width as i32, font.char_height as i32);
    let (mut pen_x, mut pen_y) = (x, y);
    let mut visible = 0;

    for &code in text {
        if code == b'\n' {
            pen_x = x;
            pen_y += font.advance_y as i32;
            continue;
        }
        let on_screen = pen_x + w > 0
            && pen_x < SCREEN_WIDTH as i32
            && pen_y + h > 0
            && pen_y < SCREEN_HEIGHT as i32;
        if on_screen && font.glyph(code).is_some() {
            visible += 1;
        }
        pen_x += font.advance_x as i32;
    }
    visible
}
