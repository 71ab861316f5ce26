use bit_field::BitField;

use crate::assets::{Font, PALETTE_LEN, Palette, SPRITE_SIZE, Sprite};

use super::{DrawCommand, SCREEN_WIDTH, STRIPE_HEIGHT};

pub const STRIPE_PIXELS: usize = SCREEN_WIDTH * STRIPE_HEIGHT;

/// Scratch band of `SCREEN_WIDTH × STRIPE_HEIGHT` pixels.
///
/// Pixels are held in wire order (big-endian RGB565), so handing the band to
/// the panel is a plain byte view. The contents survive between stripes and
/// frames; only a `Clear` command resets them.
pub struct Stripe {
    pixels: [u16; STRIPE_PIXELS],
    top: i32,
}

impl Stripe {
    pub const fn new() -> Self {
        Self { pixels: [0; STRIPE_PIXELS], top: 0 }
    }

    /// Moves the band so its first row is screen row `top`.
    pub fn move_to(&mut self, top: usize) {
        self.top = top as i32;
    }

    pub fn top(&self) -> usize {
        self.top as usize
    }

    /// Native RGB565 colour at a band-local coordinate.
    pub fn pixel(&self, x: usize, row: usize) -> u16 {
        u16::from_be(self.pixels[row * SCREEN_WIDTH + x])
    }

    pub fn as_wire_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Rasterizes the part of `cmd` that falls inside this band.
    pub fn render(&mut self, cmd: &DrawCommand<'_>, fonts: &[Font]) {
        if let Some(rows) = cmd.rows(fonts) {
            if rows.end <= self.top || rows.start >= self.bottom() {
                return;
            }
        }

        match cmd {
            DrawCommand::Clear(color) => self.pixels.fill(color.to_be()),
            DrawCommand::Blit { sprite, x, y, palette, transparent } => {
                self.blit(sprite, *x as i32, *y as i32, palette, *transparent)
            }
            DrawCommand::Text { text, x, y, color, font } => {
                if let Some(font) = fonts.get(font.index()) {
                    self.text(text, *x as i32, *y as i32, *color, font);
                }
            }
        }
    }

    fn bottom(&self) -> i32 {
        self.top + STRIPE_HEIGHT as i32
    }

    fn blit(&mut self, sprite: &Sprite, x: i32, y: i32, palette: &Palette, transparent: Option<u8>) {
        let size = SPRITE_SIZE as i32;
        let rows = y.max(self.top)..(y + size).min(self.bottom());
        let cols = x.max(0)..(x + size).min(SCREEN_WIDTH as i32);
        if rows.is_empty() || cols.is_empty() {
            return;
        }

        let mut wire = [0u16; PALETTE_LEN];
        for (w, c) in wire.iter_mut().zip(palette.colors()) {
            *w = c.to_be();
        }

        for sy in rows {
            let src_y = (sy - y) as usize;
            let line = (sy - self.top) as usize * SCREEN_WIDTH;
            for sx in cols.clone() {
                let index = sprite.index_at((sx - x) as usize, src_y);
                if transparent == Some(index) {
                    continue;
                }
                self.pixels[line + sx as usize] = wire[index as usize];
            }
        }
    }

    fn text(&mut self, text: &[u8], x: i32, y: i32, color: u16, font: &Font) {
        let color = color.to_be();
        let width = font.char_width.min(8) as usize;
        let (mut pen_x, mut pen_y) = (x, y);

        for &code in text {
            if code == b'\n' {
                pen_x = x;
                pen_y += font.advance_y as i32;
                continue;
            }
            if let Some(rows) = font.glyph(code) {
                self.glyph(rows, width, pen_x, pen_y, color);
            }
            pen_x += font.advance_x as i32;
        }
    }

    fn glyph(&mut self, rows: &[u8], width: usize, x: i32, y: i32, wire_color: u16) {
        for (r, &mask) in rows.iter().enumerate() {
            let sy = y + r as i32;
            if sy < self.top || sy >= self.bottom() {
                continue;
            }
            let line = (sy - self.top) as usize * SCREEN_WIDTH;
            for c in 0..width {
                let sx = x + c as i32;
                if mask.get_bit(c) && (0..SCREEN_WIDTH as i32).contains(&sx) {
                    self.pixels[line + sx as usize] = wire_color;
                }
            }
        }
    }
}

impl Default for Stripe {
    fn default() -> Self {
        Self::new()
    }
}
