//! # Picante
//!
//! Multimedia runtime for the Picante handheld: a 320×240 RGB565 SPI panel and
//! a mono I2S DAC driven from a microcontroller with no room for a framebuffer.
//!
//! The crate has two halves that never talk to each other:
//!
//! - [`video`]: a deferred command queue replayed once per 16-line stripe, so
//!   peak pixel memory is a single 320×16 band.
//! - [`audio`]: a four-voice fixed-point synthesizer filled from the DAC's
//!   buffer-consumed interrupt.
//!
//! Assets come from [`assets`], which decodes the packed sprite sheet and font
//! formats. [`console::Console`] ties the board's collaborators together.
//!
//! ```ignore
//! static CONTROL: ControlBlock = ControlBlock::new();
//!
//! let (mut console, mut scheduler) = Console::init(panel, i2s, &CONTROL);
//! scheduler.start();
//! // route the I2S buffer-consumed interrupt to `scheduler.on_buffer_consumed()`
//!
//! console.video.load_font(&mut FONT_BYTES.as_slice());
//! console.synth.play_note(0, "A4", 200)?;
//! loop {
//!     console.video.clear(0x0000)?;
//!     console.video.draw_text("hello", 8, 8, 0xFFFF)?;
//!     console.video.draw()?;
//! }
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
extern crate alloc;

pub mod assets;
pub mod audio;
pub mod console;
pub mod video;

pub use assets::{AssetError, AssetSource, Font, FontMetrics, Palette, Sprite, SpriteSheet};
pub use audio::{ControlBlock, Envelope, Modulation, ModulationKind, Waveform};
pub use console::Console;
pub use video::{Display, FontId, Rasterizer, RenderError};
