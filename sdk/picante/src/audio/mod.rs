//! # Audio
//!
//! A four-voice synthesizer in 16.16 fixed point, filled from the I2S
//! buffer-consumed interrupt. Each voice is an oscillator, an ADSR envelope
//! and an optional FM link to the next voice in the ring.
//!
//! The work is split across the two execution contexts:
//!
//! - The main thread owns a [`Synth`] and calls `set_voice`, `play_note`,
//!   `release_note` and friends. Nothing it does touches a running voice.
//! - The interrupt owns the [`AudioScheduler`]. At the top of every fill it
//!   picks up whatever patches the [`Synth`] published through the shared
//!   [`ControlBlock`], then renders a whole buffer.
//!
//! ```ignore
//! static CONTROL: ControlBlock = ControlBlock::new();
//!
//! let mut synth = Synth::new(&CONTROL);
//! synth.set_voice(0, Waveform::Sine, Envelope::new(4, 8, 192, 32));
//! synth.set_voice(1, Waveform::Sine, Envelope::new(0, 0, 64, 0));
//! synth.set_modulation(0, Modulation::new(ModulationKind::Exponential, 3 << 4, 64));
//! synth.play_note(0, "C4", 255)?;
//! ```
//!
//! ## Timing
//!
//! A buffer is [`BUFFER_SAMPLES`] samples, 32 ms at [`SAMPLE_RATE`]. The fill
//! for the next buffer has to finish within that window or the DAC underruns;
//! there is no way to notice this from inside the fill.

mod control;
mod engine;
mod envelope;
mod modulation;
mod oscillator;
mod pitch_table;
mod scheduler;
mod voice;

pub use control::{ControlBlock, PatchSlot, Synth, amplitude_from_u8};
pub use engine::VoiceEngine;
pub use envelope::{Envelope, EnvelopeGenerator, EnvelopeRates, FULL_SCALE_FP, Stage, TICK_SAMPLES};
pub use modulation::{Modulation, ModulationKind, exp2_q15};
pub use oscillator::{Lfsr, Oscillator, Waveform};
pub use pitch_table::{Note, NoteError, hz_to_increment, increment_to_hz_q16, note_increment};
pub use scheduler::{AudioOutput, AudioScheduler, LowPass};
pub use voice::{Gate, Patch, Voice};

pub const SAMPLE_RATE: u32 = 16_000;
pub const VOICE_COUNT: usize = 4;
pub const BYTES_PER_SAMPLE: usize = 2;
pub const BUFFER_BYTES: usize = 1024;
pub const BUFFER_SAMPLES: usize = BUFFER_BYTES / BYTES_PER_SAMPLE;

/// Peak sample, envelope level and amplitude.
pub const FULL_SCALE: i32 = 32767;

/// Highest useful low-pass shift.
pub const MAX_FILTER_LEVEL: u8 = 7;
