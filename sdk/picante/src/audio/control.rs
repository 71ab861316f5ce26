//! Main thread → audio interrupt hand-off.
//!
//! Each voice has a [`PatchSlot`]: two halves and an atomic index naming the
//! half the interrupt may read. [`Synth`] keeps a shadow [`Patch`] per voice,
//! edits the shadow, and publishes it whole into the back half before flipping
//! the index. The scheduler takes whatever is fresh at the top of each fill.
//!
//! This relies on the audio interrupt preempting the main thread and never
//! the other way round, i.e. both sides run on the same core.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use log::warn;

use super::envelope::Envelope;
use super::modulation::{Modulation, ModulationKind};
use super::oscillator::Waveform;
use super::pitch_table::{Note, NoteError};
use super::voice::{Gate, Patch};
use super::{FULL_SCALE, MAX_FILTER_LEVEL, VOICE_COUNT};

/// Double-buffered patch for one voice.
pub struct PatchSlot {
    halves: [UnsafeCell<Patch>; 2],
    front: AtomicU8,
    fresh: AtomicBool,
}

// SAFETY: the writer only touches the half that `front` does not name, and the
// reader only the half it does. The reader runs to completion before the
// writer resumes, so a half is never read and written at once.
unsafe impl Sync for PatchSlot {}

impl PatchSlot {
    pub const fn new() -> Self {
        Self {
            halves: [UnsafeCell::new(Patch::SILENT), UnsafeCell::new(Patch::SILENT)],
            front: AtomicU8::new(0),
            fresh: AtomicBool::new(false),
        }
    }

    /// Main thread side.
    pub fn publish(&self, patch: &Patch) {
        let back = self.front.load(Ordering::Relaxed) ^ 1;
        // SAFETY: see the `Sync` impl; `back` is never the half being read.
        unsafe {
            *self.halves[back as usize].get() = *patch;
        }
        self.front.store(back, Ordering::Release);
        self.fresh.store(true, Ordering::Release);
    }

    /// Interrupt side. Returns the newest patch if one was published since the
    /// last call.
    pub fn take(&self) -> Option<Patch> {
        if !self.fresh.swap(false, Ordering::Acquire) {
            return None;
        }
        let front = self.front.load(Ordering::Acquire);
        // SAFETY: see the `Sync` impl; the writer never touches the front half.
        Some(unsafe { *self.halves[front as usize].get() })
    }
}

impl Default for PatchSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by [`Synth`] and the scheduler. Usually a `static`.
pub struct ControlBlock {
    slots: [PatchSlot; VOICE_COUNT],
    filter_level: AtomicU8,
}

impl ControlBlock {
    pub const fn new() -> Self {
        Self {
            slots: [const { PatchSlot::new() }; VOICE_COUNT],
            filter_level: AtomicU8::new(0),
        }
    }

    pub fn slot(&self, voice: usize) -> &PatchSlot {
        &self.slots[voice % VOICE_COUNT]
    }

    pub fn slots(&self) -> &[PatchSlot; VOICE_COUNT] {
        &self.slots
    }

    pub fn filter_level(&self) -> u8 {
        self.filter_level.load(Ordering::Relaxed)
    }
}

impl Default for ControlBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Widens a 0..=255 amplitude to 0..=32767.
pub const fn amplitude_from_u8(amplitude: u8) -> u16 {
    (amplitude as u32 * FULL_SCALE as u32 / 255) as u16
}

/// Voice controls for the main thread.
pub struct Synth<'a> {
    control: &'a ControlBlock,
    patches: [Patch; VOICE_COUNT],
}

impl<'a> Synth<'a> {
    pub fn new(control: &'a ControlBlock) -> Self {
        Self { control, patches: [Patch::SILENT; VOICE_COUNT] }
    }

    /// Shadow copy of the last patch published for `voice`.
    pub fn patch(&self, voice: usize) -> Option<&Patch> {
        self.patches.get(voice)
    }

    pub fn set_voice(&mut self, voice: usize, waveform: Waveform, envelope: Envelope) {
        let Some(patch) = self.shadow(voice) else { return };
        patch.waveform = waveform;
        patch.rates = envelope.rates();
        self.publish(voice);
    }

    /// Lets voice `(voice + 1) % VOICE_COUNT` modulate `voice`.
    pub fn set_modulation(&mut self, voice: usize, modulation: Modulation) {
        let Some(patch) = self.shadow(voice) else { return };
        patch.modulation = modulation;
        if patch.increment != 0 {
            self.retune_modulator(voice);
        }
        self.publish(voice);
    }

    /// Starts `note` (e.g. `"C#4"`) on `voice` at `amplitude` (0..=255).
    pub fn play_note(&mut self, voice: usize, note: &str, amplitude: u8) -> Result<(), NoteError> {
        let increment = Note::parse(note)?.increment();
        self.play_increment(voice, increment, amplitude);
        Ok(())
    }

    /// Starts a note given directly as a 16.16 phase increment.
    pub fn play_increment(&mut self, voice: usize, increment: u32, amplitude: u8) {
        let Some(patch) = self.shadow(voice) else { return };
        patch.increment = increment;
        patch.amplitude = amplitude_from_u8(amplitude);
        patch.gate = Gate::On;
        patch.gate_seq = patch.gate_seq.wrapping_add(1);
        self.retune_modulator(voice);
        self.publish(voice);
    }

    pub fn release_note(&mut self, voice: usize) {
        let Some(patch) = self.shadow(voice) else { return };
        patch.gate = Gate::Off;
        patch.gate_seq = patch.gate_seq.wrapping_add(1);
        self.publish(voice);
    }

    /// One-pole low-pass on the mixed output; 0 bypasses it, higher is darker.
    pub fn set_low_pass_filter_level(&self, level: u8) {
        self.control.filter_level.store(level.min(MAX_FILTER_LEVEL), Ordering::Relaxed);
    }

    fn shadow(&mut self, voice: usize) -> Option<&mut Patch> {
        let patch = self.patches.get_mut(voice);
        if patch.is_none() {
            warn!(target: "synth", "voice {voice} out of range (have {VOICE_COUNT})");
        }
        patch
    }

    /// Points the modulator of `carrier` at `carrier`'s pitch × multiplier.
    fn retune_modulator(&mut self, carrier: usize) {
        let patch = self.patches[carrier];
        if patch.modulation.kind == ModulationKind::None {
            return;
        }
        let modulator = (carrier + 1) % VOICE_COUNT;
        self.patches[modulator].increment = patch.modulation.modulator_increment(patch.increment);
        self.publish(modulator);
    }

    fn publish(&self, voice: usize) {
        self.control.slot(voice).publish(&self.patches[voice]);
    }
}
