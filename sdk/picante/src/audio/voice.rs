use super::FULL_SCALE;
use super::envelope::{Envelope, EnvelopeGenerator, EnvelopeRates, Stage};
use super::modulation::Modulation;
use super::oscillator::{Oscillator, Waveform};

/// Latest key event for a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    #[default]
    None,
    On,
    Off,
}

/// Everything the application controls about one voice.
///
/// Patches are built on the main thread and handed to the audio interrupt
/// whole; the interrupt never sees half of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub waveform: Waveform,
    pub rates: EnvelopeRates,
    pub modulation: Modulation,
    /// 16.16 phase advance per sample.
    pub increment: u32,
    /// `0..=FULL_SCALE`.
    pub amplitude: u16,
    pub gate: Gate,
    /// Bumped on every gate event so repeats of the same event still register.
    pub gate_seq: u8,
}

impl Patch {
    pub const SILENT: Patch = Patch {
        waveform: Waveform::Sine,
        rates: Envelope::new(0, 0, 0, 0).rates(),
        modulation: Modulation::OFF,
        increment: 0,
        amplitude: 0,
        gate: Gate::None,
        gate_seq: 0,
    };
}

impl Default for Patch {
    fn default() -> Self {
        Self::SILENT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Voice {
    pub oscillator: Oscillator,
    pub envelope: EnvelopeGenerator,
    pub modulation: Modulation,
    pub increment: u32,
    pub amplitude: u16,
    gate_seq: u8,
}

impl Voice {
    pub fn apply(&mut self, patch: &Patch) {
        self.oscillator.waveform = patch.waveform;
        self.envelope.rates = patch.rates;
        self.modulation = patch.modulation;
        self.increment = patch.increment;
        self.amplitude = patch.amplitude.min(FULL_SCALE as u16);

        if patch.gate_seq != self.gate_seq {
            self.gate_seq = patch.gate_seq;
            match patch.gate {
                Gate::On => self.envelope.trigger(),
                Gate::Off => self.envelope.release(),
                Gate::None => {}
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.envelope.stage() != Stage::Idle
    }

    /// Produces this voice's next sample and moves it one sample forward.
    ///
    /// `modulator` is the current oscillator output of the next voice in the
    /// ring; it is ignored unless modulation is on.
    #[inline(always)]
    pub fn tick(&mut self, modulator: i16) -> i16 {
        let level = self.envelope.tick();
        let wave = self.oscillator.value() as i32;

        let increment = self.modulation.apply(self.increment, modulator);
        self.oscillator.advance(increment);

        let scaled = wave * self.amplitude as i32 / FULL_SCALE;
        (scaled * level / FULL_SCALE) as i16
    }
}
