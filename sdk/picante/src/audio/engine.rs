use super::VOICE_COUNT;
use super::voice::{Patch, Voice};

/// The voice ring, owned by the audio interrupt.
#[derive(Debug, Clone, Default)]
pub struct VoiceEngine {
    voices: [Voice; VOICE_COUNT],
}

impl VoiceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voice(&self, index: usize) -> &Voice {
        &self.voices[index % VOICE_COUNT]
    }

    pub fn apply(&mut self, index: usize, patch: &Patch) {
        self.voices[index % VOICE_COUNT].apply(patch);
    }

    /// Advances a single voice one sample, modulated by its ring neighbour.
    pub fn tick_voice(&mut self, index: usize) -> i16 {
        let index = index % VOICE_COUNT;
        let modulator = self.voices[(index + 1) % VOICE_COUNT].oscillator.value();
        self.voices[index].tick(modulator)
    }

    /// Advances every voice one sample and returns the clamped mix.
    ///
    /// Idle voices still run their oscillators so they can act as modulators;
    /// their envelope keeps them out of the mix.
    #[inline]
    pub fn tick(&mut self) -> i16 {
        let mut taps = [0i16; VOICE_COUNT];
        for (tap, voice) in taps.iter_mut().zip(&self.voices) {
            *tap = voice.oscillator.value();
        }

        let mut mix = 0i32;
        for (i, voice) in self.voices.iter_mut().enumerate() {
            mix += voice.tick(taps[(i + 1) % VOICE_COUNT]) as i32;
        }
        mix.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}
