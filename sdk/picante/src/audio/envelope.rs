use super::FULL_SCALE;

/// Envelope times are counted in ticks of this many samples (≈ 1/256 s at 16 kHz).
pub const TICK_SAMPLES: u32 = 64;

/// Full scale in 16.16.
pub const FULL_SCALE_FP: u32 = (FULL_SCALE as u32) << 16;

/// ADSR settings in application units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Ticks from the current level to full scale.
    pub attack: u8,
    /// Ticks from full scale down to the sustain level.
    pub decay: u8,
    /// Sustain level in 1/255ths of full scale.
    pub sustain: u8,
    /// Ticks from the sustain level to silence.
    pub release: u8,
}

impl Envelope {
    pub const fn new(attack: u8, decay: u8, sustain: u8, release: u8) -> Self {
        Self { attack, decay, sustain, release }
    }

    pub const fn sustain_level(&self) -> u32 {
        self.sustain as u32 * FULL_SCALE as u32 / 255
    }

    /// Per-sample slopes. A zero-length segment, in time or in span, is
    /// covered in a single sample.
    pub const fn rates(&self) -> EnvelopeRates {
        let sustain = self.sustain_level();
        EnvelopeRates {
            attack: slope(FULL_SCALE as u32, self.attack),
            decay: slope(FULL_SCALE as u32 - sustain, self.decay),
            sustain: sustain << 16,
            release: slope(sustain, self.release),
        }
    }
}

const fn slope(span: u32, ticks: u8) -> u32 {
    if ticks == 0 || span == 0 {
        return FULL_SCALE_FP;
    }
    (span << 16) / (ticks as u32 * TICK_SAMPLES)
}

/// 16.16 per-sample deltas and the sustain level, as computed by [`Envelope::rates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeRates {
    pub attack: u32,
    pub decay: u32,
    pub sustain: u32,
    pub release: u32,
}

impl Default for EnvelopeRates {
    fn default() -> Self {
        Envelope::default().rates()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR state machine, stepped once per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeGenerator {
    stage: Stage,
    level: u32,
    pub rates: EnvelopeRates,
}

impl EnvelopeGenerator {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Current level, `0..=FULL_SCALE`.
    #[inline(always)]
    pub fn level(&self) -> i32 {
        (self.level >> 16) as i32
    }

    /// Starts the attack from wherever the level currently is.
    pub fn trigger(&mut self) {
        self.stage = Stage::Attack;
    }

    pub fn release(&mut self) {
        if self.stage != Stage::Idle {
            self.stage = Stage::Release;
        }
    }

    #[inline(always)]
    pub fn tick(&mut self) -> i32 {
        let rates = self.rates;
        match self.stage {
            Stage::Idle | Stage::Sustain => {}
            Stage::Attack => {
                self.level = self.level.saturating_add(rates.attack);
                if self.level >= FULL_SCALE_FP {
                    self.level = FULL_SCALE_FP;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                if self.level <= rates.sustain.saturating_add(rates.decay) {
                    self.level = rates.sustain;
                    self.stage = Stage::Sustain;
                } else {
                    self.level -= rates.decay;
                }
            }
            Stage::Release => {
                if self.level <= rates.release {
                    self.level = 0;
                    self.stage = Stage::Idle;
                } else {
                    self.level -= rates.release;
                }
            }
        }
        self.level()
    }
}
