use super::control::ControlBlock;
use super::engine::VoiceEngine;
use super::{BUFFER_SAMPLES, SAMPLE_RATE};

/// The I2S side.
pub trait AudioOutput {
    /// Queues one buffer of mono 16-bit PCM for playback.
    fn write(&mut self, samples: &[i16]);
}

/// One-pole low-pass: `y += (x - y) >> level`.
///
/// The step is rounded away from zero so `y` always reaches a constant input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowPass {
    y: i32,
}

impl LowPass {
    #[inline(always)]
    pub fn process(&mut self, x: i16, level: u8) -> i16 {
        if level == 0 {
            self.y = x as i32;
        } else {
            let delta = x as i32 - self.y;
            let round = (1 << level) - 1;
            let step = (delta.abs() + round) >> level;
            self.y += if delta < 0 { -step } else { step };
        }
        self.y as i16
    }
}

/// Double-buffered PCM feeder, driven from the buffer-consumed interrupt.
///
/// One buffer is always filled and waiting; the other belongs to the output
/// until its next interrupt. `ready` names the waiting one.
pub struct AudioScheduler<'a, O> {
    output: O,
    control: &'a ControlBlock,
    engine: VoiceEngine,
    buffers: [[i16; BUFFER_SAMPLES]; 2],
    ready: usize,
    filter: LowPass,
}

impl<'a, O: AudioOutput> AudioScheduler<'a, O> {
    pub fn new(output: O, control: &'a ControlBlock) -> Self {
        Self {
            output,
            control,
            engine: VoiceEngine::new(),
            buffers: [[0; BUFFER_SAMPLES]; 2],
            ready: 0,
            filter: LowPass::default(),
        }
    }

    /// Time the output takes to play one buffer; each fill must beat it.
    pub const fn buffer_duration_us() -> u32 {
        (BUFFER_SAMPLES as u64 * 1_000_000 / SAMPLE_RATE as u64) as u32
    }

    pub fn engine(&self) -> &VoiceEngine {
        &self.engine
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Primes the output with one buffer and fills the next.
    pub fn start(&mut self) {
        self.fill(0);
        self.output.write(&self.buffers[0]);
        self.fill(1);
        self.ready = 1;
    }

    /// Body of the buffer-consumed interrupt: submit the waiting buffer, then
    /// refill the one the output just gave back.
    ///
    /// Never blocks, allocates or fails.
    pub fn on_buffer_consumed(&mut self) {
        let submitted = self.ready;
        self.output.write(&self.buffers[submitted]);

        let free = submitted ^ 1;
        self.fill(free);
        self.ready = free;
    }

    fn fill(&mut self, index: usize) {
        for (voice, slot) in self.control.slots().iter().enumerate() {
            if let Some(patch) = slot.take() {
                self.engine.apply(voice, &patch);
            }
        }

        let level = self.control.filter_level();
        for sample in self.buffers[index].iter_mut() {
            *sample = self.filter.process(self.engine.tick(), level);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::audio::MAX_FILTER_LEVEL;
    use crate::audio::control::Synth;
    use crate::audio::envelope::Envelope;
    use crate::audio::oscillator::Waveform;

    #[derive(Default)]
    struct Dac {
        buffers: Vec<Vec<i16>>,
    }

    impl AudioOutput for Dac {
        fn write(&mut self, samples: &[i16]) {
            self.buffers.push(samples.to_vec());
        }
    }

    fn silent(buffer: &[i16]) -> bool {
        buffer.iter().all(|&s| s == 0)
    }

    #[test]
    fn deadline() {
        assert_eq!(AudioScheduler::<'_, Dac>::buffer_duration_us(), 32_000);
    }

    #[test]
    fn start_primes_one_buffer() {
        let control = ControlBlock::new();
        let mut audio = AudioScheduler::new(Dac::default(), &control);
        audio.start();
        let dac = audio.output();
        assert_eq!(dac.buffers.len(), 1);
        assert_eq!(dac.buffers[0].len(), BUFFER_SAMPLES);
        assert!(silent(&dac.buffers[0]));
    }

    #[test]
    fn notes_land_on_a_fill_boundary() {
        let control = ControlBlock::new();
        let mut synth = Synth::new(&control);
        let mut audio = AudioScheduler::new(Dac::default(), &control);
        audio.start();

        synth.set_voice(0, Waveform::Square, Envelope::new(0, 0, 255, 0));
        synth.play_note(0, "A4", 255).unwrap();
        assert!(!audio.engine().voice(0).is_active());

        // the buffer filled during start() goes out first, still silent
        audio.on_buffer_consumed();
        assert!(silent(&audio.output().buffers[1]));
        assert!(audio.engine().voice(0).is_active());

        audio.on_buffer_consumed();
        let tone = &audio.output().buffers[2];
        assert_eq!(tone[0], i16::MAX);
        assert!(tone.iter().any(|&s| s == i16::MIN));
    }

    #[test]
    fn release_fades_to_silence() {
        let control = ControlBlock::new();
        let mut synth = Synth::new(&control);
        let mut audio = AudioScheduler::new(Dac::default(), &control);
        synth.set_voice(1, Waveform::Sine, Envelope::new(0, 0, 255, 1));
        synth.play_note(1, "C4", 255).unwrap();
        audio.start();

        synth.release_note(1);
        audio.on_buffer_consumed();
        audio.on_buffer_consumed();

        let faded = &audio.output().buffers[2];
        assert!(!silent(&faded[..64]));
        assert!(silent(&faded[64..]));
        assert!(!audio.engine().voice(1).is_active());
    }

    #[test]
    fn buffers_alternate() {
        let control = ControlBlock::new();
        let mut audio = AudioScheduler::new(Dac::default(), &control);
        audio.start();
        assert_eq!(audio.ready, 1);
        audio.on_buffer_consumed();
        assert_eq!(audio.ready, 0);
        audio.on_buffer_consumed();
        assert_eq!(audio.ready, 1);
        assert_eq!(audio.output().buffers.len(), 3);
    }

    #[test]
    fn low_pass_smooths_steps() {
        let mut lp = LowPass::default();
        assert_eq!(lp.process(1000, 0), 1000);
        let mut lp = LowPass::default();
        assert_eq!(lp.process(1024, 2), 256);
        assert_eq!(lp.process(1024, 2), 448);
        assert_eq!(lp.process(-1024, 2), 80);
        assert_eq!(lp.process(-1024, 2), -196);
    }

    #[test]
    fn low_pass_settles_on_the_input() {
        for level in 1..=MAX_FILTER_LEVEL {
            for start in [-20_000i16, -49, -7, 7, 20_000] {
                let mut lp = LowPass::default();
                lp.process(start, 0);
                let settled = (0..2048).map(|_| lp.process(0, level)).last();
                assert_eq!(settled, Some(0), "level {level} from {start}");
            }
        }
        let mut lp = LowPass::default();
        lp.process(-7, 0);
        assert_eq!(lp.process(0, 3), -6);
    }

    #[test]
    fn low_pass_on_a_square_wave() {
        let control = ControlBlock::new();
        let mut synth = Synth::new(&control);
        synth.set_voice(0, Waveform::Square, Envelope::new(0, 0, 255, 0));
        synth.play_note(0, "A4", 255).unwrap();
        synth.set_low_pass_filter_level(3);
        let mut audio = AudioScheduler::new(Dac::default(), &control);
        audio.start();
        let first = &audio.output().buffers[0];
        assert!(first[0] < i16::MAX / 4);
        let max_step = first.windows(2).map(|w| (w[1] as i32 - w[0] as i32).abs()).max();
        assert!(max_step.is_some_and(|step| step < 65535 / 4));
    }
}
