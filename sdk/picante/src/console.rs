use crate::audio::{AudioOutput, AudioScheduler, ControlBlock, Synth};
use crate::video::{DEFAULT_QUEUE_CAPACITY, Display, Rasterizer};

/// Everything the main loop drives: the renderer and the synth controls.
///
/// The audio scheduler is handed back separately from [`Console::init`]
/// because it belongs to the interrupt handler, not the main loop.
pub struct Console<'a, D, const N: usize = DEFAULT_QUEUE_CAPACITY> {
    pub video: Rasterizer<'a, D, N>,
    pub synth: Synth<'a>,
}

impl<'a, D: Display, const N: usize> Console<'a, D, N> {
    /// Wires the panel and DAC up. `control` is normally a `static`.
    ///
    /// Call [`AudioScheduler::start`] once the DAC is ready, then route its
    /// buffer-consumed interrupt to [`AudioScheduler::on_buffer_consumed`].
    pub fn init<O: AudioOutput>(
        display: D,
        output: O,
        control: &'a ControlBlock,
    ) -> (Self, AudioScheduler<'a, O>) {
        let console = Self { video: Rasterizer::new(display), synth: Synth::new(control) };
        (console, AudioScheduler::new(output, control))
    }
}
