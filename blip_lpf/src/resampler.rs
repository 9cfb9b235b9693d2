use crate::blip::Blip;
use crate::config::BlipConfig;
use crate::error::BlipError;

/// Output amplitude of a level of `1.0`.
const FULL_SCALE: f32 = i16::MAX as f32;

/// Level front end for chips that produce one output level per clock.
///
/// Levels are in `-1.0..=1.0`. Each is rounded to a 16-bit amplitude, and
/// only a change from the amplitude already in the buffer becomes a delta,
/// so the buffered level always equals the last level rounded.
pub struct Resampler {
    blip: Blip,
    amp: i32,
    clock: usize,
}

impl Resampler {
    pub fn new(size: usize) -> Result<Self, BlipError> {
        Blip::new(size).map(Self::from)
    }

    pub fn with_config(config: &BlipConfig) -> Result<Self, BlipError> {
        config.build().map(Self::from)
    }

    pub fn set_rates(&mut self, clock_rate: f64, sample_rate: f64) -> Result<(), BlipError> {
        self.blip.set_rates(clock_rate, sample_rate)
    }

    /// Level for the current clock; advances the clock by one.
    pub fn add_sample(&mut self, level: f32) {
        let amp = (level.clamp(-1.0, 1.0) * FULL_SCALE).round() as i32;
        if amp != self.amp {
            self.blip.add_delta(self.clock, amp - self.amp);
            self.amp = amp;
        }
        self.clock += 1;
    }

    /// Amplitude currently held by the buffer.
    pub fn amplitude(&self) -> i32 {
        self.amp
    }

    /// Clocks counted since the last [`Resampler::end_frame`].
    pub fn clocks(&self) -> usize {
        self.clock
    }

    pub fn clocks_needed(&self, samples: usize) -> usize {
        self.blip.clocks_needed(samples)
    }

    pub fn end_frame(&mut self) {
        self.blip.end_frame(self.clock);
        self.clock = 0;
    }

    pub fn read_samples(&mut self, buf: &mut [i16]) -> usize {
        self.blip.read_samples(buf, usize::MAX, false)
    }

    /// Drops buffered output and returns the level to silence.
    pub fn clear(&mut self) {
        self.blip.clear();
        self.amp = 0;
        self.clock = 0;
    }

    pub fn avail(&self) -> usize {
        self.blip.samples_avail()
    }

    pub fn blip(&mut self) -> &mut Blip {
        &mut self.blip
    }
}

impl From<Blip> for Resampler {
    fn from(blip: Blip) -> Self {
        Self {
            blip,
            amp: 0,
            clock: 0,
        }
    }
}
