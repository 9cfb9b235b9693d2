use crate::blip::Blip;
use crate::error::BlipError;
use crate::kernel::{Cutoff, FilterKind};

/// Left and right buffers run on the same clock, read as interleaved frames.
pub struct StereoBlip {
    left: Blip,
    right: Blip,
}

impl StereoBlip {
    pub fn new(size: usize) -> Result<Self, BlipError> {
        Ok(Self {
            left: Blip::new(size)?,
            right: Blip::new(size)?,
        })
    }

    pub fn set_rates(&mut self, clock_rate: f64, sample_rate: f64) -> Result<(), BlipError> {
        self.left.set_rates(clock_rate, sample_rate)?;
        self.right.set_rates(clock_rate, sample_rate)
    }

    pub fn set_cutoff(&mut self, cutoff: Cutoff) {
        self.left.set_cutoff(cutoff);
        self.right.set_cutoff(cutoff);
    }

    pub fn set_filter(&mut self, filter: FilterKind) {
        self.left.set_filter(filter);
        self.right.set_filter(filter);
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    pub fn clocks_needed(&self, samples: usize) -> usize {
        self.left.clocks_needed(samples)
    }

    pub fn add_delta(&mut self, time: usize, left: i32, right: i32) {
        self.left.add_delta(time, left);
        self.right.add_delta(time, right);
    }

    pub fn end_frame(&mut self, t: usize) {
        self.left.end_frame(t);
        self.right.end_frame(t);
    }

    /// Available frames, one sample per side.
    pub fn samples_avail(&self) -> usize {
        self.left.samples_avail()
    }

    /// Fills `buf` with interleaved L/R frames, returning the frame count.
    pub fn read_samples(&mut self, buf: &mut [i16]) -> usize {
        let frames = buf.len() / 2;
        let count = self.left.read_samples(buf, frames, true);
        if count == 0 {
            return 0;
        }
        self.right.read_samples(&mut buf[1..], count, true)
    }

    pub fn left(&mut self) -> &mut Blip {
        &mut self.left
    }

    pub fn right(&mut self) -> &mut Blip {
        &mut self.right
    }
}
