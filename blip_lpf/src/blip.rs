//! Delta accumulator and PCM reader.
//!
//! Time runs on a 24.40 fixed-point axis measured in output samples. Deltas
//! are spread through the active kernel into an `i64` accumulator that holds
//! amplitude with [`AMP_BITS`] fraction bits; reading integrates it back into
//! levels and clamps to 16 bits.

use bit_field::BitField;
use log::{debug, trace};

use crate::error::BlipError;
use crate::kernel::{self, Cutoff, FilterKind, Kernel, KERNEL_BITS};

/// Largest supported clock to sample ratio.
pub const MAX_RATIO: u64 = 1 << 20;

/// Largest buffer, in output samples.
pub const MAX_SIZE: usize = 1 << 22;

/// Smallest clock to sample ratio: one clock per [`MAX_SIZE`] samples.
pub const MIN_RATIO: f64 = 1.0 / MAX_SIZE as f64;

const TIME_BITS: usize = 40;
const TIME_UNIT: u64 = 1 << TIME_BITS;

pub const AMP_BITS: usize = 15;
const KERNEL_SHIFT: usize = KERNEL_BITS as usize - AMP_BITS;

// deltas landing just past the end of a frame
const END_FRAME_EXTRA: usize = 2;

pub struct Blip {
    factor: u64,
    offset: u64,
    avail: usize,
    size: usize,
    extra: usize,
    integrator: i64,
    buf: Box<[i64]>,

    sample_rate: f64,
    cutoff: Cutoff,
    filter: FilterKind,
    kernel: &'static Kernel,
    bass_shift: Option<usize>,
}

impl Blip {
    /// Creates a buffer holding up to `size` output samples.
    ///
    /// Resamples one clock to one sample without filtering until
    /// [`Blip::set_rates`] is called.
    pub fn new(size: usize) -> Result<Self, BlipError> {
        if size > MAX_SIZE {
            return Err(BlipError::CapacityTooLarge {
                requested: size,
                max: MAX_SIZE,
            });
        }

        let extra = kernel::widest() + END_FRAME_EXTRA;
        let slots = size + extra;
        let mut buf = Vec::new();
        buf.try_reserve_exact(slots)
            .map_err(|_| BlipError::Alloc { slots })?;
        buf.resize(slots, 0i64);

        debug!("blip buffer: {} samples, {} slots", size, slots);

        let factor = TIME_UNIT;
        Ok(Self {
            factor,
            offset: factor / 2,
            avail: 0,
            size,
            extra,
            integrator: 0,
            buf: buf.into_boxed_slice(),

            sample_rate: 0.0,
            cutoff: Cutoff::default(),
            filter: FilterKind::default(),
            kernel: Kernel::dirac(),
            bass_shift: None,
        })
    }

    /// Sets the input clock rate and output sample rate, and picks the kernel
    /// for the output rate.
    ///
    /// Any positive clock rate works, including one below the sample rate.
    /// Buffered samples are kept. The frame in flight may end up mixing the
    /// tails of the old and new kernels; call [`Blip::clear`] first to avoid it.
    pub fn set_rates(&mut self, clock_rate: f64, sample_rate: f64) -> Result<(), BlipError> {
        self.update_rates(clock_rate, sample_rate)?;
        self.select_kernel();
        Ok(())
    }

    /// Sets rates, filter family and cutoff together with a single kernel
    /// lookup. Nothing changes if the rates are rejected.
    pub fn retune(
        &mut self,
        clock_rate: f64,
        sample_rate: f64,
        filter: FilterKind,
        cutoff: Cutoff,
    ) -> Result<(), BlipError> {
        self.update_rates(clock_rate, sample_rate)?;
        self.filter = filter;
        self.cutoff = cutoff;
        self.select_kernel();
        Ok(())
    }

    fn update_rates(&mut self, clock_rate: f64, sample_rate: f64) -> Result<(), BlipError> {
        let valid = |r: f64| r.is_finite() && r > 0.0;
        if !valid(clock_rate) || !valid(sample_rate) {
            return Err(BlipError::InvalidRate {
                clock_rate,
                sample_rate,
            });
        }

        // above MAX_RATIO the factor keeps too few significant bits; below
        // MIN_RATIO a single clock would step past the largest buffer
        let ratio = clock_rate / sample_rate;
        if !(MIN_RATIO..=MAX_RATIO as f64).contains(&ratio) {
            return Err(BlipError::RatioOutOfRange { ratio });
        }

        // round up, so time never drifts behind the clock
        let factor = TIME_UNIT as f64 * sample_rate / clock_rate;
        self.factor = factor.ceil() as u64;
        self.sample_rate = sample_rate;

        debug!(
            "blip rates: clock {} Hz, sample {} Hz, factor {:#x}",
            clock_rate, sample_rate, self.factor
        );
        Ok(())
    }

    pub fn set_cutoff(&mut self, cutoff: Cutoff) {
        self.cutoff = cutoff;
        self.select_kernel();
    }

    pub fn set_filter(&mut self, filter: FilterKind) {
        self.filter = filter;
        self.select_kernel();
    }

    /// Bleeds DC off the output: every sample the level loses
    /// `1 / 2^shift` of itself. `None` keeps the plain integrator.
    pub fn set_bass_shift(&mut self, shift: Option<u32>) {
        self.bass_shift = shift.map(|s| (s as usize).clamp(1, AMP_BITS));
    }

    fn select_kernel(&mut self) {
        let rate = self.sample_rate.round() as u32;
        self.kernel = kernel::kernel_for(self.filter, rate, self.cutoff);
        debug!(
            "blip kernel: {:?} {:?} at {} Hz, {} taps",
            self.filter,
            self.cutoff,
            rate,
            self.kernel.len()
        );
    }

    pub fn clear(&mut self) {
        self.offset = self.factor / 2;
        self.avail = 0;
        self.integrator = 0;
        self.buf.fill(0);
    }

    /// Clocks to run before [`Blip::end_frame`] so that `samples` more
    /// samples become available.
    pub fn clocks_needed(&self, samples: usize) -> usize {
        debug_assert!(self.avail + samples <= self.size);

        let needed = TIME_UNIT * samples as u64;
        if needed < self.offset {
            return 0;
        }

        ((needed - self.offset + self.factor - 1) / self.factor) as usize
    }

    /// Ends the frame at clock `t`; deltas of the next frame count from here.
    pub fn end_frame(&mut self, t: usize) {
        let off = t as u64 * self.factor + self.offset;
        self.avail += (off >> TIME_BITS) as usize;
        self.offset = off.get_bits(0..TIME_BITS);

        trace!("blip end_frame: {} clocks, {} avail", t, self.avail);
        debug_assert!(self.avail <= self.size);
    }

    pub fn samples_avail(&self) -> usize {
        self.avail
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn kernel(&self) -> &'static Kernel {
        self.kernel
    }

    fn remove_samples(&mut self, count: usize) {
        let remain = self.avail + self.extra - count;
        self.avail -= count;

        self.buf.copy_within(count..count + remain, 0);
        self.buf[remain..].fill(0);
    }

    /// Reads up to `count` samples into `buf`, every other slot when `stereo`
    /// is set. Returns how many were written.
    pub fn read_samples(&mut self, buf: &mut [i16], count: usize, stereo: bool) -> usize {
        let step = if stereo { 2 } else { 1 };
        let count = count.min(self.avail).min(buf.len().div_ceil(step));

        if count > 0 {
            let mut sum = self.integrator;

            for (&sb, b) in self.buf[..count].iter().zip(buf.iter_mut().step_by(step)) {
                let s = (sum >> AMP_BITS).clamp(i16::MIN as i64, i16::MAX as i64);
                sum += sb;

                *b = s as i16;

                if let Some(shift) = self.bass_shift {
                    sum -= s << (AMP_BITS - shift);
                }
            }

            self.integrator = sum;
            self.remove_samples(count);
        }

        count
    }

    fn position(&self, time: usize) -> u64 {
        time as u64 * self.factor + self.offset
    }

    /// Adds an amplitude step of `delta` at clock `time` of the current frame.
    ///
    /// # Panics
    ///
    /// If the kernel would reach past the buffer, i.e. the frame is longer
    /// than [`Blip::clocks_needed`] allowed for.
    pub fn add_delta(&mut self, time: usize, delta: i32) {
        if delta == 0 {
            return;
        }

        let kernel = self.kernel;
        let start = self.avail + (self.position(time) >> TIME_BITS) as usize;
        debug_assert!(start + kernel.len() <= self.buf.len());

        let out = &mut self.buf[start..start + kernel.len()];
        let delta = delta as i64;

        let mut total = 0;
        for (o, &k) in out.iter_mut().zip(kernel.taps()) {
            let v = (k as i64 * delta) >> KERNEL_SHIFT;
            *o += v;
            total += v;
        }
        // truncation residue, so every step settles at exactly `delta`
        out[kernel.peak()] += (delta << AMP_BITS) - total;
    }

    /// Unfiltered variant of [`Blip::add_delta`]: the step is split between
    /// two neighbouring samples by its sub-sample phase.
    pub fn add_delta_fast(&mut self, time: usize, delta: i32) {
        if delta == 0 {
            return;
        }

        let fixed = self.position(time);
        let start = self.avail + (fixed >> TIME_BITS) as usize;
        debug_assert!(start + 2 <= self.buf.len());

        let interp = fixed.get_bits(TIME_BITS - AMP_BITS..TIME_BITS) as i64;
        let delta = delta as i64;
        let delta2 = delta * interp;

        self.buf[start] += (delta << AMP_BITS) - delta2;
        self.buf[start + 1] += delta2;
    }
}
