//! Band-limited kernels, one per filter family, output rate and cutoff.
//!
//! Every kernel is a low-pass impulse response; the reader integrates the
//! buffer, so what reaches the output is the kernel's step response. Taps are
//! signed fixed point with [`KERNEL_BITS`] fraction bits and sum to exactly
//! `1 << KERNEL_BITS`.

mod design;

use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const KERNEL_BITS: u32 = 30;

/// Transition band width relative to the stop band edge.
const TRANSITION: f64 = 0.2;

/// Output rates with a designed kernel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleRate {
    Hz48000,
    Hz96000,
    Hz192000,
    Hz384000,
    Hz768000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 5] = [
        SampleRate::Hz48000,
        SampleRate::Hz96000,
        SampleRate::Hz192000,
        SampleRate::Hz384000,
        SampleRate::Hz768000,
    ];

    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz48000 => 48_000,
            SampleRate::Hz96000 => 96_000,
            SampleRate::Hz192000 => 192_000,
            SampleRate::Hz384000 => 384_000,
            SampleRate::Hz768000 => 768_000,
        }
    }

    pub fn from_hz(hz: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.hz() == hz)
    }
}

/// Stop band edge of the anti-aliasing filter.
///
/// Cutoffs above half the output rate are clipped to it, so asking a 96 kHz
/// buffer for a 192 kHz cutoff gives the 48 kHz kernel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cutoff {
    #[default]
    Hz24000,
    Hz48000,
    Hz96000,
    Hz192000,
    Hz384000,
}

impl Cutoff {
    pub const ALL: [Cutoff; 5] = [
        Cutoff::Hz24000,
        Cutoff::Hz48000,
        Cutoff::Hz96000,
        Cutoff::Hz192000,
        Cutoff::Hz384000,
    ];

    pub fn hz(self) -> u32 {
        match self {
            Cutoff::Hz24000 => 24_000,
            Cutoff::Hz48000 => 48_000,
            Cutoff::Hz96000 => 96_000,
            Cutoff::Hz192000 => 192_000,
            Cutoff::Hz384000 => 384_000,
        }
    }

    pub fn from_hz(hz: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.hz() == hz)
    }

    fn effective_hz(self, rate: SampleRate) -> u32 {
        self.hz().min(rate.hz() / 2)
    }
}

/// Filter family.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterKind {
    /// Kaiser window, 80 dB stop band. Sharpest, crisp transitions.
    #[default]
    Kaiser,
    /// Blackman window, about 74 dB. Longest kernels, flatter sound.
    Blackman,
    /// Kaiser window, 40 dB. Softer edges, far fewer taps.
    KaiserFast,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [
        FilterKind::Kaiser,
        FilterKind::Blackman,
        FilterKind::KaiserFast,
    ];

    fn design(self, stop_hz: u32, rate_hz: u32) -> Kernel {
        let stop = stop_hz as f64 / rate_hz as f64;
        let transition = stop * TRANSITION;
        let corner = stop - transition / 2.0;

        let window = match self {
            FilterKind::Kaiser => kaiser(80.0, transition),
            FilterKind::KaiserFast => kaiser(40.0, transition),
            FilterKind::Blackman => design::blackman_window(design::blackman_len(transition)),
        };

        let (taps, peak) = design::quantize(&design::lowpass(corner, &window), KERNEL_BITS);
        Kernel {
            taps: taps.into_boxed_slice(),
            peak,
        }
    }
}

fn kaiser(attenuation: f64, transition: f64) -> Vec<f64> {
    let len = design::kaiser_len(attenuation, transition);
    design::kaiser_window(len, design::kaiser_beta(attenuation))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    taps: Box<[i32]>,
    peak: usize,
}

impl Kernel {
    /// One tap of unity gain: no band limiting at all.
    pub fn dirac() -> &'static Kernel {
        &DIRAC
    }

    pub fn taps(&self) -> &[i32] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Index of the largest tap, where a step reaches half its height.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn is_dirac(&self) -> bool {
        self.taps.len() == 1
    }
}

struct KernelBank {
    kernels: Vec<Kernel>,
    widest: usize,
}

impl KernelBank {
    fn new() -> Self {
        let count = FilterKind::ALL.len() * SampleRate::ALL.len() * Cutoff::ALL.len();
        let mut kernels = Vec::with_capacity(count);
        for filter in FilterKind::ALL {
            for rate in SampleRate::ALL {
                for cutoff in Cutoff::ALL {
                    kernels.push(filter.design(cutoff.effective_hz(rate), rate.hz()));
                }
            }
        }
        let widest = kernels.iter().map(Kernel::len).max().unwrap_or(1);

        Self { kernels, widest }
    }

    fn get(&self, filter: FilterKind, rate: SampleRate, cutoff: Cutoff) -> &Kernel {
        let f = FilterKind::ALL.iter().position(|&k| k == filter).unwrap_or(0);
        let r = SampleRate::ALL.iter().position(|&k| k == rate).unwrap_or(0);
        let c = Cutoff::ALL.iter().position(|&k| k == cutoff).unwrap_or(0);
        &self.kernels[(f * SampleRate::ALL.len() + r) * Cutoff::ALL.len() + c]
    }
}

lazy_static::lazy_static! {
    static ref BANK: KernelBank = KernelBank::new();

    static ref DIRAC: Kernel = Kernel {
        taps: vec![1 << KERNEL_BITS].into_boxed_slice(),
        peak: 0,
    };
}

/// Looks up the kernel for an output rate. Rates without a designed kernel
/// get [`Kernel::dirac`].
pub fn kernel_for(filter: FilterKind, rate_hz: u32, cutoff: Cutoff) -> &'static Kernel {
    match SampleRate::from_hz(rate_hz) {
        Some(rate) => BANK.get(filter, rate, cutoff),
        None => {
            warn!("no kernel for {} Hz, deltas will not be band limited", rate_hz);
            Kernel::dirac()
        }
    }
}

/// Tap count of the longest kernel in the bank.
pub fn widest() -> usize {
    BANK.widest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_gain() {
        for filter in FilterKind::ALL {
            for rate in SampleRate::ALL {
                for cutoff in Cutoff::ALL {
                    let k = kernel_for(filter, rate.hz(), cutoff);
                    let sum: i64 = k.taps().iter().map(|&t| t as i64).sum();
                    assert_eq!(sum, 1 << KERNEL_BITS, "{:?} {:?} {:?}", filter, rate, cutoff);
                    assert_eq!(k.len() % 2, 1);
                    assert_eq!(k.peak(), k.len() / 2);
                }
            }
        }
    }

    #[test]
    fn test_fallback() {
        let k = kernel_for(FilterKind::Kaiser, 44_100, Cutoff::Hz24000);
        assert!(k.is_dirac());
        assert_eq!(k.taps(), &[1 << KERNEL_BITS]);
        assert_eq!(k.peak(), 0);
    }

    #[test]
    fn test_cutoff_clipped_to_nyquist() {
        let nyquist = kernel_for(FilterKind::Kaiser, 96_000, Cutoff::Hz48000);
        let above = kernel_for(FilterKind::Kaiser, 96_000, Cutoff::Hz192000);
        assert_eq!(nyquist, above);

        let lower = kernel_for(FilterKind::Kaiser, 96_000, Cutoff::Hz24000);
        assert_ne!(nyquist, lower);
    }

    #[test]
    fn test_lengths() {
        let rate = 768_000;
        let kaiser = kernel_for(FilterKind::Kaiser, rate, Cutoff::Hz24000).len();
        let fast = kernel_for(FilterKind::KaiserFast, rate, Cutoff::Hz24000).len();
        let blackman = kernel_for(FilterKind::Blackman, rate, Cutoff::Hz24000).len();
        assert!(fast < kaiser);
        assert!(kaiser < blackman);
        assert_eq!(widest(), blackman);

        // a higher cutoff has a wider transition band
        assert!(kernel_for(FilterKind::Kaiser, rate, Cutoff::Hz96000).len() < kaiser);
    }

    #[test]
    fn test_from_hz() {
        assert_eq!(SampleRate::from_hz(192_000), Some(SampleRate::Hz192000));
        assert_eq!(SampleRate::from_hz(44_100), None);
        assert_eq!(Cutoff::from_hz(384_000), Some(Cutoff::Hz384000));
        assert_eq!(Cutoff::default(), Cutoff::Hz24000);
    }
}
