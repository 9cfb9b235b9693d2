//! Band-limited delta resampling for emulated sound hardware.
//!
//! A sound chip is described as a stream of amplitude steps stamped with the
//! emulated clock. [`Blip`] spreads each step through a low-pass kernel picked
//! for the output rate, and hands out 16-bit PCM once a frame is committed.

pub mod blip;
pub mod config;
pub mod error;
pub mod kernel;
pub mod resampler;
pub mod stereo;

pub use blip::Blip;
pub use config::BlipConfig;
pub use error::BlipError;
pub use kernel::{kernel_for, Cutoff, FilterKind, Kernel, SampleRate};
pub use resampler::Resampler;
pub use stereo::StereoBlip;

/// NES NTSC
pub const MASTER_CLOCK: f64 = 21_477_272.0;

/// cpu frequency, the usual clock for APU deltas
pub const CPU_FREQUENCY: f64 = MASTER_CLOCK / 12.0;
