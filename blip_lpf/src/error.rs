use thiserror::Error;

/// Failures reported while building or reconfiguring a [`crate::Blip`].
///
/// Capacity overruns during a frame are caller bugs and are not represented
/// here; they trip debug assertions or slice bounds checks instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BlipError {
    #[error("could not allocate {slots} accumulator slots")]
    Alloc { slots: usize },

    #[error("buffer capacity {requested} exceeds the maximum of {max} samples")]
    CapacityTooLarge { requested: usize, max: usize },

    #[error("invalid rates: clock {clock_rate} Hz, sample {sample_rate} Hz")]
    InvalidRate { clock_rate: f64, sample_rate: f64 },

    #[error(
        "clock to sample ratio {ratio} is outside {min}..={max}",
        min = crate::blip::MIN_RATIO,
        max = crate::blip::MAX_RATIO
    )]
    RatioOutOfRange { ratio: f64 },
}
