#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::blip::Blip;
use crate::error::BlipError;
use crate::kernel::{Cutoff, FilterKind};

/// Everything needed to build or retune a [`Blip`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BlipConfig {
    /// Buffer capacity in output samples.
    pub capacity: usize,
    pub clock_rate: f64,
    pub sample_rate: f64,
    pub cutoff: Cutoff,
    pub filter: FilterKind,
    pub bass_shift: Option<u32>,
}

impl Default for BlipConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            clock_rate: crate::CPU_FREQUENCY,
            sample_rate: 48_000.0,
            cutoff: Cutoff::default(),
            filter: FilterKind::default(),
            bass_shift: None,
        }
    }
}

impl BlipConfig {
    pub fn build(&self) -> Result<Blip, BlipError> {
        let mut blip = Blip::new(self.capacity)?;
        self.apply(&mut blip)?;
        blip.clear();
        Ok(blip)
    }

    /// Retunes an existing buffer. Capacity is fixed at creation and is not
    /// touched; buffered samples are kept.
    pub fn apply(&self, blip: &mut Blip) -> Result<(), BlipError> {
        blip.retune(self.clock_rate, self.sample_rate, self.filter, self.cutoff)?;
        blip.set_bass_shift(self.bass_shift);
        Ok(())
    }
}
