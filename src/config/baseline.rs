use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::reg::Reg;
use crate::{Clock, Error, Mpr121};

const HALF_DELTA_MASK: u8 = 0b0011_1111;

// Offsets inside one 11-register filter bank.
const RISING: u8 = 0;
const FALLING: u8 = 4;
const TOUCHED_NHD: u8 = 8;
const MHD: u8 = 0;
const NHD: u8 = 1;
const NCL: u8 = 2;
const FDL: u8 = 3;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Push one baseline filter bank (AN3891).
  ///
  /// Registers go out grouped by parameter (MHD, NHD, NCL then FDL), each
  /// group in rising, falling, touched order.
  pub(crate) fn write_baseline_filter(&mut self, bank: FilterBank, filter: &BaselineFilter) -> Result<(), Error<E>> {
    let base = bank.base();
    let BaselineFilter { rising, falling, touched } = filter;

    self.write_register(base.offset(RISING + MHD), rising.max_half_delta & HALF_DELTA_MASK)?;
    self.write_register(base.offset(FALLING + MHD), falling.max_half_delta & HALF_DELTA_MASK)?;

    self.write_register(base.offset(RISING + NHD), rising.noise_half_delta & HALF_DELTA_MASK)?;
    self.write_register(base.offset(FALLING + NHD), falling.noise_half_delta & HALF_DELTA_MASK)?;
    self.write_register(base.offset(TOUCHED_NHD), touched.noise_half_delta & HALF_DELTA_MASK)?;

    self.write_register(base.offset(RISING + NCL), rising.noise_count_limit)?;
    self.write_register(base.offset(FALLING + NCL), falling.noise_count_limit)?;
    self.write_register(base.offset(TOUCHED_NHD + 1), touched.noise_count_limit)?;

    self.write_register(base.offset(RISING + FDL), rising.filter_delay_limit)?;
    self.write_register(base.offset(FALLING + FDL), falling.filter_delay_limit)?;
    self.write_register(base.offset(TOUCHED_NHD + 2), touched.filter_delay_limit)
  }
}

/// Which set of baseline filter registers to program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterBank {
  /// ELE0..ELE11.
  Electrodes,
  /// ELEPROX.
  Proximity,
}

impl FilterBank {
  const fn base(self) -> Reg {
    match self {
      Self::Electrodes => Reg::MhdRising,
      Self::Proximity => Reg::ProxMhdRising,
    }
  }
}

/// Baseline tracking filter settings for one bank of channels.
///
/// `rising` applies when the electrode data is above the baseline, `falling`
/// when it is below and `touched` while the electrode is in touch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaselineFilter {
  pub rising: FilterStage,
  pub falling: FilterStage,
  pub touched: TouchedStage,
}

impl BaselineFilter {
  pub const fn new(rising: FilterStage, falling: FilterStage, touched: TouchedStage) -> Self {
    Self { rising, falling, touched }
  }

  pub const fn with_rising(mut self, rising: FilterStage) -> Self {
    self.rising = rising;
    self
  }

  pub const fn with_falling(mut self, falling: FilterStage) -> Self {
    self.falling = falling;
    self
  }

  pub const fn with_touched(mut self, touched: TouchedStage) -> Self {
    self.touched = touched;
    self
  }

  /// Defaults for the twelve electrodes, tuned for quick release detection.
  pub const fn electrodes() -> Self {
    Self::new(FilterStage::new(0x01, 0x01, 0x04, 0x00), FilterStage::new(0x01, 0x03, 0xC0, 0x02), TouchedStage::new(0, 0, 0))
  }

  /// Defaults for the proximity channel.
  pub const fn proximity() -> Self {
    Self::new(FilterStage::new(0x20, 0x10, 0x04, 0x00), FilterStage::new(0x01, 0x03, 0xC0, 0x80), TouchedStage::new(0, 0, 0))
  }

  pub(crate) fn mask(&mut self) {
    self.rising.mask();
    self.falling.mask();
    self.touched.noise_half_delta &= HALF_DELTA_MASK;
  }
}

/// Filter parameters for the rising or falling direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterStage {
  /// Largest change (MHD) that is still treated as non-noise drift. Max 63.
  pub max_half_delta: u8,
  /// Step (NHD) applied to the baseline once the noise count limit is hit. Max 63.
  pub noise_half_delta: u8,
  /// Samples (NCL) beyond MHD needed before the baseline moves.
  pub noise_count_limit: u8,
  /// Filter delay (FDL) applied to baseline updates.
  pub filter_delay_limit: u8,
}

impl FilterStage {
  pub const fn new(max_half_delta: u8, noise_half_delta: u8, noise_count_limit: u8, filter_delay_limit: u8) -> Self {
    Self { max_half_delta, noise_half_delta, noise_count_limit, filter_delay_limit }
  }

  fn mask(&mut self) {
    self.max_half_delta &= HALF_DELTA_MASK;
    self.noise_half_delta &= HALF_DELTA_MASK;
  }
}

/// Filter parameters while touched. The hardware has no MHD here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchedStage {
  pub noise_half_delta: u8,
  pub noise_count_limit: u8,
  pub filter_delay_limit: u8,
}

impl TouchedStage {
  pub const fn new(noise_half_delta: u8, noise_count_limit: u8, filter_delay_limit: u8) -> Self {
    Self { noise_half_delta, noise_count_limit, filter_delay_limit }
  }
}
