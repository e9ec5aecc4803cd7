use bitfield_struct::bitfield;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::reg::Reg;
use crate::{Clock, Error, Mpr121};

/// Electrode-count plus proximity bits of the electrode configuration register.
pub(crate) const RUN_MODE_MASK: u8 = 0b0011_1111;
const ELECTRODE_COUNT_MASK: u8 = 0b0000_1111;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Write the electrode configuration register.
  ///
  /// A non-zero electrode count here is what puts the device in run mode.
  /// Counts of 12 and above all scan the twelve electrodes.
  pub(crate) fn write_electrode_config(&mut self, setup: &ElectrodeSetup, electrodes: u8) -> Result<(), Error<E>> {
    let ecr = ElectrodeConfig::new()
      .with_electrodes(electrodes & ELECTRODE_COUNT_MASK)
      .with_proximity(setup.proximity)
      .with_calibration_lock(setup.calibration_lock);
    self.write_register(Reg::ElectrodeConfig, ecr.into_bits())
  }

  pub(crate) fn read_electrode_config(&mut self) -> Result<ElectrodeConfig, Error<E>> {
    Ok(ElectrodeConfig::from_bits(self.read_register(Reg::ElectrodeConfig)?))
  }
}

/// Calibration lock and proximity grouping applied when entering run mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElectrodeSetup {
  pub calibration_lock: CalibrationLock,
  pub proximity: ProximityMode,
}

impl ElectrodeSetup {
  pub const fn new(calibration_lock: CalibrationLock, proximity: ProximityMode) -> Self {
    Self { calibration_lock, proximity }
  }

  pub const fn with_calibration_lock(mut self, calibration_lock: CalibrationLock) -> Self {
    self.calibration_lock = calibration_lock;
    self
  }

  pub const fn with_proximity(mut self, proximity: ProximityMode) -> Self {
    self.proximity = proximity;
    self
  }
}

/// Electrode configuration register (0x5E).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub(crate) struct ElectrodeConfig {
  /// Number of electrodes scanned, starting at ELE0.
  #[bits(4)]
  pub(crate) electrodes: u8,
  #[bits(2)]
  pub(crate) proximity: ProximityMode,
  #[bits(2)]
  pub(crate) calibration_lock: CalibrationLock,
}

impl ElectrodeConfig {
  pub(crate) const fn is_running(&self) -> bool {
    self.into_bits() & RUN_MODE_MASK != 0
  }
}

/// Baseline tracking behaviour on entering run mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationLock {
  /// Baseline tracking enabled, initial value is the current baseline register.
  #[default]
  TrackingEnabled = 0b00,
  /// Baseline tracking disabled.
  TrackingDisabled = 0b01,
  /// Load the 5 high bits of the first electrode data into the baseline.
  Load5Bits = 0b10,
  /// Load all 10 bits of the first electrode data into the baseline.
  Load10Bits = 0b11,
}

impl CalibrationLock {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::TrackingEnabled,
      0b01 => Self::TrackingDisabled,
      0b10 => Self::Load5Bits,
      _ => Self::Load10Bits,
    }
  }
}

/// Which electrodes are combined into the ELEPROX channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProximityMode {
  #[default]
  Disabled = 0b00,
  Electrodes0To1 = 0b01,
  Electrodes0To3 = 0b10,
  Electrodes0To11 = 0b11,
}

impl ProximityMode {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::Disabled,
      0b01 => Self::Electrodes0To1,
      0b10 => Self::Electrodes0To3,
      _ => Self::Electrodes0To11,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::device;

  #[test]
  fn packs_lock_proximity_and_count() {
    let (mut dev, _) = device();
    let setup = ElectrodeSetup::new(CalibrationLock::Load5Bits, ProximityMode::Electrodes0To3);
    dev.write_electrode_config(&setup, 12).unwrap();
    assert_eq!(dev.bus().regs[0x5E], 0b10_10_1100);

    let ecr = dev.read_electrode_config().unwrap();
    assert_eq!(ecr.calibration_lock(), CalibrationLock::Load5Bits);
    assert_eq!(ecr.proximity(), ProximityMode::Electrodes0To3);
    assert_eq!(ecr.electrodes(), 12);
    assert!(ecr.is_running());
  }

  #[test]
  fn electrode_count_is_masked_to_four_bits() {
    let (mut dev, _) = device();
    dev.write_electrode_config(&ElectrodeSetup::default(), 0x1D).unwrap();
    assert_eq!(dev.bus().regs[0x5E], 0x0D);
  }

  #[test]
  fn proximity_alone_counts_as_running() {
    let ecr = ElectrodeConfig::new().with_proximity(ProximityMode::Electrodes0To1);
    assert!(ecr.is_running());
    let ecr = ElectrodeConfig::new().with_calibration_lock(CalibrationLock::Load10Bits);
    assert!(!ecr.is_running());
  }
}
