use bitfield_struct::bitfield;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use super::auto_config::AutoConfigControl0;
use crate::reg::Reg;
use crate::{Clock, Error, Mpr121};

pub(crate) const CHARGE_CURRENT_MASK: u8 = 0b0011_1111;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Push the global filter and charge settings (AN3890).
  ///
  /// The first filter iteration count also lives in the top two bits of the
  /// auto-configuration control register, so that register is patched in
  /// place with the rest of its bits preserved.
  pub(crate) fn write_sampling(&mut self, sampling: &Sampling) -> Result<(), Error<E>> {
    let afe = AfeConfig::new()
      .with_charge_current(sampling.charge_current & CHARGE_CURRENT_MASK)
      .with_first_filter_iterations(sampling.first_filter_iterations);
    let filter = FilterConfig::new()
      .with_sample_interval(sampling.sample_interval)
      .with_second_filter_iterations(sampling.second_filter_iterations)
      .with_charge_time(sampling.charge_time);

    self.write_register(Reg::AFE_CONFIG, afe.into_bits())?;
    self.write_register(Reg::FILTER_CONFIG, filter.into_bits())?;

    let ffi = sampling.first_filter_iterations;
    self.modify_register(Reg::AutoConfigControl0, |v| {
      AutoConfigControl0::from_bits(v).with_first_filter_iterations(ffi).into_bits()
    })
  }

  /// First filter iteration count currently programmed in the AFE register.
  pub(crate) fn programmed_first_filter_iterations(&mut self) -> Result<FirstFilterIterations, Error<E>> {
    let afe = AfeConfig::from_bits(self.read_register(Reg::AFE_CONFIG)?);
    Ok(afe.first_filter_iterations())
  }
}

/// Global sampling parameters of the analog front end.
///
/// Response time is `second_filter_iterations * sample_interval`. The global
/// charge current and time are only used for electrodes that are not
/// auto-configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sampling {
  pub first_filter_iterations: FirstFilterIterations,
  /// Global charge-discharge current in µA. Max value is 63.
  pub charge_current: u8,
  pub charge_time: ChargeTime,
  pub second_filter_iterations: SecondFilterIterations,
  pub sample_interval: SampleInterval,
}

impl Sampling {
  pub const fn new(
    first_filter_iterations: FirstFilterIterations,
    charge_current: u8,
    charge_time: ChargeTime,
    second_filter_iterations: SecondFilterIterations,
    sample_interval: SampleInterval,
  ) -> Self {
    Self { first_filter_iterations, charge_current, charge_time, second_filter_iterations, sample_interval }
  }

  pub const fn with_filter_iterations(mut self, first: FirstFilterIterations, second: SecondFilterIterations) -> Self {
    self.first_filter_iterations = first;
    self.second_filter_iterations = second;
    self
  }

  pub const fn with_charge(mut self, current: u8, time: ChargeTime) -> Self {
    self.charge_current = current;
    self.charge_time = time;
    self
  }

  pub const fn with_sample_interval(mut self, interval: SampleInterval) -> Self {
    self.sample_interval = interval;
    self
  }

  pub(crate) fn mask(&mut self) {
    self.charge_current &= CHARGE_CURRENT_MASK;
  }

  const fn default() -> Self {
    // 4 samples every 1 ms: 4 ms response time
    Self::new(
      FirstFilterIterations::Samples6,
      16,
      ChargeTime::Micros0_5,
      SecondFilterIterations::Samples4,
      SampleInterval::Millis1,
    )
  }
}

impl Default for Sampling {
  fn default() -> Self {
    Self::default()
  }
}

/// AFE configuration register (0x5C).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub(crate) struct AfeConfig {
  #[bits(6)]
  charge_current: u8,
  #[bits(2)]
  first_filter_iterations: FirstFilterIterations,
}

/// Filter configuration register (0x5D).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub(crate) struct FilterConfig {
  #[bits(3)]
  sample_interval: SampleInterval,
  #[bits(2)]
  second_filter_iterations: SecondFilterIterations,
  #[bits(3)]
  charge_time: ChargeTime,
}

/// Number of samples taken by the first filter level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirstFilterIterations {
  Samples6 = 0b00,
  Samples10 = 0b01,
  Samples18 = 0b10,
  Samples34 = 0b11,
}

impl FirstFilterIterations {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::Samples6,
      0b01 => Self::Samples10,
      0b10 => Self::Samples18,
      _ => Self::Samples34,
    }
  }
}

/// Charge-discharge time, globally or per electrode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeTime {
  /// Charging disabled; per-electrode values fall back to the global time.
  Disabled = 0b000,
  Micros0_5 = 0b001,
  Micros1 = 0b010,
  Micros2 = 0b011,
  Micros4 = 0b100,
  Micros8 = 0b101,
  Micros16 = 0b110,
  Micros32 = 0b111,
}

impl ChargeTime {
  pub const ALL: [ChargeTime; 8] = [
    Self::Disabled,
    Self::Micros0_5,
    Self::Micros1,
    Self::Micros2,
    Self::Micros4,
    Self::Micros8,
    Self::Micros16,
    Self::Micros32,
  ];

  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    Self::ALL[(bits & 0b111) as usize]
  }
}

/// Number of samples taken by the second filter level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SecondFilterIterations {
  Samples4 = 0b00,
  Samples6 = 0b01,
  Samples10 = 0b10,
  Samples18 = 0b11,
}

impl SecondFilterIterations {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::Samples4,
      0b01 => Self::Samples6,
      0b10 => Self::Samples10,
      _ => Self::Samples18,
    }
  }
}

/// Electrode sample interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleInterval {
  Millis1 = 0b000,
  Millis2 = 0b001,
  Millis4 = 0b010,
  Millis8 = 0b011,
  Millis16 = 0b100,
  Millis32 = 0b101,
  Millis64 = 0b110,
  Millis128 = 0b111,
}

impl SampleInterval {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b111 {
      0b000 => Self::Millis1,
      0b001 => Self::Millis2,
      0b010 => Self::Millis4,
      0b011 => Self::Millis8,
      0b100 => Self::Millis16,
      0b101 => Self::Millis32,
      0b110 => Self::Millis64,
      _ => Self::Millis128,
    }
  }

  pub const fn millis(self) -> u8 {
    1 << self.into_bits()
  }
}
