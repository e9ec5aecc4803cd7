use bitfield_struct::bitfield;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use super::FirstFilterIterations;
use crate::reg::Reg;
use crate::{Clock, Error, Mpr121};

/// Upper side limit for a 1.8 V supply, `(VDD - 0.7) / VDD * 256`.
pub const DEFAULT_UPPER_LIMIT: u8 = 156;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Push limits and both control registers (AN3889).
  ///
  /// The first filter iteration bits of control register 0 are owned by the
  /// AFE configuration, so they are taken from the value already programmed
  /// in 0x5C rather than from `auto`.
  pub(crate) fn write_auto_config(&mut self, auto: &AutoConfig) -> Result<(), Error<E>> {
    let ffi = self.programmed_first_filter_iterations()?;

    self.write_register(Reg::AutoConfigUsl, auto.upper_limit)?;
    self.write_register(Reg::AutoConfigLsl, auto.lower_limit)?;
    self.write_register(Reg::AutoConfigTl, auto.target_level)?;

    let control0 = AutoConfigControl0::new()
      .with_enable(auto.enable)
      .with_reconfig(auto.reconfig)
      .with_baseline_adjust(auto.baseline_adjust)
      .with_retry(auto.retry)
      .with_first_filter_iterations(ffi);
    let control1 = AutoConfigControl1::new()
      .with_fail_interrupt(auto.fail_interrupt)
      .with_reconfig_fail_interrupt(auto.reconfig_fail_interrupt)
      .with_out_of_range_interrupt(auto.out_of_range_interrupt)
      .with_skip_charge_time_search(auto.skip_charge_time_search);

    self.write_register(Reg::AutoConfigControl0, control0.into_bits())?;
    self.write_register(Reg::AutoConfigControl1, control1.into_bits())
  }
}

/// Automatic charge current/time search.
///
/// Limits are in units of 4 counts of the 10-bit electrode data. Any limit
/// left at zero is filled in on [`Mpr121::start`]: the upper limit falls back
/// to [`DEFAULT_UPPER_LIMIT`], the lower limit to 65% of the upper one and the
/// target level to 90% of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoConfig {
  pub upper_limit: u8,
  pub lower_limit: u8,
  pub target_level: u8,
  pub retry: AutoConfigRetry,
  pub baseline_adjust: BaselineAdjust,
  /// Auto-reconfiguration whenever an electrode goes out of range.
  pub reconfig: bool,
  /// Auto-configuration on entering run mode.
  pub enable: bool,
  /// Only search the charge current; use the programmed charge time.
  pub skip_charge_time_search: bool,
  pub out_of_range_interrupt: bool,
  pub reconfig_fail_interrupt: bool,
  pub fail_interrupt: bool,
}

impl AutoConfig {
  pub const fn new() -> Self {
    Self {
      upper_limit: 0,
      lower_limit: 0,
      target_level: 0,
      retry: AutoConfigRetry::Disabled,
      baseline_adjust: BaselineAdjust::SetClear3,
      reconfig: true,
      enable: true,
      skip_charge_time_search: false,
      out_of_range_interrupt: false,
      reconfig_fail_interrupt: false,
      fail_interrupt: false,
    }
  }

  pub const fn with_limits(mut self, upper: u8, lower: u8, target: u8) -> Self {
    self.upper_limit = upper;
    self.lower_limit = lower;
    self.target_level = target;
    self
  }

  /// Derive all three limits from the supply voltage in millivolts.
  ///
  /// Follows AN3889: `USL = (VDD - 0.7) / VDD * 256`, `LSL = USL * 0.65`,
  /// `TL = USL * 0.9`. Supplies at or below 0.7 V leave the limits at zero.
  pub const fn with_supply_millivolts(self, vdd: u16) -> Self {
    if vdd <= 700 {
      return self.with_limits(0, 0, 0);
    }
    let usl = ((vdd as u32 - 700) * 256 / vdd as u32) as u8;
    self.with_limits(usl, lower_limit_for(usl), target_level_for(usl))
  }

  pub const fn with_retry(mut self, retry: AutoConfigRetry) -> Self {
    self.retry = retry;
    self
  }

  pub const fn with_baseline_adjust(mut self, baseline_adjust: BaselineAdjust) -> Self {
    self.baseline_adjust = baseline_adjust;
    self
  }

  pub const fn with_enable(mut self, enable: bool, reconfig: bool) -> Self {
    self.enable = enable;
    self.reconfig = reconfig;
    self
  }

  pub const fn with_skip_charge_time_search(mut self, skip: bool) -> Self {
    self.skip_charge_time_search = skip;
    self
  }

  pub const fn with_interrupts(mut self, out_of_range: bool, reconfig_fail: bool, fail: bool) -> Self {
    self.out_of_range_interrupt = out_of_range;
    self.reconfig_fail_interrupt = reconfig_fail;
    self.fail_interrupt = fail;
    self
  }

  /// Replace zero limits with their fallbacks, upper limit first so the
  /// others derive from the final value.
  pub(crate) fn fill_defaults(&mut self) {
    if self.upper_limit == 0 {
      self.upper_limit = DEFAULT_UPPER_LIMIT;
    }
    if self.lower_limit == 0 {
      self.lower_limit = lower_limit_for(self.upper_limit);
    }
    if self.target_level == 0 {
      self.target_level = target_level_for(self.upper_limit);
    }
  }
}

impl Default for AutoConfig {
  fn default() -> Self {
    Self::new()
  }
}

const fn lower_limit_for(upper: u8) -> u8 {
  (upper as u16 * 65 / 100) as u8
}

const fn target_level_for(upper: u8) -> u8 {
  (upper as u16 * 90 / 100) as u8
}

/// Auto-configuration control register 0 (0x7B).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub(crate) struct AutoConfigControl0 {
  pub(crate) enable: bool,
  pub(crate) reconfig: bool,
  #[bits(2)]
  pub(crate) baseline_adjust: BaselineAdjust,
  #[bits(2)]
  pub(crate) retry: AutoConfigRetry,
  #[bits(2)]
  pub(crate) first_filter_iterations: FirstFilterIterations,
}

/// Auto-configuration control register 1 (0x7C).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub(crate) struct AutoConfigControl1 {
  pub(crate) fail_interrupt: bool,
  pub(crate) reconfig_fail_interrupt: bool,
  pub(crate) out_of_range_interrupt: bool,
  #[bits(4)]
  __: u8,
  pub(crate) skip_charge_time_search: bool,
}

/// Number of retries after a failed auto-configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AutoConfigRetry {
  Disabled = 0b00,
  Retry2 = 0b01,
  Retry4 = 0b10,
  Retry8 = 0b11,
}

impl AutoConfigRetry {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::Disabled,
      0b01 => Self::Retry2,
      0b10 => Self::Retry4,
      _ => Self::Retry8,
    }
  }
}

/// What happens to the baseline once auto-configuration succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaselineAdjust {
  /// Baseline is not changed.
  Unchanged = 0b00,
  /// Baseline is cleared.
  Cleared = 0b01,
  /// Baseline takes the 5 high bits of the electrode data, the rest cleared.
  SetClear3 = 0b10,
  /// Baseline takes all 10 bits of the electrode data.
  SetAll = 0b11,
}

impl BaselineAdjust {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::Unchanged,
      0b01 => Self::Cleared,
      0b10 => Self::SetClear3,
      _ => Self::SetAll,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::device;

  #[test]
  fn zero_limits_fall_back_to_1v8_values() {
    let mut auto = AutoConfig::new();
    auto.fill_defaults();
    assert_eq!((auto.upper_limit, auto.lower_limit, auto.target_level), (156, 101, 140));
  }

  #[test]
  fn fallbacks_derive_from_the_given_upper_limit() {
    let mut auto = AutoConfig::new().with_limits(200, 0, 0);
    auto.fill_defaults();
    assert_eq!((auto.upper_limit, auto.lower_limit, auto.target_level), (200, 130, 180));

    let mut auto = AutoConfig::new().with_limits(0, 90, 0);
    auto.fill_defaults();
    assert_eq!((auto.upper_limit, auto.lower_limit, auto.target_level), (156, 90, 140));
  }

  #[test]
  fn supply_voltage_limits() {
    let auto = AutoConfig::new().with_supply_millivolts(3300);
    assert_eq!((auto.upper_limit, auto.lower_limit, auto.target_level), (201, 130, 180));
    let auto = AutoConfig::new().with_supply_millivolts(1800);
    assert_eq!(auto.upper_limit, 156);
    assert_eq!(AutoConfig::new().with_supply_millivolts(500).upper_limit, 0);
  }

  #[test]
  fn control_bytes_keep_programmed_ffi() {
    let (mut dev, _) = device();
    dev.bus().regs[0x5C] = 0b10_010000;

    let auto = AutoConfig::new()
      .with_limits(150, 97, 135)
      .with_retry(AutoConfigRetry::Retry4)
      .with_skip_charge_time_search(true)
      .with_interrupts(true, false, true);
    dev.write_auto_config(&auto).unwrap();

    assert_eq!(dev.bus().regs[0x7D], 150);
    assert_eq!(dev.bus().regs[0x7E], 97);
    assert_eq!(dev.bus().regs[0x7F], 135);
    assert_eq!(dev.bus().regs[0x7B], 0b10_10_10_1_1);
    assert_eq!(dev.bus().regs[0x7C], 0b1000_0101);
  }
}
