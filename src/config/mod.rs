use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::reg::CHANNELS;
use crate::{Clock, Error, Mpr121};

mod auto_config;
mod baseline;
mod electrode;
mod sampling;
mod thresholds;

pub use auto_config::{AutoConfig, AutoConfigRetry, BaselineAdjust, DEFAULT_UPPER_LIMIT};
pub use baseline::{BaselineFilter, FilterStage, TouchedStage};
pub use electrode::{CalibrationLock, ElectrodeSetup, ProximityMode};
pub use sampling::{ChargeTime, FirstFilterIterations, SampleInterval, Sampling, SecondFilterIterations};
pub use thresholds::{Debounce, Thresholds};

pub(crate) use baseline::FilterBank;
pub(crate) use electrode::RUN_MODE_MASK;
pub(crate) use sampling::CHARGE_CURRENT_MASK;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Push every configuration group except the electrode configuration
  /// register, in the AN3944 quick start order.
  pub(crate) fn write_config(&mut self, config: &Config) -> Result<(), Error<E>> {
    self.write_baseline_filter(FilterBank::Electrodes, &config.baseline)?;
    self.write_baseline_filter(FilterBank::Proximity, &config.proximity_baseline)?;
    self.write_thresholds(&config.thresholds)?;
    self.write_debounce(&config.debounce)?;
    self.write_sampling(&config.sampling)?;
    self.write_auto_config(&config.auto_config)
  }
}

/// Complete sensor configuration, applied by [`Mpr121::start`].
///
/// Every field is plain data and can be changed at any time through
/// [`Mpr121::config_mut`]. Values wider than their register field are
/// masked when pushed, not when set.
///
/// # Example
/// ```no_run
/// use mpr121::{AutoConfig, Config, Debounce, ElectrodeSetup, ProximityMode, Sampling, SampleInterval};
///
/// let config = Config::default()
///   .with_all_thresholds(10, 5, true)
///   .with_debounce(Debounce::new(2, 1))
///   .with_sampling(Sampling::default().with_sample_interval(SampleInterval::Millis4))
///   .with_electrodes(ElectrodeSetup::default().with_proximity(ProximityMode::Electrodes0To11))
///   .with_auto_config(AutoConfig::new().with_supply_millivolts(3300));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  pub thresholds: Thresholds,
  pub debounce: Debounce,
  pub baseline: BaselineFilter,
  pub proximity_baseline: BaselineFilter,
  pub sampling: Sampling,
  pub electrodes: ElectrodeSetup,
  pub auto_config: AutoConfig,
}

impl Config {
  pub const fn new(
    thresholds: Thresholds,
    debounce: Debounce,
    baseline: BaselineFilter,
    proximity_baseline: BaselineFilter,
    sampling: Sampling,
    electrodes: ElectrodeSetup,
    auto_config: AutoConfig,
  ) -> Self {
    Self { thresholds, debounce, baseline, proximity_baseline, sampling, electrodes, auto_config }
  }

  pub const fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
    self.thresholds = thresholds;
    self
  }

  /// Same touch/release pair on all twelve electrodes, and on ELEPROX too if
  /// `include_proximity` is set.
  pub const fn with_all_thresholds(mut self, touch: u8, release: u8, include_proximity: bool) -> Self {
    let count = if include_proximity { CHANNELS } else { CHANNELS - 1 };
    self.thresholds = self.thresholds.with_range(0, count as u8, touch, release);
    self
  }

  pub const fn with_debounce(mut self, debounce: Debounce) -> Self {
    self.debounce = debounce;
    self
  }

  pub const fn with_baseline(mut self, baseline: BaselineFilter) -> Self {
    self.baseline = baseline;
    self
  }

  pub const fn with_proximity_baseline(mut self, baseline: BaselineFilter) -> Self {
    self.proximity_baseline = baseline;
    self
  }

  pub const fn with_sampling(mut self, sampling: Sampling) -> Self {
    self.sampling = sampling;
    self
  }

  pub const fn with_electrodes(mut self, electrodes: ElectrodeSetup) -> Self {
    self.electrodes = electrodes;
    self
  }

  pub const fn with_auto_config(mut self, auto_config: AutoConfig) -> Self {
    self.auto_config = auto_config;
    self
  }

  /// Mask every narrow field to its register width and fill in zero
  /// auto-configuration limits.
  pub(crate) fn sanitize(&mut self) {
    self.baseline.mask();
    self.proximity_baseline.mask();
    self.debounce.mask();
    self.sampling.mask();
    self.auto_config.fill_defaults();
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new(
      Thresholds::default(),
      Debounce::default(),
      BaselineFilter::electrodes(),
      BaselineFilter::proximity(),
      Sampling::default(),
      ElectrodeSetup::default(),
      AutoConfig::default(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::device;

  #[test]
  fn all_thresholds_can_skip_proximity() {
    let config = Config::default().with_all_thresholds(20, 8, false);
    assert_eq!(config.thresholds.get(11), (20, 8));
    assert_eq!(config.thresholds.get(12), (0x0F, 0x0A));

    let config = Config::default().with_all_thresholds(20, 8, true);
    assert_eq!(config.thresholds.get(12), (20, 8));
  }

  #[test]
  fn sanitize_masks_in_place() {
    let mut config = Config::default()
      .with_debounce(Debounce::new(9, 15))
      .with_sampling(Sampling::default().with_charge(0x50, ChargeTime::Micros1));
    config.baseline.rising.max_half_delta = 0x41;
    config.proximity_baseline.touched.noise_half_delta = 0xFF;
    config.sanitize();

    assert_eq!(config.debounce, Debounce::new(1, 7));
    assert_eq!(config.sampling.charge_current, 0x10);
    assert_eq!(config.baseline.rising.max_half_delta, 0x01);
    assert_eq!(config.proximity_baseline.touched.noise_half_delta, 0x3F);
    assert_eq!(config.auto_config.upper_limit, DEFAULT_UPPER_LIMIT);
  }

  #[test]
  fn groups_are_pushed_in_quick_start_order() {
    let (mut dev, _) = device();
    let config = Config::default();
    dev.write_config(&config).unwrap();

    let regs: std::vec::Vec<u8> = dev.bus().writes.iter().map(|w| w.0).collect();
    let first = |reg: u8| regs.iter().position(|&r| r == reg).unwrap();
    assert!(first(0x2B) < first(0x36));
    assert!(first(0x40) < first(0x41));
    assert!(first(0x5A) < first(0x5B));
    assert!(first(0x5B) < first(0x5C));
    assert!(first(0x5D) < first(0x7D));
    assert_eq!(*regs.last().unwrap(), 0x7C);
    assert!(!regs.contains(&0x5E));
  }
}
