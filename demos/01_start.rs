//! Bring-up example: wait out power-up, tune and enter run mode.
#![allow(unused)]
use embedded_hal::{
  delay::DelayNs,
  i2c::{I2c, SevenBitAddress},
};
use mpr121::{
  AddressAllocator, AutoConfig, Clock, Config, Debounce, ElectrodeSetup, Mpr121, ProximityMode, SampleInterval, Sampling,
};

#[allow(dead_code)]
fn run<I2C, C, E>(i2c: I2C, clock: C, delay: &mut impl DelayNs) -> Result<(), mpr121::Error<E>>
where
  I2C: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  let mut addresses = AddressAllocator::new();
  let config = Config::default()
    .with_all_thresholds(12, 6, true)
    .with_debounce(Debounce::new(1, 1))
    .with_sampling(Sampling::default().with_sample_interval(SampleInterval::Millis2))
    .with_electrodes(ElectrodeSetup::default().with_proximity(ProximityMode::Electrodes0To11))
    .with_auto_config(AutoConfig::new().with_supply_millivolts(3300));

  let mut dev = Mpr121::new(i2c, clock, addresses.allocate(None), config);
  dev.begin(delay);
  dev.start(12)?;

  if dev.out_of_range()?.auto_config_failed() {
    // electrodes are probably not connected
  }
  Ok(())
}

fn main() {}
