//! Polling example: touch state, filtered data and baselines.
#![allow(unused)]
use embedded_hal::i2c::{I2c, SevenBitAddress};
use mpr121::{Address, Clock, Config, Mpr121};

#[allow(dead_code)]
fn run<I2C, C, E>(i2c: I2C, clock: C) -> Result<(), mpr121::Error<E>>
where
  I2C: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  let mut dev = Mpr121::new(i2c, clock, Address::Gnd, Config::default());
  dev.start(12)?;

  loop {
    // one bus read for the whole bitmap
    let touched = dev.touch_status()?;
    for electrode in touched.iter() {
      let _ = electrode;
      // handle touch
    }

    // single queries within 500 µs share one read
    let _ = (dev.is_touched(0)?, dev.is_touched(1)?);

    let data = dev.filtered_data_range(0, 12)?;
    let _ = data;
    let baseline = dev.baseline(0)?;
    let _ = baseline;
  }
}

fn main() {}
