//! GPIO example: sense on four electrodes, drive LEDs from the rest.
#![allow(unused)]
use embedded_hal::i2c::{I2c, SevenBitAddress};
use mpr121::{Address, Clock, Config, GpioMode, Mpr121};

#[allow(dead_code)]
fn run<I2C, C, E>(i2c: I2C, clock: C) -> Result<(), mpr121::Error<E>>
where
  I2C: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  let mut dev = Mpr121::new(i2c, clock, Address::Vdd, Config::default());
  dev.start(4)?;

  dev.set_gpio_mode_range(4, 4, GpioMode::OutputOpenDrainHigh)?;
  dev.set_gpio_mode_range(8, 4, GpioMode::InputPullUp)?;

  loop {
    for electrode in 0..4 {
      let touched = dev.is_touched(electrode)?;
      dev.write_pwm(electrode + 4, if touched { 15 } else { 2 })?;
    }
    if !dev.gpio_input(8)? {
      dev.write_gpio_range(4, 4, false)?;
    }
  }
}

fn main() {}
