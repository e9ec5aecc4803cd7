use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::debug;

use crate::bounds::Run;
use crate::reg::Reg;
use crate::rw::{apply_mask, get_nibble};
use crate::{Clock, Error, Mpr121};

const MODE_ENABLE: u8 = 0b1000;
const MODE_DIRECTION: u8 = 0b0100;
const MODE_CONTROL0: u8 = 0b0010;
const MODE_CONTROL1: u8 = 0b0001;

const PWM_DUTY_MASK: u8 = 0x0F;

/// Configuration of an electrode pin (4..=11) used as GPIO.
///
/// The discriminant packs the enable, direction, control 0 and control 1
/// register bits, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioMode {
  Disabled = 0b0000,
  Input = 0b1000,
  InputPullDown = 0b1010,
  InputPullUp = 0b1011,
  Output = 0b1100,
  /// Open drain, can only sink current.
  OutputOpenDrainLow = 0b1110,
  /// Open drain, can only source current. Drives LEDs directly (up to 12 mA).
  OutputOpenDrainHigh = 0b1111,
}

impl GpioMode {
  pub const fn into_bits(self) -> u8 {
    self as u8
  }

  pub const fn enabled(self) -> bool {
    self.into_bits() & MODE_ENABLE != 0
  }

  pub const fn is_output(self) -> bool {
    self.into_bits() & MODE_DIRECTION != 0
  }

  const fn control0(self) -> bool {
    self.into_bits() & MODE_CONTROL0 != 0
  }

  const fn control1(self) -> bool {
    self.into_bits() & MODE_CONTROL1 != 0
  }
}

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Configure `count` GPIO pins starting at `pin` (AN3894).
  ///
  /// The affected pins are disabled while their direction and control bits
  /// change, then re-enabled. Disabling stops after the first write. Pins
  /// outside 4..=11 are ignored.
  pub fn set_gpio_mode_range(&mut self, pin: u8, count: u8, mode: GpioMode) -> Result<(), Error<E>> {
    let Some(run) = Run::gpio(pin, count) else {
      return Ok(());
    };
    let mask = run.mask();
    debug!("mpr121@{:#04x}: gpio mask {:#010b} -> {:?}", u8::from(self.address), mask, mode);

    let mut enable = self.read_register(Reg::GpioEnable)?;
    enable &= !mask;
    self.write_register(Reg::GpioEnable, enable)?;

    if mode == GpioMode::Disabled {
      return Ok(());
    }

    self.write_register_bits(Reg::GpioDirection, mask, mode.is_output())?;
    self.write_register_bits(Reg::GpioControl0, mask, mode.control0())?;
    self.write_register_bits(Reg::GpioControl1, mask, mode.control1())?;

    self.write_register(Reg::GpioEnable, apply_mask(enable, mask, mode.enabled()))
  }

  pub fn set_gpio_mode(&mut self, pin: u8, mode: GpioMode) -> Result<(), Error<E>> {
    self.set_gpio_mode_range(pin, 1, mode)
  }

  /// Drive `count` output pins starting at `pin` high or low.
  ///
  /// PWM is switched off on those pins first.
  pub fn write_gpio_range(&mut self, pin: u8, count: u8, high: bool) -> Result<(), Error<E>> {
    let Some(run) = Run::gpio(pin, count) else {
      return Ok(());
    };
    self.set_pwm(run, 0)?;
    let reg = if high { Reg::GpioDataSet } else { Reg::GpioDataClear };
    self.write_register(reg, run.mask())
  }

  pub fn write_gpio(&mut self, pin: u8, high: bool) -> Result<(), Error<E>> {
    self.write_gpio_range(pin, 1, high)
  }

  /// Flip the level of `count` output pins starting at `pin`.
  pub fn toggle_gpio_range(&mut self, pin: u8, count: u8) -> Result<(), Error<E>> {
    let Some(run) = Run::gpio(pin, count) else {
      return Ok(());
    };
    self.write_register(Reg::GpioDataToggle, run.mask())
  }

  pub fn toggle_gpio(&mut self, pin: u8) -> Result<(), Error<E>> {
    self.toggle_gpio_range(pin, 1)
  }

  /// Run PWM on `count` output pins starting at `pin` with a duty of
  /// `duty / 15`. Max value is 15; zero drives the pins low.
  ///
  /// Pin 9 only outputs PWM while pin 10 also has its data bit set.
  pub fn write_pwm_range(&mut self, pin: u8, count: u8, duty: u8) -> Result<(), Error<E>> {
    let Some(run) = Run::gpio(pin, count) else {
      return Ok(());
    };
    let duty = duty & PWM_DUTY_MASK;
    self.set_pwm(run, duty)?;
    let reg = if duty == 0 { Reg::GpioDataClear } else { Reg::GpioDataSet };
    self.write_register(reg, run.mask())
  }

  pub fn write_pwm(&mut self, pin: u8, duty: u8) -> Result<(), Error<E>> {
    self.write_pwm_range(pin, 1, duty)
  }

  /// PWM duty currently programmed for a GPIO pin, 0 for an invalid pin.
  pub fn pwm(&mut self, pin: u8) -> Result<u8, Error<E>> {
    let Some(run) = Run::gpio(pin, 1) else {
      return Ok(0);
    };
    let byte = self.read_register(Reg::PwmDuty0.offset(run.start / 2))?;
    Ok(get_nibble(byte, run.start))
  }

  fn set_pwm(&mut self, run: Run, duty: u8) -> Result<(), Error<E>> {
    self.write_nibbles(Reg::PwmDuty0.into(), run.start, run.len, duty)
  }
}
