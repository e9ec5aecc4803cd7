#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Blocking, `no_std` driver for the NXP MPR121 capacitive touch sensor
//! controller.
//!
//! The MPR121 scans twelve electrodes plus a synthetic proximity channel
//! (ELEPROX) and reports touch/release state, filtered analog data and
//! baselines. Electrodes 4 through 11 can be repurposed as GPIO with PWM. This
//! crate exposes a typed API on top of the raw register map, with helpers for:
//!
//! - Staging every tuning knob in a plain [`Config`] and pushing it to the
//!   device in the order recommended by AN3944 when entering run mode
//! - Decoding the packed status, filtered-data and charge-time registers into
//!   per-electrode values
//! - Cheap repeated single-electrode polls through a short-lived touch cache
//! - Configuring GPIO/PWM on the electrode pins that are not used for sensing
//! - Using the `embedded-hal` 1.0 blocking traits so the driver works across
//!   MCU families
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::i2c::{I2c, SevenBitAddress};
//! use mpr121::{AddressAllocator, Clock, Config, Mpr121};
//!
//! fn example<I2C, E, C: Clock>(i2c: I2C, clock: C, delay: &mut impl DelayNs) -> Result<(), mpr121::Error<E>>
//! where
//!   I2C: I2c<SevenBitAddress, Error = E>,
//! {
//!   let mut addresses = AddressAllocator::new();
//!   let config = Config::default().with_all_thresholds(12, 6, false);
//!
//!   let mut sensor = Mpr121::new(i2c, clock, addresses.allocate(None), config);
//!   sensor.begin(delay);
//!   sensor.start(12)?;
//!
//!   if sensor.is_touched(3)? {
//!     // ...
//!   }
//!   Ok(())
//! }
//! ```
mod address;
mod bounds;
mod clock;
mod config;
mod control;
mod data;
mod gpio;
mod reg;
mod rw;
mod status;
#[cfg(test)]
mod testing;

use embedded_hal::i2c::{I2c, SevenBitAddress};

pub use address::*;
pub use clock::Clock;
pub use config::*;
pub use gpio::GpioMode;
pub use reg::{CHANNELS, FIRST_GPIO_PIN, GPIO_PINS};
pub use status::{ElectrodeSet, OutOfRange};

use data::Readings;
use status::TouchCache;

/// Errors that can occur while interacting with the controller.
///
/// Only transport failures are reported. Out-of-range electrode or pin
/// numbers, over-long runs and over-wide configuration values are absorbed by
/// the driver (no-op, clamp or mask respectively).
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// I²C bus transaction failed with the underlying driver error.
  I2c(E),
}

/// Driver for a single MPR121.
///
/// The driver owns the I²C peripheral, a microsecond [`Clock`] used by the
/// touch cache and the staged [`Config`]. Create an instance with
/// [`Mpr121::new`], adjust the configuration if needed and call
/// [`Mpr121::start`] to push it to the device and enter run mode.
pub struct Mpr121<I, C> {
  i2c: I,
  clock: C,
  address: Address,
  config: Config,
  cache: TouchCache,
  readings: Readings,
}

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Create a new driver instance for the sensor at `address`.
  ///
  /// Nothing is sent to the device until [`Mpr121::start`] (or one of the
  /// direct register helpers) is called, so the configuration can still be
  /// adjusted through [`Mpr121::config_mut`].
  pub fn new(i2c: I, clock: C, address: Address, config: Config) -> Self {
    Self { i2c, clock, address, config, cache: TouchCache::new(), readings: Readings::new() }
  }

  /// The bus address this instance talks to.
  pub fn address(&self) -> Address {
    self.address
  }

  /// Staged configuration.
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Mutable access to the staged configuration.
  ///
  /// Changes only reach the device on the next [`Mpr121::start`].
  pub fn config_mut(&mut self) -> &mut Config {
    &mut self.config
  }

  /// Consume the driver and hand back the bus and clock.
  ///
  /// Device registers are left untouched.
  pub fn release(self) -> (I, C) {
    (self.i2c, self.clock)
  }
}
