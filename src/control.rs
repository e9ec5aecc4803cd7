use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::{debug, warn};

use crate::config::RUN_MODE_MASK;
use crate::reg::{Reg, SOFT_RESET_MAGIC};
use crate::{Clock, Error, Mpr121};

/// The MPR121 ignores the bus for this long after power-up.
const POWER_UP_MICROS: u32 = 5_000;
const POWER_UP_POLL_MS: u32 = 1;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Wait out the 5 ms start-up window.
  ///
  /// Returns immediately if the clock is already past it. Never waits more
  /// than 5 ms in total, so a clock that does not count from power-up only
  /// costs a short delay.
  pub fn begin(&mut self, delay: &mut impl DelayNs) {
    for _ in 0..POWER_UP_MICROS / 1_000 {
      if self.clock.micros() >= POWER_UP_MICROS {
        break;
      }
      delay.delay_ms(POWER_UP_POLL_MS);
    }
  }

  /// Push the staged configuration and enter run mode scanning `electrodes`
  /// electrodes (ELE0 up to `electrodes - 1`).
  ///
  /// The device is stopped first, since most registers can only be written
  /// in stop mode. The staged configuration is sanitized in place: narrow
  /// fields are masked and zero auto-configuration limits are replaced by
  /// their defaults. A latched over-current flag would keep the device out of
  /// run mode, so it is cleared before the final write.
  pub fn start(&mut self, electrodes: u8) -> Result<(), Error<E>> {
    self.stop()?;

    self.config.sanitize();
    let config = self.config;
    self.write_config(&config)?;

    if self.over_current()? {
      warn!("mpr121@{:#04x}: over-current flag latched, clearing before start", u8::from(self.address));
      self.clear_over_current()?;
    }

    self.write_electrode_config(&config.electrodes, electrodes)?;
    self.cache.clear();
    debug!("mpr121@{:#04x}: run mode with {} electrodes", u8::from(self.address), electrodes);
    Ok(())
  }

  /// Leave run mode.
  ///
  /// Clears the electrode and proximity enable bits and keeps the
  /// calibration lock bits.
  pub fn stop(&mut self) -> Result<(), Error<E>> {
    debug!("mpr121@{:#04x}: stop mode", u8::from(self.address));
    self.modify_register(Reg::ElectrodeConfig, |ecr| ecr & !RUN_MODE_MASK)
  }

  /// Whether any electrode or the proximity channel is being scanned.
  pub fn is_running(&mut self) -> Result<bool, Error<E>> {
    Ok(self.read_electrode_config()?.is_running())
  }

  /// Reset every register to its power-on value.
  pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
    debug!("mpr121@{:#04x}: soft reset", u8::from(self.address));
    self.cache.clear();
    self.write_register(Reg::SoftReset, SOFT_RESET_MAGIC)
  }
}
