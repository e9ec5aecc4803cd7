use bitfield_struct::bitfield;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::bounds::Run;
use crate::reg::{Reg, CHANNELS};
use crate::{Clock, Error, Mpr121};

const DEBOUNCE_MASK: u8 = 0b111;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Write touch and release thresholds for every channel (AN3892).
  pub(crate) fn write_thresholds(&mut self, thresholds: &Thresholds) -> Result<(), Error<E>> {
    for channel in 0..CHANNELS as u8 {
      let (touch, release) = thresholds.get(channel);
      self.write_register(Reg::Ele0TouchThreshold.offset(channel * 2), touch)?;
      self.write_register(Reg::Ele0ReleaseThreshold.offset(channel * 2), release)?;
    }
    Ok(())
  }

  pub(crate) fn write_debounce(&mut self, debounce: &Debounce) -> Result<(), Error<E>> {
    let reg = DebounceReg::new()
      .with_release(debounce.release & DEBOUNCE_MASK)
      .with_touch(debounce.touch & DEBOUNCE_MASK);
    self.write_register(Reg::Debounce, reg.into_bits())
  }
}

/// Touch and release thresholds for the 12 electrodes and ELEPROX.
///
/// A channel reports touch once its data drops `touch` counts below the
/// baseline and releases when it comes back within `release` counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
  pub touch: [u8; CHANNELS],
  pub release: [u8; CHANNELS],
}

impl Thresholds {
  pub const fn uniform(touch: u8, release: u8) -> Self {
    Self { touch: [touch; CHANNELS], release: [release; CHANNELS] }
  }

  /// Set `count` channels starting at `electrode`.
  ///
  /// Does nothing if `electrode` is past ELEPROX (12); a run that would go
  /// past it is cut short.
  pub const fn with_range(mut self, electrode: u8, count: u8, touch: u8, release: u8) -> Self {
    let Some(run) = Run::electrodes(electrode, count) else {
      return self;
    };
    let mut i = run.start as usize;
    while i < run.end() as usize {
      self.touch[i] = touch;
      self.release[i] = release;
      i += 1;
    }
    self
  }

  pub const fn with(self, electrode: u8, touch: u8, release: u8) -> Self {
    self.with_range(electrode, 1, touch, release)
  }

  /// `(touch, release)` for one channel, zero for an invalid index.
  pub const fn get(&self, electrode: u8) -> (u8, u8) {
    match Run::electrodes(electrode, 1) {
      Some(run) => (self.touch[run.start as usize], self.release[run.start as usize]),
      None => (0, 0),
    }
  }
}

impl Default for Thresholds {
  fn default() -> Self {
    Self::uniform(0x0F, 0x0A)
  }
}

/// Consecutive samples needed before the status register changes. Max 7.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debounce {
  pub touch: u8,
  pub release: u8,
}

impl Debounce {
  pub const fn new(touch: u8, release: u8) -> Self {
    Self { touch, release }
  }

  pub(crate) fn mask(&mut self) {
    self.touch &= DEBOUNCE_MASK;
    self.release &= DEBOUNCE_MASK;
  }
}

/// Debounce register (0x5B).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
struct DebounceReg {
  #[bits(3)]
  release: u8,
  #[bits(1)]
  __: u8,
  #[bits(3)]
  touch: u8,
  #[bits(1)]
  ___: u8,
}
