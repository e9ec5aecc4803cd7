use crate::reg::{CHANNELS, FIRST_GPIO_PIN, GPIO_PINS};

/// A validated run of consecutive channels.
///
/// `start` is zero-based within the bank the run was checked against:
/// electrode number for [`Run::electrodes`], GPIO index (pin - 4) for
/// [`Run::gpio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
  pub(crate) start: u8,
  pub(crate) len: u8,
}

impl Run {
  /// Check a run of electrodes (0..=12, where 12 is ELEPROX).
  ///
  /// Returns `None` when `electrode` itself is out of range. Otherwise `len`
  /// is clamped so the run ends at the last channel.
  pub(crate) const fn electrodes(electrode: u8, len: u8) -> Option<Run> {
    Self::clamped(electrode, len, CHANNELS as u8)
  }

  /// Check a run of GPIO-capable pins (4..=11).
  pub(crate) const fn gpio(pin: u8, len: u8) -> Option<Run> {
    if pin < FIRST_GPIO_PIN {
      return None;
    }
    Self::clamped(pin - FIRST_GPIO_PIN, len, GPIO_PINS as u8)
  }

  const fn clamped(start: u8, len: u8, limit: u8) -> Option<Run> {
    if start >= limit {
      return None;
    }
    let room = limit - start;
    Some(Run { start, len: if len > room { room } else { len } })
  }

  pub(crate) const fn end(&self) -> u8 {
    self.start + self.len
  }

  pub(crate) fn indices(&self) -> core::ops::Range<u8> {
    self.start..self.end()
  }

  /// Bit mask with one bit per index in the run (GPIO registers).
  pub(crate) const fn mask(&self) -> u8 {
    (((1u16 << self.len) - 1) << self.start) as u8
  }
}
