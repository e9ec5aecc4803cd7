use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::debug;

use crate::bounds::Run;
use crate::reg::{Reg, CHANNELS};
use crate::{Clock, Error, Mpr121};

mod cache;

pub(crate) use cache::TouchCache;

const ELECTRODE_BITS: u16 = (1 << CHANNELS) - 1;
const HIGH_CHANNELS: u8 = 0b0001_1111;
const OVER_CURRENT: u8 = 0b1000_0000;
const AUTO_CONFIG_FAIL: u8 = 0b1000_0000;
const AUTO_RECONFIG_FAIL: u8 = 0b0100_0000;

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Read the touch state of all 13 channels.
  ///
  /// GPIO pins configured as inputs report their level through the same bits.
  pub fn touch_status(&mut self) -> Result<ElectrodeSet, Error<E>> {
    let raw = self.read_registers(Reg::TouchStatus0, 2)?;
    Ok(ElectrodeSet::decode(raw[0], raw[1]))
  }

  /// Touch state of one electrode (0..=12).
  ///
  /// Repeated calls within 500 µs are answered from the bitmap read by the
  /// first one, so polling every electrode in a loop costs a single bus
  /// transaction. Out-of-range electrodes read as untouched.
  pub fn is_touched(&mut self, electrode: u8) -> Result<bool, Error<E>> {
    if Run::electrodes(electrode, 1).is_none() {
      return Ok(false);
    }

    let now = self.clock.micros();
    let touched = match self.cache.get(now) {
      Some(touched) => touched,
      None => {
        let touched = self.touch_status()?;
        self.cache.store(touched, now);
        touched
      }
    };

    Ok(touched.contains(electrode))
  }

  /// Level of a GPIO pin (4..=11) configured as an input.
  ///
  /// Shares the touch cache with [`Mpr121::is_touched`]. Pins outside the GPIO
  /// range read as low.
  pub fn gpio_input(&mut self, pin: u8) -> Result<bool, Error<E>> {
    if Run::gpio(pin, 1).is_none() {
      return Ok(false);
    }
    self.is_touched(pin)
  }

  /// Drop the cached touch bitmap so the next single-electrode query hits the
  /// bus.
  pub fn invalidate_touch_cache(&mut self) {
    self.cache.clear();
  }

  /// Read the out-of-range flags of all channels plus the two auto-config
  /// failure flags.
  pub fn out_of_range(&mut self) -> Result<OutOfRange, Error<E>> {
    let raw = self.read_registers(Reg::OorStatus0, 2)?;
    Ok(OutOfRange::decode(raw[0], raw[1]))
  }

  /// Over-current flag on the REXT pin (OVCF).
  ///
  /// A latched flag keeps the device from entering run mode.
  pub fn over_current(&mut self) -> Result<bool, Error<E>> {
    Ok(self.read_register(Reg::TouchStatus1)? & OVER_CURRENT != 0)
  }

  /// Clear the over-current flag.
  ///
  /// OVCF is write-1-to-clear and the rest of the register is read-only, so
  /// this is a plain write rather than a read-modify-write.
  pub fn clear_over_current(&mut self) -> Result<(), Error<E>> {
    debug!("mpr121@{:#04x}: clearing over-current flag", u8::from(self.address));
    self.write_register(Reg::TouchStatus1, OVER_CURRENT)
  }
}

/// Per-channel bitmap: bit `n` is electrode `n`, bit 12 is ELEPROX.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElectrodeSet(u16);

impl ElectrodeSet {
  pub const fn from_bits(bits: u16) -> Self {
    Self(bits & ELECTRODE_BITS)
  }

  pub(crate) const fn decode(low: u8, high: u8) -> Self {
    Self(low as u16 | ((high & HIGH_CHANNELS) as u16) << 8)
  }

  pub const fn bits(&self) -> u16 {
    self.0
  }

  pub const fn contains(&self, electrode: u8) -> bool {
    (electrode as usize) < CHANNELS && self.0 & (1u16 << electrode) != 0
  }

  pub const fn is_empty(&self) -> bool {
    self.0 == 0
  }

  pub const fn len(&self) -> u32 {
    self.0.count_ones()
  }

  /// Electrodes present in the set, in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = u8> {
    let bits = self.0;
    (0..CHANNELS as u8).filter(move |&e| bits & (1u16 << e) != 0)
  }
}

/// Out-of-range status.
///
/// Bits 0..=12 flag channels whose auto-configuration ended out of range.
/// Bit 13 is the auto-configuration fail flag and bit 14 the
/// auto-reconfiguration fail flag; they sit in hardware bits 7 and 6 of the
/// high status byte respectively, i.e. in swapped order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange(u16);

impl OutOfRange {
  pub const AUTO_CONFIG_FAIL_BIT: u8 = 13;
  pub const AUTO_RECONFIG_FAIL_BIT: u8 = 14;

  pub(crate) const fn decode(low: u8, high: u8) -> Self {
    let mut bits = ElectrodeSet::decode(low, high).bits();
    if high & AUTO_CONFIG_FAIL != 0 {
      bits |= 1u16 << Self::AUTO_CONFIG_FAIL_BIT;
    }
    if high & AUTO_RECONFIG_FAIL != 0 {
      bits |= 1u16 << Self::AUTO_RECONFIG_FAIL_BIT;
    }
    Self(bits)
  }

  /// All 15 flags as one bitmap.
  pub const fn bits(&self) -> u16 {
    self.0
  }

  /// Only the per-channel flags.
  pub const fn electrodes(&self) -> ElectrodeSet {
    ElectrodeSet::from_bits(self.0)
  }

  pub const fn is_out_of_range(&self, electrode: u8) -> bool {
    self.electrodes().contains(electrode)
  }

  pub const fn auto_config_failed(&self) -> bool {
    self.0 & (1u16 << Self::AUTO_CONFIG_FAIL_BIT) != 0
  }

  pub const fn auto_reconfig_failed(&self) -> bool {
    self.0 & (1u16 << Self::AUTO_RECONFIG_FAIL_BIT) != 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::device;

  #[test]
  fn touch_bitmap_maps_both_bytes() {
    let set = ElectrodeSet::decode(0b1000_0001, 0b1111_0001);
    assert_eq!(set.bits(), 0b1_0001_1000_0001);
    assert!(set.contains(0));
    assert!(set.contains(7));
    assert!(set.contains(8));
    assert!(set.contains(12));
    assert!(!set.contains(13));
    assert_eq!(set.iter().collect::<std::vec::Vec<_>>(), [0, 7, 8, 12]);
    assert_eq!(set.len(), 4);
  }

  #[test]
  fn out_of_range_flags_are_swapped() {
    let only_bit7 = OutOfRange::decode(0, 0b1000_0000);
    assert_eq!(only_bit7.bits(), 1 << 13);
    assert!(only_bit7.auto_config_failed());
    assert!(!only_bit7.auto_reconfig_failed());
    assert!(only_bit7.electrodes().is_empty());

    let only_bit6 = OutOfRange::decode(0, 0b0100_0000);
    assert_eq!(only_bit6.bits(), 1 << 14);
    assert!(only_bit6.auto_reconfig_failed());

    let mixed = OutOfRange::decode(0b0000_0100, 0b1001_0000);
    assert!(mixed.is_out_of_range(2));
    assert!(mixed.is_out_of_range(12));
    assert!(mixed.auto_config_failed());
  }

  #[test]
  fn touch_status_reads_two_registers() {
    let (mut dev, _) = device();
    dev.bus().regs[0x00] = 0b0000_0110;
    dev.bus().regs[0x01] = 0b1001_0000;

    let set = dev.touch_status().unwrap();
    assert_eq!(set.bits(), 0b1_0000_0000_0110);
    assert_eq!(dev.bus().last_read_len, 2);
  }

  #[test]
  fn single_reads_share_one_transaction_within_window() {
    let (mut dev, clock) = device();
    dev.bus().regs[0x00] = 0b0000_0010;

    assert!(!dev.is_touched(0).unwrap());
    clock.advance(499);
    dev.bus().regs[0x00] = 0b0000_0001;
    assert!(!dev.is_touched(0).unwrap());
    assert!(dev.is_touched(1).unwrap());
    assert_eq!(dev.bus().reads, 1);
  }

  #[test]
  fn stale_cache_is_refreshed() {
    let (mut dev, clock) = device();
    dev.bus().regs[0x00] = 0b0000_0010;

    assert!(dev.is_touched(1).unwrap());
    clock.advance(501);
    dev.bus().regs[0x00] = 0b0000_0001;
    assert!(!dev.is_touched(1).unwrap());
    assert!(dev.is_touched(0).unwrap());
    assert_eq!(dev.bus().reads, 2);
  }

  #[test]
  fn clock_wrap_forces_refresh() {
    let (mut dev, clock) = device();
    clock.set(u32::MAX - 100);
    dev.is_touched(3).unwrap();
    clock.set(50);
    dev.is_touched(3).unwrap();
    assert_eq!(dev.bus().reads, 2);
  }

  #[test]
  fn invalid_electrode_skips_the_bus() {
    let (mut dev, _) = device();
    dev.bus().regs[0x00] = 0xFF;
    dev.bus().regs[0x01] = 0xFF;
    assert!(!dev.is_touched(13).unwrap());
    assert!(!dev.gpio_input(3).unwrap());
    assert!(!dev.gpio_input(12).unwrap());
    assert_eq!(dev.bus().reads, 0);
  }

  #[test]
  fn gpio_inputs_read_through_touch_bits() {
    let (mut dev, _) = device();
    dev.bus().regs[0x01] = 0b0000_0100;
    assert!(dev.gpio_input(10).unwrap());
    assert!(!dev.gpio_input(11).unwrap());
    assert_eq!(dev.bus().reads, 1);
  }

  #[test]
  fn invalidate_drops_cached_bitmap() {
    let (mut dev, _) = device();
    dev.is_touched(0).unwrap();
    dev.invalidate_touch_cache();
    dev.is_touched(0).unwrap();
    assert_eq!(dev.bus().reads, 2);
  }

  #[test]
  fn over_current_is_write_one_to_clear() {
    let (mut dev, _) = device();
    dev.bus().regs[0x01] = 0b1000_0011;
    assert!(dev.over_current().unwrap());

    dev.clear_over_current().unwrap();
    assert_eq!(dev.bus().writes, [(0x01, 0b1000_0000)]);
    assert!(!dev.over_current().unwrap());
  }
}
