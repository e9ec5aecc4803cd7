use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::trace;

use crate::reg::READ_BUF_LEN;
use crate::{Clock, Error, Mpr121};

/// Raw bytes of one sequential register read.
///
/// Always [`READ_BUF_LEN`] long; bytes past the requested count are zero.
pub(crate) type Scratch = [u8; READ_BUF_LEN];

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Write one byte to one register.
  pub(crate) fn write_register(&mut self, reg: impl Into<u8>, value: u8) -> Result<(), Error<E>> {
    let reg = reg.into();
    trace!("mpr121@{:#04x}: write {:#04x} <- {:#04x}", u8::from(self.address), reg, value);
    self.i2c.write(self.address.into(), &[reg, value]).map_err(Error::I2c)
  }

  /// Read `count` consecutive registers starting at `reg`.
  ///
  /// `count` is clamped to [`READ_BUF_LEN`]. The returned buffer is freshly
  /// zeroed on every call so nothing from a previous read leaks through.
  pub(crate) fn read_registers(&mut self, reg: impl Into<u8>, count: usize) -> Result<Scratch, Error<E>> {
    let reg = reg.into();
    let count = count.min(READ_BUF_LEN);
    let mut buf: Scratch = [0; READ_BUF_LEN];
    if count == 0 {
      return Ok(buf);
    }

    self.i2c.write_read(self.address.into(), &[reg], &mut buf[..count]).map_err(Error::I2c)?;
    trace!("mpr121@{:#04x}: read {:#04x} -> {:?}", u8::from(self.address), reg, &buf[..count]);
    Ok(buf)
  }

  /// Read a single register.
  pub(crate) fn read_register(&mut self, reg: impl Into<u8>) -> Result<u8, Error<E>> {
    Ok(self.read_registers(reg, 1)?[0])
  }

  /// Read-modify-write a single register.
  pub(crate) fn modify_register<F: FnOnce(u8) -> u8>(&mut self, reg: impl Into<u8>, f: F) -> Result<(), Error<E>> {
    let reg = reg.into();
    let value = self.read_register(reg)?;
    self.write_register(reg, f(value))
  }

  /// Set or clear `mask` in a register, leaving the other bits alone.
  pub(crate) fn write_register_bits(&mut self, reg: impl Into<u8>, mask: u8, on: bool) -> Result<(), Error<E>> {
    self.modify_register(reg, |v| apply_mask(v, mask, on))
  }

  /// Store `value` into the 4-bit slots `first..first + len` of a register
  /// bank that packs two slots per byte (even slot in the low nibble).
  ///
  /// Each touched register is read once and written once: the write happens
  /// when the run reaches an odd slot or its last slot.
  pub(crate) fn write_nibbles(&mut self, base: u8, first: u8, len: u8, value: u8) -> Result<(), Error<E>> {
    let value = value & 0x0F;
    let mut reg = base;
    let mut current = 0u8;

    for i in 0..len {
      let slot = first + i;
      if i == 0 || slot % 2 == 0 {
        reg = base + slot / 2;
        current = self.read_register(reg)?;
      }

      current = set_nibble(current, slot, value);

      if slot % 2 == 1 || i == len - 1 {
        self.write_register(reg, current)?;
      }
    }

    Ok(())
  }
}

/// Set or clear the bits of `mask` in `value`.
#[inline]
pub(crate) const fn apply_mask(value: u8, mask: u8, on: bool) -> u8 {
  if on {
    value | mask
  } else {
    value & !mask
  }
}

/// Replace the nibble holding `slot` (low nibble for even slots).
#[inline]
pub(crate) const fn set_nibble(byte: u8, slot: u8, value: u8) -> u8 {
  if slot % 2 == 0 {
    (byte & 0xF0) | (value & 0x0F)
  } else {
    (byte & 0x0F) | ((value & 0x0F) << 4)
  }
}

/// Extract the nibble holding `slot`.
#[inline]
pub(crate) const fn get_nibble(byte: u8, slot: u8) -> u8 {
  if slot % 2 == 0 {
    byte & 0x0F
  } else {
    byte >> 4
  }
}
