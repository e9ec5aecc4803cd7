use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::bounds::Run;
use crate::config::CHARGE_CURRENT_MASK;
use crate::reg::{Reg, CHANNELS};
use crate::rw::get_nibble;
use crate::{ChargeTime, Clock, Error, Mpr121};

const FILTERED_MSB_MASK: u8 = 0b0000_0011;
const CHARGE_TIME_MASK: u8 = 0b0000_0111;

/// Last decoded per-electrode values, indexed by electrode.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Readings {
  filtered: [u16; CHANNELS],
  baseline: [u8; CHANNELS],
  charge_current: [u8; CHANNELS],
  charge_time: [ChargeTime; CHANNELS],
}

impl Readings {
  pub(crate) const fn new() -> Self {
    Self {
      filtered: [0; CHANNELS],
      baseline: [0; CHANNELS],
      charge_current: [0; CHANNELS],
      charge_time: [ChargeTime::Disabled; CHANNELS],
    }
  }
}

/// 10-bit filtered sample from its LSB/MSB register pair.
#[inline]
pub(crate) const fn decode_filtered(lsb: u8, msb: u8) -> u16 {
  lsb as u16 | ((msb & FILTERED_MSB_MASK) as u16) << 8
}

impl<I, E, C> Mpr121<I, C>
where
  I: I2c<SevenBitAddress, Error = E>,
  C: Clock,
{
  /// Filtered 10-bit data of `count` electrodes starting at `electrode`.
  ///
  /// The slice is indexed from `electrode` and is empty when `electrode` is
  /// past ELEPROX (12). Runs past ELEPROX are cut short.
  pub fn filtered_data_range(&mut self, electrode: u8, count: u8) -> Result<&[u16], Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(&[]);
    };

    let raw = self.read_registers(Reg::Ele0FilteredLsb.offset(run.start * 2), run.len as usize * 2)?;
    for (i, pair) in raw.chunks_exact(2).take(run.len as usize).enumerate() {
      self.readings.filtered[run.start as usize + i] = decode_filtered(pair[0], pair[1]);
    }

    Ok(&self.readings.filtered[run.start as usize..run.end() as usize])
  }

  /// Filtered data of one electrode, 0 for an invalid index.
  pub fn filtered_data(&mut self, electrode: u8) -> Result<u16, Error<E>> {
    Ok(self.filtered_data_range(electrode, 1)?.first().copied().unwrap_or(0))
  }

  /// Baselines of `count` electrodes starting at `electrode`.
  ///
  /// Each value is the upper 8 bits of the 10-bit baseline.
  pub fn baseline_range(&mut self, electrode: u8, count: u8) -> Result<&[u8], Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(&[]);
    };

    let raw = self.read_registers(Reg::Ele0Baseline.offset(run.start), run.len as usize)?;
    let range = run.start as usize..run.end() as usize;
    self.readings.baseline[range.clone()].copy_from_slice(&raw[..run.len as usize]);
    Ok(&self.readings.baseline[range])
  }

  pub fn baseline(&mut self, electrode: u8) -> Result<u8, Error<E>> {
    Ok(self.baseline_range(electrode, 1)?.first().copied().unwrap_or(0))
  }

  /// Overwrite the baseline of `count` electrodes starting at `electrode`.
  ///
  /// The device only accepts this in stop mode.
  pub fn set_baseline_range(&mut self, electrode: u8, count: u8, value: u8) -> Result<(), Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(());
    };
    for e in run.indices() {
      self.write_register(Reg::Ele0Baseline.offset(e), value)?;
    }
    Ok(())
  }

  pub fn set_baseline(&mut self, electrode: u8, value: u8) -> Result<(), Error<E>> {
    self.set_baseline_range(electrode, 1, value)
  }

  /// Per-electrode charge-discharge current in µA (0..=63).
  ///
  /// Zero means the electrode uses the global current.
  pub fn charge_current_range(&mut self, electrode: u8, count: u8) -> Result<&[u8], Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(&[]);
    };

    let raw = self.read_registers(Reg::Ele0Cdc.offset(run.start), run.len as usize)?;
    for (i, byte) in raw.iter().take(run.len as usize).enumerate() {
      self.readings.charge_current[run.start as usize + i] = byte & CHARGE_CURRENT_MASK;
    }
    Ok(&self.readings.charge_current[run.start as usize..run.end() as usize])
  }

  pub fn charge_current(&mut self, electrode: u8) -> Result<u8, Error<E>> {
    Ok(self.charge_current_range(electrode, 1)?.first().copied().unwrap_or(0))
  }

  /// Set the charge-discharge current of a run of electrodes. Max value is 63.
  pub fn set_charge_current_range(&mut self, electrode: u8, count: u8, micro_amps: u8) -> Result<(), Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(());
    };
    let value = micro_amps & CHARGE_CURRENT_MASK;
    for e in run.indices() {
      self.write_register(Reg::Ele0Cdc.offset(e), value)?;
    }
    Ok(())
  }

  pub fn set_charge_current(&mut self, electrode: u8, micro_amps: u8) -> Result<(), Error<E>> {
    self.set_charge_current_range(electrode, 1, micro_amps)
  }

  /// Per-electrode charge-discharge time.
  ///
  /// Two electrodes share each register, even electrode in the low nibble.
  /// [`ChargeTime::Disabled`] means the electrode uses the global time.
  pub fn charge_time_range(&mut self, electrode: u8, count: u8) -> Result<&[ChargeTime], Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(&[]);
    };

    // an odd start sits in the high nibble, so one more register is needed
    let first_reg = run.start / 2;
    let bytes = if run.start % 2 == 0 { (run.len + 1) / 2 } else { (run.len + 2) / 2 };
    let raw = self.read_registers(Reg::Ele0Ele1Cdt.offset(first_reg), bytes as usize)?;

    for e in run.indices() {
      let byte = raw[(e / 2 - first_reg) as usize];
      self.readings.charge_time[e as usize] = ChargeTime::from_bits(get_nibble(byte, e) & CHARGE_TIME_MASK);
    }
    Ok(&self.readings.charge_time[run.start as usize..run.end() as usize])
  }

  pub fn charge_time(&mut self, electrode: u8) -> Result<ChargeTime, Error<E>> {
    Ok(self.charge_time_range(electrode, 1)?.first().copied().unwrap_or(ChargeTime::Disabled))
  }

  /// Set the charge-discharge time of a run of electrodes.
  ///
  /// Only the nibbles of the affected electrodes change; their register
  /// neighbours keep their values.
  pub fn set_charge_time_range(&mut self, electrode: u8, count: u8, time: ChargeTime) -> Result<(), Error<E>> {
    let Some(run) = Run::electrodes(electrode, count) else {
      return Ok(());
    };
    self.write_nibbles(Reg::Ele0Ele1Cdt.into(), run.start, run.len, time.into_bits())
  }

  pub fn set_charge_time(&mut self, electrode: u8, time: ChargeTime) -> Result<(), Error<E>> {
    self.set_charge_time_range(electrode, 1, time)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::device;

  #[test]
  fn filtered_sample_is_ten_bits() {
    assert_eq!(decode_filtered(0xFF, 0x03), 1023);
    assert_eq!(decode_filtered(0x00, 0x00), 0);
    assert_eq!(decode_filtered(0x34, 0xFE), 0x234);
  }

  #[test]
  fn filtered_run_reads_one_pair_per_electrode() {
    let (mut dev, _) = device();
    dev.bus().regs[0x08..0x0E].copy_from_slice(&[0xFF, 0x03, 0x10, 0x01, 0x00, 0x00]);

    assert_eq!(dev.filtered_data_range(2, 3).unwrap(), &[1023, 0x110, 0]);
    assert_eq!(dev.bus().last_read_len, 6);
    assert_eq!(dev.filtered_data(3).unwrap(), 0x110);
  }

  #[test]
  fn filtered_run_is_clamped_at_proximity() {
    let (mut dev, _) = device();
    dev.bus().regs[0x1C] = 0x2A;
    dev.bus().regs[0x1D] = 0x01;

    assert_eq!(dev.filtered_data_range(12, 10).unwrap(), &[0x12A]);
    assert_eq!(dev.bus().last_read_len, 2);

    let all = dev.filtered_data_range(0, 13).unwrap();
    assert_eq!(all.len(), 13);
    assert_eq!(dev.bus().last_read_len, 26);
  }

  #[test]
  fn invalid_start_reads_nothing() {
    let (mut dev, _) = device();
    assert!(dev.filtered_data_range(13, 1).unwrap().is_empty());
    assert!(dev.baseline_range(20, 2).unwrap().is_empty());
    assert!(dev.charge_current_range(13, 1).unwrap().is_empty());
    assert!(dev.charge_time_range(13, 1).unwrap().is_empty());
    assert_eq!(dev.filtered_data(13).unwrap(), 0);
    assert_eq!(dev.charge_time(200).unwrap(), ChargeTime::Disabled);
    assert_eq!(dev.bus().reads, 0);

    dev.set_baseline_range(13, 5, 1).unwrap();
    dev.set_charge_current(13, 1).unwrap();
    dev.set_charge_time(13, ChargeTime::Micros1).unwrap();
    assert!(dev.bus().writes.is_empty());
  }

  #[test]
  fn baseline_write_then_read() {
    let (mut dev, _) = device();
    dev.set_baseline_range(10, 5, 0x77).unwrap();
    assert_eq!(dev.bus().writes, [(0x28, 0x77), (0x29, 0x77), (0x2A, 0x77)]);

    dev.bus().regs[0x1E] = 0x12;
    assert_eq!(dev.baseline_range(9, 4).unwrap(), &[0, 0x77, 0x77, 0x77]);
    assert_eq!(dev.baseline(0).unwrap(), 0x12);
  }

  #[test]
  fn charge_current_is_six_bits() {
    let (mut dev, _) = device();
    dev.set_charge_current_range(0, 2, 0xFF).unwrap();
    assert_eq!(dev.bus().writes, [(0x5F, 0x3F), (0x60, 0x3F)]);

    dev.bus().regs[0x61] = 0xC5;
    assert_eq!(dev.charge_current_range(1, 2).unwrap(), &[0x3F, 0x05]);
  }

  #[test]
  fn charge_time_round_trips_on_every_electrode() {
    for electrode in 0..13u8 {
      for time in ChargeTime::ALL {
        let (mut dev, _) = device();
        dev.bus().regs[0x6C..=0x72].fill(0xFF);

        dev.set_charge_time(electrode, time).unwrap();
        assert_eq!(dev.charge_time(electrode).unwrap(), time);

        // the neighbour sharing the register is untouched
        let neighbour = electrode ^ 1;
        if neighbour < 13 {
          assert_eq!(dev.charge_time(neighbour).unwrap(), ChargeTime::Micros32);
        }
      }
    }
  }

  #[test]
  fn charge_time_run_from_odd_electrode() {
    let (mut dev, _) = device();
    dev.set_charge_time_range(3, 4, ChargeTime::Micros2).unwrap();
    assert_eq!(dev.bus().writes, [(0x6D, 0x30), (0x6E, 0x33), (0x6F, 0x03)]);

    dev.set_charge_time(2, ChargeTime::Micros16).unwrap();
    let times = dev.charge_time_range(1, 6).unwrap();
    assert_eq!(
      times,
      &[
        ChargeTime::Disabled,
        ChargeTime::Micros16,
        ChargeTime::Micros2,
        ChargeTime::Micros2,
        ChargeTime::Micros2,
        ChargeTime::Micros2,
      ]
    );
    assert_eq!(dev.bus().last_read_len, 4);
  }

  #[test]
  fn charge_time_proximity_channel() {
    let (mut dev, _) = device();
    dev.set_charge_time_range(11, 5, ChargeTime::Micros8).unwrap();
    assert_eq!(dev.bus().regs[0x71], 0x50);
    assert_eq!(dev.bus().regs[0x72], 0x05);
    assert_eq!(dev.charge_time_range(11, 2).unwrap(), &[ChargeTime::Micros8, ChargeTime::Micros8]);
    assert_eq!(dev.bus().last_read_len, 2);
  }
}
