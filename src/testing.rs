//! Simulated MPR121 register file and clock for unit tests.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use crate::{Address, Clock, Config, Mpr121};

/// Register file with an auto-incrementing pointer, like the real part.
pub(crate) struct FakeBus {
  pub(crate) regs: [u8; 256],
  /// Every register write, in bus order.
  pub(crate) writes: Vec<(u8, u8)>,
  /// Number of transactions that contained a read.
  pub(crate) reads: usize,
  pub(crate) last_read_len: usize,
  pub(crate) last_address: Option<u8>,
}

impl FakeBus {
  pub(crate) fn new() -> Self {
    Self { regs: [0; 256], writes: Vec::new(), reads: 0, last_read_len: 0, last_address: None }
  }

  pub(crate) fn writes_to(&self, reg: u8) -> Vec<u8> {
    self.writes.iter().filter(|(r, _)| *r == reg).map(|(_, v)| *v).collect()
  }

  fn store(&mut self, reg: u8, value: u8) {
    self.writes.push((reg, value));
    match reg {
      // OVCF is write-1-to-clear; the rest of the byte is read-only
      0x01 => self.regs[0x01] &= !(value & 0x80),
      _ => self.regs[reg as usize] = value,
    }
  }
}

impl ErrorType for FakeBus {
  type Error = Infallible;
}

impl I2c<SevenBitAddress> for FakeBus {
  fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
    self.last_address = Some(address);
    let mut pointer = 0u8;
    let mut read = false;

    for op in operations.iter_mut() {
      match op {
        Operation::Write(bytes) => {
          if let Some((&reg, data)) = bytes.split_first() {
            pointer = reg;
            for &b in data {
              self.store(pointer, b);
              pointer = pointer.wrapping_add(1);
            }
          }
        }
        Operation::Read(buf) => {
          read = true;
          self.last_read_len = buf.len();
          for b in buf.iter_mut() {
            *b = self.regs[pointer as usize];
            pointer = pointer.wrapping_add(1);
          }
        }
      }
    }

    if read {
      self.reads += 1;
    }
    Ok(())
  }
}

/// Settable microsecond clock shared between a test and the driver.
#[derive(Clone)]
pub(crate) struct FakeClock(Rc<Cell<u32>>);

impl FakeClock {
  pub(crate) fn new(start: u32) -> Self {
    Self(Rc::new(Cell::new(start)))
  }

  pub(crate) fn set(&self, micros: u32) {
    self.0.set(micros);
  }

  pub(crate) fn advance(&self, micros: u32) {
    self.0.set(self.0.get().wrapping_add(micros));
  }
}

impl Clock for FakeClock {
  fn micros(&self) -> u32 {
    self.0.get()
  }
}

pub(crate) type TestDevice = Mpr121<FakeBus, FakeClock>;

/// A driver on a blank register file with the default configuration.
pub(crate) fn device() -> (TestDevice, FakeClock) {
  device_with(Config::default())
}

pub(crate) fn device_with(config: Config) -> (TestDevice, FakeClock) {
  let clock = FakeClock::new(10_000);
  (Mpr121::new(FakeBus::new(), clock.clone(), Address::Gnd, config), clock)
}

impl<C> Mpr121<FakeBus, C> {
  pub(crate) fn bus(&mut self) -> &mut FakeBus {
    &mut self.i2c
  }
}
