/// I²C address of an MPR121, selected by what the ADDR pin is tied to.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
  /// ADDR tied to GND (power-on default).
  Gnd = 0x5A,
  /// ADDR tied to VDD.
  Vdd = 0x5B,
  /// ADDR tied to SDA.
  Sda = 0x5C,
  /// ADDR tied to SCL.
  Scl = 0x5D,
}

impl Address {
  pub const ALL: [Address; 4] = [Address::Gnd, Address::Vdd, Address::Sda, Address::Scl];

  const fn slot(self) -> u8 {
    self as u8 - Address::Gnd as u8
  }
}

impl From<Address> for u8 {
  fn from(v: Address) -> Self {
    v as u8
  }
}

impl TryFrom<u8> for Address {
  type Error = ();

  fn try_from(addr: u8) -> Result<Self, Self::Error> {
    match addr {
      0x5A => Ok(Self::Gnd),
      0x5B => Ok(Self::Vdd),
      0x5C => Ok(Self::Sda),
      0x5D => Ok(Self::Scl),
      _ => Err(()),
    }
  }
}

/// Hands out the four MPR121 addresses to driver instances.
///
/// Owned by whatever brings the sensors up; it is plain data, so sharing it
/// between threads is up to the owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressAllocator {
  used: u8,
}

impl AddressAllocator {
  pub const fn new() -> Self {
    Self { used: 0 }
  }

  /// Claim an address.
  ///
  /// `Some(address)` marks that address as used and returns it, even if it
  /// was already claimed. `None` picks the lowest free address; once all four
  /// are taken it falls back to [`Address::Gnd`] so the caller still gets a
  /// usable (if shared) address.
  pub fn allocate(&mut self, requested: Option<Address>) -> Address {
    let address = requested.unwrap_or_else(|| {
      Address::ALL.iter().copied().find(|a| !self.is_used(*a)).unwrap_or(Address::Gnd)
    });
    self.used |= 1 << address.slot();
    address
  }

  /// Return an address to the pool.
  pub fn free(&mut self, address: Address) {
    self.used &= !(1 << address.slot());
  }

  pub const fn is_used(&self, address: Address) -> bool {
    self.used & (1 << address.slot()) != 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn allocates_round_robin_then_falls_back() {
    let mut alloc = AddressAllocator::new();
    assert_eq!(alloc.allocate(None), Address::Gnd);
    assert_eq!(alloc.allocate(None), Address::Vdd);
    assert_eq!(alloc.allocate(None), Address::Sda);
    assert_eq!(alloc.allocate(None), Address::Scl);
    assert_eq!(alloc.allocate(None), Address::Gnd);
  }

  #[test]
  fn explicit_addresses_are_reserved() {
    let mut alloc = AddressAllocator::new();
    assert_eq!(alloc.allocate(Some(Address::Gnd)), Address::Gnd);
    assert_eq!(alloc.allocate(Some(Address::Sda)), Address::Sda);
    assert_eq!(alloc.allocate(None), Address::Vdd);
    assert_eq!(alloc.allocate(None), Address::Scl);
  }

  #[test]
  fn freed_addresses_are_reused() {
    let mut alloc = AddressAllocator::new();
    for _ in 0..4 {
      alloc.allocate(None);
    }
    alloc.free(Address::Vdd);
    assert!(!alloc.is_used(Address::Vdd));
    assert_eq!(alloc.allocate(None), Address::Vdd);
  }

  #[test]
  fn raw_address_conversion() {
    assert_eq!(Address::try_from(0x5C), Ok(Address::Sda));
    assert_eq!(Address::try_from(0x5E), Err(()));
    assert_eq!(u8::from(Address::Scl), 0x5D);
  }
}
