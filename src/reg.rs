/******************************************************************************
 * Refer to the MPR121 datasheet and application notes AN3889..AN3894 and     *
 * AN3944, available on the NXP website.                                      *
 * ========================================================================== *
 *                        MPR121 - Registers & Memory Map                     *
*******************************************************************************/

/// Number of sensing channels: ELE0..ELE11 plus the ELEPROX channel.
pub const CHANNELS: usize = 13;

/// Electrodes that double as GPIO (ELE4..ELE11).
pub const GPIO_PINS: usize = 8;

/// First electrode usable as GPIO.
pub const FIRST_GPIO_PIN: u8 = 4;

/// Largest sequential register read the transport shim performs.
pub(crate) const READ_BUF_LEN: usize = 26;

pub(crate) const SOFT_RESET_MAGIC: u8 = 0x63;

#[allow(dead_code)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reg {
  // Touch & out-of-range status (0x00..0x03)
  TouchStatus0 = 0x00,
  TouchStatus1 = 0x01,
  OorStatus0 = 0x02,
  OorStatus1 = 0x03,

  // Filtered data, LSB/MSB per channel (0x04..0x1D)
  Ele0FilteredLsb = 0x04,
  Ele0FilteredMsb = 0x05,
  Ele1FilteredLsb = 0x06,
  Ele1FilteredMsb = 0x07,
  Ele2FilteredLsb = 0x08,
  Ele2FilteredMsb = 0x09,
  Ele3FilteredLsb = 0x0A,
  Ele3FilteredMsb = 0x0B,
  Ele4FilteredLsb = 0x0C,
  Ele4FilteredMsb = 0x0D,
  Ele5FilteredLsb = 0x0E,
  Ele5FilteredMsb = 0x0F,
  Ele6FilteredLsb = 0x10,
  Ele6FilteredMsb = 0x11,
  Ele7FilteredLsb = 0x12,
  Ele7FilteredMsb = 0x13,
  Ele8FilteredLsb = 0x14,
  Ele8FilteredMsb = 0x15,
  Ele9FilteredLsb = 0x16,
  Ele9FilteredMsb = 0x17,
  Ele10FilteredLsb = 0x18,
  Ele10FilteredMsb = 0x19,
  Ele11FilteredLsb = 0x1A,
  Ele11FilteredMsb = 0x1B,
  EleProxFilteredLsb = 0x1C,
  EleProxFilteredMsb = 0x1D,

  // Baseline values (0x1E..0x2A)
  Ele0Baseline = 0x1E,
  Ele1Baseline = 0x1F,
  Ele2Baseline = 0x20,
  Ele3Baseline = 0x21,
  Ele4Baseline = 0x22,
  Ele5Baseline = 0x23,
  Ele6Baseline = 0x24,
  Ele7Baseline = 0x25,
  Ele8Baseline = 0x26,
  Ele9Baseline = 0x27,
  Ele10Baseline = 0x28,
  Ele11Baseline = 0x29,
  EleProxBaseline = 0x2A,

  // Baseline filtering, ELE0..ELE11 (0x2B..0x35)
  MhdRising = 0x2B,
  NhdRising = 0x2C,
  NclRising = 0x2D,
  FdlRising = 0x2E,
  MhdFalling = 0x2F,
  NhdFalling = 0x30,
  NclFalling = 0x31,
  FdlFalling = 0x32,
  NhdTouched = 0x33,
  NclTouched = 0x34,
  FdlTouched = 0x35,

  // Baseline filtering, ELEPROX (0x36..0x40)
  ProxMhdRising = 0x36,
  ProxNhdRising = 0x37,
  ProxNclRising = 0x38,
  ProxFdlRising = 0x39,
  ProxMhdFalling = 0x3A,
  ProxNhdFalling = 0x3B,
  ProxNclFalling = 0x3C,
  ProxFdlFalling = 0x3D,
  ProxNhdTouched = 0x3E,
  ProxNclTouched = 0x3F,
  ProxFdlTouched = 0x40,

  // Touch / release thresholds, interleaved per channel (0x41..0x5A)
  Ele0TouchThreshold = 0x41,
  Ele0ReleaseThreshold = 0x42,
  Ele1TouchThreshold = 0x43,
  Ele1ReleaseThreshold = 0x44,
  Ele2TouchThreshold = 0x45,
  Ele2ReleaseThreshold = 0x46,
  Ele3TouchThreshold = 0x47,
  Ele3ReleaseThreshold = 0x48,
  Ele4TouchThreshold = 0x49,
  Ele4ReleaseThreshold = 0x4A,
  Ele5TouchThreshold = 0x4B,
  Ele5ReleaseThreshold = 0x4C,
  Ele6TouchThreshold = 0x4D,
  Ele6ReleaseThreshold = 0x4E,
  Ele7TouchThreshold = 0x4F,
  Ele7ReleaseThreshold = 0x50,
  Ele8TouchThreshold = 0x51,
  Ele8ReleaseThreshold = 0x52,
  Ele9TouchThreshold = 0x53,
  Ele9ReleaseThreshold = 0x54,
  Ele10TouchThreshold = 0x55,
  Ele10ReleaseThreshold = 0x56,
  Ele11TouchThreshold = 0x57,
  Ele11ReleaseThreshold = 0x58,
  EleProxTouchThreshold = 0x59,
  EleProxReleaseThreshold = 0x5A,

  // Debounce & global filter configuration (0x5B..0x5E)
  Debounce = 0x5B,
  FilterGlobalCdcConfig = 0x5C,
  FilterGlobalCdtConfig = 0x5D,
  ElectrodeConfig = 0x5E,

  // Per-channel charge current (0x5F..0x6B)
  Ele0Cdc = 0x5F,
  Ele1Cdc = 0x60,
  Ele2Cdc = 0x61,
  Ele3Cdc = 0x62,
  Ele4Cdc = 0x63,
  Ele5Cdc = 0x64,
  Ele6Cdc = 0x65,
  Ele7Cdc = 0x66,
  Ele8Cdc = 0x67,
  Ele9Cdc = 0x68,
  Ele10Cdc = 0x69,
  Ele11Cdc = 0x6A,
  EleProxCdc = 0x6B,

  // Per-channel charge time, two channels per register (0x6C..0x72)
  Ele0Ele1Cdt = 0x6C,
  Ele2Ele3Cdt = 0x6D,
  Ele4Ele5Cdt = 0x6E,
  Ele6Ele7Cdt = 0x6F,
  Ele8Ele9Cdt = 0x70,
  Ele10Ele11Cdt = 0x71,
  EleProxCdt = 0x72,

  // GPIO (0x73..0x7A)
  GpioControl0 = 0x73,
  GpioControl1 = 0x74,
  GpioData = 0x75,
  GpioDirection = 0x76,
  GpioEnable = 0x77,
  GpioDataSet = 0x78,
  GpioDataClear = 0x79,
  GpioDataToggle = 0x7A,

  // Auto-configuration (0x7B..0x7F)
  AutoConfigControl0 = 0x7B,
  AutoConfigControl1 = 0x7C,
  AutoConfigUsl = 0x7D,
  AutoConfigLsl = 0x7E,
  AutoConfigTl = 0x7F,

  SoftReset = 0x80,

  // PWM duty, two GPIO pins per register (0x81..0x84)
  PwmDuty0 = 0x81,
  PwmDuty1 = 0x82,
  PwmDuty2 = 0x83,
  PwmDuty3 = 0x84,
}

#[allow(dead_code)]
impl Reg {
  /// Datasheet alias of [`Reg::FilterGlobalCdcConfig`].
  pub(crate) const AFE_CONFIG: Reg = Reg::FilterGlobalCdcConfig;
  /// Datasheet alias of [`Reg::FilterGlobalCdtConfig`].
  pub(crate) const FILTER_CONFIG: Reg = Reg::FilterGlobalCdtConfig;

  /// Register `offset` places after `self`.
  ///
  /// Used for the per-channel banks; callers only ever offset inside a bank
  /// that is fully enumerated above.
  #[inline]
  pub(crate) const fn offset(self, offset: u8) -> u8 {
    self as u8 + offset
  }
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aliases_share_addresses() {
    assert_eq!(u8::from(Reg::AFE_CONFIG), 0x5C);
    assert_eq!(u8::from(Reg::FILTER_CONFIG), 0x5D);
  }

  #[test]
  fn banks_are_contiguous() {
    assert_eq!(Reg::Ele0FilteredLsb.offset(12 * 2), Reg::EleProxFilteredLsb as u8);
    assert_eq!(Reg::Ele0Baseline.offset(12), Reg::EleProxBaseline as u8);
    assert_eq!(Reg::Ele0TouchThreshold.offset(12 * 2), Reg::EleProxTouchThreshold as u8);
    assert_eq!(Reg::Ele0Cdc.offset(12), Reg::EleProxCdc as u8);
    assert_eq!(Reg::Ele0Ele1Cdt.offset(6), Reg::EleProxCdt as u8);
    assert_eq!(Reg::PwmDuty0.offset(3), Reg::PwmDuty3 as u8);
  }
}
