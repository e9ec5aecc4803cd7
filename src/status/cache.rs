use super::ElectrodeSet;

/// How long a cached touch bitmap answers single-electrode queries.
pub(crate) const TOUCH_CACHE_MICROS: u32 = 500;

/// Last touch bitmap together with the clock value it was read at.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TouchCache {
  entry: Option<(ElectrodeSet, u32)>,
}

impl TouchCache {
  pub(crate) const fn new() -> Self {
    Self { entry: None }
  }

  /// The cached bitmap if it is still fresh at `now`.
  ///
  /// A clock value below the stored timestamp means the counter wrapped and
  /// counts as stale.
  pub(crate) fn get(&self, now: u32) -> Option<ElectrodeSet> {
    let (touched, at) = self.entry?;
    if now < at || now - at > TOUCH_CACHE_MICROS {
      return None;
    }
    Some(touched)
  }

  pub(crate) fn store(&mut self, touched: ElectrodeSet, now: u32) {
    self.entry = Some((touched, now));
  }

  pub(crate) fn clear(&mut self) {
    self.entry = None;
  }
}
