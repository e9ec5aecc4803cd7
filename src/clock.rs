/// Free-running microsecond counter.
///
/// The value is expected to wrap at `u32::MAX`, the way MCU tick counters do.
/// The driver uses it to age the single-electrode touch cache and to hold off
/// bus traffic during the power-up window.
///
/// Any `Fn() -> u32` closure is a clock, so a HAL timer can be plugged in with
/// `|| timer.now().ticks()` or similar.
pub trait Clock {
  fn micros(&self) -> u32;
}

impl<F> Clock for F
where
  F: Fn() -> u32,
{
  fn micros(&self) -> u32 {
    self()
  }
}
