//! Native time points and durations, in 100-nanosecond ticks.

/// Ticks in one millisecond.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Ticks between 1601-01-01 (the native epoch) and 1970-01-01.
pub const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

/// A point in time: ticks since 1601-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime {
    /// 100ns ticks since the native epoch
    pub universal_time: i64,
}

/// A duration in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeSpan {
    /// 100ns ticks
    pub duration: i64,
}

/// Splits ticks into whole milliseconds plus the tick remainder, so the
/// fractional part is computed from a small number.
fn ticks_to_millis(ticks: i64) -> f64 {
    let whole = ticks.div_euclid(TICKS_PER_MILLISECOND);
    let rem = ticks.rem_euclid(TICKS_PER_MILLISECOND);
    whole as f64 + rem as f64 / TICKS_PER_MILLISECOND as f64
}

fn millis_to_ticks(ms: f64) -> i64 {
    let whole = ms.floor();
    let frac = ms - whole;
    whole as i64 * TICKS_PER_MILLISECOND + (frac * TICKS_PER_MILLISECOND as f64).round() as i64
}

impl DateTime {
    /// Builds a time point from raw ticks.
    pub const fn from_ticks(universal_time: i64) -> Self {
        Self { universal_time }
    }

    /// Milliseconds since the Unix epoch.
    ///
    /// ```
    /// use native_model::{DateTime, UNIX_EPOCH_TICKS};
    ///
    /// let epoch = DateTime::from_ticks(UNIX_EPOCH_TICKS);
    /// assert_eq!(epoch.to_unix_millis(), 0.0);
    /// ```
    pub fn to_unix_millis(&self) -> f64 {
        ticks_to_millis(self.universal_time - UNIX_EPOCH_TICKS)
    }

    /// Inverse of [`DateTime::to_unix_millis`], rounding to the nearest tick.
    pub fn from_unix_millis(ms: f64) -> Self {
        Self {
            universal_time: millis_to_ticks(ms) + UNIX_EPOCH_TICKS,
        }
    }
}

impl TimeSpan {
    /// Builds a duration from raw ticks.
    pub const fn from_ticks(duration: i64) -> Self {
        Self { duration }
    }

    /// Duration in milliseconds.
    pub fn to_millis(&self) -> f64 {
        ticks_to_millis(self.duration)
    }

    /// Inverse of [`TimeSpan::to_millis`], rounding to the nearest tick.
    pub fn from_millis(ms: f64) -> Self {
        Self {
            duration: millis_to_ticks(ms),
        }
    }
}
