#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DECISECONDS_PER_SECOND: u64 = 10;
const NANOS_PER_DECISECOND: u128 = 100_000_000;
const MILLIS_PER_DECISECOND: u64 = 100;

/// Largest value of a 36-bit timestamp field.
const MAX_FIELD_DECISECONDS: u64 = (1 << 36) - 1;

/// A point in time, stored as the number of deciseconds elapsed since the Unix epoch.
///
/// This is the resolution of the dates stored in a consent string. Anything more precise is
/// truncated when converting from a [`SystemTime`].
///
/// # Example
///
/// ```
/// use iab_consent::v1::Timestamp;
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let t = Timestamp::from(UNIX_EPOCH + Duration::from_millis(1_510_082_155_489));
///
/// assert_eq!(t.as_deciseconds(), 15_100_821_554);
/// assert_eq!(t.as_unix_seconds(), 1_510_082_155);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Timestamp(u64);

impl Timestamp {
    pub const UNIX_EPOCH: Timestamp = Timestamp(0);

    pub const fn from_deciseconds(ds: u64) -> Self {
        Self(ds)
    }

    /// Values too large to be counted in deciseconds saturate at [`u64::MAX`].
    pub const fn from_unix_seconds(s: u64) -> Self {
        Self(s.saturating_mul(DECISECONDS_PER_SECOND))
    }

    pub const fn as_deciseconds(&self) -> u64 {
        self.0
    }

    /// Whole seconds since the Unix epoch, rounded down.
    pub const fn as_unix_seconds(&self) -> u64 {
        self.0 / DECISECONDS_PER_SECOND
    }

    /// Returns the current time, truncated to the decisecond.
    pub fn now() -> Self {
        SystemTime::now().into()
    }
}

impl From<SystemTime> for Timestamp {
    /// Instants before the Unix epoch are clamped to the epoch.
    fn from(t: SystemTime) -> Self {
        let ds = t
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() / NANOS_PER_DECISECOND)
            .unwrap_or_default();

        Self(u64::try_from(ds).unwrap_or(u64::MAX))
    }
}

impl From<Timestamp> for SystemTime {
    /// Instants the platform cannot represent are clamped to the largest value a consent
    /// string can hold.
    fn from(t: Timestamp) -> Self {
        UNIX_EPOCH
            .checked_add(to_duration(t.0))
            .unwrap_or(UNIX_EPOCH + to_duration(MAX_FIELD_DECISECONDS))
    }
}

fn to_duration(ds: u64) -> Duration {
    Duration::from_secs(ds / DECISECONDS_PER_SECOND)
        + Duration::from_millis(ds % DECISECONDS_PER_SECOND * MILLIS_PER_DECISECOND)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.0 / DECISECONDS_PER_SECOND,
            self.0 % DECISECONDS_PER_SECOND
        )
    }
}
