use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::{error::ComponentRange, OffsetDateTime};

/// Milliseconds since the Unix epoch, UTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(pub i64);

impl EpochMillis {
    pub fn now() -> EpochMillis {
        EpochMillis::from(OffsetDateTime::now_utc())
    }

    /// Absolute distance between two instants.
    pub fn distance(self, other: EpochMillis) -> Duration {
        Duration::from_millis(self.0.abs_diff(other.0))
    }

    pub fn to_offset_date_time(self) -> Result<OffsetDateTime, ComponentRange> {
        OffsetDateTime::from_unix_timestamp_nanos(self.0 as i128 * 1_000_000)
    }
}

impl From<OffsetDateTime> for EpochMillis {
    fn from(value: OffsetDateTime) -> Self {
        EpochMillis((value.unix_timestamp_nanos() / 1_000_000) as i64)
    }
}
