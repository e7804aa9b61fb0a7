//! Timestamp conversion helpers.
//!
//! Caption timing crosses the crate boundary as fractional seconds (the
//! format decoded caption lists arrive in), while the API works in
//! [`Duration`]. The serde adapters here keep that conversion in one place.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de::Error as DeError};

/// Serialize/deserialize a [`Duration`] as fractional seconds.
///
/// Used via `#[serde(with = "crate::timecode::duration_secs")]`.
pub(crate) mod duration_secs {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds)
            .map_err(|_| DeError::custom(format!("invalid timestamp: {seconds}")))
    }
}

/// Serialize/deserialize an `Option<Duration>` as fractional seconds or null.
pub(crate) mod duration_secs_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let seconds = Option::<f64>::deserialize(deserializer)?;
        seconds
            .map(|s| {
                Duration::try_from_secs_f64(s)
                    .map_err(|_| DeError::custom(format!("invalid timestamp: {s}")))
            })
            .transpose()
    }
}

/// Format a [`Duration`] as `HH:MM:SS.mmm` for human-readable output.
pub fn format_timestamp(timestamp: Duration) -> String {
    let total_seconds = timestamp.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = timestamp.subsec_millis();
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
