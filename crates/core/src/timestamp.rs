//! The canonical timestamp boundary for remote documents.
//!
//! The hosted document store has held timestamps in two encodings over the
//! life of the application: RFC 3339 strings and integer epoch
//! milliseconds (records written before the web client normalized them).
//! Everything inside the system works with [`chrono::DateTime<Utc>`]; this
//! module is the single place where remote values are converted, used via
//! `#[serde(with = "timestamp")]` on record fields.
//!
//! Serialization always writes RFC 3339.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;

/// Serialize a timestamp as an RFC 3339 string.
///
/// # Errors
///
/// Never fails for in-range `DateTime<Utc>` values.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

/// Deserialize a timestamp from an RFC 3339 string or epoch milliseconds.
///
/// # Errors
///
/// Fails if the value is neither a parsable RFC 3339 string nor an
/// in-range integer.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TimestampVisitor)
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        formatter.write_str("an RFC 3339 timestamp string or epoch milliseconds")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        DateTime::parse_from_rfc3339(v)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| E::custom(format!("invalid RFC 3339 timestamp: {e}")))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Utc.timestamp_millis_opt(v)
            .single()
            .ok_or_else(|| E::custom(format!("epoch milliseconds out of range: {v}")))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let millis = i64::try_from(v)
            .map_err(|_| E::custom(format!("epoch milliseconds out of range: {v}")))?;
        self.visit_i64(millis)
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        // Some very old records carry fractional millis from Date.now() math.
        #[allow(clippy::cast_possible_truncation)]
        self.visit_i64(v.trunc() as i64)
    }
}

/// Support for `Option<DateTime<Utc>>` fields, used via
/// `#[serde(default, with = "timestamp::option")]`.
pub mod option {
    use super::{DateTime, Deserializer, Serializer, TimestampVisitor, Utc, de};

    /// Serialize an optional timestamp as RFC 3339 or null.
    ///
    /// # Errors
    ///
    /// Never fails for in-range values.
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => super::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp, treating null as absent.
    ///
    /// # Errors
    ///
    /// Fails on present values that are neither RFC 3339 nor epoch millis.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OptionVisitor;

        impl<'de> de::Visitor<'de> for OptionVisitor {
            type Value = Option<DateTime<Utc>>;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("an optional timestamp")
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                deserializer.deserialize_any(TimestampVisitor).map(Some)
            }
        }

        deserializer.deserialize_option(OptionVisitor)
    }
}
