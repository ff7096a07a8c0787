//! Timestamp formatting utilities
//!
//! Provides standardized, configurable timestamp formats for log output and a
//! formatter that renders the whole-second part of a timestamp once per second.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_logger_registry::core::TimestampFormat;
/// use std::time::SystemTime;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format_system_time(&SystemTime::now());
/// // Output: "2025-01-08T10:30:45.123Z"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Time of day only: `10:30:45,123`
    Absolute,

    /// Day, abbreviated month, year and time: `08 Jan 2025 10:30:45,123`
    Date,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_logger_registry::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

/// Shape of a format whose output is `<whole-second prefix><sep><millis><suffix>`
struct SecondPrecision {
    prefix: &'static str,
    separator: char,
    suffix: &'static str,
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    ///
    /// ```
    /// use rust_logger_registry::core::TimestampFormat;
    /// use chrono::Utc;
    ///
    /// let timestamp = TimestampFormat::Iso8601.format(&Utc::now());
    /// assert!(timestamp.ends_with('Z'));
    /// ```
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Absolute => datetime.format("%H:%M:%S,%3f").to_string(),
            TimestampFormat::Date => datetime.format("%d %b %Y %H:%M:%S,%3f").to_string(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Format a `SystemTime` according to this format
    #[must_use]
    pub fn format_system_time(&self, timestamp: &SystemTime) -> String {
        let datetime: DateTime<Utc> = (*timestamp).into();
        self.format(&datetime)
    }

    /// Whether [`CachedTimestampFormatter`] can reuse a per-second prefix for this format
    #[must_use]
    pub fn is_second_cacheable(&self) -> bool {
        self.second_precision().is_some()
    }

    fn second_precision(&self) -> Option<SecondPrecision> {
        match self {
            TimestampFormat::Iso8601 => Some(SecondPrecision {
                prefix: "%Y-%m-%dT%H:%M:%S",
                separator: '.',
                suffix: "Z",
            }),
            TimestampFormat::Absolute => Some(SecondPrecision {
                prefix: "%H:%M:%S",
                separator: ',',
                suffix: "",
            }),
            TimestampFormat::Date => Some(SecondPrecision {
                prefix: "%d %b %Y %H:%M:%S",
                separator: ',',
                suffix: "",
            }),
            _ => None,
        }
    }
}

/// Timestamp formatter that caches the rendered whole-second prefix
///
/// Consecutive log events mostly fall in the same second, so only the
/// millisecond part has to be rendered for them. Output is always identical
/// to [`TimestampFormat::format`]; formats without a fixed
/// `<seconds><sep><millis>` shape are rendered uncached.
///
/// # Examples
///
/// ```
/// use rust_logger_registry::core::{CachedTimestampFormatter, TimestampFormat};
/// use chrono::Utc;
///
/// let formatter = CachedTimestampFormatter::new(TimestampFormat::Absolute);
/// let now = Utc::now();
/// assert_eq!(formatter.format(&now), TimestampFormat::Absolute.format(&now));
/// ```
#[derive(Debug)]
pub struct CachedTimestampFormatter {
    format: TimestampFormat,
    /// Last rendered second and its prefix
    cache: Mutex<Option<(i64, String)>>,
}

impl CachedTimestampFormatter {
    #[must_use]
    pub fn new(format: TimestampFormat) -> Self {
        Self {
            format,
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.format
    }

    /// Unix second whose prefix is currently cached
    #[must_use]
    pub fn cached_second(&self) -> Option<i64> {
        self.cache.lock().as_ref().map(|(second, _)| *second)
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        let Some(shape) = self.format.second_precision() else {
            return self.format.format(datetime);
        };

        let millis = datetime.timestamp_subsec_millis();
        if millis >= 1000 {
            // leap second
            return self.format.format(datetime);
        }

        let second = datetime.timestamp();
        let mut cache = self.cache.lock();
        if cache.as_ref().map(|(cached, _)| *cached) != Some(second) {
            *cache = Some((second, datetime.format(shape.prefix).to_string()));
        }
        let prefix = cache.as_ref().map(|(_, prefix)| prefix.as_str()).unwrap_or_default();

        format!("{}{}{:03}{}", prefix, shape.separator, millis, shape.suffix)
    }
}

impl Clone for CachedTimestampFormatter {
    fn clone(&self) -> Self {
        Self::new(self.format.clone())
    }
}

impl Default for CachedTimestampFormatter {
    fn default() -> Self {
        Self::new(TimestampFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let result = TimestampFormat::Iso8601Micros.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456Z");
    }

    #[test]
    fn test_absolute_format() {
        let result = TimestampFormat::Absolute.format(&fixed_datetime());
        assert_eq!(result, "10:30:45,123");
    }

    #[test]
    fn test_date_format() {
        let result = TimestampFormat::Date.format(&fixed_datetime());
        assert_eq!(result, "08 Jan 2025 10:30:45,123");
    }

    #[test]
    fn test_custom_apache_format() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S +0000".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45 +0000");
    }

    #[test]
    fn test_cacheable_formats() {
        assert!(TimestampFormat::Iso8601.is_second_cacheable());
        assert!(TimestampFormat::Absolute.is_second_cacheable());
        assert!(TimestampFormat::Date.is_second_cacheable());
        assert!(!TimestampFormat::Rfc3339.is_second_cacheable());
        assert!(!TimestampFormat::UnixMillis.is_second_cacheable());
        assert!(!TimestampFormat::Custom("%Y".to_string()).is_second_cacheable());
    }

    #[test]
    fn test_cached_matches_uncached() {
        for format in [
            TimestampFormat::Iso8601,
            TimestampFormat::Absolute,
            TimestampFormat::Date,
            TimestampFormat::Rfc3339,
        ] {
            let formatter = CachedTimestampFormatter::new(format.clone());
            let base = fixed_datetime();
            for offset_ms in [0, 5, 876, 1000, 1001, 59_999] {
                let dt = base + chrono::Duration::milliseconds(offset_ms);
                assert_eq!(formatter.format(&dt), format.format(&dt), "{:?} +{}ms", format, offset_ms);
            }
        }
    }

    #[test]
    fn test_cache_tracks_current_second() {
        let formatter = CachedTimestampFormatter::new(TimestampFormat::Absolute);
        assert_eq!(formatter.cached_second(), None);

        let dt = fixed_datetime();
        let _ = formatter.format(&dt);
        assert_eq!(formatter.cached_second(), Some(dt.timestamp()));

        // Same second keeps the cached prefix
        let same = dt + chrono::Duration::milliseconds(500);
        assert_eq!(formatter.format(&same), "10:30:45,623");
        assert_eq!(formatter.cached_second(), Some(dt.timestamp()));

        let next = dt + chrono::Duration::seconds(1);
        assert_eq!(formatter.format(&next), "10:30:46,123");
        assert_eq!(formatter.cached_second(), Some(dt.timestamp() + 1));
    }

    #[test]
    fn test_uncacheable_format_leaves_cache_empty() {
        let formatter = CachedTimestampFormatter::new(TimestampFormat::Unix);
        let _ = formatter.format(&fixed_datetime());
        assert_eq!(formatter.cached_second(), None);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TimestampFormat::Absolute).expect("serialize");
        assert_eq!(json, "\"Absolute\"");

        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
