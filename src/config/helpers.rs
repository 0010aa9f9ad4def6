use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de};
use url::Url;

/// Custom deserializer for Duration from milliseconds
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Custom deserializer for Duration from seconds
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Custom serializer for Duration to milliseconds
pub fn serialize_duration_to_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Custom serializer for Duration to seconds
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

/// Custom deserializer for a single URL.
pub fn deserialize_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Url::parse(&s).map_err(de::Error::custom)
}

/// Custom deserializer for an optional URL. Empty strings are treated as
/// absent so environment overrides can clear a configured URL.
pub fn deserialize_optional_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => Url::parse(&s).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestDurations {
        #[serde(
            deserialize_with = "deserialize_duration_from_ms",
            serialize_with = "serialize_duration_to_ms"
        )]
        timeout: Duration,
        #[serde(
            deserialize_with = "deserialize_duration_from_seconds",
            serialize_with = "serialize_duration_to_seconds"
        )]
        cooldown: Duration,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestUrl {
        #[serde(deserialize_with = "deserialize_url")]
        url: Url,
    }

    #[test]
    fn test_durations_use_their_units() {
        let parsed: TestDurations =
            serde_json::from_str(r#"{"timeout": 5000, "cooldown": 86400}"#).unwrap();
        assert_eq!(parsed.timeout, Duration::from_millis(5000));
        assert_eq!(parsed.cooldown, Duration::from_secs(86400));
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"{"timeout":5000,"cooldown":86400}"#
        );
    }

    #[test]
    fn test_deserialize_url() {
        let parsed: TestUrl = serde_json::from_str(r#"{"url": "http://relay.local/push"}"#).unwrap();
        assert_eq!(parsed.url.as_str(), "http://relay.local/push");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestOptionalUrl {
        #[serde(default, deserialize_with = "deserialize_optional_url")]
        url: Option<Url>,
    }

    #[test]
    fn test_deserialize_optional_url() {
        let present: TestOptionalUrl =
            serde_json::from_str(r#"{"url": "http://upstream.local/api/"}"#).unwrap();
        assert_eq!(present.url.unwrap().as_str(), "http://upstream.local/api/");

        let missing: TestOptionalUrl = serde_json::from_str("{}").unwrap();
        assert!(missing.url.is_none());

        let empty: TestOptionalUrl = serde_json::from_str(r#"{"url": ""}"#).unwrap();
        assert!(empty.url.is_none());
    }

    #[test]
    fn test_deserialize_invalid_url() {
        let result: Result<TestUrl, _> = serde_json::from_str(r#"{"url": "not a valid url"}"#);
        assert!(result.is_err());
    }
}
