use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::ShareError;

/// Lifetime of a published link.
///
/// Encoded on disk as integer nanoseconds with `-1` meaning "never expires".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiry {
    Never,
    After(Duration),
}

impl Expiry {
    const NEVER_NANOS: i64 = -1;

    pub fn hours(hours: u64) -> Self {
        Self::After(Duration::from_secs(hours * 3600))
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Expiry::Never => None,
            Expiry::After(d) => Some(*d),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Expiry::Never)
    }

    /// Whether something created at `created` has outlived this expiry at `now`.
    pub fn is_elapsed(&self, created: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::After(limit) => match (now - created).to_std() {
                Ok(age) => age > *limit,
                // created in the future
                Err(_) => false,
            },
        }
    }

    fn from_nanos(nanos: i64) -> Result<Self, String> {
        match nanos {
            Self::NEVER_NANOS => Ok(Expiry::Never),
            n if n < 0 => Err(format!("negative expiry {n}")),
            n => Ok(Expiry::After(Duration::from_nanos(n as u64))),
        }
    }

    fn as_nanos(&self) -> i64 {
        match self {
            Expiry::Never => Self::NEVER_NANOS,
            Expiry::After(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        }
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Expiry::hours(168)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Never => f.write_str("never"),
            Expiry::After(d) => write!(f, "{}", humantime::format_duration(*d)),
        }
    }
}

impl FromStr for Expiry {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("never") || s == "-1" {
            return Ok(Expiry::Never);
        }
        humantime::parse_duration(s)
            .map(Expiry::After)
            .map_err(|e| ShareError::config(format!("invalid duration '{s}': {e}")))
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_nanos())
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExpiryVisitor;

        impl Visitor<'_> for ExpiryVisitor {
            type Value = Expiry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("nanoseconds as an integer or a duration string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Expiry, E> {
                Expiry::from_nanos(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Expiry, E> {
                Ok(Expiry::After(Duration::from_nanos(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Expiry, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ExpiryVisitor)
    }
}

/// Which bucket an upload lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(ShareError::validation(format!(
                "unexpected policy '{other}' (expected 'public' or 'private')"
            ))),
        }
    }
}

/// One published file: the object link, its short link and when it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "minio_link")]
    pub object_link: String,
    #[serde(rename = "yourls_link")]
    pub short_link: String,
    pub expiry: Expiry,
}

impl UploadRecord {
    /// Build an unsaved record. `id` and `timestamp` are assigned by the registry.
    pub fn new<O, S>(object_link: O, short_link: S, expiry: Expiry) -> Self
    where
        O: Into<String>,
        S: Into<String>,
    {
        Self {
            id: 0,
            timestamp: Utc::now(),
            object_link: object_link.into(),
            short_link: short_link.into(),
            expiry,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ShareError> {
        if self.object_link.is_empty() {
            return Err(ShareError::validation("object link cannot be empty"));
        }
        if self.short_link.is_empty() {
            return Err(ShareError::validation("short link cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_parses_go_style_and_sentinels() {
        assert_eq!("168h".parse::<Expiry>().unwrap(), Expiry::hours(168));
        assert_eq!("never".parse::<Expiry>().unwrap(), Expiry::Never);
        assert_eq!("-1".parse::<Expiry>().unwrap(), Expiry::Never);
        assert!("soon".parse::<Expiry>().is_err());
    }

    #[test]
    fn expiry_is_stored_as_nanoseconds() {
        let json = serde_json::to_string(&Expiry::hours(1)).unwrap();
        assert_eq!(json, "3600000000000");
        assert_eq!(serde_json::to_string(&Expiry::Never).unwrap(), "-1");

        let back: Expiry = serde_json::from_str("3600000000000").unwrap();
        assert_eq!(back, Expiry::hours(1));
        let never: Expiry = serde_json::from_str("-1").unwrap();
        assert_eq!(never, Expiry::Never);
        let text: Expiry = serde_json::from_str("\"2h\"").unwrap();
        assert_eq!(text, Expiry::hours(2));
        assert!(serde_json::from_str::<Expiry>("-5").is_err());
    }

    #[test]
    fn elapsed_respects_limit_and_never() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = created + chrono::Duration::hours(2);
        assert!(Expiry::hours(1).is_elapsed(created, now));
        assert!(!Expiry::hours(2).is_elapsed(created, now));
        assert!(!Expiry::Never.is_elapsed(created, now));
    }

    #[test]
    fn visibility_accepts_only_literals() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!(matches!(
            "Public".parse::<Visibility>(),
            Err(ShareError::Validation { .. })
        ));
    }

    #[test]
    fn record_uses_wire_field_names() {
        let record = UploadRecord::new("http://s3/a.png", "http://y/abc", Expiry::Never);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("minio_link").is_some());
        assert!(value.get("yourls_link").is_some());
        assert_eq!(value["expiry"], -1);
    }
}
