use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One observed image tag transition.
///
/// Field order is the on-disk order of the JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub image_name: String,
    pub old_tag: String,
    pub new_tag: String,
    #[serde(with = "rfc3339_seconds")]
    pub update_at: DateTime<Utc>,
    /// Set only for reported image swaps, where the base name changed too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_image_name: Option<String>,
}

impl ChangeRecord {
    pub fn tag_change(
        image_name: impl Into<String>,
        old_tag: impl Into<String>,
        new_tag: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            image_name: image_name.into(),
            old_tag: old_tag.into(),
            new_tag: new_tag.into(),
            update_at: detected_at.trunc_subsecs(0),
            previous_image_name: None,
        }
    }

    pub fn image_swap(
        previous_image_name: impl Into<String>,
        image_name: impl Into<String>,
        old_tag: impl Into<String>,
        new_tag: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            previous_image_name: Some(previous_image_name.into()),
            ..Self::tag_change(image_name, old_tag, new_tag, detected_at)
        }
    }

    pub fn is_image_swap(&self) -> bool {
        self.previous_image_name.is_some()
    }
}

/// RFC 3339 with whole seconds and a `Z` suffix, e.g. `2024-05-01T12:30:00Z`.
mod rfc3339_seconds {
    use chrono::DateTime;
    use chrono::SecondsFormat;
    use chrono::Utc;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("Invalid RFC 3339 timestamp '{s}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    use super::*;

    fn detected_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn serializes_with_fixed_field_order() {
        let record = ChangeRecord::tag_change(
            "registry.example.com/app",
            "1.2.0",
            "1.3.0",
            detected_at(),
        );

        let line = serde_json::to_string(&record).expect("should serialize");
        assert_eq!(
            line,
            r#"{"image_name":"registry.example.com/app","old_tag":"1.2.0","new_tag":"1.3.0","update_at":"2024-05-01T12:30:00Z"}"#
        );
    }

    #[test]
    fn round_trip_preserves_all_fields() {
        let with_nanos = detected_at() + chrono::Duration::nanoseconds(123_456_789);
        let record = ChangeRecord::tag_change("registry.example.com/app", "1.2.0", "1.3.0", with_nanos);

        let line = serde_json::to_string(&record).expect("should serialize");
        let parsed: ChangeRecord = serde_json::from_str(&line).expect("should parse back");

        assert_eq!(parsed, record);
        assert_eq!(parsed.update_at, detected_at());
    }

    #[test]
    fn swap_record_names_previous_image() {
        let record = ChangeRecord::image_swap(
            "registry.example.com/old-app",
            "registry.example.com/app",
            "1.0",
            "2.0",
            detected_at(),
        );

        assert!(record.is_image_swap());
        let line = serde_json::to_string(&record).expect("should serialize");
        assert!(line.ends_with(r#""previous_image_name":"registry.example.com/old-app"}"#));
    }

    #[test]
    fn offset_timestamps_are_normalized_to_utc() {
        let parsed: ChangeRecord = serde_json::from_str(
            r#"{"image_name":"a","old_tag":"1","new_tag":"2","update_at":"2024-05-01T20:30:00+08:00"}"#,
        )
        .expect("should parse");

        assert_eq!(parsed.update_at, detected_at());
        assert_eq!(parsed.previous_image_name, None);
    }
}
