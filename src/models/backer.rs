// src/models/backer.rs

//! Backer record and place-in-line assignment.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single contribution entry as served by the pledge API.
///
/// Only the fields the resolver and reply need are typed. Everything else the
/// source sends is kept in `extra` and written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackerRecord {
    /// Public display name, used as the lookup key. Missing or null reads as
    /// empty, which no lookup can match.
    #[serde(
        rename = "pledger_display_name",
        default,
        deserialize_with = "nullable_string"
    )]
    pub display_name: String,

    /// Avatar URL (opaque)
    #[serde(
        rename = "pledger_image_url",
        default,
        deserialize_with = "nullable_string"
    )]
    pub image_url: String,

    /// Relative time text such as "3 days ago" (opaque)
    #[serde(rename = "time_ago", default, deserialize_with = "nullable_string")]
    pub contributed_at: String,

    /// 1-based rank, oldest contribution first. Absent in source data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_in_line: Option<u32>,

    /// Pass-through source fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BackerRecord {
    /// Create a record with no pass-through fields.
    pub fn new(
        display_name: impl Into<String>,
        image_url: impl Into<String>,
        contributed_at: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            image_url: image_url.into(),
            contributed_at: contributed_at.into(),
            place_in_line: None,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for the place in line.
    pub fn with_place(mut self, place: u32) -> Self {
        self.place_in_line = Some(place);
        self
    }
}

/// Turn backers in API order (newest first) into ranked order (oldest first).
///
/// The result holds places `1..=N` exactly once each.
pub fn assign_places(mut newest_first: Vec<BackerRecord>) -> Vec<BackerRecord> {
    newest_first.reverse();
    for (index, backer) in newest_first.iter_mut().enumerate() {
        backer.place_in_line = Some(index as u32 + 1);
    }
    newest_first
}

/// Accept `null` wherever a string is expected; anonymous pledges send it.
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_places_reverses_api_order() {
        let api_order = vec![
            BackerRecord::new("newest", "", "1 minute ago"),
            BackerRecord::new("middle", "", "1 day ago"),
            BackerRecord::new("oldest", "", "1 month ago"),
        ];

        let ranked = assign_places(api_order);

        let names: Vec<_> = ranked.iter().map(|b| b.display_name.as_str()).collect();
        assert_eq!(names, ["oldest", "middle", "newest"]);
        let places: Vec<_> = ranked.iter().map(|b| b.place_in_line).collect();
        assert_eq!(places, [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_assign_places_overwrites_stale_place() {
        let ranked = assign_places(vec![BackerRecord::new("a", "", "").with_place(42)]);
        assert_eq!(ranked[0].place_in_line, Some(1));
    }

    #[test]
    fn test_pass_through_fields_survive() {
        let raw = r#"{
            "pledger_display_name": "Alice",
            "pledger_image_url": "https://img.example/alice.png",
            "time_ago": "2 days ago",
            "perk_name": "Early Bird",
            "amount": 199
        }"#;

        let backer: BackerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(backer.display_name, "Alice");
        assert_eq!(backer.extra["perk_name"], "Early Bird");

        let out = serde_json::to_value(backer.with_place(7)).unwrap();
        assert_eq!(out["amount"], 199);
        assert_eq!(out["place_in_line"], 7);
        assert_eq!(out["time_ago"], "2 days ago");
    }

    #[test]
    fn test_record_without_name_still_decodes() {
        let raw = r#"[
            {"pledger_image_url": "", "time_ago": "1 day ago"},
            {"pledger_display_name": "Bob", "time_ago": "2 days ago"}
        ]"#;
        let backers: Vec<BackerRecord> = serde_json::from_str(raw).unwrap();
        assert_eq!(backers[0].display_name, "");
        assert_eq!(backers[1].display_name, "Bob");
    }

    #[test]
    fn test_null_fields_become_empty() {
        let raw = r#"{"pledger_display_name": null, "pledger_image_url": null, "time_ago": "now"}"#;
        let backer: BackerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(backer.display_name, "");
        assert_eq!(backer.image_url, "");
        assert!(backer.place_in_line.is_none());
    }
}
