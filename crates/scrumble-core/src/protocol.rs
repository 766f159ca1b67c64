// Wire types exchanged with the matchup backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Which of the two entries in a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn from_str_side(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Side::Left),
            "right" | "r" => Some(Side::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A head-to-head pairing of two entries. Backends omit fields freely, so
/// everything defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_entry_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
}

/// A contestant within a matchup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub neighborhood: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blurb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Entry {
    /// First non-empty link carried by the entry itself.
    pub fn direct_link(&self) -> Option<&str> {
        [&self.website, &self.url, &self.site, &self.link]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty())
    }
}

/// Per-matchup vote counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(default, deserialize_with = "null_as_default")]
    pub left: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub right: u64,
}

impl VoteTally {
    pub fn total(&self) -> u64 {
        self.left.saturating_add(self.right)
    }

    pub fn get(&self, side: Side) -> u64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Add one vote to `side`. Tallies only ever grow on the client.
    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left = self.left.saturating_add(1),
            Side::Right => self.right = self.right.saturating_add(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `GET /matchup`. Every part is optional: no active matchup yields `{}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActiveMatchupResponse {
    #[serde(default)]
    pub matchup: Option<Matchup>,
    #[serde(default)]
    pub left: Option<Entry>,
    #[serde(default)]
    pub right: Option<Entry>,
    #[serde(default)]
    pub votes: Option<VoteTally>,
}

/// One row of `GET /history`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub left: Entry,
    #[serde(default, deserialize_with = "null_as_default")]
    pub right: Entry,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: VoteTally,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Option<Vec<HistoryItem>>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /vote`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteRequest {
    pub matchup_id: String,
    pub side: Side,
    pub fingerprint: String,
}

/// `POST /admin/activate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivateRequest {
    pub matchup_id: String,
}

/// Matchup half of `POST /admin/matchup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMatchup {
    pub id: String,
    pub title: String,
    pub category: String,
    pub left_entry_id: String,
    pub right_entry_id: String,
    pub active: bool,
}

/// `POST /admin/matchup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateMatchupRequest {
    pub matchup: NewMatchup,
    pub left: Entry,
    pub right: Entry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
        let side: Side = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(side, Side::Right);
    }

    #[test]
    fn side_parsing_and_other() {
        assert_eq!(Side::from_str_side(" LEFT "), Some(Side::Left));
        assert_eq!(Side::from_str_side("r"), Some(Side::Right));
        assert_eq!(Side::from_str_side("middle"), None);
        assert_eq!(Side::Left.other(), Side::Right);
    }

    #[test]
    fn tally_increment_only_touches_one_side() {
        let mut tally = VoteTally { left: 3, right: 5 };
        tally.increment(Side::Left);
        assert_eq!(tally, VoteTally { left: 4, right: 5 });
        assert_eq!(tally.total(), 9);
        assert_eq!(tally.get(Side::Right), 5);
    }

    #[test]
    fn sparse_matchup_payload_parses() {
        let data = r#"{
            "matchup": { "id": "m1", "title": "T" },
            "left": { "name": "A" },
            "right": { "name": "B" },
            "votes": { "left": 3, "right": 5 }
        }"#;
        let resp: ActiveMatchupResponse = serde_json::from_str(data).unwrap();
        let matchup = resp.matchup.unwrap();
        assert_eq!(matchup.id, "m1");
        assert_eq!(matchup.category, "");
        assert!(!matchup.active);
        assert_eq!(resp.left.unwrap().name, "A");
        assert_eq!(resp.votes, Some(VoteTally { left: 3, right: 5 }));
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let data = r#"{
            "matchup": { "id": "m1", "title": "T", "category": null, "active": null },
            "left": { "name": "A", "tag": null, "neighborhood": null, "website": null },
            "right": { "id": null, "name": "B", "blurb": null },
            "votes": { "left": null, "right": 2 }
        }"#;
        let resp: ActiveMatchupResponse = serde_json::from_str(data).unwrap();
        let matchup = resp.matchup.unwrap();
        assert_eq!(matchup.category, "");
        assert!(!matchup.active);
        let left = resp.left.unwrap();
        assert_eq!(left.name, "A");
        assert_eq!(left.tag, "");
        assert_eq!(left.neighborhood, "");
        assert_eq!(left.website, None);
        assert_eq!(resp.right.unwrap().id, "");
        assert_eq!(resp.votes, Some(VoteTally { left: 0, right: 2 }));
    }

    #[test]
    fn null_history_parts_fall_back_to_defaults() {
        let data = r#"{ "history": [
            { "id": "m1", "title": null, "active": null, "left": null, "right": { "name": "B" }, "votes": null }
        ] }"#;
        let resp: HistoryResponse = serde_json::from_str(data).unwrap();
        let item = &resp.history.unwrap()[0];
        assert_eq!(item.title, "");
        assert!(!item.active);
        assert_eq!(item.left, Entry::default());
        assert_eq!(item.right.name, "B");
        assert_eq!(item.votes, VoteTally::default());
    }

    #[test]
    fn tally_saturates_instead_of_overflowing() {
        let mut tally = VoteTally { left: u64::MAX, right: 1 };
        assert_eq!(tally.total(), u64::MAX);
        tally.increment(Side::Left);
        assert_eq!(tally.left, u64::MAX);
    }

    #[test]
    fn empty_object_is_no_active_matchup() {
        let resp: ActiveMatchupResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, ActiveMatchupResponse::default());
    }

    #[test]
    fn direct_link_prefers_website_and_skips_empty() {
        let entry = Entry {
            website: Some(String::new()),
            url: Some("https://a.example".into()),
            link: Some("https://b.example".into()),
            ..Entry::default()
        };
        assert_eq!(entry.direct_link(), Some("https://a.example"));
        assert_eq!(Entry::default().direct_link(), None);
    }

    #[test]
    fn create_request_shape() {
        let req = CreateMatchupRequest {
            matchup: NewMatchup {
                id: "m006".into(),
                title: "Best Coffee Throwdown".into(),
                category: "food".into(),
                left_entry_id: "mean-mug".into(),
                right_entry_id: "vulpes-coffee".into(),
                active: true,
            },
            left: Entry {
                id: "mean-mug".into(),
                name: "Mean Mug".into(),
                ..Entry::default()
            },
            right: Entry {
                id: "vulpes-coffee".into(),
                name: "Vulpes Coffee".into(),
                ..Entry::default()
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["matchup"]["left_entry_id"], "mean-mug");
        assert_eq!(json["matchup"]["active"], true);
        assert_eq!(json["left"]["name"], "Mean Mug");
        assert!(json["left"].get("website").is_none());
    }
}
