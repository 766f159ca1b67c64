// View models computed from controller state. Pure functions only; the CLI
// (or any other front end) prints what these return.

use std::collections::HashMap;

use serde::Serialize;

use scrumble_core::protocol::{ActiveMatchupResponse, Entry, HistoryItem, Matchup, Side, VoteTally};
use scrumble_core::slug::slugify;

pub const DEFAULT_TAG: &str = "Local";
pub const NO_PAST_MATCHUPS: &str = "No past brawls yet";
pub const NO_MATCHUPS: &str = "No matchups yet";
pub const NO_ACTIVE_MATCHUP: &str = "No active matchup";
pub const UNABLE_TO_LOAD: &str = "Unable to load";

// ---------------------------------------------------------------------------
// Percentages and previews
// ---------------------------------------------------------------------------

/// Share of the vote per side as whole percentages. Left is rounded half up
/// and right takes the remainder so the pair always sums to 100; an empty
/// tally is `(0, 0)`.
pub fn vote_percentages(tally: &VoteTally) -> (u64, u64) {
    let total = tally.total();
    if total == 0 {
        return (0, 0);
    }
    let left = ((tally.left as f64 / total as f64) * 100.0).round() as u64;
    (left, 100 - left)
}

/// Website preview for an entry: its own link if it has one, else a
/// configured override looked up by slugified id, then slugified name.
pub fn resolve_preview_url(entry: &Entry, overrides: &HashMap<String, String>) -> Option<String> {
    if let Some(direct) = entry.direct_link() {
        return Some(direct.to_string());
    }

    [entry.id.as_str(), entry.name.as_str()]
        .into_iter()
        .filter(|k| !k.is_empty())
        .map(slugify)
        .find_map(|key| overrides.get(&key).cloned())
}

/// `"Pick <first word>"` button label.
pub fn pick_label(name: &str) -> String {
    let first = name.split(' ').next().unwrap_or_default();
    format!("Pick {first}")
}

// ---------------------------------------------------------------------------
// Arena (public voting view)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryCard {
    pub name: String,
    pub subtitle: String,
    pub tag: String,
    pub blurb: String,
    pub button_label: String,
    pub button_enabled: bool,
    pub preview_url: Option<String>,
    pub count: u64,
    pub percent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaView {
    pub title: String,
    pub subtitle: String,
    pub left: EntryCard,
    pub right: EntryCard,
    pub voted: Option<Side>,
}

/// Inputs for `arena_view` that come from configuration rather than the
/// backend.
#[derive(Debug, Clone, Default)]
pub struct ArenaSettings {
    pub region: String,
    pub preview_overrides: HashMap<String, String>,
}

pub fn arena_view(
    matchup: &Matchup,
    left: &Entry,
    right: &Entry,
    votes: &VoteTally,
    voted: Option<Side>,
    settings: &ArenaSettings,
) -> ArenaView {
    let (left_pct, right_pct) = vote_percentages(votes);
    let card = |entry: &Entry, side: Side, percent: u64| {
        let button_label = match voted {
            None => pick_label(&entry.name),
            Some(choice) if choice == side => "Picked".to_string(),
            Some(_) => "Closed".to_string(),
        };
        EntryCard {
            name: entry.name.clone(),
            subtitle: format!("{} - {}", entry.neighborhood, matchup.category),
            tag: if entry.tag.is_empty() {
                DEFAULT_TAG.to_string()
            } else {
                entry.tag.clone()
            },
            blurb: entry.blurb.clone(),
            button_label,
            button_enabled: voted.is_none(),
            preview_url: resolve_preview_url(entry, &settings.preview_overrides),
            count: votes.get(side),
            percent,
        }
    };

    ArenaView {
        title: matchup.title.clone(),
        subtitle: format!("{} - {}", settings.region, matchup.category),
        left: card(left, Side::Left, left_pct),
        right: card(right, Side::Right, right_pct),
        voted,
    }
}

// ---------------------------------------------------------------------------
// Active matchup (admin view)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveView {
    pub title: String,
    pub meta: String,
    pub counts: String,
}

impl ActiveView {
    pub fn from_response(resp: &ActiveMatchupResponse) -> Self {
        let title = resp
            .matchup
            .as_ref()
            .map(|m| m.title.clone())
            .unwrap_or_else(|| NO_ACTIVE_MATCHUP.to_string());
        let left = resp.left.as_ref().map(|e| e.name.as_str()).unwrap_or_default();
        let right = resp.right.as_ref().map(|e| e.name.as_str()).unwrap_or_default();
        let category = resp
            .matchup
            .as_ref()
            .map(|m| m.category.as_str())
            .unwrap_or_default();
        let votes = resp.votes.unwrap_or_default();

        Self {
            title,
            meta: format!("{left} vs {right} - {category}"),
            counts: format!("{} left / {} right", votes.left, votes.right),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: UNABLE_TO_LOAD.to_string(),
            meta: String::new(),
            counts: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub title: String,
    pub meta: String,
    pub winner: String,
    pub loser: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
    /// Shown instead of rows when the backend had nothing at all.
    pub empty_message: Option<String>,
}

fn result_lines(item: &HistoryItem, left_won: bool) -> (String, String) {
    let (winner, winner_votes, loser, loser_votes) = if left_won {
        (&item.left.name, item.votes.left, &item.right.name, item.votes.right)
    } else {
        (&item.right.name, item.votes.right, &item.left.name, item.votes.left)
    };
    (format!("{winner} {winner_votes}"), format!("{loser} {loser_votes}"))
}

/// Past matchups for voters: the active one is hidden and a tie goes to the
/// right-hand entry.
pub fn public_history(items: &[HistoryItem]) -> HistoryView {
    if items.is_empty() {
        return HistoryView {
            rows: Vec::new(),
            empty_message: Some(NO_PAST_MATCHUPS.to_string()),
        };
    }

    let rows = items
        .iter()
        .filter(|item| !item.active)
        .map(|item| {
            let (winner, loser) = result_lines(item, item.votes.left > item.votes.right);
            HistoryRow {
                title: item.title.clone(),
                meta: format!("{} • {} votes", item.category, item.votes.total()),
                winner,
                loser,
            }
        })
        .collect();

    HistoryView {
        rows,
        empty_message: None,
    }
}

/// Every matchup for operators: the active one is marked and a tie goes to
/// the left-hand entry.
pub fn admin_history(items: &[HistoryItem]) -> HistoryView {
    if items.is_empty() {
        return HistoryView {
            rows: Vec::new(),
            empty_message: Some(NO_MATCHUPS.to_string()),
        };
    }

    let rows = items
        .iter()
        .map(|item| {
            let (winner, loser) = result_lines(item, item.votes.left >= item.votes.right);
            let title = if item.active {
                format!("{} (active)", item.title)
            } else {
                item.title.clone()
            };
            HistoryRow {
                title,
                meta: format!("{} - {} votes", item.category, item.votes.total()),
                winner,
                loser,
            }
        })
        .collect();

    HistoryView {
        rows,
        empty_message: None,
    }
}
