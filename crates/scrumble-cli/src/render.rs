// Plain-text rendering of the view models.

use std::fmt::Write as _;

use scrumble_app::admin::{ActiveRefresh, AdminOutcome, HistoryRefresh};
use scrumble_app::presenter::{ActiveView, ArenaView, EntryCard, HistoryView};
use scrumble_app::status::StatusLine;

pub fn arena(view: &ArenaView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "{}", view.subtitle);
    let _ = writeln!(out);
    entry(&mut out, "LEFT", &view.left);
    let _ = writeln!(out);
    entry(&mut out, "RIGHT", &view.right);
    out
}

fn entry(out: &mut String, label: &str, card: &EntryCard) {
    let _ = writeln!(out, "[{label}] {} ({})", card.name, card.tag);
    let _ = writeln!(out, "  {}", card.subtitle);
    if !card.blurb.is_empty() {
        let _ = writeln!(out, "  {}", card.blurb);
    }
    if let Some(url) = &card.preview_url {
        let _ = writeln!(out, "  {url}");
    }
    let _ = writeln!(out, "  {} votes ({}%)  [{}]", card.count, card.percent, card.button_label);
}

pub fn history(view: &HistoryView) -> String {
    if let Some(message) = &view.empty_message {
        return format!("{message}\n");
    }
    let mut out = String::new();
    for row in &view.rows {
        let _ = writeln!(out, "{}", row.title);
        let _ = writeln!(out, "  {}", row.meta);
        let _ = writeln!(out, "  W {}   L {}", row.winner, row.loser);
    }
    out
}

pub fn active(view: &ActiveView) -> String {
    let mut out = format!("{}\n", view.title);
    if !view.meta.is_empty() {
        let _ = writeln!(out, "{}", view.meta);
    }
    if !view.counts.is_empty() {
        let _ = writeln!(out, "{}", view.counts);
    }
    out
}

pub fn status(line: &StatusLine) -> String {
    if line.is_error {
        format!("error: {}\n", line.message)
    } else {
        format!("{}\n", line.message)
    }
}

pub fn active_refresh(refresh: &ActiveRefresh) -> String {
    let mut out = String::from("== Active ==\n");
    out.push_str(&active(&refresh.view));
    if let Some(line) = &refresh.status {
        out.push_str(&status(line));
    }
    out
}

pub fn history_refresh(refresh: &HistoryRefresh) -> String {
    let mut out = String::from("== History ==\n");
    out.push_str(&history(&refresh.view));
    if let Some(line) = &refresh.status {
        out.push_str(&status(line));
    }
    out
}

/// Status line of an activate/create action followed by the refreshed views.
pub fn outcome(outcome: &AdminOutcome) -> String {
    let mut out = status(&outcome.status);
    if let Some(active) = &outcome.active {
        out.push_str(&active_refresh(active));
    }
    if let Some(history) = &outcome.history {
        out.push_str(&history_refresh(history));
    }
    out
}

pub fn admin_status(api: &str, key: Option<&StatusLine>, refresh: &ActiveRefresh) -> String {
    let mut out = format!("API: {api}\n");
    if let Some(line) = key {
        out.push_str(&status(line));
    }
    out.push_str(&active_refresh(refresh));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrumble_app::presenter::HistoryRow;

    #[test]
    fn empty_history_prints_message_only() {
        let view = HistoryView {
            rows: vec![],
            empty_message: Some("No past brawls yet".into()),
        };
        assert_eq!(history(&view), "No past brawls yet\n");
    }

    #[test]
    fn history_rows() {
        let view = HistoryView {
            rows: vec![HistoryRow {
                title: "Best Coffee Throwdown".into(),
                meta: "food • 9 votes".into(),
                winner: "Mean Mug 5".into(),
                loser: "Vulpes Coffee 4".into(),
            }],
            empty_message: None,
        };
        assert_eq!(
            history(&view),
            "Best Coffee Throwdown\n  food • 9 votes\n  W Mean Mug 5   L Vulpes Coffee 4\n"
        );
    }

    #[test]
    fn error_status_is_prefixed() {
        assert_eq!(status(&StatusLine::error("Admin key missing")), "error: Admin key missing\n");
        assert_eq!(status(&StatusLine::info("Key saved")), "Key saved\n");
    }

    #[test]
    fn unavailable_active_view_is_title_only() {
        assert_eq!(active(&ActiveView::unavailable()), "Unable to load\n");
    }

    #[test]
    fn outcome_without_refresh_is_status_only() {
        let outcome = AdminOutcome {
            status: StatusLine::error("Admin key missing"),
            active: None,
            history: None,
        };
        assert_eq!(super::outcome(&outcome), "error: Admin key missing\n");
    }

    #[test]
    fn admin_status_text() {
        let refresh = ActiveRefresh {
            view: ActiveView::unavailable(),
            status: None,
        };
        assert_eq!(
            admin_status("http://scrumble.test", None, &refresh),
            "API: http://scrumble.test\n== Active ==\nUnable to load\n"
        );
    }
}
