// Admin controller: admin key management, activate/create mutations, and the
// active/history refreshes that follow a successful mutation.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use scrumble_core::api::ApiClient;
use scrumble_core::credentials::AdminKeyStore;
use scrumble_core::protocol::{CreateMatchupRequest, Entry, NewMatchup};
use scrumble_core::slug::slugify;

use crate::presenter::{admin_history, ActiveView, HistoryView};
use crate::status::StatusLine;

// ---------------------------------------------------------------------------
// Local validation
// ---------------------------------------------------------------------------

/// Rejections raised before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a matchup id")]
    MissingMatchupId,

    #[error("Matchup id, title, and category are required")]
    MissingMatchupFields,

    #[error("Both entries need id and name")]
    IncompleteEntries,
}

// ---------------------------------------------------------------------------
// Create form
// ---------------------------------------------------------------------------

/// Raw entry fields as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub id: String,
    pub name: String,
    pub neighborhood: String,
    pub tag: String,
    pub blurb: String,
}

impl EntryForm {
    /// Trimmed entry. A missing id is derived from the name.
    pub fn build_entry(&self) -> Entry {
        let name = self.name.trim().to_string();
        let mut id = self.id.trim().to_string();
        if id.is_empty() && !name.is_empty() {
            id = slugify(&name);
        }
        Entry {
            id,
            name,
            neighborhood: self.neighborhood.trim().to_string(),
            tag: self.tag.trim().to_string(),
            blurb: self.blurb.trim().to_string(),
            ..Entry::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchupForm {
    pub id: String,
    pub title: String,
    pub category: String,
    pub active: bool,
    pub left: EntryForm,
    pub right: EntryForm,
}

impl MatchupForm {
    /// Validate and assemble the `POST /admin/matchup` body.
    pub fn to_request(&self) -> Result<CreateMatchupRequest, ValidationError> {
        let id = self.id.trim();
        let title = self.title.trim();
        let category = self.category.trim();
        let left = self.left.build_entry();
        let right = self.right.build_entry();

        if id.is_empty() || title.is_empty() || category.is_empty() {
            return Err(ValidationError::MissingMatchupFields);
        }
        if left.id.is_empty() || left.name.is_empty() || right.id.is_empty() || right.name.is_empty()
        {
            return Err(ValidationError::IncompleteEntries);
        }

        Ok(CreateMatchupRequest {
            matchup: NewMatchup {
                id: id.to_string(),
                title: title.to_string(),
                category: category.to_string(),
                left_entry_id: left.id.clone(),
                right_entry_id: right.id.clone(),
                active: self.active,
            },
            left,
            right,
        })
    }

    /// Pre-filled example matchup.
    pub fn sample() -> Self {
        Self {
            id: "m006".into(),
            title: "Best Coffee Throwdown".into(),
            category: "food".into(),
            active: false,
            left: EntryForm {
                id: "mean-mug".into(),
                name: "Mean Mug".into(),
                neighborhood: "Northshore".into(),
                tag: "Local".into(),
                blurb: "No-frills coffee with loyal regulars and fast pours.".into(),
            },
            right: EntryForm {
                id: "vulpes-coffee".into(),
                name: "Vulpes Coffee".into(),
                neighborhood: "Southside".into(),
                tag: "Challenger".into(),
                blurb: "Soft jazz, clean menus, and a slow morning vibe.".into(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRefresh {
    pub view: ActiveView,
    /// Set when the load failed.
    pub status: Option<StatusLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRefresh {
    pub view: HistoryView,
    pub status: Option<StatusLine>,
}

/// Result of an activate/create action: the status line plus whichever
/// views were refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOutcome {
    pub status: StatusLine,
    pub active: Option<ActiveRefresh>,
    pub history: Option<HistoryRefresh>,
}

impl AdminOutcome {
    fn status_only(status: StatusLine) -> Self {
        Self {
            status,
            active: None,
            history: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AdminController
// ---------------------------------------------------------------------------

pub struct AdminController {
    api: Arc<ApiClient>,
    admin_keys: AdminKeyStore,
}

impl AdminController {
    pub fn new(api: Arc<ApiClient>, admin_keys: AdminKeyStore) -> Self {
        Self { api, admin_keys }
    }

    /// Where requests go, or a hint on how to configure it.
    pub fn api_base_label(&self) -> String {
        if self.api.is_configured() {
            self.api.base_url().to_string()
        } else {
            "Set SCRUMBLE_API_BASE or api.base_url in config/scrumble.toml".to_string()
        }
    }

    /// Status to show on startup when a key is already stored.
    pub fn key_status(&self) -> Result<Option<StatusLine>> {
        Ok(self
            .admin_keys
            .is_set()?
            .then(|| StatusLine::info("Admin key loaded")))
    }

    /// Store the trimmed input; blank input clears the key.
    pub fn save_key(&self, input: &str) -> Result<StatusLine> {
        let value = input.trim();
        self.admin_keys.set(value)?;
        Ok(StatusLine::info(if value.is_empty() {
            "Key cleared"
        } else {
            "Key saved"
        }))
    }

    pub fn clear_key(&self) -> Result<StatusLine> {
        self.admin_keys.set("")?;
        Ok(StatusLine::info("Key cleared"))
    }

    pub async fn load_active(&self) -> ActiveRefresh {
        match self.api.fetch_matchup().await {
            Ok(resp) => ActiveRefresh {
                view: ActiveView::from_response(&resp),
                status: None,
            },
            Err(e) => {
                warn!("Failed to load active matchup: {e}");
                ActiveRefresh {
                    view: ActiveView::unavailable(),
                    status: Some(StatusLine::error(e.to_string())),
                }
            }
        }
    }

    pub async fn load_history(&self) -> HistoryRefresh {
        match self.api.fetch_history().await {
            Ok(items) => HistoryRefresh {
                view: admin_history(&items),
                status: None,
            },
            Err(e) => {
                warn!("Failed to load history: {e}");
                HistoryRefresh {
                    view: admin_history(&[]),
                    status: Some(StatusLine::error(e.to_string())),
                }
            }
        }
    }

    /// Activate the matchup named by `input` (trimmed). On success the
    /// active and history views are refreshed concurrently, in no particular
    /// order.
    pub async fn activate(&self, input: &str) -> AdminOutcome {
        let matchup_id = input.trim();
        if matchup_id.is_empty() {
            return AdminOutcome::status_only(StatusLine::error(
                ValidationError::MissingMatchupId.to_string(),
            ));
        }

        if let Err(e) = self.api.activate_matchup(matchup_id).await {
            warn!("Activate {matchup_id} failed: {e}");
            return AdminOutcome::status_only(StatusLine::error(e.to_string()));
        }
        info!("Activated matchup {matchup_id}");

        let (active, history) = tokio::join!(self.load_active(), self.load_history());
        AdminOutcome {
            status: StatusLine::info(format!("Activated {matchup_id}")),
            active: Some(active),
            history: Some(history),
        }
    }

    /// Create a matchup from `form`. History is refreshed afterwards, and
    /// the active view too when the new matchup is active.
    pub async fn create(&self, form: &MatchupForm) -> AdminOutcome {
        let request = match form.to_request() {
            Ok(request) => request,
            Err(e) => return AdminOutcome::status_only(StatusLine::error(e.to_string())),
        };
        let matchup_id = request.matchup.id.clone();

        if let Err(e) = self.api.create_matchup(&request).await {
            warn!("Create {matchup_id} failed: {e}");
            return AdminOutcome::status_only(StatusLine::error(e.to_string()));
        }
        info!("Created matchup {matchup_id}");

        let history = self.load_history().await;
        let active = if request.matchup.active {
            Some(self.load_active().await)
        } else {
            None
        };
        AdminOutcome {
            status: StatusLine::info(format!("Created {matchup_id}")),
            active,
            history: Some(history),
        }
    }
}
