// Voting controller: loads the active matchup and applies at most one vote
// per loaded matchup, updating the local tally optimistically.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use scrumble_core::api::{ApiClient, ApiError};
use scrumble_core::credentials::FingerprintStore;
use scrumble_core::protocol::{Entry, Matchup, Side, VoteTally};

use crate::presenter::{arena_view, ArenaSettings, ArenaView};

/// Vote state for the currently loaded matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    NotVoted,
    /// Submitted, response not yet in. Further votes are ignored.
    Pending(Side),
    /// Terminal until the next `load_matchup`.
    Voted(Side),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded(Side),
    /// Nothing loaded, or a vote is already pending or recorded.
    Ignored,
    /// The submission failed; state is back to `NotVoted`.
    Failed(String),
}

#[derive(Debug)]
struct Session {
    matchup: Option<Matchup>,
    left: Option<Entry>,
    right: Option<Entry>,
    votes: Option<VoteTally>,
    state: VoteState,
}

impl Session {
    fn empty() -> Self {
        Self {
            matchup: None,
            left: None,
            right: None,
            votes: None,
            state: VoteState::NotVoted,
        }
    }
}

pub struct VotingController {
    api: Arc<ApiClient>,
    fingerprints: FingerprintStore,
    settings: ArenaSettings,
    session: Mutex<Session>,
}

impl VotingController {
    pub fn new(api: Arc<ApiClient>, fingerprints: FingerprintStore, settings: ArenaSettings) -> Self {
        Self {
            api,
            fingerprints,
            settings,
            session: Mutex::new(Session::empty()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("vote session mutex poisoned")
    }

    /// Fetch the active matchup and start a fresh `NotVoted` session for it.
    /// On failure the previous session is left untouched.
    pub async fn load_matchup(&self) -> Result<(), ApiError> {
        let resp = match self.api.fetch_matchup().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("Failed to load matchup: {e}");
                return Err(e);
            }
        };

        let mut session = self.session();
        if let Some(m) = &resp.matchup {
            info!("Loaded matchup {} ({})", m.id, m.title);
        } else {
            info!("No active matchup");
        }
        session.matchup = resp.matchup;
        session.left = resp.left;
        session.right = resp.right;
        session.votes = resp.votes;
        session.state = VoteState::NotVoted;
        Ok(())
    }

    pub fn state(&self) -> VoteState {
        self.session().state
    }

    pub fn tally(&self) -> Option<VoteTally> {
        self.session().votes
    }

    pub fn matchup(&self) -> Option<Matchup> {
        self.session().matchup.clone()
    }

    /// Vote for `side` once.
    ///
    /// The session moves to `Pending` before the request leaves, so a second
    /// call made while the first is in flight is ignored. This guards repeat
    /// clicks within one session only; a fresh process can vote again.
    pub async fn vote(&self, side: Side) -> VoteOutcome {
        let matchup_id = {
            let mut session = self.session();
            if session.state != VoteState::NotVoted {
                debug!(?side, state = ?session.state, "vote ignored");
                return VoteOutcome::Ignored;
            }
            let matchup_id = match (&session.matchup, &session.votes) {
                (Some(m), Some(_)) => m.id.clone(),
                _ => {
                    debug!(?side, "vote ignored: no matchup loaded");
                    return VoteOutcome::Ignored;
                }
            };
            session.state = VoteState::Pending(side);
            matchup_id
        };

        let result = match self.fingerprints.get_fingerprint() {
            Ok(fingerprint) => self
                .api
                .submit_vote(&matchup_id, side, &fingerprint)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("{e:#}")),
        };

        let mut session = self.session();
        let same_matchup = session.matchup.as_ref().is_some_and(|m| m.id == matchup_id);
        if !same_matchup || session.state != VoteState::Pending(side) {
            debug!("matchup reloaded while vote was in flight; dropping result");
            return match result {
                Ok(()) => VoteOutcome::Recorded(side),
                Err(message) => VoteOutcome::Failed(message),
            };
        }

        match result {
            Ok(()) => {
                session.state = VoteState::Voted(side);
                if let Some(votes) = session.votes.as_mut() {
                    votes.increment(side);
                }
                info!("Vote recorded: {matchup_id} -> {side}");
                VoteOutcome::Recorded(side)
            }
            Err(message) => {
                session.state = VoteState::NotVoted;
                warn!("Vote failed: {message}");
                VoteOutcome::Failed(message)
            }
        }
    }

    /// Arena view for the loaded matchup, or `None` until matchup, both
    /// entries and the tally are all present.
    pub fn arena(&self) -> Option<ArenaView> {
        let session = self.session();
        let voted = match session.state {
            VoteState::Voted(side) => Some(side),
            _ => None,
        };
        match (&session.matchup, &session.left, &session.right, &session.votes) {
            (Some(m), Some(l), Some(r), Some(v)) => Some(arena_view(m, l, r, v, voted, &self.settings)),
            _ => None,
        }
    }
}
