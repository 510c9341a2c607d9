use crate::state::UrlState;
use chrono::{DateTime, Utc};

/// Outcome of asking a record to change state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record moved into the requested state
    Applied,
    /// The record was already in the requested state; nothing changed
    Unchanged,
    /// The record is in a different terminal state and stays there
    Refused,
}

/// Everything known about one URL
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// Canonical absolute URL, fragment stripped
    pub url: String,
    pub state: UrlState,
    /// Scheduling priority only; shallower URLs are fetched first
    pub depth: u32,
    /// Page on which the URL was first found (None for the seed)
    pub source_url: Option<String>,
    pub discovered_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub skipped_at: Option<DateTime<Utc>>,
    /// Set only while the record is `Failed`
    pub error: Option<String>,
    /// Set only while the record is `Skipped`
    pub skip_reason: Option<String>,
}

impl UrlRecord {
    /// Creates a fresh record in the `Discovered` state
    pub fn discovered(url: impl Into<String>, depth: u32, source_url: Option<String>) -> Self {
        Self {
            url: url.into(),
            state: UrlState::Discovered,
            depth,
            source_url,
            discovered_at: Utc::now(),
            processed_at: None,
            failed_at: None,
            skipped_at: None,
            error: None,
            skip_reason: None,
        }
    }

    /// Moves the record into `target`, stamping `at` and the diagnostic `detail`
    ///
    /// Repeating the current state is a no-op that keeps the original
    /// timestamp. Leaving a terminal state is refused. `Discovered` is never
    /// a valid target for an existing record.
    pub fn transition(
        &mut self,
        target: UrlState,
        detail: Option<String>,
        at: DateTime<Utc>,
    ) -> Transition {
        if self.state == target {
            return Transition::Unchanged;
        }

        if self.state.is_terminal() || !target.is_terminal() {
            return Transition::Refused;
        }

        self.state = target;
        match target {
            UrlState::Visited => self.processed_at = Some(at),
            UrlState::Failed => {
                self.failed_at = Some(at);
                self.error = detail;
            }
            UrlState::Skipped => {
                self.skipped_at = Some(at);
                self.skip_reason = detail;
            }
            UrlState::Discovered => {}
        }

        Transition::Applied
    }
}
