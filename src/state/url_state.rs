/// URL state definitions for tracking crawl progress
///
/// A URL enters the frontier as `Discovered` and leaves it through exactly one
/// of the three terminal states.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrlState {
    /// Known but not yet processed
    Discovered,

    // ===== Terminal States =====
    /// Fetched, converted and written to disk
    Visited,

    /// Fetch or extraction failed; the error is kept on the record
    Failed,

    /// Deliberately not fetched (e.g. its artifact already exists)
    Skipped,
}

impl UrlState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Discovered)
    }

    /// Returns true if the URL is still waiting to be processed
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Discovered)
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Visited => "visited",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "discovered" => Some(Self::Discovered),
            "visited" => Some(Self::Visited),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Returns all possible URL states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Discovered, Self::Visited, Self::Failed, Self::Skipped]
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
