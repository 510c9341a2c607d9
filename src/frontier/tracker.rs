use crate::state::{Transition, UrlRecord, UrlState};
use crate::storage::{FrontierStore, StorageResult};
use crate::url::{calculate_depth, UrlFilter};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Counts of URLs by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    /// Every known URL, whatever its state
    pub discovered: usize,
    pub visited: usize,
    pub failed: usize,
    pub skipped: usize,
    /// URLs still waiting to be processed
    pub pending: usize,
}

impl FrontierStats {
    /// URLs that reached a terminal state
    pub fn processed(&self) -> usize {
        self.visited + self.failed + self.skipped
    }
}

/// Tracks every URL of a crawl and its state
///
/// Each URL maps to exactly one [`UrlRecord`], so the pending, visited, failed
/// and skipped sets can never overlap. Only the crawl's control task mutates
/// the frontier.
pub struct Frontier {
    filter: UrlFilter,
    records: HashMap<String, UrlRecord>,
    dirty: HashSet<String>,
    store: Box<dyn FrontierStore>,
}

impl Frontier {
    /// Opens the frontier for a crawl rooted at `base_url`
    ///
    /// All records already persisted in `store` are loaded, which is what makes
    /// a crawl resumable.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The crawl's base URL; scopes the link filter and depth
    /// * `store` - Persistence backend
    ///
    /// # Returns
    ///
    /// * `Ok(Frontier)` - Frontier holding every persisted record
    /// * `Err(StorageError)` - The store could not be read
    pub fn open(base_url: Url, mut store: Box<dyn FrontierStore>) -> StorageResult<Self> {
        let loaded = store.load_records()?;

        let mut records = HashMap::with_capacity(loaded.len());
        for record in loaded {
            records.insert(record.url.clone(), record);
        }

        if let Some(stored) = store.get_meta("base_url")? {
            if stored != base_url.as_str() {
                tracing::warn!(
                    stored = %stored,
                    base_url = %base_url,
                    "Crawl cache was created for a different base URL"
                );
            }
        }
        store.set_meta("base_url", base_url.as_str())?;

        tracing::debug!(known = records.len(), "Frontier loaded");

        Ok(Self {
            filter: UrlFilter::new(base_url),
            records,
            dirty: HashSet::new(),
            store,
        })
    }

    /// The crawl's base URL
    pub fn base_url(&self) -> &Url {
        self.filter.base()
    }

    /// The link filter scoped to this crawl
    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    /// Returns true if `url` may enter the frontier
    pub fn is_valid_url(&self, url: &Url) -> bool {
        self.filter.is_valid_url(url)
    }

    /// Adds newly discovered URLs
    ///
    /// Invalid and already-known URLs are ignored; a known URL keeps its state
    /// and metadata. Newly added URLs are persisted before returning. A
    /// persistence failure is logged and the crawl carries on in memory.
    ///
    /// # Arguments
    ///
    /// * `urls` - Candidate absolute URLs
    /// * `source_url` - Page the candidates were found on, if any
    ///
    /// # Returns
    ///
    /// The URLs that were actually added, in input order
    pub fn add_discovered<I, S>(&mut self, urls: I, source_url: Option<&str>) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();

        for candidate in urls {
            let Ok(mut url) = Url::parse(candidate.as_ref()) else {
                continue;
            };
            url.set_fragment(None);

            if !self.filter.is_valid_url(&url) || self.records.contains_key(url.as_str()) {
                continue;
            }

            let depth = calculate_depth(self.filter.base(), &url);
            let record = UrlRecord::discovered(url.as_str(), depth, source_url.map(String::from));

            tracing::trace!(url = %url, depth, "Discovered");
            self.dirty.insert(record.url.clone());
            added.push(record.url.clone());
            self.records.insert(record.url.clone(), record);
        }

        if !added.is_empty() {
            if let Err(e) = self.save() {
                tracing::warn!(error = %e, "Failed to persist discovered URLs; continuing in memory");
            }
        }

        added
    }

    /// Returns up to `limit` pending URLs, shallowest first
    ///
    /// Ties on depth are broken by URL so the order is stable across runs.
    pub fn next_batch(&self, limit: usize) -> Vec<String> {
        let mut pending: Vec<&UrlRecord> = self
            .records
            .values()
            .filter(|record| record.state.is_pending())
            .collect();

        pending.sort_by(|a, b| (a.depth, &a.url).cmp(&(b.depth, &b.url)));

        pending
            .into_iter()
            .take(limit)
            .map(|record| record.url.clone())
            .collect()
    }

    /// Records that `url` was fetched and written
    ///
    /// Returns false if the URL already ended in a different terminal state.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.mark(url, UrlState::Visited, None)
    }

    /// Records that processing `url` failed with `reason`
    pub fn mark_failed(&mut self, url: &str, reason: &str) -> bool {
        self.mark(url, UrlState::Failed, Some(reason.to_string()))
    }

    /// Records that `url` was deliberately not fetched
    pub fn mark_skipped(&mut self, url: &str, reason: &str) -> bool {
        self.mark(url, UrlState::Skipped, Some(reason.to_string()))
    }

    fn mark(&mut self, url: &str, target: UrlState, detail: Option<String>) -> bool {
        let base = self.filter.base();
        let record = self.records.entry(url.to_string()).or_insert_with(|| {
            let depth = Url::parse(url)
                .map(|parsed| calculate_depth(base, &parsed))
                .unwrap_or(0);
            UrlRecord::discovered(url, depth, None)
        });

        match record.transition(target, detail, Utc::now()) {
            Transition::Applied => {
                self.dirty.insert(url.to_string());
                true
            }
            Transition::Unchanged => true,
            Transition::Refused => {
                tracing::warn!(
                    url = %url,
                    current = %record.state,
                    requested = %target,
                    "Refusing to change the state of a finished URL"
                );
                false
            }
        }
    }

    /// Counts URLs by state
    pub fn stats(&self) -> FrontierStats {
        let mut stats = FrontierStats {
            discovered: self.records.len(),
            ..FrontierStats::default()
        };

        for record in self.records.values() {
            match record.state {
                UrlState::Discovered => stats.pending += 1,
                UrlState::Visited => stats.visited += 1,
                UrlState::Failed => stats.failed += 1,
                UrlState::Skipped => stats.skipped += 1,
            }
        }

        stats
    }

    /// Writes every record changed since the last successful save
    ///
    /// The batch and the last-update stamp go to the store in one transaction.
    /// On failure the changes stay queued for the next attempt.
    pub fn save(&mut self) -> StorageResult<()> {
        let changed: Vec<UrlRecord> = self
            .dirty
            .iter()
            .filter_map(|url| self.records.get(url).cloned())
            .collect();

        self.store.save_records(&changed)?;
        self.dirty.clear();

        Ok(())
    }

    /// Time of the store's last successful save, if it can be read
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.store.last_update().ok().flatten()
    }

    /// Looks up the record for `url`
    pub fn get(&self, url: &str) -> Option<&UrlRecord> {
        self.records.get(url)
    }

    /// Iterates over every known record, in no particular order
    pub fn records(&self) -> impl Iterator<Item = &UrlRecord> {
        self.records.values()
    }

    /// Number of known URLs
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no URL is known yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
