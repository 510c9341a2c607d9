//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: the lifecycle state of one URL (discovered, visited, failed, skipped)
//! - `UrlRecord`: everything the frontier knows about one URL

mod record;
mod url_state;

pub use record::{Transition, UrlRecord};
pub use url_state::UrlState;
