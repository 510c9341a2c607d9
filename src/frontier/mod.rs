//! Frontier module: the set of every URL known to a crawl
//!
//! The frontier decides what gets fetched next, records what happened to each
//! URL, and persists itself through a [`FrontierStore`](crate::storage::FrontierStore)
//! so that an interrupted crawl resumes where it stopped.

mod tracker;

pub use tracker::{Frontier, FrontierStats};
