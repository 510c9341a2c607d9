//! URL handling module for Sumi-Scribe
//!
//! This module provides link canonicalization, site membership checks,
//! the admission filter applied to discovered links, and the depth measure
//! used to order the frontier.

mod depth;
mod domain;
mod filter;
mod normalize;

pub use depth::calculate_depth;
pub use domain::{extract_domain, site_key};
pub use filter::UrlFilter;
pub use normalize::{canonicalize, parse_absolute};
