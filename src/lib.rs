//! zero-search - tracker-aware result ranking
//!
//! Ranks one query's search-result candidates, sinking tracker-heavy and
//! thin-content pages, and persists the ranked results in a deduplicated
//! store that accepts relevance feedback.

pub mod cli;
pub mod config;
pub mod error;
pub mod filtering;
pub mod storage;

pub use error::{Result, ZeroError};
