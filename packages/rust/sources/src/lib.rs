//! Feed sources: fetching, relevance filtering, and the built-in catalogs.
//!
//! This crate provides:
//! - [`feed`]: HTTP fetch and RSS/Atom parsing into [`RawEntry`] values
//! - [`rules`]: ordered deny-overrides-allow relevance rules
//! - [`SourceAdapter`]: the single generic adapter driven by a `SourceDefinition`
//! - [`catalog`]: built-in monitoring and backfill source definitions

pub mod adapter;
pub mod catalog;
pub mod feed;
pub mod rules;

pub use adapter::{AdapterOutput, FeedFailure, SourceAdapter};
pub use catalog::{GENERAL_EXCLUSIONS, STRONG_REGULATORY_TERMS, backfill_sources, builtin_sources};
pub use feed::{FeedClient, RawEntry, html_to_text, parse_feed};
pub use rules::{RelevanceFilter, Rule, Verdict};
