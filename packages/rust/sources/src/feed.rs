//! HTTP fetch and RSS/Atom parsing.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::Html;
use tracing::debug;
use url::Url;

use regwatch_classify::parse_local_datetime;
use regwatch_shared::{FetchConfig, RegwatchError, Result};

/// Wall-clock timestamps carried in [`RawEntry::published`].
const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One item read from a feed, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    /// Summary reduced to whitespace-collapsed plain text (may be empty).
    pub description: String,
    /// Publish (or update) time as written in the feed's own offset,
    /// formatted `YYYY-MM-DDTHH:MM:SS` with the offset dropped.
    pub published: Option<String>,
    pub link: String,
}

// ---------------------------------------------------------------------------
// FeedClient
// ---------------------------------------------------------------------------

/// Thin wrapper over a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegwatchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch one feed and return at most `max_entries` entries in feed order.
    pub async fn fetch(&self, url: &Url, max_entries: usize) -> Result<Vec<RawEntry>> {
        debug!(%url, "fetching feed");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| RegwatchError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegwatchError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegwatchError::Network(format!("{url}: body read failed: {e}")))?;

        parse_feed(&body, max_entries)
            .map_err(|e| RegwatchError::parse(format!("{url}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse an RSS/Atom document, keeping the first `max_entries` entries.
pub fn parse_feed(bytes: &[u8], max_entries: usize) -> Result<Vec<RawEntry>> {
    // feed-rs only hands back UTC instants. The hook stores the source's
    // wall-clock time in them instead so the calendar day survives.
    let feed = feed_rs::parser::Builder::new()
        .timestamp_parser(|text| parse_local_datetime(text).map(|dt| dt.and_utc()))
        .build()
        .parse(bytes)
        .map_err(|e| RegwatchError::parse(format!("invalid feed: {e}")))?;

    let entries = feed
        .entries
        .into_iter()
        .take(max_entries)
        .map(|entry| {
            let title = entry
                .title
                .map(|t| collapse_whitespace(&t.content))
                .unwrap_or_default();

            let summary = entry
                .summary
                .map(|t| t.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))
                .unwrap_or_default();

            RawEntry {
                title,
                description: html_to_text(&summary),
                published: entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.naive_utc().format(LOCAL_TIMESTAMP_FORMAT).to_string()),
                link,
            }
        })
        .collect();

    Ok(entries)
}

/// Strip markup and collapse runs of whitespace to single spaces.
pub fn html_to_text(html: &str) -> String {
    if !html.contains('<') {
        return collapse_whitespace(html);
    }
    let fragment = Html::parse_fragment(html);
    let text: Vec<&str> = fragment.root_element().text().collect();
    collapse_whitespace(&text.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
    WS_RE.replace_all(text.trim(), " ").into_owned()
}
