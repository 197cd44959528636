//! Data-driven description of a monitored feed source.
//!
//! Every regulator is described by a [`SourceDefinition`] rather than its own
//! code path. The built-in catalog lives in `regwatch-sources`; users can add
//! more under `[[sources.custom]]` in the config file.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RegwatchError, Result};
use crate::types::{Category, Priority, RegulationType};

/// Placeholder in a feed URL that is replaced by each URL-encoded query.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Default number of entries inspected per feed.
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Maps a keyword found in the entry text to a more specific jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRule {
    /// Lowercase substring to look for.
    pub keyword: String,
    /// Jurisdiction to assign when the keyword is present.
    pub jurisdiction: String,
}

/// Everything the generic adapter needs to monitor one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Stable identifier, written to records as `source_category`.
    pub id: String,
    /// Human-readable name, written to records as `source_type`.
    pub name: String,
    /// Feed URLs. A URL containing `{query}` is expanded once per query.
    pub feeds: Vec<String>,
    /// Search queries substituted into templated feed URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<String>,
    pub category: Category,
    /// Default jurisdiction tag.
    pub jurisdiction: String,
    /// Keyword overrides for the jurisdiction, first match wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jurisdiction_rules: Vec<JurisdictionRule>,
    /// Only the first `max_entries` items of each feed are inspected.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Entry must contain at least one of these (empty = no requirement).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Entry must also contain one of these action verbs (empty = no requirement).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require_action: Vec<String>,
    /// Entry is rejected if it contains any of these...
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// ...unless it also contains one of these strong regulatory terms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_unless: Vec<String>,
    /// Fixed priority for every record from this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Fixed type for every record from this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation_type: Option<RegulationType>,
    /// Tags appended after the classifier's tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_tags: Vec<String>,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn to_owned_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

impl SourceDefinition {
    /// Start a definition with no feeds and no filters.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        jurisdiction: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            feeds: Vec::new(),
            queries: Vec::new(),
            category,
            jurisdiction: jurisdiction.into(),
            jurisdiction_rules: Vec::new(),
            max_entries: DEFAULT_MAX_ENTRIES,
            include: Vec::new(),
            require_action: Vec::new(),
            exclude: Vec::new(),
            exclude_unless: Vec::new(),
            priority: None,
            regulation_type: None,
            extra_tags: Vec::new(),
        }
    }

    pub fn feed(mut self, url: impl Into<String>) -> Self {
        self.feeds.push(url.into());
        self
    }

    pub fn queries(mut self, queries: &[&str]) -> Self {
        self.queries.extend(to_owned_list(queries));
        self
    }

    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    pub fn include(mut self, words: &[&str]) -> Self {
        self.include.extend(to_owned_list(words));
        self
    }

    pub fn require_action(mut self, words: &[&str]) -> Self {
        self.require_action.extend(to_owned_list(words));
        self
    }

    pub fn exclude(mut self, words: &[&str]) -> Self {
        self.exclude.extend(to_owned_list(words));
        self
    }

    pub fn exclude_unless(mut self, words: &[&str]) -> Self {
        self.exclude_unless.extend(to_owned_list(words));
        self
    }

    pub fn jurisdiction_rule(mut self, keyword: &str, jurisdiction: &str) -> Self {
        self.jurisdiction_rules.push(JurisdictionRule {
            keyword: keyword.into(),
            jurisdiction: jurisdiction.into(),
        });
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn regulation_type(mut self, regulation_type: RegulationType) -> Self {
        self.regulation_type = Some(regulation_type);
        self
    }

    pub fn extra_tags(mut self, tags: &[&str]) -> Self {
        self.extra_tags.extend(to_owned_list(tags));
        self
    }

    /// Resolve the jurisdiction for an entry given its lowercased text.
    pub fn jurisdiction_for(&self, text_lower: &str) -> &str {
        self.jurisdiction_rules
            .iter()
            .find(|rule| text_lower.contains(rule.keyword.as_str()))
            .map(|rule| rule.jurisdiction.as_str())
            .unwrap_or(&self.jurisdiction)
    }

    /// Expand templated feeds and parse every URL.
    pub fn feed_urls(&self) -> Result<Vec<Url>> {
        let mut urls = Vec::new();

        for feed in &self.feeds {
            if feed.contains(QUERY_PLACEHOLDER) {
                for query in &self.queries {
                    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
                    urls.push(parse_feed_url(&self.id, &feed.replace(QUERY_PLACEHOLDER, &encoded))?);
                }
            } else {
                urls.push(parse_feed_url(&self.id, feed)?);
            }
        }

        Ok(urls)
    }

    /// Check the definition for mistakes that would make it silently useless.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RegwatchError::validation("source id must not be empty"));
        }
        if self.feeds.is_empty() {
            return Err(RegwatchError::validation(format!(
                "source '{}' has no feeds",
                self.id
            )));
        }
        if self.max_entries == 0 {
            return Err(RegwatchError::validation(format!(
                "source '{}': max_entries must be at least 1",
                self.id
            )));
        }

        let templated = self.feeds.iter().any(|f| f.contains(QUERY_PLACEHOLDER));
        if templated && self.queries.is_empty() {
            return Err(RegwatchError::validation(format!(
                "source '{}' uses {QUERY_PLACEHOLDER} but defines no queries",
                self.id
            )));
        }
        if !templated && !self.queries.is_empty() {
            return Err(RegwatchError::validation(format!(
                "source '{}' defines queries but no feed contains {QUERY_PLACEHOLDER}",
                self.id
            )));
        }

        // Keyword matching runs against lowercased text.
        let keyword_lists = [
            &self.include,
            &self.require_action,
            &self.exclude,
            &self.exclude_unless,
        ];
        let rule_keywords = self.jurisdiction_rules.iter().map(|r| &r.keyword);
        for word in keyword_lists.into_iter().flatten().chain(rule_keywords) {
            if word.is_empty() || *word != word.to_lowercase() {
                return Err(RegwatchError::validation(format!(
                    "source '{}': keyword {word:?} must be non-empty lowercase",
                    self.id
                )));
            }
        }

        self.feed_urls().map(|_| ())
    }
}

fn parse_feed_url(source_id: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        RegwatchError::validation(format!("source '{source_id}': invalid feed URL {raw:?}: {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RegwatchError::validation(format!(
            "source '{source_id}': unsupported scheme '{other}' in {raw:?}"
        ))),
    }
}
