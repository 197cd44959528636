//! Keyword classification, date normalization, and text helpers.
//!
//! Classification is plain case-insensitive substring matching over
//! `"{title} {description}"`. The keyword tables are immutable and handed to
//! [`Classifier::new`]; [`KeywordTables::default`] carries the built-in set.

pub mod dates;
pub mod text;

use regwatch_shared::{Category, MAX_TAGS, Priority, RegulationType, SourceDefinition};

pub use dates::{is_recent_enough, normalize_date, parse_date, parse_local_datetime};
pub use text::{contains_any, match_text, truncate_description};

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

/// A tag label and the substrings that trigger it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl TagRule {
    fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Immutable keyword sets driving priority, type, and tag assignment.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    /// Finality/enforcement terms → `critical`.
    pub critical: Vec<String>,
    /// Process terms → `high`.
    pub high: Vec<String>,
    /// → `disclosure` (checked first).
    pub disclosure: Vec<String>,
    /// → `enforcement`.
    pub enforcement: Vec<String>,
    /// → `taxonomy`.
    pub taxonomy: Vec<String>,
    /// Tag rules in declaration order.
    pub tags: Vec<TagRule>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            critical: words(&[
                "final rule",
                "adopted",
                "enacted",
                "injunction",
                "lawsuit",
                "court order",
            ]),
            high: words(&["proposed", "draft", "consultation"]),
            disclosure: words(&["disclosure", "reporting"]),
            enforcement: words(&["enforcement", "lawsuit", "settlement"]),
            taxonomy: words(&["taxonomy", "classification"]),
            tags: vec![
                TagRule::new("Climate", &["climate", "ghg", "emissions"]),
                TagRule::new("CSRD", &["csrd"]),
                TagRule::new("ISSB", &["issb", "ifrs"]),
                TagRule::new("SB 253", &["sb 253", "sb253"]),
                TagRule::new("SB 261", &["sb 261", "sb261"]),
                TagRule::new("EEOC", &["eeoc"]),
                TagRule::new("Discrimination", &["discrimination"]),
                TagRule::new("ADA", &["ada"]),
                TagRule::new("ESRS", &["esrs"]),
                TagRule::new("TCFD", &["tcfd"]),
                TagRule::new("WCAG", &["wcag"]),
                TagRule::new("Pay Equity", &["pay equity", "pay transparency"]),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Everything the classifier decides about one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub jurisdiction: String,
    pub priority: Priority,
    pub regulation_type: RegulationType,
    pub tags: Vec<String>,
}

/// Assigns priority, type, and tags from keyword tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    tables: KeywordTables,
    max_tags: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KeywordTables::default(), MAX_TAGS)
    }
}

impl Classifier {
    /// `max_tags` is clamped to [`MAX_TAGS`].
    pub fn new(tables: KeywordTables, max_tags: usize) -> Self {
        Self {
            tables,
            max_tags: max_tags.min(MAX_TAGS),
        }
    }

    /// Priority from already-lowercased text.
    pub fn priority(&self, text: &str) -> Priority {
        if contains_any(text, &self.tables.critical) {
            Priority::Critical
        } else if contains_any(text, &self.tables.high) {
            Priority::High
        } else {
            Priority::Medium
        }
    }

    /// Regulation type from already-lowercased text.
    pub fn regulation_type(&self, text: &str) -> RegulationType {
        if contains_any(text, &self.tables.disclosure) {
            RegulationType::Disclosure
        } else if contains_any(text, &self.tables.enforcement) {
            RegulationType::Enforcement
        } else if contains_any(text, &self.tables.taxonomy) {
            RegulationType::Taxonomy
        } else {
            RegulationType::Reporting
        }
    }

    /// Tags in declaration order, capped at `max_tags`.
    pub fn tags(&self, text: &str) -> Vec<String> {
        self.tables
            .tags
            .iter()
            .filter(|rule| contains_any(text, &rule.keywords))
            .map(|rule| rule.label.clone())
            .take(self.max_tags)
            .collect()
    }

    /// Classify an entry produced by `source`, applying the source's overrides.
    ///
    /// Source `extra_tags` are appended after the derived tags (skipping
    /// duplicates) and the combined list is capped again.
    pub fn classify(
        &self,
        title: &str,
        description: &str,
        source: &SourceDefinition,
    ) -> Classification {
        let text = match_text(title, description);

        let mut tags = self.tags(&text);
        for extra in &source.extra_tags {
            if !tags.contains(extra) {
                tags.push(extra.clone());
            }
        }
        tags.truncate(self.max_tags);

        Classification {
            category: source.category,
            jurisdiction: source.jurisdiction_for(&text).to_string(),
            priority: source.priority.unwrap_or_else(|| self.priority(&text)),
            regulation_type: source
                .regulation_type
                .unwrap_or_else(|| self.regulation_type(&text)),
            tags,
        }
    }
}
