//! Core domain types for tracked regulations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder written to `effectiveDate`; the pipeline never resolves it.
pub const EFFECTIVE_DATE_PLACEHOLDER: &str = "TBD";

/// Hard upper bound on the number of tags a record may carry.
pub const MAX_TAGS: usize = 5;

/// Default maximum description length, in characters.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 500;

/// Marker appended to descriptions that were cut at the length limit.
pub const TRUNCATION_MARKER: &str = "...";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// ESG pillar a regulation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Environmental,
    Social,
    Governance,
}

impl Category {
    /// All categories in digest/report order.
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::Social,
        Category::Governance,
    ];

    /// Wire name, as stored in `regulations.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environmental => "environmental",
            Self::Social => "social",
            Self::Governance => "governance",
        }
    }

    /// Capitalized label for human-facing output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Environmental => "Environmental",
            Self::Social => "Social",
            Self::Governance => "Governance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently a regulation needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of regulatory development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegulationType {
    Disclosure,
    Enforcement,
    Reporting,
    Taxonomy,
    /// Written by older monitor versions for executive orders. Never assigned
    /// by the classifier, only kept so such records load.
    #[serde(rename = "executive-action")]
    ExecutiveAction,
}

impl RegulationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disclosure => "disclosure",
            Self::Enforcement => "enforcement",
            Self::Reporting => "reporting",
            Self::Taxonomy => "taxonomy",
            Self::ExecutiveAction => "executive-action",
        }
    }
}

impl std::fmt::Display for RegulationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RegulationRecord
// ---------------------------------------------------------------------------

/// One tracked regulation, as persisted in `regulations.json`.
///
/// Field names and order match the JSON consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationRecord {
    /// Sequential id, reassigned on every save.
    pub id: u64,
    /// Dedup key (case-sensitive exact match).
    pub title: String,
    pub category: Category,
    /// Id of the source definition that produced this record.
    #[serde(default)]
    pub source_category: String,
    /// Free-form jurisdiction tag (`sec`, `eu`, `california`, ...).
    pub jurisdiction: String,
    #[serde(rename = "type")]
    pub regulation_type: RegulationType,
    pub priority: Priority,
    /// Normalized publish date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// True only for records added by the most recent run.
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "effectiveDate", default = "default_effective_date")]
    pub effective_date: String,
    #[serde(default)]
    pub source_url: String,
    /// Human-readable source name (`SEC Official`, `Reuters Legal`, ...).
    #[serde(default)]
    pub source_type: String,
}

fn default_effective_date() -> String {
    EFFECTIVE_DATE_PLACEHOLDER.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RegulationRecord {
        RegulationRecord {
            id: 1,
            title: "SEC Adopts Final Climate Disclosure Rule".into(),
            category: Category::Environmental,
            source_category: "sec-official".into(),
            jurisdiction: "sec".into(),
            regulation_type: RegulationType::Disclosure,
            priority: Priority::Critical,
            date: NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
            is_new: true,
            description: "The Commission adopted a final rule.".into(),
            tags: vec!["Climate".into()],
            effective_date: EFFECTIVE_DATE_PLACEHOLDER.into(),
            source_url: "https://www.sec.gov/newsroom/press-releases/2025-1".into(),
            source_type: "SEC Official".into(),
        }
    }

    #[test]
    fn record_uses_dashboard_field_names() {
        let json = serde_json::to_value(sample_record()).expect("serialize");
        assert_eq!(json["type"], "disclosure");
        assert_eq!(json["priority"], "critical");
        assert_eq!(json["category"], "environmental");
        assert_eq!(json["isNew"], true);
        assert_eq!(json["effectiveDate"], "TBD");
        assert_eq!(json["date"], "2025-03-06");
        assert!(json.get("regulation_type").is_none());
        assert!(json.get("is_new").is_none());
    }

    #[test]
    fn record_roundtrip() {
        let record = sample_record();
        let json = serde_json::to_string_pretty(&record).expect("serialize");
        let parsed: RegulationRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
    }

    #[test]
    fn legacy_record_without_source_category() {
        let json = r#"{
            "id": 7,
            "title": "EEOC Sues Employer Over Disability Discrimination",
            "category": "social",
            "jurisdiction": "eeoc",
            "type": "enforcement",
            "priority": "critical",
            "date": "2025-02-11",
            "isNew": false,
            "description": "",
            "tags": ["EEOC"],
            "source_url": "https://www.eeoc.gov/newsroom/x",
            "source_type": "EEOC Official"
        }"#;
        let parsed: RegulationRecord = serde_json::from_str(json).expect("deserialize legacy");
        assert_eq!(parsed.source_category, "");
        assert_eq!(parsed.effective_date, "TBD");
        assert_eq!(parsed.category, Category::Social);
    }

    #[test]
    fn executive_action_records_load_and_roundtrip() {
        let json = r#"{
            "id": 3,
            "title": "Executive Order on Federal Hiring",
            "category": "social",
            "source_category": "executive-order",
            "jurisdiction": "federal-executive",
            "type": "executive-action",
            "priority": "critical",
            "date": "2025-01-21"
        }"#;
        let parsed: RegulationRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.regulation_type, RegulationType::ExecutiveAction);
        let back = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(back["type"], "executive-action");
    }

    #[test]
    fn category_labels() {
        assert_eq!(Category::Governance.to_string(), "governance");
        assert_eq!(Category::Environmental.label(), "Environmental");
        assert_eq!(Category::ALL.len(), 3);
    }
}
