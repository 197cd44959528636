//! Ordered relevance rules with deny-overrides-allow semantics.
//!
//! Every deny rule is checked first; a matching deny (not exempted) rejects
//! the entry no matter what the allow rules say. Then each require-any rule
//! must match. An empty rule list accepts everything.

use regwatch_classify::contains_any;
use regwatch_shared::SourceDefinition;

/// One relevance rule. Keywords are lowercase substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Reject on any keyword, unless one of the `unless` terms is also present.
    Deny {
        name: &'static str,
        keywords: Vec<String>,
        unless: Vec<String>,
    },
    /// Require at least one keyword.
    RequireAny {
        name: &'static str,
        keywords: Vec<String>,
    },
}

impl Rule {
    fn name(&self) -> &'static str {
        match self {
            Self::Deny { name, .. } | Self::RequireAny { name, .. } => name,
        }
    }
}

/// Outcome of evaluating a [`RelevanceFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Rejected by a deny rule; `keyword` is the first matching term.
    Denied { rule: &'static str, keyword: String },
    /// A require-any rule found none of its keywords.
    Unmatched { rule: &'static str },
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => f.write_str("accepted"),
            Self::Denied { rule, keyword } => write!(f, "denied by {rule} ({keyword:?})"),
            Self::Unmatched { rule } => write!(f, "no {rule} keyword"),
        }
    }
}

/// The relevance predicate for one source.
#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    rules: Vec<Rule>,
}

impl RelevanceFilter {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build the rule list a source definition describes. Empty keyword
    /// lists produce no rule.
    pub fn from_source(source: &SourceDefinition) -> Self {
        let mut rules = Vec::new();

        if !source.exclude.is_empty() {
            rules.push(Rule::Deny {
                name: "exclude",
                keywords: source.exclude.clone(),
                unless: source.exclude_unless.clone(),
            });
        }
        if !source.include.is_empty() {
            rules.push(Rule::RequireAny {
                name: "include",
                keywords: source.include.clone(),
            });
        }
        if !source.require_action.is_empty() {
            rules.push(Rule::RequireAny {
                name: "action",
                keywords: source.require_action.clone(),
            });
        }

        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate against lowercased `"{title} {description}"` text.
    pub fn evaluate(&self, text: &str) -> Verdict {
        for rule in &self.rules {
            if let Rule::Deny {
                name,
                keywords,
                unless,
            } = rule
            {
                let hit = keywords.iter().find(|k| text.contains(k.as_str()));
                if let Some(keyword) = hit {
                    if !contains_any(text, unless) {
                        return Verdict::Denied {
                            rule: name,
                            keyword: keyword.clone(),
                        };
                    }
                }
            }
        }

        for rule in &self.rules {
            if let Rule::RequireAny { keywords, .. } = rule {
                if !contains_any(text, keywords) {
                    return Verdict::Unmatched { rule: rule.name() };
                }
            }
        }

        Verdict::Accept
    }
}
