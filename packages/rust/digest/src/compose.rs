//! Digest selection and body composition.

use std::fmt::Write as _;

use chrono::{Duration, NaiveDate};

use regwatch_shared::{Category, RegulationRecord};

/// A composed digest ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text: String,
    pub html: String,
    /// Qualifying records (before the per-category cap).
    pub total: usize,
}

/// Records added by this run and dated within `lookback_days` of `today`.
/// A window reaching past the earliest representable date covers every day.
pub fn qualifying_records(
    records: &[RegulationRecord],
    today: NaiveDate,
    lookback_days: i64,
) -> Vec<&RegulationRecord> {
    let since = Duration::try_days(lookback_days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN);
    records
        .iter()
        .filter(|r| r.is_new && r.date >= since)
        .collect()
}

/// Build the plain-text and HTML bodies, grouped by category in
/// [`Category::ALL`] order with at most `per_category_limit` records each.
/// Empty categories are left out.
pub fn compose(
    records: &[&RegulationRecord],
    per_category_limit: usize,
    dashboard_url: Option<&str>,
) -> Digest {
    let total = records.len();
    let subject = format!(
        "Weekly ESG Digest: {total} New Regulation{}",
        if total == 1 { "" } else { "s" }
    );

    let mut text = format!("Weekly ESG Digest\n{total} new regulations this week\n");
    let mut html = String::from("<html>\n<body style=\"font-family: Arial, sans-serif;\">\n");
    let _ = writeln!(html, "<h2>Weekly ESG Digest</h2>");
    let _ = writeln!(
        html,
        "<p><strong>{total} new regulations this week</strong></p>"
    );

    for category in Category::ALL {
        let group: Vec<&RegulationRecord> = records
            .iter()
            .copied()
            .filter(|r| r.category == category)
            .collect();
        if group.is_empty() {
            continue;
        }

        let _ = write!(text, "\n{} ({})\n", category.label(), group.len());
        let _ = writeln!(html, "<h3>{} ({})</h3>\n<ul>", category.label(), group.len());

        for record in group.iter().take(per_category_limit) {
            let _ = writeln!(text, "- {}", record.title);
            let _ = writeln!(text, "  Source: {}", record.source_type);
            if !record.source_url.is_empty() {
                let _ = writeln!(text, "  {}", record.source_url);
            }

            let _ = write!(
                html,
                "<li><strong>{}</strong><br>Source: {}",
                escape_html(&record.title),
                escape_html(&record.source_type)
            );
            if !record.source_url.is_empty() {
                let _ = write!(
                    html,
                    "<br><a href=\"{}\">View</a>",
                    escape_html(&record.source_url)
                );
            }
            html.push_str("</li>\n");
        }

        if group.len() > per_category_limit {
            let more = group.len() - per_category_limit;
            let _ = writeln!(text, "  ...and {more} more");
            let _ = writeln!(html, "<li>...and {more} more</li>");
        }
        html.push_str("</ul>\n");
    }

    if let Some(url) = dashboard_url {
        let _ = write!(text, "\nDashboard: {url}\n");
        let _ = writeln!(
            html,
            "<p><a href=\"{}\">View Dashboard</a></p>",
            escape_html(url)
        );
    }
    html.push_str("</body>\n</html>\n");

    Digest {
        subject,
        text,
        html,
        total,
    }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
