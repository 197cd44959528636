//! Rewrites the record array embedded in the companion HTML dashboard.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use regwatch_shared::{RegulationRecord, RegwatchError, Result};

/// Start of the embedded array in the dashboard script.
pub const DASHBOARD_MARKER: &str = "const regulations = [";

/// What happened to the dashboard this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardOutcome {
    NotConfigured,
    Patched { path: PathBuf, records: usize },
    /// File or marker missing.
    Skipped(String),
    Failed(String),
}

impl std::fmt::Display for DashboardOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => f.write_str("not configured"),
            Self::Patched { path, records } => {
                write!(f, "patched {} ({records} records)", path.display())
            }
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

/// Replace `const regulations = [...];` in `html` with the serialized records.
///
/// The closing `];` is found by bracket counting that skips over JavaScript
/// string literals, so titles containing brackets do not end the array early.
/// Every `</` in the serialized records is written as `<\/` so feed text can
/// never end the surrounding `<script>` block.
pub fn patch_dashboard_html(html: &str, records: &[RegulationRecord]) -> Result<String> {
    let start = html
        .find(DASHBOARD_MARKER)
        .ok_or_else(|| RegwatchError::parse(format!("marker {DASHBOARD_MARKER:?} not found")))?;
    let open = start + DASHBOARD_MARKER.len() - 1;
    let end = matching_close(html, open)
        .ok_or_else(|| RegwatchError::parse("no matching \"];\" for the regulations array"))?;

    let json = serde_json::to_string_pretty(records)
        .map_err(|e| RegwatchError::Storage(format!("failed to serialize records: {e}")))?
        .replace("</", "<\\/");

    let mut out = String::with_capacity(html.len() + json.len());
    out.push_str(&html[..start]);
    out.push_str("const regulations = ");
    out.push_str(&json);
    out.push(';');
    out.push_str(&html[end..]);
    Ok(out)
}

/// Byte offset just past the `];` that closes the `[` at `open`.
fn matching_close(html: &str, open: usize) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return (bytes.get(i + 1) == Some(&b';')).then_some(i + 2);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Patch the dashboard file in place. Never fails the run.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn patch_dashboard(path: &Path, records: &[RegulationRecord]) -> DashboardOutcome {
    let html = match tokio::fs::read_to_string(path).await {
        Ok(html) => html,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("dashboard file not found");
            return DashboardOutcome::Skipped(format!("{} does not exist", path.display()));
        }
        Err(e) => return DashboardOutcome::Failed(RegwatchError::io(path, e).to_string()),
    };

    let patched = match patch_dashboard_html(&html, records) {
        Ok(patched) => patched,
        Err(e @ RegwatchError::Parse { .. }) => {
            warn!(error = %e, "dashboard not patched");
            return DashboardOutcome::Skipped(e.to_string());
        }
        Err(e) => return DashboardOutcome::Failed(e.to_string()),
    };

    if let Err(e) = tokio::fs::write(path, patched).await {
        let err = RegwatchError::io(path, e);
        warn!(error = %err, "dashboard write failed");
        return DashboardOutcome::Failed(err.to_string());
    }

    info!(records = records.len(), "dashboard patched");
    DashboardOutcome::Patched {
        path: path.to_path_buf(),
        records: records.len(),
    }
}
