//! Weekly email digest of newly added records.
//!
//! A digest goes out only when credentials are configured, the run falls on
//! the digest weekday, and at least one new record falls in the lookback
//! window. Each gate that fails yields its own [`SkipReason`]. Send failures
//! are reported in the [`DigestOutcome`] and never propagate.

pub mod compose;
pub mod transport;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{info, warn};

use regwatch_shared::{DigestConfig, EmailCredentials, RegulationRecord};

pub use compose::{Digest, compose, escape_html, qualifying_records};
pub use transport::{DigestTransport, SmtpDigestTransport, build_message};

/// Why a digest was not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Email was turned off for this run.
    Disabled,
    /// `EMAIL_FROM` / `EMAIL_PASSWORD` / `EMAIL_TO` missing or placeholder.
    NotConfigured,
    NotDigestDay { today: Weekday, digest_day: Weekday },
    NothingNew,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("email disabled"),
            Self::NotConfigured => f.write_str("email credentials not configured"),
            Self::NotDigestDay { today, digest_day } => {
                write!(f, "today is {today}, digest goes out on {digest_day}")
            }
            Self::NothingNew => f.write_str("no new records in the lookback window"),
        }
    }
}

/// What happened to the digest this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    Sent { records: usize, recipients: usize },
    Skipped(SkipReason),
    Failed(String),
}

impl std::fmt::Display for DigestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent {
                records,
                recipients,
            } => write!(f, "sent ({records} records to {recipients} recipients)"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

/// Digest policy, usually built from `[digest]` config.
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub weekday: Weekday,
    pub lookback_days: i64,
    pub per_category_limit: usize,
    pub dashboard_url: Option<String>,
    /// Bypass the weekday gate.
    pub force: bool,
}

impl From<&DigestConfig> for DigestSettings {
    fn from(config: &DigestConfig) -> Self {
        Self {
            weekday: config.weekday,
            lookback_days: config.lookback_days,
            per_category_limit: config.per_category_limit,
            dashboard_url: config.dashboard_url.clone(),
            force: false,
        }
    }
}

/// Applies the gates and hands the composed digest to a transport.
pub struct Notifier<'a> {
    settings: DigestSettings,
    credentials: Option<EmailCredentials>,
    transport: &'a dyn DigestTransport,
}

impl<'a> Notifier<'a> {
    pub fn new(
        settings: DigestSettings,
        credentials: Option<EmailCredentials>,
        transport: &'a dyn DigestTransport,
    ) -> Self {
        Self {
            settings,
            credentials,
            transport,
        }
    }

    /// Gate, compose, and send. `records` is the full merged collection.
    pub async fn notify(&self, records: &[RegulationRecord], today: NaiveDate) -> DigestOutcome {
        let Some(credentials) = &self.credentials else {
            info!("digest skipped: email not configured");
            return DigestOutcome::Skipped(SkipReason::NotConfigured);
        };

        let weekday = today.weekday();
        if weekday != self.settings.weekday && !self.settings.force {
            info!(%weekday, digest_day = %self.settings.weekday, "digest skipped: not digest day");
            return DigestOutcome::Skipped(SkipReason::NotDigestDay {
                today: weekday,
                digest_day: self.settings.weekday,
            });
        }

        let qualifying = qualifying_records(records, today, self.settings.lookback_days);
        if qualifying.is_empty() {
            info!("digest skipped: nothing new");
            return DigestOutcome::Skipped(SkipReason::NothingNew);
        }

        let digest = compose(
            &qualifying,
            self.settings.per_category_limit,
            self.settings.dashboard_url.as_deref(),
        );

        match self.transport.send(credentials, &digest).await {
            Ok(()) => {
                info!(
                    transport = self.transport.name(),
                    records = digest.total,
                    "digest sent"
                );
                DigestOutcome::Sent {
                    records: digest.total,
                    recipients: credentials.to.len(),
                }
            }
            Err(e) => {
                warn!(transport = self.transport.name(), error = %e, "digest send failed");
                DigestOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use regwatch_shared::{Category, Priority, RegulationType, RegwatchError, Result};

    use super::*;

    /// Records every digest instead of sending it.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Digest>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl DigestTransport for RecordingTransport {
        async fn send(&self, _credentials: &EmailCredentials, digest: &Digest) -> Result<()> {
            if self.fail {
                return Err(RegwatchError::Notify("connection refused".into()));
            }
            self.sent.lock().unwrap().push(digest.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn credentials() -> EmailCredentials {
        EmailCredentials {
            from: "monitor@example.com".into(),
            password: "secret".into(),
            to: vec!["team@example.com".into()],
        }
    }

    fn record(title: &str, date: &str, is_new: bool) -> RegulationRecord {
        RegulationRecord {
            id: 1,
            title: title.into(),
            category: Category::Environmental,
            source_category: "sec-official".into(),
            jurisdiction: "sec".into(),
            regulation_type: RegulationType::Disclosure,
            priority: Priority::Critical,
            date: date.parse().unwrap(),
            is_new,
            description: String::new(),
            tags: vec!["Climate".into()],
            effective_date: "TBD".into(),
            source_url: "https://www.sec.gov/x".into(),
            source_type: "SEC Official".into(),
        }
    }

    fn settings() -> DigestSettings {
        DigestSettings::from(&DigestConfig::default())
    }

    // 2025-03-10 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[tokio::test]
    async fn sends_on_digest_day() {
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(settings(), Some(credentials()), &transport);
        let records = vec![record("New rule", "2025-03-07", true), record("Old", "2025-01-02", false)];

        let outcome = notifier.notify(&records, monday()).await;
        assert_eq!(
            outcome,
            DigestOutcome::Sent {
                records: 1,
                recipients: 1
            }
        );
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("New rule"));
        assert!(!sent[0].text.contains("Old"));
    }

    #[tokio::test]
    async fn skips_without_credentials() {
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(settings(), None, &transport);
        let outcome = notifier.notify(&[record("New rule", "2025-03-07", true)], monday()).await;
        assert_eq!(outcome, DigestOutcome::Skipped(SkipReason::NotConfigured));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn skips_on_other_weekdays() {
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(settings(), Some(credentials()), &transport);
        let tuesday = monday().succ_opt().unwrap();
        let outcome = notifier.notify(&[record("New rule", "2025-03-07", true)], tuesday).await;
        assert_eq!(
            outcome,
            DigestOutcome::Skipped(SkipReason::NotDigestDay {
                today: Weekday::Tue,
                digest_day: Weekday::Mon
            })
        );
    }

    #[tokio::test]
    async fn force_bypasses_weekday() {
        let transport = RecordingTransport::default();
        let mut forced = settings();
        forced.force = true;
        let notifier = Notifier::new(forced, Some(credentials()), &transport);
        let tuesday = monday().succ_opt().unwrap();
        let outcome = notifier.notify(&[record("New rule", "2025-03-07", true)], tuesday).await;
        assert!(matches!(outcome, DigestOutcome::Sent { .. }));
    }

    #[tokio::test]
    async fn skips_when_nothing_qualifies() {
        let transport = RecordingTransport::default();
        let notifier = Notifier::new(settings(), Some(credentials()), &transport);
        let records = vec![record("Stale", "2025-02-01", true), record("Seen", "2025-03-08", false)];
        let outcome = notifier.notify(&records, monday()).await;
        assert_eq!(outcome, DigestOutcome::Skipped(SkipReason::NothingNew));
    }

    #[tokio::test]
    async fn send_failure_is_reported_not_raised() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(settings(), Some(credentials()), &transport);
        let outcome = notifier.notify(&[record("New rule", "2025-03-07", true)], monday()).await;
        match outcome {
            DigestOutcome::Failed(msg) => assert!(msg.contains("connection refused")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            DigestOutcome::Skipped(SkipReason::NothingNew).to_string(),
            "skipped: no new records in the lookback window"
        );
        assert_eq!(
            SkipReason::NotDigestDay {
                today: Weekday::Tue,
                digest_day: Weekday::Mon
            }
            .to_string(),
            "today is Tue, digest goes out on Mon"
        );
    }
}
