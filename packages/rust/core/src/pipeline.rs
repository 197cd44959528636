//! End-to-end monitoring pass: load → fetch → classify → dedup → persist → notify.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{error, info, instrument};

use regwatch_classify::{
    Classifier, KeywordTables, is_recent_enough, normalize_date, truncate_description,
};
use regwatch_digest::{DigestOutcome, DigestSettings, DigestTransport, Notifier, SkipReason};
use regwatch_shared::{
    AppConfig, EFFECTIVE_DATE_PLACEHOLDER, EmailCredentials, FetchConfig, RegulationRecord,
    Result, SourceDefinition,
};
use regwatch_sources::{
    FeedClient, FeedFailure, RawEntry, SourceAdapter, backfill_sources, builtin_sources,
};
use regwatch_storage::RecordStore;

use crate::dashboard::{self, DashboardOutcome};
use crate::dedup::{self, TitleIndex};

// ---------------------------------------------------------------------------
// Config & summary
// ---------------------------------------------------------------------------

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub sources: Vec<SourceDefinition>,
    pub store_path: PathBuf,
    pub dashboard_path: Option<PathBuf>,
    /// Entries dated before this are dropped.
    pub cutoff: NaiveDate,
    pub description_limit: usize,
    pub max_tags: usize,
    pub fetch: FetchConfig,
    pub digest: DigestSettings,
    pub email_enabled: bool,
    /// Fetch and classify, but write nothing and send nothing.
    pub dry_run: bool,
    /// Processing date: fallback for missing dates and the digest reference.
    pub today: NaiveDate,
}

impl MonitorConfig {
    /// Build from the loaded config file. `sources` is passed separately so
    /// callers can pick the regular or the backfill catalog.
    pub fn from_app(app: &AppConfig, sources: Vec<SourceDefinition>, today: NaiveDate) -> Self {
        Self {
            sources,
            store_path: PathBuf::from(&app.defaults.store_path),
            dashboard_path: app.dashboard.path.as_ref().map(PathBuf::from),
            cutoff: app.defaults.cutoff_date,
            description_limit: app.defaults.description_limit,
            max_tags: app.defaults.max_tags,
            fetch: app.fetch.clone(),
            digest: DigestSettings::from(&app.digest),
            email_enabled: true,
            dry_run: false,
            today,
        }
    }
}

/// Sources for a run: the backfill catalog, or the built-in catalog (unless
/// disabled) followed by user-defined sources.
pub fn configured_sources(app: &AppConfig, backfill: bool) -> Vec<SourceDefinition> {
    if backfill {
        return backfill_sources();
    }
    let mut sources = if app.sources.builtin {
        builtin_sources()
    } else {
        Vec::new()
    };
    sources.extend(app.sources.custom.iter().cloned());
    sources
}

/// Per-source counters for one run.
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    pub id: String,
    pub name: String,
    pub feeds_attempted: usize,
    pub failures: Vec<FeedFailure>,
    pub seen: usize,
    /// Passed the relevance filter.
    pub accepted: usize,
    /// Dated before the cutoff.
    pub too_old: usize,
    /// Title already stored or seen earlier in this run.
    pub duplicates: usize,
    pub added: usize,
}

impl SourceReport {
    pub fn failed(&self) -> bool {
        self.feeds_attempted > 0 && self.failures.len() == self.feeds_attempted
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub sources: Vec<SourceReport>,
    pub total_records: usize,
    pub new_records: usize,
    pub store_written: bool,
    pub store_error: Option<String>,
    /// Stored records dropped at load time because they could not be read.
    pub skipped_records: usize,
    /// Where the original store was preserved at load time.
    pub quarantined: Option<PathBuf>,
    pub dashboard: DashboardOutcome,
    pub digest: DigestOutcome,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.failed()).count()
    }

    /// Every source failed: "zero new records" means nothing here.
    pub fn all_sources_failed(&self) -> bool {
        !self.sources.is_empty() && self.failed_sources() == self.sources.len()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a source is fetched.
    fn source_started(&self, name: &str, current: usize, total: usize);
    /// Called after a source is fully processed.
    fn source_finished(&self, report: &SourceReport);
    /// Called when the pipeline completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn source_finished(&self, _report: &SourceReport) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run one monitoring pass.
///
/// Only store load and HTTP client setup can fail; once sources are being
/// fetched every error is recorded in the summary instead.
#[instrument(skip_all, fields(sources = config.sources.len(), dry_run = config.dry_run, today = %config.today))]
pub async fn run_monitor(
    config: &MonitorConfig,
    credentials: Option<EmailCredentials>,
    transport: &dyn DigestTransport,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();

    // --- Phase 1: Load ---
    progress.phase("Loading store");
    let store = RecordStore::new(&config.store_path);
    let loaded = store.load().await?;
    let mut records = loaded.records;
    dedup::reset_new_flags(&mut records);
    let mut index = TitleIndex::from_records(&records);

    let client = FeedClient::new(&config.fetch)?;
    let classifier = Classifier::new(KeywordTables::default(), config.max_tags);

    // --- Phase 2: Sources ---
    progress.phase("Fetching sources");
    let total = config.sources.len();
    let mut reports = Vec::with_capacity(total);
    let mut added: Vec<RegulationRecord> = Vec::new();

    for (i, definition) in config.sources.iter().enumerate() {
        progress.source_started(&definition.name, i + 1, total);
        let adapter = SourceAdapter::new(definition.clone());
        let output = adapter.collect(&client).await;

        let mut report = SourceReport {
            id: definition.id.clone(),
            name: definition.name.clone(),
            feeds_attempted: output.feeds_attempted,
            failures: output.failures,
            seen: output.seen,
            accepted: output.accepted.len(),
            ..SourceReport::default()
        };

        let mut candidates = Vec::with_capacity(output.accepted.len());
        for entry in &output.accepted {
            let record = build_record(entry, definition, &classifier, config);
            if is_recent_enough(record.date, config.cutoff) {
                candidates.push(record);
            } else {
                report.too_old += 1;
            }
        }

        let admitted = dedup::admit(&mut index, candidates);
        report.duplicates = admitted.duplicates;
        report.added = admitted.records.len();
        added.extend(admitted.records);

        progress.source_finished(&report);
        reports.push(report);
    }

    let new_records = added.len();
    records.extend(added);
    dedup::renumber(&mut records);

    info!(
        new = new_records,
        total = records.len(),
        failed_sources = reports.iter().filter(|r| r.failed()).count(),
        "sources processed"
    );

    // --- Phase 3: Persist ---
    let (store_written, store_error, dashboard) = if config.dry_run {
        info!("dry run, nothing written");
        (false, None, DashboardOutcome::Skipped("dry run".into()))
    } else {
        progress.phase("Saving store");
        let (written, err) = match store.save(&records).await {
            Ok(()) => (true, None),
            Err(e) => {
                error!(error = %e, "store write failed");
                (false, Some(e.to_string()))
            }
        };

        let dashboard = match &config.dashboard_path {
            Some(path) => {
                progress.phase("Patching dashboard");
                dashboard::patch_dashboard(path, &records).await
            }
            None => DashboardOutcome::NotConfigured,
        };
        (written, err, dashboard)
    };

    // --- Phase 4: Digest ---
    let digest = if config.dry_run || !config.email_enabled {
        DigestOutcome::Skipped(SkipReason::Disabled)
    } else {
        progress.phase("Sending digest");
        Notifier::new(config.digest.clone(), credentials, transport)
            .notify(&records, config.today)
            .await
    };

    let summary = RunSummary {
        run_date: config.today,
        sources: reports,
        total_records: records.len(),
        new_records,
        store_written,
        store_error,
        skipped_records: loaded.skipped,
        quarantined: loaded.quarantined,
        dashboard,
        digest,
        dry_run: config.dry_run,
        elapsed: start.elapsed(),
    };

    info!(
        new = summary.new_records,
        total = summary.total_records,
        digest = %summary.digest,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run complete"
    );
    progress.done(&summary);
    Ok(summary)
}

/// Classify an accepted entry and shape it into a record.
fn build_record(
    entry: &RawEntry,
    source: &SourceDefinition,
    classifier: &Classifier,
    config: &MonitorConfig,
) -> RegulationRecord {
    let classification = classifier.classify(&entry.title, &entry.description, source);

    RegulationRecord {
        id: 0,
        title: entry.title.clone(),
        category: classification.category,
        source_category: source.id.clone(),
        jurisdiction: classification.jurisdiction,
        regulation_type: classification.regulation_type,
        priority: classification.priority,
        date: normalize_date(entry.published.as_deref(), config.today),
        is_new: true,
        description: truncate_description(&entry.description, config.description_limit),
        tags: classification.tags,
        effective_date: EFFECTIVE_DATE_PLACEHOLDER.into(),
        source_url: entry.link.clone(),
        source_type: source.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Weekday;
    use regwatch_digest::Digest;
    use regwatch_shared::{Category, Priority, RegulationType};
    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Digest>>,
    }

    #[async_trait::async_trait]
    impl DigestTransport for RecordingTransport {
        async fn send(&self, _credentials: &EmailCredentials, digest: &Digest) -> Result<()> {
            self.sent.lock().unwrap().push(digest.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn load_fixture(name: &str) -> Vec<u8> {
        let path = format!("../../../fixtures/feeds/{name}");
        std::fs::read(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    async fn mount_feed(server: &wiremock::MockServer, path: &str, fixture: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(load_fixture(fixture)))
            .mount(server)
            .await;
    }

    /// Catalog definition with its feed pointed at the mock server.
    fn catalog_source(id: &str, server: &wiremock::MockServer, path: &str) -> SourceDefinition {
        let mut source = builtin_sources()
            .into_iter()
            .find(|s| s.id == id)
            .unwrap();
        source.feeds = vec![format!("{}{path}", server.uri())];
        source.queries.clear();
        source
    }

    fn credentials() -> EmailCredentials {
        EmailCredentials {
            from: "monitor@example.com".into(),
            password: "secret".into(),
            to: vec!["team@example.com".into()],
        }
    }

    // Monday.
    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 7).unwrap()
    }

    fn test_config(sources: Vec<SourceDefinition>) -> MonitorConfig {
        let dir = std::env::temp_dir().join(format!("regwatch-run-{}", Uuid::now_v7()));
        let mut config = MonitorConfig::from_app(&AppConfig::default(), sources, run_date());
        config.store_path = dir.join("regulations.json");
        config
    }

    async fn standard_server() -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        mount_feed(&server, "/sec.rss", "sec_press.rss").await;
        mount_feed(&server, "/eeoc.rss", "eeoc.rss").await;
        mount_feed(&server, "/legal", "reuters_legal.rss").await;
        mount_feed(&server, "/wai.xml", "w3c_wai.atom").await;
        server
    }

    fn standard_sources(server: &wiremock::MockServer) -> Vec<SourceDefinition> {
        vec![
            catalog_source("sec-official", server, "/sec.rss"),
            catalog_source("reuters-environmental", server, "/legal"),
            catalog_source("eeoc-official", server, "/eeoc.rss"),
            catalog_source("reuters-social", server, "/legal"),
            catalog_source("w3c-wai", server, "/wai.xml"),
        ]
    }

    fn find<'a>(records: &'a [RegulationRecord], title: &str) -> &'a RegulationRecord {
        records
            .iter()
            .find(|r| r.title == title)
            .unwrap_or_else(|| panic!("missing record {title:?}"))
    }

    async fn stored(config: &MonitorConfig) -> Vec<RegulationRecord> {
        RecordStore::new(&config.store_path).load().await.unwrap().records
    }

    #[tokio::test]
    async fn full_run_classifies_and_persists() {
        let server = standard_server().await;
        let config = test_config(standard_sources(&server));
        let transport = RecordingTransport::default();

        let summary = run_monitor(&config, None, &transport, &SilentProgress)
            .await
            .unwrap();

        assert!(summary.store_written);
        assert_eq!(summary.failed_sources(), 0);
        let records = stored(&config).await;
        assert_eq!(records.len(), summary.total_records);
        assert_eq!(summary.new_records, records.len());

        let sec = find(&records, "SEC Adopts Final Climate Disclosure Rule");
        assert_eq!(sec.priority, Priority::Critical);
        assert_eq!(sec.regulation_type, RegulationType::Disclosure);
        assert!(sec.tags.contains(&"Climate".to_string()));
        assert_eq!(sec.date.to_string(), "2025-03-06");
        assert_eq!(sec.source_type, "SEC Official");
        assert_eq!(sec.source_category, "sec-official");
        assert!(sec.is_new);

        let judge = find(&records, "Judge blocks enforcement of California SB 253 emissions law");
        assert_eq!(judge.jurisdiction, "california");
        assert_eq!(judge.regulation_type, RegulationType::Enforcement);
        assert_eq!(judge.tags.last().map(String::as_str), Some("Reuters"));

        let wcag = find(&records, "WCAG 2.2 Published as ISO Standard");
        assert_eq!(wcag.category, Category::Governance);

        // Missing pubDate falls back to the run date and passes the cutoff.
        let undated = find(&records, "Retailer Pays $250,000 to Settle EEOC Harassment Suit");
        assert_eq!(undated.date, run_date());

        // Old guidance is fetched and accepted but dropped by the cutoff.
        assert!(records.iter().all(|r| r.date >= config.cutoff));
        let sec_report = summary.sources.iter().find(|s| s.id == "sec-official").unwrap();
        assert_eq!(sec_report.seen, 4);
        assert_eq!(sec_report.accepted, 2);
        assert_eq!(sec_report.too_old, 1);
        assert_eq!(sec_report.added, 1);

        // Properties every persisted collection holds.
        let titles: std::collections::HashSet<&str> =
            records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles.len(), records.len());
        assert!(records.iter().all(|r| r.tags.len() <= 5));
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=records.len() as u64).collect::<Vec<_>>());

        // No credentials, so no digest.
        assert_eq!(summary.digest, DigestOutcome::Skipped(SkipReason::NotConfigured));
    }

    #[tokio::test]
    async fn second_run_is_idempotent_and_resets_new_flags() {
        let server = standard_server().await;
        let config = test_config(standard_sources(&server));
        let transport = RecordingTransport::default();

        let first = run_monitor(&config, None, &transport, &SilentProgress)
            .await
            .unwrap();
        let second = run_monitor(&config, None, &transport, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(second.total_records, first.total_records);
        assert_eq!(second.new_records, 0);
        let records = stored(&config).await;
        assert!(records.iter().all(|r| !r.is_new));
        assert!(second.sources.iter().map(|s| s.duplicates).sum::<usize>() > 0);
    }

    #[tokio::test]
    async fn stored_title_is_not_added_again() {
        let server = standard_server().await;
        let config = test_config(vec![catalog_source("sec-official", &server, "/sec.rss")]);

        let existing = RegulationRecord {
            id: 42,
            title: "SEC Adopts Final Climate Disclosure Rule".into(),
            category: Category::Environmental,
            source_category: String::new(),
            jurisdiction: "sec".into(),
            regulation_type: RegulationType::Disclosure,
            priority: Priority::Critical,
            date: "2025-03-06".parse().unwrap(),
            is_new: true,
            description: "Stored earlier.".into(),
            tags: vec!["Climate".into()],
            effective_date: "TBD".into(),
            source_url: "https://www.sec.gov/newsroom/press-releases/2025-31".into(),
            source_type: "SEC Official".into(),
        };
        RecordStore::new(&config.store_path)
            .save(&[existing])
            .await
            .unwrap();

        let summary = run_monitor(&config, None, &RecordingTransport::default(), &SilentProgress)
            .await
            .unwrap();

        let records = stored(&config).await;
        let matching: Vec<_> = records
            .iter()
            .filter(|r| r.title == "SEC Adopts Final Climate Disclosure Rule")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].description, "Stored earlier.");
        assert_eq!(matching[0].id, 1);
        assert!(!matching[0].is_new);
        assert_eq!(summary.new_records, 0);
        assert_eq!(summary.sources[0].duplicates, 1);
    }

    #[tokio::test]
    async fn partly_corrupt_store_keeps_readable_records() {
        let server = standard_server().await;
        let config = test_config(vec![catalog_source("sec-official", &server, "/sec.rss")]);
        std::fs::create_dir_all(config.store_path.parent().unwrap()).unwrap();
        std::fs::copy(
            "../../../fixtures/json/regulations_mixed.json",
            &config.store_path,
        )
        .unwrap();

        let summary = run_monitor(&config, None, &RecordingTransport::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.skipped_records, 2);
        assert!(summary.quarantined.as_ref().is_some_and(|p| p.exists()));
        let records = stored(&config).await;
        assert!(
            records
                .iter()
                .any(|r| r.regulation_type == RegulationType::ExecutiveAction)
        );
        let sec: Vec<_> = records
            .iter()
            .filter(|r| r.title == "SEC Adopts Final Climate Disclosure Rule")
            .collect();
        assert_eq!(sec.len(), 1);
    }

    #[tokio::test]
    async fn failing_source_does_not_stop_others() {
        let server = standard_server().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/down.rss"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_config(vec![
            catalog_source("fca-official", &server, "/down.rss"),
            catalog_source("eeoc-official", &server, "/eeoc.rss"),
        ]);
        let summary = run_monitor(&config, None, &RecordingTransport::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.failed_sources(), 1);
        assert!(!summary.all_sources_failed());
        assert!(summary.sources[0].failed());
        assert!(summary.sources[0].failures[0].error.contains("500"));
        assert_eq!(summary.sources[1].added, 2);
        assert!(summary.store_written);
    }

    #[tokio::test]
    async fn all_sources_failing_is_visible() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_config(vec![catalog_source("eeoc-official", &server, "/eeoc.rss")]);
        let summary = run_monitor(&config, None, &RecordingTransport::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.new_records, 0);
        assert!(summary.all_sources_failed());
    }

    #[tokio::test]
    async fn dry_run_writes_and_sends_nothing() {
        let server = standard_server().await;
        let mut config = test_config(standard_sources(&server));
        config.dry_run = true;
        let transport = RecordingTransport::default();

        let summary = run_monitor(&config, Some(credentials()), &transport, &SilentProgress)
            .await
            .unwrap();

        assert!(summary.new_records > 0);
        assert!(!summary.store_written);
        assert!(!config.store_path.exists());
        assert_eq!(summary.digest, DigestOutcome::Skipped(SkipReason::Disabled));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn digest_goes_out_on_digest_day() {
        let server = standard_server().await;
        let config = test_config(standard_sources(&server));
        assert_eq!(config.digest.weekday, Weekday::Mon);
        let transport = RecordingTransport::default();

        let summary = run_monitor(&config, Some(credentials()), &transport, &SilentProgress)
            .await
            .unwrap();

        assert!(matches!(summary.digest, DigestOutcome::Sent { .. }));
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Retailer Pays $250,000"));
        assert!(!sent[0].text.contains("SEC Adopts Final Climate Disclosure Rule"));
    }

    #[test]
    fn configured_sources_honors_builtin_flag_and_custom() {
        let mut app = AppConfig::default();
        let builtin = configured_sources(&app, false).len();
        assert_eq!(builtin, builtin_sources().len());

        app.sources.builtin = false;
        app.sources.custom.push(
            SourceDefinition::new("osfi", "OSFI Official", Category::Environmental, "canada")
                .feed("https://www.osfi-bsif.gc.ca/en/news/rss"),
        );
        let only_custom = configured_sources(&app, false);
        assert_eq!(only_custom.len(), 1);
        assert_eq!(only_custom[0].id, "osfi");

        let backfill = configured_sources(&app, true);
        assert!(backfill.iter().all(|s| s.name == "Google News Backfill"));
    }
}
