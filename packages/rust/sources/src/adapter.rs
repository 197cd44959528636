//! The generic adapter: one instance per [`SourceDefinition`].

use tracing::{debug, info, instrument, warn};

use regwatch_classify::match_text;
use regwatch_shared::SourceDefinition;

use crate::feed::{FeedClient, RawEntry};
use crate::rules::{RelevanceFilter, Verdict};

/// A feed that could not be fetched or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFailure {
    pub url: String,
    pub error: String,
}

/// What one adapter produced during a run.
#[derive(Debug, Clone, Default)]
pub struct AdapterOutput {
    /// Entries that passed the relevance filter, in feed order.
    pub accepted: Vec<RawEntry>,
    pub feeds_attempted: usize,
    pub failures: Vec<FeedFailure>,
    /// Entries read across all feeds (after `max_entries`).
    pub seen: usize,
    /// Entries skipped for having no title.
    pub untitled: usize,
}

impl AdapterOutput {
    /// True when every attempted feed failed.
    pub fn all_failed(&self) -> bool {
        self.feeds_attempted > 0 && self.failures.len() == self.feeds_attempted
    }
}

/// Fetches a source's feeds and applies its relevance rules.
#[derive(Debug, Clone)]
pub struct SourceAdapter {
    definition: SourceDefinition,
    filter: RelevanceFilter,
}

impl SourceAdapter {
    pub fn new(definition: SourceDefinition) -> Self {
        let filter = RelevanceFilter::from_source(&definition);
        Self { definition, filter }
    }

    pub fn definition(&self) -> &SourceDefinition {
        &self.definition
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Apply the relevance filter to one entry.
    pub fn judge(&self, entry: &RawEntry) -> Verdict {
        self.filter
            .evaluate(&match_text(&entry.title, &entry.description))
    }

    /// Fetch every feed in turn. Failures are recorded and never abort the
    /// remaining feeds.
    #[instrument(skip_all, fields(source = %self.definition.id))]
    pub async fn collect(&self, client: &FeedClient) -> AdapterOutput {
        let mut output = AdapterOutput::default();

        let urls = match self.definition.feed_urls() {
            Ok(urls) => urls,
            Err(e) => {
                warn!(error = %e, "invalid feed configuration");
                output.feeds_attempted = self.definition.feeds.len().max(1);
                output.failures.push(FeedFailure {
                    url: self.definition.feeds.join(", "),
                    error: e.to_string(),
                });
                return output;
            }
        };

        for url in urls {
            output.feeds_attempted += 1;

            let entries = match client.fetch(&url, self.definition.max_entries).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(%url, error = %e, "feed failed");
                    output.failures.push(FeedFailure {
                        url: url.to_string(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            output.seen += entries.len();
            for entry in entries {
                if entry.title.is_empty() {
                    output.untitled += 1;
                    continue;
                }
                match self.judge(&entry) {
                    Verdict::Accept => output.accepted.push(entry),
                    verdict => debug!(title = %entry.title, %verdict, "entry rejected"),
                }
            }
        }

        info!(
            feeds = output.feeds_attempted,
            failed = output.failures.len(),
            seen = output.seen,
            accepted = output.accepted.len(),
            "source collected"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use regwatch_shared::{Category, FetchConfig};

    use super::*;
    use crate::catalog::builtin_sources;

    fn load_fixture(name: &str) -> Vec<u8> {
        let path = format!("../../../fixtures/feeds/{name}");
        std::fs::read(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn catalog_source(id: &str, server_uri: &str, path: &str) -> SourceDefinition {
        let mut source = builtin_sources()
            .into_iter()
            .find(|s| s.id == id)
            .unwrap();
        source.feeds = vec![format!("{server_uri}{path}")];
        source.queries.clear();
        source
    }

    async fn mount_feed(server: &wiremock::MockServer, path: &str, fixture: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(load_fixture(fixture)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn sec_source_filters_fixture() {
        let server = wiremock::MockServer::start().await;
        mount_feed(&server, "/sec.rss", "sec_press.rss").await;

        let adapter = SourceAdapter::new(catalog_source("sec-official", &server.uri(), "/sec.rss"));
        let client = FeedClient::new(&FetchConfig::default()).unwrap();
        let output = adapter.collect(&client).await;

        assert_eq!(output.feeds_attempted, 1);
        assert!(output.failures.is_empty());
        assert_eq!(output.seen, 4);
        let titles: Vec<&str> = output.accepted.iter().map(|e| e.title.as_str()).collect();
        // The shareholder proposal lacks ESG keywords and the webinar is commentary.
        assert_eq!(
            titles,
            vec![
                "SEC Adopts Final Climate Disclosure Rule",
                "Commission Publishes Climate Disclosure Guidance",
            ]
        );
    }

    #[tokio::test]
    async fn reuters_environmental_requires_action() {
        let server = wiremock::MockServer::start().await;
        mount_feed(&server, "/legal", "reuters_legal.rss").await;

        let adapter = SourceAdapter::new(catalog_source(
            "reuters-environmental",
            &server.uri(),
            "/legal",
        ));
        let client = FeedClient::new(&FetchConfig::default()).unwrap();
        let output = adapter.collect(&client).await;

        assert_eq!(output.accepted.len(), 1);
        assert_eq!(
            output.accepted[0].title,
            "Judge blocks enforcement of California SB 253 emissions law"
        );
    }

    #[tokio::test]
    async fn failed_feed_does_not_stop_the_next() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/broken"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount_feed(&server, "/eeoc.rss", "eeoc.rss").await;

        let definition = SourceDefinition::new("eeoc", "EEOC Official", Category::Social, "eeoc")
            .feed(format!("{}/broken", server.uri()))
            .feed(format!("{}/eeoc.rss", server.uri()));
        let adapter = SourceAdapter::new(definition);
        let client = FeedClient::new(&FetchConfig::default()).unwrap();
        let output = adapter.collect(&client).await;

        assert_eq!(output.feeds_attempted, 2);
        assert_eq!(output.failures.len(), 1);
        assert!(output.failures[0].url.ends_with("/broken"));
        assert!(!output.all_failed());
        assert_eq!(output.accepted.len(), 2);
    }

    #[test]
    fn judge_matches_title_and_description() {
        let adapter = SourceAdapter::new(
            SourceDefinition::new("x", "X", Category::Social, "federal")
                .feed("https://example.com/rss")
                .include(&["eeoc"]),
        );
        let entry = RawEntry {
            title: "EEOC settles".into(),
            description: String::new(),
            published: None,
            link: String::new(),
        };
        assert!(adapter.judge(&entry).is_accept());
    }
}
