//! DOI metadata lookup.
//!
//! Identifiers are resolved one at a time against a Crossref-style works
//! endpoint (`GET {endpoint}/{doi}`). A failed identifier never stops the
//! batch: every failure is collected and reported next to the references
//! that did resolve.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::reference::{Reference, NOT_AVAILABLE};

/// The public Crossref works API.
pub const DEFAULT_ENDPOINT: &str = "https://api.crossref.org/works";

/// Default request timeout, matching the HTTP client's own default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A transport-level failure (connection refused, timeout, bad TLS, ...).
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Why a single identifier could not be turned into a reference.
#[derive(Error, Debug)]
pub enum LookupFailure {
    #[error("failed to fetch reference for DOI: {identifier} (HTTP status {status})")]
    Status { identifier: String, status: u16 },

    #[error("failed to fetch reference for DOI: {identifier} ({message})")]
    Transport { identifier: String, message: String },

    #[error("failed to fetch reference for DOI: {identifier} (invalid response: {message})")]
    InvalidResponse { identifier: String, message: String },
}

impl LookupFailure {
    /// The identifier this failure belongs to.
    pub fn identifier(&self) -> &str {
        match self {
            LookupFailure::Status { identifier, .. }
            | LookupFailure::Transport { identifier, .. }
            | LookupFailure::InvalidResponse { identifier, .. } => identifier,
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Issues GET requests on behalf of the [`MetadataClient`].
pub trait Transport {
    fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("refkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TransportError(e.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

/// Outcome of a batch lookup.
#[derive(Debug, Default)]
pub struct LookupReport {
    /// Resolved references, in identifier order.
    pub references: Vec<Reference>,
    /// One entry per identifier that failed, in identifier order.
    pub failures: Vec<LookupFailure>,
}

/// Resolves DOIs into references through a [`Transport`].
#[derive(Debug)]
pub struct MetadataClient<T> {
    endpoint: String,
    transport: T,
}

impl<T: Transport> MetadataClient<T> {
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, identifier: &str) -> String {
        format!("{}/{}", self.endpoint, identifier)
    }

    /// Looks up a single identifier.
    pub fn lookup(&self, identifier: &str) -> Result<Reference, LookupFailure> {
        let url = self.url_for(identifier);
        debug!(%url, "requesting metadata");

        let response = self
            .transport
            .get(&url)
            .map_err(|e| LookupFailure::Transport {
                identifier: identifier.to_string(),
                message: e.to_string(),
            })?;

        if response.status != 200 {
            return Err(LookupFailure::Status {
                identifier: identifier.to_string(),
                status: response.status,
            });
        }

        parse_work(&response.body).map_err(|e| LookupFailure::InvalidResponse {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })
    }

    /// Looks up every identifier in order, collecting successes and failures.
    pub fn fetch_all(&self, identifiers: &[String]) -> LookupReport {
        let mut report = LookupReport::default();

        for identifier in identifiers {
            match self.lookup(identifier) {
                Ok(reference) => report.references.push(reference),
                Err(failure) => {
                    warn!(%identifier, error = %failure, "lookup failed");
                    report.failures.push(failure);
                }
            }
        }

        info!(
            resolved = report.references.len(),
            failed = report.failures.len(),
            "lookup batch finished"
        );
        report
    }
}

static DOI_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://(?:dx\.)?doi\.org/|doi:\s*)").unwrap()
});

/// Splits free text into identifiers: one per line, trimmed, blank lines
/// skipped. DOI URL and `doi:` prefixes are removed.
pub fn parse_identifiers(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| DOI_PREFIX_RE.replace(line, "").into_owned())
        .filter(|id| !id.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
struct WorkResponse {
    message: Work,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<WorkAuthor>,
    #[serde(rename = "published-print")]
    published_print: Option<WorkDate>,
}

#[derive(Debug, Deserialize)]
struct WorkAuthor {
    given: Option<String>,
    family: Option<String>,
    /// Organisations carry a single `name` instead of given/family.
    name: Option<String>,
}

impl WorkAuthor {
    fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.given.as_deref(), self.family.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.name.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<serde_json::Value>>,
}

/// Maps a works response body onto a reference.
fn parse_work(body: &str) -> Result<Reference, serde_json::Error> {
    let work = serde_json::from_str::<WorkResponse>(body)?.message;

    let title = work
        .title
        .into_iter()
        .next()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let author = work
        .author
        .iter()
        .map(WorkAuthor::display_name)
        .collect::<Vec<_>>()
        .join(", ");

    let year = work
        .published_print
        .as_ref()
        .and_then(|date| date.date_parts.first())
        .and_then(|parts| parts.first())
        .and_then(|value| match value {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        });

    Ok(Reference {
        title,
        author,
        year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Transport serving canned responses keyed by URL.
    #[derive(Default)]
    struct FakeTransport {
        responses: HashMap<String, Result<TransportResponse, String>>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn with(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                Ok(TransportResponse {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        fn failing(mut self, url: &str, message: &str) -> Self {
            self.responses
                .insert(url.to_string(), Err(message.to_string()));
            self
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
            self.requested.borrow_mut().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(message)) => Err(TransportError(message.clone())),
                None => Ok(TransportResponse {
                    status: 404,
                    body: "Resource not found.".to_string(),
                }),
            }
        }
    }

    const WORK_BODY: &str = r#"{
        "status": "ok",
        "message": {
            "title": ["Deep Residual Learning", "Alternate Title"],
            "author": [
                {"given": "Kaiming", "family": "He"},
                {"given": "Xiangyu", "family": "Zhang"}
            ],
            "published-print": {"date-parts": [[2016, 6]]}
        }
    }"#;

    // --- Tests for parse_identifiers ---

    #[test]
    fn test_parse_identifiers_trims_and_skips_blank_lines() {
        let text = "  10.1000/a  \n\n10.1000/b\n   \n";
        assert_eq!(parse_identifiers(text), vec!["10.1000/a", "10.1000/b"]);
    }

    #[test]
    fn test_parse_identifiers_strips_doi_prefixes() {
        let text = "https://doi.org/10.1000/a\ndoi:10.1000/b\nhttp://dx.doi.org/10.1000/c";
        assert_eq!(
            parse_identifiers(text),
            vec!["10.1000/a", "10.1000/b", "10.1000/c"]
        );
    }

    #[test]
    fn test_parse_identifiers_empty_text() {
        assert!(parse_identifiers("").is_empty());
    }

    // --- Tests for parse_work ---

    #[test]
    fn test_parse_work_maps_fields() {
        // Given: a typical works response
        // When: we map it
        let reference = parse_work(WORK_BODY).unwrap();

        // Then: first title, joined authors and print year are used
        assert_eq!(reference.title, "Deep Residual Learning");
        assert_eq!(reference.author, "Kaiming He, Xiangyu Zhang");
        assert_eq!(reference.year.as_deref(), Some("2016"));
    }

    #[test]
    fn test_parse_work_empty_author_list_is_empty_string() {
        let body = r#"{"message": {"title": ["T"], "author": []}}"#;
        let reference = parse_work(body).unwrap();
        assert_eq!(reference.author, "");
    }

    #[test]
    fn test_parse_work_missing_fields() {
        // Given: a response without title, author or print date
        let body = r#"{"message": {}}"#;

        // When: we map it
        let reference = parse_work(body).unwrap();

        // Then: title falls back to N/A, author is empty and the year is absent
        assert_eq!(reference.title, "N/A");
        assert_eq!(reference.author, "");
        assert_eq!(reference.year, None);
    }

    #[test]
    fn test_parse_work_organisation_author() {
        let body = r#"{"message": {"author": [{"name": "WHO Consortium"}, {"family": "Solo"}]}}"#;
        let reference = parse_work(body).unwrap();
        assert_eq!(reference.author, "WHO Consortium, Solo");
    }

    #[test]
    fn test_parse_work_null_date_part() {
        let body = r#"{"message": {"published-print": {"date-parts": [[null]]}}}"#;
        let reference = parse_work(body).unwrap();
        assert_eq!(reference.year, None);
    }

    #[test]
    fn test_parse_work_invalid_json() {
        assert!(parse_work("<html>not json</html>").is_err());
    }

    // --- Tests for MetadataClient ---

    #[test]
    fn test_lookup_builds_url_from_endpoint() {
        let transport = FakeTransport::default().with("https://api.test/works/10.1/x", 200, WORK_BODY);
        let client = MetadataClient::new("https://api.test/works/", transport);

        let reference = client.lookup("10.1/x").unwrap();

        assert_eq!(client.endpoint(), "https://api.test/works");
        assert_eq!(reference.title, "Deep Residual Learning");
        assert_eq!(
            *client.transport.requested.borrow(),
            vec!["https://api.test/works/10.1/x".to_string()]
        );
    }

    #[test]
    fn test_lookup_non_200_is_status_failure() {
        let client = MetadataClient::new("https://api.test/works", FakeTransport::default());

        let failure = client.lookup("10.1/missing").unwrap_err();

        assert!(matches!(failure, LookupFailure::Status { status: 404, .. }));
        assert_eq!(failure.identifier(), "10.1/missing");
        assert!(failure.to_string().contains("10.1/missing"));
    }

    #[test]
    fn test_fetch_all_continues_after_failures() {
        // Given: three identifiers; the first 404s and the second times out
        let transport = FakeTransport::default()
            .failing("https://api.test/works/10.1/slow", "operation timed out")
            .with("https://api.test/works/10.1/ok", 200, WORK_BODY);
        let client = MetadataClient::new("https://api.test/works", transport);
        let ids = vec![
            "10.1/gone".to_string(),
            "10.1/slow".to_string(),
            "10.1/ok".to_string(),
        ];

        // When: we fetch the batch
        let report = client.fetch_all(&ids);

        // Then: every identifier was requested and only the last one resolved
        assert_eq!(client.transport.requested.borrow().len(), 3);
        assert_eq!(report.references.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0], LookupFailure::Status { .. }));
        assert!(matches!(report.failures[1], LookupFailure::Transport { .. }));
        assert_eq!(report.failures[1].identifier(), "10.1/slow");
    }

    #[test]
    fn test_fetch_all_invalid_body_is_failure() {
        let transport = FakeTransport::default().with("https://api.test/works/10.1/bad", 200, "oops");
        let client = MetadataClient::new("https://api.test/works", transport);

        let report = client.fetch_all(&["10.1/bad".to_string()]);

        assert!(report.references.is_empty());
        assert!(matches!(
            report.failures[0],
            LookupFailure::InvalidResponse { .. }
        ));
    }
}
