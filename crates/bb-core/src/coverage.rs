//! Coverage target tracking
//!
//! A coverage target is an opaque label for a requirement the service under
//! test records when a request exercises it. [`CoverageContext`] is the set
//! of labels recorded so far. The service owns the recording; the harness
//! only reads and resets it through a [`CoverageProbe`], once before the
//! generation phase and once before the generated suite is re-executed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::error::VerificationError;

/// Set of covered target labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageContext {
    covered: BTreeSet<String>,
}

impl CoverageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: impl Into<String>) {
        self.covered.insert(label.into());
    }

    pub fn is_covered(&self, label: &str) -> bool {
        self.covered.contains(label)
    }

    /// True only if every label is covered. An empty set is vacuously covered.
    pub fn are_covered<I, S>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels.into_iter().all(|l| self.is_covered(l.as_ref()))
    }

    /// Labels from `labels` that are not covered, in input order
    pub fn missing<I, S>(&self, labels: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .filter(|l| !self.is_covered(l.as_ref()))
            .map(|l| l.as_ref().to_string())
            .collect()
    }

    /// Assert every label is covered.
    pub fn check_covered_targets<I, S>(&self, labels: I) -> Result<(), VerificationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let missing = self.missing(labels);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(VerificationError::TargetsNotCovered { missing })
        }
    }

    pub fn reset(&mut self) {
        self.covered.clear();
    }

    pub fn len(&self) -> usize {
        self.covered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.covered.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CoverageContext {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            covered: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read/reset access to the coverage recorded by the service under test.
#[async_trait]
pub trait CoverageProbe: Send + Sync + fmt::Debug {
    /// Clear every recorded label.
    async fn reset(&self) -> Result<(), VerificationError>;

    /// Copy of the labels recorded so far.
    async fn snapshot(&self) -> Result<CoverageContext, VerificationError>;
}

/// Coverage shared with a service hosted in the same process.
///
/// Clones share the same set: hand one clone to the service so it can
/// [`record`](SharedCoverage::record), keep another as the probe.
#[derive(Debug, Clone, Default)]
pub struct SharedCoverage {
    inner: Arc<Mutex<CoverageContext>>,
}

impl SharedCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CoverageContext> {
        // A panic while recording leaves the set itself intact
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, label: impl Into<String>) {
        self.lock().record(label);
    }

    pub fn clear(&self) {
        self.lock().reset();
    }

    pub fn get(&self) -> CoverageContext {
        self.lock().clone()
    }
}

#[async_trait]
impl CoverageProbe for SharedCoverage {
    async fn reset(&self) -> Result<(), VerificationError> {
        self.clear();
        Ok(())
    }

    async fn snapshot(&self) -> Result<CoverageContext, VerificationError> {
        Ok(self.get())
    }
}

/// Coverage exposed by an out-of-process service over HTTP.
///
/// `GET <url>` returns a JSON array of covered labels, `DELETE <url>` clears
/// them.
#[derive(Debug, Clone)]
pub struct HttpCoverageProbe {
    url: String,
    client: reqwest::Client,
}

impl HttpCoverageProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn probe_error(&self, action: &str, e: reqwest::Error) -> VerificationError {
        VerificationError::Probe {
            message: format!("{action} {} failed: {e}", self.url),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl CoverageProbe for HttpCoverageProbe {
    async fn reset(&self) -> Result<(), VerificationError> {
        debug!(url = %self.url, "resetting remote coverage");
        self.client
            .delete(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.probe_error("DELETE", e))?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<CoverageContext, VerificationError> {
        let labels: Vec<String> = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.probe_error("GET", e))?
            .json()
            .await
            .map_err(|e| self.probe_error("GET", e))?;
        debug!(url = %self.url, covered = labels.len(), "fetched remote coverage");
        Ok(labels.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_uncovers_every_non_empty_set() {
        let mut ctx: CoverageContext = ["a", "b", "c"].into_iter().collect();
        assert!(ctx.are_covered(["a", "b"]));

        ctx.reset();

        assert!(!ctx.are_covered(["a"]));
        assert!(!ctx.are_covered(["a", "b", "c"]));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_empty_label_set_is_vacuously_covered() {
        let ctx = CoverageContext::new();
        assert!(ctx.are_covered(Vec::<String>::new()));
        assert!(ctx.check_covered_targets(Vec::<String>::new()).is_ok());
    }

    #[test]
    fn test_check_reports_missing_in_input_order() {
        let ctx: CoverageContext = ["b"].into_iter().collect();
        let err = ctx.check_covered_targets(["c", "b", "a"]).unwrap_err();
        match err {
            VerificationError::TargetsNotCovered { missing } => {
                assert_eq!(missing, vec!["c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partial_coverage_is_not_covered() {
        let ctx: CoverageContext = ["a"].into_iter().collect();
        assert!(!ctx.are_covered(["a", "b"]));
    }

    #[tokio::test]
    async fn test_shared_coverage_clones_share_state() {
        let probe = SharedCoverage::new();
        let service_side = probe.clone();

        service_side.record("XML_TO_STRING");
        let snapshot = probe.snapshot().await.unwrap();
        assert!(snapshot.is_covered("XML_TO_STRING"));

        probe.reset().await.unwrap();
        assert!(service_side.get().is_empty());
    }

    #[test]
    fn test_context_serializes_as_label_array() {
        let ctx: CoverageContext = ["b", "a"].into_iter().collect();
        assert_eq!(serde_json::to_string(&ctx).unwrap(), r#"["a","b"]"#);
    }
}
