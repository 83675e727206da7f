use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use wikisearch::config::AppConfig;
use wikisearch::model::types::SearchResult;
use wikisearch::search::{SearchBackend, SearchError};

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Config pointing nowhere, with a short timeout.
#[allow(dead_code)]
pub fn test_config(data_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        api_url: "http://127.0.0.1:9/w/api.php".into(),
        data_dir: data_dir.to_path_buf(),
        request_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    }
}

#[allow(dead_code)]
/// `n` results titled `"{prefix} 0"`, `"{prefix} 1"`, ...
pub fn hits(prefix: &str, n: usize) -> Vec<SearchResult> {
    (0..n)
        .map(|i| {
            SearchResult::new(
                i as i64 + 1,
                format!("{prefix} {i}"),
                format!("<span class=\"searchmatch\">{prefix}</span> article {i}"),
            )
        })
        .collect()
}

/// In-process backend answering from fixed tables.
#[derive(Clone, Default)]
pub struct FakeBackend {
    results: HashMap<String, Vec<SearchResult>>,
    suggestions: HashMap<String, String>,
    failing: Vec<String>,
    hanging: Vec<String>,
    pub calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, term: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(term.to_string(), results);
        self
    }

    pub fn with_suggestion(mut self, term: &str, suggestion: &str) -> Self {
        self.suggestions.insert(term.to_string(), suggestion.to_string());
        self
    }

    pub fn failing_on(mut self, term: &str) -> Self {
        self.failing.push(term.to_string());
        self
    }

    /// Requests for `term` never resolve.
    pub fn hanging_on(mut self, term: &str) -> Self {
        self.hanging.push(term.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SearchBackend for FakeBackend {
    fn fetch_results(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hang = self.hanging.iter().any(|t| t == term);
        let fail = self.failing.iter().any(|t| t == term);
        let results = self.results.get(term).cloned().unwrap_or_default();
        async move {
            if hang {
                std::future::pending::<()>().await;
            }
            if fail {
                return Err(SearchError::Status(503));
            }
            Ok(results)
        }
    }

    fn fetch_suggestion(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Option<String>, SearchError>> + Send {
        let hang = self.hanging.iter().any(|t| t == term);
        let suggestion = self.suggestions.get(term).cloned();
        async move {
            if hang {
                std::future::pending::<()>().await;
            }
            Ok(suggestion)
        }
    }
}
