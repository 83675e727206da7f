//! Runtime configuration resolved from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;

use crate::pagination::RESULTS_PER_PAGE;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MediaWiki `api.php` endpoint.
    pub api_url: String,
    /// Prefix for article links.
    pub article_base: String,
    /// Upper bound for a single search or suggestion request.
    pub request_timeout: Duration,
    pub page_size: usize,
    /// Where the preference file lives.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            article_base: DEFAULT_ARTICLE_BASE.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            page_size: RESULTS_PER_PAGE,
            data_dir: crate::default_data_dir(),
        }
    }
}

impl AppConfig {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(url) = dotenvy::var("WIKISEARCH_API_URL")
            && !url.trim().is_empty()
        {
            cfg.api_url = url.trim().to_string();
        }

        if let Ok(base) = dotenvy::var("WIKISEARCH_ARTICLE_BASE")
            && !base.trim().is_empty()
        {
            cfg.article_base = base.trim().to_string();
        }

        if let Ok(val) = dotenvy::var("WIKISEARCH_TIMEOUT_MS")
            && let Ok(ms) = val.parse::<u64>()
            && ms > 0
        {
            cfg.request_timeout = Duration::from_millis(ms);
        }

        if let Ok(val) = dotenvy::var("WIKISEARCH_PAGE_SIZE")
            && let Ok(size) = val.parse::<usize>()
            && size > 0
        {
            cfg.page_size = size;
        }

        if let Ok(path) = dotenvy::var("WIKISEARCH_DATA_DIR")
            && !path.is_empty()
        {
            cfg.data_dir = PathBuf::from(path);
        }

        cfg
    }

    /// Apply a `--data-dir` override.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "WIKISEARCH_API_URL",
        "WIKISEARCH_ARTICLE_BASE",
        "WIKISEARCH_TIMEOUT_MS",
        "WIKISEARCH_PAGE_SIZE",
        "WIKISEARCH_DATA_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        clear_env();
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.article_base, DEFAULT_ARTICLE_BASE);
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.page_size, 6);
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        clear_env();
        unsafe {
            std::env::set_var("WIKISEARCH_API_URL", "http://localhost:9/api.php");
            std::env::set_var("WIKISEARCH_TIMEOUT_MS", "250");
            std::env::set_var("WIKISEARCH_PAGE_SIZE", "10");
            std::env::set_var("WIKISEARCH_DATA_DIR", "/tmp/wikisearch-test");
        }
        let cfg = AppConfig::from_env();
        clear_env();

        assert_eq!(cfg.api_url, "http://localhost:9/api.php");
        assert_eq!(cfg.request_timeout, Duration::from_millis(250));
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/wikisearch-test"));
    }

    #[test]
    #[serial]
    fn invalid_numbers_fall_back_to_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("WIKISEARCH_TIMEOUT_MS", "soon");
            std::env::set_var("WIKISEARCH_PAGE_SIZE", "0");
        }
        let cfg = AppConfig::from_env();
        clear_env();

        assert_eq!(cfg.request_timeout, DEFAULT_TIMEOUT);
        assert_eq!(cfg.page_size, RESULTS_PER_PAGE);
    }

    #[test]
    fn data_dir_override_wins() {
        let cfg = AppConfig::default().with_data_dir(Some(PathBuf::from("/x")));
        assert_eq!(cfg.data_dir, PathBuf::from("/x"));
    }
}
