//! Project-wide constants.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared data root every handler reads from and writes to.
pub const DEFAULT_DATA_DIR: &str = "/data";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Chat-completion endpoint used by the email extractor.
pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Overrides [`DEFAULT_LLM_URL`] when set.
pub const LLM_URL_ENV: &str = "TASKGATE_LLM_URL";

/// Default chat model when none is specified.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Credential for the chat-completion API. Read when a handler runs.
pub const API_TOKEN_ENV: &str = "AIPROXY_TOKEN";

/// Identity passed to the data generator. Read when a handler runs.
pub const USER_EMAIL_ENV: &str = "USER_EMAIL";

pub const POSTS_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const SCRAPE_URL: &str = "https://example.com";
pub const REPO_URL: &str = "https://github.com/example/repo.git";

/// Target size for the image resizer.
pub const RESIZE_WIDTH: u32 = 200;
pub const RESIZE_HEIGHT: u32 = 200;

/// How many log files the log extractor looks at.
pub const RECENT_LOG_LIMIT: usize = 10;

/// Maximum subprocess output kept in error messages.
pub const MAX_OUTPUT_BYTES: usize = 50_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!VERSION.is_empty());
        assert!(!DEFAULT_DATA_DIR.is_empty());
        assert!(!DEFAULT_MODEL.is_empty());
    }

    #[test]
    fn urls_are_absolute() {
        for url in [DEFAULT_LLM_URL, POSTS_URL, SCRAPE_URL, REPO_URL] {
            assert!(url.starts_with("https://"), "not absolute: {url}");
        }
    }
}
