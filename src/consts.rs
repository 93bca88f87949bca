//! Project-wide constants.

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default Ollama generation endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Default local model when none is specified.
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Default address for the HTTP service.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default content store file, a JSON object of `content_id -> engine output`.
pub const DEFAULT_STORE_PATH: &str = "data/content_store.json";

/// Where the base pipeline dumps engine outputs.
pub const DEFAULT_BASE_OUTPUT: &str = "base_engine_outputs.json";

/// Where the insight pipeline dumps model verdicts.
pub const DEFAULT_INSIGHT_OUTPUT: &str = "outputs/llm_insights.json";

/// Returned (with HTTP 200) when a requested content id is not in the store.
pub const LINK_NOT_FOUND: &str = "Link not found";

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
