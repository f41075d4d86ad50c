use std::time::Duration;

/// Parameters for the page fetcher
#[derive(Debug, Clone)]
pub struct FetchParams {
    /// Per-request ceiling covering connect, headers and body
    pub timeout: Duration,
}

impl FetchParams {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
        }
    }
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}
