//! Default values shared between the config crate and the components that
//! consume configuration.

pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PORT: u16 = 7071;
    pub const DEFAULT_BIND: &str = "127.0.0.1";
    /// 10 MB
    pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

    pub const RESOURCE_BASE_URL: &str = "https://management.azure.com";
    pub const RESOURCE_API_VERSION: &str = "2016-06-01";
    pub const MAX_CONCURRENT_LOOKUPS: usize = 8;
    /// One page matches the behaviour of a plain GET on the list endpoints.
    pub const MAX_PAGES: u32 = 1;

    pub const GENERATIVE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const GENERATIVE_MODEL: &str = "gemini-1.5-flash-latest";

    pub const ACTIVITY_MAX_ATTEMPTS: u32 = 3;
    pub const FIRST_RETRY_INTERVAL_MS: u64 = 500;
    pub const BACKOFF_COEFFICIENT: f64 = 2.0;
    pub const MAX_RETRY_INTERVAL_SECS: u64 = 300;

    pub fn first_retry_interval() -> Duration {
        Duration::from_millis(FIRST_RETRY_INTERVAL_MS)
    }

    pub fn max_retry_interval() -> Duration {
        Duration::from_secs(MAX_RETRY_INTERVAL_SECS)
    }
}
