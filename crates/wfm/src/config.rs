//! Environment-driven configuration for the workforce-management bridge.

/// Bridge configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct WfmConfig {
    /// Base URL of the workforce-management REST API.
    pub api_base: String,
    /// WebSocket URL of the notification service.
    pub notifications_ws: String,
    /// Optional upper bound on the asynchronous completion wait, in
    /// seconds. Unset means wait indefinitely.
    pub wait_timeout_secs: Option<u64>,
}

impl WfmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                             |
    /// |--------------------------------|-------------------------------------|
    /// | `WFM_API_BASE`                 | `http://localhost:8091/api/v2`      |
    /// | `WFM_NOTIFICATIONS_WS`         | `ws://localhost:8091/notifications` |
    /// | `GENERATION_WAIT_TIMEOUT_SECS` | unset (wait indefinitely)           |
    pub fn from_env() -> Self {
        let api_base =
            std::env::var("WFM_API_BASE").unwrap_or_else(|_| "http://localhost:8091/api/v2".into());

        let notifications_ws = std::env::var("WFM_NOTIFICATIONS_WS")
            .unwrap_or_else(|_| "ws://localhost:8091/notifications".into());

        let wait_timeout_secs = std::env::var("GENERATION_WAIT_TIMEOUT_SECS")
            .ok()
            .map(|v| {
                v.parse()
                    .expect("GENERATION_WAIT_TIMEOUT_SECS must be a valid u64")
            });

        Self {
            api_base,
            notifications_ws,
            wait_timeout_secs,
        }
    }
}
