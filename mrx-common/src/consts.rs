/// Version prefix of every MySQL Router REST endpoint
pub const API_BASE_PATH: &str = "/api/20190715";

/// Prefix applied to every exported metric name
pub const NAMESPACE: &str = "mysqlrouter";

pub const DEFAULT_LISTEN_PORT: u16 = 9152;
pub const DEFAULT_COLLECT_INTERVAL_SECS: u64 = 2;
