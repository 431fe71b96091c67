pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8080
}

pub fn default_history_window_days() -> u32 {
    30
}

pub fn default_page_size() -> u32 {
    50
}

pub fn default_max_page_size() -> u32 {
    1000
}

pub fn default_async_max_in_flight() -> usize {
    64
}

pub fn default_shutdown_grace_seconds() -> u64 {
    30
}

pub fn default_timeout_seconds() -> u64 {
    30
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
