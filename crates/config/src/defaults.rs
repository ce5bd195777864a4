pub fn default_instruments() -> Vec<String> {
    vec!["GBP/USD".to_string()]
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8080
}

pub fn default_key_capacity() -> usize {
    3000
}

pub fn default_side_capacity() -> usize {
    2000
}

pub fn default_rebuild_capacity() -> usize {
    20000
}

pub fn default_lock_shards() -> usize {
    64
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_metrics_port() -> u16 {
    9100
}
