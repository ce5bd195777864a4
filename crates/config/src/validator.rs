use crate::*;
use regex::Regex;
use thiserror::Error;

/// Upper bound on lock stripes; each stripe allocates a mutex at startup
const MAX_LOCK_SHARDS: usize = 1 << 16;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("No instruments configured")]
    NoInstruments,

    #[error("Instrument '{symbol}': {message}")]
    InvalidInstrument { symbol: String, message: String },

    #[error("Server host is required")]
    MissingServerHost,

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("engine.lock_shards ({shards}) exceeds the maximum of {max}")]
    TooManyLockShards { shards: usize, max: usize },

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Metrics port {0} collides with the HTTP server port")]
    MetricsPortCollision(u16),

    #[error("{field} contains an unresolved environment variable placeholder")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &FxmatchConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_server(&config.server, &mut report);
    validate_engine(&config.engine, &mut report);
    validate_observability(&config.observability, &config.server, &mut report);

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }

    let version_regex = Regex::new(r"^\d+\.\d+\.\d+$").unwrap();
    if !version_regex.is_match(&service.version) {
        report.add_error(ValidationError::InvalidVersionFormat(service.version.clone()));
    }

    if service.instruments.is_empty() {
        report.add_error(ValidationError::NoInstruments);
        return;
    }

    let mut seen = Vec::new();
    for entry in &service.instruments {
        if has_unresolved_env_vars(entry) {
            report.add_error(ValidationError::UnresolvedEnvVar {
                field: format!("service.instruments.{}", entry),
            });
            continue;
        }

        let normalized: String = entry
            .trim()
            .chars()
            .filter(|c| *c != '/')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() {
            report.add_error(ValidationError::InvalidInstrument {
                symbol: entry.clone(),
                message: "Symbol normalizes to an empty string".to_string(),
            });
            continue;
        }

        if seen.contains(&normalized) {
            report.add_warning(
                "service.instruments",
                &format!("Duplicate entries normalize to the same symbol '{}'", normalized),
            );
        }
        seen.push(normalized);
    }
}

fn validate_server(server: &HttpConfig, report: &mut ValidationReport) {
    if server.host.is_empty() {
        report.add_error(ValidationError::MissingServerHost);
    } else if has_unresolved_env_vars(&server.host) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "server.host".to_string(),
        });
    }

    if server.port == 0 {
        report.add_warning(
            "server.port",
            "Port 0 binds an ephemeral port chosen by the operating system",
        );
    }
}

fn validate_engine(engine: &EngineConfig, report: &mut ValidationReport) {
    if engine.key_capacity == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "engine.key_capacity".to_string(),
        });
    }

    if engine.side_capacity == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "engine.side_capacity".to_string(),
        });
    } else if engine.side_capacity > engine.key_capacity {
        report.add_warning(
            "engine.side_capacity",
            &format!(
                "side_capacity ({}) exceeds key_capacity ({}); side buckets can never outgrow the key index",
                engine.side_capacity, engine.key_capacity
            ),
        );
    }

    if engine.rebuild_capacity == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "engine.rebuild_capacity".to_string(),
        });
    } else if engine.rebuild_capacity < engine.side_capacity {
        report.add_warning(
            "engine.rebuild_capacity",
            &format!(
                "rebuild_capacity ({}) is below side_capacity ({}); a rebuild would shrink buckets below the append limit",
                engine.rebuild_capacity, engine.side_capacity
            ),
        );
    }

    if engine.lock_shards == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "engine.lock_shards".to_string(),
        });
    } else if engine.lock_shards > MAX_LOCK_SHARDS {
        report.add_error(ValidationError::TooManyLockShards {
            shards: engine.lock_shards,
            max: MAX_LOCK_SHARDS,
        });
    } else if !engine.lock_shards.is_power_of_two() {
        report.add_warning(
            "engine.lock_shards",
            &format!(
                "lock_shards ({}) is not a power of two and will be rounded up at startup",
                engine.lock_shards
            ),
        );
    }
}

fn validate_observability(
    observability: &ObservabilityConfig,
    server: &HttpConfig,
    report: &mut ValidationReport,
) {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&observability.log_level.as_str())
        && !observability.log_level.contains('=')
    {
        report.add_warning(
            "observability.log_level",
            &format!(
                "Level '{}' is not a plain level or filter directive and may not parse",
                observability.log_level
            ),
        );
    }

    let valid_formats = ["pretty", "json", "compact"];
    if !valid_formats.contains(&observability.log_format.as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(
            observability.log_format.clone(),
        ));
    }

    match observability.metrics_port {
        Some(port) if port == server.port => {
            report.add_error(ValidationError::MetricsPortCollision(port));
        }
        Some(_) => {}
        None => {
            report.add_default("observability.metrics_port", "disabled");
        }
    }
}
