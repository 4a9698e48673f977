use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "oncopanel_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-task deadline in seconds; 0 disables the deadline entirely.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// How renderers present slots that settled without a payload.
    #[serde(default)]
    pub degraded_slots: DegradedSlotPolicy,
}

fn default_task_timeout_secs() -> u64 {
    30
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: default_task_timeout_secs(),
            degraded_slots: DegradedSlotPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn task_timeout(&self) -> Option<std::time::Duration> {
        if self.task_timeout_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.task_timeout_secs))
        }
    }
}

/// Rendering policy for rejected or skipped slots. `Annotate` keeps the slot
/// visible with its reason; `Omit` drops it from the rendered report (the
/// underlying outcome is still recorded).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegradedSlotPolicy {
    #[default]
    Annotate,
    Omit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(flatten)]
    pub provider: BackendProvider,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::Synthetic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum BackendProvider {
    /// Deterministic in-process prediction engines; the default.
    #[serde(rename = "synthetic")]
    Synthetic,
    /// Remote prediction service speaking the HTTP contract.
    #[serde(rename = "remote")]
    Remote(RemoteBackendConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBackendConfig {
    #[serde(default = "default_remote_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8920".to_string()
}

fn default_timeout_ms() -> u64 {
    8000
}

impl Default for RemoteBackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_url(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
