//! Configuration loading and representation.
//!
//! Everything comes from environment variables with working defaults, so a bare
//! `cargo run` serves against `./ai` with `python` on `PATH`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use fxsignal_ai::{PipelineStage, INFERENCE_TIMEOUT};

use crate::pipeline::StderrPolicy;
use crate::process::ProcessInvocation;

/// Location of the trained model, relative to the working directory.
pub const ARTIFACT_RELATIVE_PATH: &str = "models/usdjpy_model.pkl";

/// Budget for `<runtime> --version`.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_PORT: u16 = 5000;

const DEFAULT_CORS_ORIGINS: [&str; 6] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:5174",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidDuration { key: &'static str, value: String },

    #[error("{key} must be a TCP port, got {value:?}")]
    InvalidPort { key: &'static str, value: String },

    #[error("{key} must be \"allow-info\" or \"ignore\", got {value:?}")]
    InvalidStderrPolicy { key: &'static str, value: String },
}

/// Where the external runtime and its scripts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
    /// Interpreter executable (bare name resolved via `PATH`, or a path).
    pub runtime: PathBuf,
    /// Directory holding the scripts; also the processes' working directory.
    pub work_dir: PathBuf,
}

impl RuntimeLayout {
    pub fn new(runtime: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.work_dir.join(script)
    }

    /// `<runtime> <work_dir>/<script>` run inside `work_dir`.
    pub fn script_invocation(&self, script: &str, timeout: Duration) -> ProcessInvocation {
        ProcessInvocation::new(&self.runtime, &self.work_dir, timeout).arg(self.script_path(script))
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.work_dir.join(ARTIFACT_RELATIVE_PATH)
    }
}

/// Per-stage time budgets of the retraining pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudgets {
    pub fetch_data: Duration,
    pub engineer_features: Duration,
    pub train: Duration,
}

impl Default for StageBudgets {
    fn default() -> Self {
        Self {
            fetch_data: PipelineStage::FetchData.default_timeout(),
            engineer_features: PipelineStage::EngineerFeatures.default_timeout(),
            train: PipelineStage::Train.default_timeout(),
        }
    }
}

impl StageBudgets {
    pub fn for_stage(&self, stage: PipelineStage) -> Duration {
        match stage {
            PipelineStage::FetchData => self.fetch_data,
            PipelineStage::EngineerFeatures => self.engineer_features,
            PipelineStage::Train => self.train,
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub layout: RuntimeLayout,
    pub cors_origins: Vec<String>,
    pub inference_timeout: Duration,
    pub stage_budgets: StageBudgets,
    pub probe_timeout: Duration,
    /// How pipeline stages treat stderr output.
    pub stderr_policy: StderrPolicy,
}

impl ServiceConfig {
    /// Defaults for a given runtime and working directory.
    pub fn new(runtime: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            layout: RuntimeLayout::new(runtime, work_dir),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            inference_timeout: INFERENCE_TIMEOUT,
            stage_budgets: StageBudgets::default(),
            probe_timeout: PROBE_TIMEOUT,
            stderr_policy: StderrPolicy::default(),
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, map in tests, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let runtime = lookup("PYTHON_PATH").unwrap_or_else(|| "python".to_string());
        let work_dir = absolute(Path::new(&lookup("AI_DIR").unwrap_or_else(|| "./ai".to_string())));

        let mut cfg = Self::new(runtime, work_dir);

        if let Some(raw) = lookup("BACKEND_PORT") {
            let port = raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                key: "BACKEND_PORT",
                value: raw.clone(),
            })?;
            cfg.bind_addr.set_port(port);
        }

        if let Some(raw) = lookup("CORS_ORIGINS") {
            cfg.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = lookup("STAGE_STDERR_POLICY") {
            cfg.stderr_policy = match raw.trim().to_ascii_lowercase().as_str() {
                "allow-info" => StderrPolicy::default(),
                "ignore" => StderrPolicy::Ignore,
                _ => {
                    return Err(ConfigError::InvalidStderrPolicy {
                        key: "STAGE_STDERR_POLICY",
                        value: raw.clone(),
                    })
                }
            };
        }

        cfg.inference_timeout = seconds(&lookup, "INFERENCE_TIMEOUT_SECS", cfg.inference_timeout)?;
        cfg.stage_budgets.fetch_data = seconds(&lookup, "FETCH_TIMEOUT_SECS", cfg.stage_budgets.fetch_data)?;
        cfg.stage_budgets.engineer_features =
            seconds(&lookup, "FEATURES_TIMEOUT_SECS", cfg.stage_budgets.engineer_features)?;
        cfg.stage_budgets.train = seconds(&lookup, "TRAIN_TIMEOUT_SECS", cfg.stage_budgets.train)?;

        Ok(cfg)
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidDuration { key, value: raw }),
        },
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
