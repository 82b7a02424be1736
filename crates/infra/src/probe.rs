//! Runtime and model-artifact availability checks.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::RuntimeLayout;
use crate::process::{ProcessInvocation, ProcessInvoker};

/// Result of one health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub runtime_available: bool,
    pub artifact_available: bool,
}

impl HealthReport {
    pub fn healthy(&self) -> bool {
        self.runtime_available && self.artifact_available
    }
}

/// Answers "can we run anything at all?" without running a prediction.
pub struct AvailabilityProbe {
    invoker: Arc<dyn ProcessInvoker>,
    layout: RuntimeLayout,
    timeout: Duration,
}

impl AvailabilityProbe {
    pub fn new(invoker: Arc<dyn ProcessInvoker>, layout: RuntimeLayout, timeout: Duration) -> Self {
        Self {
            invoker,
            layout,
            timeout,
        }
    }

    /// `<runtime> --version` exits zero within the probe budget.
    ///
    /// Any failure (missing executable, timeout, non-zero exit) reads as
    /// unavailable; the probe itself never errors.
    pub async fn is_runtime_available(&self) -> bool {
        let invocation = ProcessInvocation::new(&self.layout.runtime, ".", self.timeout).arg("--version");

        match self.invoker.invoke(&invocation).await {
            Ok(_) => true,
            Err(e) => {
                debug!(runtime = %invocation.program_name(), error = %e, "runtime probe failed");
                false
            }
        }
    }

    /// The trained model file exists.
    pub fn is_artifact_available(&self) -> bool {
        self.layout.artifact_path().is_file()
    }

    pub async fn check(&self) -> HealthReport {
        HealthReport {
            runtime_available: self.is_runtime_available().await,
            artifact_available: self.is_artifact_available(),
        }
    }
}
