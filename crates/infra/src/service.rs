//! Inference service: cache-first prediction, refresh, training and health.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use fxsignal_ai::INFERENCE_SCRIPT;
use fxsignal_core::PredictionRecord;

use crate::cache::PredictionCache;
use crate::config::{RuntimeLayout, ServiceConfig};
use crate::error::OrchestrationError;
use crate::pipeline::{PipelineOrchestrator, PipelineReport, PipelineState};
use crate::probe::{AvailabilityProbe, HealthReport};
use crate::process::{ProcessInvoker, TokioProcessInvoker};

/// Everything the HTTP layer needs, behind one handle.
///
/// Cheap to share: wrap in an `Arc` and clone the `Arc`.
pub struct InferenceService {
    inner: Arc<Inner>,
    orchestrator: Arc<PipelineOrchestrator>,
    probe: AvailabilityProbe,
}

/// State the detached miss path needs; owned by the spawned task while it runs.
struct Inner {
    invoker: Arc<dyn ProcessInvoker>,
    layout: RuntimeLayout,
    inference_timeout: Duration,
    cache: Arc<PredictionCache>,
    inference_gate: tokio::sync::Mutex<()>,
}

impl InferenceService {
    pub fn new(config: &ServiceConfig, invoker: Arc<dyn ProcessInvoker>) -> Self {
        Self::with_cache(config, invoker, Arc::new(PredictionCache::new()))
    }

    /// Production wiring: real OS processes.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config, Arc::new(TokioProcessInvoker::new()))
    }

    pub fn with_cache(
        config: &ServiceConfig,
        invoker: Arc<dyn ProcessInvoker>,
        cache: Arc<PredictionCache>,
    ) -> Self {
        let orchestrator = PipelineOrchestrator::new(
            invoker.clone(),
            config.layout.clone(),
            config.stage_budgets,
            cache.clone(),
        )
        .with_stderr_policy(config.stderr_policy.clone());
        let probe = AvailabilityProbe::new(invoker.clone(), config.layout.clone(), config.probe_timeout);

        Self {
            inner: Arc::new(Inner {
                invoker,
                layout: config.layout.clone(),
                inference_timeout: config.inference_timeout,
                cache,
                inference_gate: tokio::sync::Mutex::new(()),
            }),
            orchestrator: Arc::new(orchestrator),
            probe,
        }
    }

    /// Cached prediction if fresh, otherwise one new inference run.
    ///
    /// Concurrent misses share a single invocation. The invocation runs on a
    /// detached task, so dropping this future does not kill the process.
    pub async fn current_signal(&self) -> Result<PredictionRecord, OrchestrationError> {
        if let Some(record) = self.inner.cache.read() {
            debug!(signal = %record.signal(), "serving cached prediction");
            return Ok(record);
        }

        let inner = self.inner.clone();
        tokio::spawn(async move { inner.predict_on_miss().await })
            .await
            .map_err(|e| OrchestrationError::Internal(e.to_string()))?
    }

    /// Drop the cached prediction and compute a new one.
    pub async fn refresh(&self) -> Result<PredictionRecord, OrchestrationError> {
        info!("prediction refresh requested; clearing cache");
        self.inner.cache.clear();
        self.current_signal().await
    }

    /// Run the retraining pipeline on a detached task and wait for it.
    pub async fn train(&self) -> Result<PipelineReport, OrchestrationError> {
        let orchestrator = self.orchestrator.clone();
        let report = tokio::spawn(async move { orchestrator.run().await })
            .await
            .map_err(|e| OrchestrationError::Internal(e.to_string()))??;
        Ok(report)
    }

    pub async fn health(&self) -> HealthReport {
        self.probe.check().await
    }

    pub async fn is_runtime_available(&self) -> bool {
        self.probe.is_runtime_available().await
    }

    pub fn is_artifact_available(&self) -> bool {
        self.probe.is_artifact_available()
    }

    /// When the stored prediction was produced, even if it is already stale.
    pub fn last_prediction_time(&self) -> Option<DateTime<Utc>> {
        self.inner.cache.stored_at()
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.orchestrator.state()
    }

    pub fn cache(&self) -> &Arc<PredictionCache> {
        &self.inner.cache
    }
}

impl Inner {
    async fn predict_on_miss(&self) -> Result<PredictionRecord, OrchestrationError> {
        let _gate = self.inference_gate.lock().await;

        // Another caller may have filled the cache while we waited.
        if let Some(record) = self.cache.read() {
            return Ok(record);
        }

        // A clear (refresh or finished training) during the invocation makes
        // this result stale before it is stored.
        let generation = self.cache.generation();
        let invocation = self
            .layout
            .script_invocation(INFERENCE_SCRIPT, self.inference_timeout);

        let output = self.invoker.invoke(&invocation).await.inspect_err(|e| {
            warn!(error = %e, code = e.code(), "inference process failed");
        })?;

        if !output.stderr.trim().is_empty() {
            warn!(stderr = %output.stderr.trim(), "inference process wrote to stderr");
        }

        let record = fxsignal_ai::parse(&output.stdout).inspect_err(|e| {
            warn!(error = %e, stdout_bytes = output.stdout.len(), "could not parse inference output");
        })?;

        if self.cache.write_if_current(record.clone(), Utc::now(), generation) {
            info!(
                signal = %record.signal(),
                confidence = record.confidence(),
                elapsed_ms = output.elapsed.as_millis() as u64,
                "new prediction cached"
            );
        } else {
            info!(
                signal = %record.signal(),
                "cache was invalidated during inference; result returned but not cached"
            );
        }

        Ok(record)
    }
}
