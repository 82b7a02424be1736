//! Sequential, fail-fast pipeline runner.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};

use fxsignal_ai::PipelineStage;

use crate::cache::PredictionCache;
use crate::config::{RuntimeLayout, StageBudgets};
use crate::process::ProcessInvoker;

use super::types::{PipelineError, PipelineReport, PipelineState, RunId, StageFailure, StageReport, StderrPolicy};

/// Drives FetchData → EngineerFeatures → Train → InvalidateCache.
pub struct PipelineOrchestrator {
    invoker: Arc<dyn ProcessInvoker>,
    layout: RuntimeLayout,
    budgets: StageBudgets,
    stderr_policy: StderrPolicy,
    cache: Arc<PredictionCache>,
    state: Mutex<PipelineState>,
    run_gate: tokio::sync::Mutex<()>,
}

impl PipelineOrchestrator {
    pub fn new(
        invoker: Arc<dyn ProcessInvoker>,
        layout: RuntimeLayout,
        budgets: StageBudgets,
        cache: Arc<PredictionCache>,
    ) -> Self {
        Self {
            invoker,
            layout,
            budgets,
            stderr_policy: StderrPolicy::default(),
            cache,
            state: Mutex::new(PipelineState::Idle),
            run_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    /// Current state, or the terminal state of the last run.
    pub fn state(&self) -> PipelineState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Run the whole pipeline once.
    ///
    /// Returns [`PipelineError::AlreadyRunning`] immediately if another run holds
    /// the gate. The cache is cleared only after every process stage succeeded.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let _running = self.run_gate.try_lock().map_err(|_| {
            warn!("training requested while a run is in progress; rejected");
            PipelineError::AlreadyRunning
        })?;

        let run_id = RunId::new();
        self.execute(run_id)
            .instrument(info_span!("pipeline", run_id = %run_id))
            .await
    }

    async fn execute(&self, run_id: RunId) -> Result<PipelineReport, PipelineError> {
        let started_at = Utc::now();
        let mut stages = Vec::with_capacity(PipelineStage::ORDERED.len());
        info!("training pipeline started");

        for stage in PipelineStage::ORDERED {
            self.set_state(stage.into());
            let started = Instant::now();

            if let Err(cause) = self.run_stage(stage).await {
                warn!(stage = %stage, error = %cause, "stage failed; aborting pipeline");
                self.set_state(PipelineState::Failed {
                    stage,
                    reason: cause.to_string(),
                });
                return Err(PipelineError::StageFailed { stage, cause });
            }

            let elapsed_ms = started.elapsed().as_millis() as u64;
            info!(stage = %stage, elapsed_ms, "stage completed");
            stages.push(StageReport { stage, elapsed_ms });
        }

        self.set_state(PipelineState::InvalidateCache);
        self.cache.clear();
        self.set_state(PipelineState::Succeeded);
        info!("training pipeline succeeded; prediction cache cleared");

        Ok(PipelineReport {
            run_id,
            stages,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn run_stage(&self, stage: PipelineStage) -> Result<(), StageFailure> {
        let invocation = self
            .layout
            .script_invocation(stage.script(), self.budgets.for_stage(stage));

        let output = self.invoker.invoke(&invocation).await?;
        self.stderr_policy.check(&output.stderr)
    }

    fn set_state(&self, next: PipelineState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessError;
    use crate::testing::{sample_record, ScriptedInvoker};
    use std::time::Duration;

    fn orchestrator(invoker: Arc<ScriptedInvoker>, cache: Arc<PredictionCache>) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            invoker,
            RuntimeLayout::new("python", "/srv/ai"),
            StageBudgets::default(),
            cache,
        )
    }

    fn warm_cache() -> Arc<PredictionCache> {
        let cache = Arc::new(PredictionCache::new());
        cache.write(sample_record(), Utc::now());
        cache
    }

    #[tokio::test]
    async fn runs_all_stages_in_order_then_clears_cache() {
        let invoker = Arc::new(ScriptedInvoker::new());
        let cache = warm_cache();
        let orch = orchestrator(invoker.clone(), cache.clone());

        let report = orch.run().await.unwrap();

        assert_eq!(
            invoker.scripts_called(),
            vec!["fetch_data.py", "feature_engineer.py", "train_model.py"]
        );
        assert_eq!(report.stages.len(), 3);
        assert_eq!(report.stages[2].stage, PipelineStage::Train);
        assert!(cache.read().is_none());
        assert_eq!(orch.state(), PipelineState::Succeeded);
    }

    #[tokio::test]
    async fn each_stage_uses_its_own_budget() {
        let invoker = Arc::new(ScriptedInvoker::new());
        let orch = orchestrator(invoker.clone(), Arc::new(PredictionCache::new()));
        orch.run().await.unwrap();

        let timeouts: Vec<Duration> = invoker.calls().iter().map(|c| c.timeout).collect();
        assert_eq!(
            timeouts,
            vec![Duration::from_secs(120), Duration::from_secs(120), Duration::from_secs(300)]
        );
    }

    #[tokio::test]
    async fn stage_two_failure_stops_the_run_and_keeps_the_cache() {
        let invoker = Arc::new(ScriptedInvoker::new().fail(
            "feature_engineer.py",
            ProcessError::Timeout {
                program: "python".into(),
                after: Duration::from_secs(120),
            },
        ));
        let cache = warm_cache();
        let orch = orchestrator(invoker.clone(), cache.clone());

        let err = orch.run().await.unwrap_err();

        assert_eq!(err.failed_stage(), Some(PipelineStage::EngineerFeatures));
        assert_eq!(invoker.scripts_called(), vec!["fetch_data.py", "feature_engineer.py"]);
        assert!(cache.read().is_some(), "cache must not be invalidated on failure");
        assert!(matches!(
            orch.state(),
            PipelineState::Failed { stage: PipelineStage::EngineerFeatures, .. }
        ));
    }

    #[tokio::test]
    async fn unexpected_stderr_fails_the_stage() {
        let invoker = Arc::new(ScriptedInvoker::new().stderr("fetch_data.py", "ConnectionError: MT5 terminal not found"));
        let orch = orchestrator(invoker.clone(), Arc::new(PredictionCache::new()));

        let err = orch.run().await.unwrap_err();
        assert_eq!(err.failed_stage(), Some(PipelineStage::FetchData));
        assert_eq!(invoker.scripts_called(), vec!["fetch_data.py"]);
    }

    #[tokio::test]
    async fn info_stderr_does_not_fail_the_stage() {
        let invoker = Arc::new(ScriptedInvoker::new().stderr("train_model.py", "root - INFO - best iteration 412"));
        let orch = orchestrator(invoker, Arc::new(PredictionCache::new()));
        assert!(orch.run().await.is_ok());
    }

    #[tokio::test]
    async fn ignore_policy_only_looks_at_exit_status() {
        let invoker = Arc::new(ScriptedInvoker::new().stderr("fetch_data.py", "DeprecationWarning: utcnow"));
        let orch = orchestrator(invoker, Arc::new(PredictionCache::new())).with_stderr_policy(StderrPolicy::Ignore);
        assert!(orch.run().await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_run_is_rejected() {
        let invoker = Arc::new(ScriptedInvoker::new().delay("fetch_data.py", Duration::from_millis(200)));
        let orch = Arc::new(orchestrator(invoker.clone(), Arc::new(PredictionCache::new())));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(orch.state().is_running());

        assert_eq!(orch.run().await.unwrap_err(), PipelineError::AlreadyRunning);
        assert!(first.await.unwrap().is_ok());
        assert_eq!(invoker.scripts_called().len(), 3);
    }
}
