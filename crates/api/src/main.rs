use anyhow::Context;
use tracing::{error, info, warn};

use fxsignal_infra::{InferenceService, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fxsignal_observability::init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    let service = InferenceService::from_config(&config);

    if !service.is_runtime_available().await {
        error!(
            runtime = %config.layout.runtime.display(),
            "python runtime is not available; set PYTHON_PATH to a working interpreter"
        );
        anyhow::bail!("runtime {} unavailable", config.layout.runtime.display());
    }

    if !service.is_artifact_available() {
        warn!(
            artifact = %config.layout.artifact_path().display(),
            "trained model not found; predictions will fail until POST /api/train succeeds"
        );
    }

    let app = fxsignal_api::app::build_app_with(&config, service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        addr = %listener.local_addr()?,
        ai_dir = %config.layout.work_dir.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c; shutting down");
    }
}
