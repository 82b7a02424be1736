//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use fxsignal_core::{ClassProbabilities, FeatureReadings, PredictionRecord, Signal};

use crate::process::{ProcessError, ProcessInvocation, ProcessInvoker, ProcessOutput};

pub(crate) const LONG_OUTPUT: &str = r#"Loading model from models/usdjpy_model.pkl
{"signal": "LONG", "confidence": 0.82, "timestamp": "2024-03-01T09:30:00Z", "predicted_class": 1,
 "class_probabilities": {"SHORT": 0.10, "LONG": 0.82, "NO_TRADE": 0.08},
 "latest_features": {"close": 150.12, "return_1m": 0.0002, "rsi": 61.5, "hour": 9}}
"#;

pub(crate) fn sample_record() -> PredictionRecord {
    PredictionRecord::new(
        Signal::Long,
        0.82,
        ClassProbabilities::new(0.10, 0.82, 0.08).unwrap(),
        FeatureReadings::new(150.12, 0.0002, 61.5, 9).unwrap(),
        1,
        Utc::now(),
    )
    .unwrap()
}

#[derive(Clone)]
struct Script {
    result: Result<ProcessOutput, ProcessError>,
    delay: Duration,
}

impl Script {
    /// Successful output to fill in, replacing any scripted failure.
    fn output(&mut self) -> &mut ProcessOutput {
        if self.result.is_err() {
            self.result = Ok(ProcessOutput::default());
        }
        match &mut self.result {
            Ok(out) => out,
            Err(_) => unreachable!(),
        }
    }
}

/// Invoker that answers by script file name and records every call.
///
/// Scripts without an explicit answer succeed with empty output. A call whose
/// program is not followed by a script argument (such as `--version`) is keyed
/// by that argument.
pub(crate) struct ScriptedInvoker {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<ProcessInvocation>>,
}

impl ScriptedInvoker {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn stdout(self, script: &str, stdout: &str) -> Self {
        self.answer(script, |s| s.output().stdout = stdout.to_string())
    }

    pub(crate) fn stderr(self, script: &str, stderr: &str) -> Self {
        self.answer(script, |s| s.output().stderr = stderr.to_string())
    }

    pub(crate) fn fail(self, script: &str, error: ProcessError) -> Self {
        self.answer(script, |s| s.result = Err(error))
    }

    pub(crate) fn delay(self, script: &str, delay: Duration) -> Self {
        self.answer(script, |s| s.delay = delay)
    }

    fn answer(mut self, script: &str, f: impl FnOnce(&mut Script)) -> Self {
        let entry = self.scripts.entry(script.to_string()).or_insert(Script {
            result: Ok(ProcessOutput::default()),
            delay: Duration::ZERO,
        });
        f(entry);
        self
    }

    pub(crate) fn calls(&self) -> Vec<ProcessInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn scripts_called(&self) -> Vec<String> {
        self.calls().iter().map(key_of).collect()
    }

    pub(crate) fn invocations_of(&self, script: &str) -> usize {
        self.scripts_called().iter().filter(|s| *s == script).count()
    }
}

fn key_of(invocation: &ProcessInvocation) -> String {
    invocation
        .args
        .first()
        .map(|arg| {
            Path::new(arg)
                .file_name()
                .unwrap_or(arg.as_os_str())
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProcessInvoker for ScriptedInvoker {
    async fn invoke(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(invocation.clone());

        let script = self.scripts.get(&key_of(invocation)).cloned().unwrap_or(Script {
            result: Ok(ProcessOutput::default()),
            delay: Duration::ZERO,
        });

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        script.result
    }
}
