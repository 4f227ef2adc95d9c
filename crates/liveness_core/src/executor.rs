//! Step executors decide when a pose step is finished.

use std::time::Duration;

use async_trait::async_trait;
use shared::domain::StepDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed,
}

#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn await_step_completion(&self, step: &StepDescriptor) -> StepOutcome;
}

/// Holds each step for its configured duration and always passes it.
pub struct TimedStepExecutor;

#[async_trait]
impl StepExecutor for TimedStepExecutor {
    async fn await_step_completion(&self, step: &StepDescriptor) -> StepOutcome {
        tokio::time::sleep(Duration::from_millis(step.duration_ms)).await;
        StepOutcome::Passed
    }
}
