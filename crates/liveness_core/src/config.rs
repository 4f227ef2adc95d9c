use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::domain::{
    CaptureConstraints, Facing, StepDescriptor, DEFAULT_STEP_DURATION_MS,
};
use tracing::warn;

use crate::outcome::DEFAULT_SUCCESS_PROBABILITY;

pub const DEFAULT_SETTINGS_FILE: &str = "liveness.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub constraints: CaptureConstraints,
    pub step_duration: Duration,
    pub processing_delay: Duration,
    pub result_reveal_delay: Duration,
    pub guide_reveal_delay: Duration,
    pub success_probability: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            step_duration: Duration::from_millis(DEFAULT_STEP_DURATION_MS),
            processing_delay: Duration::from_millis(2000),
            result_reveal_delay: Duration::from_millis(1000),
            guide_reveal_delay: Duration::from_millis(500),
            success_probability: DEFAULT_SUCCESS_PROBABILITY,
        }
    }
}

impl SessionSettings {
    /// Keeps capture and outcome settings, zeroes every timed pause. Used by
    /// hosts running unattended.
    pub fn without_delays(self) -> Self {
        Self {
            step_duration: Duration::ZERO,
            processing_delay: Duration::ZERO,
            result_reveal_delay: Duration::ZERO,
            guide_reveal_delay: Duration::ZERO,
            ..self
        }
    }

    pub fn steps(&self) -> Vec<StepDescriptor> {
        StepDescriptor::sequence_with_duration(self.step_duration.as_millis() as u64)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    step_duration_ms: Option<u64>,
    processing_delay_ms: Option<u64>,
    result_reveal_delay_ms: Option<u64>,
    guide_reveal_delay_ms: Option<u64>,
    success_probability: Option<f64>,
    capture_width: Option<u32>,
    capture_height: Option<u32>,
    facing: Option<Facing>,
}

/// Defaults, then the settings file, then environment overrides.
pub fn load_settings_from(path: Option<&Path>) -> SessionSettings {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

    let mut settings = SessionSettings::default();
    if let Ok(raw) = fs::read_to_string(&path) {
        apply_file_settings(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file_settings(settings: &mut SessionSettings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(error) => {
            warn!(%error, "ignoring malformed liveness settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.step_duration_ms {
        settings.step_duration = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.processing_delay_ms {
        settings.processing_delay = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.result_reveal_delay_ms {
        settings.result_reveal_delay = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.guide_reveal_delay_ms {
        settings.guide_reveal_delay = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.success_probability.filter(|v| v.is_finite()) {
        settings.success_probability = v.clamp(0.0, 1.0);
    }
    if let Some(v) = file_cfg.capture_width {
        settings.constraints.width = v;
    }
    if let Some(v) = file_cfg.capture_height {
        settings.constraints.height = v;
    }
    if let Some(v) = file_cfg.facing {
        settings.constraints.facing = v;
    }
}

pub(crate) fn apply_env_overrides(
    settings: &mut SessionSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let millis = |plain: &str, prefixed: &str| {
        lookup(prefixed)
            .or_else(|| lookup(plain))
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
    };

    if let Some(v) = millis("LIVENESS_STEP_DURATION_MS", "APP__STEP_DURATION_MS") {
        settings.step_duration = v;
    }
    if let Some(v) = millis("LIVENESS_PROCESSING_DELAY_MS", "APP__PROCESSING_DELAY_MS") {
        settings.processing_delay = v;
    }
    if let Some(v) = millis(
        "LIVENESS_RESULT_REVEAL_DELAY_MS",
        "APP__RESULT_REVEAL_DELAY_MS",
    ) {
        settings.result_reveal_delay = v;
    }
    if let Some(v) = millis(
        "LIVENESS_GUIDE_REVEAL_DELAY_MS",
        "APP__GUIDE_REVEAL_DELAY_MS",
    ) {
        settings.guide_reveal_delay = v;
    }

    if let Some(v) = lookup("APP__SUCCESS_PROBABILITY")
        .or_else(|| lookup("LIVENESS_SUCCESS_PROBABILITY"))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
    {
        settings.success_probability = v.clamp(0.0, 1.0);
    }

    if let Some(v) = lookup("LIVENESS_CAPTURE_WIDTH").and_then(|v| v.trim().parse::<u32>().ok()) {
        settings.constraints.width = v;
    }
    if let Some(v) = lookup("LIVENESS_CAPTURE_HEIGHT").and_then(|v| v.trim().parse::<u32>().ok())
    {
        settings.constraints.height = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
