use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_guided_flow_timings() {
    let settings = SessionSettings::default();
    assert_eq!(settings.step_duration, Duration::from_millis(3000));
    assert_eq!(settings.processing_delay, Duration::from_millis(2000));
    assert_eq!(settings.result_reveal_delay, Duration::from_millis(1000));
    assert_eq!(settings.guide_reveal_delay, Duration::from_millis(500));
    assert_eq!(settings.success_probability, 0.8);
    assert_eq!(settings.constraints, CaptureConstraints::default());
    assert_eq!(settings.steps().len(), 4);
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = SessionSettings::default();
    apply_file_settings(
        &mut settings,
        r#"
step_duration_ms = 1500
processing_delay_ms = 250
success_probability = 1.7
capture_width = 640
capture_height = 480
facing = "environment"
"#,
    );

    assert_eq!(settings.step_duration, Duration::from_millis(1500));
    assert_eq!(settings.processing_delay, Duration::from_millis(250));
    assert_eq!(settings.success_probability, 1.0);
    assert_eq!(settings.constraints.width, 640);
    assert_eq!(settings.constraints.height, 480);
    assert_eq!(settings.constraints.facing, Facing::Environment);
    assert!(settings.steps().iter().all(|d| d.duration_ms == 1500));
}

#[test]
fn dropping_delays_keeps_configured_probability_and_capture() {
    let mut settings = SessionSettings::default();
    apply_file_settings(&mut settings, "capture_width = 640\nsuccess_probability = 0.25");
    apply_env_overrides(
        &mut settings,
        lookup_from(&[("LIVENESS_SUCCESS_PROBABILITY", "0.4")]),
    );

    let fast = settings.clone().without_delays();
    assert_eq!(fast.success_probability, 0.4);
    assert_eq!(fast.constraints, settings.constraints);
    assert_eq!(fast.step_duration, Duration::ZERO);
    assert_eq!(fast.processing_delay, Duration::ZERO);
    assert_eq!(fast.result_reveal_delay, Duration::ZERO);
    assert_eq!(fast.guide_reveal_delay, Duration::ZERO);
    assert!(fast.steps().iter().all(|d| d.duration_ms == 0));
}

#[test]
fn malformed_file_keeps_defaults() {
    let mut settings = SessionSettings::default();
    apply_file_settings(&mut settings, "step_duration_ms = \"soon\"");
    assert_eq!(settings, SessionSettings::default());
}

#[test]
fn prefixed_env_wins_over_plain_name() {
    let mut settings = SessionSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("LIVENESS_STEP_DURATION_MS", "100"),
            ("APP__STEP_DURATION_MS", "200"),
            ("LIVENESS_RESULT_REVEAL_DELAY_MS", "5"),
            ("LIVENESS_SUCCESS_PROBABILITY", "0.25"),
        ]),
    );

    assert_eq!(settings.step_duration, Duration::from_millis(200));
    assert_eq!(settings.result_reveal_delay, Duration::from_millis(5));
    assert_eq!(settings.success_probability, 0.25);
}

#[test]
fn unparseable_env_values_are_ignored() {
    let mut settings = SessionSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("APP__PROCESSING_DELAY_MS", "two seconds"),
            ("APP__SUCCESS_PROBABILITY", "NaN"),
            ("LIVENESS_CAPTURE_WIDTH", "-1"),
        ]),
    );
    assert_eq!(settings, SessionSettings::default());
}

#[test]
fn loads_settings_file_from_explicit_path() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("liveness_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("liveness.toml");
    fs::write(&path, "guide_reveal_delay_ms = 50\n").expect("write settings");

    let settings = load_settings_from(Some(&path));
    assert_eq!(settings.guide_reveal_delay, Duration::from_millis(50));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
