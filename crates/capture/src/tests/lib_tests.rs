use super::*;
use shared::domain::Facing;

#[tokio::test]
async fn granted_camera_opens_live_stream_with_requested_constraints() {
    let camera = SimulatedCamera::new(SimulatedAccess::Grant);
    let stream = camera
        .acquire(CaptureConstraints::default())
        .await
        .expect("acquire");

    assert!(stream.is_live());
    assert_eq!(stream.track_count(), 1);
    assert_eq!(stream.constraints().width, 1280);
    assert_eq!(stream.constraints().height, 720);
    assert_eq!(stream.constraints().facing, Facing::User);
    assert_eq!(camera.live_streams(), 1);
}

#[tokio::test]
async fn stopping_tracks_twice_releases_once() {
    let camera = SimulatedCamera::new(SimulatedAccess::Grant);
    let stream = camera
        .acquire(CaptureConstraints::default())
        .await
        .expect("acquire");

    stream.stop_all_tracks();
    stream.stop_all_tracks();

    assert!(!stream.is_live());
    assert_eq!(stream.track_count(), 0);
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn denied_and_missing_cameras_report_access_errors() {
    let denied = SimulatedCamera::new(SimulatedAccess::Deny);
    let err = denied
        .acquire(CaptureConstraints::default())
        .await
        .err()
        .expect("denied");
    assert_eq!(err, DeviceAccessError::PermissionDenied);
    assert_eq!(denied.acquisitions(), 1);

    let missing = SimulatedCamera::new(SimulatedAccess::NoDevice);
    let err = missing
        .acquire(CaptureConstraints::default())
        .await
        .err()
        .expect("no device");
    assert_eq!(err, DeviceAccessError::NoDevice);

    let err = MissingCaptureDevice
        .acquire(CaptureConstraints::default())
        .await
        .err()
        .expect("missing");
    assert_eq!(ApiError::from(&err).code, ErrorCode::DeviceUnavailable);
}

#[tokio::test(start_paused = true)]
async fn prompt_delay_suspends_acquire() {
    let camera =
        SimulatedCamera::new(SimulatedAccess::Grant).with_prompt_delay(Duration::from_secs(2));
    let started = tokio::time::Instant::now();
    camera
        .acquire(CaptureConstraints::default())
        .await
        .expect("acquire");
    assert!(started.elapsed() >= Duration::from_secs(2));
}
