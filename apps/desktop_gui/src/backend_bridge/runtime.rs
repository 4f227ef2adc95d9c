//! Runtime bridge between UI command queue and backend event intake.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use capture::{SimulatedAccess, SimulatedCamera};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use liveness_core::{SessionSettings, VerificationSession};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub settings: SessionSettings,
    pub access: SimulatedAccess,
    pub permission_delay: Duration,
}

pub fn launch(
    config: BackendConfig,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let camera = SimulatedCamera::new(config.access)
                .with_prompt_delay(config.permission_delay);
            let session = VerificationSession::new_with_settings(config.settings, Arc::new(camera));

            let forwarder = {
                let mut events = session.subscribe_events();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    loop {
                        match events.recv().await {
                            Ok(event) => {
                                tracing::debug!(event = event.kind(), "session event");
                                match ui_tx.try_send(UiEvent::Session(event)) {
                                    Ok(()) => {}
                                    Err(TrySendError::Full(_)) => {
                                        tracing::warn!("ui event queue full; dropping session event");
                                    }
                                    Err(TrySendError::Disconnected(_)) => break,
                                }
                            }
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::warn!(skipped, "ui event forwarder lagged");
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                })
            };

            session.mount().await;
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let action = match cmd {
                    BackendCommand::Action(action) => action,
                    BackendCommand::Shutdown => break,
                };
                let session = Arc::clone(&session);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = session.handle_action(action).await {
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                            UiErrorContext::DeviceAccess,
                            err.to_string(),
                        )));
                    }
                });
            }

            session.teardown().await;
            forwarder.abort();
            tracing::info!("backend worker stopped");
        });
    })
}
