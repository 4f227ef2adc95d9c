use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use capture::{SimulatedAccess, SimulatedCamera};
use clap::Parser;
use futures::StreamExt;
use liveness_core::{
    load_settings_from, OutcomeSource, RandomOutcomeSource, TimedStepExecutor, VerificationSession,
};
use shared::{domain::HostAction, protocol::SessionEvent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to ./liveness.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, conflicts_with = "no_camera")]
    deny_camera: bool,
    #[arg(long)]
    no_camera: bool,
    #[arg(long, default_value_t = 0)]
    permission_delay_ms: u64,
    /// Seed for the outcome draw, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Skip all delays.
    #[arg(long)]
    fast: bool,
    #[arg(long, default_value_t = 1)]
    runs: u32,
    /// Print events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(args.config.as_deref());
    if args.fast {
        settings = settings.without_delays();
    }

    let access = if args.deny_camera {
        SimulatedAccess::Deny
    } else if args.no_camera {
        SimulatedAccess::NoDevice
    } else {
        SimulatedAccess::Grant
    };
    let camera = SimulatedCamera::new(access)
        .with_prompt_delay(Duration::from_millis(args.permission_delay_ms));
    let outcome_source: Box<dyn OutcomeSource> = match args.seed {
        Some(seed) => Box::new(RandomOutcomeSource::seeded(seed)),
        None => Box::new(RandomOutcomeSource::from_entropy()),
    };

    let session = VerificationSession::new_with_dependencies(
        settings,
        Arc::new(camera),
        Arc::new(TimedStepExecutor),
        outcome_source,
    );

    let json = args.json;
    let mut events = session.event_stream();
    let renderer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let Ok(event) = event else {
                continue;
            };
            print_event(&event, json);
        }
    });

    let result = tokio::select! {
        result = drive(&session, args.runs, json) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; releasing camera");
            Ok(())
        }
    };

    session.teardown().await;
    drop(session);
    let _ = renderer.await;
    result
}

async fn drive(session: &VerificationSession, runs: u32, json: bool) -> Result<()> {
    session.mount().await;
    if let Err(err) = session.handle_action(HostAction::PlaceholderClicked).await {
        if json {
            println!("{}", serde_json::to_string(&err.to_api_error())?);
        }
        return Err(err.into());
    }

    let mut successes = 0;
    for run in 1..=runs {
        let Some(record) = session.start_verification().await? else {
            warn!(run, "verification did not run");
            break;
        };
        if record.outcome.is_success() {
            successes += 1;
        }
        info!(
            run,
            outcome = ?record.outcome,
            elapsed_ms = (record.completed_at - record.started_at).num_milliseconds(),
            "run finished"
        );
        session.handle_action(HostAction::CloseClicked).await?;
        if run < runs {
            session.handle_action(HostAction::RetryClicked).await?;
        }
    }

    info!(runs, successes, "verification finished");
    Ok(())
}

fn print_event(event: &SessionEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!("failed to encode event: {err}"),
        }
    } else if let Some(line) = render::describe(event) {
        println!("{line}");
    }
}
