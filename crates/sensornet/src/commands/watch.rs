//! Push event streaming.

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use sensornet_core::{DashboardConfig, DeviceCommand, PushHandle, PushStatus};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EventLine {
    time: String,
    #[serde(flatten)]
    command: DeviceCommand,
}

fn render(line: &EventLine, format: OutputFormat) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(line)?,
        OutputFormat::Table | OutputFormat::Plain => format!(
            "{}  {} ({})  {}",
            line.time,
            line.command.device,
            line.command.device.alias(),
            line.command.action
        ),
    })
}

/// Print device events until Ctrl-C, `--count` events, or the channel
/// closes for good.
pub async fn handle(
    config: &DashboardConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let push = PushHandle::connect(
        config.push_url.clone(),
        config.reconnect.clone(),
        cancel.clone(),
    );
    let mut events = push.subscribe();
    let mut status = push.status();
    output::note(&format!("Watching {}", config.push_url), global.quiet);

    let mut seen = 0usize;
    let result = loop {
        if args.count.is_some_and(|max| seen >= max) {
            break Ok(());
        }

        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = *status.borrow_and_update();
                match current {
                    PushStatus::Reconnecting { attempt } => {
                        output::note(&format!("Reconnecting (attempt {attempt})..."), global.quiet);
                    }
                    PushStatus::Closed => {
                        break Err(CliError::ConnectionFailed {
                            url: config.push_url.to_string(),
                            source: "push channel closed".into(),
                        });
                    }
                    PushStatus::Connecting | PushStatus::Connected => {
                        tracing::info!(status = ?current, "push channel status");
                    }
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(command) = DeviceCommand::try_from(event.as_ref()) else {
                        tracing::debug!(?event, "skipping unrecognized event");
                        continue;
                    };
                    let line = EventLine {
                        time: chrono::Local::now().format("%H:%M:%S").to_string(),
                        command,
                    };
                    match render(&line, global.output) {
                        Ok(out) => output::print_output(&out, global.quiet),
                        Err(e) => break Err(e),
                    }
                    seen += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break Ok(()),
            }
        }
    };

    push.shutdown();
    result
}
