//! Status and toggle handlers.

use std::time::Duration;

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use sensornet_core::{Dashboard, DashboardConfig, DeviceId, DeviceState, TelemetryReading};

use crate::cli::{GlobalOpts, OutputFormat, ToggleArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "State")]
    state: String,
}

fn device_row(state: &DeviceState, color: bool) -> DeviceRow {
    DeviceRow {
        device: state.device.to_string(),
        alias: state.device.alias().to_owned(),
        state: output::device_label(state, color),
    }
}

#[derive(Serialize)]
struct StatusView<'a> {
    telemetry: Option<&'a TelemetryReading>,
    light_axis_max: f64,
    devices: &'a [DeviceState],
}

fn readout(reading: Option<&TelemetryReading>) -> String {
    let Some(r) = reading else {
        return "Telemetry: unavailable".into();
    };
    let mut line = format!(
        "Temperature: {:.1} °C   Humidity: {:.1} %   Light: {:.0} lux",
        r.temperature, r.humidity, r.light
    );
    if let Some(ref time) = r.time {
        line.push_str(&format!("   ({})", util::format_time(time)));
    }
    line
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn status(config: DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = Dashboard::connect(config).await?;
    let states = dashboard.device_states();
    let telemetry = dashboard.telemetry();
    let chart = dashboard.chart();
    dashboard.shutdown().await;

    let color = output::should_color(global.color);
    let out = match global.output {
        OutputFormat::Table => {
            let rows: Vec<DeviceRow> = states.iter().map(|s| device_row(s, color)).collect();
            format!(
                "{}\n{}",
                readout(telemetry.as_ref()),
                Table::new(rows).with(Style::rounded())
            )
        }
        format => output::render_list(
            format,
            &StatusView {
                telemetry: telemetry.as_ref(),
                light_axis_max: chart.light_axis_max(),
                devices: states.as_slice(),
            },
            states.as_slice(),
            |s| device_row(s, false),
            |s| format!("{}\t{}", s.device, if s.displayed { "on" } else { "off" }),
        )?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn toggle(
    config: DashboardConfig,
    args: ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device = DeviceId::lookup(&args.device)?;
    let wait = args
        .wait
        .map_or(config.command_timeout, Duration::from_secs);

    let dashboard = Dashboard::connect(config).await?;
    let before = dashboard.device(device);
    output::note(
        &format!(
            "Switching {device} ({}) {}...",
            device.alias(),
            if before.displayed { "off" } else { "on" }
        ),
        global.quiet,
    );

    let result = dashboard.toggle_and_confirm(device, wait).await;
    let after = dashboard.device(device);
    dashboard.shutdown().await;
    result?;

    let color = output::should_color(global.color);
    let out = output::render_single(global.output, &after, |s| {
        format!(
            "{} ({}): {}",
            s.device,
            s.device.alias(),
            output::device_label(s, color)
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
