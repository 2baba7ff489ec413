//! Telemetry list handler.

use tabled::Tabled;

use sensornet_core::{DashboardConfig, SensorRecord, SensorSource};

use crate::cli::{GlobalOpts, SensorsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Temp (°C)")]
    temperature: String,
    #[tabled(rename = "Humidity (%)")]
    humidity: String,
    #[tabled(rename = "Light (lux)")]
    light: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&SensorRecord> for SensorRow {
    fn from(r: &SensorRecord) -> Self {
        Self {
            id: r.id,
            temperature: format!("{:.1}", r.temperature),
            humidity: format!("{:.1}", r.humidity),
            light: format!("{:.0}", r.light),
            time: util::format_time(&r.time),
        }
    }
}

fn line(r: &SensorRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        r.id,
        r.temperature,
        r.humidity,
        r.light,
        util::format_time(&r.time)
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: &DashboardConfig,
    args: SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut params = SensorSource::default_params()
        .with_sort(&args.sort, args.order.into())
        .params;
    if let Some(term) = args.search {
        params = params.with_search(term, &args.field).params;
    }
    let params = util::apply_paging(params, &args.paging);

    let api = util::api_client(config)?;
    let snapshot = util::load_page(SensorSource::new(api), params, config).await?;

    let view = util::PageView::new(&snapshot);
    let out = output::render_list(
        global.output,
        &view,
        &snapshot.page.records,
        |r| SensorRow::from(r),
        line,
    )?;
    output::print_output(&out, global.quiet);
    output::note(&util::page_footer(&snapshot), global.quiet);
    Ok(())
}
