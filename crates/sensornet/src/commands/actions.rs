//! Action log handler.

use tabled::Tabled;

use sensornet_core::list::{FILTER_ACTION, FILTER_DEVICE};
use sensornet_core::{ActionRecord, DashboardConfig, DeviceId, HistorySource};

use crate::cli::{ActionsArgs, GlobalOpts, OnOff};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&ActionRecord> for ActionRow {
    fn from(r: &ActionRecord) -> Self {
        Self {
            id: r.id,
            device: format!("{} ({})", r.device, r.device.alias()),
            action: r.action.to_string(),
            time: util::format_time(&r.time),
        }
    }
}

fn line(r: &ActionRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        r.id,
        r.device,
        r.action,
        util::format_time(&r.time)
    )
}

pub async fn handle(
    config: &DashboardConfig,
    args: ActionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut params = HistorySource::default_params()
        .with_sort("time", args.order.into())
        .params;
    if let Some(ref device) = args.device {
        let device = DeviceId::lookup(device)?;
        params = params.with_filter(FILTER_DEVICE, device.as_str()).params;
    }
    if let Some(action) = args.action {
        let action = match action {
            OnOff::On => "on",
            OnOff::Off => "off",
        };
        params = params.with_filter(FILTER_ACTION, action).params;
    }
    if let Some(term) = args.search {
        params = params.with_search_term(term).params;
    }
    let params = util::apply_paging(params, &args.paging);

    let api = util::api_client(config)?;
    let snapshot = util::load_page(HistorySource::new(api), params, config).await?;

    let view = util::PageView::new(&snapshot);
    let out = output::render_list(
        global.output,
        &view,
        &snapshot.page.records,
        |r| ActionRow::from(r),
        line,
    )?;
    output::print_output(&out, global.quiet);
    output::note(&util::page_footer(&snapshot), global.quiet);
    Ok(())
}
