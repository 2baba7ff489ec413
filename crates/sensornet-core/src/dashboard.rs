// ── Dashboard session ──
//
// Lifecycle of one dashboard: bootstraps device states from the
// last-action snapshot, runs the reconciler task fed by the push channel,
// polls the telemetry readout and chart, and hands out list controllers
// for the telemetry and action-log views.

use std::sync::Arc;
use std::time::Duration;

use sensornet_api::models::PushEvent;
use sensornet_api::{ApiClient, PushHandle, PushStatus};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::convert::{convert_rows, initial_states};
use crate::error::CoreError;
use crate::list::{HistorySource, ListController, SensorSource};
use crate::model::{
    ActionRecord, ChartSeries, DeviceCommand, DeviceId, DeviceState, QueryParams, SensorRecord,
    TelemetryReading,
};
use crate::reconcile::{Confirmation, Reconciler};
use crate::stream::StateStream;

const COMMAND_CHANNEL_SIZE: usize = 32;
const OUTCOME_CHANNEL_SIZE: usize = 64;

/// Snapshot of every device, in id order.
pub type DeviceStates = Arc<Vec<DeviceState>>;

// ── PushFeed ─────────────────────────────────────────────────────────

/// Receiving ends of a push subscription.
pub struct PushFeed {
    pub events: broadcast::Receiver<Arc<PushEvent>>,
    pub status: watch::Receiver<PushStatus>,
}

impl PushFeed {
    pub fn from_handle(handle: &PushHandle) -> Self {
        Self {
            events: handle.subscribe(),
            status: handle.status(),
        }
    }
}

// ── CommandOutcome ───────────────────────────────────────────────────

/// How an issued device command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A push event confirmed the command.
    Confirmed(DeviceCommand),
    /// The command never reached the server, or the server refused it.
    Failed {
        command: DeviceCommand,
        reason: String,
        /// The server answered with a 4xx status.
        rejected: bool,
    },
}

// ── Dashboard ────────────────────────────────────────────────────────

/// A live dashboard session.
///
/// Cheaply cloneable. Call [`shutdown`](Self::shutdown) to stop the
/// background tasks and close the push subscription.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    api: ApiClient,
    toggle_tx: mpsc::Sender<ToggleRequest>,
    devices: watch::Receiver<DeviceStates>,
    telemetry: watch::Sender<Option<TelemetryReading>>,
    chart: watch::Sender<ChartSeries>,
    push_status: watch::Receiver<PushStatus>,
    outcomes: broadcast::Sender<CommandOutcome>,
    push: Option<PushHandle>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

struct ToggleRequest {
    device: DeviceId,
    reply: oneshot::Sender<DeviceCommand>,
}

impl Dashboard {
    /// Open the push channel, bootstrap device states, and start polling.
    ///
    /// Fails if the last-action snapshot cannot be fetched. A failed first
    /// telemetry poll is only logged.
    pub async fn connect(config: DashboardConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.base_url.clone(), &config.transport())?;
        let cancel = CancellationToken::new();
        let push = PushHandle::connect(
            config.push_url.clone(),
            config.reconnect.clone(),
            cancel.child_token(),
        );
        let feed = PushFeed::from_handle(&push);
        Self::start(api, config, feed, Some(push), cancel).await
    }

    /// Start a session on an existing client and push feed.
    pub async fn with_feed(
        api: ApiClient,
        config: DashboardConfig,
        feed: PushFeed,
    ) -> Result<Self, CoreError> {
        Self::start(api, config, feed, None, CancellationToken::new()).await
    }

    async fn start(
        api: ApiClient,
        config: DashboardConfig,
        feed: PushFeed,
        push: Option<PushHandle>,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError> {
        // The feed is subscribed before the snapshot, so events racing the
        // bootstrap are applied after it rather than lost.
        let latest = match api.latest_actions().await {
            Ok(latest) => latest,
            Err(e) => {
                cancel.cancel();
                return Err(e.into());
            }
        };
        let reconciler = Reconciler::new(initial_states(&latest));
        info!(devices = ?reconciler.states(), "device states bootstrapped");

        let (devices_tx, devices_rx) = watch::channel(Arc::new(reconciler.states()));
        let (toggle_tx, toggle_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_SIZE);
        let (telemetry, _) = watch::channel(None);
        let (chart, _) = watch::channel(ChartSeries::default());

        let task = ReconcileTask {
            reconciler,
            api: api.clone(),
            devices: devices_tx,
            outcomes: outcomes.clone(),
            cancel: cancel.clone(),
        };
        let reconcile_handle = tokio::spawn(task.run(toggle_rx, feed.events));

        let dashboard = Self {
            inner: Arc::new(DashboardInner {
                config,
                api,
                toggle_tx,
                devices: devices_rx,
                telemetry,
                chart,
                push_status: feed.status,
                outcomes,
                push,
                cancel,
                task_handles: Mutex::new(vec![reconcile_handle]),
            }),
        };

        if let Err(e) = dashboard.refresh_telemetry().await {
            warn!(error = %e, "initial telemetry fetch failed");
        }

        let interval = dashboard.inner.config.telemetry_poll_interval;
        if !interval.is_zero() {
            let handle = tokio::spawn(poll_task(
                dashboard.clone(),
                interval,
                dashboard.inner.cancel.clone(),
            ));
            dashboard.inner.task_handles.lock().await.push(handle);
        }

        Ok(dashboard)
    }

    /// Stop background tasks and close the push subscription for good.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(push) = &self.inner.push {
            push.shutdown();
        }

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("dashboard shut down");
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Request a toggle of `device`. Returns the command that was issued.
    ///
    /// The displayed state does not change until the push channel
    /// confirms it.
    pub async fn toggle(&self, device: DeviceId) -> Result<DeviceCommand, CoreError> {
        let (reply, issued) = oneshot::channel();
        self.inner
            .toggle_tx
            .send(ToggleRequest { device, reply })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;
        issued.await.map_err(|_| CoreError::ControllerStopped)
    }

    /// Toggle `device` and wait for the push confirmation.
    pub async fn toggle_and_confirm(
        &self,
        device: DeviceId,
        timeout: Duration,
    ) -> Result<DeviceCommand, CoreError> {
        let mut outcomes = self.inner.outcomes.subscribe();
        let command = self.toggle(device).await?;

        let wait = async {
            loop {
                match outcomes.recv().await {
                    Ok(CommandOutcome::Confirmed(confirmed)) if confirmed == command => {
                        return Ok(command);
                    }
                    Ok(CommandOutcome::Failed {
                        command: failed,
                        reason,
                        rejected,
                    }) if failed == command => {
                        return Err(if rejected {
                            CoreError::Rejected { message: reason }
                        } else {
                            CoreError::CommandFailed {
                                device: device.to_string(),
                                reason,
                            }
                        });
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => return Err(CoreError::ControllerStopped),
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            })?
    }

    pub fn device(&self, device: DeviceId) -> DeviceState {
        self.inner
            .devices
            .borrow()
            .iter()
            .find(|s| s.device == device)
            .copied()
            .unwrap_or_else(|| DeviceState::new(device, false))
    }

    pub fn device_states(&self) -> DeviceStates {
        self.inner.devices.borrow().clone()
    }

    pub fn devices(&self) -> StateStream<DeviceStates> {
        StateStream::new(self.inner.devices.clone())
    }

    /// Outcomes of issued commands, as they happen.
    pub fn outcomes(&self) -> broadcast::Receiver<CommandOutcome> {
        self.inner.outcomes.subscribe()
    }

    pub fn push_status(&self) -> watch::Receiver<PushStatus> {
        self.inner.push_status.clone()
    }

    // ── Telemetry ────────────────────────────────────────────────────

    /// Fetch the readout and chart series now.
    ///
    /// On failure the previous values are kept.
    pub async fn refresh_telemetry(&self) -> Result<(), CoreError> {
        let api = &self.inner.api;
        let (latest, samples) = tokio::try_join!(api.latest_sensor(), api.chart_latest())?;
        let series = ChartSeries::new(convert_rows(samples));
        debug!(
            samples = series.len(),
            light_axis_max = series.light_axis_max(),
            "telemetry refreshed"
        );
        self.inner.telemetry.send_replace(Some(latest.into()));
        self.inner.chart.send_replace(series);
        Ok(())
    }

    pub fn telemetry(&self) -> Option<TelemetryReading> {
        self.inner.telemetry.borrow().clone()
    }

    pub fn subscribe_telemetry(&self) -> StateStream<Option<TelemetryReading>> {
        StateStream::new(self.inner.telemetry.subscribe())
    }

    pub fn chart(&self) -> ChartSeries {
        self.inner.chart.borrow().clone()
    }

    pub fn subscribe_chart(&self) -> StateStream<ChartSeries> {
        StateStream::new(self.inner.chart.subscribe())
    }

    // ── List views ───────────────────────────────────────────────────

    /// Telemetry list view. `None` starts from the default parameters.
    pub fn sensor_list(&self, initial: Option<QueryParams>) -> ListController<SensorRecord> {
        ListController::spawn(
            SensorSource::new(self.inner.api.clone()),
            initial.unwrap_or_else(SensorSource::default_params),
            self.inner.config.search_debounce,
            self.inner.cancel.child_token(),
        )
    }

    /// Action-log list view. `None` starts from the default parameters.
    pub fn action_log(&self, initial: Option<QueryParams>) -> ListController<ActionRecord> {
        ListController::spawn(
            HistorySource::new(self.inner.api.clone()),
            initial.unwrap_or_else(HistorySource::default_params),
            self.inner.config.search_debounce,
            self.inner.cancel.child_token(),
        )
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically refresh the telemetry readout and chart.
async fn poll_task(dashboard: Dashboard, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = dashboard.refresh_telemetry().await {
                    warn!(error = %e, "telemetry poll failed");
                }
            }
        }
    }
}

/// Owns the reconciler: the only writer of device state.
struct ReconcileTask {
    reconciler: Reconciler,
    api: ApiClient,
    devices: watch::Sender<DeviceStates>,
    outcomes: broadcast::Sender<CommandOutcome>,
    cancel: CancellationToken,
}

impl ReconcileTask {
    async fn run(
        mut self,
        mut toggles: mpsc::Receiver<ToggleRequest>,
        mut events: broadcast::Receiver<Arc<PushEvent>>,
    ) {
        let (failure_tx, mut failures) = mpsc::unbounded_channel();
        let cancel = self.cancel.clone();
        let mut push_open = true;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(outcome) = failures.recv() => self.command_failed(outcome),
                event = events.recv(), if push_open => match event {
                    Ok(event) => self.push_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "push events lagged, device state may be stale");
                    }
                    Err(RecvError::Closed) => {
                        warn!("push channel closed, device state will no longer update");
                        push_open = false;
                    }
                },
                request = toggles.recv() => {
                    let Some(request) = request else { break };
                    self.toggle(request, &failure_tx);
                }
            }
        }
        debug!("reconcile task exiting");
    }

    fn toggle(&mut self, request: ToggleRequest, failures: &mpsc::UnboundedSender<CommandOutcome>) {
        let command = self.reconciler.begin_toggle(request.device);
        info!(device = %command.device, action = %command.action, "sending device command");
        self.publish();
        let _ = request.reply.send(command);

        let api = self.api.clone();
        let failures = failures.clone();
        tokio::spawn(async move {
            match api
                .control_device(command.device.as_str(), command.action.as_str())
                .await
            {
                // Receipt only; state changes arrive over the push channel.
                Ok(_ack) => debug!(device = %command.device, "device command acknowledged"),
                Err(e) => {
                    let err = CoreError::from(e);
                    let rejected = matches!(
                        err,
                        CoreError::Api { status: Some(status), .. } if (400..500).contains(&status)
                    );
                    let _ = failures.send(CommandOutcome::Failed {
                        command,
                        reason: err.to_string(),
                        rejected,
                    });
                }
            }
        });
    }

    fn command_failed(&mut self, outcome: CommandOutcome) {
        let CommandOutcome::Failed { command, .. } = &outcome else {
            return;
        };
        if self
            .reconciler
            .command_failed(command.device, command.action.is_on())
        {
            self.publish();
        }
        let _ = self.outcomes.send(outcome);
    }

    fn push_event(&mut self, event: &PushEvent) {
        let command = match DeviceCommand::try_from(event) {
            Ok(command) => command,
            Err(e) => {
                debug!(error = %e, "ignoring push event");
                return;
            }
        };

        let confirmation = self.reconciler.confirm(command);
        debug!(device = %command.device, action = %command.action, ?confirmation, "push event applied");
        match confirmation {
            Confirmation::Confirmed => {
                self.publish();
                let _ = self.outcomes.send(CommandOutcome::Confirmed(command));
            }
            Confirmation::Changed => self.publish(),
            Confirmation::Unchanged => {}
        }
    }

    fn publish(&self) {
        self.devices.send_replace(Arc::new(self.reconciler.states()));
    }
}
