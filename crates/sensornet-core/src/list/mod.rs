// ── Paginated list controller ──
//
// One generic controller per list view. It owns the view's `QueryParams`,
// routes changes through the debounced dispatcher, issues sequence-tagged
// loads against a `PageSource`, and publishes `ListSnapshot`s through a
// `watch` channel.
//
// Loads are never aborted. Each carries a sequence number, and a result
// whose number is lower than the highest one already applied is dropped.

mod source;
mod window;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dispatch::{Debouncer, Scheduled};
use crate::error::CoreError;
use crate::model::{PageSize, QueryParams, QueryUpdate, ResultPage, SortDirection};
use crate::stream::StateStream;

pub use source::{
    FILTER_ACTION, FILTER_DEVICE, HistorySource, PageSource, SENSOR_SEARCH_FIELDS,
    SENSOR_SORT_FIELDS, SensorSource,
};
pub use window::{PageEntry, page_numbers};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ListSnapshot ─────────────────────────────────────────────────────

/// Published state of one list view.
#[derive(Debug, Clone)]
pub struct ListSnapshot<R> {
    /// Current parameters. May be ahead of `page` while a load is pending.
    pub params: QueryParams,
    /// Last successfully loaded page.
    pub page: Arc<ResultPage<R>>,
    /// A load newer than the last applied one is in flight.
    pub loading: bool,
    /// A change is waiting on the dispatcher (debounce window or queue).
    pub dispatch_pending: bool,
    /// Error from the most recent applied load, if it failed.
    pub error: Option<Arc<CoreError>>,
    /// Sequence number of the last applied load (0 before the first).
    pub applied_seq: u64,
}

impl<R> ListSnapshot<R> {
    /// No load pending and nothing waiting to be dispatched.
    pub fn is_settled(&self) -> bool {
        !self.loading && !self.dispatch_pending
    }

    /// Page-selector entries for the current page.
    pub fn page_numbers(&self) -> Vec<PageEntry> {
        page_numbers(self.params.page(), self.page.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        self.params.page() > 1
    }

    pub fn has_next(&self) -> bool {
        self.params.page() < self.page.total_pages
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug)]
enum ListCommand {
    SetFilter { field: String, value: String },
    SetSort { field: String, direction: SortDirection },
    SearchInput(String),
    SubmitSearch,
    SetSearchField(String),
    Clear,
    SetPage(u32),
    NextPage,
    PrevPage,
    SetPageSize(PageSize),
    SetPageSizeInput(String),
    Reload,
}

struct CommandEnvelope {
    command: ListCommand,
    ack: oneshot::Sender<()>,
}

struct LoadOutcome<R> {
    seq: u64,
    result: Result<ResultPage<R>, CoreError>,
}

// ── ListController ───────────────────────────────────────────────────

/// Handle to a running list view.
///
/// Cheaply cloneable. Each mutating call returns once the controller has
/// applied the change to its parameters, so a following
/// [`settled`](Self::settled) observes it.
pub struct ListController<R> {
    inner: Arc<ListInner<R>>,
}

impl<R> Clone for ListController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ListInner<R> {
    command_tx: mpsc::Sender<CommandEnvelope>,
    snapshot_rx: watch::Receiver<ListSnapshot<R>>,
    cancel: CancellationToken,
}

impl<R: Clone + Send + Sync + 'static> ListController<R> {
    /// Spawn the controller task and issue the initial load for `initial`.
    ///
    /// Text-driven searches wait `search_debounce`; every other change
    /// dispatches immediately. Must be called from within a tokio runtime.
    pub fn spawn<S>(
        source: S,
        initial: QueryParams,
        search_debounce: Duration,
        cancel: CancellationToken,
    ) -> Self
    where
        S: PageSource<Record = R>,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ListSnapshot {
            params: initial.clone(),
            page: Arc::new(ResultPage::default()),
            loading: false,
            dispatch_pending: true,
            error: None,
            applied_seq: 0,
        });

        let mut actor = ListActor {
            source: Arc::new(source),
            params: initial,
            page: Arc::new(ResultPage::default()),
            error: None,
            issued_seq: 0,
            applied_seq: 0,
            dispatch_pending: false,
            search_debounce,
            debouncer: Debouncer::new(dispatch_tx, cancel.clone()),
            outcome_tx,
            snapshot_tx,
            cancel: cancel.clone(),
        };
        actor.dispatch(Duration::ZERO);

        tokio::spawn(actor.run(command_rx, dispatch_rx, outcome_rx));

        Self {
            inner: Arc::new(ListInner {
                command_tx,
                snapshot_rx,
                cancel,
            }),
        }
    }

    // ── Parameter changes ────────────────────────────────────────────

    /// Set a filter; an empty value removes it. Dispatches immediately.
    pub async fn set_filter(
        &self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.send(ListCommand::SetFilter {
            field: field.into(),
            value: value.into(),
        })
        .await
    }

    pub async fn set_sort(
        &self,
        field: impl Into<String>,
        direction: SortDirection,
    ) -> Result<(), CoreError> {
        self.send(ListCommand::SetSort {
            field: field.into(),
            direction,
        })
        .await
    }

    /// Text typed into the search box. Dispatched after the debounce window.
    pub async fn search_input(&self, term: impl Into<String>) -> Result<(), CoreError> {
        self.send(ListCommand::SearchInput(term.into())).await
    }

    /// Explicit search button: dispatch the current term now.
    pub async fn submit_search(&self) -> Result<(), CoreError> {
        self.send(ListCommand::SubmitSearch).await
    }

    /// Change the search field. Clears the search term.
    pub async fn set_search_field(&self, field: impl Into<String>) -> Result<(), CoreError> {
        self.send(ListCommand::SetSearchField(field.into())).await
    }

    /// Drop the search term and all filters.
    pub async fn clear(&self) -> Result<(), CoreError> {
        self.send(ListCommand::Clear).await
    }

    pub async fn set_page(&self, page: u32) -> Result<(), CoreError> {
        self.send(ListCommand::SetPage(page)).await
    }

    pub async fn next_page(&self) -> Result<(), CoreError> {
        self.send(ListCommand::NextPage).await
    }

    pub async fn prev_page(&self) -> Result<(), CoreError> {
        self.send(ListCommand::PrevPage).await
    }

    pub async fn set_page_size(&self, size: PageSize) -> Result<(), CoreError> {
        self.send(ListCommand::SetPageSize(size)).await
    }

    /// Page size from raw text; clamped to the floor before any request.
    pub async fn set_page_size_input(&self, input: impl Into<String>) -> Result<(), CoreError> {
        self.send(ListCommand::SetPageSizeInput(input.into())).await
    }

    /// Re-issue the current load (user-initiated retry).
    pub async fn reload(&self) -> Result<(), CoreError> {
        self.send(ListCommand::Reload).await
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> ListSnapshot<R> {
        self.inner.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<ListSnapshot<R>> {
        StateStream::new(self.inner.snapshot_rx.clone())
    }

    pub fn page_numbers(&self) -> Vec<PageEntry> {
        self.inner.snapshot_rx.borrow().page_numbers()
    }

    /// Wait until nothing is pending and return that snapshot.
    pub async fn settled(&self) -> Result<ListSnapshot<R>, CoreError> {
        let mut rx = self.inner.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(ListSnapshot::is_settled)
            .await
            .map_err(|_| CoreError::ControllerStopped)?;
        Ok(snapshot.clone())
    }

    /// Stop the controller task. In-flight loads finish but are ignored.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    async fn send(&self, command: ListCommand) -> Result<(), CoreError> {
        let (ack, acked) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope { command, ack })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;
        acked.await.map_err(|_| CoreError::ControllerStopped)
    }
}

// ── Controller task ──────────────────────────────────────────────────

struct ListActor<S: PageSource> {
    source: Arc<S>,
    params: QueryParams,
    page: Arc<ResultPage<S::Record>>,
    error: Option<Arc<CoreError>>,
    issued_seq: u64,
    applied_seq: u64,
    dispatch_pending: bool,
    search_debounce: Duration,
    debouncer: Debouncer<QueryParams>,
    outcome_tx: mpsc::UnboundedSender<LoadOutcome<S::Record>>,
    snapshot_tx: watch::Sender<ListSnapshot<S::Record>>,
    cancel: CancellationToken,
}

impl<S: PageSource> ListActor<S> {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<CommandEnvelope>,
        mut dispatches: mpsc::UnboundedReceiver<Scheduled<QueryParams>>,
        mut outcomes: mpsc::UnboundedReceiver<LoadOutcome<S::Record>>,
    ) {
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(outcome) = outcomes.recv() => self.apply(outcome),
                Some(delivered) = dispatches.recv() => {
                    if let Some(params) = self.debouncer.accept(delivered) {
                        self.dispatch_pending = false;
                        self.load(params);
                    } else {
                        debug!("superseded dispatch ignored");
                    }
                }
                envelope = commands.recv() => {
                    let Some(envelope) = envelope else { break };
                    self.handle(envelope.command);
                    let _ = envelope.ack.send(());
                }
            }
        }

        self.debouncer.cancel_pending();
        debug!("list controller stopped");
    }

    fn handle(&mut self, command: ListCommand) {
        debug!(?command, "list command");
        let immediate = Duration::ZERO;
        let unchanged = QueryUpdate {
            params: self.params.clone(),
            page_reset: false,
        };

        let (update, delay) = match command {
            ListCommand::SetFilter { field, value } => {
                (self.params.with_filter(field, value), immediate)
            }
            ListCommand::SetSort { field, direction } => {
                (self.params.with_sort(field, direction), immediate)
            }
            ListCommand::SearchInput(term) => {
                (self.params.with_search_term(term), self.search_debounce)
            }
            ListCommand::SubmitSearch | ListCommand::Reload => (unchanged, immediate),
            ListCommand::SetSearchField(field) => (self.params.with_search_field(field), immediate),
            ListCommand::Clear => (self.params.cleared(), immediate),
            ListCommand::SetPage(n) => {
                let target = self.page_bound(n);
                if target == self.params.page() {
                    return;
                }
                (self.params.with_page(target), immediate)
            }
            ListCommand::NextPage => {
                let target = self.page_bound(self.params.page().saturating_add(1));
                if target == self.params.page() {
                    return;
                }
                (self.params.with_page(target), immediate)
            }
            ListCommand::PrevPage => {
                let target = self.params.page().saturating_sub(1).max(1);
                if target == self.params.page() {
                    return;
                }
                (self.params.with_page(target), immediate)
            }
            ListCommand::SetPageSize(size) => (self.params.with_page_size(size), immediate),
            ListCommand::SetPageSizeInput(text) => {
                (self.params.with_page_size_input(&text), immediate)
            }
        };

        debug!(
            page = update.params.page(),
            page_size = update.params.page_size().get(),
            page_reset = update.page_reset,
            "query parameters updated"
        );
        self.params = update.params;
        self.dispatch(delay);
    }

    /// Clamp a requested page to the known page count. Before the first
    /// page is applied the count is unknown and only the floor applies.
    fn page_bound(&self, page: u32) -> u32 {
        if self.applied_seq == 0 {
            page.max(1)
        } else {
            page.clamp(1, self.page.total_pages.max(1))
        }
    }

    /// Hand the current parameters to the dispatcher and publish.
    fn dispatch(&mut self, delay: Duration) {
        debug!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "dispatch scheduled"
        );
        self.debouncer.schedule(self.params.clone(), delay);
        self.dispatch_pending = true;
        self.publish();
    }

    fn load(&mut self, params: QueryParams) {
        self.issued_seq += 1;
        let seq = self.issued_seq;
        debug!(
            seq,
            page = params.page(),
            page_size = params.page_size().get(),
            search = params.is_search(),
            "issuing list load"
        );

        let source = Arc::clone(&self.source);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_page(&params).await;
            // The controller may be gone; the result is then irrelevant.
            let _ = tx.send(LoadOutcome { seq, result });
        });

        self.publish();
    }

    fn apply(&mut self, outcome: LoadOutcome<S::Record>) {
        let seq = outcome.seq;
        if seq < self.applied_seq {
            debug!(seq, applied = self.applied_seq, "discarding stale list response");
            return;
        }
        self.applied_seq = seq;

        match outcome.result {
            Ok(page) => {
                let total = page.total_pages;
                debug!(
                    seq,
                    records = page.records.len(),
                    total_pages = total,
                    "list page applied"
                );
                self.page = Arc::new(page);
                self.error = None;

                // Only the newest load may move the page; parameters with a
                // load still queued already point at page 1.
                let newest = seq == self.issued_seq && !self.dispatch_pending;
                if newest && self.params.page() > total.max(1) {
                    self.params = self.params.clamped_to(total);
                    debug!(page = self.params.page(), "page beyond total, clamping");
                    self.dispatch(Duration::ZERO);
                    return;
                }
            }
            Err(e) => {
                warn!(seq, error = %e, "list load failed, keeping previous page");
                self.error = Some(Arc::new(e));
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(ListSnapshot {
            params: self.params.clone(),
            page: Arc::clone(&self.page),
            loading: self.issued_seq > self.applied_seq,
            dispatch_pending: self.dispatch_pending,
            error: self.error.clone(),
            applied_seq: self.applied_seq,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{PageTotals, Record};

    #[derive(Debug, Clone, PartialEq)]
    struct Row(i64);

    impl Record for Row {
        fn key(&self) -> i64 {
            self.0
        }

        fn timestamp(&self) -> DateTime<Utc> {
            DateTime::UNIX_EPOCH
        }
    }

    type Reply = Result<(Vec<i64>, u64), CoreError>;

    struct Request {
        params: QueryParams,
        reply: oneshot::Sender<Reply>,
    }

    impl Request {
        fn ok(self, rows: &[i64], total_count: u64) {
            let _ = self.reply.send(Ok((rows.to_vec(), total_count)));
        }

        fn fail(self) {
            let _ = self.reply.send(Err(CoreError::ConnectionFailed {
                url: "http://test".into(),
                reason: "refused".into(),
            }));
        }
    }

    /// Hands each load to the test, which answers in any order.
    struct ScriptedSource {
        requests: mpsc::UnboundedSender<Request>,
    }

    impl PageSource for ScriptedSource {
        type Record = Row;

        async fn fetch_records(&self, _params: &QueryParams) -> Result<Vec<Row>, CoreError> {
            Err(CoreError::Internal("use fetch_page".into()))
        }

        async fn fetch_totals(&self, _params: &QueryParams) -> Result<PageTotals, CoreError> {
            Err(CoreError::Internal("use fetch_page".into()))
        }

        async fn fetch_page(&self, params: &QueryParams) -> Result<ResultPage<Row>, CoreError> {
            let (reply, answer) = oneshot::channel();
            self.requests
                .send(Request {
                    params: params.clone(),
                    reply,
                })
                .map_err(|_| CoreError::Internal("test dropped".into()))?;
            let (rows, total_count) = answer
                .await
                .map_err(|_| CoreError::Internal("no reply".into()))??;
            let totals = PageTotals {
                total_count,
                reported_pages: crate::model::total_pages(total_count, params.page_size()),
            };
            Ok(ResultPage::new(
                rows.into_iter().map(Row).collect(),
                totals,
                params.page_size(),
            ))
        }
    }

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn start() -> (ListController<Row>, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = ListController::spawn(
            ScriptedSource { requests: tx },
            QueryParams::new("time", SortDirection::Asc, "time"),
            DEBOUNCE,
            CancellationToken::new(),
        );
        (controller, rx)
    }

    async fn idle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn keys(snapshot: &ListSnapshot<Row>) -> Vec<i64> {
        snapshot.page.records.iter().map(Record::key).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn initial_load_applies_page() {
        let (list, mut requests) = start();

        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.page(), 1);
        assert_eq!(req.params.page_size(), PageSize::MIN);
        req.ok(&[1, 2, 3], 23);

        let snap = list.settled().await.unwrap();
        assert_eq!(keys(&snap), vec![1, 2, 3]);
        assert_eq!(snap.page.total_pages, 3);
        assert_eq!(snap.applied_seq, 1);
        assert!(snap.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 100);
        list.settled().await.unwrap();

        list.set_page(2).await.unwrap();
        let first = requests.recv().await.unwrap();
        list.set_page(3).await.unwrap();
        let second = requests.recv().await.unwrap();
        assert_eq!(second.params.page(), 3);

        // Newer request resolves first, older one straggles in after.
        second.ok(&[30], 100);
        idle().await;
        first.ok(&[20], 100);
        idle().await;

        let snap = list.snapshot();
        assert_eq!(keys(&snap), vec![30]);
        assert_eq!(snap.params.page(), 3);
        assert_eq!(snap.applied_seq, 3);
        assert!(!snap.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn older_response_still_applies_until_newer_arrives() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 100);
        list.settled().await.unwrap();

        list.set_page(2).await.unwrap();
        let first = requests.recv().await.unwrap();
        list.set_page(3).await.unwrap();
        let second = requests.recv().await.unwrap();

        first.ok(&[20], 100);
        idle().await;
        let snap = list.snapshot();
        assert_eq!(keys(&snap), vec![20]);
        assert!(snap.loading, "newer load is still in flight");

        second.ok(&[30], 100);
        let snap = list.settled().await.unwrap();
        assert_eq!(keys(&snap), vec![30]);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_collapses_into_one_search() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 5);
        list.settled().await.unwrap();

        for term in ["2", "27", "27.", "27.5"] {
            list.search_input(term).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(requests.try_recv().is_err(), "dispatched inside the window");
        }

        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.search_term(), "27.5");
        assert!(req.params.is_search());
        req.ok(&[9], 1);

        list.settled().await.unwrap();
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_change_supersedes_pending_search() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 50);
        list.settled().await.unwrap();

        list.search_input("abc").await.unwrap();
        list.submit_search().await.unwrap();

        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.search_term(), "abc");
        req.ok(&[], 0);
        list.settled().await.unwrap();

        tokio::time::sleep(DEBOUNCE * 2).await;
        assert!(requests.try_recv().is_err(), "debounce timer was not cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_page_size_is_clamped_before_request() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 50);
        list.settled().await.unwrap();

        for input in ["3", "abc", "", "-40"] {
            list.set_page_size_input(input).await.unwrap();
            let req = requests.recv().await.unwrap();
            assert_eq!(req.params.page_size().get(), 10, "input {input:?}");
            req.ok(&[1], 50);
        }

        list.set_page_size(PageSize::new(2)).await.unwrap();
        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.page_size(), PageSize::MIN);
        req.ok(&[1], 50);
    }

    #[tokio::test(start_paused = true)]
    async fn page_is_clamped_when_total_shrinks() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 80);
        list.settled().await.unwrap();

        list.set_page(5).await.unwrap();
        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.page(), 5);
        // Data shrank underneath us: 25 rows is three pages.
        req.ok(&[], 25);

        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.page(), 3);
        req.ok(&[21, 22, 23, 24, 25], 25);

        let snap = list.settled().await.unwrap();
        assert_eq!(snap.params.page(), 3);
        assert_eq!(snap.page.total_pages, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_page() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1, 2], 2);
        list.settled().await.unwrap();

        list.reload().await.unwrap();
        requests.recv().await.unwrap().fail();

        let snap = list.settled().await.unwrap();
        assert_eq!(keys(&snap), vec![1, 2]);
        assert!(matches!(
            snap.error.as_deref(),
            Some(CoreError::ConnectionFailed { .. })
        ));

        list.reload().await.unwrap();
        requests.recv().await.unwrap().ok(&[3], 1);
        let snap = list.settled().await.unwrap();
        assert!(snap.error.is_none());
        assert_eq!(keys(&snap), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_search_restores_sort_and_filters() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 1);

        list.set_sort("humidity", SortDirection::Desc).await.unwrap();
        requests.recv().await.unwrap().ok(&[1], 1);
        list.set_filter("device", "device1").await.unwrap();
        let filtered = requests.recv().await.unwrap();
        let filtered_params = filtered.params.clone();
        filtered.ok(&[1], 1);

        list.search_input("30").await.unwrap();
        let search = requests.recv().await.unwrap();
        assert!(search.params.is_search());
        search.ok(&[7], 1);

        list.search_input("").await.unwrap();
        let back = requests.recv().await.unwrap();
        assert_eq!(back.params, filtered_params);
        back.ok(&[1], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn next_and_prev_stay_in_range() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 15);
        list.settled().await.unwrap();

        list.prev_page().await.unwrap();
        idle().await;
        assert!(requests.try_recv().is_err());

        list.next_page().await.unwrap();
        let req = requests.recv().await.unwrap();
        assert_eq!(req.params.page(), 2);
        req.ok(&[11], 15);
        let snap = list.settled().await.unwrap();
        assert!(!snap.has_next());
        assert!(snap.has_prev());

        list.next_page().await.unwrap();
        idle().await;
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn search_field_change_clears_term() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 1);

        list.search_input("41").await.unwrap();
        requests.recv().await.unwrap().ok(&[], 0);

        list.set_search_field("humidity").await.unwrap();
        let req = requests.recv().await.unwrap();
        assert!(!req.params.is_search());
        assert_eq!(req.params.search_field(), "humidity");
        req.ok(&[1], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn window_reflects_current_page() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 100);
        list.settled().await.unwrap();

        list.set_page(5).await.unwrap();
        requests.recv().await.unwrap().ok(&[41], 100);
        list.settled().await.unwrap();

        assert_eq!(
            list.page_numbers(),
            vec![
                PageEntry::Page(1),
                PageEntry::Ellipsis,
                PageEntry::Page(4),
                PageEntry::Page(5),
                PageEntry::Page(6),
                PageEntry::Ellipsis,
                PageEntry::Page(10),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_controller() {
        let (list, mut requests) = start();
        requests.recv().await.unwrap().ok(&[1], 1);
        list.shutdown();
        idle().await;
        assert!(matches!(
            list.reload().await,
            Err(CoreError::ControllerStopped)
        ));
    }
}
