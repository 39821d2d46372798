// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool driver: owns the orchestrator and feeds it host events, control
//! commands and timer ticks from one select loop.

use crate::error::PoolError;
use crate::log_writer::LogWriter;
use crate::orchestrator::{CompletionCallback, ItemCallback, Orchestrator};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval};
use tracing::Instrument;
use wq_adapters::{HostEvent, ItemHandler, ThreadHost, TracedHost, WorkerHost, WorkerSetup};
use wq_core::{
    Clock, IdGen, PoolConfig, RunId, RunStatistics, StatsSnapshot, SystemClock, UuidIdGen,
    WorkItem, WorkerId,
};

/// How often scheduler timers are checked.
const TIMER_RESOLUTION: Duration = Duration::from_millis(100);

/// Capacity of the control command channel.
const COMMAND_BUFFER: usize = 32;

/// Runs once on the orchestrator side before the run starts.
pub type SetupHook = Box<dyn FnOnce(&mut RunSetup) + Send>;

/// What the orchestrator setup hook may configure.
#[derive(Default)]
pub struct RunSetup {
    work_list: Option<Vec<WorkItem>>,
    on_item: Option<ItemCallback>,
    on_complete: Option<CompletionCallback>,
}

impl RunSetup {
    pub fn set_work_list(&mut self, items: Vec<WorkItem>) {
        self.work_list = Some(items);
    }

    pub fn set_item_handler(
        &mut self,
        handler: impl FnMut(&WorkItem, &serde_json::Value) + Send + 'static,
    ) {
        self.on_item = Some(Box::new(handler));
    }

    pub fn set_completion_handler(&mut self, handler: impl FnMut(&RunStatistics) + Send + 'static) {
        self.on_complete = Some(Box::new(handler));
    }
}

/// Application code plugged into a pool.
pub struct PoolHooks {
    pub handler: Arc<dyn ItemHandler>,
    pub worker_setup: Option<Arc<dyn WorkerSetup>>,
    pub setup: Option<SetupHook>,
    pub on_complete: Option<CompletionCallback>,
}

impl PoolHooks {
    pub fn new(handler: impl ItemHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            worker_setup: None,
            setup: None,
            on_complete: None,
        }
    }

    /// Run once per worker before it accepts items.
    pub fn worker_setup(mut self, setup: impl WorkerSetup) -> Self {
        self.worker_setup = Some(Arc::new(setup));
        self
    }

    pub fn setup(mut self, setup: impl FnOnce(&mut RunSetup) + Send + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn on_complete(mut self, handler: impl FnMut(&RunStatistics) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }
}

/// Control request sent from a [`PoolHandle`] to the driver loop.
pub(crate) enum Command {
    SetWorkList {
        items: Vec<WorkItem>,
        reply: oneshot::Sender<Result<(), PoolError>>,
    },
    Start {
        reply: oneshot::Sender<Result<(), PoolError>>,
    },
    Stop {
        immediate: bool,
        reply: oneshot::Sender<()>,
    },
    AddWorker {
        reply: oneshot::Sender<Result<WorkerId, PoolError>>,
    },
    RemoveWorker {
        worker: Option<WorkerId>,
        immediate: bool,
        reply: oneshot::Sender<bool>,
    },
    Stats {
        reply: oneshot::Sender<StatsSnapshot>,
    },
}

/// Cloneable control surface for a running pool.
///
/// Every call fails with [`PoolError::Shutdown`] once the driver loop has
/// returned.
#[derive(Clone)]
pub struct PoolHandle {
    tx: mpsc::Sender<Command>,
}

impl PoolHandle {
    pub async fn set_work_list(&self, items: Vec<WorkItem>) -> Result<(), PoolError> {
        self.request(|reply| Command::SetWorkList { items, reply })
            .await?
    }

    pub async fn start(&self) -> Result<(), PoolError> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Pause the run. With `immediate`, workers are killed and their
    /// in-flight items abandoned.
    pub async fn stop(&self, immediate: bool) -> Result<(), PoolError> {
        self.request(|reply| Command::Stop { immediate, reply })
            .await
    }

    pub async fn add_worker(&self) -> Result<WorkerId, PoolError> {
        self.request(|reply| Command::AddWorker { reply }).await?
    }

    /// Remove `worker`, or the most recently added worker when `None`.
    /// Returns whether a worker was removed.
    pub async fn remove_worker(
        &self,
        worker: Option<WorkerId>,
        immediate: bool,
    ) -> Result<bool, PoolError> {
        self.request(|reply| Command::RemoveWorker {
            worker,
            immediate,
            reply,
        })
        .await
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, PoolError> {
        self.request(|reply| Command::Stats { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, PoolError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| PoolError::Shutdown)?;
        reply_rx.await.map_err(|_| PoolError::Shutdown)
    }
}

/// A worker pool bound to one host.
pub struct Pool<H: WorkerHost = TracedHost<ThreadHost>, C: Clock = SystemClock> {
    orchestrator: Orchestrator<H, C>,
    events: mpsc::UnboundedReceiver<HostEvent>,
    commands: mpsc::Receiver<Command>,
    handle: PoolHandle,
    setup: Option<SetupHook>,
    run_id: RunId,
}

impl Pool {
    /// Build a pool that runs workers on threads.
    ///
    /// Must be called inside a tokio runtime when `log_location` is set.
    pub fn new(config: PoolConfig, hooks: PoolHooks) -> Result<Self, PoolError> {
        config.validate()?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let host = TracedHost::new(ThreadHost::new(
            hooks.handler,
            hooks.worker_setup,
            events_tx,
        ));
        let log = match &config.log_location {
            Some(dir) => LogWriter::spawn(dir, &config.iterable_name),
            None => LogWriter::disabled(),
        };
        let mut pool = Self::with_host(config, host, events_rx, SystemClock, log);
        pool.setup = hooks.setup;
        if let Some(handler) = hooks.on_complete {
            pool.orchestrator.set_completion_handler(handler);
        }
        Ok(pool)
    }
}

impl<H: WorkerHost, C: Clock> Pool<H, C> {
    /// Build a pool around an existing host. `events` must be the receiving
    /// half of the channel the host reports into.
    pub fn with_host(
        config: PoolConfig,
        host: H,
        events: mpsc::UnboundedReceiver<HostEvent>,
        clock: C,
        log: LogWriter,
    ) -> Self {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        Self {
            orchestrator: Orchestrator::new(config, host, clock, log),
            events,
            commands,
            handle: PoolHandle { tx },
            setup: None,
            run_id: RunId::new(UuidIdGen.next()),
        }
    }

    pub fn with_setup(mut self, setup: impl FnOnce(&mut RunSetup) + Send + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Drive the pool until the run completes or fails.
    ///
    /// Returns the final statistics. The outcome log is flushed before
    /// returning on both paths.
    pub async fn run(mut self) -> Result<RunStatistics, PoolError> {
        let span = tracing::info_span!("pool", run_id = %self.run_id);
        async move {
            let result = self.drive().await;
            self.orchestrator.log_writer().flush().await;
            match &result {
                Ok(stats) => tracing::info!(
                    processed = stats.processed,
                    successful = stats.successful,
                    failed = stats.failed,
                    "run complete"
                ),
                Err(e) => tracing::error!(error = %e, "run aborted"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&mut self) -> Result<RunStatistics, PoolError> {
        if let Some(setup) = self.setup.take() {
            let mut run_setup = RunSetup::default();
            setup(&mut run_setup);
            self.apply_setup(run_setup)?;
        }
        if self.orchestrator.config().auto_start {
            self.orchestrator.start()?;
        }

        // Created outside the loop so activity does not reset them.
        let mut timer_check = tokio::time::interval(TIMER_RESOLUTION);
        let mut hung_scan = periodic(self.orchestrator.config().scan_interval());
        let mut auto_log = periodic(self.orchestrator.config().stats_interval());

        loop {
            if self.orchestrator.is_finished() {
                return Ok(self.orchestrator.stats());
            }
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event)?,
                Some(command) = self.commands.recv() => self.handle_command(command),
                _ = timer_check.tick() => self.orchestrator.fire_timers(),
                _ = tick(&mut hung_scan) => self.orchestrator.scan_hung()?,
                _ = tick(&mut auto_log) => {
                    self.orchestrator.auto_log();
                }
            }
        }
    }

    fn apply_setup(&mut self, setup: RunSetup) -> Result<(), PoolError> {
        if let Some(items) = setup.work_list {
            self.orchestrator.set_work_list(items)?;
        }
        if let Some(handler) = setup.on_item {
            self.orchestrator.set_item_handler(handler);
        }
        if let Some(handler) = setup.on_complete {
            self.orchestrator.set_completion_handler(handler);
        }
        Ok(())
    }

    fn handle_event(&mut self, event: HostEvent) -> Result<(), PoolError> {
        match event {
            HostEvent::Frame { worker, frame } => {
                self.orchestrator.handle_frame(&worker, &frame);
                Ok(())
            }
            HostEvent::Exited { worker, crashed } => {
                self.orchestrator.handle_exit(&worker, crashed)
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::SetWorkList { items, reply } => {
                let _ = reply.send(self.orchestrator.set_work_list(items));
            }
            Command::Start { reply } => {
                let _ = reply.send(self.orchestrator.start());
            }
            Command::Stop { immediate, reply } => {
                self.orchestrator.stop(immediate);
                let _ = reply.send(());
            }
            Command::AddWorker { reply } => {
                let _ = reply.send(self.orchestrator.add_worker());
            }
            Command::RemoveWorker {
                worker,
                immediate,
                reply,
            } => {
                let removed = self.orchestrator.remove_worker(worker.as_ref(), immediate);
                let _ = reply.send(removed);
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.orchestrator.snapshot());
            }
        }
    }
}

/// Interval whose first tick is one full period away.
fn periodic(period: Option<Duration>) -> Option<Interval> {
    period.map(|p| tokio::time::interval_at(Instant::now() + p, p))
}

/// Wait for the next tick, or forever when disabled.
async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
