//! Timer-driven replay of the sample table to subscribers

use crate::bundled::bundled_feed;
use crate::feed_config::FeedConfig;
use crate::publisher::{RecordPublisher, RecordSink, RecordStream, SubscriberId};
use crate::replay_cursor::ReplayCursor;
use ecg_core::{EcgError, EcgRecord, EcgResult, SampleTable, TraceLabel};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Lifecycle of a feed; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedState {
    Idle,
    Running,
    Stopped,
}

/// Commands for controlling a feed running under [`ReplayFeed::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    Start,
    Stop,
}

/// Feed statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedStats {
    pub state: FeedState,
    pub current_index: usize,
    pub total_index: u64,
    pub trace: TraceLabel,
    pub subscribers: usize,
}

/// State shared between the feed and its timer task. The whole sampling
/// step, publication included, runs under one lock so subscribers see
/// records in cursor order.
struct FeedCore {
    cursor: ReplayCursor,
    publisher: RecordPublisher,
    state: FeedState,
    last_record: Option<EcgRecord>,
}

impl FeedCore {
    fn step(&mut self) -> EcgRecord {
        let record = self.cursor.step();
        self.publisher.publish(&record);
        self.last_record = Some(record);
        record
    }
}

/// Replays a sample table on a periodic timer
pub struct ReplayFeed {
    config: FeedConfig,
    core: Arc<Mutex<FeedCore>>,
    ticker: Option<JoinHandle<()>>,
    control_receiver: mpsc::Receiver<FeedCommand>,
    control_sender: Option<mpsc::Sender<FeedCommand>>,
}

impl ReplayFeed {
    /// Create a feed over a loaded table
    pub fn new(table: SampleTable, config: FeedConfig) -> EcgResult<Self> {
        let cursor = ReplayCursor::new(Arc::new(table), &config)?;
        let (control_sender, control_receiver) = mpsc::channel(32);

        Ok(ReplayFeed {
            config,
            core: Arc::new(Mutex::new(FeedCore {
                cursor,
                publisher: RecordPublisher::new(),
                state: FeedState::Idle,
                last_record: None,
            })),
            ticker: None,
            control_receiver,
            control_sender: Some(control_sender),
        })
    }

    /// Create a feed from a resource reader, keeping whatever rows were read
    /// before a load failure. The failure is logged; only an empty result
    /// is an error.
    pub fn from_reader<R: BufRead>(reader: R, config: FeedConfig) -> EcgResult<Self> {
        let load = SampleTable::parse_partial(reader);
        if let Some(err) = &load.error {
            error!(
                rows_loaded = load.table.len(),
                "Failed to load ECG traces: {}", err
            );
        }
        Self::new(load.table, config)
    }

    /// Begin periodic emission, replacing any timer already running
    pub async fn start(&mut self) -> EcgResult<()> {
        {
            let mut core = self.core.lock().await;
            if core.state == FeedState::Stopped {
                return Err(EcgError::FeedCompleted);
            }
            core.state = FeedState::Running;
        }

        if let Some(previous) = self.ticker.take() {
            previous.abort();
            debug!("Replacing running ECG feed timer");
        }

        let core = Arc::clone(&self.core);
        let period = self.config.tick_interval();
        self.ticker = Some(tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; emission starts one period in
            timer.tick().await;

            loop {
                timer.tick().await;
                let mut core = core.lock().await;
                if core.state != FeedState::Running {
                    break;
                }
                core.step();
            }
        }));

        info!(
            "ECG feed started - tick interval: {}us, sample rate: {:.1}Hz",
            self.config.tick_interval_us, self.config.sample_rate
        );
        Ok(())
    }

    /// Complete every subscriber and cancel the timer. No record is
    /// published after this returns.
    pub async fn stop(&mut self) -> EcgResult<()> {
        let emitted = {
            let mut core = self.core.lock().await;
            if core.state == FeedState::Stopped {
                return Ok(());
            }
            core.publisher.complete();
            core.state = FeedState::Stopped;
            core.cursor.total_index()
        };

        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }

        info!("ECG feed stopped after {} records", emitted);
        Ok(())
    }

    /// Subscribe an unbounded record stream
    pub async fn records(&self) -> RecordStream {
        self.core.lock().await.publisher.subscribe_stream()
    }

    /// Register a callback sink
    pub async fn subscribe(&self, sink: impl RecordSink + 'static) -> SubscriberId {
        self.core.lock().await.publisher.subscribe(sink)
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.core.lock().await.publisher.unsubscribe(id)
    }

    /// Sender for [`FeedCommand`]s handled by [`ReplayFeed::run`]. Must be
    /// taken before `run` is called.
    pub fn control_handle(&self) -> EcgResult<mpsc::Sender<FeedCommand>> {
        self.control_sender
            .clone()
            .ok_or(EcgError::ControlChannelClosed)
    }

    /// Handle control commands until every control handle is dropped.
    /// The feed is stopped on exit.
    pub async fn run(&mut self) -> EcgResult<()> {
        self.control_sender = None;

        while let Some(command) = self.control_receiver.recv().await {
            match command {
                FeedCommand::Start => {
                    if let Err(e) = self.start().await {
                        warn!("Ignoring start command: {}", e);
                    }
                }
                FeedCommand::Stop => self.stop().await?,
            }
        }

        debug!("ECG feed control channel closed");
        self.stop().await
    }

    pub async fn state(&self) -> FeedState {
        self.core.lock().await.state
    }

    /// Most recently published record
    pub async fn last_record(&self) -> Option<EcgRecord> {
        self.core.lock().await.last_record
    }

    pub async fn stats(&self) -> FeedStats {
        let core = self.core.lock().await;
        FeedStats {
            state: core.state,
            current_index: core.cursor.next_index(),
            total_index: core.cursor.total_index(),
            trace: core.cursor.trace(),
            subscribers: core.publisher.subscriber_count(),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

impl Drop for ReplayFeed {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Record stream and control sender for a spawned feed
pub struct FeedHandle {
    pub records: RecordStream,
    control: mpsc::Sender<FeedCommand>,
}

impl FeedHandle {
    pub async fn start(&self) -> EcgResult<()> {
        self.send(FeedCommand::Start).await
    }

    pub async fn stop(&self) -> EcgResult<()> {
        self.send(FeedCommand::Stop).await
    }

    pub fn control(&self) -> mpsc::Sender<FeedCommand> {
        self.control.clone()
    }

    async fn send(&self, command: FeedCommand) -> EcgResult<()> {
        self.control
            .send(command)
            .await
            .map_err(|_| EcgError::ControlChannelClosed)
    }
}

/// Spawn a feed over the bundled traces in the background
pub async fn spawn_replay_feed(config: FeedConfig) -> EcgResult<FeedHandle> {
    let mut feed = bundled_feed(config)?;
    let records = feed.records().await;
    let control = feed.control_handle()?;

    tokio::spawn(async move {
        if let Err(e) = feed.run().await {
            error!("ECG feed error: {}", e);
        }
    });

    Ok(FeedHandle { records, control })
}
