//! The live refresh loop.
//!
//! [`RefreshLoop`] is a small state machine: `tick(now)` advances it by one
//! wall-clock interval and returns what the live chart should do. It has two
//! run states, toggled only by [`RefreshCommand`]s:
//!
//! * **Running** – every tick produces a [`LiveFrame`] with a fresh revision.
//! * **Paused** – ticks still happen but leave the live data untouched and
//!   report [`TickOutput::Paused`].
//!
//! Data comes from one of two feeds:
//!
//! * **Refetch** – the live source is fetched and resampled on every tick.
//!   Failures become [`TickOutput::Warning`] and the next tick retries. Never
//!   finishes on its own.
//! * **Reveal** – a pre-loaded series is revealed one batch per tick. The
//!   loop finishes after the frame that shows the last point.
//!
//! [`spawn_refresh_worker`] drives the machine from a background thread with a
//! fixed interval, forwarding outputs to the UI through a [`DashboardSink`].

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::{NaiveDateTime, TimeDelta};

use crate::chart::{points_from_buckets, points_from_series};
use crate::config::LiveMode;
use crate::controllers::RefreshCommand;
use crate::data::source::DataSource;
use crate::data::table::Table;
use crate::data::transform::resample_mean;
use crate::error::DashboardResult;
use crate::sink::{DashboardSink, LiveEvent};

// ─────────────────────────────────────────────────────────────────────────────
// State machine
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Paused,
}

impl RunState {
    pub fn is_paused(self) -> bool {
        self == RunState::Paused
    }

    pub fn toggled(self) -> Self {
        match self {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        }
    }

    /// Label of the button that leaves this state.
    pub fn button_label(self) -> &'static str {
        match self {
            RunState::Running => "Pause",
            RunState::Paused => "Resume",
        }
    }
}

/// New live series data, tagged with the revision that identifies it.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveFrame {
    pub revision: u64,
    pub points: Vec<[f64; 2]>,
    /// Total points in the reveal feed; `None` in refetch mode.
    pub total: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutput {
    Frame(LiveFrame),
    Paused,
    Warning(String),
    Finished,
}

enum LiveFeed {
    Refetch {
        source: Box<dyn DataSource>,
        column: String,
        bucket: TimeDelta,
        clip_to_now: bool,
    },
    Reveal {
        points: Vec<[f64; 2]>,
        shown: usize,
        batch: usize,
    },
}

pub struct RefreshLoop {
    state: RunState,
    revision: u64,
    finished: bool,
    feed: LiveFeed,
}

impl RefreshLoop {
    /// Loop that re-fetches `source` and resamples `column` into buckets of
    /// `bucket` on every running tick.
    pub fn refetch<S: Into<String>>(
        source: Box<dyn DataSource>,
        column: S,
        bucket: TimeDelta,
        clip_to_now: bool,
    ) -> Self {
        Self::with_feed(LiveFeed::Refetch {
            source,
            column: column.into(),
            bucket,
            clip_to_now,
        })
    }

    /// Loop that reveals `points` in batches of `batch` (at least one).
    pub fn reveal(points: Vec<[f64; 2]>, batch: usize) -> Self {
        Self::with_feed(LiveFeed::Reveal {
            points,
            shown: 0,
            batch: batch.max(1),
        })
    }

    /// Reveal the valid readings of one column of a pre-loaded table.
    pub fn reveal_table(table: &Table, column: &str, batch: usize) -> DashboardResult<Self> {
        Ok(Self::reveal(points_from_series(&table.series(column)?), batch))
    }

    fn with_feed(feed: LiveFeed) -> Self {
        Self {
            state: RunState::Running,
            revision: 0,
            finished: false,
            feed,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Revision of the most recent frame (0 before the first one).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply a control command. Returns `true` if the run state changed.
    pub fn apply(&mut self, cmd: RefreshCommand) -> bool {
        let next = match cmd {
            RefreshCommand::Pause => RunState::Paused,
            RefreshCommand::Resume => RunState::Running,
            RefreshCommand::Toggle => self.state.toggled(),
        };
        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Advance by one tick. `now` is the current wall-clock time, used to
    /// clip the refetched feed when configured.
    pub fn tick(&mut self, now: NaiveDateTime) -> TickOutput {
        if self.finished {
            return TickOutput::Finished;
        }
        if self.state.is_paused() {
            return TickOutput::Paused;
        }
        match &mut self.feed {
            LiveFeed::Refetch {
                source,
                column,
                bucket,
                clip_to_now,
            } => {
                let up_to = clip_to_now.then_some(now);
                let result = source
                    .fetch()
                    .and_then(|table| resample_mean(&table, column, *bucket, up_to));
                match result {
                    Ok(buckets) => {
                        self.revision += 1;
                        TickOutput::Frame(LiveFrame {
                            revision: self.revision,
                            points: points_from_buckets(&buckets),
                            total: None,
                        })
                    }
                    Err(e) => TickOutput::Warning(format!("Live data error: {e}")),
                }
            }
            LiveFeed::Reveal {
                points,
                shown,
                batch,
            } => {
                if *shown >= points.len() {
                    self.finished = true;
                    return TickOutput::Finished;
                }
                *shown = (*shown + *batch).min(points.len());
                if *shown == points.len() {
                    self.finished = true;
                }
                self.revision += 1;
                TickOutput::Frame(LiveFrame {
                    revision: self.revision,
                    points: points[..*shown].to_vec(),
                    total: Some(points.len()),
                })
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the worker needs besides its sources.
#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub interval: Duration,
    pub mode: LiveMode,
    pub bucket: TimeDelta,
    pub clip_to_now: bool,
    pub reveal_batch: usize,
    /// Value column of the generation feed.
    pub column: String,
    /// Value column of the forecast baseline feed.
    pub baseline_column: String,
}

/// Why [`run_refresh_loop`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The reveal feed was exhausted.
    Finished,
    /// The UI side of a channel was dropped.
    Disconnected,
}

/// Start the live worker thread.
///
/// The worker first loads the forecast baseline (a failure is reported as a
/// warning), then builds the [`RefreshLoop`] for the configured mode and runs
/// it until the reveal feed is exhausted or the UI goes away.
pub fn spawn_refresh_worker(
    generation: Box<dyn DataSource>,
    baseline: Box<dyn DataSource>,
    settings: LiveSettings,
    commands: Receiver<RefreshCommand>,
    sink: DashboardSink,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("live-refresh".to_string())
        .spawn(move || {
            let baseline_points = baseline.fetch().and_then(|table| {
                table
                    .series(&settings.baseline_column)
                    .map(|s| points_from_series(&s))
            });
            if let Err(e) = &baseline_points {
                tracing::warn!(source = %baseline.describe(), error = %e, "forecast baseline unavailable");
            }
            if sink.send_live(LiveEvent::Baseline(baseline_points)).is_err() {
                return;
            }

            let mut refresh = match settings.mode {
                LiveMode::Refetch => RefreshLoop::refetch(
                    generation,
                    settings.column.clone(),
                    settings.bucket,
                    settings.clip_to_now,
                ),
                LiveMode::Reveal => {
                    let loaded = generation.fetch().and_then(|table| {
                        RefreshLoop::reveal_table(&table, &settings.column, settings.reveal_batch)
                    });
                    match loaded {
                        Ok(refresh) => refresh,
                        Err(e) => {
                            tracing::warn!(source = %generation.describe(), error = %e, "live feed unavailable");
                            let _ = sink.send_live(LiveEvent::Warning(format!("Live data error: {e}")));
                            return;
                        }
                    }
                }
            };

            let exit = run_refresh_loop(&mut refresh, settings.interval, &commands, &sink);
            tracing::info!(?exit, ticks = refresh.revision(), "live refresh loop stopped");
        })
}

/// Run `refresh` at a fixed interval until it finishes or the UI disconnects.
///
/// Commands are applied as soon as they arrive and confirmed with
/// [`LiveEvent::State`], but the full interval always elapses between ticks.
pub fn run_refresh_loop(
    refresh: &mut RefreshLoop,
    interval: Duration,
    commands: &Receiver<RefreshCommand>,
    sink: &DashboardSink,
) -> LoopExit {
    loop {
        let now = chrono::Local::now().naive_local();
        let event = match refresh.tick(now) {
            TickOutput::Frame(frame) => {
                tracing::debug!(revision = frame.revision, points = frame.points.len(), "live frame");
                LiveEvent::Frame(frame)
            }
            TickOutput::Paused => LiveEvent::Paused,
            TickOutput::Warning(msg) => {
                tracing::warn!("{msg}");
                LiveEvent::Warning(msg)
            }
            TickOutput::Finished => LiveEvent::Finished,
        };
        let finished = matches!(event, LiveEvent::Finished);
        if sink.send_live(event).is_err() {
            return LoopExit::Disconnected;
        }
        if finished {
            return LoopExit::Finished;
        }
        if refresh.is_finished() {
            return match sink.send_live(LiveEvent::Finished) {
                Ok(()) => LoopExit::Finished,
                Err(_) => LoopExit::Disconnected,
            };
        }

        let deadline = Instant::now() + interval;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match commands.recv_timeout(remaining) {
                Ok(cmd) => {
                    if refresh.apply(cmd)
                        && sink.send_live(LiveEvent::State(refresh.state())).is_err()
                    {
                        return LoopExit::Disconnected;
                    }
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return LoopExit::Disconnected,
            }
        }
    }
}
