//! Channel from worker threads into the dashboard UI.
//!
//! Workers never touch UI state. They send [`DashboardUpdate`] messages through
//! a [`DashboardSink`]; the UI drains the receiver once per frame. When the sink
//! carries an egui context it requests a repaint after every message, so new
//! data shows up without waiting for user input.

use std::sync::mpsc::{Receiver, SendError, Sender};

use eframe::egui;

use crate::data::table::Table;
use crate::error::DashboardResult;
use crate::refresh::{LiveFrame, RunState};

/// The static feeds loaded by one-shot loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Forecast,
    Weather,
    Ambient,
}

impl Feed {
    pub fn label(&self) -> &'static str {
        match self {
            Feed::Forecast => "forecast",
            Feed::Weather => "weather",
            Feed::Ambient => "ambient",
        }
    }
}

/// Events emitted by the live refresh worker.
#[derive(Debug)]
pub enum LiveEvent {
    /// The forecast baseline drawn behind the live series.
    Baseline(DashboardResult<Vec<[f64; 2]>>),
    /// New live data for the chart.
    Frame(LiveFrame),
    /// A tick passed while paused; nothing was updated.
    Paused,
    /// The loop's run state changed in response to a control command.
    State(RunState),
    /// A tick failed to produce data. The loop keeps going.
    Warning(String),
    /// The reveal feed is exhausted and the loop has stopped.
    Finished,
}

/// Messages sent over the channel to drive the UI.
#[derive(Debug)]
pub enum DashboardUpdate {
    /// Result of loading one of the static feeds.
    Loaded(Feed, DashboardResult<Table>),
    Live(LiveEvent),
}

/// Convenience sender for feeding updates into the dashboard.
#[derive(Clone)]
pub struct DashboardSink {
    tx: Sender<DashboardUpdate>,
    repaint: Option<egui::Context>,
}

impl DashboardSink {
    /// Request a repaint of `ctx` after every message sent through this sink.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn send(&self, update: DashboardUpdate) -> Result<(), SendError<DashboardUpdate>> {
        self.tx.send(update)?;
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
        Ok(())
    }

    /// Send the result of a static feed load.
    pub fn send_loaded(
        &self,
        feed: Feed,
        result: DashboardResult<Table>,
    ) -> Result<(), SendError<DashboardUpdate>> {
        self.send(DashboardUpdate::Loaded(feed, result))
    }

    /// Send an event of the live refresh loop.
    pub fn send_live(&self, event: LiveEvent) -> Result<(), SendError<DashboardUpdate>> {
        self.send(DashboardUpdate::Live(event))
    }
}

/// Create a new channel pair: `(DashboardSink, Receiver<DashboardUpdate>)`.
pub fn channel_dashboard() -> (DashboardSink, Receiver<DashboardUpdate>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (DashboardSink { tx, repaint: None }, rx)
}
