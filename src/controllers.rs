//! Controller for steering the live refresh loop from the UI.
//!
//! The refresh worker owns the run state; the UI only sends requests. Requests
//! are applied between ticks, and the worker confirms every change with a
//! [`LiveEvent::State`](crate::sink::LiveEvent::State) message.

use std::sync::mpsc::{Receiver, Sender};

/// Requests accepted by the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCommand {
    Pause,
    Resume,
    /// Pause when running, resume when paused.
    Toggle,
}

/// Cloneable handle for pausing and resuming the live refresh loop.
#[derive(Clone)]
pub struct RefreshController {
    tx: Sender<RefreshCommand>,
}

impl RefreshController {
    /// Request the loop to stop updating the live series.
    ///
    /// Returns `false` if the loop has already exited.
    pub fn pause(&self) -> bool {
        self.tx.send(RefreshCommand::Pause).is_ok()
    }

    /// Request the loop to resume updating.
    pub fn resume(&self) -> bool {
        self.tx.send(RefreshCommand::Resume).is_ok()
    }

    pub fn toggle(&self) -> bool {
        self.tx.send(RefreshCommand::Toggle).is_ok()
    }
}

/// Create a controller and the receiver the refresh worker listens on.
pub fn channel_refresh() -> (RefreshController, Receiver<RefreshCommand>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (RefreshController { tx }, rx)
}
