//! One-shot background loads of the static feeds.

use std::thread::JoinHandle;

use crate::data::source::DataSource;
use crate::sink::{DashboardSink, Feed};

/// Fetch `source` on a worker thread and send the result as
/// [`DashboardUpdate::Loaded`](crate::sink::DashboardUpdate::Loaded).
pub fn spawn_load(
    feed: Feed,
    source: Box<dyn DataSource>,
    sink: DashboardSink,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("load-{}", feed.label()))
        .spawn(move || {
            let origin = source.describe();
            tracing::info!(feed = feed.label(), %origin, "loading feed");
            let result = source.fetch();
            match &result {
                Ok(table) => tracing::info!(feed = feed.label(), rows = table.len(), "feed loaded"),
                Err(e) => tracing::warn!(feed = feed.label(), %origin, error = %e, "feed failed to load"),
            }
            // The UI may already be gone.
            let _ = sink.send_loaded(feed, result);
        })
}
