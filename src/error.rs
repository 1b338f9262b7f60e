//! Error taxonomy shared by the data sources, transforms and configuration.
//!
//! Every variant is recoverable from the dashboard's point of view: the owning
//! tab shows the message as an inline banner and stays interactive. Empty
//! results are deliberately not errors (see [`crate::chart::ChartView::NoData`]).

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network-level failure while fetching a resource.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a success status.
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A local CSV file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not well-formed CSV.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV parsed, but lacks columns the feed needs.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Resampling was asked for a bucket width that is zero or negative.
    #[error("bucket width must be positive, got {0} ms")]
    InvalidBucket(i64),

    /// Invalid configuration file or values.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    /// True for failures of the transport (network, HTTP, file system), as
    /// opposed to problems with the content that was received.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Fetch { .. } | DashboardError::Status { .. } | DashboardError::Io { .. }
        )
    }
}
