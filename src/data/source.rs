//! Data source adapters: where a feed's CSV comes from.
//!
//! A source is fetched in full on every call. There is no caching and no
//! retry; a refresh loop calling [`DataSource::fetch`] on every tick is the
//! retry policy.

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::csv_table::{parse_csv, FeedSchema};
use crate::data::table::Table;
use crate::error::{DashboardError, DashboardResult};

/// Placeholder substituted by the file identifier in URL templates.
pub const FILE_ID_PLACEHOLDER: &str = "{id}";

/// Anything that can produce a parsed [`Table`].
pub trait DataSource: Send {
    /// Fetch and parse the full resource.
    fn fetch(&self) -> DashboardResult<Table>;

    /// Human-readable location, used in log lines and banners.
    fn describe(&self) -> String;
}

/// Build the download URL for an opaque file identifier.
pub fn resolve_url(template: &str, file_id: &str) -> String {
    if template.contains(FILE_ID_PLACEHOLDER) {
        template.replace(FILE_ID_PLACEHOLDER, file_id)
    } else {
        format!("{template}{file_id}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// CSV fetched with a blocking HTTP GET.
pub struct HttpCsvSource {
    url: String,
    schema: FeedSchema,
    timeout: Option<Duration>,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, schema: FeedSchema) -> Self {
        Self {
            url: url.into(),
            schema,
            timeout: None,
        }
    }

    /// Source for `file_id` resolved through `template` (see [`resolve_url`]).
    pub fn from_file_id(template: &str, file_id: &str, schema: FeedSchema) -> Self {
        Self::new(resolve_url(template, file_id), schema)
    }

    /// Optional request timeout. Without one a hanging server stalls the caller.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DataSource for HttpCsvSource {
    fn fetch(&self) -> DashboardResult<Table> {
        let fetch_err = |source: reqwest::Error| DashboardError::Fetch {
            url: self.url.clone(),
            source,
        };
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(fetch_err)?;
        let resp = client.get(&self.url).send().map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().map_err(fetch_err)?;
        tracing::debug!(url = %self.url, bytes = body.len(), "fetched CSV");
        parse_csv(body.as_ref(), &self.schema)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Local file
// ─────────────────────────────────────────────────────────────────────────────

/// CSV read from a local path, re-read on every fetch.
pub struct FileCsvSource {
    path: PathBuf,
    schema: FeedSchema,
}

impl FileCsvSource {
    pub fn new(path: impl Into<PathBuf>, schema: FeedSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }
}

impl DataSource for FileCsvSource {
    fn fetch(&self) -> DashboardResult<Table> {
        let file = File::open(&self.path).map_err(|source| DashboardError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_csv(std::io::BufReader::new(file), &self.schema)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// A fixed table, returned as-is on every fetch.
pub struct StaticSource {
    table: Table,
}

impl StaticSource {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl DataSource for StaticSource {
    fn fetch(&self) -> DashboardResult<Table> {
        Ok(self.table.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.table.len())
    }
}
