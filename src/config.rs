//! Dashboard configuration.
//!
//! Every field has a default, so the dashboard runs without any configuration
//! file. A YAML file (see [`DashboardConfig::load`]) overrides any subset:
//!
//! ```yaml
//! title: Rooftop array
//! live:
//!   refresh_interval_secs: 2
//!   bucket_secs: 300
//!   mode: reveal
//!   generation:
//!     path: ./data/live.csv
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::data::csv_table::FeedSchema;
use crate::data::source::{DataSource, FileCsvSource, HttpCsvSource};
use crate::error::{DashboardError, DashboardResult};

/// Default download URL template; `{id}` is replaced by a feed's file id.
pub const DEFAULT_URL_TEMPLATE: &str = "https://drive.google.com/uc?id={id}";

/// Upper bound for intervals and timeouts.
const MAX_SECS: f64 = 86_400.0;

// ─────────────────────────────────────────────────────────────────────────────
// FeedConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Where one CSV feed comes from and which columns it carries.
///
/// Exactly one of `file_id` (fetched over HTTP through the URL template) and
/// `path` (a local file) must be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub file_id: Option<String>,
    pub path: Option<PathBuf>,
    /// Column layout. `None` uses the feed's built-in schema.
    pub schema: Option<FeedSchema>,
}

impl FeedConfig {
    pub fn remote<S: Into<String>>(file_id: S) -> Self {
        Self {
            file_id: Some(file_id.into()),
            ..Default::default()
        }
    }

    pub fn local<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// The configured schema, or `fallback`.
    pub fn schema_or(&self, fallback: FeedSchema) -> FeedSchema {
        self.schema.clone().unwrap_or(fallback)
    }

    /// Build the data source for this feed.
    pub fn source(
        &self,
        url_template: &str,
        timeout: Option<Duration>,
        fallback: FeedSchema,
    ) -> DashboardResult<Box<dyn DataSource>> {
        let schema = self.schema_or(fallback);
        match (&self.file_id, &self.path) {
            (Some(id), None) => Ok(Box::new(
                HttpCsvSource::from_file_id(url_template, id, schema).with_timeout(timeout),
            )),
            (None, Some(path)) => Ok(Box::new(FileCsvSource::new(path.clone(), schema))),
            _ => Err(DashboardError::Config(
                "a feed needs exactly one of `file_id` or `path`".to_string(),
            )),
        }
    }

    fn validate(&self, name: &str) -> DashboardResult<()> {
        if self.file_id.is_some() == self.path.is_some() {
            return Err(DashboardError::Config(format!(
                "feed `{name}` needs exactly one of `file_id` or `path`"
            )));
        }
        if let Some(schema) = &self.schema {
            if schema.value_columns.is_empty() {
                return Err(DashboardError::Config(format!(
                    "feed `{name}` schema lists no value columns"
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LiveConfig
// ─────────────────────────────────────────────────────────────────────────────

/// How the live tab produces new data on each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveMode {
    /// Re-fetch the live feed and resample it every tick. Runs until closed.
    #[default]
    Refetch,
    /// Load the live feed once and reveal `reveal_batch` more rows per tick.
    /// Stops when the feed is exhausted.
    Reveal,
}

/// Settings of the live generation tab and its refresh loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveConfig {
    /// Measured generation feed.
    pub generation: FeedConfig,
    /// Forecast baseline drawn behind the live series.
    pub forecast: FeedConfig,
    /// Wall-clock time between ticks.
    pub refresh_interval_secs: f64,
    /// Resampling bucket width (refetch mode).
    pub bucket_secs: f64,
    pub mode: LiveMode,
    /// Rows revealed per tick (reveal mode).
    pub reveal_batch: usize,
    /// Ignore live rows later than the current local time (refetch mode).
    pub clip_to_now: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            generation: FeedConfig::remote("1vydHZnOWjXRni2FwQ-mLwy3BQm1-I6Ui"),
            forecast: FeedConfig::remote("1BgS87RxvACPnHNnVOw5nXFdRiegsve43"),
            refresh_interval_secs: 15.0,
            bucket_secs: 15.0,
            mode: LiveMode::Refetch,
            reveal_batch: 1,
            clip_to_now: false,
        }
    }
}

impl LiveConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_interval_secs)
    }

    /// Bucket width; zero when `bucket_secs` is not representable.
    pub fn bucket_width(&self) -> TimeDelta {
        TimeDelta::try_milliseconds((self.bucket_secs * 1_000.0).round() as i64)
            .unwrap_or(TimeDelta::zero())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DashboardConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// | Field          | Purpose |
/// |----------------|---------|
/// | `title`        | Window title and page heading |
/// | `url_template` | Download URL for `file_id` feeds |
/// | `forecast`     | Forecast tab feed |
/// | `weather`      | Weather tab feed |
/// | `ambient`      | Optional temperature/humidity feed on the weather tab |
/// | `live`         | Live tab feeds and refresh loop |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub title: String,
    pub url_template: String,
    /// HTTP request timeout. `None` waits indefinitely.
    pub http_timeout_secs: Option<f64>,
    pub forecast: FeedConfig,
    pub weather: FeedConfig,
    pub ambient: Option<FeedConfig>,
    pub live: LiveConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Solar PV Generation Dashboard".to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            http_timeout_secs: None,
            forecast: FeedConfig::remote("1oXtwoKlvHTLvUMCG-ujigpiKw4w0kLnC"),
            weather: FeedConfig::remote("1mSRBAQwTWhIPK9XMJmhTr7dw0TFCHX7E"),
            ambient: None,
            live: LiveConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Read and validate a YAML configuration file.
    pub fn load(path: &Path) -> DashboardResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML configuration text.
    pub fn from_yaml_str(text: &str) -> DashboardResult<Self> {
        let cfg: DashboardConfig =
            serde_yaml::from_str(text).map_err(|e| DashboardError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> DashboardResult<()> {
        let live = &self.live;
        if !(live.refresh_interval_secs > 0.0 && live.refresh_interval_secs <= MAX_SECS) {
            return Err(DashboardError::Config(
                "live.refresh_interval_secs must be positive and at most one day".to_string(),
            ));
        }
        if !live.bucket_secs.is_finite() || live.bucket_width().num_milliseconds() <= 0 {
            return Err(DashboardError::Config(
                "live.bucket_secs must be positive".to_string(),
            ));
        }
        if live.reveal_batch == 0 {
            return Err(DashboardError::Config(
                "live.reveal_batch must be at least 1".to_string(),
            ));
        }
        if let Some(t) = self.http_timeout_secs {
            if !(t > 0.0 && t <= MAX_SECS) {
                return Err(DashboardError::Config(
                    "http_timeout_secs must be positive and at most one day".to_string(),
                ));
            }
        }
        self.forecast.validate("forecast")?;
        self.weather.validate("weather")?;
        if let Some(ambient) = &self.ambient {
            ambient.validate("ambient")?;
        }
        live.generation.validate("live.generation")?;
        live.forecast.validate("live.forecast")?;
        Ok(())
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs_f64)
    }

    /// Build a source for `feed` with this config's URL template and timeout.
    pub fn source_for(
        &self,
        feed: &FeedConfig,
        fallback: FeedSchema,
    ) -> DashboardResult<Box<dyn DataSource>> {
        feed.source(&self.url_template, self.http_timeout(), fallback)
    }
}
