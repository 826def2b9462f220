use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_STEM: &str = "time-to-merge";
const ENV_PREFIX: &str = "TTM";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gerrit: GerritConfig,
    pub stackalytics: StackalyticsConfig,
    pub charts: ChartConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerritConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub branch: String,
    pub ssh_command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackalyticsConfig {
    pub base_url: String,
    pub release: String,
    pub review_metric: String,
    pub email_metric: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub outlier_percentile: f64,
    pub size_percentile: f64,
    pub max_trend_window: usize,
    pub marker_size: f64,
    pub alpha: f64,
    pub axis_margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gerrit: GerritConfig {
                host: "review.openstack.org".to_string(),
                port: 29418,
                user: None,
                branch: "master".to_string(),
                ssh_command: "ssh".to_string(),
            },
            stackalytics: StackalyticsConfig {
                base_url: "https://www.stackalytics.com".to_string(),
                release: "all".to_string(),
                review_metric: "marks".to_string(),
                email_metric: "emails".to_string(),
            },
            charts: ChartConfig {
                outlier_percentile: 95.0,
                size_percentile: 75.0,
                max_trend_window: 60,
                marker_size: 70.0,
                alpha: 0.75,
                axis_margin: 5.0,
            },
            output: OutputConfig {
                format: "html".to_string(),
                path: "time_to_merge".to_string(),
            },
        }
    }
}

impl Config {
    /// Layer defaults, an optional `time-to-merge.{toml,yaml,json}` in the
    /// working directory and `TTM_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::builder()?
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = config::Config::try_from(&Self::default())
            .context("Failed to serialize default configuration")?;
        Ok(config::Config::builder().add_source(defaults))
    }

    /// The `[user@]host` part of the ssh invocation.
    pub fn gerrit_destination(&self) -> String {
        match &self.gerrit.user {
            Some(user) => format!("{}@{}", user, self.gerrit.host),
            None => self.gerrit.host.clone(),
        }
    }
}
