use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod html;
pub mod reporter;

pub use reporter::Reporter;

use crate::analysis::{stats, PointSet};
use crate::charts::{Chart, ChartContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Json,
    Html,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "html" => OutputFormat::Html,
            _ => OutputFormat::Html,
        }
    }
}

pub fn add_file_extension(path: &str, format: &OutputFormat) -> String {
    let extension = match format {
        OutputFormat::Html => ".html",
        OutputFormat::Json => ".json",
    };

    if path.ends_with(extension) {
        path.to_string()
    } else {
        format!("{}{}", path, extension)
    }
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub change_count: usize,
    pub point_count: usize,
    pub start_date: NaiveDate,
    pub size_threshold: f64,
    pub size_percentile: f64,
    pub average_days_to_merge: Option<f64>,
    pub median_days_to_merge: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub project: String,
    pub owners: Vec<String>,
    pub generated: DateTime<Utc>,
    pub summary: Summary,
    pub charts: Vec<Chart>,
}

impl Report {
    pub fn new(ctx: &ChartContext, set: &PointSet, charts: Vec<Chart>) -> Self {
        let latencies: Vec<f64> = set.points.iter().map(|p| p.merge_latency as f64).collect();

        Self {
            project: ctx.project.clone(),
            owners: ctx.owners.clone(),
            generated: Utc::now(),
            summary: Summary {
                change_count: set.change_count,
                point_count: set.points.len(),
                start_date: set.start_date,
                size_threshold: set.size_threshold,
                size_percentile: ctx.config.size_percentile,
                average_days_to_merge: stats::mean(&latencies),
                median_days_to_merge: stats::median(&latencies),
            },
            charts,
        }
    }
}

pub trait OutputGenerator {
    async fn generate(&mut self, report: &Report) -> Result<String>;
}
