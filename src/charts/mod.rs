use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod authors;
pub mod color;
pub mod size;
pub mod trend;

use crate::analysis::PointSet;
use crate::config::{ChartConfig, StackalyticsConfig};
use crate::stackalytics::ContributorStats;

/// Renderer independent description of one chart window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub window_title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<Series>,
    pub maximized: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Axis {
    pub label: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub ticks: Vec<Tick>,
    pub tick_rotation: f64,
    pub grid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Scatter,
    Line,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub kind: SeriesKind,
    pub label: Option<String>,
    pub color: String,
    pub marker_size: f64,
    pub points: Vec<PlotPoint>,
}

/// A plotted sample. `color` and `size` override the series defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl PlotPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            color: None,
            size: None,
        }
    }
}

impl Series {
    pub fn scatter(points: Vec<PlotPoint>, config: &ChartConfig) -> Self {
        Self {
            kind: SeriesKind::Scatter,
            label: None,
            color: color::THEME_BLUE.to_css(config.alpha),
            marker_size: config.marker_size,
            points,
        }
    }

    pub fn line(points: Vec<PlotPoint>) -> Self {
        Self {
            kind: SeriesKind::Line,
            label: None,
            color: color::THEME_BLUE.to_css(1.0),
            marker_size: 0.0,
            points,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Chart {
    /// A chart marked to fill the whole window.
    pub fn maximized(id: &str, title: String, window_title: String, x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            id: id.to_string(),
            title,
            window_title,
            x_axis,
            y_axis,
            series: Vec::new(),
            maximized: true,
        }
    }

    pub fn point_count(&self) -> usize {
        self.series
            .iter()
            .filter(|series| series.kind == SeriesKind::Scatter)
            .map(|series| series.points.len())
            .sum()
    }
}

/// Run-wide inputs shared by all chart builders.
#[derive(Debug, Clone)]
pub struct ChartContext {
    pub project: String,
    pub owners: Vec<String>,
    pub config: ChartConfig,
}

impl ChartContext {
    pub fn new(project: &str, owners: &[String], config: ChartConfig) -> Self {
        Self {
            project: project.to_string(),
            owners: owners.to_vec(),
            config,
        }
    }

    /// `"<prefix> - [owners - ]project"` with slashes replaced.
    pub fn window_title(&self, prefix: &str) -> String {
        let owners = if self.owners.is_empty() {
            String::new()
        } else {
            format!("{} - ", self.owners.join(" "))
        };
        format!("{} - {}", prefix, format!("{}{}", owners, self.project).replace('/', "_"))
    }

    /// Stackalytics module name: last path segment of the project.
    pub fn module(&self) -> &str {
        self.project.rsplit('/').next().unwrap_or(&self.project)
    }
}

/// Build every chart. External metric charts with no data are left out.
pub async fn build_all<S: ContributorStats>(
    set: &PointSet,
    ctx: &ChartContext,
    stats: &S,
    stackalytics: &StackalyticsConfig,
) -> Result<Vec<Chart>> {
    let mut charts = vec![
        trend::time_to_merge(set, ctx),
        size::size_correlation(set, ctx),
        authors::by_patch_count(set, ctx),
    ];

    let scopes = [
        authors::MetricScope::module_scoped(&stackalytics.review_metric),
        authors::MetricScope::unscoped(&stackalytics.email_metric),
    ];
    for scope in &scopes {
        let module = scope.module(ctx);
        let rows = stats.engineers(module, &scope.metric).await?;
        if let Some(chart) = authors::by_external_metric(set, ctx, scope, &rows) {
            charts.push(chart);
        }
    }

    for chart in &charts {
        debug!("{}: {} points", chart.window_title, chart.point_count());
    }
    info!("Built {} charts", charts.len());
    Ok(charts)
}
