use super::*;
use crate::analysis::{stats, without_latency_outliers, PatchPoint};
use crate::stackalytics::{by_engineer, EngineerStat};
use std::collections::BTreeMap;
use tracing::warn;

/// Which statistics metric to fetch and whether to narrow it to the
/// project's module.
#[derive(Debug, Clone)]
pub struct MetricScope {
    pub metric: String,
    pub module_scoped: bool,
}

impl MetricScope {
    pub fn module_scoped(metric: &str) -> Self {
        Self {
            metric: metric.to_string(),
            module_scoped: true,
        }
    }

    /// Stackalytics matches emails to modules by subject line, which misses
    /// most of them, so email counts are taken across all modules.
    pub fn unscoped(metric: &str) -> Self {
        Self {
            metric: metric.to_string(),
            module_scoped: false,
        }
    }

    pub fn module<'a>(&self, ctx: &'a ChartContext) -> Option<&'a str> {
        self.module_scoped.then(|| ctx.module())
    }
}

/// Merge latencies of the kept points grouped by author.
fn latencies_by_author(points: &[PatchPoint]) -> BTreeMap<&str, Vec<f64>> {
    let mut authors: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for point in points {
        authors
            .entry(point.author.as_str())
            .or_default()
            .push(point.merge_latency as f64);
    }
    authors
}

fn author_chart(id: &str, prefix: String, x_label: String, samples: Vec<PlotPoint>, ctx: &ChartContext) -> Chart {
    let config = &ctx.config;
    let margin = config.axis_margin;
    let max_x = samples.iter().map(|p| p.x).reduce(f64::max);
    let max_y = samples.iter().map(|p| p.y).reduce(f64::max);

    let x_axis = Axis {
        label: x_label,
        min: Some(-margin),
        max: max_x.map(|x| x + margin),
        ..Axis::default()
    };
    let y_axis = Axis {
        label: "Average days to merge patch per author".to_string(),
        min: Some(-margin),
        max: max_y.map(|y| y + margin),
        ..Axis::default()
    };

    let mut chart = Chart::maximized(id, prefix.clone(), ctx.window_title(&prefix), x_axis, y_axis);
    chart.series.push(Series::scatter(samples, config));
    chart
}

/// Average merge latency per author against how many patches they landed.
pub fn by_patch_count(set: &PointSet, ctx: &ChartContext) -> Chart {
    let points = without_latency_outliers(&set.points, ctx.config.outlier_percentile);

    let samples = latencies_by_author(&points)
        .values()
        .filter_map(|latencies| {
            let average = stats::mean(latencies)?;
            Some(PlotPoint::new(latencies.len() as f64, average))
        })
        .collect();

    author_chart(
        "authors-by-patches",
        "Time to merge per author by commits".to_string(),
        "Patches by author".to_string(),
        samples,
        ctx,
    )
}

/// Average merge latency per author against an external activity metric.
///
/// Returns `None` when the statistics service had nothing for this scope.
/// Authors the service does not know are skipped.
pub fn by_external_metric(
    set: &PointSet,
    ctx: &ChartContext,
    scope: &MetricScope,
    rows: &[EngineerStat],
) -> Option<Chart> {
    if rows.is_empty() {
        warn!(
            "No result found from Stackalytics API for module {} and metric {}",
            scope.module(ctx).unwrap_or("<all>"),
            scope.metric
        );
        return None;
    }

    let points = without_latency_outliers(&set.points, ctx.config.outlier_percentile);
    let metric_by_author = by_engineer(rows);

    let grouped = latencies_by_author(&points);
    let samples: Vec<PlotPoint> = grouped
        .iter()
        .filter_map(|(author, latencies)| {
            let metric = *metric_by_author.get(author)?;
            Some(PlotPoint::new(metric, stats::mean(latencies)?))
        })
        .collect();

    if samples.len() < grouped.len() {
        info!(
            "{} of {} authors have no {} on Stackalytics",
            grouped.len() - samples.len(),
            grouped.len(),
            scope.metric
        );
    }

    Some(author_chart(
        &format!("authors-by-{}", scope.metric),
        format!("Time to merge per author by {}", scope.metric),
        format!("{} by author", scope.metric),
        samples,
        ctx,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::{context, point, sample_set};

    fn stat(id: &str, metric: f64) -> EngineerStat {
        EngineerStat {
            id: id.to_string(),
            metric,
            name: None,
        }
    }

    fn small_set() -> PointSet {
        let mut set = sample_set();
        set.points = vec![
            point(0, 2, 1, "alice"),
            point(1, 4, 1, "alice"),
            point(2, 6, 1, "alice"),
            point(3, 3, 1, "bob"),
            point(4, 400, 1, "bob"),
        ];
        set
    }

    #[test]
    fn groups_by_author() {
        let chart = by_patch_count(&small_set(), &context(&[]));
        let samples = &chart.series[0].points;
        // bob's 400 day patch is an outlier, leaving one patch averaging 3
        assert_eq!(samples.len(), 2);
        assert_eq!((samples[0].x, samples[0].y), (3.0, 4.0));
        assert_eq!((samples[1].x, samples[1].y), (1.0, 3.0));
        assert_eq!(chart.x_axis.max, Some(8.0));
        assert_eq!(chart.y_axis.max, Some(9.0));
    }

    #[test]
    fn external_metric_replaces_patch_count() {
        let scope = MetricScope::module_scoped("marks");
        let rows = vec![stat("alice", 250.0), stat("zed", 1.0)];
        let chart = by_external_metric(&small_set(), &context(&[]), &scope, &rows).unwrap();

        assert_eq!(chart.id, "authors-by-marks");
        assert_eq!(chart.title, "Time to merge per author by marks");
        assert_eq!(chart.x_axis.label, "marks by author");
        // bob is unknown to the service and skipped
        let samples = &chart.series[0].points;
        assert_eq!(samples.len(), 1);
        assert_eq!((samples[0].x, samples[0].y), (250.0, 4.0));
    }

    #[test]
    fn no_rows_skips_chart() {
        let scope = MetricScope::unscoped("emails");
        assert!(by_external_metric(&small_set(), &context(&[]), &scope, &[]).is_none());
    }

    #[test]
    fn no_matching_author_gives_empty_chart() {
        let scope = MetricScope::unscoped("emails");
        let chart = by_external_metric(&small_set(), &context(&[]), &scope, &[stat("zed", 3.0)]).unwrap();
        assert_eq!(chart.point_count(), 0);
        assert_eq!(chart.x_axis.max, None);
    }

    #[test]
    fn email_scope_drops_module() {
        let ctx = context(&[]);
        assert_eq!(MetricScope::module_scoped("marks").module(&ctx), Some("neutron"));
        assert_eq!(MetricScope::unscoped("emails").module(&ctx), None);
    }
}
