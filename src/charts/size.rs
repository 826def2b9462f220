use super::*;
use crate::analysis::stats::percentile;

/// Merge latency against patch size, both clipped to their own outlier
/// percentile.
pub fn size_correlation(set: &PointSet, ctx: &ChartContext) -> Chart {
    let config = &ctx.config;

    let latencies: Vec<f64> = set.points.iter().map(|p| p.merge_latency as f64).collect();
    let sizes: Vec<f64> = set.points.iter().map(|p| p.size as f64).collect();
    let latency_cutoff = percentile(&latencies, config.outlier_percentile).unwrap_or(0.0);
    let size_cutoff = percentile(&sizes, config.outlier_percentile).unwrap_or(0.0);

    let samples: Vec<PlotPoint> = set
        .points
        .iter()
        .filter(|p| (p.merge_latency as f64) < latency_cutoff && (p.size as f64) < size_cutoff)
        .map(|p| PlotPoint::new(p.size as f64, p.merge_latency as f64))
        .collect();

    let x_axis = Axis {
        label: "Lines of code".to_string(),
        min: Some(-config.axis_margin),
        ..Axis::default()
    };
    let y_axis = Axis {
        label: "Days to merge patch".to_string(),
        min: Some(-config.axis_margin),
        ..Axis::default()
    };

    let mut chart = Chart::maximized(
        "lines-of-code",
        "Lines of code".to_string(),
        ctx.window_title("Lines of code"),
        x_axis,
        y_axis,
    );
    chart.series.push(Series::scatter(samples, config));
    chart
}
