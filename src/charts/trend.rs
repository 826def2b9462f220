use super::*;
use crate::analysis::{stats, without_latency_outliers};
use chrono::Duration;

/// Merge latency over time, colored by patch size, with a moving mean.
pub fn time_to_merge(set: &PointSet, ctx: &ChartContext) -> Chart {
    let config = &ctx.config;
    let points = without_latency_outliers(&set.points, config.outlier_percentile);

    let x: Vec<f64> = points.iter().map(|p| p.date_offset as f64).collect();
    let y: Vec<f64> = points.iter().map(|p| p.merge_latency as f64).collect();

    if let (Some(average), Some(median)) = (stats::mean(&y), stats::median(&y)) {
        info!(
            "Average days to merge patches: {}, median: {}",
            average.round(),
            median.round()
        );
    }

    let window = stats::moving_average_window(points.len(), config.max_trend_window);
    let averages = stats::moving_average(&y, window);
    let trend: Vec<PlotPoint> = x
        .iter()
        .zip(&averages)
        .map(|(&x, &avg)| PlotPoint::new(x, avg))
        .collect();

    let samples: Vec<PlotPoint> = points
        .iter()
        .map(|p| {
            let rgb = color::size_color(p.size, set.size_threshold);
            PlotPoint {
                color: Some(rgb.to_css(config.alpha)),
                size: Some(color::marker_size(&rgb, config.marker_size)),
                ..PlotPoint::new(p.date_offset as f64, p.merge_latency as f64)
            }
        })
        .collect();

    let x_axis = Axis {
        label: format!("{} patches", set.change_count),
        min: Some(-config.axis_margin),
        ticks: date_ticks(set, points.last().map(|p| p.date_offset)),
        tick_rotation: 45.0,
        ..Axis::default()
    };
    let y_axis = Axis {
        label: "Days to merge patch".to_string(),
        min: Some(-config.axis_margin),
        grid: true,
        ..Axis::default()
    };

    let mut chart = Chart::maximized(
        "time-to-merge",
        "Time to merge".to_string(),
        ctx.window_title("Time to merge"),
        x_axis,
        y_axis,
    );
    chart
        .series
        .push(Series::line(trend).with_label(format!("Moving mean of the last {} patches", window)));
    chart.series.push(
        Series::scatter(samples, config).with_label("Lines of code, small & green to large & red"),
    );
    chart
}

/// Ten evenly spaced ticks from day 0 to `last`, labeled with calendar dates.
fn date_ticks(set: &PointSet, last: Option<i64>) -> Vec<Tick> {
    let last = match last {
        Some(last) if last > 0 => last,
        _ => return Vec::new(),
    };
    let step = (last / 10).max(1);

    (0..last)
        .step_by(step as usize)
        .map(|offset| Tick {
            value: offset as f64,
            label: (set.start_date + Duration::days(offset)).to_string(),
        })
        .collect()
}
