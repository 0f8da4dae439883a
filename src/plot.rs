use crate::battery::BatteryEstimate;
use crate::stats::{cumulative_energy, power_rate, PowerStats};
use crate::utils::{format_time_duration, min_and_max, padded_range, quartiles};
use crate::PowerTrace;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

type PlotResult = Result<(), Box<dyn Error>>;

const FONT: &str = "sans-serif";
const MAX_MODE_PANELS: usize = 4;

/// Equal-width bins over [min, max] of the finite values: (lower edge, upper edge, count).
/// A constant series gives a single bin of zero width.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let (min, max) = match min_and_max(values.iter()) {
        Some(mm) => mm,
        None => return Vec::new(),
    };
    let finite = values.iter().filter(|v| v.is_finite());
    if bins == 0 {
        return Vec::new();
    }
    if max - min <= 0. {
        return vec![(min, max, finite.count())];
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let i = (((v - min) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}

/// Plot the power time series to svg, filled area as for the load series.
pub fn plot_power<P>(trace: &PowerTrace, fout: P) -> PlotResult
where
    P: AsRef<Path>,
{
    let power_mw: Vec<f64> = trace.power.iter().map(|p| p * 1000.).collect();
    let (xmin, xmax) = padded_range(trace.start_time(), trace.end_time(), 0.);
    let (_, ymax) = min_and_max(power_mw.iter()).unwrap_or((0., 1.));
    let (_, ymax) = padded_range(0., ymax, 0.1);
    let root = SVGBackend::new(&fout, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} - power", trace.label), (FONT, 30))
        .margin(50)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d(xmin..xmax, 0f64..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(100, 100, 100).mix(0.5).stroke_width(2))
        .set_all_tick_mark_size(2)
        .label_style((FONT, 20))
        .y_desc("power [mW]")
        .x_desc("time [s]")
        .x_labels(16)
        .y_labels(25)
        .y_label_formatter(&|y: &f64| format!("{:.1}", y))
        .draw()?;
    let color = trace.mode.color();
    let area = AreaSeries::new(
        trace.time.iter().copied().zip(power_mw.iter().copied()),
        0.0,
        color.mix(0.2),
    )
    .border_style(BLACK.stroke_width(1));
    chart.draw_series(area)?;
    root.present()?;
    Ok(())
}

/// Detailed analysis of one recording:
/// power with its mean, statistics text, current, power distribution,
/// cumulative energy, power rate of change, voltage and power vs current.
pub fn plot_single_analysis<P>(
    trace: &PowerTrace,
    stats: &PowerStats,
    battery: &BatteryEstimate,
    fout: P,
) -> PlotResult
where
    P: AsRef<Path>,
{
    let root = SVGBackend::new(&fout, (1800, 1350)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(
        &format!("{} mode - detailed power analysis", trace.label),
        (FONT, 34),
    )?;
    let (width, height) = body.dim_in_pixel();
    let (top, bottom) = body.split_vertically(height as i32 / 3);
    let (power_area, text_area) = top.split_horizontally(width as i32 * 2 / 3);
    let panels = bottom.split_evenly((2, 3));
    let color = trace.mode.color();

    let power_mw: Vec<(f64, f64)> = trace
        .time
        .iter()
        .zip(&trace.power)
        .map(|(t, p)| (*t, p * 1000.))
        .collect();
    line_panel(
        &power_area,
        "power time series",
        "time [s]",
        "power [mW]",
        &power_mw,
        color,
        Some(stats.avg_power_mw()),
    )?;
    text_panel(&text_area, &stats_lines(stats, battery))?;

    let current_ma: Vec<(f64, f64)> = trace
        .time
        .iter()
        .zip(&trace.current)
        .map(|(t, c)| (*t, c * 1000.))
        .collect();
    line_panel(
        &panels[0],
        "current",
        "time [s]",
        "current [mA]",
        &current_ma,
        color,
        None,
    )?;

    let values: Vec<f64> = power_mw.iter().map(|p| p.1).collect();
    histogram_panel(&panels[1], "power distribution", &values, 40, color)?;

    let energy: Vec<(f64, f64)> = trace
        .time
        .iter()
        .copied()
        .zip(cumulative_energy(&trace.time, &trace.power))
        .collect();
    line_panel(
        &panels[2],
        "cumulative energy",
        "time [s]",
        "energy [J]",
        &energy,
        color,
        None,
    )?;

    let rate: Vec<(f64, f64)> = power_rate(&trace.time, &trace.power)
        .into_iter()
        .map(|(t, r)| (t, r * 1000.))
        .collect();
    line_panel(
        &panels[3],
        "power rate of change",
        "time [s]",
        "rate [mW/s]",
        &rate,
        color,
        None,
    )?;

    let voltage: Vec<(f64, f64)> = trace
        .time
        .iter()
        .copied()
        .zip(trace.voltage.iter().copied())
        .collect();
    line_panel(
        &panels[4],
        "voltage stability",
        "time [s]",
        "voltage [V]",
        &voltage,
        color,
        None,
    )?;

    let scatter: Vec<(f64, f64)> = trace
        .current
        .iter()
        .zip(&trace.power)
        .map(|(c, p)| (c * 1000., p * 1000.))
        .collect();
    scatter_panel(
        &panels[5],
        "power vs current",
        "current [mA]",
        "power [mW]",
        &scatter,
        color,
    )?;

    root.present()?;
    Ok(())
}

/// Comparison of several recordings:
/// average power, battery life, power distribution,
/// power over the normalized recording time and, for the first four, power and its distribution.
pub fn plot_comparison<P>(
    traces: &[PowerTrace],
    results: &[(PowerStats, BatteryEstimate)],
    fout: P,
) -> PlotResult
where
    P: AsRef<Path>,
{
    let root = SVGBackend::new(&fout, (2000, 1600)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled("wireless mouse power by lighting mode", (FONT, 36))?;
    let quarter = body.dim_in_pixel().0 as i32 / 4;
    let rows = body.split_evenly((4, 1));
    let (power_area, rest) = rows[0].split_horizontally(quarter);
    let (battery_area, box_area) = rest.split_horizontally(quarter);

    let power_bars: Vec<(String, f64, RGBColor)> = results
        .iter()
        .map(|(s, _)| (s.label.clone(), s.avg_power_mw(), s.mode.color()))
        .collect();
    bar_panel(
        &power_area,
        "average power",
        "power [mW]",
        &power_bars,
        &|v: f64| format!("{:.1}", v),
    )?;

    let battery_bars: Vec<(String, f64, RGBColor)> = results
        .iter()
        .map(|(s, b)| (s.label.clone(), b.hours, s.mode.color()))
        .collect();
    let capacity = results.first().map(|(_, b)| b.capacity_mah).unwrap_or(0.);
    bar_panel(
        &battery_area,
        &format!("battery life ({:.0} mAh)", capacity),
        "hours",
        &battery_bars,
        &|v: f64| {
            if v.is_finite() {
                format!("{:.0}h", v)
            } else {
                "inf".to_string()
            }
        },
    )?;

    let boxes: Vec<(String, Vec<f64>, RGBColor)> = traces
        .iter()
        .map(|t| {
            let mw = t.power.iter().map(|p| p * 1000.).collect();
            (t.label.clone(), mw, t.mode.color())
        })
        .collect();
    box_panel(&box_area, "power distribution", "power [mW]", &boxes)?;

    overlay_panel(&rows[1], traces)?;

    let series_areas = rows[2].split_evenly((1, MAX_MODE_PANELS));
    let hist_areas = rows[3].split_evenly((1, MAX_MODE_PANELS));
    for (i, trace) in traces.iter().take(MAX_MODE_PANELS).enumerate() {
        let color = trace.mode.color();
        let power_mw: Vec<(f64, f64)> = trace
            .time
            .iter()
            .zip(&trace.power)
            .map(|(t, p)| (*t, p * 1000.))
            .collect();
        line_panel(
            &series_areas[i],
            &format!("{} power", trace.label),
            "time [s]",
            "power [mW]",
            &power_mw,
            color,
            None,
        )?;
        let values: Vec<f64> = power_mw.iter().map(|p| p.1).collect();
        histogram_panel(
            &hist_areas[i],
            &format!("{} distribution", trace.label),
            &values,
            30,
            color,
        )?;
    }

    root.present()?;
    Ok(())
}

fn stats_lines(stats: &PowerStats, battery: &BatteryEstimate) -> Vec<String> {
    let days = if battery.days.is_finite() {
        format!("{:.1} days", battery.days)
    } else {
        "unlimited".to_string()
    };
    vec![
        "summary".to_string(),
        String::new(),
        format!("average power: {:.2} mW", stats.avg_power_mw()),
        format!("maximum power: {:.2} mW", stats.max_power_mw()),
        format!("minimum power: {:.2} mW", stats.min_power_mw()),
        format!("standard deviation: {:.2} mW", stats.std_power_mw()),
        String::new(),
        format!("average current: {:.2} mA", stats.avg_current_ma()),
        format!("average voltage: {:.3} V", stats.voltage.mean),
        String::new(),
        format!("duration: {}", format_time_duration(stats.duration_s)),
        format!("data points: {}", stats.data_points),
        format!("total energy: {:.3} J", stats.total_energy_j),
        String::new(),
        format!("battery life ({:.0} mAh):", battery.capacity_mah),
        format!("{:.1} hours, {}", battery.hours, days),
    ]
}

fn text_panel<DB>(area: &DrawingArea<DB, Shift>, lines: &[String]) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let inner = area.margin(10, 10, 10, 10);
    inner.fill(&RGBColor(235, 235, 235))?;
    for (i, line) in lines.iter().enumerate() {
        inner.draw(&Text::new(
            line.as_str(),
            (15, 12 + i as i32 * 24),
            (FONT, 18).into_font(),
        ))?;
    }
    Ok(())
}

fn line_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[(f64, f64)],
    color: RGBColor,
    mean: Option<f64>,
) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (xmin, xmax) = min_and_max(series.iter().map(|p| &p.0)).unwrap_or((0., 1.));
    let (xmin, xmax) = padded_range(xmin, xmax, 0.);
    let (ymin, ymax) = min_and_max(series.iter().map(|p| &p.1)).unwrap_or((0., 1.));
    let (ymin, ymax) = padded_range(ymin, ymax, 0.1);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style((FONT, 14))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;
    chart.draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(1)))?;
    if let Some(m) = mean {
        chart
            .draw_series(LineSeries::new(
                vec![(xmin, m), (xmax, m)],
                RED.stroke_width(2),
            ))?
            .label(format!("mean: {:.2}", m))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        chart
            .configure_series_labels()
            .label_font((FONT, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn scatter_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
    color: RGBColor,
) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (xmin, xmax) = min_and_max(points.iter().map(|p| &p.0)).unwrap_or((0., 1.));
    let (xmin, xmax) = padded_range(xmin, xmax, 0.05);
    let (ymin, ymax) = min_and_max(points.iter().map(|p| &p.1)).unwrap_or((0., 1.));
    let (ymin, ymax) = padded_range(ymin, ymax, 0.05);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style((FONT, 14))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new(*p, 2, color.mix(0.6).filled())),
    )?;
    Ok(())
}

fn histogram_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    values: &[f64],
    bins: usize,
    color: RGBColor,
) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let hist = histogram(values, bins);
    let (xmin, xmax) = match (hist.first(), hist.last()) {
        (Some(first), Some(last)) => padded_range(first.0, last.1, 0.02),
        _ => (0., 1.),
    };
    let max_count = hist.iter().map(|h| h.2).max().unwrap_or(0).max(1);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(xmin..xmax, 0f64..max_count as f64 * 1.1)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style((FONT, 14))
        .x_desc("power [mW]")
        .y_desc("count")
        .draw()?;
    // a constant series has a zero-width bin, draw it over the whole axis
    let edges = |lo: f64, hi: f64| if hi > lo { (lo, hi) } else { (xmin, xmax) };
    chart.draw_series(hist.iter().map(|(lo, hi, c)| {
        let (lo, hi) = edges(*lo, *hi);
        Rectangle::new([(lo, 0.), (hi, *c as f64)], color.mix(0.7).filled())
    }))?;
    chart.draw_series(hist.iter().map(|(lo, hi, c)| {
        let (lo, hi) = edges(*lo, *hi);
        Rectangle::new([(lo, 0.), (hi, *c as f64)], BLACK.stroke_width(1))
    }))?;
    Ok(())
}

fn bar_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    bars: &[(String, f64, RGBColor)],
    value_fmt: &dyn Fn(f64) -> String,
) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = bars.len().max(1);
    let finite_max = bars
        .iter()
        .map(|b| b.1)
        .filter(|v| v.is_finite())
        .fold(0., f64::max);
    let ymax = if finite_max > 0. { finite_max * 1.25 } else { 1. };
    let labels: Vec<&str> = bars.iter().map(|b| b.0.as_str()).collect();
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..ymax)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style((FONT, 14))
        .x_labels(n)
        .x_label_formatter(&|x: &f64| category_label(&labels, *x))
        .y_desc(y_desc)
        .draw()?;
    let top = |v: f64| if v.is_finite() { v } else { ymax };
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v, c))| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.), (x + 0.35, top(*v))], c.mix(0.8).filled())
    }))?;
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v, _))| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.), (x + 0.35, top(*v))], BLACK.stroke_width(1))
    }))?;
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v, _))| {
        Text::new(
            value_fmt(*v),
            (i as f64 - 0.15, (top(*v) + ymax * 0.08).min(ymax)),
            (FONT, 14).into_font(),
        )
    }))?;
    Ok(())
}

fn box_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    boxes: &[(String, Vec<f64>, RGBColor)],
) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = boxes.len().max(1);
    let (ymin, ymax) = min_and_max(boxes.iter().flat_map(|b| b.1.iter())).unwrap_or((0., 1.));
    let (ymin, ymax) = padded_range(ymin, ymax, 0.1);
    let labels: Vec<&str> = boxes.iter().map(|b| b.0.as_str()).collect();
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), ymin..ymax)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style((FONT, 14))
        .x_labels(n)
        .x_label_formatter(&|x: &f64| category_label(&labels, *x))
        .y_desc(y_desc)
        .draw()?;
    for (i, (_, values, color)) in boxes.iter().enumerate() {
        let (q1, median, q3) = match quartiles(values, 1) {
            Ok(q) => q,
            Err(_) => continue,
        };
        let iqr = q3 - q1;
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let low = finite
            .clone()
            .filter(|v| *v >= q1 - 1.5 * iqr)
            .fold(q1, f64::min);
        let high = finite
            .clone()
            .filter(|v| *v <= q3 + 1.5 * iqr)
            .fold(q3, f64::max);
        let x = i as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, q1), (x + 0.3, q3)],
            color.mix(0.7).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, q1), (x + 0.3, q3)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(
            [
                vec![(x - 0.3, median), (x + 0.3, median)],
                vec![(x, q3), (x, high)],
                vec![(x, q1), (x, low)],
                vec![(x - 0.15, high), (x + 0.15, high)],
                vec![(x - 0.15, low), (x + 0.15, low)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
        )?;
        chart.draw_series(
            finite
                .filter(|v| *v < low || *v > high)
                .map(|v| Circle::new((x, v), 3, BLACK)),
        )?;
    }
    Ok(())
}

/// Power of all recordings over the 0-100 % progress of each recording.
fn overlay_panel<DB>(area: &DrawingArea<DB, Shift>, traces: &[PowerTrace]) -> PlotResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (ymin, ymax) = min_and_max(traces.iter().flat_map(|t| t.power.iter()))
        .map(|(lo, hi)| (lo * 1000., hi * 1000.))
        .unwrap_or((0., 1.));
    let (ymin, ymax) = padded_range(ymin, ymax, 0.1);
    let mut chart = ChartBuilder::on(area)
        .caption("power time series comparison", (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..100f64, ymin..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .label_style((FONT, 14))
        .x_desc("recording progress [%]")
        .y_desc("power [mW]")
        .draw()?;
    for trace in traces {
        let color = trace.mode.color();
        let points: Vec<(f64, f64)> = trace
            .normalized_time()
            .into_iter()
            .zip(trace.power.iter().map(|p| p * 1000.))
            .collect();
        chart
            .draw_series(LineSeries::new(points, color.mix(0.8).stroke_width(2)))?
            .label(trace.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 14))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// Name of the category drawn at integer x, empty elsewhere.
fn category_label(labels: &[&str], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0. {
        return String::new();
    }
    labels.get(i as usize).map(|s| s.to_string()).unwrap_or_default()
}
