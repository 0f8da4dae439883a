use crate::error::{PowerError, Result};
use crate::stats::PowerStats;
use crate::PowerTrace;
use plotly::common::{Marker, Mode as LineMode, Line, Title};
use plotly::layout::{Axis, GridPattern, Layout, LayoutGrid};
use plotly::{Bar, Plot, Scatter};
use std::path::Path;

fn hex(trace: &PowerTrace) -> String {
    let c = trace.mode.color();
    format!("#{:02X}{:02X}{:02X}", c.0, c.1, c.2)
}

/// Interactive comparison: power over the normalized recording time on top,
/// average power per recording below.
pub fn comparison_plot(traces: &[PowerTrace]) -> Plot {
    let mut plot = Plot::new();
    for trace in traces {
        let power_mw: Vec<f64> = trace.power.iter().map(|p| p * 1000.).collect();
        let series = Scatter::new(trace.normalized_time(), power_mw)
            .mode(LineMode::Lines)
            .name(&trace.label)
            .line(Line::new().color(hex(trace)))
            .x_axis("x")
            .y_axis("y");
        plot.add_trace(series);
    }
    for trace in traces {
        let avg_mw = PowerStats::compute(trace).avg_power_mw();
        let bar = Bar::new(vec![trace.label.clone()], vec![avg_mw])
            .name(&trace.label)
            .show_legend(false)
            .marker(Marker::new().color(hex(trace)))
            .x_axis("x2")
            .y_axis("y2");
        plot.add_trace(bar);
    }
    let layout = Layout::new()
        .title(Title::new("wireless mouse power by lighting mode"))
        .grid(
            LayoutGrid::new()
                .rows(2)
                .columns(1)
                .pattern(GridPattern::Independent),
        )
        .x_axis(Axis::new().title(Title::new("recording progress [%]")))
        .y_axis(Axis::new().title(Title::new("power [mW]")))
        .y_axis2(Axis::new().title(Title::new("average power [mW]")))
        .height(900);
    plot.set_layout(layout);
    plot
}

/// Write the interactive comparison to a standalone html file.
pub fn comparison_html<P>(traces: &[PowerTrace], fout: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = fout.as_ref();
    let html = comparison_plot(traces).to_html();
    std::fs::write(path, html).map_err(|e| PowerError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    #[test]
    fn html_contains_every_recording() {
        let dir = tempfile::tempdir().unwrap();
        let traces: Vec<PowerTrace> = [Mode::NoLight, Mode::Flash]
            .into_iter()
            .map(|m| {
                let mut tr = PowerTrace::new(3);
                tr.mode = m;
                tr.label = m.label().to_string();
                tr.time = vec![0., 1., 2.];
                tr.voltage = vec![3.7; 3];
                tr.current = vec![0.02; 3];
                tr.power = vec![0.074; 3];
                tr
            })
            .collect();
        let out = dir.path().join("comparison.html");
        comparison_html(&traces, &out).unwrap();
        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("No light"));
        assert!(html.contains("Flash"));
        assert!(html.contains("#2E8B57"));
    }
}
