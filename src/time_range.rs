use crate::error::{PowerError, Result};
use crate::stats::PowerStats;
use crate::PowerTrace;
use serde::{Deserialize, Serialize};

/// Time span covered by a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRangeInfo {
    pub min_time: f64,
    pub max_time: f64,
    pub total_duration: f64,
    pub data_points: usize,
    /// mean of the positive time steps, 0 for a single sample
    pub time_resolution: f64,
}

impl TimeRangeInfo {
    pub fn from_trace(trace: &PowerTrace) -> TimeRangeInfo {
        let steps: Vec<f64> = trace
            .time
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.)
            .collect();
        let time_resolution = if steps.is_empty() {
            0.
        } else {
            steps.iter().sum::<f64>() / steps.len() as f64
        };
        TimeRangeInfo {
            min_time: trace.start_time(),
            max_time: trace.end_time(),
            total_duration: trace.duration(),
            data_points: trace.len(),
            time_resolution,
        }
    }

    /// The window must be ordered, inside the recording,
    /// and span at least two sampling intervals.
    pub fn validate(&self, start: f64, end: f64) -> Result<()> {
        if !(start < end) {
            return Err(PowerError::InvalidRange(format!(
                "start ({:.3}s) must be before end ({:.3}s)",
                start, end
            )));
        }
        if start < self.min_time {
            return Err(PowerError::InvalidRange(format!(
                "start ({:.3}s) is before the first sample ({:.3}s)",
                start, self.min_time
            )));
        }
        if end > self.max_time {
            return Err(PowerError::InvalidRange(format!(
                "end ({:.3}s) is after the last sample ({:.3}s)",
                end, self.max_time
            )));
        }
        let min_duration = self.time_resolution * 2.;
        if end - start < min_duration {
            return Err(PowerError::InvalidRange(format!(
                "window too short, at least {:.6}s is required",
                min_duration
            )));
        }
        Ok(())
    }
}

/// Validate the window and take the samples inside it, bounds included.
pub fn filter(trace: &PowerTrace, start: f64, end: f64) -> Result<PowerTrace> {
    TimeRangeInfo::from_trace(trace).validate(start, end)?;
    let out = trace.slice_time(start, end);
    if out.is_empty() {
        return Err(PowerError::InvalidRange(format!(
            "no samples in [{:.3}s, {:.3}s]",
            start, end
        )));
    }
    Ok(out)
}

/// Statistics of a time window compared to the whole recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePreview {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub data_points: usize,
    pub total_data_points: usize,
    pub data_percentage: f64,
    pub stats: PowerStats,
}

pub fn preview(trace: &PowerTrace, start: f64, end: f64) -> Result<RangePreview> {
    let window = filter(trace, start, end)?;
    Ok(RangePreview {
        start_time: start,
        end_time: end,
        duration: end - start,
        data_points: window.len(),
        total_data_points: trace.len(),
        data_percentage: window.len() as f64 / trace.len() as f64 * 100.,
        stats: PowerStats::compute(&window),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, dt: f64) -> PowerTrace {
        let mut tr = PowerTrace::new(n);
        for i in 0..n {
            tr.time.push(i as f64 * dt);
            tr.voltage.push(3.7);
            tr.current.push(0.02);
            tr.power.push(0.05 + i as f64 * 0.001);
        }
        tr
    }

    #[test]
    fn info_of_trace() {
        let info = TimeRangeInfo::from_trace(&ramp(11, 0.5));
        assert_eq!(info.min_time, 0.);
        assert_eq!(info.max_time, 5.);
        assert_eq!(info.total_duration, 5.);
        assert_eq!(info.data_points, 11);
        assert!((info.time_resolution - 0.5).abs() < 1e-12);
        assert_eq!(TimeRangeInfo::from_trace(&ramp(1, 0.5)).time_resolution, 0.);
    }

    #[test]
    fn invalid_windows() {
        let info = TimeRangeInfo::from_trace(&ramp(11, 0.5));
        assert!(info.validate(2., 2.).is_err());
        assert!(info.validate(3., 2.).is_err());
        assert!(info.validate(-1., 2.).is_err());
        assert!(info.validate(1., 6.).is_err());
        assert!(info.validate(1., 1.5).is_err());
        assert!(info.validate(1., 2.).is_ok());
    }

    #[test]
    fn filter_is_inclusive() {
        let tr = ramp(11, 0.5);
        let w = filter(&tr, 1., 2.).unwrap();
        assert_eq!(w.time, vec![1., 1.5, 2.]);
        assert!(matches!(
            filter(&tr, 4., 9.),
            Err(PowerError::InvalidRange(_))
        ));
    }

    #[test]
    fn preview_of_window() {
        let tr = ramp(11, 0.5);
        let p = preview(&tr, 0., 2.).unwrap();
        assert_eq!(p.data_points, 5);
        assert_eq!(p.total_data_points, 11);
        assert!((p.data_percentage - 500. / 11.).abs() < 1e-9);
        assert!((p.duration - 2.).abs() < 1e-12);
        assert!((p.stats.avg_power_mw() - 52.).abs() < 1e-9);
    }
}
