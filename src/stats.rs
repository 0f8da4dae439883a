use crate::battery::BatteryEstimate;
use crate::mode::Mode;
use crate::PowerTrace;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// sample standard deviation, n - 1 denominator
    pub std: f64,
}

impl ColumnStats {
    /// Compute statistics from the finite values, None when there are none.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }
        let count = vals.len();
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = vals.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            0.
        } else {
            let ss = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        };
        Some(ColumnStats {
            count,
            mean,
            max,
            min,
            std,
        })
    }

    fn or_zero(values: &[f64]) -> Self {
        Self::compute(values).unwrap_or(ColumnStats {
            count: 0,
            mean: 0.,
            max: 0.,
            min: 0.,
            std: 0.,
        })
    }
}

/// Summary of one power trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerStats {
    pub mode: Mode,
    pub label: String,
    pub name: String,
    pub duration_s: f64,
    pub data_points: usize,
    pub voltage: ColumnStats,
    pub current: ColumnStats,
    pub power: ColumnStats,
    pub total_energy_j: f64,
    /// coefficient of variation of the power, std / mean
    pub cv_power: f64,
}

impl PowerStats {
    pub fn compute(trace: &PowerTrace) -> PowerStats {
        let power = ColumnStats::or_zero(&trace.power);
        let cv_power = if power.mean > 0. {
            power.std / power.mean
        } else {
            0.
        };
        PowerStats {
            mode: trace.mode,
            label: trace.label.clone(),
            name: trace.name.clone(),
            duration_s: trace.duration(),
            data_points: trace.len(),
            voltage: ColumnStats::or_zero(&trace.voltage),
            current: ColumnStats::or_zero(&trace.current),
            power,
            total_energy_j: trapezoid(&trace.time, &trace.power),
            cv_power,
        }
    }

    pub fn avg_power_mw(&self) -> f64 {
        self.power.mean * 1000.
    }

    pub fn max_power_mw(&self) -> f64 {
        self.power.max * 1000.
    }

    pub fn min_power_mw(&self) -> f64 {
        self.power.min * 1000.
    }

    pub fn std_power_mw(&self) -> f64 {
        self.power.std * 1000.
    }

    pub fn avg_current_ma(&self) -> f64 {
        self.current.mean * 1000.
    }
}

/// Integral of y over x with the trapezoidal rule.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| (xw[1] - xw[0]) * (yw[0] + yw[1]) / 2.)
        .sum()
}

/// Running trapezoidal integral of the power, starting at 0 J.
/// The last value equals the total energy.
pub fn cumulative_energy(time: &[f64], power: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(time.len());
    if time.is_empty() {
        return out;
    }
    let mut acc = 0.;
    out.push(acc);
    for (tw, pw) in time.windows(2).zip(power.windows(2)) {
        acc += (tw[1] - tw[0]) * (pw[0] + pw[1]) / 2.;
        out.push(acc);
    }
    out
}

/// Rate of change of the power, (t, dP/dt) at the end of each interval.
/// Intervals with no time step are skipped.
pub fn power_rate(time: &[f64], power: &[f64]) -> Vec<(f64, f64)> {
    time.windows(2)
        .zip(power.windows(2))
        .filter(|(tw, _)| tw[1] - tw[0] > 0.)
        .map(|(tw, pw)| (tw[1], (pw[1] - pw[0]) / (tw[1] - tw[0])))
        .collect()
}

/// One entry of a multi-trace comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub label: String,
    pub avg_power_mw: f64,
    /// increase of the average power over the lowest one, in percent
    pub power_increase_percent: f64,
}

/// Relative comparison of several traces.
/// The baseline is the lowest average power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStats {
    pub entries: Vec<ComparisonEntry>,
    pub highest: String,
    pub highest_mw: f64,
    pub lowest: String,
    pub lowest_mw: f64,
    pub difference_mw: f64,
    pub difference_percent: f64,
}

impl ComparisonStats {
    /// None with less than two traces, there is nothing to compare.
    pub fn compute(stats: &[PowerStats]) -> Option<ComparisonStats> {
        if stats.len() < 2 {
            return None;
        }
        let by_power = |a: &&PowerStats, b: &&PowerStats| a.power.mean.total_cmp(&b.power.mean);
        let highest = stats.iter().max_by(by_power)?;
        let lowest = stats.iter().min_by(by_power)?;
        let baseline = lowest.power.mean;
        let entries = stats
            .iter()
            .map(|s| ComparisonEntry {
                label: s.label.clone(),
                avg_power_mw: s.avg_power_mw(),
                power_increase_percent: if baseline > 0. {
                    (s.power.mean - baseline) / baseline * 100.
                } else {
                    0.
                },
            })
            .collect();
        let difference_mw = highest.avg_power_mw() - lowest.avg_power_mw();
        let difference_percent = if baseline > 0. {
            difference_mw / lowest.avg_power_mw() * 100.
        } else {
            0.
        };
        Some(ComparisonStats {
            entries,
            highest: highest.label.clone(),
            highest_mw: highest.avg_power_mw(),
            lowest: lowest.label.clone(),
            lowest_mw: lowest.avg_power_mw(),
            difference_mw,
            difference_percent,
        })
    }

    /// Increase of the trace at `index` of the compared slice.
    pub fn increase_at(&self, index: usize) -> Option<f64> {
        self.entries.get(index).map(|e| e.power_increase_percent)
    }
}

/// min, max, mean, population std and range of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub range: f64,
}

impl Spread {
    /// Over the finite values only, None when there are none.
    pub fn compute(values: &[f64]) -> Option<Spread> {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        Some(Spread {
            min,
            max,
            mean,
            std,
            range: max - min,
        })
    }
}

/// Spread of average power, battery life and duration across the analysed traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub count: usize,
    pub modes: Vec<Mode>,
    pub files: Vec<String>,
    pub power_mw: Spread,
    /// None when every estimate is unlimited
    pub battery_hours: Option<Spread>,
    pub duration_s: Spread,
}

impl StatisticalSummary {
    pub fn compute(results: &[(PowerStats, BatteryEstimate)]) -> Option<StatisticalSummary> {
        let powers: Vec<f64> = results.iter().map(|(s, _)| s.avg_power_mw()).collect();
        let batteries: Vec<f64> = results.iter().map(|(_, b)| b.hours).collect();
        let durations: Vec<f64> = results.iter().map(|(s, _)| s.duration_s).collect();
        let mut modes: Vec<Mode> = results.iter().map(|(s, _)| s.mode).collect();
        modes.sort();
        modes.dedup();
        let mut files: Vec<String> = results.iter().map(|(s, _)| s.name.clone()).collect();
        files.sort();
        files.dedup();
        Some(StatisticalSummary {
            count: results.len(),
            modes,
            files,
            power_mw: Spread::compute(&powers)?,
            battery_hours: Spread::compute(&batteries),
            duration_s: Spread::compute(&durations)?,
        })
    }
}

/// Plain-text advice on which setting to prefer.
pub fn recommendations(results: &[(PowerStats, BatteryEstimate)]) -> Vec<String> {
    if results.len() < 2 {
        return vec!["at least two results are needed for a comparison".to_string()];
    }
    let mut out = Vec::new();
    let best_power = results
        .iter()
        .min_by(|a, b| a.0.power.mean.total_cmp(&b.0.power.mean));
    let worst_power = results
        .iter()
        .max_by(|a, b| a.0.power.mean.total_cmp(&b.0.power.mean));
    let best_battery = results
        .iter()
        .max_by(|a, b| a.1.hours.total_cmp(&b.1.hours));
    let (Some(best_power), Some(worst_power), Some(best_battery)) =
        (best_power, worst_power, best_battery)
    else {
        return out;
    };
    let min_mw = best_power.0.avg_power_mw();
    let max_mw = worst_power.0.avg_power_mw();
    out.push(format!(
        "lowest power: {} ({:.2} mW)",
        best_power.0.label, min_mw
    ));
    out.push(format!(
        "longest battery life: {} ({:.1} h)",
        best_battery.0.label, best_battery.1.hours
    ));
    if !std::ptr::eq(worst_power, best_power) {
        out.push(format!(
            "highest power: {} ({:.2} mW)",
            worst_power.0.label, max_mw
        ));
    }
    let diff = max_mw - min_mw;
    let diff_pct = if min_mw > 0. { diff / min_mw * 100. } else { 0. };
    let level = if diff_pct > 50. {
        "significant"
    } else if diff_pct > 20. {
        "moderate"
    } else {
        "small"
    };
    out.push(format!(
        "{} power spread: {:.2} mW between highest and lowest ({:.1}%)",
        level, diff, diff_pct
    ));
    if std::ptr::eq(best_power, best_battery) {
        out.push(format!(
            "suggestion: {} is best for both power and battery life",
            best_power.0.label
        ));
    } else {
        out.push(format!(
            "suggestion: pick {} for low power or {} for long battery life",
            best_power.0.label, best_battery.0.label
        ));
    }
    out
}
