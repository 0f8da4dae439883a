use crate::battery::{BatteryConfig, BatteryEstimate};
use crate::error::{PowerError, Result};
use crate::mode::Mode;
use crate::stats::{recommendations, ComparisonStats, PowerStats, StatisticalSummary};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

/// One line of the exported summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub mode: Mode,
    pub file: String,
    pub duration_s: f64,
    pub data_points: usize,
    pub avg_power_mw: f64,
    pub max_power_mw: f64,
    pub min_power_mw: f64,
    pub std_power_mw: f64,
    pub avg_current_ma: f64,
    pub avg_voltage_v: f64,
    pub total_energy_j: f64,
    #[serde(with = "crate::battery::unlimited")]
    pub battery_hours: f64,
    #[serde(with = "crate::battery::unlimited")]
    pub battery_days: f64,
    pub power_increase_percent: Option<f64>,
}

impl SummaryRow {
    pub fn new(stats: &PowerStats, battery: &BatteryEstimate, increase: Option<f64>) -> Self {
        SummaryRow {
            label: stats.label.clone(),
            mode: stats.mode,
            file: stats.name.clone(),
            duration_s: stats.duration_s,
            data_points: stats.data_points,
            avg_power_mw: stats.avg_power_mw(),
            max_power_mw: stats.max_power_mw(),
            min_power_mw: stats.min_power_mw(),
            std_power_mw: stats.std_power_mw(),
            avg_current_ma: stats.avg_current_ma(),
            avg_voltage_v: stats.voltage.mean,
            total_energy_j: stats.total_energy_j,
            battery_hours: battery.hours,
            battery_days: battery.days,
            power_increase_percent: increase,
        }
    }
}

/// Everything one analysis run produced, as exported to json and markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Local>,
    pub battery: BatteryConfig,
    /// analysed window, None for whole recordings
    pub time_window: Option<(f64, f64)>,
    pub rows: Vec<SummaryRow>,
    pub comparison: Option<ComparisonStats>,
    pub summary: Option<StatisticalSummary>,
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    pub fn new(
        battery: BatteryConfig,
        time_window: Option<(f64, f64)>,
        results: &[(PowerStats, BatteryEstimate)],
    ) -> AnalysisReport {
        let stats: Vec<PowerStats> = results.iter().map(|(s, _)| s.clone()).collect();
        let comparison = ComparisonStats::compute(&stats);
        let rows = results
            .iter()
            .enumerate()
            .map(|(i, (s, b))| {
                let increase = comparison.as_ref().and_then(|c| c.increase_at(i));
                SummaryRow::new(s, b, increase)
            })
            .collect();
        AnalysisReport {
            generated_at: Local::now(),
            battery,
            time_window,
            rows,
            comparison,
            summary: StatisticalSummary::compute(results),
            recommendations: if results.len() > 1 {
                recommendations(results)
            } else {
                Vec::new()
            },
        }
    }
}

/// Write the summary rows as csv, one recording per line.
pub fn write_csv_report<P>(rows: &[SummaryRow], fout: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = fout.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| PowerError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| PowerError::csv(path, e))?;
    }
    writer.flush().map_err(|e| PowerError::io(path, e))
}

pub fn read_csv_report<P>(fin: P) -> Result<Vec<SummaryRow>>
where
    P: AsRef<Path>,
{
    let path = fin.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| PowerError::csv(path, e))?;
    reader
        .deserialize()
        .map(|r| r.map_err(|e| PowerError::csv(path, e)))
        .collect()
}

pub fn write_json_report<P>(report: &AnalysisReport, fout: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = fout.as_ref();
    let file = File::create(path).map_err(|e| PowerError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush().map_err(|e| PowerError::io(path, e))
}

pub fn read_json_report<P>(fin: P) -> Result<AnalysisReport>
where
    P: AsRef<Path>,
{
    let path = fin.as_ref();
    let file = File::open(path).map_err(|e| PowerError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn hours(h: f64) -> String {
    if h.is_finite() {
        format!("{:.1} h", h)
    } else {
        "unlimited".to_string()
    }
}

/// Markdown version of the report, written next to the charts.
pub fn markdown_report(report: &AnalysisReport) -> String {
    let mut md = String::new();
    // writing to a String does not fail
    let _ = write_markdown(&mut md, report);
    md
}

fn write_markdown(md: &mut String, report: &AnalysisReport) -> fmt::Result {
    writeln!(md, "# Wireless mouse power analysis\n")?;
    writeln!(
        md,
        "**Generated**: {}  ",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(md, "**Recordings**: {}  ", report.rows.len())?;
    writeln!(
        md,
        "**Battery**: {:.0} mAh, {:.2} V  ",
        report.battery.capacity_mah, report.battery.voltage
    )?;
    if let Some((start, end)) = report.time_window {
        writeln!(md, "**Time window**: {:.3}s - {:.3}s  ", start, end)?;
    }
    if report.rows.is_empty() {
        return writeln!(md, "\nNo results.");
    }
    writeln!(md, "\n## Results")?;
    for (i, row) in report.rows.iter().enumerate() {
        writeln!(md, "\n### {}. {}\n", i + 1, row.label)?;
        writeln!(md, "- **Mode**: {}", row.mode.label())?;
        writeln!(md, "- **File**: {}", row.file)?;
        writeln!(md, "- **Duration**: {:.3} s", row.duration_s)?;
        writeln!(md, "- **Data points**: {}", row.data_points)?;
        writeln!(md, "- **Average power**: {:.2} mW", row.avg_power_mw)?;
        writeln!(md, "- **Maximum power**: {:.2} mW", row.max_power_mw)?;
        writeln!(md, "- **Average current**: {:.2} mA", row.avg_current_ma)?;
        writeln!(md, "- **Total energy**: {:.3} J", row.total_energy_j)?;
        writeln!(md, "- **Battery life**: {}", hours(row.battery_hours))?;
        if let Some(inc) = row.power_increase_percent {
            writeln!(md, "- **Increase over lowest**: {:.1} %", inc)?;
        }
    }
    if let (Some(cmp), Some(summary)) = (&report.comparison, &report.summary) {
        writeln!(md, "\n## Comparison\n")?;
        writeln!(
            md,
            "- **Highest average power**: {} ({:.2} mW)",
            cmp.highest, cmp.highest_mw
        )?;
        writeln!(
            md,
            "- **Lowest average power**: {} ({:.2} mW)",
            cmp.lowest, cmp.lowest_mw
        )?;
        writeln!(
            md,
            "- **Difference**: {:.2} mW ({:.1} %)",
            cmp.difference_mw, cmp.difference_percent
        )?;
        writeln!(md, "- **Mean of averages**: {:.2} mW", summary.power_mw.mean)?;
        writeln!(md, "- **Standard deviation**: {:.2} mW", summary.power_mw.std)?;
    }
    if !report.recommendations.is_empty() {
        writeln!(md, "\n## Recommendations\n")?;
        for r in &report.recommendations {
            writeln!(md, "- {}", r)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PowerTrace;

    fn results() -> Vec<(PowerStats, BatteryEstimate)> {
        let cfg = BatteryConfig::default();
        [(Mode::NoLight, 0.04), (Mode::ColorCycle, 0.09)]
            .into_iter()
            .map(|(m, p)| {
                let mut tr = PowerTrace::new(3);
                tr.mode = m;
                tr.label = m.label().to_string();
                tr.name = format!("{}_rec", m);
                tr.time = vec![0., 1., 2.];
                tr.voltage = vec![3.7; 3];
                tr.current = vec![p / 3.7; 3];
                tr.power = vec![p; 3];
                let s = PowerStats::compute(&tr);
                let b = BatteryEstimate::estimate(&cfg, s.current.mean, s.power.mean);
                (s, b)
            })
            .collect()
    }

    #[test]
    fn report_rows_carry_increase() {
        let report = AnalysisReport::new(BatteryConfig::default(), None, &results());
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].power_increase_percent, Some(0.));
        let inc = report.rows[1].power_increase_percent.unwrap();
        assert!((inc - 125.).abs() < 1e-9);
        assert_eq!(report.recommendations.len(), 5);

        let single = AnalysisReport::new(BatteryConfig::default(), None, &results()[..1]);
        assert_eq!(single.rows[0].power_increase_percent, None);
        assert!(single.comparison.is_none());
        assert!(single.recommendations.is_empty());
    }

    #[test]
    fn csv_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let report = AnalysisReport::new(BatteryConfig::default(), None, &results());
        let out = dir.path().join("summary.csv");
        write_csv_report(&report.rows, &out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("label,mode,file,duration_s"));
        assert_eq!(read_csv_report(&out).unwrap(), report.rows);
    }

    #[test]
    fn json_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let report = AnalysisReport::new(BatteryConfig::default(), Some((0., 2.)), &results());
        let out = dir.path().join("report.json");
        write_json_report(&report, &out).unwrap();
        let back = read_json_report(&out).unwrap();
        assert_eq!(back.rows, report.rows);
        assert_eq!(back.time_window, Some((0., 2.)));
        assert_eq!(back.battery, report.battery);
    }

    #[test]
    fn json_report_with_unlimited_battery() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = results();
        let mut idle = PowerTrace::new(3);
        idle.name = "idle".to_string();
        idle.label = "idle".to_string();
        idle.time = vec![0., 1., 2.];
        idle.voltage = vec![3.7; 3];
        idle.current = vec![0.; 3];
        idle.power = vec![0.; 3];
        let s = PowerStats::compute(&idle);
        let b = BatteryEstimate::estimate(&BatteryConfig::default(), 0., 0.);
        results.push((s, b));
        let report = AnalysisReport::new(BatteryConfig::default(), None, &results);
        let spread = report.summary.as_ref().unwrap().battery_hours.unwrap();
        assert!(spread.std.is_finite());
        let out = dir.path().join("report.json");
        write_json_report(&report, &out).unwrap();
        let back = read_json_report(&out).unwrap();
        assert_eq!(back.rows[2].battery_hours, f64::INFINITY);
        assert_eq!(back.rows, report.rows);
        assert!(markdown_report(&back).contains("**Battery life**: unlimited"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn json_report_reports_failed_flush() {
        let report = AnalysisReport::new(BatteryConfig::default(), None, &results());
        assert!(matches!(
            write_json_report(&report, "/dev/full"),
            Err(PowerError::Io { .. })
        ));
    }

    #[test]
    fn markdown_sections() {
        let report = AnalysisReport::new(BatteryConfig::default(), Some((0., 2.)), &results());
        let md = markdown_report(&report);
        assert!(md.starts_with("# Wireless mouse power analysis"));
        assert!(md.contains("### 1. No light"));
        assert!(md.contains("### 2. Color cycle"));
        assert!(md.contains("## Comparison"));
        assert!(md.contains("## Recommendations"));
        assert!(md.contains("**Time window**: 0.000s - 2.000s"));

        let empty = AnalysisReport::new(BatteryConfig::default(), None, &[]);
        assert!(markdown_report(&empty).contains("No results."));
    }
}
