use super::VERSION;
use crate::battery::{BatteryConfig, BatteryEstimate, DEFAULT_CAPACITY_MAH, DEFAULT_VOLTAGE};
use crate::error::{PowerError, Result};
use crate::stats::{ComparisonStats, PowerStats};
use crate::{disambiguate_labels, html, plot, report, time_range, validate_csv_format, PowerTrace};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT: &str = "./analysis_results";
pub const DEFAULT_DATABASE: &str = "./database";

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeConfig {
    pub files: Vec<PathBuf>,
    pub directory: Option<PathBuf>,
    pub output: PathBuf,
    pub charts: bool,
    pub single_only: bool,
    pub comparison_only: bool,
    pub html: bool,
    pub battery: BatteryConfig,
    pub time_window: Option<(f64, f64)>,
    pub verbose: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        AnalyzeConfig {
            files: Vec::new(),
            directory: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            charts: true,
            single_only: false,
            comparison_only: false,
            html: false,
            battery: BatteryConfig::default(),
            time_window: None,
            verbose: false,
        }
    }
}

pub fn command() -> Command {
    let arg_files = Arg::new("files")
        .help("csv files to analyse")
        .num_args(0..)
        .value_parser(value_parser!(PathBuf));
    let arg_directory = Arg::new("directory")
        .help("directory with the csv files to analyse")
        .short('d')
        .long("directory")
        .num_args(1)
        .value_parser(value_parser!(PathBuf));
    let arg_output = Arg::new("output")
        .help("output directory for charts and reports")
        .short('o')
        .long("output")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(DEFAULT_OUTPUT);
    let arg_no_charts = Arg::new("no_charts")
        .help("do not render the charts")
        .long("no-charts")
        .action(ArgAction::SetTrue);
    let arg_single_only = Arg::new("single_only")
        .help("only the single-recording analysis")
        .long("single-only")
        .action(ArgAction::SetTrue)
        .conflicts_with("comparison_only");
    let arg_comparison_only = Arg::new("comparison_only")
        .help("only the comparison of the recordings")
        .long("comparison-only")
        .action(ArgAction::SetTrue);
    let arg_quick = Arg::new("quick")
        .help("analyse all the csv files in ./database")
        .long("quick")
        .action(ArgAction::SetTrue);
    let arg_battery_capacity = Arg::new("battery_capacity")
        .help("battery capacity in mAh")
        .long("battery-capacity")
        .num_args(1)
        .value_parser(value_parser!(f64))
        .default_value("1000");
    let arg_battery_voltage = Arg::new("battery_voltage")
        .help("battery voltage in V")
        .long("battery-voltage")
        .num_args(1)
        .value_parser(value_parser!(f64))
        .default_value("3.7");
    let arg_start = Arg::new("start")
        .help("start of the analysed time window, in seconds")
        .long("start")
        .num_args(1)
        .value_parser(value_parser!(f64))
        .requires("end");
    let arg_end = Arg::new("end")
        .help("end of the analysed time window, in seconds")
        .long("end")
        .num_args(1)
        .value_parser(value_parser!(f64))
        .requires("start");
    let arg_html = Arg::new("html")
        .help("also write an interactive html comparison")
        .long("html")
        .action(ArgAction::SetTrue);
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("power_analyze")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to analyse and compare the power traces of a wireless mouse")
        .after_help(concat!(
            "examples:\n",
            "  power_analyze file1.csv file2.csv\n",
            "  power_analyze -d ./database -o ./results\n",
            "  power_analyze --quick",
        ))
        .arg(arg_files)
        .arg(arg_directory)
        .arg(arg_output)
        .arg(arg_no_charts)
        .arg(arg_single_only)
        .arg(arg_comparison_only)
        .arg(arg_quick)
        .arg(arg_battery_capacity)
        .arg(arg_battery_voltage)
        .arg(arg_start)
        .arg(arg_end)
        .arg(arg_html)
        .arg(arg_verbose)
}

/// Takes the CLI arguments that control the analysis.
/// Defaults are always Some, so they can be safely unwrapped.
pub fn config_from_matches(cli_args: &ArgMatches) -> Result<AnalyzeConfig> {
    let files: Vec<PathBuf> = cli_args
        .get_many::<PathBuf>("files")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let quick = cli_args.get_flag("quick");
    let directory = if quick {
        Some(PathBuf::from(DEFAULT_DATABASE))
    } else {
        cli_args.get_one::<PathBuf>("directory").cloned()
    };
    let output = if quick {
        PathBuf::from(DEFAULT_OUTPUT)
    } else {
        cli_args
            .get_one::<PathBuf>("output")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    };
    let battery = BatteryConfig::new(
        *cli_args
            .get_one::<f64>("battery_capacity")
            .unwrap_or(&DEFAULT_CAPACITY_MAH),
        *cli_args
            .get_one::<f64>("battery_voltage")
            .unwrap_or(&DEFAULT_VOLTAGE),
    )?;
    let time_window = match (
        cli_args.get_one::<f64>("start"),
        cli_args.get_one::<f64>("end"),
    ) {
        (Some(s), Some(e)) => Some((*s, *e)),
        _ => None,
    };
    Ok(AnalyzeConfig {
        files,
        directory,
        output,
        charts: !cli_args.get_flag("no_charts"),
        single_only: cli_args.get_flag("single_only"),
        comparison_only: cli_args.get_flag("comparison_only"),
        html: cli_args.get_flag("html"),
        battery,
        time_window,
        verbose: cli_args.get_flag("verbose"),
    })
}

pub fn parse_cli() -> Result<AnalyzeConfig> {
    config_from_matches(&command().get_matches())
}

fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| PowerError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .filter(|p| {
            let ok = validate_csv_format(p);
            if !ok {
                warn!("skipping {}, not a power recording", p.display());
            }
            ok
        })
        .collect();
    found.sort();
    Ok(found)
}

/// Files from the directory first, then the explicit ones.
/// Missing explicit files are skipped with a warning,
/// with neither given ./database is used when it exists.
/// A file reached twice is analysed once.
pub fn collect_file_paths(config: &AnalyzeConfig) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    if let Some(dir) = &config.directory {
        let found = csv_files_in(dir)?;
        if found.is_empty() {
            warn!("no csv file in {}", dir.display());
        } else {
            debug!("found {} csv files in {}", found.len(), dir.display());
        }
        paths.extend(found);
    }
    for f in &config.files {
        if f.is_file() {
            paths.push(f.clone());
        } else {
            warn!("file not found: {}", f.display());
        }
    }
    if paths.is_empty() && config.directory.is_none() && config.files.is_empty() {
        let database = Path::new(DEFAULT_DATABASE);
        if database.is_dir() {
            info!("using the default directory {}", database.display());
            paths = csv_files_in(database)?;
        }
    }
    let mut seen: HashSet<PathBuf> = HashSet::new();
    paths.retain(|p| {
        let key = p.canonicalize().unwrap_or_else(|_| p.clone());
        let first = seen.insert(key);
        if !first {
            debug!("{} already selected", p.display());
        }
        first
    });
    Ok(paths)
}

/// Load all the files in parallel, keeping the input order.
/// Files that cannot be loaded are reported and skipped.
pub fn load_traces(paths: &[PathBuf]) -> Vec<PowerTrace> {
    let loaded: Vec<Result<PowerTrace>> = paths
        .par_iter()
        .map(|p| PowerTrace::from_csv(p, None))
        .collect();
    paths
        .iter()
        .zip(loaded)
        .filter_map(|(p, r)| match r {
            Ok(tr) => {
                info!("loaded {} as {} mode, {} samples", p.display(), tr.mode.label(), tr.len());
                Some(tr)
            }
            Err(e) => {
                warn!("could not load {}: {}", p.display(), e);
                None
            }
        })
        .collect()
}

/// Restrict every trace to the window, dropping the ones it does not fit.
pub fn apply_time_window(traces: Vec<PowerTrace>, start: f64, end: f64) -> Vec<PowerTrace> {
    traces
        .into_iter()
        .filter_map(|tr| match time_range::filter(&tr, start, end) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("{}: {}", tr.name, e);
                None
            }
        })
        .collect()
}

/// File name friendly version of a label.
pub fn file_stem_for(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// One file stem per label, a stem taken by an earlier label gets the position appended.
pub fn unique_file_stems(labels: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let stem = file_stem_for(label);
            let stem = if taken.contains(&stem) {
                format!("{}_{}", stem, i + 1)
            } else {
                stem
            };
            taken.insert(stem.clone());
            stem
        })
        .collect()
}

/// Summary to stdout, the highest consumer first.
pub fn print_summary(results: &[(PowerStats, BatteryEstimate)]) {
    println!("\n=== analysis summary ===");
    let mut sorted: Vec<&(PowerStats, BatteryEstimate)> = results.iter().collect();
    sorted.sort_by(|a, b| b.0.power.mean.total_cmp(&a.0.power.mean));
    for (s, b) in sorted {
        println!("\n{}:", s.label);
        println!("  average power: {:.2} mW", s.avg_power_mw());
        println!("  duration: {:.1} s", s.duration_s);
        println!("  data points: {}", s.data_points);
        println!(
            "  battery life: {:.1} hours ({:.1} days)",
            b.hours, b.days
        );
        println!("  battery life by energy: {:.1} hours", b.hours_by_energy);
    }
    let stats: Vec<PowerStats> = results.iter().map(|(s, _)| s.clone()).collect();
    if let Some(c) = ComparisonStats::compute(&stats) {
        println!("\ncomparison:");
        println!("  highest power: {} ({:.2} mW)", c.highest, c.highest_mw);
        println!("  lowest power: {} ({:.2} mW)", c.lowest, c.lowest_mw);
        println!(
            "  difference: {:.2} mW ({:.1}%)",
            c.difference_mw, c.difference_percent
        );
    }
}

fn plot_err(e: Box<dyn std::error::Error>) -> PowerError {
    PowerError::Plot(e.to_string())
}

/// Load, summarise, plot and export.
/// Returns the files written to the output directory.
pub fn run(config: &AnalyzeConfig) -> Result<Vec<PathBuf>> {
    info!("=== wireless mouse power analysis ===");
    let paths = collect_file_paths(config)?;
    if paths.is_empty() {
        return Err(PowerError::NoInput);
    }
    debug!("analysing {} files into {}", paths.len(), config.output.display());
    debug!(
        "battery {} mAh, {} V",
        config.battery.capacity_mah, config.battery.voltage
    );

    let mut traces = load_traces(&paths);
    if let Some((start, end)) = config.time_window {
        info!("restricting the analysis to {:.3}s - {:.3}s", start, end);
        traces = apply_time_window(traces, start, end);
    }
    if traces.is_empty() {
        return Err(PowerError::NoInput);
    }
    disambiguate_labels(&mut traces);

    let results: Vec<(PowerStats, BatteryEstimate)> = traces
        .iter()
        .map(|tr| {
            let s = PowerStats::compute(tr);
            let b = BatteryEstimate::estimate(&config.battery, s.current.mean, s.power.mean);
            (s, b)
        })
        .collect();
    print_summary(&results);

    std::fs::create_dir_all(&config.output).map_err(|e| PowerError::io(&config.output, e))?;
    let mut generated: Vec<PathBuf> = Vec::new();

    if config.charts {
        if !config.comparison_only || traces.len() == 1 {
            debug!("rendering the single-recording charts");
            let labels: Vec<&str> = traces.iter().map(|t| t.label.as_str()).collect();
            let stems = unique_file_stems(&labels);
            let singles: Vec<Result<PathBuf>> = traces
                .par_iter()
                .zip(results.par_iter())
                .zip(stems.par_iter())
                .map(|((tr, (s, b)), stem)| {
                    let fout = config.output.join(format!("{}_detailed_analysis.svg", stem));
                    plot::plot_single_analysis(tr, s, b, &fout).map_err(plot_err)?;
                    Ok(fout)
                })
                .collect();
            for r in singles {
                generated.push(r?);
            }
        }
        if !config.single_only && traces.len() > 1 {
            debug!("rendering the comparison chart");
            let fout = config.output.join("comprehensive_comparison.svg");
            plot::plot_comparison(&traces, &results, &fout).map_err(plot_err)?;
            generated.push(fout);
        }
    }
    if config.html {
        let fout = config.output.join("comparison.html");
        html::comparison_html(&traces, &fout)?;
        generated.push(fout);
    }

    let analysis = report::AnalysisReport::new(config.battery, config.time_window, &results);
    let csv_out = config.output.join("summary.csv");
    report::write_csv_report(&analysis.rows, &csv_out)?;
    generated.push(csv_out);
    let json_out = config.output.join("report.json");
    report::write_json_report(&analysis, &json_out)?;
    generated.push(json_out);
    let md_out = config.output.join("report.md");
    std::fs::write(&md_out, report::markdown_report(&analysis))
        .map_err(|e| PowerError::io(&md_out, e))?;
    generated.push(md_out);

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use std::io::Write;

    fn write_recording(dir: &Path, name: &str, power: f64) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Time(s),Voltage(V),Current(A),Power(W)").unwrap();
        for i in 0..40 {
            let p = power + 0.001 * (i % 4) as f64;
            writeln!(f, "{},{},{},{}", i as f64 * 0.05, 3.7, p / 3.7, p).unwrap();
        }
        path
    }

    #[test]
    fn cli_defaults() {
        let m = command().try_get_matches_from(["power_analyze", "a.csv"]).unwrap();
        let c = config_from_matches(&m).unwrap();
        assert_eq!(c.files, vec![PathBuf::from("a.csv")]);
        assert_eq!(c.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(c.charts && !c.html && !c.verbose);
        assert_eq!(c.battery, BatteryConfig::default());
        assert_eq!(c.time_window, None);
    }

    #[test]
    fn cli_options() {
        let m = command()
            .try_get_matches_from([
                "power_analyze",
                "-d",
                "data",
                "-o",
                "out",
                "--no-charts",
                "--battery-capacity",
                "500",
                "--battery-voltage",
                "3.0",
                "--start",
                "1.5",
                "--end",
                "4",
                "-v",
            ])
            .unwrap();
        let c = config_from_matches(&m).unwrap();
        assert_eq!(c.directory, Some(PathBuf::from("data")));
        assert_eq!(c.output, PathBuf::from("out"));
        assert!(!c.charts && c.verbose);
        assert_eq!(c.battery.capacity_mah, 500.);
        assert_eq!(c.battery.voltage, 3.);
        assert_eq!(c.time_window, Some((1.5, 4.)));

        let quick = command().try_get_matches_from(["power_analyze", "--quick"]).unwrap();
        let c = config_from_matches(&quick).unwrap();
        assert_eq!(c.directory, Some(PathBuf::from(DEFAULT_DATABASE)));
    }

    #[test]
    fn cli_rejects_bad_input() {
        assert!(command()
            .try_get_matches_from(["power_analyze", "--start", "1"])
            .is_err());
        assert!(command()
            .try_get_matches_from(["power_analyze", "--single-only", "--comparison-only"])
            .is_err());
        let m = command()
            .try_get_matches_from(["power_analyze", "--battery-capacity", "0"])
            .unwrap();
        assert!(matches!(
            config_from_matches(&m),
            Err(PowerError::InvalidBattery(_))
        ));
    }

    #[test]
    fn collect_from_directory_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let b = write_recording(dir.path(), "b_flash.csv", 0.1);
        let a = write_recording(dir.path(), "a_breath.CSV", 0.08);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let config = AnalyzeConfig {
            directory: Some(dir.path().to_path_buf()),
            files: vec![b.clone(), dir.path().join("missing.csv")],
            ..AnalyzeConfig::default()
        };
        assert_eq!(collect_file_paths(&config).unwrap(), vec![a, b]);

        let config = AnalyzeConfig {
            directory: Some(dir.path().join("nope")),
            ..AnalyzeConfig::default()
        };
        assert!(matches!(
            collect_file_paths(&config),
            Err(PowerError::Io { .. })
        ));
    }

    #[test]
    fn file_stems() {
        assert_eq!(file_stem_for("Flash (MD103 flash)"), "Flash__MD103_flash_");
        assert_eq!(file_stem_for("No light"), "No_light");
        assert_eq!(
            unique_file_stems(&["Flash (a b)", "Flash (a_b)", "Breath"]),
            vec!["Flash__a_b_", "Flash__a_b__2", "Breath"]
        );
    }

    #[test]
    fn run_writes_charts_and_reports() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_recording(data.path(), "MD103 No light.csv", 0.03);
        write_recording(data.path(), "MD103 Breath.csv", 0.05);
        write_recording(data.path(), "MD103 Flash.csv", 0.09);
        std::fs::write(data.path().join("broken.csv"), "only,two\n1,2\n").unwrap();
        let config = AnalyzeConfig {
            directory: Some(data.path().to_path_buf()),
            output: out.path().join("results"),
            html: true,
            ..AnalyzeConfig::default()
        };
        let generated = run(&config).unwrap();
        let names: Vec<String> = generated
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        for expected in [
            "No_light_detailed_analysis.svg",
            "Breath_detailed_analysis.svg",
            "Flash_detailed_analysis.svg",
            "comprehensive_comparison.svg",
            "comparison.html",
            "summary.csv",
            "report.json",
            "report.md",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
        assert!(generated.iter().all(|p| p.exists()));
        let rows = report::read_csv_report(out.path().join("results/summary.csv")).unwrap();
        assert_eq!(rows.len(), 3);
        let flash = rows.iter().find(|r| r.label == "Flash").unwrap();
        assert!(flash.power_increase_percent.unwrap() > 100.);
    }

    fn chart_names(generated: &[PathBuf]) -> Vec<String> {
        generated
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == "svg"))
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn run_comparison_only() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let a = write_recording(data.path(), "breath.csv", 0.05);
        let b = write_recording(data.path(), "flash.csv", 0.09);
        let config = AnalyzeConfig {
            files: vec![a.clone(), b],
            output: out.path().join("both"),
            comparison_only: true,
            ..AnalyzeConfig::default()
        };
        let generated = run(&config).unwrap();
        assert_eq!(chart_names(&generated), vec!["comprehensive_comparison.svg"]);

        // a lone recording has nothing to compare, it keeps its own chart
        let config = AnalyzeConfig {
            files: vec![a],
            output: out.path().join("alone"),
            comparison_only: true,
            ..AnalyzeConfig::default()
        };
        let generated = run(&config).unwrap();
        assert_eq!(chart_names(&generated), vec!["Breath_detailed_analysis.svg"]);
    }

    #[test]
    fn run_with_equal_file_names() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir(data.path().join("day1")).unwrap();
        std::fs::create_dir(data.path().join("day2")).unwrap();
        let a = write_recording(&data.path().join("day1"), "MD103 Flash.csv", 0.05);
        let b = write_recording(&data.path().join("day2"), "MD103 Flash.csv", 0.1);
        let config = AnalyzeConfig {
            files: vec![a.clone(), b, a],
            output: out.path().to_path_buf(),
            ..AnalyzeConfig::default()
        };
        let generated = run(&config).unwrap();
        let charts = chart_names(&generated);
        assert_eq!(charts.len(), 3);
        assert!(charts.contains(&"Flash__MD103_Flash___1_detailed_analysis.svg".to_string()));
        assert!(charts.contains(&"Flash__MD103_Flash___2_detailed_analysis.svg".to_string()));

        let rows = report::read_csv_report(out.path().join("summary.csv")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Flash (MD103 Flash) #1");
        assert_eq!(rows[1].label, "Flash (MD103 Flash) #2");
        assert!(rows[0].power_increase_percent.unwrap().abs() < 1e-9);
        assert!(rows[1].power_increase_percent.unwrap() > 90.);
    }

    #[test]
    fn run_with_idle_recording() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let idle = data.path().join("MD103 No light.csv");
        let mut f = std::fs::File::create(&idle).unwrap();
        writeln!(f, "Time(s),Voltage(V),Current(A),Power(W)").unwrap();
        for i in 0..20 {
            writeln!(f, "{},3.7,0,0", i as f64 * 0.1).unwrap();
        }
        drop(f);
        let busy = write_recording(data.path(), "MD103 Flash.csv", 0.09);
        let config = AnalyzeConfig {
            files: vec![idle, busy],
            output: out.path().to_path_buf(),
            charts: false,
            ..AnalyzeConfig::default()
        };
        run(&config).unwrap();
        let analysis = report::read_json_report(out.path().join("report.json")).unwrap();
        assert_eq!(analysis.rows[0].battery_hours, f64::INFINITY);
        assert!(analysis.rows[1].battery_hours.is_finite());
        let rows = report::read_csv_report(out.path().join("summary.csv")).unwrap();
        assert_eq!(rows[0].battery_days, f64::INFINITY);
    }

    #[test]
    fn run_single_only_and_window() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let a = write_recording(data.path(), "breath.csv", 0.05);
        let b = write_recording(data.path(), "flash.csv", 0.09);
        let config = AnalyzeConfig {
            files: vec![a, b],
            output: out.path().to_path_buf(),
            single_only: true,
            time_window: Some((0.5, 1.5)),
            ..AnalyzeConfig::default()
        };
        let generated = run(&config).unwrap();
        assert!(!generated
            .iter()
            .any(|p| p.ends_with("comprehensive_comparison.svg")));
        let analysis = report::read_json_report(out.path().join("report.json")).unwrap();
        assert_eq!(analysis.time_window, Some((0.5, 1.5)));
        assert!(analysis.rows.iter().all(|r| r.data_points == 21));
    }

    #[test]
    fn fixtures_rank_the_modes() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("test");
        let config = AnalyzeConfig {
            directory: Some(fixtures.clone()),
            ..AnalyzeConfig::default()
        };
        let paths = collect_file_paths(&config).unwrap();
        assert_eq!(paths.len(), 4);
        let traces = load_traces(&paths);
        assert_eq!(traces.len(), 4);
        let mut by_power: Vec<(f64, Mode)> = traces
            .iter()
            .map(|tr| (PowerStats::compute(tr).power.mean, tr.mode))
            .collect();
        by_power.sort_by(|a, b| a.0.total_cmp(&b.0));
        let modes: Vec<Mode> = by_power.into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            modes,
            vec![Mode::NoLight, Mode::Breath, Mode::ColorCycle, Mode::Flash]
        );
    }

    #[test]
    fn run_without_input_fails() {
        let out = tempfile::tempdir().unwrap();
        let config = AnalyzeConfig {
            files: vec![out.path().join("missing.csv")],
            output: out.path().to_path_buf(),
            ..AnalyzeConfig::default()
        };
        assert!(matches!(run(&config), Err(PowerError::NoInput)));
    }
}
