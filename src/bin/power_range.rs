use mouse_power::battery::BatteryEstimate;
use mouse_power::power_range::{parse_cli, RangeArgs};
use mouse_power::time_range::{filter, preview, TimeRangeInfo};
use mouse_power::utils::{format_power_value, format_time_duration, init_tracing, PowerUnit};
use mouse_power::{PowerTrace, Result};
use std::process::ExitCode;
use tracing::{debug, error};

fn inspect(args: &RangeArgs) -> Result<()> {
    println!("> read data from {}", args.csvin.display());
    let trace = PowerTrace::from_csv(&args.csvin, args.mode)?;
    let info = TimeRangeInfo::from_trace(&trace);
    println!("\n{} ({} mode)", trace.name, trace.mode.label());
    println!("  time span: {:.3} s - {:.3} s", info.min_time, info.max_time);
    println!("  duration: {:.3} s", info.total_duration);
    println!("  data points: {}", info.data_points);
    println!("  time resolution: {:.6} s", info.time_resolution);

    let (start, end) = match args.window {
        Some(w) => w,
        None => return Ok(()),
    };
    let p = preview(&trace, start, end)?;
    let battery =
        BatteryEstimate::estimate(&args.battery, p.stats.current.mean, p.stats.power.mean);
    println!("\nwindow {:.3} s - {:.3} s:", p.start_time, p.end_time);
    println!("  duration: {:.3} s", p.duration);
    println!(
        "  data points: {} of {} ({:.1}%)",
        p.data_points, p.total_data_points, p.data_percentage
    );
    println!(
        "  average power: {}",
        format_power_value(p.stats.power.mean, PowerUnit::Auto)
    );
    println!(
        "  power range: {} - {}",
        format_power_value(p.stats.power.min, PowerUnit::Auto),
        format_power_value(p.stats.power.max, PowerUnit::Auto)
    );
    println!("  energy: {:.4} J", p.stats.total_energy_j);
    println!(
        "  battery life: {}",
        format_time_duration(battery.hours * 3600.)
    );

    if let Some(csvout) = &args.csvout {
        let window = filter(&trace, start, end)?;
        debug!("writing {} samples", window.len());
        window.to_csv(csvout)?;
        println!("\n> save the window to {}", csvout.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(args.verbose);
    match inspect(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
