use mouse_power::battery::{BatteryConfig, BatteryEstimate};
use mouse_power::plot::{plot_power, plot_single_analysis};
use mouse_power::power_plot::parse_cli;
use mouse_power::stats::PowerStats;
use mouse_power::utils::init_tracing;
use mouse_power::PowerTrace;
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> ExitCode {
    let (csvin, svgout, mode, detailed, verbose) = parse_cli();
    init_tracing(verbose);
    println!(
        "read data from {} and plot to {}",
        csvin.display(),
        svgout.display()
    );
    let trace = match PowerTrace::from_csv(&csvin, mode) {
        Ok(t) => t,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!("{} samples over {:.3} s", trace.len(), trace.duration());
    let plotted = if detailed {
        let stats = PowerStats::compute(&trace);
        let battery = BatteryEstimate::estimate(
            &BatteryConfig::default(),
            stats.current.mean,
            stats.power.mean,
        );
        plot_single_analysis(&trace, &stats, &battery, &svgout)
    } else {
        plot_power(&trace, &svgout)
    };
    if let Err(e) = plotted {
        error!("plotting failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
