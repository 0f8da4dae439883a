use super::VERSION;
use crate::battery::{BatteryConfig, DEFAULT_CAPACITY_MAH, DEFAULT_VOLTAGE};
use crate::error::Result;
use crate::mode::Mode;
use crate::power_plot::parse_mode;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Settings of the time window inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeArgs {
    pub csvin: PathBuf,
    /// None prints the recording span only
    pub window: Option<(f64, f64)>,
    pub csvout: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub battery: BatteryConfig,
    pub verbose: bool,
}

pub fn command() -> Command {
    let arg_csvin = Arg::new("input_csvfile")
        .help("name for the csv file")
        .short('f')
        .long("csvfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .required(true);
    let arg_start = Arg::new("start")
        .help("start of the window, in seconds")
        .long("start")
        .num_args(1)
        .value_parser(value_parser!(f64))
        .requires("end");
    let arg_end = Arg::new("end")
        .help("end of the window, in seconds")
        .long("end")
        .num_args(1)
        .value_parser(value_parser!(f64))
        .requires("start");
    let arg_csvout = Arg::new("output_csvfile")
        .help("write the samples of the window to this csv file")
        .short('o')
        .long("csvout")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .requires("start");
    let arg_mode = Arg::new("mode")
        .help("lighting mode, detected from the file name when missing")
        .short('m')
        .long("mode")
        .num_args(1)
        .value_parser(parse_mode);
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
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("power_range")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to inspect and cut a time window of a wireless mouse power trace")
        .arg(arg_csvin)
        .arg(arg_start)
        .arg(arg_end)
        .arg(arg_csvout)
        .arg(arg_mode)
        .arg(arg_battery_capacity)
        .arg(arg_battery_voltage)
        .arg(arg_verbose)
}

pub fn args_from_matches(cli_args: &ArgMatches) -> Result<RangeArgs> {
    let battery = BatteryConfig::new(
        *cli_args
            .get_one::<f64>("battery_capacity")
            .unwrap_or(&DEFAULT_CAPACITY_MAH),
        *cli_args
            .get_one::<f64>("battery_voltage")
            .unwrap_or(&DEFAULT_VOLTAGE),
    )?;
    let window = match (
        cli_args.get_one::<f64>("start"),
        cli_args.get_one::<f64>("end"),
    ) {
        (Some(s), Some(e)) => Some((*s, *e)),
        _ => None,
    };
    Ok(RangeArgs {
        csvin: cli_args
            .get_one::<PathBuf>("input_csvfile")
            .cloned()
            .unwrap_or_default(),
        window,
        csvout: cli_args.get_one::<PathBuf>("output_csvfile").cloned(),
        mode: cli_args.get_one::<Mode>("mode").copied(),
        battery,
        verbose: cli_args.get_flag("verbose"),
    })
}

/// Takes the CLI arguments that select the time window.
pub fn parse_cli() -> Result<RangeArgs> {
    args_from_matches(&command().get_matches())
}
