use super::VERSION;
use crate::mode::Mode;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::str::FromStr;

/// Parse a lighting mode given on the command line.
pub fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).map_err(|_| {
        format!(
            "unknown mode {:?}, use nolight, breath, colorcycle or flash",
            s
        )
    })
}

pub fn command() -> Command {
    let arg_csvin = Arg::new("input_csvfile")
        .help("name for the csv file")
        .short('f')
        .long("csvfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .required(true);
    let arg_svgout = Arg::new("output_svgfile")
        .help("name of the output svg file")
        .short('o')
        .long("svgfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf));
    let arg_mode = Arg::new("mode")
        .help("lighting mode, detected from the file name when missing")
        .short('m')
        .long("mode")
        .num_args(1)
        .value_parser(parse_mode);
    let arg_detailed = Arg::new("detailed")
        .help("plot the full single-recording analysis instead of the power only")
        .long("detailed")
        .action(ArgAction::SetTrue);
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("power_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the power trace of a wireless mouse")
        .arg(arg_csvin)
        .arg(arg_svgout)
        .arg(arg_mode)
        .arg(arg_detailed)
        .arg(arg_verbose)
}

/// csvin, svgout, mode, detailed, verbose
pub fn args_from_matches(cli_args: &ArgMatches) -> (PathBuf, PathBuf, Option<Mode>, bool, bool) {
    // csvin is required, clap exits before getting here when it is missing
    let csvin: PathBuf = cli_args
        .get_one::<PathBuf>("input_csvfile")
        .cloned()
        .unwrap_or_default();
    // svgout does not have a default because it is defined based on the csvin name
    let svgout = match cli_args.get_one::<PathBuf>("output_svgfile") {
        Some(p) => p.to_owned(),
        None => csvin.with_extension("svg"),
    };
    (
        csvin,
        svgout,
        cli_args.get_one::<Mode>("mode").copied(),
        cli_args.get_flag("detailed"),
        cli_args.get_flag("verbose"),
    )
}

/// Takes the CLI arguments that control the plotting of a power trace.
pub fn parse_cli() -> (PathBuf, PathBuf, Option<Mode>, bool, bool) {
    args_from_matches(&command().get_matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_defaults_to_input_name() {
        let m = command()
            .try_get_matches_from(["power_plot", "-f", "data/Flash.csv"])
            .unwrap();
        let (csvin, svgout, mode, detailed, verbose) = args_from_matches(&m);
        assert_eq!(csvin, PathBuf::from("data/Flash.csv"));
        assert_eq!(svgout, PathBuf::from("data/Flash.svg"));
        assert_eq!(mode, None);
        assert!(!detailed && !verbose);
    }

    #[test]
    fn explicit_options() {
        let m = command()
            .try_get_matches_from([
                "power_plot", "-f", "a.csv", "-o", "b.svg", "-m", "color-cycle", "--detailed",
            ])
            .unwrap();
        let (_, svgout, mode, detailed, _) = args_from_matches(&m);
        assert_eq!(svgout, PathBuf::from("b.svg"));
        assert_eq!(mode, Some(Mode::ColorCycle));
        assert!(detailed);
        assert!(command()
            .try_get_matches_from(["power_plot", "-f", "a.csv", "-m", "disco"])
            .is_err());
        assert!(command().try_get_matches_from(["power_plot"]).is_err());
    }
}
