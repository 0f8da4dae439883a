use mouse_power::power_analyze::{parse_cli, run};
use mouse_power::utils::init_tracing;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let config = match parse_cli() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.verbose);
    match run(&config) {
        Ok(generated) => {
            println!("\n> {} files written to {}", generated.len(), config.output.display());
            for f in generated {
                println!("  {}", f.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
