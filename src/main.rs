use log::{debug, info};
use oncall_roster::cli::{CliArgs, CliError, USAGE};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(CliError::Usage(_)) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(CliError::InvalidDate(e)) => {
            println!("error: {}", e);
            return ExitCode::SUCCESS;
        }
    };

    oncall_roster::init_logger(cli.verbose);
    info!("Starting on-call roster report");

    let stdout = io::stdout();
    match oncall_roster::run(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("Report failed: {:?}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
