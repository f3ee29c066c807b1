use std::process::ExitCode;

use clap::Parser;
use kem_kit::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(cli::usage_exit_code(&err));
        }
    };
    cli::init_tracing(cli.verbose, cli.quiet);

    match cli::run(&cli) {
        Ok(status) => status.into(),
        Err(err) => {
            cli::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
