use pkgcheck_core::logging;

mod cli;

use crate::cli::{CliCommand, Completion};

#[tokio::main]
async fn main() {
    // File logging when the state dir is writable, stderr otherwise.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match CliCommand::run_from_args().await {
        Ok(Completion::AllOk) => {}
        Ok(Completion::Failures) => std::process::exit(2),
        Err(err) => {
            eprintln!("pkgcheck error: {:#}", err);
            std::process::exit(1);
        }
    }
}
