use relaydl_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Falls back to stderr if the state dir is not writable.
    logging::init();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("relaydl error: {:#}", err);
        std::process::exit(1);
    }
}
