//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    if let Err(err) = safestep_cli::run() {
        eprintln!("safestep: {err}");
        std::process::exit(1);
    }
}
