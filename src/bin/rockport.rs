// src/bin/rockport.rs

use colored::*;
use rockport::{
    cli::{Cli, dispatcher},
    core::config_loader::{self, ConfigSources},
    models::{ErrorCode, ExitCodes},
    system::fs::LocalFs,
};

/// The entry point of `rockport`.
/// Sets up logging, loads the configuration files and hands the raw arguments
/// to the dispatcher, whose result becomes the process exit code.
fn main() {
    let cli = Cli::capture();
    init_logging(cli.wants_verbose());

    let config = match config_loader::load(&ConfigSources::discover()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(ExitCodes::default().code(ErrorCode::ConfigFile));
        }
    };

    let code = dispatcher::run(
        cli.args,
        config,
        LocalFs::shared(),
        dispatcher::COMMAND_REGISTRY,
    );
    std::process::exit(code);
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
