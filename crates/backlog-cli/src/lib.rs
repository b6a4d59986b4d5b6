//! instant-backlog command line interface.
//!
//! Both the `instant-backlog` and `ib` binaries call [`main`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

use std::process::ExitCode;

use clap::Parser;

use backlog_common_config::{vars, Environment};
use backlog_common_log::{LogConfig, LogLevel};

pub use cli::Cli;
pub use error::{CliError, Exit};

/// Parse arguments, run the command and map the outcome to an exit code.
pub fn main() -> ExitCode {
    let cli = Cli::parse();

    // .env may set logging variables, so it is loaded first.
    let env_result = Environment::init();
    init_logging(&cli);
    if let Err(err) = env_result {
        let err = CliError::from(err);
        eprintln!("{}", err.render(cli.format));
        return err.exit_code();
    }

    let format = cli.format;
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let err = CliError::io("failed to create async runtime", e);
            eprintln!("{}", err.render(format));
            return err.exit_code();
        }
    };

    match runtime.block_on(cli.execute()) {
        Ok(()) => Exit::Success.into(),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{}", err.render(format));
            err.exit_code()
        }
    }
}

/// `-v`/`-q` override the level from the environment. Without either flag
/// and without an env level, only warnings and errors are logged.
fn init_logging(cli: &Cli) {
    let env_level = Environment::get(vars::BACKLOG_LOG_LEVEL)
        .or_else(|| Environment::get(vars::RUST_LOG))
        .is_some();

    let mut config = LogConfig::from_env();
    if cli.verbose > 0 || cli.quiet || !env_level {
        config = config.with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    }

    if let Err(err) = backlog_common_log::init(config) {
        eprintln!("warning: {err}");
    }
}
