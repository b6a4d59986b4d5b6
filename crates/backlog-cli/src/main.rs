//! Main entry point for the `instant-backlog` binary.

use std::process::ExitCode;

fn main() -> ExitCode {
    backlog_cli::main()
}
