//! `ib`: short name for `instant-backlog`.

use std::process::ExitCode;

fn main() -> ExitCode {
    backlog_cli::main()
}
