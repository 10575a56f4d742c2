//! Shell completion scripts for the `recipebox` binary.

use std::io;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

/// Write the completion script for `shell` to stdout.
pub fn generate_completion(shell: Shell) {
    let mut app = crate::Cli::command();
    generate(shell, &mut app, "recipebox", &mut io::stdout());
}
