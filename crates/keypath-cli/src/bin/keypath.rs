//! `keypath`: read or edit the JSON document on stdin by keypath.
//!
//! Usage:
//!   keypath get '<keypath>'
//!   keypath set '<keypath>' '<json-value>'
//!   keypath delete '<keypath>'
//!   keypath extend '<keypath>' '<json-value>'
//!
//! Set `RUST_LOG=keypath=trace` to see each engine call on stderr.

use clap::Parser;
use keypath_cli::{run, Cli};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run(&cli.cmd, buf.trim()) {
        Ok(result) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
