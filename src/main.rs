//! # dedupe CLI
//!
//! Command-line interface for the media deduper.
//!
//! ## Usage
//! ```bash
//! dedupe ~/Pictures
//! dedupe ~/Pictures --top-level-only --extensions jpg,png
//! dedupe ~/Pictures --output json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    media_deduper::init_tracing();
    cli::run()
}
