//! CLI module for the Ghost interpreter.
//!
//! Provides command-line interface commands:
//! - `run` - Parse and evaluate a file
//! - `repl` - Interactive read-eval-print loop

pub mod repl;
pub mod run;

/// Print usage information
pub fn print_usage() {
    eprintln!("Ghost interpreter v0.1.0");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  ghost run <file.ghost>      Parse and run a file");
    eprintln!("  ghost repl                  Start an interactive session");
    eprintln!("  ghost <file.ghost>          Run file (shorthand for run)");
}
