//! Ghost interpreter CLI

use std::env;

mod cli;

fn main() {
    ghostc::tracing_setup::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        cli::print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: ghost run <file.ghost>");
                std::process::exit(1);
            }
            cli::run::run_file_and_print(&args[2]);
        }
        "repl" => {
            cli::repl::start();
        }
        "-h" | "--help" | "help" => {
            cli::print_usage();
        }
        arg if arg.ends_with(".ghost") => {
            // Shorthand: ghost file.ghost = ghost run file.ghost
            cli::run::run_file_and_print(arg);
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            cli::print_usage();
            std::process::exit(1);
        }
    }
}
