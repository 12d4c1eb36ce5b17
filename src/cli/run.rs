//! Run command - parse and evaluate a Ghost file.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use ghostc::errors::Diagnostic;
use ghostc::eval::{Environment, Evaluator, Value};
use ghostc::intern::StringInterner;

/// Result of running a file.
pub struct RunResult {
    pub value: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub runtime_error: Option<String>,
}

/// Run a Ghost source file.
pub fn run_file(path: &str) -> Result<RunResult, String> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path, e))?;

    run_source(&source, path)
}

/// Run Ghost source code.
pub fn run_source(source: &str, path: &str) -> Result<RunResult, String> {
    let interner = Rc::new(StringInterner::new());
    let evaluator = Evaluator::new(Rc::clone(&interner));

    // Imports relative to the script resolve against its directory.
    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            evaluator.add_search_path(dir);
        }
    }

    let env = Environment::new();
    match evaluator.eval_source(source, &env) {
        Err(diagnostics) => Ok(RunResult {
            value: None,
            diagnostics: diagnostics.into_vec(),
            runtime_error: None,
        }),
        Ok(Value::Error(message)) => Ok(RunResult {
            value: None,
            diagnostics: vec![],
            runtime_error: Some(message.as_ref().clone()),
        }),
        Ok(value) => Ok(RunResult {
            value: match value {
                Value::Null => None,
                other => Some(other.inspect(&interner)),
            },
            diagnostics: vec![],
            runtime_error: None,
        }),
    }
}

/// Run a file and print results.
pub fn run_file_and_print(path: &str) {
    match run_file(path) {
        Ok(result) => {
            for diag in &result.diagnostics {
                eprintln!("{}", diag);
            }
            if result.diagnostics.iter().any(|d| d.is_error()) {
                std::process::exit(1);
            }

            if let Some(message) = result.runtime_error {
                eprintln!("ERROR: {}", message);
                std::process::exit(1);
            }

            if let Some(value) = result.value {
                println!("{}", value);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
