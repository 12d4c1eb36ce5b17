//! Interactive read-eval-print loop.
//!
//! Lines share one top-level environment, so bindings persist across
//! inputs. Parse errors and runtime errors print without ending the
//! session.

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use ghostc::eval::{Environment, Evaluator, Value};
use ghostc::intern::StringInterner;

const PROMPT: &str = ">> ";

/// Start the REPL on stdin/stdout.
pub fn start() {
    let interner = Rc::new(StringInterner::new());
    let evaluator = Evaluator::new(Rc::clone(&interner));
    let env = Environment::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Ghost interpreter v0.1.0 (type Ctrl-D to exit)");
    loop {
        print!("{}", PROMPT);
        if stdout.flush().is_err() {
            return;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!();
                return;
            }
            Ok(_) => {}
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match evaluator.eval_source(line, &env) {
            Err(diagnostics) => {
                for diag in diagnostics.iter() {
                    eprintln!("{}", diag);
                }
            }
            Ok(Value::Null) => {}
            Ok(value) => println!("{}", value.inspect(&interner)),
        }
    }
}
