//! Glue between a program file on disk and the `taci` interpreter library:
//! read the file, parse and load it with [`taci_xml`], and execute it against
//! real stdin/stdout/stderr, producing the process exit code.

mod ports;

pub use ports::{StderrPort, StdinInput, StdoutPort};

use std::fs;
use std::path::Path;

/// Runs the XML program at `path` to completion and returns the interpreter's
/// exit code.
///
/// A failure to read the file itself is a host fault, not a malformed
/// program — the loader never even sees the bytes — so it is reported via
/// [`taci::Error::Internal`]'s exit code rather than the loader's
/// source-structure code.
pub fn run_file<P: AsRef<Path>>(path: P) -> i32 {
    let path = path.as_ref();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            let err =
                taci::Error::Internal(format!("could not read '{}': {}", path.display(), err));
            eprintln!("error: {}", err);
            return err.exit_code();
        }
    };

    let program = match taci_xml::load(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {}", err);
            return err.exit_code();
        }
    };

    let mut input = StdinInput::new();
    let mut stdout = StdoutPort;
    let mut stderr = StderrPort;
    let mut executor = taci::Executor::new(program, &mut input, &mut stdout, &mut stderr);
    executor.run()
}
