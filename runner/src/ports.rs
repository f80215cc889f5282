//! Real stdin/stdout/stderr-backed [`InputPort`]/[`OutputPort`] implementations,
//! the concrete collaborators the spec leaves external (§6).

use std::io::{self, BufRead, BufReader, Write};

use taci::io::{InputPort, OutputPort};
use taci::Error;

/// Reads one line of stdin per `READ` call, regardless of the requested type,
/// and parses it according to that type. End of input or a parse failure both
/// surface as `None`, which the executor turns into `nil`.
pub struct StdinInput {
    reader: BufReader<io::Stdin>,
}

impl StdinInput {
    pub fn new() -> StdinInput {
        StdinInput {
            reader: BufReader::new(io::stdin()),
        }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl Default for StdinInput {
    fn default() -> StdinInput {
        StdinInput::new()
    }
}

impl InputPort for StdinInput {
    fn read_int(&mut self) -> Option<i64> {
        self.next_line()?.trim().parse().ok()
    }

    fn read_string(&mut self) -> Option<String> {
        self.next_line()
    }

    fn read_bool(&mut self) -> Option<bool> {
        match self.next_line()?.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

/// `WRITE` destination.
pub struct StdoutPort;

impl OutputPort for StdoutPort {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        let mut stdout = io::stdout();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| Error::Internal(format!("stdout write failed: {}", e)))
    }
}

/// `DPRINT`/`BREAK` destination.
pub struct StderrPort;

impl OutputPort for StderrPort {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        io::stderr()
            .write_all(text.as_bytes())
            .map_err(|e| Error::Internal(format!("stderr write failed: {}", e)))
    }
}
