//! Injectable input/output channels: the engine's view of the external
//! world is a trait object standing in for the process's real streams, so
//! tests can substitute scripted input and captured output. A blocking
//! line-based `stdin` for `input`, and a `stdout`-like sink for
//! `print`/`output` and error/diagnostic messages.

use std::io::{self, BufRead, Write};

/// The engine's view of the outside world. A production `Engine` is given
/// `StdIo`; tests substitute `ScriptedIo` to script input and capture
/// output without touching the process's real streams.
pub trait Io {
    /// Block for one line of input. `input` is the only instruction that
    /// may wait on this. The trailing newline is stripped.
    fn read_line(&mut self) -> io::Result<String>;

    /// Write raw text with no implied newline — `print`/`output` never
    /// emit one on their own.
    fn write_str(&mut self, s: &str);

    /// Write a line of diagnostic text (runtime/input error messages).
    /// Default-implemented in terms of `write_str`, so implementors only
    /// need to provide the two required primitives.
    fn write_line(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\n");
    }
}

/// The real process streams.
pub struct StdIo {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdIo {
    pub fn new() -> StdIo {
        StdIo { stdin: io::stdin(), stdout: io::stdout() }
    }
}

impl Default for StdIo {
    fn default() -> Self {
        StdIo::new()
    }
}

impl Io for StdIo {
    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.stdin.lock().read_line(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn write_str(&mut self, s: &str) {
        let mut out = self.stdout.lock();
        let _ = out.write_all(s.as_bytes());
        let _ = out.flush();
    }
}

/// A scripted `Io` for tests: input lines are fed in up front, output is
/// captured into a `String` rather than going anywhere real.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    input: std::collections::VecDeque<String>,
    pub output: String,
}

impl ScriptedIo {
    pub fn new(input_lines: impl IntoIterator<Item = impl Into<String>>) -> ScriptedIo {
        ScriptedIo {
            input: input_lines.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }
}

impl Io for ScriptedIo {
    fn read_line(&mut self) -> io::Result<String> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted input"))
    }

    fn write_str(&mut self, s: &str) {
        self.output.push_str(s);
    }
}
