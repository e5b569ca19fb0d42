//! Script runners.
//!
//! A runner knows how to hand a script to the target database. The
//! process runner pipes the script content into a client program such as
//! `psql`, `mongosh` or `sqlite3`.

use dbmaint_core::{ExecutionOutcome, Script, StoreError};
use std::io::{self, Read, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};

/// Executes one script against the target database.
pub trait ScriptRunner {
    /// Run the script. Logical failures are reported in the outcome.
    fn run(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError>;
}

/// Runs each script by writing its content to the stdin of a program.
///
/// Exit status 0 is a success. Captured stdout followed by stderr becomes
/// the diagnostic.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    /// Create a runner for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument passed to the program on every run.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program this runner spawns.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ScriptRunner for CommandRunner {
    fn run(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError> {
        let spawn_error = |e: io::Error| {
            StoreError::unavailable(format!("failed to run {}: {}", self.program, e))
        };

        tracing::debug!(program = %self.program, script = script.name(), "spawning runner");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Drain both output pipes while stdin is written, so a program
        // echoing its input never blocks on a full pipe.
        let stdout = read_in_background(child.stdout.take());
        let stderr = read_in_background(child.stderr.take());

        if let Err(e) = write_input(child.stdin.take(), script.content()) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(e));
        }

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                let _ = child.kill();
                return Err(spawn_error(e));
            }
        };
        let stdout = join_reader(stdout, &self.program)?;
        let stderr = join_reader(stderr, &self.program)?;

        let mut diagnostic = String::from_utf8_lossy(&stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            if !diagnostic.is_empty() {
                diagnostic.push('\n');
            }
            diagnostic.push_str(stderr);
        }

        Ok(ExecutionOutcome {
            succeeded: status.success(),
            diagnostic: (!diagnostic.is_empty()).then_some(diagnostic),
        })
    }
}

/// Write the whole input and close the pipe.
fn write_input(stdin: Option<ChildStdin>, content: &str) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(content.as_bytes()) {
        // A program that exits without reading its input closes the pipe early.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}

fn read_in_background<R>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_reader(
    reader: JoinHandle<io::Result<Vec<u8>>>,
    program: &str,
) -> Result<Vec<u8>, StoreError> {
    reader
        .join()
        .map_err(|_| StoreError::unavailable(format!("output reader for {} panicked", program)))?
        .map_err(|e| StoreError::unavailable(format!("failed to read output of {}: {}", program, e)))
}
