//! Host process execution.
//!
//! Every collaborator (registry query, provisioning command, subsystem shell)
//! is run to completion and awaited. Spawn failures are errors; a non-zero
//! exit is an ordinary [`CommandResult`] for the caller to judge.

use crate::error::{ForgelineError, Result};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a finished process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    /// Exit code was 0.
    pub success: bool,
}

impl CommandResult {
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    fn from_status(status: ExitStatus, stdout: String, stderr: String, start: Instant) -> Self {
        let duration = start.elapsed();
        if status.success() {
            Self::success(stdout, stderr, duration)
        } else {
            Self::failure(status.code(), stdout, stderr, duration)
        }
    }
}

/// How a process is run.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Added to the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Capture stdout and stderr instead of inheriting the terminal.
    pub capture: bool,
}

impl CommandOptions {
    pub fn captured() -> Self {
        Self {
            capture: true,
            ..Default::default()
        }
    }
}

/// One line of streamed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Receives streamed output lines as they arrive.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

/// Run a command line through the host's command interpreter.
pub fn execute(command_line: &str, options: &CommandOptions) -> Result<CommandResult> {
    let (interpreter, flag) = host_interpreter();
    let mut cmd = Command::new(interpreter);
    cmd.arg(flag).arg(command_line);
    wait(cmd, command_line, options)
}

/// Run `program` with `args`, no interpreter in between.
pub fn execute_program<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    wait(cmd, &describe(program, args), options)
}

/// Run `program`, handing each output line to `callback` while it runs.
///
/// Both streams are captured regardless of `options.capture`; the result
/// carries the complete output.
pub fn execute_streaming<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    options: &CommandOptions,
    callback: OutputCallback,
) -> Result<CommandResult> {
    let start = Instant::now();
    let display = describe(program, args);
    let mut cmd = Command::new(program);
    cmd.args(args)
        .envs(&options.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| spawn_failed(&display, e))?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(spawn_failed(
            &display,
            std::io::Error::other("output pipes were not opened"),
        ));
    };

    let (tx, rx) = mpsc::channel();
    let stdout_reader = pump(stdout, OutputLine::Stdout, tx.clone());
    let stderr_reader = pump(stderr, OutputLine::Stderr, tx);

    // Ends once both readers hit EOF and drop their senders.
    for line in rx {
        callback(line);
    }

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    let status = child.wait().map_err(|e| spawn_failed(&display, e))?;

    Ok(CommandResult::from_status(status, stdout, stderr, start))
}

/// Forward lines of `stream` to `tx` and collect them.
///
/// The stream is always drained to EOF; bytes that are not UTF-8 are
/// replaced rather than ending the read.
fn pump<R: Read + Send + 'static>(
    stream: R,
    wrap: fn(String) -> OutputLine,
    tx: Sender<OutputLine>,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut collected = String::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
            let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(raw).into_owned();
            collected.push_str(&line);
            collected.push('\n');
            let _ = tx.send(wrap(line));
        }
        collected
    })
}

fn wait(mut cmd: Command, display: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    cmd.envs(&options.env);

    if !options.capture {
        let status = cmd.status().map_err(|source| spawn_failed(display, source))?;
        return Ok(CommandResult::from_status(
            status,
            String::new(),
            String::new(),
            start,
        ));
    }

    let output = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| spawn_failed(display, source))?;

    Ok(CommandResult::from_status(
        output.status,
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        start,
    ))
}

fn spawn_failed(display: &str, source: std::io::Error) -> ForgelineError {
    ForgelineError::SpawnFailed {
        command: display.to_string(),
        source,
    }
}

fn describe<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    args.iter()
        .fold(program.to_string_lossy().into_owned(), |mut line, arg| {
            line.push(' ');
            line.push_str(&arg.as_ref().to_string_lossy());
            line
        })
}

/// The host interpreter for provisioning command lines and its "run this" flag.
fn host_interpreter() -> (String, &'static str) {
    if cfg!(windows) {
        (
            std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string()),
            "/C",
        )
    } else {
        ("/bin/sh".to_string(), "-c")
    }
}
