//! Building and running one-line shell commands.
//!
//! Interpreters are invoked as `<binary> <args> <script>` through the platform
//! shell with stderr folded into stdout, so crash reports land in the same
//! stream as the runner's envelope.

use std::borrow::Cow;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Quoting rules of the shell that will parse the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFamily {
    Posix,
    Windows,
}

impl ShellFamily {
    /// Family of the host.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

const WINDOWS_SPECIAL: &[char] = &['&', '|', '(', ')', '<', '>', '^', ' ', '"'];

/// Quote `arg` so the shell passes it through as a single word.
#[must_use]
pub fn escape(arg: &str, family: ShellFamily) -> Cow<'_, str> {
    match family {
        ShellFamily::Posix => escape_posix(arg),
        ShellFamily::Windows => escape_windows(arg),
    }
}

fn escape_posix(arg: &str) -> Cow<'_, str> {
    if arg.is_empty() {
        return Cow::Borrowed("''");
    }
    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-.,:/@%+=".contains(c));
    if safe {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
}

fn escape_windows(arg: &str) -> Cow<'_, str> {
    if arg.is_empty() {
        return Cow::Borrowed("\"\"");
    }
    if !arg.contains(WINDOWS_SPECIAL) {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("\"{}\"", arg.replace('"', "\"\"")))
}

/// `<program> <args...> <script>` with every word escaped.
#[must_use]
pub fn command_line(program: &Path, args: &[String], script: &Path, family: ShellFamily) -> String {
    let program = program.to_string_lossy();
    let script = script.to_string_lossy();
    std::iter::once(program.as_ref())
        .chain(args.iter().map(String::as_str))
        .chain(std::iter::once(script.as_ref()))
        .map(|word| escape(word, family))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Output of a finished command.
#[derive(Debug, Clone)]
pub struct Captured {
    /// Merged stdout and stderr.
    pub output: Vec<u8>,
    pub success: bool,
    pub code: Option<i32>,
}

/// Run `line` through the host shell with stderr merged into stdout.
///
/// Blocks until the process exits and its output is drained.
pub fn run_merged(line: &str) -> io::Result<Captured> {
    let output = shell_command(line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    // Anything on the shell's own stderr (e.g. "not found") still counts.
    let mut merged = output.stdout;
    merged.extend_from_slice(&output.stderr);

    Ok(Captured {
        output: merged,
        success: output.status.success(),
        code: output.status.code(),
    })
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("{line} 2>&1"));
    cmd
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd.exe");
    cmd.raw_arg(format!("/S /C \"{line} 2>&1\""));
    cmd
}
