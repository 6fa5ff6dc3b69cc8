//! Finding and validating interpreter binaries.

use crate::config::Config;
use crate::descriptor::{Probe, RuntimeSpec};
use crate::shell::{self, ShellFamily};
use regex_lite::Regex;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// A candidate that resolved to an executable (and passed its probe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    pub program: PathBuf,
    /// Inline arguments carried by the candidate command.
    pub args: Vec<String>,
}

/// Split a candidate into executable and inline arguments.
#[must_use]
pub fn split_command(command: &str) -> (&str, Vec<String>) {
    let mut words = command.split_whitespace();
    let program = words.next().unwrap_or("");
    (program, words.map(str::to_string).collect())
}

/// Resolve one candidate against `search_path`.
///
/// The file must exist and be executable. `PATHEXT` suffixes apply on
/// Windows.
#[must_use]
pub fn resolve(command: &str, search_path: Option<&OsStr>, cwd: &Path) -> Option<ResolvedBinary> {
    let (program, args) = split_command(command);
    if program.is_empty() {
        return None;
    }
    match which::which_in(program, search_path, cwd) {
        Ok(path) => {
            tracing::debug!(candidate = program, path = %path.display(), "resolved binary");
            Some(ResolvedBinary { program: path, args })
        }
        Err(err) => {
            tracing::debug!(candidate = program, error = %err, "candidate not found");
            None
        }
    }
}

/// Run the probe and match its merged output. Any failure rejects.
#[must_use]
pub fn probe(binary: &ResolvedBinary, probe: &Probe) -> bool {
    let family = ShellFamily::current();
    let mut line = shell::escape(&binary.program.to_string_lossy(), family).into_owned();
    for arg in binary.args.iter().chain(&probe.args) {
        line.push(' ');
        line.push_str(&shell::escape(arg, family));
    }

    let captured = match shell::run_merged(&line) {
        Ok(captured) => captured,
        Err(err) => {
            tracing::warn!(command = %line, error = %err, "probe failed to run");
            return false;
        }
    };
    let output = String::from_utf8_lossy(&captured.output);
    tracing::trace!(command = %line, output = %output, "probe output");

    matches_probe(&probe.pattern, &output)
}

fn matches_probe(pattern: &str, output: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(output),
        Err(_) => output.contains(pattern),
    }
}

/// First candidate of `spec` that resolves and passes the probe.
#[must_use]
pub fn locate(spec: &RuntimeSpec, config: &Config) -> Option<ResolvedBinary> {
    let search_path = config.effective_search_path();

    for command in &spec.commands {
        let Some(binary) = resolve(command, search_path.as_deref(), &config.cwd) else {
            continue;
        };
        match &spec.probe {
            Some(check) if !probe(&binary, check) => {
                tracing::warn!(
                    runtime = %spec.name,
                    path = %binary.program.display(),
                    "probe output did not match, trying next candidate"
                );
            }
            _ => return Some(binary),
        }
    }

    tracing::debug!(runtime = %spec.name, "no usable binary");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        let (program, args) = split_command("cscript //E:jscript //Nologo //U");
        assert_eq!(program, "cscript");
        assert_eq!(args, vec!["//E:jscript", "//Nologo", "//U"]);

        let (program, args) = split_command("node");
        assert_eq!(program, "node");
        assert!(args.is_empty());
    }

    #[test]
    fn test_matches_probe() {
        assert!(matches_probe("v1.2.3", "v1.2.3\n"));
        assert!(!matches_probe("v1.2.3", "v2.0.0"));
        assert!(matches_probe(r"^v\d+", "v20.11.0\n"));
        // invalid pattern falls back to a substring check
        assert!(matches_probe("(v1", "(v1.0)"));
    }

    #[test]
    fn test_resolve_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve("definitely-not-here", Some(dir.path().as_os_str()), dir.path()).is_none());
        assert!(resolve("   ", None, dir.path()).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_requires_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fakejs");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        let search = Some(dir.path().as_os_str());

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(resolve("fakejs", search, dir.path()).is_none());

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        let found = resolve("fakejs --flag", search, dir.path()).unwrap();
        assert_eq!(found.program, path);
        assert_eq!(found.args, vec!["--flag"]);
    }
}
