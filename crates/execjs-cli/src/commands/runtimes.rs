use super::known_runtimes;
use execjs_core::Config;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
struct RuntimeRow {
    name: String,
    available: bool,
    deprecated: bool,
    binary: Option<String>,
}

/// List every known runtime. Probes each one, so this can take a moment.
pub fn run(config: &Config, json: bool) -> Result<()> {
    let rows: Vec<RuntimeRow> = known_runtimes(config)
        .iter()
        .map(|runtime| RuntimeRow {
            name: runtime.name().to_string(),
            available: runtime.is_available(),
            deprecated: runtime.is_deprecated(),
            binary: runtime.binary().map(|path| path.display().to_string()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    for row in &rows {
        let status = match (row.available, row.deprecated) {
            (true, false) => "available",
            (true, true) => "available (deprecated)",
            (false, _) => "unavailable",
        };
        writeln!(
            out,
            "  {:<16} {:<24} {}",
            row.name,
            status,
            row.binary.as_deref().unwrap_or("-")
        )
        .into_diagnostic()?;
    }
    Ok(())
}
