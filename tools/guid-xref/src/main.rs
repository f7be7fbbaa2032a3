//! Replaces GUIDs in a firmware boot log with the names listed in
//! `Guid.xref` files.

use anyhow::{Context, Result};
use clap::Parser;
use guid_xref::XrefTable;
use std::fs;
use std::path::PathBuf;

/// Convert GUIDs to text identifiers in a UEFI firmware boot log.
#[derive(Parser)]
#[command(name = "guid-xref", version, about)]
struct Cli {
    /// Guid.xref file location.
    #[arg(long = "guids", short = 'g')]
    guids: PathBuf,

    /// Additional Guid.xref file location.
    #[arg(long = "guids_extra", short = 'e')]
    guids_extra: Option<PathBuf>,

    /// Input log file location.
    #[arg(long = "log_input", short = 'i')]
    log_input: PathBuf,

    /// Output log file location (by default the input file is changed in place).
    #[arg(long = "log_output", short = 'o')]
    log_output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut table = XrefTable::default();
    table.merge_file(&cli.guids)?;
    if let Some(extra) = &cli.guids_extra {
        table.merge_file(extra)?;
    }

    let log = fs::read_to_string(&cli.log_input)
        .with_context(|| format!("Failed to read log {}", cli.log_input.display()))?;
    let (text, replaced) = table.replace(&log);

    let output = cli.log_output.as_ref().unwrap_or(&cli.log_input);
    fs::write(output, text).with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!(
        "replaced {replaced} GUIDs using {} names, wrote {}",
        table.len(),
        output.display()
    );
    Ok(())
}
