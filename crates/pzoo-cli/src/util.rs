use std::{
    fs::File,
    io::{self, BufRead as _, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::Serialize;

/// Opens `path` for writing, or stdout if no path is given.
///
/// Also returns a name for the destination to use in error messages.
fn open_output(path: Option<&Path>) -> anyhow::Result<(Box<dyn Write>, String)> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok((Box::new(BufWriter::new(file)), path.display().to_string()))
        }
        None => Ok((Box::new(io::stdout().lock()), "stdout".to_owned())),
    }
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let (mut out, name) = open_output(path)?;
    serde_json::to_writer_pretty(&mut out, value)
        .with_context(|| format!("Failed to write JSON to {name}"))?;
    writeln!(out)
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write to {name}"))
}

pub fn save_text(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    let (mut out, name) = open_output(path)?;
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write to {name}"))
}

/// Reads all lines from `path`, or from stdin if no path is given.
pub fn read_lines(path: Option<&Path>) -> anyhow::Result<Vec<String>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script file: {}", path.display()))?;
            BufReader::new(file)
                .lines()
                .collect::<io::Result<Vec<_>>>()
                .with_context(|| format!("Failed to read script file: {}", path.display()))
        }
        None => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read actions from stdin"),
    }
}
