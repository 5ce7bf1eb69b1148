//! JSON I/O handling for CLI
//!
//! - Input: single JSON object via stdin (may span lines)
//! - Output: single JSON object via stdout, newline terminated
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read one JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    read_request_from(io::stdin().lock())
}

pub(crate) fn read_request_from<R: Read>(mut reader: R) -> CliResult<Value> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Write one JSON value to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_json_to(&mut stdout, value)
}

pub(crate) fn write_json_to<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
