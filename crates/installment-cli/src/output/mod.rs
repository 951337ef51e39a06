pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as plain text.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Rows of the output: a top-level `results` array, or the tier records of
/// a plan or edit result.
pub(crate) fn row_set(value: &Value) -> Option<&[Value]> {
    if let Some(Value::Array(rows)) = value.get("results") {
        return Some(rows.as_slice());
    }
    let result = value.get("result")?;
    result
        .get("snapshot")
        .unwrap_or(result)
        .get("tiers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}
