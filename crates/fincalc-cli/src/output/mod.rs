pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into its per-period rows and its scalar fields.
pub(crate) fn split_rows(
    result: &serde_json::Map<String, Value>,
) -> (Option<&Vec<Value>>, Vec<(&String, &Value)>) {
    let rows = result.get("rows").and_then(Value::as_array);
    let scalars = result
        .iter()
        .filter(|(k, _)| k.as_str() != "rows")
        .collect();
    (rows, scalars)
}
