//! SolarWinds Information Service query response parser.
//!
//! SWIS answers a JSON query with `{"results": [{<column>: <value>, ..}, ..]}`.
//! Each row becomes one flat [`Record`] of string values:
//! - strings are kept as-is
//! - `null` becomes the empty string
//! - numbers and booleans use their JSON text

use serde_json::Value;
use swinventory_shared::{InventoryError, Record, Result};

/// Parse a SWIS query response body into records, preserving row order.
pub fn parse_query_response(body: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| InventoryError::malformed(format!("failed to parse json: {e}")))?;

    let rows = value
        .get("results")
        .ok_or_else(|| InventoryError::malformed("response has no 'results' key"))?
        .as_array()
        .ok_or_else(|| InventoryError::malformed("'results' is not an array"))?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

fn parse_row(index: usize, row: &Value) -> Result<Record> {
    let columns = row.as_object().ok_or_else(|| {
        InventoryError::malformed(format!("result #{index} is not an object"))
    })?;

    let mut record = Record::new();
    for (column, value) in columns {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(InventoryError::malformed(format!(
                    "result #{index} field '{column}' is not a scalar"
                )));
            }
        };
        record.insert(column.as_str(), text);
    }

    Ok(record)
}
