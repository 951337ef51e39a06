use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{plain, row_set};

/// Format output as tables: scalar result fields first, then one row per
/// tier or schedule month, then warnings.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_fields(result);
            } else {
                print_fields(map);
            }
            if let Some(rows) = row_set(value) {
                println!();
                print_rows(rows);
            }
            print_notes(map);
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        // nested collections get their own table
        if val.is_array() || val.is_object() {
            continue;
        }
        builder.push_record([key.as_str(), &plain(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(no rows)");
        return;
    };

    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !v.is_object())
        .map(|(k, _)| k.clone())
        .collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let cells: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(cells);
        }
    }

    println!("{}", Table::from(builder));
}

fn cell(value: &Value) -> String {
    match value {
        Value::Object(map) => map.values().map(cell).collect::<Vec<_>>().join(" / "),
        other => plain(other),
    }
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
