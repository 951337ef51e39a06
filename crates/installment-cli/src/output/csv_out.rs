use serde_json::Value;
use std::io;

use super::{plain, row_set};

/// Write output as CSV to stdout: one row per tier or schedule month when
/// there are rows, otherwise two-column `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = row_set(value) {
        write_rows(&mut wtr, rows);
    } else {
        let fields = value
            .get("result")
            .and_then(Value::as_object)
            .or_else(|| value.as_object());
        match fields {
            Some(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &plain(val)]);
                }
            }
            None => {
                let _ = wtr.write_record([&plain(value)]);
            }
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(plain).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
