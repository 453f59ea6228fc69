// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! CSV over a top-level sequence of rows.
//!
//! Rows are read back as strings first; if the target type refuses that,
//! cells are inferred as JSON scalars (`42`, `true`, `1.5`, empty as null).

use crate::encoding::Record;
use crate::errors::EncodingError;
use serde_json::{Map, Value};

fn codec_name(headers: bool) -> &'static str {
    if headers {
        "CSVWithHeaders"
    } else {
        "CSV"
    }
}

pub(crate) fn encode<T: Record>(value: &T, headers: bool) -> Result<Vec<u8>, EncodingError> {
    let name = codec_name(headers);
    let rows = match serde_json::to_value(value).map_err(|e| EncodingError::codec(name, e))? {
        Value::Array(rows) => rows,
        _ => return Err(EncodingError::wrong_type(name, std::any::type_name::<T>())),
    };

    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());

    if headers {
        let header: Vec<String> = match rows.first() {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(_) => return Err(EncodingError::wrong_type(name, "rows that are not maps")),
            None => Vec::new(),
        };
        if !header.is_empty() {
            writer
                .write_record(&header)
                .map_err(|e| EncodingError::codec(name, e))?;
        }
        for row in &rows {
            let map = row
                .as_object()
                .ok_or_else(|| EncodingError::wrong_type(name, "rows that are not maps"))?;
            let cells: Vec<String> = header
                .iter()
                .map(|key| map.get(key).map(cell).unwrap_or_default())
                .collect();
            writer
                .write_record(&cells)
                .map_err(|e| EncodingError::codec(name, e))?;
        }
    } else {
        for row in &rows {
            let cells: Vec<String> = match row {
                Value::Array(items) => items.iter().map(cell).collect(),
                Value::Object(map) => map.values().map(cell).collect(),
                scalar => vec![cell(scalar)],
            };
            writer
                .write_record(&cells)
                .map_err(|e| EncodingError::codec(name, e))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| EncodingError::codec(name, e.to_string()))
}

pub(crate) fn decode<T: Record>(data: &[u8], headers: bool) -> Result<T, EncodingError> {
    let name = codec_name(headers);
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(headers)
        .flexible(true)
        .from_reader(data);

    let header: Vec<String> = if headers {
        reader
            .headers()
            .map_err(|e| EncodingError::codec(name, e))?
            .iter()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let mut literal = Vec::new();
    let mut inferred = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| EncodingError::codec(name, e))?;
        if headers {
            let mut as_text = Map::new();
            let mut as_values = Map::new();
            for (key, field) in header.iter().zip(record.iter()) {
                as_text.insert(key.clone(), Value::String(field.to_string()));
                as_values.insert(key.clone(), infer(field));
            }
            literal.push(Value::Object(as_text));
            inferred.push(Value::Object(as_values));
        } else {
            literal.push(Value::Array(
                record.iter().map(|f| Value::String(f.to_string())).collect(),
            ));
            inferred.push(Value::Array(record.iter().map(infer).collect()));
        }
    }

    match serde_json::from_value(Value::Array(literal)) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_value(Value::Array(inferred))
            .map_err(|e| EncodingError::codec(name, e)),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn infer(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(value) = field.parse::<bool>() {
        return Value::Bool(value);
    }
    if let Ok(value) = field.parse::<i64>() {
        return Value::from(value);
    }
    if let Ok(value) = field.parse::<u64>() {
        return Value::from(value);
    }
    if let Some(value) = field.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        return Value::Number(value);
    }
    if field.starts_with('{') || field.starts_with('[') {
        if let Ok(value) = serde_json::from_str(field) {
            return value;
        }
    }
    Value::String(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: u32,
    }
    crate::record!(Person);

    #[test]
    fn test_plain_rows_keep_text() {
        let rows = vec![vec!["1".to_string(), "a".to_string()], vec!["2".to_string(), "b".to_string()]];
        let data = encode(&rows, false).unwrap();
        assert_eq!(String::from_utf8(data.clone()).unwrap(), "1,a\n2,b\n");
        let back: Vec<Vec<String>> = decode(&data, false).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_header_rows_infer_numbers() {
        let people = vec![
            Person { name: "ada".into(), age: 36 },
            Person { name: "alan".into(), age: 41 },
        ];
        let data = encode(&people, true).unwrap();
        assert_eq!(String::from_utf8(data.clone()).unwrap(), "name,age\nada,36\nalan,41\n");
        let back: Vec<Person> = decode(&data, true).unwrap();
        assert_eq!(back, people);
    }

    #[test]
    fn test_non_sequence_is_rejected() {
        let err = encode(&"just text".to_string(), false).unwrap_err();
        assert!(matches!(err, EncodingError::WrongValueType { codec: "CSV", .. }));
    }
}
