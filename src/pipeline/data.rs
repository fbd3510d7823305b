//! Auxiliary data sources exposed to templates as `data`.
//!
//! | Extension       | Result                                      |
//! |-----------------|---------------------------------------------|
//! | `.json`         | the parsed document                         |
//! | `.csv`          | list of header-keyed rows, values typed     |
//! | `.yaml`, `.yml` | the parsed document                         |

use serde_json::{Map, Number, Value};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use super::BuildError;
use crate::utils::path::to_slash;

/// Load every source, keyed by its configured name (sorted by name).
pub fn load_data(
    sources: &BTreeMap<String, PathBuf>,
    root: &Path,
) -> Result<Map<String, Value>, BuildError> {
    let mut data = Map::new();
    for (name, path) in sources {
        data.insert(name.clone(), load_file(path, root)?);
    }
    Ok(data)
}

fn load_file(path: &Path, root: &Path) -> Result<Value, BuildError> {
    let display = to_slash(path, root);
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    // Reject before touching the disk so a typo'd extension reads clearly.
    if !matches!(ext.as_str(), "json" | "csv" | "yaml" | "yml") {
        return Err(BuildError::UnsupportedDataFormat { path: display, ext });
    }

    let content = fs::read_to_string(path).map_err(|e| BuildError::DataLoad {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let parsed = match ext.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
        "csv" => parse_csv(&content),
        _ => serde_yaml_ng::from_str(&content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| BuildError::DataLoad {
        path: display,
        message,
    })
}

/// Header row names the fields; each further row becomes an object.
fn parse_csv(content: &str) -> Result<Value, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, field)| (key.to_string(), typed(field)))
            .collect();
        rows.push(Value::Object(row));
    }

    Ok(Value::Array(rows))
}

/// Dynamic typing for CSV cells: booleans, integers, floats, empty as null.
fn typed(field: &str) -> Value {
    match field {
        "" => return Value::Null,
        "true" | "TRUE" | "True" => return Value::Bool(true),
        "false" | "FALSE" | "False" => return Value::Bool(false),
        _ => {}
    }

    let trimmed = field.trim();
    let numeric = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && trimmed.chars().any(|c| c.is_ascii_digit());

    if numeric {
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Number(n.into());
        }
        if let Some(n) = trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
        {
            return Value::Number(n);
        }
    }

    Value::String(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_csv_dynamic_typing() {
        let value = parse_csv("name,age,score,active,note\nAda,36,9.5,true,\n\nBob,41,-2,FALSE,x1\n").unwrap();
        assert_eq!(
            value,
            json!([
                {"name": "Ada", "age": 36, "score": 9.5, "active": true, "note": null},
                {"name": "Bob", "age": 41, "score": -2, "active": false, "note": "x1"}
            ])
        );
    }

    #[test]
    fn test_typed_keeps_non_numbers() {
        assert_eq!(typed("1e3"), json!(1000.0));
        assert_eq!(typed("inf"), json!("inf"));
        assert_eq!(typed("2024-01-01"), json!("2024-01-01"));
        assert_eq!(typed("-"), json!("-"));
    }

    #[test]
    fn test_load_all_formats() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut sources = BTreeMap::new();
        sources.insert("j".to_string(), write(root, "a.json", r#"{"k": [1, 2]}"#));
        sources.insert("c".to_string(), write(root, "b.csv", "x\n1\n"));
        sources.insert("y".to_string(), write(root, "c.yml", "list:\n  - one\n"));

        let data = load_data(&sources, root).unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), ["c", "j", "y"]);
        assert_eq!(data["j"], json!({"k": [1, 2]}));
        assert_eq!(data["c"], json!([{"x": 1}]));
        assert_eq!(data["y"], json!({"list": ["one"]}));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = BTreeMap::new();
        sources.insert("x".to_string(), write(dir.path(), "people.xml", "<people/>"));

        let err = load_data(&sources, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnsupportedDataFormat { ref ext, .. } if ext == "xml"
        ));
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = BTreeMap::new();
        sources.insert("x".to_string(), dir.path().join("gone.json"));

        let err = load_data(&sources, dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::DataLoad { ref path, .. } if path == "gone.json"));
    }

    #[test]
    fn test_malformed_json_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = BTreeMap::new();
        sources.insert("x".to_string(), write(dir.path(), "bad.json", "{nope"));

        let err = load_data(&sources, dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::DataLoad { .. }));
    }
}
