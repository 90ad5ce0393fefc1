//! Streamed input: newline-delimited JSON objects exposed to scripts as
//! `stdin`.
//!
//! A background reader publishes each parsed line as a whole new
//! [`InputSnapshot`]. The render thread only ever clones the `Arc`, so it
//! sees either the previous snapshot or the next complete one.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::InputError;

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// The most recent input line, as name/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    values: BTreeMap<String, InputValue>,
}

impl InputSnapshot {
    /// Parses one line. A line with a nested or null value is rejected whole.
    pub fn parse_line(line: &str) -> Result<Self, InputError> {
        let json: serde_json::Value = serde_json::from_str(line)?;
        let serde_json::Value::Object(object) = json else {
            return Err(InputError::NotAnObject(json.to_string()));
        };

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let value = match value {
                serde_json::Value::Bool(b) => InputValue::Bool(b),
                serde_json::Value::String(s) => InputValue::Text(s),
                serde_json::Value::Number(ref n) => match n.as_f64() {
                    Some(n) => InputValue::Number(n),
                    None => {
                        return Err(InputError::Unsupported {
                            key,
                            found: value.to_string(),
                        })
                    }
                },
                other => {
                    return Err(InputError::Unsupported {
                        key,
                        found: other.to_string(),
                    })
                }
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Latest snapshot shared between the reader thread and the renderer.
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    latest: Arc<RwLock<Arc<InputSnapshot>>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Arc<InputSnapshot> {
        Arc::clone(&self.latest.read())
    }

    pub fn publish(&self, snapshot: InputSnapshot) {
        *self.latest.write() = Arc::new(snapshot);
    }

    /// Parses `line` and publishes it. On error the previous snapshot stays.
    pub fn update_from_line(&self, line: &str) -> Result<(), InputError> {
        let snapshot = InputSnapshot::parse_line(line)?;
        self.publish(snapshot);
        Ok(())
    }

    /// Reads lines until EOF on a background thread. Blank lines are
    /// ignored and malformed ones are logged and skipped.
    pub fn spawn_reader<R>(&self, reader: R) -> io::Result<JoinHandle<()>>
    where
        R: BufRead + Send + 'static,
    {
        let shared = self.clone();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                for (index, line) in reader.lines().enumerate() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(error = %e, "input stream failed");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match shared.update_from_line(&line) {
                        Ok(()) => debug!(line = index + 1, "input snapshot updated"),
                        Err(e) => warn!(line = index + 1, error = %e, "skipping input line"),
                    }
                }
                info!("input stream closed");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_flat_object() {
        let snapshot = InputSnapshot::parse_line(r#"{"x": 1.5, "name": "a", "on": true}"#).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("x"), Some(&InputValue::Number(1.5)));
        assert_eq!(snapshot.get("name"), Some(&InputValue::Text("a".to_string())));
        assert_eq!(snapshot.get("on"), Some(&InputValue::Bool(true)));
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert!(matches!(
            InputSnapshot::parse_line("[1, 2]"),
            Err(InputError::NotAnObject(_))
        ));
        assert!(matches!(
            InputSnapshot::parse_line(r#"{"a": 1, "b": {"c": 2}}"#),
            Err(InputError::Unsupported { .. })
        ));
        assert!(matches!(
            InputSnapshot::parse_line("{oops"),
            Err(InputError::Json(_))
        ));
    }

    #[test]
    fn test_bad_line_keeps_previous_snapshot() {
        let shared = SharedInput::new();
        shared.update_from_line(r#"{"a": 1}"#).unwrap();
        assert!(shared.update_from_line("nope").is_err());
        assert_eq!(shared.latest().get("a"), Some(&InputValue::Number(1.0)));
    }

    #[test]
    fn test_reader_thread_publishes_last_line() {
        let shared = SharedInput::new();
        let data = "{\"a\": 1}\n\nnot json\n{\"a\": 2, \"b\": \"x\"}\n";
        let handle = shared.spawn_reader(Cursor::new(data)).unwrap();
        handle.join().unwrap();
        let latest = shared.latest();
        assert_eq!(latest.get("a"), Some(&InputValue::Number(2.0)));
        assert_eq!(latest.len(), 2);
    }
}
