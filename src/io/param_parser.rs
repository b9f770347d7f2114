//! Declared-entry parameter store read from JSON parameter files.
//!
//! Entries are declared up front with a default, a value pattern and a
//! documentation string, grouped in nested subsections. A parameter file is
//! a JSON object whose nested objects mirror the subsections:
//!
//! ```json
//! { "Boundary composition model": { "Function": { "Function expression": "x^2+y^2" } } }
//! ```
//!
//! Every leaf must name a declared entry and satisfy its pattern.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Double,
    Integer { min: i64 },
    Bool,
    Selection(&'static [&'static str]),
    /// Comma-separated list; items are not checked.
    List,
    Anything,
}

impl Pattern {
    fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Pattern::Double => value
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| "not a floating point number".to_string()),
            Pattern::Integer { min } => match value.trim().parse::<i64>() {
                Ok(v) if v >= *min => Ok(()),
                Ok(_) => Err(format!("must be at least {min}")),
                Err(_) => Err("not an integer".to_string()),
            },
            Pattern::Bool => match value.trim() {
                "true" | "false" => Ok(()),
                _ => Err("expected true or false".to_string()),
            },
            Pattern::Selection(options) => {
                if options.contains(&value.trim()) {
                    Ok(())
                } else {
                    Err(format!("expected one of {}", options.join("|")))
                }
            }
            Pattern::List | Pattern::Anything => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    default: String,
    pattern: Pattern,
    documentation: &'static str,
    value: Option<String>,
}

#[derive(Debug, Default)]
pub struct ParameterHandler {
    entries: BTreeMap<String, Entry>,
    subsections: Vec<String>,
}

impl ParameterHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_subsection(&mut self, name: &str) {
        self.subsections.push(name.to_string());
    }

    pub fn leave_subsection(&mut self) {
        self.subsections.pop();
    }

    fn path(&self, name: &str) -> String {
        let mut path = self.subsections.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(name);
        path
    }

    /// Declare an entry in the current subsection. Declaring the same entry
    /// again replaces its default and pattern but keeps a value already read.
    pub fn declare_entry(
        &mut self,
        name: &str,
        default: &str,
        pattern: Pattern,
        documentation: &'static str,
    ) {
        let path = self.path(name);
        let value = self.entries.get(&path).and_then(|e| e.value.clone());
        self.entries.insert(
            path,
            Entry {
                default: default.to_string(),
                pattern,
                documentation,
                value,
            },
        );
    }

    /// Set the entry at a full `/`-separated path.
    pub fn set(&mut self, path: &str, value: &str) -> Result<(), ConfigError> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| ConfigError::Undeclared(path.to_string()))?;
        entry
            .pattern
            .check(value)
            .map_err(|reason| ConfigError::InvalidValue {
                key: path.to_string(),
                value: value.to_string(),
                reason,
            })?;
        entry.value = Some(value.trim().to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<String, ConfigError> {
        let path = self.path(name);
        self.entries
            .get(&path)
            .map(|e| e.value.clone().unwrap_or_else(|| e.default.clone()))
            .ok_or(ConfigError::Undeclared(path))
    }

    fn get_parsed<T: std::str::FromStr>(&self, name: &str, reason: &str) -> Result<T, ConfigError> {
        let value = self.get(name)?;
        value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: self.path(name),
            value: value.clone(),
            reason: reason.to_string(),
        })
    }

    pub fn get_double(&self, name: &str) -> Result<f64, ConfigError> {
        self.get_parsed(name, "not a floating point number")
    }

    pub fn get_integer(&self, name: &str) -> Result<i64, ConfigError> {
        self.get_parsed(name, "not an integer")
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ConfigError> {
        self.get_parsed(name, "expected true or false")
    }

    pub fn get_list(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .get(name)?
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect())
    }

    /// Documentation of every declared entry, keyed by full path.
    pub fn documentation(&self) -> impl Iterator<Item = (&str, &str, &'static str)> {
        self.entries
            .iter()
            .map(|(path, e)| (path.as_str(), e.default.as_str(), e.documentation))
    }

    pub fn read_json_str(&mut self, content: &str) -> Result<(), ConfigError> {
        let root: Value = serde_json::from_str(content)?;
        match root {
            Value::Object(_) => self.load_value("", &root),
            _ => Err(ConfigError::InvalidValue {
                key: String::new(),
                value: root.to_string(),
                reason: "the parameter file must contain a JSON object".to_string(),
            }),
        }
    }

    pub fn read_json_file<P: AsRef<Path>>(&mut self, file_path: P) -> Result<(), ConfigError> {
        let content = fs::read_to_string(file_path.as_ref())?;
        debug!("reading parameters from {}", file_path.as_ref().display());
        self.read_json_str(&content)
    }

    fn load_value(&mut self, path: &str, value: &Value) -> Result<(), ConfigError> {
        let leaf = match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}/{key}")
                    };
                    self.load_value(&child_path, child)?;
                }
                return Ok(());
            }
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Value::Null => {
                return Err(ConfigError::InvalidValue {
                    key: path.to_string(),
                    value: "null".to_string(),
                    reason: "entries cannot be null".to_string(),
                });
            }
        };
        self.set(path, &leaf)
    }
}
