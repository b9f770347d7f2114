//! Expression engine behind [`ParsedFunction`].
//!
//! A parsed function maps `(point, time)` to one value per component. Each
//! component is a separate expression; components are separated by `;` in
//! the source text. Variable names list the coordinates first and time last,
//! e.g. `x,y,t` in 2D.

pub mod expression;
pub mod pratt;
pub mod tokenizer;

use hashbrown::HashMap;
use ndarray::Array1;

use crate::error::{ConfigError, EvaluationError};
use expression::{Expr, Fault, is_reserved};
use pratt::Parser;

/// Names visible to an expression: argument slots and constants.
pub struct SymbolTable {
    variables: Vec<String>,
    constants: HashMap<String, f64>,
}

impl SymbolTable {
    pub fn new(variables: Vec<String>, constants: HashMap<String, f64>) -> Self {
        Self {
            variables,
            constants,
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Expr> {
        if let Some(slot) = self.variables.iter().position(|v| v == name) {
            return Some(Expr::Variable(slot));
        }
        if let Some(value) = self.constants.get(name) {
            return Some(Expr::Constant(*value));
        }
        match name {
            "pi" | "Pi" | "_pi" => Some(Expr::Constant(std::f64::consts::PI)),
            "_e" => Some(Expr::Constant(std::f64::consts::E)),
            _ => None,
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_reserved(name)
}

/// Parse a constants table of the form `name=value, name=value`.
pub fn parse_constants(text: &str) -> Result<HashMap<String, f64>, ConfigError> {
    let mut constants = HashMap::new();
    for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((name, value)) = entry.split_once('=') else {
            return Err(ConfigError::InvalidValue {
                key: "Function constants".to_string(),
                value: entry.to_string(),
                reason: "expected name=value".to_string(),
            });
        };
        let name = name.trim();
        if !is_identifier(name) {
            return Err(ConfigError::InvalidName(name.to_string()));
        }
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "Function constants".to_string(),
                value: entry.to_string(),
                reason: "not a floating point number".to_string(),
            })?;
        constants.insert(name.to_string(), value);
    }
    Ok(constants)
}

/// A time-dependent, vector-valued function of a `DIM`-dimensional point,
/// compiled from text.
#[derive(Debug, Clone)]
pub struct ParsedFunction<const DIM: usize> {
    components: Vec<Expr>,
    variable_names: Vec<String>,
    time: f64,
}

impl<const DIM: usize> ParsedFunction<DIM> {
    pub fn default_variable_names() -> &'static str {
        match DIM {
            2 => "x,y,t",
            _ => "x,y,z,t",
        }
    }

    pub fn default_expression(n_components: usize) -> String {
        vec!["0"; n_components].join("; ")
    }

    pub fn new(
        variables: &str,
        expression: &str,
        constants: &HashMap<String, f64>,
        n_components: usize,
    ) -> Result<Self, ConfigError> {
        if !(2..=3).contains(&DIM) {
            return Err(ConfigError::UnsupportedDimension(DIM));
        }
        let variable_names: Vec<String> = variables
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if variable_names.len() != DIM + 1 {
            return Err(ConfigError::VariableCount {
                expected: DIM + 1,
                found: variable_names.len(),
            });
        }
        for (i, name) in variable_names.iter().enumerate() {
            if !is_identifier(name) || variable_names[..i].contains(name) {
                return Err(ConfigError::InvalidName(name.clone()));
            }
        }

        let sources: Vec<&str> = expression.split(';').map(str::trim).collect();
        if sources.len() != n_components {
            return Err(ConfigError::ComponentCount {
                expected: n_components,
                found: sources.len(),
            });
        }
        let symbols = SymbolTable::new(variable_names.clone(), constants.clone());
        let components = sources
            .iter()
            .enumerate()
            .map(|(component, source)| {
                Parser::new(source, &symbols)
                    .and_then(Parser::parse)
                    .map_err(|source| ConfigError::Expression { component, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            components,
            variable_names,
            time: 0.0,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn value(&self, point: &[f64; DIM], component: usize) -> Result<f64, EvaluationError> {
        let expr = self
            .components
            .get(component)
            .ok_or(EvaluationError::ComponentOutOfRange {
                index: component,
                n_components: self.components.len(),
            })?;
        let mut args = [0.0; 4];
        args[..DIM].copy_from_slice(point);
        args[DIM] = self.time;
        let value = expr.eval(&args[..=DIM]).map_err(|fault| match fault {
            Fault::DivisionByZero => EvaluationError::DivisionByZero { component },
        })?;
        if !value.is_finite() {
            return Err(EvaluationError::NonFinite { component, value });
        }
        Ok(value)
    }

    pub fn vector_value(&self, point: &[f64; DIM]) -> Result<Array1<f64>, EvaluationError> {
        let mut values = Array1::zeros(self.components.len());
        for (component, value) in values.iter_mut().enumerate() {
            *value = self.value(point, component)?;
        }
        Ok(values)
    }
}
