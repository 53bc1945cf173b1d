//! Named parameters with one or more candidate values.
//!
//! A comparison is configured with a single [`Parameters`] set. Any name
//! given more than one candidate value is *varied*: the engine expands it
//! into one configuration per value. Inside a configuration the varied names
//! are pinned through an override table, so lookups always resolve to
//! exactly one value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Free-form text.
    Text(String),
}

impl ParamValue {
    /// Numeric view of this value (integers widen to `f64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view of this value. Floats with no fractional part qualify.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Boolean view of this value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text view of this value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
        }
    }

    /// Parse a command-line token: `true`/`false`, integer, float, else text.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.to_ascii_lowercase().as_str() {
            "true" | "yes" => return ParamValue::Bool(true),
            "false" | "no" => return ParamValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = token.parse::<i64>() {
            return ParamValue::Int(i);
        }
        if let Ok(f) = token.parse::<f64>() {
            return ParamValue::Float(f);
        }
        ParamValue::Text(token.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Int(i as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(i: usize) -> Self {
        ParamValue::Int(i as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

/// Errors raised when reading a parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("parameter '{0}' is not defined")]
    Missing(String),

    #[error("parameter '{0}' has more than one value")]
    MultipleValues(String),

    #[error("parameter '{0}' must have at least one value")]
    NoValues(String),

    #[error("parameter '{name}' expected {expected}, found {found} ({value})")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
        value: String,
    },
}

/// Ordered name → candidate-values mapping with an override table.
///
/// Lookups consult the override table first, then the candidate list. A
/// name with several candidates and no override cannot be read as a single
/// value ([`ParameterError::MultipleValues`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    values: IndexMap<String, Vec<ParamValue>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    overrides: IndexMap<String, ParamValue>,
}

impl Parameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parameter set seeded with the standard defaults.
    pub fn with_defaults() -> Self {
        let mut p = Self::new();
        p.set("numMeasures", 10);
        p.set("numLatents", 0);
        p.set("avgDegree", 2);
        p.set("maxDegree", 100);
        p.set("sampleSize", 1000);
        p.set("numRuns", 1);
        p.set("alpha", 0.001);
        p.set("penaltyDiscount", 4);
        p.set("depth", -1);
        p.set("coefLow", 0.5);
        p.set("coefHigh", 1.5);
        p.set("varLow", 1.0);
        p.set("varHigh", 3.0);
        p.set("percentDiscrete", 50);
        p.set("numCategories", 4);
        p.set("seed", 42);
        p
    }

    /// Set a single value, replacing any candidates.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), vec![value.into()]);
    }

    /// Set several candidate values.
    pub fn set_values(&mut self, name: &str, values: Vec<ParamValue>) -> Result<(), ParameterError> {
        if values.is_empty() {
            return Err(ParameterError::NoValues(name.to_string()));
        }
        self.values.insert(name.to_string(), values);
        Ok(())
    }

    /// Pin `name` to a single value for this set only.
    pub fn override_value(&mut self, name: &str, value: ParamValue) {
        self.overrides.insert(name.to_string(), value);
    }

    /// Names pinned through [`override_value`](Self::override_value), in order.
    pub fn overridden(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Candidate values for `name`.
    pub fn values(&self, name: &str) -> Option<&[ParamValue]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Number of candidate values (0 if undefined).
    pub fn num_values(&self, name: &str) -> usize {
        self.values.get(name).map_or(0, Vec::len)
    }

    /// Whether `name` has more than one candidate value.
    pub fn is_varied(&self, name: &str) -> bool {
        self.num_values(name) > 1
    }

    /// Whether `name` is defined at all.
    pub fn contains(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || self.values.contains_key(name)
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of defined names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no names are defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy every name of `other` into this set, replacing existing entries.
    pub fn extend_from(&mut self, other: &Parameters) {
        for (name, values) in &other.values {
            self.values.insert(name.clone(), values.clone());
        }
        for (name, value) in &other.overrides {
            self.overrides.insert(name.clone(), value.clone());
        }
    }

    /// The single effective value of `name`.
    pub fn get(&self, name: &str) -> Result<&ParamValue, ParameterError> {
        if let Some(v) = self.overrides.get(name) {
            return Ok(v);
        }
        match self.values.get(name).map(Vec::as_slice) {
            None => Err(ParameterError::Missing(name.to_string())),
            Some([]) => Err(ParameterError::NoValues(name.to_string())),
            Some([v]) => Ok(v),
            Some(_) => Err(ParameterError::MultipleValues(name.to_string())),
        }
    }

    /// The effective value if `name` resolves to exactly one, else the first
    /// candidate. Used for display only.
    pub fn first(&self, name: &str) -> Option<&ParamValue> {
        self.overrides
            .get(name)
            .or_else(|| self.values.get(name).and_then(|v| v.first()))
    }

    /// Read `name` as a float.
    pub fn get_f64(&self, name: &str) -> Result<f64, ParameterError> {
        let v = self.get(name)?;
        v.as_f64().ok_or_else(|| wrong_type(name, "number", v))
    }

    /// Read `name` as an integer.
    pub fn get_i64(&self, name: &str) -> Result<i64, ParameterError> {
        let v = self.get(name)?;
        v.as_i64().ok_or_else(|| wrong_type(name, "integer", v))
    }

    /// Read `name` as a non-negative integer.
    pub fn get_usize(&self, name: &str) -> Result<usize, ParameterError> {
        let v = self.get(name)?;
        v.as_i64()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| wrong_type(name, "non-negative integer", v))
    }

    /// Read `name` as a boolean.
    pub fn get_bool(&self, name: &str) -> Result<bool, ParameterError> {
        let v = self.get(name)?;
        v.as_bool().ok_or_else(|| wrong_type(name, "bool", v))
    }

    /// Read `name` as a float, falling back to `default` when undefined.
    pub fn get_f64_or(&self, name: &str, default: f64) -> Result<f64, ParameterError> {
        if self.contains(name) {
            self.get_f64(name)
        } else {
            Ok(default)
        }
    }

    /// Read `name` as a non-negative integer, falling back to `default`.
    pub fn get_usize_or(&self, name: &str, default: usize) -> Result<usize, ParameterError> {
        if self.contains(name) {
            self.get_usize(name)
        } else {
            Ok(default)
        }
    }

    /// Read `name` as a boolean, falling back to `default`.
    pub fn get_bool_or(&self, name: &str, default: bool) -> Result<bool, ParameterError> {
        if self.contains(name) {
            self.get_bool(name)
        } else {
            Ok(default)
        }
    }
}

fn wrong_type(name: &str, expected: &'static str, value: &ParamValue) -> ParameterError {
    ParameterError::WrongType {
        name: name.to_string(),
        expected,
        found: value.type_name(),
        value: value.to_string(),
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in &self.values {
            let joined: Vec<String> = match self.overrides.get(name) {
                Some(v) => vec![v.to_string()],
                None => values.iter().map(ToString::to_string).collect(),
            };
            writeln!(f, "{} = {}", name, joined.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varied_detection() {
        let mut p = Parameters::new();
        p.set("alpha", 0.01);
        p.set_values("depth", vec![1.into(), 2.into(), 3.into()]).unwrap();
        assert!(!p.is_varied("alpha"));
        assert!(p.is_varied("depth"));
        assert_eq!(p.num_values("depth"), 3);
        assert_eq!(p.num_values("missing"), 0);
    }

    #[test]
    fn test_multiple_values_need_override() {
        let mut p = Parameters::new();
        p.set_values("depth", vec![1.into(), 2.into()]).unwrap();
        assert_eq!(
            p.get_i64("depth"),
            Err(ParameterError::MultipleValues("depth".to_string()))
        );

        p.override_value("depth", ParamValue::Int(2));
        assert_eq!(p.get_i64("depth"), Ok(2));
    }

    #[test]
    fn test_typed_getters() {
        let mut p = Parameters::new();
        p.set("sampleSize", 500);
        p.set("alpha", 0.05);
        p.set("verbose", true);
        p.set("name", "pc");

        assert_eq!(p.get_usize("sampleSize"), Ok(500));
        assert_eq!(p.get_f64("sampleSize"), Ok(500.0));
        assert_eq!(p.get_f64("alpha"), Ok(0.05));
        assert_eq!(p.get_bool("verbose"), Ok(true));
        assert!(matches!(
            p.get_f64("name"),
            Err(ParameterError::WrongType { expected: "number", .. })
        ));
        assert_eq!(p.get_f64_or("undefined", 7.5), Ok(7.5));
    }

    #[test]
    fn test_negative_rejected_as_usize() {
        let mut p = Parameters::new();
        p.set("depth", -1);
        assert!(p.get_usize("depth").is_err());
        assert_eq!(p.get_i64("depth"), Ok(-1));
    }

    #[test]
    fn test_empty_values_rejected() {
        let mut p = Parameters::new();
        assert_eq!(
            p.set_values("x", vec![]),
            Err(ParameterError::NoValues("x".to_string()))
        );
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(ParamValue::parse("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse(" 12 "), ParamValue::Int(12));
        assert_eq!(ParamValue::parse("0.5"), ParamValue::Float(0.5));
        assert_eq!(ParamValue::parse("fges"), ParamValue::Text("fges".into()));
    }

    #[test]
    fn test_json_round_trip_preserves_types() {
        let json = r#"{"values":{"sampleSize":[100,500],"alpha":[0.01],"flag":[true]}}"#;
        let p: Parameters = serde_json::from_str(json).unwrap();
        assert_eq!(p.values("sampleSize"), Some(&[ParamValue::Int(100), ParamValue::Int(500)][..]));
        assert_eq!(p.get_f64("alpha"), Ok(0.01));
        assert_eq!(p.get_bool("flag"), Ok(true));
        assert_eq!(p.names().collect::<Vec<_>>(), vec!["sampleSize", "alpha", "flag"]);
    }

    #[test]
    fn test_display_lists_effective_values() {
        let mut p = Parameters::new();
        p.set_values("depth", vec![1.into(), 2.into()]).unwrap();
        p.set("alpha", 0.5);
        assert_eq!(p.to_string(), "depth = 1,2\nalpha = 0.5\n");
        p.override_value("depth", 2.into());
        assert_eq!(p.to_string(), "depth = 2\nalpha = 0.5\n");
    }
}
