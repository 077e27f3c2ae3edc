//! Parameter schemas and argument coercion.
//!
//! A [`ParameterSchema`] is the ordered list of parameters a tool accepts.
//! Incoming JSON arguments are checked against it before the handler runs; the
//! result is an [`Arguments`] map holding only canonical, coerced values.

use std::num::IntErrorKind;

use serde_json::{Map, Number, Value, json};
use thiserror::Error;
use tracing::debug;

use crate::registry::{ToolError, ToolResult};

/// Value type declared for a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    /// Signed integer of up to 128 bits. Numeric strings are coerced.
    Integer,
    /// UTF-8 string.
    String,
}

impl ParamType {
    /// Returns the JSON Schema type keyword.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Constraint {
    None,
    Range { min: i64, max: i64 },
    OneOf(Vec<String>),
}

/// Declaration of a single tool parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    name: String,
    ty: ParamType,
    required: bool,
    description: Option<String>,
    constraint: Constraint,
}

impl ParamSpec {
    fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            description: None,
            constraint: Constraint::None,
        }
    }

    /// Declares a required integer parameter.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer)
    }

    /// Declares a required string parameter.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    /// Marks the parameter as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restricts an integer parameter to the inclusive range `min..=max`.
    #[must_use]
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.constraint = Constraint::Range { min, max };
        self
    }

    /// Restricts a string parameter to a closed set of values.
    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint = Constraint::OneOf(values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn ty(&self) -> ParamType {
        self.ty
    }

    /// Returns `true` when the parameter must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn coerce(&self, value: &Value) -> Result<Value, ArgumentError> {
        let coerced = match self.ty {
            ParamType::Integer => integer_value(self.coerce_integer(value)?),
            ParamType::String => {
                let Value::String(text) = value else {
                    return Err(ArgumentError::new(&self.name, "expected a string"));
                };
                if let Constraint::OneOf(allowed) = &self.constraint {
                    if !allowed.iter().any(|candidate| candidate == text) {
                        return Err(ArgumentError::new(
                            &self.name,
                            format!("`{text}` is not one of: {}", allowed.join(", ")),
                        ));
                    }
                }
                Value::String(text.clone())
            }
        };
        Ok(coerced)
    }

    fn coerce_integer(&self, value: &Value) -> Result<i128, ArgumentError> {
        let parsed =
            parse_integer(value).map_err(|reason| ArgumentError::new(&self.name, reason))?;

        if let Constraint::Range { min, max } = self.constraint {
            if parsed < i128::from(min) || parsed > i128::from(max) {
                return Err(ArgumentError::new(
                    &self.name,
                    format!("{parsed} is outside the range {min}..={max}"),
                ));
            }
        }
        Ok(parsed)
    }

    fn to_json_schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), Value::from(self.ty.json_type()));
        if let Some(description) = &self.description {
            property.insert("description".into(), Value::from(description.clone()));
        }
        match &self.constraint {
            Constraint::None => {}
            Constraint::Range { min, max } => {
                property.insert("minimum".into(), Value::from(*min));
                property.insert("maximum".into(), Value::from(*max));
            }
            Constraint::OneOf(values) => {
                property.insert("enum".into(), Value::from(values.clone()));
            }
        }
        Value::Object(property)
    }
}

const NOT_AN_INTEGER: &str = "expected an integer";
const OUT_OF_RANGE: &str = "integer out of supported range";

// JSON numbers past u64 arrive as floats; anything integral at or beyond 2^63
// is a whole number we cannot hold rather than a fraction.
const FLOAT_INTEGER_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn parse_integer(value: &Value) -> Result<i128, &'static str> {
    match value {
        Value::Number(number) => number_to_integer(number),
        Value::String(text) => text.trim().parse::<i128>().map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => OUT_OF_RANGE,
            _ => NOT_AN_INTEGER,
        }),
        _ => Err(NOT_AN_INTEGER),
    }
}

fn number_to_integer(number: &Number) -> Result<i128, &'static str> {
    if let Some(n) = number.as_i64() {
        return Ok(i128::from(n));
    }
    if let Some(n) = number.as_u64() {
        return Ok(i128::from(n));
    }
    match number.as_f64() {
        Some(f) if f.trunc() == f && f.abs() >= FLOAT_INTEGER_LIMIT => Err(OUT_OF_RANGE),
        _ => Err(NOT_AN_INTEGER),
    }
}

// Values outside the JSON number range are kept as decimal strings.
fn integer_value(n: i128) -> Value {
    if let Ok(n) = i64::try_from(n) {
        Value::from(n)
    } else if let Ok(n) = u64::try_from(n) {
        Value::from(n)
    } else {
        Value::String(n.to_string())
    }
}

/// Ordered set of parameters accepted by a tool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl ParameterSchema {
    /// Schema for tools that take no arguments.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a parameter declaration.
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Returns the declared parameters in order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Returns `true` when no parameters are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the first parameter name declared more than once, if any.
    pub(crate) fn duplicate_param(&self) -> Option<&str> {
        self.params.iter().enumerate().find_map(|(idx, spec)| {
            self.params[..idx]
                .iter()
                .any(|earlier| earlier.name == spec.name)
                .then_some(spec.name.as_str())
        })
    }

    /// Validates raw JSON arguments and returns the coerced argument map.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError`] naming the first parameter that is missing,
    /// has the wrong type, or violates its constraint.
    pub fn validate(&self, raw: &Value) -> Result<Arguments, ArgumentError> {
        let empty = Map::new();
        let supplied = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(ArgumentError::new("arguments", "expected a JSON object")),
        };

        let mut values = Map::new();
        for spec in &self.params {
            match supplied.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(ArgumentError::new(&spec.name, "missing required parameter"));
                    }
                }
                Some(value) => {
                    values.insert(spec.name.clone(), spec.coerce(value)?);
                }
            }
        }

        for key in supplied.keys() {
            if !self.params.iter().any(|spec| &spec.name == key) {
                debug!(argument = %key, "ignoring undeclared argument");
            }
        }

        Ok(Arguments { values })
    }

    /// Renders the schema as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|spec| (spec.name.clone(), spec.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Validated and coerced arguments handed to a tool handler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Returns the integer argument `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the argument is absent or
    /// not an integer.
    pub fn integer(&self, name: &str) -> ToolResult<i128> {
        self.optional_integer(name)?
            .ok_or_else(|| ToolError::invalid_argument(name, "missing required parameter"))
    }

    /// Returns the integer argument `name` if it was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the value is not an integer.
    pub fn optional_integer(&self, name: &str) -> ToolResult<Option<i128>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => parse_integer(value)
                .map(Some)
                .map_err(|reason| ToolError::invalid_argument(name, reason)),
        }
    }

    /// Returns the string argument `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the argument is absent or
    /// not a string.
    pub fn string(&self, name: &str) -> ToolResult<&str> {
        self.optional_string(name)?
            .ok_or_else(|| ToolError::invalid_argument(name, "missing required parameter"))
    }

    /// Returns the string argument `name` if it was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the value is not a string.
    pub fn optional_string(&self, name: &str) -> ToolResult<Option<&str>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| ToolError::invalid_argument(name, "expected a string")),
        }
    }

    /// Returns the underlying map of coerced values.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns `true` when no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// Argument validation failure for a single named parameter.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid argument `{field}`: {reason}")]
pub struct ArgumentError {
    /// Name of the offending parameter.
    pub field: String,
    /// Human-readable reason for rejection.
    pub reason: String,
}

impl ArgumentError {
    /// Creates a new argument error.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_schema() -> ParameterSchema {
        ParameterSchema::empty()
            .param(ParamSpec::integer("a"))
            .param(ParamSpec::integer("b"))
    }

    #[test]
    fn accepts_integers_and_numeric_strings() {
        let args = add_schema()
            .validate(&json!({"a": 2, "b": " 3 "}))
            .unwrap();
        assert_eq!(args.integer("a").unwrap(), 2);
        assert_eq!(args.integer("b").unwrap(), 3);
    }

    #[test]
    fn accepts_integers_beyond_i64() {
        let args = add_schema()
            .validate(&json!({"a": u64::MAX, "b": "-170141183460469231731687303715884105728"}))
            .unwrap();
        assert_eq!(args.integer("a").unwrap(), i128::from(u64::MAX));
        assert_eq!(args.integer("b").unwrap(), i128::MIN);
        assert_eq!(
            args.as_map()["b"],
            json!("-170141183460469231731687303715884105728")
        );
    }

    #[test]
    fn oversized_integers_are_out_of_range() {
        let err = add_schema()
            .validate(&json!({"a": "170141183460469231731687303715884105728", "b": 1}))
            .unwrap_err();
        assert_eq!(err, ArgumentError::new("a", OUT_OF_RANGE));

        let err = add_schema()
            .validate(&json!({"a": 1, "b": 1e30}))
            .unwrap_err();
        assert_eq!(err, ArgumentError::new("b", OUT_OF_RANGE));

        let err = add_schema().validate(&json!({"a": 1.5, "b": 1})).unwrap_err();
        assert_eq!(err, ArgumentError::new("a", NOT_AN_INTEGER));
    }

    #[test]
    fn rejects_non_numeric_text() {
        let err = add_schema()
            .validate(&json!({"a": "x", "b": 2}))
            .expect_err("non-numeric text should fail");
        assert_eq!(err.field, "a");
    }

    #[test]
    fn rejects_floats_and_booleans() {
        let err = add_schema().validate(&json!({"a": 1.5, "b": 2})).unwrap_err();
        assert_eq!(err.field, "a");

        let err = add_schema().validate(&json!({"a": 1, "b": true})).unwrap_err();
        assert_eq!(err.field, "b");
    }

    #[test]
    fn reports_missing_required_parameter() {
        let err = add_schema().validate(&json!({"a": 1})).unwrap_err();
        assert_eq!(err, ArgumentError::new("b", "missing required parameter"));

        let err = add_schema().validate(&json!({"a": 1, "b": null})).unwrap_err();
        assert_eq!(err.field, "b");
    }

    #[test]
    fn null_arguments_mean_empty_object() {
        let args = ParameterSchema::empty().validate(&Value::Null).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn rejects_non_object_arguments() {
        let err = add_schema().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "arguments");
    }

    #[test]
    fn optional_parameters_may_be_absent() {
        let schema = ParameterSchema::empty().param(ParamSpec::string("label").optional());
        let args = schema.validate(&json!({})).unwrap();
        assert_eq!(args.optional_string("label").unwrap(), None);
    }

    #[test]
    fn undeclared_arguments_are_dropped() {
        let args = add_schema()
            .validate(&json!({"a": 1, "b": 2, "c": 3}))
            .unwrap();
        assert_eq!(args.as_map().len(), 2);
    }

    #[test]
    fn enforces_integer_range() {
        let schema = ParameterSchema::empty().param(ParamSpec::integer("row").range(1, 4));
        assert!(schema.validate(&json!({"row": 4})).is_ok());
        let err = schema.validate(&json!({"row": 5})).unwrap_err();
        assert_eq!(err.field, "row");
        let err = schema.validate(&json!({"row": 0})).unwrap_err();
        assert_eq!(err.field, "row");
    }

    #[test]
    fn enforces_closed_string_set() {
        let schema =
            ParameterSchema::empty().param(ParamSpec::string("widget").one_of(["clock", "note"]));
        assert!(schema.validate(&json!({"widget": "note"})).is_ok());
        let err = schema.validate(&json!({"widget": "weather"})).unwrap_err();
        assert_eq!(err.field, "widget");
        assert!(err.reason.contains("clock, note"));
    }

    #[test]
    fn detects_duplicate_parameter_names() {
        let schema = add_schema().param(ParamSpec::string("a"));
        assert_eq!(schema.duplicate_param(), Some("a"));
        assert_eq!(add_schema().duplicate_param(), None);
    }

    #[test]
    fn renders_json_schema() {
        let schema = ParameterSchema::empty()
            .param(ParamSpec::integer("row").range(1, 4).describe("Row index"))
            .param(ParamSpec::string("label").optional());
        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["row"]["minimum"], 1);
        assert_eq!(rendered["properties"]["row"]["maximum"], 4);
        assert_eq!(rendered["properties"]["row"]["description"], "Row index");
        assert_eq!(rendered["properties"]["label"]["type"], "string");
        assert_eq!(rendered["required"], json!(["row"]));
    }
}
