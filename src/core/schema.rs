/// Parameter Schemas
///
/// A tool declares its inputs once, at registration time, as an ordered list
/// of `ParamSpec`s. The same data drives argument validation on every call and
/// the JSON Schema advertised in `tools/list`.

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Declared type of a tool parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl ParamType {
    /// JSON Schema `type` keyword, or `None` for `Any`.
    pub fn json_type(self) -> Option<&'static str> {
        match self {
            Self::String => Some("string"),
            Self::Integer => Some("integer"),
            Self::Number => Some("number"),
            Self::Boolean => Some("boolean"),
            Self::Object => Some("object"),
            Self::Array => Some("array"),
            Self::Any => None,
        }
    }

    /// Coerce a supplied JSON value to this type.
    ///
    /// Coercion is lax in the usual direction: numeric and boolean strings are
    /// accepted for numeric and boolean parameters, but nothing is stringified.
    /// On failure the error is a short human-readable reason.
    pub fn coerce(self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (Self::Any, value) => Ok(value),
            (Self::String, Value::String(s)) => Ok(Value::String(s)),
            (Self::Integer, Value::Number(n)) => integer_from_number(&n)
                .map(Value::Number)
                .ok_or_else(|| format!("expected integer, got {}", n)),
            (Self::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|i| Value::Number(i.into()))
                .map_err(|_| format!("expected integer, got string {:?}", s)),
            (Self::Number, Value::Number(n)) => Ok(Value::Number(n)),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("expected number, got string {:?}", s)),
            (Self::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
            (Self::Boolean, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(format!("expected boolean, got string {:?}", s)),
            },
            (Self::Boolean, Value::Number(n)) => match n.as_u64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(format!("expected boolean, got {}", n)),
            },
            (Self::Object, Value::Object(o)) => Ok(Value::Object(o)),
            (Self::Array, Value::Array(a)) => Ok(Value::Array(a)),
            (expected, other) => Err(format!(
                "expected {}, got {}",
                expected.json_type().unwrap_or("any"),
                json_kind(&other)
            )),
        }
    }
}

fn integer_from_number(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return Some(n.clone());
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Number::from(f as i64))
    } else {
        None
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared parameter of a tool.
///
/// A parameter is required exactly when it has no default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: ParamType, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default.into()),
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Coerce a supplied argument for this parameter.
    ///
    /// `null` is accepted only when the parameter's default is `null`.
    pub fn accept(&self, value: Value) -> Result<Value, String> {
        if value.is_null() && matches!(self.default, Some(Value::Null)) {
            return Ok(Value::Null);
        }
        self.ty.coerce(value)
    }

    fn property_schema(&self) -> Value {
        let mut property = Map::new();
        if let Some(ty) = self.ty.json_type() {
            property.insert("type".to_string(), Value::String(ty.to_string()));
        }
        if let Some(default) = &self.default {
            property.insert("default".to_string(), default.clone());
        }
        if let Some(description) = &self.description {
            property.insert("description".to_string(), Value::String(description.clone()));
        }
        Value::Object(property)
    }
}

/// Render an ordered parameter list as an MCP `inputSchema` object.
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.clone(), p.property_schema()))
        .collect();
    let required: Vec<Value> = params
        .iter()
        .filter(|p| p.is_required())
        .map(|p| Value::String(p.name.clone()))
        .collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_coercion() {
        assert_eq!(ParamType::Integer.coerce(json!(7)), Ok(json!(7)));
        assert_eq!(ParamType::Integer.coerce(json!(7.0)), Ok(json!(7)));
        assert_eq!(ParamType::Integer.coerce(json!("42")), Ok(json!(42)));
        assert!(ParamType::Integer.coerce(json!(7.5)).is_err());
        assert!(ParamType::Integer.coerce(json!(true)).is_err());
        assert!(ParamType::Integer.coerce(json!(9.223372036854775808e18)).is_err());
        assert_eq!(
            ParamType::Integer.coerce(json!(-9.223372036854775808e18)),
            Ok(json!(i64::MIN))
        );
    }

    #[test]
    fn string_is_not_stringified() {
        assert_eq!(ParamType::String.coerce(json!("x")), Ok(json!("x")));
        let err = ParamType::String.coerce(json!(3)).unwrap_err();
        assert_eq!(err, "expected string, got number");
    }

    #[test]
    fn boolean_and_number_coercion() {
        assert_eq!(ParamType::Boolean.coerce(json!("TRUE")), Ok(json!(true)));
        assert_eq!(ParamType::Boolean.coerce(json!(0)), Ok(json!(false)));
        assert!(ParamType::Boolean.coerce(json!("maybe")).is_err());
        assert_eq!(ParamType::Number.coerce(json!("1.5")), Ok(json!(1.5)));
        assert!(ParamType::Number.coerce(json!("NaN")).is_err());
    }

    #[test]
    fn null_only_for_null_default() {
        let nullable = ParamSpec::optional("tag", ParamType::String, Value::Null);
        let plain = ParamSpec::optional("tag", ParamType::String, "x");
        assert_eq!(nullable.accept(Value::Null), Ok(Value::Null));
        assert!(plain.accept(Value::Null).is_err());
    }

    #[test]
    fn schema_lists_required_and_defaults() {
        let params = vec![
            ParamSpec::required("param", ParamType::String).describe("Input parameter"),
            ParamSpec::optional("option", ParamType::String, "default"),
        ];

        assert_eq!(
            input_schema(&params),
            json!({
                "type": "object",
                "properties": {
                    "param": { "type": "string", "description": "Input parameter" },
                    "option": { "type": "string", "default": "default" }
                },
                "required": ["param"]
            })
        );
    }
}
