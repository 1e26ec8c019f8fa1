/// Tool Definitions
///
/// `ToolFn` is a plain function together with its declared signature: the
/// identifier it would be registered under, its documentation text, its
/// parameters and its return type. Registering a `ToolFn` on a server turns it
/// into an immutable `ToolDescriptor`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::error::{ArgumentProblem, HandlerError, Result, ToolServerError};
use crate::core::schema::{self, ParamSpec, ParamType};

/// Tool handler function type.
///
/// Handlers receive validated, coerced arguments and return a JSON result or
/// an error. They must be Send + Sync because a serving server dispatches
/// calls from several threads at once.
pub type ToolHandler = Arc<dyn Fn(Arguments) -> std::result::Result<Value, HandlerError> + Send + Sync>;

/// Arguments passed to a tool handler, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String argument `name`.
    pub fn str(&self, name: &str) -> std::result::Result<&str, HandlerError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("Missing string argument: {}", name).into())
    }

    /// Argument `name` deserialized into `T`.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> std::result::Result<T, HandlerError> {
        let value = self
            .get(name)
            .cloned()
            .ok_or_else(|| format!("Missing argument: {}", name))?;
        Ok(serde_json::from_value(value)?)
    }

    /// All arguments deserialized into one struct.
    pub fn parse<T: DeserializeOwned>(&self) -> std::result::Result<T, HandlerError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self(values)
    }
}

/// A function plus its declared signature, ready to be registered.
///
/// ```ignore
/// let echo = ToolFn::new("echo", |args: Arguments| -> Result<String, HandlerError> {
///     Ok(format!("processed: {}", args.str("param")?))
/// })
/// .doc("Echo a parameter back.")
/// .param(ParamSpec::required("param", ParamType::String))
/// .returns(ParamType::String);
/// ```
pub struct ToolFn {
    ident: String,
    doc: Option<String>,
    params: Vec<ParamSpec>,
    returns: Option<ParamType>,
    handler: ToolHandler,
}

impl ToolFn {
    pub fn new<F, R, E>(ident: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arguments) -> std::result::Result<R, E> + Send + Sync + 'static,
        R: Serialize,
        E: Into<HandlerError>,
    {
        let handler: ToolHandler = Arc::new(move |args: Arguments| -> std::result::Result<Value, HandlerError> {
            let output = f(args).map_err(Into::into)?;
            Ok(serde_json::to_value(output)?)
        });
        Self {
            ident: ident.into(),
            doc: None,
            params: Vec::new(),
            returns: None,
            handler,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: ParamType) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Build the descriptor this function registers as.
    pub(crate) fn into_descriptor(self, override_name: Option<&str>) -> Result<ToolDescriptor> {
        let name = match override_name {
            Some(name) if name.trim().is_empty() => {
                return Err(ToolServerError::Registration(
                    "tool name override must not be empty".to_string(),
                ));
            }
            Some(name) => name.to_string(),
            None if self.ident.trim().is_empty() => {
                return Err(ToolServerError::Registration(
                    "tool has no identifier and no name override".to_string(),
                ));
            }
            None => self.ident.clone(),
        };

        for (i, param) in self.params.iter().enumerate() {
            if param.name.trim().is_empty() {
                return Err(ToolServerError::Registration(format!(
                    "tool `{}` declares a parameter with an empty name",
                    name
                )));
            }
            if self.params[..i].iter().any(|p| p.name == param.name) {
                return Err(ToolServerError::Registration(format!(
                    "tool `{}` declares parameter `{}` twice",
                    name, param.name
                )));
            }
            if let Some(default) = &param.default {
                param.accept(default.clone()).map_err(|reason| {
                    ToolServerError::Registration(format!(
                        "tool `{}` parameter `{}` has an invalid default: {}",
                        name, param.name, reason
                    ))
                })?;
            }
        }

        Ok(ToolDescriptor {
            name,
            description: self.doc.as_deref().map(clean_doc).unwrap_or_default(),
            parameters: self.params,
            return_type: self.returns,
            handler: self.handler,
        })
    }
}

impl fmt::Debug for ToolFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFn")
            .field("ident", &self.ident)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Immutable metadata of a registered tool, plus its handler.
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
    /// `None` when the function declared no return type
    pub return_type: Option<ParamType>,
    pub(crate) handler: ToolHandler,
}

impl ToolDescriptor {
    /// MCP `inputSchema` for this tool.
    pub fn input_schema(&self) -> Value {
        schema::input_schema(&self.parameters)
    }

    /// Tool entry as served by `tools/list`.
    pub fn definition(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema()
        })
    }

    /// Validate and coerce supplied arguments against the declared parameters.
    ///
    /// Every problem is collected so the caller sees all offending parameters
    /// at once. Missing optional parameters are filled with their defaults.
    pub fn bind(&self, mut supplied: Map<String, Value>) -> Result<Arguments> {
        let mut problems: Vec<ArgumentProblem> = supplied
            .keys()
            .filter(|key| !self.parameters.iter().any(|p| &p.name == *key))
            .map(|key| ArgumentProblem::new(key.as_str(), "unexpected parameter"))
            .collect();

        let mut bound = Map::new();
        for param in &self.parameters {
            match supplied.remove(&param.name) {
                Some(value) => match param.accept(value) {
                    Ok(value) => {
                        bound.insert(param.name.clone(), value);
                    }
                    Err(reason) => problems.push(ArgumentProblem::new(&param.name, reason)),
                },
                None => match &param.default {
                    Some(default) => {
                        bound.insert(param.name.clone(), default.clone());
                    }
                    None => problems.push(ArgumentProblem::new(
                        &param.name,
                        "missing required parameter",
                    )),
                },
            }
        }

        if problems.is_empty() {
            Ok(Arguments(bound))
        } else {
            Err(ToolServerError::InvalidArguments {
                tool: self.name.clone(),
                problems,
            })
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// The original function, as handed back by registration.
///
/// Calling it runs the handler directly, without schema validation, so the
/// underlying function stays testable on its own.
#[derive(Clone)]
pub struct RegisteredHandler {
    name: String,
    handler: ToolHandler,
}

impl RegisteredHandler {
    pub(crate) fn new(name: String, handler: ToolHandler) -> Self {
        Self { name, handler }
    }

    /// Effective tool name this handler was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: Map<String, Value>) -> std::result::Result<Value, HandlerError> {
        (self.handler)(Arguments(args))
    }
}

impl fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Normalize documentation text into a tool description.
///
/// The whole block is kept. Common leading indentation is removed, trailing
/// whitespace is trimmed from each line, and blank lines at either end are
/// dropped.
fn clean_doc(doc: &str) -> String {
    let lines: Vec<&str> = doc.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let lines = &lines[start..=end];

    // Only ASCII indentation is removed, so the cut below stays on a char boundary.
    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop() -> ToolFn {
        ToolFn::new("noop", |_args: Arguments| -> std::result::Result<Value, HandlerError> {
            Ok(Value::Null)
        })
    }

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn doc_keeps_whole_block_dedented() {
        let doc = "\n    Basic function for testing.\n\n    Args:\n        param: Input parameter\n    ";
        assert_eq!(
            clean_doc(doc),
            "Basic function for testing.\n\nArgs:\n    param: Input parameter"
        );
        assert_eq!(clean_doc("   \n  "), "");
    }

    #[test]
    fn doc_with_wide_space_indent_keeps_text() {
        let doc = "  \u{3000}Wide indented line.\n   Plain line.";
        assert_eq!(clean_doc(doc), "\u{3000}Wide indented line.\n Plain line.");
    }

    #[test]
    fn missing_doc_gives_empty_description() {
        let descriptor = noop().into_descriptor(None).unwrap();
        assert_eq!(descriptor.name, "noop");
        assert_eq!(descriptor.description, "");
        assert_eq!(descriptor.return_type, None);
    }

    #[test]
    fn override_name_wins() {
        let descriptor = noop().into_descriptor(Some("renamed")).unwrap();
        assert_eq!(descriptor.name, "renamed");
    }

    #[test]
    fn nameless_tool_is_rejected() {
        let nameless = ToolFn::new("", |_args: Arguments| -> std::result::Result<Value, HandlerError> {
            Ok(Value::Null)
        });
        let err = nameless.into_descriptor(None).unwrap_err();
        assert!(matches!(err, ToolServerError::Registration(_)));
        assert!(matches!(
            noop().into_descriptor(Some(" ")).unwrap_err(),
            ToolServerError::Registration(_)
        ));
    }

    #[test]
    fn duplicate_and_bad_default_params_are_rejected() {
        let dup = noop()
            .param(ParamSpec::required("a", ParamType::String))
            .param(ParamSpec::required("a", ParamType::Integer));
        assert!(matches!(
            dup.into_descriptor(None).unwrap_err(),
            ToolServerError::Registration(_)
        ));

        let bad_default = noop().param(ParamSpec::optional("n", ParamType::Integer, "many"));
        assert!(matches!(
            bad_default.into_descriptor(None).unwrap_err(),
            ToolServerError::Registration(_)
        ));
    }

    #[test]
    fn bind_fills_defaults_and_coerces() {
        let descriptor = noop()
            .param(ParamSpec::required("count", ParamType::Integer))
            .param(ParamSpec::optional("option", ParamType::String, "default"))
            .into_descriptor(None)
            .unwrap();

        let args = descriptor.bind(map(json!({ "count": "3" }))).unwrap();
        assert_eq!(args.get("count"), Some(&json!(3)));
        assert_eq!(args.get("option"), Some(&json!("default")));
    }

    #[test]
    fn bind_reports_all_problems() {
        let descriptor = noop()
            .param(ParamSpec::required("param", ParamType::String))
            .param(ParamSpec::required("flag", ParamType::Boolean))
            .into_descriptor(None)
            .unwrap();

        let err = descriptor
            .bind(map(json!({ "badKey": "x", "flag": "sometimes" })))
            .unwrap_err();
        assert_eq!(err.offending_parameters(), vec!["badKey", "param", "flag"]);
    }

    #[test]
    fn arguments_accessors() {
        #[derive(serde::Deserialize)]
        struct Input {
            param: String,
            count: u32,
        }

        let args = Arguments::new(map(json!({ "param": "hi", "count": 2 })));
        assert_eq!(args.str("param").unwrap(), "hi");
        assert_eq!(args.value::<u32>("count").unwrap(), 2);
        assert!(args.str("count").is_err());
        assert!(args.value::<u32>("absent").is_err());

        let input: Input = args.parse().unwrap();
        assert_eq!(input.param, "hi");
        assert_eq!(input.count, 2);
    }

    #[test]
    fn definition_matches_mcp_listing_shape() {
        let descriptor = noop()
            .doc("Does nothing.")
            .param(ParamSpec::required("param", ParamType::String))
            .into_descriptor(None)
            .unwrap();

        assert_eq!(
            descriptor.definition(),
            json!({
                "name": "noop",
                "description": "Does nothing.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "param": { "type": "string" } },
                    "required": ["param"]
                }
            })
        );
    }
}
