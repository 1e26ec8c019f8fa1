/// Error Types for the Tool Server Runtime
///
/// Every failure the runtime reports falls into one of the variants below.
/// Lookup and validation errors are raised before a handler runs; handler
/// failures are always wrapped in `ToolExecution`; only `Transport` ends a
/// serving loop.

use std::fmt;

use thiserror::Error;

/// Boxed error type returned by tool handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, ToolServerError>;

/// One rejected argument, as reported inside `InvalidArguments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentProblem {
    /// Parameter name at fault (the supplied key for unknown parameters)
    pub parameter: String,
    /// Why the argument was rejected
    pub reason: String,
}

impl ArgumentProblem {
    pub fn new(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ArgumentProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.parameter, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ToolServerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Registration error: {0}")]
    Registration(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Invalid arguments for tool `{tool}`: {}", join_problems(.problems))]
    InvalidArguments {
        tool: String,
        problems: Vec<ArgumentProblem>,
    },

    #[error("Tool `{tool}` failed: {message}")]
    ToolExecution {
        tool: String,
        message: String,
        #[source]
        source: Option<HandlerError>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl ToolServerError {
    /// Stable snake_case tag used in structured wire responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Registration(_) => "registration_error",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::ToolExecution { .. } => "tool_execution_error",
            Self::Transport(_) => "transport_error",
        }
    }

    /// Names of the parameters at fault, in reporting order.
    ///
    /// Empty for every variant other than `InvalidArguments`.
    pub fn offending_parameters(&self) -> Vec<&str> {
        match self {
            Self::InvalidArguments { problems, .. } => {
                problems.iter().map(|p| p.parameter.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn join_problems(problems: &[ArgumentProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_arguments_message_names_every_parameter() {
        let err = ToolServerError::InvalidArguments {
            tool: "echo".to_string(),
            problems: vec![
                ArgumentProblem::new("badKey", "unexpected parameter"),
                ArgumentProblem::new("param", "missing required parameter"),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("`echo`"));
        assert!(message.contains("`badKey`: unexpected parameter"));
        assert!(message.contains("`param`: missing required parameter"));
        assert_eq!(err.offending_parameters(), vec!["badKey", "param"]);
        assert_eq!(err.kind(), "invalid_arguments");
    }

    #[test]
    fn execution_error_keeps_source() {
        let source: HandlerError = "disk on fire".into();
        let err = ToolServerError::ToolExecution {
            tool: "burn".to_string(),
            message: source.to_string(),
            source: Some(source),
        };

        assert_eq!(err.to_string(), "Tool `burn` failed: disk on fire");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.offending_parameters().is_empty());
    }
}
