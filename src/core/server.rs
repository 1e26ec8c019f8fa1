/// Tool Server
///
/// A `ToolServer` is a named, citation-tagged registry of callable tools. Tools
/// are registered during initialization through `&mut self`; `run` then moves
/// the server into its serving state, after which the table is immutable and
/// shared across dispatch threads.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::config::TransportConfig;
use crate::core::error::{Result, ToolServerError};
use crate::core::logger::ServerLogger;
use crate::core::tool::{RegisteredHandler, ToolDescriptor, ToolFn};
use crate::core::transport;

pub struct ToolServer {
    name: String,
    origin_citation: String,
    mcp_citation: String,
    /// Registered tools in insertion order (for listing)
    tools: Vec<ToolDescriptor>,
    /// Tool name to position in `tools` (for lookup)
    index: HashMap<String, usize>,
    logger: ServerLogger,
}

impl ToolServer {
    /// Create a server with its metadata.
    ///
    /// Fails with `Configuration` if `name` is empty or only whitespace.
    pub fn new(
        name: impl Into<String>,
        origin_citation: impl Into<String>,
        mcp_citation: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ToolServerError::Configuration(
                "server name must not be empty".to_string(),
            ));
        }

        let logger = ServerLogger::new(&name);
        Ok(Self {
            name,
            origin_citation: origin_citation.into(),
            mcp_citation: mcp_citation.into(),
            tools: Vec::new(),
            index: HashMap::new(),
            logger,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin_citation(&self) -> &str {
        &self.origin_citation
    }

    pub fn mcp_citation(&self) -> &str {
        &self.mcp_citation
    }

    pub fn logger(&self) -> &ServerLogger {
        &self.logger
    }

    /// Register a tool under its own identifier.
    pub fn tool(&mut self, tool: ToolFn) -> Result<RegisteredHandler> {
        self.register_tool(tool, None)
    }

    /// Register a tool, optionally under a different name.
    ///
    /// Names are unique per server. Registering under a name that is already
    /// taken replaces the earlier tool (last write wins); the replacement keeps
    /// the earlier tool's position in `list_tools`.
    ///
    /// The returned handler calls the function directly, bypassing validation.
    pub fn register_tool(
        &mut self,
        tool: ToolFn,
        override_name: Option<&str>,
    ) -> Result<RegisteredHandler> {
        let descriptor = tool.into_descriptor(override_name)?;
        let registered =
            RegisteredHandler::new(descriptor.name.clone(), Arc::clone(&descriptor.handler));

        match self.index.get(&descriptor.name) {
            Some(&slot) => {
                self.logger
                    .warn(format!("Replacing previously registered tool: {}", descriptor.name));
                self.tools[slot] = descriptor;
            }
            None => {
                self.index.insert(descriptor.name.clone(), self.tools.len());
                self.tools.push(descriptor);
            }
        }

        self.logger.debug(format!("Registered tool: {}", registered.name()));
        Ok(registered)
    }

    /// Registered tools in insertion order.
    pub fn list_tools(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().collect()
    }

    /// Tool definitions as served by `tools/list`.
    pub fn tool_definitions(&self) -> Vec<Value> {
        self.tools.iter().map(ToolDescriptor::definition).collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Invoke a tool by name.
    ///
    /// Arguments are validated and coerced before the handler runs. A handler
    /// error or panic is logged and returned as `ToolExecution`; the server
    /// stays usable afterwards.
    pub fn invoke(&self, tool_name: &str, arguments: Map<String, Value>) -> Result<Value> {
        let descriptor = self
            .get_tool(tool_name)
            .ok_or_else(|| ToolServerError::ToolNotFound(tool_name.to_string()))?;

        let args = descriptor.bind(arguments)?;
        self.logger.debug(format!("Invoking tool: {}", tool_name));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (descriptor.handler)(args)));
        let error = match outcome {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(source)) => ToolServerError::ToolExecution {
                tool: tool_name.to_string(),
                message: source.to_string(),
                source: Some(source),
            },
            Err(payload) => ToolServerError::ToolExecution {
                tool: tool_name.to_string(),
                message: panic_message(payload.as_ref()),
                source: None,
            },
        };

        self.logger.error(&error);
        Err(error)
    }

    /// Serve this server until the channel closes or shutdown is requested.
    ///
    /// Registration is over once this is called: the server is moved into
    /// shared, read-only serving state. Per-request failures are answered on
    /// the channel; only a failure of the channel itself is returned.
    pub async fn run(self, transport: TransportConfig) -> Result<()> {
        transport::serve(Arc::new(self), transport).await
    }
}

impl std::fmt::Debug for ToolServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolServer")
            .field("name", &self.name)
            .field("origin_citation", &self.origin_citation)
            .field("mcp_citation", &self.mcp_citation)
            .field("tools", &self.tools)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {}", message)
    } else {
        "handler panicked".to_string()
    }
}
