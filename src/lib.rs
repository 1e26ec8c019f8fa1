//! Tool registration and invocation runtime for MCP packages.
//!
//! A package builds one [`ToolServer`], registers its tools as [`ToolFn`]s
//! during initialization, and hands the server to [`ToolServer::run`] to serve
//! them over stdio or HTTP.

pub mod core;
pub mod packages;

pub use crate::core::config::{HttpConfig, TransportConfig};
pub use crate::core::error::{ArgumentProblem, HandlerError, Result, ToolServerError};
pub use crate::core::logger::ServerLogger;
pub use crate::core::schema::{ParamSpec, ParamType};
pub use crate::core::server::ToolServer;
pub use crate::core::tool::{Arguments, RegisteredHandler, ToolDescriptor, ToolFn, ToolHandler};
