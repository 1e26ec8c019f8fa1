/// Core Runtime Module
///
/// This module contains the tool server runtime including:
/// - server.rs: `ToolServer`, registration, invocation and listing
/// - tool.rs: tool functions, descriptors and handler types
/// - schema.rs: parameter types, coercion and JSON Schema rendering
/// - protocol.rs: JSON-RPC / MCP message handling
/// - transport.rs: stdio and HTTP serving loops
/// - config.rs: transport configuration from the environment
/// - logger.rs: server-scoped logging handle
/// - error.rs: error taxonomy

pub mod config;
pub mod error;
pub mod logger;
pub mod protocol;
pub mod schema;
pub mod server;
pub mod tool;
pub mod transport;
