//! `base_pkg_1`, the base test package, in two versions.

use serde_json::{Value, json};

use crate::core::error::{HandlerError, Result};
use crate::core::schema::{ParamSpec, ParamType};
use crate::core::server::ToolServer;
use crate::core::tool::{Arguments, ToolFn};

const NAME: &str = "base_pkg_1";
const ORIGIN_CITATION: &str = "Base package 1 for testing with enhanced functionality";

const BASE_FUNCTION_DOC: &str = "Basic function for testing.

Args:
    param: Input parameter

Returns:
    str: Processed result";

const ENHANCED_FUNCTION_DOC: &str = "Enhanced function added in version 1.2.0.

Args:
    param: Input parameter
    option: Optional processing option

Returns:
    dict: Processed result with metadata";

fn base_function(server: &ToolServer, version: &'static str) -> ToolFn {
    let logger = server.logger().clone();
    ToolFn::new("base_function", move |args: Arguments| -> std::result::Result<String, HandlerError> {
        let param = args.str("param")?;
        logger.info(format!("Base function called with param: {}", param));
        Ok(format!("Base package 1 (v{}) processed: {}", version, param))
    })
    .doc(BASE_FUNCTION_DOC)
    .param(ParamSpec::required("param", ParamType::String).describe("Input parameter"))
    .returns(ParamType::String)
}

fn enhanced_function(server: &ToolServer) -> ToolFn {
    let logger = server.logger().clone();
    ToolFn::new("enhanced_function", move |args: Arguments| -> std::result::Result<Value, HandlerError> {
        let param = args.str("param")?;
        let option = args.str("option")?;
        logger.info(format!(
            "Enhanced function called with param: {}, option: {}",
            param, option
        ));
        Ok(json!({
            "status": "success",
            "input": param,
            "option": option,
            "processed_by": "base_pkg_1 v1.2.0",
            "timestamp": chrono::Utc::now().to_rfc2822()
        }))
    })
    .doc(ENHANCED_FUNCTION_DOC)
    .param(ParamSpec::required("param", ParamType::String).describe("Input parameter"))
    .param(
        ParamSpec::optional("option", ParamType::String, "default")
            .describe("Optional processing option"),
    )
    .returns(ParamType::Object)
}

/// Version 1.2.0: `base_function` and `enhanced_function`.
pub fn v1_2_0() -> Result<ToolServer> {
    let mut server = ToolServer::new(
        NAME,
        ORIGIN_CITATION,
        "Base package 1 MCP implementation v1.2.0",
    )?;
    let base = base_function(&server, "1.2.0");
    server.tool(base)?;
    let enhanced = enhanced_function(&server);
    server.tool(enhanced)?;
    Ok(server)
}

/// Version 1.3.0: `base_function` only.
pub fn v1_3_0() -> Result<ToolServer> {
    let mut server = ToolServer::new(
        NAME,
        ORIGIN_CITATION,
        "Base package 1 MCP implementation v1.3.0",
    )?;
    let base = base_function(&server, "1.3.0");
    server.tool(base)?;
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn base_function_reports_version() {
        let server = v1_3_0().unwrap();
        let result = server
            .invoke("base_function", args(json!({ "param": "hello" })))
            .unwrap();
        assert_eq!(result, json!("Base package 1 (v1.3.0) processed: hello"));
        assert!(server.get_tool("enhanced_function").is_none());
    }

    #[test]
    fn enhanced_function_uses_default_option() {
        let server = v1_2_0().unwrap();
        let result = server
            .invoke("enhanced_function", args(json!({ "param": "data" })))
            .unwrap();

        assert_eq!(result["status"], "success");
        assert_eq!(result["input"], "data");
        assert_eq!(result["option"], "default");
        assert_eq!(result["processed_by"], "base_pkg_1 v1.2.0");
        assert!(result["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn descriptions_come_from_docs() {
        let server = v1_2_0().unwrap();
        let tools = server.list_tools();
        assert_eq!(tools[0].name, "base_function");
        assert!(tools[0].description.starts_with("Basic function for testing."));
        assert_eq!(tools[1].parameters.len(), 2);
        assert!(!tools[1].parameters[1].is_required());
    }
}
