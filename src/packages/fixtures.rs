//! Dependency fixture packages.
//!
//! These exist to exercise package installation with different kinds of
//! dependencies. Their tools only pretend to need them.

use crate::core::error::{HandlerError, Result};
use crate::core::schema::{ParamSpec, ParamType};
use crate::core::server::ToolServer;
use crate::core::tool::{Arguments, ToolFn};

type HandlerResult<T> = std::result::Result<T, HandlerError>;

/// A package with a single `(param: str) -> str` tool that reports which
/// package processed its input.
fn single_function_package(
    name: &str,
    label: &'static str,
    function: &str,
    doc: &str,
) -> Result<ToolServer> {
    let mut server = ToolServer::new(
        name,
        format!("{} for testing", label),
        format!("{} MCP implementation", label),
    )?;

    let logger = server.logger().clone();
    let call_label = label.strip_suffix(" dependency package").unwrap_or(label);
    let tool = ToolFn::new(function, move |args: Arguments| -> HandlerResult<String> {
        let param = args.str("param")?;
        logger.info(format!("{} function called with param: {}", call_label, param));
        Ok(format!("{} processed: {}", label, param))
    })
    .doc(doc)
    .param(ParamSpec::required("param", ParamType::String).describe("Input parameter."))
    .returns(ParamType::String);

    server.tool(tool)?;
    Ok(server)
}

pub fn file_path_dep_pkg() -> Result<ToolServer> {
    single_function_package(
        "file_path_dep_pkg",
        "File path dependency package",
        "file_path_function",
        "Function from file path dependency package.",
    )
}

pub fn nonexistent_repo_dep_pkg() -> Result<ToolServer> {
    single_function_package(
        "nonexistent_repo_dep_pkg",
        "Nonexistent repo dependency package",
        "nonexistent_repo_function",
        "Function from nonexistent repo dependency package.",
    )
}

pub fn repo_prefix_dep_pkg() -> Result<ToolServer> {
    single_function_package(
        "repo_prefix_dep_pkg",
        "Repo prefix dependency package",
        "repo_prefix_function",
        "Function from repo prefix dependency package.",
    )
}

pub fn docker_dep_pkg() -> Result<ToolServer> {
    let mut server = ToolServer::new(
        "docker_dep_pkg",
        "Docker dependency package for testing",
        "Docker dependency package MCP implementation",
    )?;
    server.tool(
        ToolFn::new("docker_check", |_args: Arguments| -> HandlerResult<&'static str> {
            Ok("Docker dependency tool executed. (Pretend this needs 'nginx' docker image)")
        })
        .doc("Dummy tool that requires a docker image (e.g., nginx).")
        .returns(ParamType::String),
    )?;
    Ok(server)
}

pub fn system_dep_pkg() -> Result<ToolServer> {
    let mut server = ToolServer::new(
        "system_dep_pkg",
        "System dependency package for testing",
        "System dependency package MCP implementation",
    )?;
    server.tool(
        ToolFn::new("system_check", |_args: Arguments| -> HandlerResult<&'static str> {
            Ok("System dependency tool executed. (Pretend this needs 'curl')")
        })
        .doc("Dummy tool that requires a system package (e.g., curl).")
        .returns(ParamType::String),
    )?;
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn single_function_packages_process_param() {
        let cases = [
            (file_path_dep_pkg as fn() -> Result<ToolServer>, "file_path_function", "File path dependency package processed: x"),
            (nonexistent_repo_dep_pkg, "nonexistent_repo_function", "Nonexistent repo dependency package processed: x"),
            (repo_prefix_dep_pkg, "repo_prefix_function", "Repo prefix dependency package processed: x"),
        ];

        for (build, tool, expected) in cases {
            let server = build().unwrap();
            let mut args = Map::new();
            args.insert("param".to_string(), json!("x"));
            assert_eq!(server.invoke(tool, args).unwrap(), json!(expected));
        }
    }

    #[test]
    fn citations_follow_package_label() {
        let server = repo_prefix_dep_pkg().unwrap();
        assert_eq!(server.origin_citation(), "Repo prefix dependency package for testing");
        assert_eq!(server.mcp_citation(), "Repo prefix dependency package MCP implementation");
    }

    #[test]
    fn check_tools_take_no_arguments() {
        let docker = docker_dep_pkg().unwrap();
        let result = docker.invoke("docker_check", Map::new()).unwrap();
        assert!(result.as_str().unwrap().contains("nginx"));

        let system = system_dep_pkg().unwrap();
        let mut extra = Map::new();
        extra.insert("package".to_string(), json!("curl"));
        let err = system.invoke("system_check", extra).unwrap_err();
        assert_eq!(err.offending_parameters(), vec!["package"]);
    }
}
