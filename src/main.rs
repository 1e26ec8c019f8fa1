/// Tool Server Entry Point
///
/// Builds one demo package, then serves its tools on the transport selected
/// by environment variables. Logs go to stderr so stdout stays a clean
/// protocol stream.
///
/// Environment Variables:
/// - TOOL_PACKAGE: Package to serve, `name` or `name@version` (default: "base_pkg_1")
/// - LOG_LEVEL: trace, debug, info, warn or error (default: "info"); RUST_LOG overrides
/// - MCP_TRANSPORT_MODE, HOST, PORT, WORKER_THREADS, MAX_IN_FLIGHT: see `core::config`

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use tool_server::TransportConfig;
use tool_server::core::config::get_env_var;
use tool_server::packages;

fn setup_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging(&get_env_var("LOG_LEVEL", "info"));

    let requested = get_env_var("TOOL_PACKAGE", "base_pkg_1");
    let package = packages::find(&requested)
        .with_context(|| format!("Unknown package '{}'", requested))?;
    let transport = TransportConfig::from_env().context("Invalid transport configuration")?;

    let server = (package.build)()
        .with_context(|| format!("Failed to build package '{}'", requested))?;
    server.logger().info(format!(
        "Starting MCP server for {} v{}",
        package.name, package.version
    ));

    server.run(transport).await.context("MCP server error")?;

    info!("MCP server stopped");
    Ok(())
}
