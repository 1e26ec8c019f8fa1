/// Serving Transports
///
/// - stdio: newline-delimited JSON on stdin/stdout. Requests are dispatched
///   concurrently onto the blocking pool, bounded by `max_in_flight`.
///   Responses are written as they complete, one per line, and flushed
///   immediately. Logs never go to stdout.
/// - http: Actix Web server accepting one JSON message per POST.
///
/// Per-request failures are answered on the channel. A channel that can no
/// longer be read from or written to ends serving with `Transport`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, HttpResponse, HttpServer,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::config::{HttpConfig, TransportConfig};
use crate::core::error::{Result, ToolServerError};
use crate::core::protocol;
use crate::core::server::ToolServer;

/// Serve `server` on the configured transport until it stops.
pub async fn serve(server: Arc<ToolServer>, transport: TransportConfig) -> Result<()> {
    match transport {
        TransportConfig::Stdio { max_in_flight } => {
            serve_stdio(server, max_in_flight, shutdown_signal()).await
        }
        TransportConfig::Http(http) => serve_http(server, http).await,
        TransportConfig::Both {
            max_in_flight,
            http,
        } => {
            // Stdio in the background, HTTP in the foreground
            let stdio_server = Arc::clone(&server);
            let stdio_handle = tokio::spawn(async move {
                let pending = std::future::pending();
                if let Err(e) = serve_stdio(Arc::clone(&stdio_server), max_in_flight, pending).await {
                    stdio_server
                        .logger()
                        .error(format!("STDIO server error: {}", e));
                }
            });

            let http_result = serve_http(server, http).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();

            http_result
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the channel closes.
        std::future::pending::<()>().await;
    }
}

/// Run the server on stdin/stdout.
pub async fn serve_stdio<S>(server: Arc<ToolServer>, max_in_flight: usize, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    server.logger().info(format!(
        "MCP server starting on stdio (max in flight: {})",
        max_in_flight
    ));

    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(server, stdin, stdout, max_in_flight, shutdown).await
}

/// Serve newline-delimited requests from `reader`, answering on `writer`.
///
/// Returns `Ok(())` once `reader` reaches end of input and every in-flight
/// invocation has been answered, or as soon as `shutdown` resolves, in which
/// case in-flight results are discarded. Handlers already running are not
/// interrupted.
pub async fn serve_lines<R, W, S>(
    server: Arc<ToolServer>,
    reader: R,
    mut writer: W,
    max_in_flight: usize,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut in_flight: JoinSet<Option<String>> = JoinSet::new();
    let mut reader = reader;
    let mut line = Vec::new();
    let mut input_open = true;
    tokio::pin!(shutdown);

    loop {
        if !input_open && in_flight.is_empty() {
            server.logger().info("Client closed connection");
            return Ok(());
        }

        tokio::select! {
            biased;

            _ = &mut shutdown => {
                server.logger().info(format!(
                    "Shutdown requested, abandoning {} in-flight request(s)",
                    in_flight.len()
                ));
                in_flight.abort_all();
                return Ok(());
            }

            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                match joined {
                    Ok(Some(response)) => write_line(&mut writer, &response).await?,
                    Ok(None) => {}
                    Err(e) => server.logger().error(format!("Dispatch task failed: {}", e)),
                }
            }

            // Raw bytes: a line that is not UTF-8 is a bad request, not a bad
            // channel. Partial reads stay in `line` if another branch wins.
            read = reader.read_until(b'\n', &mut line), if input_open => {
                if read? == 0 {
                    input_open = false;
                    continue;
                }
                let request = std::mem::take(&mut line);
                if request.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let permit = Arc::clone(&permits)
                    .acquire_owned()
                    .await
                    .map_err(|e| ToolServerError::Transport(std::io::Error::other(e)))?;
                let server = Arc::clone(&server);
                in_flight.spawn_blocking(move || {
                    let _permit = permit;
                    protocol::handle_bytes(&server, &request)
                });
            }
        }
    }
}

async fn write_line<W>(writer: &mut W, line: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Each response must be on a single line followed by newline
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Health check endpoint handler.
async fn health(server: web::Data<Arc<ToolServer>>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": server.name(),
        "tools": server.list_tools().len()
    }))
}

/// Tool discovery endpoint handler.
async fn list_tools(server: web::Data<Arc<ToolServer>>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "tools": server.tool_definitions()
    }))
}

/// MCP JSON-RPC request handler.
///
/// Tool handlers are synchronous, so dispatch runs on the blocking pool to
/// keep the worker's event loop free.
async fn mcp_handler(
    server: web::Data<Arc<ToolServer>>,
    body: web::Json<Value>,
) -> HttpResponse {
    let server = Arc::clone(server.get_ref());
    let message = body.into_inner();
    match web::block(move || protocol::handle_message(&server, message)).await {
        Ok(Some(response)) => HttpResponse::Ok().json(response),
        // Notification: nothing to answer
        Ok(None) => HttpResponse::Accepted().finish(),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": { "code": protocol::INTERNAL_ERROR, "message": e.to_string() }
        })),
    }
}

/// Register HTTP routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/tools", web::get().to(list_tools))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the server in HTTP mode.
///
/// The server is configured with:
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive: 30 seconds
/// - Request timeout: 30 seconds
/// - Shutdown timeout: 10 seconds
pub async fn serve_http(server: Arc<ToolServer>, config: HttpConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.host, config.port);

    server.logger().info(format!(
        "MCP server starting (HTTP mode) on {} with {} worker(s)",
        bind_addr, config.workers
    ));

    let data = web::Data::new(server);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            // Enable compression for JSON responses (gzip/brotli)
            .wrap(Compress::default())
            // Add security headers to all responses
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
