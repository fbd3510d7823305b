//! `crown dev`: watch session plus a preview server.
//!
//! | Path         | Response                                          |
//! |--------------|---------------------------------------------------|
//! | `/`          | preview page (PDF iframe + live-reload client)    |
//! | `/book.pdf`  | the built PDF, `no-cache`; 404 until the first build |
//! | `/book.html` | the intermediate HTML                             |
//! | `/styles.css`| the copied stylesheet, for `/book.html`           |

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Header, Request, Response, Server, StatusCode};

use super::watch::{spawn_session, wait_for_shutdown};
use crate::actor::{LiveReload, WatchSession};
use crate::config::CrownConfig;
use crate::core::{is_shutdown, register_server, register_shutdown};
use crate::embed::serve::{PREVIEW_HTML, PreviewVars};
use crate::log;
use crate::reload::server::DEFAULT_WS_PORT;
use crate::utils::exec::open_with_system;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// How long Ctrl+C waits for an in-flight build.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

const HTML: &str = "text/html; charset=utf-8";
const PDF: &str = "application/pdf";
const CSS: &str = "text/css; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";

pub fn dev(config: Arc<CrownConfig>) -> Result<()> {
    let live_reload = LiveReload::bind(DEFAULT_WS_PORT)?;
    let ws_port = live_reload.port();

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded();
    register_shutdown(shutdown_tx);
    register_server(Arc::clone(&server));

    let url = browser_url(addr);
    log!("dev"; "{}", url);

    let session = spawn_session(
        WatchSession::with_config(Arc::clone(&config))
            .with_live_reload(live_reload)
            .with_shutdown_signal(shutdown_rx),
    );

    if config.serve.open
        && let Err(e) = open_with_system(&url)
    {
        log!("dev"; "could not open a browser: {}", e);
    }

    run_request_loop(&server, &config, ws_port);
    wait_for_shutdown(session, SHUTDOWN_GRACE)
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("dev"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(anyhow::anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

/// `0.0.0.0` is fine to bind but not to browse.
fn browser_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

fn run_request_loop(server: &Server, config: &Arc<CrownConfig>, ws_port: u16) {
    // A slow PDF download must not hold up the preview page
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(4).build() {
        Ok(pool) => pool,
        Err(e) => {
            log!("dev"; "failed to create thread pool: {}", e);
            return;
        }
    };

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("dev"; "request error: {}", e);
            }
        });
    }
}

fn handle_request(request: Request, config: &CrownConfig, ws_port: u16) -> Result<()> {
    if is_shutdown() {
        return send(request, 503, PLAIN, b"503 Service Unavailable".to_vec(), false);
    }

    // Cache-busting query strings are ignored
    let path = request.url().split('?').next().unwrap_or("/").to_string();
    match path.as_str() {
        "/" | "/index.html" => {
            let body = PREVIEW_HTML.render(&PreviewVars {
                title: config.metadata.title.clone(),
                ws_port,
            });
            send(request, 200, HTML, body.into_bytes(), true)
        }
        "/book.pdf" => match fs::read(&config.output.pdf) {
            Ok(body) => send(request, 200, PDF, body, true),
            Err(_) => send(request, 404, PLAIN, b"PDF not found. Building...".to_vec(), true),
        },
        "/book.html" => respond_file(request, &config.output.html, HTML),
        "/styles.css" => respond_file(request, &config.output.styles_copy(), CSS),
        _ => send(request, 404, PLAIN, b"404 Not Found".to_vec(), false),
    }
}

fn respond_file(request: Request, path: &Path, content_type: &'static str) -> Result<()> {
    if !path.is_file() {
        return send(request, 404, PLAIN, b"404 Not Found".to_vec(), true);
    }
    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    send(request, 200, content_type, body, true)
}

fn send(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    no_cache: bool,
) -> Result<()> {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?);
    if no_cache {
        response = response.with_header(header("Cache-Control", "no-cache")?);
    }
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow::anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpStream;

    use tempfile::TempDir;

    use super::*;
    use crate::config::test_parse_config;

    /// Serve one request against `config` and return the raw response.
    fn get(config: CrownConfig, path: &str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let config = Arc::new(config);

        let client = std::thread::spawn({
            let path = path.to_string();
            move || {
                let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
                write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).unwrap();
                response
            }
        });

        let request = server.recv().unwrap();
        handle_request(request, &config, 35729).unwrap();
        client.join().unwrap()
    }

    fn config_in(dir: &TempDir) -> CrownConfig {
        let mut config = test_parse_config("[metadata]\ntitle = \"Field Notes\"");
        config.output.pdf = dir.path().join("dist/book.pdf");
        config.output.html = dir.path().join("dist/book.html");
        config
    }

    #[test]
    fn test_missing_pdf_is_404_building() {
        let dir = TempDir::new().unwrap();
        let response = get(config_in(&dir), "/book.pdf");
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.contains("PDF not found. Building..."));
    }

    #[test]
    fn test_pdf_served_without_cache() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/book.pdf"), "%PDF-1.7").unwrap();

        let response = get(config_in(&dir), "/book.pdf?t=123");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("application/pdf"));
        assert!(response.contains("no-cache"));
        assert!(response.ends_with("%PDF-1.7"));
    }

    #[test]
    fn test_preview_page_has_port_and_title() {
        let dir = TempDir::new().unwrap();
        let response = get(config_in(&dir), "/");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("var port = 35729;"));
        assert!(response.contains("Field Notes"));
    }

    #[test]
    fn test_unknown_path() {
        let dir = TempDir::new().unwrap();
        assert!(get(config_in(&dir), "/nope").starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_browser_url() {
        assert_eq!(browser_url("0.0.0.0:3000".parse().unwrap()), "http://localhost:3000");
        assert_eq!(browser_url("127.0.0.1:3001".parse().unwrap()), "http://127.0.0.1:3001");
    }
}
