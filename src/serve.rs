//! HTTP server for the live dashboard
//!
//! `callboard serve` → starts server, opens browser, re-renders on every request

use crate::dashboard::{self, html, Dashboard};
use crate::data::{load_logo, logo_mime, DataPaths};
use crate::error::LoadError;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

/// What one render pass needs to know
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub port: u16,
    pub paths: DataPaths,
    pub title: String,
    pub open_browser: bool,
}

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    fn failure(error: String) -> Self {
        Self { ok: false, data: None, error: Some(error) }
    }
}

/// Start server, open browser, serve the dashboard
pub fn start(options: ServeOptions) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", options.port);
    let server = Server::http(&addr).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let url = format!("http://localhost:{}", options.port);
    let data_dir = options
        .paths
        .call_results
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    eprintln!("\n\x1b[1;32m📞 Callboard\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Data: {}\n", data_dir);

    if options.open_browser {
        if let Err(e) = open::that(&url) {
            log::warn!("Could not open browser: {}", e);
        }
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &options) {
            log::error!("Request failed: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, options: &ServeOptions) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let method = request.method().clone();
    log::info!("{} {}", method, path);

    match (&method, path) {
        // Full render pass
        (&Method::Get, "/") => match dashboard::load(&options.paths, &options.title) {
            Ok(board) => {
                let page = html::render(&board, "/logo")?;
                request.respond(Response::from_string(page).with_header(content_type("text/html; charset=utf-8")?))
            }
            Err(e) => {
                log::error!("Render failed: {}", e);
                let mut page = Vec::new();
                html::write_error_page(&mut page, &e)?;
                let response = Response::from_data(page)
                    .with_status_code(500)
                    .with_header(content_type("text/html; charset=utf-8")?);
                request.respond(response)
            }
        },

        (&Method::Get, "/logo") => match load_logo(&options.paths.logo) {
            Ok(bytes) => {
                let response = Response::from_data(bytes).with_header(content_type(logo_mime(&options.paths.logo))?);
                request.respond(response)
            }
            Err(e) => {
                log::error!("{}", e);
                request.respond(Response::from_string("Not found").with_status_code(404))
            }
        },

        // API: the built dashboard as JSON
        (&Method::Get, "/api/dashboard") => {
            let (status, json) = api_payload(dashboard::load(&options.paths, &options.title))?;
            let response = Response::from_string(json)
                .with_status_code(status)
                .with_header(content_type("application/json")?);
            request.respond(response)
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

fn api_payload(result: Result<Dashboard, LoadError>) -> std::io::Result<(u16, String)> {
    match result {
        Ok(board) => Ok((200, serde_json::to_string(&ApiResponse::success(board))?)),
        Err(e) => {
            log::error!("Render failed: {}", e);
            Ok((500, serde_json::to_string(&ApiResponse::<Dashboard>::failure(e.to_string()))?))
        }
    }
}

fn content_type(value: &str) -> std::io::Result<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("bad content type: {}", value))
    })
}
