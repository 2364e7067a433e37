//! HTTP front end for the concat engine.
//!
//! Requests whose path contains the static prefix go to [`concat::handle`];
//! everything else falls back to single files under the document root.

mod lifecycle;
mod path;
mod response;

pub use lifecycle::setup_shutdown_handler;

use crate::{
    concat::{self, DiskSource},
    config::{ConcatConfig, cfg},
    debug, log,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bind the server and run the request loop until shutdown.
pub fn serve() -> Result<()> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "root {}, prefix {}", config.root().display(), config.concat.static_prefix);

    run_request_loop(&server, config.serve.threads)
}

fn run_request_loop(server: &Server, threads: usize) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let config = cfg();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ConcatConfig) -> Result<()> {
    if lifecycle::is_shutdown() {
        return response::respond_status(request, 503);
    }

    let method = request.method().as_str().to_string();
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or(&url);

    if concat::is_concat_path(path, &config.concat.static_prefix) {
        return match concat::handle(&method, &url, &config.concat, &DiskSource) {
            Ok(res) => {
                debug!("concat"; "200 {} ({} bytes)", url, res.content_length());
                response::respond_concat(request, res)
            }
            Err(e) => {
                log!("concat"; "{} {}: {}", e.status(), url, e);
                response::respond_status(request, e.status())
            }
        };
    }

    if !config.serve.static_files {
        return response::respond_status(request, 404);
    }

    if !matches!(method.as_str(), "GET" | "HEAD") {
        return response::respond_status(request, 405);
    }

    match path::resolve_path(&url, &config.concat.root) {
        Ok(file) => response::respond_file(request, &file),
        Err(e) => {
            debug!("serve"; "{} {}: {}", e.status(), url, e);
            response::respond_status(request, e.status())
        }
    }
}
