//! HTTP response handlers.

use crate::concat::ConcatResponse;
use crate::utils::date::http_date;
use anyhow::{Context, Result};
use std::{fs, path::Path, time::UNIX_EPOCH};
use tiny_http::{Header, Request, Response, StatusCode};

/// Respond with an assembled concat batch.
///
/// tiny_http drops the body of `HEAD` responses and keeps the headers.
pub fn respond_concat(request: Request, res: ConcatResponse) -> Result<()> {
    let headers = res.headers();
    let mut response = Response::from_data(res.body);
    for (name, value) in headers {
        response = response.with_header(make_header(name, &value)?);
    }
    request.respond(response)?;
    Ok(())
}

/// Respond with a single static file.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);
    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut response = Response::from_data(body)
        .with_header(make_header("Content-Type", content_type)?);

    let mtime = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok());
    if let Some(mtime) = mtime {
        response = response.with_header(make_header("Last-Modified", &http_date(mtime.as_secs()))?);
    }

    request.respond(response)?;
    Ok(())
}

/// Respond with a bare status code and no body.
pub fn respond_status(request: Request, status: u16) -> Result<()> {
    request.respond(Response::empty(StatusCode(status)))?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value)
        .map_err(|()| anyhow::anyhow!("invalid header `{key}: {value}`"))
}
