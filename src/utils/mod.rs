//! Shared helpers: dates, HTML escaping, MIME types, paths.

pub mod date;
pub mod html;
pub mod mime;
pub mod path;
