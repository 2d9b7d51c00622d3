//! Serve the built frontend (SPA) from the configured static directory.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// File service for `dist`; unknown paths fall back to `index.html`.
/// `None` when the directory does not exist.
pub fn static_service(dist: &Path) -> Option<ServeDir<ServeFile>> {
    if !dist.is_dir() {
        return None;
    }
    Some(ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html"))))
}
