use std::net::SocketAddr;
use std::path::Path;

/// Bind to localhost only; the pack server is a local development aid.
pub fn bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Reject absolute paths and traversal in catalog-style mod paths.
pub fn sanitize_path(path: &str) -> Option<&str> {
    let p = Path::new(path);
    if p.is_absolute() || path.contains("..") {
        return None;
    }
    Some(path)
}
