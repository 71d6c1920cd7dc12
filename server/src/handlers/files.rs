use actix_files::Files;
use std::path::Path;

/// Serves the browser sketches. Must be registered after every other service
/// because it is mounted at `/`.
pub fn static_files(dir: &Path) -> Files {
    Files::new("/", dir).index_file("index.html")
}
