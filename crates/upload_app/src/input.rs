use std::fs;
use std::path::Path;

use upload_core::RawFile;
use upload_logging::upload_error;

/// Reads every path into a batch, keeping command-line order. Unreadable
/// paths are logged and left out.
pub fn read_batch<P: AsRef<Path>>(paths: &[P]) -> Vec<RawFile> {
    paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            match read_file(path) {
                Ok(file) => Some(file),
                Err(err) => {
                    upload_error!("cannot read {:?}: {}", path, err);
                    None
                }
            }
        })
        .collect()
}

fn read_file(path: &Path) -> std::io::Result<RawFile> {
    let content = fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = RawFile::new(name, content);
    Ok(match guess_mime(&file) {
        Some(mime) => file.with_mime_type(mime),
        None => file,
    })
}

fn guess_mime(file: &RawFile) -> Option<&'static str> {
    let mime = match file.extension()?.as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".svg" => "image/svg+xml",
        ".pdf" => "application/pdf",
        ".json" => "application/json",
        ".zip" => "application/zip",
        ".txt" => "text/plain",
        ".csv" => "text/csv",
        ".html" | ".htm" => "text/html",
        _ => return None,
    };
    Some(mime)
}
