//! MIME type detection for stored payloads.

use std::path::Path;

use tokio::io::AsyncReadExt;

/// Detect the MIME type of a file.
///
/// Image signatures are sniffed from the file header; everything else falls
/// back to the extension, then to `application/octet-stream`.
pub async fn detect_mime(path: &Path) -> String {
    let mut header = [0u8; 64];
    let read = match tokio::fs::File::open(path).await {
        Ok(mut file) => file.read(&mut header).await.unwrap_or(0),
        Err(_) => 0,
    };

    if let Ok(format) = image::guess_format(&header[..read]) {
        return format.to_mime_type().to_string();
    }

    mime_guess::from_path(path).first_or_octet_stream().to_string()
}
