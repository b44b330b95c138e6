//! MIME type detection from leading magic bytes.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Best-effort content type of `data`, `application/octet-stream` when unknown.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        "image/gif"
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
        "audio/wav"
    } else if data.starts_with(b"%PDF") {
        "application/pdf"
    } else if data.len() >= 8 && &data[4..8] == b"ftyp" {
        // ISO base media: mp4, m4a, mov share the box layout
        "video/mp4"
    } else if data.starts_with(b"ID3") || data.starts_with(&[0xFF, 0xFB]) {
        "audio/mpeg"
    } else if data.starts_with(b"OggS") {
        "audio/ogg"
    } else if data.starts_with(b"PK\x03\x04") {
        "application/zip"
    } else {
        OCTET_STREAM
    }
}
