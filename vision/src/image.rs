//! Stage 0: decode and validate the inbound image before any classifier is
//! called. Not present in the original pipeline as a distinct step — callers
//! there assumed a valid data URI — but every Rust entry point needs a typed
//! gate before the strict stages run.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use petcare_common::error::ApiError;

const SUPPORTED_MIME_PREFIXES: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

#[derive(Debug)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// The original, possibly data-URI-prefixed, base64 payload — this is
    /// what downstream classifier/VLM HTTP calls forward verbatim.
    pub raw: String,
}

pub fn decode_and_validate(raw: &str, max_size_bytes: u64) -> Result<DecodedImage, ApiError> {
    let (mime, b64_payload) = split_data_uri(raw);

    if let Some(mime) = mime {
        if !SUPPORTED_MIME_PREFIXES.iter().any(|m| mime.contains(m)) {
            return Err(ApiError::InvalidImage(format!("unsupported image format: {mime}")));
        }
    }

    if b64_payload.trim().is_empty() {
        return Err(ApiError::InvalidImage("image payload is empty".into()));
    }

    let bytes = STANDARD
        .decode(b64_payload.trim())
        .map_err(|_| ApiError::InvalidImage("image payload is not valid base64".into()))?;

    if bytes.is_empty() {
        return Err(ApiError::InvalidImage("decoded image is empty".into()));
    }
    if bytes.len() as u64 > max_size_bytes {
        return Err(ApiError::InvalidImage(format!(
            "image exceeds maximum size of {max_size_bytes} bytes"
        )));
    }

    if mime.is_none() && infer_format(&bytes).is_none() {
        return Err(ApiError::InvalidImage("unrecognized image format".into()));
    }

    Ok(DecodedImage {
        bytes,
        raw: raw.to_string(),
    })
}

fn split_data_uri(raw: &str) -> (Option<&str>, &str) {
    if let Some(rest) = raw.strip_prefix("data:") {
        if let Some((mime_part, b64_part)) = rest.split_once(',') {
            let mime = mime_part.split(';').next().unwrap_or(mime_part);
            return (Some(mime), b64_part);
        }
    }
    (None, raw)
}

/// Cheap magic-byte sniff for payloads arriving without a data-URI prefix.
fn infer_format(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpeg")
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("png")
    } else if bytes.len() > 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_payload() {
        let err = decode_and_validate("data:image/png;base64,", 1024).unwrap_err();
        assert!(matches!(err, ApiError::InvalidImage(_)));
    }

    #[test]
    fn rejects_unsupported_mime() {
        let encoded = STANDARD.encode(b"not a real image");
        let raw = format!("data:image/gif;base64,{encoded}");
        let err = decode_and_validate(&raw, 1024).unwrap_err();
        assert!(matches!(err, ApiError::InvalidImage(_)));
    }

    #[test]
    fn accepts_valid_png_magic_bytes() {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47];
        bytes.extend_from_slice(&[0u8; 16]);
        let encoded = STANDARD.encode(&bytes);
        let raw = format!("data:image/png;base64,{encoded}");
        let decoded = decode_and_validate(&raw, 1024).unwrap();
        assert_eq!(decoded.bytes, bytes);
    }

    #[test]
    fn rejects_oversized_payload() {
        let bytes = vec![0x89, 0x50, 0x4E, 0x47, 0, 0, 0, 0];
        let encoded = STANDARD.encode(&bytes);
        let raw = format!("data:image/png;base64,{encoded}");
        let err = decode_and_validate(&raw, 4).unwrap_err();
        assert!(matches!(err, ApiError::InvalidImage(_)));
    }
}
