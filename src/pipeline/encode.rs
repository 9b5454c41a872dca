//! Image encoding: raw file bytes → base64 payload for the request body.
//!
//! The Gemini API takes inline images as a bare base64 string next to a
//! separate `mimeType` field. There is no `data:<mime>;base64,` prefix, so
//! none is ever produced here.

use crate::error::PlantDocError;
use crate::pipeline::input::{self, SelectedImage};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// A base64-encoded image plus its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedImage {
    /// Standard-alphabet, padded base64 of the file bytes.
    pub data: String,
    pub mime_type: String,
}

/// Base64-encode raw bytes.
///
/// # Errors
/// [`PlantDocError::EncodingError`] when `bytes` is empty: there is no payload
/// to extract.
pub fn encode_bytes(bytes: &[u8]) -> Result<String, PlantDocError> {
    if bytes.is_empty() {
        return Err(PlantDocError::EncodingError {
            detail: "no image data".to_string(),
        });
    }
    Ok(STANDARD.encode(bytes))
}

/// Encode an already-loaded image.
pub fn encode_image(image: &SelectedImage) -> Result<EncodedImage, PlantDocError> {
    let data = encode_bytes(&image.bytes)?;
    debug!("Encoded image → {} bytes base64", data.len());

    Ok(EncodedImage {
        data,
        mime_type: image.mime_type.clone(),
    })
}

/// Read a file and encode it in one step.
///
/// # Errors
/// Any error of [`input::load_image`], then [`encode_bytes`].
pub async fn encode_file(path: impl AsRef<Path>, max_bytes: u64) -> Result<EncodedImage, PlantDocError> {
    let image = input::load_image(path, max_bytes).await?;
    encode_image(&image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn encode_known_bytes() {
        assert_eq!(encode_bytes(b"dummy").unwrap(), "ZHVtbXk=");
        assert_eq!(encode_bytes(b"fake base64").unwrap(), "ZmFrZSBiYXNlNjQ=");
    }

    #[test]
    fn encoded_payload_decodes_to_original() {
        let original: Vec<u8> = (0u8..=255).collect();
        let encoded = encode_bytes(&original).unwrap();
        assert!(!encoded.starts_with("data:"));
        assert_eq!(STANDARD.decode(&encoded).unwrap(), original);
    }

    #[test]
    fn empty_bytes_is_encoding_error() {
        let err = encode_bytes(&[]).unwrap_err();
        assert!(matches!(err, PlantDocError::EncodingError { .. }));
        assert!(err.to_string().contains("Failed to extract base64"));
    }

    #[test]
    fn encode_image_keeps_mime() {
        let img = SelectedImage {
            path: PathBuf::from("leaf.gif"),
            bytes: b"GIF89a".to_vec(),
            mime_type: "image/gif".into(),
        };
        let enc = encode_image(&img).unwrap();
        assert_eq!(enc.mime_type, "image/gif");
        assert_eq!(STANDARD.decode(&enc.data).unwrap(), b"GIF89a");
    }

    #[tokio::test]
    async fn encode_file_missing_is_read_kind() {
        let err = encode_file("/no/such/leaf.png", 1024).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Read);
    }

    #[tokio::test]
    async fn encode_file_roundtrip() {
        let bytes = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0rest-of-jpeg";
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(bytes).unwrap();
        let enc = encode_file(tmp.path(), 1024).await.unwrap();
        assert_eq!(enc.mime_type, "image/jpeg");
        assert_eq!(STANDARD.decode(&enc.data).unwrap(), bytes);
    }
}
