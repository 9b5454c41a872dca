//! Input loading: read a user-selected image and validate it.
//!
//! The service accepts a handful of still-image containers. Sniffing the magic
//! bytes (rather than trusting the extension) catches renamed files before a
//! round trip to the API; the extension is only a fallback for formats the
//! sniffer does not know.

use crate::error::PlantDocError;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image containers the inference endpoint accepts.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// A loaded image, ready to encode.
///
/// Owns the file contents; dropping it releases the buffer, so replacing one
/// selection with another never leaks the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SelectedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Read and validate an image file.
///
/// # Errors
/// - [`PlantDocError::FileNotFound`] / [`PlantDocError::PermissionDenied`]
/// - [`PlantDocError::ReadError`] for any other I/O failure
/// - [`PlantDocError::EncodingError`] for a zero-length file
/// - [`PlantDocError::ImageTooLarge`] above `max_bytes`
/// - [`PlantDocError::UnsupportedImage`] for anything but PNG/JPEG/GIF/WebP
pub async fn load_image(path: impl AsRef<Path>, max_bytes: u64) -> Result<SelectedImage, PlantDocError> {
    let path = path.as_ref().to_path_buf();

    // Size is checked from metadata so an oversized file is never read.
    let size = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta.len(),
        Err(e) => return Err(map_io_error(path, e)),
    };
    if size > max_bytes {
        return Err(PlantDocError::ImageTooLarge {
            path,
            size,
            limit: max_bytes,
        });
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) => return Err(map_io_error(path, e)),
    };

    let mime_type = validate_image(&path, &bytes, max_bytes)?;
    debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), mime_type);

    Ok(SelectedImage {
        path,
        bytes,
        mime_type,
    })
}

/// Reject empty buffers and buffers above `max_bytes`.
pub fn check_size(path: &Path, bytes: &[u8], max_bytes: u64) -> Result<(), PlantDocError> {
    if bytes.is_empty() {
        return Err(PlantDocError::EncodingError {
            detail: format!("'{}' is empty", path.display()),
        });
    }

    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(PlantDocError::ImageTooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }
    Ok(())
}

fn map_io_error(path: PathBuf, source: std::io::Error) -> PlantDocError {
    match source.kind() {
        std::io::ErrorKind::NotFound => PlantDocError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => PlantDocError::PermissionDenied { path },
        _ => PlantDocError::ReadError { path, source },
    }
}

/// Validate in-memory image bytes and return their MIME type.
///
/// `path` is only used for error messages and the extension fallback.
pub fn validate_image(path: &Path, bytes: &[u8], max_bytes: u64) -> Result<String, PlantDocError> {
    check_size(path, bytes, max_bytes)?;

    let format = detect_format(path, bytes).ok_or_else(|| PlantDocError::UnsupportedImage {
        path: path.to_path_buf(),
        detail: "unrecognised image data".to_string(),
    })?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(PlantDocError::UnsupportedImage {
            path: path.to_path_buf(),
            detail: format!("{:?} images are not accepted", format),
        });
    }

    Ok(format.to_mime_type().to_string())
}

/// Sniff the container from magic bytes, falling back to the extension.
fn detect_format(path: &Path, bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
    const GIF_MAGIC: &[u8] = b"GIF89a\x01\0\x01\0";

    #[test]
    fn detects_supported_formats() {
        let p = Path::new("leaf");
        assert_eq!(validate_image(p, PNG_MAGIC, 1024).unwrap(), "image/png");
        assert_eq!(validate_image(p, JPEG_MAGIC, 1024).unwrap(), "image/jpeg");
        assert_eq!(validate_image(p, GIF_MAGIC, 1024).unwrap(), "image/gif");
    }

    #[test]
    fn magic_bytes_beat_extension() {
        let p = Path::new("leaf.jpg");
        assert_eq!(validate_image(p, PNG_MAGIC, 1024).unwrap(), "image/png");
    }

    #[test]
    fn empty_is_encoding_error() {
        let err = validate_image(Path::new("a.png"), b"", 1024).unwrap_err();
        assert!(matches!(err, PlantDocError::EncodingError { .. }), "{err:?}");
    }

    #[test]
    fn too_large_rejected() {
        let err = validate_image(Path::new("a.png"), PNG_MAGIC, 4).unwrap_err();
        assert!(matches!(err, PlantDocError::ImageTooLarge { limit: 4, .. }), "{err:?}");
    }

    #[test]
    fn text_file_unsupported() {
        let err = validate_image(Path::new("notes.txt"), b"hello there", 1024).unwrap_err();
        assert!(matches!(err, PlantDocError::UnsupportedImage { .. }), "{err:?}");
    }

    #[test]
    fn bmp_unsupported() {
        let err = validate_image(Path::new("x"), b"BM\0\0\0\0\0\0\0\0", 1024).unwrap_err();
        assert!(matches!(err, PlantDocError::UnsupportedImage { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn load_missing_file() {
        let err = load_image("/definitely/not/here.png", 1024).await.unwrap_err();
        assert!(matches!(err, PlantDocError::FileNotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn load_real_file() {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        tmp.write_all(PNG_MAGIC).unwrap();
        let img = load_image(tmp.path(), 1024).await.unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.size(), PNG_MAGIC.len() as u64);
    }

    #[tokio::test]
    async fn load_empty_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let err = load_image(tmp.path(), 1024).await.unwrap_err();
        assert!(matches!(err, PlantDocError::EncodingError { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn oversized_file_rejected_before_read() {
        // Sparse 1 GiB file: only metadata is cheap to touch.
        let tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        tmp.as_file().set_len(1 << 30).unwrap();

        let err = load_image(tmp.path(), 10 * 1024 * 1024).await.unwrap_err();
        match err {
            PlantDocError::ImageTooLarge { size, limit, .. } => {
                assert_eq!(size, 1 << 30);
                assert_eq!(limit, 10 * 1024 * 1024);
            }
            other => panic!("expected ImageTooLarge, got {other:?}"),
        }
    }
}
