//! Upload validation and scratch naming.

use crate::error::PredictError;
use uuid::Uuid;

/// Image extensions accepted when nothing else is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// An uploaded image that passed validation.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_filename: String,
    /// Collision-free name used in the scratch directory
    pub storage_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Validate the filename and derive a fresh storage name.
    pub fn new(
        bytes: Vec<u8>,
        filename: &str,
        allowed: &[String],
    ) -> Result<Self, PredictError> {
        let extension = validate_filename(filename, allowed)?;
        Ok(Self {
            original_filename: filename.to_string(),
            storage_name: unique_storage_name(&extension),
            bytes,
        })
    }
}

/// Lower-cased extension of the last path component, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let name = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check the filename against the allowed extension set.
///
/// Returns the normalized extension on success.
pub fn validate_filename(filename: &str, allowed: &[String]) -> Result<String, PredictError> {
    if filename.trim().is_empty() {
        return Err(PredictError::invalid("No file provided"));
    }

    match file_extension(filename) {
        Some(ext)
            if allowed
                .iter()
                .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&ext)) =>
        {
            Ok(ext)
        }
        _ => Err(PredictError::invalid(format!(
            "File type not allowed. Supported types: {}",
            allowed_types_message(allowed)
        ))),
    }
}

/// Sorted, dotted list of allowed extensions, e.g. ".bmp, .gif, .jpg".
pub fn allowed_types_message(allowed: &[String]) -> String {
    let mut exts: Vec<String> = allowed
        .iter()
        .map(|e| format!(".{}", e.trim_start_matches('.').to_ascii_lowercase()))
        .collect();
    exts.sort();
    exts.dedup();
    exts.join(", ")
}

pub fn unique_storage_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

pub fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cow.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("herd.photo.webp"), Some("webp".to_string()));
        assert_eq!(file_extension("C:\\farm\\cow.png"), Some("png".to_string()));
        assert_eq!(file_extension("cow"), None);
        assert_eq!(file_extension("cow."), None);
        assert_eq!(file_extension("dir.v2/cow"), None);
    }

    #[test]
    fn test_validate_accepts_allowed() {
        let allowed = default_allowed_extensions();
        for name in ["a.jpg", "b.jpeg", "c.png", "d.gif", "e.bmp", "f.WEBP"] {
            assert!(validate_filename(name, &allowed).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_validate_rejects_empty() {
        let allowed = default_allowed_extensions();
        let err = validate_filename("", &allowed).unwrap_err();
        assert_eq!(err.public_detail(), "No file provided");
    }

    #[test]
    fn test_validate_rejects_other_types() {
        let allowed = default_allowed_extensions();
        let err = validate_filename("cow.txt", &allowed).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput(_)));
        assert_eq!(
            err.public_detail(),
            "File type not allowed. Supported types: .bmp, .gif, .jpeg, .jpg, .png, .webp"
        );
    }

    #[test]
    fn test_storage_names_are_unique() {
        let allowed = default_allowed_extensions();
        let a = UploadedImage::new(vec![1], "cow.JPG", &allowed).unwrap();
        let b = UploadedImage::new(vec![1], "cow.JPG", &allowed).unwrap();
        assert_ne!(a.storage_name, b.storage_name);
        assert!(a.storage_name.ends_with(".jpg"));
        assert_eq!(a.original_filename, "cow.JPG");
    }
}
